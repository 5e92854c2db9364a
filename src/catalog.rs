//! Durable image catalog backed by SQLite.
//!
//! The catalog is the source of truth for every image the gallery knows
//! about. The in-memory [`NavigableIndex`](crate::index::NavigableIndex) is
//! only ever a view of it and can always be rebuilt from [`Catalog::get_all`].
//!
//! ## Schema
//!
//! ```text
//! images
//! ├── id          INTEGER PRIMARY KEY AUTOINCREMENT   (never reused)
//! ├── filename    TEXT UNIQUE NOT NULL
//! ├── filepath    TEXT UNIQUE NOT NULL
//! └── created_at  TIMESTAMP NOT NULL
//! ```
//!
//! `AUTOINCREMENT` matters: plain `INTEGER PRIMARY KEY` lets SQLite hand out
//! the id of a deleted tail row again, which would break the ascending-id
//! ordering the index relies on for incremental appends.
//!
//! ## Failure Semantics
//!
//! Duplicate filenames or filepaths are an expected outcome of rescanning
//! and are reported as `Ok(false)` from [`Catalog::add`]. Anything else that
//! goes wrong in SQLite surfaces as [`CatalogError::Unavailable`]; a database
//! directory that cannot be created surfaces as [`CatalogError::Location`].
//! Callers should treat both as "catalog unavailable".
//!
//! Every method is a single auto-committed statement. No transaction spans
//! more than one call, so another process writing to the same file only
//! needs the gallery to [`reload`](crate::gallery::GalleryManager::reload).

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Both variants mean the catalog cannot be used. Duplicate keys and
/// missing rows are never reported here.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// SQLite refused the operation: corrupt or foreign file, missing table,
    /// locked database.
    #[error("catalog unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),
    /// The directory that should hold the database file cannot be created.
    #[error("catalog unavailable, cannot create directory {path}: {source}")]
    Location {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One persisted image entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            filename: row.get(1)?,
            filepath: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS images (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        filename    TEXT UNIQUE NOT NULL,
        filepath    TEXT UNIQUE NOT NULL,
        created_at  TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
";

const SELECT_COLUMNS: &str = "SELECT id, filename, filepath, created_at FROM images";

pub struct Catalog {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Catalog {
    /// Open (or create) the catalog database at `path` and ensure the schema.
    ///
    /// Missing parent directories are created.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CatalogError::Location {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let catalog = Self {
            conn: Connection::open(path)?,
            path: Some(path.to_path_buf()),
        };
        catalog.initialize()?;
        log::debug!("catalog opened at {}", path.display());
        Ok(catalog)
    }

    /// Open a private in-memory catalog. Contents vanish when dropped.
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let catalog = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        catalog.initialize()?;
        Ok(catalog)
    }

    /// Location of the database file, `None` for in-memory catalogs.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create the `images` table if it does not exist yet. Safe to call
    /// any number of times.
    pub fn initialize(&self) -> Result<(), CatalogError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert a new record stamped with the current time.
    ///
    /// Returns `Ok(false)` when `filename` or `filepath` is already present.
    pub fn add(&self, filename: &str, filepath: &str) -> Result<bool, CatalogError> {
        let result = self.conn.execute(
            "INSERT INTO images (filename, filepath, created_at) VALUES (?1, ?2, ?3)",
            params![filename, filepath, Utc::now()],
        );
        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All records in ascending id (insertion) order.
    pub fn get_all(&self) -> Result<Vec<ImageRecord>, CatalogError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
        let records = stmt
            .query_map([], ImageRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn get_by_filename(&self, filename: &str) -> Result<Option<ImageRecord>, CatalogError> {
        let record = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE filename = ?1"),
                [filename],
                ImageRecord::from_row,
            )
            .optional()?;
        Ok(record)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<ImageRecord>, CatalogError> {
        let record = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                [id],
                ImageRecord::from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Delete the record with `filename`. Returns whether a row was removed.
    pub fn delete(&self, filename: &str) -> Result<bool, CatalogError> {
        let removed = self
            .conn
            .execute("DELETE FROM images WHERE filename = ?1", [filename])?;
        Ok(removed > 0)
    }

    pub fn count(&self) -> Result<u64, CatalogError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Remove every record and return how many were removed.
    ///
    /// The id sequence is left alone, so ids are still not reused afterwards.
    pub fn clear(&self) -> Result<usize, CatalogError> {
        Ok(self.conn.execute("DELETE FROM images", [])?)
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").field("path", &self.path).finish()
    }
}
