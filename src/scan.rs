//! Image discovery and shard directory provisioning.
//!
//! Images live in a primary directory plus an open-ended run of numbered
//! shard directories that share its name as a prefix:
//!
//! ```text
//! static/
//! ├── images/        # primary shard (counts as the first shard)
//! │   ├── cat-01.png
//! │   └── cat-02.jpg
//! ├── images1/       # first numbered shard
//! │   └── dog.webp
//! ├── images2/
//! └── images4/       # unreachable: images3 is missing, scanning stops there
//! ```
//!
//! ## Scanning
//!
//! [`scan_all_shards`] walks the primary directory, then `images1`,
//! `images2`, … and stops at the first number that does not exist. Each
//! directory is listed non-recursively and in file-name order, so a fresh
//! catalog assigns ids deterministically. Every image file is offered to
//! [`Catalog::add`]; files already in the catalog are silently skipped,
//! which makes rescanning idempotent.
//!
//! ## Shard Capacity
//!
//! [`ensure_shard_capacity`] pre-provisions directories so uploads always
//! have somewhere to go. With `T` catalog entries and a limit of `M` files
//! per directory, `(T - 1) / M` shards are full (zero when `T` is zero), and
//! one more must exist to receive new files. Only numbered directories are
//! created, starting at the first free number; the primary directory counts
//! towards the total when present but is left to the caller. An empty
//! catalog provisions nothing. Files are never moved between shards.

use crate::catalog::{Catalog, CatalogError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("max_per_shard must be at least 1")]
    InvalidThreshold,
}

/// Extensions recognised as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Path of shard `n` for `base`. `n == 0` is the primary directory itself.
///
/// The number is appended to the final path component, so a trailing
/// separator on `base` is ignored: `static/images/` and `static/images`
/// both give `static/images3` for `n == 3`.
pub fn shard_path(base: &Path, n: usize) -> PathBuf {
    let base: PathBuf = base.components().collect();
    if n == 0 {
        return base;
    }
    let mut name = OsString::from(base.as_os_str());
    name.push(n.to_string());
    PathBuf::from(name)
}

/// Snapshot of the numbers that decide whether a shard must be created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShardState {
    /// Shard directories present on disk (primary plus contiguous numbered).
    pub existing_shards: usize,
    pub total_images: u64,
    pub max_per_shard: usize,
}

impl ShardState {
    /// Number of shards that are completely full.
    ///
    /// Clamped to zero for an empty catalog instead of computing `(0 - 1) / M`.
    pub fn expected_full_shards(&self) -> usize {
        if self.total_images == 0 || self.max_per_shard == 0 {
            return 0;
        }
        ((self.total_images - 1) / self.max_per_shard as u64) as usize
    }

    /// How many numbered directories must be created so that one non-full
    /// shard exists. An empty catalog never needs one.
    pub fn missing_shards(&self) -> usize {
        if self.total_images == 0 {
            return 0;
        }
        (self.expected_full_shards() + 1).saturating_sub(self.existing_shards)
    }
}

/// Directories created by [`ensure_shard_capacity`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShardReport {
    pub created: Vec<PathBuf>,
    pub state: ShardState,
}

/// Count the primary directory (if present) plus contiguous numbered shards.
///
/// Returns `(existing, next_number)` where `next_number` is the first
/// missing numbered shard.
fn count_shards(base: &Path) -> (usize, usize) {
    let mut existing = usize::from(shard_path(base, 0).is_dir());
    let mut n = 1;
    while shard_path(base, n).is_dir() {
        existing += 1;
        n += 1;
    }
    (existing, n)
}

/// Offer every image file directly inside `dir` to the catalog.
///
/// Returns the number of new records. A missing directory yields 0.
pub fn scan_directory(catalog: &Catalog, dir: &Path) -> Result<usize, ScanError> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut added = 0;
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !is_image(path) {
            continue;
        }
        let (Some(filename), Some(filepath)) = (entry.file_name().to_str(), path.to_str()) else {
            log::warn!("skipping non UTF-8 file name: {}", path.display());
            continue;
        };
        if catalog.add(filename, filepath)? {
            log::debug!("added {} from {}", filename, dir.display());
            added += 1;
        } else {
            log::trace!("already catalogued: {}", filename);
        }
    }

    Ok(added)
}

/// Scan the primary directory and every contiguous numbered shard.
pub fn scan_all_shards(catalog: &Catalog, base: &Path) -> Result<usize, ScanError> {
    let mut added = scan_directory(catalog, &shard_path(base, 0))?;

    let mut n = 1;
    loop {
        let dir = shard_path(base, n);
        if !dir.is_dir() {
            break;
        }
        added += scan_directory(catalog, &dir)?;
        n += 1;
    }

    if added > 0 {
        log::info!("scan found {} new images under {}*", added, base.display());
    }
    Ok(added)
}

/// Create numbered shard directories until there is room beyond every full
/// shard. The primary directory is counted but never created here.
pub fn ensure_shard_capacity(
    catalog: &Catalog,
    base: &Path,
    max_per_shard: usize,
) -> Result<ShardReport, ScanError> {
    if max_per_shard == 0 {
        return Err(ScanError::InvalidThreshold);
    }

    let (existing, mut next) = count_shards(base);
    let state = ShardState {
        existing_shards: existing,
        total_images: catalog.count()?,
        max_per_shard,
    };

    let mut created = Vec::new();
    for _ in 0..state.missing_shards() {
        let dir = shard_path(base, next);
        next += 1;
        std::fs::create_dir_all(&dir)?;
        log::info!("created shard directory {}", dir.display());
        created.push(dir);
    }

    Ok(ShardReport { created, state })
}
