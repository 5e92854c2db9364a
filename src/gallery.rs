//! Gallery orchestration: catalog, scanner and index behind one API.
//!
//! [`GalleryManager`] is what the web layer talks to. It owns the
//! [`Catalog`] and the [`NavigableIndex`] and keeps the second a faithful
//! copy of the first:
//!
//! - **Full rebuilds** on [`load`](GalleryManager::load),
//!   [`reload`](GalleryManager::reload) and after a refresh that found new
//!   files. The old index is discarded, never diffed.
//! - **Incremental appends** on [`add_new_image`](GalleryManager::add_new_image).
//!   This is only correct because catalog ids are monotonic, so a fresh
//!   record always belongs at the tail.
//! - **Paired removals** on [`remove_image`](GalleryManager::remove_image):
//!   index first, then the catalog row by filename.
//!
//! Rows written to the catalog by anyone else are invisible until the next
//! `reload`. [`resync`](GalleryManager::resync) reloads only when the index
//! is broken or its size disagrees with the catalog.
//!
//! ## Concurrency
//!
//! Every mutating method takes `&mut self`. Sharing a manager between
//! request handlers means wrapping it in a `Mutex`; a reload observed
//! half-way through by another handler is not something this type guards
//! against on its own.

use crate::catalog::{Catalog, CatalogError, ImageRecord};
use crate::config::GalleryConfig;
use crate::index::NavigableIndex;
use crate::scan::{self, ScanError, ShardReport};
use crate::types::{
    CurrentImage, DeviceSizes, FALLBACK_DEVICE, GalleryStats, ImageEntry, RefreshSummary,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

#[derive(Debug)]
pub struct GalleryManager {
    catalog: Catalog,
    index: NavigableIndex,
    images_dir: PathBuf,
    max_per_shard: usize,
    /// Profiles re-applied to every node after rebuilds and appends.
    device_sizes: DeviceSizes,
}

impl GalleryManager {
    /// Open the catalog named in `config` and load the index from it.
    pub fn open(config: &GalleryConfig) -> Result<Self, GalleryError> {
        let catalog = Catalog::open(&config.database)?;
        Self::new(catalog, config)
    }

    /// Wrap an already open catalog and load the index from it.
    pub fn new(catalog: Catalog, config: &GalleryConfig) -> Result<Self, GalleryError> {
        let mut manager = Self {
            catalog,
            index: NavigableIndex::new(),
            images_dir: config.images_dir.clone(),
            max_per_shard: config.max_per_shard,
            device_sizes: config.devices.clone(),
        };
        manager.load()?;
        Ok(manager)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &NavigableIndex {
        &self.index
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Rebuild the index from the catalog, node by node in id order.
    pub fn load(&mut self) -> Result<(), GalleryError> {
        let records = self.catalog.get_all()?;
        let mut index = NavigableIndex::new();
        for record in &records {
            index.append(
                record.id,
                record.filename.as_str(),
                record.filepath.as_str(),
                record.created_at,
            );
        }
        index.broadcast_device_sizes(&self.device_sizes);
        self.index = index;
        log::info!("gallery index loaded with {} images", self.index.len());
        Ok(())
    }

    /// Discard the index and rebuild it. The only way to pick up catalog
    /// rows written outside this manager.
    pub fn reload(&mut self) -> Result<(), GalleryError> {
        self.load()
    }

    /// Reload if the index is structurally broken or out of step with the
    /// catalog size. Returns whether a reload happened.
    pub fn resync(&mut self) -> Result<bool, GalleryError> {
        let reason = match self.index.check_links() {
            Err(e) => Some(e.to_string()),
            Ok(()) => {
                let catalog_count = self.catalog.count()?;
                (catalog_count != self.index.len() as u64).then(|| {
                    format!(
                        "index has {} images, catalog has {}",
                        self.index.len(),
                        catalog_count
                    )
                })
            }
        };
        match reason {
            Some(reason) => {
                log::warn!("gallery index out of sync ({reason}), reloading");
                self.reload()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Record a file the caller has already placed on disk.
    ///
    /// Returns `false` if the filename or filepath is already catalogued.
    pub fn add_new_image(&mut self, filename: &str, filepath: &str) -> Result<bool, GalleryError> {
        if !self.catalog.add(filename, filepath)? {
            log::debug!("not adding {filename}: already catalogued");
            return Ok(false);
        }
        let Some(record) = self.catalog.get_by_filename(filename)? else {
            return Ok(false);
        };
        self.append_record(&record);
        log::debug!("added image #{} {}", record.id, record.filename);
        Ok(true)
    }

    fn append_record(&mut self, record: &ImageRecord) {
        let node = self.index.append(
            record.id,
            record.filename.as_str(),
            record.filepath.as_str(),
            record.created_at,
        );
        for (device, size) in &self.device_sizes {
            node.set_size(device, *size);
        }
    }

    /// Remove the image with `id` from the index and the catalog.
    ///
    /// Returns `false` without touching the catalog if the index has no such
    /// id, even when the catalog does.
    ///
    /// The node is unlinked before the catalog row is deleted. If the delete
    /// fails the error is returned with the row still catalogued and the
    /// node gone; [`resync`](Self::resync) restores the node once the
    /// catalog is reachable again.
    pub fn remove_image(&mut self, id: i64) -> Result<bool, GalleryError> {
        let Some(filename) = self.index.find_by_id(id).map(|n| n.filename.clone()) else {
            return Ok(false);
        };
        if !self.index.remove_by_id(id) {
            return Ok(false);
        }
        let deleted = self.catalog.delete(&filename)?;
        log::debug!("removed image #{id} {filename} (catalog row deleted: {deleted})");
        Ok(deleted)
    }

    pub fn navigate_next(&mut self) -> Option<CurrentImage> {
        self.index.move_next();
        self.current_image_info(FALLBACK_DEVICE)
    }

    pub fn navigate_prev(&mut self) -> Option<CurrentImage> {
        self.index.move_prev();
        self.current_image_info(FALLBACK_DEVICE)
    }

    pub fn navigate_first(&mut self) -> Option<CurrentImage> {
        self.index.move_first();
        self.current_image_info(FALLBACK_DEVICE)
    }

    pub fn navigate_last(&mut self) -> Option<CurrentImage> {
        self.index.move_last();
        self.current_image_info(FALLBACK_DEVICE)
    }

    pub fn current_image_info(&self, device: &str) -> Option<CurrentImage> {
        self.index.current_for_device(device)
    }

    pub fn all_images(&self) -> Vec<ImageEntry> {
        self.index.all_images()
    }

    pub fn stats(&self) -> GalleryStats {
        GalleryStats {
            total_images: self.index.len(),
            current_position: self.index.current_position(),
            has_images: !self.index.is_empty(),
        }
    }

    /// Apply `configs` to every node now and to every node created later.
    pub fn configure_device_sizes(&mut self, configs: &DeviceSizes) {
        for (device, size) in configs {
            self.device_sizes.insert(device.clone(), *size);
        }
        self.index.broadcast_device_sizes(configs);
    }

    /// Catalog any new files across all shards without touching the index.
    pub fn scan_for_new_images(&self) -> Result<usize, GalleryError> {
        Ok(scan::scan_all_shards(&self.catalog, &self.images_dir)?)
    }

    /// Scan all shards, provision shard capacity, and rebuild the index if
    /// anything new was found.
    pub fn auto_refresh(&mut self) -> Result<RefreshSummary, GalleryError> {
        self.refresh_with_report().map(|(summary, _)| summary)
    }

    /// [`auto_refresh`](Self::auto_refresh), also returning the shard
    /// directories it created.
    pub fn refresh_with_report(&mut self) -> Result<(RefreshSummary, ShardReport), GalleryError> {
        let added = self.scan_for_new_images()?;
        let report =
            scan::ensure_shard_capacity(&self.catalog, &self.images_dir, self.max_per_shard)?;
        if added > 0 {
            self.reload()?;
        }

        let summary = RefreshSummary {
            new_images_added: added,
            total_images: self.index.len(),
            has_images: !self.index.is_empty(),
        };
        log::info!(
            "refresh: {} new, {} total, {} shard directories created",
            summary.new_images_added,
            summary.total_images,
            report.created.len()
        );
        Ok((summary, report))
    }
}
