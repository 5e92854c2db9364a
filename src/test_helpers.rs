//! Shared test utilities for the gallery test suite.
//!
//! Provides temp-directory fixtures, image file stubs, and assertions that
//! compare the in-memory index against the catalog.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (tmp, mut gallery) = empty_gallery();
//! write_images(&images_dir(tmp.path()), &["a.png", "b.jpg"]);
//! gallery.auto_refresh().unwrap();
//!
//! assert_eq!(filenames(&gallery), vec!["a.png", "b.jpg"]);
//! assert_index_matches_catalog(&gallery);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::catalog::Catalog;
use crate::config::GalleryConfig;
use crate::gallery::GalleryManager;

// =========================================================================
// Fixture setup
// =========================================================================

/// Primary image directory inside a test root.
pub fn images_dir(root: &Path) -> PathBuf {
    root.join("static/images")
}

/// Default config with the database and images rooted at `root`.
pub fn test_config(root: &Path) -> GalleryConfig {
    GalleryConfig {
        database: root.join("images.db"),
        images_dir: images_dir(root),
        ..GalleryConfig::default()
    }
}

/// A gallery over an empty on-disk catalog. The images directory is not
/// created. Keep the `TempDir` alive for the duration of the test.
pub fn empty_gallery() -> (TempDir, GalleryManager) {
    let tmp = TempDir::new().unwrap();
    let gallery = GalleryManager::open(&test_config(tmp.path())).unwrap();
    (tmp, gallery)
}

/// Create `dir` if needed and drop a small stub file for each name.
pub fn write_images(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), b"not really an image").unwrap();
    }
}

/// Insert `n` synthetic records directly into the catalog.
pub fn fill_catalog(catalog: &Catalog, n: usize) {
    for i in 0..n {
        let name = format!("fill-{i:04}.png");
        assert!(catalog.add(&name, &format!("fill/{name}")).unwrap());
    }
}

// =========================================================================
// Extractors
// =========================================================================

/// Catalog filenames in id order.
pub fn catalog_filenames(catalog: &Catalog) -> Vec<String> {
    catalog
        .get_all()
        .unwrap()
        .into_iter()
        .map(|r| r.filename)
        .collect()
}

/// Index filenames head to tail.
pub fn filenames(gallery: &GalleryManager) -> Vec<String> {
    gallery.index().iter().map(|n| n.filename.clone()).collect()
}

// =========================================================================
// Assertions
// =========================================================================

/// The index is well-linked and lists exactly the catalog, in id order.
pub fn assert_index_matches_catalog(gallery: &GalleryManager) {
    if let Err(e) = gallery.index().check_links() {
        panic!("index links broken: {e}\nindex: {}", gallery.index());
    }
    let index: Vec<(i64, String)> = gallery
        .index()
        .iter()
        .map(|n| (n.id, n.filename.clone()))
        .collect();
    let catalog: Vec<(i64, String)> = gallery
        .catalog()
        .get_all()
        .unwrap()
        .into_iter()
        .map(|r| (r.id, r.filename))
        .collect();
    assert_eq!(index, catalog, "index and catalog disagree");
}
