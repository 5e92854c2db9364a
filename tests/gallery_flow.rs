//! End-to-end gallery flows against a real SQLite file and directory tree.
//!
//! Run with: cargo test --test gallery_flow

use shard_gallery::scan::shard_path;
use shard_gallery::types::{GalleryStats, SizeConfig};
use shard_gallery::{Catalog, GalleryConfig, GalleryManager};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config_in(root: &Path) -> GalleryConfig {
    GalleryConfig {
        database: root.join("data/images.db"),
        images_dir: root.join("static/images"),
        ..GalleryConfig::default()
    }
}

fn touch_all(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), b"stub").unwrap();
    }
}

fn names(gallery: &GalleryManager) -> Vec<String> {
    gallery.all_images().into_iter().map(|e| e.filename).collect()
}

#[test]
fn first_upload_becomes_current() {
    let tmp = TempDir::new().unwrap();
    let mut gallery = GalleryManager::open(&config_in(tmp.path())).unwrap();

    assert!(gallery.add_new_image("cat-01.png", "static/images/cat-01.png").unwrap());
    assert_eq!(
        gallery.stats(),
        GalleryStats {
            total_images: 1,
            current_position: 1,
            has_images: true
        }
    );
    let current = gallery.current_image_info("pc").unwrap();
    assert_eq!(current.filename, "cat-01.png");
    assert_eq!(current.size_config, SizeConfig::pc());
}

#[test]
fn browse_two_images() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let mut gallery = GalleryManager::open(&config).unwrap();
    gallery.add_new_image("a.png", "static/images/a.png").unwrap();
    gallery.add_new_image("b.png", "static/images/b.png").unwrap();
    gallery.reload().unwrap();

    assert_eq!(gallery.navigate_next().unwrap().filename, "b.png");
    assert_eq!(gallery.navigate_next().unwrap().filename, "b.png");
    assert_eq!(gallery.navigate_prev().unwrap().filename, "a.png");
    assert_eq!(gallery.stats().current_position, 1);
    assert_eq!(
        gallery.current_image_info("mobile").unwrap().size_config,
        SizeConfig::mobile()
    );
}

#[test]
fn removing_unknown_id_changes_nothing() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let mut gallery = GalleryManager::open(&config).unwrap();
    gallery.add_new_image("a.png", "static/images/a.png").unwrap();

    assert!(!gallery.remove_image(42).unwrap());
    assert_eq!(gallery.stats().total_images, 1);
    assert_eq!(gallery.catalog().count().unwrap(), 1);
}

#[test]
fn refresh_twice_adds_nothing_the_second_time() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    touch_all(&config.images_dir, &["a.jpg", "b.png", "notes.txt"]);
    let mut gallery = GalleryManager::open(&config).unwrap();

    let first = gallery.auto_refresh().unwrap();
    assert_eq!(first.new_images_added, 2);
    assert_eq!(first.total_images, 2);

    let second = gallery.auto_refresh().unwrap();
    assert_eq!(second.new_images_added, 0);
    assert_eq!(second.total_images, 2);
    assert_eq!(names(&gallery), vec!["a.jpg", "b.png"]);
}

#[test]
fn order_follows_ids_after_reopen() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    {
        let mut gallery = GalleryManager::open(&config).unwrap();
        for name in ["z.png", "a.png", "m.png"] {
            gallery.add_new_image(name, &format!("static/images/{name}")).unwrap();
        }
        let a = gallery.index().find_by_filename("a.png").unwrap().id;
        gallery.remove_image(a).unwrap();
        gallery.add_new_image("a.png", "static/images/a.png").unwrap();
    }

    let gallery = GalleryManager::open(&config).unwrap();
    assert_eq!(names(&gallery), vec!["z.png", "m.png", "a.png"]);
    let ids: Vec<i64> = gallery.all_images().iter().map(|e| e.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn thirty_first_image_provisions_a_second_shard() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    assert_eq!(config.max_per_shard, 30);

    let files: Vec<String> = (1..=31).map(|i| format!("img-{i:02}.jpg")).collect();
    let refs: Vec<&str> = files.iter().map(String::as_str).collect();
    touch_all(&config.images_dir, &refs);

    let mut gallery = GalleryManager::open(&config).unwrap();
    let (summary, report) = gallery.refresh_with_report().unwrap();

    assert_eq!(summary.new_images_added, 31);
    assert_eq!(report.state.total_images, 31);
    assert_eq!(report.created, vec![shard_path(&config.images_dir, 1)]);
    assert!(shard_path(&config.images_dir, 1).is_dir());
    assert!(!shard_path(&config.images_dir, 2).exists());
}

#[test]
fn scanning_stops_at_missing_shard() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    touch_all(&config.images_dir, &["a.png"]);
    touch_all(&shard_path(&config.images_dir, 1), &["b.png"]);
    touch_all(&shard_path(&config.images_dir, 3), &["orphan.png"]);

    let mut gallery = GalleryManager::open(&config).unwrap();
    gallery.auto_refresh().unwrap();
    assert_eq!(names(&gallery), vec!["a.png", "b.png"]);
}

#[test]
fn rows_from_another_writer_appear_after_reload() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(tmp.path());
    let mut gallery = GalleryManager::open(&config).unwrap();
    gallery.add_new_image("mine.png", "static/images/mine.png").unwrap();

    let other = Catalog::open(&config.database).unwrap();
    assert!(other.add("theirs.png", "static/images/theirs.png").unwrap());
    assert_eq!(gallery.stats().total_images, 1);

    assert!(gallery.resync().unwrap());
    assert_eq!(names(&gallery), vec!["mine.png", "theirs.png"]);
}
