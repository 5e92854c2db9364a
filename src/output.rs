//! CLI output formatting.
//!
//! # Entity Display Contract
//!
//! Every image is shown the same way across commands:
//!
//! 1. **Header line**: 1-based position + filename, with the catalog id
//! 2. **Context lines**: indented `Source:` path, size profiles, cursor marker
//!
//! ```text
//! 001 cat-01.png (#1)
//!     Source: static/images/cat-01.png
//! 002 cat-02.jpg (#2)  ← current
//!     Source: static/images1/cat-02.jpg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions do no I/O.

use crate::scan::ShardReport;
use crate::types::{CurrentImage, GalleryStats, ImageEntry, RefreshSummary, SizeConfig};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn image_header(pos: usize, id: i64, filename: &str) -> String {
    format!("{} {} (#{})", format_index(pos), filename, id)
}

fn size_line(device: &str, size: &SizeConfig) -> String {
    format!(
        "{}: {}x{}, max {:.1} MB",
        device, size.width, size.height, size.max_size_mb
    )
}

// ============================================================================
// list
// ============================================================================

/// Every image in gallery order. `current` marks the cursor by id.
pub fn format_images(images: &[ImageEntry], current: Option<i64>, show_sizes: bool) -> Vec<String> {
    if images.is_empty() {
        return vec!["No images".to_string()];
    }
    let mut lines = Vec::new();
    for (i, image) in images.iter().enumerate() {
        let mut header = image_header(i + 1, image.id, &image.filename);
        if Some(image.id) == current {
            header.push_str("  ← current");
        }
        lines.push(header);
        lines.push(format!("{}Source: {}", indent(1), image.filepath));
        if show_sizes {
            for (device, size) in &image.size_config {
                lines.push(format!("{}{}", indent(1), size_line(device, size)));
            }
        }
    }
    lines
}

pub fn print_images(images: &[ImageEntry], current: Option<i64>, show_sizes: bool) {
    for line in format_images(images, current, show_sizes) {
        println!("{}", line);
    }
}

// ============================================================================
// show
// ============================================================================

pub fn format_current(
    image: Option<&CurrentImage>,
    device: &str,
    stats: &GalleryStats,
) -> Vec<String> {
    let Some(image) = image else {
        return vec!["No image selected".to_string()];
    };
    vec![
        format!(
            "{}/{} {} (#{})",
            format_index(stats.current_position),
            format_index(stats.total_images),
            image.filename,
            image.id
        ),
        format!("{}Source: {}", indent(1), image.filepath),
        format!("{}Added: {}", indent(1), image.created_at.format("%Y-%m-%d %H:%M:%S")),
        format!("{}{}", indent(1), size_line(device, &image.size_config)),
    ]
}

pub fn print_current(image: Option<&CurrentImage>, device: &str, stats: &GalleryStats) {
    for line in format_current(image, device, stats) {
        println!("{}", line);
    }
}

// ============================================================================
// stats / refresh
// ============================================================================

pub fn format_stats(stats: &GalleryStats) -> Vec<String> {
    if !stats.has_images {
        return vec!["Gallery is empty".to_string()];
    }
    vec![
        format!("Images: {}", stats.total_images),
        format!("Position: {} of {}", stats.current_position, stats.total_images),
    ]
}

pub fn print_stats(stats: &GalleryStats) {
    for line in format_stats(stats) {
        println!("{}", line);
    }
}

pub fn format_refresh(summary: &RefreshSummary, shards: Option<&ShardReport>) -> Vec<String> {
    let mut lines = vec![format!(
        "Added {} new image{} ({} total)",
        summary.new_images_added,
        if summary.new_images_added == 1 { "" } else { "s" },
        summary.total_images
    )];
    if let Some(report) = shards {
        for dir in &report.created {
            lines.push(format!("{}Created shard: {}", indent(1), dir.display()));
        }
    }
    lines
}

pub fn print_refresh(summary: &RefreshSummary, shards: Option<&ShardReport>) {
    for line in format_refresh(summary, shards) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::default_device_sizes;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn entry(id: i64, name: &str) -> ImageEntry {
        ImageEntry {
            id,
            filename: name.to_string(),
            filepath: format!("static/images/{name}"),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            size_config: default_device_sizes(),
        }
    }

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn images_list_marks_current() {
        let lines = format_images(&[entry(1, "a.png"), entry(4, "b.png")], Some(4), false);
        assert_eq!(
            lines,
            vec![
                "001 a.png (#1)",
                "    Source: static/images/a.png",
                "002 b.png (#4)  ← current",
                "    Source: static/images/b.png",
            ]
        );
    }

    #[test]
    fn images_list_with_sizes() {
        let lines = format_images(&[entry(1, "a.png")], None, true);
        assert!(lines.contains(&"    mobile: 300x400, max 2.0 MB".to_string()));
        assert!(lines.contains(&"    pc: 800x600, max 5.0 MB".to_string()));
    }

    #[test]
    fn empty_list() {
        assert_eq!(format_images(&[], None, false), vec!["No images"]);
    }

    #[test]
    fn current_shows_position_and_size() {
        let image = CurrentImage {
            id: 2,
            filename: "b.png".into(),
            filepath: "static/images/b.png".into(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            size_config: SizeConfig::mobile(),
        };
        let stats = GalleryStats {
            total_images: 3,
            current_position: 2,
            has_images: true,
        };
        let lines = format_current(Some(&image), "mobile", &stats);
        assert_eq!(lines[0], "002/003 b.png (#2)");
        assert_eq!(lines[2], "    Added: 2024-05-01 12:00:00");
        assert_eq!(lines[3], "    mobile: 300x400, max 2.0 MB");
    }

    #[test]
    fn current_without_selection() {
        let stats = GalleryStats {
            total_images: 0,
            current_position: 0,
            has_images: false,
        };
        assert_eq!(format_current(None, "pc", &stats), vec!["No image selected"]);
    }

    #[test]
    fn refresh_lists_created_shards() {
        let summary = RefreshSummary {
            new_images_added: 1,
            total_images: 31,
            has_images: true,
        };
        let report = ShardReport {
            created: vec![PathBuf::from("static/images1")],
            ..ShardReport::default()
        };
        assert_eq!(
            format_refresh(&summary, Some(&report)),
            vec!["Added 1 new image (31 total)", "    Created shard: static/images1"]
        );
    }

    #[test]
    fn stats_for_empty_gallery() {
        let stats = GalleryStats {
            total_images: 0,
            current_position: 0,
            has_images: false,
        };
        assert_eq!(format_stats(&stats), vec!["Gallery is empty"]);
    }
}
