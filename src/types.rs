//! Result types handed to callers of the gallery.
//!
//! Everything here derives `Serialize` so the web layer can return it as
//! JSON without an intermediate mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Device class every node is guaranteed to carry; unknown classes fall back to it.
pub const FALLBACK_DEVICE: &str = "pc";

/// Display size profile for one device class.
///
/// Missing keys in a config file fall back to the `pc` profile values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeConfig {
    pub width: u32,
    pub height: u32,
    pub max_size_mb: f64,
}

impl SizeConfig {
    pub fn mobile() -> Self {
        Self {
            width: 300,
            height: 400,
            max_size_mb: 2.0,
        }
    }

    pub fn pc() -> Self {
        Self {
            width: 800,
            height: 600,
            max_size_mb: 5.0,
        }
    }
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self::pc()
    }
}

/// Device class → size profile.
pub type DeviceSizes = BTreeMap<String, SizeConfig>;

/// The `mobile` and `pc` profiles every new index node starts with.
pub fn default_device_sizes() -> DeviceSizes {
    BTreeMap::from([
        ("mobile".to_string(), SizeConfig::mobile()),
        (FALLBACK_DEVICE.to_string(), SizeConfig::pc()),
    ])
}

/// The image under the cursor, sized for one device class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentImage {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    pub created_at: DateTime<Utc>,
    pub size_config: SizeConfig,
}

/// One image in gallery order, with every device profile it carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageEntry {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    pub created_at: DateTime<Utc>,
    pub size_config: DeviceSizes,
}

/// Outcome of [`GalleryManager::auto_refresh`](crate::gallery::GalleryManager::auto_refresh).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub new_images_added: usize,
    pub total_images: usize,
    pub has_images: bool,
}

/// Snapshot of the gallery for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GalleryStats {
    pub total_images: usize,
    /// 1-based cursor position, 0 when nothing is selected.
    pub current_position: usize,
    pub has_images: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_device_sizes_seed_mobile_and_pc() {
        let sizes = default_device_sizes();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes["mobile"], SizeConfig::mobile());
        assert_eq!(sizes["pc"].width, 800);
        assert_eq!(sizes["pc"].height, 600);
    }

    #[test]
    fn partial_size_config_falls_back_to_pc_values() {
        let config: SizeConfig = toml::from_str("width = 1024").unwrap();
        assert_eq!(config.width, 1024);
        assert_eq!(config.height, 600);
        assert_eq!(config.max_size_mb, 5.0);
    }

    #[test]
    fn stats_serialize_with_expected_keys() {
        let stats = GalleryStats {
            total_images: 1,
            current_position: 1,
            has_images: true,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"total_images": 1, "current_position": 1, "has_images": true})
        );
    }
}
