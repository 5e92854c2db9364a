//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `gallery.toml`. Stock defaults
//! are serialized to a TOML table and the user's file is merged on top, so a
//! config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! database = "images.db"        # SQLite catalog file
//! images_dir = "static/images"  # Primary shard; numbered shards sit next to it
//! max_per_shard = 30            # Files per shard before a new one is provisioned
//!
//! [devices.mobile]
//! width = 300
//! height = 400
//! max_size_mb = 2.0
//!
//! [devices.pc]
//! width = 800
//! height = 600
//! max_size_mb = 5.0
//! ```
//!
//! ## Partial Configuration
//!
//! Device tables merge key by key. This adds a `tablet` class and widens
//! `pc` while keeping its stock height and size limit:
//!
//! ```toml
//! [devices.tablet]
//! width = 500
//! height = 400
//! max_size_mb = 3.0
//!
//! [devices.pc]
//! width = 1000
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::{DeviceSizes, FALLBACK_DEVICE, default_device_sizes};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default file name looked up by the CLI.
pub const CONFIG_FILENAME: &str = "gallery.toml";

/// Gallery configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// SQLite catalog file.
    pub database: PathBuf,
    /// Primary shard directory. Numbered shards append `1`, `2`, … to its name.
    pub images_dir: PathBuf,
    /// Files per shard directory before the next one is provisioned.
    pub max_per_shard: usize,
    /// Size profiles applied to every image in the index.
    pub devices: DeviceSizes,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("images.db"),
            images_dir: PathBuf::from("static/images"),
            max_per_shard: 30,
            devices: default_device_sizes(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_per_shard == 0 {
            return Err(ConfigError::Validation(
                "max_per_shard must be at least 1".into(),
            ));
        }
        if !self.devices.contains_key(FALLBACK_DEVICE) {
            return Err(ConfigError::Validation(format!(
                "devices.{FALLBACK_DEVICE} is required as the fallback profile"
            )));
        }
        for (name, size) in &self.devices {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "devices.{name} width and height must be non-zero"
                )));
            }
            if !(size.max_size_mb.is_finite() && size.max_size_mb > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "devices.{name}.max_size_mb must be positive"
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load the config file at `path` merged over stock defaults.
///
/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(path)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Gallery Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# SQLite catalog file. Created on first use.
database = "images.db"

# Primary image directory. Numbered shards are siblings that append a
# number to its name: static/images1, static/images2, ...
# Scanning stops at the first missing number.
images_dir = "static/images"

# Files per shard directory. Once every existing shard is full, the next
# numbered directory is created during refresh. Files are never moved.
max_per_shard = 30

# ---------------------------------------------------------------------------
# Device size profiles
# ---------------------------------------------------------------------------
# Every image carries one profile per device class. Requests for an unknown
# class use the "pc" profile, so "pc" must always be present.
[devices.mobile]
width = 300
height = 400
max_size_mb = 2.0

[devices.pc]
width = 800
height = 600
max_size_mb = 5.0

# Add more classes as needed:
# [devices.tablet]
# width = 500
# height = 400
# max_size_mb = 3.0
"##
}
