//! Upload configuration.
//!
//! Handles loading, validating, and merging `closet.toml`. Stock defaults are
//! the base layer; a user file overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [upload]
//! max_size_mb = 2.0          # Photos at or below this size skip compression
//!
//! [compression]
//! max_width = 800            # Bounding box for downsampling
//! max_height = 800
//! quality = 0.8              # Encoder quality, 0 < q <= 1
//! output_format = "jpeg"     # "jpeg" or "webp"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [compression]
//! output_format = "webp"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CompressionConfig, DEFAULT_THRESHOLD_MB};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILE: &str = "closet.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings loaded from `closet.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// When to compress at all.
    pub upload: UploadConfig,
    /// How to compress.
    pub compression: CompressionConfig,
}

impl Settings {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.upload.max_size_mb.is_finite() || self.upload.max_size_mb < 0.0 {
            return Err(ConfigError::Validation(
                "upload.max_size_mb must be a non-negative number".into(),
            ));
        }
        // Quality is clamped into (0, 1] when parsed, only the box can be wrong.
        self.compression
            .validate()
            .map_err(|e| ConfigError::Validation(format!("compression: {e}")))
    }
}

/// Upload threshold settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Photos at or below this many megabytes are sent as-is, provided they
    /// already fit the bounding box.
    pub max_size_mb: f64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_THRESHOLD_MB,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Settings::default()).expect("default config must serialize")
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

/// Parse config text, merge it over the defaults, and validate.
pub fn parse_config(content: &str) -> Result<Settings, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load `closet.toml` from `dir`, falling back to stock defaults when absent.
pub fn load_config(dir: &Path) -> Result<Settings, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(&config_path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `closet.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# closet-kit configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Upload
# ---------------------------------------------------------------------------
[upload]
# Photos at or below this size (megabytes, 1 MB = 1024 * 1024 bytes) are
# uploaded untouched, as long as they already fit the bounding box below.
max_size_mb = 2.0

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# Bounding box in pixels. Larger photos are scaled down to fit, keeping
# their aspect ratio. Smaller photos are never scaled up.
max_width = 800
max_height = 800

# Encoder quality, greater than 0 and at most 1. Applies to JPEG and WebP.
quality = 0.8

# "jpeg" or "webp".
output_format = "jpeg"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::OutputFormat;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.upload.max_size_mb, 2.0);
        assert_eq!(settings.compression, CompressionConfig::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn stock_toml_matches_defaults() {
        let settings = parse_config(stock_config_toml()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_override_keeps_other_keys() {
        let settings = parse_config(
            r#"
            [compression]
            output_format = "webp"
            max_width = 1024
            "#,
        )
        .unwrap();
        assert_eq!(settings.compression.output_format, OutputFormat::Webp);
        assert_eq!(settings.compression.max_width, 1024);
        assert_eq!(settings.compression.max_height, 800);
        assert_eq!(settings.upload.max_size_mb, 2.0);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = parse_config(
            r#"
            [compression]
            max_widht = 10
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_toml_rejected() {
        assert!(matches!(
            parse_config("[compression"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn zero_box_fails_validation() {
        let result = parse_config("[compression]\nmax_height = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn negative_threshold_fails_validation() {
        let result = parse_config("[upload]\nmax_size_mb = -1.0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn merge_nested_tables() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n[b]\nz = 4\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
        assert_eq!(merged["b"]["z"].as_integer(), Some(4));
    }

    #[test]
    fn load_missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), Settings::default());
    }

    #[test]
    fn load_from_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[upload]\nmax_size_mb = 5.0\n[compression]\nquality = 0.6\n",
        )
        .unwrap();

        let settings = load_config(tmp.path()).unwrap();
        assert_eq!(settings.upload.max_size_mb, 5.0);
        assert_eq!(settings.compression.quality.value(), 0.6);
    }
}
