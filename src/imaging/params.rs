//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`compressor`](super::compressor) (which decides the
//! target size and format) and the [`backend`](super::backend) (which does the
//! actual pixel work). Swapping the backend for a mock leaves the compression
//! logic untouched.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality in (0, 1], default 0.8. Clamped on construction.
//! - [`OutputFormat`] — `jpeg` or `webp`.
//! - [`CompressionConfig`] — Bounding box, quality and format for one call.
//! - [`CompressionOptions`] — Sparse form of the config; missing fields fall back one by one.
//! - [`EncodeParams`] — What the backend needs to encode a resampled raster.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest quality we hand to an encoder. Zero would mean "no image".
const MIN_QUALITY: f32 = 0.01;

/// Quality setting for lossy image encoding, as a fraction in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        Self(value.clamp(MIN_QUALITY, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale encoders take.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.8)
    }
}

impl From<f32> for Quality {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpeg => f.write_str("jpeg"),
            OutputFormat::Webp => f.write_str("webp"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(format!("unsupported output format '{other}' (expected jpeg or webp)")),
        }
    }
}

/// Settings for a single compression call.
///
/// Deserializes from any subset of its fields; the rest take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// Bounding box width in pixels.
    pub max_width: u32,
    /// Bounding box height in pixels.
    pub max_height: u32,
    /// Encoder quality in (0, 1], for both JPEG and WebP.
    pub quality: Quality,
    pub output_format: OutputFormat,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 800,
            quality: Quality::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl CompressionConfig {
    /// A bounding box needs two non-zero sides.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(format!(
                "bounding box must be non-zero, got {}x{}",
                self.max_width, self.max_height
            ));
        }
        Ok(())
    }
}

/// Sparse compression settings, e.g. from CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompressionOptions {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub quality: Option<f32>,
    pub output_format: Option<OutputFormat>,
}

impl CompressionOptions {
    /// Fill missing fields from the stock defaults.
    pub fn resolve(self) -> CompressionConfig {
        self.resolve_over(CompressionConfig::default())
    }

    /// Fill missing fields from `base`, field by field.
    pub fn resolve_over(self, base: CompressionConfig) -> CompressionConfig {
        CompressionConfig {
            max_width: self.max_width.unwrap_or(base.max_width),
            max_height: self.max_height.unwrap_or(base.max_height),
            quality: self.quality.map(Quality::new).unwrap_or(base.quality),
            output_format: self.output_format.unwrap_or(base.output_format),
        }
    }
}

/// Parameters for encoding an already-resampled raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub quality: Quality,
}
