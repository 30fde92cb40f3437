//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: probe dimensions, decode, and encode. Resampling is plain
//! `image::DynamicImage` work and stays in the compressor.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) on the pure Rust `image`
//! codecs.

use super::params::EncodeParams;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Pixel dimensions of an image or a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// Implementations must be shareable across the blocking pool, hence
/// `Send + Sync + 'static`.
pub trait ImageBackend: Send + Sync + 'static {
    /// Read dimensions from the header without a full decode.
    fn dimensions(&self, data: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode encoded bytes into a raster.
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Encode a raster. An empty buffer counts as a failure.
    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}
