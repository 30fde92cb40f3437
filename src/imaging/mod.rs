//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::ImageReader::into_dimensions` |
//! | **Decode** | `image` crate decoders (JPEG, PNG, WebP, GIF, BMP) |
//! | **Resample** | `DynamicImage::resize_exact` with `Triangle` (bilinear) |
//! | **Encode** | `JpegEncoder` (lossy) / `WebPEncoder` (lossless) |
//! | **Transport** | `base64` standard engine, no `data:` prefix |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for bounding-box math (unit testable)
//! - **Parameters**: Config and encoder settings
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Compressor**: The async pipeline plus size helpers

pub mod backend;
mod calculations;
pub mod compressor;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{fit_within, fits_within, scale_factor};
pub use compressor::{
    CompressError, CompressedImage, DEFAULT_THRESHOLD_MB, ImageCompressor, ImageInput,
    format_size, should_compress, size_info,
};
pub use params::{CompressionConfig, CompressionOptions, EncodeParams, OutputFormat, Quality};
pub use rust_backend::RustBackend;
