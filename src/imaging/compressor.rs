//! Photo compression for upload.
//!
//! [`ImageCompressor::compress`] turns a user photo into a base64 payload that
//! fits the configured bounding box:
//!
//! ```text
//! bytes ──decode──▶ raster ──fit_within──▶ resample ──encode──▶ base64
//!        (blocking)                         (blocking)
//! ```
//!
//! Decode and resample+encode each run on tokio's blocking pool, so the
//! calling task suspends twice and never stalls the runtime. Every call holds
//! a [`SurfaceGuard`] for its decode target; the guard is dropped on every exit
//! path, including errors and a dropped future, and
//! [`live_surfaces`](ImageCompressor::live_surfaces) reports how many are held.
//!
//! There is no internal retry, cancellation or timeout. Callers wrap the
//! future in `tokio::time::timeout` if they need one and decide themselves
//! whether to fall back to the original bytes.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::fit_within;
use super::params::{CompressionConfig, EncodeParams, OutputFormat};
use super::rust_backend::{RustBackend, sniff_mime_type};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::debug;

/// Size above which callers should compress before uploading, in MB.
pub const DEFAULT_THRESHOLD_MB: f64 = 2.0;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("could not encode image: {0}")]
    Encode(String),
    #[error("invalid compression config: {0}")]
    InvalidConfig(String),
}

impl From<BackendError> for CompressError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode(msg) => CompressError::Decode(msg),
            BackendError::Encode(msg) => CompressError::Encode(msg),
        }
    }
}

/// A user-supplied image, consumed once by the compressor.
#[derive(Debug, Clone)]
pub struct ImageInput {
    data: Arc<[u8]>,
    mime_type: String,
}

impl ImageInput {
    pub fn new(data: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Wrap raw bytes, sniffing the MIME type from the magic bytes.
    pub fn from_bytes(data: impl Into<Arc<[u8]>>) -> Self {
        let data = data.into();
        let mime_type = sniff_mime_type(&data).unwrap_or("application/octet-stream");
        Self {
            data,
            mime_type: mime_type.to_string(),
        }
    }

    /// Read a photo from disk.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(data))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn byte_size(&self) -> u64 {
        self.data.len() as u64
    }

    /// The untouched bytes as base64, for uploads that skip compression.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

/// Encoded upload payload. `base64` carries no `data:` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub base64: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    /// Size of the encoded bytes before base64.
    pub byte_len: usize,
}

impl CompressedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn data_url(&self) -> String {
        crate::payload::create_data_url(&self.base64, self.mime_type())
    }

    /// Decode the payload back to encoded image bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.base64)
    }

    pub fn into_base64(self) -> String {
        self.base64
    }
}

/// Holds one decode target for the lifetime of a compression call.
struct SurfaceGuard {
    live: Arc<AtomicUsize>,
}

impl SurfaceGuard {
    fn acquire(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            live: Arc::clone(live),
        }
    }
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Compresses photos on a pluggable [`ImageBackend`].
pub struct ImageCompressor<B: ImageBackend = RustBackend> {
    backend: Arc<B>,
    surfaces: Arc<AtomicUsize>,
}

impl ImageCompressor<RustBackend> {
    pub fn new() -> Self {
        Self::with_backend(RustBackend::new())
    }
}

impl Default for ImageCompressor<RustBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend> Clone for ImageCompressor<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            surfaces: Arc::clone(&self.surfaces),
        }
    }
}

impl<B: ImageBackend> ImageCompressor<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            surfaces: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Decode targets currently held by in-flight calls.
    pub fn live_surfaces(&self) -> usize {
        self.surfaces.load(Ordering::SeqCst)
    }

    /// Header-only dimension probe.
    pub fn probe(&self, input: &ImageInput) -> Result<Dimensions, CompressError> {
        Ok(self.backend.dimensions(input.bytes())?)
    }

    /// Compress with the stock defaults (800x800, quality 0.8, JPEG).
    pub async fn compress_default(
        &self,
        input: &ImageInput,
    ) -> Result<CompressedImage, CompressError> {
        self.compress(input, &CompressionConfig::default()).await
    }

    /// Decode, fit into the bounding box, re-encode and base64 the result.
    pub async fn compress(
        &self,
        input: &ImageInput,
        config: &CompressionConfig,
    ) -> Result<CompressedImage, CompressError> {
        config.validate().map_err(CompressError::InvalidConfig)?;

        let _surface = SurfaceGuard::acquire(&self.surfaces);

        let backend = Arc::clone(&self.backend);
        let data = Arc::clone(&input.data);
        let raster = tokio::task::spawn_blocking(move || backend.decode(&data))
            .await
            .map_err(|e| CompressError::Decode(format!("decode task aborted: {e}")))??;

        let source = Dimensions::new(raster.width(), raster.height());
        let bounds = Dimensions::new(config.max_width, config.max_height);
        let target = fit_within(source, bounds);
        debug!(
            mime = input.mime_type(),
            bytes = input.byte_size(),
            %source,
            %target,
            "decoded photo"
        );

        let backend = Arc::clone(&self.backend);
        let params = EncodeParams {
            format: config.output_format,
            quality: config.quality,
        };
        let encoded = tokio::task::spawn_blocking(move || {
            let surface = if target == source {
                raster
            } else {
                raster.resize_exact(target.width, target.height, FilterType::Triangle)
            };
            backend.encode(&surface, &params)
        })
        .await
        .map_err(|e| CompressError::Encode(format!("encode task aborted: {e}")))??;

        if encoded.is_empty() {
            return Err(CompressError::Encode("encoder produced no output".into()));
        }

        debug!(
            format = %config.output_format,
            quality = config.quality.value(),
            bytes = encoded.len(),
            "encoded photo"
        );

        Ok(CompressedImage {
            base64: STANDARD.encode(&encoded),
            format: config.output_format,
            width: target.width,
            height: target.height,
            byte_len: encoded.len(),
        })
    }
}

/// Human-readable size, e.g. `"2.50 MB"`.
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

/// Size of the input as [`format_size`] renders it.
pub fn size_info(input: &ImageInput) -> String {
    format_size(input.byte_size())
}

/// True when the input is strictly larger than `threshold_mb` megabytes.
pub fn should_compress(input: &ImageInput, threshold_mb: f64) -> bool {
    exceeds_threshold(input.byte_size(), threshold_mb)
}

pub(crate) fn exceeds_threshold(bytes: u64, threshold_mb: f64) -> bool {
    bytes as f64 > threshold_mb * BYTES_PER_MB
}
