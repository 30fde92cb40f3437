//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary. WebP encoding goes
//! through libwebp (vendored by the `webp` crate) because the `image` crate
//! only writes lossless WebP.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe (JPEG, PNG, WebP, GIF, BMP) | `image::ImageReader::into_dimensions` |
//! | Decode | `image::ImageReader::decode` with sniffed format |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → WebP | `webp::Encoder::encode_simple` (lossy, quality 1–100) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeParams, OutputFormat};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use std::io::Cursor;
use webp::Encoder as LibWebpEncoder;

/// Formats whose decoders are compiled in.
const INPUT_CANDIDATES: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
    ImageFormat::Bmp,
];

/// MIME types this backend can decode.
pub fn supported_input_mime_types() -> Vec<&'static str> {
    INPUT_CANDIDATES
        .iter()
        .filter(|fmt| fmt.reading_enabled())
        .map(|fmt| fmt.to_mime_type())
        .collect()
}

/// Guess a MIME type from the leading magic bytes.
pub fn sniff_mime_type(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data).ok().map(|fmt| fmt.to_mime_type())
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    if data.is_empty() {
        return Err(BackendError::Decode("input is empty".into()));
    }
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(format!("Failed to sniff format: {e}")))
}

/// JPEG has no alpha channel, so the raster is flattened to RGB first.
fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

/// Lossy VP8 at `quality`. Alpha is kept when the source has it.
fn encode_webp(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let quality = f32::from(quality);
    let encoded = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        LibWebpEncoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
            .encode_simple(false, quality)
    } else {
        let rgb = image.to_rgb8();
        LibWebpEncoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
            .encode_simple(false, quality)
    };
    let encoded =
        encoded.map_err(|e| BackendError::Encode(format!("WebP encode failed: {e:?}")))?;
    Ok(encoded.to_vec())
}

impl ImageBackend for RustBackend {
    fn dimensions(&self, data: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(data)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {e}")))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError> {
        let reader = reader(data)?;
        if reader.format().is_none() {
            return Err(BackendError::Decode("unrecognized image format".into()));
        }
        reader
            .decode()
            .map_err(|e| BackendError::Decode(format!("Failed to decode: {e}")))
    }

    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(BackendError::Encode("surface has zero area".into()));
        }
        let bytes = match params.format {
            OutputFormat::Jpeg => encode_jpeg(image, params.quality.percent())?,
            OutputFormat::Webp => encode_webp(image, params.quality.percent())?,
        };
        if bytes.is_empty() {
            return Err(BackendError::Encode("encoder produced no output".into()));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    /// Encode a gradient as PNG bytes.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn jpeg_params(quality: f32) -> EncodeParams {
        EncodeParams {
            format: OutputFormat::Jpeg,
            quality: Quality::new(quality),
        }
    }

    fn webp_params(quality: f32) -> EncodeParams {
        EncodeParams {
            format: OutputFormat::Webp,
            quality: Quality::new(quality),
        }
    }

    /// Per-pixel noise so lossy encoders have detail to throw away.
    fn noisy(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let n = (x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)) % 251;
            Rgb([n as u8, (x % 256) as u8, ((n + y) % 256) as u8])
        }))
    }

    #[test]
    fn supported_mime_types_cover_phone_formats() {
        let types = supported_input_mime_types();
        for expected in &["image/jpeg", "image/png", "image/webp"] {
            assert!(types.contains(expected), "expected {expected} in {types:?}");
        }
    }

    #[test]
    fn sniff_png_and_garbage() {
        assert_eq!(sniff_mime_type(&png_bytes(4, 4)), Some("image/png"));
        assert_eq!(sniff_mime_type(b"definitely not an image"), None);
    }

    #[test]
    fn dimensions_from_header() {
        let backend = RustBackend::new();
        let dims = backend.dimensions(&png_bytes(200, 150)).unwrap();
        assert_eq!(dims, Dimensions::new(200, 150));
    }

    #[test]
    fn decode_synthetic_png() {
        let backend = RustBackend::new();
        let img = backend.decode(&png_bytes(64, 48)).unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[test]
    fn decode_empty_input_errors() {
        let backend = RustBackend::new();
        assert!(matches!(backend.decode(&[]), Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_garbage_errors() {
        let backend = RustBackend::new();
        let result = backend.decode(b"\x00\x01\x02 this is not an image");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_truncated_png_errors() {
        let backend = RustBackend::new();
        let mut bytes = png_bytes(64, 64);
        bytes.truncate(40);
        assert!(matches!(backend.decode(&bytes), Err(BackendError::Decode(_))));
    }

    #[test]
    fn encode_jpeg_roundtrip_dimensions() {
        let backend = RustBackend::new();
        let img = backend.decode(&png_bytes(120, 80)).unwrap();
        let bytes = backend.encode(&img, &jpeg_params(0.8)).unwrap();

        assert_eq!(sniff_mime_type(&bytes), Some("image/jpeg"));
        assert_eq!(backend.dimensions(&bytes).unwrap(), Dimensions::new(120, 80));
    }

    #[test]
    fn encode_jpeg_lower_quality_is_smaller() {
        let backend = RustBackend::new();
        let img = backend.decode(&png_bytes(256, 256)).unwrap();
        let high = backend.encode(&img, &jpeg_params(0.95)).unwrap();
        let low = backend.encode(&img, &jpeg_params(0.2)).unwrap();
        assert!(low.len() < high.len(), "{} !< {}", low.len(), high.len());
    }

    #[test]
    fn encode_jpeg_flattens_alpha() {
        let backend = RustBackend::new();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 0])));
        let bytes = backend.encode(&img, &jpeg_params(0.8)).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn encode_webp_output() {
        let backend = RustBackend::new();
        let img = backend.decode(&png_bytes(32, 16)).unwrap();
        let bytes = backend.encode(&img, &webp_params(0.8)).unwrap();
        assert_eq!(sniff_mime_type(&bytes), Some("image/webp"));
        assert_eq!(backend.dimensions(&bytes).unwrap(), Dimensions::new(32, 16));
    }

    #[test]
    fn encode_webp_quality_controls_size() {
        let backend = RustBackend::new();
        let img = noisy(256, 256);
        let low = backend.encode(&img, &webp_params(0.3)).unwrap();
        let high = backend.encode(&img, &webp_params(0.9)).unwrap();
        assert!(low.len() < high.len(), "{} !< {}", low.len(), high.len());
    }

    #[test]
    fn encode_webp_keeps_alpha_sources_decodable() {
        let backend = RustBackend::new();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(24, 12, Rgba([0, 128, 255, 90])));
        let bytes = backend.encode(&img, &webp_params(0.8)).unwrap();
        assert_eq!(backend.decode(&bytes).unwrap().width(), 24);
    }

    #[test]
    fn encode_zero_area_errors() {
        let backend = RustBackend::new();
        let img = DynamicImage::new_rgb8(0, 0);
        assert!(matches!(
            backend.encode(&img, &jpeg_params(0.8)),
            Err(BackendError::Encode(_))
        ));
    }
}
