//! Turn a picked photo into the `image_data` field of a request.
//!
//! Small photos that already fit the bounding box and are already in the
//! configured output format go up untouched. The backend assumes JPEG when no
//! MIME type travels with the payload, so a small PNG is still re-encoded.
//! Everything else is compressed, and if compression fails the original bytes are sent
//! instead so the user never loses the save.

use crate::config::Settings;
use crate::imaging::compressor::exceeds_threshold;
use crate::imaging::{
    CompressError, CompressedImage, Dimensions, ImageBackend, ImageCompressor, ImageInput,
    fits_within,
};
use tracing::{debug, warn};

/// How [`PreparedImage::data`] was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Under the size threshold, inside the box, and already in the output
    /// format; original bytes.
    Passthrough,
    /// Re-encoded by the compressor.
    Compressed { width: u32, height: u32 },
    /// Compression failed; original bytes.
    Fallback { reason: String },
}

/// Base64 payload ready for a request body, without `data:` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub data: String,
    pub mime_type: String,
    pub outcome: Outcome,
}

impl PreparedImage {
    fn original(input: &ImageInput, outcome: Outcome) -> Self {
        Self {
            data: input.to_base64(),
            mime_type: input.mime_type().to_string(),
            outcome,
        }
    }

    fn compressed(image: CompressedImage) -> Self {
        let outcome = Outcome::Compressed {
            width: image.width,
            height: image.height,
        };
        Self {
            mime_type: image.mime_type().to_string(),
            data: image.into_base64(),
            outcome,
        }
    }

    pub fn data_url(&self) -> String {
        crate::payload::create_data_url(&self.data, &self.mime_type)
    }
}

/// Whether the photo can skip compression entirely.
fn can_pass_through<B: ImageBackend>(
    compressor: &ImageCompressor<B>,
    input: &ImageInput,
    settings: &Settings,
) -> bool {
    if exceeds_threshold(input.byte_size(), settings.upload.max_size_mb) {
        return false;
    }
    let target = settings.compression.output_format.mime_type();
    if !input.mime_type().eq_ignore_ascii_case(target) {
        return false;
    }
    let bounds = Dimensions::new(
        settings.compression.max_width,
        settings.compression.max_height,
    );
    match compressor.probe(input) {
        Ok(dims) => fits_within(dims, bounds),
        // Let the full decode report the problem.
        Err(_) => false,
    }
}

/// Produce the `image_data` payload for `input`.
pub async fn prepare_image_data<B: ImageBackend>(
    compressor: &ImageCompressor<B>,
    input: &ImageInput,
    settings: &Settings,
) -> PreparedImage {
    if can_pass_through(compressor, input, settings) {
        debug!(bytes = input.byte_size(), "photo small enough, uploading as-is");
        return PreparedImage::original(input, Outcome::Passthrough);
    }

    match compressor.compress(input, &settings.compression).await {
        Ok(image) => PreparedImage::compressed(image),
        Err(err) => {
            warn!(error = %err, "compression failed, uploading original photo");
            PreparedImage::original(
                input,
                Outcome::Fallback {
                    reason: err.to_string(),
                },
            )
        }
    }
}

/// Like [`prepare_image_data`] but surfaces compression errors instead of
/// falling back, for callers that would rather abort the upload.
pub async fn prepare_image_data_strict<B: ImageBackend>(
    compressor: &ImageCompressor<B>,
    input: &ImageInput,
    settings: &Settings,
) -> Result<PreparedImage, CompressError> {
    if can_pass_through(compressor, input, settings) {
        return Ok(PreparedImage::original(input, Outcome::Passthrough));
    }
    let image = compressor.compress(input, &settings.compression).await?;
    Ok(PreparedImage::compressed(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn mock_input(len: usize) -> ImageInput {
        ImageInput::new(vec![7u8; len], "image/jpeg")
    }

    #[tokio::test]
    async fn small_photo_inside_box_passes_through() {
        let compressor =
            ImageCompressor::with_backend(MockBackend::with_dimensions(vec![Dimensions::new(
                640, 480,
            )]));
        let input = mock_input(1024);

        let prepared = prepare_image_data(&compressor, &input, &Settings::default()).await;

        assert_eq!(prepared.outcome, Outcome::Passthrough);
        assert_eq!(prepared.mime_type, "image/jpeg");
        assert_eq!(STANDARD.decode(&prepared.data).unwrap(), input.bytes());
        assert_eq!(
            compressor.backend().get_operations(),
            vec![RecordedOp::Dimensions(1024)]
        );
    }

    #[tokio::test]
    async fn small_photo_outside_box_is_compressed() {
        let compressor =
            ImageCompressor::with_backend(MockBackend::with_dimensions(vec![Dimensions::new(
                1600, 1200,
            )]));

        let prepared =
            prepare_image_data(&compressor, &mock_input(1024), &Settings::default()).await;

        assert_eq!(
            prepared.outcome,
            Outcome::Compressed {
                width: 800,
                height: 600,
            }
        );
        assert_eq!(prepared.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn small_photo_in_other_format_is_reencoded() {
        let compressor =
            ImageCompressor::with_backend(MockBackend::with_dimensions(vec![Dimensions::new(
                320, 240,
            )]));
        let input = ImageInput::new(vec![7u8; 1024], "image/png");

        let prepared = prepare_image_data(&compressor, &input, &Settings::default()).await;

        assert_eq!(
            prepared.outcome,
            Outcome::Compressed {
                width: 320,
                height: 240,
            }
        );
        assert_eq!(prepared.mime_type, "image/jpeg");
        assert!(
            !compressor
                .backend()
                .get_operations()
                .contains(&RecordedOp::Dimensions(1024))
        );
    }

    #[tokio::test]
    async fn small_webp_passes_through_when_webp_is_configured() {
        let compressor =
            ImageCompressor::with_backend(MockBackend::with_dimensions(vec![Dimensions::new(
                320, 240,
            )]));
        let input = ImageInput::new(vec![7u8; 1024], "image/webp");
        let mut settings = Settings::default();
        settings.compression.output_format = crate::imaging::OutputFormat::Webp;

        let prepared = prepare_image_data(&compressor, &input, &settings).await;

        assert_eq!(prepared.outcome, Outcome::Passthrough);
        assert_eq!(prepared.mime_type, "image/webp");
    }

    #[tokio::test]
    async fn large_photo_skips_probe() {
        let compressor =
            ImageCompressor::with_backend(MockBackend::with_dimensions(vec![Dimensions::new(
                400, 300,
            )]));

        let prepared =
            prepare_image_data(&compressor, &mock_input(3 * 1024 * 1024), &Settings::default())
                .await;

        assert!(matches!(prepared.outcome, Outcome::Compressed { .. }));
        let ops = compressor.backend().get_operations();
        assert!(matches!(ops[0], RecordedOp::Decode(_)));
    }

    #[tokio::test]
    async fn failed_compression_falls_back_to_original() {
        let compressor = ImageCompressor::with_backend(MockBackend::failing_encode(vec![
            Dimensions::new(2000, 2000),
        ]));
        let input = mock_input(3 * 1024 * 1024);

        let prepared = prepare_image_data(&compressor, &input, &Settings::default()).await;

        assert!(matches!(prepared.outcome, Outcome::Fallback { .. }));
        assert_eq!(prepared.data, input.to_base64());
        assert_eq!(compressor.live_surfaces(), 0);
    }

    #[tokio::test]
    async fn strict_mode_surfaces_errors() {
        let compressor = ImageCompressor::with_backend(MockBackend::failing_encode(vec![
            Dimensions::new(2000, 2000),
        ]));

        let result =
            prepare_image_data_strict(&compressor, &mock_input(10), &Settings::default()).await;
        assert!(matches!(result, Err(CompressError::Encode(_))));
    }

    #[tokio::test]
    async fn undecodable_small_input_falls_back() {
        let compressor = ImageCompressor::new();
        let input = ImageInput::new(b"garbage".to_vec(), "image/jpeg");

        let prepared = prepare_image_data(&compressor, &input, &Settings::default()).await;

        match prepared.outcome {
            Outcome::Fallback { reason } => assert!(reason.contains("decode")),
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn data_url_uses_payload_mime() {
        let prepared = PreparedImage {
            data: "QUJD".into(),
            mime_type: "image/webp".into(),
            outcome: Outcome::Passthrough,
        };
        assert_eq!(prepared.data_url(), "data:image/webp;base64,QUJD");
    }
}
