//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability; [`print_lines`] writes them out. Format functions are pure.
//!
//! Human-readable reports go to stderr so that stdout carries only the
//! payload (base64 or a data URL) and can be piped.
//!
//! ```text
//! photo.jpg
//!     Source: 4.21 MB image/jpeg 4032x3024
//!     Output: 0.09 MB image/jpeg 800x600 (quality 0.80)
//!     Saved: 97.9%
//! ```

use crate::imaging::{CompressedImage, Dimensions, format_size};
use crate::rating::{AI_MAX, AI_MIN, UI_MAX, UI_MIN};
use crate::upload::{Outcome, PreparedImage};

/// Percentage saved going from `before` to `after` bytes.
fn savings_percent(before: u64, after: u64) -> f64 {
    if before == 0 {
        return 0.0;
    }
    (1.0 - after as f64 / before as f64) * 100.0
}

/// Source line shared by `size` and `compress`.
fn source_line(bytes: u64, mime_type: &str, dims: Option<Dimensions>) -> String {
    match dims {
        Some(d) => format!("    Source: {} {} {}", format_size(bytes), mime_type, d),
        None => format!("    Source: {} {}", format_size(bytes), mime_type),
    }
}

/// Report for `closet-kit size`.
pub fn format_size_report(
    label: &str,
    bytes: u64,
    mime_type: &str,
    dims: Option<Dimensions>,
    threshold_mb: f64,
    compress: bool,
) -> Vec<String> {
    let verdict = if compress {
        format!("    Over {threshold_mb} MB: will compress")
    } else {
        format!("    At or under {threshold_mb} MB: upload as-is if within bounds")
    };
    vec![
        label.to_string(),
        source_line(bytes, mime_type, dims),
        verdict,
    ]
}

/// Report for `closet-kit compress` when compression ran.
pub fn format_compress_report(
    label: &str,
    source_bytes: u64,
    source_mime: &str,
    image: &CompressedImage,
    quality: f32,
) -> Vec<String> {
    vec![
        label.to_string(),
        source_line(source_bytes, source_mime, None),
        format!(
            "    Output: {} {} {} (quality {:.2})",
            format_size(image.byte_len as u64),
            image.mime_type(),
            image.dimensions(),
            quality
        ),
        format!(
            "    Saved: {:.1}%",
            savings_percent(source_bytes, image.byte_len as u64)
        ),
    ]
}

/// Report for `closet-kit compress --auto`.
pub fn format_prepared_report(
    label: &str,
    source_bytes: u64,
    source_mime: &str,
    prepared: &PreparedImage,
) -> Vec<String> {
    let status = match &prepared.outcome {
        Outcome::Passthrough => {
            "    Upload: original (under threshold, within bounds, same format)".to_string()
        }
        Outcome::Compressed { width, height } => {
            format!("    Upload: compressed to {width}x{height} {}", prepared.mime_type)
        }
        Outcome::Fallback { reason } => {
            format!("    Upload: original (compression failed: {reason})")
        }
    };
    vec![
        label.to_string(),
        source_line(source_bytes, source_mime, None),
        status,
    ]
}

/// Which scale a rating is converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTarget {
    Ui,
    Ai,
}

/// Conversion result, noting when the input was clamped.
pub fn format_rating(target: RatingTarget, input: i32, output: i32) -> Vec<String> {
    let (lo, hi) = match target {
        RatingTarget::Ui => (AI_MIN, AI_MAX),
        RatingTarget::Ai => (UI_MIN, UI_MAX),
    };
    let mut lines = vec![format!("{input} → {output}")];
    if !(lo..=hi).contains(&input) {
        lines.push(format!("    (input outside [{lo}, {hi}], clamped)"));
    }
    lines
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::OutputFormat;

    #[test]
    fn savings_handles_empty_source() {
        assert_eq!(savings_percent(0, 10), 0.0);
        assert_eq!(savings_percent(200, 50), 75.0);
    }

    #[test]
    fn size_report_over_threshold() {
        let lines = format_size_report(
            "photo.jpg",
            3 * 1024 * 1024,
            "image/jpeg",
            Some(Dimensions::new(4032, 3024)),
            2.0,
            true,
        );
        assert_eq!(
            lines,
            vec![
                "photo.jpg",
                "    Source: 3.00 MB image/jpeg 4032x3024",
                "    Over 2 MB: will compress",
            ]
        );
    }

    #[test]
    fn size_report_without_dimensions() {
        let lines = format_size_report(
            "x.bin",
            1024 * 1024,
            "application/octet-stream",
            None,
            2.5,
            false,
        );
        assert_eq!(lines[1], "    Source: 1.00 MB application/octet-stream");
        assert_eq!(lines[2], "    At or under 2.5 MB: upload as-is if within bounds");
    }

    #[test]
    fn compress_report_lines() {
        let image = CompressedImage {
            base64: String::new(),
            format: OutputFormat::Jpeg,
            width: 800,
            height: 600,
            byte_len: 1024 * 1024,
        };
        let lines =
            format_compress_report("photo.jpg", 4 * 1024 * 1024, "image/jpeg", &image, 0.8);
        assert_eq!(
            lines[2],
            "    Output: 1.00 MB image/jpeg 800x600 (quality 0.80)"
        );
        assert_eq!(lines[3], "    Saved: 75.0%");
    }

    #[test]
    fn prepared_report_fallback() {
        let prepared = PreparedImage {
            data: String::new(),
            mime_type: "image/png".into(),
            outcome: Outcome::Fallback {
                reason: "boom".into(),
            },
        };
        let lines = format_prepared_report("a.png", 10, "image/png", &prepared);
        assert_eq!(lines[2], "    Upload: original (compression failed: boom)");
    }

    #[test]
    fn rating_lines_flag_clamping() {
        assert_eq!(format_rating(RatingTarget::Ui, 0, 3), vec!["0 → 3"]);
        let clamped = format_rating(RatingTarget::Ai, 9, 2);
        assert_eq!(clamped.len(), 2);
        assert!(clamped[1].contains("[1, 5]"));
    }
}
