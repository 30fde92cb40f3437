//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;

/// Scale factor that fits `source` inside `bounds`, never above 1.
///
/// # Examples
/// ```
/// # use closet_kit::imaging::{Dimensions, scale_factor};
/// let r = scale_factor(
///     Dimensions { width: 1600, height: 1200 },
///     Dimensions { width: 800, height: 800 },
/// );
/// assert_eq!(r, 0.5);
/// ```
pub fn scale_factor(source: Dimensions, bounds: Dimensions) -> f64 {
    if source.width == 0 || source.height == 0 {
        return 1.0;
    }
    let rx = bounds.width as f64 / source.width as f64;
    let ry = bounds.height as f64 / source.height as f64;
    rx.min(ry).min(1.0)
}

/// Dimensions of `source` scaled to fit within `bounds`, preserving aspect ratio.
///
/// Images already inside the box keep their size. Each side is rounded to the
/// nearest pixel and kept at least 1px so extreme panoramas stay encodable.
///
/// # Examples
/// ```
/// # use closet_kit::imaging::{Dimensions, fit_within};
/// // 4000x3000 phone photo into 800x800 → 800x600
/// let fitted = fit_within(
///     Dimensions { width: 4000, height: 3000 },
///     Dimensions { width: 800, height: 800 },
/// );
/// assert_eq!(fitted, Dimensions { width: 800, height: 600 });
/// ```
pub fn fit_within(source: Dimensions, bounds: Dimensions) -> Dimensions {
    let r = scale_factor(source, bounds);
    if r >= 1.0 {
        return source;
    }

    Dimensions {
        width: ((source.width as f64 * r).round() as u32).max(1),
        height: ((source.height as f64 * r).round() as u32).max(1),
    }
}

/// Whether `source` already fits inside `bounds`.
pub fn fits_within(source: Dimensions, bounds: Dimensions) -> bool {
    source.width <= bounds.width && source.height <= bounds.height
}
