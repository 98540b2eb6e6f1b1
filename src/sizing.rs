//! Helpers to pick a chart size for an image.
//!
//! All rounding is to the nearest integer with halves rounded up,
//! and a computed side is never smaller than `1`.

/// The default upper bound for [`fit_within`].
pub const DEFAULT_MAX_GRID_SIZE: u32 = 200;

/// Returns `round(value * numerator / denominator)`, clamped to `1..=u32::MAX`.
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let (value, numerator, denominator) =
        (u128::from(value), u128::from(numerator), u128::from(denominator));

    let scaled = (2 * value * numerator + denominator) / (2 * denominator);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Returns a grid size with one cell per image pixel, scaled down if needed
/// so that neither side is larger than `max`.
///
/// If either side exceeds `max`, the larger side becomes `max`
/// and the other keeps the aspect ratio of the image. Otherwise, the size is returned unchanged.
/// Empty images are returned unchanged.
///
/// # Examples
/// ```
/// # use stitchgrid::sizing::{fit_within, DEFAULT_MAX_GRID_SIZE};
/// assert_eq!(fit_within(400, 100, DEFAULT_MAX_GRID_SIZE), (200, 50));
/// assert_eq!(fit_within(120, 80, DEFAULT_MAX_GRID_SIZE), (120, 80));
/// ```
#[must_use]
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    let max = max.max(1);
    if width == 0 || height == 0 || (width <= max && height <= max) {
        (width, height)
    } else if width > height {
        (max, scale(height, max, width))
    } else {
        (scale(width, max, height), max)
    }
}

/// Returns the grid height that keeps the aspect ratio of an image
/// for a grid that is `grid_width` cells wide.
///
/// Returns `None` if the image has zero width or height.
///
/// # Examples
/// ```
/// # use stitchgrid::sizing::aspect_height;
/// assert_eq!(aspect_height(60, 300, 150), Some(30));
/// assert_eq!(aspect_height(60, 0, 150), None);
/// ```
#[must_use]
pub fn aspect_height(grid_width: u32, image_width: u32, image_height: u32) -> Option<u32> {
    if image_width == 0 || image_height == 0 {
        None
    } else {
        Some(scale(grid_width, image_height, image_width))
    }
}
