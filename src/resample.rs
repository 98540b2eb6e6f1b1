//! Area-average (box filter) resampling of an image to one sample per chart cell.
//!
//! Each output cell covers an equally sized rectangle of the source image,
//! and every source pixel contributes to a cell in proportion to how much of it
//! lies inside that rectangle. Color is additionally weighted by alpha. Overlaps are measured in integer units of
//! `1 / target` source pixels, so the weights are exact: resampling an image to its
//! own size returns it unchanged, and the single- and multi-threaded versions agree.
//!
//! Upscaling uses the same rule. Every output cell then lies inside one or two
//! source pixels, which amounts to box sampling with blended seams.

use crate::{InvalidInput, PixelSource};
use palette::{cast, Srgba};

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The source pixels that overlap one output cell along a single axis.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Span {
    /// The index of the first overlapping source pixel.
    start: u32,
    /// The overlap of each source pixel, starting at `start`.
    weights: Vec<u64>,
}

/// Computes the [`Span`] of every output cell along an axis of `source` pixels
/// divided into `target` cells.
///
/// The weights of each span sum to `source`.
fn spans(source: u32, target: u32) -> Vec<Span> {
    let (source, target) = (u64::from(source), u64::from(target));
    (0..target)
        .map(|i| {
            let lo = i * source;
            let hi = (i + 1) * source;
            let first = lo / target;
            let last = hi.div_ceil(target);
            let weights = (first..last)
                .map(|j| hi.min((j + 1) * target) - lo.max(j * target))
                .collect();

            #[allow(clippy::cast_possible_truncation)]
            let start = first as u32;
            Span { start, weights }
        })
        .collect()
}

/// Checks that both the image and the requested grid have a non-zero area.
fn validate(image: &impl PixelSource, width: u32, height: u32) -> Result<(), InvalidInput> {
    if image.is_empty() {
        Err(InvalidInput::EmptyImage { width: image.width(), height: image.height() })
    } else if width == 0 || height == 0 {
        Err(InvalidInput::ZeroGridSize { width, height })
    } else {
        Ok(())
    }
}

/// Returns `sum / divisor` rounded half up.
#[inline]
fn round_div(sum: u64, divisor: u64) -> u8 {
    #[allow(clippy::cast_possible_truncation)]
    {
        ((sum + divisor / 2) / divisor) as u8
    }
}

/// Computes one row of output samples.
fn resample_row<'a>(
    image: &'a impl PixelSource,
    columns: &'a [Span],
    row: &Span,
    total: u64,
) -> impl Iterator<Item = Srgba<u8>> + 'a {
    let row = row.clone();
    columns.iter().map(move |column| {
        let mut color = [0u64; 3];
        let mut plain = [0u64; 3];
        let mut alpha = 0u64;
        for (y, &wy) in (row.start..).zip(&row.weights) {
            for (x, &wx) in (column.start..).zip(&column.weights) {
                let weight = wx * wy;
                let [r, g, b, a]: [u8; 4] = cast::into_array(image.pixel(x, y));
                let opacity = weight * u64::from(a);
                for ((c, p), v) in color.iter_mut().zip(&mut plain).zip([r, g, b]) {
                    *c += opacity * u64::from(v);
                    *p += weight * u64::from(v);
                }
                alpha += opacity;
            }
        }

        // fully transparent cells fall back to the area average
        let [r, g, b] = if alpha == 0 {
            plain.map(|s| round_div(s, total))
        } else {
            color.map(|s| round_div(s, alpha))
        };

        Srgba::new(r, g, b, round_div(alpha, total))
    })
}

/// Resamples `image` to exactly `width * height` samples, one per grid cell, in row-major order.
///
/// The alpha of each sample is the area-weighted average alpha of the source pixels
/// covered by its cell. The color is weighted by both area and alpha,
/// so transparent pixels do not tint their opaque neighbors.
/// A cell without any opacity gets the area-weighted average color instead.
/// All values are rounded to the nearest integer.
///
/// # Errors
/// Returns [`InvalidInput::EmptyImage`] if `image` has zero width or height,
/// or [`InvalidInput::ZeroGridSize`] if `width` or `height` is zero.
///
/// # Examples
/// ```
/// # use stitchgrid::{resample::resample, PixelSlice, InvalidInput};
/// # use palette::Srgba;
/// # fn main() -> Result<(), InvalidInput> {
/// let pixels = [
///     Srgba::new(0, 0, 0, 255),
///     Srgba::new(200, 100, 50, 255),
/// ];
/// let image = PixelSlice::new(&pixels, 2, 1)?;
/// assert_eq!(resample(&image, 1, 1)?, vec![Srgba::new(100, 50, 25, 255)]);
/// # Ok(())
/// # }
/// ```
pub fn resample(
    image: &impl PixelSource,
    width: u32,
    height: u32,
) -> Result<Vec<Srgba<u8>>, InvalidInput> {
    validate(image, width, height)?;

    let columns = spans(image.width(), width);
    let rows = spans(image.height(), height);
    let total = u64::from(image.width()) * u64::from(image.height());

    let samples = rows
        .iter()
        .flat_map(|row| resample_row(image, &columns, row, total))
        .collect::<Vec<_>>();

    log::trace!(
        "resampled {}x{} image to {width}x{height} cells",
        image.width(),
        image.height()
    );

    Ok(samples)
}

/// Resamples `image` in parallel to exactly `width * height` samples.
///
/// The output is identical to [`resample`].
///
/// # Errors
/// Returns [`InvalidInput::EmptyImage`] if `image` has zero width or height,
/// or [`InvalidInput::ZeroGridSize`] if `width` or `height` is zero.
#[cfg(feature = "threads")]
pub fn resample_par(
    image: &(impl PixelSource + Sync),
    width: u32,
    height: u32,
) -> Result<Vec<Srgba<u8>>, InvalidInput> {
    validate(image, width, height)?;

    let columns = spans(image.width(), width);
    let rows = spans(image.height(), height);
    let total = u64::from(image.width()) * u64::from(image.height());

    let samples = rows
        .par_iter()
        .flat_map_iter(|row| resample_row(image, &columns, row, total))
        .collect::<Vec<_>>();

    log::trace!(
        "resampled {}x{} image to {width}x{height} cells in parallel",
        image.width(),
        image.height()
    );

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tests::*, PixelSlice};

    #[test]
    fn span_weights_cover_source() {
        for (source, target) in [(10, 3), (3, 10), (7, 7), (1, 5), (640, 60), (59, 60)] {
            let spans = spans(source, target);
            assert_eq!(spans.len(), target as usize);
            for span in &spans {
                assert_eq!(span.weights.iter().sum::<u64>(), u64::from(source));
                assert!(span.weights.iter().all(|&w| w > 0));
            }
            let last = spans.last().unwrap();
            assert_eq!(last.start as usize + last.weights.len(), source as usize);
        }
    }

    #[test]
    fn same_size_is_identity() {
        let (pixels, width, height) = test_image_48x32();
        let image = slice(&pixels, width, height);
        assert_eq!(resample(&image, width, height).unwrap(), pixels);

        let pixels = red_blue_2x2();
        let image = slice(&pixels, 2, 2);
        assert_eq!(resample(&image, 2, 2).unwrap(), pixels);
    }

    #[test]
    fn output_length_matches_grid() {
        let (pixels, width, height) = test_image_48x32();
        let image = slice(&pixels, width, height);
        for (w, h) in [(1, 1), (5, 3), (48, 1), (60, 60), (100, 7), (13, 64)] {
            assert_eq!(resample(&image, w, h).unwrap().len(), (w * h) as usize);
        }
    }

    #[test]
    fn downscale_averages_area() {
        let pixels = [
            opaque(0, 0, 0),
            opaque(255, 255, 255),
            opaque(100, 0, 0),
            opaque(0, 0, 100),
            opaque(10, 20, 30),
            opaque(30, 20, 10),
        ];
        let image = slice(&pixels, 2, 3);

        // each row of two pixels becomes one cell
        assert_eq!(
            resample(&image, 1, 3).unwrap(),
            vec![opaque(128, 128, 128), opaque(50, 0, 50), opaque(20, 20, 20)]
        );

        // a single cell covers everything
        assert_eq!(resample(&image, 1, 1).unwrap(), vec![opaque(66, 49, 66)]);
    }

    #[test]
    fn fractional_overlap() {
        // three pixels into two cells: the middle pixel is split evenly
        let pixels = [opaque(0, 0, 0), opaque(90, 90, 90), opaque(180, 180, 180)];
        let image = slice(&pixels, 3, 1);
        assert_eq!(
            resample(&image, 2, 1).unwrap(),
            vec![opaque(30, 30, 30), opaque(150, 150, 150)]
        );
    }

    #[test]
    fn alpha_is_averaged() {
        let pixels = [Srgba::new(255, 0, 0, 255), Srgba::new(255, 0, 0, 0)];
        let image = slice(&pixels, 2, 1);
        assert_eq!(resample(&image, 1, 1).unwrap(), vec![Srgba::new(255, 0, 0, 128)]);
    }

    #[test]
    fn transparent_pixels_do_not_tint_color() {
        let pixels = [
            opaque(255, 255, 255),
            Srgba::new(0, 0, 0, 0),
            opaque(255, 255, 255),
            opaque(255, 255, 255),
        ];
        let image = slice(&pixels, 4, 1);
        assert_eq!(
            resample(&image, 2, 1).unwrap(),
            vec![Srgba::new(255, 255, 255, 128), opaque(255, 255, 255)]
        );
    }

    #[test]
    fn color_is_weighted_by_alpha() {
        let pixels = [Srgba::new(255, 0, 0, 255), Srgba::new(0, 0, 255, 85)];
        let image = slice(&pixels, 2, 1);
        assert_eq!(resample(&image, 1, 1).unwrap(), vec![Srgba::new(191, 0, 64, 170)]);
    }

    #[test]
    fn fully_transparent_cell_keeps_area_average() {
        let pixels = [Srgba::new(10, 20, 30, 0), Srgba::new(30, 40, 50, 0)];
        let image = slice(&pixels, 2, 1);
        assert_eq!(resample(&image, 1, 1).unwrap(), vec![Srgba::new(20, 30, 40, 0)]);
    }

    #[test]
    fn upscale_repeats_pixels() {
        let pixels = red_blue_2x2();
        let image = slice(&pixels, 1, 4);
        let samples = resample(&image, 2, 8).unwrap();
        assert_eq!(samples.len(), 16);
        assert!(samples[..8].iter().all(|&s| s == opaque(255, 0, 0)));
        assert!(samples[8..].iter().all(|&s| s == opaque(0, 0, 255)));
    }

    #[test]
    fn invalid_dimensions() {
        let pixels = red_blue_2x2();
        let image = slice(&pixels, 2, 2);
        assert_eq!(
            resample(&image, 0, 3),
            Err(InvalidInput::ZeroGridSize { width: 0, height: 3 })
        );
        assert_eq!(
            resample(&image, 3, 0),
            Err(InvalidInput::ZeroGridSize { width: 3, height: 0 })
        );

        let empty = PixelSlice::new(&[], 0, 4).unwrap();
        assert_eq!(
            resample(&empty, 2, 2),
            Err(InvalidInput::EmptyImage { width: 0, height: 4 })
        );
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let (pixels, width, height) = test_image_48x32();
        let image = slice(&pixels, width, height);
        for (w, h) in [(1, 1), (7, 5), (48, 32), (100, 70)] {
            assert_eq!(resample(&image, w, h), resample_par(&image, w, h));
        }
    }
}
