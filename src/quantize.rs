//! Mapping samples to grid values.
//!
//! In color mode every sample is replaced by the index of its nearest palette color.
//! In monochrome mode every sample becomes either [`LIGHT`] or [`DARK`]
//! depending on its average brightness.

use palette::{cast, Srgb, Srgba};

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The monochrome grid value of a light (empty) cell.
pub const LIGHT: u8 = 0;

/// The monochrome grid value of a dark (filled) cell.
pub const DARK: u8 = 1;

/// The largest `r + g + b` that is still considered dark,
/// i.e., an average brightness of at most `127`.
const DARK_SUM_THRESHOLD: u16 = 127 * 3;

/// Returns the squared euclidean distance between two colors.
#[inline]
fn squared_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    let mut dist = 0;
    for (a, b) in a.into_iter().zip(b) {
        let diff = u32::from(a.abs_diff(b));
        dist += diff * diff;
    }
    dist
}

/// Returns the index of the nearest palette color, preferring the lowest index on ties.
#[inline]
fn nearest_index(palette: &[[u8; 3]], color: [u8; 3]) -> u8 {
    let mut min_index = 0;
    let mut min_dist = u32::MAX;
    for (i, &entry) in palette.iter().enumerate() {
        let dist = squared_distance(color, entry);
        if dist < min_dist {
            min_dist = dist;
            min_index = i;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    {
        min_index as u8
    }
}

/// Returns the grid value of a sample in monochrome mode.
#[inline]
fn luminance_class(sample: Srgba<u8>) -> u8 {
    let [r, g, b]: [u8; 3] = cast::into_array(sample.color);
    if u16::from(r) + u16::from(g) + u16::from(b) <= DARK_SUM_THRESHOLD {
        DARK
    } else {
        LIGHT
    }
}

/// Replaces each sample with the index of the nearest color in `palette`.
///
/// Distances are euclidean in sRGB space and ties go to the lowest index.
/// Alpha is ignored, so transparent samples are also mapped to their nearest color.
///
/// The output has the same length and order as `samples`.
/// If `palette` is empty, every sample is mapped to index `0`.
/// Only the first [`MAX_COLORS`](crate::MAX_COLORS) palette colors are considered.
///
/// # Examples
/// ```
/// # use stitchgrid::quantize::quantize;
/// # use palette::{Srgb, Srgba};
/// let palette = [Srgb::new(255, 255, 255), Srgb::new(0, 0, 0)];
/// let samples = [
///     Srgba::new(10, 20, 30, 255),
///     Srgba::new(250, 240, 200, 0),
/// ];
/// assert_eq!(quantize(&samples, &palette), vec![1, 0]);
/// ```
#[must_use]
pub fn quantize(samples: &[Srgba<u8>], palette: &[Srgb<u8>]) -> Vec<u8> {
    let palette = components(palette);
    samples
        .iter()
        .map(|sample| nearest_index(&palette, cast::into_array(sample.color)))
        .collect()
}

/// Replaces each sample in parallel with the index of the nearest color in `palette`.
///
/// The output is identical to [`quantize`].
#[cfg(feature = "threads")]
#[must_use]
pub fn quantize_par(samples: &[Srgba<u8>], palette: &[Srgb<u8>]) -> Vec<u8> {
    let palette = components(palette);
    samples
        .par_iter()
        .map(|sample| nearest_index(&palette, cast::into_array(sample.color)))
        .collect()
}

/// Replaces each sample with [`DARK`] if its average brightness `(r + g + b) / 3`
/// is at most `127`, or with [`LIGHT`] otherwise.
///
/// Alpha is ignored. The output has the same length and order as `samples`.
///
/// # Examples
/// ```
/// # use stitchgrid::quantize::{binarize, DARK, LIGHT};
/// # use palette::Srgba;
/// let samples = [
///     Srgba::new(127, 127, 127, 255),
///     Srgba::new(128, 128, 128, 255),
/// ];
/// assert_eq!(binarize(&samples), vec![DARK, LIGHT]);
/// ```
#[must_use]
pub fn binarize(samples: &[Srgba<u8>]) -> Vec<u8> {
    samples.iter().copied().map(luminance_class).collect()
}

/// Replaces each sample in parallel with [`DARK`] or [`LIGHT`].
///
/// The output is identical to [`binarize`].
#[cfg(feature = "threads")]
#[must_use]
pub fn binarize_par(samples: &[Srgba<u8>]) -> Vec<u8> {
    samples.par_iter().copied().map(luminance_class).collect()
}

/// Returns the palette as component arrays, truncated to the addressable length.
fn components(palette: &[Srgb<u8>]) -> Vec<[u8; 3]> {
    palette
        .iter()
        .take(crate::MAX_K)
        .map(|&color| cast::into_array(color))
        .collect()
}
