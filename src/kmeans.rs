//! Deterministic k-means palette generation.
//!
//! This is plain Lloyd's k-means in sRGB space with a few fixed choices
//! that make the output depend only on the input order:
//! - The initial centroids are evenly strided through the samples:
//!   centroid `i` starts at sample `floor(i * n / k)`.
//! - A sample is assigned to the first centroid with the strictly smallest distance,
//!   so ties always go to the lowest index.
//! - A centroid without any samples keeps its previous position.
//! - A fixed number of iterations is run (see [`DEFAULT_ITERATIONS`]), with no convergence check.
//!
//! The resulting centroids are rounded and then sorted from lightest to darkest
//! by their average brightness `(r + g + b) / 3`.
//! Colors with equal brightness keep their centroid order.
//!
//! Sorting happens after rounding, so the returned palette itself is ordered by brightness.
//! Centroids whose unrounded brightness differs only slightly can end up equally bright,
//! or in reverse order, after rounding. The palette follows the rounded values,
//! and equal ones stay in centroid order, not in the order of their unrounded means.
//!
//! Samples with an alpha below [`OPACITY_THRESHOLD`](crate::OPACITY_THRESHOLD) are ignored.

use crate::{InvalidInput, PaletteSize, OPACITY_THRESHOLD};
use palette::{cast, Srgb, Srgba};
use std::cmp::Reverse;

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The number of assignment and update passes run by default.
pub const DEFAULT_ITERATIONS: u32 = 15;

/// The palette returned when there are no opaque samples.
pub const EMPTY_PALETTE_COLOR: Srgb<u8> = Srgb::new(u8::MAX, u8::MAX, u8::MAX);

/// A builder struct to specify the parameters for k-means.
///
/// # Examples
/// ```
/// # use stitchgrid::KmeansOptions;
/// let options = KmeansOptions::new().iterations(30);
/// assert_eq!(options.num_iterations(), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KmeansOptions {
    /// The number of assignment and update passes to run.
    iterations: u32,
}

impl Default for KmeansOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl KmeansOptions {
    /// Creates a new [`KmeansOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { iterations: DEFAULT_ITERATIONS }
    }

    /// Sets the number of assignment and update passes.
    ///
    /// Every pass is always run, even if the centroids stopped moving.
    /// A value of `0` returns the initial strided samples as the palette.
    ///
    /// The default is [`DEFAULT_ITERATIONS`].
    #[must_use]
    pub const fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Returns the configured number of passes.
    #[must_use]
    pub const fn num_iterations(&self) -> u32 {
        self.iterations
    }
}

/// The per-cluster sums of one assignment pass.
///
/// The sums are exact integers, so they can be merged in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClusterSums {
    /// The component sums of each cluster.
    sums: Vec<[u64; 3]>,
    /// The number of samples assigned to each cluster.
    counts: Vec<u32>,
}

impl ClusterSums {
    fn new(k: usize) -> Self {
        Self { sums: vec![[0; 3]; k], counts: vec![0; k] }
    }

    #[inline]
    fn add(mut self, cluster: usize, color: [u8; 3]) -> Self {
        for (s, c) in self.sums[cluster].iter_mut().zip(color) {
            *s += u64::from(c);
        }
        self.counts[cluster] += 1;
        self
    }

    fn merge(mut self, other: Self) -> Self {
        for (a, b) in self.sums.iter_mut().zip(other.sums) {
            for (a, b) in a.iter_mut().zip(b) {
                *a += b;
            }
        }
        for (a, b) in self.counts.iter_mut().zip(other.counts) {
            *a += b;
        }
        self
    }
}

/// Returns the squared euclidean distance between a sample and a centroid.
#[inline]
fn squared_distance(color: [u8; 3], centroid: [f64; 3]) -> f64 {
    let mut dist = 0.0;
    for (c, m) in color.into_iter().zip(centroid) {
        let diff = f64::from(c) - m;
        dist += diff * diff;
    }
    dist
}

/// Returns the index of the nearest centroid, preferring the lowest index on ties.
#[inline]
fn nearest_centroid(centroids: &[[f64; 3]], color: [u8; 3]) -> usize {
    let mut min_index = 0;
    let mut min_dist = f64::INFINITY;
    for (i, &centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(color, centroid);
        if dist < min_dist {
            min_dist = dist;
            min_index = i;
        }
    }
    min_index
}

/// The working state of one k-means run.
struct State<'a> {
    /// The opaque samples being clustered.
    colors: &'a [[u8; 3]],
    /// The current position of each centroid.
    centroids: Vec<[f64; 3]>,
}

impl<'a> State<'a> {
    /// Creates the initial state by evenly striding through `colors`.
    ///
    /// `colors.len()` must be at least `k`.
    fn new(colors: &'a [[u8; 3]], k: usize) -> Self {
        let n = colors.len() as u64;
        let centroids = (0..k as u64)
            .map(|i| {
                #[allow(clippy::cast_possible_truncation)]
                let index = (i * n / k as u64) as usize;
                colors[index].map(f64::from)
            })
            .collect();

        Self { colors, centroids }
    }

    /// Moves every non-empty cluster's centroid to the mean of its samples.
    fn update(&mut self, clusters: ClusterSums) {
        let ClusterSums { sums, counts } = clusters;
        for ((centroid, sum), count) in self.centroids.iter_mut().zip(sums).zip(counts) {
            if count > 0 {
                #[allow(clippy::cast_precision_loss)]
                {
                    *centroid = sum.map(|s| s as f64 / f64::from(count));
                }
            }
        }
    }

    fn assign(&self) -> ClusterSums {
        let centroids = self.centroids.as_slice();
        self.colors.iter().fold(ClusterSums::new(centroids.len()), |sums, &color| {
            sums.add(nearest_centroid(centroids, color), color)
        })
    }

    fn kmeans(&mut self, iterations: u32) {
        for _ in 0..iterations {
            let clusters = self.assign();
            self.update(clusters);
        }
    }

    fn into_palette(self) -> Vec<Srgb<u8>> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let palette = self
            .centroids
            .into_iter()
            .map(|centroid| Srgb::from(centroid.map(|c| c.round() as u8)))
            .collect();

        sort_by_brightness(palette)
    }
}

#[cfg(feature = "threads")]
impl<'a> State<'a> {
    fn assign_par(&self) -> ClusterSums {
        let centroids = self.centroids.as_slice();
        let k = centroids.len();
        self.colors
            .par_iter()
            .fold(
                || ClusterSums::new(k),
                |sums, &color| sums.add(nearest_centroid(centroids, color), color),
            )
            .reduce(|| ClusterSums::new(k), ClusterSums::merge)
    }

    fn kmeans_par(&mut self, iterations: u32) {
        for _ in 0..iterations {
            let clusters = self.assign_par();
            self.update(clusters);
        }
    }
}

/// Sorts colors from lightest to darkest, keeping the order of equally bright colors.
fn sort_by_brightness(mut palette: Vec<Srgb<u8>>) -> Vec<Srgb<u8>> {
    palette.sort_by_key(|color| {
        Reverse(u16::from(color.red) + u16::from(color.green) + u16::from(color.blue))
    });
    palette
}

/// Returns the opaque samples as component arrays.
fn opaque_colors(samples: &[Srgba<u8>]) -> Vec<[u8; 3]> {
    samples
        .iter()
        .filter(|sample| sample.alpha >= OPACITY_THRESHOLD)
        .map(|sample| cast::into_array(sample.color))
        .collect()
}

/// The samples left to cluster after filtering, or a palette that needs no clustering.
enum Prepared {
    /// The palette is already known.
    Trivial(Vec<Srgb<u8>>),
    /// At least `k` opaque samples need to be clustered.
    Cluster(Vec<[u8; 3]>),
}

/// Validates `k` and handles the cases that do not need clustering.
fn prepare(samples: &[Srgba<u8>], k: PaletteSize) -> Result<Prepared, InvalidInput> {
    if k.into_inner() == 0 {
        return Err(InvalidInput::ZeroColorCount);
    }

    let colors = opaque_colors(samples);
    Ok(if colors.is_empty() {
        Prepared::Trivial(vec![EMPTY_PALETTE_COLOR])
    } else if colors.len() < k.as_usize() {
        Prepared::Trivial(sort_by_brightness(colors.into_iter().map(Srgb::from).collect()))
    } else {
        Prepared::Cluster(colors)
    })
}

/// Computes a palette of up to `k` colors for the given samples using k-means
/// with the default [`KmeansOptions`].
///
/// - Samples with an alpha below `128` are ignored.
/// - If no samples remain, the palette is a single white entry.
/// - If fewer than `k` samples remain, each of them becomes its own palette entry.
///
/// The palette is sorted from lightest to darkest (see the [module](crate::kmeans) docs).
///
/// # Errors
/// Returns [`InvalidInput::ZeroColorCount`] if `k` is zero.
///
/// # Examples
/// ```
/// # use stitchgrid::{kmeans::reduce_colors, InvalidInput};
/// # use palette::{Srgb, Srgba};
/// # fn main() -> Result<(), InvalidInput> {
/// let samples = [
///     Srgba::new(250, 0, 0, 255),
///     Srgba::new(0, 0, 250, 255),
///     Srgba::new(255, 255, 255, 255),
///     Srgba::new(240, 0, 0, 255),
/// ];
/// let palette = reduce_colors(&samples, 2.into())?;
/// assert_eq!(palette, vec![Srgb::new(255, 255, 255), Srgb::new(163, 0, 83)]);
/// # Ok(())
/// # }
/// ```
pub fn reduce_colors(samples: &[Srgba<u8>], k: PaletteSize) -> Result<Vec<Srgb<u8>>, InvalidInput> {
    reduce_colors_with(samples, k, KmeansOptions::new())
}

/// Computes a palette of up to `k` colors for the given samples using k-means
/// with the given [`KmeansOptions`].
///
/// See [`reduce_colors`] for more details.
///
/// # Errors
/// Returns [`InvalidInput::ZeroColorCount`] if `k` is zero.
pub fn reduce_colors_with(
    samples: &[Srgba<u8>],
    k: PaletteSize,
    options: KmeansOptions,
) -> Result<Vec<Srgb<u8>>, InvalidInput> {
    match prepare(samples, k)? {
        Prepared::Trivial(palette) => Ok(palette),
        Prepared::Cluster(colors) => {
            let mut state = State::new(&colors, k.as_usize());
            state.kmeans(options.num_iterations());
            let palette = state.into_palette();
            log::debug!(
                "k-means reduced {} opaque samples to {} colors",
                colors.len(),
                palette.len()
            );
            Ok(palette)
        }
    }
}

/// Computes a palette in parallel using k-means with the default [`KmeansOptions`].
///
/// The output is identical to [`reduce_colors`].
///
/// # Errors
/// Returns [`InvalidInput::ZeroColorCount`] if `k` is zero.
#[cfg(feature = "threads")]
pub fn reduce_colors_par(
    samples: &[Srgba<u8>],
    k: PaletteSize,
) -> Result<Vec<Srgb<u8>>, InvalidInput> {
    reduce_colors_with_par(samples, k, KmeansOptions::new())
}

/// Computes a palette in parallel using k-means with the given [`KmeansOptions`].
///
/// The output is identical to [`reduce_colors_with`].
///
/// # Errors
/// Returns [`InvalidInput::ZeroColorCount`] if `k` is zero.
#[cfg(feature = "threads")]
pub fn reduce_colors_with_par(
    samples: &[Srgba<u8>],
    k: PaletteSize,
    options: KmeansOptions,
) -> Result<Vec<Srgb<u8>>, InvalidInput> {
    match prepare(samples, k)? {
        Prepared::Trivial(palette) => Ok(palette),
        Prepared::Cluster(colors) => {
            let mut state = State::new(&colors, k.as_usize());
            state.kmeans_par(options.num_iterations());
            let palette = state.into_palette();
            log::debug!(
                "k-means reduced {} opaque samples to {} colors in parallel",
                colors.len(),
                palette.len()
            );
            Ok(palette)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn rgb(r: u8, g: u8, b: u8) -> Srgb<u8> {
        Srgb::new(r, g, b)
    }

    #[test]
    fn zero_colors_is_rejected() {
        let samples = red_blue_2x2();
        assert_eq!(reduce_colors(&samples, 0.into()), Err(InvalidInput::ZeroColorCount));
        assert_eq!(reduce_colors(&[], 0.into()), Err(InvalidInput::ZeroColorCount));
    }

    #[test]
    fn transparent_input_gives_white() {
        let samples = [
            Srgba::new(0, 0, 0, 0),
            Srgba::new(10, 200, 30, 127),
            Srgba::new(90, 90, 90, 5),
        ];
        assert_eq!(reduce_colors(&samples, 4.into()).unwrap(), vec![rgb(255, 255, 255)]);
        assert_eq!(reduce_colors(&[], 4.into()).unwrap(), vec![rgb(255, 255, 255)]);
    }

    #[test]
    fn transparent_samples_are_ignored() {
        let samples = [
            Srgba::new(255, 0, 0, 255),
            Srgba::new(0, 0, 255, 127),
            Srgba::new(0, 255, 0, 128),
        ];
        // two opaque samples with equal brightness, so their order is kept
        assert_eq!(
            reduce_colors(&samples, 3.into()).unwrap(),
            vec![rgb(255, 0, 0), rgb(0, 255, 0)]
        );
    }

    #[test]
    fn fewer_samples_than_colors() {
        let samples = [
            opaque(10, 10, 10),
            opaque(200, 200, 200),
            opaque(10, 10, 10),
            opaque(90, 100, 110),
        ];
        let palette = reduce_colors(&samples, 8.into()).unwrap();
        assert_eq!(
            palette,
            vec![rgb(200, 200, 200), rgb(90, 100, 110), rgb(10, 10, 10), rgb(10, 10, 10)]
        );
    }

    #[test]
    fn red_and_blue() {
        let samples = red_blue_2x2();
        // red and blue are equally bright, and red was the first initial centroid
        assert_eq!(
            reduce_colors(&samples, 2.into()).unwrap(),
            vec![rgb(255, 0, 0), rgb(0, 0, 255)]
        );
    }

    #[test]
    fn ties_go_to_first_centroid() {
        // the middle sample is equally far from both initial centroids
        let samples = [opaque(0, 0, 0), opaque(100, 100, 100), opaque(50, 50, 50)];
        assert_eq!(
            reduce_colors(&samples, 2.into()).unwrap(),
            vec![rgb(100, 100, 100), rgb(25, 25, 25)]
        );
    }

    #[test]
    fn empty_cluster_keeps_centroid() {
        let samples = [opaque(40, 50, 60); 5];
        assert_eq!(
            reduce_colors(&samples, 3.into()).unwrap(),
            vec![rgb(40, 50, 60); 3]
        );
    }

    #[test]
    fn strided_initialization() {
        let samples = [
            opaque(0, 0, 0),
            opaque(1, 1, 1),
            opaque(2, 2, 2),
            opaque(3, 3, 3),
            opaque(4, 4, 4),
            opaque(5, 5, 5),
        ];
        // centroids start at samples 0, 2 and 4
        let palette =
            reduce_colors_with(&samples, 3.into(), KmeansOptions::new().iterations(0)).unwrap();
        assert_eq!(palette, vec![rgb(4, 4, 4), rgb(2, 2, 2), rgb(0, 0, 0)]);
    }

    #[test]
    fn rounds_centroids() {
        let samples = [opaque(0, 0, 0), opaque(1, 2, 3), opaque(255, 255, 255)];
        // (0 + 1) / 2 = 0.5 rounds up, (0 + 3) / 2 = 1.5 rounds up
        assert_eq!(
            reduce_colors(&samples, 2.into()).unwrap(),
            vec![rgb(255, 255, 255), rgb(1, 1, 2)]
        );
    }

    #[test]
    fn sorts_by_rounded_brightness() {
        // unrounded brightness 1.4 > 1.0, rounded 1 < 2
        let state = State { colors: &[], centroids: vec![[1.4, 0.0, 0.0], [0.5, 0.5, 0.0]] };
        assert_eq!(state.into_palette(), vec![rgb(1, 1, 0), rgb(1, 0, 0)]);

        // unrounded brightness 0.6 < 0.9, both round to 1
        let state = State { colors: &[], centroids: vec![[0.6, 0.0, 0.0], [0.0, 0.9, 0.0]] };
        assert_eq!(state.into_palette(), vec![rgb(1, 0, 0), rgb(0, 1, 0)]);
    }

    #[test]
    fn palette_is_sorted_and_full() {
        let samples = test_data_1024();
        for k in [1u8, 2, 5, 16, 40] {
            let palette = reduce_colors(&samples, k.into()).unwrap();
            assert_eq!(palette.len(), usize::from(k));
            for pair in palette.windows(2) {
                assert!(brightness(pair[0]) >= brightness(pair[1]));
            }
        }
    }

    #[test]
    fn deterministic() {
        let samples = test_data_1024();
        let a = reduce_colors(&samples, 12.into()).unwrap();
        let b = reduce_colors(&samples, 12.into()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn converges_on_separated_clusters() {
        // one block per cluster, so each initial centroid lands in a different block
        let mut samples = Vec::new();
        samples.extend((0..30).map(|i| opaque(250 - i % 3, 250, 250)));
        samples.extend((0..30).map(|i| opaque(i % 5, 0, 0)));
        samples.extend((0..30).map(|i| opaque(100, 150 + i % 2, 100)));
        assert_eq!(
            reduce_colors(&samples, 3.into()).unwrap(),
            vec![rgb(249, 250, 250), rgb(100, 151, 100), rgb(2, 0, 0)]
        );
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let samples = test_data_1024();
        for k in [1u8, 3, 8, 32] {
            assert_eq!(reduce_colors(&samples, k.into()), reduce_colors_par(&samples, k.into()));
        }

        let (pixels, _, _) = test_image_48x32();
        assert_eq!(reduce_colors(&pixels, 6.into()), reduce_colors_par(&pixels, 6.into()));
    }
}
