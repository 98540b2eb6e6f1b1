//! Contains the [`StitchChart`] output type and helpers for presenting it.

use crate::{ColorMode, InvalidInput, MAX_COLORS};
use palette::Srgb;

/// A generated stitch chart: a palette and one palette index per cell.
///
/// The grid is stored in row-major order with exactly `width * height` cells,
/// and every cell is a valid index into the palette.
/// In [`ColorMode::Monochrome`] the palette is [`MONOCHROME_PALETTE`](crate::MONOCHROME_PALETTE)
/// and the cells are [`LIGHT`](crate::quantize::LIGHT) or [`DARK`](crate::quantize::DARK).
///
/// Charts are numbered the way they are worked: column labels run from right to left
/// and row labels from bottom to top, both starting at `1`
/// (see [`StitchChart::column_label`] and [`StitchChart::row_label`]).
///
/// With the `serde` feature, deserialization goes through [`StitchChart::from_parts`],
/// so a stored chart that breaks these invariants is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawChart"))]
pub struct StitchChart {
    /// The number of columns.
    width: u32,
    /// The number of rows.
    height: u32,
    /// The mode the chart was generated with.
    mode: ColorMode,
    /// The chart colors, lightest first.
    palette: Vec<Srgb<u8>>,
    /// The palette index of each cell in row-major order.
    grid: Vec<u8>,
}

/// The unchecked fields of a deserialized [`StitchChart`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawChart {
    width: u32,
    height: u32,
    mode: ColorMode,
    palette: Vec<Srgb<u8>>,
    grid: Vec<u8>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawChart> for StitchChart {
    type Error = InvalidInput;

    fn try_from(raw: RawChart) -> Result<Self, Self::Error> {
        let RawChart { width, height, mode, palette, grid } = raw;
        Self::from_parts(width, height, mode, palette, grid)
    }
}

impl StitchChart {
    /// Creates a [`StitchChart`] from its parts, checking that they form a valid chart.
    ///
    /// # Errors
    /// - [`InvalidInput::ZeroGridSize`] if `width` or `height` is zero.
    /// - [`InvalidInput::DimensionMismatch`] if `grid` does not have `width * height` entries.
    /// - [`InvalidInput::ColorCountAboveMax`] if `palette` has more than
    ///   [`MAX_COLORS`](crate::MAX_COLORS) colors.
    /// - [`InvalidInput::IndexOutOfRange`] if an entry of `grid` is not an index into `palette`.
    ///
    /// # Examples
    /// ```
    /// # use stitchgrid::{ColorMode, InvalidInput, StitchChart, MONOCHROME_PALETTE};
    /// let chart = StitchChart::from_parts(
    ///     2,
    ///     1,
    ///     ColorMode::Monochrome,
    ///     MONOCHROME_PALETTE.to_vec(),
    ///     vec![0, 1],
    /// );
    /// assert!(chart.is_ok());
    ///
    /// let chart = StitchChart::from_parts(
    ///     2,
    ///     1,
    ///     ColorMode::Monochrome,
    ///     MONOCHROME_PALETTE.to_vec(),
    ///     vec![0, 2],
    /// );
    /// assert_eq!(chart, Err(InvalidInput::IndexOutOfRange { index: 2, len: 2 }));
    /// ```
    pub fn from_parts(
        width: u32,
        height: u32,
        mode: ColorMode,
        palette: Vec<Srgb<u8>>,
        grid: Vec<u8>,
    ) -> Result<Self, InvalidInput> {
        if width == 0 || height == 0 {
            return Err(InvalidInput::ZeroGridSize { width, height });
        }
        if grid.len() as u64 != u64::from(width) * u64::from(height) {
            return Err(InvalidInput::DimensionMismatch { len: grid.len(), width, height });
        }
        if palette.len() > usize::from(MAX_COLORS) {
            let len = u32::try_from(palette.len()).unwrap_or(u32::MAX);
            return Err(InvalidInput::ColorCountAboveMax(len));
        }
        if let Some(&index) = grid.iter().find(|&&i| usize::from(i) >= palette.len()) {
            return Err(InvalidInput::IndexOutOfRange { index, len: palette.len() });
        }

        Ok(Self { width, height, mode, palette, grid })
    }

    /// Creates a new [`StitchChart`] from already validated parts.
    pub(crate) fn new(
        width: u32,
        height: u32,
        mode: ColorMode,
        palette: Vec<Srgb<u8>>,
        grid: Vec<u8>,
    ) -> Self {
        debug_assert!(Self::from_parts(width, height, mode, palette.clone(), grid.clone()).is_ok());
        Self { width, height, mode, palette, grid }
    }

    /// The number of columns (stitches per row).
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The mode the chart was generated with.
    #[must_use]
    pub const fn mode(&self) -> ColorMode {
        self.mode
    }

    /// The chart colors, sorted from lightest to darkest.
    #[must_use]
    pub fn palette(&self) -> &[Srgb<u8>] {
        &self.palette
    }

    /// The palette index of every cell in row-major order.
    #[must_use]
    pub fn grid(&self) -> &[u8] {
        &self.grid
    }

    /// Consumes the chart and returns the palette and the grid.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Srgb<u8>>, Vec<u8>) {
        (self.palette, self.grid)
    }

    /// The palette index of the cell at column `x` and row `y`, counted from the top left.
    #[must_use]
    pub fn index(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.grid[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// The color of the cell at column `x` and row `y`, counted from the top left.
    #[must_use]
    pub fn color(&self, x: u32, y: u32) -> Option<Srgb<u8>> {
        self.index(x, y).map(|i| self.palette[usize::from(i)])
    }

    /// The palette indices of row `y`, counted from the top.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        self.rows().nth(y as usize)
    }

    /// Iterates over the rows from top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.grid.chunks_exact(self.width as usize)
    }

    /// The number of cells using each palette color.
    #[must_use]
    pub fn stitch_counts(&self) -> Vec<u32> {
        let mut counts = vec![0; self.palette.len()];
        for &i in &self.grid {
            counts[usize::from(i)] += 1;
        }
        counts
    }

    /// The label printed above and below column `x` (counted from the left).
    ///
    /// Columns are numbered from right to left, so the rightmost column is `1`.
    #[must_use]
    pub fn column_label(&self, x: u32) -> Option<u32> {
        (x < self.width).then(|| self.width - x)
    }

    /// The label printed beside row `y` (counted from the top).
    ///
    /// Rows are numbered from bottom to top, so the bottom row is `1`.
    #[must_use]
    pub fn row_label(&self, y: u32) -> Option<u32> {
        (y < self.height).then(|| self.height - y)
    }
}

/// Formats a color as a CSS `rgb()` function, e.g., `rgb(255, 0, 0)`.
#[must_use]
pub fn css_rgb(color: Srgb<u8>) -> String {
    format!("rgb({}, {}, {})", color.red, color.green, color.blue)
}

/// Formats a color as an uppercase hex triplet, e.g., `#FF0000`.
#[must_use]
pub fn hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}
