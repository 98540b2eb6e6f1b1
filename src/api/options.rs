//! Contains the [`PatternOptions`] builder struct and [`ColorMode`].

use crate::{KmeansOptions, PaletteSize};

/// How the cells of a chart are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorMode {
    /// Reduce the image to a palette of up to the given number of colors.
    Palette(PaletteSize),
    /// Map every cell to either a light or a dark stitch.
    Monochrome,
}

impl Default for ColorMode {
    fn default() -> Self {
        Self::Palette(PaletteSize::DEFAULT)
    }
}

/// A builder struct to specify the parameters for [`generate`](crate::generate).
///
/// The defaults are a 60x60 grid with a palette of 4 colors.
///
/// # Examples
/// ```
/// # use stitchgrid::{ColorMode, KmeansOptions, PatternOptions};
/// let options = PatternOptions::new()
///     .grid_size(80, 50)
///     .color_mode(ColorMode::Palette(8.into()))
///     .kmeans(KmeansOptions::new().iterations(20));
///
/// assert_eq!(options.grid_width(), 80);
/// assert_eq!(options.grid_height(), 50);
/// ```
///
/// For a two-color chart:
/// ```
/// # use stitchgrid::{ColorMode, PatternOptions};
/// let options = PatternOptions::new().color_mode(ColorMode::Monochrome);
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternOptions {
    /// The number of columns in the chart.
    grid_width: u32,
    /// The number of rows in the chart.
    grid_height: u32,
    /// Whether to reduce to a palette or to light and dark stitches.
    color_mode: ColorMode,
    /// The k-means parameters used in [`ColorMode::Palette`].
    kmeans: KmeansOptions,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternOptions {
    /// The default number of columns and rows.
    pub const DEFAULT_GRID_SIZE: u32 = 60;

    /// Creates a new [`PatternOptions`] with default values.
    pub const fn new() -> Self {
        Self {
            grid_width: Self::DEFAULT_GRID_SIZE,
            grid_height: Self::DEFAULT_GRID_SIZE,
            color_mode: ColorMode::Palette(PaletteSize::DEFAULT),
            kmeans: KmeansOptions::new(),
        }
    }

    /// Sets the number of columns and rows of the chart.
    ///
    /// Both must be at least `1`, otherwise [`generate`](crate::generate) returns an error.
    /// See the [`sizing`](crate::sizing) module for helpers to pick a size.
    pub const fn grid_size(mut self, width: u32, height: u32) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    /// Sets the [`ColorMode`].
    ///
    /// The default is a palette of [`PaletteSize::DEFAULT`] colors.
    pub const fn color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    /// Sets the [`KmeansOptions`] used to compute the palette.
    ///
    /// These have no effect in [`ColorMode::Monochrome`].
    pub const fn kmeans(mut self, kmeans: KmeansOptions) -> Self {
        self.kmeans = kmeans;
        self
    }

    /// The number of columns in the chart.
    #[must_use]
    pub const fn grid_width(&self) -> u32 {
        self.grid_width
    }

    /// The number of rows in the chart.
    #[must_use]
    pub const fn grid_height(&self) -> u32 {
        self.grid_height
    }

    /// The configured [`ColorMode`].
    #[must_use]
    pub const fn mode(&self) -> ColorMode {
        self.color_mode
    }

    /// The configured [`KmeansOptions`].
    #[must_use]
    pub const fn kmeans_options(&self) -> KmeansOptions {
        self.kmeans
    }
}
