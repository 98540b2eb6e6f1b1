//! The error type returned when a pipeline input is rejected.

use thiserror::Error;

/// The input to a pipeline stage, or the parts of a chart, were invalid.
///
/// Every check happens before any work is done,
/// so an error never comes with a partially filled grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidInput {
    /// The source image has zero width or zero height.
    #[error("image dimensions cannot be zero, got {width}x{height}")]
    EmptyImage {
        /// The width of the image.
        width: u32,
        /// The height of the image.
        height: u32,
    },

    /// The requested grid has zero columns or zero rows.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    ZeroGridSize {
        /// The requested number of columns.
        width: u32,
        /// The requested number of rows.
        height: u32,
    },

    /// A palette of zero colors was requested.
    #[error("color count must be positive")]
    ZeroColorCount,

    /// More colors were requested than a grid index can address.
    #[error("color count {0} is above the maximum of {max}", max = crate::MAX_COLORS)]
    ColorCountAboveMax(u32),

    /// A pixel buffer or chart grid does not have `width * height` entries.
    #[error("buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        /// The number of entries in the buffer.
        len: usize,
        /// The declared width.
        width: u32,
        /// The declared height.
        height: u32,
    },

    /// A chart grid refers to a color past the end of its palette.
    #[error("grid index {index} is out of range for a palette of {len} colors")]
    IndexOutOfRange {
        /// The first offending grid index.
        index: u8,
        /// The number of palette colors.
        len: usize,
    },
}
