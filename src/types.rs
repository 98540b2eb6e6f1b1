//! Contains various types needed across the crate.

use crate::{InvalidInput, MAX_COLORS};
use palette::Srgba;
use std::{
    error::Error,
    fmt::{Debug, Display},
    ops::Deref,
};
#[cfg(feature = "image")]
use {image::RgbaImage, palette::cast::ComponentsAs};

/// An error type for when an input value is above the maximum supported value.
///
/// The inner value is the maximum supported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AboveMaxLen<T>(pub T);

impl<T: Display> Display for AboveMaxLen<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "above the maximum length of {}", self.0)
    }
}

impl<T: Debug + Display> Error for AboveMaxLen<T> {}

/// A borrowed, row-major buffer of pixels together with its dimensions.
///
/// The invariant is that the length of the inner slice is exactly `width * height`.
///
/// # Examples
/// From a raw pixel slice:
/// ```
/// # use stitchgrid::{PixelSlice, InvalidInput};
/// # use palette::Srgba;
/// # fn main() -> Result<(), InvalidInput> {
/// let pixels = vec![Srgba::new(0, 0, 0, 255); 6];
/// let image = PixelSlice::new(&pixels, 3, 2)?;
/// # Ok(())
/// # }
/// ```
///
/// From an image (needs the `image` feature to be enabled):
/// ```no_run
/// # use stitchgrid::PixelSlice;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgba8();
/// let image = PixelSlice::from(&img);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct PixelSlice<'a> {
    /// The pixels in row-major order.
    pixels: &'a [Srgba<u8>],
    /// The number of pixels in each row.
    width: u32,
    /// The number of rows.
    height: u32,
}

impl<'a> Clone for PixelSlice<'a> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a> Copy for PixelSlice<'a> {}

impl<'a> PixelSlice<'a> {
    /// Creates a new [`PixelSlice`], checking that `pixels` holds exactly `width * height` pixels.
    ///
    /// # Errors
    /// Returns [`InvalidInput::DimensionMismatch`] if the length does not match the dimensions.
    pub fn new(pixels: &'a [Srgba<u8>], width: u32, height: u32) -> Result<Self, InvalidInput> {
        if pixels.len() as u64 == u64::from(width) * u64::from(height) {
            Ok(Self { pixels, width, height })
        } else {
            Err(InvalidInput::DimensionMismatch { len: pixels.len(), width, height })
        }
    }

    /// The width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The pixels of the image in row-major order.
    ///
    /// [`PixelSlice`] also derefs to this slice.
    ///
    /// # Examples
    /// Checking for transparency before choosing a palette size:
    /// ```
    /// # use stitchgrid::{PixelSlice, InvalidInput, OPACITY_THRESHOLD};
    /// # use palette::Srgba;
    /// # fn main() -> Result<(), InvalidInput> {
    /// let pixels = [Srgba::new(0, 0, 0, 255), Srgba::new(0, 0, 0, 0)];
    /// let image = PixelSlice::new(&pixels, 2, 1)?;
    ///
    /// let opaque = image
    ///     .pixels()
    ///     .iter()
    ///     .filter(|pixel| pixel.alpha >= OPACITY_THRESHOLD)
    ///     .count();
    ///
    /// assert_eq!(opaque, 1);
    /// assert_eq!(image.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub const fn pixels(&self) -> &'a [Srgba<u8>] {
        self.pixels
    }
}

impl<'a> Deref for PixelSlice<'a> {
    type Target = [Srgba<u8>];

    fn deref(&self) -> &Self::Target {
        self.pixels
    }
}

#[cfg(feature = "image")]
impl<'a> From<&'a RgbaImage> for PixelSlice<'a> {
    fn from(image: &'a RgbaImage) -> Self {
        let len = image.pixels().len();
        let buf = &image.as_raw()[..(len * 4)];
        Self {
            pixels: buf.components_as(),
            width: image.width(),
            height: image.height(),
        }
    }
}

/// This type is used to specify the (maximum) number of colors to include in a palette.
///
/// This is a simple new type wrapper around `u16` with the invariant that it must be
/// less than or equal to [`MAX_COLORS`].
///
/// A [`PaletteSize`] of `0` is representable, but the color reducer rejects it
/// with [`InvalidInput::ZeroColorCount`].
///
/// # Examples
/// Use `into` to create [`PaletteSize`]s from `u8`s.
/// For `u16`s, use `try_into` or [`PaletteSize::from_clamped`].
///
/// From a `u8`:
/// ```
/// # use stitchgrid::PaletteSize;
/// let size = PaletteSize::from(16);
/// let size: PaletteSize = 16.into();
/// ```
///
/// From a `u16`:
/// ```
/// # use stitchgrid::{PaletteSize, AboveMaxLen};
/// # fn main() -> Result<(), AboveMaxLen<u16>> {
/// let size = PaletteSize::try_from(128u16)?;
/// let size: PaletteSize = 128u16.try_into()?;
/// let size = PaletteSize::from_clamped(1024);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
#[repr(transparent)]
pub struct PaletteSize(u16);

impl PaletteSize {
    /// The maximum supported palette size (given by [`MAX_COLORS`]).
    pub const MAX: Self = Self(MAX_COLORS);

    /// The default palette size of `4` colors.
    pub const DEFAULT: Self = Self(4);

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// Gets the inner value as a `usize`.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Creates a [`PaletteSize`] by clamping the given `u16` to be less than or equal to [`MAX_COLORS`].
    #[must_use]
    pub const fn from_clamped(value: u16) -> Self {
        if value <= MAX_COLORS {
            Self(value)
        } else {
            Self(MAX_COLORS)
        }
    }
}

impl Default for PaletteSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<PaletteSize> for u16 {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl From<u8> for PaletteSize {
    fn from(value: u8) -> Self {
        Self(value.into())
    }
}

impl TryFrom<u16> for PaletteSize {
    type Error = AboveMaxLen<u16>;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= MAX_COLORS {
            Ok(PaletteSize(value))
        } else {
            Err(AboveMaxLen(MAX_COLORS))
        }
    }
}

impl TryFrom<u32> for PaletteSize {
    type Error = InvalidInput;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .ok()
            .and_then(|value| Self::try_from(value).ok())
            .ok_or(InvalidInput::ColorCountAboveMax(value))
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}
