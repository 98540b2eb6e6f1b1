use palette::Srgba;

use crate::PixelSlice;
#[cfg(feature = "image")]
use image::{RgbImage, RgbaImage};

/// A decoded image that the pipeline can read pixels from.
///
/// Implementations must return a pixel for every `x < width()` and `y < height()`.
/// The pipeline never reads outside of those bounds.
pub trait PixelSource {
    /// The width of the image in pixels.
    fn width(&self) -> u32;

    /// The height of the image in pixels.
    fn height(&self) -> u32;

    /// The color and opacity of the pixel at column `x` and row `y`.
    fn pixel(&self, x: u32, y: u32) -> Srgba<u8>;

    /// Whether the image has zero area.
    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl<'a> PixelSource for PixelSlice<'a> {
    fn width(&self) -> u32 {
        PixelSlice::width(self)
    }

    fn height(&self) -> u32 {
        PixelSlice::height(self)
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Srgba<u8> {
        self.pixels()[y as usize * PixelSlice::width(self) as usize + x as usize]
    }
}

impl<T: PixelSource + ?Sized> PixelSource for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Srgba<u8> {
        (**self).pixel(x, y)
    }
}

#[cfg(feature = "image")]
impl PixelSource for RgbaImage {
    fn width(&self) -> u32 {
        self.width()
    }

    fn height(&self) -> u32 {
        self.height()
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Srgba<u8> {
        let [r, g, b, a] = self.get_pixel(x, y).0;
        Srgba::new(r, g, b, a)
    }
}

#[cfg(feature = "image")]
impl PixelSource for RgbImage {
    fn width(&self) -> u32 {
        self.width()
    }

    fn height(&self) -> u32 {
        self.height()
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Srgba<u8> {
        let [r, g, b] = self.get_pixel(x, y).0;
        Srgba::new(r, g, b, u8::MAX)
    }
}
