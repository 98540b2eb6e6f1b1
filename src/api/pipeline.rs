//! Contains [`generate`], which runs the whole chart pipeline.

use crate::{
    kmeans, quantize, resample, ColorMode, InvalidInput, PatternOptions, PixelSource, StitchChart,
};
use palette::Srgb;

/// The palette of a [`ColorMode::Monochrome`] chart:
/// white for [`LIGHT`](quantize::LIGHT) and a dark gray for [`DARK`](quantize::DARK).
pub const MONOCHROME_PALETTE: [Srgb<u8>; 2] = [Srgb::new(255, 255, 255), Srgb::new(44, 44, 44)];

/// Checks every input before any work is done.
fn validate(image: &impl PixelSource, options: &PatternOptions) -> Result<(), InvalidInput> {
    let (width, height) = (options.grid_width(), options.grid_height());
    if image.is_empty() {
        Err(InvalidInput::EmptyImage { width: image.width(), height: image.height() })
    } else if width == 0 || height == 0 {
        Err(InvalidInput::ZeroGridSize { width, height })
    } else if matches!(options.mode(), ColorMode::Palette(k) if k.into_inner() == 0) {
        Err(InvalidInput::ZeroColorCount)
    } else {
        Ok(())
    }
}

/// Turns an image into a [`StitchChart`] with one cell per stitch.
///
/// The image is first resampled to one sample per cell (see [`resample::resample`]). Then:
/// - In [`ColorMode::Palette`], the samples are reduced to a palette with k-means
///   (see [`kmeans::reduce_colors_with`]) and each cell gets the index of its nearest palette color
///   (see [`quantize::quantize`]).
/// - In [`ColorMode::Monochrome`], each cell is classified as light or dark
///   (see [`quantize::binarize`]) and the palette is [`MONOCHROME_PALETTE`].
///
/// The output only depends on the image and the options.
///
/// # Errors
/// All inputs are checked before any work is done, in this order:
/// - [`InvalidInput::EmptyImage`] if the image has zero width or height.
/// - [`InvalidInput::ZeroGridSize`] if the grid width or height is zero.
/// - [`InvalidInput::ZeroColorCount`] if the color mode is [`ColorMode::Palette`] with zero colors.
///
/// # Examples
/// ```
/// # use stitchgrid::{ColorMode, PatternOptions, PixelSlice};
/// # use palette::{Srgb, Srgba};
/// # fn main() -> Result<(), stitchgrid::InvalidInput> {
/// let red = Srgba::new(255, 0, 0, 255);
/// let blue = Srgba::new(0, 0, 255, 255);
/// let pixels = [red, red, blue, blue];
/// let image = PixelSlice::new(&pixels, 2, 2)?;
///
/// let options = PatternOptions::new()
///     .grid_size(2, 2)
///     .color_mode(ColorMode::Palette(2.into()));
///
/// let chart = stitchgrid::generate(&image, options)?;
/// assert_eq!(chart.palette(), [Srgb::new(255, 0, 0), Srgb::new(0, 0, 255)]);
/// assert_eq!(chart.grid(), [0, 0, 1, 1]);
/// # Ok(())
/// # }
/// ```
pub fn generate(
    image: &impl PixelSource,
    options: PatternOptions,
) -> Result<StitchChart, InvalidInput> {
    validate(image, &options)?;

    let (width, height) = (options.grid_width(), options.grid_height());
    let samples = resample::resample(image, width, height)?;

    let (palette, grid) = match options.mode() {
        ColorMode::Palette(k) => {
            let palette = kmeans::reduce_colors_with(&samples, k, options.kmeans_options())?;
            let grid = quantize::quantize(&samples, &palette);
            (palette, grid)
        }
        ColorMode::Monochrome => (MONOCHROME_PALETTE.to_vec(), quantize::binarize(&samples)),
    };

    log::debug!(
        "generated {width}x{height} chart with {} colors from {}x{} image",
        palette.len(),
        image.width(),
        image.height(),
    );

    Ok(StitchChart::new(width, height, options.mode(), palette, grid))
}

/// Turns an image into a [`StitchChart`] in parallel.
///
/// The output is identical to [`generate`].
///
/// # Errors
/// See [`generate`].
#[cfg(feature = "threads")]
pub fn generate_par(
    image: &(impl PixelSource + Sync),
    options: PatternOptions,
) -> Result<StitchChart, InvalidInput> {
    validate(image, &options)?;

    let (width, height) = (options.grid_width(), options.grid_height());
    let samples = resample::resample_par(image, width, height)?;

    let (palette, grid) = match options.mode() {
        ColorMode::Palette(k) => {
            let palette = kmeans::reduce_colors_with_par(&samples, k, options.kmeans_options())?;
            let grid = quantize::quantize_par(&samples, &palette);
            (palette, grid)
        }
        ColorMode::Monochrome => (MONOCHROME_PALETTE.to_vec(), quantize::binarize_par(&samples)),
    };

    log::debug!(
        "generated {width}x{height} chart with {} colors from {}x{} image in parallel",
        palette.len(),
        image.width(),
        image.height(),
    );

    Ok(StitchChart::new(width, height, options.mode(), palette, grid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        quantize::{DARK, LIGHT},
        tests::*,
        KmeansOptions, PaletteSize, PixelSlice,
    };
    use palette::Srgba;

    fn palette_options(width: u32, height: u32, k: u8) -> PatternOptions {
        PatternOptions::new()
            .grid_size(width, height)
            .color_mode(ColorMode::Palette(k.into()))
    }

    #[test]
    fn red_over_blue_in_color() {
        let pixels = red_blue_2x2();
        let image = slice(&pixels, 2, 2);
        let chart = generate(&image, palette_options(2, 2, 2)).unwrap();

        assert_eq!(chart.palette(), [Srgb::new(255, 0, 0), Srgb::new(0, 0, 255)]);
        assert_eq!(chart.grid(), [0, 0, 1, 1]);
        assert_eq!((chart.width(), chart.height()), (2, 2));
        assert_eq!(chart.mode(), ColorMode::Palette(2.into()));
    }

    #[test]
    fn red_over_blue_in_monochrome() {
        let pixels = red_blue_2x2();
        let image = slice(&pixels, 2, 2);
        let options = PatternOptions::new()
            .grid_size(2, 2)
            .color_mode(ColorMode::Monochrome);
        let chart = generate(&image, options).unwrap();

        assert_eq!(chart.palette(), MONOCHROME_PALETTE);
        assert_eq!(chart.grid(), [DARK; 4]);
        assert_eq!(chart.mode(), ColorMode::Monochrome);
    }

    #[test]
    fn upscaled_chart() {
        let pixels = red_blue_2x2();
        let image = slice(&pixels, 2, 2);
        let chart = generate(&image, palette_options(4, 4, 2)).unwrap();

        assert_eq!(chart.palette(), [Srgb::new(255, 0, 0), Srgb::new(0, 0, 255)]);
        assert_eq!(chart.grid()[..8], [0; 8]);
        assert_eq!(chart.grid()[8..], [1; 8]);
    }

    #[test]
    fn transparent_image_is_white() {
        let pixels = [Srgba::new(10, 20, 30, 0); 6];
        let image = slice(&pixels, 3, 2);
        let chart = generate(&image, palette_options(3, 2, 4)).unwrap();

        assert_eq!(chart.palette(), [Srgb::new(255, 255, 255)]);
        assert_eq!(chart.grid(), [0; 6]);
    }

    #[test]
    fn transparent_background_does_not_add_colors() {
        let white = opaque(255, 255, 255);
        let pixels = [white, Srgba::new(0, 0, 0, 0), white, white];
        let image = slice(&pixels, 4, 1);
        let chart = generate(&image, palette_options(2, 1, 2)).unwrap();

        assert!(chart.palette().iter().all(|&color| color == Srgb::new(255, 255, 255)));
        assert_eq!(chart.grid(), [0, 0]);
    }

    #[test]
    fn grid_and_palette_invariants() {
        let (pixels, width, height) = test_image_48x32();
        let image = slice(&pixels, width, height);

        for (w, h, k) in [(1, 1, 1), (10, 7, 3), (48, 32, 8), (60, 40, 16), (200, 3, 2)] {
            let chart = generate(&image, palette_options(w, h, k)).unwrap();
            assert_eq!(chart.grid().len(), (w * h) as usize);
            assert!(!chart.palette().is_empty());
            assert!(chart.palette().len() <= usize::from(k));
            assert!(chart
                .grid()
                .iter()
                .all(|&i| usize::from(i) < chart.palette().len()));
            assert!(chart
                .palette()
                .windows(2)
                .all(|pair| brightness(pair[0]) >= brightness(pair[1])));

            let options = PatternOptions::new()
                .grid_size(w, h)
                .color_mode(ColorMode::Monochrome);
            let chart = generate(&image, options).unwrap();
            assert_eq!(chart.grid().len(), (w * h) as usize);
            assert!(chart.grid().iter().all(|&i| i == LIGHT || i == DARK));
        }
    }

    #[test]
    fn deterministic() {
        let (pixels, width, height) = test_image_48x32();
        let image = slice(&pixels, width, height);
        let options = palette_options(30, 20, 6);
        assert_eq!(generate(&image, options), generate(&image, options));
    }

    #[test]
    fn kmeans_options_are_used() {
        let (pixels, width, height) = test_image_48x32();
        let image = slice(&pixels, width, height);
        let options = palette_options(24, 16, 5);

        let samples = resample::resample(&image, 24, 16).unwrap();
        let initial =
            kmeans::reduce_colors_with(&samples, 5.into(), KmeansOptions::new().iterations(0))
                .unwrap();

        let chart = generate(&image, options.kmeans(KmeansOptions::new().iterations(0))).unwrap();
        assert_eq!(chart.palette(), initial);
    }

    #[test]
    fn invalid_input_is_rejected_first() {
        let pixels = red_blue_2x2();
        let image = slice(&pixels, 2, 2);
        let empty = PixelSlice::new(&[], 5, 0).unwrap();

        assert_eq!(
            generate(&empty, palette_options(0, 0, 0)),
            Err(InvalidInput::EmptyImage { width: 5, height: 0 })
        );
        assert_eq!(
            generate(&image, palette_options(0, 2, 0)),
            Err(InvalidInput::ZeroGridSize { width: 0, height: 2 })
        );
        assert_eq!(
            generate(&image, palette_options(2, 2, 0)),
            Err(InvalidInput::ZeroColorCount)
        );
        assert_eq!(
            generate(
                &image,
                PatternOptions::new()
                    .grid_size(2, 2)
                    .color_mode(ColorMode::Palette(PaletteSize::from(0)))
            ),
            Err(InvalidInput::ZeroColorCount)
        );
    }

    #[test]
    #[cfg(feature = "image")]
    fn rgba_image_source() {
        let image = image::RgbaImage::from_fn(4, 2, |_, y| {
            if y == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        });
        let chart = generate(&image, palette_options(2, 2, 2)).unwrap();
        assert_eq!(chart.grid(), [0, 0, 1, 1]);
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let (pixels, width, height) = test_image_48x32();
        let image = slice(&pixels, width, height);

        for (w, h, k) in [(1, 1, 1), (13, 9, 4), (48, 32, 12), (90, 60, 20)] {
            let options = palette_options(w, h, k);
            assert_eq!(generate(&image, options), generate_par(&image, options));

            let options = options.color_mode(ColorMode::Monochrome);
            assert_eq!(generate(&image, options), generate_par(&image, options));
        }

        assert_eq!(
            generate_par(&image, palette_options(4, 4, 0)),
            Err(InvalidInput::ZeroColorCount)
        );
    }
}
