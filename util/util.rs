#![allow(dead_code)]

use std::sync::OnceLock;

use image::{Rgba, RgbaImage};
use palette::Srgba;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// Creates an image of a diagonal gradient overlaid with random rectangles and per-pixel noise.
///
/// The outermost `border` pixels are fully transparent.
pub fn synthetic_image(width: u32, height: u32, border: u32, seed: u64) -> RgbaImage {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);

    let rects = (0..12)
        .map(|_| {
            let x = rng.gen_range(0..width);
            let y = rng.gen_range(0..height);
            let w = rng.gen_range(1..=width / 3 + 1);
            let h = rng.gen_range(1..=height / 3 + 1);
            let color: [u8; 3] = rng.gen();
            (x, y, w, h, color)
        })
        .collect::<Vec<_>>();

    RgbaImage::from_fn(width, height, |x, y| {
        if x < border || y < border || x + border >= width || y + border >= height {
            return Rgba([255, 255, 255, 0]);
        }

        #[allow(clippy::cast_possible_truncation)]
        let base = ((x + y) * 255 / (width + height)) as u8;
        let mut color = [base, 255 - base, base / 2];
        for &(rx, ry, rw, rh, rect) in &rects {
            if (rx..rx + rw).contains(&x) && (ry..ry + rh).contains(&y) {
                color = rect;
            }
        }

        let noise: i16 = rng.gen_range(-8..=8);
        let [r, g, b] = color.map(|c| (i16::from(c) + noise).clamp(0, 255) as u8);
        Rgba([r, g, b, 255])
    })
}

pub fn to_samples(image: &RgbaImage) -> Vec<Srgba<u8>> {
    image
        .pixels()
        .map(|&Rgba([r, g, b, a])| Srgba::new(r, g, b, a))
        .collect()
}

static BENCH_IMAGES: OnceLock<Vec<(String, RgbaImage)>> = OnceLock::new();

pub fn load_bench_images() -> Vec<(String, RgbaImage)> {
    [(640, 480, 0), (1920, 1080, 0), (800, 800, 100)]
        .into_iter()
        .zip(1..)
        .map(|((width, height, border), seed)| {
            (format!("{width}x{height}"), synthetic_image(width, height, border, seed))
        })
        .collect()
}

pub fn bench_images() -> &'static [(String, RgbaImage)] {
    BENCH_IMAGES.get_or_init(load_bench_images)
}
