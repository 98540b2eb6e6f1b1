#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{error::Error, path::PathBuf};

use clap::Parser;
use image::{Rgb, RgbImage};
use palette::cast;
use stitchgrid::{
    css_rgb, hex,
    sizing::{aspect_height, fit_within, DEFAULT_MAX_GRID_SIZE},
    ColorMode, KmeansOptions, PaletteSize, PatternOptions, StitchChart,
};

/// Symbols used to print the chart, one per palette index.
const SYMBOLS: &[u8] = b".#*+=%@oxsXO&$~^abcdefghijklmnpqrtuvwyz";

/// The color of the lines between cells in the preview image.
const GRID_LINE: Rgb<u8> = Rgb([200, 200, 200]);

/// Turns an image into a stitch chart and prints it.
#[derive(Parser)]
struct Options {
    /// The image to turn into a chart.
    input: PathBuf,

    /// The number of columns. Defaults to the image width, scaled down to fit within `--max`.
    #[arg(short, long)]
    width: Option<u32>,

    /// The number of rows. Defaults to keeping the aspect ratio of the image.
    #[arg(long)]
    height: Option<u32>,

    /// The largest default grid side.
    #[arg(long, default_value_t = DEFAULT_MAX_GRID_SIZE)]
    max: u32,

    /// The number of palette colors.
    #[arg(short, long, default_value_t = PaletteSize::default(), value_parser = parse_palette_size)]
    k: PaletteSize,

    /// Use light and dark stitches instead of a palette.
    #[arg(long)]
    monochrome: bool,

    /// The number of k-means passes.
    #[arg(long, default_value_t = stitchgrid::kmeans::DEFAULT_ITERATIONS)]
    iterations: u32,

    /// The number of threads, where `0` uses all cores and `1` runs single-threaded.
    #[arg(short, long, default_value_t = 0)]
    threads: u8,

    /// Writes a preview image of the chart to this path.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// The size of each cell in the preview image, in pixels.
    #[arg(long, default_value_t = 12)]
    cell_size: u32,
}

fn parse_palette_size(s: &str) -> Result<PaletteSize, String> {
    let value: u16 = s.parse().map_err(|e| format!("{e}"))?;
    value.try_into().map_err(|e| format!("{e}"))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let Options {
        input,
        width,
        height,
        max,
        k,
        monochrome,
        iterations,
        threads,
        preview,
        cell_size,
    } = Options::parse();

    macro_rules! timed {
        ($name: literal, $val: expr) => {{
            let time = std::time::Instant::now();
            let value = $val;
            log::info!("{} took {}ms", $name, time.elapsed().as_millis());
            value
        }};
    }

    let image = timed!("read image", image::open(input)?.into_rgba8());
    let (image_width, image_height) = image.dimensions();

    let (grid_width, grid_height) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, aspect_height(w, image_width, image_height).unwrap_or(w)),
        (None, Some(h)) => (aspect_height(h, image_height, image_width).unwrap_or(h), h),
        (None, None) => fit_within(image_width, image_height, max),
    };

    let color_mode = if monochrome { ColorMode::Monochrome } else { ColorMode::Palette(k) };

    let options = PatternOptions::new()
        .grid_size(grid_width, grid_height)
        .color_mode(color_mode)
        .kmeans(KmeansOptions::new().iterations(iterations));

    let chart = timed!(
        "chart generation",
        match threads {
            0 => stitchgrid::generate_par(&image, options)?,
            1 => stitchgrid::generate(&image, options)?,
            t => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(t.into()).build()?;
                pool.install(|| stitchgrid::generate_par(&image, options))?
            }
        }
    );

    print_palette(&chart);
    println!();
    print_chart(&chart);

    if let Some(path) = preview {
        timed!("write preview", preview_image(&chart, cell_size.max(2)).save(path)?);
    }

    Ok(())
}

fn symbol(index: u8) -> char {
    SYMBOLS.get(usize::from(index)).map_or('?', |&s| char::from(s))
}

fn print_palette(chart: &StitchChart) {
    println!("{}x{} stitches, {} colors", chart.width(), chart.height(), chart.palette().len());
    for (i, (&color, count)) in chart.palette().iter().zip(chart.stitch_counts()).enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let symbol = symbol(i as u8);
        println!("  {symbol}  {}  {:<18} {count} stitches", hex(color), css_rgb(color));
    }
}

fn print_chart(chart: &StitchChart) {
    let labels = (0..chart.width())
        .filter_map(|x| chart.column_label(x))
        .map(|label| char::from(b'0' + (label % 10) as u8))
        .collect::<String>();

    println!("     {labels}");
    for (y, row) in (0..).zip(chart.rows()) {
        let row_label = chart.row_label(y).unwrap_or_default();
        let cells = row.iter().map(|&i| symbol(i)).collect::<String>();
        println!("{row_label:>4} {cells} {row_label}");
    }
    println!("     {labels}");
}

fn preview_image(chart: &StitchChart, cell_size: u32) -> RgbImage {
    RgbImage::from_fn(chart.width() * cell_size, chart.height() * cell_size, |x, y| {
        if x % cell_size == 0 || y % cell_size == 0 {
            GRID_LINE
        } else {
            chart
                .color(x / cell_size, y / cell_size)
                .map_or(GRID_LINE, |color| Rgb(cast::into_array(color)))
        }
    })
}
