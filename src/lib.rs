//! A library for turning images into stitch charts (e.g., crochet graph patterns).
//!
//! `stitchgrid` resamples an image down to one sample per chart cell,
//! reduces the samples to a small palette with deterministic k-means,
//! and maps every cell to an index into that palette.
//! A monochrome mode maps every cell to either a light or a dark stitch instead.
//!
//! # Features
//! To reduce dependencies and compile times, `stitchgrid` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes parallel versions of most functions via [`rayon`].
//!   These produce exactly the same output as their single-threaded counterparts.
//! - `image`: enables integration with the [`image`] crate.
//! - `serde`: derives `Serialize` and `Deserialize` for [`PatternOptions`] and [`StitchChart`].
//!
//! # High-Level API
//! To get started, see [`generate`] and [`PatternOptions`]:
//! ```no_run
//! # use stitchgrid::{ColorMode, PatternOptions};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgba8();
//!
//! let options = PatternOptions::new()
//!     .grid_size(60, 45) // one cell per stitch
//!     .color_mode(ColorMode::Palette(6.into()));
//!
//! let chart = stitchgrid::generate(&img, options)?;
//! for row in chart.rows() {
//!     // draw the row
//! #   let _ = row;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The individual stages are also exposed:
//! [`resample`](resample::resample), [`reduce_colors`](kmeans::reduce_colors),
//! [`quantize`](quantize::quantize), and [`binarize`](quantize::binarize).

#![deny(unsafe_code)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod api;
mod chart;
mod error;
mod traits;
mod types;

pub mod kmeans;
pub mod quantize;
pub mod resample;
pub mod sizing;

pub use api::*;
pub use chart::*;
pub use error::InvalidInput;
pub use kmeans::KmeansOptions;
pub use traits::*;
pub use types::*;

/// The maximum supported number of palette colors is `256`,
/// so that every grid entry fits in a `u8`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;

/// `MAX_COLORS` as a `usize` for array and `Vec` lengths.
pub(crate) const MAX_K: usize = MAX_COLORS as usize;

/// Samples with an alpha below this value are ignored when computing a palette.
pub const OPACITY_THRESHOLD: u8 = 128;
