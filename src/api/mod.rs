//! Contains the types and functions for the high level API.

mod options;
mod pipeline;

pub use options::{ColorMode, PatternOptions};
#[cfg(feature = "threads")]
pub use pipeline::generate_par;
pub use pipeline::{generate, MONOCHROME_PALETTE};
