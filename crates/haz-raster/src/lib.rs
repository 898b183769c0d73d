#![deny(missing_docs)]
#![doc = "Single-band ASCII grid rasters queried by nearest-cell lookup."]

/// Grid header and cell storage, plus the text parser.
pub mod grid;
/// Point and multi-source sampling.
pub mod sample;

pub use grid::{AsciiGrid, GridHeader};
pub use sample::sample_sources;
