// this_file: backends/pureshape-ot/src/lib.rs

//! OpenType-style shaping backend for pureshape.
//!
//! [`Shaper`] turns text and a [`FontProgram`](pureshape_font::FontProgram)
//! into positioned glyphs; [`BatchShaper`] fans many requests out over rayon.

pub mod batch;
pub mod shaper;

pub use batch::{BatchItem, BatchResult, BatchShaper};
pub use shaper::Shaper;
