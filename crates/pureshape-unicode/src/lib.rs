// this_file: crates/pureshape-unicode/src/lib.rs

//! Unicode processing for pureshape: input decoding, character properties
//! and run segmentation.

pub mod decode;
pub mod props;
pub mod segmenter;

pub use decode::decode;
pub use props::{grapheme_starts, is_combining_mark, is_default_ignorable};
pub use segmenter::Segmenter;
