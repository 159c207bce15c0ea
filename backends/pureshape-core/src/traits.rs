// this_file: backends/pureshape-core/src/traits.rs

//! Core traits implemented by segmenters and shapers.

use crate::types::*;
use crate::Result;

/// Text segmentation trait
pub trait TextSegmenter: Send + Sync {
    /// Split text into runs of uniform script, direction and language
    fn segment(&self, text: &TextInput<'_>, options: &SegmentOptions) -> Result<Vec<TextRun>>;
}

/// Font shaping trait, generic over the font representation it consumes.
pub trait FontShaper<F: ?Sized>: Send + Sync {
    /// Shape text into positioned glyphs
    fn shape(&self, text: &TextInput<'_>, font: &F, options: &ShapeOptions)
        -> Result<ShapingResult>;

    /// Shaper name for identification
    fn name(&self) -> &str;

    /// Clear any internal caches
    fn clear_cache(&self);
}
