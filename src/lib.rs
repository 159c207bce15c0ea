// this_file: src/lib.rs

//! pureshape: codepoints in, positioned glyphs out.
//!
//! ```no_run
//! use pureshape::{load_font_file, ShapeOptions, Shaper};
//!
//! let font = load_font_file("NotoSans-Regular.ttf".as_ref(), 0)?;
//! let shaper = Shaper::new();
//! let result = shaper.shape(&font, "office".into(), &ShapeOptions::default().with_size(16.0))?;
//! for glyph in &result.glyphs {
//!     println!("{glyph}");
//! }
//! # Ok::<(), pureshape::ShapeError>(())
//! ```

pub use pureshape_core::{
    utils, CacheStats, ClusterLevel, Direction, Features, Fixed, FontShaper, GlyphRecord,
    Language, Result, Script, SegmentOptions, ShapeError, ShapeOptions, ShapedRunInfo,
    ShapingResult, Tag, TextInput, TextRun, TextSegmenter,
};
pub use pureshape_font::{
    font_from_bytes, load_font_file, FontData, FontId, FontLoader, FontProgram,
    FontProgramBuilder, GlyphClass, GlyphId,
};
pub use pureshape_ot::{BatchItem, BatchResult, BatchShaper, Shaper};
pub use pureshape_shaping::{PlanBuilder, PlanCache, ShapingPlan};
pub use pureshape_unicode::Segmenter;

/// Shape `text` with a throwaway [`Shaper`].
///
/// Plans are not reused between calls; keep a [`Shaper`] around when
/// shaping repeatedly with the same font.
pub fn shape<'a>(
    font: &FontProgram,
    text: impl Into<TextInput<'a>>,
    options: &ShapeOptions,
) -> Result<ShapingResult> {
    Shaper::new().shape(font, text.into(), options)
}
