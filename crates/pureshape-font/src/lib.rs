// this_file: crates/pureshape-font/src/lib.rs

//! Font program model for pureshape.
//!
//! A [`FontProgram`] is the read-only view of a font the shaping engine
//! consumes: cmap, horizontal metrics, glyph classes and GSUB/GPOS-style
//! layout tables. Programs come from [`FontProgramBuilder`], from JSON, or
//! from TrueType/OpenType files through [`loader`].

pub mod builder;
pub mod gpos;
pub mod gsub;
pub mod layout;
pub mod loader;
pub mod program;

pub use builder::FontProgramBuilder;
pub use gpos::{Anchor, MarkAttachPos, MarkRecord, PosSubtable, ValueRecord};
pub use gsub::{Ligature, SubstSubtable};
pub use layout::{
    ChainRule, ClassDef, Coverage, FeatureRecord, LangSys, LayoutTable, Lookup, LookupFlags,
    ScriptRecord, SequenceLookup,
};
pub use loader::{font_from_bytes, load_font_file, FontLoader, LoaderStats};
pub use program::{FontData, FontId, FontProgram, GlyphClass, GlyphId, GlyphInfo, GlyphMetrics};
