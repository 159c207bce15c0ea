// this_file: crates/pureshape-shaping/src/lib.rs

//! Shaping plans, the glyph buffer and the substitution and positioning
//! engines that run over it.

pub mod buffer;
pub mod context;
pub mod plan;
pub mod position;
pub mod scale;
pub mod substitute;

pub use buffer::{GlyphBuffer, GlyphSlot};
pub use context::MAX_NESTING_DEPTH;
pub use plan::{
    PlanBuilder, PlanCache, PlanKey, PlannedLookup, ShapingPlan, DEFAULT_GPOS_FEATURES,
    DEFAULT_GSUB_FEATURES, DEFAULT_PLAN_CACHE_CAPACITY,
};
pub use position::apply_positioning;
pub use scale::Scaler;
pub use substitute::apply_substitutions;
