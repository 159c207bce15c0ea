// this_file: backends/pureshape-core/src/lib.rs

//! Core traits and types for the pureshape text shaping engine.

pub mod cache;
pub mod diagnostics;
pub mod error;
pub mod traits;
pub mod types;
pub mod utils;

pub use cache::{CacheStats, SharedCache};
pub use diagnostics::ShapeDiagnostics;
pub use error::ShapeError;
pub use traits::{FontShaper, TextSegmenter};
pub use types::{
    ClusterLevel, Direction, Features, Fixed, GlyphRecord, Language, Script, SegmentOptions,
    ShapeOptions, ShapedRunInfo, ShapingResult, Tag, TextInput, TextRun,
};

/// Result type for pureshape operations
pub type Result<T> = std::result::Result<T, ShapeError>;
