// this_file: backends/pureshape-core/src/error.rs

//! Error taxonomy shared by every pureshape crate.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for shaping operations.
#[derive(Error, Debug)]
pub enum ShapeError {
    /// Input text is not a valid sequence of Unicode scalar values.
    #[error("Malformed input at code unit {offset}: {reason}")]
    Segmentation { offset: usize, reason: String },

    /// The font program lacks (or carries broken) data the engine needs.
    #[error("Font data error: {reason}")]
    FontData { reason: String },

    /// The plan cache handed out a plan that does not belong to the request.
    #[error("Plan cache inconsistency: {reason}")]
    PlanCache { reason: String },

    /// A four-byte OpenType tag could not be parsed.
    #[error("Invalid tag '{tag}': expected 1-4 printable ASCII characters")]
    InvalidTag { tag: String },

    /// A feature setting string could not be parsed.
    #[error("Invalid feature setting '{setting}'")]
    InvalidFeature { setting: String },

    /// Font file could not be read or mapped.
    #[error("Failed to load font from {path}: {source}")]
    FontLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Font file was read but could not be parsed.
    #[error("Invalid font file at {path}: {reason}")]
    InvalidFont { path: PathBuf, reason: String },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShapeError {
    pub fn segmentation(offset: usize, reason: impl Into<String>) -> Self {
        Self::Segmentation {
            offset,
            reason: reason.into(),
        }
    }

    pub fn font_data(reason: impl Into<String>) -> Self {
        Self::FontData {
            reason: reason.into(),
        }
    }

    pub fn plan_cache(reason: impl Into<String>) -> Self {
        Self::PlanCache {
            reason: reason.into(),
        }
    }

    pub fn font_load(path: PathBuf, source: std::io::Error) -> Self {
        Self::FontLoad { path, source }
    }

    pub fn invalid_font(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::InvalidFont {
            path,
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input rather than by fonts or internals.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Segmentation { .. } | Self::InvalidTag { .. } | Self::InvalidFeature { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segmentation_display() {
        let err = ShapeError::segmentation(3, "unpaired surrogate 0xD800");
        let msg = err.to_string();
        assert!(msg.contains("code unit 3"));
        assert!(msg.contains("unpaired surrogate"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_font_load_display() {
        let err = ShapeError::font_load(
            PathBuf::from("/fonts/missing.ttf"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.to_string().contains("/fonts/missing.ttf"));
        assert!(!err.is_input_error());
    }
}
