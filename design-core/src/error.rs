//! Error types for engine operations.

use thiserror::Error;

use crate::element::ElementId;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A scene document failed structural validation. The current scene is kept.
    #[error("Malformed scene: {0}")]
    MalformedScene(String),

    /// An element carries a variant tag the engine does not know.
    #[error("Unknown element variant {tag:?} at index {index}")]
    UnknownVariant {
        /// Position of the element in the document.
        index: usize,
        /// The unrecognized tag.
        tag: String,
    },

    /// An operation referenced an element that is not in the scene.
    #[error("Element not in scene: {0}")]
    InvalidSelectionReference(ElementId),

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The rendering surface failed to produce an export.
    #[error("Export failed: {0}")]
    Export(String),
}
