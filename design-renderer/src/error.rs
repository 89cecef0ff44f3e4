//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while exporting a scene.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Building, rasterizing or encoding the output failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),
}

