//! Viewer error types

use thiserror::Error;

use crate::document::DocumentError;

/// Errors surfaced by the viewer
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Document could not be loaded; fatal to the session
    #[error("Failed to load document: {0}")]
    Load(#[source] DocumentError),

    /// A page failed to draw; other pages are unaffected
    #[error("Failed to render page {page}: {source}")]
    Render {
        page: u32,
        #[source]
        source: DocumentError,
    },

    /// Operation needs a loaded document
    #[error("No document loaded")]
    NoDocument,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ViewerError {
    /// Page the error belongs to, for per-page error states
    pub fn page(&self) -> Option<u32> {
        match self {
            ViewerError::Render { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// Result type alias for viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;
