//! Document error types
//!
//! Errors raised at the Document Renderer boundary (loading, page lookup,
//! text extraction, drawing).

use thiserror::Error;

/// Error reported by a document renderer or the document session
#[derive(Debug, Error)]
pub enum DocumentError {
    /// No document registered / reachable at this source
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Page number outside `[1, page_count]`
    #[error("Page not found: {0}")]
    PageNotFound(u32),

    /// Operation needs a loaded document
    #[error("No document loaded")]
    NotLoaded,

    /// Failed to retrieve the document bytes
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Failed to parse the document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failed to draw a page
    #[error("Render error: {0}")]
    Render(String),

    /// Failed to extract text runs from a page
    #[error("Text extraction error: {0}")]
    TextExtraction(String),

    /// Drawing stopped because the render was superseded
    #[error("Render cancelled")]
    Cancelled,

    /// IO error (std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    /// Whether this error is the cancellation signal rather than a fault
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DocumentError::Cancelled)
    }
}

/// Result type alias for document operations
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

#[cfg(feature = "mupdf")]
impl From<mupdf::Error> for DocumentError {
    fn from(err: mupdf::Error) -> Self {
        DocumentError::Parse(err.to_string())
    }
}

#[cfg(feature = "mupdf")]
impl From<reqwest::Error> for DocumentError {
    fn from(err: reqwest::Error) -> Self {
        DocumentError::Fetch(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_not_a_fault() {
        assert!(DocumentError::Cancelled.is_cancelled());
        assert!(!DocumentError::Render("boom".into()).is_cancelled());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(DocumentError::PageNotFound(7).to_string(), "Page not found: 7");
        assert_eq!(
            DocumentError::NotFound("memory://x".into()).to_string(),
            "Document not found: memory://x"
        );
    }
}
