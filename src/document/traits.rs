//! Document renderer trait
//!
//! The external capability that parses a document and produces pixels plus
//! text-position metadata per page. The viewer core never decodes documents
//! itself.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::DocumentResult;
use super::types::{DocumentHandle, PageHandle, TextRun, Viewport};
use crate::render::SharedSurface;
use crate::view::Rotation;

/// Format-specific document backend
///
/// Implementations own whatever decoded state a document needs, keyed by
/// [`DocumentHandle::id`].
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Open the document at `source` (URL or path)
    async fn open_document(&self, source: &str) -> DocumentResult<DocumentHandle>;

    /// Look up a page (1-indexed)
    async fn page(&self, document: &DocumentHandle, page_number: u32)
        -> DocumentResult<PageHandle>;

    /// Viewport for a page at the given scale and rotation
    fn viewport(&self, page: &PageHandle, scale: f32, rotation: Rotation) -> Viewport {
        Viewport::new(page.view_box, scale, rotation)
    }

    /// Text runs of a page in reading order
    async fn text_content(
        &self,
        document: &DocumentHandle,
        page: &PageHandle,
    ) -> DocumentResult<Vec<TextRun>>;

    /// Draw a page onto `surface` through `viewport`.
    ///
    /// The surface has already been sized and filled by the caller.
    /// Implementations must check `cancel` while holding the surface lock
    /// before every write and return [`DocumentError::Cancelled`] once it
    /// fires.
    ///
    /// [`DocumentError::Cancelled`]: super::DocumentError::Cancelled
    async fn render_page(
        &self,
        document: &DocumentHandle,
        page: &PageHandle,
        viewport: &Viewport,
        surface: &SharedSurface,
        cancel: &CancellationToken,
    ) -> DocumentResult<()>;

    /// Release renderer-side state for a document
    fn close_document(&self, _document: &DocumentHandle) {}
}
