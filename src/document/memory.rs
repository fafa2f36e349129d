//! In-memory document renderer
//!
//! Documents are registered by source string and consist of page sizes plus
//! text runs. Pages are "rendered" by painting each run's box in ink colour
//! through the viewport, which is enough to exercise layout, highlighting and
//! cancellation without a real PDF backend.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use image::Rgba;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use super::error::{DocumentError, DocumentResult};
use super::traits::DocumentRenderer;
use super::types::{DocumentHandle, PageHandle, Rect, TextRun, ViewBox, Viewport};
use crate::render::SharedSurface;

/// Source string of the built-in sample document
pub const SAMPLE_SOURCE: &str = "memory://sample";

/// US Letter in points
const LETTER: (f32, f32) = (612.0, 792.0);

/// One page of an in-memory document
#[derive(Debug, Clone)]
pub struct MemoryPage {
    pub width: f32,
    pub height: f32,
    pub runs: Vec<TextRun>,
    pub fail_text: bool,
    pub fail_render: bool,
}

impl MemoryPage {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            runs: Vec::new(),
            fail_text: false,
            fail_render: false,
        }
    }

    pub fn letter() -> Self {
        Self::new(LETTER.0, LETTER.1)
    }

    /// Add a run; the page number is assigned when the page joins a document
    pub fn with_run(mut self, text: &str, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.runs.push(TextRun::new(text, x, y, width, height, 0));
        self
    }

    /// Text extraction for this page fails
    pub fn failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }

    /// Drawing this page fails
    pub fn failing_render(mut self) -> Self {
        self.fail_render = true;
        self
    }
}

/// Ordered pages of an in-memory document
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, mut page: MemoryPage) -> Self {
        let page_number = self.pages.len() as u32 + 1;
        for run in &mut page.runs {
            run.page_number = page_number;
        }
        self.pages.push(page);
        self
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Three letter-size pages; page 2 holds `hello world hello`
    pub fn sample() -> Self {
        Self::new()
            .with_page(
                MemoryPage::letter()
                    .with_run("Quarterly report", 72.0, 720.0, 160.0, 18.0)
                    .with_run("Summary of results", 72.0, 690.0, 150.0, 12.0),
            )
            .with_page(
                MemoryPage::letter()
                    .with_run("hello world hello", 72.0, 600.0, 170.0, 12.0)
                    .with_run("nothing to see", 72.0, 570.0, 140.0, 12.0),
            )
            .with_page(MemoryPage::letter().with_run("Appendix", 72.0, 720.0, 80.0, 14.0))
    }

    fn page(&self, page_number: u32) -> DocumentResult<&MemoryPage> {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .ok_or(DocumentError::PageNotFound(page_number))
    }
}

/// Renderer over registered [`MemoryDocument`]s
pub struct InMemoryRenderer {
    documents: RwLock<HashMap<String, MemoryDocument>>,
    /// Pause before drawing each run
    run_delay: Option<Duration>,
    ink: Rgba<u8>,
}

impl Default for InMemoryRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRenderer {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            run_delay: None,
            ink: Rgba([0, 0, 0, 255]),
        }
    }

    /// Renderer with [`MemoryDocument::sample`] registered at [`SAMPLE_SOURCE`]
    pub fn with_sample() -> Self {
        let renderer = Self::new();
        renderer.insert(SAMPLE_SOURCE, MemoryDocument::sample());
        renderer
    }

    /// Slow drawing down so renders stay in flight long enough to be superseded
    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = Some(delay);
        self
    }

    pub fn with_ink(mut self, ink: Rgba<u8>) -> Self {
        self.ink = ink;
        self
    }

    pub fn ink(&self) -> Rgba<u8> {
        self.ink
    }

    /// Register (or replace) a document
    pub fn insert(&self, source: impl Into<String>, document: MemoryDocument) {
        self.documents.write().insert(source.into(), document);
    }

    fn with_page<R>(
        &self,
        document: &DocumentHandle,
        page_number: u32,
        f: impl FnOnce(&MemoryPage) -> R,
    ) -> DocumentResult<R> {
        let documents = self.documents.read();
        let doc = documents
            .get(document.id())
            .ok_or_else(|| DocumentError::NotFound(document.id().to_string()))?;
        doc.page(page_number).map(f)
    }
}

/// Page-space box of a run: baseline-left origin, extending up by its height
fn run_box(viewport: &Viewport, run: &TextRun) -> Rect {
    viewport.transform_box(
        run.origin_x,
        run.origin_y,
        run.origin_x + run.width,
        run.origin_y + run.height,
    )
}

#[async_trait]
impl DocumentRenderer for InMemoryRenderer {
    async fn open_document(&self, source: &str) -> DocumentResult<DocumentHandle> {
        let documents = self.documents.read();
        let doc = documents
            .get(source)
            .ok_or_else(|| DocumentError::NotFound(source.to_string()))?;
        Ok(DocumentHandle::new(source, source, doc.page_count()))
    }

    async fn page(
        &self,
        document: &DocumentHandle,
        page_number: u32,
    ) -> DocumentResult<PageHandle> {
        self.with_page(document, page_number, |page| PageHandle {
            page_number,
            view_box: ViewBox::sized(page.width, page.height),
        })
    }

    async fn text_content(
        &self,
        document: &DocumentHandle,
        page: &PageHandle,
    ) -> DocumentResult<Vec<TextRun>> {
        let (fail, runs) = self.with_page(document, page.page_number, |p| {
            (p.fail_text, p.runs.clone())
        })?;
        if fail {
            return Err(DocumentError::TextExtraction(format!(
                "No text content for page {}",
                page.page_number
            )));
        }
        Ok(runs)
    }

    async fn render_page(
        &self,
        document: &DocumentHandle,
        page: &PageHandle,
        viewport: &Viewport,
        surface: &SharedSurface,
        cancel: &CancellationToken,
    ) -> DocumentResult<()> {
        let (fail, runs) = self.with_page(document, page.page_number, |p| {
            (p.fail_render, p.runs.clone())
        })?;
        if fail {
            return Err(DocumentError::Render(format!(
                "Corrupt content stream on page {}",
                page.page_number
            )));
        }

        for run in &runs {
            if let Some(delay) = self.run_delay {
                tokio::time::sleep(delay).await;
            }
            let rect = run_box(viewport, run);

            let mut canvas = surface.lock();
            if cancel.is_cancelled() {
                return Err(DocumentError::Cancelled);
            }
            canvas.fill_rect(rect, self.ink);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RgbaSurface;
    use crate::view::Rotation;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_open_unknown_source() {
        let renderer = InMemoryRenderer::new();
        let err = renderer.open_document("memory://nope").await.unwrap_err();
        assert!(matches!(err, DocumentError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_sample_document() {
        let renderer = InMemoryRenderer::with_sample();
        let handle = renderer.open_document(SAMPLE_SOURCE).await.unwrap();
        assert_eq!(handle.page_count(), 3);

        let page = renderer.page(&handle, 2).await.unwrap();
        assert_eq!(page.view_box.width(), 612.0);
        let runs = renderer.text_content(&handle, &page).await.unwrap();
        assert_eq!(runs[0].text, "hello world hello");
        assert!(runs.iter().all(|r| r.page_number == 2));
    }

    #[tokio::test]
    async fn test_render_paints_runs() {
        let renderer = InMemoryRenderer::new();
        renderer.insert(
            "memory://doc",
            MemoryDocument::new()
                .with_page(MemoryPage::new(100.0, 100.0).with_run("ink", 10.0, 50.0, 30.0, 10.0)),
        );
        let handle = renderer.open_document("memory://doc").await.unwrap();
        let page = renderer.page(&handle, 1).await.unwrap();
        let viewport = renderer.viewport(&page, 1.0, Rotation::Deg0);

        let surface = Arc::new(parking_lot::Mutex::new(RgbaSurface::new(100, 100)));
        let shared: SharedSurface = surface.clone();
        renderer
            .render_page(&handle, &page, &viewport, &shared, &CancellationToken::new())
            .await
            .unwrap();

        // Run spans y 50..60 in page space, i.e. rows 40..50 on the device
        assert_eq!(surface.lock().pixel(20, 45), Some(Rgba([0, 0, 0, 255])));
        assert_eq!(surface.lock().pixel(20, 30), Some(Rgba([0, 0, 0, 0])));
    }

    #[tokio::test]
    async fn test_render_stops_when_cancelled() {
        let renderer = InMemoryRenderer::with_sample();
        let handle = renderer.open_document(SAMPLE_SOURCE).await.unwrap();
        let page = renderer.page(&handle, 1).await.unwrap();
        let viewport = renderer.viewport(&page, 1.0, Rotation::Deg0);

        let shared: SharedSurface = Arc::new(parking_lot::Mutex::new(RgbaSurface::new(612, 792)));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = renderer
            .render_page(&handle, &page, &viewport, &shared, &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_render_failure() {
        let renderer = InMemoryRenderer::new();
        renderer.insert(
            "memory://doc",
            MemoryDocument::new().with_page(MemoryPage::letter().failing_render()),
        );
        let handle = renderer.open_document("memory://doc").await.unwrap();
        let page = renderer.page(&handle, 1).await.unwrap();
        let viewport = renderer.viewport(&page, 1.0, Rotation::Deg0);
        let shared: SharedSurface = Arc::new(parking_lot::Mutex::new(RgbaSurface::default()));

        let err = renderer
            .render_page(&handle, &page, &viewport, &shared, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Render(_)));
    }
}
