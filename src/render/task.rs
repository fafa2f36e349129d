//! Cancellable render task

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::document::{
    DocumentError, DocumentHandle, DocumentRenderer, DocumentResult, PageHandle, Viewport,
};

use super::surface::SharedSurface;

/// How a render task ended
#[derive(Debug)]
pub enum RenderOutcome {
    Completed,
    /// Superseded by a newer request; not an error
    Cancelled,
    Failed(DocumentError),
}

impl RenderOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RenderOutcome::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RenderOutcome::Cancelled)
    }
}

/// A page drawing running on the tokio runtime
pub struct RenderTask {
    cancel: CancellationToken,
    handle: JoinHandle<DocumentResult<()>>,
}

impl RenderTask {
    /// Start drawing `page` onto `surface`
    pub fn spawn(
        renderer: Arc<dyn DocumentRenderer>,
        document: DocumentHandle,
        page: PageHandle,
        viewport: Viewport,
        surface: SharedSurface,
        cancel: CancellationToken,
    ) -> Self {
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            renderer
                .render_page(&document, &page, &viewport, &surface, &token)
                .await
        });
        Self { cancel, handle }
    }

    /// Request cancellation; safe to call repeatedly or after completion
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the task to finish
    pub async fn wait(self) -> RenderOutcome {
        let joined = self.handle.await;
        let cancelled = self.cancel.is_cancelled();

        match joined {
            Ok(Ok(())) if cancelled => RenderOutcome::Cancelled,
            Ok(Ok(())) => RenderOutcome::Completed,
            Ok(Err(e)) if cancelled || e.is_cancelled() => RenderOutcome::Cancelled,
            Ok(Err(e)) => RenderOutcome::Failed(e),
            Err(_) if cancelled => RenderOutcome::Cancelled,
            Err(e) => {
                tracing::error!(error = %e, "Render task panicked");
                RenderOutcome::Failed(DocumentError::Render(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{InMemoryRenderer, MemoryDocument, MemoryPage, SAMPLE_SOURCE};
    use crate::render::RgbaSurface;
    use crate::view::Rotation;
    use std::time::Duration;

    async fn prepare(
        renderer: &InMemoryRenderer,
        source: &str,
        page_number: u32,
    ) -> (DocumentHandle, PageHandle, Viewport) {
        let document = renderer.open_document(source).await.unwrap();
        let page = renderer.page(&document, page_number).await.unwrap();
        let viewport = renderer.viewport(&page, 1.0, Rotation::Deg0);
        (document, page, viewport)
    }

    #[tokio::test]
    async fn test_completed() {
        let renderer = Arc::new(InMemoryRenderer::with_sample());
        let (document, page, viewport) = prepare(&renderer, SAMPLE_SOURCE, 1).await;
        let surface: SharedSurface = Arc::new(parking_lot::Mutex::new(RgbaSurface::new(612, 792)));

        let task = RenderTask::spawn(renderer, document, page, viewport, surface, CancellationToken::new());
        assert!(task.wait().await.is_completed());
    }

    #[tokio::test]
    async fn test_cancel_mid_render() {
        let renderer = Arc::new(
            InMemoryRenderer::with_sample().with_run_delay(Duration::from_millis(50)),
        );
        let (document, page, viewport) = prepare(&renderer, SAMPLE_SOURCE, 1).await;
        let surface: SharedSurface = Arc::new(parking_lot::Mutex::new(RgbaSurface::new(612, 792)));

        let task = RenderTask::spawn(renderer, document, page, viewport, surface, CancellationToken::new());
        task.cancel();
        task.cancel();
        assert!(task.is_cancelled());
        assert!(task.wait().await.is_cancelled());
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let renderer = InMemoryRenderer::new();
        renderer.insert(
            "memory://broken",
            MemoryDocument::new().with_page(MemoryPage::letter().failing_render()),
        );
        let renderer = Arc::new(renderer);
        let (document, page, viewport) = prepare(&renderer, "memory://broken", 1).await;
        let surface: SharedSurface = Arc::new(parking_lot::Mutex::new(RgbaSurface::default()));

        let task = RenderTask::spawn(renderer, document, page, viewport, surface, CancellationToken::new());
        assert!(matches!(task.wait().await, RenderOutcome::Failed(DocumentError::Render(_))));
    }
}
