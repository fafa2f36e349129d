//! Render coordinator
//!
//! Turns a [`RenderRequest`] into pixels on a surface: sizes the surface to
//! the viewport, fills the theme background, runs the renderer's drawing as a
//! cancellable task and overlays search highlights. A newer request for the
//! same surface cancels the older one; a superseded render never touches the
//! surface again once the newer one has started.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::document::{DocumentHandle, DocumentRenderer, Viewport};
use crate::error::{Result, ViewerError};
use crate::search::SearchResultSet;
use crate::view::{Rotation, Theme, ViewState};

use super::highlight::{paint_highlights, HighlightPalette};
use super::surface::SharedSurface;
use super::task::{RenderOutcome, RenderTask};

/// Identifies a drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

impl SurfaceId {
    /// Single surface used by the paginated layout
    pub const PRIMARY: SurfaceId = SurfaceId(0);

    /// Per-page surface used by the continuous layout
    pub fn for_page(page_number: u32) -> Self {
        SurfaceId(page_number)
    }
}

/// Everything needed to draw one page
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub page_number: u32,
    pub scale: f32,
    pub rotation: Rotation,
    pub theme: Theme,
    pub highlights: Arc<SearchResultSet>,
}

impl RenderRequest {
    /// Request for `page_number` under the given view
    pub fn for_view(view: &ViewState, page_number: u32, highlights: Arc<SearchResultSet>) -> Self {
        Self {
            page_number,
            scale: view.scale,
            rotation: view.rotation,
            theme: view.theme,
            highlights,
        }
    }
}

/// Result of a render that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum RenderStatus {
    Drawn {
        viewport: Viewport,
        /// Number of highlight boxes painted
        highlights: usize,
    },
    /// A newer request took over the surface
    Superseded,
}

struct InFlight {
    generation: u64,
    cancel: CancellationToken,
}

/// Per-surface render scheduling with cancellation of superseded requests
pub struct RenderCoordinator {
    renderer: Arc<dyn DocumentRenderer>,
    in_flight: Mutex<HashMap<SurfaceId, InFlight>>,
    palette: HighlightPalette,
    next_generation: AtomicU64,
}

impl RenderCoordinator {
    pub fn new(renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self::with_palette(renderer, HighlightPalette::default())
    }

    pub fn with_palette(renderer: Arc<dyn DocumentRenderer>, palette: HighlightPalette) -> Self {
        Self {
            renderer,
            in_flight: Mutex::new(HashMap::new()),
            palette,
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn palette(&self) -> &HighlightPalette {
        &self.palette
    }

    /// Number of surfaces with a render in progress
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Draw a page onto a surface, superseding whatever was in flight there
    pub async fn render_page(
        &self,
        document: &DocumentHandle,
        surface_id: SurfaceId,
        surface: &SharedSurface,
        request: &RenderRequest,
    ) -> Result<RenderStatus> {
        let (generation, cancel) = self.begin(surface_id);
        let status = self.draw(document, surface, request, &cancel).await;
        self.finish(surface_id, generation);

        match &status {
            Ok(RenderStatus::Drawn { highlights, .. }) => tracing::debug!(
                page = request.page_number,
                surface = surface_id.0,
                highlights,
                "Page rendered"
            ),
            Ok(RenderStatus::Superseded) => tracing::debug!(
                page = request.page_number,
                surface = surface_id.0,
                "Render superseded"
            ),
            Err(e) => tracing::warn!(
                page = request.page_number,
                surface = surface_id.0,
                error = %e,
                "Render failed"
            ),
        }
        status
    }

    /// Cancel the render pending on a surface, if any
    pub fn cancel(&self, surface_id: SurfaceId) {
        if let Some(previous) = self.in_flight.lock().remove(&surface_id) {
            previous.cancel.cancel();
        }
    }

    pub fn cancel_all(&self) {
        for (_, previous) in self.in_flight.lock().drain() {
            previous.cancel.cancel();
        }
    }

    fn begin(&self, surface_id: SurfaceId) -> (u64, CancellationToken) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        let previous = self.in_flight.lock().insert(
            surface_id,
            InFlight {
                generation,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            tracing::debug!(surface = surface_id.0, "Cancelling superseded render");
            previous.cancel.cancel();
        }
        (generation, cancel)
    }

    fn finish(&self, surface_id: SurfaceId, generation: u64) {
        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(&surface_id)
            .is_some_and(|current| current.generation == generation)
        {
            in_flight.remove(&surface_id);
        }
    }

    async fn draw(
        &self,
        document: &DocumentHandle,
        surface: &SharedSurface,
        request: &RenderRequest,
        cancel: &CancellationToken,
    ) -> Result<RenderStatus> {
        let page_number = request.page_number;
        let page = self
            .renderer
            .page(document, page_number)
            .await
            .map_err(|source| ViewerError::Render {
                page: page_number,
                source,
            })?;
        let viewport = self.renderer.viewport(&page, request.scale, request.rotation);

        {
            let mut canvas = surface.lock();
            if cancel.is_cancelled() {
                return Ok(RenderStatus::Superseded);
            }
            let (width, height) = viewport.pixel_size();
            canvas.resize(width, height);
            canvas.fill(request.theme.background());
        }

        let task = RenderTask::spawn(
            Arc::clone(&self.renderer),
            document.clone(),
            page,
            viewport,
            Arc::clone(surface),
            cancel.clone(),
        );
        match task.wait().await {
            RenderOutcome::Completed => {}
            RenderOutcome::Cancelled => return Ok(RenderStatus::Superseded),
            RenderOutcome::Failed(source) => {
                return Err(ViewerError::Render {
                    page: page_number,
                    source,
                })
            }
        }

        let mut canvas = surface.lock();
        if cancel.is_cancelled() {
            return Ok(RenderStatus::Superseded);
        }
        let highlights = paint_highlights(
            &mut *canvas,
            &viewport,
            &request.highlights,
            page_number,
            &self.palette,
        );
        Ok(RenderStatus::Drawn {
            viewport,
            highlights,
        })
    }
}
