//! Viewer controller
//!
//! Single owner of the document session, view state, query and search
//! results. Every public transition updates state and then issues exactly
//! one render pass for the resulting state.

use std::collections::BTreeMap;
use std::sync::Arc;

use image::RgbaImage;
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::ViewerConfig;
use crate::document::{DocumentRenderer, DocumentSession};
use crate::error::{Result, ViewerError};
use crate::render::{
    RenderCoordinator, RenderRequest, RenderStatus, RgbaSurface, SharedSurface, SurfaceId,
};
use crate::search::{search, Direction, SearchOutcome, SearchResultSet};
use crate::view::{PageLayout, ViewAction, ViewState};

/// Load state shown by the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "message")]
pub enum ViewerStatus {
    Empty,
    Loading,
    Ready,
    /// Load failed; carries the message shown in place of the document
    Failed(String),
}

/// What one render pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSummary {
    pub rendered: usize,
    pub superseded: usize,
    pub failed: usize,
    /// Highlight boxes painted across all pages
    pub highlights: usize,
}

pub struct Viewer {
    config: ViewerConfig,
    session: DocumentSession,
    coordinator: RenderCoordinator,
    view: ViewState,
    query: String,
    results: Arc<SearchResultSet>,
    skipped_pages: Vec<u32>,
    status: ViewerStatus,
    surfaces: BTreeMap<SurfaceId, Arc<Mutex<RgbaSurface>>>,
    /// Pages whose last render failed, with the error shown in their place
    page_errors: BTreeMap<u32, String>,
    scroll_target: Option<u32>,
    render_passes: u64,
}

impl Viewer {
    pub fn new(renderer: Arc<dyn DocumentRenderer>, config: ViewerConfig) -> Self {
        let view = ViewState {
            scale: config.initial_scale,
            theme: config.theme,
            layout: config.layout,
            ..ViewState::default()
        };

        Self {
            session: DocumentSession::new(Arc::clone(&renderer), config.text_cache_pages),
            coordinator: RenderCoordinator::new(renderer),
            config,
            view,
            query: String::new(),
            results: Arc::new(SearchResultSet::empty()),
            skipped_pages: Vec::new(),
            status: ViewerStatus::Empty,
            surfaces: BTreeMap::new(),
            page_errors: BTreeMap::new(),
            scroll_target: None,
            render_passes: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn session(&self) -> &DocumentSession {
        &self.session
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn status(&self) -> &ViewerStatus {
        &self.status
    }

    pub fn page_count(&self) -> u32 {
        self.session.page_count()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &SearchResultSet {
        &self.results
    }

    /// Pages the last search could not read
    pub fn skipped_pages(&self) -> &[u32] {
        &self.skipped_pages
    }

    pub fn page_errors(&self) -> &BTreeMap<u32, String> {
        &self.page_errors
    }

    /// Page the widget should scroll into view, if any
    pub fn scroll_target(&self) -> Option<u32> {
        self.scroll_target
    }

    pub fn take_scroll_target(&mut self) -> Option<u32> {
        self.scroll_target.take()
    }

    /// Number of render passes issued so far
    pub fn render_passes(&self) -> u64 {
        self.render_passes
    }

    pub fn surface(&self, surface_id: SurfaceId) -> Option<&Arc<Mutex<RgbaSurface>>> {
        self.surfaces.get(&surface_id)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceId, &Arc<Mutex<RgbaSurface>>)> {
        self.surfaces.iter().map(|(id, surface)| (*id, surface))
    }

    /// Copy of a surface's pixels
    pub fn snapshot(&self, surface_id: SurfaceId) -> Option<RgbaImage> {
        self.surfaces
            .get(&surface_id)
            .map(|surface| surface.lock().snapshot())
    }

    /// Toolbar match counter, e.g. `2/5`
    pub fn match_counter(&self) -> Option<String> {
        self.results.counter_label()
    }

    /// Match counter (when searching) followed by the zoom label
    pub fn status_line(&self) -> String {
        match self.match_counter() {
            Some(counter) => format!("{} | {}", counter, self.view.zoom_label()),
            None => self.view.zoom_label(),
        }
    }

    /// Load a document, replacing the current one, and render it
    pub async fn load(&mut self, source: &str) -> Result<RenderSummary> {
        self.coordinator.cancel_all();
        self.status = ViewerStatus::Loading;
        self.reset_search();
        self.surfaces.clear();
        self.page_errors.clear();
        self.scroll_target = None;

        let loaded = self.session.load(source).await.map(|_| ());
        match loaded {
            Ok(()) => {
                self.status = ViewerStatus::Ready;
                self.view = self.view.apply(ViewAction::SetPage(1), self.page_count());
                Ok(self.refresh().await)
            }
            Err(e) => {
                self.status = ViewerStatus::Failed(e.to_string());
                Err(ViewerError::Load(e))
            }
        }
    }

    /// Drop the document and every surface
    pub fn close(&mut self) {
        self.coordinator.cancel_all();
        self.session.close();
        self.reset_search();
        self.surfaces.clear();
        self.page_errors.clear();
        self.scroll_target = None;
        self.status = ViewerStatus::Empty;
    }

    /// Apply one view transition and render once
    pub async fn dispatch(&mut self, action: ViewAction) -> RenderSummary {
        self.apply(action);
        self.refresh().await
    }

    /// Apply a batch of transitions and render the final state once
    pub async fn dispatch_all<I>(&mut self, actions: I) -> RenderSummary
    where
        I: IntoIterator<Item = ViewAction>,
    {
        for action in actions {
            self.apply(action);
        }
        self.refresh().await
    }

    /// Run a search, jump to the first match and render once.
    ///
    /// A blank query clears the results and their highlights.
    pub async fn submit_query(&mut self, query: &str) -> Result<RenderSummary> {
        let outcome = search(&self.session, query, self.config.search_options()).await?;

        match outcome {
            SearchOutcome::Cleared => self.reset_search(),
            SearchOutcome::Searched {
                results,
                skipped_pages,
            } => {
                tracing::info!(
                    query,
                    matches = results.len(),
                    skipped = skipped_pages.len(),
                    "Search finished"
                );
                self.query = query.to_string();
                self.results = Arc::new(results);
                self.skipped_pages = skipped_pages;
                self.scroll_to_current();
            }
        }
        Ok(self.refresh().await)
    }

    pub async fn clear_query(&mut self) -> RenderSummary {
        self.reset_search();
        self.refresh().await
    }

    pub async fn next_match(&mut self) -> RenderSummary {
        self.step_match(Direction::Forward).await
    }

    pub async fn previous_match(&mut self) -> RenderSummary {
        self.step_match(Direction::Backward).await
    }

    async fn step_match(&mut self, direction: Direction) -> RenderSummary {
        if self.results.is_empty() {
            return RenderSummary::default();
        }
        self.results = Arc::new((*self.results).clone().advance(direction));
        self.scroll_to_current();
        self.refresh().await
    }

    fn apply(&mut self, action: ViewAction) {
        let previous = self.view;
        self.view = self.view.apply(action, self.page_count());
        if self.view.current_page != previous.current_page {
            self.scroll_target = Some(self.view.current_page);
        }
    }

    fn scroll_to_current(&mut self) {
        if let Some(page_number) = self.results.current().map(|m| m.page_number) {
            self.view = self
                .view
                .apply(ViewAction::SetPage(page_number), self.page_count());
            self.scroll_target = Some(page_number);
        }
    }

    fn reset_search(&mut self) {
        self.query.clear();
        self.results = Arc::new(SearchResultSet::empty());
        self.skipped_pages.clear();
    }

    /// Surfaces and pages to draw for the current layout
    fn targets(&self) -> Vec<(SurfaceId, u32)> {
        match self.view.layout {
            PageLayout::Continuous => (1..=self.page_count())
                .map(|page_number| (SurfaceId::for_page(page_number), page_number))
                .collect(),
            PageLayout::Paginated => vec![(SurfaceId::PRIMARY, self.view.current_page)],
        }
    }

    /// Render every visible page for the current state
    pub async fn refresh(&mut self) -> RenderSummary {
        let mut summary = RenderSummary::default();
        let Some(document) = self.session.document().cloned() else {
            return summary;
        };

        let targets = self.targets();
        self.surfaces
            .retain(|id, _| targets.iter().any(|(target, _)| target == id));

        for (surface_id, page_number) in targets {
            let surface: SharedSurface = self
                .surfaces
                .entry(surface_id)
                .or_insert_with(RgbaSurface::shared)
                .clone();
            let request = RenderRequest::for_view(&self.view, page_number, Arc::clone(&self.results));

            match self
                .coordinator
                .render_page(&document, surface_id, &surface, &request)
                .await
            {
                Ok(RenderStatus::Drawn { highlights, .. }) => {
                    summary.rendered += 1;
                    summary.highlights += highlights;
                    self.page_errors.remove(&page_number);
                }
                Ok(RenderStatus::Superseded) => summary.superseded += 1,
                Err(e) => {
                    summary.failed += 1;
                    self.page_errors.insert(page_number, e.to_string());
                }
            }
        }

        self.render_passes += 1;
        tracing::debug!(
            view = %self.view,
            rendered = summary.rendered,
            failed = summary.failed,
            highlights = summary.highlights,
            "Render pass complete"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        InMemoryRenderer, MemoryDocument, MemoryPage, Point, ViewBox, Viewport, SAMPLE_SOURCE,
    };
    use crate::render::HighlightPalette;
    use crate::view::{Rotation, Theme};
    use image::{Pixel, Rgba};

    const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn paginated_config() -> ViewerConfig {
        ViewerConfig {
            initial_scale: 1.0,
            layout: PageLayout::Paginated,
            ..ViewerConfig::default()
        }
    }

    async fn sample_viewer(config: ViewerConfig) -> Viewer {
        let mut viewer = Viewer::new(Arc::new(InMemoryRenderer::with_sample()), config);
        viewer.load(SAMPLE_SOURCE).await.unwrap();
        viewer
    }

    fn over_ink(color: Rgba<u8>) -> Rgba<u8> {
        let mut pixel = INK;
        pixel.blend(&color);
        pixel
    }

    fn primary_pixel(viewer: &Viewer, point: Point) -> Rgba<u8> {
        let surface = viewer.surface(SurfaceId::PRIMARY).unwrap().lock();
        surface.pixel(point.x as u32, point.y as u32).unwrap()
    }

    #[tokio::test]
    async fn test_load_renders_every_page_in_continuous_layout() {
        let viewer = sample_viewer(ViewerConfig::default()).await;
        assert_eq!(viewer.status(), &ViewerStatus::Ready);
        assert_eq!(viewer.page_count(), 3);
        assert_eq!(viewer.surfaces().count(), 3);
        assert_eq!(viewer.render_passes(), 1);
        assert!(viewer.page_errors().is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_sets_status() {
        let mut viewer = Viewer::new(Arc::new(InMemoryRenderer::new()), ViewerConfig::default());
        let err = viewer.load("https://example.com/missing.pdf").await.unwrap_err();
        assert!(matches!(err, ViewerError::Load(_)));
        assert!(matches!(viewer.status(), ViewerStatus::Failed(msg) if msg.contains("missing.pdf")));
        assert_eq!(viewer.render_passes(), 0);
    }

    #[tokio::test]
    async fn test_search_jumps_to_first_match_and_wraps() {
        let mut viewer = sample_viewer(ViewerConfig::default()).await;

        let summary = viewer.submit_query("hello").await.unwrap();
        assert_eq!(summary.highlights, 2);
        assert_eq!(viewer.results().len(), 2);
        assert_eq!(viewer.view().current_page, 2);
        assert_eq!(viewer.take_scroll_target(), Some(2));
        assert_eq!(viewer.match_counter().as_deref(), Some("1/2"));

        viewer.next_match().await;
        assert_eq!(viewer.match_counter().as_deref(), Some("2/2"));
        viewer.next_match().await;
        assert_eq!(viewer.match_counter().as_deref(), Some("1/2"));
        viewer.previous_match().await;
        assert_eq!(viewer.match_counter().as_deref(), Some("2/2"));
        assert_eq!(viewer.status_line(), "2/2 | 120%, 0°");
    }

    #[tokio::test]
    async fn test_blank_query_removes_highlights() {
        let mut viewer = sample_viewer(paginated_config()).await;
        viewer.dispatch(ViewAction::SetPage(2)).await;
        let before = viewer.snapshot(SurfaceId::PRIMARY).unwrap();

        viewer.submit_query("hello").await.unwrap();
        assert_ne!(viewer.snapshot(SurfaceId::PRIMARY).unwrap(), before);

        let summary = viewer.submit_query("   ").await.unwrap();
        assert_eq!(summary.highlights, 0);
        assert!(viewer.results().is_empty());
        assert_eq!(viewer.query(), "");
        assert_eq!(viewer.snapshot(SurfaceId::PRIMARY).unwrap(), before);
    }

    #[tokio::test]
    async fn test_navigation_without_results_does_not_render() {
        let mut viewer = sample_viewer(ViewerConfig::default()).await;
        viewer.submit_query("absent").await.unwrap();
        let passes = viewer.render_passes();

        assert_eq!(viewer.next_match().await, RenderSummary::default());
        assert_eq!(viewer.previous_match().await, RenderSummary::default());
        assert_eq!(viewer.render_passes(), passes);
        assert!(viewer.match_counter().is_none());
    }

    #[tokio::test]
    async fn test_one_render_per_transition() {
        let mut viewer = sample_viewer(paginated_config()).await;
        let passes = viewer.render_passes();

        viewer.dispatch(ViewAction::ZoomIn).await;
        assert_eq!(viewer.render_passes(), passes + 1);

        viewer
            .dispatch_all([ViewAction::ZoomIn, ViewAction::RotateRight, ViewAction::NextPage])
            .await;
        assert_eq!(viewer.render_passes(), passes + 2);
        assert_eq!(viewer.view().scale, 1.4);
        assert_eq!(viewer.view().rotation, Rotation::Deg90);
        assert_eq!(viewer.view().current_page, 2);
    }

    #[tokio::test]
    async fn test_highlight_colours_distinguish_current_match() {
        let mut viewer = sample_viewer(paginated_config()).await;
        viewer.submit_query("hello").await.unwrap();
        let palette = HighlightPalette::default();

        // "hello world hello": 17 chars over 170pt at x=72, baseline y=600
        assert_eq!(primary_pixel(&viewer, Point::new(90.0, 185.0)), over_ink(palette.current));
        assert_eq!(primary_pixel(&viewer, Point::new(210.0, 185.0)), over_ink(palette.other));

        viewer.next_match().await;
        assert_eq!(primary_pixel(&viewer, Point::new(90.0, 185.0)), over_ink(palette.other));
        assert_eq!(primary_pixel(&viewer, Point::new(210.0, 185.0)), over_ink(palette.current));
    }

    #[tokio::test]
    async fn test_highlights_follow_rotation() {
        let mut viewer = sample_viewer(paginated_config()).await;
        viewer.submit_query("hello").await.unwrap();
        viewer.dispatch(ViewAction::RotateRight).await;

        let viewport = Viewport::new(ViewBox::sized(612.0, 792.0), 1.0, Rotation::Deg90);
        let center = viewport.transform_point(Point::new(97.0, 606.0));
        let surface_size = viewer.surface(SurfaceId::PRIMARY).unwrap().lock().image().dimensions();

        assert_eq!(surface_size, (792, 612));
        assert_eq!(primary_pixel(&viewer, center), over_ink(HighlightPalette::default().current));
    }

    #[tokio::test]
    async fn test_theme_changes_background() {
        let mut viewer = sample_viewer(paginated_config()).await;
        assert_eq!(primary_pixel(&viewer, Point::new(1.0, 1.0)), Theme::Light.background());

        viewer.dispatch(ViewAction::ToggleTheme).await;
        assert_eq!(primary_pixel(&viewer, Point::new(1.0, 1.0)), Theme::Dark.background());
    }

    #[tokio::test]
    async fn test_failed_page_is_isolated() {
        let renderer = InMemoryRenderer::new();
        renderer.insert(
            "memory://mixed",
            MemoryDocument::new()
                .with_page(MemoryPage::letter().with_run("one", 72.0, 700.0, 30.0, 12.0))
                .with_page(MemoryPage::letter().failing_render())
                .with_page(MemoryPage::letter().with_run("three", 72.0, 700.0, 50.0, 12.0)),
        );
        let mut viewer = Viewer::new(Arc::new(renderer), ViewerConfig::default());

        let summary = viewer.load("memory://mixed").await.unwrap();
        assert_eq!(summary.rendered, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(viewer.page_errors().keys().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(viewer.status(), &ViewerStatus::Ready);
    }

    #[tokio::test]
    async fn test_layout_switch_keeps_only_needed_surfaces() {
        let mut viewer = sample_viewer(ViewerConfig::default()).await;
        viewer.dispatch(ViewAction::SetLayout(PageLayout::Paginated)).await;

        let ids: Vec<SurfaceId> = viewer.surfaces().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![SurfaceId::PRIMARY]);
    }

    #[tokio::test]
    async fn test_reload_clears_search_and_resets_page() {
        let mut viewer = sample_viewer(ViewerConfig::default()).await;
        viewer.submit_query("hello").await.unwrap();
        assert_eq!(viewer.view().current_page, 2);

        viewer.load(SAMPLE_SOURCE).await.unwrap();
        assert!(viewer.results().is_empty());
        assert_eq!(viewer.view().current_page, 1);

        viewer.close();
        assert_eq!(viewer.status(), &ViewerStatus::Empty);
        assert_eq!(viewer.surfaces().count(), 0);
        assert!(matches!(viewer.submit_query("x").await, Err(ViewerError::NoDocument)));
    }
}
