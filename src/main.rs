//! Folio Viewer
//!
//! Opens a document, optionally searches it, and writes PNG snapshots of the
//! rendered pages.
//!
//! Usage: `folio-viewer [query]`

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_viewer::document::{DocumentRenderer, InMemoryRenderer, SAMPLE_SOURCE};
use folio_viewer::{RenderSummary, ViewState, Viewer, ViewerConfig, ViewerStatus};

/// Written next to the snapshots as `report.json`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    source: &'a str,
    status: &'a ViewerStatus,
    page_count: u32,
    view: ViewState,
    query: &'a str,
    match_counter: Option<String>,
    skipped_pages: &'a [u32],
    page_errors: Vec<(u32, &'a str)>,
    last_render: RenderSummary,
}

fn select_renderer(config: &ViewerConfig) -> (Arc<dyn DocumentRenderer>, String) {
    #[cfg(feature = "mupdf")]
    if let Some(url) = &config.source_url {
        return (
            Arc::new(folio_viewer::formats::pdf::MupdfRenderer::new()),
            url.clone(),
        );
    }

    if let Some(url) = &config.source_url {
        tracing::warn!(
            "Built without the mupdf feature, ignoring {} and opening the sample document",
            url
        );
    }
    (
        Arc::new(InMemoryRenderer::with_sample()),
        SAMPLE_SOURCE.to_string(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_viewer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = ViewerConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        ViewerConfig::default()
    });

    tracing::info!("Starting Folio Viewer v{}", env!("CARGO_PKG_VERSION"));

    let (renderer, source) = select_renderer(&config);
    let output_dir = config.output_dir.clone();
    let mut viewer = Viewer::new(renderer, config);

    let mut last_render = viewer
        .load(&source)
        .await
        .with_context(|| format!("Failed to open {}", source))?;
    tracing::info!(
        pages = viewer.page_count(),
        rendered = last_render.rendered,
        failed = last_render.failed,
        "Document ready"
    );

    if let Some(query) = std::env::args().nth(1) {
        last_render = viewer.submit_query(&query).await?;
        tracing::info!(
            query = %query,
            matches = viewer.results().len(),
            highlights = last_render.highlights,
            "{}",
            viewer.status_line()
        );
        for page in viewer.skipped_pages() {
            tracing::warn!(page, "Page text unavailable, not searched");
        }
    }

    for (page, error) in viewer.page_errors() {
        tracing::warn!(page, error = %error, "Page failed to render");
    }

    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    for (surface_id, surface) in viewer.surfaces() {
        let path = output_dir.join(format!("surface-{:03}.png", surface_id.0));
        surface
            .lock()
            .save_png(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Wrote snapshot");
    }

    let report = Report {
        source: &source,
        status: viewer.status(),
        page_count: viewer.page_count(),
        view: viewer.view(),
        query: viewer.query(),
        match_counter: viewer.match_counter(),
        skipped_pages: viewer.skipped_pages(),
        page_errors: viewer
            .page_errors()
            .iter()
            .map(|(page, error)| (*page, error.as_str()))
            .collect(),
        last_render,
    };
    let report_path = output_dir.join("report.json");
    tokio::fs::write(&report_path, serde_json::to_vec_pretty(&report)?)
        .await
        .with_context(|| format!("Failed to write {}", report_path.display()))?;

    Ok(())
}
