//! MuPDF `DocumentRenderer`
//!
//! Fetches documents over HTTP(S) with reqwest (or reads a local path),
//! extracts one text run per structured-text line and rasterises pages with
//! a matrix derived from the viewport transform.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use mupdf::{Colorspace, Matrix, TextPageOptions};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::document::{
    DocumentError, DocumentHandle, DocumentRenderer, DocumentResult, PageHandle, TextRun, ViewBox,
    Viewport,
};
use crate::render::SharedSurface;

use super::safe::SafeDocument;

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// MuPDF matrix for a viewport.
///
/// The viewport maps y-up page space; MuPDF pages are y-down with the same
/// height, so `y_up = page_height - y_down` is folded into the matrix.
pub fn page_matrix(viewport: &Viewport, page_height: f32) -> [f32; 6] {
    let [a, b, c, d, e, f] = viewport.transform.0;
    [a, b, -c, -d, c * page_height + e, d * page_height + f]
}

fn pixmap_to_image(pixmap: &mupdf::Pixmap) -> DocumentResult<RgbaImage> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for pixel in samples.chunks(n.max(1)).take((width * height) as usize) {
        let r = pixel.first().copied().unwrap_or(0);
        let g = pixel.get(1).copied().unwrap_or(0);
        let b = pixel.get(2).copied().unwrap_or(0);
        let a = if n >= 4 {
            pixel.get(3).copied().unwrap_or(255)
        } else {
            255
        };
        rgba.extend_from_slice(&[r, g, b, a]);
    }

    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| DocumentError::Render("Failed to create image buffer".to_string()))
}

/// Renderer over documents opened with MuPDF
#[derive(Default)]
pub struct MupdfRenderer {
    documents: RwLock<HashMap<String, Arc<SafeDocument>>>,
}

impl MupdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, document: &DocumentHandle) -> DocumentResult<Arc<SafeDocument>> {
        self.documents
            .read()
            .get(document.id())
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(document.id().to_string()))
    }

    async fn fetch(source: &str) -> DocumentResult<Vec<u8>> {
        if is_remote(source) {
            let response = reqwest::get(source).await?.error_for_status()?;
            Ok(response.bytes().await?.to_vec())
        } else {
            Ok(tokio::fs::read(source).await?)
        }
    }
}

#[async_trait]
impl DocumentRenderer for MupdfRenderer {
    async fn open_document(&self, source: &str) -> DocumentResult<DocumentHandle> {
        let data = Self::fetch(source).await?;
        tracing::debug!(source, bytes = data.len(), "Fetched document");

        let doc = tokio::task::spawn_blocking(move || SafeDocument::from_bytes(data))
            .await
            .map_err(|e| DocumentError::Parse(format!("Task join error: {}", e)))??;

        let handle = DocumentHandle::new(source, source, doc.page_count());
        self.documents
            .write()
            .insert(handle.id().to_string(), Arc::new(doc));
        Ok(handle)
    }

    async fn page(&self, document: &DocumentHandle, page_number: u32) -> DocumentResult<PageHandle> {
        if !document.contains_page(page_number) {
            return Err(DocumentError::PageNotFound(page_number));
        }
        let doc = self.get(document)?;

        tokio::task::spawn_blocking(move || {
            doc.with_doc(|mupdf_doc| {
                let bounds = mupdf_doc.load_page(page_number as i32 - 1)?.bounds()?;
                Ok(PageHandle {
                    page_number,
                    view_box: ViewBox::sized(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0),
                })
            })
        })
        .await
        .map_err(|e| DocumentError::Parse(format!("Task join error: {}", e)))?
    }

    async fn text_content(
        &self,
        document: &DocumentHandle,
        page: &PageHandle,
    ) -> DocumentResult<Vec<TextRun>> {
        let doc = self.get(document)?;
        let page_number = page.page_number;

        tokio::task::spawn_blocking(move || {
            doc.with_doc(|mupdf_doc| {
                let mupdf_page = mupdf_doc.load_page(page_number as i32 - 1)?;
                let bounds = mupdf_page.bounds()?;
                let page_height = bounds.y1 - bounds.y0;
                let text_page = mupdf_page
                    .to_text_page(TextPageOptions::empty())
                    .map_err(|e| DocumentError::TextExtraction(e.to_string()))?;

                let mut runs = Vec::new();
                for block in text_page.blocks() {
                    for line in block.lines() {
                        let text: String = line.chars().filter_map(|ch| ch.char()).collect();
                        if text.is_empty() {
                            continue;
                        }
                        let line_bounds = line.bounds();
                        runs.push(TextRun::new(
                            text,
                            line_bounds.x0 - bounds.x0,
                            page_height - (line_bounds.y1 - bounds.y0),
                            line_bounds.x1 - line_bounds.x0,
                            line_bounds.y1 - line_bounds.y0,
                            page_number,
                        ));
                    }
                }
                Ok(runs)
            })
        })
        .await
        .map_err(|e| DocumentError::TextExtraction(format!("Task join error: {}", e)))?
    }

    async fn render_page(
        &self,
        document: &DocumentHandle,
        page: &PageHandle,
        viewport: &Viewport,
        surface: &SharedSurface,
        cancel: &CancellationToken,
    ) -> DocumentResult<()> {
        if cancel.is_cancelled() {
            return Err(DocumentError::Cancelled);
        }
        let doc = self.get(document)?;
        let page_number = page.page_number;
        let [a, b, c, d, e, f] = page_matrix(viewport, page.view_box.height());

        let image = tokio::task::spawn_blocking(move || {
            doc.with_doc(|mupdf_doc| {
                let mupdf_page = mupdf_doc.load_page(page_number as i32 - 1)?;
                let matrix = Matrix::new(a, b, c, d, e, f);
                let pixmap = mupdf_page
                    .to_pixmap(&matrix, &Colorspace::device_rgb(), true, true)
                    .map_err(|e| DocumentError::Render(e.to_string()))?;
                pixmap_to_image(&pixmap)
            })
        })
        .await
        .map_err(|e| DocumentError::Render(format!("Task join error: {}", e)))??;

        let mut canvas = surface.lock();
        if cancel.is_cancelled() {
            return Err(DocumentError::Cancelled);
        }
        canvas.draw_image(0, 0, &image);
        Ok(())
    }

    fn close_document(&self, document: &DocumentHandle) {
        self.documents.write().remove(document.id());
    }
}
