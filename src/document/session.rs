//! Document session
//!
//! Owns the loaded [`DocumentHandle`] and wraps the renderer's page and text
//! capabilities. Text runs are cached per page (LRU) until the next load or
//! close.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use super::error::{DocumentError, DocumentResult};
use super::traits::DocumentRenderer;
use super::types::{DocumentHandle, PageHandle, TextRun};

/// Default number of pages whose text runs are kept in memory
pub const DEFAULT_TEXT_CACHE_PAGES: usize = 256;

/// Load lifecycle around a [`DocumentRenderer`]
pub struct DocumentSession {
    renderer: Arc<dyn DocumentRenderer>,
    document: Option<DocumentHandle>,
    text_cache: Mutex<LruCache<u32, Arc<Vec<TextRun>>>>,
    /// Bumped on every load and close
    generation: u64,
}

impl DocumentSession {
    pub fn new(renderer: Arc<dyn DocumentRenderer>, text_cache_pages: usize) -> Self {
        let cache_size = NonZeroUsize::new(text_cache_pages)
            .or(NonZeroUsize::new(DEFAULT_TEXT_CACHE_PAGES))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            renderer,
            document: None,
            text_cache: Mutex::new(LruCache::new(cache_size)),
            generation: 0,
        }
    }

    pub fn renderer(&self) -> &Arc<dyn DocumentRenderer> {
        &self.renderer
    }

    /// Currently loaded document
    pub fn document(&self) -> Option<&DocumentHandle> {
        self.document.as_ref()
    }

    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, DocumentHandle::page_count)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Load a document, replacing the current one.
    ///
    /// The previous document is closed first, so a failed load leaves the
    /// session empty.
    pub async fn load(&mut self, source: &str) -> DocumentResult<&DocumentHandle> {
        self.close();
        tracing::info!(source, "Loading document");

        let handle = self.renderer.open_document(source).await.map_err(|e| {
            tracing::error!(source, error = %e, "Failed to load document");
            e
        })?;

        if handle.page_count() == 0 {
            self.renderer.close_document(&handle);
            return Err(DocumentError::Parse(format!(
                "Document {} has no pages",
                source
            )));
        }

        tracing::info!(
            source,
            id = handle.id(),
            pages = handle.page_count(),
            "Document loaded"
        );
        Ok(&*self.document.insert(handle))
    }

    /// Drop the current document and everything derived from it
    pub fn close(&mut self) {
        if let Some(document) = self.document.take() {
            tracing::debug!(id = document.id(), "Closing document");
            self.renderer.close_document(&document);
        }
        self.text_cache.lock().clear();
        self.generation += 1;
    }

    fn loaded(&self) -> DocumentResult<&DocumentHandle> {
        self.document.as_ref().ok_or(DocumentError::NotLoaded)
    }

    /// Look up a page (1-indexed)
    pub async fn page(&self, page_number: u32) -> DocumentResult<PageHandle> {
        let document = self.loaded()?;
        if !document.contains_page(page_number) {
            return Err(DocumentError::PageNotFound(page_number));
        }
        self.renderer.page(document, page_number).await
    }

    /// Text runs of a page, served from the cache when possible
    pub async fn text_content(&self, page_number: u32) -> DocumentResult<Arc<Vec<TextRun>>> {
        let cached = self.text_cache.lock().get(&page_number).cloned();
        if let Some(runs) = cached {
            return Ok(runs);
        }

        let document = self.loaded()?;
        let page = self.page(page_number).await?;
        let runs = Arc::new(self.renderer.text_content(document, &page).await?);

        self.text_cache.lock().put(page_number, Arc::clone(&runs));
        Ok(runs)
    }

    /// Number of pages with cached text
    pub fn cached_text_pages(&self) -> usize {
        self.text_cache.lock().len()
    }
}
