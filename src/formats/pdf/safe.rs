//! Thread-safe document wrapper for MuPDF
//!
//! MuPDF documents are not thread-safe. The wrapper keeps the document bytes
//! and opens a fresh document for each operation, serialized through a
//! `parking_lot::Mutex`.

use std::sync::Arc;

use mupdf::Document;
use parking_lot::Mutex;

use crate::document::DocumentResult;

const PDF_MIME: &str = "application/pdf";

pub struct SafeDocument {
    data: Arc<Vec<u8>>,
    page_count: u32,
    lock: Mutex<()>,
}

// SAFETY: the only fields are owned bytes behind an Arc, a plain count and a
// parking_lot mutex. No MuPDF object outlives `with_doc`, which holds `lock`
// for the whole time a document is open.
unsafe impl Send for SafeDocument {}
unsafe impl Sync for SafeDocument {}

impl SafeDocument {
    /// Validate the bytes as a PDF and record its page count
    pub fn from_bytes(data: Vec<u8>) -> DocumentResult<Self> {
        let doc = Document::from_bytes(&data, PDF_MIME)?;
        let page_count = doc.page_count()?.max(0) as u32;

        Ok(Self {
            data: Arc::new(data),
            page_count,
            lock: Mutex::new(()),
        })
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Run `f` against a freshly opened document
    pub fn with_doc<F, R>(&self, f: F) -> DocumentResult<R>
    where
        F: FnOnce(&Document) -> DocumentResult<R>,
    {
        let _guard = self.lock.lock();
        let doc = Document::from_bytes(&self.data, PDF_MIME)?;
        f(&doc)
    }
}
