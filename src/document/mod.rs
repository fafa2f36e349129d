//! Document boundary
//!
//! The external Document Renderer (parsing, fonts, rasterisation) sits behind
//! [`DocumentRenderer`]. [`DocumentSession`] owns the loaded document and
//! caches per-page text runs for the search engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               DocumentSession               │
//! │  (loaded handle, LRU of text runs per page) │
//! └─────────────────────────────────────────────┘
//!                       │
//!           ┌───────────┴───────────┐
//!           ▼                       ▼
//!   ┌────────────────┐     ┌────────────────┐
//!   │InMemoryRenderer│     │ MupdfRenderer  │
//!   │                │     │ (feature mupdf)│
//!   └────────────────┘     └────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use folio_viewer::document::{DocumentSession, InMemoryRenderer, SAMPLE_SOURCE};
//!
//! let mut session = DocumentSession::new(Arc::new(InMemoryRenderer::with_sample()), 64);
//! session.load(SAMPLE_SOURCE).await?;
//! let runs = session.text_content(2).await?;
//! ```

mod error;
pub mod memory;
mod session;
mod traits;
mod types;

pub use error::{DocumentError, DocumentResult};
pub use memory::{InMemoryRenderer, MemoryDocument, MemoryPage, SAMPLE_SOURCE};
pub use session::{DocumentSession, DEFAULT_TEXT_CACHE_PAGES};
pub use traits::DocumentRenderer;
pub use types::{
    DocumentHandle, PageHandle, Point, Rect, TextRun, Transform, ViewBox, Viewport,
};
