//! Folio Viewer
//!
//! Core of a PDF viewing widget: document loading through an external
//! renderer, page rendering with cancellation, zoom/rotation/page view state,
//! dark mode and in-document text search with highlighting.
//!
//! # Modules
//!
//! - `document`: renderer boundary, document session, in-memory renderer
//! - `view`: view state and its transitions
//! - `search`: text search and result navigation
//! - `render`: surfaces, render tasks, highlight overlay, coordinator
//! - `viewer`: controller tying the above together
//! - `formats`: engine-backed renderers (`mupdf` feature)
//! - `config`: environment-driven configuration

pub mod config;
pub mod document;
pub mod error;
pub mod formats;
pub mod render;
pub mod search;
pub mod view;
pub mod viewer;

pub use config::ViewerConfig;
pub use document::{DocumentError, DocumentHandle, DocumentRenderer, PageHandle, TextRun, Viewport};
pub use error::{Result, ViewerError};
pub use render::{RenderCoordinator, RenderRequest, RenderStatus, SurfaceId};
pub use search::{SearchMatch, SearchOptions, SearchResultSet};
pub use view::{PageLayout, Rotation, Theme, ViewAction, ViewState};
pub use viewer::{RenderSummary, Viewer, ViewerStatus};
