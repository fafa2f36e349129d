//! PDF support via MuPDF
//!
//! - `safe`: thread-safe wrapper around MuPDF documents
//! - `renderer`: `DocumentRenderer` implementation

mod renderer;
mod safe;

pub use renderer::{page_matrix, MupdfRenderer};
pub use safe::SafeDocument;
