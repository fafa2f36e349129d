//! Format-specific document renderers
//!
//! Implementations of [`DocumentRenderer`](crate::document::DocumentRenderer)
//! backed by real document engines. Enabled with cargo features.

#[cfg(feature = "mupdf")]
pub mod pdf;
