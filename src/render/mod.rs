//! Page rendering
//!
//! - `surface`: drawing targets ([`Surface`], [`RgbaSurface`])
//! - `task`: cancellable wrapper around a renderer's page drawing
//! - `highlight`: search match overlay
//! - `coordinator`: per-surface scheduling, background fill and overlay

mod coordinator;
mod highlight;
mod surface;
mod task;

pub use coordinator::{RenderCoordinator, RenderRequest, RenderStatus, SurfaceId};
pub use highlight::{match_rect, paint_highlights, HighlightPalette};
pub use surface::{RgbaSurface, SharedSurface, Surface};
pub use task::{RenderOutcome, RenderTask};
