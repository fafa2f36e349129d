//! Search highlight overlay
//!
//! Matches are mapped through the same viewport as the page drawing, so the
//! boxes stay aligned with the text under any scale or rotation.

use image::Rgba;

use crate::document::{Rect, Viewport};
use crate::search::{SearchMatch, SearchResultSet};

use super::surface::Surface;

/// Fallback run height (in device pixels) for runs reporting no height
const FALLBACK_RUN_HEIGHT: f32 = 12.0;

/// Highlight colours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightPalette {
    /// Selected match, `rgba(255, 165, 0, 0.6)`
    pub current: Rgba<u8>,
    /// Every other match, `rgba(255, 255, 0, 0.4)`
    pub other: Rgba<u8>,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            current: Rgba([255, 165, 0, 153]),
            other: Rgba([255, 255, 0, 102]),
        }
    }
}

impl HighlightPalette {
    pub fn color(&self, is_current: bool) -> Rgba<u8> {
        if is_current {
            self.current
        } else {
            self.other
        }
    }
}

/// Device rectangle covering a match, or `None` for an empty run
pub fn match_rect(viewport: &Viewport, m: &SearchMatch) -> Option<Rect> {
    let chars = m.run.char_len();
    if chars == 0 || m.start >= m.end {
        return None;
    }

    let run = &m.run;
    let x0 = run.origin_x + run.width * m.start as f32 / chars as f32;
    let x1 = run.origin_x + run.width * m.end as f32 / chars as f32;
    let height = if run.height > 0.0 {
        run.height
    } else {
        FALLBACK_RUN_HEIGHT / viewport.scale
    };

    Some(viewport.transform_box(x0, run.origin_y, x1, run.origin_y + height))
}

/// Paint the matches of one page, returning how many boxes were drawn
pub fn paint_highlights(
    surface: &mut dyn Surface,
    viewport: &Viewport,
    results: &SearchResultSet,
    page_number: u32,
    palette: &HighlightPalette,
) -> usize {
    let mut painted = 0;
    for (m, is_current) in results.matches_on_page(page_number) {
        if let Some(rect) = match_rect(viewport, m) {
            surface.fill_rect(rect, palette.color(is_current));
            painted += 1;
        }
    }
    painted
}
