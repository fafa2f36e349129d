//! Core document types
//!
//! Page-space geometry, viewports and the text runs the search engine works on.
//! Page space follows PDF conventions: units are points, origin at the
//! bottom-left of the page box, y grows upwards.

use serde::{Deserialize, Serialize};

use crate::view::Rotation;

/// A point in page or device space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Rectangle in device space (origin top-left)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Smallest rectangle covering both points
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::from_ltrb(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Page box in page space (`[x0, y0, x1, y1]`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl ViewBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Page box anchored at the origin
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }
}

/// Affine transform `[a, b, c, d, e, f]`
///
/// Maps `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform(pub [f32; 6]);

impl Transform {
    pub const IDENTITY: Transform = Transform([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    pub fn apply(&self, point: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        Point::new(a * point.x + c * point.y + e, b * point.x + d * point.y + f)
    }
}

/// Scale/rotation-specific mapping from page space to device pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Device width in pixels (unrounded)
    pub width: f32,
    /// Device height in pixels (unrounded)
    pub height: f32,
    pub scale: f32,
    pub rotation: Rotation,
    pub transform: Transform,
}

impl Viewport {
    /// Build the viewport for a page box.
    ///
    /// Rotation is clockwise; the y axis is flipped so device space has its
    /// origin at the top-left corner of the rotated page.
    pub fn new(view_box: ViewBox, scale: f32, rotation: Rotation) -> Self {
        let center_x = (view_box.x0 + view_box.x1) / 2.0;
        let center_y = (view_box.y0 + view_box.y1) / 2.0;

        let (rotate_a, rotate_b, rotate_c, rotate_d) = match rotation {
            Rotation::Deg0 => (1.0, 0.0, 0.0, -1.0),
            Rotation::Deg90 => (0.0, 1.0, 1.0, 0.0),
            Rotation::Deg180 => (-1.0, 0.0, 0.0, 1.0),
            Rotation::Deg270 => (0.0, -1.0, -1.0, 0.0),
        };

        let (offset_x, offset_y, width, height) = if rotate_a == 0.0 {
            (
                (center_y - view_box.y0).abs() * scale,
                (center_x - view_box.x0).abs() * scale,
                view_box.height() * scale,
                view_box.width() * scale,
            )
        } else {
            (
                (center_x - view_box.x0).abs() * scale,
                (center_y - view_box.y0).abs() * scale,
                view_box.width() * scale,
                view_box.height() * scale,
            )
        };

        let transform = Transform([
            rotate_a * scale,
            rotate_b * scale,
            rotate_c * scale,
            rotate_d * scale,
            offset_x - rotate_a * scale * center_x - rotate_c * scale * center_y,
            offset_y - rotate_b * scale * center_x - rotate_d * scale * center_y,
        ]);

        Self {
            width,
            height,
            scale,
            rotation,
            transform,
        }
    }

    /// Canvas dimensions in whole pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width.floor() as u32).max(1),
            (self.height.floor() as u32).max(1),
        )
    }

    pub fn transform_point(&self, point: Point) -> Point {
        self.transform.apply(point)
    }

    /// Map a page-space box (`[x0, y0]`–`[x1, y1]`) to a device rectangle
    pub fn transform_box(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
        Rect::from_corners(
            self.transform_point(Point::new(x0, y0)),
            self.transform_point(Point::new(x1, y1)),
        )
    }
}

/// Loaded document, owned by the document session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHandle {
    id: String,
    source: String,
    page_count: u32,
}

impl DocumentHandle {
    pub fn new(id: impl Into<String>, source: impl Into<String>, page_count: u32) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            page_count,
        }
    }

    /// Renderer-side identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// URL or path the document was loaded from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn contains_page(&self, page_number: u32) -> bool {
        (1..=self.page_count).contains(&page_number)
    }
}

/// A single page of a loaded document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHandle {
    /// Page number (1-indexed)
    pub page_number: u32,
    pub view_box: ViewBox,
}

/// Contiguous span of extracted text with its page-space geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    /// Baseline-left corner, page space
    pub origin_x: f32,
    pub origin_y: f32,
    /// Advance width in page units
    pub width: f32,
    /// Glyph height in page units (0 when the renderer does not know)
    pub height: f32,
    /// Page number (1-indexed)
    pub page_number: u32,
}

impl TextRun {
    pub fn new(
        text: impl Into<String>,
        origin_x: f32,
        origin_y: f32,
        width: f32,
        height: f32,
        page_number: u32,
    ) -> Self {
        Self {
            text: text.into(),
            origin_x,
            origin_y,
            width,
            height,
            page_number,
        }
    }

    /// Length in characters, the unit match offsets are expressed in
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
