//! Drawing surfaces
//!
//! A surface is the canvas a page is drawn onto. Only the render coordinator
//! and the render task it spawned write to a surface.

use std::path::Path;
use std::sync::Arc;

use image::{imageops, ImageResult, Pixel, Rgba, RgbaImage};
use parking_lot::Mutex;

use crate::document::Rect;

/// Canvas-like drawing target
pub trait Surface: Send {
    /// Resize the surface; contents are unspecified afterwards
    fn resize(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    /// Paint every pixel with `color`
    fn fill(&mut self, color: Rgba<u8>);

    /// Alpha-blend `color` over the pixels covered by `rect`
    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>);

    /// Alpha-blend an image with its top-left corner at `(x, y)`
    fn draw_image(&mut self, x: i64, y: i64, image: &RgbaImage);
}

/// Surface shared between the coordinator and an in-flight render task
pub type SharedSurface = Arc<Mutex<dyn Surface>>;

/// In-memory RGBA surface
#[derive(Debug, Clone)]
pub struct RgbaSurface {
    image: RgbaImage,
}

impl Default for RgbaSurface {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl RgbaSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    /// Wrap a new surface for sharing with the coordinator
    pub fn shared() -> Arc<Mutex<RgbaSurface>> {
        Arc::new(Mutex::new(Self::default()))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Copy of the current pixels
    pub fn snapshot(&self) -> RgbaImage {
        self.image.clone()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.image.width() && y < self.image.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }

    /// Pixel span covered by `[start, end)` after rounding, clipped to `limit`
    fn span(start: f32, end: f32, limit: u32) -> std::ops::Range<u32> {
        let lo = start.round().max(0.0).min(limit as f32) as u32;
        let hi = end.round().max(0.0).min(limit as f32) as u32;
        lo..hi.max(lo)
    }
}

impl Surface for RgbaSurface {
    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }

    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        if rect.is_empty() {
            return;
        }
        let xs = Self::span(rect.x, rect.right(), self.image.width());
        let ys = Self::span(rect.y, rect.bottom(), self.image.height());
        for y in ys {
            for x in xs.clone() {
                self.image.get_pixel_mut(x, y).blend(&color);
            }
        }
    }

    fn draw_image(&mut self, x: i64, y: i64, image: &RgbaImage) {
        imageops::overlay(&mut self.image, image, x, y);
    }
}
