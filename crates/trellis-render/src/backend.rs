//! The drawing backend abstraction.
//!
//! A [`CanvasBackend`] is the rendering technology behind a
//! [`Canvas`](crate::Canvas): a memory buffer, a platform window surface, or
//! a GPU context. The canvas does all translation and clipping; every
//! rectangle a backend receives is already in canvas coordinates, inside the
//! canvas bounds and inside the active scissor. Backends never see empty
//! rectangles.
//!
//! Backends are released by dropping them.

use std::any::Any;

use crate::error::RenderResult;
use crate::pixmap::Pixmap;
use crate::types::{Color, PixelFormat, Rect};

/// Operations a rendering technology must provide to back a canvas.
pub trait CanvasBackend: Send + Any {
    /// Called when the canvas enters a begin/end bracket. `region` is the
    /// area that will be drawn, already clamped to the canvas.
    fn begin(&mut self, region: &Rect) {
        let _ = region;
    }

    /// Called when the canvas leaves a begin/end bracket.
    fn end(&mut self) {}

    /// The canvas changed size.
    fn resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Fill `rect` with the canvas background color.
    fn clear(&mut self, rect: &Rect, background: Color);

    /// Copy the `src` region of `pixmap` to `(x, y)` without blending.
    fn blit(&mut self, x: i32, y: i32, pixmap: &Pixmap, src: &Rect);

    /// Alpha-blend the `src` region of `pixmap` onto `(x, y)`.
    fn blend(&mut self, x: i32, y: i32, pixmap: &Pixmap, src: &Rect);

    /// Blend a glyph from a coverage atlas, tinted with `color`.
    ///
    /// `src` is the glyph's rectangle inside `atlas`, already shrunk to the
    /// visible part; `(x, y)` is where its top-left pixel lands.
    fn blend_glyph(&mut self, x: i32, y: i32, atlas: &Pixmap, src: &Rect, color: Color);

    /// Fill `rect` with `color`. With [`PixelFormat::Rgb8`] the color is
    /// written as-is; with [`PixelFormat::Rgba8`] it is blended.
    fn draw_box(&mut self, rect: &Rect, color: Color, format: PixelFormat);

    /// Create a pixmap suitable as a blit/blend source for this backend.
    fn create_pixmap(&self, width: u32, height: u32, format: PixelFormat) -> RenderResult<Pixmap> {
        Pixmap::new(width, height, format)
    }

    /// Short name of the backend, for logging.
    fn name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete backend.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete backend.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
