//! The canvas: a clipped, offset-aware drawing surface over a backend.
//!
//! A [`Canvas`] owns the state every drawing call goes through: the dirty
//! list, the scissor and offset stacks, the glyph cache and the begin/end
//! bracket. It translates each request by the current offset, clips it to
//! the current scissor and forwards what remains to its [`CanvasBackend`].
//!
//! Drawing is only valid between [`Canvas::begin`] and [`Canvas::end`].
//! Calls outside a bracket, and calls whose clipped area is empty, do
//! nothing.
//!
//! # Example
//!
//! ```
//! use trellis_render::{Canvas, CanvasConfig, Color, PixelFormat, Rect};
//!
//! let config = CanvasConfig::default().with_size(64, 64);
//! let mut canvas = Canvas::with_memory_backend(&config).unwrap();
//!
//! canvas.begin(None);
//! canvas.set_offset(8, 8);
//! canvas.draw_box(&Rect::from_size(0, 0, 16, 16), Color::WHITE, PixelFormat::Rgb8);
//! canvas.restore_offset();
//! canvas.end();
//! ```

use static_assertions::assert_impl_all;
use tracing::{debug, trace};

use crate::backend::CanvasBackend;
use crate::clip::{ClipState, DEFAULT_STACK_DEPTH};
use crate::dirty::{DEFAULT_DIRTY_CAPACITY, DirtyRects};
use crate::error::{RenderError, RenderResult};
use crate::pixmap::Pixmap;
use crate::software::MemoryBackend;
use crate::text::{
    DEFAULT_GLYPH_ATLAS_SIZE, Font, FontSet, Glyph, GlyphCache, StyleState, TextToken, tokenize,
};
use crate::types::{Color, PixelFormat, Rect};

/// Configuration for creating a [`Canvas`].
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format of the software backend buffer.
    pub format: PixelFormat,
    /// Color used by clear operations.
    pub background: Color,
    /// Dirty rectangles tracked before collapsing into a bounding box.
    pub dirty_capacity: usize,
    /// Depth of the scissor and offset stacks.
    pub stack_depth: usize,
    /// Edge length of the square glyph atlas.
    pub glyph_atlas_size: u32,
    /// Color of the keyboard focus box.
    pub focus_color: Color,
    /// Default text color.
    pub text_color: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            format: PixelFormat::Rgb8,
            background: Color::rgb(0x64, 0x64, 0x64),
            dirty_capacity: DEFAULT_DIRTY_CAPACITY,
            stack_depth: DEFAULT_STACK_DEPTH,
            glyph_atlas_size: DEFAULT_GLYPH_ATLAS_SIZE,
            focus_color: Color::rgb(0x7F, 0x7F, 0xFF),
            text_color: Color::WHITE,
        }
    }
}

impl CanvasConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_dirty_capacity(mut self, capacity: usize) -> Self {
        self.dirty_capacity = capacity;
        self
    }

    pub fn with_stack_depth(mut self, depth: usize) -> Self {
        self.stack_depth = depth;
        self
    }

    pub fn with_glyph_atlas_size(mut self, size: u32) -> Self {
        self.glyph_atlas_size = size;
        self
    }

    pub fn with_focus_color(mut self, color: Color) -> Self {
        self.focus_color = color;
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }
}

/// A drawing surface with clipping, dirty tracking and glyph caching.
pub struct Canvas {
    width: u32,
    height: u32,
    began: bool,
    background: Color,
    focus_color: Color,
    text_color: Color,
    dirty: DirtyRects,
    clip: ClipState,
    glyphs: GlyphCache,
    backend: Box<dyn CanvasBackend>,
}

assert_impl_all!(Canvas: Send);

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("began", &self.began)
            .field("backend", &self.backend.name())
            .field("dirty", &self.dirty.len())
            .field("glyphs", &self.glyphs.len())
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Create a canvas drawing through `backend`.
    pub fn new(config: &CanvasConfig, backend: Box<dyn CanvasBackend>) -> RenderResult<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: config.width,
                height: config.height,
            });
        }

        debug!(
            width = config.width,
            height = config.height,
            backend = backend.name(),
            "creating canvas"
        );

        Ok(Self {
            width: config.width,
            height: config.height,
            began: false,
            background: config.background,
            focus_color: config.focus_color,
            text_color: config.text_color,
            dirty: DirtyRects::new(config.dirty_capacity),
            clip: ClipState::new(config.width, config.height, config.stack_depth),
            glyphs: GlyphCache::new(config.glyph_atlas_size)?,
            backend,
        })
    }

    /// Create a canvas backed by an in-memory pixel buffer.
    pub fn with_memory_backend(config: &CanvasConfig) -> RenderResult<Self> {
        let backend = MemoryBackend::new(config.width, config.height, config.format)?;
        Self::new(config, Box::new(backend))
    }

    // =========================================================================
    // Size and appearance
    // =========================================================================

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The full canvas area.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(0, 0, self.width, self.height)
    }

    /// Change the canvas size. Resizing to the current size does nothing.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }

        debug!(width, height, "resizing canvas");
        self.backend.resize(width, height);
        self.width = width;
        self.height = height;
        self.clip.set_bounds(width, height);
        Ok(())
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.background
    }

    #[inline]
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    #[inline]
    pub fn focus_color(&self) -> Color {
        self.focus_color
    }

    #[inline]
    pub fn set_focus_color(&mut self, color: Color) {
        self.focus_color = color;
    }

    #[inline]
    pub fn text_color(&self) -> Color {
        self.text_color
    }

    #[inline]
    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    /// Create a pixmap usable as a blit/blend source for this canvas.
    pub fn create_pixmap(&self, width: u32, height: u32, format: PixelFormat) -> RenderResult<Pixmap> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        self.backend.create_pixmap(width, height, format)
    }

    // =========================================================================
    // Backend access
    // =========================================================================

    #[inline]
    pub fn backend(&self) -> &dyn CanvasBackend {
        self.backend.as_ref()
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut dyn CanvasBackend {
        self.backend.as_mut()
    }

    /// Downcast the backend to its concrete type.
    pub fn backend_as<T: CanvasBackend>(&self) -> Option<&T> {
        self.backend.as_any().downcast_ref::<T>()
    }

    /// Mutable downcast of the backend to its concrete type.
    pub fn backend_as_mut<T: CanvasBackend>(&mut self) -> Option<&mut T> {
        self.backend.as_any_mut().downcast_mut::<T>()
    }

    // =========================================================================
    // Dirty rectangles
    // =========================================================================

    /// Mark a region as needing a redraw.
    #[inline]
    pub fn add_dirty_rect(&mut self, rect: Rect) {
        self.dirty.add(rect);
    }

    #[inline]
    pub fn clear_dirty_rects(&mut self) {
        self.dirty.clear();
    }

    #[inline]
    pub fn num_dirty_rects(&self) -> usize {
        self.dirty.len()
    }

    #[inline]
    pub fn dirty_rect(&self, index: usize) -> Option<Rect> {
        self.dirty.get(index)
    }

    #[inline]
    pub fn dirty_rects(&self) -> &[Rect] {
        self.dirty.as_slice()
    }

    #[inline]
    pub fn dirty(&self) -> &DirtyRects {
        &self.dirty
    }

    // =========================================================================
    // Begin / end bracket and clipping
    // =========================================================================

    /// Start drawing into `region`, or the whole canvas if `None`.
    ///
    /// The region is clamped to the canvas and becomes the active scissor.
    /// Both stacks are emptied and the offset reset. Calling `begin` while
    /// already drawing does nothing.
    pub fn begin(&mut self, region: Option<Rect>) {
        if self.began {
            trace!("canvas already began");
            return;
        }

        let bounds = self.bounds();
        let region = match region {
            Some(r) => r.repaired().intersect(&bounds).unwrap_or(Rect::EMPTY),
            None => bounds,
        };

        self.backend.begin(&region);
        self.clip.reset(region);
        self.began = true;
    }

    /// Finish drawing. Does nothing if not drawing.
    pub fn end(&mut self) {
        if self.began {
            self.began = false;
            self.backend.end();
        }
    }

    /// Returns `true` between [`begin`](Self::begin) and [`end`](Self::end).
    #[inline]
    pub fn is_drawing(&self) -> bool {
        self.began
    }

    /// Push a scissor rectangle, or pop with a zero width or height.
    ///
    /// See [`ClipState::set_scissor`].
    #[inline]
    pub fn set_scissor_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.clip.set_scissor(x, y, width, height);
    }

    /// The active scissor rectangle in canvas coordinates.
    #[inline]
    pub fn scissor_rect(&self) -> Rect {
        self.clip.scissor()
    }

    /// Save the current offset and add `(x, y)` to it.
    #[inline]
    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.clip.set_offset(x, y);
    }

    /// Restore the previously saved offset.
    #[inline]
    pub fn restore_offset(&mut self) {
        self.clip.restore_offset();
    }

    #[inline]
    pub fn offset(&self) -> (i32, i32) {
        self.clip.offset()
    }

    #[inline]
    pub fn clip_state(&self) -> &ClipState {
        &self.clip
    }

    #[inline]
    pub fn clip_state_mut(&mut self) -> &mut ClipState {
        &mut self.clip
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    fn check_began(&self, op: &'static str) -> bool {
        if !self.began {
            trace!(op, "draw call outside begin/end ignored");
        }
        self.began
    }

    /// Fill `rect` (or the whole canvas) with the background color.
    ///
    /// A given rectangle is offset; the whole-canvas default is not.
    pub fn clear(&mut self, rect: Option<Rect>) {
        if !self.check_began("clear") {
            return;
        }

        let target = match rect {
            Some(r) => self.clip.to_canvas(r),
            None => self.bounds(),
        };
        if let Some(r) = target.intersect(&self.clip.scissor()) {
            self.backend.clear(&r, self.background);
        }
    }

    /// Copy the `src` part (or all) of `pixmap` to `(x, y)`.
    pub fn blit(&mut self, x: i32, y: i32, pixmap: &Pixmap, src: Option<Rect>) {
        if !self.check_began("blit") {
            return;
        }
        if let Some((dx, dy, src)) = self.clip_source(x, y, pixmap.rect(), src) {
            self.backend.blit(dx, dy, pixmap, &src);
        }
    }

    /// Blend the `src` part (or all) of `pixmap` onto `(x, y)`.
    pub fn blend(&mut self, x: i32, y: i32, pixmap: &Pixmap, src: Option<Rect>) {
        if !self.check_began("blend") {
            return;
        }
        if let Some((dx, dy, src)) = self.clip_source(x, y, pixmap.rect(), src) {
            self.backend.blend(dx, dy, pixmap, &src);
        }
    }

    /// Map a source region placed at `(x, y)` into canvas space and clip it.
    fn clip_source(
        &self,
        x: i32,
        y: i32,
        full: Rect,
        src: Option<Rect>,
    ) -> Option<(i32, i32, Rect)> {
        let src = match src {
            Some(r) => full.intersect(&r.repaired())?,
            None => full,
        };
        let (ox, oy) = self.clip.offset();
        self.shrink_to_scissor(x.saturating_add(ox), y.saturating_add(oy), src)
    }

    /// Clip `src`, placed at canvas position `(x, y)`, to the scissor.
    ///
    /// The source is shrunk on each edge by exactly the amount the
    /// destination was shrunk, so the visible part samples the right pixels.
    /// Returns the visible destination corner and the shrunk source.
    fn shrink_to_scissor(&self, x: i32, y: i32, src: Rect) -> Option<(i32, i32, Rect)> {
        let dst = Rect::from_size(
            x,
            y,
            src.width().max(0) as u32,
            src.height().max(0) as u32,
        );
        let visible = dst.intersect(&self.clip.scissor())?;

        let src = Rect::new(
            src.left + (visible.left - dst.left),
            src.top + (visible.top - dst.top),
            src.right - (dst.right - visible.right),
            src.bottom - (dst.bottom - visible.bottom),
        );
        Some((visible.left, visible.top, src))
    }

    /// Fill a rectangle with a color.
    ///
    /// An opaque color is always drawn as [`PixelFormat::Rgb8`].
    pub fn draw_box(&mut self, rect: &Rect, color: Color, format: PixelFormat) {
        if !self.check_began("draw_box") {
            return;
        }
        let format = if format == PixelFormat::Rgba8 && color.is_opaque() {
            PixelFormat::Rgb8
        } else {
            format
        };
        if let Some(r) = self.clip.clip(*rect) {
            self.backend.draw_box(&r, color, format);
        }
    }

    /// Draw a one pixel wide horizontal or vertical line.
    pub fn draw_line(
        &mut self,
        x: i32,
        y: i32,
        length: u32,
        horizontal: bool,
        color: Color,
        format: PixelFormat,
    ) {
        let rect = if horizontal {
            Rect::from_size(x, y, length, 1)
        } else {
            Rect::from_size(x, y, 1, length)
        };
        if length > 0 {
            self.draw_box(&rect, color, format);
        }
    }

    /// Draw a one pixel outline just inside `rect`.
    pub fn draw_frame(&mut self, rect: &Rect, color: Color) {
        let w = rect.width().max(0) as u32;
        let h = rect.height().max(0) as u32;
        if w == 0 || h == 0 {
            return;
        }
        let format = color.format();
        self.draw_line(rect.left, rect.top, w, true, color, format);
        self.draw_line(rect.left, rect.bottom, w, true, color, format);
        self.draw_line(rect.left, rect.top, h, false, color, format);
        self.draw_line(rect.right, rect.top, h, false, color, format);
    }

    // =========================================================================
    // Text
    // =========================================================================

    #[inline]
    pub fn glyph_cache(&self) -> &GlyphCache {
        &self.glyphs
    }

    #[inline]
    pub fn glyph_cache_mut(&mut self) -> &mut GlyphCache {
        &mut self.glyphs
    }

    /// Blend a cached glyph with its pen position at `(x, y)` in canvas
    /// coordinates.
    fn blend_cached_glyph(&mut self, x: i32, y: i32, glyph: &Glyph, color: Color) {
        let Some(atlas_rect) = glyph.atlas_rect else {
            return;
        };
        let Some((dx, dy, src)) =
            self.shrink_to_scissor(x, y.saturating_add(glyph.bearing), atlas_rect)
        else {
            return;
        };
        self.backend
            .blend_glyph(dx, dy, self.glyphs.atlas(), &src, color);
    }

    /// Draw one glyph through the glyph cache and return its width.
    ///
    /// Returns 0 if the glyph could not be cached or the canvas is not
    /// drawing. Blank glyphs report their width but draw nothing.
    pub fn draw_glyph(
        &mut self,
        font: &dyn Font,
        codepoint: char,
        x: i32,
        y: i32,
        color: Color,
    ) -> i32 {
        if !self.check_began("draw_glyph") {
            return 0;
        }
        let Some(glyph) = self.glyphs.fetch(font, codepoint) else {
            return 0;
        };
        let (ox, oy) = self.clip.offset();
        self.blend_cached_glyph(x + ox, y + oy, &glyph, color);
        glyph.advance()
    }

    /// Draw a single line of plain text and return its width in pixels.
    ///
    /// Drawing stops at the first line break. Nothing is drawn (and 0 is
    /// returned) if the start position lies right of or below the scissor.
    pub fn draw_text_plain(
        &mut self,
        font: &dyn Font,
        x: i32,
        y: i32,
        color: Color,
        text: &str,
    ) -> i32 {
        if !self.check_began("draw_text_plain") || text.is_empty() {
            return 0;
        }

        let (ox, oy) = self.clip.offset();
        let (x, y) = (x + ox, y + oy);
        let scissor = self.clip.scissor();
        if x >= scissor.right || y >= scissor.bottom {
            return 0;
        }

        let mut pen = 0;
        let mut prev = None;
        for c in text.chars().take_while(|&c| c != '\n') {
            if let Some(p) = prev {
                pen += font.kerning(p, c);
            }
            if let Some(glyph) = self.glyphs.fetch(font, c) {
                self.blend_cached_glyph(x + pen, y, &glyph, color);
                pen += glyph.advance();
            }
            prev = Some(c);
        }
        pen
    }

    /// Width in pixels of the first line of `text`, without drawing.
    pub fn text_width_plain(&mut self, font: &dyn Font, text: &str) -> i32 {
        let mut width = 0;
        let mut prev = None;
        for c in text.chars().take_while(|&c| c != '\n') {
            if let Some(p) = prev {
                width += font.kerning(p, c);
            }
            if let Some(glyph) = self.glyphs.fetch(font, c) {
                width += glyph.advance();
            }
            prev = Some(c);
        }
        width
    }

    /// Draw multi-line tagged text starting at `(x, y)`.
    ///
    /// See [`rich_text`](crate::text::rich_text) for the tag syntax. Each
    /// line break moves down by the normal face's line height.
    pub fn draw_text(&mut self, fonts: &FontSet, x: i32, y: i32, text: &str) {
        if !self.check_began("draw_text") {
            return;
        }

        let line_height = fonts.height() as i32;
        let mut state = StyleState::new(self.text_color);
        let (mut pen_x, mut pen_y) = (0, y);

        for token in tokenize(text) {
            match token {
                TextToken::Run(run) => {
                    let style = state.style();
                    let font = fonts.select(style.bold, style.italic);
                    pen_x +=
                        self.draw_text_plain(font.as_ref(), x + pen_x, pen_y, state.color(), run);
                }
                TextToken::Newline => {
                    pen_x = 0;
                    pen_y += line_height;
                }
                other => state.apply(&other),
            }
        }
    }

    /// Size of tagged text as `(widest line, line count * line height)`.
    pub fn text_extents(&mut self, fonts: &FontSet, text: &str) -> (u32, u32) {
        if text.is_empty() {
            return (0, 0);
        }

        let mut state = StyleState::new(self.text_color);
        let mut lines = 1u32;
        let mut line_width = 0i32;
        let mut widest = 0i32;

        for token in tokenize(text) {
            match token {
                TextToken::Run(run) => {
                    let style = state.style();
                    let font = fonts.select(style.bold, style.italic);
                    line_width += self.text_width_plain(font.as_ref(), run);
                }
                TextToken::Newline => {
                    widest = widest.max(line_width);
                    line_width = 0;
                    lines += 1;
                }
                other => state.apply(&other),
            }
        }
        widest = widest.max(line_width);

        (widest.max(0) as u32, lines * fonts.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(width: u32, height: u32) -> Canvas {
        let config = CanvasConfig::default()
            .with_size(width, height)
            .with_background(Color::rgb(1, 2, 3));
        Canvas::with_memory_backend(&config).unwrap()
    }

    fn pixel(canvas: &Canvas, x: u32, y: u32) -> Color {
        canvas
            .backend_as::<MemoryBackend>()
            .and_then(|b| b.pixel(x, y))
            .unwrap()
    }

    #[test]
    fn test_zero_size_rejected() {
        let config = CanvasConfig::default().with_size(0, 10);
        assert!(Canvas::with_memory_backend(&config).is_err());
    }

    #[test]
    fn test_begin_clamps_region_and_is_idempotent() {
        let mut canvas = canvas(100, 100);
        canvas.begin(Some(Rect::new(-10, 20, 150, 60)));
        assert_eq!(canvas.scissor_rect(), Rect::new(0, 20, 99, 60));

        canvas.begin(Some(Rect::new(0, 0, 5, 5)));
        assert_eq!(canvas.scissor_rect(), Rect::new(0, 20, 99, 60));
        canvas.end();
        assert!(!canvas.is_drawing());
    }

    #[test]
    fn test_draw_outside_bracket_is_noop() {
        let mut canvas = canvas(10, 10);
        canvas.draw_box(&Rect::new(0, 0, 9, 9), Color::WHITE, PixelFormat::Rgb8);
        assert_eq!(pixel(&canvas, 5, 5), Color::BLACK);
    }

    #[test]
    fn test_draw_box_is_offset_and_clipped() {
        let mut canvas = canvas(20, 20);
        canvas.begin(None);
        canvas.set_offset(5, 5);
        canvas.set_scissor_rect(0, 0, 4, 4);
        canvas.draw_box(&Rect::new(-5, -5, 30, 30), Color::WHITE, PixelFormat::Rgb8);
        canvas.set_scissor_rect(0, 0, 0, 0);
        canvas.restore_offset();
        canvas.end();

        assert_eq!(pixel(&canvas, 5, 5), Color::WHITE);
        assert_eq!(pixel(&canvas, 8, 8), Color::WHITE);
        assert_eq!(pixel(&canvas, 9, 9), Color::BLACK);
        assert_eq!(pixel(&canvas, 4, 5), Color::BLACK);
    }

    #[test]
    fn test_clear_uses_background() {
        let mut canvas = canvas(4, 4);
        canvas.begin(None);
        canvas.clear(Some(Rect::new(0, 0, 1, 1)));
        canvas.end();
        assert_eq!(pixel(&canvas, 1, 1), Color::rgb(1, 2, 3));
        assert_eq!(pixel(&canvas, 2, 2), Color::BLACK);
    }

    #[test]
    fn test_blit_shrinks_source_with_destination() {
        let mut canvas = canvas(10, 10);
        let mut data = Vec::new();
        for v in 0..16u8 {
            data.extend_from_slice(&[v, v, v]);
        }
        let pixmap = Pixmap::from_data(4, 4, PixelFormat::Rgb8, data).unwrap();

        canvas.begin(None);
        // Top-left two columns and rows fall off the canvas.
        canvas.blit(-2, -2, &pixmap, None);
        canvas.end();

        // Source pixel (2, 2) = value 10 lands at (0, 0).
        assert_eq!(pixel(&canvas, 0, 0), Color::rgb(10, 10, 10));
        assert_eq!(pixel(&canvas, 1, 1), Color::rgb(15, 15, 15));
        assert_eq!(pixel(&canvas, 2, 2), Color::BLACK);
    }

    #[test]
    fn test_shrink_to_scissor_trims_matching_edges() {
        let mut canvas = canvas(20, 20);
        canvas.begin(None);
        canvas.set_scissor_rect(5, 5, 10, 10);

        // Overhangs the scissor by 2 on the left and 3 at the bottom.
        let src = Rect::from_size(100, 200, 8, 8);
        assert_eq!(
            canvas.shrink_to_scissor(3, 10, src),
            Some((5, 10, Rect::new(102, 200, 107, 204)))
        );
        assert_eq!(canvas.shrink_to_scissor(15, 15, src), None);

        // Blits go through the same path once the offset is applied.
        canvas.set_offset(-2, 5);
        assert_eq!(
            canvas.clip_source(5, 5, src, None),
            canvas.shrink_to_scissor(3, 10, src)
        );
        canvas.end();
    }

    #[test]
    fn test_resize_updates_bounds() {
        let mut canvas = canvas(10, 10);
        canvas.resize(30, 20).unwrap();
        assert_eq!(canvas.size(), (30, 20));
        assert_eq!(canvas.bounds(), Rect::new(0, 0, 29, 19));
        assert!(canvas.resize(0, 5).is_err());
        assert_eq!(
            canvas.backend_as::<MemoryBackend>().unwrap().buffer().size(),
            (30, 20)
        );
    }

    #[test]
    fn test_dirty_rect_inspection() {
        let mut canvas = canvas(50, 50);
        canvas.add_dirty_rect(Rect::new(0, 0, 4, 4));
        canvas.add_dirty_rect(Rect::new(20, 20, 24, 24));
        assert_eq!(canvas.num_dirty_rects(), 2);
        assert_eq!(canvas.dirty_rect(1), Some(Rect::new(20, 20, 24, 24)));
        assert_eq!(canvas.dirty_rect(2), None);
        canvas.clear_dirty_rects();
        assert!(canvas.dirty_rects().is_empty());
    }

    #[test]
    fn test_create_pixmap() {
        let canvas = canvas(8, 8);
        let map = canvas.create_pixmap(3, 2, PixelFormat::Rgba8).unwrap();
        assert_eq!(map.size(), (3, 2));
        assert!(canvas.create_pixmap(0, 2, PixelFormat::Rgba8).is_err());
    }
}
