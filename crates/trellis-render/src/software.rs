//! Software backend drawing into an in-memory pixel buffer.
//!
//! [`MemoryBackend`] keeps an RGB8 or RGBA8 [`Pixmap`] the size of the
//! canvas. It is used for off-screen rendering, for uploading finished frames
//! to a platform window, and for inspecting output in tests.

use std::any::Any;

use crate::backend::CanvasBackend;
use crate::error::{RenderError, RenderResult};
use crate::pixmap::{Pixmap, convert_pixel};
use crate::types::{Color, PixelFormat, Rect};

/// A canvas backend that renders into a CPU pixel buffer.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    buffer: Pixmap,
}

impl MemoryBackend {
    /// Create a backend with a zero-filled buffer.
    ///
    /// Only [`PixelFormat::Rgb8`] and [`PixelFormat::Rgba8`] buffers are
    /// supported.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> RenderResult<Self> {
        if format == PixelFormat::A8 {
            return Err(RenderError::UnsupportedFormat {
                format,
                operation: "memory backend buffer",
            });
        }

        Ok(Self {
            buffer: Pixmap::new(width, height, format)?,
        })
    }

    /// The backing pixel buffer.
    #[inline]
    pub fn buffer(&self) -> &Pixmap {
        &self.buffer
    }

    /// Read back the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let px = self.buffer.pixel(x, y)?;
        Some(match self.buffer.format() {
            PixelFormat::Rgba8 => Color::rgba(px[0], px[1], px[2], px[3]),
            _ => Color::rgb(px[0], px[1], px[2]),
        })
    }

    fn offset_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.buffer.width() || y as u32 >= self.buffer.height() {
            return None;
        }
        let bpp = self.buffer.format().bytes_per_pixel();
        Some(y as usize * self.buffer.stride() + x as usize * bpp)
    }

    fn write_color(&mut self, offset: usize, color: Color) {
        let has_alpha = self.buffer.format() == PixelFormat::Rgba8;
        let data = self.buffer.data_mut();
        data[offset] = color.r;
        data[offset + 1] = color.g;
        data[offset + 2] = color.b;
        if has_alpha {
            data[offset + 3] = color.a;
        }
    }

    fn blend_color(&mut self, offset: usize, color: Color, coverage: u8) {
        let alpha = mul_div255(color.a, coverage);
        if alpha == 0 {
            return;
        }

        let has_alpha = self.buffer.format() == PixelFormat::Rgba8;
        let data = self.buffer.data_mut();
        data[offset] = lerp(data[offset], color.r, alpha);
        data[offset + 1] = lerp(data[offset + 1], color.g, alpha);
        data[offset + 2] = lerp(data[offset + 2], color.b, alpha);
        if has_alpha {
            let dst_a = data[offset + 3];
            data[offset + 3] = alpha.saturating_add(mul_div255(dst_a, 255 - alpha));
        }
    }

    /// Visit every pixel of `src` mapped to `(x, y)`, clipped to the buffer.
    fn for_each_mapped(
        &mut self,
        x: i32,
        y: i32,
        src: &Rect,
        mut f: impl FnMut(&mut Self, usize, u32, u32),
    ) {
        for row in 0..src.height().max(0) {
            for col in 0..src.width().max(0) {
                let Some(offset) = self.offset_of(x + col, y + row) else {
                    continue;
                };
                let sx = src.left + col;
                let sy = src.top + row;
                if sx < 0 || sy < 0 {
                    continue;
                }
                f(&mut *self, offset, sx as u32, sy as u32);
            }
        }
    }
}

#[inline]
fn mul_div255(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

#[inline]
fn lerp(dst: u8, src: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8
}

impl CanvasBackend for MemoryBackend {
    fn resize(&mut self, width: u32, height: u32) {
        if let Ok(buffer) = Pixmap::new(width, height, self.buffer.format()) {
            self.buffer = buffer;
        }
    }

    fn clear(&mut self, rect: &Rect, background: Color) {
        self.draw_box(rect, background, PixelFormat::Rgb8);
        if self.buffer.format() == PixelFormat::Rgba8 {
            for y in rect.top..=rect.bottom {
                for x in rect.left..=rect.right {
                    if let Some(offset) = self.offset_of(x, y) {
                        self.buffer.data_mut()[offset + 3] = background.a;
                    }
                }
            }
        }
    }

    fn blit(&mut self, x: i32, y: i32, pixmap: &Pixmap, src: &Rect) {
        let dst_format = self.buffer.format();
        let dst_bpp = dst_format.bytes_per_pixel();
        self.for_each_mapped(x, y, src, |this, offset, sx, sy| {
            if let Some(px) = pixmap.pixel(sx, sy) {
                let dst = &mut this.buffer.data_mut()[offset..offset + dst_bpp];
                convert_pixel(px, pixmap.format(), dst, dst_format);
            }
        });
    }

    fn blend(&mut self, x: i32, y: i32, pixmap: &Pixmap, src: &Rect) {
        match pixmap.format() {
            PixelFormat::Rgb8 => self.blit(x, y, pixmap, src),
            PixelFormat::Rgba8 => self.for_each_mapped(x, y, src, |this, offset, sx, sy| {
                if let Some(px) = pixmap.pixel(sx, sy) {
                    let color = Color::rgba(px[0], px[1], px[2], px[3]);
                    this.blend_color(offset, color, 0xFF);
                }
            }),
            PixelFormat::A8 => self.blend_glyph(x, y, pixmap, src, Color::WHITE),
        }
    }

    fn blend_glyph(&mut self, x: i32, y: i32, atlas: &Pixmap, src: &Rect, color: Color) {
        if atlas.format() != PixelFormat::A8 {
            self.blend(x, y, atlas, src);
            return;
        }

        self.for_each_mapped(x, y, src, |this, offset, sx, sy| {
            if let Some(px) = atlas.pixel(sx, sy) {
                this.blend_color(offset, color, px[0]);
            }
        });
    }

    fn draw_box(&mut self, rect: &Rect, color: Color, format: PixelFormat) {
        let opaque = format != PixelFormat::Rgba8 || color.is_opaque();
        for y in rect.top..=rect.bottom {
            for x in rect.left..=rect.right {
                let Some(offset) = self.offset_of(x, y) else {
                    continue;
                };
                if opaque {
                    self.write_color(offset, Color { a: 0xFF, ..color });
                } else {
                    self.blend_color(offset, color, 0xFF);
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_coverage_buffer() {
        assert!(matches!(
            MemoryBackend::new(4, 4, PixelFormat::A8),
            Err(RenderError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_draw_box_opaque() {
        let mut backend = MemoryBackend::new(4, 4, PixelFormat::Rgb8).unwrap();
        backend.draw_box(&Rect::new(1, 1, 2, 2), Color::rgb(10, 20, 30), PixelFormat::Rgb8);

        assert_eq!(backend.pixel(1, 1), Some(Color::rgb(10, 20, 30)));
        assert_eq!(backend.pixel(2, 2), Some(Color::rgb(10, 20, 30)));
        assert_eq!(backend.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(backend.pixel(3, 1), Some(Color::BLACK));
    }

    #[test]
    fn test_draw_box_blends_translucent() {
        let mut backend = MemoryBackend::new(1, 1, PixelFormat::Rgb8).unwrap();
        backend.clear(&Rect::new(0, 0, 0, 0), Color::WHITE);
        backend.draw_box(&Rect::new(0, 0, 0, 0), Color::rgba(0, 0, 0, 0), PixelFormat::Rgba8);
        assert_eq!(backend.pixel(0, 0), Some(Color::WHITE));

        backend.draw_box(&Rect::new(0, 0, 0, 0), Color::rgba(0, 0, 0, 255), PixelFormat::Rgba8);
        assert_eq!(backend.pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_clear_writes_background_alpha() {
        let mut backend = MemoryBackend::new(2, 1, PixelFormat::Rgba8).unwrap();
        backend.clear(&Rect::new(0, 0, 1, 0), Color::rgba(1, 2, 3, 4));
        assert_eq!(backend.pixel(1, 0), Some(Color::rgba(1, 2, 3, 4)));
    }

    #[test]
    fn test_blit_subregion() {
        let mut backend = MemoryBackend::new(4, 4, PixelFormat::Rgb8).unwrap();
        let mut src = Pixmap::new(2, 2, PixelFormat::Rgb8).unwrap();
        src.load(0, 0, &[9, 9, 9, 1, 2, 3, 4, 5, 6, 7, 8, 9], 0, 0, 2, 2, 2, PixelFormat::Rgb8)
            .unwrap();

        backend.blit(3, 3, &src, &Rect::new(1, 1, 1, 1));
        assert_eq!(backend.pixel(3, 3), Some(Color::rgb(7, 8, 9)));
        assert_eq!(backend.pixel(2, 2), Some(Color::BLACK));
    }

    #[test]
    fn test_blend_glyph_uses_coverage() {
        let mut backend = MemoryBackend::new(2, 1, PixelFormat::Rgb8).unwrap();
        let atlas = Pixmap::from_data(2, 1, PixelFormat::A8, vec![255, 0]).unwrap();

        backend.blend_glyph(0, 0, &atlas, &Rect::new(0, 0, 1, 0), Color::rgb(200, 100, 50));
        assert_eq!(backend.pixel(0, 0), Some(Color::rgb(200, 100, 50)));
        assert_eq!(backend.pixel(1, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_resize_reallocates() {
        let mut backend = MemoryBackend::new(2, 2, PixelFormat::Rgba8).unwrap();
        backend.resize(5, 3);
        assert_eq!(backend.buffer().size(), (5, 3));
        assert_eq!(backend.buffer().format(), PixelFormat::Rgba8);
    }
}
