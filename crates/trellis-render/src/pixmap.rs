//! CPU-side pixel buffers.
//!
//! A [`Pixmap`] is a row-major byte buffer in one of the [`PixelFormat`]s.
//! Pixmaps are the source of blit and blend operations and back the glyph
//! atlas.

use crate::error::{RenderError, RenderResult};
use crate::types::{PixelFormat, Rect};

/// A row-major pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl std::fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pixmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Pixmap {
    /// Create a zero-filled pixmap.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }

        let len = width as usize * height as usize * format.bytes_per_pixel();
        Ok(Self {
            width,
            height,
            format,
            data: vec![0; len],
        })
    }

    /// Create a pixmap from existing tightly packed pixel data.
    pub fn from_data(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }

        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The full pixmap area as a rectangle at the origin.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_size(0, 0, self.width, self.height)
    }

    /// Raw pixel bytes, row-major, tightly packed.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw pixel bytes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// The bytes of the pixel at `(x, y)`, if it lies inside the pixmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let start = y as usize * self.stride() + x as usize * bpp;
        self.data.get(start..start + bpp)
    }

    /// Set every byte of the buffer to zero.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Copy a region of external pixel data into the pixmap.
    ///
    /// `src` holds rows of `scan` pixels in `src_format`. The `width` by
    /// `height` block starting at `(src_x, src_y)` of the source lands at
    /// `(dst_x, dst_y)` in the pixmap, converted to the pixmap's format. The
    /// block is clipped to the pixmap; parts that fall outside are dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn load(
        &mut self,
        dst_x: i32,
        dst_y: i32,
        src: &[u8],
        src_x: u32,
        src_y: u32,
        width: u32,
        height: u32,
        scan: u32,
        src_format: PixelFormat,
    ) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }

        let src_bpp = src_format.bytes_per_pixel();
        let (Some(src_bottom), Some(src_right)) =
            (src_y.checked_add(height), src_x.checked_add(width))
        else {
            return Err(RenderError::BufferSize {
                expected: usize::MAX,
                actual: src.len(),
            });
        };
        let expected = (src_bottom as usize - 1)
            .saturating_mul(scan as usize)
            .saturating_add(src_right as usize)
            .saturating_mul(src_bpp);
        if scan < src_right || src.len() < expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: src.len(),
            });
        }

        let target = Rect::from_size(dst_x, dst_y, width, height);
        let Some(visible) = target.intersect(&self.rect()) else {
            return Ok(());
        };

        let dst_bpp = self.format.bytes_per_pixel();
        let stride = self.stride();
        let skip_x = (visible.left - dst_x) as u32;
        let skip_y = (visible.top - dst_y) as u32;

        for row in 0..visible.height() as u32 {
            let sy = (src_y + skip_y + row) as usize;
            let dy = visible.top as usize + row as usize;
            for col in 0..visible.width() as u32 {
                let sx = (src_x + skip_x + col) as usize;
                let dx = visible.left as usize + col as usize;

                let s = (sy * scan as usize + sx) * src_bpp;
                let d = dy * stride + dx * dst_bpp;
                convert_pixel(
                    &src[s..s + src_bpp],
                    src_format,
                    &mut self.data[d..d + dst_bpp],
                    self.format,
                );
            }
        }

        Ok(())
    }
}

/// Convert one pixel between formats.
///
/// Coverage (A8) expands to white with that alpha, or to a gray level when
/// the target has no alpha. Color collapses to A8 by taking the alpha, or
/// the channel average for RGB8.
pub(crate) fn convert_pixel(src: &[u8], from: PixelFormat, dst: &mut [u8], to: PixelFormat) {
    match (from, to) {
        (PixelFormat::A8, PixelFormat::A8)
        | (PixelFormat::Rgb8, PixelFormat::Rgb8)
        | (PixelFormat::Rgba8, PixelFormat::Rgba8) => dst.copy_from_slice(src),
        (PixelFormat::A8, PixelFormat::Rgb8) => dst.fill(src[0]),
        (PixelFormat::A8, PixelFormat::Rgba8) => {
            dst[..3].fill(0xFF);
            dst[3] = src[0];
        }
        (PixelFormat::Rgb8, PixelFormat::A8) => {
            let sum = src[0] as u32 + src[1] as u32 + src[2] as u32;
            dst[0] = (sum / 3) as u8;
        }
        (PixelFormat::Rgb8, PixelFormat::Rgba8) => {
            dst[..3].copy_from_slice(&src[..3]);
            dst[3] = 0xFF;
        }
        (PixelFormat::Rgba8, PixelFormat::A8) => dst[0] = src[3],
        (PixelFormat::Rgba8, PixelFormat::Rgb8) => dst.copy_from_slice(&src[..3]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(
            Pixmap::new(0, 4, PixelFormat::A8),
            Err(RenderError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn test_from_data_checks_length() {
        let err = Pixmap::from_data(2, 2, PixelFormat::Rgb8, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            RenderError::BufferSize {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_load_subregion_same_format() {
        let mut map = Pixmap::new(4, 4, PixelFormat::A8).unwrap();
        // 3x2 source, take the right 2x2 block.
        let src = [1, 2, 3, 4, 5, 6];
        map.load(1, 1, &src, 1, 0, 2, 2, 3, PixelFormat::A8).unwrap();

        assert_eq!(map.pixel(1, 1), Some(&[2][..]));
        assert_eq!(map.pixel(2, 1), Some(&[3][..]));
        assert_eq!(map.pixel(1, 2), Some(&[5][..]));
        assert_eq!(map.pixel(2, 2), Some(&[6][..]));
        assert_eq!(map.pixel(0, 0), Some(&[0][..]));
    }

    #[test]
    fn test_load_clips_to_pixmap() {
        let mut map = Pixmap::new(2, 2, PixelFormat::A8).unwrap();
        let src = [9; 9];
        map.load(1, -1, &src, 0, 0, 3, 3, 3, PixelFormat::A8).unwrap();
        assert_eq!(map.data(), &[0, 9, 0, 9]);
    }

    #[test]
    fn test_load_converts_coverage_to_rgba() {
        let mut map = Pixmap::new(1, 1, PixelFormat::Rgba8).unwrap();
        map.load(0, 0, &[0x80], 0, 0, 1, 1, 1, PixelFormat::A8).unwrap();
        assert_eq!(map.pixel(0, 0), Some(&[0xFF, 0xFF, 0xFF, 0x80][..]));
    }

    #[test]
    fn test_load_rejects_short_source() {
        let mut map = Pixmap::new(4, 4, PixelFormat::Rgb8).unwrap();
        let result = map.load(0, 0, &[0; 5], 0, 0, 2, 1, 2, PixelFormat::Rgb8);
        assert!(matches!(result, Err(RenderError::BufferSize { .. })));
    }

    #[test]
    fn test_load_rejects_overflowing_source_region() {
        let mut map = Pixmap::new(4, 4, PixelFormat::Rgb8).unwrap();
        let src = [0; 12];
        let result = map.load(0, 0, &src, u32::MAX, 0, 2, 1, 4, PixelFormat::Rgb8);
        assert!(matches!(result, Err(RenderError::BufferSize { .. })));
        let result = map.load(0, 0, &src, 0, u32::MAX, 1, 2, 4, PixelFormat::Rgb8);
        assert!(matches!(result, Err(RenderError::BufferSize { .. })));
    }
}
