//! Shelf packing for the glyph atlas.
//!
//! Glyphs are placed left to right along a row (a "shelf"). When a glyph
//! would reach the right edge, the cursor wraps to the start of a new row
//! below the tallest glyph of the current one. Space is never reclaimed
//! short of a full [`reset`](ShelfPacker::reset).

use crate::types::Rect;

/// Cursor-based row packer over a fixed-size area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfPacker {
    width: u32,
    height: u32,
    next_x: u32,
    next_y: u32,
    row_height: u32,
}

impl ShelfPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_x: 0,
            next_y: 0,
            row_height: 0,
        }
    }

    /// Reserve a `width` by `height` area.
    ///
    /// Returns `None` if the area is empty, wider than the packer, or would
    /// run past the bottom edge. A failed allocation may still have wrapped
    /// the cursor to a new row.
    pub fn allocate(&mut self, width: u32, height: u32) -> Option<Rect> {
        if width == 0 || height == 0 || width > self.width {
            return None;
        }

        if self.next_x + width >= self.width {
            self.next_x = 0;
            self.next_y += self.row_height;
            self.row_height = 0;
        }

        if self.next_y + height > self.height {
            return None;
        }

        let rect = Rect::from_size(self.next_x as i32, self.next_y as i32, width, height);
        self.row_height = self.row_height.max(height);
        self.next_x += width;
        Some(rect)
    }

    /// Forget every allocation.
    pub fn reset(&mut self) {
        self.next_x = 0;
        self.next_y = 0;
        self.row_height = 0;
    }

    /// Current cursor as `(next_x, next_y, row_height)`.
    #[inline]
    pub fn cursor(&self) -> (u32, u32, u32) {
        (self.next_x, self.next_y, self.row_height)
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fraction of the area below the cursor row plus the used part of the
    /// current row, from 0.0 to 1.0.
    pub fn usage(&self) -> f32 {
        let total = self.width as u64 * self.height as u64;
        if total == 0 {
            return 0.0;
        }
        let used = self.next_y as u64 * self.width as u64 + self.next_x as u64 * self.row_height as u64;
        (used as f64 / total as f64).min(1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_advances_along_row() {
        let mut packer = ShelfPacker::new(256, 256);
        assert_eq!(packer.allocate(20, 16), Some(Rect::new(0, 0, 19, 15)));
        assert_eq!(packer.cursor(), (20, 0, 16));
        assert_eq!(packer.allocate(20, 10), Some(Rect::new(20, 0, 39, 9)));
        assert_eq!(packer.cursor(), (40, 0, 16));
    }

    #[test]
    fn test_wraps_when_reaching_right_edge() {
        let mut packer = ShelfPacker::new(64, 64);
        packer.allocate(30, 12).unwrap();
        packer.allocate(20, 8).unwrap();
        // 50 + 14 reaches the edge.
        let r = packer.allocate(14, 5).unwrap();
        assert_eq!(r, Rect::new(0, 12, 13, 16));
        assert_eq!(packer.cursor(), (14, 12, 5));
    }

    #[test]
    fn test_rejects_oversized_and_full() {
        let mut packer = ShelfPacker::new(16, 8);
        assert!(packer.allocate(17, 1).is_none());
        assert!(packer.allocate(0, 4).is_none());
        assert!(packer.allocate(4, 9).is_none());

        assert!(packer.allocate(10, 8).is_some());
        // Wraps below the full-height row and runs off the bottom.
        assert!(packer.allocate(10, 1).is_none());
    }

    #[test]
    fn test_reset() {
        let mut packer = ShelfPacker::new(32, 32);
        packer.allocate(8, 8).unwrap();
        packer.reset();
        assert_eq!(packer.cursor(), (0, 0, 0));
        assert_eq!(packer.usage(), 0.0);
    }
}
