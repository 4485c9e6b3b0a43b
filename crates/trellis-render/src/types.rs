//! Geometric and color types used throughout the canvas.
//!
//! Rectangles use signed integer edges with *inclusive* bounds: a rectangle
//! covering the single pixel at `(3, 4)` is `Rect::new(3, 4, 3, 4)`. Widths and
//! heights are therefore `right - left + 1` and `bottom - top + 1`.

/// An axis-aligned rectangle given by its four inclusive edges.
///
/// A rectangle is *repaired* when `left <= right` and `top <= bottom`. Code
/// that builds a rectangle from untrusted deltas should call
/// [`repair`](Self::repair) before using it; the algebra below assumes
/// repaired input unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// A rectangle that covers no pixels. Intersecting anything with it fails.
    pub const EMPTY: Self = Self {
        left: 0,
        top: 0,
        right: -1,
        bottom: -1,
    };

    /// Create a rectangle from its edges.
    #[inline]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from a position and a size.
    ///
    /// A zero width or height yields a rectangle with `right == left - 1`
    /// (or `bottom == top - 1`), which covers no pixels.
    #[inline]
    pub fn from_size(left: i32, top: i32, width: u32, height: u32) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        Self {
            left,
            top,
            right: left.saturating_add(width).saturating_sub(1),
            bottom: top.saturating_add(height).saturating_sub(1),
        }
    }

    /// Width in pixels; zero or negative for rectangles that cover nothing.
    #[inline]
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left).saturating_add(1)
    }

    /// Height in pixels; zero or negative for rectangles that cover nothing.
    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top).saturating_add(1)
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    /// Swap edges so that `left <= right` and `top <= bottom`.
    pub fn repair(&mut self) {
        if self.left > self.right {
            std::mem::swap(&mut self.left, &mut self.right);
        }
        if self.top > self.bottom {
            std::mem::swap(&mut self.top, &mut self.bottom);
        }
    }

    /// Return a repaired copy of this rectangle.
    #[inline]
    pub fn repaired(mut self) -> Self {
        self.repair();
        self
    }

    /// Move the rectangle so that its top-left corner is at `(left, top)`,
    /// keeping its size.
    #[inline]
    pub fn set_position(&mut self, left: i32, top: i32) {
        self.right = self.right.saturating_sub(self.left).saturating_add(left);
        self.bottom = self.bottom.saturating_sub(self.top).saturating_add(top);
        self.left = left;
        self.top = top;
    }

    /// Translate the rectangle in place.
    #[inline]
    pub fn add_offset(&mut self, dx: i32, dy: i32) {
        self.left = self.left.saturating_add(dx);
        self.right = self.right.saturating_add(dx);
        self.top = self.top.saturating_add(dy);
        self.bottom = self.bottom.saturating_add(dy);
    }

    /// Return a translated copy of this rectangle.
    #[inline]
    pub fn offset(mut self, dx: i32, dy: i32) -> Self {
        self.add_offset(dx, dy);
        self
    }

    /// Grow the rectangle by `h` on the left and right edges and by `v` on
    /// the top and bottom edges. Negative values shrink it.
    #[inline]
    pub fn extend(&mut self, h: i32, v: i32) {
        self.left = self.left.saturating_sub(h);
        self.right = self.right.saturating_add(h);
        self.top = self.top.saturating_sub(v);
        self.bottom = self.bottom.saturating_add(v);
    }

    /// Return an extended copy of this rectangle. See [`extend`](Self::extend).
    #[inline]
    pub fn extended(mut self, h: i32, v: i32) -> Self {
        self.extend(h, v);
        self
    }

    /// Compute the intersection of two rectangles.
    ///
    /// Returns `None` if they share no pixel.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);

        if left <= right && top <= bottom {
            Some(Rect::new(left, top, right, bottom))
        } else {
            None
        }
    }

    /// Returns `true` if the two rectangles overlap or share an edge.
    ///
    /// Sharing an edge means lying directly next to each other (no gap
    /// pixel) while overlapping along the other axis. Rectangles that meet
    /// only diagonally at a corner do not touch.
    pub fn touches(&self, other: &Rect) -> bool {
        let h_overlap = self.left <= other.right && other.left <= self.right;
        let v_overlap = self.top <= other.bottom && other.top <= self.bottom;
        let h_adjacent = self.right.saturating_add(1) == other.left
            || other.right.saturating_add(1) == self.left;
        let v_adjacent = self.bottom.saturating_add(1) == other.top
            || other.bottom.saturating_add(1) == self.top;

        (h_overlap && v_overlap) || (h_adjacent && v_overlap) || (v_adjacent && h_overlap)
    }

    /// Expand this rectangle to also cover `other`.
    ///
    /// With `only_if_touching` set, the join is refused (and `false`
    /// returned, leaving `self` untouched) when the rectangles neither
    /// overlap nor share an edge.
    pub fn join(&mut self, other: &Rect, only_if_touching: bool) -> bool {
        if only_if_touching && !self.touches(other) {
            return false;
        }

        self.left = self.left.min(other.left);
        self.top = self.top.min(other.top);
        self.right = self.right.max(other.right);
        self.bottom = self.bottom.max(other.bottom);
        true
    }

    /// Bounding box of two rectangles.
    #[inline]
    pub fn union(&self, other: &Rect) -> Rect {
        let mut acc = *self;
        acc.join(other, false);
        acc
    }

    /// Returns `true` if the point lies inside the rectangle.
    #[inline]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Returns `true` if `other` lies completely inside this rectangle.
    #[inline]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }
}

/// Color layout of pixel data and of colors handed to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Single 8-bit coverage channel.
    A8,
    /// Three 8-bit channels, no alpha.
    Rgb8,
    /// Four 8-bit channels with straight (non-premultiplied) alpha.
    Rgba8,
}

impl PixelFormat {
    /// Number of bytes per pixel in this format.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::A8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }

    /// Returns `true` if the format carries an alpha channel.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::A8 | Self::Rgba8)
    }
}

/// An 8-bit RGBA color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create an opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Decode a packed `0xRRGGBB` value into an opaque color.
    #[inline]
    pub const fn from_rgb_u32(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xFF) as u8,
            ((rgb >> 8) & 0xFF) as u8,
            (rgb & 0xFF) as u8,
        )
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        let a = if hex.len() == 8 {
            u8::from_str_radix(&hex[6..8], 16).ok()?
        } else {
            255
        };

        Some(Self::rgba(r, g, b, a))
    }

    /// Returns `true` if the color is fully opaque.
    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a == 0xFF
    }

    /// The format a backend should treat this color as.
    ///
    /// Fully opaque colors are reported as [`PixelFormat::Rgb8`] so backends
    /// can take a non-blending fast path.
    #[inline]
    pub const fn format(self) -> PixelFormat {
        if self.is_opaque() {
            PixelFormat::Rgb8
        } else {
            PixelFormat::Rgba8
        }
    }
}
