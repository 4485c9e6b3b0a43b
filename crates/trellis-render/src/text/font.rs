//! The font collaborator interface.
//!
//! Font files are loaded and rasterized outside this crate. A [`Font`]
//! hands over pre-rendered 8-bit coverage bitmaps one codepoint at a time;
//! the [`GlyphCache`](super::GlyphCache) packs them into its atlas.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identity of a font face, used as the tie-break in glyph keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontId(u64);

impl FontId {
    /// Allocate a new process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Build an id from a raw value. Callers must keep raw ids unique.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

/// A rasterized glyph as delivered by a font.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Width of the glyph in pixels. This is also its advance.
    pub width: u32,
    /// Height of the glyph bitmap in pixels.
    pub height: u32,
    /// Vertical offset from the pen position to the top of the bitmap.
    pub bearing: i32,
    /// Row-major 8-bit coverage, `width * height` bytes. `None` for glyphs
    /// with nothing to draw, such as a space.
    pub pixels: Option<Vec<u8>>,
}

impl fmt::Debug for GlyphBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bearing", &self.bearing)
            .field("has_pixels", &self.pixels.is_some())
            .finish()
    }
}

impl GlyphBitmap {
    /// A glyph that advances the pen but draws nothing.
    pub fn blank(width: u32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Returns `true` if the glyph has pixels to copy into an atlas.
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0 && self.pixels.is_some()
    }
}

/// A font face able to rasterize single codepoints.
///
/// Rasterization is a blocking call on the calling thread.
pub trait Font: Send + Sync {
    /// Identity of this face. Must stay the same for the face's lifetime.
    fn id(&self) -> FontId;

    /// Line height in pixels.
    fn height(&self) -> u32;

    /// Render `codepoint` to a coverage bitmap.
    fn rasterize(&self, codepoint: char) -> GlyphBitmap;

    /// Horizontal adjustment between two consecutive codepoints, added to
    /// the pen position before drawing `next`. Usually zero or negative.
    fn kerning(&self, prev: char, next: char) -> i32 {
        let _ = (prev, next);
        0
    }
}

/// The four faces of a family used by tagged text.
///
/// Missing bold or italic faces fall back to the closest available one.
#[derive(Clone)]
pub struct FontSet {
    pub normal: Arc<dyn Font>,
    pub bold: Option<Arc<dyn Font>>,
    pub italic: Option<Arc<dyn Font>>,
    pub bold_italic: Option<Arc<dyn Font>>,
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSet")
            .field("normal", &self.normal.id())
            .field("bold", &self.bold.as_ref().map(|f| f.id()))
            .field("italic", &self.italic.as_ref().map(|f| f.id()))
            .field("bold_italic", &self.bold_italic.as_ref().map(|f| f.id()))
            .finish()
    }
}

impl FontSet {
    /// A set with only a normal face.
    pub fn new(normal: Arc<dyn Font>) -> Self {
        Self {
            normal,
            bold: None,
            italic: None,
            bold_italic: None,
        }
    }

    pub fn with_bold(mut self, font: Arc<dyn Font>) -> Self {
        self.bold = Some(font);
        self
    }

    pub fn with_italic(mut self, font: Arc<dyn Font>) -> Self {
        self.italic = Some(font);
        self
    }

    pub fn with_bold_italic(mut self, font: Arc<dyn Font>) -> Self {
        self.bold_italic = Some(font);
        self
    }

    /// Pick the face for a style.
    pub fn select(&self, bold: bool, italic: bool) -> &Arc<dyn Font> {
        let pick = match (bold, italic) {
            (true, true) => self
                .bold_italic
                .as_ref()
                .or(self.bold.as_ref())
                .or(self.italic.as_ref()),
            (true, false) => self.bold.as_ref(),
            (false, true) => self.italic.as_ref(),
            (false, false) => None,
        };
        pick.unwrap_or(&self.normal)
    }

    /// Line height of the normal face.
    pub fn height(&self) -> u32 {
        self.normal.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(FontId);

    impl Font for Fixed {
        fn id(&self) -> FontId {
            self.0
        }
        fn height(&self) -> u32 {
            12
        }
        fn rasterize(&self, _codepoint: char) -> GlyphBitmap {
            GlyphBitmap::blank(6)
        }
    }

    #[test]
    fn test_font_ids_are_unique() {
        let a = FontId::next();
        let b = FontId::next();
        assert_ne!(a, b);
        assert_eq!(FontId::from_raw(a.as_raw()), a);
    }

    #[test]
    fn test_font_set_fallbacks() {
        let normal: Arc<dyn Font> = Arc::new(Fixed(FontId::next()));
        let bold: Arc<dyn Font> = Arc::new(Fixed(FontId::next()));
        let set = FontSet::new(normal.clone()).with_bold(bold.clone());

        assert_eq!(set.select(false, false).id(), normal.id());
        assert_eq!(set.select(true, false).id(), bold.id());
        assert_eq!(set.select(false, true).id(), normal.id());
        assert_eq!(set.select(true, true).id(), bold.id());
        assert_eq!(set.height(), 12);
    }

    #[test]
    fn test_blank_glyph_has_no_area() {
        assert!(!GlyphBitmap::blank(4).has_area());
        let g = GlyphBitmap {
            width: 1,
            height: 1,
            bearing: 0,
            pixels: Some(vec![255]),
        };
        assert!(g.has_area());
    }
}
