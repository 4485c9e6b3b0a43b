//! Glyph atlas cache.
//!
//! The cache maps `(codepoint, font)` to the location of a rasterized glyph
//! inside one shared coverage pixmap. Glyphs are rasterized on the first
//! lookup and kept for the lifetime of the cache; there is no eviction. The
//! atlas fills monotonically until [`GlyphCache::clear`] resets it.
//!
//! # Architecture
//!
//! Entries live in a left-leaning red-black tree stored in an arena
//! (`Vec<Node>` with index links). Keys order by codepoint first and font
//! identity second. Bitmap space comes from a [`ShelfPacker`].

use std::cmp::Ordering;

use tracing::{trace, warn};

use crate::error::RenderResult;
use crate::pixmap::Pixmap;
use crate::types::{PixelFormat, Rect};

use super::font::{Font, FontId};
use super::packer::ShelfPacker;

/// Default atlas edge length in pixels.
pub const DEFAULT_GLYPH_ATLAS_SIZE: u32 = 256;

/// Minimum atlas edge length in pixels.
pub const MIN_GLYPH_ATLAS_SIZE: u32 = 64;

/// Maximum atlas edge length in pixels.
pub const MAX_GLYPH_ATLAS_SIZE: u32 = 4096;

/// Identifies a cached glyph. Orders by codepoint, then font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphKey {
    pub codepoint: char,
    pub font: FontId,
}

impl GlyphKey {
    #[inline]
    pub const fn new(codepoint: char, font: FontId) -> Self {
        Self { codepoint, font }
    }
}

/// A cached glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub key: GlyphKey,
    /// Location of the bitmap in the atlas; `None` for blank glyphs.
    pub atlas_rect: Option<Rect>,
    /// Width in pixels, used as the advance.
    pub width: u32,
    /// Vertical offset from the pen position to the top of the bitmap.
    pub bearing: i32,
}

impl Glyph {
    /// Horizontal pen advance.
    #[inline]
    pub fn advance(&self) -> i32 {
        self.width as i32
    }

    /// Returns `true` if the glyph has nothing to blend.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.atlas_rect.is_none()
    }
}

/// Counters describing cache behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphCacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to rasterize.
    pub misses: u64,
    /// Calls made into a font's rasterizer.
    pub rasterizations: u64,
    /// Glyphs dropped because the atlas had no room.
    pub failed_allocations: u64,
}

impl GlyphCacheStats {
    /// Fraction of lookups answered from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    glyph: Glyph,
    left: Option<usize>,
    right: Option<usize>,
    red: bool,
}

/// Shelf-packed atlas of rasterized glyphs indexed by a balanced tree.
#[derive(Debug)]
pub struct GlyphCache {
    atlas: Pixmap,
    packer: ShelfPacker,
    nodes: Vec<Node>,
    root: Option<usize>,
    stats: GlyphCacheStats,
}

impl GlyphCache {
    /// Create a cache with a square atlas of `size` pixels per edge.
    ///
    /// The size is clamped to
    /// [`MIN_GLYPH_ATLAS_SIZE`]..=[`MAX_GLYPH_ATLAS_SIZE`].
    pub fn new(size: u32) -> RenderResult<Self> {
        let size = size.clamp(MIN_GLYPH_ATLAS_SIZE, MAX_GLYPH_ATLAS_SIZE);
        Ok(Self {
            atlas: Pixmap::new(size, size, PixelFormat::A8)?,
            packer: ShelfPacker::new(size, size),
            nodes: Vec::new(),
            root: None,
            stats: GlyphCacheStats::default(),
        })
    }

    /// The coverage pixmap holding every cached bitmap.
    #[inline]
    pub fn atlas(&self) -> &Pixmap {
        &self.atlas
    }

    #[inline]
    pub fn stats(&self) -> &GlyphCacheStats {
        &self.stats
    }

    /// Number of cached glyphs.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Atlas packing cursor as `(next_x, next_y, row_height)`.
    #[inline]
    pub fn cursor(&self) -> (u32, u32, u32) {
        self.packer.cursor()
    }

    /// Approximate fraction of the atlas in use.
    #[inline]
    pub fn usage(&self) -> f32 {
        self.packer.usage()
    }

    /// Look up a glyph without rasterizing or touching the statistics.
    pub fn get(&self, key: &GlyphKey) -> Option<&Glyph> {
        let mut node = self.root;
        while let Some(idx) = node {
            let n = &self.nodes[idx];
            node = match key.cmp(&n.glyph.key) {
                Ordering::Equal => return Some(&n.glyph),
                Ordering::Less => n.left,
                Ordering::Greater => n.right,
            };
        }
        None
    }

    #[inline]
    pub fn contains(&self, key: &GlyphKey) -> bool {
        self.get(key).is_some()
    }

    /// Return the cached glyph for `codepoint` in `font`, rasterizing it on
    /// the first request.
    ///
    /// Returns `None` if the glyph could not be placed in the atlas. Such a
    /// glyph is not cached; a later request tries again.
    pub fn fetch(&mut self, font: &dyn Font, codepoint: char) -> Option<Glyph> {
        let key = GlyphKey::new(codepoint, font.id());
        if let Some(glyph) = self.get(&key).copied() {
            self.stats.hits += 1;
            return Some(glyph);
        }

        self.stats.misses += 1;
        self.stats.rasterizations += 1;
        let bitmap = font.rasterize(codepoint);

        let mut glyph = Glyph {
            key,
            atlas_rect: None,
            width: bitmap.width,
            bearing: bitmap.bearing,
        };

        if let Some(pixels) = bitmap.pixels.as_deref().filter(|_| bitmap.has_area()) {
            let expected = bitmap.width as usize * bitmap.height as usize;
            if pixels.len() < expected {
                warn!(
                    ?codepoint,
                    expected,
                    actual = pixels.len(),
                    "glyph bitmap too small, caching as blank"
                );
            } else {
                let Some(rect) = self.packer.allocate(bitmap.width, bitmap.height) else {
                    self.stats.failed_allocations += 1;
                    warn!(
                        ?codepoint,
                        width = bitmap.width,
                        height = bitmap.height,
                        "glyph atlas exhausted"
                    );
                    return None;
                };

                if let Err(error) = self.atlas.load(
                    rect.left,
                    rect.top,
                    pixels,
                    0,
                    0,
                    bitmap.width,
                    bitmap.height,
                    bitmap.width,
                    PixelFormat::A8,
                ) {
                    warn!(?codepoint, %error, "failed to copy glyph into atlas");
                }
                glyph.atlas_rect = Some(rect);
            }
        }

        trace!(?codepoint, font = key.font.as_raw(), rect = ?glyph.atlas_rect, "glyph cached");

        let root = self.insert(self.root, glyph);
        self.nodes[root].red = false;
        self.root = Some(root);
        Some(glyph)
    }

    /// Drop every glyph and reset the atlas.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.packer.reset();
        self.atlas.clear();
    }

    /// Iterate over cached glyphs in key order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: Vec::new(),
        };
        iter.push_left(self.root);
        iter
    }

    fn is_red(&self, node: Option<usize>) -> bool {
        node.is_some_and(|idx| self.nodes[idx].red)
    }

    fn insert(&mut self, node: Option<usize>, glyph: Glyph) -> usize {
        let Some(mut h) = node else {
            self.nodes.push(Node {
                glyph,
                left: None,
                right: None,
                red: true,
            });
            return self.nodes.len() - 1;
        };

        match glyph.key.cmp(&self.nodes[h].glyph.key) {
            Ordering::Less => {
                let left = self.insert(self.nodes[h].left, glyph);
                self.nodes[h].left = Some(left);
            }
            Ordering::Greater => {
                let right = self.insert(self.nodes[h].right, glyph);
                self.nodes[h].right = Some(right);
            }
            Ordering::Equal => self.nodes[h].glyph = glyph,
        }

        if self.is_red(self.nodes[h].right) && !self.is_red(self.nodes[h].left) {
            h = self.rotate_left(h);
        }
        let left = self.nodes[h].left;
        if self.is_red(left) && self.is_red(left.and_then(|l| self.nodes[l].left)) {
            h = self.rotate_right(h);
        }
        if self.is_red(self.nodes[h].left) && self.is_red(self.nodes[h].right) {
            self.flip_colors(h);
        }
        h
    }

    fn rotate_left(&mut self, h: usize) -> usize {
        let Some(x) = self.nodes[h].right else {
            return h;
        };
        self.nodes[h].right = self.nodes[x].left;
        self.nodes[x].left = Some(h);
        self.nodes[x].red = self.nodes[h].red;
        self.nodes[h].red = true;
        x
    }

    fn rotate_right(&mut self, h: usize) -> usize {
        let Some(x) = self.nodes[h].left else {
            return h;
        };
        self.nodes[h].left = self.nodes[x].right;
        self.nodes[x].right = Some(h);
        self.nodes[x].red = self.nodes[h].red;
        self.nodes[h].red = true;
        x
    }

    fn flip_colors(&mut self, h: usize) {
        self.nodes[h].red = !self.nodes[h].red;
        for child in [self.nodes[h].left, self.nodes[h].right].into_iter().flatten() {
            self.nodes[child].red = !self.nodes[child].red;
        }
    }
}

/// In-order iterator over a [`GlyphCache`].
pub struct Iter<'a> {
    nodes: &'a [Node],
    stack: Vec<usize>,
}

impl Iter<'_> {
    fn push_left(&mut self, mut node: Option<usize>) {
        while let Some(idx) = node {
            self.stack.push(idx);
            node = self.nodes[idx].left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Glyph;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let nodes = self.nodes;
        self.push_left(nodes[idx].right);
        Some(&nodes[idx].glyph)
    }
}

impl<'a> IntoIterator for &'a GlyphCache {
    type Item = &'a Glyph;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
