//! Text support: fonts, the glyph atlas cache and tagged text.
//!
//! Rasterization happens outside this crate behind the [`Font`] trait. The
//! [`GlyphCache`] packs rasterized glyphs into a shared coverage atlas that
//! backends blend from, and [`rich_text`] splits lightly tagged strings into
//! styled runs.

mod font;
mod glyph_cache;
mod packer;
pub mod rich_text;

pub use font::{Font, FontId, FontSet, GlyphBitmap};
pub use glyph_cache::{
    DEFAULT_GLYPH_ATLAS_SIZE, Glyph, GlyphCache, GlyphCacheStats, GlyphKey, Iter as GlyphIter,
    MAX_GLYPH_ATLAS_SIZE, MIN_GLYPH_ATLAS_SIZE,
};
pub use packer::ShelfPacker;
pub use rich_text::{StyleState, TextStyle, TextToken, tokenize};
