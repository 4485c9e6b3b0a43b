//! Canvas compositing for Trellis.
//!
//! This crate provides the drawing half of the toolkit: integer rectangle
//! algebra, dirty-region tracking, scissor and offset stacks, a backend
//! abstraction with an in-memory software implementation, and a glyph atlas
//! cache for text.
//!
//! # Getting Started
//!
//! A [`Canvas`] wraps a [`CanvasBackend`]. The software backend is the
//! simplest to set up:
//!
//! ```
//! use trellis_render::{Canvas, CanvasConfig, Color, PixelFormat, Rect};
//!
//! let config = CanvasConfig::default().with_size(320, 240);
//! let mut canvas = Canvas::with_memory_backend(&config)?;
//!
//! canvas.begin(None);
//! canvas.clear(None);
//! canvas.draw_box(&Rect::from_size(10, 10, 100, 20), Color::rgb(200, 40, 40), PixelFormat::Rgb8);
//! canvas.end();
//! # Ok::<(), trellis_render::RenderError>(())
//! ```
//!
//! # Clipping
//!
//! Nested regions push a scissor rectangle and pop it with a zero size:
//!
//! ```
//! # use trellis_render::{Canvas, CanvasConfig};
//! # let mut canvas = Canvas::with_memory_backend(&CanvasConfig::default())?;
//! canvas.begin(None);
//! canvas.set_offset(20, 20);
//! canvas.set_scissor_rect(0, 0, 50, 50);
//! // ... draw in a 50x50 box at (20, 20) ...
//! canvas.set_scissor_rect(0, 0, 0, 0);
//! canvas.restore_offset();
//! canvas.end();
//! # Ok::<(), trellis_render::RenderError>(())
//! ```
//!
//! # Text
//!
//! Glyphs come pre-rendered from a [`Font`](text::Font) implementation and
//! are packed into the canvas's [`GlyphCache`](text::GlyphCache) on first
//! use.

pub mod backend;
pub mod canvas;
pub mod clip;
pub mod dirty;
mod error;
pub mod pixmap;
pub mod software;
pub mod text;
mod types;

pub use backend::CanvasBackend;
pub use canvas::{Canvas, CanvasConfig};
pub use clip::{ClipSnapshot, ClipState, DEFAULT_STACK_DEPTH};
pub use dirty::{DEFAULT_DIRTY_CAPACITY, DirtyRects};
pub use error::{RenderError, RenderResult};
pub use pixmap::Pixmap;
pub use software::MemoryBackend;
pub use text::{Font, FontId, FontSet, Glyph, GlyphBitmap, GlyphCache, GlyphCacheStats, GlyphKey};
pub use types::{Color, PixelFormat, Rect};
