//! Trellis - a retained-mode widget toolkit over backend-agnostic canvases.
//!
//! A [`Surface`] owns a [`Canvas`], a [`WidgetTree`] rooted at a synthetic
//! root widget, and the pointer/focus state used to route input. Widgets are
//! drawn by a recursive walker that composes clip regions, and redrawn only
//! where the canvas has been marked dirty.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//!
//! struct Swatch(Color);
//!
//! impl Widget for Swatch {
//!     fn draw(&self, ctx: &mut DrawContext<'_>) {
//!         let rect = ctx.rect();
//!         ctx.canvas().draw_box(&rect, self.0, PixelFormat::Rgb8);
//!     }
//! }
//!
//! fn main() -> Result<(), WidgetError> {
//!     let surface = Surface::with_config(&CanvasConfig::default().with_size(64, 64))?;
//!     let swatch = surface.create_widget(Swatch(Color::WHITE), Rect::from_size(8, 8, 16, 16));
//!     surface.add_child(surface.root(), swatch)?;
//!
//!     // Attaching marked the swatch's area dirty.
//!     surface.redraw_widgets(true);
//!     assert_eq!(surface.num_dirty_rects(), 0);
//!     Ok(())
//! }
//! ```
//!
//! The drawing primitives live in the [`render`] module, re-exported from
//! `trellis-render`.

pub mod error;
pub mod logging;
pub mod prelude;
mod surface;
pub mod widget;

pub use error::{WidgetError, WidgetResult};
pub use surface::Surface;
pub use widget::{
    DrawContext, Event, EventContext, EventKind, EventSource, FocusPolicy, Key,
    KeyboardModifiers, MouseButton, RouteResult, StateChange, Widget, WidgetId, WidgetTree,
};

pub use trellis_render::{Canvas, CanvasConfig, Color, PixelFormat, Rect};

/// Canvas, backends and text.
pub mod render {
    pub use trellis_render::*;
}
