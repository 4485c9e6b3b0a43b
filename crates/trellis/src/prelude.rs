//! Prelude module for Trellis.
//!
//! ```ignore
//! use trellis::prelude::*;
//! ```
//!
//! This provides access to the surface, the widget trait and its contexts,
//! event types, and the geometry and color types widgets draw with.

// ============================================================================
// Surface
// ============================================================================

pub use crate::Surface;
pub use crate::error::{WidgetError, WidgetResult};

// ============================================================================
// Widget Foundation
// ============================================================================

pub use crate::widget::{
    DrawContext, EventContext, FocusPolicy, StateChange, Widget, WidgetId, WidgetTree,
};

// ============================================================================
// Events
// ============================================================================

pub use crate::widget::{
    Event, EventKind, EventSource, Key, KeyboardModifiers, MouseButton, RouteResult,
};

// ============================================================================
// Rendering
// ============================================================================

pub use trellis_render::{Canvas, CanvasConfig, Color, Font, FontSet, PixelFormat, Rect};
