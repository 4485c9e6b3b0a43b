//! Widget system.
//!
//! Widgets live in a [`WidgetTree`] owned by a [`Surface`](crate::Surface)
//! and are addressed by generational [`WidgetId`] handles. A handle to a
//! destroyed widget simply stops resolving; nothing dangles.
//!
//! # Core Types
//!
//! - [`Widget`]: Trait implemented by every widget kind
//! - [`WidgetTree`]: Parent/child structure, geometry and visibility
//! - [`DrawContext`]: Canvas access while a widget draws itself
//! - [`EventContext`]: Invalidation and event emission while handling input
//! - [`FocusPolicy`]: How a widget takes part in keyboard focus
//!
//! # Coordinates
//!
//! A widget's rectangle is relative to its parent. Drawing happens in
//! widget-local coordinates: the canvas offset is set to the widget's
//! absolute origin before [`Widget::draw`] is called, and pointer events
//! arrive translated the same way.

mod dispatcher;
mod events;
mod focus;
mod painting;
mod tree;

use std::any::Any;

use slotmap::new_key_type;
use trellis_render::{Canvas, Rect};

pub use dispatcher::RouteResult;
pub use events::{Event, EventKind, EventSource, Key, KeyboardModifiers, MouseButton};
pub use focus::FocusPolicy;
pub use tree::WidgetTree;

pub(crate) use dispatcher::{InputState, child_from_point, route_event, set_focus};
pub(crate) use painting::draw_subtree;

new_key_type! {
    /// A handle to a widget in a [`WidgetTree`].
    ///
    /// Handles are generational: once a widget is destroyed its id stops
    /// resolving, even if the slot is reused.
    pub struct WidgetId;
}

impl WidgetId {
    /// Get the raw u64 representation of this id.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create a WidgetId from a raw u64 value.
    ///
    /// The result is only meaningful if the value came from
    /// [`as_raw`](Self::as_raw).
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Kinds of state change a widget is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChange {
    /// The widget's rectangle moved or was resized.
    Position,
    /// The widget was shown or hidden.
    Visibility,
    /// The widget got a new parent or lost its parent.
    Parent,
    /// A child was added to the widget.
    ChildAdded,
    /// A child was removed from the widget.
    ChildRemoved,
    /// The widget was attached to or detached from a surface.
    Canvas,
}

/// A node in the widget tree.
///
/// All hooks have empty defaults, so a widget only implements what it needs.
pub trait Widget: Any + Send {
    /// Paint the widget. Coordinates are widget-local and the canvas is
    /// clipped to the widget's visible area.
    fn draw(&self, ctx: &mut DrawContext<'_>) {
        let _ = ctx;
    }

    /// Handle an event. Pointer coordinates are widget-local.
    fn event(&mut self, event: &Event, ctx: &mut EventContext<'_>) {
        let _ = (event, ctx);
    }

    /// Called after the tree changed something about this widget.
    fn state_changed(&mut self, change: StateChange) {
        let _ = change;
    }

    /// Name used in debug output.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn Widget {
    /// Downcast to a concrete widget type.
    pub fn downcast_ref<W: Widget>(&self) -> Option<&W> {
        (self as &dyn Any).downcast_ref()
    }

    /// Mutably downcast to a concrete widget type.
    pub fn downcast_mut<W: Widget>(&mut self) -> Option<&mut W> {
        (self as &mut dyn Any).downcast_mut()
    }
}

/// The synthetic widget at the root of every tree.
#[derive(Debug, Default)]
pub(crate) struct RootWidget;

impl Widget for RootWidget {
    fn type_name(&self) -> &'static str {
        "Root"
    }
}

/// Canvas access handed to [`Widget::draw`].
pub struct DrawContext<'a> {
    canvas: &'a mut Canvas,
    id: WidgetId,
    width: u32,
    height: u32,
    focused: bool,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(
        canvas: &'a mut Canvas,
        id: WidgetId,
        width: u32,
        height: u32,
        focused: bool,
    ) -> Self {
        Self {
            canvas,
            id,
            width,
            height,
            focused,
        }
    }

    /// The canvas, offset to the widget's origin.
    #[inline]
    pub fn canvas(&mut self) -> &mut Canvas {
        self.canvas
    }

    #[inline]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The widget's area in local coordinates.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_size(0, 0, self.width, self.height)
    }

    /// Whether the widget currently has keyboard focus.
    #[inline]
    pub fn has_focus(&self) -> bool {
        self.focused
    }
}

/// Context handed to [`Widget::event`].
pub struct EventContext<'a> {
    id: WidgetId,
    rect: Rect,
    canvas: &'a mut Canvas,
    emitted: &'a mut Vec<Event>,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(
        id: WidgetId,
        rect: Rect,
        canvas: &'a mut Canvas,
        emitted: &'a mut Vec<Event>,
    ) -> Self {
        Self {
            id,
            rect,
            canvas,
            emitted,
        }
    }

    #[inline]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The widget's area in canvas coordinates.
    #[inline]
    pub fn absolute_rect(&self) -> Rect {
        self.rect
    }

    /// Mark the whole widget as needing a redraw.
    pub fn update(&mut self) {
        self.canvas.add_dirty_rect(self.rect);
    }

    /// Mark part of the widget, given in local coordinates, as needing a
    /// redraw.
    pub fn update_rect(&mut self, local: Rect) {
        let abs = local.repaired().offset(self.rect.left, self.rect.top);
        if let Some(r) = abs.intersect(&self.rect) {
            self.canvas.add_dirty_rect(r);
        }
    }

    /// Queue a custom event from this widget for the surface listener.
    pub fn emit(&mut self, code: u32) {
        self.emitted
            .push(Event::from_widget(self.id, EventKind::Custom(code)));
    }

    /// The canvas, for measuring text and similar queries.
    #[inline]
    pub fn canvas(&mut self) -> &mut Canvas {
        self.canvas
    }
}
