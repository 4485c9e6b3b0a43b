//! Event routing.
//!
//! The router keeps two non-owning references into the tree, the widget
//! under the pointer and the focus widget, and decides per event category
//! who receives an event:
//!
//! | Event                 | Receiver                                   |
//! |-----------------------|--------------------------------------------|
//! | Pointer move          | Widget under the pointer (after enter/leave)|
//! | Press / release       | Widget under the pointer, which takes focus |
//! | Wheel                 | Widget under the pointer                   |
//! | Key / character       | Focus widget                               |
//! | Anything else         | Every widget, root first, pre-order        |
//!
//! Enter/leave and focus events are only ever synthesized here. If they
//! arrive from outside they are dropped.

use tracing::{debug, trace};
use trellis_render::Canvas;

use super::focus::next_focus;
use super::{Event, EventContext, EventKind, Key, WidgetId, WidgetTree};
use crate::logging::targets;

/// Outcome of routing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteResult {
    /// The event was delivered to a single widget.
    Delivered(WidgetId),
    /// The event was delivered to every widget in the tree.
    Broadcast,
    /// The event changed focus without being delivered.
    FocusMoved(Option<WidgetId>),
    /// Nobody received the event.
    Dropped,
}

impl RouteResult {
    /// The widget that received the event, if exactly one did.
    pub fn target(&self) -> Option<WidgetId> {
        match self {
            Self::Delivered(id) => Some(*id),
            _ => None,
        }
    }
}

/// Pointer and keyboard tracking for one surface.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InputState {
    pub(crate) mouse_over: Option<WidgetId>,
    pub(crate) focus: Option<WidgetId>,
}

impl InputState {
    /// Drop references to widgets that are no longer attached.
    pub(crate) fn forget_detached(&mut self, tree: &WidgetTree) {
        if self.mouse_over.is_some_and(|id| !tree.is_attached(id)) {
            debug!(target: targets::ROUTER, "mouse-over widget detached");
            self.mouse_over = None;
        }
        if self.focus.is_some_and(|id| !tree.is_attached(id)) {
            debug!(target: targets::ROUTER, "focus widget detached");
            self.focus = None;
        }
    }
}

/// Deliver `event` to a single widget without propagation.
///
/// Returns `false` if the widget does not exist.
pub(crate) fn send_event(
    canvas: &mut Canvas,
    tree: &mut WidgetTree,
    id: WidgetId,
    event: &Event,
    emitted: &mut Vec<Event>,
) -> bool {
    let Some(rect) = tree.absolute_rect(id) else {
        return false;
    };
    let Some(node) = tree.node_mut(id) else {
        return false;
    };
    trace!(target: targets::ROUTER, widget = ?id, kind = ?event.kind, "delivering event");
    let mut ctx = EventContext::new(id, rect, canvas, emitted);
    node.widget.event(event, &mut ctx);
    true
}

/// Deliver a pointer event with coordinates made local to `id`.
fn send_translated(
    canvas: &mut Canvas,
    tree: &mut WidgetTree,
    id: WidgetId,
    event: &Event,
    emitted: &mut Vec<Event>,
) -> RouteResult {
    let Some((x, y)) = tree.absolute_position(id) else {
        return RouteResult::Dropped;
    };
    let local = event.with_kind(event.kind.translated(x, y));
    if send_event(canvas, tree, id, &local, emitted) {
        RouteResult::Delivered(id)
    } else {
        RouteResult::Dropped
    }
}

/// Find the widget under a point.
///
/// `(x, y)` is in the coordinate space of `id`'s parent. Returns `None` if
/// the point is outside `id`, otherwise the deepest widget containing it,
/// preferring later (topmost) siblings and skipping hidden ones.
pub(crate) fn child_from_point(tree: &WidgetTree, id: WidgetId, x: i32, y: i32) -> Option<WidgetId> {
    let node = tree.node(id)?;
    if !node.rect.contains_point(x, y) {
        return None;
    }

    let (lx, ly) = (x - node.rect.left, y - node.rect.top);
    for &child in node.children.iter().rev() {
        let Some(c) = tree.node(child) else {
            continue;
        };
        if c.visible && c.rect.contains_point(lx, ly) {
            return child_from_point(tree, child, lx, ly);
        }
    }
    Some(id)
}

/// Move keyboard focus, synthesizing focus-lose then focus-gain.
///
/// Widgets that draw a focus box are marked dirty on both ends.
pub(crate) fn set_focus(
    canvas: &mut Canvas,
    tree: &mut WidgetTree,
    input: &mut InputState,
    new: Option<WidgetId>,
    emitted: &mut Vec<Event>,
) {
    if input.focus == new {
        return;
    }
    let old = std::mem::replace(&mut input.focus, new);
    debug!(target: targets::ROUTER, ?old, ?new, "focus changed");

    for (id, kind) in [(old, EventKind::FocusLost), (new, EventKind::FocusGained)] {
        let Some(id) = id else {
            continue;
        };
        if tree.focus_policy(id).is_some_and(|p| p.draw_focus) {
            if let Some(rect) = tree.exposed_rect(id) {
                canvas.add_dirty_rect(rect);
            }
        }
        send_event(canvas, tree, id, &Event::new(kind), emitted);
    }
}

/// Route one window event through the tree.
pub(crate) fn route_event(
    canvas: &mut Canvas,
    tree: &mut WidgetTree,
    input: &mut InputState,
    event: &Event,
    emitted: &mut Vec<Event>,
) -> RouteResult {
    if event.kind.is_synthesized() {
        trace!(target: targets::ROUTER, kind = ?event.kind, "ignoring synthesized event");
        return RouteResult::Dropped;
    }
    let root = tree.root();
    if tree.children(root).is_empty() {
        return RouteResult::Dropped;
    }

    match event.kind {
        EventKind::MouseMove { x, y } => {
            let hit = child_from_point(tree, root, x, y);
            if hit != input.mouse_over {
                debug!(target: targets::ROUTER, old = ?input.mouse_over, new = ?hit, "mouse-over changed");
                if let Some(old) = input.mouse_over {
                    send_event(canvas, tree, old, &event.with_kind(EventKind::MouseLeave), emitted);
                }
                input.mouse_over = hit;
                if let Some(new) = hit {
                    send_event(canvas, tree, new, &event.with_kind(EventKind::MouseEnter), emitted);
                }
            }
            match input.mouse_over {
                Some(target) => send_translated(canvas, tree, target, event, emitted),
                None => RouteResult::Dropped,
            }
        }

        EventKind::MousePress { .. } | EventKind::MouseRelease { .. } => {
            let Some(target) = input.mouse_over else {
                return RouteResult::Dropped;
            };
            let result = send_translated(canvas, tree, target, event, emitted);
            if input.focus != Some(target) {
                set_focus(canvas, tree, input, Some(target), emitted);
            }
            result
        }

        EventKind::MouseWheel { .. } => match input.mouse_over {
            Some(target) => deliver(canvas, tree, target, event, emitted),
            None => RouteResult::Dropped,
        },

        EventKind::KeyPressed {
            key: Key::Tab,
            modifiers,
        } if tab_moves_focus(tree, input) => {
            let next = next_focus(tree, input.focus, !modifiers.shift);
            set_focus(canvas, tree, input, next, emitted);
            RouteResult::FocusMoved(input.focus)
        }

        EventKind::KeyPressed { key: Key::Escape, .. }
            if input
                .focus
                .and_then(|id| tree.focus_policy(id))
                .is_some_and(|p| p.drop_on_escape) =>
        {
            set_focus(canvas, tree, input, None, emitted);
            RouteResult::FocusMoved(None)
        }

        EventKind::KeyPressed { .. } | EventKind::KeyReleased { .. } | EventKind::Char(_) => {
            match input.focus {
                Some(target) => deliver(canvas, tree, target, event, emitted),
                None => RouteResult::Dropped,
            }
        }

        _ => {
            for id in tree.preorder(root) {
                send_event(canvas, tree, id, event, emitted);
            }
            RouteResult::Broadcast
        }
    }
}

fn deliver(
    canvas: &mut Canvas,
    tree: &mut WidgetTree,
    id: WidgetId,
    event: &Event,
    emitted: &mut Vec<Event>,
) -> RouteResult {
    if send_event(canvas, tree, id, event, emitted) {
        RouteResult::Delivered(id)
    } else {
        RouteResult::Dropped
    }
}

/// Tab navigates when nothing (or the root) has focus, or when the focus
/// widget gives Tab up.
fn tab_moves_focus(tree: &WidgetTree, input: &InputState) -> bool {
    match input.focus {
        None => true,
        Some(id) if id == tree.root() => true,
        Some(id) => tree.focus_policy(id).is_some_and(|p| p.drop_on_tab),
    }
}
