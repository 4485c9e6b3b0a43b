//! The surface: a canvas, its widget tree and the input state, behind one
//! lock.
//!
//! Every public operation takes the lock for its whole duration, so
//! drawing, routing and structural changes never interleave. Custom events
//! emitted by widgets are collected while the lock is held and handed to
//! the listener after it is released, so a listener may call back into the
//! surface. Events emitted by such a nested call are queued and delivered
//! by the outermost call once the listener returns.

use std::collections::VecDeque;

use parking_lot::Mutex;
use static_assertions::assert_impl_all;
use tracing::{debug, trace};
use trellis_render::{Canvas, CanvasConfig, Rect};

use crate::error::{WidgetError, WidgetResult};
use crate::logging::{PerfSpan, TreeFormatOptions, WidgetTreeDebug, span_names, targets};
use crate::widget::{
    Event, FocusPolicy, InputState, RouteResult, Widget, WidgetId, WidgetTree, child_from_point,
    draw_subtree, route_event, set_focus,
};

type Listener = Box<dyn FnMut(&Event) + Send>;

/// The listener and the events waiting for it.
///
/// While an event is being delivered the callback is taken out of the slot,
/// so the slot lock is never held across a listener call.
#[derive(Default)]
struct ListenerSlot {
    callback: Option<Listener>,
    /// Bumped whenever the listener is replaced or cleared.
    generation: u64,
    pending: VecDeque<Event>,
    delivering: bool,
}

impl ListenerSlot {
    fn replace(&mut self, callback: Option<Listener>) {
        self.callback = callback;
        self.generation = self.generation.wrapping_add(1);
    }
}

struct SurfaceInner {
    canvas: Canvas,
    tree: WidgetTree,
    input: InputState,
}

impl SurfaceInner {
    fn invalidate(&mut self, rect: Option<Rect>) {
        if let Some(rect) = rect {
            self.canvas.add_dirty_rect(rect);
        }
    }

    /// Apply a change that may move, hide, show or detach `id`, marking the
    /// area it covered before and after.
    fn with_damage<T>(
        &mut self,
        id: WidgetId,
        change: impl FnOnce(&mut WidgetTree) -> WidgetResult<T>,
    ) -> WidgetResult<T> {
        let before = self.tree.exposed_rect(id);
        let result = change(&mut self.tree)?;
        let after = self.tree.exposed_rect(id);
        self.invalidate(before);
        if after != before {
            self.invalidate(after);
        }
        self.input.forget_detached(&self.tree);
        Ok(result)
    }

    fn draw(&mut self, bounds: Option<Rect>) {
        let root = self.tree.root();
        let origin = self.canvas.offset();
        draw_subtree(
            &mut self.canvas,
            &self.tree,
            root,
            origin,
            bounds,
            self.input.focus,
        );
    }
}

/// A drawable, event-routable widget hierarchy bound to one canvas.
///
/// # Example
///
/// ```
/// use trellis::{CanvasConfig, Event, Rect, Surface, Widget};
///
/// struct Panel;
/// impl Widget for Panel {}
///
/// let surface = Surface::with_config(&CanvasConfig::default().with_size(100, 100)).unwrap();
/// let panel = surface.create_widget(Panel, Rect::from_size(10, 10, 50, 50));
/// surface.add_child(surface.root(), panel).unwrap();
///
/// let result = surface.route_window_event(Event::mouse_move(20, 20));
/// assert_eq!(result.target(), Some(panel));
/// assert_eq!(surface.mouse_over(), Some(panel));
/// ```
pub struct Surface {
    inner: Mutex<SurfaceInner>,
    listener: Mutex<ListenerSlot>,
}

assert_impl_all!(Surface: Send, Sync);

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Surface")
            .field("canvas", &inner.canvas)
            .field("tree", &inner.tree)
            .field("mouse_over", &inner.input.mouse_over)
            .field("focus", &inner.input.focus)
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// Wrap a canvas. The root widget is sized to the canvas.
    pub fn new(canvas: Canvas) -> Self {
        let (width, height) = canvas.size();
        let tree = WidgetTree::new(Rect::from_size(0, 0, width, height));
        debug!(target: targets::SURFACE, width, height, backend = canvas.backend().name(), "surface created");
        Self {
            inner: Mutex::new(SurfaceInner {
                canvas,
                tree,
                input: InputState::default(),
            }),
            listener: Mutex::new(ListenerSlot::default()),
        }
    }

    /// Create a surface over a software-rendered canvas.
    pub fn with_config(config: &CanvasConfig) -> WidgetResult<Self> {
        Ok(Self::new(Canvas::with_memory_backend(config)?))
    }

    /// Install the callback that receives events emitted by widgets.
    pub fn set_event_listener(&self, listener: impl FnMut(&Event) + Send + 'static) {
        self.listener.lock().replace(Some(Box::new(listener)));
    }

    pub fn clear_event_listener(&self) {
        self.listener.lock().replace(None);
    }

    fn deliver_emitted(&self, emitted: Vec<Event>) {
        if emitted.is_empty() {
            return;
        }
        {
            let mut slot = self.listener.lock();
            slot.pending.extend(emitted);
            if slot.delivering {
                // Called from inside the listener; the outer call drains.
                return;
            }
            slot.delivering = true;
        }

        loop {
            let (event, mut callback, generation) = {
                let mut slot = self.listener.lock();
                let Some(event) = slot.pending.pop_front() else {
                    slot.delivering = false;
                    return;
                };
                let Some(callback) = slot.callback.take() else {
                    trace!(target: targets::SURFACE, count = slot.pending.len() + 1, "emitted events dropped, no listener");
                    slot.pending.clear();
                    slot.delivering = false;
                    return;
                };
                (event, callback, slot.generation)
            };

            callback(&event);

            let mut slot = self.listener.lock();
            if slot.generation == generation {
                slot.callback = Some(callback);
            }
        }
    }

    // =========================================================================
    // Canvas
    // =========================================================================

    pub fn size(&self) -> (u32, u32) {
        self.inner.lock().canvas.size()
    }

    /// Resize the canvas and the root widget, then mark everything dirty.
    pub fn resize(&self, width: u32, height: u32) -> WidgetResult<()> {
        let mut inner = self.inner.lock();
        inner.canvas.resize(width, height)?;
        inner.tree.set_root_size(width, height);
        let bounds = inner.canvas.bounds();
        inner.canvas.add_dirty_rect(bounds);
        debug!(target: targets::SURFACE, width, height, "surface resized");
        Ok(())
    }

    /// Run `f` with the canvas locked.
    pub fn with_canvas<R>(&self, f: impl FnOnce(&mut Canvas) -> R) -> R {
        f(&mut self.inner.lock().canvas)
    }

    /// Run `f` with the tree locked for reading.
    pub fn with_tree<R>(&self, f: impl FnOnce(&WidgetTree) -> R) -> R {
        f(&self.inner.lock().tree)
    }

    pub fn add_dirty_rect(&self, rect: Rect) {
        self.inner.lock().canvas.add_dirty_rect(rect);
    }

    pub fn num_dirty_rects(&self) -> usize {
        self.inner.lock().canvas.num_dirty_rects()
    }

    pub fn dirty_rects(&self) -> Vec<Rect> {
        self.inner.lock().canvas.dirty_rects().to_vec()
    }

    pub fn clear_dirty_rects(&self) {
        self.inner.lock().canvas.clear_dirty_rects();
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Redraw every dirty region, then clear the dirty list.
    ///
    /// Each region is first filled with the background if `clear` is set.
    /// If the canvas is not already drawing, the pass is bracketed by
    /// `begin`/`end` over the bounding box of the dirty regions.
    pub fn redraw_widgets(&self, clear: bool) {
        let _perf = PerfSpan::new(span_names::REDRAW);
        let mut inner = self.inner.lock();
        let Some(region) = inner.canvas.dirty().bounding_box() else {
            return;
        };

        let began = !inner.canvas.is_drawing();
        if began {
            inner.canvas.begin(Some(region));
        }

        let rects = inner.canvas.dirty_rects().to_vec();
        trace!(target: targets::DRAW, count = rects.len(), "redrawing dirty regions");
        for rect in rects {
            if clear {
                let saved = inner.canvas.clip_state().snapshot();
                inner.canvas.clip_state_mut().set_origin(0, 0);
                inner.canvas.clear(Some(rect));
                inner.canvas.clip_state_mut().restore(saved);
            }
            inner.draw(Some(rect));
        }
        inner.canvas.clear_dirty_rects();

        if began {
            inner.canvas.end();
        }
    }

    /// Draw every widget over the whole canvas, ignoring and then clearing
    /// the dirty list.
    pub fn draw_all_widgets(&self, clear: bool) {
        let _perf = PerfSpan::new(span_names::DRAW_ALL);
        let mut inner = self.inner.lock();

        let began = !inner.canvas.is_drawing();
        if began {
            inner.canvas.begin(None);
        }
        if clear {
            inner.canvas.clear(None);
        }
        inner.draw(None);
        inner.canvas.clear_dirty_rects();
        if began {
            inner.canvas.end();
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Route one window event and deliver any events widgets emitted.
    pub fn route_window_event(&self, event: Event) -> RouteResult {
        let _perf = PerfSpan::new(span_names::ROUTE);
        let mut emitted = Vec::new();
        let result = {
            let mut inner = self.inner.lock();
            let SurfaceInner {
                canvas,
                tree,
                input,
            } = &mut *inner;
            route_event(canvas, tree, input, &event, &mut emitted)
        };
        self.deliver_emitted(emitted);
        result
    }

    /// The widget under the pointer, as of the last move event.
    pub fn mouse_over(&self) -> Option<WidgetId> {
        self.inner.lock().input.mouse_over
    }

    /// The widget receiving keyboard input.
    pub fn focus(&self) -> Option<WidgetId> {
        self.inner.lock().input.focus
    }

    /// Move keyboard focus, or clear it with `None`.
    ///
    /// The target must be attached.
    pub fn set_focus(&self, id: Option<WidgetId>) -> WidgetResult<()> {
        let mut emitted = Vec::new();
        {
            let mut inner = self.inner.lock();
            if id.is_some_and(|id| !inner.tree.is_attached(id)) {
                return Err(WidgetError::InvalidWidget);
            }
            let SurfaceInner {
                canvas,
                tree,
                input,
            } = &mut *inner;
            set_focus(canvas, tree, input, id, &mut emitted);
        }
        self.deliver_emitted(emitted);
        Ok(())
    }

    /// The deepest visible widget at a canvas point.
    pub fn widget_at(&self, x: i32, y: i32) -> Option<WidgetId> {
        let inner = self.inner.lock();
        child_from_point(&inner.tree, inner.tree.root(), x, y)
    }

    // =========================================================================
    // Widget tree
    // =========================================================================

    #[inline]
    pub fn root(&self) -> WidgetId {
        self.inner.lock().tree.root()
    }

    /// Create a detached widget.
    pub fn create_widget<W: Widget>(&self, widget: W, rect: Rect) -> WidgetId {
        self.inner.lock().tree.create(widget, rect)
    }

    pub fn add_child(&self, parent: WidgetId, child: WidgetId) -> WidgetResult<()> {
        self.inner
            .lock()
            .with_damage(child, |tree| tree.add_child(parent, child))
    }

    pub fn insert_child(&self, parent: WidgetId, index: usize, child: WidgetId) -> WidgetResult<()> {
        self.inner
            .lock()
            .with_damage(child, |tree| tree.insert_child(parent, index, child))
    }

    /// Detach a widget, clearing pointer and focus references into it.
    pub fn remove_from_parent(&self, id: WidgetId) -> WidgetResult<()> {
        self.inner
            .lock()
            .with_damage(id, |tree| tree.remove_from_parent(id))
    }

    /// Destroy a widget and its subtree.
    pub fn destroy_widget(&self, id: WidgetId) -> WidgetResult<()> {
        self.inner.lock().with_damage(id, |tree| tree.destroy(id))
    }

    pub fn destroy_children(&self, id: WidgetId) -> WidgetResult<()> {
        self.inner
            .lock()
            .with_damage(id, |tree| tree.destroy_children(id))
    }

    pub fn set_position(&self, id: WidgetId, x: i32, y: i32) -> WidgetResult<()> {
        self.inner
            .lock()
            .with_damage(id, |tree| tree.set_position(id, x, y))
    }

    pub fn set_size(&self, id: WidgetId, width: u32, height: u32) -> WidgetResult<()> {
        self.inner
            .lock()
            .with_damage(id, |tree| tree.set_size(id, width, height))
    }

    pub fn set_visible(&self, id: WidgetId, visible: bool) -> WidgetResult<()> {
        self.inner
            .lock()
            .with_damage(id, |tree| tree.set_visible(id, visible))
    }

    pub fn set_focus_policy(&self, id: WidgetId, policy: FocusPolicy) -> WidgetResult<()> {
        self.inner.lock().tree.set_focus_policy(id, policy)
    }

    pub fn set_name(&self, id: WidgetId, name: impl Into<String>) -> WidgetResult<()> {
        self.inner.lock().tree.set_name(id, name)
    }

    /// Mark a widget's whole area as needing a redraw.
    pub fn update_widget(&self, id: WidgetId) -> WidgetResult<()> {
        let mut inner = self.inner.lock();
        if !inner.tree.contains(id) {
            return Err(WidgetError::InvalidWidget);
        }
        let rect = inner.tree.exposed_rect(id);
        inner.invalidate(rect);
        Ok(())
    }

    pub fn absolute_rect(&self, id: WidgetId) -> Option<Rect> {
        self.inner.lock().tree.absolute_rect(id)
    }

    /// Run `f` on a widget of concrete type `W`.
    ///
    /// Returns `None` if the id is invalid or the widget is another type.
    pub fn with_widget<W: Widget, R>(&self, id: WidgetId, f: impl FnOnce(&mut W) -> R) -> Option<R> {
        self.inner.lock().tree.widget_as_mut::<W>(id).map(f)
    }

    /// Dump the widget tree as text.
    pub fn debug_tree(&self, options: TreeFormatOptions) -> String {
        WidgetTreeDebug::with_options(options).format_tree(&self.inner.lock().tree)
    }
}
