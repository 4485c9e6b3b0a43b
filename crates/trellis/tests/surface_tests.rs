//! Integration tests for drawing, routing and focus through a `Surface`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use trellis::logging::{TreeFormatOptions, TreeStyle};
use trellis::prelude::*;
use trellis::render::MemoryBackend;

type Log = Arc<Mutex<Vec<(&'static str, EventKind)>>>;

/// Fills its area, records events and counts draws.
struct Recorder {
    name: &'static str,
    color: Color,
    log: Log,
    draws: AtomicUsize,
    emit_on_press: Option<u32>,
}

impl Recorder {
    fn new(name: &'static str, color: Color, log: &Log) -> Self {
        Self {
            name,
            color,
            log: log.clone(),
            draws: AtomicUsize::new(0),
            emit_on_press: None,
        }
    }

    fn draws(&self) -> usize {
        self.draws.load(Ordering::SeqCst)
    }
}

impl Widget for Recorder {
    fn draw(&self, ctx: &mut DrawContext<'_>) {
        self.draws.fetch_add(1, Ordering::SeqCst);
        let rect = ctx.rect();
        ctx.canvas().draw_box(&rect, self.color, PixelFormat::Rgb8);
    }

    fn event(&mut self, event: &Event, ctx: &mut EventContext<'_>) {
        self.log.lock().push((self.name, event.kind));
        if let (EventKind::MousePress { .. }, Some(code)) = (event.kind, self.emit_on_press) {
            ctx.emit(code);
        }
    }
}

const BACKGROUND: Color = Color::rgb(9, 9, 9);

fn surface(width: u32, height: u32) -> Surface {
    let config = CanvasConfig::default()
        .with_size(width, height)
        .with_background(BACKGROUND);
    Surface::with_config(&config).unwrap()
}

fn add(surface: &Surface, parent: WidgetId, widget: Recorder, rect: Rect) -> WidgetId {
    let id = surface.create_widget(widget, rect);
    surface.add_child(parent, id).unwrap();
    id
}

fn pixel(surface: &Surface, x: u32, y: u32) -> Color {
    surface.with_canvas(|c| {
        c.backend_as::<MemoryBackend>()
            .and_then(|b| b.pixel(x, y))
            .unwrap()
    })
}

fn draws(surface: &Surface, id: WidgetId) -> usize {
    surface.with_widget::<Recorder, _>(id, |r| r.draws()).unwrap()
}

fn take(log: &Log) -> Vec<(&'static str, EventKind)> {
    std::mem::take(&mut *log.lock())
}

#[test]
fn test_pointer_enter_move_leave() {
    let log = Log::default();
    let s = surface(100, 100);
    let button = add(
        &s,
        s.root(),
        Recorder::new("button", Color::WHITE, &log),
        Rect::from_size(10, 10, 50, 50),
    );

    assert_eq!(s.route_window_event(Event::mouse_move(20, 20)), RouteResult::Delivered(button));
    assert_eq!(s.mouse_over(), Some(button));
    assert_eq!(
        take(&log),
        vec![
            ("button", EventKind::MouseEnter),
            ("button", EventKind::MouseMove { x: 10, y: 10 }),
        ]
    );

    s.route_window_event(Event::mouse_move(90, 90));
    assert_eq!(s.mouse_over(), Some(s.root()));
    assert_eq!(take(&log), vec![("button", EventKind::MouseLeave)]);
}

#[test]
fn test_pointer_leave_precedes_enter() {
    let log = Log::default();
    let s = surface(100, 100);
    // Stands in for the root so its enter is observable.
    let backdrop = add(
        &s,
        s.root(),
        Recorder::new("backdrop", Color::BLACK, &log),
        Rect::from_size(0, 0, 100, 100),
    );
    let child = add(
        &s,
        backdrop,
        Recorder::new("child", Color::WHITE, &log),
        Rect::from_size(10, 10, 50, 50),
    );

    s.route_window_event(Event::mouse_move(20, 20));
    assert_eq!(s.mouse_over(), Some(child));
    assert_eq!(
        take(&log),
        vec![
            ("child", EventKind::MouseEnter),
            ("child", EventKind::MouseMove { x: 10, y: 10 }),
        ]
    );

    // Still inside: no second enter.
    s.route_window_event(Event::mouse_move(30, 25));
    assert_eq!(take(&log), vec![("child", EventKind::MouseMove { x: 20, y: 15 })]);

    s.route_window_event(Event::mouse_move(90, 90));
    assert_eq!(s.mouse_over(), Some(backdrop));
    assert_eq!(
        take(&log),
        vec![
            ("child", EventKind::MouseLeave),
            ("backdrop", EventKind::MouseEnter),
            ("backdrop", EventKind::MouseMove { x: 90, y: 90 }),
        ]
    );

    s.route_window_event(Event::mouse_move(95, 95));
    assert_eq!(take(&log), vec![("backdrop", EventKind::MouseMove { x: 95, y: 95 })]);
}

#[test]
fn test_press_target_matches_hit_test() {
    let log = Log::default();
    let s = surface(100, 100);
    let root = s.root();
    let back = add(&s, root, Recorder::new("back", Color::WHITE, &log), Rect::from_size(0, 0, 80, 80));
    let front = add(&s, root, Recorder::new("front", Color::WHITE, &log), Rect::from_size(40, 40, 40, 40));
    let inner = add(&s, front, Recorder::new("inner", Color::WHITE, &log), Rect::from_size(10, 10, 5, 5));

    for (x, y, expected) in [(5, 5, back), (45, 45, front), (52, 53, inner), (95, 95, root)] {
        assert_eq!(s.widget_at(x, y), Some(expected));
        s.route_window_event(Event::mouse_move(x, y));
        let result = s.route_window_event(Event::mouse_press(x, y, MouseButton::Left));
        assert_eq!(result, RouteResult::Delivered(expected));
        assert_eq!(s.focus(), Some(expected));
    }

    // Local coordinates for the nested widget.
    assert!(take(&log).contains(&("inner", EventKind::MousePress {
        x: 2,
        y: 3,
        button: MouseButton::Left
    })));
}

#[test]
fn test_press_transfers_focus_in_order() {
    let log = Log::default();
    let s = surface(100, 100);
    let a = add(&s, s.root(), Recorder::new("a", Color::WHITE, &log), Rect::from_size(0, 0, 10, 10));
    let b = add(&s, s.root(), Recorder::new("b", Color::WHITE, &log), Rect::from_size(20, 0, 10, 10));
    s.set_focus(Some(a)).unwrap();
    take(&log);

    s.route_window_event(Event::mouse_move(25, 5));
    s.route_window_event(Event::mouse_press(25, 5, MouseButton::Left));
    assert_eq!(s.focus(), Some(b));
    assert_eq!(
        take(&log),
        vec![
            ("b", EventKind::MouseEnter),
            ("b", EventKind::MouseMove { x: 5, y: 5 }),
            ("b", EventKind::MousePress { x: 5, y: 5, button: MouseButton::Left }),
            ("a", EventKind::FocusLost),
            ("b", EventKind::FocusGained),
        ]
    );

    s.route_window_event(Event::new(EventKind::Char('q')));
    s.route_window_event(Event::new(EventKind::MouseWheel { delta: -1 }));
    assert_eq!(
        take(&log),
        vec![
            ("b", EventKind::Char('q')),
            ("b", EventKind::MouseWheel { delta: -1 }),
        ]
    );
}

#[test]
fn test_detach_clears_pointer_and_focus() {
    let log = Log::default();
    let s = surface(100, 100);
    let panel = add(&s, s.root(), Recorder::new("panel", Color::WHITE, &log), Rect::from_size(0, 0, 50, 50));
    let button = add(&s, panel, Recorder::new("button", Color::WHITE, &log), Rect::from_size(5, 5, 10, 10));

    s.route_window_event(Event::mouse_move(8, 8));
    s.route_window_event(Event::mouse_press(8, 8, MouseButton::Left));
    assert_eq!(s.mouse_over(), Some(button));
    assert_eq!(s.focus(), Some(button));

    s.remove_from_parent(panel).unwrap();
    assert_eq!(s.mouse_over(), None);
    assert_eq!(s.focus(), None);

    take(&log);
    assert_eq!(s.route_window_event(Event::new(EventKind::Char('x'))), RouteResult::Dropped);
    assert!(take(&log).is_empty());

    // Destroyed widgets stop resolving.
    s.add_child(s.root(), panel).unwrap();
    s.destroy_widget(panel).unwrap();
    assert!(s.with_tree(|t| !t.contains(button)));
    assert_eq!(s.add_child(s.root(), button), Err(WidgetError::InvalidWidget));
}

#[test]
fn test_draw_all_respects_order_and_visibility() {
    let log = Log::default();
    let s = surface(40, 40);
    let root = s.root();
    let red = add(&s, root, Recorder::new("red", Color::rgb(200, 0, 0), &log), Rect::from_size(0, 0, 20, 20));
    add(&s, root, Recorder::new("blue", Color::rgb(0, 0, 200), &log), Rect::from_size(10, 10, 20, 20));
    let hidden = add(&s, root, Recorder::new("hidden", Color::WHITE, &log), Rect::from_size(30, 30, 10, 10));
    s.set_visible(hidden, false).unwrap();

    s.draw_all_widgets(true);
    assert_eq!(s.num_dirty_rects(), 0);
    assert_eq!(pixel(&s, 5, 5), Color::rgb(200, 0, 0));
    assert_eq!(pixel(&s, 15, 15), Color::rgb(0, 0, 200));
    assert_eq!(pixel(&s, 35, 35), BACKGROUND);
    assert_eq!(draws(&s, hidden), 0);
    assert_eq!(draws(&s, red), 1);
}

#[test]
fn test_redraw_only_touches_dirty_regions() {
    let log = Log::default();
    let s = surface(100, 100);
    let root = s.root();
    let left = add(&s, root, Recorder::new("left", Color::rgb(1, 2, 3), &log), Rect::from_size(0, 0, 20, 20));
    let right = add(&s, root, Recorder::new("right", Color::rgb(4, 5, 6), &log), Rect::from_size(60, 60, 20, 20));
    s.draw_all_widgets(true);

    s.with_widget::<Recorder, _>(left, |r| r.color = Color::rgb(7, 8, 9));
    s.update_widget(left).unwrap();
    assert_eq!(s.num_dirty_rects(), 1);

    s.redraw_widgets(true);
    assert_eq!(s.num_dirty_rects(), 0);
    assert_eq!(pixel(&s, 10, 10), Color::rgb(7, 8, 9));
    assert_eq!(draws(&s, left), 2);
    assert_eq!(draws(&s, right), 1);

    // Hiding clears the old area to the background.
    s.set_visible(right, false).unwrap();
    s.redraw_widgets(true);
    assert_eq!(pixel(&s, 70, 70), BACKGROUND);
}

#[test]
fn test_moving_a_widget_repaints_both_areas() {
    let log = Log::default();
    let s = surface(60, 60);
    let w = add(&s, s.root(), Recorder::new("w", Color::WHITE, &log), Rect::from_size(0, 0, 10, 10));
    s.draw_all_widgets(true);

    s.set_position(w, 40, 40).unwrap();
    s.redraw_widgets(true);
    assert_eq!(pixel(&s, 5, 5), BACKGROUND);
    assert_eq!(pixel(&s, 45, 45), Color::WHITE);
}

#[test]
fn test_focus_box_drawn_for_focus_widget() {
    let log = Log::default();
    let s = surface(40, 40);
    let focus_color = s.with_canvas(|c| c.focus_color());
    let a = add(&s, s.root(), Recorder::new("a", Color::rgb(1, 1, 1), &log), Rect::from_size(5, 5, 10, 10));
    let b = add(&s, s.root(), Recorder::new("b", Color::rgb(1, 1, 1), &log), Rect::from_size(20, 5, 10, 10));
    s.set_focus_policy(a, FocusPolicy::TAB_FOCUS).unwrap();
    s.set_focus_policy(b, FocusPolicy::ACCEPT).unwrap();

    s.set_focus(Some(a)).unwrap();
    s.draw_all_widgets(true);
    assert_eq!(pixel(&s, 5, 5), focus_color);
    assert_eq!(pixel(&s, 14, 14), focus_color);
    assert_eq!(pixel(&s, 10, 10), Color::rgb(1, 1, 1));

    // Moving focus to a widget without a box repaints the old one plain.
    s.set_focus(Some(b)).unwrap();
    s.redraw_widgets(true);
    assert_eq!(pixel(&s, 5, 5), Color::rgb(1, 1, 1));
    assert_eq!(pixel(&s, 20, 5), Color::rgb(1, 1, 1));
}

#[test]
fn test_tab_cycles_through_focusable_widgets() {
    let log = Log::default();
    let s = surface(100, 100);
    let root = s.root();
    let first = add(&s, root, Recorder::new("first", Color::WHITE, &log), Rect::from_size(0, 0, 10, 10));
    let group = add(&s, root, Recorder::new("group", Color::WHITE, &log), Rect::from_size(20, 0, 40, 40));
    let nested = add(&s, group, Recorder::new("nested", Color::WHITE, &log), Rect::from_size(0, 0, 10, 10));
    for id in [first, nested] {
        s.set_focus_policy(id, FocusPolicy::TAB_FOCUS).unwrap();
    }

    let mut order = Vec::new();
    for _ in 0..3 {
        s.route_window_event(Event::key_pressed(Key::Tab));
        order.push(s.focus());
    }
    assert_eq!(order, vec![Some(first), Some(nested), Some(first)]);

    take(&log);
    assert_eq!(
        s.route_window_event(Event::key_pressed(Key::Escape)),
        RouteResult::FocusMoved(None)
    );
    assert_eq!(take(&log), vec![("first", EventKind::FocusLost)]);
}

#[test]
fn test_emitted_events_reach_listener_after_routing() {
    let log = Log::default();
    let s = Arc::new(surface(100, 100));
    let mut button = Recorder::new("button", Color::WHITE, &log);
    button.emit_on_press = Some(42);
    let id = add(&s, s.root(), button, Rect::from_size(0, 0, 30, 30));

    let received = Arc::new(Mutex::new(Vec::new()));
    {
        let received = received.clone();
        let surface = Arc::downgrade(&s);
        s.set_event_listener(move |event| {
            // The surface lock is free again by now.
            let focus = surface.upgrade().and_then(|s| s.focus());
            received.lock().push((*event, focus));
        });
    }

    s.route_window_event(Event::mouse_move(5, 5));
    s.route_window_event(Event::mouse_press(5, 5, MouseButton::Left));

    assert_eq!(
        *received.lock(),
        vec![(Event::from_widget(id, EventKind::Custom(42)), Some(id))]
    );
    assert_eq!(received.lock()[0].0.source, EventSource::Widget(id));
}

#[test]
fn test_listener_may_route_back_into_surface() {
    let log = Log::default();
    let s = Arc::new(surface(100, 100));
    let mut button = Recorder::new("button", Color::WHITE, &log);
    button.emit_on_press = Some(7);
    let id = add(&s, s.root(), button, Rect::from_size(0, 0, 30, 30));
    s.route_window_event(Event::mouse_move(5, 5));

    let received = Arc::new(AtomicUsize::new(0));
    {
        let received = received.clone();
        let surface = Arc::downgrade(&s);
        s.set_event_listener(move |event| {
            assert_eq!(event.source, EventSource::Widget(id));
            // Press again from inside the listener, once.
            if received.fetch_add(1, Ordering::SeqCst) == 0
                && let Some(s) = surface.upgrade()
            {
                s.route_window_event(Event::mouse_press(5, 5, MouseButton::Left));
            }
        });
    }

    let (done_tx, done_rx) = std::sync::mpsc::channel();
    let worker = {
        let s = s.clone();
        std::thread::spawn(move || {
            s.route_window_event(Event::mouse_press(5, 5, MouseButton::Left));
            let _ = done_tx.send(());
        })
    };
    done_rx
        .recv_timeout(std::time::Duration::from_secs(5))
        .expect("routing from inside the listener did not return");
    worker.join().unwrap();

    // The outer emission and the nested one.
    assert_eq!(received.load(Ordering::SeqCst), 2);
    assert_eq!(
        take(&log)
            .iter()
            .filter(|(_, kind)| matches!(kind, EventKind::MousePress { .. }))
            .count(),
        2
    );

    // The listener is still installed afterwards.
    s.route_window_event(Event::mouse_press(5, 5, MouseButton::Left));
    assert_eq!(received.load(Ordering::SeqCst), 3);
}

#[test]
fn test_listener_replaced_during_delivery_is_kept() {
    let log = Log::default();
    let s = Arc::new(surface(100, 100));
    let mut button = Recorder::new("button", Color::WHITE, &log);
    button.emit_on_press = Some(1);
    add(&s, s.root(), button, Rect::from_size(0, 0, 30, 30));
    s.route_window_event(Event::mouse_move(5, 5));

    let second = Arc::new(AtomicUsize::new(0));
    {
        let second = second.clone();
        let surface = Arc::downgrade(&s);
        s.set_event_listener(move |_| {
            let Some(s) = surface.upgrade() else {
                return;
            };
            let second = second.clone();
            s.set_event_listener(move |_| {
                second.fetch_add(1, Ordering::SeqCst);
            });
        });
    }

    s.route_window_event(Event::mouse_press(5, 5, MouseButton::Left));
    assert_eq!(second.load(Ordering::SeqCst), 0);
    s.route_window_event(Event::mouse_press(5, 5, MouseButton::Left));
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn test_broadcast_and_ignored_synthesized_events() {
    let log = Log::default();
    let s = surface(50, 50);
    let a = add(&s, s.root(), Recorder::new("a", Color::WHITE, &log), Rect::from_size(0, 0, 10, 10));
    add(&s, a, Recorder::new("b", Color::WHITE, &log), Rect::from_size(0, 0, 5, 5));

    assert_eq!(s.route_window_event(Event::new(EventKind::Closed)), RouteResult::Broadcast);
    assert_eq!(
        take(&log),
        vec![("a", EventKind::Closed), ("b", EventKind::Closed)]
    );

    assert_eq!(s.route_window_event(Event::new(EventKind::FocusGained)), RouteResult::Dropped);
    assert!(take(&log).is_empty());
}

#[test]
fn test_debug_tree_dump() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let log = Log::default();
    let s = surface(50, 50);
    let a = add(&s, s.root(), Recorder::new("a", Color::WHITE, &log), Rect::from_size(1, 2, 10, 10));
    s.set_name(a, "toolbar").unwrap();

    let dump = s.debug_tree(TreeFormatOptions {
        style: TreeStyle::Ascii,
        show_ids: false,
        ..TreeFormatOptions::detailed()
    });
    assert_eq!(
        dump,
        "(unnamed) (Root) @ (0, 0) 50x50\n`-- toolbar (Recorder) @ (1, 2) 10x10\n"
    );
}
