//! Recursive widget tree drawing.

use tracing::trace;
use trellis_render::{Canvas, Rect};

use super::{DrawContext, WidgetId, WidgetTree};
use crate::logging::targets;

/// Draw the children of `id` and their subtrees.
///
/// `origin` is the canvas position of `id`'s top-left corner. When `bounds`
/// is given, only children whose canvas rectangle intersects it are drawn,
/// and each is clipped to that intersection. Hidden or empty children are
/// skipped with their whole subtree. If `focus` names a child whose policy
/// asks for it, a focus box is drawn over the child before its own
/// children.
///
/// The canvas scissor and offset are restored after every child.
pub(crate) fn draw_subtree(
    canvas: &mut Canvas,
    tree: &WidgetTree,
    id: WidgetId,
    origin: (i32, i32),
    bounds: Option<Rect>,
    focus: Option<WidgetId>,
) {
    for &child in tree.children(id) {
        let Some(node) = tree.node(child) else {
            continue;
        };
        if !node.visible || node.rect.is_empty() {
            continue;
        }

        let (x, y) = (origin.0 + node.rect.left, origin.1 + node.rect.top);
        let mut area = node.rect.offset(origin.0, origin.1);
        if let Some(bounds) = bounds {
            match area.intersect(&bounds) {
                Some(r) => area = r,
                None => continue,
            }
        }

        let saved = canvas.clip_state().snapshot();
        canvas.clip_state_mut().narrow(&area);
        canvas.clip_state_mut().set_origin(x, y);

        let width = node.rect.width() as u32;
        let height = node.rect.height() as u32;
        let focused = focus == Some(child);
        trace!(target: targets::DRAW, widget = ?child, ?area, "drawing widget");
        node.widget
            .draw(&mut DrawContext::new(canvas, child, width, height, focused));

        if focused && node.focus_policy.draw_focus {
            let color = canvas.focus_color();
            canvas.draw_frame(&Rect::from_size(0, 0, width, height), color);
        }

        draw_subtree(canvas, tree, child, (x, y), Some(area), focus);
        canvas.clip_state_mut().restore(saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{FocusPolicy, Widget};
    use std::sync::Arc;
    use parking_lot::Mutex;
    use trellis_render::{CanvasConfig, Color, MemoryBackend, PixelFormat};

    /// Fills its area and logs the scissor it saw.
    struct Fill {
        color: Color,
        log: Arc<Mutex<Vec<(WidgetId, Rect)>>>,
    }

    impl Widget for Fill {
        fn draw(&self, ctx: &mut DrawContext<'_>) {
            let rect = ctx.rect();
            let id = ctx.id();
            let canvas = ctx.canvas();
            self.log.lock().push((id, canvas.scissor_rect()));
            canvas.draw_box(&rect, self.color, PixelFormat::Rgb8);
        }
    }

    struct Fixture {
        canvas: Canvas,
        tree: WidgetTree,
        log: Arc<Mutex<Vec<(WidgetId, Rect)>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let config = CanvasConfig::default().with_size(40, 40);
            Self {
                canvas: Canvas::with_memory_backend(&config).unwrap(),
                tree: WidgetTree::new(Rect::from_size(0, 0, 40, 40)),
                log: Arc::default(),
            }
        }

        fn add(&mut self, parent: WidgetId, rect: Rect, color: Color) -> WidgetId {
            let fill = Fill {
                color,
                log: self.log.clone(),
            };
            let id = self.tree.create(fill, rect);
            self.tree.add_child(parent, id).unwrap();
            id
        }

        fn draw(&mut self, bounds: Option<Rect>, focus: Option<WidgetId>) {
            self.canvas.begin(None);
            let root = self.tree.root();
            draw_subtree(&mut self.canvas, &self.tree, root, (0, 0), bounds, focus);
            self.canvas.end();
        }

        fn pixel(&self, x: u32, y: u32) -> Color {
            self.canvas
                .backend_as::<MemoryBackend>()
                .and_then(|b| b.pixel(x, y))
                .unwrap()
        }
    }

    #[test]
    fn test_children_clipped_to_parent() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        let parent = f.add(root, Rect::from_size(10, 10, 10, 10), Color::rgb(1, 0, 0));
        let child = f.add(parent, Rect::from_size(5, 5, 20, 20), Color::rgb(2, 0, 0));
        f.draw(None, None);

        assert_eq!(
            *f.log.lock(),
            vec![
                (parent, Rect::new(10, 10, 19, 19)),
                (child, Rect::new(15, 15, 19, 19)),
            ]
        );
        assert_eq!(f.pixel(15, 15), Color::rgb(2, 0, 0));
        assert_eq!(f.pixel(20, 20), Color::BLACK);
        // Scissor and offset are back to the begin state.
        assert_eq!(f.canvas.offset(), (0, 0));
    }

    #[test]
    fn test_later_siblings_paint_over_earlier() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        f.add(root, Rect::from_size(0, 0, 10, 10), Color::rgb(1, 0, 0));
        f.add(root, Rect::from_size(5, 5, 10, 10), Color::rgb(2, 0, 0));
        f.draw(None, None);

        assert_eq!(f.pixel(2, 2), Color::rgb(1, 0, 0));
        assert_eq!(f.pixel(7, 7), Color::rgb(2, 0, 0));
    }

    #[test]
    fn test_hidden_and_empty_subtrees_skipped() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        let hidden = f.add(root, Rect::from_size(0, 0, 10, 10), Color::WHITE);
        f.add(hidden, Rect::from_size(0, 0, 5, 5), Color::WHITE);
        f.add(root, Rect::new(20, 20, 10, 10), Color::WHITE);
        f.tree.set_visible(hidden, false).unwrap();
        f.draw(None, None);

        assert!(f.log.lock().is_empty());
    }

    #[test]
    fn test_bounds_restrict_and_clip() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        let a = f.add(root, Rect::from_size(0, 0, 10, 10), Color::rgb(1, 0, 0));
        f.add(root, Rect::from_size(30, 30, 5, 5), Color::rgb(2, 0, 0));
        f.draw(Some(Rect::new(5, 5, 20, 20)), None);

        assert_eq!(*f.log.lock(), vec![(a, Rect::new(5, 5, 9, 9))]);
        assert_eq!(f.pixel(4, 4), Color::BLACK);
        assert_eq!(f.pixel(5, 5), Color::rgb(1, 0, 0));
    }

    #[test]
    fn test_focus_box_drawn_before_children() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        let a = f.add(root, Rect::from_size(0, 0, 20, 20), Color::rgb(1, 0, 0));
        f.add(a, Rect::from_size(0, 0, 5, 5), Color::rgb(2, 0, 0));
        f.tree.set_focus_policy(a, FocusPolicy::TAB_FOCUS).unwrap();
        let focus_color = f.canvas.focus_color();
        f.draw(None, Some(a));

        assert_eq!(f.pixel(19, 19), focus_color);
        assert_eq!(f.pixel(10, 0), focus_color);
        assert_eq!(f.pixel(10, 10), Color::rgb(1, 0, 0));
        // The child paints over the box.
        assert_eq!(f.pixel(0, 0), Color::rgb(2, 0, 0));
    }

    #[test]
    fn test_no_focus_box_without_policy() {
        let mut f = Fixture::new();
        let root = f.tree.root();
        let a = f.add(root, Rect::from_size(0, 0, 20, 20), Color::rgb(1, 0, 0));
        f.tree.set_focus_policy(a, FocusPolicy::ACCEPT).unwrap();
        f.draw(None, Some(a));

        assert_eq!(f.pixel(19, 19), Color::rgb(1, 0, 0));
    }
}
