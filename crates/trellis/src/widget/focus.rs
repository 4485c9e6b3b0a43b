//! Focus policy and tab-order navigation.

use super::WidgetId;
use super::tree::WidgetTree;

/// How a widget takes part in keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FocusPolicy {
    /// The widget can be the focus widget when reached by keyboard
    /// navigation.
    pub accept: bool,
    /// A focus box is drawn around the widget while it has focus.
    pub draw_focus: bool,
    /// Pressing Escape while the widget has focus clears focus.
    pub drop_on_escape: bool,
    /// Pressing Tab while the widget has focus moves to the next widget.
    pub drop_on_tab: bool,
}

impl FocusPolicy {
    /// Never focused by keyboard navigation.
    pub const NONE: Self = Self {
        accept: false,
        draw_focus: false,
        drop_on_escape: false,
        drop_on_tab: false,
    };

    /// Takes focus and keeps Tab and Escape for itself.
    pub const ACCEPT: Self = Self {
        accept: true,
        draw_focus: false,
        drop_on_escape: false,
        drop_on_tab: false,
    };

    /// The usual policy for buttons and similar controls.
    pub const TAB_FOCUS: Self = Self {
        accept: true,
        draw_focus: true,
        drop_on_escape: true,
        drop_on_tab: true,
    };

    pub fn with_draw_focus(mut self, draw: bool) -> Self {
        self.draw_focus = draw;
        self
    }

    pub fn with_drop_on_escape(mut self, drop: bool) -> Self {
        self.drop_on_escape = drop;
        self
    }

    pub fn with_drop_on_tab(mut self, drop: bool) -> Self {
        self.drop_on_tab = drop;
        self
    }
}

/// Find the widget that follows `current` in tab order, or precedes it
/// when `forward` is false.
///
/// Tab order is depth-first pre-order from the root, restricted to widgets
/// that accept focus and are visible along with all their ancestors. The
/// search wraps, so `current` itself is returned when it is the only
/// candidate. With no current widget the first candidate in the search
/// direction is returned.
pub(crate) fn next_focus(
    tree: &WidgetTree,
    current: Option<WidgetId>,
    forward: bool,
) -> Option<WidgetId> {
    let mut order = tree.preorder(tree.root());
    if !forward {
        order.reverse();
    }
    let is_candidate = |id: WidgetId| {
        id != tree.root()
            && tree.focus_policy(id).is_some_and(|p| p.accept)
            && tree.is_visible_absolute(id)
    };

    let start = current.and_then(|c| order.iter().position(|&id| id == c));
    match start {
        Some(pos) => (1..=order.len())
            .map(|step| order[(pos + step) % order.len()])
            .find(|&id| is_candidate(id)),
        None => order.into_iter().find(|&id| is_candidate(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::tests::Tracker;
    use trellis_render::Rect;

    fn tree_with(policies: &[FocusPolicy]) -> (WidgetTree, Vec<WidgetId>) {
        let mut tree = WidgetTree::new(Rect::from_size(0, 0, 100, 100));
        let ids: Vec<_> = policies
            .iter()
            .map(|&policy| {
                let id = tree.create(Tracker::default(), Rect::from_size(0, 0, 10, 10));
                tree.set_focus_policy(id, policy).unwrap();
                tree.add_child(tree.root(), id).unwrap();
                id
            })
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_next_focus_skips_non_accepting() {
        let (tree, ids) = tree_with(&[
            FocusPolicy::TAB_FOCUS,
            FocusPolicy::NONE,
            FocusPolicy::TAB_FOCUS,
        ]);
        assert_eq!(next_focus(&tree, Some(ids[0]), true), Some(ids[2]));
        assert_eq!(next_focus(&tree, Some(ids[2]), true), Some(ids[0]));
        assert_eq!(next_focus(&tree, None, true), Some(ids[0]));
    }

    #[test]
    fn test_previous_focus_walks_backwards() {
        let (tree, ids) = tree_with(&[
            FocusPolicy::TAB_FOCUS,
            FocusPolicy::TAB_FOCUS,
            FocusPolicy::NONE,
        ]);
        assert_eq!(next_focus(&tree, Some(ids[1]), false), Some(ids[0]));
        assert_eq!(next_focus(&tree, Some(ids[0]), false), Some(ids[1]));
        assert_eq!(next_focus(&tree, None, false), Some(ids[1]));
    }

    #[test]
    fn test_next_focus_skips_hidden_subtrees() {
        let (mut tree, ids) = tree_with(&[FocusPolicy::TAB_FOCUS, FocusPolicy::TAB_FOCUS]);
        tree.set_visible(ids[1], false).unwrap();
        assert_eq!(next_focus(&tree, Some(ids[0]), true), Some(ids[0]));
    }

    #[test]
    fn test_next_focus_none_when_nothing_accepts() {
        let (tree, _) = tree_with(&[FocusPolicy::NONE]);
        assert_eq!(next_focus(&tree, None, true), None);
    }
}
