//! Widget tree storage and structural operations.
//!
//! Widgets are stored in a [`SlotMap`] keyed by [`WidgetId`]. Each node keeps
//! its parent id and an ordered child list; child order is paint order, so
//! later siblings paint over earlier ones.

use slotmap::SlotMap;
use tracing::{debug, trace};
use trellis_render::Rect;

use super::{FocusPolicy, RootWidget, StateChange, Widget, WidgetId};
use crate::error::{WidgetError, WidgetResult};
use crate::logging::targets;

/// Per-widget bookkeeping.
pub(crate) struct WidgetNode {
    pub(crate) widget: Box<dyn Widget>,
    /// Parent-relative rectangle.
    pub(crate) rect: Rect,
    pub(crate) visible: bool,
    pub(crate) focus_policy: FocusPolicy,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    /// Reachable from the root.
    pub(crate) attached: bool,
    pub(crate) name: String,
}

impl WidgetNode {
    fn new(widget: Box<dyn Widget>, rect: Rect) -> Self {
        Self {
            widget,
            rect,
            visible: true,
            focus_policy: FocusPolicy::NONE,
            parent: None,
            children: Vec::new(),
            attached: false,
            name: String::new(),
        }
    }
}

/// The widget hierarchy of one surface.
///
/// The tree always contains a synthetic root widget. Widgets are created
/// detached and become part of the drawn hierarchy once they (or an
/// ancestor) are added below the root.
pub struct WidgetTree {
    nodes: SlotMap<WidgetId, WidgetNode>,
    root: WidgetId,
}

impl std::fmt::Debug for WidgetTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetTree")
            .field("len", &self.nodes.len())
            .field("root", &self.root)
            .finish()
    }
}

impl WidgetTree {
    /// Create a tree whose root covers `root_rect`.
    pub fn new(root_rect: Rect) -> Self {
        let mut nodes = SlotMap::with_key();
        let mut node = WidgetNode::new(Box::new(RootWidget), root_rect);
        node.attached = true;
        let root = nodes.insert(node);
        Self { nodes, root }
    }

    #[inline]
    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// Number of widgets, including the root.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root is never removed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn node(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: WidgetId) -> Option<&mut WidgetNode> {
        self.nodes.get_mut(id)
    }

    fn node_or_err(&mut self, id: WidgetId) -> WidgetResult<&mut WidgetNode> {
        self.nodes.get_mut(id).ok_or(WidgetError::InvalidWidget)
    }

    fn notify(&mut self, id: WidgetId, change: StateChange) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.widget.state_changed(change);
        }
    }

    // =========================================================================
    // Creation and access
    // =========================================================================

    /// Add a detached widget to the tree.
    pub fn create<W: Widget>(&mut self, widget: W, rect: Rect) -> WidgetId {
        self.create_boxed(Box::new(widget), rect)
    }

    pub fn create_boxed(&mut self, widget: Box<dyn Widget>, rect: Rect) -> WidgetId {
        let id = self.nodes.insert(WidgetNode::new(widget, rect));
        trace!(target: targets::TREE, ?id, "widget created");
        id
    }

    pub fn widget(&self, id: WidgetId) -> Option<&(dyn Widget + 'static)> {
        self.nodes.get(id).map(|n| n.widget.as_ref())
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut (dyn Widget + 'static)> {
        match self.nodes.get_mut(id) {
            Some(node) => Some(node.widget.as_mut()),
            None => None,
        }
    }

    /// Borrow a widget as its concrete type.
    pub fn widget_as<W: Widget>(&self, id: WidgetId) -> Option<&W> {
        self.widget(id).and_then(|w| w.downcast_ref())
    }

    pub fn widget_as_mut<W: Widget>(&mut self, id: WidgetId) -> Option<&mut W> {
        self.widget_mut(id).and_then(|w| w.downcast_mut())
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children in paint order. Empty for an invalid id.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// The parent-relative rectangle.
    pub fn rect(&self, id: WidgetId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.rect)
    }

    /// The widget's own visibility flag.
    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.visible)
    }

    /// Whether the widget is reachable from the root.
    pub fn is_attached(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.attached)
    }

    pub fn focus_policy(&self, id: WidgetId) -> Option<FocusPolicy> {
        self.nodes.get(id).map(|n| n.focus_policy)
    }

    pub fn set_focus_policy(&mut self, id: WidgetId, policy: FocusPolicy) -> WidgetResult<()> {
        self.node_or_err(id)?.focus_policy = policy;
        Ok(())
    }

    /// Debug name, empty unless set.
    pub fn name(&self, id: WidgetId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name.as_str())
    }

    pub fn set_name(&mut self, id: WidgetId, name: impl Into<String>) -> WidgetResult<()> {
        self.node_or_err(id)?.name = name.into();
        Ok(())
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append `child` to `parent`'s child list, detaching it from any
    /// previous parent first.
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> WidgetResult<()> {
        self.attach(parent, child, None)
    }

    /// Insert `child` into `parent`'s child list at `index`.
    ///
    /// `index` may equal the number of children, which appends.
    pub fn insert_child(
        &mut self,
        parent: WidgetId,
        index: usize,
        child: WidgetId,
    ) -> WidgetResult<()> {
        self.attach(parent, child, Some(index))
    }

    fn attach(&mut self, parent: WidgetId, child: WidgetId, index: Option<usize>) -> WidgetResult<()> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(WidgetError::InvalidWidget);
        }
        if child == self.root {
            return Err(WidgetError::RootReparent);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(WidgetError::CircularParentage);
        }

        let same_parent = self.parent(child) == Some(parent);
        let len = self.children(parent).len() - usize::from(same_parent);
        let index = index.unwrap_or(len);
        if index > len {
            return Err(WidgetError::IndexOutOfRange { index, len });
        }

        if let Some(old) = self.parent(child) {
            self.unlink(old, child);
        }

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.insert(index, child);
        }
        let attached = self.is_attached(parent);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }

        self.notify(child, StateChange::Parent);
        self.notify(parent, StateChange::ChildAdded);
        self.set_attached(child, attached);
        debug!(target: targets::TREE, ?parent, ?child, index, "child added");
        Ok(())
    }

    /// Detach a widget (and its subtree) from its parent.
    ///
    /// Does nothing for a widget without a parent.
    pub fn remove_from_parent(&mut self, id: WidgetId) -> WidgetResult<()> {
        if !self.contains(id) {
            return Err(WidgetError::InvalidWidget);
        }
        if id == self.root {
            return Err(WidgetError::RootReparent);
        }
        let Some(parent) = self.parent(id) else {
            return Ok(());
        };

        self.unlink(parent, id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = None;
        }
        self.notify(id, StateChange::Parent);
        self.set_attached(id, false);
        debug!(target: targets::TREE, ?parent, child = ?id, "child removed");
        Ok(())
    }

    /// Destroy a widget and its whole subtree.
    pub fn destroy(&mut self, id: WidgetId) -> WidgetResult<()> {
        if id == self.root {
            return Err(WidgetError::RootDestroy);
        }
        self.remove_from_parent(id)?;

        let doomed = self.preorder(id);
        for &dead in &doomed {
            self.nodes.remove(dead);
        }
        debug!(target: targets::TREE, ?id, count = doomed.len(), "subtree destroyed");
        Ok(())
    }

    /// Destroy every child of `id`.
    pub fn destroy_children(&mut self, id: WidgetId) -> WidgetResult<()> {
        if !self.contains(id) {
            return Err(WidgetError::InvalidWidget);
        }
        for child in self.children(id).to_vec() {
            self.destroy(child)?;
        }
        Ok(())
    }

    fn unlink(&mut self, parent: WidgetId, child: WidgetId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        self.notify(parent, StateChange::ChildRemoved);
    }

    fn set_attached(&mut self, id: WidgetId, attached: bool) {
        for w in self.preorder(id) {
            let Some(node) = self.nodes.get_mut(w) else {
                continue;
            };
            if node.attached != attached {
                node.attached = attached;
                node.widget.state_changed(StateChange::Canvas);
            }
        }
    }

    fn is_ancestor_or_self(&self, ancestor: WidgetId, mut id: WidgetId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    // =========================================================================
    // Geometry and visibility
    // =========================================================================

    /// Move a widget, keeping its size.
    pub fn set_position(&mut self, id: WidgetId, x: i32, y: i32) -> WidgetResult<()> {
        let node = self.node_or_err(id)?;
        node.rect.set_position(x, y);
        node.widget.state_changed(StateChange::Position);
        Ok(())
    }

    /// Resize a widget, keeping its position.
    pub fn set_size(&mut self, id: WidgetId, width: u32, height: u32) -> WidgetResult<()> {
        let node = self.node_or_err(id)?;
        node.rect = Rect::from_size(node.rect.left, node.rect.top, width, height);
        node.widget.state_changed(StateChange::Position);
        Ok(())
    }

    /// Replace a widget's parent-relative rectangle.
    pub fn set_rect(&mut self, id: WidgetId, rect: Rect) -> WidgetResult<()> {
        let node = self.node_or_err(id)?;
        node.rect = rect;
        node.widget.state_changed(StateChange::Position);
        Ok(())
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> WidgetResult<()> {
        let node = self.node_or_err(id)?;
        if node.visible != visible {
            node.visible = visible;
            node.widget.state_changed(StateChange::Visibility);
        }
        Ok(())
    }

    /// The widget's origin in root coordinates.
    pub fn absolute_position(&self, id: WidgetId) -> Option<(i32, i32)> {
        let mut node = self.nodes.get(id)?;
        let (mut x, mut y) = (node.rect.left, node.rect.top);
        while let Some(parent) = node.parent {
            node = self.nodes.get(parent)?;
            x += node.rect.left;
            y += node.rect.top;
        }
        Some((x, y))
    }

    /// The widget's rectangle in root coordinates.
    pub fn absolute_rect(&self, id: WidgetId) -> Option<Rect> {
        let rect = self.rect(id)?;
        let (x, y) = self.absolute_position(id)?;
        Some(rect.offset(x - rect.left, y - rect.top))
    }

    /// Whether the widget and all its ancestors are visible.
    pub fn is_visible_absolute(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(w) = current {
            match self.nodes.get(w) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// The area a widget occupies on screen, if it is attached and shown.
    pub(crate) fn exposed_rect(&self, id: WidgetId) -> Option<Rect> {
        if self.is_attached(id) && self.is_visible_absolute(id) {
            self.absolute_rect(id)
        } else {
            None
        }
    }

    /// Depth-first pre-order listing of `id` and its descendants.
    pub fn preorder(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(w) = stack.pop() {
            let Some(node) = self.nodes.get(w) else {
                continue;
            };
            out.push(w);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub(crate) fn set_root_size(&mut self, width: u32, height: u32) {
        let root = self.root;
        if let Some(node) = self.nodes.get_mut(root) {
            node.rect = Rect::from_size(0, 0, width, height);
            node.widget.state_changed(StateChange::Position);
        }
    }
}
