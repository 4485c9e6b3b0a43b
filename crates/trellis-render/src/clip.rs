//! Scissor and coordinate-offset stacks.
//!
//! Every drawing operation on a canvas is first translated by the current
//! offset and then clipped against the current scissor rectangle. Widgets
//! that need nested clipping (a group box clipping its contents, a scroll
//! view clipping its viewport) push onto these stacks and pop when done.
//!
//! Both stacks have a fixed depth. A push beyond that depth is refused and
//! the scissor or offset stays as it was. Refused pushes are counted so that
//! the matching pops are absorbed instead of unwinding state that belongs
//! to an outer caller; push/pop pairs therefore always round-trip.

use tracing::warn;

use crate::types::Rect;

/// Default depth of the scissor and offset stacks.
pub const DEFAULT_STACK_DEPTH: usize = 10;

/// A saved scissor/offset pair, used to restore state after a nested draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipSnapshot {
    scissor: Rect,
    offset: (i32, i32),
}

/// Scissor rectangle and coordinate offset state of a canvas.
#[derive(Debug, Clone)]
pub struct ClipState {
    /// The full canvas rectangle.
    bounds: Rect,
    scissor: Rect,
    scissor_stack: Vec<Rect>,
    scissor_refused: usize,
    offset: (i32, i32),
    offset_stack: Vec<(i32, i32)>,
    offset_refused: usize,
    depth: usize,
}

impl ClipState {
    /// Create clip state for a canvas of the given size.
    pub fn new(width: u32, height: u32, depth: usize) -> Self {
        let bounds = Rect::from_size(0, 0, width, height);
        Self {
            bounds,
            scissor: bounds,
            scissor_stack: Vec::with_capacity(depth),
            scissor_refused: 0,
            offset: (0, 0),
            offset_stack: Vec::with_capacity(depth),
            offset_refused: 0,
            depth,
        }
    }

    /// Update the full canvas rectangle after a resize.
    ///
    /// The active scissor is narrowed to the new bounds.
    pub fn set_bounds(&mut self, width: u32, height: u32) {
        self.bounds = Rect::from_size(0, 0, width, height);
        self.scissor = self.scissor.intersect(&self.bounds).unwrap_or(Rect::EMPTY);
    }

    /// Drop both stacks and make `scissor` the active scissor with no offset.
    pub fn reset(&mut self, scissor: Rect) {
        self.scissor = scissor;
        self.scissor_stack.clear();
        self.scissor_refused = 0;
        self.offset = (0, 0);
        self.offset_stack.clear();
        self.offset_refused = 0;
    }

    /// The full canvas rectangle.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The active scissor rectangle in canvas coordinates.
    #[inline]
    pub fn scissor(&self) -> Rect {
        self.scissor
    }

    /// The active coordinate offset.
    #[inline]
    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    /// Maximum depth of each stack.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of scissor rectangles currently saved on the stack.
    #[inline]
    pub fn scissor_depth(&self) -> usize {
        self.scissor_stack.len()
    }

    /// Number of offsets currently saved on the stack.
    #[inline]
    pub fn offset_depth(&self) -> usize {
        self.offset_stack.len()
    }

    /// Translate a rectangle by the current offset.
    #[inline]
    pub fn to_canvas(&self, rect: Rect) -> Rect {
        rect.offset(self.offset.0, self.offset.1)
    }

    /// Translate a rectangle by the current offset and clip it to the
    /// scissor. Returns `None` if nothing remains.
    #[inline]
    pub fn clip(&self, rect: Rect) -> Option<Rect> {
        self.to_canvas(rect).intersect(&self.scissor)
    }

    /// Push or pop the scissor rectangle.
    ///
    /// With a non-zero `width` and `height`, the current scissor is saved
    /// and replaced by its intersection with the given rectangle (translated
    /// by the current offset). A zero width or height pops instead: the
    /// previous scissor is restored, or the full canvas if none is saved.
    pub fn set_scissor(&mut self, x: i32, y: i32, width: u32, height: u32) {
        if width == 0 || height == 0 {
            self.pop_scissor();
            return;
        }

        if self.scissor_stack.len() >= self.depth {
            self.scissor_refused += 1;
            warn!(depth = self.depth, "scissor stack full, push refused");
            return;
        }

        let rect = self.to_canvas(Rect::from_size(x, y, width, height));
        self.scissor_stack.push(self.scissor);
        self.scissor = self.scissor.intersect(&rect).unwrap_or(Rect::EMPTY);
    }

    fn pop_scissor(&mut self) {
        if self.scissor_refused > 0 {
            self.scissor_refused -= 1;
            return;
        }

        self.scissor = self.scissor_stack.pop().unwrap_or(self.bounds);
    }

    /// Save the current offset and add `(x, y)` to it.
    pub fn set_offset(&mut self, x: i32, y: i32) {
        if self.offset_stack.len() >= self.depth {
            self.offset_refused += 1;
            warn!(depth = self.depth, "offset stack full, push refused");
            return;
        }

        self.offset_stack.push(self.offset);
        self.offset.0 = self.offset.0.saturating_add(x);
        self.offset.1 = self.offset.1.saturating_add(y);
    }

    /// Restore the previously saved offset, or `(0, 0)` if none is saved.
    pub fn restore_offset(&mut self) {
        if self.offset_refused > 0 {
            self.offset_refused -= 1;
            return;
        }

        self.offset = self.offset_stack.pop().unwrap_or((0, 0));
    }

    /// Capture the active scissor and offset.
    #[inline]
    pub fn snapshot(&self) -> ClipSnapshot {
        ClipSnapshot {
            scissor: self.scissor,
            offset: self.offset,
        }
    }

    /// Restore a scissor and offset captured by [`snapshot`](Self::snapshot).
    ///
    /// The stacks are left untouched.
    #[inline]
    pub fn restore(&mut self, snapshot: ClipSnapshot) {
        self.scissor = snapshot.scissor;
        self.offset = snapshot.offset;
    }

    /// Replace the active scissor by its intersection with `rect`, given in
    /// canvas coordinates. Nothing is saved.
    #[inline]
    pub fn narrow(&mut self, rect: &Rect) {
        self.scissor = self.scissor.intersect(rect).unwrap_or(Rect::EMPTY);
    }

    /// Replace the active offset without touching the stack.
    #[inline]
    pub fn set_origin(&mut self, x: i32, y: i32) {
        self.offset = (x, y);
    }
}
