//! Dirty-region tracking for partial redraws.
//!
//! [`DirtyRects`] keeps a short list of damaged rectangles. New damage is
//! merged into an entry it touches when possible, which keeps the list small
//! for typical widget updates (a button repainting twice, a caret moving one
//! column). When the list is full, every entry is collapsed into one bounding
//! box and tracking continues with two entries. Precision is lost in that case
//! but coverage never is.

use tracing::debug;

use crate::types::Rect;

/// Default number of rectangles tracked before collapsing.
pub const DEFAULT_DIRTY_CAPACITY: usize = 10;

/// A bounded list of damaged regions.
///
/// # Example
///
/// ```
/// use trellis_render::{DirtyRects, Rect};
///
/// let mut dirty = DirtyRects::new(10);
/// dirty.add(Rect::new(0, 0, 9, 9));
/// dirty.add(Rect::new(10, 0, 19, 9)); // shares an edge, merged
/// assert_eq!(dirty.len(), 1);
/// assert_eq!(dirty.get(0), Some(Rect::new(0, 0, 19, 9)));
/// ```
#[derive(Debug, Clone)]
pub struct DirtyRects {
    rects: Vec<Rect>,
    capacity: usize,
    collapses: u64,
}

impl DirtyRects {
    /// Create a tracker holding at most `capacity` rectangles.
    ///
    /// A capacity below 2 is raised to 2 so that a collapse always has room
    /// for the bounding box and the new rectangle.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            rects: Vec::with_capacity(capacity),
            capacity,
            collapses: 0,
        }
    }

    /// Record a damaged region.
    ///
    /// The rectangle is repaired first. It is merged into the first existing
    /// entry it overlaps or shares an edge with; otherwise it is appended. If
    /// the list is full, all entries collapse into their bounding box and the
    /// list restarts as `[bounding_box, rect]`.
    pub fn add(&mut self, rect: Rect) {
        let rect = rect.repaired();

        for existing in &mut self.rects {
            if existing.join(&rect, true) {
                return;
            }
        }

        if self.rects.len() < self.capacity {
            self.rects.push(rect);
            return;
        }

        // Capacity is at least 2, so the list is non-empty here.
        let mut bounds = self.rects[0];
        for r in &self.rects[1..] {
            bounds.join(r, false);
        }

        self.collapses += 1;
        debug!(
            ?bounds,
            tracked = self.rects.len(),
            "dirty list full, collapsing into bounding box"
        );

        self.rects.clear();
        self.rects.push(bounds);
        self.rects.push(rect);
    }

    /// Forget all tracked damage. The backing storage is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Number of tracked rectangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Returns `true` if nothing is damaged.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Maximum number of tracked rectangles.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The tracked rectangle at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Rect> {
        self.rects.get(index).copied()
    }

    /// All tracked rectangles.
    #[inline]
    pub fn as_slice(&self) -> &[Rect] {
        &self.rects
    }

    /// Bounding box of all tracked rectangles, if any.
    pub fn bounding_box(&self) -> Option<Rect> {
        let (first, rest) = self.rects.split_first()?;
        Some(rest.iter().fold(*first, |acc, r| acc.union(r)))
    }

    /// How many times the list has collapsed since creation.
    #[inline]
    pub fn collapse_count(&self) -> u64 {
        self.collapses
    }
}

impl Default for DirtyRects {
    fn default() -> Self {
        Self::new(DEFAULT_DIRTY_CAPACITY)
    }
}
