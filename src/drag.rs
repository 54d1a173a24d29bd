//! Drag gestures: column resize and column/row reorder
//!
//! A header press starts as [`Gesture::HeaderPress`]. Moving past the drag
//! threshold on an already-selected header turns it into a reorder; a
//! press on a column boundary starts a resize straight away. The grid owns
//! the gesture in an `Option`, so at most one drag is ever active.

use crate::geometry::Point;
use crate::index_set::IndexSet;
use crate::layout::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragAxis {
    Columns,
    Rows,
}

/// Transient state of a reorder drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragReorderProposal {
    pub axis: DragAxis,
    pub sources: IndexSet,
    /// Insertion index in pre-move coordinates, `None` when the data
    /// source accepts no destination at all
    pub destination: Option<usize>,
}

impl DragReorderProposal {
    pub fn new(axis: DragAxis, sources: IndexSet) -> Self {
        Self {
            axis,
            sources,
            destination: None,
        }
    }

    /// Recompute the destination for a new candidate, snapping to the
    /// nearest index the data source accepts
    pub fn update(&mut self, candidate: usize, count: usize, accepts: impl Fn(usize) -> bool) {
        self.destination = snap_destination(candidate, count, accepts);
    }

    /// A destination worth committing: present and not a no-op
    pub fn committable(&self) -> Option<usize> {
        self.destination
            .filter(|&dest| !self.sources.is_empty() && !self.sources.is_noop_move(dest))
    }
}

/// Column resize in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeTracker {
    pub column: usize,
    /// Pointer x the column edge currently corresponds to
    pub last_x: f64,
}

impl ResizeTracker {
    pub fn new(column: usize, x: f64) -> Self {
        Self { column, last_x: x }
    }

    /// Apply the pointer delta since the last move. Overflow past the
    /// minimum width is fed back so the edge only grows again once the
    /// pointer returns to it.
    pub fn drag_to(&mut self, x: f64, layout: &mut Layout) -> f64 {
        let distance = x - self.last_x;
        let overflow = layout.resize_column(self.column, distance);
        self.last_x = x - overflow;
        overflow
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Pointer is down on a header but has not moved far enough yet
    HeaderPress {
        axis: DragAxis,
        index: usize,
        origin: Point,
        was_selected: bool,
        /// A plain click on a selected header collapses to it on release
        collapse_on_release: bool,
    },
    Resizing(ResizeTracker),
    Reordering(DragReorderProposal),
    /// Drag-select in the content area
    ContentSelect,
}

/// What a pointer release finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEnd {
    /// No gesture was active
    Nothing,
    /// A header press that never became a drag
    HeaderClick { axis: DragAxis, index: usize },
    Reorder { committed: bool },
    Resize { column: usize },
    ContentSelect,
}

/// Nearest accepted insertion index to `candidate` in `0..=count`.
///
/// Walks outward one step at a time and tries the lower index first on
/// ties. `None` when nothing is accepted.
pub fn snap_destination(
    candidate: usize,
    count: usize,
    accepts: impl Fn(usize) -> bool,
) -> Option<usize> {
    let candidate = candidate.min(count);
    if accepts(candidate) {
        return Some(candidate);
    }
    for distance in 1..=count {
        if let Some(lower) = candidate.checked_sub(distance) {
            if accepts(lower) {
                return Some(lower);
            }
        }
        let upper = candidate + distance;
        if upper <= count && accepts(upper) {
            return Some(upper);
        }
    }
    None
}
