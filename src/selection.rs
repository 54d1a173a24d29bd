//! Selection model
//!
//! The selection is the Cartesian product of a column set and a row set.
//! Both sets always hold at least one index: some cell is always active.
//! Operations here mutate a [`SelectionState`] directly; the grid runs
//! them on a copy, filters the result through its delegate and only then
//! commits.

use crate::geometry::CellAddress;
use crate::index_set::IndexSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorizontalEdge {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerticalEdge {
    #[default]
    Top,
    Bottom,
}

/// The edges of the selection rectangle that stay put during shift-arrow
/// extension. The opposite edges are the ones that grow or shrink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickyEdge {
    pub horizontal: HorizontalEdge,
    pub vertical: VerticalEdge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    columns: IndexSet,
    rows: IndexSet,
    anchor: CellAddress,
    sticky: StickyEdge,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    /// Selection on cell (0, 0)
    pub fn new() -> Self {
        Self::at(CellAddress::default())
    }

    pub fn at(cell: CellAddress) -> Self {
        Self {
            columns: IndexSet::single(cell.column),
            rows: IndexSet::single(cell.row),
            anchor: cell,
            sticky: StickyEdge::default(),
        }
    }

    pub fn columns(&self) -> &IndexSet {
        &self.columns
    }

    pub fn rows(&self) -> &IndexSet {
        &self.rows
    }

    /// Origin of the most recent non-extending selection
    pub fn anchor(&self) -> CellAddress {
        self.anchor
    }

    pub fn sticky(&self) -> StickyEdge {
        self.sticky
    }

    pub fn contains(&self, cell: CellAddress) -> bool {
        self.columns.contains(cell.column) && self.rows.contains(cell.row)
    }

    /// Exactly one cell selected
    pub fn is_single_cell(&self) -> bool {
        self.columns.len() == 1 && self.rows.len() == 1
    }

    /// Number of selected cells
    pub fn cell_count(&self) -> usize {
        self.columns.len() * self.rows.len()
    }

    /// Selected cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.rows
            .iter()
            .flat_map(move |row| self.columns.iter().map(move |col| CellAddress::new(col, row)))
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Click-select: singletons at `cell`, anchor moves, sticky edge resets
    pub fn select_cell(&mut self, cell: CellAddress) {
        *self = Self::at(cell);
    }

    /// Shift-extend: rectangle spanning anchor..=target on both axes
    pub fn extend_to(&mut self, target: CellAddress) {
        self.extend_columns_to(target.column);
        self.extend_rows_to(target.row);
    }

    /// Extend only the column axis; rows are left alone
    pub fn extend_columns_to(&mut self, column: usize) {
        self.columns = IndexSet::from_range(self.anchor.column, column);
        self.sticky.horizontal = if column < self.anchor.column {
            HorizontalEdge::Right
        } else {
            HorizontalEdge::Left
        };
    }

    /// Extend only the row axis; columns are left alone
    pub fn extend_rows_to(&mut self, row: usize) {
        self.rows = IndexSet::from_range(self.anchor.row, row);
        self.sticky.vertical = if row < self.anchor.row {
            VerticalEdge::Bottom
        } else {
            VerticalEdge::Top
        };
    }

    /// Whole column: that column, every row
    pub fn select_column(&mut self, column: usize, row_count: usize) {
        self.select_cell(CellAddress::new(column, 0));
        if row_count > 0 {
            self.rows = IndexSet::all(row_count);
        }
    }

    /// Whole row: that row, every column
    pub fn select_row(&mut self, row: usize, column_count: usize) {
        self.select_cell(CellAddress::new(0, row));
        if column_count > 0 {
            self.columns = IndexSet::all(column_count);
        }
    }

    pub fn select_all(&mut self, column_count: usize, row_count: usize) {
        self.select_cell(CellAddress::default());
        if column_count > 0 && row_count > 0 {
            self.columns = IndexSet::all(column_count);
            self.rows = IndexSet::all(row_count);
        }
    }

    /// Discontiguous header click. The anchor stays where it is.
    ///
    /// Returns false when removing the last member was refused.
    pub fn toggle_column(&mut self, column: usize) -> bool {
        if self.columns.contains(column) && self.columns.len() == 1 {
            return false;
        }
        self.columns.toggle(column);
        true
    }

    /// Row counterpart of [`SelectionState::toggle_column`]
    pub fn toggle_row(&mut self, row: usize) -> bool {
        if self.rows.contains(row) && self.rows.len() == 1 {
            return false;
        }
        self.rows.toggle(row);
        true
    }

    /// Replace the column set; an empty set is ignored
    pub fn set_columns(&mut self, columns: IndexSet) -> bool {
        if columns.is_empty() {
            return false;
        }
        self.columns = columns;
        true
    }

    /// Replace the row set; an empty set is ignored
    pub fn set_rows(&mut self, rows: IndexSet) -> bool {
        if rows.is_empty() {
            return false;
        }
        self.rows = rows;
        true
    }

    /// Move the anchor onto the first selected index of any axis that no
    /// longer contains it
    pub fn pull_anchor_inside(&mut self) {
        if !self.columns.contains(self.anchor.column) {
            if let Some(first) = self.columns.first() {
                self.anchor.column = first;
            }
        }
        if !self.rows.contains(self.anchor.row) {
            if let Some(first) = self.rows.first() {
                self.anchor.row = first;
            }
        }
    }

    /// Shift-arrow: move the non-sticky edge by `(dx, dy)` within bounds.
    ///
    /// Crossing the sticky edge flips it, so pressing shift-left on a
    /// single cell grows leftwards and a following shift-right shrinks.
    pub fn extend_by(&mut self, dx: isize, dy: isize, column_count: usize, row_count: usize) {
        if dx != 0 && column_count > 0 {
            let (first, last) = bounds(&self.columns);
            let (fixed, moving) = match self.sticky.horizontal {
                HorizontalEdge::Left => (first, last),
                HorizontalEdge::Right => (last, first),
            };
            let moved = offset_clamped(moving, dx, column_count);
            self.columns = IndexSet::from_range(fixed, moved);
            if moved < fixed {
                self.sticky.horizontal = HorizontalEdge::Right;
            } else if moved > fixed {
                self.sticky.horizontal = HorizontalEdge::Left;
            }
        }

        if dy != 0 && row_count > 0 {
            let (first, last) = bounds(&self.rows);
            let (fixed, moving) = match self.sticky.vertical {
                VerticalEdge::Top => (first, last),
                VerticalEdge::Bottom => (last, first),
            };
            let moved = offset_clamped(moving, dy, row_count);
            self.rows = IndexSet::from_range(fixed, moved);
            if moved < fixed {
                self.sticky.vertical = VerticalEdge::Bottom;
            } else if moved > fixed {
                self.sticky.vertical = VerticalEdge::Top;
            }
        }
    }

    /// Plain arrow: collapse to the cell next to the anchor
    pub fn move_by(&mut self, dx: isize, dy: isize, column_count: usize, row_count: usize) {
        if column_count == 0 || row_count == 0 {
            return;
        }
        let column = offset_clamped(self.anchor.column, dx, column_count);
        let row = offset_clamped(self.anchor.row, dy, row_count);
        self.select_cell(CellAddress::new(column, row));
    }

    // ========================================================================
    // Keeping the selection valid
    // ========================================================================

    /// Drop indexes beyond the current counts, re-targeting to the last
    /// valid index when a set would become empty
    pub fn clamp_to(&mut self, column_count: usize, row_count: usize) {
        clamp_set(&mut self.columns, column_count);
        clamp_set(&mut self.rows, row_count);
        self.anchor = CellAddress::new(
            self.anchor.column.min(column_count.saturating_sub(1)),
            self.anchor.row.min(row_count.saturating_sub(1)),
        );
    }

    /// Follow a column move so the same columns stay selected
    pub fn columns_moved(&mut self, moved: &IndexSet, dest: usize) {
        self.columns = self.columns.remapped(moved, dest);
        self.anchor.column = moved.position_after_move(self.anchor.column, dest);
    }

    /// Follow a row move so the same rows stay selected
    pub fn rows_moved(&mut self, moved: &IndexSet, dest: usize) {
        self.rows = self.rows.remapped(moved, dest);
        self.anchor.row = moved.position_after_move(self.anchor.row, dest);
    }

    /// Follow a row removal. Surviving rows shift up; if every selected
    /// row was removed the row that slid into the first removed slot
    /// (or the new last row) is selected instead.
    pub fn rows_removed(&mut self, removed: &IndexSet, row_count: usize) {
        let shift = |row: usize| row - removed.count_below(row);

        let survivors: IndexSet = self
            .rows
            .iter()
            .filter(|&row| !removed.contains(row))
            .map(shift)
            .collect();

        let fallback = removed
            .first()
            .unwrap_or(0)
            .min(row_count.saturating_sub(1));

        if survivors.is_empty() {
            self.rows = IndexSet::single(fallback);
        } else {
            self.rows = survivors;
        }

        self.anchor.row = if removed.contains(self.anchor.row) {
            self.rows.first().unwrap_or(fallback)
        } else {
            shift(self.anchor.row)
        };
        self.clamp_to(usize::MAX, row_count);
    }
}

fn bounds(set: &IndexSet) -> (usize, usize) {
    (set.first().unwrap_or(0), set.last().unwrap_or(0))
}

fn offset_clamped(index: usize, delta: isize, count: usize) -> usize {
    let max = count.saturating_sub(1);
    index.saturating_add_signed(delta).min(max)
}

fn clamp_set(set: &mut IndexSet, count: usize) {
    let fallback = set.first().unwrap_or(0).min(count.saturating_sub(1));
    set.retain_below(count);
    if set.is_empty() {
        set.insert(fallback);
    }
}
