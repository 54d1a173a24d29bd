//! The grid controller
//!
//! [`TableGrid`] owns everything the grid is responsible for (widths,
//! selection, the editing session, the active drag) and talks to the host
//! through three seams: the [`DataSource`] it owns, an optional
//! [`GridDelegate`], and the observer list. Every public operation leaves
//! the invariants intact when it returns: the selection is non-empty and
//! within bounds, at most one edit and one drag are active.

use crate::config::GridConfig;
use crate::data_source::{Capabilities, CellBatch, CellValue, DataSource};
use crate::delegate::{GridDelegate, HeaderMenu, HeaderTarget, MenuAction, MenuItem};
use crate::drag::{DragAxis, DragReorderProposal, Gesture, GestureEnd, ResizeTracker};
use crate::editing::{CellEditor, EditActivation, EditTrigger, EditingSession};
use crate::events::{GridEvent, ObserverId, Observers};
use crate::geometry::{CellAddress, Point, Size};
use crate::index_set::IndexSet;
use crate::layout::Layout;
use crate::selection::SelectionState;
use crate::tracing::SelectionSnapshot;
use crate::widths::WidthAutosave;

/// Current sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub ascending: bool,
}

/// Spreadsheet-style column title: A … Z, AA … AZ, BA …
pub fn column_letters(mut column: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (column % 26) as u8);
        if column < 26 {
            break;
        }
        column = column / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

pub struct TableGrid<D: DataSource> {
    source: D,
    delegate: Option<Box<dyn GridDelegate>>,
    config: GridConfig,
    layout: Layout,
    selection: SelectionState,
    editing: Option<EditingSession>,
    gesture: Option<Gesture>,
    observers: Observers,
    /// Read from the data source on attach and on every reload
    capabilities: Capabilities,
    sort: Option<SortState>,
    autosave: Option<WidthAutosave>,
    /// Bumped whenever counts, order or cell contents may have changed
    data_generation: u64,
    /// Bumped on every committed selection change
    selection_generation: u64,
}

impl<D: DataSource> TableGrid<D> {
    pub fn new(source: D, config: GridConfig) -> Self {
        let config = config.sanitized();
        let capabilities = source.capabilities();
        let layout = Layout::new(&config, source.column_count(), source.row_count());
        let autosave = config
            .autosave_name
            .as_deref()
            .and_then(WidthAutosave::named);

        let mut grid = Self {
            source,
            delegate: None,
            config,
            layout,
            selection: SelectionState::new(),
            editing: None,
            gesture: None,
            observers: Observers::new(),
            capabilities,
            sort: None,
            autosave,
            data_generation: 0,
            selection_generation: 0,
        };
        grid.restore_widths();
        grid.selection
            .clamp_to(grid.column_count(), grid.row_count());

        tracing::debug!(
            columns = grid.column_count(),
            rows = grid.row_count(),
            ?capabilities,
            "grid attached"
        );
        grid
    }

    pub fn with_delegate(mut self, delegate: impl GridDelegate + 'static) -> Self {
        self.delegate = Some(Box::new(delegate));
        self
    }

    pub fn set_delegate(&mut self, delegate: Option<Box<dyn GridDelegate>>) {
        self.delegate = delegate;
    }

    /// Use a specific width cache file instead of the one named in the
    /// config. Saved widths are restored immediately.
    pub fn set_width_autosave(&mut self, autosave: Option<WidthAutosave>) {
        self.autosave = autosave;
        self.restore_widths();
    }

    fn restore_widths(&mut self) {
        if let Some(autosave) = &self.autosave {
            let restored = self.layout.update_widths(|w| autosave.restore_into(w));
            tracing::debug!(restored, path = %autosave.path().display(), "restored column widths");
        }
        self.pull_source_widths();
    }

    /// Widths offered by the data source win over the autosave cache
    fn pull_source_widths(&mut self) {
        if !self.capabilities.contains(Capabilities::COLUMN_WIDTHS) {
            return;
        }
        let source = &self.source;
        let count = self.layout.column_count();
        self.layout.update_widths(|widths| {
            for column in 0..count {
                if let Some(width) = source.width_for_column(column) {
                    widths.set(column, width);
                }
            }
        });
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn data_source(&self) -> &D {
        &self.source
    }

    /// Direct access to the model. Call [`TableGrid::reload_data`] after
    /// changing counts or contents behind the grid's back.
    pub fn data_source_mut(&mut self) -> &mut D {
        &mut self.source
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn editing(&self) -> Option<&EditingSession> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// The in-flight editor, for routing keystrokes into it
    pub fn editor_mut(&mut self) -> Option<&mut CellEditor> {
        self.editing.as_mut().map(EditingSession::editor_mut)
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn column_count(&self) -> usize {
        self.layout.column_count()
    }

    pub fn row_count(&self) -> usize {
        self.layout.row_count()
    }

    pub fn data_generation(&self) -> u64 {
        self.data_generation
    }

    pub fn selection_generation(&self) -> u64 {
        self.selection_generation
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn contains_cell(&self, cell: CellAddress) -> bool {
        cell.column < self.column_count() && cell.row < self.row_count()
    }

    // ========================================================================
    // Observers and delegate
    // ========================================================================

    pub fn subscribe(&mut self, callback: impl FnMut(&GridEvent) + 'static) -> ObserverId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn emit(&mut self, event: GridEvent) {
        self.observers.emit(&event);
    }

    fn notify_delegate(&mut self, f: impl FnOnce(&mut dyn GridDelegate)) {
        if let Some(delegate) = self.delegate.as_deref_mut() {
            f(delegate);
        }
    }

    fn post_selection_changed(&mut self, columns_changed: bool, rows_changed: bool) {
        if columns_changed {
            self.emit(GridEvent::SelectionChanged);
        }
        if rows_changed {
            self.emit(GridEvent::SelectionChanged);
        }
        if columns_changed || rows_changed {
            self.notify_delegate(|d| d.did_change_selection());
        }
    }

    // ========================================================================
    // Viewport
    // ========================================================================

    pub fn set_viewport_size(&mut self, size: Size) {
        self.layout.set_viewport_size(size);
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.layout.set_scroll(scroll);
    }

    pub fn scroll_to_cell(&mut self, cell: CellAddress) {
        self.layout.scroll_to_cell(cell.column, cell.row);
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Filter a proposed selection through the delegate and commit it.
    ///
    /// An empty set from the delegate vetoes the whole change.
    /// A substituted set drags the anchor along so editing and shift-extend
    /// start from a cell that is actually selected.
    fn commit_selection(&mut self, mut proposed: SelectionState, notify: bool) -> bool {
        let mut substituted = false;
        if proposed.columns() != self.selection.columns() {
            let columns = proposed.columns().clone();
            if let Some(filtered) = self
                .delegate
                .as_deref_mut()
                .and_then(|d| d.will_select_columns(&columns))
            {
                if !proposed.set_columns(filtered) {
                    tracing::debug!("column selection vetoed by delegate");
                    return false;
                }
                substituted |= proposed.columns() != &columns;
            }
        }
        if proposed.rows() != self.selection.rows() {
            let rows = proposed.rows().clone();
            if let Some(filtered) = self
                .delegate
                .as_deref_mut()
                .and_then(|d| d.will_select_rows(&rows))
            {
                if !proposed.set_rows(filtered) {
                    tracing::debug!("row selection vetoed by delegate");
                    return false;
                }
                substituted |= proposed.rows() != &rows;
            }
        }
        if substituted {
            proposed.pull_anchor_inside();
        }
        proposed.clamp_to(self.column_count(), self.row_count());
        self.replace_selection(proposed, notify)
    }

    /// Install a selection without consulting the delegate
    fn replace_selection(&mut self, next: SelectionState, notify: bool) -> bool {
        if next == self.selection {
            return false;
        }
        let columns_changed = next.columns() != self.selection.columns();
        let rows_changed = next.rows() != self.selection.rows();

        let before = SelectionSnapshot::from_selection(&self.selection);
        self.selection = next;
        self.selection_generation += 1;
        if let Some(diff) = before.diff(&SelectionSnapshot::from_selection(&self.selection)) {
            tracing::trace!(%diff, "selection");
        }

        if notify {
            self.post_selection_changed(columns_changed, rows_changed);
        }
        true
    }

    fn propose(&self, f: impl FnOnce(&mut SelectionState)) -> SelectionState {
        let mut proposed = self.selection.clone();
        f(&mut proposed);
        proposed
    }

    /// Click-select a single cell
    pub fn select_cell(&mut self, cell: CellAddress) -> bool {
        if !self.contains_cell(cell) {
            return false;
        }
        let proposed = self.propose(|s| s.select_cell(cell));
        self.commit_selection(proposed, true)
    }

    /// Shift-click: rectangle from the anchor to `cell`
    pub fn extend_selection_to(&mut self, cell: CellAddress) -> bool {
        if !self.contains_cell(cell) {
            return false;
        }
        if !self.config.allows_multiple_selection {
            return self.select_cell(cell);
        }
        let proposed = self.propose(|s| s.extend_to(cell));
        self.commit_selection(proposed, true)
    }

    /// Header click: the whole column
    pub fn select_column(&mut self, column: usize) -> bool {
        if column >= self.column_count() || self.row_count() == 0 {
            return false;
        }
        if !self.config.allows_multiple_selection {
            let row = self.selection.anchor().row;
            return self.select_cell(CellAddress::new(column, row));
        }
        let rows = self.row_count();
        let proposed = self.propose(|s| s.select_column(column, rows));
        self.commit_selection(proposed, true)
    }

    /// Header click: the whole row
    pub fn select_row(&mut self, row: usize) -> bool {
        if row >= self.row_count() || self.column_count() == 0 {
            return false;
        }
        if !self.config.allows_multiple_selection {
            let column = self.selection.anchor().column;
            return self.select_cell(CellAddress::new(column, row));
        }
        let columns = self.column_count();
        let proposed = self.propose(|s| s.select_row(row, columns));
        self.commit_selection(proposed, true)
    }

    /// Shift-click on a column header: extend the column range, rows stay
    pub fn extend_columns_to(&mut self, column: usize) -> bool {
        if column >= self.column_count() {
            return false;
        }
        if !self.config.allows_multiple_selection {
            let row = self.selection.anchor().row;
            return self.select_cell(CellAddress::new(column, row));
        }
        let proposed = self.propose(|s| s.extend_columns_to(column));
        self.commit_selection(proposed, true)
    }

    /// Shift-click on a row header: extend the row range, columns stay
    pub fn extend_rows_to(&mut self, row: usize) -> bool {
        if row >= self.row_count() {
            return false;
        }
        if !self.config.allows_multiple_selection {
            let column = self.selection.anchor().column;
            return self.select_cell(CellAddress::new(column, row));
        }
        let proposed = self.propose(|s| s.extend_rows_to(row));
        self.commit_selection(proposed, true)
    }

    /// Command-click on a column header
    pub fn toggle_column(&mut self, column: usize) -> bool {
        if column >= self.column_count() {
            return false;
        }
        if !self.config.allows_multiple_selection {
            return self.select_column(column);
        }
        let mut proposed = self.selection.clone();
        if !proposed.toggle_column(column) {
            return false;
        }
        self.commit_selection(proposed, true)
    }

    /// Command-click on a row header
    pub fn toggle_row(&mut self, row: usize) -> bool {
        if row >= self.row_count() {
            return false;
        }
        if !self.config.allows_multiple_selection {
            return self.select_row(row);
        }
        let mut proposed = self.selection.clone();
        if !proposed.toggle_row(row) {
            return false;
        }
        self.commit_selection(proposed, true)
    }

    pub fn select_all(&mut self) -> bool {
        if !self.config.allows_multiple_selection {
            return false;
        }
        let (columns, rows) = (self.column_count(), self.row_count());
        let proposed = self.propose(|s| s.select_all(columns, rows));
        self.commit_selection(proposed, true)
    }

    /// Replace the selected columns. Out-of-range indexes are dropped; an
    /// empty result is refused.
    pub fn set_selected_columns(&mut self, mut columns: IndexSet, notify: bool) -> bool {
        columns.retain_below(self.column_count());
        let mut proposed = self.selection.clone();
        if !proposed.set_columns(columns) {
            return false;
        }
        self.commit_selection(proposed, notify)
    }

    /// Replace the selected rows, same rules as columns
    pub fn set_selected_rows(&mut self, mut rows: IndexSet, notify: bool) -> bool {
        rows.retain_below(self.row_count());
        let mut proposed = self.selection.clone();
        if !proposed.set_rows(rows) {
            return false;
        }
        self.commit_selection(proposed, notify)
    }

    /// Arrow key: collapse to the neighbor of the anchor
    pub fn move_selection(&mut self, dx: isize, dy: isize) -> bool {
        let (columns, rows) = (self.column_count(), self.row_count());
        let proposed = self.propose(|s| s.move_by(dx, dy, columns, rows));
        let moved = self.commit_selection(proposed, true);
        let anchor = self.selection.anchor();
        self.scroll_to_cell(anchor);
        moved
    }

    /// Shift-arrow: grow or shrink the edge opposite the sticky one
    pub fn extend_selection_by(&mut self, dx: isize, dy: isize) -> bool {
        if !self.config.allows_multiple_selection {
            return self.move_selection(dx, dy);
        }
        let (columns, rows) = (self.column_count(), self.row_count());
        let proposed = self.propose(|s| s.extend_by(dx, dy, columns, rows));
        self.commit_selection(proposed, true)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Editing needs at least one setter on the data source
    pub fn is_editable(&self) -> bool {
        self.capabilities.can_write()
    }

    /// Click policy for a cell: the delegate's override, else the grid-wide flag
    pub fn edit_activation(&self, cell: CellAddress) -> EditActivation {
        self.delegate
            .as_deref()
            .and_then(|d| d.edit_activation(cell.column, cell.row))
            .unwrap_or(if self.config.single_click_cell_edit {
                EditActivation::SingleClick
            } else {
                EditActivation::DoubleClick
            })
    }

    /// Open an editor on `cell` holding its current value
    pub fn begin_editing(&mut self, cell: CellAddress) -> bool {
        self.begin_editing_with(cell, None)
    }

    /// Typing on a selected cell: start a fresh edit from `ch`
    pub fn begin_editing_with_char(&mut self, ch: char) -> bool {
        let cell = self.selection.anchor();
        self.begin_editing_with(cell, Some(ch))
    }

    fn begin_editing_with(&mut self, cell: CellAddress, ch: Option<char>) -> bool {
        if !self.is_editable() {
            tracing::debug!("editing disabled: data source has no setter");
            return false;
        }
        if !self.contains_cell(cell) {
            return false;
        }
        if let Some(session) = &self.editing {
            if session.address() == cell && ch.is_none() {
                return true;
            }
            self.commit_editing(EditTrigger::Other);
        }

        let allowed = match self.delegate.as_deref_mut() {
            Some(d) => d.should_edit(cell.column, cell.row),
            None => true,
        };
        if !allowed {
            tracing::debug!(column = cell.column, row = cell.row, "edit vetoed by delegate");
            return false;
        }

        if !(self.selection.is_single_cell() && self.selection.contains(cell)) {
            self.select_cell(cell);
        }
        self.scroll_to_cell(cell);

        let original = self.source.value_at(cell.column, cell.row);
        self.editing = Some(match ch {
            Some(ch) => EditingSession::with_char(cell, original, ch),
            None => EditingSession::new(cell, original),
        });
        tracing::debug!(column = cell.column, row = cell.row, "begin editing");
        true
    }

    /// Write the session back and move the selection per `trigger`.
    ///
    /// Returns false when nothing was being edited.
    pub fn commit_editing(&mut self, trigger: EditTrigger) -> bool {
        let Some(session) = self.editing.take() else {
            return false;
        };
        let cell = session.address();
        if session.is_modified() {
            let value = session.committed_value(&self.source);
            tracing::debug!(column = cell.column, row = cell.row, ?value, "commit edit");
            self.write_cell(value, cell);
        }
        let (dx, dy) = trigger.advance();
        if dx != 0 || dy != 0 {
            self.move_selection(dx, dy);
        }
        true
    }

    /// Drop the session; the cell keeps its original value
    pub fn cancel_editing(&mut self) -> bool {
        match self.editing.take() {
            Some(session) => {
                let cell = session.address();
                tracing::debug!(column = cell.column, row = cell.row, "cancel edit");
                true
            }
            None => false,
        }
    }

    /// Single-cell write: the singular setter is preferred, the bulk
    /// setter is used with singleton sets otherwise
    pub fn write_cell(&mut self, value: Option<CellValue>, cell: CellAddress) -> bool {
        if !self.contains_cell(cell) {
            return false;
        }
        if self.capabilities.contains(Capabilities::SET_VALUE) {
            self.source.set_value(value, cell.column, cell.row);
        } else if self.capabilities.contains(Capabilities::SET_VALUE_BULK) {
            self.source.set_values(
                value,
                &IndexSet::single(cell.column),
                &IndexSet::single(cell.row),
            );
        } else {
            return false;
        }
        self.data_generation += 1;
        true
    }

    /// Multi-cell write of one value: the bulk setter is preferred
    pub fn write_cells(
        &mut self,
        value: Option<CellValue>,
        columns: &IndexSet,
        rows: &IndexSet,
    ) -> bool {
        if self.capabilities.contains(Capabilities::SET_VALUE_BULK) {
            self.source.set_values(value, columns, rows);
        } else if self.capabilities.contains(Capabilities::SET_VALUE) {
            for row in rows.iter() {
                for column in columns.iter() {
                    self.source.set_value(value.clone(), column, row);
                }
            }
        } else {
            return false;
        }
        self.data_generation += 1;
        true
    }

    /// Distinct per-cell values in one bulk call; requires the bulk setter
    pub fn apply_batch(&mut self, batch: &CellBatch) -> bool {
        if !self.capabilities.contains(Capabilities::SET_VALUE_BULK) {
            return false;
        }
        self.source.apply_batch(batch);
        self.data_generation += 1;
        true
    }

    // ========================================================================
    // Widths
    // ========================================================================

    /// Grow or shrink a column and persist the result; returns the overflow
    pub fn resize_column(&mut self, column: usize, distance: f64) -> f64 {
        let overflow = self.layout.resize_column(column, distance);
        if column < self.column_count() {
            self.persist_column_width(column);
        }
        overflow
    }

    /// Explicit width, clamped to the minimum; returns the applied width
    pub fn set_column_width(&mut self, column: usize, width: f64) -> Option<f64> {
        if column >= self.column_count() {
            return None;
        }
        let applied = self.layout.set_column_width(column, width);
        self.persist_column_width(column);
        Some(applied)
    }

    fn persist_column_width(&mut self, column: usize) {
        let width = self.layout.column_width(column);
        if self.capabilities.contains(Capabilities::COLUMN_WIDTHS) {
            self.source.set_width(column, width);
        }
        self.save_widths();
        self.emit(GridEvent::ColumnResized { column, width });
    }

    fn save_widths(&self) {
        if let Some(autosave) = &self.autosave {
            if let Err(e) = autosave.save(self.layout.widths()) {
                tracing::warn!("Failed to save column widths: {}", e);
            }
        }
    }

    // ========================================================================
    // Moves
    // ========================================================================

    fn can_reorder(&self, axis: DragAxis) -> bool {
        match axis {
            DragAxis::Columns => self.capabilities.contains(Capabilities::MOVE_COLUMNS),
            DragAxis::Rows => self.capabilities.contains(Capabilities::MOVE_ROWS),
        }
    }

    /// Move `columns` so they are inserted before `dest` (pre-move indexes).
    ///
    /// On success the selection, widths and editing session follow the
    /// moved columns. A refusal changes nothing.
    pub fn move_columns(&mut self, columns: &IndexSet, dest: usize) -> bool {
        self.move_elements(DragAxis::Columns, columns, dest)
    }

    /// Row counterpart of [`TableGrid::move_columns`]
    pub fn move_rows(&mut self, rows: &IndexSet, dest: usize) -> bool {
        self.move_elements(DragAxis::Rows, rows, dest)
    }

    fn move_elements(&mut self, axis: DragAxis, moved: &IndexSet, dest: usize) -> bool {
        if !self.can_reorder(axis) {
            tracing::debug!(?axis, "move unsupported by data source");
            return false;
        }
        let count = match axis {
            DragAxis::Columns => self.column_count(),
            DragAxis::Rows => self.row_count(),
        };
        let in_range = moved.last().is_some_and(|last| last < count);
        if !in_range || dest > count || moved.is_noop_move(dest) {
            return false;
        }

        let committed = match axis {
            DragAxis::Columns => {
                self.source.can_move_columns(moved, dest) && self.source.move_columns(moved, dest)
            }
            DragAxis::Rows => {
                self.source.can_move_rows(moved, dest) && self.source.move_rows(moved, dest)
            }
        };
        if !committed {
            tracing::debug!(?axis, dest, "move refused by data source");
            return false;
        }

        let new = moved.moved_to(dest);
        let mut selection = self.selection.clone();
        match axis {
            DragAxis::Columns => {
                self.layout.update_widths(|w| w.apply_move(moved, dest));
                selection.columns_moved(moved, dest);
            }
            DragAxis::Rows => selection.rows_moved(moved, dest),
        }
        if let Some(session) = self.editing.as_mut() {
            let mut cell = session.address();
            match axis {
                DragAxis::Columns => cell.column = moved.position_after_move(cell.column, dest),
                DragAxis::Rows => cell.row = moved.position_after_move(cell.row, dest),
            }
            session.relocate(cell);
        }
        self.data_generation += 1;
        self.replace_selection(selection, true);
        if axis == DragAxis::Columns {
            self.save_widths();
        }

        tracing::debug!(?axis, ?moved, ?new, "moved");
        let old = moved.clone();
        match axis {
            DragAxis::Columns => {
                self.emit(GridEvent::ColumnsMoved {
                    old: old.clone(),
                    new: new.clone(),
                });
                self.notify_delegate(|d| d.did_move_columns(&old, &new));
            }
            DragAxis::Rows => {
                self.emit(GridEvent::RowsMoved {
                    old: old.clone(),
                    new: new.clone(),
                });
                self.notify_delegate(|d| d.did_move_rows(&old, &new));
            }
        }
        true
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// Is this whole column or row part of the selection?
    pub fn is_header_selected(&self, axis: DragAxis, index: usize) -> bool {
        match axis {
            DragAxis::Columns => {
                self.selection.columns().contains(index)
                    && self.selection.rows().len() == self.row_count()
            }
            DragAxis::Rows => {
                self.selection.rows().contains(index)
                    && self.selection.columns().len() == self.column_count()
            }
        }
    }

    /// Pointer went down on a column or row header. Call before changing
    /// the selection for the click, so a drag can tell a press on an
    /// already-selected header from a fresh one.
    pub fn begin_header_press(
        &mut self,
        axis: DragAxis,
        index: usize,
        origin: Point,
        collapse_on_release: bool,
    ) {
        let was_selected = self.is_header_selected(axis, index);
        self.gesture = Some(Gesture::HeaderPress {
            axis,
            index,
            origin,
            was_selected,
            collapse_on_release: collapse_on_release && was_selected,
        });
    }

    /// Pointer went down on a column's resize handle
    pub fn begin_column_resize(&mut self, column: usize, x: f64) -> bool {
        if column >= self.column_count() {
            return false;
        }
        self.gesture = Some(Gesture::Resizing(ResizeTracker::new(column, x)));
        true
    }

    /// Pointer went down in the content area
    pub fn begin_content_select(&mut self) {
        self.gesture = Some(Gesture::ContentSelect);
    }

    /// The in-flight reorder proposal, if a reorder drag is active
    pub fn reorder_proposal(&self) -> Option<&DragReorderProposal> {
        match &self.gesture {
            Some(Gesture::Reordering(proposal)) => Some(proposal),
            _ => None,
        }
    }

    /// Pointer moved with the button held (control-space point)
    pub fn drag_to(&mut self, point: Point) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let next = match gesture {
            Gesture::HeaderPress {
                axis,
                index,
                origin,
                was_selected,
                collapse_on_release,
            } => {
                if origin.distance_to(point) < self.config.drag_threshold {
                    Gesture::HeaderPress {
                        axis,
                        index,
                        origin,
                        was_selected,
                        collapse_on_release,
                    }
                } else if was_selected && self.can_reorder(axis) {
                    let sources = match axis {
                        DragAxis::Columns => self.selection.columns().clone(),
                        DragAxis::Rows => self.selection.rows().clone(),
                    };
                    let mut proposal = DragReorderProposal::new(axis, sources);
                    self.update_proposal(&mut proposal, point);
                    tracing::debug!(?axis, sources = ?proposal.sources, "begin reorder");
                    Gesture::Reordering(proposal)
                } else {
                    // Dragging from an unselected header selects a range
                    let content = self.layout.to_content(point);
                    match axis {
                        DragAxis::Columns => {
                            let column = self.nearest_column(content.x);
                            self.extend_columns_to(column);
                        }
                        DragAxis::Rows => {
                            let row = self.nearest_row(content.y);
                            self.extend_rows_to(row);
                        }
                    }
                    Gesture::HeaderPress {
                        axis,
                        index,
                        origin,
                        was_selected: false,
                        collapse_on_release: false,
                    }
                }
            }
            Gesture::Resizing(mut tracker) => {
                tracker.drag_to(point.x, &mut self.layout);
                Gesture::Resizing(tracker)
            }
            Gesture::Reordering(mut proposal) => {
                self.update_proposal(&mut proposal, point);
                Gesture::Reordering(proposal)
            }
            Gesture::ContentSelect => {
                let content = self.layout.to_content(point);
                if self.column_count() > 0 && self.row_count() > 0 {
                    let cell = CellAddress::new(
                        self.nearest_column(content.x),
                        self.nearest_row(content.y),
                    );
                    self.extend_selection_to(cell);
                }
                Gesture::ContentSelect
            }
        };
        self.gesture = Some(next);
    }

    fn update_proposal(&self, proposal: &mut DragReorderProposal, point: Point) {
        let content = self.layout.to_content(point);
        let source = &self.source;
        let sources = proposal.sources.clone();
        match proposal.axis {
            DragAxis::Columns => proposal.update(
                self.layout.column_insertion_index(content.x),
                self.column_count(),
                |dest| source.can_move_columns(&sources, dest),
            ),
            DragAxis::Rows => proposal.update(
                self.layout.row_insertion_index(content.y),
                self.row_count(),
                |dest| source.can_move_rows(&sources, dest),
            ),
        }
    }

    fn nearest_column(&self, x: f64) -> usize {
        let last = self.column_count().saturating_sub(1);
        if x < 0.0 {
            return 0;
        }
        self.layout
            .column_at_point(Point::new(x, 0.0))
            .unwrap_or(last)
    }

    fn nearest_row(&self, y: f64) -> usize {
        let last = self.row_count().saturating_sub(1);
        if y < 0.0 {
            return 0;
        }
        self.layout.row_at_point(Point::new(0.0, y)).unwrap_or(last)
    }

    /// Pointer released: commit a reorder or finalize a resize
    pub fn end_gesture(&mut self) -> GestureEnd {
        match self.gesture.take() {
            None => GestureEnd::Nothing,
            Some(Gesture::HeaderPress {
                axis,
                index,
                collapse_on_release,
                ..
            }) => {
                if collapse_on_release {
                    match axis {
                        DragAxis::Columns => self.select_column(index),
                        DragAxis::Rows => self.select_row(index),
                    };
                }
                GestureEnd::HeaderClick { axis, index }
            }
            Some(Gesture::Reordering(proposal)) => {
                let committed = match proposal.committable() {
                    Some(dest) => self.move_elements(proposal.axis, &proposal.sources, dest),
                    None => {
                        tracing::debug!("reorder ended without a valid destination");
                        false
                    }
                };
                GestureEnd::Reorder { committed }
            }
            Some(Gesture::Resizing(tracker)) => {
                self.persist_column_width(tracker.column);
                GestureEnd::Resize {
                    column: tracker.column,
                }
            }
            Some(Gesture::ContentSelect) => GestureEnd::ContentSelect,
        }
    }

    // ========================================================================
    // Headers, footers, sorting
    // ========================================================================

    pub fn column_header_title(&self, column: usize) -> String {
        self.source
            .header_string_for_column(column)
            .unwrap_or_else(|| column_letters(column))
    }

    pub fn row_header_title(&self, row: usize) -> String {
        self.source
            .header_string_for_row(row)
            .unwrap_or_else(|| (row + 1).to_string())
    }

    pub fn is_sortable(&self, column: usize) -> bool {
        self.source
            .sortable_column_indexes()
            .is_some_and(|set| set.contains(column))
    }

    /// Sort indicator click: new column sorts ascending, same column flips
    pub fn sort_by_column(&mut self, column: usize) -> bool {
        if !self.is_sortable(column) {
            return false;
        }
        let ascending = match self.sort {
            Some(sort) if sort.column == column => !sort.ascending,
            _ => true,
        };
        self.set_sort(Some(column), ascending)
    }

    /// Set or clear (`None`) the sort column explicitly
    pub fn set_sort(&mut self, column: Option<usize>, ascending: bool) -> bool {
        if let Some(column) = column {
            if !self.is_sortable(column) {
                return false;
            }
        }
        self.sort = column.map(|column| SortState { column, ascending });
        tracing::debug!(?column, ascending, "sort changed");
        self.emit(GridEvent::SortChanged { column, ascending });
        self.notify_delegate(|d| d.did_sort_by_column(column, ascending));
        true
    }

    pub fn footer_value(&self, column: usize) -> Option<CellValue> {
        if !self.capabilities.contains(Capabilities::FOOTERS) || column >= self.column_count() {
            return None;
        }
        self.source.footer_value_for_column(column)
    }

    pub fn set_footer_value(&mut self, column: usize, value: Option<CellValue>) -> bool {
        if !self.capabilities.contains(Capabilities::FOOTERS) || column >= self.column_count() {
            return false;
        }
        self.source.set_footer_value(value, column);
        true
    }

    pub fn click_footer(&mut self, column: usize) {
        if column < self.column_count() {
            self.notify_delegate(|d| d.footer_clicked(column));
        }
    }

    pub fn double_click_header(&mut self, target: HeaderTarget) {
        match target {
            HeaderTarget::Column(column) if column < self.column_count() => {
                self.notify_delegate(|d| d.did_double_click_column(column));
            }
            HeaderTarget::Row(row) if row < self.row_count() => {
                self.notify_delegate(|d| d.did_double_click_row(row));
            }
            _ => {}
        }
    }

    /// Default context menu for a header, as edited by the delegate
    pub fn header_menu(&mut self, target: HeaderTarget) -> HeaderMenu {
        let mut menu = HeaderMenu::default();
        match target {
            HeaderTarget::Column(column) => {
                if self.is_sortable(column) {
                    menu.items.push(MenuItem::new(
                        "Sort Ascending",
                        MenuAction::SortAscending(column),
                    ));
                    menu.items.push(MenuItem::new(
                        "Sort Descending",
                        MenuAction::SortDescending(column),
                    ));
                }
                menu.items
                    .push(MenuItem::new("Select Column", MenuAction::SelectColumn(column)));
            }
            HeaderTarget::Row(row) => {
                menu.items
                    .push(MenuItem::new("Select Row", MenuAction::SelectRow(row)));
            }
        }
        self.notify_delegate(|d| d.will_display_header_menu(target, &mut menu));
        menu
    }

    /// Run a built-in menu action; custom actions are left to the host
    pub fn perform_menu_action(&mut self, action: &MenuAction) -> bool {
        match *action {
            MenuAction::SortAscending(column) => self.set_sort(Some(column), true),
            MenuAction::SortDescending(column) => self.set_sort(Some(column), false),
            MenuAction::SelectColumn(column) => self.select_column(column),
            MenuAction::SelectRow(row) => self.select_row(row),
            MenuAction::Custom(_) => false,
        }
    }

    // ========================================================================
    // Rows and clipboard
    // ========================================================================

    /// Append `count` rows through the data source
    pub fn add_rows(&mut self, count: usize) -> bool {
        if count == 0 || !self.capabilities.contains(Capabilities::ADD_ROWS) {
            return false;
        }
        let before = self.row_count();
        if !self.source.add_rows(count) {
            tracing::debug!(count, "add rows refused by data source");
            return false;
        }
        self.reload_data();
        let after = self.row_count();
        if after <= before {
            return true;
        }
        let added = IndexSet::from_range(before, after - 1);
        self.notify_delegate(|d| d.did_add_rows(&added));
        self.emit(GridEvent::RowsAdded(added));
        true
    }

    /// Remove every selected row; the selection moves to the nearest survivor
    pub fn remove_selected_rows(&mut self) -> bool {
        if !self.capabilities.contains(Capabilities::REMOVE_ROWS) {
            return false;
        }
        let rows = self.selection.rows().clone();
        if !self.source.remove_rows(&rows) {
            tracing::debug!(?rows, "remove rows refused by data source");
            return false;
        }
        if let Some(edited) = self.editing.as_ref().map(|s| s.address()) {
            if rows.contains(edited.row) {
                self.cancel_editing();
            } else if let Some(session) = self.editing.as_mut() {
                let row = edited.row - rows.count_below(edited.row);
                session.relocate(CellAddress::new(edited.column, row));
            }
        }
        let mut selection = self.selection.clone();
        selection.rows_removed(&rows, self.source.row_count());
        self.reload_counts();
        self.replace_selection(selection, true);
        self.emit(GridEvent::RowsRemoved(rows));
        true
    }

    /// Hand the selected cells to the delegate's copy hook
    pub fn copy(&mut self) {
        let (columns, rows) = (
            self.selection.columns().clone(),
            self.selection.rows().clone(),
        );
        self.notify_delegate(|d| d.copy_cells(&columns, &rows));
    }

    /// Hand the selected cells to the delegate's paste hook
    pub fn paste(&mut self) -> bool {
        if !self.is_editable() {
            return false;
        }
        let (columns, rows) = (
            self.selection.columns().clone(),
            self.selection.rows().clone(),
        );
        if let Some(delegate) = self.delegate.as_deref_mut() {
            delegate.paste_cells(&columns, &rows);
            self.data_generation += 1;
        }
        true
    }

    /// Clear every selected cell
    pub fn delete_selection(&mut self) -> bool {
        if !self.is_editable() {
            return false;
        }
        let (columns, rows) = (
            self.selection.columns().clone(),
            self.selection.rows().clone(),
        );
        self.write_cells(None, &columns, &rows)
    }

    // ========================================================================
    // Reload
    // ========================================================================

    fn reload_counts(&mut self) {
        self.capabilities = self.source.capabilities();
        let (columns, rows) = (self.source.column_count(), self.source.row_count());
        self.layout.set_counts(columns, rows);
        self.layout.update_widths(|w| w.truncate(columns));
        self.pull_source_widths();
        self.data_generation += 1;
    }

    /// Re-read counts, capabilities and widths from the data source
    pub fn reload_data(&mut self) {
        self.reload_counts();
        let (columns, rows) = (self.column_count(), self.row_count());

        if self
            .editing
            .as_ref()
            .is_some_and(|s| !self.contains_cell(s.address()))
        {
            self.cancel_editing();
        }
        if !self.is_editable() {
            self.cancel_editing();
        }
        self.gesture = None;
        if let Some(sort) = self.sort {
            if sort.column >= columns {
                self.sort = None;
            }
        }

        let mut selection = self.selection.clone();
        selection.clamp_to(columns, rows);
        self.replace_selection(selection, true);

        tracing::debug!(columns, rows, "reloaded");
        self.emit(GridEvent::Reloaded);
    }
}
