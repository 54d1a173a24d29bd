//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use tablegrid::data_source::{Capabilities, CellBatch, CellValue, DataSource};
use tablegrid::delegate::{GridDelegate, HeaderMenu, HeaderTarget};
use tablegrid::events::GridEvent;
use tablegrid::geometry::{CellAddress, Point};
use tablegrid::index_set::IndexSet;
use tablegrid::memory::MemoryDataSource;
use tablegrid::messages::{GridMsg, Modifiers};
use tablegrid::{GridConfig, TableGrid};

/// Grid over an empty in-memory source with default config
pub fn test_grid(columns: usize, rows: usize) -> TableGrid<MemoryDataSource> {
    TableGrid::new(MemoryDataSource::new(columns, rows), GridConfig::default())
}

/// Grid whose cells hold the given text, row by row
pub fn grid_from_rows(rows: Vec<Vec<&str>>) -> TableGrid<MemoryDataSource> {
    TableGrid::new(MemoryDataSource::from_rows(rows), GridConfig::default())
}

/// Cell at `(column, row)` named like a spreadsheet: "A1", "B3" …
pub fn labelled_grid(columns: usize, rows: usize) -> TableGrid<MemoryDataSource> {
    let data: Vec<Vec<String>> = (0..rows)
        .map(|r| {
            (0..columns)
                .map(|c| format!("{}{}", tablegrid::grid::column_letters(c), r + 1))
                .collect()
        })
        .collect();
    TableGrid::new(MemoryDataSource::from_rows(data), GridConfig::default())
}

pub fn text(s: &str) -> Option<CellValue> {
    Some(CellValue::text(s))
}

pub fn cell(column: usize, row: usize) -> CellAddress {
    CellAddress::new(column, row)
}

pub fn indexes(set: &IndexSet) -> Vec<usize> {
    set.iter().collect()
}

// ============================================================================
// Control-space points for the default layout
// (row header 40 wide, column header 20 high, columns 60 wide, rows 20 high)
// ============================================================================

pub fn column_header_point(column: usize) -> Point {
    Point::new(40.0 + 60.0 * column as f64 + 20.0, 10.0)
}

pub fn row_header_point(row: usize) -> Point {
    Point::new(20.0, 20.0 + 20.0 * row as f64 + 10.0)
}

pub fn cell_point(column: usize, row: usize) -> Point {
    Point::new(40.0 + 60.0 * column as f64 + 30.0, 20.0 + 20.0 * row as f64 + 10.0)
}

pub fn click(point: Point) -> GridMsg {
    GridMsg::PointerDown {
        point,
        click_count: 1,
        modifiers: Modifiers::NONE,
    }
}

pub fn click_with(point: Point, modifiers: Modifiers) -> GridMsg {
    GridMsg::PointerDown {
        point,
        click_count: 1,
        modifiers,
    }
}

pub fn double_click(point: Point) -> GridMsg {
    GridMsg::PointerDown {
        point,
        click_count: 2,
        modifiers: Modifiers::NONE,
    }
}

// ============================================================================
// Recorders
// ============================================================================

/// Collects every event the grid posts
pub fn record_events<D: DataSource>(grid: &mut TableGrid<D>) -> Rc<RefCell<Vec<GridEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    grid.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

/// Delegate that logs every callback and can veto selections and edits
#[derive(Default)]
pub struct RecordingDelegate {
    pub log: Rc<RefCell<Vec<String>>>,
    /// Columns the delegate strips from any proposed column selection
    pub forbidden_columns: IndexSet,
    /// Cells where editing is refused
    pub read_only: Vec<CellAddress>,
    pub extra_menu_item: Option<String>,
}

impl RecordingDelegate {
    pub fn new() -> (Self, Rc<RefCell<Vec<String>>>) {
        let delegate = Self::default();
        let log = Rc::clone(&delegate.log);
        (delegate, log)
    }

    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl GridDelegate for RecordingDelegate {
    fn will_select_columns(&mut self, proposed: &IndexSet) -> Option<IndexSet> {
        if self.forbidden_columns.is_empty() {
            return None;
        }
        Some(
            proposed
                .iter()
                .filter(|c| !self.forbidden_columns.contains(*c))
                .collect(),
        )
    }

    fn did_change_selection(&mut self) {
        self.record("selection".to_string());
    }

    fn did_double_click_column(&mut self, column: usize) {
        self.record(format!("double-click column {column}"));
    }

    fn did_double_click_row(&mut self, row: usize) {
        self.record(format!("double-click row {row}"));
    }

    fn did_move_columns(&mut self, old: &IndexSet, new: &IndexSet) {
        self.record(format!("moved columns {:?} -> {:?}", indexes(old), indexes(new)));
    }

    fn did_move_rows(&mut self, old: &IndexSet, new: &IndexSet) {
        self.record(format!("moved rows {:?} -> {:?}", indexes(old), indexes(new)));
    }

    fn should_edit(&mut self, column: usize, row: usize) -> bool {
        !self.read_only.contains(&CellAddress::new(column, row))
    }

    fn copy_cells(&mut self, columns: &IndexSet, rows: &IndexSet) {
        self.record(format!("copy {:?} x {:?}", indexes(columns), indexes(rows)));
    }

    fn paste_cells(&mut self, columns: &IndexSet, rows: &IndexSet) {
        self.record(format!("paste {:?} x {:?}", indexes(columns), indexes(rows)));
    }

    fn did_add_rows(&mut self, rows: &IndexSet) {
        self.record(format!("added rows {:?}", indexes(rows)));
    }

    fn footer_clicked(&mut self, column: usize) {
        self.record(format!("footer {column}"));
    }

    fn did_sort_by_column(&mut self, column: Option<usize>, ascending: bool) {
        self.record(format!("sort {column:?} ascending={ascending}"));
    }

    fn will_display_header_menu(&mut self, _target: HeaderTarget, menu: &mut HeaderMenu) {
        if let Some(title) = &self.extra_menu_item {
            menu.items.push(tablegrid::delegate::MenuItem::new(
                title.clone(),
                tablegrid::delegate::MenuAction::Custom(title.clone()),
            ));
        }
    }
}

// ============================================================================
// Gated data source
// ============================================================================

/// In-memory source with restricted move destinations and capabilities
pub struct GatedSource {
    pub inner: MemoryDataSource,
    /// Accepted column destinations; `None` accepts all
    pub column_destinations: Option<Vec<usize>>,
    pub row_destinations: Option<Vec<usize>>,
    pub capabilities: Capabilities,
    /// Count of `set_value` / `set_values` / `apply_batch` calls
    pub writes: usize,
}

impl GatedSource {
    pub fn new(inner: MemoryDataSource) -> Self {
        Self {
            inner,
            column_destinations: None,
            row_destinations: None,
            capabilities: MemoryDataSource::ALL,
            writes: 0,
        }
    }

    pub fn columns_only_to(mut self, destinations: Vec<usize>) -> Self {
        self.column_destinations = Some(destinations);
        self
    }

    pub fn rows_only_to(mut self, destinations: Vec<usize>) -> Self {
        self.row_destinations = Some(destinations);
        self
    }

    pub fn without(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = self.capabilities.difference(capabilities);
        self
    }
}

impl DataSource for GatedSource {
    fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    fn value_at(&self, column: usize, row: usize) -> Option<CellValue> {
        self.inner.value_at(column, row)
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn set_value(&mut self, value: Option<CellValue>, column: usize, row: usize) {
        self.writes += 1;
        self.inner.set_value(value, column, row);
    }

    fn set_values(&mut self, value: Option<CellValue>, columns: &IndexSet, rows: &IndexSet) {
        self.writes += 1;
        self.inner.set_values(value, columns, rows);
    }

    fn apply_batch(&mut self, batch: &CellBatch) {
        self.writes += 1;
        self.inner.apply_batch(batch);
    }

    fn width_for_column(&self, column: usize) -> Option<f64> {
        self.inner.width_for_column(column)
    }

    fn set_width(&mut self, column: usize, width: f64) {
        self.inner.set_width(column, width);
    }

    fn can_move_columns(&self, columns: &IndexSet, dest: usize) -> bool {
        match &self.column_destinations {
            Some(allowed) => allowed.contains(&dest),
            None => self.inner.can_move_columns(columns, dest),
        }
    }

    fn move_columns(&mut self, columns: &IndexSet, dest: usize) -> bool {
        self.can_move_columns(columns, dest) && self.inner.move_columns(columns, dest)
    }

    fn can_move_rows(&self, rows: &IndexSet, dest: usize) -> bool {
        match &self.row_destinations {
            Some(allowed) => allowed.contains(&dest),
            None => self.inner.can_move_rows(rows, dest),
        }
    }

    fn move_rows(&mut self, rows: &IndexSet, dest: usize) -> bool {
        self.can_move_rows(rows, dest) && self.inner.move_rows(rows, dest)
    }

    fn add_rows(&mut self, count: usize) -> bool {
        self.inner.add_rows(count)
    }

    fn remove_rows(&mut self, rows: &IndexSet) -> bool {
        self.inner.remove_rows(rows)
    }

    fn header_string_for_column(&self, column: usize) -> Option<String> {
        self.inner.header_string_for_column(column)
    }
}
