//! In-memory data source
//!
//! A pass-through [`DataSource`] over a `Vec` of rows that implements every
//! optional behavior. Useful for hosts with small tables, and as the
//! reference model in tests and benches.

use std::collections::BTreeMap;

use crate::data_source::{Capabilities, CellBatch, CellValue, DataSource};
use crate::index_set::IndexSet;

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDataSource {
    column_count: usize,
    cells: Vec<Vec<Option<CellValue>>>,
    widths: BTreeMap<usize, f64>,
    footers: BTreeMap<usize, CellValue>,
    column_titles: Vec<Option<String>>,
    sortable: Option<IndexSet>,
    capabilities: Capabilities,
    /// Parse numeric text into `CellValue::Number`
    parse_numbers: bool,
}

impl MemoryDataSource {
    /// Every capability enabled
    pub const ALL: Capabilities = Capabilities::SET_VALUE
        .union(Capabilities::SET_VALUE_BULK)
        .union(Capabilities::COLUMN_WIDTHS)
        .union(Capabilities::MOVE_COLUMNS)
        .union(Capabilities::MOVE_ROWS)
        .union(Capabilities::ADD_ROWS)
        .union(Capabilities::REMOVE_ROWS)
        .union(Capabilities::FOOTERS);

    /// Empty cells
    pub fn new(column_count: usize, row_count: usize) -> Self {
        Self {
            column_count,
            cells: vec![vec![None; column_count]; row_count],
            widths: BTreeMap::new(),
            footers: BTreeMap::new(),
            column_titles: vec![None; column_count],
            sortable: None,
            capabilities: Self::ALL,
            parse_numbers: false,
        }
    }

    /// Build from rows of values; short rows are padded with empty cells
    pub fn from_rows<R, V>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let rows: Vec<Vec<Option<CellValue>>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| Some(v.into())).collect())
            .collect();
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut source = Self::new(column_count, 0);
        source.cells = rows
            .into_iter()
            .map(|mut row| {
                row.resize(column_count, None);
                row
            })
            .collect();
        source
    }

    /// Restrict the advertised capabilities
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_sortable_columns(mut self, columns: IndexSet) -> Self {
        self.sortable = Some(columns);
        self
    }

    pub fn with_number_parsing(mut self) -> Self {
        self.parse_numbers = true;
        self
    }

    pub fn set_column_title(&mut self, column: usize, title: impl Into<String>) {
        if let Some(slot) = self.column_titles.get_mut(column) {
            *slot = Some(title.into());
        }
    }

    pub fn value(&self, column: usize, row: usize) -> Option<&CellValue> {
        self.cells.get(row)?.get(column)?.as_ref()
    }

    /// A column's values top to bottom, rendered as text
    pub fn column_texts(&self, column: usize) -> Vec<String> {
        (0..self.cells.len())
            .map(|row| crate::data_source::display_text(self.value(column, row)))
            .collect()
    }

    /// A row's values left to right, rendered as text
    pub fn row_texts(&self, row: usize) -> Vec<String> {
        (0..self.column_count)
            .map(|column| crate::data_source::display_text(self.value(column, row)))
            .collect()
    }

    fn write(&mut self, value: Option<CellValue>, column: usize, row: usize) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(column)) {
            *cell = value;
        }
    }
}

/// Move the members of `moved` so they are inserted before `dest`
fn reorder<T>(items: &mut Vec<T>, moved: &IndexSet, dest: usize) {
    let mut taken = Vec::with_capacity(moved.len());
    let mut kept = Vec::with_capacity(items.len());
    for (i, item) in items.drain(..).enumerate() {
        if moved.contains(i) {
            taken.push(item);
        } else {
            kept.push(item);
        }
    }
    let at = (dest - moved.count_below(dest)).min(kept.len());
    let tail = kept.split_off(at);
    items.extend(kept);
    items.extend(taken);
    items.extend(tail);
}

fn reorder_keys<V>(map: &mut BTreeMap<usize, V>, moved: &IndexSet, dest: usize) {
    *map = std::mem::take(map)
        .into_iter()
        .map(|(k, v)| (moved.position_after_move(k, dest), v))
        .collect();
}

impl DataSource for MemoryDataSource {
    fn row_count(&self) -> usize {
        self.cells.len()
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn value_at(&self, column: usize, row: usize) -> Option<CellValue> {
        self.value(column, row).cloned()
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn value_from_text(&self, _column: usize, _row: usize, text: &str) -> CellValue {
        if self.parse_numbers {
            if let Ok(n) = text.trim().parse::<f64>() {
                return CellValue::Number(n);
            }
        }
        CellValue::Text(text.to_string())
    }

    fn set_value(&mut self, value: Option<CellValue>, column: usize, row: usize) {
        self.write(value, column, row);
    }

    fn set_values(&mut self, value: Option<CellValue>, columns: &IndexSet, rows: &IndexSet) {
        for row in rows.iter() {
            for column in columns.iter() {
                self.write(value.clone(), column, row);
            }
        }
    }

    fn apply_batch(&mut self, batch: &CellBatch) {
        for (&row, columns) in batch {
            for (&column, value) in columns {
                self.write(value.clone(), column, row);
            }
        }
    }

    fn width_for_column(&self, column: usize) -> Option<f64> {
        self.widths.get(&column).copied()
    }

    fn set_width(&mut self, column: usize, width: f64) {
        self.widths.insert(column, width);
    }

    fn move_columns(&mut self, columns: &IndexSet, dest: usize) -> bool {
        if columns.is_empty() || dest > self.column_count {
            return false;
        }
        for row in &mut self.cells {
            reorder(row, columns, dest);
        }
        reorder(&mut self.column_titles, columns, dest);
        reorder_keys(&mut self.widths, columns, dest);
        reorder_keys(&mut self.footers, columns, dest);
        true
    }

    fn move_rows(&mut self, rows: &IndexSet, dest: usize) -> bool {
        if rows.is_empty() || dest > self.cells.len() {
            return false;
        }
        reorder(&mut self.cells, rows, dest);
        true
    }

    fn add_rows(&mut self, count: usize) -> bool {
        let width = self.column_count;
        self.cells
            .extend(std::iter::repeat_with(|| vec![None; width]).take(count));
        true
    }

    fn remove_rows(&mut self, rows: &IndexSet) -> bool {
        let mut row = 0;
        self.cells.retain(|_| {
            let keep = !rows.contains(row);
            row += 1;
            keep
        });
        true
    }

    fn sortable_column_indexes(&self) -> Option<IndexSet> {
        self.sortable.clone()
    }

    fn header_string_for_column(&self, column: usize) -> Option<String> {
        self.column_titles.get(column).cloned().flatten()
    }

    fn footer_value_for_column(&self, column: usize) -> Option<CellValue> {
        self.footers.get(&column).cloned()
    }

    fn set_footer_value(&mut self, value: Option<CellValue>, column: usize) {
        match value {
            Some(v) => {
                self.footers.insert(column, v);
            }
            None => {
                self.footers.remove(&column);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_pads() {
        let s = MemoryDataSource::from_rows(vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(s.column_count(), 2);
        assert_eq!(s.row_count(), 2);
        assert_eq!(s.value_at(1, 1), None);
    }

    #[test]
    fn test_move_columns() {
        let mut s = MemoryDataSource::from_rows(vec![vec!["a", "b", "c"]]);
        assert!(s.move_columns(&IndexSet::single(2), 0));
        assert_eq!(s.row_texts(0), vec!["c", "a", "b"]);
        assert!(s.move_columns(&IndexSet::single(0), 3));
        assert_eq!(s.row_texts(0), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_rows_block() {
        let mut s = MemoryDataSource::from_rows(vec![vec!["0"], vec!["1"], vec!["2"], vec!["3"]]);
        assert!(s.move_rows(&IndexSet::from([0, 2]), 4));
        assert_eq!(s.column_texts(0), vec!["1", "3", "0", "2"]);
    }

    #[test]
    fn test_add_and_remove_rows() {
        let mut s = MemoryDataSource::new(2, 2);
        assert!(s.add_rows(3));
        assert_eq!(s.row_count(), 5);
        assert!(s.remove_rows(&IndexSet::from([0, 4])));
        assert_eq!(s.row_count(), 3);
    }

    #[test]
    fn test_number_parsing() {
        let s = MemoryDataSource::new(1, 1).with_number_parsing();
        assert_eq!(s.value_from_text(0, 0, " 2.5"), CellValue::Number(2.5));
        assert_eq!(s.value_from_text(0, 0, "x"), CellValue::text("x"));
    }
}
