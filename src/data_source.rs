//! The data source interface
//!
//! The grid never owns cell contents. Everything it shows or writes goes
//! through a [`DataSource`]. Most methods are optional; since a trait
//! cannot report which defaults were overridden, the data source also
//! declares its [`Capabilities`] and the grid reads them once on attach
//! (and again on reload) before attempting any optional behavior.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::index_set::IndexSet;

/// A cell value as exchanged with the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// String rendering of an optional value; absence renders as ""
pub fn display_text(value: Option<&CellValue>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Which optional data-source behaviors are implemented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u16);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    /// `set_value` (single cell)
    pub const SET_VALUE: Capabilities = Capabilities(1 << 0);
    /// `set_values` and `apply_batch` (bulk)
    pub const SET_VALUE_BULK: Capabilities = Capabilities(1 << 1);
    /// `width_for_column` / `set_width`
    pub const COLUMN_WIDTHS: Capabilities = Capabilities(1 << 2);
    pub const MOVE_COLUMNS: Capabilities = Capabilities(1 << 3);
    pub const MOVE_ROWS: Capabilities = Capabilities(1 << 4);
    pub const ADD_ROWS: Capabilities = Capabilities(1 << 5);
    pub const REMOVE_ROWS: Capabilities = Capabilities(1 << 6);
    /// `footer_value_for_column` / `set_footer_value`
    pub const FOOTERS: Capabilities = Capabilities(1 << 7);

    pub const fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 | other.0)
    }

    pub const fn difference(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 & !other.0)
    }

    /// Editing, replace and delete need at least one setter
    pub const fn can_write(self) -> bool {
        self.0 & (Self::SET_VALUE.0 | Self::SET_VALUE_BULK.0) != 0
    }
}

impl std::ops::BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        self.union(rhs)
    }
}

/// Staged per-cell writes: row → column → new value (`None` deletes)
pub type CellBatch = BTreeMap<usize, BTreeMap<usize, Option<CellValue>>>;

/// Supplies dimensions and cell contents, and performs every mutation
///
/// Only the counts and `value_at` are required. Each optional method is
/// consulted only when the matching capability is declared.
pub trait DataSource {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    fn value_at(&self, column: usize, row: usize) -> Option<CellValue>;

    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    /// Convert edited text to the model's value type
    fn value_from_text(&self, _column: usize, _row: usize, text: &str) -> CellValue {
        CellValue::Text(text.to_string())
    }

    /// Write one cell. `None` deletes. Requires `SET_VALUE`.
    fn set_value(&mut self, _value: Option<CellValue>, _column: usize, _row: usize) {}

    /// Write one value into every cell of `columns × rows`. Requires `SET_VALUE_BULK`.
    fn set_values(&mut self, _value: Option<CellValue>, _columns: &IndexSet, _rows: &IndexSet) {}

    /// Write a batch of distinct per-cell values in one call. Requires `SET_VALUE_BULK`.
    ///
    /// The default forwards each entry to `set_values`; override it when the
    /// model can apply the whole batch atomically.
    fn apply_batch(&mut self, batch: &CellBatch) {
        for (&row, columns) in batch {
            for (&column, value) in columns {
                self.set_values(
                    value.clone(),
                    &IndexSet::single(column),
                    &IndexSet::single(row),
                );
            }
        }
    }

    /// Requires `COLUMN_WIDTHS`
    fn width_for_column(&self, _column: usize) -> Option<f64> {
        None
    }

    /// Requires `COLUMN_WIDTHS`
    fn set_width(&mut self, _column: usize, _width: f64) {}

    /// Is inserting `columns` before `dest` acceptable? Requires `MOVE_COLUMNS`.
    fn can_move_columns(&self, _columns: &IndexSet, _dest: usize) -> bool {
        true
    }

    /// Requires `MOVE_COLUMNS`
    fn move_columns(&mut self, _columns: &IndexSet, _dest: usize) -> bool {
        false
    }

    /// Requires `MOVE_ROWS`
    fn can_move_rows(&self, _rows: &IndexSet, _dest: usize) -> bool {
        true
    }

    /// Requires `MOVE_ROWS`
    fn move_rows(&mut self, _rows: &IndexSet, _dest: usize) -> bool {
        false
    }

    /// Requires `ADD_ROWS`
    fn add_rows(&mut self, _count: usize) -> bool {
        false
    }

    /// Requires `REMOVE_ROWS`
    fn remove_rows(&mut self, _rows: &IndexSet) -> bool {
        false
    }

    /// Columns showing a sort indicator, or `None` when nothing sorts
    fn sortable_column_indexes(&self) -> Option<IndexSet> {
        None
    }

    fn header_string_for_column(&self, _column: usize) -> Option<String> {
        None
    }

    fn header_string_for_row(&self, _row: usize) -> Option<String> {
        None
    }

    /// Requires `FOOTERS`
    fn footer_value_for_column(&self, _column: usize) -> Option<CellValue> {
        None
    }

    /// Requires `FOOTERS`
    fn set_footer_value(&mut self, _value: Option<CellValue>, _column: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_bits() {
        let caps = Capabilities::SET_VALUE | Capabilities::MOVE_ROWS;
        assert!(caps.contains(Capabilities::SET_VALUE));
        assert!(!caps.contains(Capabilities::MOVE_COLUMNS));
        assert!(caps.can_write());
        assert!(!Capabilities::MOVE_ROWS.can_write());
        assert!(Capabilities::SET_VALUE_BULK.can_write());
        assert_eq!(caps.difference(Capabilities::SET_VALUE), Capabilities::MOVE_ROWS);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(CellValue::text("abc").to_string(), "abc");
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
        assert_eq!(display_text(None), "");
    }
}
