//! Optional delegate callbacks
//!
//! Every method has a default that leaves behavior unchanged, so a grid
//! without a delegate (or with an empty one) is fully functional.

use crate::editing::EditActivation;
use crate::index_set::IndexSet;

/// Which header a menu or double click refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTarget {
    Column(usize),
    Row(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    SortAscending(usize),
    SortDescending(usize),
    SelectColumn(usize),
    SelectRow(usize),
    /// Host-defined item, identified by a tag
    Custom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub title: String,
    pub action: MenuAction,
}

impl MenuItem {
    pub fn new(title: impl Into<String>, action: MenuAction) -> Self {
        Self {
            title: title.into(),
            action,
        }
    }
}

/// Items of a header context menu, built by the grid and edited by the delegate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMenu {
    pub items: Vec<MenuItem>,
}

pub trait GridDelegate {
    /// Confirm or alter an impending column selection; `None` accepts it
    fn will_select_columns(&mut self, _proposed: &IndexSet) -> Option<IndexSet> {
        None
    }

    /// Confirm or alter an impending row selection; `None` accepts it
    fn will_select_rows(&mut self, _proposed: &IndexSet) -> Option<IndexSet> {
        None
    }

    fn did_change_selection(&mut self) {}

    fn did_double_click_column(&mut self, _column: usize) {}

    fn did_double_click_row(&mut self, _row: usize) {}

    fn did_move_columns(&mut self, _old: &IndexSet, _new: &IndexSet) {}

    fn did_move_rows(&mut self, _old: &IndexSet, _new: &IndexSet) {}

    /// Per-cell edit permission
    fn should_edit(&mut self, _column: usize, _row: usize) -> bool {
        true
    }

    /// Per-cell override of the grid-wide click-to-edit policy
    fn edit_activation(&self, _column: usize, _row: usize) -> Option<EditActivation> {
        None
    }

    fn copy_cells(&mut self, _columns: &IndexSet, _rows: &IndexSet) {}

    fn paste_cells(&mut self, _columns: &IndexSet, _rows: &IndexSet) {}

    fn did_add_rows(&mut self, _rows: &IndexSet) {}

    fn footer_clicked(&mut self, _column: usize) {}

    /// `column` is `None` when sorting was cleared
    fn did_sort_by_column(&mut self, _column: Option<usize>, _ascending: bool) {}

    fn will_display_header_menu(&mut self, _target: HeaderTarget, _menu: &mut HeaderMenu) {}
}
