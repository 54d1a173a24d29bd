//! Editing state machine
//!
//! `Idle → Editing → {Committed, Cancelled} → Idle`. The grid holds at most
//! one [`EditingSession`] in an `Option`; `None` is `Idle`. Committing and
//! cancelling consume the session, so the terminal states never outlive
//! the call that reached them.

use crate::data_source::{display_text, CellValue, DataSource};
use crate::geometry::CellAddress;

/// How a pointer gesture may open an editor on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditActivation {
    DoubleClick,
    SingleClick,
}

impl EditActivation {
    /// Does a click with this count open the editor?
    pub fn accepts(self, click_count: u32) -> bool {
        match self {
            EditActivation::DoubleClick => click_count >= 2,
            EditActivation::SingleClick => click_count >= 1,
        }
    }
}

/// What ended an edit, which decides where the selection goes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTrigger {
    Enter,
    ShiftEnter,
    Tab,
    BackTab,
    /// Clicked elsewhere or committed through the API
    Other,
}

impl EditTrigger {
    /// Selection movement after the commit
    pub fn advance(self) -> (isize, isize) {
        match self {
            EditTrigger::Enter => (0, 1),
            EditTrigger::ShiftEnter => (0, -1),
            EditTrigger::Tab => (1, 0),
            EditTrigger::BackTab => (-1, 0),
            EditTrigger::Other => (0, 0),
        }
    }
}

/// Single-line text field with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellEditor {
    text: String,
    /// Cursor in chars, `0..=char_count`
    cursor: usize,
}

impl CellEditor {
    /// Editor holding `text` with the cursor at the end
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, ch: char) {
        // Cells are single-line
        if ch == '\n' || ch == '\r' {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    pub fn insert_text(&mut self, s: &str) {
        for ch in s.chars() {
            self.insert_char(ch);
        }
    }

    /// Backspace
    pub fn delete_backward(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
    }

    /// Delete
    pub fn delete_forward(&mut self) {
        if self.cursor >= self.char_count() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.char_count();
    }
}

/// The one in-flight edit
#[derive(Debug, Clone, PartialEq)]
pub struct EditingSession {
    address: CellAddress,
    editor: CellEditor,
    /// Value before editing, kept for cancel and change detection
    original: Option<CellValue>,
}

impl EditingSession {
    /// Edit the existing value
    pub fn new(address: CellAddress, original: Option<CellValue>) -> Self {
        Self {
            address,
            editor: CellEditor::new(display_text(original.as_ref())),
            original,
        }
    }

    /// Fresh edit started by typing: the character replaces the old value
    pub fn with_char(address: CellAddress, original: Option<CellValue>, ch: char) -> Self {
        let mut editor = CellEditor::default();
        editor.insert_char(ch);
        Self {
            address,
            editor,
            original,
        }
    }

    pub fn address(&self) -> CellAddress {
        self.address
    }

    /// Follow the cell after a row or column move
    pub(crate) fn relocate(&mut self, address: CellAddress) {
        self.address = address;
    }

    pub fn editor(&self) -> &CellEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut CellEditor {
        &mut self.editor
    }

    pub fn text(&self) -> &str {
        self.editor.text()
    }

    pub fn original(&self) -> Option<&CellValue> {
        self.original.as_ref()
    }

    pub fn is_modified(&self) -> bool {
        self.editor.text() != display_text(self.original.as_ref())
    }

    /// Convert the edited text to the data model's value; empty text deletes
    pub fn committed_value<D: DataSource + ?Sized>(&self, source: &D) -> Option<CellValue> {
        let text = self.editor.text();
        if text.is_empty() {
            return None;
        }
        Some(source.value_from_text(self.address.column, self.address.row, text))
    }
}
