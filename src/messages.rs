//! Message types for the Elm-style architecture
//!
//! The host translates its window events into [`GridMsg`] values and feeds
//! them to [`crate::update::update`]. Points are in control space.

use crate::delegate::MenuAction;
use crate::geometry::{Point, Size};

/// Direction for selection and cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step as `(dx, dy)`
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Modifier keys held during an input event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Cmd on macOS, Ctrl elsewhere
    pub command: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        command: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        command: false,
    };

    pub const COMMAND: Modifiers = Modifiers {
        shift: false,
        command: true,
    };
}

/// Keys the grid reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Home,
    End,
    Arrow(Direction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridMsg {
    // === Pointer ===
    /// Button pressed; `click_count` is 2 for a double click
    PointerDown {
        point: Point,
        click_count: u32,
        modifiers: Modifiers,
    },
    /// Pointer moved with the button held
    PointerDragged { point: Point },
    PointerUp { point: Point },
    /// Secondary click, opens a header menu
    ContextMenu { point: Point },

    // === Viewport ===
    ScrollBy { dx: f64, dy: f64 },
    ViewportResized(Size),

    // === Keyboard ===
    Key { key: Key, modifiers: Modifiers },

    // === Commands ===
    SelectAll,
    Copy,
    Paste,
    /// Clear the selected cells
    Delete,
    AddRows(usize),
    RemoveSelectedRows,
    MenuAction(MenuAction),
    /// Data changed behind the grid's back
    Reload,
}
