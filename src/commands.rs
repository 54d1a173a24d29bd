//! Command types for the Elm-style architecture
//!
//! Commands describe what the host has to do after an update: repaint,
//! place or remove the in-cell editor, pop up a header menu.

use crate::delegate::{HeaderMenu, HeaderTarget};
use crate::geometry::{CellAddress, Point, Rect};

/// Commands returned by update functions
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Request a full redraw of the grid
    Redraw,
    /// Place the field editor over a cell (`frame` in control space)
    ShowEditor { address: CellAddress, frame: Rect },
    /// Remove the field editor
    HideEditor,
    /// Pop up a header context menu at `at`
    ShowHeaderMenu {
        target: HeaderTarget,
        menu: HeaderMenu,
        at: Point,
    },
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands, flattening trivial cases
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| *c != Cmd::None).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }

    /// Check if this command requires a redraw
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::Redraw => true,
            Cmd::ShowEditor { .. } | Cmd::HideEditor => true,
            // The host draws the menu itself
            Cmd::ShowHeaderMenu { .. } => false,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_flattens() {
        assert_eq!(Cmd::batch(vec![]), Cmd::None);
        assert_eq!(Cmd::batch(vec![Cmd::None, Cmd::Redraw]), Cmd::Redraw);
        assert!(matches!(
            Cmd::batch(vec![Cmd::Redraw, Cmd::HideEditor]),
            Cmd::Batch(_)
        ));
    }

    #[test]
    fn test_needs_redraw() {
        assert!(!Cmd::None.needs_redraw());
        assert!(Cmd::batch(vec![Cmd::HideEditor]).needs_redraw());
        let menu = Cmd::ShowHeaderMenu {
            target: HeaderTarget::Row(0),
            menu: HeaderMenu::default(),
            at: Point::default(),
        };
        assert!(!menu.needs_redraw());
    }
}
