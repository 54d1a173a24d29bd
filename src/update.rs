//! Update function for the Elm-style architecture
//!
//! Translates [`GridMsg`] input into calls on [`TableGrid`] and reports what
//! the host has to do as a [`Cmd`]. The grid itself stays usable without
//! going through here; this is the routing a typical host wants.

use crate::commands::Cmd;
use crate::data_source::DataSource;
use crate::delegate::HeaderTarget;
use crate::drag::{DragAxis, GestureEnd};
use crate::editing::EditTrigger;
use crate::geometry::{CellAddress, Point, Rect};
use crate::grid::TableGrid;
use crate::layout::HitRegion;
use crate::messages::{Direction, GridMsg, Key, Modifiers};

/// Handle a message, returning the commands the host should run
pub fn update<D: DataSource>(grid: &mut TableGrid<D>, msg: GridMsg) -> Option<Cmd> {
    let before = editor_placement(grid);

    let cmd = match msg {
        GridMsg::PointerDown {
            point,
            click_count,
            modifiers,
        } => pointer_down(grid, point, click_count, modifiers),
        GridMsg::PointerDragged { point } => {
            let active = grid.gesture().is_some();
            grid.drag_to(point);
            redraw_if(active)
        }
        GridMsg::PointerUp { .. } => {
            let end = grid.end_gesture();
            tracing::trace!(?end, "pointer up");
            redraw_if(end != GestureEnd::Nothing)
        }
        GridMsg::ContextMenu { point } => context_menu(grid, point),
        GridMsg::ScrollBy { dx, dy } => {
            let scroll = grid.layout().viewport().scroll;
            grid.set_scroll(Point::new(scroll.x + dx, scroll.y + dy));
            redraw_if(grid.layout().viewport().scroll != scroll)
        }
        GridMsg::ViewportResized(size) => {
            grid.set_viewport_size(size);
            Some(Cmd::Redraw)
        }
        GridMsg::Key { key, modifiers } => {
            if grid.is_editing() {
                editing_key(grid, key, modifiers)
            } else {
                navigation_key(grid, key, modifiers)
            }
        }
        GridMsg::SelectAll => redraw_if(grid.select_all()),
        GridMsg::Copy => {
            grid.copy();
            None
        }
        GridMsg::Paste => redraw_if(grid.paste()),
        GridMsg::Delete => redraw_if(grid.delete_selection()),
        GridMsg::AddRows(count) => redraw_if(grid.add_rows(count)),
        GridMsg::RemoveSelectedRows => redraw_if(grid.remove_selected_rows()),
        GridMsg::MenuAction(action) => redraw_if(grid.perform_menu_action(&action)),
        GridMsg::Reload => {
            grid.reload_data();
            Some(Cmd::Redraw)
        }
    };

    let after = editor_placement(grid);
    if before == after {
        return cmd;
    }
    let editor = match after {
        Some((address, frame)) => Cmd::ShowEditor { address, frame },
        None => Cmd::HideEditor,
    };
    Some(Cmd::batch(vec![editor, cmd.unwrap_or(Cmd::Redraw)]))
}

fn redraw_if(changed: bool) -> Option<Cmd> {
    changed.then_some(Cmd::Redraw)
}

/// Edited cell and its control-space frame
fn editor_placement<D: DataSource>(grid: &TableGrid<D>) -> Option<(CellAddress, Rect)> {
    let address = grid.editing()?.address();
    let frame = grid
        .layout()
        .to_control(grid.layout().frame_of_cell(address.column, address.row));
    Some((address, frame))
}

/// Clicking anywhere but the edited cell ends the edit
fn commit_edit_unless<D: DataSource>(grid: &mut TableGrid<D>, keep: Option<CellAddress>) {
    let editing = grid.editing().map(|s| s.address());
    if editing.is_some() && editing != keep {
        grid.commit_editing(EditTrigger::Other);
    }
}

// ============================================================================
// Pointer
// ============================================================================

fn pointer_down<D: DataSource>(
    grid: &mut TableGrid<D>,
    point: Point,
    click_count: u32,
    modifiers: Modifiers,
) -> Option<Cmd> {
    let Some(region) = grid.layout().hit_test(point) else {
        commit_edit_unless(grid, None);
        return None;
    };
    tracing::trace!(?region, click_count, "pointer down");

    match region {
        HitRegion::Cell(cell) => {
            commit_edit_unless(grid, Some(cell));
            if grid.editing().is_some() {
                // Click inside the open editor
                return None;
            }
            if modifiers.shift {
                grid.extend_selection_to(cell);
                grid.begin_content_select();
                return Some(Cmd::Redraw);
            }
            grid.select_cell(cell);
            if grid.edit_activation(cell).accepts(click_count) && grid.begin_editing(cell) {
                return Some(Cmd::Redraw);
            }
            grid.begin_content_select();
            Some(Cmd::Redraw)
        }
        HitRegion::ColumnResizeHandle(column) => {
            commit_edit_unless(grid, None);
            redraw_if(grid.begin_column_resize(column, point.x))
        }
        HitRegion::ColumnHeader(column) => {
            commit_edit_unless(grid, None);
            if click_count >= 2 {
                grid.double_click_header(HeaderTarget::Column(column));
                return None;
            }
            if grid.layout().in_sort_zone(column, point) && grid.is_sortable(column) {
                return redraw_if(grid.sort_by_column(column));
            }
            header_press(grid, DragAxis::Columns, column, point, modifiers)
        }
        HitRegion::RowHeader(row) => {
            commit_edit_unless(grid, None);
            if click_count >= 2 {
                grid.double_click_header(HeaderTarget::Row(row));
                return None;
            }
            header_press(grid, DragAxis::Rows, row, point, modifiers)
        }
        HitRegion::Corner => {
            commit_edit_unless(grid, None);
            redraw_if(grid.select_all())
        }
        HitRegion::ColumnFooter(column) => {
            commit_edit_unless(grid, None);
            grid.click_footer(column);
            None
        }
        HitRegion::FooterCorner => {
            commit_edit_unless(grid, None);
            None
        }
    }
}

/// Press on a column or row header: record the gesture first, then apply
/// the click's selection change
fn header_press<D: DataSource>(
    grid: &mut TableGrid<D>,
    axis: DragAxis,
    index: usize,
    point: Point,
    modifiers: Modifiers,
) -> Option<Cmd> {
    let plain = !modifiers.shift && !modifiers.command;
    grid.begin_header_press(axis, index, point, plain);

    match axis {
        DragAxis::Columns => {
            if modifiers.shift {
                grid.extend_columns_to(index);
            } else if modifiers.command {
                grid.toggle_column(index);
            } else if !grid.is_header_selected(axis, index) {
                grid.select_column(index);
            }
        }
        DragAxis::Rows => {
            if modifiers.shift {
                grid.extend_rows_to(index);
            } else if modifiers.command {
                grid.toggle_row(index);
            } else if !grid.is_header_selected(axis, index) {
                grid.select_row(index);
            }
        }
    }
    Some(Cmd::Redraw)
}

fn context_menu<D: DataSource>(grid: &mut TableGrid<D>, point: Point) -> Option<Cmd> {
    let target = match grid.layout().hit_test(point)? {
        HitRegion::ColumnHeader(column) | HitRegion::ColumnResizeHandle(column) => {
            HeaderTarget::Column(column)
        }
        HitRegion::RowHeader(row) => HeaderTarget::Row(row),
        _ => return None,
    };
    let menu = grid.header_menu(target);
    if menu.items.is_empty() {
        return None;
    }
    Some(Cmd::ShowHeaderMenu {
        target,
        menu,
        at: point,
    })
}

// ============================================================================
// Keyboard
// ============================================================================

/// Keys routed into the open editor
fn editing_key<D: DataSource>(
    grid: &mut TableGrid<D>,
    key: Key,
    modifiers: Modifiers,
) -> Option<Cmd> {
    match key {
        Key::Enter => {
            let trigger = if modifiers.shift {
                EditTrigger::ShiftEnter
            } else {
                EditTrigger::Enter
            };
            redraw_if(grid.commit_editing(trigger))
        }
        Key::Tab => {
            let trigger = if modifiers.shift {
                EditTrigger::BackTab
            } else {
                EditTrigger::Tab
            };
            redraw_if(grid.commit_editing(trigger))
        }
        Key::Escape => redraw_if(grid.cancel_editing()),
        Key::Arrow(direction @ (Direction::Up | Direction::Down)) => {
            grid.commit_editing(EditTrigger::Other);
            let (dx, dy) = direction.delta();
            grid.move_selection(dx, dy);
            Some(Cmd::Redraw)
        }
        Key::Char(_) if modifiers.command => None,
        _ => {
            let editor = grid.editor_mut()?;
            match key {
                Key::Char(ch) => editor.insert_char(ch),
                Key::Backspace => editor.delete_backward(),
                Key::Delete => editor.delete_forward(),
                Key::Arrow(Direction::Left) => editor.cursor_left(),
                Key::Arrow(Direction::Right) => editor.cursor_right(),
                Key::Home => editor.cursor_home(),
                Key::End => editor.cursor_end(),
                _ => return None,
            }
            Some(Cmd::Redraw)
        }
    }
}

/// Keys while no editor is open
fn navigation_key<D: DataSource>(
    grid: &mut TableGrid<D>,
    key: Key,
    modifiers: Modifiers,
) -> Option<Cmd> {
    match key {
        Key::Arrow(direction) => {
            let (dx, dy) = direction.delta();
            if modifiers.shift {
                redraw_if(grid.extend_selection_by(dx, dy))
            } else {
                redraw_if(grid.move_selection(dx, dy))
            }
        }
        Key::Tab => {
            let dx = if modifiers.shift { -1 } else { 1 };
            redraw_if(grid.move_selection(dx, 0))
        }
        Key::Enter => {
            let anchor = grid.selection().anchor();
            redraw_if(grid.begin_editing(anchor))
        }
        Key::Backspace | Key::Delete => redraw_if(grid.delete_selection()),
        Key::Home | Key::End => {
            if grid.column_count() == 0 {
                return None;
            }
            let row = grid.selection().anchor().row;
            let column = if key == Key::Home {
                0
            } else {
                grid.column_count() - 1
            };
            let cell = CellAddress::new(column, row);
            let changed = grid.select_cell(cell);
            grid.scroll_to_cell(cell);
            redraw_if(changed)
        }
        Key::Char(ch) if modifiers.command => match ch.to_ascii_lowercase() {
            'a' => redraw_if(grid.select_all()),
            'c' => {
                grid.copy();
                None
            }
            'v' => redraw_if(grid.paste()),
            _ => None,
        },
        Key::Char(ch) if !ch.is_control() => redraw_if(grid.begin_editing_with_char(ch)),
        Key::Char(_) | Key::Escape => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::data_source::CellValue;
    use crate::memory::MemoryDataSource;

    fn grid() -> TableGrid<MemoryDataSource> {
        TableGrid::new(
            MemoryDataSource::from_rows(vec![vec!["a", "b"], vec!["c", "d"]]),
            GridConfig::default(),
        )
    }

    fn key(key: Key) -> GridMsg {
        GridMsg::Key {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn test_typing_opens_editor_and_enter_commits() {
        let mut g = grid();
        let cmd = update(&mut g, key(Key::Char('x')));
        assert!(matches!(cmd, Some(Cmd::Batch(ref cmds)) if matches!(cmds[0], Cmd::ShowEditor { .. })));
        update(&mut g, key(Key::Char('y')));

        let cmd = update(&mut g, key(Key::Enter));
        assert!(matches!(cmd, Some(Cmd::Batch(ref cmds)) if cmds[0] == Cmd::HideEditor));
        assert_eq!(g.data_source().value(0, 0), Some(&CellValue::text("xy")));
        assert_eq!(g.selection().anchor(), CellAddress::new(0, 1));
    }

    #[test]
    fn test_escape_cancels() {
        let mut g = grid();
        update(&mut g, key(Key::Enter));
        assert!(g.is_editing());
        update(&mut g, key(Key::Backspace));
        update(&mut g, key(Key::Escape));
        assert!(!g.is_editing());
        assert_eq!(g.data_source().value(0, 0), Some(&CellValue::text("a")));
    }

    #[test]
    fn test_arrows_move_and_extend() {
        let mut g = grid();
        update(&mut g, key(Key::Arrow(Direction::Right)));
        assert_eq!(g.selection().anchor(), CellAddress::new(1, 0));
        update(
            &mut g,
            GridMsg::Key {
                key: Key::Arrow(Direction::Down),
                modifiers: Modifiers::SHIFT,
            },
        );
        assert_eq!(g.selection().cell_count(), 2);
    }

    #[test]
    fn test_scroll_without_extent_is_noop() {
        let mut g = grid();
        assert_eq!(update(&mut g, GridMsg::ScrollBy { dx: 0.0, dy: 0.0 }), None);
    }
}
