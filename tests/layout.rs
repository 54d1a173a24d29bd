//! Layout engine tests through the grid: frames, hit-testing, scrolling

mod common;

use common::{cell, labelled_grid, test_grid};
use tablegrid::geometry::{Point, Rect, Size};
use tablegrid::layout::HitRegion;
use tablegrid::messages::{Direction, GridMsg, Key, Modifiers};
use tablegrid::update::update;
use tablegrid::{GridConfig, MemoryDataSource, TableGrid};

#[test]
fn test_frame_is_column_rect_intersect_row_rect() {
    let mut grid = test_grid(4, 5);
    grid.set_column_width(2, 95.0);
    let layout = grid.layout();
    for column in 0..4 {
        for row in 0..5 {
            let frame = layout.frame_of_cell(column, row);
            assert_eq!(
                frame,
                layout.rect_of_column(column).intersection(&layout.rect_of_row(row))
            );
            assert_eq!(frame.width, layout.column_width(column));
            assert_eq!(frame.height, 20.0);
        }
    }
    assert_eq!(layout.frame_of_cell(2, 1), Rect::new(120.0, 20.0, 95.0, 20.0));
}

#[test]
fn test_out_of_range_lookups_are_empty() {
    let grid = test_grid(2, 2);
    let layout = grid.layout();
    assert_eq!(layout.frame_of_cell(2, 0), Rect::ZERO);
    assert_eq!(layout.frame_of_cell(0, 2), Rect::ZERO);
    assert_eq!(layout.cell_at_point(Point::new(130.0, 5.0)), None);
    assert_eq!(layout.cell_at_point(Point::new(5.0, -1.0)), None);
}

#[test]
fn test_content_size() {
    let grid = test_grid(3, 7);
    assert_eq!(grid.layout().content_size(), Size::new(180.0, 140.0));
    let empty = test_grid(0, 7);
    assert_eq!(empty.layout().content_size(), Size::default());
}

#[test]
fn test_hit_test_round_trips_frames() {
    let grid = test_grid(5, 5);
    let layout = grid.layout();
    for column in 0..5 {
        for row in 0..5 {
            let frame = layout.to_control(layout.frame_of_cell(column, row));
            let center = Point::new(frame.mid_x(), frame.mid_y());
            assert_eq!(layout.hit_test(center), Some(HitRegion::Cell(cell(column, row))));
        }
    }
}

#[test]
fn test_hidden_headers_shift_content() {
    let config = GridConfig {
        column_header_visible: false,
        row_header_visible: false,
        ..GridConfig::default()
    };
    let grid = TableGrid::new(MemoryDataSource::new(2, 2), config);
    let layout = grid.layout();
    assert_eq!(layout.hit_test(Point::new(1.0, 1.0)), Some(HitRegion::Cell(cell(0, 0))));
    assert_eq!(layout.header_rect_of_column(0), Rect::ZERO);
    assert_eq!(layout.header_rect_of_corner(), Rect::ZERO);
}

#[test]
fn test_scroll_is_clamped_to_content() {
    let mut grid = test_grid(10, 50);
    grid.set_viewport_size(Size::new(240.0, 220.0));
    // Content band 200 x 200, content 600 x 1000
    grid.set_scroll(Point::new(-50.0, 5000.0));
    assert_eq!(grid.layout().viewport().scroll, Point::new(0.0, 800.0));

    grid.set_scroll(Point::new(1000.0, 0.0));
    assert_eq!(grid.layout().viewport().scroll.x, 400.0);
}

#[test]
fn test_scroll_changes_hit_test() {
    let mut grid = test_grid(10, 50);
    grid.set_viewport_size(Size::new(240.0, 220.0));
    update(&mut grid, GridMsg::ScrollBy { dx: 60.0, dy: 100.0 });

    assert_eq!(
        grid.layout().hit_test(Point::new(45.0, 25.0)),
        Some(HitRegion::Cell(cell(1, 5)))
    );
    assert_eq!(
        grid.layout().hit_test(Point::new(45.0, 5.0)),
        Some(HitRegion::ColumnHeader(1))
    );
    assert_eq!(
        grid.layout().hit_test(Point::new(5.0, 25.0)),
        Some(HitRegion::RowHeader(5))
    );
}

#[test]
fn test_keyboard_navigation_scrolls_into_view() {
    let mut grid = test_grid(3, 50);
    grid.set_viewport_size(Size::new(300.0, 120.0));
    for _ in 0..10 {
        update(
            &mut grid,
            GridMsg::Key {
                key: Key::Arrow(Direction::Down),
                modifiers: Modifiers::NONE,
            },
        );
    }
    assert_eq!(grid.selection().anchor(), cell(0, 10));
    let visible = grid.layout().visible_content_rect();
    let frame = grid.layout().frame_of_cell(0, 10);
    assert!(frame.y >= visible.y && frame.max_y() <= visible.max_y());
}

#[test]
fn test_viewport_resize_message_redraws() {
    let mut grid = test_grid(3, 3);
    let cmd = update(&mut grid, GridMsg::ViewportResized(Size::new(640.0, 480.0)));
    assert_eq!(cmd, Some(tablegrid::Cmd::Redraw));
    assert_eq!(grid.layout().viewport().size, Size::new(640.0, 480.0));
}

#[test]
fn test_visible_columns_after_resize() {
    let mut grid = labelled_grid(6, 2);
    grid.set_viewport_size(Size::new(160.0, 100.0));
    assert_eq!(grid.layout().visible_columns(), 0..2);
    grid.set_column_width(0, 20.0);
    assert_eq!(grid.layout().visible_columns(), 0..3);
}
