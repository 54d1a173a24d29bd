//! Find/replace through the virtual text adapter

mod common;

use common::{cell, indexes, GatedSource};
use tablegrid::data_source::{Capabilities, CellValue};
use tablegrid::text_finder::{
    ReplaceAllJob, ReplaceProgress, SearchScope, TextFinderClient, CELL_SEPARATOR,
};
use tablegrid::{GridConfig, IndexSet, MemoryDataSource, TableGrid};

fn sample() -> MemoryDataSource {
    MemoryDataSource::from_rows(vec![vec!["ab", "", "cde"], vec!["f", "gh", "i"]])
}

fn grid() -> TableGrid<MemoryDataSource> {
    TableGrid::new(sample(), GridConfig::default())
}

fn gated_grid() -> TableGrid<GatedSource> {
    TableGrid::new(GatedSource::new(sample()), GridConfig::default())
}

// ========================================================================
// Reading
// ========================================================================

#[test]
fn test_whole_grid_text() {
    let grid = grid();
    let mut finder = TextFinderClient::new(SearchScope::WholeGrid);
    assert_eq!(finder.string_length(&grid), 15);

    let chunk = finder.string_at(&grid, 5).expect("chunk");
    assert_eq!(chunk.text, format!("cde{CELL_SEPARATOR}"));
    assert_eq!(chunk.range, 4..8);
    assert!(chunk.ends_with_search_boundary);

    // Separator of the empty cell
    let chunk = finder.string_at(&grid, 3).expect("chunk");
    assert_eq!(chunk.text, CELL_SEPARATOR.to_string());
    assert_eq!(chunk.range, 3..4);

    assert!(finder.string_at(&grid, 15).is_none());
}

#[test]
fn test_find_all_never_spans_cells() {
    let grid = grid();
    let mut finder = TextFinderClient::default();
    assert_eq!(finder.find_all(&grid, "c", true), vec![4..5]);
    assert_eq!(finder.find_all(&grid, "GH", false), vec![10..12]);
    assert!(finder.find_all(&grid, "GH", true).is_empty());
    // "b" ends one cell and "c" starts the next two cells later
    assert!(finder.find_all(&grid, "bc", false).is_empty());
}

#[test]
fn test_selection_scope_visits_selected_cells() {
    let mut grid = grid();
    grid.select_column(2);
    let mut finder = TextFinderClient::new(SearchScope::Selection);

    assert_eq!(finder.string_length(&grid), 6);
    assert_eq!(finder.find_all(&grid, "i", true), vec![4..5]);

    // A new selection rebuilds the text
    grid.select_cell(cell(1, 1));
    assert_eq!(finder.string_length(&grid), 3);
}

#[test]
fn test_whole_grid_text_ignores_selection_changes() {
    let mut grid = grid();
    let mut finder = TextFinderClient::default();
    let before = finder.string_length(&grid);
    grid.select_all();
    assert_eq!(finder.string_length(&grid), before);
}

#[test]
fn test_text_rebuilds_after_edit() {
    let mut grid = grid();
    let mut finder = TextFinderClient::default();
    assert_eq!(finder.string_length(&grid), 15);
    grid.write_cell(Some(CellValue::text("abcd")), cell(0, 0));
    assert_eq!(finder.string_length(&grid), 17);
}

#[test]
fn test_rects_for_range_cover_touched_cells() {
    let grid = grid();
    let mut finder = TextFinderClient::default();
    let rects = finder.rects_for_range(&grid, 0..5);
    assert_eq!(rects.len(), 3);
    assert_eq!(
        rects[0],
        grid.layout().to_control(grid.layout().frame_of_cell(0, 0))
    );
    assert_eq!(
        rects[2],
        grid.layout().to_control(grid.layout().frame_of_cell(2, 0))
    );
}

#[test]
fn test_visible_ranges_follow_viewport() {
    let rows: Vec<Vec<&str>> = (0..10).map(|_| vec!["xy"]).collect();
    let mut grid = TableGrid::new(MemoryDataSource::from_rows(rows), GridConfig::default());
    // Header band 20 + two rows of 20
    grid.set_viewport_size(tablegrid::Size::new(200.0, 60.0));
    let mut finder = TextFinderClient::default();
    assert_eq!(finder.visible_character_ranges(&grid), vec![0..6]);

    grid.set_scroll(tablegrid::Point::new(0.0, 40.0));
    assert_eq!(finder.visible_character_ranges(&grid), vec![6..12]);
}

#[test]
fn test_selecting_a_match_selects_its_cell() {
    let mut grid = grid();
    let mut finder = TextFinderClient::default();
    assert!(finder.set_selected_range(&mut grid, 10..12));
    assert_eq!(grid.selection().anchor(), cell(1, 1));
    assert!(grid.selection().is_single_cell());
    assert_eq!(finder.first_selected_range(), Some(10..12));
}

#[test]
fn test_selecting_a_match_in_selection_scope_keeps_selection() {
    let mut grid = grid();
    grid.select_all();
    let before = grid.selection().clone();
    let mut finder = TextFinderClient::new(SearchScope::Selection);
    assert!(finder.set_selected_range(&mut grid, 10..12));
    assert_eq!(grid.selection(), &before);
}

// ========================================================================
// Replacing
// ========================================================================

#[test]
fn test_staged_replacements_apply_in_one_bulk_call() {
    let mut grid = gated_grid();
    let mut finder = TextFinderClient::default();

    // Later range first: staging order does not matter
    assert!(finder.replace_characters(&grid, 5..7, "Z"));
    assert!(finder.replace_characters(&grid, 0..1, "AA"));
    assert!(finder.replace_characters(&grid, 8..9, ""));
    assert_eq!(finder.pending_cell_count(), 3);

    assert_eq!(finder.did_replace_characters(&mut grid), 3);
    let source = &grid.data_source().inner;
    assert_eq!(source.row_texts(0), vec!["AAb", "", "cZ"]);
    assert_eq!(source.value(0, 1), None);
    assert_eq!(grid.data_source().writes, 1);
}

#[test]
fn test_two_edits_in_one_cell() {
    let mut grid = grid();
    let mut finder = TextFinderClient::default();
    assert!(finder.replace_characters(&grid, 6..7, "E"));
    assert!(finder.replace_characters(&grid, 4..5, "C"));
    assert!(!finder.replace_characters(&grid, 4..6, "x"));
    finder.did_replace_characters(&mut grid);
    assert_eq!(grid.data_source().value(2, 0), Some(&CellValue::text("CdE")));
}

#[test]
fn test_range_across_cells_is_refused() {
    let grid = grid();
    let mut finder = TextFinderClient::default();
    assert!(!finder.should_replace(&grid, &[1..4]));
    assert!(!finder.replace_characters(&grid, 1..4, "x"));
    assert!(finder.should_replace(&grid, &[0..2, 4..7]));
}

#[test]
fn test_replace_needs_bulk_setter() {
    let source = GatedSource::new(sample()).without(Capabilities::SET_VALUE_BULK);
    let grid = TableGrid::new(source, GridConfig::default());
    let mut finder = TextFinderClient::default();
    assert!(!finder.is_editable(&grid));
    assert!(!finder.replace_characters(&grid, 0..1, "x"));
}

#[test]
fn test_stale_staging_is_discarded() {
    let mut grid = grid();
    let mut finder = TextFinderClient::default();
    assert!(finder.replace_characters(&grid, 0..2, "zz"));
    grid.write_cell(Some(CellValue::text("changed")), cell(1, 1));

    assert_eq!(finder.did_replace_characters(&mut grid), 0);
    assert!(!finder.has_pending());
    assert_eq!(grid.data_source().value(0, 0), Some(&CellValue::text("ab")));
}

#[test]
fn test_replace_all() {
    let mut grid = TableGrid::new(
        MemoryDataSource::from_rows(vec![vec!["aXa", "b"], vec!["a", "xx"]]),
        GridConfig::default(),
    );
    let mut finder = TextFinderClient::default();
    let progress = ReplaceAllJob::new("x", "-", false).run_to_end(&mut finder, &mut grid);
    assert_eq!(progress, ReplaceProgress::Done { replaced: 3, cells: 2 });
    assert_eq!(grid.data_source().row_texts(0), vec!["a-a", "b"]);
    assert_eq!(grid.data_source().row_texts(1), vec!["a", "--"]);
}

#[test]
fn test_replace_all_with_same_text_writes_nothing() {
    let mut grid = gated_grid();
    let mut finder = TextFinderClient::default();
    let generation = grid.data_generation();

    let progress = ReplaceAllJob::new("gh", "gh", true).run_to_end(&mut finder, &mut grid);
    assert_eq!(progress, ReplaceProgress::Done { replaced: 1, cells: 0 });
    assert_eq!(grid.data_source().writes, 0);
    assert_eq!(grid.data_generation(), generation);
}

#[test]
fn test_replace_all_in_selection_scope() {
    let mut grid = TableGrid::new(
        MemoryDataSource::from_rows(vec![vec!["a", "a"], vec!["a", "a"]]),
        GridConfig::default(),
    );
    grid.set_selected_columns(IndexSet::single(1), false);
    grid.set_selected_rows(IndexSet::from([0, 1]), false);
    assert_eq!(indexes(grid.selection().rows()), vec![0, 1]);

    let mut finder = TextFinderClient::new(SearchScope::Selection);
    ReplaceAllJob::new("a", "b", true).run_to_end(&mut finder, &mut grid);
    assert_eq!(grid.data_source().column_texts(0), vec!["a", "a"]);
    assert_eq!(grid.data_source().column_texts(1), vec!["b", "b"]);
}

#[test]
fn test_batched_replace_all_aborts_when_grid_changes() {
    let rows: Vec<Vec<&str>> = (0..4).map(|_| vec!["q"]).collect();
    let mut grid = TableGrid::new(MemoryDataSource::from_rows(rows), GridConfig::default());
    let mut finder = TextFinderClient::default();
    let mut job = ReplaceAllJob::new("q", "r", true);

    assert_eq!(
        job.run_batch(&mut finder, &mut grid, 2),
        ReplaceProgress::Pending { staged: 2 }
    );
    grid.write_cell(Some(CellValue::text("other")), cell(0, 3));
    assert_eq!(
        job.run_batch(&mut finder, &mut grid, 2),
        ReplaceProgress::Aborted
    );
    assert_eq!(grid.data_source().column_texts(0), vec!["q", "q", "q", "other"]);
}

#[test]
fn test_batched_replace_all_completes() {
    let rows: Vec<Vec<&str>> = (0..5).map(|_| vec!["q"]).collect();
    let mut grid = TableGrid::new(MemoryDataSource::from_rows(rows), GridConfig::default());
    let mut finder = TextFinderClient::default();
    let mut job = ReplaceAllJob::new("q", "r", true);

    let mut batches = 0;
    let done = loop {
        batches += 1;
        match job.run_batch(&mut finder, &mut grid, 2) {
            ReplaceProgress::Pending { .. } => {
                // Nothing is written until the last batch
                assert_eq!(grid.data_source().value(0, 0), Some(&CellValue::text("q")));
            }
            other => break other,
        }
    };
    assert_eq!(batches, 3);
    assert_eq!(done, ReplaceProgress::Done { replaced: 5, cells: 5 });
    assert_eq!(grid.data_source().column_texts(0), vec!["r"; 5]);
}
