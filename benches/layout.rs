//! Benchmarks for layout queries, hit-testing and column resizing
//!
//! Run with: cargo bench layout

mod support;
use support::make_grid;

use tablegrid::geometry::Point;
use tablegrid::layout::Layout;
use tablegrid::GridConfig;

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

// ============================================================================
// Geometry queries
// ============================================================================

#[divan::bench(args = [10, 100, 1_000])]
fn frame_of_every_visible_cell(columns: usize) {
    let grid = make_grid(columns, 1_000);
    let layout = grid.layout();
    let mut area = 0.0;
    for column in layout.visible_columns() {
        for row in layout.visible_rows() {
            area += layout.frame_of_cell(column, row).width;
        }
    }
    divan::black_box(area);
}

#[divan::bench(args = [10, 100, 1_000])]
fn hit_test_sweep(columns: usize) {
    let grid = make_grid(columns, 100);
    let layout = grid.layout();
    let mut hits = 0;
    for x in (0..1920).step_by(7) {
        for y in (0..1080).step_by(13) {
            if layout.hit_test(Point::new(x as f64, y as f64)).is_some() {
                hits += 1;
            }
        }
    }
    divan::black_box(hits);
}

#[divan::bench(args = [100, 10_000])]
fn column_insertion_index(columns: usize) {
    let layout = Layout::new(&GridConfig::default(), columns, 10);
    let total = layout.total_width();
    let mut sum = 0;
    for i in 0..1_000 {
        sum += layout.column_insertion_index(total * i as f64 / 1_000.0);
    }
    divan::black_box(sum);
}

// ============================================================================
// Mutation
// ============================================================================

#[divan::bench(args = [100, 10_000])]
fn resize_columns(bencher: divan::Bencher, columns: usize) {
    bencher
        .with_inputs(|| Layout::new(&GridConfig::default(), columns, 10))
        .bench_local_values(|mut layout| {
            for column in (0..columns).step_by(3) {
                layout.resize_column(column, 12.5);
            }
            layout
        });
}

#[divan::bench]
fn scroll_through_rows() {
    let mut grid = make_grid(20, 10_000);
    for step in 0..1_000 {
        grid.set_scroll(Point::new(0.0, step as f64 * 150.0));
        divan::black_box(grid.layout().visible_rows());
    }
}
