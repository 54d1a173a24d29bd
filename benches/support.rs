//! Shared helpers for benchmarks

use tablegrid::geometry::Size;
use tablegrid::{GridConfig, MemoryDataSource, TableGrid};

/// Grid of `columns` x `rows` cells holding short words, sized like a
/// typical window
#[allow(dead_code)]
pub fn make_grid(columns: usize, rows: usize) -> TableGrid<MemoryDataSource> {
    let words = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"];
    let data: Vec<Vec<String>> = (0..rows)
        .map(|r| {
            (0..columns)
                .map(|c| format!("{}{}", words[(r + c) % words.len()], r))
                .collect()
        })
        .collect();
    let mut grid = TableGrid::new(MemoryDataSource::from_rows(data), GridConfig::default());
    grid.set_viewport_size(Size::new(1920.0, 1080.0));
    grid
}
