//! tablegrid - headless spreadsheet grid core
//!
//! This crate provides the state and logic behind a spreadsheet-style grid
//! control: column and row layout, hit-testing, selection, in-cell editing,
//! drag reorder and resize, and a virtual text view of the cells for
//! find and replace. Rendering is left to the host, which drives the grid
//! through the Elm-style [`update`] function or calls [`TableGrid`] directly.

pub mod commands;
pub mod config;
pub mod config_paths;
pub mod data_source;
pub mod delegate;
pub mod drag;
pub mod editing;
pub mod error;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod index_set;
pub mod layout;
pub mod memory;
pub mod messages;
pub mod selection;
pub mod text_finder;
pub mod tracing;
pub mod update;
pub mod widths;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::GridConfig;
pub use data_source::{Capabilities, CellValue, DataSource};
pub use delegate::GridDelegate;
pub use error::{GridError, Result};
pub use events::GridEvent;
pub use geometry::{CellAddress, Point, Rect, Size};
pub use grid::TableGrid;
pub use index_set::IndexSet;
pub use layout::{HitRegion, Layout};
pub use memory::MemoryDataSource;
pub use messages::GridMsg;
pub use selection::SelectionState;
pub use text_finder::{SearchScope, TextFinderClient};
pub use update::update;
