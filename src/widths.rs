//! Column width cache and its autosave store
//!
//! Widths are sparse: only columns the user (or data source) sized have an
//! entry, everything else falls back to the default width. The cache is
//! keyed by column index, so a column move has to carry widths along.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::index_set::IndexSet;

/// Sparse column index → width mapping with a default and a floor
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWidths {
    widths: BTreeMap<usize, f64>,
    default_width: f64,
    minimum_width: f64,
}

impl ColumnWidths {
    pub fn new(default_width: f64, minimum_width: f64) -> Self {
        let minimum_width = minimum_width.max(0.0);
        Self {
            widths: BTreeMap::new(),
            default_width: default_width.max(minimum_width),
            minimum_width,
        }
    }

    pub fn minimum_width(&self) -> f64 {
        self.minimum_width
    }

    pub fn get(&self, column: usize) -> f64 {
        self.widths
            .get(&column)
            .copied()
            .unwrap_or(self.default_width)
    }

    /// Store a width, clamped to the minimum; returns the stored value
    pub fn set(&mut self, column: usize, width: f64) -> f64 {
        let width = if width.is_finite() {
            width.max(self.minimum_width)
        } else {
            self.default_width
        };
        self.widths.insert(column, width);
        width
    }

    pub fn is_explicit(&self, column: usize) -> bool {
        self.widths.contains_key(&column)
    }

    pub fn clear(&mut self) {
        self.widths.clear();
    }

    /// Explicit entries only
    pub fn entries(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.widths.iter().map(|(&c, &w)| (c, w))
    }

    /// Drop entries at or beyond the current column count
    pub fn truncate(&mut self, column_count: usize) {
        self.widths.retain(|&c, _| c < column_count);
    }

    /// Carry widths along when `moved` columns are inserted before `dest`
    pub fn apply_move(&mut self, moved: &IndexSet, dest: usize) {
        self.widths = std::mem::take(&mut self.widths)
            .into_iter()
            .map(|(column, width)| (moved.position_after_move(column, dest), width))
            .collect();
    }
}

/// On-disk form of an autosaved width cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedWidths {
    /// Schema version for forward compatibility
    #[serde(default)]
    pub version: u32,
    /// Column index → width
    #[serde(default)]
    pub widths: BTreeMap<usize, f64>,
}

impl SavedWidths {
    pub const CURRENT_VERSION: u32 = 1;
}

/// JSON file backing one grid's autosave name
#[derive(Debug, Clone)]
pub struct WidthAutosave {
    path: PathBuf,
}

impl WidthAutosave {
    /// Store under the config directory for the given autosave name
    pub fn named(autosave_name: &str) -> Option<Self> {
        crate::config_paths::column_widths_file(autosave_name).map(|path| Self { path })
    }

    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved widths; a missing or corrupt file yields an empty cache
    pub fn load(&self) -> SavedWidths {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(saved) => saved,
                Err(e) => {
                    tracing::warn!(
                        "Ignoring corrupt width cache at {}: {}",
                        self.path.display(),
                        e
                    );
                    SavedWidths::default()
                }
            },
            Err(_) => SavedWidths::default(),
        }
    }

    /// Restore saved entries into a width cache
    pub fn restore_into(&self, widths: &mut ColumnWidths) -> usize {
        let saved = self.load();
        for (&column, &width) in &saved.widths {
            widths.set(column, width);
        }
        if !saved.widths.is_empty() {
            tracing::debug!(
                "Restored {} column widths from {}",
                saved.widths.len(),
                self.path.display()
            );
        }
        saved.widths.len()
    }

    /// Write the explicit entries of a width cache
    pub fn save(&self, widths: &ColumnWidths) -> Result<()> {
        crate::config_paths::ensure_parent_dir(&self.path)?;
        let saved = SavedWidths {
            version: SavedWidths::CURRENT_VERSION,
            widths: widths.entries().collect(),
        };
        let contents = serde_json::to_string_pretty(&saved)?;
        std::fs::write(&self.path, contents).map_err(|e| GridError::io(&self.path, e))
    }
}
