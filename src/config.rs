//! Grid configuration persistence
//!
//! Stores grid preferences in `~/.config/tablegrid/grid.yaml`. Every field
//! has a default so partial files load cleanly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Tunables for layout, selection and gesture handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Width used for columns with no explicit width
    pub default_column_width: f64,
    /// Floor applied to every resize
    pub minimum_column_width: f64,
    /// Uniform height of every row
    pub row_height: f64,

    pub row_header_width: f64,
    pub column_header_height: f64,
    pub column_footer_height: f64,

    pub column_header_visible: bool,
    pub row_header_visible: bool,
    pub column_footer_visible: bool,

    /// When false, user extensions collapse to the target cell
    pub allows_multiple_selection: bool,
    /// Start editing on the first click instead of a double click
    pub single_click_cell_edit: bool,

    /// Pointer travel before a header press turns into a reorder
    pub drag_threshold: f64,
    /// Distance from a column boundary that still grabs it for resizing
    pub resize_grab_tolerance: f64,
    /// Hot zone at the right edge of a sortable column header
    pub sort_indicator_width: f64,

    /// Key for the persisted column width cache
    pub autosave_name: Option<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_column_width: 60.0,
            minimum_column_width: 20.0,
            row_height: 20.0,
            row_header_width: 40.0,
            column_header_height: 20.0,
            column_footer_height: 20.0,
            column_header_visible: true,
            row_header_visible: true,
            column_footer_visible: false,
            allows_multiple_selection: true,
            single_click_cell_edit: false,
            drag_threshold: 4.0,
            resize_grab_tolerance: 4.0,
            sort_indicator_width: 14.0,
            autosave_name: None,
        }
    }
}

impl GridConfig {
    /// Load config from the default location, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GridError::io(path, e))?;
        let config: GridConfig = serde_yaml::from_str(&content)?;
        Ok(config.sanitized())
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = crate::config_paths::config_file().ok_or(GridError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save config to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        crate::config_paths::ensure_parent_dir(path)?;
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| GridError::io(path, e))?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Replace negative or non-finite sizes with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fix = |value: &mut f64, fallback: f64| {
            if !value.is_finite() || *value < 0.0 {
                *value = fallback;
            }
        };
        fix(&mut self.minimum_column_width, defaults.minimum_column_width);
        fix(&mut self.default_column_width, defaults.default_column_width);
        fix(&mut self.row_header_width, defaults.row_header_width);
        fix(&mut self.column_header_height, defaults.column_header_height);
        fix(&mut self.column_footer_height, defaults.column_footer_height);
        fix(&mut self.drag_threshold, defaults.drag_threshold);
        fix(&mut self.resize_grab_tolerance, defaults.resize_grab_tolerance);
        fix(&mut self.sort_indicator_width, defaults.sort_indicator_width);
        if !self.row_height.is_finite() || self.row_height <= 0.0 {
            self.row_height = defaults.row_height;
        }
        self.default_column_width = self.default_column_width.max(self.minimum_column_width);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: GridConfig = serde_yaml::from_str("row_height: 24.0\n").unwrap();
        assert_eq!(config.row_height, 24.0);
        assert_eq!(config.minimum_column_width, 20.0);
        assert!(config.allows_multiple_selection);
    }

    #[test]
    fn test_sanitized_fixes_bad_values() {
        let config = GridConfig {
            row_height: 0.0,
            minimum_column_width: -5.0,
            default_column_width: 10.0,
            ..GridConfig::default()
        }
        .sanitized();
        assert_eq!(config.row_height, 20.0);
        assert_eq!(config.minimum_column_width, 20.0);
        assert_eq!(config.default_column_width, 20.0);
    }
}
