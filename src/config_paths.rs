//! Centralized configuration paths for tablegrid
//!
//! All persisted files live under:
//! - Unix/macOS: `~/.config/tablegrid/`
//! - Windows: `%APPDATA%\tablegrid\`
//!
//! This module is the single source of truth for config paths.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::error::{GridError, Result};

const APP_DIR: &str = "tablegrid";

/// Base config directory for tablegrid
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/tablegrid`
///   - Else: `~/.config/tablegrid`
///
/// Windows:
///   - `%APPDATA%\tablegrid`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/tablegrid/grid.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("grid.yaml"))
}

/// `~/.config/tablegrid/column-widths/`
pub fn column_widths_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("column-widths"))
}

/// `~/.config/tablegrid/column-widths/<autosave name>.json`
///
/// Characters outside `[A-Za-z0-9._-]` in the name are replaced with `_`
/// so an autosave name can never escape the directory.
pub fn column_widths_file(autosave_name: &str) -> Option<PathBuf> {
    let file_name: String = autosave_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if file_name.is_empty() || file_name.chars().all(|c| c == '.') {
        return None;
    }
    column_widths_dir().map(|dir| dir.join(format!("{}.json", file_name)))
}

/// `~/.config/tablegrid/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| GridError::io(path, e))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().ok_or(GridError::NoConfigDir)?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = ensure_config_dir()?.join("logs");
    ensure_dir(&logs)?;
    Ok(logs)
}

/// Ensure the parent directory of a file exists
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
