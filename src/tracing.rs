//! Tracing setup and selection diagnostics
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=tablegrid::drag=trace` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/tablegrid/logs/tablegrid.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.
//!
//! Hosts that install their own subscriber never call [`init`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::geometry::CellAddress;
use crate::selection::{SelectionState, StickyEdge};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`). The file layer always
/// logs at debug level.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "tablegrid.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    // A host may already own the global subscriber
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Lightweight snapshot of the selection for diffing
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot {
    pub column_count: usize,
    pub row_count: usize,
    pub columns: Option<(usize, usize)>,
    pub rows: Option<(usize, usize)>,
    pub anchor: CellAddress,
    pub sticky: StickyEdge,
}

impl SelectionSnapshot {
    pub fn from_selection(selection: &SelectionState) -> Self {
        let bounds = |first: Option<usize>, last: Option<usize>| first.zip(last);
        Self {
            column_count: selection.columns().len(),
            row_count: selection.rows().len(),
            columns: bounds(selection.columns().first(), selection.columns().last()),
            rows: bounds(selection.rows().first(), selection.rows().last()),
            anchor: selection.anchor(),
            sticky: selection.sticky(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &SelectionSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        if self.columns != other.columns || self.column_count != other.column_count {
            changes.push(format!(
                "columns: {} {:?} → {} {:?}",
                self.column_count, self.columns, other.column_count, other.columns
            ));
        }
        if self.rows != other.rows || self.row_count != other.row_count {
            changes.push(format!(
                "rows: {} {:?} → {} {:?}",
                self.row_count, self.rows, other.row_count, other.rows
            ));
        }
        if self.anchor != other.anchor {
            changes.push(format!(
                "anchor: ({},{}) → ({},{})",
                self.anchor.column, self.anchor.row, other.anchor.column, other.anchor.row
            ));
        }
        if self.sticky != other.sticky {
            changes.push(format!("sticky: {:?} → {:?}", self.sticky, other.sticky));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_reports_changes() {
        let mut selection = SelectionState::new();
        let before = SelectionSnapshot::from_selection(&selection);
        assert_eq!(before.diff(&before), None);

        selection.extend_to(CellAddress::new(2, 0));
        let after = SelectionSnapshot::from_selection(&selection);
        let diff = before.diff(&after).unwrap();
        assert!(diff.contains("columns: 1 Some((0, 0)) → 3 Some((0, 2))"));
        assert!(!diff.contains("anchor"));
    }
}
