//! Virtual text adapter for find/replace
//!
//! A range-based find/replace component only understands one linear
//! string. [`VirtualText`] presents the visited cells as that string
//! without materializing it: cells are visited in row-major order and
//! every cell's text is followed by one [`CELL_SEPARATOR`], so the length
//! is `Σ (chars(cell) + 1)`. Only per-row prefix sums are cached; mapping
//! an offset to a cell walks the columns of one row.
//!
//! [`TextFinderClient`] is the stateful side: it caches the virtual text
//! for one grid generation, stages replacements per cell and writes them
//! back with a single bulk call.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::data_source::{display_text, Capabilities, CellBatch, DataSource};
use crate::geometry::{CellAddress, Rect};
use crate::grid::TableGrid;

/// Synthetic character that ends every cell in the virtual text
pub const CELL_SEPARATOR: char = '\u{001F}';

/// Which cells the virtual text visits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
    #[default]
    WholeGrid,
    /// Only the selected columns × rows
    Selection,
}

/// A linear offset resolved to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLocation {
    pub address: CellAddress,
    /// Char offset inside the cell text; equal to the text length when the
    /// offset points at the cell's separator
    pub offset: usize,
}

fn cell_text<D: DataSource + ?Sized>(source: &D, column: usize, row: usize) -> String {
    display_text(source.value_at(column, row).as_ref())
}

fn cell_len<D: DataSource + ?Sized>(source: &D, column: usize, row: usize) -> usize {
    cell_text(source, column, row).chars().count()
}

/// Offset mapping for one snapshot of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualText {
    columns: Vec<usize>,
    rows: Vec<usize>,
    /// Offset where each visited row starts, plus the total length
    row_starts: Vec<usize>,
    counts: (usize, usize),
}

impl VirtualText {
    /// Index the visited cells. Indexes beyond the source's counts are skipped.
    pub fn build<D: DataSource + ?Sized>(
        source: &D,
        columns: impl IntoIterator<Item = usize>,
        rows: impl IntoIterator<Item = usize>,
    ) -> Self {
        let counts = (source.column_count(), source.row_count());
        let columns: Vec<usize> = columns.into_iter().filter(|&c| c < counts.0).collect();
        let rows: Vec<usize> = rows.into_iter().filter(|&r| r < counts.1).collect();

        let mut row_starts = Vec::with_capacity(rows.len() + 1);
        let mut offset = 0;
        row_starts.push(offset);
        for &row in &rows {
            for &column in &columns {
                offset += cell_len(source, column, row) + 1;
            }
            row_starts.push(offset);
        }

        tracing::trace!(
            columns = columns.len(),
            rows = rows.len(),
            len = offset,
            "built virtual text"
        );

        Self {
            columns,
            rows,
            row_starts,
            counts,
        }
    }

    pub fn len(&self) -> usize {
        self.row_starts.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Still describes a source with these dimensions
    pub fn is_valid_for<D: DataSource + ?Sized>(&self, source: &D) -> bool {
        self.counts == (source.column_count(), source.row_count())
    }

    /// Position of visited row `row` in the row list
    fn row_position(&self, row: usize) -> Option<usize> {
        self.rows.binary_search(&row).ok()
    }

    /// Offset range of a visited row, separators included
    pub fn row_range(&self, row: usize) -> Option<Range<usize>> {
        let i = self.row_position(row)?;
        Some(self.row_starts[i]..self.row_starts[i + 1])
    }

    /// Cell and in-cell offset for a linear offset; `None` at or past the end
    pub fn location_of<D: DataSource + ?Sized>(
        &self,
        source: &D,
        offset: usize,
    ) -> Option<TextLocation> {
        if offset >= self.len() {
            return None;
        }
        let i = self.row_starts.partition_point(|&start| start <= offset) - 1;
        let row = self.rows[i];
        let mut start = self.row_starts[i];
        for &column in &self.columns {
            let len = cell_len(source, column, row);
            if offset <= start + len {
                return Some(TextLocation {
                    address: CellAddress::new(column, row),
                    offset: offset - start,
                });
            }
            start += len + 1;
        }
        None
    }

    /// Offset where a visited cell's text starts
    pub fn cell_start<D: DataSource + ?Sized>(
        &self,
        source: &D,
        address: CellAddress,
    ) -> Option<usize> {
        let i = self.row_position(address.row)?;
        let mut start = self.row_starts[i];
        for &column in &self.columns {
            if column == address.column {
                return Some(start);
            }
            start += cell_len(source, column, address.row) + 1;
        }
        None
    }

    /// Linear offset of a cell location; the inverse of `location_of`
    pub fn offset_of<D: DataSource + ?Sized>(
        &self,
        source: &D,
        location: TextLocation,
    ) -> Option<usize> {
        let start = self.cell_start(source, location.address)?;
        let len = cell_len(source, location.address.column, location.address.row);
        (location.offset <= len).then_some(start + location.offset)
    }

    /// Offset range of a cell's text, separator excluded
    pub fn cell_range<D: DataSource + ?Sized>(
        &self,
        source: &D,
        address: CellAddress,
    ) -> Option<Range<usize>> {
        let start = self.cell_start(source, address)?;
        Some(start..start + cell_len(source, address.column, address.row))
    }

    /// Resolve a range that lies within one cell's text to that cell and
    /// an in-cell char range
    pub fn resolve_range<D: DataSource + ?Sized>(
        &self,
        source: &D,
        range: &Range<usize>,
    ) -> Option<(CellAddress, Range<usize>)> {
        let start = self.location_of(source, range.start)?;
        let len = cell_len(source, start.address.column, start.address.row);
        let end = start.offset + range.len();
        (range.start <= range.end && end <= len).then_some((start.address, start.offset..end))
    }
}

/// Char ranges of non-overlapping matches of `needle` in `haystack`
pub fn find_in_text(haystack: &str, needle: &str, case_sensitive: bool) -> Vec<Range<usize>> {
    if needle.is_empty() {
        return Vec::new();
    }
    let fold = |c: char| -> char {
        if case_sensitive {
            return c;
        }
        // Keep offsets stable: only 1:1 case mappings are folded
        let mut lower = c.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(l), None) => l,
            _ => c,
        }
    };
    let hay: Vec<char> = haystack.chars().map(fold).collect();
    let pat: Vec<char> = needle.chars().map(fold).collect();

    let mut results = Vec::new();
    let mut i = 0;
    while i + pat.len() <= hay.len() {
        if hay[i..i + pat.len()] == pat[..] {
            results.push(i..i + pat.len());
            i += pat.len();
        } else {
            i += 1;
        }
    }
    results
}

/// Replace the char range `range` of `text`
fn splice_chars(text: &str, range: &Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.extend(text.chars().take(range.start));
    out.push_str(replacement);
    out.extend(text.chars().skip(range.end));
    out
}

/// One chunk handed to the find component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Cell text followed by the separator
    pub text: String,
    pub range: Range<usize>,
    /// Matches never span cells
    pub ends_with_search_boundary: bool,
}

/// Edits staged against one cell's snapshot text
type CellEdits = Vec<(Range<usize>, String)>;

#[derive(Debug, Default)]
pub struct TextFinderClient {
    scope: SearchScope,
    text: Option<VirtualText>,
    /// Grid generation the cached text was built for
    generation: (u64, u64),
    /// row → column → staged edits
    pending: BTreeMap<usize, BTreeMap<usize, CellEdits>>,
    selected: Option<Range<usize>>,
}

impl TextFinderClient {
    pub fn new(scope: SearchScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    pub fn set_scope(&mut self, scope: SearchScope) {
        if self.scope != scope {
            self.scope = scope;
            self.invalidate();
        }
    }

    /// Drop the cached text and anything staged against it
    pub fn invalidate(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(cells = self.pending_cell_count(), "discarding stale replacements");
        }
        self.text = None;
        self.pending.clear();
        self.selected = None;
    }

    fn current_generation<D: DataSource>(&self, grid: &TableGrid<D>) -> (u64, u64) {
        match self.scope {
            SearchScope::WholeGrid => (grid.data_generation(), 0),
            SearchScope::Selection => (grid.data_generation(), grid.selection_generation()),
        }
    }

    /// The virtual text for the grid's current state, rebuilt when stale
    pub fn text<D: DataSource>(&mut self, grid: &TableGrid<D>) -> &VirtualText {
        let generation = self.current_generation(grid);
        let stale = match &self.text {
            Some(text) => self.generation != generation || !text.is_valid_for(grid.data_source()),
            None => true,
        };
        if stale {
            self.invalidate();
            self.generation = generation;
        }
        let scope = self.scope;
        self.text.get_or_insert_with(|| {
            let source = grid.data_source();
            match scope {
                SearchScope::WholeGrid => VirtualText::build(
                    source,
                    0..source.column_count(),
                    0..source.row_count(),
                ),
                SearchScope::Selection => VirtualText::build(
                    source,
                    grid.selection().columns().iter(),
                    grid.selection().rows().iter(),
                ),
            }
        })
    }

    pub fn string_length<D: DataSource>(&mut self, grid: &TableGrid<D>) -> usize {
        self.text(grid).len()
    }

    /// The cell chunk containing `offset`
    pub fn string_at<D: DataSource>(
        &mut self,
        grid: &TableGrid<D>,
        offset: usize,
    ) -> Option<TextChunk> {
        let source = grid.data_source();
        let text = self.text(grid);
        let location = text.location_of(source, offset)?;
        let range = text.cell_range(source, location.address)?;
        let mut chunk = cell_text(source, location.address.column, location.address.row);
        chunk.push(CELL_SEPARATOR);
        Some(TextChunk {
            text: chunk,
            range: range.start..range.end + 1,
            ends_with_search_boundary: true,
        })
    }

    /// Replacement needs the bulk setter
    pub fn is_editable<D: DataSource>(&self, grid: &TableGrid<D>) -> bool {
        grid.capabilities().contains(Capabilities::SET_VALUE_BULK)
    }

    /// Every range must be replaceable: editable grid, each range inside
    /// one cell's text
    pub fn should_replace<D: DataSource>(
        &mut self,
        grid: &TableGrid<D>,
        ranges: &[Range<usize>],
    ) -> bool {
        if !self.is_editable(grid) {
            return false;
        }
        let source = grid.data_source();
        let text = self.text(grid);
        ranges
            .iter()
            .all(|range| text.resolve_range(source, range).is_some())
    }

    /// Stage a replacement. Ranges are in the coordinates of the text as
    /// it was before any staged replacement, so callers may stage in any
    /// order; overlapping edits in one cell are refused.
    pub fn replace_characters<D: DataSource>(
        &mut self,
        grid: &TableGrid<D>,
        range: Range<usize>,
        replacement: &str,
    ) -> bool {
        if !self.is_editable(grid) {
            tracing::debug!("replace refused: data source has no bulk setter");
            return false;
        }
        let source = grid.data_source();
        let Some((address, local)) = self.text(grid).resolve_range(source, &range) else {
            tracing::debug!(?range, "replace refused: range does not lie in one cell");
            return false;
        };
        self.stage(address, local, replacement)
    }

    fn stage(&mut self, address: CellAddress, local: Range<usize>, replacement: &str) -> bool {
        let edits = self
            .pending
            .entry(address.row)
            .or_default()
            .entry(address.column)
            .or_default();
        let overlaps = edits.iter().any(|(existing, _)| {
            (local.start < existing.end && existing.start < local.end)
                || ((local.is_empty() || existing.is_empty()) && local.start == existing.start)
        });
        if overlaps {
            return false;
        }
        edits.push((local, replacement.to_string()));
        true
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_cell_count(&self) -> usize {
        self.pending.values().map(BTreeMap::len).sum()
    }

    /// Write every staged replacement back with one bulk call.
    ///
    /// Cells whose text ends up unchanged are skipped; if nothing changed
    /// the data source is not called at all. Returns the number of cells
    /// written.
    pub fn did_replace_characters<D: DataSource>(&mut self, grid: &mut TableGrid<D>) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        if self.current_generation(grid) != self.generation {
            self.invalidate();
            return 0;
        }

        let pending = std::mem::take(&mut self.pending);
        let source = grid.data_source();
        let mut batch = CellBatch::new();
        for (row, columns) in pending {
            for (column, mut edits) in columns {
                let original = cell_text(source, column, row);
                // Back to front so earlier ranges stay valid
                edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
                let updated = edits
                    .iter()
                    .fold(original.clone(), |text, (range, replacement)| {
                        splice_chars(&text, range, replacement)
                    });
                if updated == original {
                    continue;
                }
                let value = if updated.is_empty() {
                    None
                } else {
                    Some(source.value_from_text(column, row, &updated))
                };
                batch.entry(row).or_default().insert(column, value);
            }
        }

        let written = batch.values().map(BTreeMap::len).sum();
        if written > 0 {
            grid.apply_batch(&batch);
        }
        self.invalidate();
        written
    }

    /// Every match of `needle` in the visited cells, as linear ranges
    pub fn find_all<D: DataSource>(
        &mut self,
        grid: &TableGrid<D>,
        needle: &str,
        case_sensitive: bool,
    ) -> Vec<Range<usize>> {
        let source = grid.data_source();
        let text = self.text(grid);
        let mut results = Vec::new();
        for (i, &row) in text.rows.iter().enumerate() {
            let mut start = text.row_starts[i];
            for &column in &text.columns {
                let cell = cell_text(source, column, row);
                for m in find_in_text(&cell, needle, case_sensitive) {
                    results.push(start + m.start..start + m.end);
                }
                start += cell.chars().count() + 1;
            }
        }
        results
    }

    /// Linear ranges covering the rows currently on screen
    pub fn visible_character_ranges<D: DataSource>(
        &mut self,
        grid: &TableGrid<D>,
    ) -> Vec<Range<usize>> {
        let visible = grid.layout().visible_rows();
        let text = self.text(grid);
        let covered: Vec<Range<usize>> = text
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| visible.contains(row))
            .map(|(i, _)| text.row_starts[i]..text.row_starts[i + 1])
            .collect();

        // Visited rows are sorted, so the visible ones are adjacent
        match (covered.first(), covered.last()) {
            (Some(first), Some(last)) => vec![first.start..last.end],
            _ => Vec::new(),
        }
    }

    /// Control-space frames of every cell a range touches
    pub fn rects_for_range<D: DataSource>(
        &mut self,
        grid: &TableGrid<D>,
        range: Range<usize>,
    ) -> Vec<Rect> {
        let source = grid.data_source();
        let layout = grid.layout();
        let text = self.text(grid);
        let Some(first) = text.location_of(source, range.start) else {
            return Vec::new();
        };
        let last = text
            .location_of(source, range.end.saturating_sub(1).max(range.start))
            .unwrap_or(first);

        let mut rects = Vec::new();
        let mut offset = range.start;
        let mut address = first.address;
        loop {
            rects.push(layout.to_control(layout.frame_of_cell(address.column, address.row)));
            if address == last.address {
                break;
            }
            let Some(cell) = text.cell_range(source, address) else {
                break;
            };
            offset = offset.max(cell.end + 1);
            match text.location_of(source, offset) {
                Some(next) => address = next.address,
                None => break,
            }
        }
        rects
    }

    pub fn first_selected_range(&self) -> Option<Range<usize>> {
        self.selected.clone()
    }

    /// The find component selected a match: scroll to its cell, and in
    /// whole-grid scope select that cell.
    ///
    /// In selection scope the grid selection defines the searched cells,
    /// so it is left alone.
    pub fn set_selected_range<D: DataSource>(
        &mut self,
        grid: &mut TableGrid<D>,
        range: Range<usize>,
    ) -> bool {
        let location = {
            let source = grid.data_source();
            self.text(grid).location_of(source, range.start)
        };
        let Some(location) = location else {
            return false;
        };
        if self.scope == SearchScope::WholeGrid {
            grid.select_cell(location.address);
        }
        grid.scroll_to_cell(location.address);
        self.selected = Some(range);
        true
    }
}

/// Progress of a batched replace-all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceProgress {
    /// More rows remain; call `run_batch` again after yielding
    Pending { staged: usize },
    /// Everything was written in one bulk call
    Done { replaced: usize, cells: usize },
    /// The grid changed between batches or cannot be edited; nothing was written
    Aborted,
}

/// Replace-all over the visited cells, staged in row batches so the host
/// can yield to its event loop between them
#[derive(Debug, Clone)]
pub struct ReplaceAllJob {
    needle: String,
    replacement: String,
    case_sensitive: bool,
    next_row: usize,
    staged: usize,
    /// Grid generation seen by the first batch
    started_at: Option<(u64, u64)>,
}

impl ReplaceAllJob {
    pub fn new(needle: impl Into<String>, replacement: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            needle: needle.into(),
            replacement: replacement.into(),
            case_sensitive,
            next_row: 0,
            staged: 0,
            started_at: None,
        }
    }

    pub fn run_batch<D: DataSource>(
        &mut self,
        client: &mut TextFinderClient,
        grid: &mut TableGrid<D>,
        rows_per_batch: usize,
    ) -> ReplaceProgress {
        if !client.is_editable(grid) {
            return ReplaceProgress::Aborted;
        }
        let generation = client.current_generation(grid);
        match self.started_at {
            Some(started) if started != generation => {
                tracing::debug!("replace-all aborted: grid changed between batches");
                client.invalidate();
                return ReplaceProgress::Aborted;
            }
            Some(_) => {}
            None => self.started_at = Some(generation),
        }

        let (rows, columns, total_rows) = {
            let text = client.text(grid);
            let end = (self.next_row + rows_per_batch.max(1)).min(text.rows.len());
            (
                text.rows[self.next_row..end].to_vec(),
                text.columns.clone(),
                text.rows.len(),
            )
        };

        let source = grid.data_source();
        for &row in &rows {
            for &column in &columns {
                let cell = cell_text(source, column, row);
                for m in find_in_text(&cell, &self.needle, self.case_sensitive) {
                    if client.stage(CellAddress::new(column, row), m, &self.replacement) {
                        self.staged += 1;
                    }
                }
            }
        }
        self.next_row += rows.len();

        if self.next_row < total_rows {
            return ReplaceProgress::Pending {
                staged: self.staged,
            };
        }
        let cells = client.did_replace_characters(grid);
        tracing::debug!(replaced = self.staged, cells, "replace-all finished");
        ReplaceProgress::Done {
            replaced: self.staged,
            cells,
        }
    }

    /// Run every batch back to back
    pub fn run_to_end<D: DataSource>(
        mut self,
        client: &mut TextFinderClient,
        grid: &mut TableGrid<D>,
    ) -> ReplaceProgress {
        loop {
            match self.run_batch(client, grid, 256) {
                ReplaceProgress::Pending { .. } => continue,
                done => return done,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDataSource;

    fn source() -> MemoryDataSource {
        MemoryDataSource::from_rows(vec![
            vec!["ab", "", "cde"],
            vec!["f", "gh", "i"],
        ])
    }

    #[test]
    fn test_length_counts_separators() {
        let s = source();
        let text = VirtualText::build(&s, 0..3, 0..2);
        // (2+1)+(0+1)+(3+1) + (1+1)+(2+1)+(1+1)
        assert_eq!(text.len(), 15);
        assert_eq!(text.row_range(1), Some(8..15));
    }

    #[test]
    fn test_location_of() {
        let s = source();
        let text = VirtualText::build(&s, 0..3, 0..2);
        let at = |offset| text.location_of(&s, offset).map(|l| (l.address, l.offset));
        assert_eq!(at(0), Some((CellAddress::new(0, 0), 0)));
        assert_eq!(at(2), Some((CellAddress::new(0, 0), 2)));
        assert_eq!(at(3), Some((CellAddress::new(1, 0), 0)));
        assert_eq!(at(4), Some((CellAddress::new(2, 0), 0)));
        assert_eq!(at(9), Some((CellAddress::new(0, 1), 1)));
        assert_eq!(at(14), Some((CellAddress::new(2, 1), 1)));
        assert_eq!(at(15), None);
    }

    #[test]
    fn test_offset_of_inverts_location_of() {
        let s = source();
        let text = VirtualText::build(&s, 0..3, 0..2);
        for offset in 0..text.len() {
            let location = text.location_of(&s, offset).unwrap();
            assert_eq!(text.offset_of(&s, location), Some(offset));
        }
    }

    #[test]
    fn test_scope_subset() {
        let s = source();
        let text = VirtualText::build(&s, [2], [1]);
        assert_eq!(text.len(), 2);
        assert_eq!(text.cell_range(&s, CellAddress::new(2, 1)), Some(0..1));
        assert_eq!(text.cell_range(&s, CellAddress::new(0, 1)), None);
    }

    #[test]
    fn test_resolve_range_stays_in_cell() {
        let s = source();
        let text = VirtualText::build(&s, 0..3, 0..2);
        assert_eq!(
            text.resolve_range(&s, &(5..7)),
            Some((CellAddress::new(2, 0), 1..3))
        );
        assert_eq!(text.resolve_range(&s, &(1..4)), None);
    }

    #[test]
    fn test_find_in_text() {
        assert_eq!(find_in_text("aaaa", "aa", true), vec![0..2, 2..4]);
        assert_eq!(find_in_text("Straße STRASSE", "straße", false), vec![0..6]);
        assert_eq!(find_in_text("ÉÉ", "é", false), vec![0..1, 1..2]);
        assert!(find_in_text("abc", "", true).is_empty());
        assert!(find_in_text("abc", "B", true).is_empty());
    }

    #[test]
    fn test_splice_chars() {
        assert_eq!(splice_chars("héllo", &(1..2), "e"), "hello");
        assert_eq!(splice_chars("abc", &(3..3), "d"), "abcd");
    }
}
