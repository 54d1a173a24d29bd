//! Geometry/layout engine
//!
//! Two coordinate spaces are in play:
//!
//! - **content space**: origin at the top-left of cell (0, 0), unaffected
//!   by scrolling. `rect_of_column`, `rect_of_row`, `frame_of_cell` and the
//!   point lookups work here.
//! - **control space**: origin at the top-left of the whole control. The
//!   header bands, the footer band and the corners live here, and the
//!   content is drawn shifted by the header sizes and the scroll offset.
//!
//! Every lookup with an out-of-range index yields `Rect::ZERO` or `None`,
//! never a panic.

use std::ops::Range;

use crate::config::GridConfig;
use crate::geometry::{CellAddress, Point, Rect, Size};
use crate::widths::ColumnWidths;

/// Region of the control under a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    /// Top-left corner where the header bands meet
    Corner,
    ColumnHeader(usize),
    /// Within grab tolerance of the right edge of this column's header
    ColumnResizeHandle(usize),
    RowHeader(usize),
    ColumnFooter(usize),
    /// Bottom-left corner where the row header meets the footer band
    FooterCorner,
    Cell(CellAddress),
}

/// Scroll offset (content space) and size of the whole control
///
/// A zero size means unbounded: everything counts as visible.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub scroll: Point,
    pub size: Size,
}

#[derive(Debug, Clone)]
pub struct Layout {
    column_count: usize,
    row_count: usize,
    widths: ColumnWidths,
    /// Left edge of every column plus the total width, len = column_count + 1
    column_offsets: Vec<f64>,
    row_height: f64,

    row_header_width: f64,
    column_header_height: f64,
    column_footer_height: f64,
    column_header_visible: bool,
    row_header_visible: bool,
    column_footer_visible: bool,
    resize_grab_tolerance: f64,
    sort_indicator_width: f64,

    viewport: Viewport,
}

impl Layout {
    pub fn new(config: &GridConfig, column_count: usize, row_count: usize) -> Self {
        let mut layout = Self {
            column_count,
            row_count,
            widths: ColumnWidths::new(config.default_column_width, config.minimum_column_width),
            column_offsets: Vec::new(),
            row_height: config.row_height,
            row_header_width: config.row_header_width,
            column_header_height: config.column_header_height,
            column_footer_height: config.column_footer_height,
            column_header_visible: config.column_header_visible,
            row_header_visible: config.row_header_visible,
            column_footer_visible: config.column_footer_visible,
            resize_grab_tolerance: config.resize_grab_tolerance,
            sort_indicator_width: config.sort_indicator_width,
            viewport: Viewport::default(),
        };
        layout.rebuild_offsets();
        layout
    }

    fn rebuild_offsets(&mut self) {
        self.column_offsets.clear();
        self.column_offsets.reserve(self.column_count + 1);
        let mut x = 0.0;
        self.column_offsets.push(x);
        for column in 0..self.column_count {
            x += self.widths.get(column);
            self.column_offsets.push(x);
        }
    }

    // ========================================================================
    // Dimensions
    // ========================================================================

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn set_counts(&mut self, column_count: usize, row_count: usize) {
        self.column_count = column_count;
        self.row_count = row_count;
        self.rebuild_offsets();
    }

    fn is_empty(&self) -> bool {
        self.column_count == 0 || self.row_count == 0
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn widths(&self) -> &ColumnWidths {
        &self.widths
    }

    /// Mutate the width cache; offsets are rebuilt afterwards
    pub fn update_widths<R>(&mut self, f: impl FnOnce(&mut ColumnWidths) -> R) -> R {
        let result = f(&mut self.widths);
        self.rebuild_offsets();
        result
    }

    pub fn column_width(&self, column: usize) -> f64 {
        self.widths.get(column)
    }

    pub fn minimum_column_width(&self) -> f64 {
        self.widths.minimum_width()
    }

    /// Set an explicit width, clamped to the minimum; returns the stored width
    pub fn set_column_width(&mut self, column: usize, width: f64) -> f64 {
        self.update_widths(|w| w.set(column, width))
    }

    pub fn total_width(&self) -> f64 {
        self.column_offsets.last().copied().unwrap_or(0.0)
    }

    pub fn total_height(&self) -> f64 {
        self.row_count as f64 * self.row_height
    }

    pub fn content_size(&self) -> Size {
        if self.is_empty() {
            return Size::default();
        }
        Size::new(self.total_width(), self.total_height())
    }

    // ========================================================================
    // Content-space rects and point lookup
    // ========================================================================

    pub fn rect_of_column(&self, column: usize) -> Rect {
        if column >= self.column_count || self.is_empty() {
            return Rect::ZERO;
        }
        let x = self.column_offsets[column];
        Rect::new(x, 0.0, self.column_offsets[column + 1] - x, self.total_height())
    }

    pub fn rect_of_row(&self, row: usize) -> Rect {
        if row >= self.row_count || self.is_empty() {
            return Rect::ZERO;
        }
        Rect::new(
            0.0,
            row as f64 * self.row_height,
            self.total_width(),
            self.row_height,
        )
    }

    pub fn frame_of_cell(&self, column: usize, row: usize) -> Rect {
        self.rect_of_column(column)
            .intersection(&self.rect_of_row(row))
    }

    pub fn column_at_point(&self, p: Point) -> Option<usize> {
        if self.is_empty() || !p.x.is_finite() || p.x < 0.0 || p.x >= self.total_width() {
            return None;
        }
        // First offset strictly greater than x marks the column's right edge
        let right = self.column_offsets.partition_point(|&offset| offset <= p.x);
        right.checked_sub(1).filter(|&c| c < self.column_count)
    }

    pub fn row_at_point(&self, p: Point) -> Option<usize> {
        if self.is_empty() || !p.y.is_finite() || p.y < 0.0 {
            return None;
        }
        let row = (p.y / self.row_height).floor() as usize;
        (row < self.row_count).then_some(row)
    }

    pub fn cell_at_point(&self, p: Point) -> Option<CellAddress> {
        Some(CellAddress::new(self.column_at_point(p)?, self.row_at_point(p)?))
    }

    /// Grow or shrink a column by `distance`, never below the minimum width.
    ///
    /// Returns `distance - applied`: zero when the whole distance was applied,
    /// negative when a shrink hit the floor.
    pub fn resize_column(&mut self, column: usize, distance: f64) -> f64 {
        if column >= self.column_count || !distance.is_finite() {
            return distance;
        }
        let old = self.widths.get(column);
        let new = self.set_column_width(column, old + distance);
        distance - (new - old)
    }

    /// Insertion index for a drag: how many columns have their midpoint
    /// before `x` (content space). Ranges over `0..=column_count`.
    pub fn column_insertion_index(&self, x: f64) -> usize {
        let mut lo = 0;
        let mut hi = self.column_count;
        while lo < hi {
            let mid = (lo + hi) / 2;
            let midpoint = (self.column_offsets[mid] + self.column_offsets[mid + 1]) / 2.0;
            if midpoint < x {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Insertion index for a row drag, same rule as columns
    pub fn row_insertion_index(&self, y: f64) -> usize {
        let t = y / self.row_height - 0.5;
        if t <= 0.0 {
            return 0;
        }
        (t.ceil() as usize).min(self.row_count)
    }

    // ========================================================================
    // Viewport
    // ========================================================================

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport.size = size;
        self.clamp_scroll();
    }

    /// Non-finite components leave that axis where it is
    pub fn set_scroll(&mut self, scroll: Point) {
        if scroll.x.is_finite() {
            self.viewport.scroll.x = scroll.x;
        }
        if scroll.y.is_finite() {
            self.viewport.scroll.y = scroll.y;
        }
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let visible = self.visible_content_rect();
        let max_x = (self.total_width() - visible.width).max(0.0);
        let max_y = (self.total_height() - visible.height).max(0.0);
        self.viewport.scroll.x = self.viewport.scroll.x.clamp(0.0, max_x);
        self.viewport.scroll.y = self.viewport.scroll.y.clamp(0.0, max_y);
    }

    /// Top-left of the content area in control space
    pub fn content_origin(&self) -> Point {
        Point::new(
            if self.row_header_visible {
                self.row_header_width
            } else {
                0.0
            },
            if self.column_header_visible {
                self.column_header_height
            } else {
                0.0
            },
        )
    }

    fn footer_height(&self) -> f64 {
        if self.column_footer_visible {
            self.column_footer_height
        } else {
            0.0
        }
    }

    /// Height of the content band between the header and footer bands
    fn content_band_height(&self) -> f64 {
        if self.viewport.size.height > 0.0 {
            (self.viewport.size.height - self.content_origin().y - self.footer_height()).max(0.0)
        } else {
            self.total_height()
        }
    }

    fn content_band_width(&self) -> f64 {
        if self.viewport.size.width > 0.0 {
            (self.viewport.size.width - self.content_origin().x).max(0.0)
        } else {
            self.total_width()
        }
    }

    /// Visible part of the content, in content space
    pub fn visible_content_rect(&self) -> Rect {
        Rect::new(
            self.viewport.scroll.x,
            self.viewport.scroll.y,
            self.content_band_width(),
            self.content_band_height(),
        )
    }

    /// Rows intersecting the visible content rect
    pub fn visible_rows(&self) -> Range<usize> {
        if self.is_empty() {
            return 0..0;
        }
        let visible = self.visible_content_rect();
        let first = (visible.y / self.row_height).floor().max(0.0) as usize;
        let last = (visible.max_y() / self.row_height).ceil().max(0.0) as usize;
        first.min(self.row_count)..last.min(self.row_count)
    }

    /// Columns intersecting the visible content rect
    pub fn visible_columns(&self) -> Range<usize> {
        if self.is_empty() {
            return 0..0;
        }
        let visible = self.visible_content_rect();
        let first = self.column_offsets[1..].partition_point(|&right| right <= visible.x);
        let last = self.column_offsets[..self.column_count].partition_point(|&left| left < visible.max_x());
        first.min(last)..last
    }

    /// Scroll the minimum distance that brings a cell fully into view
    pub fn scroll_to_cell(&mut self, column: usize, row: usize) {
        let frame = self.frame_of_cell(column, row);
        if frame.is_empty() {
            return;
        }
        let visible = self.visible_content_rect();
        let mut scroll = self.viewport.scroll;

        if frame.x < visible.x {
            scroll.x = frame.x;
        } else if frame.max_x() > visible.max_x() && visible.width > 0.0 {
            scroll.x = frame.max_x() - visible.width;
        }

        if frame.y < visible.y {
            scroll.y = frame.y;
        } else if frame.max_y() > visible.max_y() && visible.height > 0.0 {
            scroll.y = frame.max_y() - visible.height;
        }

        self.set_scroll(scroll);
    }

    /// Convert a control-space point to content space
    pub fn to_content(&self, p: Point) -> Point {
        let origin = self.content_origin();
        Point::new(
            p.x - origin.x + self.viewport.scroll.x,
            p.y - origin.y + self.viewport.scroll.y,
        )
    }

    /// Convert a content-space rect to control space
    pub fn to_control(&self, r: Rect) -> Rect {
        let origin = self.content_origin();
        r.offset(
            origin.x - self.viewport.scroll.x,
            origin.y - self.viewport.scroll.y,
        )
    }

    // ========================================================================
    // Chrome rects (control space)
    // ========================================================================

    pub fn header_rect_of_column(&self, column: usize) -> Rect {
        if !self.column_header_visible || column >= self.column_count {
            return Rect::ZERO;
        }
        let origin = self.content_origin();
        let x = self.column_offsets[column];
        Rect::new(
            origin.x + x - self.viewport.scroll.x,
            0.0,
            self.column_offsets[column + 1] - x,
            self.column_header_height,
        )
    }

    pub fn header_rect_of_row(&self, row: usize) -> Rect {
        if !self.row_header_visible || row >= self.row_count {
            return Rect::ZERO;
        }
        let origin = self.content_origin();
        Rect::new(
            0.0,
            origin.y + row as f64 * self.row_height - self.viewport.scroll.y,
            self.row_header_width,
            self.row_height,
        )
    }

    pub fn header_rect_of_corner(&self) -> Rect {
        if !self.column_header_visible || !self.row_header_visible {
            return Rect::ZERO;
        }
        Rect::new(0.0, 0.0, self.row_header_width, self.column_header_height)
    }

    fn footer_y(&self) -> f64 {
        self.content_origin().y + self.content_band_height()
    }

    pub fn footer_rect_of_column(&self, column: usize) -> Rect {
        if !self.column_footer_visible || column >= self.column_count {
            return Rect::ZERO;
        }
        let origin = self.content_origin();
        let x = self.column_offsets[column];
        Rect::new(
            origin.x + x - self.viewport.scroll.x,
            self.footer_y(),
            self.column_offsets[column + 1] - x,
            self.column_footer_height,
        )
    }

    pub fn footer_rect_of_corner(&self) -> Rect {
        if !self.column_footer_visible || !self.row_header_visible {
            return Rect::ZERO;
        }
        Rect::new(
            0.0,
            self.footer_y(),
            self.row_header_width,
            self.column_footer_height,
        )
    }

    /// True when a control-space point lies in the sort hot zone of a header
    pub fn in_sort_zone(&self, column: usize, p: Point) -> bool {
        let header = self.header_rect_of_column(column);
        if header.is_empty() {
            return false;
        }
        let zone_width = self.sort_indicator_width.min(header.width);
        let zone = Rect::new(header.max_x() - zone_width, header.y, zone_width, header.height);
        zone.contains(p)
    }

    // ========================================================================
    // Hit-testing (control space)
    // ========================================================================

    /// Which part of the control is under `p`, or `None` for dead space
    pub fn hit_test(&self, p: Point) -> Option<HitRegion> {
        let origin = self.content_origin();
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        if self.viewport.size.width > 0.0 && p.x >= self.viewport.size.width {
            return None;
        }

        let content = self.to_content(p);

        // Column header band
        if p.y < origin.y {
            if p.x < origin.x {
                return Some(HitRegion::Corner);
            }
            if let Some(column) = self.resize_handle_at(content.x) {
                return Some(HitRegion::ColumnResizeHandle(column));
            }
            return self
                .column_at_point(Point::new(content.x, 0.0))
                .map(HitRegion::ColumnHeader);
        }

        // Footer band
        let footer_y = self.footer_y();
        if self.column_footer_visible && p.y >= footer_y {
            if p.y >= footer_y + self.column_footer_height {
                return None;
            }
            if p.x < origin.x {
                return Some(HitRegion::FooterCorner);
            }
            return self
                .column_at_point(Point::new(content.x, 0.0))
                .map(HitRegion::ColumnFooter);
        }

        // Row header band
        if p.x < origin.x {
            return self
                .row_at_point(Point::new(0.0, content.y))
                .map(HitRegion::RowHeader);
        }

        self.cell_at_point(content).map(HitRegion::Cell)
    }

    /// Column whose right boundary is within grab tolerance of `x`
    fn resize_handle_at(&self, x: f64) -> Option<usize> {
        if self.column_count == 0 {
            return None;
        }
        let boundary = self.column_offsets[1..].partition_point(|&right| right < x);
        [boundary.checked_sub(1), Some(boundary)]
            .into_iter()
            .flatten()
            .filter(|&c| c < self.column_count)
            .find(|&c| (self.column_offsets[c + 1] - x).abs() <= self.resize_grab_tolerance)
    }
}
