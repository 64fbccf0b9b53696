//! List layout modes and the fixed-size grid used by virtual lists.

use std::ops::Range;

use crate::geometry::{Axis, Point, Rect, Size};
use crate::scroll::ScrollType;

/// How list items are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListLayout {
    /// One item per row, top to bottom.
    #[default]
    SingleColumn,
    /// One item per column, left to right.
    SingleRow,
    /// Rows filled left to right, wrapping downward.
    FlowHorizontal,
    /// Columns filled top to bottom, wrapping rightward.
    FlowVertical,
    /// View-sized pages laid side by side, each filled row by row.
    Pagination,
}

impl ListLayout {
    /// The axis lines advance along.
    pub fn scroll_axis(self) -> Axis {
        match self {
            ListLayout::SingleColumn | ListLayout::FlowHorizontal => Axis::Y,
            ListLayout::SingleRow | ListLayout::FlowVertical | ListLayout::Pagination => Axis::X,
        }
    }

    /// The natural scroll direction for a pane over this layout.
    pub fn scroll_type(self) -> ScrollType {
        match self.scroll_axis() {
            Axis::X => ScrollType::Horizontal,
            Axis::Y => ScrollType::Vertical,
        }
    }
}

/// Geometry of a virtual list whose items all share one size.
///
/// A "line" is a row for vertically scrolling layouts and a column for
/// horizontal ones; `per_line` items sit on each line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualGrid {
    pub layout: ListLayout,
    pub item_size: Size,
    pub line_gap: f32,
    pub column_gap: f32,
    pub view_size: Size,
    /// Items per line.
    pub per_line: usize,
    /// Lines per page (pagination only).
    pub lines_per_page: usize,
    /// Number of laid-out items, loop copies included.
    pub count: usize,
}

impl VirtualGrid {
    /// Derive per-line counts from fixed column/line counts, or from how
    /// many items fit in the view when those are zero.
    pub fn new(
        layout: ListLayout,
        item_size: Size,
        gaps: (f32, f32),
        counts: (usize, usize),
        view_size: Size,
        count: usize,
    ) -> Self {
        let (line_gap, column_gap) = gaps;
        let (column_count, line_count) = counts;
        let fit = |fixed: usize, view: f32, item: f32, gap: f32| -> usize {
            if fixed > 0 {
                fixed
            } else if item + gap <= 0.0 {
                1
            } else {
                (((view + gap) / (item + gap)).floor() as usize).max(1)
            }
        };
        let (per_line, lines_per_page) = match layout {
            ListLayout::SingleColumn | ListLayout::SingleRow => (1, 1),
            ListLayout::FlowHorizontal => (fit(column_count, view_size.width, item_size.width, column_gap), 1),
            ListLayout::FlowVertical => (fit(line_count, view_size.height, item_size.height, line_gap), 1),
            ListLayout::Pagination => (
                fit(column_count, view_size.width, item_size.width, column_gap),
                fit(line_count, view_size.height, item_size.height, line_gap),
            ),
        };
        Self {
            layout,
            item_size,
            line_gap,
            column_gap,
            view_size,
            per_line,
            lines_per_page,
            count,
        }
    }

    fn per_page(&self) -> usize {
        self.per_line * self.lines_per_page
    }

    pub fn line_count(&self) -> usize {
        self.count.div_ceil(self.per_line)
    }

    pub fn page_count(&self) -> usize {
        self.count.div_ceil(self.per_page())
    }

    /// Distance between consecutive lines along the scroll axis.
    pub fn line_extent(&self) -> f32 {
        match self.layout.scroll_axis() {
            Axis::Y => self.item_size.height + self.line_gap,
            Axis::X => self.item_size.width + self.column_gap,
        }
    }

    pub fn item_rect(&self, index: usize) -> Rect {
        let (w, h) = (self.item_size.width, self.item_size.height);
        let step_x = w + self.column_gap;
        let step_y = h + self.line_gap;
        let origin = match self.layout {
            ListLayout::SingleColumn => Point::new(0.0, index as f32 * step_y),
            ListLayout::SingleRow => Point::new(index as f32 * step_x, 0.0),
            ListLayout::FlowHorizontal => {
                let (line, col) = (index / self.per_line, index % self.per_line);
                Point::new(col as f32 * step_x, line as f32 * step_y)
            }
            ListLayout::FlowVertical => {
                let (line, row) = (index / self.per_line, index % self.per_line);
                Point::new(line as f32 * step_x, row as f32 * step_y)
            }
            ListLayout::Pagination => {
                let (page, k) = (index / self.per_page(), index % self.per_page());
                let (row, col) = (k / self.per_line, k % self.per_line);
                Point::new(
                    page as f32 * self.view_size.width + col as f32 * step_x,
                    row as f32 * step_y,
                )
            }
        };
        Rect::new(origin.x, origin.y, w, h)
    }

    pub fn content_size(&self) -> Size {
        if self.count == 0 {
            return Size::ZERO;
        }
        let span = |n: usize, item: f32, gap: f32| n as f32 * item + n.saturating_sub(1) as f32 * gap;
        let (w, h) = (self.item_size.width, self.item_size.height);
        let across = self.per_line.min(self.count);
        match self.layout {
            ListLayout::SingleColumn | ListLayout::FlowHorizontal => Size::new(
                span(across, w, self.column_gap),
                span(self.line_count(), h, self.line_gap),
            ),
            ListLayout::SingleRow | ListLayout::FlowVertical => Size::new(
                span(self.line_count(), w, self.column_gap),
                span(across, h, self.line_gap),
            ),
            ListLayout::Pagination => Size::new(
                self.page_count() as f32 * self.view_size.width,
                self.view_size.height,
            ),
        }
    }

    /// Indices of the lines intersecting the view at `scroll`, plus
    /// `lookahead` lines (pages, for pagination) past the end.
    pub fn visible_range(&self, scroll: Point, lookahead: usize) -> Range<usize> {
        if self.count == 0 {
            return 0..0;
        }
        if self.layout == ListLayout::Pagination {
            let page_width = self.view_size.width;
            if page_width <= 0.0 {
                return 0..self.count;
            }
            let first = (scroll.x / page_width).floor().max(0.0) as usize;
            let end = ((scroll.x + page_width) / page_width).ceil() as usize + lookahead;
            let per_page = self.per_page();
            return (first * per_page).min(self.count)..(end * per_page).min(self.count);
        }

        let axis = self.layout.scroll_axis();
        let extent = self.line_extent();
        if extent <= 0.0 {
            return 0..self.count;
        }
        let pos = scroll.get(axis).max(0.0);
        let view = self.view_size.get(axis);
        let first = (pos / extent).floor() as usize;
        let end = (((pos + view) / extent).ceil() as usize).max(first + 1) + lookahead;
        let first = first.min(self.line_count());
        let end = end.min(self.line_count());
        (first * self.per_line).min(self.count)..(end * self.per_line).min(self.count)
    }

    /// Snap a scroll position on the line axis to a line start.
    pub fn snap(&self, value: f32, dir: f32, threshold: f32) -> f32 {
        let extent = self.line_extent();
        if extent <= 0.0 || value <= 0.0 {
            return value.max(0.0);
        }
        let line = (value / extent).floor();
        let start = line * extent;
        let size = self.item_size.get(self.layout.scroll_axis());
        if crate::scroll::pane::should_snap_to_next(dir, value - start, size, threshold) {
            start + extent
        } else {
            start
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
