//! Per-list state: options, item callbacks, live items and selection.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::layout::ListLayout;
use super::pool::ObjectPool;
use crate::geometry::Size;
use crate::scroll::ScrollOptions;
use crate::stage::{ObjectId, Stage};

/// Fills an item with the data at an index. Runs whenever an index gains
/// an object.
pub type ItemRenderer = Box<dyn FnMut(&mut Stage, usize, ObjectId)>;

/// Chooses the resource url for an index; `None` uses the default item.
pub type ItemProvider = Box<dyn Fn(usize) -> Option<String>>;

/// How clicks change the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Single,
    /// A click selects only the clicked item; `add_selection` can add more.
    Multiple,
    /// A click toggles the clicked item.
    MultipleSingleClick,
    None,
}

/// List configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    pub layout: ListLayout,
    pub line_gap: f32,
    pub column_gap: f32,
    /// Fixed items per row (0: fit to view).
    pub column_count: usize,
    /// Fixed items per column (0: fit to view).
    pub line_count: usize,
    pub default_item: Option<String>,
    pub selection_mode: SelectionMode,
    pub scroll_item_to_view_on_click: bool,
    /// Scroll pane installed with the list.
    pub scroll: Option<ScrollOptions>,
}

impl ListOptions {
    /// Options for a layout, with a scroll pane in the layout's direction.
    /// Pagination scrolls page by page.
    pub fn new(layout: ListLayout) -> Self {
        let mut scroll = ScrollOptions::new(layout.scroll_type());
        scroll.page_mode = layout == ListLayout::Pagination;
        Self {
            layout,
            line_gap: 0.0,
            column_gap: 0.0,
            column_count: 0,
            line_count: 0,
            default_item: None,
            selection_mode: SelectionMode::Single,
            scroll_item_to_view_on_click: true,
            scroll: Some(scroll),
        }
    }

    pub fn with_default_item(mut self, url: impl Into<String>) -> Self {
        self.default_item = Some(url.into());
        self
    }

    pub fn with_gaps(mut self, line_gap: f32, column_gap: f32) -> Self {
        self.line_gap = line_gap;
        self.column_gap = column_gap;
        self
    }

    pub fn with_columns(mut self, count: usize) -> Self {
        self.column_count = count;
        self
    }

    pub fn with_lines(mut self, count: usize) -> Self {
        self.line_count = count;
        self
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn with_scroll(mut self, scroll: Option<ScrollOptions>) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn without_scroll_on_click(mut self) -> Self {
        self.scroll_item_to_view_on_click = false;
        self
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::new(ListLayout::SingleColumn)
    }
}

/// Runtime state of one list.
pub struct ListState {
    pub(crate) options: ListOptions,
    pub(crate) virtual_mode: bool,
    pub(crate) looping: bool,
    /// Logical item count (one copy, in loop mode).
    pub(crate) num_items: usize,
    /// Shared item size, measured when virtualization is turned on.
    pub(crate) item_size: Option<Size>,
    /// Virtual mode: laid-out index -> object. Loop copies have distinct keys.
    pub(crate) live: BTreeMap<usize, ObjectId>,
    pub(crate) selection: BTreeSet<usize>,
    pub(crate) last_selected: Option<usize>,
    pub(crate) renderer: Option<ItemRenderer>,
    pub(crate) provider: Option<ItemProvider>,
    pub(crate) pool: ObjectPool,
    /// Data changed: every live item re-renders on the next pass.
    pub(crate) data_dirty: bool,
    pub(crate) in_refresh: bool,
}

impl ListState {
    pub(crate) fn new(options: ListOptions) -> Self {
        Self {
            options,
            virtual_mode: false,
            looping: false,
            num_items: 0,
            item_size: None,
            live: BTreeMap::new(),
            selection: BTreeSet::new(),
            last_selected: None,
            renderer: None,
            provider: None,
            pool: ObjectPool::new(),
            data_dirty: false,
            in_refresh: false,
        }
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    pub fn is_virtual(&self) -> bool {
        self.virtual_mode
    }

    pub fn is_loop(&self) -> bool {
        self.looping
    }

    pub fn item_size(&self) -> Option<Size> {
        self.item_size
    }

    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    pub fn last_selected(&self) -> Option<usize> {
        self.last_selected
    }

    /// Laid-out item count: the logical count times the loop copies.
    pub(crate) fn laid_out_count(&self) -> usize {
        if self.looping {
            self.num_items * crate::scroll::LOOP_COPIES
        } else {
            self.num_items
        }
    }

    /// Map a laid-out index to its logical index.
    pub(crate) fn logical(&self, index: usize) -> usize {
        if self.looping && self.num_items > 0 {
            index % self.num_items
        } else {
            index
        }
    }

    /// Objects showing a logical index (more than one near a loop seam).
    pub(crate) fn live_for(&self, index: usize) -> Vec<ObjectId> {
        self.live
            .iter()
            .filter(|(&k, _)| self.logical(k) == index)
            .map(|(_, &obj)| obj)
            .collect()
    }

    pub(crate) fn url_for(&self, index: usize) -> Option<String> {
        self.provider
            .as_ref()
            .and_then(|p| p(index))
            .or_else(|| self.options.default_item.clone())
    }
}

impl fmt::Debug for ListState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListState")
            .field("options", &self.options)
            .field("virtual", &self.virtual_mode)
            .field("loop", &self.looping)
            .field("num_items", &self.num_items)
            .field("live", &self.live.len())
            .field("selection", &self.selection)
            .field("pooled", &self.pool.count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_picks_scroll_direction() {
        let opts = ListOptions::new(ListLayout::SingleRow);
        assert_eq!(
            opts.scroll.map(|s| s.scroll_type),
            Some(crate::scroll::ScrollType::Horizontal)
        );
        assert_eq!(
            ListOptions::default().scroll.map(|s| s.scroll_type),
            Some(crate::scroll::ScrollType::Vertical)
        );
    }

    #[test]
    fn provider_falls_back_to_default_item() {
        let mut state = ListState::new(ListOptions::default().with_default_item("ui://row"));
        state.provider = Some(Box::new(|i| (i % 2 == 1).then(|| "ui://odd".to_owned())));
        assert_eq!(state.url_for(0).as_deref(), Some("ui://row"));
        assert_eq!(state.url_for(1).as_deref(), Some("ui://odd"));
    }

    #[test]
    fn loop_indices_wrap() {
        let mut state = ListState::new(ListOptions::default());
        state.looping = true;
        state.num_items = 4;
        assert_eq!(state.laid_out_count(), 24);
        assert_eq!(state.logical(9), 1);
    }
}
