//! Stage-side list operations: item lifecycle, layout, the virtual window
//! and selection.
//!
//! A non-virtual list owns one child per item. A virtual list owns only the
//! items whose lines intersect the view; everything else lives in the pool
//! until the window slides over it again. Item callbacks run with the
//! renderer taken out of the list state, so a renderer may freely mutate the
//! stage (including the list that called it).

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use super::layout::{ListLayout, VirtualGrid};
use super::state::{ListOptions, ListState, SelectionMode};
use crate::error::ConfigError;
use crate::geometry::{Axis, Point, Rect, Size};
use crate::scroll::{ScrollOptions, ScrollPane};
use crate::stage::{ObjectData, ObjectId, Stage, StageEvent};

impl Stage {
    // ── Creation ─────────────────────────────────────────────────────

    /// Create a list under `parent`.
    pub fn create_list(&mut self, parent: ObjectId, data: ObjectData, options: ListOptions) -> ObjectId {
        let id = self.create_child(parent, data);
        self.install_list(id, options);
        id
    }

    /// Turn an existing object into a list.
    pub fn make_list(&mut self, id: ObjectId, options: ListOptions) -> Result<(), ConfigError> {
        if !self.objects.contains_key(id) {
            return Err(ConfigError::UnknownObject);
        }
        self.install_list(id, options);
        Ok(())
    }

    fn install_list(&mut self, id: ObjectId, options: ListOptions) {
        let scroll = options.scroll.clone();
        self.lists.insert(id, ListState::new(options));
        if let Some(scroll) = scroll {
            if let Err(err) = self.set_scroll_pane(id, scroll) {
                debug!(%err, "list scroll pane");
            }
        }
        self.set_bounds_changed(id);
        debug!(?id, "list created");
    }

    pub fn list(&self, id: ObjectId) -> Option<&ListState> {
        self.lists.get(id)
    }

    fn not_a_list(&self, id: ObjectId) -> ConfigError {
        match self.objects.get(id) {
            Some(obj) => ConfigError::NotAList(obj.name.clone()),
            None => ConfigError::UnknownObject,
        }
    }

    fn list_state(&self, id: ObjectId) -> Result<&ListState, ConfigError> {
        self.lists.get(id).ok_or_else(|| self.not_a_list(id))
    }

    fn list_name(&self, id: ObjectId) -> String {
        self.objects.get(id).map(|o| o.name.clone()).unwrap_or_default()
    }

    /// Set the callback that fills an item with the data at its index.
    pub fn set_item_renderer(
        &mut self,
        list: ObjectId,
        renderer: impl FnMut(&mut Stage, usize, ObjectId) + 'static,
    ) -> Result<(), ConfigError> {
        let err = self.not_a_list(list);
        let state = self.lists.get_mut(list).ok_or(err)?;
        state.renderer = Some(Box::new(renderer));
        Ok(())
    }

    /// Set the callback that picks an item's resource url per index.
    pub fn set_item_provider(
        &mut self,
        list: ObjectId,
        provider: impl Fn(usize) -> Option<String> + 'static,
    ) -> Result<(), ConfigError> {
        let err = self.not_a_list(list);
        let state = self.lists.get_mut(list).ok_or(err)?;
        state.provider = Some(Box::new(provider));
        Ok(())
    }

    // ── Item lifecycle ───────────────────────────────────────────────

    /// Take a pooled object for `url`, or ask the factory for a new one.
    fn obtain_item(&mut self, list: ObjectId, url: &str) -> Result<ObjectId, ConfigError> {
        while let Some(pooled) = self.lists.get_mut(list).and_then(|l| l.pool.get(url)) {
            if self.objects.contains_key(pooled) {
                self.set_visible(pooled, true);
                return Ok(pooled);
            }
        }
        let miss = || ConfigError::FactoryMiss(url.to_owned());
        let factory = self.factory.as_mut().ok_or_else(miss)?;
        let mut data = factory.create(url).ok_or_else(miss)?;
        if data.resource_url.is_none() {
            data.resource_url = Some(url.to_owned());
        }
        let id = self.create_object(data);
        trace!(?list, url, "item created");
        Ok(id)
    }

    /// Detach an item and park it in the list's pool.
    fn return_item_to_pool(&mut self, list: ObjectId, item: ObjectId) {
        self.kill_gear_tweens(item);
        self.drop_external_relations(item, list);
        self.remove_child(item);
        self.set_visible(item, false);
        let url = self
            .objects
            .get(item)
            .and_then(|o| o.resource_url.clone())
            .unwrap_or_default();
        if let Some(state) = self.lists.get_mut(list) {
            state.pool.return_object(url, item);
        }
    }

    /// Append an item from the pool (or the factory). `url` defaults to the
    /// list's default item.
    pub fn add_item_from_pool(&mut self, list: ObjectId, url: Option<&str>) -> Result<ObjectId, ConfigError> {
        let state = self.list_state(list)?;
        let url = match url {
            Some(url) => url.to_owned(),
            None => state
                .options
                .default_item
                .clone()
                .ok_or_else(|| ConfigError::NoItemType(self.list_name(list)))?,
        };
        let item = self.obtain_item(list, &url)?;
        self.add_child(list, item);
        Ok(item)
    }

    /// Move one child of a list into its pool.
    pub fn remove_child_to_pool(&mut self, item: ObjectId) {
        let Some(list) = self.parent(item) else {
            return;
        };
        if !self.lists.contains_key(list) {
            return;
        }
        if let Some(index) = self.children(list).iter().position(|&c| c == item) {
            self.shift_selection_after_removal(list, index);
        }
        self.return_item_to_pool(list, item);
    }

    /// Move children `begin..end` (to the last child when `end` is `None`)
    /// into the pool.
    pub fn remove_children_to_pool(&mut self, list: ObjectId, begin: usize, end: Option<usize>) {
        if !self.lists.contains_key(list) {
            return;
        }
        let children = self.children(list).to_vec();
        let end = end.unwrap_or(children.len()).min(children.len());
        let begin = begin.min(end);
        for index in (begin..end).rev() {
            self.shift_selection_after_removal(list, index);
            self.return_item_to_pool(list, children[index]);
        }
    }

    fn shift_selection_after_removal(&mut self, list: ObjectId, index: usize) {
        let Some(state) = self.lists.get_mut(list) else {
            return;
        };
        if state.virtual_mode {
            return;
        }
        state.selection = state
            .selection
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        if state.last_selected == Some(index) {
            state.last_selected = None;
        }
    }

    /// Dispose every pooled object of a list.
    pub fn clear_item_pool(&mut self, list: ObjectId) {
        let pooled = self.lists.get_mut(list).map(|l| l.pool.clear()).unwrap_or_default();
        for item in pooled {
            self.dispose(item);
        }
    }

    // ── Item count ───────────────────────────────────────────────────

    /// Set how many items the list shows.
    ///
    /// A plain list creates or pools children to match and renders every
    /// item. A virtual list only records the count; the next validate lays
    /// out the window and renders what became visible.
    pub fn set_num_items(&mut self, list: ObjectId, count: usize) -> Result<(), ConfigError> {
        if !self.lists.contains_key(list) {
            return Err(self.not_a_list(list));
        }
        let current = self.children(list).len();
        let Some(state) = self.lists.get_mut(list) else {
            return Ok(());
        };
        if state.virtual_mode {
            state.num_items = count;
            state.selection.retain(|&i| i < count);
            state.data_dirty = true;
            self.set_bounds_changed(list);
            return Ok(());
        }

        if count > current {
            let urls: Vec<Option<String>> = (current..count).map(|i| state.url_for(i)).collect();
            if urls.iter().any(Option::is_none) {
                return Err(ConfigError::NoItemType(self.list_name(list)));
            }
            for url in urls.into_iter().flatten() {
                self.add_item_from_pool(list, Some(&url))?;
            }
        } else if count < current {
            self.remove_children_to_pool(list, count, None);
        }
        if let Some(state) = self.lists.get_mut(list) {
            state.num_items = count;
        }

        let items: Vec<(usize, ObjectId)> = self.children(list).iter().copied().enumerate().collect();
        self.render_items(list, &items);
        Ok(())
    }

    /// Number of items: the logical count for virtual lists, the child count
    /// otherwise.
    pub fn num_items(&self, list: ObjectId) -> usize {
        match self.lists.get(list) {
            Some(state) if state.virtual_mode => state.num_items,
            Some(_) => self.children(list).len(),
            None => 0,
        }
    }

    /// Apply selection visuals, then run the renderer for each `(index, item)`.
    fn render_items(&mut self, list: ObjectId, items: &[(usize, ObjectId)]) {
        for &(index, item) in items {
            let selected = self.lists.get(list).is_some_and(|l| l.selection.contains(&index));
            self.set_selected(item, selected);
        }
        let Some(mut renderer) = self.lists.get_mut(list).and_then(|l| l.renderer.take()) else {
            return;
        };
        for &(index, item) in items {
            if self.objects.contains_key(item) {
                renderer(self, index, item);
            }
        }
        if let Some(state) = self.lists.get_mut(list) {
            if state.renderer.is_none() {
                state.renderer = Some(renderer);
            }
        }
    }

    // ── Virtual mode ─────────────────────────────────────────────────

    /// Virtualize the list. Every item shares the default item's size.
    pub fn set_virtual(&mut self, list: ObjectId) -> Result<(), ConfigError> {
        self.enable_virtual(list, false)
    }

    /// Virtualize the list and wrap it around endlessly along its scroll
    /// axis.
    pub fn set_virtual_and_loop(&mut self, list: ObjectId) -> Result<(), ConfigError> {
        self.enable_virtual(list, true)
    }

    fn enable_virtual(&mut self, list: ObjectId, looping: bool) -> Result<(), ConfigError> {
        let state = self.list_state(list)?;
        if state.virtual_mode {
            return Ok(());
        }
        let url = state
            .options
            .default_item
            .clone()
            .ok_or_else(|| ConfigError::NoItemType(self.list_name(list)))?;
        let layout = state.options.layout;
        let gap = match layout.scroll_axis() {
            Axis::Y => state.options.line_gap,
            Axis::X => state.options.column_gap,
        };

        let sample = self.obtain_item(list, &url)?;
        let item_size = self.objects.get(sample).map_or(Size::ZERO, ObjectData::size);
        self.return_item_to_pool(list, sample);
        for child in self.children(list).to_vec() {
            self.return_item_to_pool(list, child);
        }

        if !self.panes.contains_key(list) {
            self.set_scroll_pane(list, ScrollOptions::new(layout.scroll_type()))?;
        }
        if looping {
            self.set_scroll_loop(list, Some(layout.scroll_axis()), gap);
        }
        if let Some(state) = self.lists.get_mut(list) {
            state.virtual_mode = true;
            state.looping = looping;
            state.item_size = Some(item_size);
            state.num_items = 0;
            state.selection.clear();
            state.last_selected = None;
            state.data_dirty = true;
        }
        self.set_bounds_changed(list);
        debug!(?list, looping, ?item_size, "list virtualized");
        Ok(())
    }

    /// Schedule a layout pass for the next validate. Repeated calls in
    /// one frame share that pass, and items that keep their index are not
    /// re-rendered.
    pub fn refresh_list(&mut self, list: ObjectId) {
        if self.lists.contains_key(list) {
            self.set_bounds_changed(list);
        }
    }

    /// Re-render every visible item on the next validate.
    pub fn refresh_virtual_list(&mut self, list: ObjectId) {
        if let Some(state) = self.lists.get_mut(list) {
            state.data_dirty = true;
            self.set_bounds_changed(list);
        }
    }

    /// One layout pass, run from validate.
    pub(crate) fn refresh_list_pass(&mut self, list: ObjectId) {
        let Some(state) = self.lists.get(list) else {
            return;
        };
        if state.in_refresh {
            return;
        }
        if state.virtual_mode {
            self.refresh_virtual_pass(list);
        } else {
            let dirty = self.lists.get_mut(list).is_some_and(|l| std::mem::take(&mut l.data_dirty));
            if dirty {
                let items: Vec<(usize, ObjectId)> = self.children(list).iter().copied().enumerate().collect();
                self.render_items(list, &items);
            }
            self.arrange_list(list);
        }
    }

    fn refresh_virtual_pass(&mut self, list: ObjectId) {
        let Some(grid) = self.virtual_grid(list) else {
            return;
        };
        self.set_content_size(list, grid.content_size());
        let looping = self.lists.get(list).is_some_and(|l| l.looping);
        if looping && self.panes.get_mut(list).is_some_and(ScrollPane::loop_check_current) {
            self.sync_pane_origin(list);
        }
        self.sync_list_window(list);
    }

    fn virtual_grid(&self, list: ObjectId) -> Option<VirtualGrid> {
        let state = self.lists.get(list)?;
        let item_size = state.item_size?;
        let view = match self.panes.get(list) {
            Some(pane) => pane.view_size(),
            None => self.objects.get(list)?.size(),
        };
        let opts = &state.options;
        Some(VirtualGrid::new(
            opts.layout,
            item_size,
            (opts.line_gap, opts.column_gap),
            (opts.column_count, opts.line_count),
            view,
            state.laid_out_count(),
        ))
    }

    /// Slide the virtual window to the current scroll position.
    ///
    /// Items that left the window go to the pool, indices that entered it
    /// get an object from the pool (or the factory) and are rendered. Items
    /// that stayed are only repositioned, unless the data changed.
    pub(crate) fn sync_list_window(&mut self, list: ObjectId) {
        let Some(grid) = self.virtual_grid(list) else {
            return;
        };
        let scroll = self.panes.get(list).map_or(Point::ZERO, ScrollPane::scrolling_pos);
        let range = grid.visible_range(scroll, self.config.list_lookahead_lines);
        let Some(state) = self.lists.get_mut(list) else {
            return;
        };
        if state.in_refresh || !state.virtual_mode {
            return;
        }
        state.in_refresh = true;
        let force = std::mem::take(&mut state.data_dirty);
        let old = std::mem::take(&mut state.live);

        let mut live = BTreeMap::new();
        let mut leaving = Vec::new();
        for (index, item) in old {
            if range.contains(&index) && self.objects.contains_key(item) {
                live.insert(index, item);
            } else {
                leaving.push(item);
            }
        }
        for item in leaving {
            if self.objects.contains_key(item) {
                self.return_item_to_pool(list, item);
            }
        }

        let mut fresh = Vec::new();
        for index in range.clone() {
            let Some((logical, url)) = self.lists.get(list).map(|l| {
                let logical = l.logical(index);
                (logical, l.url_for(logical))
            }) else {
                break;
            };
            let Some(url) = url else {
                continue;
            };
            let current = live.get(&index).copied();
            let reusable = current.filter(|&item| {
                self.objects.get(item).and_then(|o| o.resource_url.as_deref()) == Some(url.as_str())
            });
            let item = match (current, reusable) {
                (Some(item), Some(_)) => {
                    if force {
                        fresh.push((logical, item));
                    }
                    item
                }
                (stale, _) => {
                    if let Some(stale) = stale {
                        self.return_item_to_pool(list, stale);
                        live.remove(&index);
                    }
                    match self.obtain_item(list, &url) {
                        Ok(item) => {
                            fresh.push((logical, item));
                            item
                        }
                        Err(err) => {
                            warn!(%err, index, "list item unavailable");
                            continue;
                        }
                    }
                }
            };
            if self.parent(item) != Some(list) {
                self.add_child(list, item);
            }
            let rect = grid.item_rect(index);
            self.set_xy(item, rect.x, rect.y);
            live.insert(index, item);
        }

        let mut order: Vec<ObjectId> = live.values().copied().collect();
        let others: Vec<ObjectId> = self
            .children(list)
            .iter()
            .copied()
            .filter(|c| !live.values().any(|v| v == c))
            .collect();
        order.extend(others);
        self.set_children_order(list, order);
        trace!(?list, ?range, fresh = fresh.len(), "list window");

        if let Some(state) = self.lists.get_mut(list) {
            state.live = live;
        }
        self.render_items(list, &fresh);
        if let Some(state) = self.lists.get_mut(list) {
            state.in_refresh = false;
        }
    }

    /// Line-aligned snapping for virtual lists; `None` for plain lists.
    pub(crate) fn list_snapping_position(&self, list: ObjectId, value: Point, dir: Point) -> Option<Point> {
        if !self.lists.get(list)?.virtual_mode {
            return None;
        }
        let grid = self.virtual_grid(list)?;
        let axis = grid.layout.scroll_axis();
        let mut out = value;
        *out.get_mut(axis) = grid.snap(value.get(axis), dir.get(axis), self.config.snapping_threshold);
        Some(out)
    }

    // ── Plain layout ─────────────────────────────────────────────────

    /// Position the children of a non-virtual list and update the content
    /// size.
    fn arrange_list(&mut self, list: ObjectId) {
        let Some(opts) = self.lists.get(list).map(|l| l.options.clone()) else {
            return;
        };
        let view = match self.panes.get(list) {
            Some(pane) => pane.view_size(),
            None => self.objects.get(list).map_or(Size::ZERO, ObjectData::size),
        };
        let items: Vec<(ObjectId, Size)> = self
            .children(list)
            .iter()
            .filter_map(|&c| self.objects.get(c).filter(|o| o.is_displayed()).map(|o| (c, o.size())))
            .collect();

        let (positions, pages) = flow(&opts, view, &items);
        for (item, at) in positions {
            self.set_xy(item, at.x, at.y);
        }
        let mut content = self.children_bounds(list).size();
        if opts.layout == ListLayout::Pagination {
            content = Size::new(pages as f32 * view.width, view.height);
        }
        self.set_content_size(list, content);
    }

    // ── Index mapping ────────────────────────────────────────────────

    /// The item index shown by the child at `child_index`.
    pub fn child_index_to_item_index(&self, list: ObjectId, child_index: usize) -> Option<usize> {
        let state = self.lists.get(list)?;
        let item = *self.children(list).get(child_index)?;
        if !state.virtual_mode {
            return Some(child_index);
        }
        state
            .live
            .iter()
            .find(|(_, &o)| o == item)
            .map(|(&k, _)| state.logical(k))
    }

    /// The child index showing item `index`, if it is live.
    pub fn item_index_to_child_index(&self, list: ObjectId, index: usize) -> Option<usize> {
        let state = self.lists.get(list)?;
        if !state.virtual_mode {
            return (index < self.children(list).len()).then_some(index);
        }
        let item = *state.live_for(index).first()?;
        self.children(list).iter().position(|&c| c == item)
    }

    /// Every `(item index, object)` pair currently materialized.
    pub fn live_items(&self, list: ObjectId) -> Vec<(usize, ObjectId)> {
        match self.lists.get(list) {
            Some(state) if state.virtual_mode => {
                state.live.iter().map(|(&k, &o)| (state.logical(k), o)).collect()
            }
            Some(_) => self.children(list).iter().copied().enumerate().collect(),
            None => Vec::new(),
        }
    }

    fn items_showing(&self, list: ObjectId, index: usize) -> Vec<ObjectId> {
        match self.lists.get(list) {
            Some(state) if state.virtual_mode => state.live_for(index),
            Some(_) => self.children(list).get(index).copied().into_iter().collect(),
            None => Vec::new(),
        }
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Lowest selected index.
    pub fn selected_index(&self, list: ObjectId) -> Option<usize> {
        self.lists.get(list)?.selection.first().copied()
    }

    pub fn selected_indices(&self, list: ObjectId) -> Vec<usize> {
        self.lists
            .get(list)
            .map(|l| l.selection.iter().copied().collect())
            .unwrap_or_default()
    }

    fn mark_selected(&mut self, list: ObjectId, index: usize, selected: bool) {
        let Some(state) = self.lists.get_mut(list) else {
            return;
        };
        if selected {
            state.selection.insert(index);
            state.last_selected = Some(index);
        } else {
            state.selection.remove(&index);
        }
        for item in self.items_showing(list, index) {
            self.set_selected(item, selected);
        }
    }

    fn clear_selection_except(&mut self, list: ObjectId, keep: Option<usize>) {
        for index in self.selected_indices(list) {
            if Some(index) != keep {
                self.mark_selected(list, index, false);
            }
        }
    }

    /// Select an item. Single mode drops the previous selection.
    pub fn add_selection(&mut self, list: ObjectId, index: usize, scroll_into_view: bool) {
        let Some(mode) = self.lists.get(list).map(|l| l.options.selection_mode) else {
            return;
        };
        if mode == SelectionMode::None || index >= self.num_items(list) {
            return;
        }
        if mode == SelectionMode::Single {
            self.clear_selection_except(list, Some(index));
        }
        self.mark_selected(list, index, true);
        if scroll_into_view {
            self.scroll_to_view_index(list, index, false, false);
        }
    }

    pub fn remove_selection(&mut self, list: ObjectId, index: usize) {
        if self.lists.get(list).is_some_and(|l| l.selection.contains(&index)) {
            self.mark_selected(list, index, false);
        }
    }

    pub fn clear_selection(&mut self, list: ObjectId) {
        self.clear_selection_except(list, None);
    }

    /// Select every item. Multiple-selection modes only.
    pub fn select_all(&mut self, list: ObjectId) {
        if !self.allows_multiple(list) {
            return;
        }
        for index in 0..self.num_items(list) {
            self.mark_selected(list, index, true);
        }
    }

    /// Invert the selection. Multiple-selection modes only.
    pub fn select_reverse(&mut self, list: ObjectId) {
        if !self.allows_multiple(list) {
            return;
        }
        for index in 0..self.num_items(list) {
            let selected = self.lists.get(list).is_some_and(|l| l.selection.contains(&index));
            self.mark_selected(list, index, !selected);
        }
    }

    fn allows_multiple(&self, list: ObjectId) -> bool {
        self.lists.get(list).is_some_and(|l| {
            matches!(
                l.options.selection_mode,
                SelectionMode::Multiple | SelectionMode::MultipleSingleClick
            )
        })
    }

    /// A click on a list item: update the selection by mode, queue
    /// [`StageEvent::ItemClicked`] and optionally scroll the item into view.
    pub fn click_item(&mut self, item: ObjectId) {
        let Some(list) = self.parent(item) else {
            return;
        };
        let Some(opts) = self.lists.get(list).map(|l| l.options.clone()) else {
            return;
        };
        let Some(child_index) = self.children(list).iter().position(|&c| c == item) else {
            return;
        };
        let Some(index) = self.child_index_to_item_index(list, child_index) else {
            return;
        };

        match opts.selection_mode {
            SelectionMode::Single | SelectionMode::Multiple => {
                self.clear_selection_except(list, Some(index));
                self.mark_selected(list, index, true);
            }
            SelectionMode::MultipleSingleClick => {
                let selected = self.lists.get(list).is_some_and(|l| l.selection.contains(&index));
                self.mark_selected(list, index, !selected);
                if let Some(state) = self.lists.get_mut(list) {
                    state.last_selected = Some(index);
                }
            }
            SelectionMode::None => {}
        }
        self.events.push(StageEvent::ItemClicked { list, index });
        if opts.scroll_item_to_view_on_click {
            self.scroll_to_view_index(list, index, true, false);
        }
    }

    // ── Viewport helpers ─────────────────────────────────────────────

    /// Scroll until item `index` is visible. Loop lists pick the copy in
    /// the block currently shown.
    pub fn scroll_to_view_index(&mut self, list: ObjectId, index: usize, animated: bool, set_first: bool) {
        self.validate();
        let Some(state) = self.lists.get(list) else {
            return;
        };
        let rect: Rect = if state.virtual_mode {
            let Some(grid) = self.virtual_grid(list) else {
                return;
            };
            let mut laid_out = index;
            if state.looping && state.num_items > 0 {
                let first = state.live.keys().next().copied().unwrap_or(0);
                laid_out = (first / state.num_items) * state.num_items + index;
            }
            if laid_out >= grid.count {
                return;
            }
            grid.item_rect(laid_out)
        } else {
            match self.children(list).get(index).and_then(|&c| self.objects.get(c)) {
                Some(obj) => obj.rect(),
                None => return,
            }
        };
        self.scroll_to_view(list, rect, animated, set_first);
        self.validate();
    }

    /// Item index of the first child at least partly in view.
    pub fn first_child_in_view(&self, list: ObjectId) -> Option<usize> {
        let child = self
            .children(list)
            .iter()
            .position(|&c| self.is_child_in_view(list, c))?;
        self.child_index_to_item_index(list, child)
    }

    /// Resize the list along its scroll axis to show `item_count` items,
    /// never below `min_size`.
    pub fn resize_to_fit(&mut self, list: ObjectId, item_count: usize, min_size: f32) {
        self.validate();
        let Some(state) = self.lists.get(list) else {
            return;
        };
        let axis = state.options.layout.scroll_axis();
        let count = self.num_items(list).min(item_count);
        let extent = if state.virtual_mode {
            match self.virtual_grid(list) {
                Some(grid) if count > 0 => {
                    let lines = count.div_ceil(grid.per_line) as f32;
                    let gap = match axis {
                        Axis::Y => grid.line_gap,
                        Axis::X => grid.column_gap,
                    };
                    lines * grid.item_size.get(axis) + (lines - 1.0) * gap
                }
                _ => 0.0,
            }
        } else {
            self.children(list)[..count]
                .iter()
                .rev()
                .filter_map(|&c| self.objects.get(c))
                .find(|o| o.is_displayed())
                .map_or(0.0, |o| o.position().get(axis) + o.size().get(axis))
        };
        let extent = extent.max(min_size);
        match axis {
            Axis::Y => self.set_height(list, extent),
            Axis::X => self.set_width(list, extent),
        }
    }
}

/// Positions for a plain list's displayed children, plus the page count.
fn flow(opts: &ListOptions, view: Size, items: &[(ObjectId, Size)]) -> (Vec<(ObjectId, Point)>, usize) {
    let mut out = Vec::with_capacity(items.len());
    let (line_gap, column_gap) = (opts.line_gap, opts.column_gap);
    let mut cursor = Point::ZERO;
    let mut line_extent = 0.0f32;
    let mut in_line = 0usize;
    let mut rows = 0usize;
    let mut page = 0usize;

    match opts.layout {
        ListLayout::SingleColumn => {
            for &(item, size) in items {
                out.push((item, Point::new(0.0, cursor.y)));
                cursor.y += size.height + line_gap;
            }
        }
        ListLayout::SingleRow => {
            for &(item, size) in items {
                out.push((item, Point::new(cursor.x, 0.0)));
                cursor.x += size.width + column_gap;
            }
        }
        ListLayout::FlowHorizontal | ListLayout::Pagination => {
            let paged = opts.layout == ListLayout::Pagination;
            for &(item, size) in items {
                let full = if opts.column_count > 0 {
                    in_line == opts.column_count
                } else {
                    cursor.x + size.width > view.width
                };
                if in_line > 0 && full {
                    cursor.x = 0.0;
                    cursor.y += line_extent + line_gap;
                    line_extent = 0.0;
                    in_line = 0;
                    rows += 1;
                    let page_full = if opts.line_count > 0 {
                        rows == opts.line_count
                    } else {
                        cursor.y + size.height > view.height
                    };
                    if paged && page_full {
                        page += 1;
                        cursor.y = 0.0;
                        rows = 0;
                    }
                }
                let x = if paged { page as f32 * view.width + cursor.x } else { cursor.x };
                out.push((item, Point::new(x, cursor.y)));
                cursor.x += size.width + column_gap;
                line_extent = line_extent.max(size.height);
                in_line += 1;
            }
        }
        ListLayout::FlowVertical => {
            for &(item, size) in items {
                let full = if opts.line_count > 0 {
                    in_line == opts.line_count
                } else {
                    cursor.y + size.height > view.height
                };
                if in_line > 0 && full {
                    cursor.y = 0.0;
                    cursor.x += line_extent + column_gap;
                    line_extent = 0.0;
                    in_line = 0;
                }
                out.push((item, cursor));
                cursor.y += size.height + line_gap;
                line_extent = line_extent.max(size.width);
                in_line += 1;
            }
        }
    }
    let pages = if items.is_empty() { 0 } else { page + 1 };
    (out, pages)
}

// ===========================================================================
// Tests
// ===========================================================================
