//! The controller state machine.

use slotmap::new_key_type;

use super::action::ControllerAction;
use super::page::PageId;
use crate::stage::ObjectId;

new_key_type! {
    /// Handle to a controller on the stage.
    pub struct ControllerId;
}

/// One named page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: PageId,
    pub name: String,
}

/// A named selector over an ordered list of pages.
///
/// The selection is `None` only while the controller has no pages.
#[derive(Debug, Clone)]
pub struct Controller {
    name: String,
    owner: ObjectId,
    pages: Vec<Page>,
    selected: Option<usize>,
    previous: Option<usize>,
    pub(crate) changing: bool,
    /// Last selection requested while `changing` was set.
    pub(crate) pending: Option<usize>,
    pub(crate) actions: Vec<ControllerAction>,
}

impl Controller {
    pub(crate) fn new(name: impl Into<String>, owner: ObjectId) -> Self {
        Self {
            name: name.into(),
            owner,
            pages: Vec::new(),
            selected: None,
            previous: None,
            changing: false,
            pending: None,
            actions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The container this controller belongs to.
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.previous
    }

    pub fn selected_page_id(&self) -> Option<PageId> {
        self.selected.and_then(|i| self.pages.get(i)).map(|p| p.id)
    }

    pub fn previous_page_id(&self) -> Option<PageId> {
        self.previous.and_then(|i| self.pages.get(i)).map(|p| p.id)
    }

    /// Name of the selected page.
    pub fn selected_page(&self) -> Option<&str> {
        self.selected.and_then(|i| self.page_name(i))
    }

    pub fn previous_page(&self) -> Option<&str> {
        self.previous.and_then(|i| self.page_name(i))
    }

    pub fn page_name(&self, index: usize) -> Option<&str> {
        self.pages.get(index).map(|p| p.name.as_str())
    }

    pub fn page_id(&self, index: usize) -> Option<PageId> {
        self.pages.get(index).map(|p| p.id)
    }

    pub fn page_index_by_id(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id == id)
    }

    pub fn page_index_by_name(&self, name: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.name == name)
    }

    pub fn page_id_by_name(&self, name: &str) -> Option<PageId> {
        self.pages.iter().find(|p| p.name == name).map(|p| p.id)
    }

    pub fn has_page(&self, name: &str) -> bool {
        self.page_index_by_name(name).is_some()
    }

    /// Whether a page change is being broadcast right now.
    pub fn is_changing(&self) -> bool {
        self.changing
    }

    pub fn actions(&self) -> &[ControllerAction] {
        &self.actions
    }

    // ── Mutation (stage-driven) ──────────────────────────────────────

    /// Insert a page at `index` (clamped), keeping the selection on the same
    /// page.
    pub(crate) fn insert_page(&mut self, index: usize, id: PageId, name: impl Into<String>) {
        let index = index.min(self.pages.len());
        self.pages.insert(index, Page { id, name: name.into() });
        if let Some(sel) = self.selected.as_mut() {
            if index <= *sel {
                *sel += 1;
            }
        }
        if let Some(prev) = self.previous.as_mut() {
            if index <= *prev {
                *prev += 1;
            }
        }
    }

    /// Move the selection. Returns `false` when `index` is already selected.
    pub(crate) fn select(&mut self, index: usize) -> bool {
        if self.selected == Some(index) {
            return false;
        }
        self.previous = self.selected;
        self.selected = Some(index);
        true
    }

    /// Remove a page. The selection index is left for the stage to clamp.
    pub(crate) fn remove_page_at(&mut self, index: usize) -> Option<Page> {
        if index >= self.pages.len() {
            return None;
        }
        let page = self.pages.remove(index);
        if self.previous == Some(index) {
            self.previous = None;
        } else if let Some(prev) = self.previous.as_mut() {
            if *prev > index {
                *prev -= 1;
            }
        }
        Some(page)
    }

    pub(crate) fn set_selected_raw(&mut self, index: Option<usize>) {
        self.selected = index;
    }

    pub(crate) fn clear_pages(&mut self) {
        self.pages.clear();
        self.selected = None;
        self.previous = None;
        self.pending = None;
    }
}
