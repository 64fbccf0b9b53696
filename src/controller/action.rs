//! Controller actions: side effects fired on page transitions.

use super::page::PageId;

/// Which page a [`ActionKind::ChangePage`] selects on the other controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PageTarget {
    /// A page by name.
    Page(String),
    /// The same index as the firing controller.
    SameIndex,
    /// The page with the same name as the firing controller's current page.
    SameName,
}

impl PageTarget {
    /// Parse the descriptor form: `~1` for same index, `~2` for same name,
    /// anything else is a page name.
    pub fn parse(s: &str) -> Self {
        match s {
            "~1" => PageTarget::SameIndex,
            "~2" => PageTarget::SameName,
            other => PageTarget::Page(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Ask the host to play a named transition on the controller's owner.
    PlayTransition {
        transition: String,
        play_times: u32,
        delay: f32,
        /// Stop the transition when a later change no longer matches.
        stop_on_exit: bool,
    },
    /// Drive another controller.
    ChangePage {
        /// Direct child of the owner holding the controller; `None` means the
        /// owner itself.
        object: Option<String>,
        controller: String,
        target: PageTarget,
    },
}

/// An action guarded by source and destination page filters.
///
/// Empty filters match anything.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerAction {
    pub from_pages: Vec<PageId>,
    pub to_pages: Vec<PageId>,
    pub kind: ActionKind,
}

impl ControllerAction {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            from_pages: Vec::new(),
            to_pages: Vec::new(),
            kind,
        }
    }

    pub fn from_pages(mut self, pages: impl IntoIterator<Item = PageId>) -> Self {
        self.from_pages = pages.into_iter().collect();
        self
    }

    pub fn to_pages(mut self, pages: impl IntoIterator<Item = PageId>) -> Self {
        self.to_pages = pages.into_iter().collect();
        self
    }

    /// Whether a transition `previous -> current` triggers this action.
    pub fn matches(&self, previous: Option<PageId>, current: Option<PageId>) -> bool {
        let from_ok = self.from_pages.is_empty()
            || previous.is_some_and(|p| self.from_pages.contains(&p));
        let to_ok =
            self.to_pages.is_empty() || current.is_some_and(|p| self.to_pages.contains(&p));
        from_ok && to_ok
    }
}
