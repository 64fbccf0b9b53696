//! Controllers: named page selectors that drive gears and actions.
//!
//! A controller belongs to one container. Changing its page re-applies every
//! gear bound to it within that container's subtree, then runs its actions.

pub mod action;
pub mod apply;
pub mod page;
pub mod state;

pub use action::{ActionKind, ControllerAction, PageTarget};
pub use page::{PageId, PageIdAllocator};
pub use state::{Controller, ControllerId, Page};
