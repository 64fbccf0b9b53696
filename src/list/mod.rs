//! Lists: item containers with layout, selection, pooling and optional
//! virtualization.
//!
//! - [`layout`]: layout modes and the fixed-size grid of virtual lists
//! - [`pool`]: detached objects waiting for reuse, and the host factory
//! - [`state`]: per-list options, callbacks and selection
//! - `apply`: the stage operations

mod apply;
pub mod layout;
pub mod pool;
pub mod state;

pub use layout::{ListLayout, VirtualGrid};
pub use pool::{ObjectFactory, ObjectPool};
pub use state::{ItemProvider, ItemRenderer, ListOptions, ListState, SelectionMode};
