//! # stagecraft
//!
//! The layout-and-state core of a retained-mode widget toolkit. Objects live
//! in a slotmap-backed [`Stage`](stage::Stage) and keep their geometry on a
//! host-owned [`DisplayPrimitive`](display::DisplayPrimitive); the core never
//! renders.
//!
//! ## Core Systems
//!
//! - **[`relation`]**: anchor bindings that keep objects positioned and sized
//!   against siblings or their parent
//! - **[`controller`]**: named page selectors owned by containers
//! - **[`gear`]**: per-page property memories that write or tween values on
//!   page change
//! - **[`scroll`]**: scroll panes with drag, inertia, bounce, paging and
//!   snapping
//! - **[`list`]**: item containers with selection, pooling and virtualization
//! - **[`descriptor`]**: component descriptions and the builder that turns
//!   them into objects
//! - **[`tween`]**: eased value tweens stepped by the stage clock
//! - **[`testing`]**: a frame-stepping [`Pilot`](testing::Pilot) and outline
//!   snapshots
//!
//! Every mutation runs synchronously and queues
//! [`StageEvent`](stage::StageEvent)s; the host drains them after calling
//! [`Stage::tick`](stage::Stage::tick) once per frame.

// Foundation
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;

// Object tree
pub mod stage;

// State propagation
pub mod controller;
pub mod gear;
pub mod relation;
pub mod tween;

// Containers
pub mod list;
pub mod scroll;

// Construction
pub mod descriptor;

// Headless testing
pub mod testing;

pub use config::StageConfig;
pub use error::ConfigError;
pub use stage::{ObjectData, ObjectId, Stage, StageEvent};
