//! Headless testing framework: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to step a [`Stage`](crate::stage::Stage) frame by frame
//! and simulate pointer, wheel and click input. Use [`outline`] to capture a
//! subtree as plain text for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::outline;
