//! Scroll panes: clipped, draggable, inertial viewports over a container's
//! children.
//!
//! - [`pane`]: per-container state, drag following, release targets
//! - [`scrollbar`]: indicator state for hosts that draw bars
//! - `apply`: the stage operations (positioning, input, frame step)

mod apply;
pub mod pane;
pub mod scrollbar;

pub use pane::{ScrollBarDisplay, ScrollOptions, ScrollPane, ScrollTween, ScrollType, TweenMode, LOOP_COPIES};
pub use scrollbar::ScrollbarState;
