//! Tweening: easing curves and the per-frame tween registry.

pub mod ease;
pub mod tweener;

pub use ease::EaseType;
pub use tweener::{TweenId, TweenSample, TweenTarget, TweenValue, Tweener};
