//! Per-frame tween registry.
//!
//! A [`Tweener`] owns every running property tween. The stage advances all of
//! them in a single pass per frame and routes the resulting samples to their
//! targets. Killing a tween removes it from the registry, so a replaced tween
//! can never write a stale value afterwards.

use slotmap::{new_key_type, SlotMap};

use super::ease::EaseType;
use crate::gear::GearKind;
use crate::stage::ObjectId;

new_key_type! {
    /// Handle to a running tween.
    pub struct TweenId;
}

/// Up to four interpolated components (x/y, width/height, ARGB, ...).
pub type TweenValue = [f32; 4];

/// What a tween writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenTarget {
    /// A gear-driven property of an object.
    Gear { object: ObjectId, kind: GearKind },
}

#[derive(Debug, Clone)]
struct Tween {
    target: TweenTarget,
    start: TweenValue,
    end: TweenValue,
    ease: EaseType,
    duration: f32,
    delay: f32,
    elapsed: f32,
}

/// One interpolated value produced by [`Tweener::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSample {
    pub id: TweenId,
    pub target: TweenTarget,
    pub value: TweenValue,
    /// The tween reached its end value and has been removed.
    pub finished: bool,
}

/// Registry of running tweens.
#[derive(Debug, Default)]
pub struct Tweener {
    tweens: SlotMap<TweenId, Tween>,
}

impl Tweener {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween and return its handle.
    pub fn start(
        &mut self,
        target: TweenTarget,
        start: TweenValue,
        end: TweenValue,
        ease: EaseType,
        duration: f32,
        delay: f32,
    ) -> TweenId {
        self.tweens.insert(Tween {
            target,
            start,
            end,
            ease,
            duration: duration.max(0.0),
            delay: delay.max(0.0),
            elapsed: 0.0,
        })
    }

    /// Stop a tween without producing a final sample.
    ///
    /// Returns `false` if the handle was already gone.
    pub fn kill(&mut self, id: TweenId) -> bool {
        self.tweens.remove(id).is_some()
    }

    /// Whether the handle still refers to a running tween.
    pub fn is_active(&self, id: TweenId) -> bool {
        self.tweens.contains_key(id)
    }

    /// The value a running tween is heading to.
    pub fn end_value(&self, id: TweenId) -> Option<TweenValue> {
        self.tweens.get(id).map(|t| t.end)
    }

    /// Number of running tweens.
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    /// Whether no tween is running.
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Advance every tween by `dt` seconds.
    ///
    /// Tweens still inside their delay produce no sample. Finished tweens
    /// report their exact end value and are removed.
    pub fn advance(&mut self, dt: f32) -> Vec<TweenSample> {
        let mut samples = Vec::new();
        let mut finished = Vec::new();

        for (id, tween) in self.tweens.iter_mut() {
            tween.elapsed += dt;
            if tween.elapsed < tween.delay {
                continue;
            }
            let run = tween.elapsed - tween.delay;
            if run >= tween.duration {
                samples.push(TweenSample {
                    id,
                    target: tween.target,
                    value: tween.end,
                    finished: true,
                });
                finished.push(id);
                continue;
            }
            let ratio = tween.ease.evaluate(run / tween.duration);
            let mut value = [0.0; 4];
            for (i, slot) in value.iter_mut().enumerate() {
                *slot = tween.start[i] + (tween.end[i] - tween.start[i]) * ratio;
            }
            samples.push(TweenSample {
                id,
                target: tween.target,
                value,
                finished: false,
            });
        }

        for id in finished {
            self.tweens.remove(id);
        }
        samples
    }
}
