//! Pilot: programmatic interaction with a headless stage.
//!
//! The `Pilot` owns a [`Stage`] and steps it at the configured frame rate,
//! simulating pointer drags, wheel notches and item clicks the way a host
//! event loop would feed them.

use crate::config::StageConfig;
use crate::geometry::Point;
use crate::list::ObjectFactory;
use crate::stage::{ObjectId, Stage, StageEvent};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A frame-stepping stage driver for tests.
///
/// # Examples
///
/// ```
/// use stagecraft::testing::Pilot;
///
/// let mut pilot = Pilot::default();
/// pilot.frames(3);
/// assert!((pilot.stage().clock() - 3.0 / 60.0).abs() < 1e-6);
/// ```
pub struct Pilot {
    stage: Stage,
}

impl Pilot {
    pub fn new(config: StageConfig) -> Self {
        Self {
            stage: Stage::new(config),
        }
    }

    /// Drive an existing stage.
    pub fn from_stage(stage: Stage) -> Self {
        Self { stage }
    }

    /// Install the factory lists create items with.
    pub fn with_factory(mut self, factory: impl ObjectFactory + 'static) -> Self {
        self.stage.set_object_factory(factory);
        self
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn into_stage(self) -> Stage {
        self.stage
    }

    /// Seconds per frame at the configured frame rate.
    pub fn frame_time(&self) -> f32 {
        1.0 / self.stage.config().frame_rate.max(1.0)
    }

    // ── Time ─────────────────────────────────────────────────────────

    /// Advance one frame.
    pub fn frame(&mut self) {
        let dt = self.frame_time();
        self.stage.tick(dt);
    }

    pub fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.frame();
        }
    }

    /// Advance whole frames covering at least `seconds`.
    pub fn run_for(&mut self, seconds: f32) {
        let frames = (seconds / self.frame_time()).ceil().max(0.0) as usize;
        self.frames(frames);
    }

    /// Step until every tween has finished, up to `max_frames`. Returns
    /// whether the stage came to rest.
    pub fn settle(&mut self, max_frames: usize) -> bool {
        for _ in 0..max_frames {
            if !self.stage.is_animating() {
                return true;
            }
            self.frame();
        }
        !self.stage.is_animating()
    }

    // ── Input simulation ─────────────────────────────────────────────

    pub fn press(&mut self, container: ObjectId, at: Point) {
        self.stage.pointer_down(container, at.x, at.y);
    }

    pub fn move_to(&mut self, container: ObjectId, at: Point) {
        self.stage.pointer_move(container, at.x, at.y);
    }

    pub fn release(&mut self, container: ObjectId) {
        self.stage.pointer_up(container);
    }

    /// Drag from `from` to `to` over `frames` evenly spaced moves, one per
    /// frame, then release.
    pub fn drag(&mut self, container: ObjectId, from: Point, to: Point, frames: usize) {
        self.press(container, from);
        let frames = frames.max(1);
        for i in 1..=frames {
            let at = from.lerp(to, i as f32 / frames as f32);
            self.move_to(container, at);
            self.frame();
        }
        self.release(container);
    }

    /// One wheel event; positive deltas scroll forward.
    pub fn wheel(&mut self, container: ObjectId, delta: f32) {
        self.stage.mouse_wheel(container, delta);
    }

    /// Click a list item.
    pub fn click(&mut self, item: ObjectId) {
        self.stage.click_item(item);
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Drain the stage's event queue.
    pub fn events(&mut self) -> Vec<StageEvent> {
        self.stage.take_events()
    }

    /// Render the subtree under `id` as an indented outline.
    pub fn outline(&self, id: ObjectId) -> String {
        super::snapshot::outline(&self.stage, id)
    }
}

impl Default for Pilot {
    fn default() -> Self {
        Self::new(StageConfig::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::{ScrollOptions, ScrollType};
    use crate::stage::ObjectData;

    /// A 100x300 vertical scroller over 1000px of content.
    fn scroller() -> (Pilot, ObjectId) {
        let mut pilot = Pilot::default();
        let stage = pilot.stage_mut();
        let root = stage.root();
        let c = stage.create_child(root, ObjectData::new("c").with_size(100.0, 300.0));
        stage.create_child(c, ObjectData::new("content").with_size(100.0, 1000.0));
        stage
            .set_scroll_pane(c, ScrollOptions::new(ScrollType::Vertical))
            .unwrap();
        pilot.events();
        (pilot, c)
    }

    // ── Time ─────────────────────────────────────────────────────────

    #[test]
    fn frame_time_follows_frame_rate() {
        let pilot = Pilot::new(StageConfig::default().with_frame_rate(30.0));
        assert!((pilot.frame_time() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn run_for_rounds_up_to_whole_frames() {
        let mut pilot = Pilot::default();
        pilot.run_for(0.02);
        assert!((pilot.stage().clock() - 2.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn idle_stage_is_settled() {
        let mut pilot = Pilot::default();
        assert!(pilot.settle(0));
    }

    // ── Input ────────────────────────────────────────────────────────

    #[test]
    fn drag_then_settle_comes_to_rest() {
        let (mut pilot, c) = scroller();
        pilot.drag(c, Point::new(50.0, 250.0), Point::new(50.0, 50.0), 10);
        assert!(pilot.settle(600));
        let pos = pilot.stage().scroll_pane(c).unwrap().pos_y();
        assert!(pos > 0.0 && pos <= 700.0);
        assert!(pilot.events().contains(&StageEvent::ScrollEnd(c)));
    }

    #[test]
    fn wheel_scrolls_forward() {
        let (mut pilot, c) = scroller();
        pilot.wheel(c, 1.0);
        assert!(pilot.settle(600));
        assert!(pilot.stage().scroll_pane(c).unwrap().pos_y() > 0.0);
    }
}
