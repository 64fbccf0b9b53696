//! Scroll pane state and the physics that does not need the stage.
//!
//! A [`ScrollPane`] tracks two positions per axis. `pos` is the logical
//! scroll position, always clamped to `[0, overlap]`. `origin` is where the
//! content container actually sits; it is normally `-pos` but may leave that
//! range while the user pulls past an edge or while a tween bounces back.

use crate::config::StageConfig;
use crate::controller::ControllerId;
use crate::geometry::{lerp, Axis, Point, Size};
use crate::tween::EaseType;

/// Number of content copies a looping list lays out.
pub const LOOP_COPIES: usize = 6;

/// How far an inertial tween may overshoot an edge before it turns back.
const BOUNCE_OVERSHOOT: f32 = 20.0;

/// Velocity (px/s) below which a release does not coast.
const INERTIA_MIN_SPEED: f32 = 500.0;

/// Per-frame velocity decay while the pointer rests.
const VELOCITY_DECAY: f32 = 0.833;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Axes a pane scrolls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollType {
    Horizontal,
    #[default]
    Vertical,
    Both,
}

impl ScrollType {
    pub fn scrolls(self, axis: Axis) -> bool {
        match self {
            ScrollType::Horizontal => axis == Axis::X,
            ScrollType::Vertical => axis == Axis::Y,
            ScrollType::Both => true,
        }
    }
}

/// When scrollbars show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBarDisplay {
    /// Shown only while there is something to scroll.
    #[default]
    Default,
    /// Always shown; disabled when there is nothing to scroll.
    Visible,
    /// Shown while scrolling, hidden after a short delay.
    Auto,
    Hidden,
}

/// Per-pane configuration. Unset fields fall back to the [`StageConfig`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollOptions {
    pub scroll_type: ScrollType,
    pub bar_display: ScrollBarDisplay,
    pub bounce_back: Option<bool>,
    pub touch_effect: bool,
    pub mouse_wheel: bool,
    /// Snap to whole view-sized pages.
    pub page_mode: bool,
    /// Snap to child (or list item) boundaries.
    pub snap_to_item: bool,
    pub inertia_disabled: bool,
    pub scroll_step: Option<f32>,
    pub deceleration_rate: Option<f32>,
}

impl ScrollOptions {
    /// Touch and wheel scrolling on the given axes.
    pub fn new(scroll_type: ScrollType) -> Self {
        Self {
            scroll_type,
            touch_effect: true,
            mouse_wheel: true,
            ..Self::default()
        }
    }

    pub fn with_bar_display(mut self, display: ScrollBarDisplay) -> Self {
        self.bar_display = display;
        self
    }

    pub fn with_bounce_back(mut self, bounce: bool) -> Self {
        self.bounce_back = Some(bounce);
        self
    }

    pub fn with_page_mode(mut self) -> Self {
        self.page_mode = true;
        self
    }

    pub fn with_snap_to_item(mut self) -> Self {
        self.snap_to_item = true;
        self
    }

    pub fn without_inertia(mut self) -> Self {
        self.inertia_disabled = true;
        self
    }

    pub fn without_touch_effect(mut self) -> Self {
        self.touch_effect = false;
        self
    }

    pub fn with_scroll_step(mut self, px: f32) -> Self {
        self.scroll_step = Some(px);
        self
    }

    pub fn with_deceleration_rate(mut self, rate: f32) -> Self {
        self.deceleration_rate = Some(rate);
        self
    }
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

/// What started a scroll tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenMode {
    /// An animated `set_pos`.
    GoTo,
    /// A release: inertia, page/snap alignment, or bounce back.
    Inertia,
}

/// Per-axis cubic-out tween of the content origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTween {
    pub mode: TweenMode,
    pub start: Point,
    pub change: Point,
    pub duration: Point,
    pub time: Point,
}

impl ScrollTween {
    pub(crate) fn new(mode: TweenMode, start: Point, change: Point, duration: Point) -> Self {
        Self {
            mode,
            start,
            change,
            duration,
            time: Point::ZERO,
        }
    }

    pub fn is_done(&self) -> bool {
        self.change == Point::ZERO
    }

    /// Advance one axis and return its new origin.
    ///
    /// An inertial tween with bounce may run past `[-overlap, 0]` by a few
    /// pixels; it then restarts toward the edge. Otherwise the value is
    /// clamped and the axis ends.
    pub(crate) fn step(
        &mut self,
        axis: Axis,
        dt: f32,
        current: f32,
        overlap: f32,
        bounce: bool,
        bounce_time: f32,
    ) -> f32 {
        let change = self.change.get(axis);
        if change == 0.0 {
            return current;
        }
        let time = self.time.get_mut(axis);
        *time += dt;
        let time = *time;
        let duration = self.duration.get(axis);
        let start = self.start.get(axis);

        let value = if time >= duration {
            *self.change.get_mut(axis) = 0.0;
            start + change
        } else {
            start + change * EaseType::CubicOut.evaluate(time / duration)
        };
        let change = self.change.get(axis);
        let (near, far) = (0.0, -overlap);

        if self.mode == TweenMode::Inertia && bounce {
            let past_near = (value > BOUNCE_OVERSHOOT + near && change > 0.0) || (value > near && change == 0.0);
            let past_far = (value < far - BOUNCE_OVERSHOOT && change < 0.0) || (value < far && change == 0.0);
            let edge = if past_near {
                Some(near)
            } else if past_far {
                Some(far)
            } else {
                None
            };
            if let Some(edge) = edge {
                *self.time.get_mut(axis) = 0.0;
                *self.duration.get_mut(axis) = bounce_time;
                *self.change.get_mut(axis) = edge - value;
                *self.start.get_mut(axis) = value;
            }
            value
        } else if value > near {
            *self.change.get_mut(axis) = 0.0;
            near
        } else if value < far {
            *self.change.get_mut(axis) = 0.0;
            far
        } else {
            value
        }
    }

    /// Shorten an aligned axis in proportion to how much of the original
    /// travel remains.
    pub(crate) fn fix_duration(&mut self, axis: Axis, old_change: f32, min: f32) {
        let change = self.change.get(axis);
        if change == 0.0 || change.abs() >= old_change.abs() {
            return;
        }
        let d = (change / old_change).abs() * self.duration.get(axis);
        *self.duration.get_mut(axis) = d.max(min);
    }
}

// ---------------------------------------------------------------------------
// Drag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Drag {
    /// Origin when the pointer went down.
    pub(crate) container_pos: Point,
    pub(crate) begin: Point,
    pub(crate) last: Point,
    pub(crate) last_move: f64,
    /// The pointer travelled past the touch sensitivity.
    pub(crate) hold_done: bool,
}

/// Drag constants read from the stage config.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DragParams {
    pub(crate) now: f64,
    pub(crate) frame_rate: f32,
    pub(crate) sensitivity: f32,
    pub(crate) pull_ratio: f32,
}

// ---------------------------------------------------------------------------
// ScrollPane
// ---------------------------------------------------------------------------

/// Scroll state attached to a container.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollPane {
    pub(crate) scroll_type: ScrollType,
    pub(crate) bar_display: ScrollBarDisplay,
    pub(crate) bounce_back: bool,
    pub(crate) touch_effect: bool,
    pub(crate) mouse_wheel: bool,
    pub(crate) page_mode: bool,
    pub(crate) snap_to_item: bool,
    pub(crate) inertia_disabled: bool,
    pub(crate) scroll_step: f32,
    pub(crate) deceleration_rate: f32,

    pub(crate) view_size: Size,
    pub(crate) content_size: Size,
    pub(crate) overlap: Size,
    pub(crate) page_size: Size,
    pub(crate) pos: Point,
    pub(crate) origin: Point,
    pub(crate) velocity: Point,

    pub(crate) drag: Option<Drag>,
    /// A drag is in progress, or a pointer-down interrupted a tween.
    pub(crate) dragged: bool,
    pub(crate) tween: Option<ScrollTween>,
    pub(crate) page_controller: Option<ControllerId>,
    pub(crate) loop_axis: Option<Axis>,
    /// Gap between loop copies (the list's line or column gap).
    pub(crate) loop_gap: f32,
    /// Seconds an auto scrollbar stays up.
    pub(crate) auto_hide: f32,
}

impl ScrollPane {
    pub fn new(options: ScrollOptions, config: &StageConfig) -> Self {
        Self {
            scroll_type: options.scroll_type,
            bar_display: options.bar_display,
            bounce_back: options.bounce_back.unwrap_or(config.bounce_back),
            touch_effect: options.touch_effect,
            mouse_wheel: options.mouse_wheel,
            page_mode: options.page_mode,
            snap_to_item: options.snap_to_item,
            inertia_disabled: options.inertia_disabled,
            scroll_step: options.scroll_step.unwrap_or(config.scroll_step),
            deceleration_rate: options.deceleration_rate.unwrap_or(config.deceleration_rate),
            view_size: Size::ZERO,
            content_size: Size::ZERO,
            overlap: Size::ZERO,
            page_size: Size::ZERO,
            pos: Point::ZERO,
            origin: Point::ZERO,
            velocity: Point::ZERO,
            drag: None,
            dragged: false,
            tween: None,
            page_controller: None,
            loop_axis: None,
            loop_gap: 0.0,
            auto_hide: 0.0,
        }
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn scroll_type(&self) -> ScrollType {
        self.scroll_type
    }

    pub fn bar_display(&self) -> ScrollBarDisplay {
        self.bar_display
    }

    pub fn bounce_back(&self) -> bool {
        self.bounce_back
    }

    pub fn is_page_mode(&self) -> bool {
        self.page_mode
    }

    /// Logical scroll position, within `[0, overlap]`.
    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn pos_x(&self) -> f32 {
        self.pos.x
    }

    pub fn pos_y(&self) -> f32 {
        self.pos.y
    }

    /// Where the content container sits. May be out of range during a bounce.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Position the content is actually showing, clamped to the scroll range.
    pub fn scrolling_pos(&self) -> Point {
        Point::new(
            (-self.origin.x).clamp(0.0, self.overlap.width),
            (-self.origin.y).clamp(0.0, self.overlap.height),
        )
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// How far the content exceeds the view, per axis.
    pub fn overlap(&self) -> Size {
        self.overlap
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    pub fn percent_x(&self) -> f32 {
        if self.overlap.width == 0.0 {
            0.0
        } else {
            self.pos.x / self.overlap.width
        }
    }

    pub fn percent_y(&self) -> f32 {
        if self.overlap.height == 0.0 {
            0.0
        } else {
            self.pos.y / self.overlap.height
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.as_ref().is_some_and(|d| d.hold_done)
    }

    pub fn is_tweening(&self) -> bool {
        self.tween.is_some()
    }

    pub fn tween(&self) -> Option<&ScrollTween> {
        self.tween.as_ref()
    }

    pub fn page_controller(&self) -> Option<ControllerId> {
        self.page_controller
    }

    pub fn loop_axis(&self) -> Option<Axis> {
        self.loop_axis
    }

    pub fn is_bottom_most(&self) -> bool {
        self.pos.y == self.overlap.height || self.overlap.height == 0.0
    }

    pub fn is_right_most(&self) -> bool {
        self.pos.x == self.overlap.width || self.overlap.width == 0.0
    }

    /// The page nearest the current position. Zero outside page mode.
    pub fn current_page(&self, axis: Axis) -> usize {
        if !self.page_mode {
            return 0;
        }
        let page_size = self.page_size.get(axis);
        if page_size <= 0.0 {
            return 0;
        }
        let pos = self.pos.get(axis);
        let mut page = (pos / page_size).floor();
        if pos - page * page_size > page_size * 0.5 {
            page += 1.0;
        }
        page.max(0.0) as usize
    }

    pub fn current_page_x(&self) -> usize {
        self.current_page(Axis::X)
    }

    pub fn current_page_y(&self) -> usize {
        self.current_page(Axis::Y)
    }

    // ── Sizes ────────────────────────────────────────────────────────

    /// Returns whether anything changed.
    pub(crate) fn set_view_size(&mut self, size: Size) -> bool {
        let size = Size::new(size.width.max(1.0), size.height.max(1.0));
        if size == self.view_size {
            return false;
        }
        self.view_size = size;
        self.page_size = size;
        self.handle_size_changed();
        true
    }

    /// Returns whether anything changed.
    pub(crate) fn set_content_size(&mut self, size: Size) -> bool {
        if size == self.content_size {
            return false;
        }
        self.content_size = size;
        self.handle_size_changed();
        true
    }

    fn handle_size_changed(&mut self) {
        self.overlap = Size::new(
            (self.content_size.width - self.view_size.width).max(0.0).ceil(),
            (self.content_size.height - self.view_size.height).max(0.0).ceil(),
        );
        self.pos.x = self.pos.x.clamp(0.0, self.overlap.width);
        self.pos.y = self.pos.y.clamp(0.0, self.overlap.height);
        self.origin.x = self.origin.x.clamp(-self.overlap.width, 0.0);
        self.origin.y = self.origin.y.clamp(-self.overlap.height, 0.0);
    }

    // ── Loop ─────────────────────────────────────────────────────────

    fn loop_part_size(&self, division: f32, axis: Axis) -> f32 {
        (self.content_size.get(axis) + self.loop_gap) / division
    }

    /// Re-anchor a looping position that ran off either end by half the
    /// content, moving the origin with it. Returns whether it moved.
    pub(crate) fn loop_check_current(&mut self) -> bool {
        let Some(axis) = self.loop_axis else {
            return false;
        };
        let overlap = self.overlap.get(axis);
        if overlap <= 0.0 {
            return false;
        }
        let half = self.loop_part_size(2.0, axis);
        let pos = self.pos.get_mut(axis);
        let changed = if *pos < 0.001 {
            *pos += half;
            true
        } else if *pos >= overlap {
            *pos -= half;
            true
        } else {
            false
        };
        if changed {
            self.origin = -self.pos;
        }
        changed
    }

    /// Map a requested position back into the middle copies, shifting the
    /// current position by whole loop units so the move stays short.
    pub(crate) fn loop_check_new_pos(&mut self, value: f32, axis: Axis) -> f32 {
        let overlap = self.overlap.get(axis);
        if overlap == 0.0 {
            return value;
        }
        let mut value = value;
        let mut pos = self.pos.get(axis);
        let unit = self.loop_part_size(LOOP_COPIES as f32, axis);
        let mut changed = false;
        if value < 0.001 {
            value += self.loop_part_size(2.0, axis);
            if value > pos {
                let v = ((value - pos) / unit).ceil() * unit;
                pos = (pos + v).clamp(0.0, overlap);
                changed = true;
            }
        } else if value >= overlap {
            value -= self.loop_part_size(2.0, axis);
            if value < pos {
                let v = ((pos - value) / unit).ceil() * unit;
                pos = (pos - v).clamp(0.0, overlap);
                changed = true;
            }
        }
        if changed {
            *self.origin.get_mut(axis) = -pos;
        }
        value
    }

    /// Pull an inertial target that leaves the content back by half the
    /// content, shifting the tween start with it.
    pub(crate) fn loop_check_target(&self, end: &mut Point, start: &mut Point) {
        let Some(axis) = self.loop_axis else {
            return;
        };
        let overlap = self.overlap.get(axis);
        let half = self.loop_part_size(2.0, axis);
        let e = end.get_mut(axis);
        let s = start.get_mut(axis);
        if *e > 0.0 {
            let tmp = *s - half;
            if tmp <= 0.0 && tmp >= -overlap {
                *e -= half;
                *s = tmp;
            }
        } else if *e < -overlap {
            let tmp = *s + half;
            if tmp <= 0.0 && tmp >= -overlap {
                *e += half;
                *s = tmp;
            }
        }
    }

    // ── Drag ─────────────────────────────────────────────────────────

    pub(crate) fn begin_drag(&mut self, at: Point, now: f64) {
        self.drag = Some(Drag {
            container_pos: self.origin,
            begin: at,
            last: at,
            last_move: now,
            hold_done: false,
        });
        self.velocity = Point::ZERO;
    }

    /// Follow the pointer. Returns `false` while the movement is still
    /// below the touch sensitivity.
    pub(crate) fn drag_to(&mut self, at: Point, p: DragParams) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let dx = (drag.begin.x - at.x).abs();
        let dy = (drag.begin.y - at.y).abs();
        let (sh, sv) = match self.scroll_type {
            ScrollType::Vertical => {
                if !drag.hold_done && dy < p.sensitivity {
                    return false;
                }
                (false, true)
            }
            ScrollType::Horizontal => {
                if !drag.hold_done && dx < p.sensitivity {
                    return false;
                }
                (true, false)
            }
            ScrollType::Both => {
                if !drag.hold_done && dy < p.sensitivity && dx < p.sensitivity {
                    return false;
                }
                (true, true)
            }
        };

        let target = drag.container_pos + (at - drag.begin);
        let follow = |v: f32, overlap: f32, view: f32| -> f32 {
            if v > 0.0 {
                if self.bounce_back {
                    (v * 0.5).min(view * p.pull_ratio)
                } else {
                    0.0
                }
            } else if v < -overlap {
                if self.bounce_back {
                    ((v + overlap) * 0.5).max(-view * p.pull_ratio) - overlap
                } else {
                    -overlap
                }
            } else {
                v
            }
        };
        if sh {
            self.origin.x = follow(target.x, self.overlap.width, self.view_size.width);
        }
        if sv {
            self.origin.y = follow(target.y, self.overlap.height, self.view_size.height);
        }

        let dt = ((p.now - drag.last_move) as f32).max(1.0 / p.frame_rate);
        let mut delta = at - drag.last;
        if !sh {
            delta.x = 0.0;
        }
        if !sv {
            delta.y = 0.0;
        }
        let elapsed = dt * p.frame_rate - 1.0;
        if elapsed > 1.0 {
            let factor = VELOCITY_DECAY.powf(elapsed);
            self.velocity = Point::new(self.velocity.x * factor, self.velocity.y * factor);
        }
        let t = (dt * 10.0).min(1.0);
        self.velocity = Point::new(
            lerp(self.velocity.x, delta.x / dt, t),
            lerp(self.velocity.y, delta.y / dt, t),
        );
        drag.last = at;
        drag.last_move = p.now;
        drag.hold_done = true;
        self.dragged = true;

        if self.overlap.width > 0.0 {
            self.pos.x = (-self.origin.x).clamp(0.0, self.overlap.width);
        }
        if self.overlap.height > 0.0 {
            self.pos.y = (-self.origin.y).clamp(0.0, self.overlap.height);
        }
        if self.loop_axis.is_some() {
            let before = self.origin;
            if self.loop_check_current() {
                if let Some(drag) = self.drag.as_mut() {
                    drag.container_pos = drag.container_pos + (self.origin - before);
                }
            }
        }
        true
    }

    /// Decay velocity for the time the pointer rested before release.
    pub(crate) fn settle_velocity(&mut self, now: f64, frame_rate: f32) {
        let Some(drag) = self.drag.as_ref() else {
            return;
        };
        let elapsed = (now - drag.last_move) as f32 * frame_rate - 1.0;
        if elapsed > 1.0 {
            let factor = VELOCITY_DECAY.powf(elapsed);
            self.velocity = Point::new(self.velocity.x * factor, self.velocity.y * factor);
        }
    }

    // ── Release targets ──────────────────────────────────────────────

    /// Project where a release coasts to, and for how long, per axis.
    pub(crate) fn inertial_target(&mut self, start: Point, min_duration: f32) -> (Point, Point) {
        let (x, dx) = self.inertial_axis(start.x, Axis::X, min_duration);
        let (y, dy) = self.inertial_axis(start.y, Axis::Y, min_duration);
        (Point::new(x, y), Point::new(dx, dy))
    }

    fn inertial_axis(&mut self, pos: f32, axis: Axis, min_duration: f32) -> (f32, f32) {
        let overlap = self.overlap.get(axis);
        let mut pos = pos;
        let mut duration = 0.0;
        if pos > 0.0 {
            pos = 0.0;
        } else if pos < -overlap {
            pos = -overlap;
        } else {
            let mut v = self.velocity.get(axis);
            let speed = v.abs();
            if speed > INERTIA_MIN_SPEED {
                let ratio = ((speed - INERTIA_MIN_SPEED) / INERTIA_MIN_SPEED).powi(2).min(1.0);
                let speed = speed * ratio;
                v *= ratio;
                *self.velocity.get_mut(axis) = v;
                if speed > 60.0 {
                    // Frames until the speed decays to 60 px/s.
                    duration = (60.0 / speed).ln() / self.deceleration_rate.ln() / 60.0;
                    pos += (v * duration * 0.4).floor();
                }
            }
        }
        (pos, duration.max(min_duration))
    }

    /// Align an origin to a page boundary.
    ///
    /// `reference` is the origin the gesture started from. For an inertial
    /// release `tween_start` is the origin at release; the target then stays
    /// within one page of where the drag began.
    pub(crate) fn align_by_page(
        &self,
        pos: f32,
        axis: Axis,
        reference: f32,
        tween_start: Option<f32>,
        paging_threshold: f32,
    ) -> f32 {
        let page_size = self.page_size.get(axis);
        let content = self.content_size.get(axis);
        let overlap = self.overlap.get(axis);
        if page_size <= 0.0 {
            return pos;
        }
        let last_page = ((content / page_size).ceil() - 1.0).max(0.0);
        let page_of = |p: f32| {
            if p > 0.0 {
                0.0
            } else if p < -overlap {
                last_page
            } else {
                (-p / page_size).floor()
            }
        };

        let mut pos = pos;
        let mut page;
        if pos > 0.0 || pos < -overlap {
            page = page_of(pos);
        } else {
            page = (-pos / page_size).floor();
            let change = pos - reference;
            let test_size = page_size.min(content - (page + 1.0) * page_size);
            let delta = -pos - page * page_size;
            let threshold = if change.abs() > page_size {
                0.5
            } else if change < 0.0 {
                paging_threshold
            } else {
                1.0 - paging_threshold
            };
            if delta > test_size * threshold {
                page += 1.0;
            }
            pos = (-page * page_size).max(-overlap);
        }

        if let Some(start) = tween_start {
            let old_page = page_of(start);
            let start_page = (-reference / page_size).floor();
            if (page - start_page).abs() > 1.0 && (old_page - start_page).abs() <= 1.0 {
                page = if page > start_page { start_page + 1.0 } else { start_page - 1.0 };
                pos = -page * page_size;
            }
        }
        pos
    }
}

/// Whether a snap should move on to the next boundary.
///
/// `dir < 0` is a forward move (content travelling toward its end), which
/// needs only `threshold` of the item; a backward move needs `1 - threshold`.
pub(crate) fn should_snap_to_next(dir: f32, delta: f32, size: f32, threshold: f32) -> bool {
    (dir < 0.0 && delta > threshold * size)
        || (dir > 0.0 && delta > (1.0 - threshold) * size)
        || (dir == 0.0 && delta > size / 2.0)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pane(view: Size, content: Size) -> ScrollPane {
        let mut p = ScrollPane::new(ScrollOptions::new(ScrollType::Vertical), &StageConfig::default());
        p.set_view_size(view);
        p.set_content_size(content);
        p
    }

    fn params(now: f64) -> DragParams {
        DragParams {
            now,
            frame_rate: 60.0,
            sensitivity: 20.0,
            pull_ratio: 0.5,
        }
    }

    // ── Sizes ────────────────────────────────────────────────────────

    #[test]
    fn overlap_follows_sizes() {
        let mut p = pane(Size::new(100.0, 300.0), Size::new(100.0, 1000.0));
        assert_eq!(p.overlap(), Size::new(0.0, 700.0));
        p.pos.y = 600.0;
        p.set_content_size(Size::new(100.0, 500.0));
        assert_eq!(p.pos_y(), 200.0);
    }

    #[test]
    fn content_smaller_than_view_has_no_overlap() {
        let p = pane(Size::new(100.0, 300.0), Size::new(50.0, 100.0));
        assert_eq!(p.overlap(), Size::ZERO);
        assert!(p.is_bottom_most());
    }

    // ── Drag ─────────────────────────────────────────────────────────

    #[test]
    fn drag_ignores_small_moves() {
        let mut p = pane(Size::new(100.0, 300.0), Size::new(100.0, 1000.0));
        p.begin_drag(Point::new(50.0, 200.0), 0.0);
        assert!(!p.drag_to(Point::new(50.0, 190.0), params(0.016)));
        assert_eq!(p.origin(), Point::ZERO);
        assert!(p.drag_to(Point::new(50.0, 150.0), params(0.032)));
        assert_eq!(p.origin(), Point::new(0.0, -50.0));
        assert_eq!(p.pos_y(), 50.0);
    }

    #[test]
    fn pull_past_edge_moves_at_half_speed() {
        let mut p = pane(Size::new(100.0, 300.0), Size::new(100.0, 1000.0));
        p.begin_drag(Point::new(50.0, 0.0), 0.0);
        p.drag_to(Point::new(50.0, 100.0), params(0.016));
        assert_eq!(p.origin().y, 50.0);
        assert_eq!(p.pos_y(), 0.0);
        // Capped at pull_ratio of the view.
        p.drag_to(Point::new(50.0, 1000.0), params(0.032));
        assert_eq!(p.origin().y, 150.0);
    }

    #[test]
    fn pull_without_bounce_clamps() {
        let mut p = pane(Size::new(100.0, 300.0), Size::new(100.0, 1000.0));
        p.bounce_back = false;
        p.begin_drag(Point::new(50.0, 0.0), 0.0);
        p.drag_to(Point::new(50.0, 100.0), params(0.016));
        assert_eq!(p.origin().y, 0.0);
    }

    #[test]
    fn velocity_tracks_pointer() {
        let mut p = pane(Size::new(100.0, 300.0), Size::new(100.0, 1000.0));
        p.begin_drag(Point::new(0.0, 500.0), 0.0);
        for i in 1..=10 {
            let t = f64::from(i) / 60.0;
            p.drag_to(Point::new(0.0, 500.0 - 30.0 * i as f32), params(t));
        }
        // 30 px per 1/60 s approaches -1800 px/s.
        assert!(p.velocity().y < -1500.0);
        assert_eq!(p.velocity().x, 0.0);
    }

    // ── Tween ────────────────────────────────────────────────────────

    #[test]
    fn tween_lands_exactly() {
        let mut t = ScrollTween::new(
            TweenMode::GoTo,
            Point::ZERO,
            Point::new(0.0, -300.0),
            Point::new(0.5, 0.5),
        );
        let mut y = 0.0;
        for _ in 0..10 {
            y = t.step(Axis::Y, 0.1, y, 700.0, true, 0.3);
        }
        assert_eq!(y, -300.0);
        assert!(t.is_done());
    }

    #[test]
    fn inertia_overshoot_turns_back() {
        let mut t = ScrollTween::new(
            TweenMode::Inertia,
            Point::new(0.0, -650.0),
            Point::new(0.0, -200.0),
            Point::new(1.0, 1.0),
        );
        let mut y = -650.0;
        let mut min = y;
        for _ in 0..200 {
            y = t.step(Axis::Y, 0.02, y, 700.0, true, 0.3);
            min = f32::min(min, y);
            if t.is_done() {
                break;
            }
        }
        assert!(min < -700.0);
        assert_eq!(y, -700.0);
    }

    #[test]
    fn fix_duration_scales_down() {
        let mut t = ScrollTween::new(
            TweenMode::Inertia,
            Point::ZERO,
            Point::new(0.0, -100.0),
            Point::new(1.0, 2.0),
        );
        t.fix_duration(Axis::Y, -400.0, 0.3);
        assert_eq!(t.duration.y, 0.5);
    }

    // ── Paging ───────────────────────────────────────────────────────

    #[test]
    fn page_alignment_is_direction_aware() {
        let mut p = pane(Size::new(100.0, 100.0), Size::new(100.0, 500.0));
        p.page_mode = true;
        // Forward by 40% of a page turns it.
        assert_eq!(p.align_by_page(-40.0, Axis::Y, 0.0, None, 0.3), -100.0);
        // Forward by 20% does not.
        assert_eq!(p.align_by_page(-20.0, Axis::Y, 0.0, None, 0.3), 0.0);
        // Backward by 40% turns it back.
        assert_eq!(p.align_by_page(-60.0, Axis::Y, -100.0, None, 0.3), 0.0);
        // Backward by 20% does not.
        assert_eq!(p.align_by_page(-80.0, Axis::Y, -100.0, None, 0.3), -100.0);
    }

    #[test]
    fn inertial_paging_moves_one_page_at_most() {
        let mut p = pane(Size::new(100.0, 100.0), Size::new(100.0, 1000.0));
        p.page_mode = true;
        let pos = p.align_by_page(-420.0, Axis::Y, -100.0, Some(-150.0), 0.3);
        assert_eq!(pos, -200.0);
    }

    #[test]
    fn current_page_rounds_to_nearest() {
        let mut p = pane(Size::new(100.0, 100.0), Size::new(100.0, 500.0));
        p.page_mode = true;
        p.pos.y = 149.0;
        assert_eq!(p.current_page_y(), 1);
        p.pos.y = 151.0;
        assert_eq!(p.current_page_y(), 2);
    }

    #[test]
    fn snap_thresholds() {
        assert!(should_snap_to_next(-1.0, 5.0, 40.0, 0.1));
        assert!(!should_snap_to_next(1.0, 30.0, 40.0, 0.1));
        assert!(should_snap_to_next(1.0, 37.0, 40.0, 0.1));
        assert!(should_snap_to_next(0.0, 21.0, 40.0, 0.1));
    }

    // ── Loop ─────────────────────────────────────────────────────────

    #[test]
    fn loop_reanchors_at_edges() {
        let mut p = pane(Size::new(100.0, 100.0), Size::new(100.0, 600.0));
        p.loop_axis = Some(Axis::Y);
        assert!(p.loop_check_current());
        assert_eq!(p.pos_y(), 300.0);
        assert_eq!(p.origin().y, -300.0);
        p.pos.y = 500.0;
        assert!(p.loop_check_current());
        assert_eq!(p.pos_y(), 200.0);
    }
}
