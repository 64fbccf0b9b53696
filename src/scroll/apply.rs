//! Stage-side scroll operations: attaching panes, positioning, pointer and
//! wheel input, the per-frame tween step and page-controller sync.
//!
//! Every position change funnels through the same two steps: push the
//! content origin to the host primitive, then queue [`StageEvent::Scroll`]
//! and let a virtual list re-window. Wheel, drag and programmatic scrolls
//! are indistinguishable downstream.

use tracing::{debug, trace};

use super::pane::{should_snap_to_next, DragParams, ScrollOptions, ScrollPane, ScrollTween, ScrollType, TweenMode};
use super::scrollbar::ScrollbarState;
use crate::controller::ControllerId;
use crate::error::ConfigError;
use crate::geometry::{Axis, Point, Rect, Size};
use crate::stage::{ObjectData, ObjectId, Stage, StageEvent};

impl Stage {
    // ── Attach ───────────────────────────────────────────────────────

    /// Make `container` scrollable. The view follows the container's size
    /// and the content follows its children's bounds.
    pub fn set_scroll_pane(&mut self, container: ObjectId, options: ScrollOptions) -> Result<(), ConfigError> {
        let size = self
            .objects
            .get(container)
            .map(ObjectData::size)
            .ok_or(ConfigError::UnknownObject)?;
        let mut pane = ScrollPane::new(options, &self.config);
        pane.set_view_size(size);
        pane.set_content_size(self.children_bounds(container).size());
        self.panes.insert(container, pane);
        self.sync_pane_origin(container);
        debug!(?container, "scroll pane attached");
        Ok(())
    }

    pub fn remove_scroll_pane(&mut self, container: ObjectId) {
        if self.panes.remove(container).is_some() {
            if let Some(obj) = self.objects.get_mut(container) {
                obj.primitive.set_content_offset(0.0, 0.0);
            }
        }
    }

    pub fn scroll_pane(&self, container: ObjectId) -> Option<&ScrollPane> {
        self.panes.get(container)
    }

    pub fn scrollbar(&self, container: ObjectId, axis: Axis) -> Option<ScrollbarState> {
        self.panes.get(container).map(|p| ScrollbarState::compute(p, axis))
    }

    /// Bind a controller whose selected index tracks the current page.
    pub fn set_page_controller(
        &mut self,
        container: ObjectId,
        controller: Option<ControllerId>,
    ) -> Result<(), ConfigError> {
        if let Some(c) = controller {
            if !self.controllers.contains_key(c) {
                return Err(ConfigError::UnknownController);
            }
        }
        let pane = self.panes.get_mut(container).ok_or(ConfigError::UnknownObject)?;
        pane.page_controller = controller;
        Ok(())
    }

    pub(crate) fn set_scroll_loop(&mut self, container: ObjectId, axis: Option<Axis>, gap: f32) {
        if let Some(pane) = self.panes.get_mut(container) {
            pane.loop_axis = axis;
            pane.loop_gap = gap;
        }
    }

    // ── Sizes ────────────────────────────────────────────────────────

    pub(crate) fn on_pane_view_resized(&mut self, container: ObjectId) {
        let Some(size) = self.objects.get(container).map(ObjectData::size) else {
            return;
        };
        if self.panes.get_mut(container).is_some_and(|p| p.set_view_size(size)) {
            self.after_pane_resized(container);
        }
    }

    pub(crate) fn set_content_size(&mut self, container: ObjectId, size: Size) {
        if self.panes.get_mut(container).is_some_and(|p| p.set_content_size(size)) {
            trace!(?container, ?size, "content size");
            self.after_pane_resized(container);
        }
    }

    fn after_pane_resized(&mut self, container: ObjectId) {
        self.sync_pane_origin(container);
        if self.panes.get(container).is_some_and(|p| p.page_mode) {
            self.update_page_controller(container);
        }
    }

    // ── Position ─────────────────────────────────────────────────────

    pub fn set_pos_x(&mut self, container: ObjectId, value: f32, animated: bool) {
        self.set_pos_axis(container, Axis::X, value, animated);
    }

    pub fn set_pos_y(&mut self, container: ObjectId, value: f32, animated: bool) {
        self.set_pos_axis(container, Axis::Y, value, animated);
    }

    /// Scroll to a fraction of the scrollable range.
    pub fn set_percent_x(&mut self, container: ObjectId, percent: f32, animated: bool) {
        if let Some(overlap) = self.panes.get(container).map(|p| p.overlap.width) {
            self.set_pos_x(container, overlap * percent.clamp(0.0, 1.0), animated);
        }
    }

    pub fn set_percent_y(&mut self, container: ObjectId, percent: f32, animated: bool) {
        if let Some(overlap) = self.panes.get(container).map(|p| p.overlap.height) {
            self.set_pos_y(container, overlap * percent.clamp(0.0, 1.0), animated);
        }
    }

    pub fn scroll_top(&mut self, container: ObjectId, animated: bool) {
        self.set_percent_y(container, 0.0, animated);
    }

    pub fn scroll_bottom(&mut self, container: ObjectId, animated: bool) {
        self.set_percent_y(container, 1.0, animated);
    }

    pub fn scroll_left(&mut self, container: ObjectId, animated: bool) {
        self.set_percent_x(container, 0.0, animated);
    }

    pub fn scroll_right(&mut self, container: ObjectId, animated: bool) {
        self.set_percent_x(container, 1.0, animated);
    }

    /// Step up by `ratio` scroll steps, or pages in page mode.
    pub fn scroll_up(&mut self, container: ObjectId, ratio: f32, animated: bool) {
        self.scroll_step_by(container, Axis::Y, -ratio, animated);
    }

    pub fn scroll_down(&mut self, container: ObjectId, ratio: f32, animated: bool) {
        self.scroll_step_by(container, Axis::Y, ratio, animated);
    }

    pub fn scroll_step_left(&mut self, container: ObjectId, ratio: f32, animated: bool) {
        self.scroll_step_by(container, Axis::X, -ratio, animated);
    }

    pub fn scroll_step_right(&mut self, container: ObjectId, ratio: f32, animated: bool) {
        self.scroll_step_by(container, Axis::X, ratio, animated);
    }

    fn scroll_step_by(&mut self, container: ObjectId, axis: Axis, ratio: f32, animated: bool) {
        let Some(pane) = self.panes.get(container) else {
            return;
        };
        let step = if pane.page_mode {
            pane.page_size.get(axis)
        } else {
            pane.scroll_step
        };
        let target = pane.pos.get(axis) + step * ratio;
        self.set_pos_axis(container, axis, target, animated);
    }

    /// Jump to a page. Ignored outside page mode.
    pub fn set_current_page_x(&mut self, container: ObjectId, page: usize, animated: bool) {
        self.set_current_page(container, Axis::X, page, animated);
    }

    pub fn set_current_page_y(&mut self, container: ObjectId, page: usize, animated: bool) {
        self.set_current_page(container, Axis::Y, page, animated);
    }

    fn set_current_page(&mut self, container: ObjectId, axis: Axis, page: usize, animated: bool) {
        let Some(pane) = self.panes.get(container) else {
            return;
        };
        if !pane.page_mode || pane.overlap.get(axis) <= 0.0 {
            return;
        }
        let target = page as f32 * pane.page_size.get(axis);
        self.set_pos_axis(container, axis, target, animated);
    }

    /// Scroll the minimum amount that brings `rect` (content coordinates)
    /// into view. With `set_first` the rect is aligned to the top/left edge.
    pub fn scroll_to_view(&mut self, container: ObjectId, rect: Rect, animated: bool, set_first: bool) {
        self.validate();
        let Some(pane) = self.panes.get(container) else {
            return;
        };
        let (pos, view, overlap, page) = (pane.pos, pane.view_size, pane.overlap, pane.page_size);
        let page_mode = pane.page_mode;

        let target = |start: f32, extent: f32, pos: f32, view: f32, page: f32| -> Option<f32> {
            let end = pos + view;
            if set_first || start <= pos || extent >= view {
                Some(if page_mode { (start / page).floor() * page } else { start })
            } else if start + extent > end {
                Some(if page_mode {
                    (start / page).floor() * page
                } else if extent <= view / 2.0 {
                    start + extent * 2.0 - view
                } else {
                    start + extent - view
                })
            } else {
                None
            }
        };

        if overlap.height > 0.0 {
            if let Some(y) = target(rect.y, rect.height, pos.y, view.height, page.height) {
                self.set_pos_axis(container, Axis::Y, y, animated);
            }
        }
        if overlap.width > 0.0 {
            if let Some(x) = target(rect.x, rect.width, pos.x, view.width, page.width) {
                self.set_pos_axis(container, Axis::X, x, animated);
            }
        }
    }

    /// Whether a child of a scroll container is at least partly in view.
    pub fn is_child_in_view(&self, container: ObjectId, child: ObjectId) -> bool {
        let Some(obj) = self.objects.get(child) else {
            return false;
        };
        let Some(pane) = self.panes.get(container) else {
            return true;
        };
        for axis in [Axis::X, Axis::Y] {
            if pane.overlap.get(axis) > 0.0 {
                let size = obj.size().get(axis);
                let dist = obj.position().get(axis) + pane.origin.get(axis);
                if dist < -size || dist > pane.view_size.get(axis) {
                    return false;
                }
            }
        }
        true
    }

    fn set_pos_axis(&mut self, container: ObjectId, axis: Axis, value: f32, animated: bool) {
        let Some(pane) = self.panes.get_mut(container) else {
            return;
        };
        let mut value = value;
        if pane.loop_axis == Some(axis) {
            value = pane.loop_check_new_pos(value, axis);
        }
        let value = value.clamp(0.0, pane.overlap.get(axis));
        if value == pane.pos.get(axis) {
            return;
        }
        *pane.pos.get_mut(axis) = value;
        self.refresh_pane(container, animated);
    }

    /// Move the content to the logical position, aligned in page or snap
    /// mode, either at once or through a go-to tween.
    fn refresh_pane(&mut self, container: ObjectId, animated: bool) {
        let Some(pane) = self.panes.get(container) else {
            return;
        };
        if pane.page_mode || pane.snap_to_item {
            let (end, origin, overlap) = (-pane.pos, pane.origin, pane.overlap);
            let aligned = self.align_position(container, end, origin, None);
            if let Some(pane) = self.panes.get_mut(container) {
                pane.pos = Point::new(
                    (-aligned.x).clamp(0.0, overlap.width),
                    (-aligned.y).clamp(0.0, overlap.height),
                );
            }
        }

        let go_time = self.config.scroll_go_time;
        let Some(pane) = self.panes.get_mut(container) else {
            return;
        };
        let page_mode = pane.page_mode;
        if animated && !pane.dragged {
            let target = Point::new(
                if pane.overlap.width > 0.0 { -pane.pos.x } else { 0.0 },
                if pane.overlap.height > 0.0 { -pane.pos.y } else { 0.0 },
            );
            if target != pane.origin {
                pane.tween = Some(ScrollTween::new(
                    TweenMode::GoTo,
                    pane.origin,
                    target - pane.origin,
                    Point::new(go_time, go_time),
                ));
                pane.auto_hide = self.config.scrollbar_auto_hide_delay;
            } else if pane.tween.is_some() {
                self.kill_scroll_tween(container);
            }
        } else {
            let killed = pane.tween.take().is_some();
            pane.origin = -pane.pos;
            pane.loop_check_current();
            if killed {
                self.events.push(StageEvent::ScrollEnd(container));
            }
            self.sync_pane_origin(container);
            self.notify_scrolled(container);
        }
        if page_mode {
            self.update_page_controller(container);
        }
    }

    fn kill_scroll_tween(&mut self, container: ObjectId) {
        if self.panes.get_mut(container).and_then(|p| p.tween.take()).is_some() {
            self.events.push(StageEvent::ScrollEnd(container));
        }
    }

    // ── Alignment ────────────────────────────────────────────────────

    /// Align a target origin to pages or snap points.
    ///
    /// `reference` is the origin the move started from; `tween_start` is set
    /// for a release and makes the alignment direction-aware.
    fn align_position(&self, container: ObjectId, end: Point, reference: Point, tween_start: Option<Point>) -> Point {
        let Some(pane) = self.panes.get(container) else {
            return end;
        };
        if pane.page_mode {
            let threshold = self.config.paging_threshold;
            Point::new(
                pane.align_by_page(end.x, Axis::X, reference.x, tween_start.map(|p| p.x), threshold),
                pane.align_by_page(end.y, Axis::Y, reference.y, tween_start.map(|p| p.y), threshold),
            )
        } else if pane.snap_to_item {
            let dir = if tween_start.is_some() { end - reference } else { Point::ZERO };
            let snapped = self.snapping_position(container, -end, dir);
            let mut out = end;
            if end.x < 0.0 && end.x > -pane.overlap.width {
                out.x = -snapped.x;
            }
            if end.y < 0.0 && end.y > -pane.overlap.height {
                out.y = -snapped.y;
            }
            out
        } else {
            end
        }
    }

    /// Nearest snap point to a scroll position. `dir < 0` on an axis means
    /// the content was moving toward its end.
    pub(crate) fn snapping_position(&self, container: ObjectId, value: Point, dir: Point) -> Point {
        if let Some(p) = self.list_snapping_position(container, value, dir) {
            return p;
        }
        let threshold = self.config.snapping_threshold;
        let rects: Vec<Rect> = self
            .children(container)
            .iter()
            .filter_map(|&c| self.objects.get(c))
            .filter(|o| o.is_displayed())
            .map(ObjectData::rect)
            .collect();
        let snap = |axis: Axis| -> f32 {
            let v = value.get(axis);
            if v == 0.0 {
                return v;
            }
            for (i, r) in rects.iter().enumerate() {
                let start = r.origin().get(axis);
                if v < start {
                    let Some(prev) = i.checked_sub(1).map(|p| rects[p]) else {
                        return 0.0;
                    };
                    let prev_start = prev.origin().get(axis);
                    let next = should_snap_to_next(dir.get(axis), v - prev_start, prev.size().get(axis), threshold);
                    return if next { start } else { prev_start };
                }
            }
            rects.last().map_or(v, |r| r.origin().get(axis))
        };
        Point::new(snap(Axis::X), snap(Axis::Y))
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Pointer pressed inside the container. Stops a running scroll tween
    /// where it is.
    pub fn pointer_down(&mut self, container: ObjectId, x: f32, y: f32) {
        let now = self.clock;
        let Some(pane) = self.panes.get_mut(container) else {
            return;
        };
        if !pane.touch_effect {
            return;
        }
        let killed = pane.tween.take().is_some();
        pane.dragged = killed;
        if killed {
            pane.pos = pane.scrolling_pos();
        }
        pane.begin_drag(Point::new(x, y), now);
        if killed {
            self.notify_scrolled(container);
            self.events.push(StageEvent::ScrollEnd(container));
        }
    }

    pub fn pointer_move(&mut self, container: ObjectId, x: f32, y: f32) {
        let params = DragParams {
            now: self.clock,
            frame_rate: self.config.frame_rate,
            sensitivity: self.config.touch_scroll_sensitivity,
            pull_ratio: self.config.pull_ratio,
        };
        let Some(pane) = self.panes.get_mut(container) else {
            return;
        };
        if !pane.touch_effect || !pane.drag_to(Point::new(x, y), params) {
            return;
        }
        let page_mode = pane.page_mode;
        self.sync_pane_origin(container);
        self.notify_scrolled(container);
        if page_mode {
            self.update_page_controller(container);
        }
    }

    /// Pointer released. Starts a bounce back, an inertial coast, or a
    /// page/snap alignment.
    pub fn pointer_up(&mut self, container: ObjectId) {
        let now = self.clock;
        let frame_rate = self.config.frame_rate;
        let tween_time = self.config.scroll_tween_time;
        let sensitivity = self.config.touch_drag_sensitivity;
        let Some(pane) = self.panes.get_mut(container) else {
            return;
        };
        if !pane.touch_effect {
            return;
        }
        let dragged = std::mem::take(&mut pane.dragged);
        if !dragged {
            pane.drag = None;
            return;
        }
        pane.settle_velocity(now, frame_rate);
        let container_pos = pane.drag.take().map_or(pane.origin, |d| d.container_pos);

        let start = pane.origin;
        let mut edge = start;
        let mut out_of_range = false;
        for axis in [Axis::X, Axis::Y] {
            let origin = start.get(axis);
            let overlap = pane.overlap.get(axis);
            if origin > 0.0 {
                *edge.get_mut(axis) = 0.0;
                out_of_range = true;
            } else if origin < -overlap {
                *edge.get_mut(axis) = -overlap;
                out_of_range = true;
            }
        }

        if out_of_range {
            let change = edge - start;
            pane.tween = Some(ScrollTween::new(
                TweenMode::Inertia,
                start,
                change,
                Point::new(tween_time, tween_time),
            ));
            if change.x < -sensitivity || change.y < -sensitivity {
                self.events.push(StageEvent::PullDownRelease(container));
            } else if change.x > sensitivity || change.y > sensitivity {
                self.events.push(StageEvent::PullUpRelease(container));
            }
            return;
        }

        let (mut end, duration) = if pane.inertia_disabled {
            (start, Point::new(tween_time, tween_time))
        } else {
            pane.inertial_target(start, tween_time)
        };
        let old_change = end - start;
        let mut tween_start = start;
        pane.loop_check_target(&mut end, &mut tween_start);
        let aligning = pane.page_mode || pane.snap_to_item;
        if aligning {
            end = self.align_position(container, end, container_pos, Some(tween_start));
        }

        let change = end - tween_start;
        if change == Point::ZERO {
            self.events.push(StageEvent::ScrollEnd(container));
            return;
        }
        let mut tween = ScrollTween::new(TweenMode::Inertia, tween_start, change, duration);
        if aligning {
            tween.fix_duration(Axis::X, old_change.x, tween_time);
            tween.fix_duration(Axis::Y, old_change.y, tween_time);
        }
        trace!(?container, ?change, "release tween");
        if let Some(pane) = self.panes.get_mut(container) {
            pane.tween = Some(tween);
        }
    }

    /// Scroll by wheel notches; positive `delta` moves toward the end.
    ///
    /// Horizontal-only content scrolls horizontally; everything else
    /// scrolls vertically. Each notch moves two scroll steps, or one page
    /// in page mode.
    pub fn mouse_wheel(&mut self, container: ObjectId, delta: f32) {
        let Some(pane) = self.panes.get(container) else {
            return;
        };
        if !pane.mouse_wheel {
            return;
        }
        let step = if pane.page_mode {
            pane.page_size
        } else {
            Size::new(pane.scroll_step * 2.0, pane.scroll_step * 2.0)
        };
        if pane.overlap.width > 0.0 && pane.overlap.height == 0.0 {
            let x = pane.pos.x + step.width * delta;
            self.set_pos_axis(container, Axis::X, x, false);
        } else {
            let y = pane.pos.y + step.height * delta;
            self.set_pos_axis(container, Axis::Y, y, false);
        }
    }

    // ── Frame ────────────────────────────────────────────────────────

    pub(crate) fn advance_scroll_panes(&mut self, dt: f32) {
        let active: Vec<ObjectId> = self
            .panes
            .iter()
            .filter(|(_, p)| p.tween.is_some() || p.auto_hide > 0.0)
            .map(|(id, _)| id)
            .collect();
        let bounce_time = self.config.scroll_tween_time;

        for id in active {
            let Some(pane) = self.panes.get_mut(id) else {
                continue;
            };
            let Some(mut tween) = pane.tween.take() else {
                if !pane.is_dragging() {
                    pane.auto_hide = (pane.auto_hide - dt).max(0.0);
                }
                continue;
            };
            let x = tween.step(Axis::X, dt, pane.origin.x, pane.overlap.width, pane.bounce_back, bounce_time);
            let y = tween.step(Axis::Y, dt, pane.origin.y, pane.overlap.height, pane.bounce_back, bounce_time);
            pane.origin = Point::new(x, y);

            let inertial = tween.mode == TweenMode::Inertia;
            if inertial {
                if pane.overlap.width > 0.0 {
                    pane.pos.x = (-x).clamp(0.0, pane.overlap.width);
                }
                if pane.overlap.height > 0.0 {
                    pane.pos.y = (-y).clamp(0.0, pane.overlap.height);
                }
            }
            let done = tween.is_done();
            if done {
                pane.loop_check_current();
            } else {
                pane.tween = Some(tween);
            }
            let page_mode = pane.page_mode;

            self.sync_pane_origin(id);
            self.notify_scrolled(id);
            if inertial && page_mode {
                self.update_page_controller(id);
            }
            if done {
                self.events.push(StageEvent::ScrollEnd(id));
            }
        }
    }

    pub(crate) fn sync_pane_origin(&mut self, container: ObjectId) {
        let Some(origin) = self.panes.get(container).map(ScrollPane::origin) else {
            return;
        };
        if let Some(obj) = self.objects.get_mut(container) {
            obj.primitive.set_content_offset(origin.x, origin.y);
        }
    }

    fn notify_scrolled(&mut self, container: ObjectId) {
        self.events.push(StageEvent::Scroll(container));
        let delay = self.config.scrollbar_auto_hide_delay;
        if let Some(pane) = self.panes.get_mut(container) {
            pane.auto_hide = delay;
        }
        if self.lists.get(container).is_some_and(|l| l.is_virtual()) {
            self.set_bounds_changed(container);
        }
    }

    // ── Page controller ──────────────────────────────────────────────

    /// Push the current page into the bound controller.
    ///
    /// The binding is cleared for the duration of the write so the
    /// controller's broadcast does not scroll the pane back.
    fn update_page_controller(&mut self, container: ObjectId) {
        let Some(pane) = self.panes.get(container) else {
            return;
        };
        let Some(controller) = pane.page_controller else {
            return;
        };
        let index = if pane.scroll_type == ScrollType::Horizontal {
            pane.current_page_x()
        } else {
            pane.current_page_y()
        };
        let Some(ctrl) = self.controllers.get(controller) else {
            return;
        };
        if ctrl.is_changing() || index >= ctrl.page_count() {
            return;
        }
        if let Some(pane) = self.panes.get_mut(container) {
            pane.page_controller = None;
        }
        if let Err(err) = self.set_selected_index(controller, index) {
            debug!(%err, "page controller sync failed");
        }
        if let Some(pane) = self.panes.get_mut(container) {
            pane.page_controller = Some(controller);
        }
    }

    pub(crate) fn handle_pane_controller_changed(&mut self, container: ObjectId, controller: ControllerId) {
        let Some(pane) = self.panes.get(container) else {
            return;
        };
        if pane.page_controller != Some(controller) {
            return;
        }
        let axis = if pane.scroll_type == ScrollType::Horizontal {
            Axis::X
        } else {
            Axis::Y
        };
        let Some(index) = self.controllers.get(controller).and_then(|c| c.selected_index()) else {
            return;
        };
        self.set_current_page(container, axis, index, true);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
