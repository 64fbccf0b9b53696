//! Property setters.
//!
//! Every write to an object's geometry or gear-driven property goes through
//! here so the same bookkeeping happens in the same order: push to the host
//! primitive, record the value in the matching gear, dirty the parent's
//! bounds, queue an event, then let dependents react.

use tracing::trace;

use super::event::StageEvent;
use super::object::{AnimationState, Color, ObjectId};
use super::Stage;
use crate::gear::GearKind;
use crate::geometry::Size;

impl Stage {
    // ── Position ─────────────────────────────────────────────────────

    /// Move an object. Relations of dependents follow.
    pub fn set_xy(&mut self, id: ObjectId, x: f32, y: f32) {
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        if obj.x == x && obj.y == y {
            return;
        }
        obj.x = x;
        obj.y = y;
        obj.primitive.set_position(x, y);

        self.update_gear_state(id, GearKind::XY);
        if let Some(parent) = self.parent(id) {
            self.set_bounds_changed(parent);
        }
        self.events.push(StageEvent::XyChanged(id));
        self.propagate_xy_changed(id);
    }

    /// Move horizontally, keeping `y`.
    pub fn set_x(&mut self, id: ObjectId, x: f32) {
        if let Some(y) = self.objects.get(id).map(|o| o.y) {
            self.set_xy(id, x, y);
        }
    }

    /// Move vertically, keeping `x`.
    pub fn set_y(&mut self, id: ObjectId, y: f32) {
        if let Some(x) = self.objects.get(id).map(|o| o.x) {
            self.set_xy(id, x, y);
        }
    }

    // ── Size ─────────────────────────────────────────────────────────

    /// Resize an object. Its own relations see the resize first, then its
    /// dependents.
    pub fn set_size(&mut self, id: ObjectId, width: f32, height: f32) {
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        if obj.width == width && obj.height == height {
            return;
        }
        let dw = width - obj.width;
        let dh = height - obj.height;
        obj.width = width;
        obj.height = height;
        obj.primitive.set_size(width, height);

        if self.panes.contains_key(id) {
            self.on_pane_view_resized(id);
        }
        if self.lists.contains_key(id) {
            self.set_bounds_changed(id);
        }
        self.update_gear_state(id, GearKind::Size);
        if let Some(parent) = self.parent(id) {
            self.on_owner_size_changed(id, dw, dh);
            self.set_bounds_changed(parent);
        }
        self.events.push(StageEvent::SizeChanged(id));
        self.propagate_size_changed(id);
    }

    /// Resize horizontally, keeping the height.
    pub fn set_width(&mut self, id: ObjectId, width: f32) {
        if let Some(h) = self.objects.get(id).map(|o| o.height) {
            self.set_size(id, width, h);
        }
    }

    /// Resize vertically, keeping the width.
    pub fn set_height(&mut self, id: ObjectId, height: f32) {
        if let Some(w) = self.objects.get(id).map(|o| o.width) {
            self.set_size(id, w, height);
        }
    }

    /// Host notification that an object's intrinsic box changed (text
    /// reflow, image load). Behaves like [`set_size`](Self::set_size).
    pub fn notify_box_changed(&mut self, id: ObjectId, size: Size) {
        trace!(?id, ?size, "box changed");
        self.set_size(id, size.width, size.height);
    }

    // ── Look ─────────────────────────────────────────────────────────

    /// Set the horizontal and vertical scale factors.
    pub fn set_scale(&mut self, id: ObjectId, scale_x: f32, scale_y: f32) {
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        if obj.scale_x == scale_x && obj.scale_y == scale_y {
            return;
        }
        obj.scale_x = scale_x;
        obj.scale_y = scale_y;
        obj.primitive.set_scale(scale_x, scale_y);
        self.update_gear_state(id, GearKind::Look);
    }

    /// Rotation in degrees.
    pub fn set_rotation(&mut self, id: ObjectId, degrees: f32) {
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        if obj.rotation == degrees {
            return;
        }
        obj.rotation = degrees;
        obj.primitive.set_rotation(degrees);
        self.update_gear_state(id, GearKind::Look);
    }

    /// Set opacity, 0 being fully transparent.
    pub fn set_alpha(&mut self, id: ObjectId, alpha: f32) {
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        if obj.alpha == alpha {
            return;
        }
        obj.alpha = alpha;
        obj.primitive.set_alpha(alpha);
        self.update_gear_state(id, GearKind::Look);
    }

    /// Set the user visibility flag. The display gear may still hide the
    /// object; see [`ObjectData::is_displayed`](super::ObjectData::is_displayed).
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) {
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        if obj.visible == visible {
            return;
        }
        obj.visible = visible;
        self.sync_visibility(id);
    }

    pub(crate) fn set_internal_visible(&mut self, id: ObjectId, visible: bool) {
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        if obj.internal_visible == visible {
            return;
        }
        obj.internal_visible = visible;
        self.sync_visibility(id);
    }

    fn sync_visibility(&mut self, id: ObjectId) {
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        let shown = obj.is_displayed();
        obj.primitive.set_visible(shown);
        if let Some(parent) = self.parent(id) {
            self.set_bounds_changed(parent);
        }
    }

    // ── Capabilities ─────────────────────────────────────────────────
    //
    // Writes to an absent capability are ignored.

    /// Set the fill colour.
    pub fn set_color(&mut self, id: ObjectId, color: Color) {
        let Some(slot) = self.objects.get_mut(id).and_then(|o| o.caps.color.as_mut()) else {
            return;
        };
        if *slot == color {
            return;
        }
        *slot = color;
        self.update_gear_state(id, GearKind::Color);
    }

    /// Set the title text colour.
    pub fn set_title_color(&mut self, id: ObjectId, color: Color) {
        let Some(slot) = self.objects.get_mut(id).and_then(|o| o.caps.title_color.as_mut()) else {
            return;
        };
        if *slot == color {
            return;
        }
        *slot = color;
        self.update_gear_state(id, GearKind::Color);
    }

    /// Replace the displayed text.
    pub fn set_text(&mut self, id: ObjectId, text: impl Into<String>) {
        let text = text.into();
        let Some(slot) = self.objects.get_mut(id).and_then(|o| o.caps.text.as_mut()) else {
            return;
        };
        if *slot == text {
            return;
        }
        *slot = text;
        self.update_gear_state(id, GearKind::Text);
    }

    /// Replace the icon url.
    pub fn set_icon(&mut self, id: ObjectId, icon: impl Into<String>) {
        let icon = icon.into();
        let Some(slot) = self.objects.get_mut(id).and_then(|o| o.caps.icon.as_mut()) else {
            return;
        };
        if *slot == icon {
            return;
        }
        *slot = icon;
        self.update_gear_state(id, GearKind::Icon);
    }

    /// Set the playing flag and frame.
    pub fn set_animation(&mut self, id: ObjectId, state: AnimationState) {
        let Some(slot) = self.objects.get_mut(id).and_then(|o| o.caps.animation.as_mut()) else {
            return;
        };
        if *slot == state {
            return;
        }
        *slot = state;
        self.update_gear_state(id, GearKind::Animation);
    }

    /// Set the visual selected state. No gear tracks it.
    pub fn set_selected(&mut self, id: ObjectId, selected: bool) {
        if let Some(slot) = self.objects.get_mut(id).and_then(|o| o.caps.selected.as_mut()) {
            *slot = selected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::ObjectData;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_xy_reaches_primitive_and_queues_event() {
        let mut s = Stage::default();
        let root = s.root();
        let a = s.create_child(root, ObjectData::new("a"));
        s.take_events();
        s.set_xy(a, 3.0, 4.0);
        assert_eq!(s.get(a).unwrap().primitive().bounds().origin(), crate::geometry::Point::new(3.0, 4.0));
        assert_eq!(s.take_events(), vec![StageEvent::XyChanged(a)]);
    }

    #[test]
    fn unchanged_write_is_silent() {
        let mut s = Stage::default();
        let root = s.root();
        let a = s.create_child(root, ObjectData::new("a").with_size(5.0, 5.0));
        s.take_events();
        s.set_size(a, 5.0, 5.0);
        s.set_xy(a, 0.0, 0.0);
        assert!(s.take_events().is_empty());
    }

    #[test]
    fn absent_capability_ignores_writes() {
        let mut s = Stage::default();
        let root = s.root();
        let a = s.create_child(root, ObjectData::new("a"));
        s.set_text(a, "hello");
        s.set_color(a, Color::WHITE);
        assert_eq!(s.get(a).unwrap().caps().text, None);
        assert_eq!(s.get(a).unwrap().caps().color, None);
    }

    #[test]
    fn internal_visibility_hides_primitive() {
        let mut s = Stage::default();
        let root = s.root();
        let a = s.create_child(root, ObjectData::new("a"));
        s.set_internal_visible(a, false);
        let obj = s.get(a).unwrap();
        assert!(obj.is_visible());
        assert!(!obj.is_displayed());
    }
}
