//! Gear configuration, application and state capture.

use tracing::{debug, trace};

use super::value::{GearValue, Look};
use super::{ColorTarget, Gear, GearKind, TweenConfig};
use crate::controller::{Controller, ControllerId, PageId};
use crate::descriptor::parser::parse_gear_value;
use crate::error::ConfigError;
use crate::geometry::{Point, Size};
use crate::stage::{ObjectData, ObjectId, Stage, StageEvent};
use crate::tween::{TweenId, TweenTarget, TweenValue};

/// Read the current value of `kind` off an object.
fn capture(obj: &ObjectData, kind: GearKind, color_target: ColorTarget) -> Option<GearValue> {
    match kind {
        GearKind::Display => None,
        GearKind::XY => Some(GearValue::XY(Point::new(obj.x, obj.y))),
        GearKind::Size => Some(GearValue::Size(Size::new(obj.width, obj.height))),
        GearKind::Look => Some(GearValue::Look(Look {
            alpha: obj.alpha,
            rotation: obj.rotation,
            scale_x: obj.scale_x,
            scale_y: obj.scale_y,
        })),
        GearKind::Color => match color_target {
            ColorTarget::Color => obj.caps.color.map(GearValue::Color),
            ColorTarget::TitleColor => obj.caps.title_color.map(GearValue::Color),
        },
        GearKind::Animation => obj.caps.animation.map(GearValue::Animation),
        GearKind::Text => obj.caps.text.clone().map(GearValue::Text),
        GearKind::Icon => obj.caps.icon.clone().map(GearValue::Icon),
    }
}

/// Pick the colour capability a colour gear binds to, `color` first.
fn check_capability(obj: &ObjectData, kind: GearKind) -> Result<ColorTarget, ConfigError> {
    let missing = |capability: &'static str| ConfigError::MissingCapability {
        object: obj.name.clone(),
        kind,
        capability,
    };
    match kind {
        GearKind::Color if obj.caps.color.is_some() => Ok(ColorTarget::Color),
        GearKind::Color if obj.caps.title_color.is_some() => Ok(ColorTarget::TitleColor),
        GearKind::Color => Err(missing("color")),
        GearKind::Text if obj.caps.text.is_none() => Err(missing("text")),
        GearKind::Icon if obj.caps.icon.is_none() => Err(missing("icon")),
        GearKind::Animation if obj.caps.animation.is_none() => Err(missing("animation")),
        _ => Ok(ColorTarget::Color),
    }
}

impl Stage {
    // ── Configuration ────────────────────────────────────────────────

    /// Create (or rebind) the `kind` gear of `owner`.
    ///
    /// A new gear captures the object's current value as its default. Binding
    /// a kind whose capability the object lacks is rejected.
    pub fn set_gear(
        &mut self,
        owner: ObjectId,
        kind: GearKind,
        controller: Option<ControllerId>,
    ) -> Result<(), ConfigError> {
        let obj = self.objects.get(owner).ok_or(ConfigError::UnknownObject)?;
        if let Some(c) = controller {
            if !self.controllers.contains_key(c) {
                return Err(ConfigError::UnknownController);
            }
        }
        let color_target = check_capability(obj, kind)?;
        let default = capture(obj, kind, color_target);
        let Some(obj) = self.objects.get_mut(owner) else {
            return Err(ConfigError::UnknownObject);
        };
        let (gear, created) = obj.gears.get_or_insert(kind);
        gear.controller = controller;
        gear.color_target = color_target;
        if created {
            gear.default = default;
        }
        trace!(?owner, kind = kind.name(), created, "gear bound");
        Ok(())
    }

    pub fn gear(&self, owner: ObjectId, kind: GearKind) -> Option<&Gear> {
        self.objects.get(owner).and_then(|o| o.gears.get(kind))
    }

    pub(crate) fn gear_mut(&mut self, owner: ObjectId, kind: GearKind) -> Option<&mut Gear> {
        self.objects.get_mut(owner).and_then(|o| o.gears.get_mut(kind))
    }

    pub(crate) fn gear_controller(&self, owner: ObjectId, kind: GearKind) -> Option<ControllerId> {
        self.gear(owner, kind).and_then(Gear::controller)
    }

    /// Store a serialized value for `page`, or as the default when `page` is
    /// `None`. The `-` sentinel means "no value" and is skipped.
    pub fn add_gear_status(
        &mut self,
        owner: ObjectId,
        kind: GearKind,
        page: Option<PageId>,
        value: &str,
    ) -> Result<(), ConfigError> {
        match parse_gear_value(kind, value)? {
            Some(v) => self.set_gear_value(owner, page, v),
            None => Ok(()),
        }
    }

    /// Store a typed value for `page`, or as the default when `page` is `None`.
    pub fn set_gear_value(
        &mut self,
        owner: ObjectId,
        page: Option<PageId>,
        value: GearValue,
    ) -> Result<(), ConfigError> {
        let kind = value.kind();
        let gear = self.gear_mut(owner, kind).ok_or(ConfigError::NoGear(kind))?;
        match page {
            Some(p) => {
                gear.storage.insert(p, value);
            }
            None => gear.default = Some(value),
        }
        Ok(())
    }

    pub fn set_gear_tween(
        &mut self,
        owner: ObjectId,
        kind: GearKind,
        config: TweenConfig,
    ) -> Result<(), ConfigError> {
        let gear = self.gear_mut(owner, kind).ok_or(ConfigError::NoGear(kind))?;
        gear.tween = config;
        Ok(())
    }

    // ── Application ──────────────────────────────────────────────────

    /// Push the value stored for the controller's current page onto the
    /// object, tweening when configured.
    pub fn apply_gear(&mut self, owner: ObjectId, kind: GearKind) {
        let Some(gear) = self.gear(owner, kind) else {
            return;
        };
        let Some(controller) = gear.controller else {
            return;
        };
        let Some(ctrl) = self.controllers.get(controller) else {
            trace!(?owner, kind = kind.name(), "gear bound to a disposed controller");
            return;
        };
        let page = ctrl.selected_page_id();
        if kind == GearKind::Display {
            self.apply_display_gear(owner, page);
            return;
        }

        let target = page
            .and_then(|p| gear.storage.get(&p))
            .or(gear.default.as_ref())
            .cloned();
        let Some(target) = target else {
            return;
        };
        let config = gear.tween;
        let running = gear.tweener;
        let under_construct = self.objects.get(owner).is_some_and(|o| o.under_construct);
        let animate = config.enabled
            && config.duration > 0.0
            && kind.is_tweenable()
            && self.config.gear_tweens
            && self.constructing == 0
            && !under_construct;

        if animate {
            self.tween_gear_to(owner, kind, controller, &target, config, running);
        } else {
            if running.is_some() {
                self.stop_gear_tween(owner, kind);
            }
            self.write_gear_value(owner, &target);
            self.update_gear_state(owner, kind);
        }
    }

    fn tween_gear_to(
        &mut self,
        owner: ObjectId,
        kind: GearKind,
        controller: ControllerId,
        target: &GearValue,
        config: TweenConfig,
        running: Option<TweenId>,
    ) {
        let Some(end) = target.to_tween() else {
            return;
        };
        if let Some(id) = running {
            if self.tweens.end_value(id) == Some(end) {
                self.renew_display_lock(owner, kind, controller);
                return;
            }
            self.tweens.kill(id);
        }
        let Some(current) = self.read_gear_value(owner, kind) else {
            return;
        };
        if current == *target {
            if running.is_some() {
                self.stop_gear_tween(owner, kind);
            }
            return;
        }
        let Some(start) = current.to_tween() else {
            return;
        };
        let id = self.tweens.start(
            TweenTarget::Gear { object: owner, kind },
            start,
            end,
            config.ease,
            config.duration,
            config.delay,
        );
        if let Some(gear) = self.gear_mut(owner, kind) {
            gear.tweener = Some(id);
        }
        self.renew_display_lock(owner, kind, controller);
        debug!(?owner, kind = kind.name(), duration = config.duration, "gear tween started");
    }

    /// Make sure a tweening gear holds a display lock from the current
    /// display apply, when the display gear shares its controller.
    fn renew_display_lock(&mut self, owner: ObjectId, kind: GearKind, controller: ControllerId) {
        let held = self.gear(owner, kind).and_then(|g| g.display_lock);
        if let Some(token) = held {
            if self.display_lock_valid(owner, token) {
                return;
            }
        }
        let lock = self.lock_display_for(owner, controller);
        if let Some(gear) = self.gear_mut(owner, kind) {
            gear.display_lock = lock;
        }
    }

    /// Kill the running tween of one gear and release its display lock.
    fn stop_gear_tween(&mut self, owner: ObjectId, kind: GearKind) {
        let Some(gear) = self.gear_mut(owner, kind) else {
            return;
        };
        let tween = gear.tweener.take();
        let lock = gear.display_lock.take();
        if let Some(id) = tween {
            self.tweens.kill(id);
        }
        if let Some(token) = lock {
            self.release_display_lock(owner, token);
        }
    }

    /// Kill every running gear tween on `owner`.
    pub(crate) fn kill_gear_tweens(&mut self, owner: ObjectId) {
        for kind in GearKind::ALL {
            if self.gear(owner, kind).is_some_and(Gear::is_tweening) {
                self.stop_gear_tween(owner, kind);
            }
        }
    }

    /// Route one tween sample to its gear. Samples from a replaced tween are
    /// dropped.
    pub(crate) fn on_gear_tween_sample(
        &mut self,
        owner: ObjectId,
        kind: GearKind,
        id: TweenId,
        value: TweenValue,
        finished: bool,
    ) {
        if self.gear(owner, kind).and_then(|g| g.tweener) != Some(id) {
            return;
        }
        let Some(v) = GearValue::from_tween(kind, value) else {
            return;
        };
        self.write_gear_value(owner, &v);
        if finished {
            let lock = self.gear_mut(owner, kind).and_then(|g| {
                g.tweener = None;
                g.display_lock.take()
            });
            if let Some(token) = lock {
                self.release_display_lock(owner, token);
            }
            self.events.push(StageEvent::GearStop { object: owner, kind });
        }
    }

    // ── State capture ────────────────────────────────────────────────

    /// Record the object's current value under the controller's current
    /// page. Skipped while a gear is writing or the object is being built.
    pub fn update_gear_state(&mut self, owner: ObjectId, kind: GearKind) {
        if kind == GearKind::Display {
            return;
        }
        let Some(obj) = self.objects.get(owner) else {
            return;
        };
        if obj.gear_locked || obj.under_construct {
            return;
        }
        let Some(gear) = obj.gears.get(kind) else {
            return;
        };
        let Some(page) = gear
            .controller
            .and_then(|c| self.controllers.get(c))
            .and_then(Controller::selected_page_id)
        else {
            return;
        };
        let Some(value) = capture(obj, kind, gear.color_target) else {
            return;
        };
        if let Some(gear) = self.gear_mut(owner, kind) {
            gear.storage.insert(page, value);
        }
    }

    /// Relations moved or resized `owner` by `delta`: shift every stored
    /// value so pages keep their offsets, then recapture.
    pub(crate) fn update_gear_from_relations(&mut self, owner: ObjectId, kind: GearKind, delta: Point) {
        let Some(gear) = self.gear_mut(owner, kind) else {
            return;
        };
        if gear.controller.is_none() {
            return;
        }
        for v in gear.storage.values_mut() {
            v.shift(delta);
        }
        if let Some(d) = gear.default.as_mut() {
            d.shift(delta);
        }
        self.update_gear_state(owner, kind);
    }

    fn read_gear_value(&self, owner: ObjectId, kind: GearKind) -> Option<GearValue> {
        let obj = self.objects.get(owner)?;
        let color_target = obj.gears.get(kind).map_or(ColorTarget::Color, |g| g.color_target);
        capture(obj, kind, color_target)
    }

    /// Write through the normal setters with the gear lock held.
    fn write_gear_value(&mut self, owner: ObjectId, value: &GearValue) {
        let Some(obj) = self.objects.get_mut(owner) else {
            return;
        };
        let was_locked = obj.gear_locked;
        obj.gear_locked = true;
        let color_target = obj.gears.get(GearKind::Color).map_or(ColorTarget::Color, |g| g.color_target);

        match value {
            GearValue::XY(p) => self.set_xy(owner, p.x, p.y),
            GearValue::Size(s) => self.set_size(owner, s.width, s.height),
            GearValue::Look(l) => {
                self.set_alpha(owner, l.alpha);
                self.set_rotation(owner, l.rotation);
                self.set_scale(owner, l.scale_x, l.scale_y);
            }
            GearValue::Color(c) => match color_target {
                ColorTarget::Color => self.set_color(owner, *c),
                ColorTarget::TitleColor => self.set_title_color(owner, *c),
            },
            GearValue::Animation(a) => self.set_animation(owner, *a),
            GearValue::Text(t) => self.set_text(owner, t.as_str()),
            GearValue::Icon(i) => self.set_icon(owner, i.as_str()),
        }

        if let Some(obj) = self.objects.get_mut(owner) {
            obj.gear_locked = was_locked;
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{AnimationState, Color};
    use crate::tween::EaseType;
    use pretty_assertions::assert_eq;

    struct Fixture {
        s: Stage,
        c: ControllerId,
        obj: ObjectId,
        pages: Vec<PageId>,
    }

    fn fixture(data: ObjectData) -> Fixture {
        let mut s = Stage::default();
        let root = s.root();
        let comp = s.create_child(root, ObjectData::new("comp").with_size(500.0, 500.0));
        let obj = s.create_child(comp, data);
        let c = s.add_controller(comp, "c1").unwrap();
        let pages = vec![s.add_page(c, "up").unwrap(), s.add_page(c, "down").unwrap()];
        Fixture { s, c, obj, pages }
    }

    fn pos(s: &Stage, id: ObjectId) -> Point {
        s.get(id).unwrap().position()
    }

    // ── Binding ──────────────────────────────────────────────────────

    #[test]
    fn missing_capability_rejected() {
        let mut f = fixture(ObjectData::new("img"));
        let err = f.s.set_gear(f.obj, GearKind::Text, Some(f.c)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "object `img` lacks the `text` capability needed by a Text gear"
        );
        assert!(f.s.gear(f.obj, GearKind::Text).is_none());
    }

    #[test]
    fn color_gear_prefers_color_over_title_color() {
        let mut f = fixture(
            ObjectData::new("btn")
                .with_color(Color::BLACK)
                .with_title_color(Color::WHITE),
        );
        f.s.set_gear(f.obj, GearKind::Color, Some(f.c)).unwrap();
        assert_eq!(
            f.s.gear(f.obj, GearKind::Color).unwrap().default_value(),
            Some(&GearValue::Color(Color::BLACK))
        );
    }

    #[test]
    fn color_gear_falls_back_to_title_color() {
        let mut f = fixture(ObjectData::new("btn").with_title_color(Color::WHITE));
        f.s.set_gear(f.obj, GearKind::Color, Some(f.c)).unwrap();
        f.s.add_gear_status(f.obj, GearKind::Color, Some(f.pages[1]), "#ff0000").unwrap();
        f.s.set_selected_index(f.c, 1).unwrap();
        assert_eq!(f.s.get(f.obj).unwrap().caps().title_color, Some(Color(0xffff_0000)));
    }

    #[test]
    fn sentinel_status_is_skipped() {
        let mut f = fixture(ObjectData::new("a"));
        f.s.set_gear(f.obj, GearKind::XY, Some(f.c)).unwrap();
        f.s.add_gear_status(f.obj, GearKind::XY, Some(f.pages[1]), "-").unwrap();
        assert!(f.s.gear(f.obj, GearKind::XY).unwrap().value_for(f.pages[1]).is_none());
    }

    #[test]
    fn status_without_gear_is_an_error() {
        let mut f = fixture(ObjectData::new("a"));
        assert!(matches!(
            f.s.add_gear_status(f.obj, GearKind::XY, None, "1,2"),
            Err(ConfigError::NoGear(GearKind::XY))
        ));
    }

    // ── Instant apply ────────────────────────────────────────────────

    #[test]
    fn page_change_writes_stored_value() {
        let mut f = fixture(ObjectData::new("a").with_position(10.0, 10.0));
        f.s.set_gear(f.obj, GearKind::XY, Some(f.c)).unwrap();
        f.s.add_gear_status(f.obj, GearKind::XY, Some(f.pages[1]), "100,50").unwrap();
        f.s.set_selected_index(f.c, 1).unwrap();
        assert_eq!(pos(&f.s, f.obj), Point::new(100.0, 50.0));
        // No value for "up": falls back to the captured default.
        f.s.set_selected_index(f.c, 0).unwrap();
        assert_eq!(pos(&f.s, f.obj), Point::new(10.0, 10.0));
    }

    #[test]
    fn direct_write_is_remembered_for_current_page() {
        let mut f = fixture(ObjectData::new("a"));
        f.s.set_gear(f.obj, GearKind::XY, Some(f.c)).unwrap();
        f.s.set_selected_index(f.c, 1).unwrap();
        f.s.set_xy(f.obj, 40.0, 40.0);
        f.s.set_selected_index(f.c, 0).unwrap();
        assert_eq!(pos(&f.s, f.obj), Point::ZERO);
        f.s.set_selected_index(f.c, 1).unwrap();
        assert_eq!(pos(&f.s, f.obj), Point::new(40.0, 40.0));
    }

    #[test]
    fn text_and_animation_apply_instantly() {
        let mut f = fixture(
            ObjectData::new("mc")
                .with_text("idle")
                .with_animation(AnimationState::default()),
        );
        f.s.set_gear(f.obj, GearKind::Text, Some(f.c)).unwrap();
        f.s.set_gear(f.obj, GearKind::Animation, Some(f.c)).unwrap();
        f.s.set_gear_tween(f.obj, GearKind::Text, TweenConfig::enabled()).unwrap();
        f.s.add_gear_status(f.obj, GearKind::Text, Some(f.pages[1]), "busy").unwrap();
        f.s.add_gear_status(f.obj, GearKind::Animation, Some(f.pages[1]), "4,p").unwrap();
        f.s.set_selected_index(f.c, 1).unwrap();
        let caps = f.s.get(f.obj).unwrap().caps();
        assert_eq!(caps.text.as_deref(), Some("busy"));
        assert_eq!(caps.animation, Some(AnimationState { playing: true, frame: 4 }));
    }

    // ── Tweened apply ────────────────────────────────────────────────

    fn tweened_xy() -> Fixture {
        let mut f = fixture(ObjectData::new("a"));
        f.s.set_gear(f.obj, GearKind::XY, Some(f.c)).unwrap();
        f.s.set_gear_tween(
            f.obj,
            GearKind::XY,
            TweenConfig::enabled().with_ease(EaseType::Linear).with_duration(1.0),
        )
        .unwrap();
        f.s.add_gear_status(f.obj, GearKind::XY, Some(f.pages[1]), "100,0").unwrap();
        f
    }

    #[test]
    fn tween_interpolates_and_stops() {
        let mut f = tweened_xy();
        f.s.set_selected_index(f.c, 1).unwrap();
        assert_eq!(pos(&f.s, f.obj), Point::ZERO);
        f.s.tick(0.5);
        assert_eq!(pos(&f.s, f.obj), Point::new(50.0, 0.0));
        f.s.take_events();
        f.s.tick(0.5);
        assert_eq!(pos(&f.s, f.obj), Point::new(100.0, 0.0));
        assert!(f
            .s
            .take_events()
            .contains(&StageEvent::GearStop { object: f.obj, kind: GearKind::XY }));
        assert!(!f.s.gear(f.obj, GearKind::XY).unwrap().is_tweening());
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut f = tweened_xy();
        f.s.set_selected_index(f.c, 1).unwrap();
        f.s.tick(0.5);
        f.s.set_selected_index(f.c, 0).unwrap();
        assert_eq!(pos(&f.s, f.obj), Point::new(50.0, 0.0));
        f.s.tick(0.5);
        assert_eq!(pos(&f.s, f.obj), Point::new(25.0, 0.0));
        f.s.tick(0.5);
        assert_eq!(pos(&f.s, f.obj), Point::ZERO);
    }

    #[test]
    fn global_switch_disables_tweens() {
        let mut f = tweened_xy();
        f.s.config_mut().gear_tweens = false;
        f.s.set_selected_index(f.c, 1).unwrap();
        assert_eq!(pos(&f.s, f.obj), Point::new(100.0, 0.0));
    }

    // ── Relations ────────────────────────────────────────────────────

    #[test]
    fn relation_moves_shift_stored_values() {
        let mut f = fixture(ObjectData::new("a").with_position(10.0, 0.0).with_size(10.0, 10.0));
        let comp = f.s.parent(f.obj).unwrap();
        f.s.add_relation(f.obj, comp, crate::relation::RelationType::RightRight, false)
            .unwrap();
        f.s.set_gear(f.obj, GearKind::XY, Some(f.c)).unwrap();
        f.s.add_gear_status(f.obj, GearKind::XY, Some(f.pages[1]), "200,0").unwrap();
        f.s.set_width(comp, 600.0);
        assert_eq!(pos(&f.s, f.obj), Point::new(110.0, 0.0));
        f.s.set_selected_index(f.c, 1).unwrap();
        assert_eq!(pos(&f.s, f.obj), Point::new(300.0, 0.0));
    }
}
