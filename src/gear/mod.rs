//! Gears: per-controller-page property memories.
//!
//! A gear binds one property family of an object to a controller. It stores
//! one value per page plus a default, and when the controller changes page it
//! writes (or tweens) the stored value onto the object.

pub mod apply;
pub mod display;
pub mod value;

use std::collections::HashMap;

pub use value::{GearValue, Look};

use crate::controller::{ControllerId, PageId};
use crate::tween::{EaseType, TweenId};

// ---------------------------------------------------------------------------
// GearKind
// ---------------------------------------------------------------------------

/// Property family a gear drives. Declaration order is application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GearKind {
    Display,
    XY,
    Size,
    /// Alpha, rotation and scale together.
    Look,
    Color,
    Animation,
    Text,
    Icon,
}

impl GearKind {
    /// All kinds in application order.
    pub const ALL: [GearKind; 8] = [
        GearKind::Display,
        GearKind::XY,
        GearKind::Size,
        GearKind::Look,
        GearKind::Color,
        GearKind::Animation,
        GearKind::Text,
        GearKind::Icon,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Whether page changes may interpolate this kind.
    pub fn is_tweenable(self) -> bool {
        matches!(self, GearKind::XY | GearKind::Size | GearKind::Look | GearKind::Color)
    }

    pub fn name(self) -> &'static str {
        match self {
            GearKind::Display => "display",
            GearKind::XY => "xy",
            GearKind::Size => "size",
            GearKind::Look => "look",
            GearKind::Color => "color",
            GearKind::Animation => "animation",
            GearKind::Text => "text",
            GearKind::Icon => "icon",
        }
    }

    pub fn from_name(name: &str) -> Option<GearKind> {
        GearKind::ALL.into_iter().find(|k| k.name() == name)
    }
}

// ---------------------------------------------------------------------------
// TweenConfig
// ---------------------------------------------------------------------------

/// How a gear animates between pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenConfig {
    pub enabled: bool,
    pub ease: EaseType,
    /// Seconds.
    pub duration: f32,
    /// Seconds before the tween starts moving.
    pub delay: f32,
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ease: EaseType::QuadOut,
            duration: 0.3,
            delay: 0.0,
        }
    }
}

impl TweenConfig {
    /// Enabled with the default ease and duration.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_ease(mut self, ease: EaseType) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }
}

// ---------------------------------------------------------------------------
// Gear
// ---------------------------------------------------------------------------

/// Which colour capability a colour gear drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColorTarget {
    Color,
    TitleColor,
}

/// One gear on one object.
#[derive(Debug, Clone)]
pub struct Gear {
    kind: GearKind,
    pub(crate) controller: Option<ControllerId>,
    pub(crate) storage: HashMap<PageId, GearValue>,
    pub(crate) default: Option<GearValue>,
    pub(crate) tween: TweenConfig,
    pub(crate) tweener: Option<TweenId>,
    /// Display lock held on the same object while this gear tweens.
    pub(crate) display_lock: Option<u32>,
    pub(crate) color_target: ColorTarget,
    /// Display gear: pages on which the object is shown; empty means all.
    pub(crate) pages: Vec<PageId>,
    /// Display gear: 1 while the current page is listed, plus one per lock.
    pub(crate) visible_count: u32,
    /// Display gear: bumped on every apply; locks from older applies are void.
    pub(crate) flag: u32,
}

impl Gear {
    pub(crate) fn new(kind: GearKind) -> Self {
        Self {
            kind,
            controller: None,
            storage: HashMap::new(),
            default: None,
            tween: TweenConfig::default(),
            tweener: None,
            display_lock: None,
            color_target: ColorTarget::Color,
            pages: Vec::new(),
            visible_count: 1,
            flag: 0,
        }
    }

    pub fn kind(&self) -> GearKind {
        self.kind
    }

    pub fn controller(&self) -> Option<ControllerId> {
        self.controller
    }

    /// Value stored for `page`, if any.
    pub fn value_for(&self, page: PageId) -> Option<&GearValue> {
        self.storage.get(&page)
    }

    /// Value used for pages without a stored value.
    pub fn default_value(&self) -> Option<&GearValue> {
        self.default.as_ref()
    }

    pub fn tween_config(&self) -> TweenConfig {
        self.tween
    }

    /// Whether a page-change tween is running.
    pub fn is_tweening(&self) -> bool {
        self.tweener.is_some()
    }

    /// Display gear: pages on which the object is shown.
    pub fn pages(&self) -> &[PageId] {
        &self.pages
    }

    /// Display gear: whether the object may show.
    pub fn connected(&self) -> bool {
        self.controller.is_none() || self.visible_count > 0
    }
}

// ---------------------------------------------------------------------------
// GearSet
// ---------------------------------------------------------------------------

/// At most one gear per kind.
#[derive(Debug, Clone, Default)]
pub struct GearSet {
    slots: [Option<Gear>; 8],
}

impl GearSet {
    pub fn get(&self, kind: GearKind) -> Option<&Gear> {
        self.slots[kind.index()].as_ref()
    }

    pub(crate) fn get_mut(&mut self, kind: GearKind) -> Option<&mut Gear> {
        self.slots[kind.index()].as_mut()
    }

    pub(crate) fn get_or_insert(&mut self, kind: GearKind) -> (&mut Gear, bool) {
        let slot = &mut self.slots[kind.index()];
        let created = slot.is_none();
        (slot.get_or_insert_with(|| Gear::new(kind)), created)
    }

    /// Present gears in application order.
    pub fn iter(&self) -> impl Iterator<Item = &Gear> + '_ {
        self.slots.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_apply_display_first() {
        assert_eq!(GearKind::ALL[0], GearKind::Display);
        let mut sorted = GearKind::ALL;
        sorted.sort();
        assert_eq!(sorted, GearKind::ALL);
    }

    #[test]
    fn names_roundtrip() {
        for kind in GearKind::ALL {
            assert_eq!(GearKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn only_numeric_kinds_tween() {
        assert!(GearKind::XY.is_tweenable());
        assert!(GearKind::Color.is_tweenable());
        assert!(!GearKind::Text.is_tweenable());
        assert!(!GearKind::Animation.is_tweenable());
        assert!(!GearKind::Display.is_tweenable());
    }

    #[test]
    fn gear_set_creates_lazily() {
        let mut set = GearSet::default();
        assert!(set.is_empty());
        let (_, created) = set.get_or_insert(GearKind::Size);
        assert!(created);
        let (_, created) = set.get_or_insert(GearKind::Size);
        assert!(!created);
        assert_eq!(set.iter().map(Gear::kind).collect::<Vec<_>>(), vec![GearKind::Size]);
    }

    #[test]
    fn unbound_display_gear_is_connected() {
        let gear = Gear::new(GearKind::Display);
        assert!(gear.connected());
    }
}
