//! Object types: ObjectId, ObjectData, capabilities.

use std::fmt;

use slotmap::new_key_type;

use crate::display::{DisplayPrimitive, HeadlessPrimitive};
use crate::gear::GearSet;
use crate::geometry::{Point, Rect, Size};
use crate::relation::RelationSet;

new_key_type! {
    /// Unique identifier for a stage object. Copy, lightweight (u64).
    pub struct ObjectId;
}

// ---------------------------------------------------------------------------
// Capability values
// ---------------------------------------------------------------------------

/// A 32-bit ARGB colour.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color(0xff00_0000);
    /// Opaque white.
    pub const WHITE: Color = Color(0xffff_ffff);

    /// Build from 8-bit channels.
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Channels as floats in `[0, 255]`, ordered A, R, G, B.
    pub fn channels(self) -> [f32; 4] {
        [
            ((self.0 >> 24) & 0xff) as f32,
            ((self.0 >> 16) & 0xff) as f32,
            ((self.0 >> 8) & 0xff) as f32,
            (self.0 & 0xff) as f32,
        ]
    }

    /// Inverse of [`channels`](Self::channels); components are rounded and clamped.
    pub fn from_channels(c: [f32; 4]) -> Self {
        let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Color::from_argb(q(c[0]), q(c[1]), q(c[2]), q(c[3]))
    }
}

/// Playback state of an animated object (movie clip, spine, ...).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationState {
    pub playing: bool,
    pub frame: u32,
}

/// Optional property families an object may expose.
///
/// A `Some` field means the capability is present. Gears check these once,
/// when they are configured, and refuse to bind to an absent capability.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Capabilities {
    pub color: Option<Color>,
    pub title_color: Option<Color>,
    pub text: Option<String>,
    pub icon: Option<String>,
    pub animation: Option<AnimationState>,
    pub selected: Option<bool>,
}

// ---------------------------------------------------------------------------
// ObjectData
// ---------------------------------------------------------------------------

/// Data associated with a single stage object.
pub struct ObjectData {
    /// Name used for descriptor lookups (`find_child`).
    pub name: String,
    /// Resource url of the item type this object was created from.
    pub resource_url: Option<String>,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) scale_x: f32,
    pub(crate) scale_y: f32,
    pub(crate) rotation: f32,
    pub(crate) alpha: f32,
    pub(crate) visible: bool,
    /// Visibility decided by the display gear.
    pub(crate) internal_visible: bool,
    pub(crate) caps: Capabilities,
    pub(crate) relations: RelationSet,
    pub(crate) gears: GearSet,
    /// Set while a gear writes to this object, so the write is not stored back.
    pub(crate) gear_locked: bool,
    /// Set while the object is being built from a descriptor.
    pub(crate) under_construct: bool,
    pub(crate) primitive: Box<dyn DisplayPrimitive>,
}

impl ObjectData {
    /// Create a new object with a headless primitive and sensible defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_url: None,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            alpha: 1.0,
            visible: true,
            internal_visible: true,
            caps: Capabilities::default(),
            relations: RelationSet::default(),
            gears: GearSet::default(),
            gear_locked: false,
            under_construct: false,
            primitive: Box::new(HeadlessPrimitive::new()),
        }
    }

    /// Set the initial position (builder).
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self.primitive.set_position(x, y);
        self
    }

    /// Set the initial size (builder).
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self.primitive.set_size(width, height);
        self
    }

    /// Set the resource url (builder).
    pub fn with_resource_url(mut self, url: impl Into<String>) -> Self {
        self.resource_url = Some(url.into());
        self
    }

    /// Expose the `color` capability (builder).
    pub fn with_color(mut self, color: Color) -> Self {
        self.caps.color = Some(color);
        self
    }

    /// Expose the `title_color` capability (builder).
    pub fn with_title_color(mut self, color: Color) -> Self {
        self.caps.title_color = Some(color);
        self
    }

    /// Expose the `text` capability (builder).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.caps.text = Some(text.into());
        self
    }

    /// Expose the `icon` capability (builder).
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.caps.icon = Some(icon.into());
        self
    }

    /// Expose the `animation` capability (builder).
    pub fn with_animation(mut self, state: AnimationState) -> Self {
        self.caps.animation = Some(state);
        self
    }

    /// Expose the `selected` capability (builder).
    pub fn selectable(mut self) -> Self {
        self.caps.selected = Some(false);
        self
    }

    /// Replace the host primitive (builder).
    pub fn with_primitive(mut self, mut primitive: Box<dyn DisplayPrimitive>) -> Self {
        primitive.set_position(self.x, self.y);
        primitive.set_size(self.width, self.height);
        self.primitive = primitive;
        self
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Position and size as one rect in parent coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// `(scale_x, scale_y)`.
    pub fn scale(&self) -> Point {
        Point::new(self.scale_x, self.scale_y)
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// The user-controlled visibility flag.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the display gear currently lets this object show.
    pub fn is_internally_visible(&self) -> bool {
        self.internal_visible
    }

    /// Visible both by user flag and by display gear.
    pub fn is_displayed(&self) -> bool {
        self.visible && self.internal_visible
    }

    /// The object's optional capabilities.
    pub fn caps(&self) -> &Capabilities {
        &self.caps
    }

    /// The host primitive (read-only).
    pub fn primitive(&self) -> &dyn DisplayPrimitive {
        &*self.primitive
    }

    /// The object's relation set.
    pub fn relations(&self) -> &RelationSet {
        &self.relations
    }

    /// The object's gears.
    pub fn gears(&self) -> &GearSet {
        &self.gears
    }
}

impl fmt::Debug for ObjectData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectData")
            .field("name", &self.name)
            .field("rect", &self.rect())
            .field("visible", &self.is_displayed())
            .field("caps", &self.caps)
            .field("relations", &self.relations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults() {
        let data = ObjectData::new("Button");
        assert_eq!(data.name, "Button");
        assert_eq!(data.rect(), Rect::EMPTY);
        assert_eq!(data.scale(), Point::new(1.0, 1.0));
        assert_eq!(data.alpha(), 1.0);
        assert!(data.is_displayed());
        assert_eq!(data.caps(), &Capabilities::default());
        assert!(data.relations().is_empty());
    }

    #[test]
    fn builder_geometry_reaches_primitive() {
        let data = ObjectData::new("Panel").with_position(5.0, 6.0).with_size(70.0, 80.0);
        assert_eq!(data.primitive().bounds(), Rect::new(5.0, 6.0, 70.0, 80.0));
    }

    #[test]
    fn builder_capabilities() {
        let data = ObjectData::new("Label")
            .with_text("hi")
            .with_title_color(Color::WHITE)
            .selectable();
        assert_eq!(data.caps().text.as_deref(), Some("hi"));
        assert_eq!(data.caps().title_color, Some(Color::WHITE));
        assert_eq!(data.caps().selected, Some(false));
        assert!(data.caps().color.is_none());
    }

    #[test]
    fn replacing_primitive_keeps_geometry() {
        let data = ObjectData::new("Box")
            .with_size(10.0, 10.0)
            .with_primitive(Box::new(HeadlessPrimitive::new()));
        assert_eq!(data.primitive().bounds().size(), Size::new(10.0, 10.0));
    }

    #[test]
    fn color_channels_roundtrip() {
        let c = Color::from_argb(0x80, 0x10, 0x20, 0x30);
        assert_eq!(c, Color(0x8010_2030));
        assert_eq!(c.channels(), [128.0, 16.0, 32.0, 48.0]);
        assert_eq!(Color::from_channels(c.channels()), c);
    }

    #[test]
    fn object_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<ObjectId>();
    }
}
