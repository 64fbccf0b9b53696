//! Values a gear can store, and their tween encoding.

use super::GearKind;
use crate::geometry::{Point, Size};
use crate::stage::{AnimationState, Color};
use crate::tween::TweenValue;

/// Alpha, rotation and scale, driven together by a look gear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Look {
    pub alpha: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for Look {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// One stored gear value.
#[derive(Debug, Clone, PartialEq)]
pub enum GearValue {
    XY(Point),
    Size(Size),
    Look(Look),
    Color(Color),
    Animation(AnimationState),
    Text(String),
    Icon(String),
}

impl GearValue {
    /// The gear kind able to hold this value.
    pub fn kind(&self) -> GearKind {
        match self {
            GearValue::XY(_) => GearKind::XY,
            GearValue::Size(_) => GearKind::Size,
            GearValue::Look(_) => GearKind::Look,
            GearValue::Color(_) => GearKind::Color,
            GearValue::Animation(_) => GearKind::Animation,
            GearValue::Text(_) => GearKind::Text,
            GearValue::Icon(_) => GearKind::Icon,
        }
    }

    /// Interpolation components, for tweenable values.
    pub fn to_tween(&self) -> Option<TweenValue> {
        match self {
            GearValue::XY(p) => Some([p.x, p.y, 0.0, 0.0]),
            GearValue::Size(s) => Some([s.width, s.height, 0.0, 0.0]),
            GearValue::Look(l) => Some([l.alpha, l.rotation, l.scale_x, l.scale_y]),
            GearValue::Color(c) => Some(c.channels()),
            _ => None,
        }
    }

    /// Inverse of [`to_tween`](Self::to_tween).
    pub fn from_tween(kind: GearKind, v: TweenValue) -> Option<GearValue> {
        match kind {
            GearKind::XY => Some(GearValue::XY(Point::new(v[0], v[1]))),
            GearKind::Size => Some(GearValue::Size(Size::new(v[0], v[1]))),
            GearKind::Look => Some(GearValue::Look(Look {
                alpha: v[0],
                rotation: v[1],
                scale_x: v[2],
                scale_y: v[3],
            })),
            GearKind::Color => Some(GearValue::Color(Color::from_channels(v))),
            _ => None,
        }
    }

    /// Translate position or size values by a relation-driven delta.
    pub(crate) fn shift(&mut self, delta: Point) {
        match self {
            GearValue::XY(p) => *p = *p + delta,
            GearValue::Size(s) => {
                s.width += delta.x;
                s.height += delta.y;
            }
            _ => {}
        }
    }
}
