//! Easing functions.
//!
//! Every ease is a pure function of normalized time `t ∈ [0, 1]`. Gears,
//! scroll panes and any host-side transitions evaluate the same curves.

use std::f32::consts::PI;

/// A named easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EaseType {
    Linear,
    SineIn,
    SineOut,
    SineInOut,
    QuadIn,
    #[default]
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartOut,
    ExpoOut,
    BackOut,
    BounceOut,
}

impl EaseType {
    /// Evaluate the curve at `t`. Inputs outside `[0, 1]` are clamped.
    pub fn evaluate(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EaseType::Linear => t,
            EaseType::SineIn => 1.0 - (t * PI / 2.0).cos(),
            EaseType::SineOut => (t * PI / 2.0).sin(),
            EaseType::SineInOut => -0.5 * ((PI * t).cos() - 1.0),
            EaseType::QuadIn => t * t,
            EaseType::QuadOut => -t * (t - 2.0),
            EaseType::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -2.0 * t * t + 4.0 * t - 1.0
                }
            }
            EaseType::CubicIn => t * t * t,
            EaseType::CubicOut => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            EaseType::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
            EaseType::QuartOut => {
                let u = t - 1.0;
                1.0 - u * u * u * u
            }
            EaseType::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            EaseType::BackOut => {
                const S: f32 = 1.70158;
                let u = t - 1.0;
                u * u * ((S + 1.0) * u + S) + 1.0
            }
            EaseType::BounceOut => bounce_out(t),
        }
    }

    /// Look up a curve by its descriptor name, e.g. `"Quad.Out"`.
    pub fn from_name(name: &str) -> Option<EaseType> {
        let ease = match name {
            "Linear" => EaseType::Linear,
            "Sine.In" => EaseType::SineIn,
            "Sine.Out" => EaseType::SineOut,
            "Sine.InOut" => EaseType::SineInOut,
            "Quad.In" => EaseType::QuadIn,
            "Quad.Out" => EaseType::QuadOut,
            "Quad.InOut" => EaseType::QuadInOut,
            "Cubic.In" => EaseType::CubicIn,
            "Cubic.Out" => EaseType::CubicOut,
            "Cubic.InOut" => EaseType::CubicInOut,
            "Quart.Out" => EaseType::QuartOut,
            "Expo.Out" => EaseType::ExpoOut,
            "Back.Out" => EaseType::BackOut,
            "Bounce.Out" => EaseType::BounceOut,
            _ => return None,
        };
        Some(ease)
    }
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let u = t - 1.5 / D;
        N * u * u + 0.75
    } else if t < 2.5 / D {
        let u = t - 2.25 / D;
        N * u * u + 0.9375
    } else {
        let u = t - 2.625 / D;
        N * u * u + 0.984375
    }
}
