//! Host display primitive boundary.
//!
//! The core never renders. Each object owns a boxed [`DisplayPrimitive`] and
//! pushes every geometry change to it; the host reports intrinsic box changes
//! back through [`Stage::notify_box_changed`](crate::stage::Stage::notify_box_changed).

use std::fmt;

use crate::geometry::{Point, Rect};

/// The surface a host renderer exposes for one displayable object.
pub trait DisplayPrimitive: fmt::Debug {
    /// Move the primitive within its parent.
    fn set_position(&mut self, x: f32, y: f32);
    /// Resize the primitive.
    fn set_size(&mut self, width: f32, height: f32);
    /// Set the scale factors.
    fn set_scale(&mut self, scale_x: f32, scale_y: f32);
    /// Set the rotation in degrees.
    fn set_rotation(&mut self, degrees: f32);
    /// Set the opacity in `[0, 1]`.
    fn set_alpha(&mut self, alpha: f32);
    /// Show or hide the primitive.
    fn set_visible(&mut self, visible: bool);
    /// Offset the primitive's content layer (scroll containers only).
    fn set_content_offset(&mut self, _x: f32, _y: f32) {}
    /// Current box as the host sees it.
    fn bounds(&self) -> Rect;
}

// ---------------------------------------------------------------------------
// HeadlessPrimitive
// ---------------------------------------------------------------------------

/// A primitive that only records the last values pushed to it.
///
/// Used when the stage runs without a renderer (tests, layout precomputation).
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessPrimitive {
    pub bounds: Rect,
    pub scale: Point,
    pub rotation: f32,
    pub alpha: f32,
    pub visible: bool,
    pub content_offset: Point,
}

impl HeadlessPrimitive {
    /// Create a headless primitive with identity transform.
    pub fn new() -> Self {
        Self {
            bounds: Rect::EMPTY,
            scale: Point::new(1.0, 1.0),
            rotation: 0.0,
            alpha: 1.0,
            visible: true,
            content_offset: Point::ZERO,
        }
    }
}

impl Default for HeadlessPrimitive {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPrimitive for HeadlessPrimitive {
    fn set_position(&mut self, x: f32, y: f32) {
        self.bounds.x = x;
        self.bounds.y = y;
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.bounds.width = width;
        self.bounds.height = height;
    }

    fn set_scale(&mut self, scale_x: f32, scale_y: f32) {
        self.scale = Point::new(scale_x, scale_y);
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_content_offset(&mut self, x: f32, y: f32) {
        self.content_offset = Point::new(x, y);
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_records_pushes() {
        let mut p = HeadlessPrimitive::new();
        p.set_position(3.0, 4.0);
        p.set_size(10.0, 20.0);
        p.set_alpha(0.5);
        p.set_visible(false);
        p.set_content_offset(0.0, -40.0);
        assert_eq!(p.bounds(), Rect::new(3.0, 4.0, 10.0, 20.0));
        assert_eq!(p.alpha, 0.5);
        assert!(!p.visible);
        assert_eq!(p.content_offset, Point::new(0.0, -40.0));
    }
}
