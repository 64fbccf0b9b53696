//! Scrollbar indicator state derived from a [`ScrollPane`].

use super::pane::{ScrollBarDisplay, ScrollPane};
use crate::geometry::Axis;

/// Data needed to render a scrollbar indicator.
///
/// Both `thumb_position` and `thumb_size` are in the range `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollbarState {
    /// Whether the bar is on screen.
    pub shown: bool,
    /// Whether there is anything to scroll.
    pub enabled: bool,
    /// Position of the thumb as a fraction (0.0 = top/left, 1.0 = bottom/right).
    pub thumb_position: f32,
    /// Size of the thumb as a fraction of the track (view / content ratio).
    pub thumb_size: f32,
}

impl ScrollbarState {
    /// Compute the bar for one axis of a pane.
    pub fn compute(pane: &ScrollPane, axis: Axis) -> Self {
        let content = pane.content_size().get(axis);
        let view = pane.view_size().get(axis);
        let overlap = pane.overlap().get(axis);

        let thumb_size = if content <= 0.0 {
            1.0
        } else {
            (view / content).clamp(0.0, 1.0)
        };
        let thumb_position = if overlap > 0.0 {
            (pane.scrolling_pos().get(axis) / overlap).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let enabled = overlap > 0.0;

        let shown = pane.scroll_type().scrolls(axis)
            && match pane.bar_display() {
                ScrollBarDisplay::Default => enabled,
                ScrollBarDisplay::Visible => true,
                ScrollBarDisplay::Auto => {
                    enabled && (pane.is_dragging() || pane.is_tweening() || pane.auto_hide > 0.0)
                }
                ScrollBarDisplay::Hidden => false,
            };

        Self {
            shown,
            enabled,
            thumb_position,
            thumb_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;
    use crate::geometry::Size;
    use crate::scroll::{ScrollOptions, ScrollType};

    fn pane(display: ScrollBarDisplay, content: f32) -> ScrollPane {
        let options = ScrollOptions::new(ScrollType::Vertical).with_bar_display(display);
        let mut p = ScrollPane::new(options, &StageConfig::default());
        p.set_view_size(Size::new(100.0, 200.0));
        p.set_content_size(Size::new(100.0, content));
        p
    }

    // ---------------------------------------------------------------
    // Thumb geometry
    // ---------------------------------------------------------------

    #[test]
    fn thumb_size_and_position() {
        let mut p = pane(ScrollBarDisplay::Default, 800.0);
        p.pos.y = 300.0;
        p.origin.y = -300.0;
        let bar = ScrollbarState::compute(&p, Axis::Y);
        assert_eq!(bar.thumb_size, 0.25);
        assert_eq!(bar.thumb_position, 0.5);
        assert!(bar.shown && bar.enabled);
    }

    #[test]
    fn thumb_full_when_content_fits() {
        let bar = ScrollbarState::compute(&pane(ScrollBarDisplay::Default, 100.0), Axis::Y);
        assert_eq!(bar.thumb_size, 1.0);
        assert_eq!(bar.thumb_position, 0.0);
        assert!(!bar.enabled);
    }

    // ---------------------------------------------------------------
    // Display modes
    // ---------------------------------------------------------------

    #[test]
    fn default_hides_when_nothing_scrolls() {
        assert!(!ScrollbarState::compute(&pane(ScrollBarDisplay::Default, 100.0), Axis::Y).shown);
    }

    #[test]
    fn visible_shows_disabled() {
        let bar = ScrollbarState::compute(&pane(ScrollBarDisplay::Visible, 100.0), Axis::Y);
        assert!(bar.shown);
        assert!(!bar.enabled);
    }

    #[test]
    fn auto_shows_only_while_active() {
        let mut p = pane(ScrollBarDisplay::Auto, 800.0);
        assert!(!ScrollbarState::compute(&p, Axis::Y).shown);
        p.auto_hide = 0.2;
        assert!(ScrollbarState::compute(&p, Axis::Y).shown);
    }

    #[test]
    fn hidden_and_off_axis_never_show() {
        assert!(!ScrollbarState::compute(&pane(ScrollBarDisplay::Hidden, 800.0), Axis::Y).shown);
        assert!(!ScrollbarState::compute(&pane(ScrollBarDisplay::Visible, 800.0), Axis::X).shown);
    }
}
