//! Stage-wide tunables.
//!
//! [`StageConfig`] collects every constant the scroll physics, gear tweens and
//! virtual lists consult. It is owned by the [`Stage`](crate::stage::Stage)
//! and read on demand, so changing a field takes effect on the next frame.

// ---------------------------------------------------------------------------
// StageConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Stage`](crate::stage::Stage).
#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    /// Host frame rate used by drag velocity estimation.
    pub frame_rate: f32,
    /// Whether gears may tween at all. When `false` every gear applies at once.
    pub gear_tweens: bool,
    /// Default inertia deceleration rate per frame.
    pub deceleration_rate: f32,
    /// Pointer travel (px) before a press turns into a scroll drag.
    pub touch_scroll_sensitivity: f32,
    /// Pull distance (px) past an edge that counts as a pull-release gesture.
    pub touch_drag_sensitivity: f32,
    /// Pixels per wheel notch is twice this value.
    pub scroll_step: f32,
    /// Fraction of a page the content must travel backwards to turn the page.
    pub paging_threshold: f32,
    /// Fraction of an item beyond which a forward flick snaps to the next item.
    /// Backward flicks use `1 - snapping_threshold`.
    pub snapping_threshold: f32,
    /// Maximum overscroll as a fraction of the view size.
    pub pull_ratio: f32,
    /// Whether new scroll panes bounce at their edges.
    pub bounce_back: bool,
    /// Duration (s) of a release/bounce scroll tween.
    pub scroll_tween_time: f32,
    /// Duration (s) of an animated `set_pos` scroll.
    pub scroll_go_time: f32,
    /// Seconds an auto scrollbar stays visible after scrolling stops.
    pub scrollbar_auto_hide_delay: f32,
    /// Extra lines materialized past the visible window in virtual lists.
    pub list_lookahead_lines: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            gear_tweens: true,
            deceleration_rate: 0.967,
            touch_scroll_sensitivity: 20.0,
            touch_drag_sensitivity: 10.0,
            scroll_step: 25.0,
            paging_threshold: 0.3,
            snapping_threshold: 0.1,
            pull_ratio: 0.5,
            bounce_back: true,
            scroll_tween_time: 0.3,
            scroll_go_time: 0.5,
            scrollbar_auto_hide_delay: 0.5,
            list_lookahead_lines: 0,
        }
    }
}

impl StageConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host frame rate (builder).
    pub fn with_frame_rate(mut self, fps: f32) -> Self {
        self.frame_rate = fps;
        self
    }

    /// Enable or disable gear tweening globally (builder).
    pub fn with_gear_tweens(mut self, enabled: bool) -> Self {
        self.gear_tweens = enabled;
        self
    }

    /// Set the inertia deceleration rate (builder).
    pub fn with_deceleration_rate(mut self, rate: f32) -> Self {
        self.deceleration_rate = rate;
        self
    }

    /// Set the drag start threshold in pixels (builder).
    pub fn with_touch_scroll_sensitivity(mut self, px: f32) -> Self {
        self.touch_scroll_sensitivity = px;
        self
    }

    /// Set the wheel scroll step (builder).
    pub fn with_scroll_step(mut self, px: f32) -> Self {
        self.scroll_step = px;
        self
    }

    /// Set whether new panes bounce at their edges (builder).
    pub fn with_bounce_back(mut self, bounce: bool) -> Self {
        self.bounce_back = bounce;
        self
    }

    /// Set the number of lookahead lines for virtual lists (builder).
    pub fn with_list_lookahead_lines(mut self, lines: usize) -> Self {
        self.list_lookahead_lines = lines;
        self
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_config_defaults() {
        let config = StageConfig::new();
        assert_eq!(config.frame_rate, 60.0);
        assert!(config.gear_tweens);
        assert!(config.bounce_back);
        assert_eq!(config.scroll_step, 25.0);
        assert_eq!(config.list_lookahead_lines, 0);
    }

    #[test]
    fn stage_config_builder() {
        let config = StageConfig::new()
            .with_frame_rate(30.0)
            .with_gear_tweens(false)
            .with_bounce_back(false)
            .with_scroll_step(10.0)
            .with_list_lookahead_lines(2);
        assert_eq!(config.frame_rate, 30.0);
        assert!(!config.gear_tweens);
        assert!(!config.bounce_back);
        assert_eq!(config.scroll_step, 10.0);
        assert_eq!(config.list_lookahead_lines, 2);
    }
}
