//! # Adaptive Clearance
//!
//! When the date-reveal swipe uncovers a label beside a bubble, the bubble
//! only moves if the free space next to it is too narrow for the label.
//! On wide screens the offset stays at zero.

use crate::core::gesture::SwipeSnapshot;

pub const DEFAULT_LABEL_WIDTH: f32 = 80.0;
pub const DEFAULT_MIN_CLEARANCE: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearanceSpec {
    /// Width reserved for the revealed date/type label.
    pub label_width: f32,
    /// Gap kept between label and bubble.
    pub min_clearance: f32,
}

impl Default for ClearanceSpec {
    fn default() -> Self {
        Self {
            label_width: DEFAULT_LABEL_WIDTH,
            min_clearance: DEFAULT_MIN_CLEARANCE,
        }
    }
}

impl ClearanceSpec {
    pub fn required_space(&self) -> f32 {
        self.label_width + self.min_clearance
    }

    /// Extra horizontal offset for the bubble at the given reveal progress.
    /// Positive for outbound bubbles, negative for inbound ones.
    pub fn compute(
        &self,
        container_width: f32,
        bubble_width: f32,
        date_reveal_progress: f32,
        is_from_me: bool,
    ) -> f32 {
        let available = container_width - bubble_width;
        let deficit = (self.required_space() - available).max(0.0);
        let direction = if is_from_me { 1.0 } else { -1.0 };
        deficit * date_reveal_progress.clamp(0.0, 1.0) * direction
    }

    /// Total horizontal translation for a bubble: reply drag plus clearance.
    pub fn bubble_translation(
        &self,
        snapshot: &SwipeSnapshot,
        container_width: f32,
        bubble_width: f32,
        is_from_me: bool,
    ) -> f32 {
        snapshot.reply_offset
            + self.compute(
                container_width,
                bubble_width,
                snapshot.date_reveal_progress,
                is_from_me,
            )
    }
}
