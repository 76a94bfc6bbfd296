//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::time::Duration;

use crate::core::gesture::{GestureListener, SwipeGestureEngine};
use crate::core::message::{Attachment, AttachmentKind, Message};

pub fn inbound(id: &str, sender: &str, text: &str) -> Message {
    Message::text(id, false, Some(sender), text)
}

pub fn outbound(id: &str, text: &str) -> Message {
    Message::text(id, true, None, text)
}

pub fn reaction(id: &str, sender: &str) -> Message {
    Message {
        is_reaction: true,
        ..Message::text(id, false, Some(sender), "Loved “hi”")
    }
}

/// Attaches one attachment per kind, with guids `<id>-att-<n>`.
pub fn with_attachments(mut message: Message, kinds: &[AttachmentKind]) -> Message {
    message.attachments = kinds
        .iter()
        .enumerate()
        .map(|(n, &kind)| Attachment::new(format!("{}-att-{}", message.id, n), kind))
        .collect();
    message
}

/// Records every callback the gesture engine fires.
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub replies: Vec<String>,
    pub haptics: usize,
    pub active_changes: Vec<bool>,
}

impl GestureListener for RecordingListener {
    fn on_reply_committed(&mut self, message_id: &str) {
        self.replies.push(message_id.to_string());
    }

    fn on_haptic_threshold_crossed(&mut self) {
        self.haptics += 1;
    }

    fn on_swipe_active_changed(&mut self, is_active: bool) {
        self.active_changes.push(is_active);
    }
}

/// Steps 60fps frames until the engine's return animations finish.
pub fn settle(engine: &mut SwipeGestureEngine) {
    let mut frames = 0;
    while engine.tick(Duration::from_millis(16)) {
        frames += 1;
        assert!(frames < 1_000, "animation never settled");
    }
}
