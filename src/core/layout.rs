//! # Render Plan
//!
//! Combines segmentation and grouping into one list the rendering layer
//! walks top to bottom. Reactions get no plan.
//!
//! Plans are derived data. [`PlanCache`] keeps the last result and only
//! rebuilds when a content hash of the inputs changes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::core::grouping::{GroupPosition, resolve_avatar_visibility, resolve_group_positions};
use crate::core::message::Message;
use crate::core::segment::{Segment, needs_segmentation, parse};

#[derive(Debug, Clone, PartialEq)]
pub struct BubblePlan {
    /// Index into the source message list.
    pub index: usize,
    pub message_id: String,
    pub is_from_me: bool,
    pub segments: Vec<Segment>,
    /// False for the single-bubble fast path (plain text).
    pub segmented: bool,
    pub group_position: GroupPosition,
    pub show_avatar: bool,
}

/// Default link-preview policy: the detector found a URL.
pub fn has_detected_preview(message: &Message) -> bool {
    message.detected_link_preview_url.is_some()
}

pub fn plan(
    messages: &[Message],
    is_group_chat: bool,
    has_link_preview: impl Fn(&Message) -> bool,
) -> Vec<BubblePlan> {
    let positions = resolve_group_positions(messages);
    let avatars = resolve_avatar_visibility(messages, is_group_chat);

    messages
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.is_reaction)
        .map(|(index, message)| {
            let preview = has_link_preview(message);
            BubblePlan {
                index,
                message_id: message.id.clone(),
                is_from_me: message.is_from_me,
                segments: parse(message, preview),
                segmented: needs_segmentation(message, preview),
                group_position: positions
                    .get(&index)
                    .copied()
                    .unwrap_or(GroupPosition::Single),
                show_avatar: avatars.get(&index).copied().unwrap_or(false),
            }
        })
        .collect()
}

/// Hashes every field that can change a plan.
fn content_key(
    messages: &[Message],
    is_group_chat: bool,
    has_link_preview: &impl Fn(&Message) -> bool,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    is_group_chat.hash(&mut hasher);
    messages.len().hash(&mut hasher);
    for m in messages {
        m.id.hash(&mut hasher);
        m.is_from_me.hash(&mut hasher);
        m.sender_address.hash(&mut hasher);
        m.is_reaction.hash(&mut hasher);
        m.text.hash(&mut hasher);
        m.detected_link_preview_url.hash(&mut hasher);
        has_link_preview(m).hash(&mut hasher);
        m.attachments.hash(&mut hasher);
    }
    hasher.finish()
}

#[derive(Debug, Default)]
pub struct PlanCache {
    key: Option<u64>,
    plans: Vec<BubblePlan>,
    rebuilds: usize,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        messages: &[Message],
        is_group_chat: bool,
        has_link_preview: impl Fn(&Message) -> bool,
    ) -> &[BubblePlan] {
        let key = content_key(messages, is_group_chat, &has_link_preview);
        if self.key != Some(key) {
            self.plans = plan(messages, is_group_chat, has_link_preview);
            self.key = Some(key);
            self.rebuilds += 1;
        }
        &self.plans
    }

    /// Plans from the most recent build.
    pub fn last(&self) -> &[BubblePlan] {
        &self.plans
    }

    /// How many times the plan was rebuilt from scratch.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }
}
