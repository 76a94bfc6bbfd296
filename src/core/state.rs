//! # Conversation State
//!
//! Everything the pipeline keeps between frames for one open conversation.
//! Framework-free: the TUI (or any other adapter) feeds pointer events in
//! and reads plans and snapshots out.
//!
//! ```text
//! ConversationState
//! ├── messages: Vec<Message>                      // visible window, data-layer owned
//! ├── is_group_chat: bool
//! ├── settings: PipelineSettings                  // gesture / spring / clearance tuning
//! ├── plans: PlanCache                            // segments + grouping, content-hashed
//! └── gestures: HashMap<id, SwipeGestureEngine>  // one engine per bubble, lazily created
//! ```
//!
//! Engines are created on the first pointer-down for a bubble and dropped
//! once they are idle and fully at rest, so a swipe never outlives its
//! gesture plus return animation.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;

use crate::core::clearance::ClearanceSpec;
use crate::core::gesture::{
    GestureConfig, GestureListener, SwipeGestureEngine, SwipeSnapshot, SwipeTarget,
};
use crate::core::layout::{BubblePlan, PlanCache, has_detected_preview};
use crate::core::message::Message;
use crate::core::spring::SpringConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineSettings {
    pub gesture: GestureConfig,
    pub springs: SpringConfig,
    pub clearance: ClearanceSpec,
}

pub struct ConversationState {
    pub messages: Vec<Message>,
    pub is_group_chat: bool,
    pub settings: PipelineSettings,
    plans: PlanCache,
    gestures: HashMap<String, SwipeGestureEngine>,
}

impl ConversationState {
    pub fn new(messages: Vec<Message>, is_group_chat: bool, settings: PipelineSettings) -> Self {
        Self {
            messages,
            is_group_chat,
            settings,
            plans: PlanCache::new(),
            gestures: HashMap::new(),
        }
    }

    /// Render plans for the current window. Rebuilt only when content changes.
    pub fn plans(&mut self) -> &[BubblePlan] {
        self.plans
            .get_or_build(&self.messages, self.is_group_chat, has_detected_preview)
    }

    /// Brings the plan cache up to date and returns its generation, which
    /// changes whenever the plans were rebuilt.
    pub fn refresh_plans(&mut self) -> usize {
        self.plans();
        self.plans.rebuilds()
    }

    /// Plans as of the last refresh.
    pub fn cached_plans(&self) -> &[BubblePlan] {
        self.plans.last()
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Starts a gesture on the bubble for `message_id`. Unknown ids and
    /// reactions are ignored.
    pub fn pointer_down(&mut self, message_id: &str, listener: &mut impl GestureListener) -> bool {
        let Some(message) = self.message(message_id).filter(|m| !m.is_reaction) else {
            return false;
        };
        let target = SwipeTarget::from_message(message, self.settings.gesture.reply_enabled);
        let settings = self.settings;

        let engine = self
            .gestures
            .entry(message_id.to_string())
            .or_insert_with(|| {
                debug!("Creating gesture engine for bubble {}", message_id);
                SwipeGestureEngine::new(settings.gesture, settings.springs, target.clone())
            });
        engine.set_target(target);
        engine.on_pointer_down(listener)
    }

    pub fn pointer_move(
        &mut self,
        message_id: &str,
        dx: f32,
        dy: f32,
        still_pressed: bool,
        listener: &mut impl GestureListener,
    ) -> bool {
        self.gestures
            .get_mut(message_id)
            .is_some_and(|engine| engine.on_pointer_move(dx, dy, still_pressed, listener))
    }

    pub fn pointer_up(&mut self, message_id: &str, listener: &mut impl GestureListener) -> bool {
        self.gestures
            .get_mut(message_id)
            .is_some_and(|engine| engine.on_pointer_up(listener))
    }

    pub fn pointer_cancel(&mut self, message_id: &str, listener: &mut impl GestureListener) -> bool {
        self.gestures
            .get_mut(message_id)
            .is_some_and(|engine| engine.on_pointer_cancel(listener))
    }

    /// Cancels every in-progress gesture (focus loss, conversation switch).
    pub fn cancel_all(&mut self, listener: &mut impl GestureListener) {
        for engine in self.gestures.values_mut() {
            engine.on_pointer_cancel(listener);
        }
    }

    /// Advances return animations and drops engines that are fully at rest.
    /// Returns `true` while anything is still moving.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let mut animating = false;
        for engine in self.gestures.values_mut() {
            animating |= engine.tick(dt);
        }
        self.gestures.retain(|_, engine| !engine.is_at_rest());
        animating
    }

    pub fn snapshot(&self, message_id: &str) -> SwipeSnapshot {
        self.gestures
            .get(message_id)
            .map(SwipeGestureEngine::snapshot)
            .unwrap_or_default()
    }

    /// Horizontal bubble translation: reply drag plus adaptive clearance.
    pub fn translation(
        &self,
        message_id: &str,
        is_from_me: bool,
        container_width: f32,
        bubble_width: f32,
    ) -> f32 {
        let snapshot = self.snapshot(message_id);
        self.settings
            .clearance
            .bubble_translation(&snapshot, container_width, bubble_width, is_from_me)
    }

    /// Number of live gesture engines.
    pub fn active_engines(&self) -> usize {
        self.gestures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingListener, inbound, outbound, reaction};

    fn state() -> ConversationState {
        ConversationState::new(
            vec![
                inbound("1", "alice", "hello"),
                reaction("r", "bob"),
                outbound("2", "hi"),
            ],
            true,
            PipelineSettings::default(),
        )
    }

    #[test]
    fn test_engines_are_per_bubble() {
        let mut state = state();
        let mut listener = RecordingListener::default();

        state.pointer_down("1", &mut listener);
        state.pointer_move("1", 40.0, 0.0, true, &mut listener);
        assert!(state.snapshot("1").reply_offset > 0.0);
        assert_eq!(state.snapshot("2"), SwipeSnapshot::default());
        assert_eq!(state.active_engines(), 1);
    }

    #[test]
    fn test_reactions_and_unknown_ids_ignored() {
        let mut state = state();
        assert!(!state.pointer_down("r", &mut ()));
        assert!(!state.pointer_down("nope", &mut ()));
        assert!(!state.pointer_move("nope", 50.0, 0.0, true, &mut ()));
        assert_eq!(state.active_engines(), 0);
    }

    #[test]
    fn test_engines_pruned_after_animation() {
        let mut state = state();
        state.pointer_down("2", &mut ());
        state.pointer_move("2", -50.0, 0.0, true, &mut ());
        state.pointer_up("2", &mut ());
        assert_eq!(state.active_engines(), 1);

        let mut frames = 0;
        while state.tick(Duration::from_millis(16)) {
            frames += 1;
            assert!(frames < 1_000);
        }
        assert_eq!(state.active_engines(), 0);
        assert_eq!(state.snapshot("2").reply_offset, 0.0);
    }

    #[test]
    fn test_cancel_all_resets_every_bubble() {
        let mut state = state();
        let mut listener = RecordingListener::default();
        state.pointer_down("2", &mut listener);
        state.pointer_move("2", -80.0, 0.0, true, &mut listener);
        state.cancel_all(&mut listener);

        assert_eq!(state.snapshot("2").kind, None);
        assert!(listener.replies.is_empty());
        while state.tick(Duration::from_millis(16)) {}
        assert_eq!(state.active_engines(), 0);
    }

    #[test]
    fn test_translation_includes_clearance() {
        let mut state = state();
        state.pointer_down("2", &mut ());
        // Away from center for an outbound bubble reveals the date.
        state.pointer_move("2", 120.0, 0.0, true, &mut ());
        assert_eq!(state.snapshot("2").date_reveal_progress, 1.0);
        assert_eq!(state.translation("2", true, 360.0, 300.0), 32.0);
        assert_eq!(state.translation("2", true, 1000.0, 300.0), 0.0);
    }

    #[test]
    fn test_plans_follow_messages() {
        let mut state = state();
        assert_eq!(state.plans().len(), 2);
        state.messages.push(inbound("3", "alice", "again"));
        let plans = state.plans();
        assert_eq!(plans.len(), 3);
        assert!(plans[2].show_avatar);
    }

    #[test]
    fn test_refresh_generation_tracks_rebuilds() {
        let mut state = state();
        let first = state.refresh_plans();
        assert_eq!(state.refresh_plans(), first);
        assert_eq!(state.cached_plans().len(), 2);

        state.is_group_chat = false;
        assert_ne!(state.refresh_plans(), first);
        assert!(state.cached_plans().iter().all(|p| !p.show_avatar));
    }
}
