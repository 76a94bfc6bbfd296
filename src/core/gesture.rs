//! # Swipe Gestures
//!
//! Turns a raw pointer-drag stream on one bubble into at most one of two
//! swipe interactions: **reply** (drag toward the screen center) or
//! **date reveal** (everything else that is horizontal).
//!
//! ```text
//!            Down                 |dx| > |dy| × ratio
//!   Idle ──────────▶ Undetermined ───────────────────▶ Swiping(Reply | DateReveal)
//!    ▲                    │                                  │
//!    │                    │ otherwise                        │ Up / Cancel
//!    │                    ▼                                  │
//!    └──── Up/Cancel ─ Scrolling ◀───────────────────────────┘
//! ```
//!
//! The transition logic is the pure [`reduce`] function:
//! `(state, event) → (state, effects)`. [`SwipeGestureEngine`] wraps it,
//! owns the return springs, and forwards outward effects to a
//! [`GestureListener`]. Nothing here knows about a UI toolkit.

use std::time::Duration;

use log::debug;

use crate::core::message::Message;
use crate::core::spring::{Spring, SpringConfig};

/// Reply drag may travel this far past the commit threshold.
const REPLY_OVERDRAG: f32 = 1.2;

pub const DEFAULT_DETECTION_DISTANCE: f32 = 10.0;
pub const DEFAULT_DIRECTION_RATIO: f32 = 2.0;
pub const DEFAULT_REPLY_THRESHOLD: f32 = 60.0;
pub const DEFAULT_MAX_DRAG_DISTANCE: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Total displacement before a drag is classified.
    pub detection_distance: f32,
    /// Horizontal must beat vertical by this factor to count as a swipe.
    pub direction_ratio: f32,
    pub reply_threshold: f32,
    /// Drag distance that fully reveals the date label.
    pub max_drag_distance: f32,
    /// False when the host has no reply handler.
    pub reply_enabled: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            detection_distance: DEFAULT_DETECTION_DISTANCE,
            direction_ratio: DEFAULT_DIRECTION_RATIO,
            reply_threshold: DEFAULT_REPLY_THRESHOLD,
            max_drag_distance: DEFAULT_MAX_DRAG_DISTANCE,
            reply_enabled: true,
        }
    }
}

impl GestureConfig {
    /// Never negative, so it is always a valid clamp bound.
    pub fn max_reply_offset(&self) -> f32 {
        (self.reply_threshold * REPLY_OVERDRAG).max(0.0)
    }
}

/// The message flags the gesture logic cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeTarget {
    pub message_id: String,
    pub is_from_me: bool,
    pub reply_eligible: bool,
}

impl SwipeTarget {
    pub fn from_message(message: &Message, reply_enabled: bool) -> Self {
        Self {
            message_id: message.id.clone(),
            is_from_me: message.is_from_me,
            reply_eligible: reply_enabled
                && message.is_imessage()
                && !message.has_error
                && !message.is_placed_sticker,
        }
    }

    /// Outbound bubbles sit on the right, so "toward center" is leftward.
    fn is_toward_center(&self, dx: f32) -> bool {
        if self.is_from_me { dx < 0.0 } else { dx > 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeKind {
    Reply,
    DateReveal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    /// Pointer is down but the drag is still too short to classify.
    Undetermined { dx: f32, dy: f32 },
    /// Classified horizontal. The kind never changes for this gesture.
    Swiping(SwipeKind),
    /// Classified vertical. Events belong to the enclosing scroll container.
    Scrolling,
}

/// Per-gesture state. Reset to default whenever a gesture ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeState {
    pub phase: GesturePhase,
    pub reply_offset: f32,
    pub date_reveal_progress: f32,
    /// Edge-triggered latch: set when the reply threshold haptic fires.
    pub haptic_fired: bool,
}

impl Default for SwipeState {
    fn default() -> Self {
        Self {
            phase: GesturePhase::Idle,
            reply_offset: 0.0,
            date_reveal_progress: 0.0,
            haptic_fired: false,
        }
    }
}

impl SwipeState {
    pub fn kind(&self) -> Option<SwipeKind> {
        match self.phase {
            GesturePhase::Swiping(kind) => Some(kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down,
    /// Delta since the previous event. `pressed == false` ends the gesture.
    Move { dx: f32, dy: f32, pressed: bool },
    Up,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ReplyCommitted(String),
    HapticThresholdCrossed,
    SwipeActiveChanged(bool),
    /// Interrupt in-flight return animations and snap to neutral.
    StopAnimations,
    AnimateReplyToZero,
    AnimateRevealToZero,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SwipeState,
    pub effects: Vec<Effect>,
    /// Whether the event should be withheld from the scroll container.
    pub consumed: bool,
}

impl Transition {
    fn new(state: SwipeState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            consumed: false,
        }
    }
}

/// Pure transition function for one bubble's gesture.
pub fn reduce(
    config: &GestureConfig,
    target: &SwipeTarget,
    state: &SwipeState,
    event: PointerEvent,
) -> Transition {
    match event {
        PointerEvent::Down => {
            let mut t = Transition::new(SwipeState {
                phase: GesturePhase::Undetermined { dx: 0.0, dy: 0.0 },
                ..SwipeState::default()
            });
            if state.kind().is_some() {
                t.effects.push(Effect::SwipeActiveChanged(false));
            }
            t.effects.push(Effect::StopAnimations);
            t
        }
        PointerEvent::Move { pressed: false, .. } | PointerEvent::Up => release(config, target, state),
        PointerEvent::Cancel => cancel(state),
        PointerEvent::Move { dx, dy, .. } => drag(config, target, state, dx, dy),
    }
}

fn drag(
    config: &GestureConfig,
    target: &SwipeTarget,
    state: &SwipeState,
    dx: f32,
    dy: f32,
) -> Transition {
    let mut t = Transition::new(state.clone());
    match state.phase {
        GesturePhase::Idle | GesturePhase::Scrolling => {}
        GesturePhase::Undetermined { dx: acc_x, dy: acc_y } => {
            let (total_x, total_y) = (acc_x + dx, acc_y + dy);
            if total_x.hypot(total_y) < config.detection_distance {
                t.state.phase = GesturePhase::Undetermined {
                    dx: total_x,
                    dy: total_y,
                };
                return t;
            }
            if total_x.abs() > total_y.abs() * config.direction_ratio {
                let kind = if target.reply_eligible && target.is_toward_center(total_x) {
                    SwipeKind::Reply
                } else {
                    SwipeKind::DateReveal
                };
                t.state.phase = GesturePhase::Swiping(kind);
                t.effects.push(Effect::SwipeActiveChanged(true));
                apply_swipe_delta(config, target, kind, &mut t, total_x);
                t.consumed = true;
            } else {
                t.state.phase = GesturePhase::Scrolling;
            }
        }
        GesturePhase::Swiping(kind) => {
            apply_swipe_delta(config, target, kind, &mut t, dx);
            t.consumed = true;
        }
    }
    t
}

fn apply_swipe_delta(
    config: &GestureConfig,
    target: &SwipeTarget,
    kind: SwipeKind,
    t: &mut Transition,
    dx: f32,
) {
    let state = &mut t.state;
    match kind {
        SwipeKind::Reply => {
            let max = config.max_reply_offset();
            let raw = state.reply_offset + dx;
            state.reply_offset = if target.is_from_me {
                raw.clamp(-max, 0.0)
            } else {
                raw.clamp(0.0, max)
            };

            if state.reply_offset.abs() >= config.reply_threshold {
                if !state.haptic_fired {
                    state.haptic_fired = true;
                    t.effects.push(Effect::HapticThresholdCrossed);
                }
            } else {
                state.haptic_fired = false;
            }
        }
        SwipeKind::DateReveal => {
            // Progress grows away from the screen center.
            let sign = if target.is_from_me { 1.0 } else { -1.0 };
            let delta = if config.max_drag_distance > 0.0 {
                sign * dx / config.max_drag_distance
            } else {
                0.0
            };
            state.date_reveal_progress = (state.date_reveal_progress + delta).clamp(0.0, 1.0);
        }
    }
}

fn release(config: &GestureConfig, target: &SwipeTarget, state: &SwipeState) -> Transition {
    let mut t = Transition::new(SwipeState::default());
    if let GesturePhase::Swiping(kind) = state.phase {
        match kind {
            SwipeKind::Reply => {
                if state.reply_offset.abs() >= config.reply_threshold {
                    t.effects
                        .push(Effect::ReplyCommitted(target.message_id.clone()));
                }
                t.effects.push(Effect::AnimateReplyToZero);
            }
            SwipeKind::DateReveal => t.effects.push(Effect::AnimateRevealToZero),
        }
        t.effects.push(Effect::SwipeActiveChanged(false));
        t.consumed = true;
    }
    t
}

/// Same as a release that never commits, and always returns both values.
fn cancel(state: &SwipeState) -> Transition {
    let mut t = Transition::new(SwipeState::default());
    t.effects.push(Effect::AnimateReplyToZero);
    t.effects.push(Effect::AnimateRevealToZero);
    if state.kind().is_some() {
        t.effects.push(Effect::SwipeActiveChanged(false));
        t.consumed = true;
    }
    t
}

/// Receives the engine's outward side effects. All methods default to no-ops.
pub trait GestureListener {
    fn on_reply_committed(&mut self, _message_id: &str) {}
    fn on_haptic_threshold_crossed(&mut self) {}
    fn on_swipe_active_changed(&mut self, _is_active: bool) {}
}

impl GestureListener for () {}

/// What the rendering layer reads each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwipeSnapshot {
    pub kind: Option<SwipeKind>,
    pub reply_offset: f32,
    pub date_reveal_progress: f32,
    pub is_active: bool,
    pub is_animating: bool,
}

/// Per-bubble gesture controller. One instance per message id; never shared.
#[derive(Debug, Clone)]
pub struct SwipeGestureEngine {
    config: GestureConfig,
    target: SwipeTarget,
    state: SwipeState,
    reply: Spring,
    reveal: Spring,
}

impl SwipeGestureEngine {
    pub fn new(config: GestureConfig, springs: SpringConfig, target: SwipeTarget) -> Self {
        Self {
            config,
            target,
            state: SwipeState::default(),
            reply: Spring::new(springs.reply),
            reveal: Spring::new(springs.reveal),
        }
    }

    /// Message flags may change between renders. Takes effect at the next classification.
    pub fn set_target(&mut self, target: SwipeTarget) {
        self.target = target;
    }

    pub fn state(&self) -> &SwipeState {
        &self.state
    }

    pub fn on_pointer_down(&mut self, listener: &mut impl GestureListener) -> bool {
        self.handle(PointerEvent::Down, listener)
    }

    pub fn on_pointer_move(
        &mut self,
        dx: f32,
        dy: f32,
        still_pressed: bool,
        listener: &mut impl GestureListener,
    ) -> bool {
        self.handle(
            PointerEvent::Move {
                dx,
                dy,
                pressed: still_pressed,
            },
            listener,
        )
    }

    pub fn on_pointer_up(&mut self, listener: &mut impl GestureListener) -> bool {
        self.handle(PointerEvent::Up, listener)
    }

    pub fn on_pointer_cancel(&mut self, listener: &mut impl GestureListener) -> bool {
        self.handle(PointerEvent::Cancel, listener)
    }

    /// Feeds one event through [`reduce`] and applies the result.
    /// Returns `true` when the event was consumed by a swipe.
    pub fn handle(&mut self, event: PointerEvent, listener: &mut impl GestureListener) -> bool {
        let before = self.state.phase;
        let transition = reduce(&self.config, &self.target, &self.state, event);
        let after = transition.state.phase;

        if std::mem::discriminant(&before) != std::mem::discriminant(&after) {
            debug!(
                "Bubble {}: {:?} -> {:?} on {:?}",
                self.target.message_id, before, after, event
            );
        }
        if matches!(event, PointerEvent::Cancel) && !matches!(before, GesturePhase::Idle) {
            debug!("Bubble {}: gesture cancelled", self.target.message_id);
        }

        self.state = transition.state;
        if self.state.kind() == Some(SwipeKind::Reply) {
            self.reply.snap_to(self.state.reply_offset);
        }
        if self.state.kind() == Some(SwipeKind::DateReveal) {
            self.reveal.snap_to(self.state.date_reveal_progress);
        }

        for effect in transition.effects {
            match effect {
                Effect::StopAnimations => {
                    self.reply.snap_to(0.0);
                    self.reveal.snap_to(0.0);
                }
                Effect::AnimateReplyToZero => self.reply.release(),
                Effect::AnimateRevealToZero => self.reveal.release(),
                Effect::ReplyCommitted(id) => {
                    debug!("Bubble {}: reply committed", id);
                    listener.on_reply_committed(&id);
                }
                Effect::HapticThresholdCrossed => listener.on_haptic_threshold_crossed(),
                Effect::SwipeActiveChanged(active) => listener.on_swipe_active_changed(active),
            }
        }

        transition.consumed
    }

    /// Advances return animations by one frame. Returns `true` while any is running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let reply = self.reply.tick(dt);
        let reveal = self.reveal.tick(dt);
        reply || reveal
    }

    pub fn is_animating(&self) -> bool {
        self.reply.is_running() || self.reveal.is_running()
    }

    /// No gesture in progress and nothing left to animate.
    pub fn is_at_rest(&self) -> bool {
        self.state.phase == GesturePhase::Idle
            && !self.is_animating()
            && self.reply.value() == 0.0
            && self.reveal.value() == 0.0
    }

    pub fn snapshot(&self) -> SwipeSnapshot {
        SwipeSnapshot {
            kind: self.state.kind(),
            reply_offset: self.reply.value(),
            date_reveal_progress: self.reveal.value().clamp(0.0, 1.0),
            is_active: self.state.kind().is_some(),
            is_animating: self.is_animating(),
        }
    }
}
