//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the bubbles,
//! and turns mouse drags into the pointer stream the gesture engines expect.
//!
//! This is the only module that knows about ratatui and crossterm. The core
//! never sees cells: drag deltas are converted to pixels here using
//! `pixels_per_cell` (rows count double, terminal cells being about twice as
//! tall as they are wide), and translations come back in pixels.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (a bubble is springing back): draws every ~16ms and
//!   advances springs by the real elapsed time.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.

mod component;
mod components;
mod event;
mod ui;

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
};
use crossterm::execute;
use log::{debug, info};

use crate::core::config::ResolvedConfig;
use crate::core::gesture::GestureListener;
use crate::core::state::ConversationState;
use crate::core::transcript::Transcript;
use crate::tui::component::EventHandler;
use crate::tui::components::BubbleListState;
use crate::tui::event::{TuiEvent, poll_event_timeout};

const ANIMATION_FRAME: Duration = Duration::from_millis(16);
const IDLE_POLL: Duration = Duration::from_millis(500);
/// Rows are roughly twice the height of columns.
const ROW_ASPECT: f32 = 2.0;
/// Longest step fed to the springs after a stall (e.g. a slow redraw).
const MAX_TICK: Duration = Duration::from_millis(100);

/// The drag currently in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct PressedPointer {
    /// Bubble under the pointer at press time; `None` drags the list itself.
    pub message_id: Option<String>,
    pub last: (u16, u16),
}

/// TUI-specific presentation state (not part of the pipeline)
pub struct TuiState {
    pub bubble_list: BubbleListState,
    pub pressed: Option<PressedPointer>,
    pub status_message: String,
    pub swipe_active: bool,
    pub haptic_flash: bool,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            bubble_list: BubbleListState::new(),
            pressed: None,
            status_message: String::new(),
            swipe_active: false,
            haptic_flash: false,
        }
    }
}

/// Collects gesture callbacks during one event so they can be applied to
/// `TuiState` once the engine borrow ends.
#[derive(Debug, Default)]
struct Feedback {
    replied_to: Option<String>,
    haptic: bool,
    active: Option<bool>,
}

impl GestureListener for Feedback {
    fn on_reply_committed(&mut self, message_id: &str) {
        self.replied_to = Some(message_id.to_string());
    }

    fn on_haptic_threshold_crossed(&mut self) {
        debug!("Haptic tick");
        self.haptic = true;
    }

    fn on_swipe_active_changed(&mut self, is_active: bool) {
        self.active = Some(is_active);
    }
}

impl Feedback {
    fn apply(self, tui: &mut TuiState, conversation: &ConversationState) {
        if let Some(active) = self.active {
            tui.swipe_active = active;
        }
        if self.haptic {
            tui.haptic_flash = true;
        }
        if let Some(id) = self.replied_to {
            let preview = conversation
                .message(&id)
                .and_then(|m| m.visible_text())
                .map(|t| t.chars().take(24).collect::<String>())
                .unwrap_or_else(|| id.clone());
            info!("Reply requested for message {}", id);
            tui.status_message = format!("Replying to \"{preview}\"");
        }
    }
}

/// Cell delta between two pointer positions, converted to pixels.
pub fn drag_delta(from: (u16, u16), to: (u16, u16), pixels_per_cell: f32) -> (f32, f32) {
    let dx = (f32::from(to.0) - f32::from(from.0)) * pixels_per_cell;
    let dy = (f32::from(to.1) - f32::from(from.1)) * pixels_per_cell * ROW_ASPECT;
    (dx, dy)
}

/// Routes one pointer event to the gesture engines and the list scroll.
fn handle_pointer(
    event: TuiEvent,
    conversation: &mut ConversationState,
    tui: &mut TuiState,
    pixels_per_cell: f32,
) {
    let mut feedback = Feedback::default();
    match event {
        TuiEvent::PointerDown(col, row) => {
            let message_id = tui
                .bubble_list
                .hit_test(col, row)
                .and_then(|i| conversation.cached_plans().get(i))
                .map(|plan| plan.message_id.clone());
            if let Some(id) = &message_id {
                debug!("Pointer down on bubble {}", id);
                conversation.pointer_down(id, &mut feedback);
            }
            tui.pressed = Some(PressedPointer {
                message_id,
                last: (col, row),
            });
        }
        TuiEvent::PointerDrag(col, row) => {
            let Some(pressed) = tui.pressed.as_mut() else {
                return;
            };
            let (dx, dy) = drag_delta(pressed.last, (col, row), pixels_per_cell);
            let rows = i32::from(row) - i32::from(pressed.last.1);
            pressed.last = (col, row);

            let consumed = match &pressed.message_id {
                Some(id) => conversation.pointer_move(id, dx, dy, true, &mut feedback),
                None => false,
            };
            if !consumed && rows != 0 {
                tui.bubble_list.scroll_rows(rows);
            }
        }
        TuiEvent::PointerUp(_, _) => {
            if let Some(PressedPointer {
                message_id: Some(id),
                ..
            }) = tui.pressed.take()
            {
                conversation.pointer_up(&id, &mut feedback);
            }
        }
        TuiEvent::FocusLost => {
            tui.pressed = None;
            conversation.cancel_all(&mut feedback);
        }
        _ => {}
    }
    feedback.apply(tui, conversation);
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, EnableFocusChange)?;
        info!("Terminal modes enabled (mouse capture, focus change)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableFocusChange, DisableMouseCapture);
    }
}

pub fn run(config: ResolvedConfig, transcript: Transcript) -> io::Result<()> {
    let is_group_chat = config.group_chat || transcript.group_chat;
    let mut conversation =
        ConversationState::new(transcript.messages, is_group_chat, config.settings);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();
    info!(
        "Starting conversation view ({} messages, group chat: {})",
        conversation.messages.len(),
        is_group_chat
    );

    let mut last_tick = Instant::now();
    let mut needs_redraw = true;
    let result = loop {
        let now = Instant::now();
        let animating = conversation.tick((now - last_tick).min(MAX_TICK));
        last_tick = now;
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            if let Err(e) = terminal.draw(|f| {
                ui::draw_ui(f, &mut conversation, &mut tui, config.pixels_per_cell)
            }) {
                break Err(e);
            }
            tui.haptic_flash = false;
            needs_redraw = false;
        }

        let timeout = if animating || conversation.active_engines() > 0 {
            ANIMATION_FRAME
        } else {
            IDLE_POLL
        };
        let event = match poll_event_timeout(timeout) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => break Err(e),
        };
        needs_redraw = true;

        match event {
            TuiEvent::Quit => break Ok(()),
            TuiEvent::Resize => {}
            TuiEvent::ToggleGroupChat => {
                conversation.is_group_chat = !conversation.is_group_chat;
                debug!("Group chat toggled: {}", conversation.is_group_chat);
            }
            TuiEvent::ScrollUp
            | TuiEvent::ScrollDown
            | TuiEvent::ScrollPageUp
            | TuiEvent::ScrollPageDown => {
                tui.bubble_list.handle_event(&event);
            }
            TuiEvent::PointerDown(..)
            | TuiEvent::PointerDrag(..)
            | TuiEvent::PointerUp(..)
            | TuiEvent::FocusLost => {
                handle_pointer(event, &mut conversation, &mut tui, config.pixels_per_cell);
            }
        }
    };

    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::PipelineSettings;
    use crate::test_support::{inbound, outbound};
    use ratatui::layout::Rect;

    fn setup() -> (ConversationState, TuiState) {
        let mut conversation = ConversationState::new(
            vec![inbound("a", "alice", "hello there"), outbound("b", "hi")],
            false,
            PipelineSettings::default(),
        );
        let generation = conversation.refresh_plans();
        let mut tui = TuiState::new();
        tui.bubble_list
            .layout
            .ensure(conversation.cached_plans(), 40, generation);
        tui.bubble_list.area = Rect::new(0, 1, 41, 20);
        (conversation, tui)
    }

    #[test]
    fn test_drag_delta_scales_rows() {
        assert_eq!(drag_delta((10, 5), (13, 5), 8.0), (24.0, 0.0));
        assert_eq!(drag_delta((10, 5), (10, 4), 8.0), (0.0, -16.0));
    }

    #[test]
    fn test_horizontal_drag_commits_reply() {
        let (mut conversation, mut tui) = setup();
        // Bubble "b" is the second band: rows 1+4 .. 1+7.
        handle_pointer(TuiEvent::PointerDown(35, 6), &mut conversation, &mut tui, 8.0);
        assert_eq!(
            tui.pressed.as_ref().and_then(|p| p.message_id.as_deref()),
            Some("b")
        );

        handle_pointer(TuiEvent::PointerDrag(26, 6), &mut conversation, &mut tui, 8.0);
        assert!(tui.swipe_active);
        assert!(tui.haptic_flash);
        assert!(conversation.snapshot("b").reply_offset < 0.0);

        handle_pointer(TuiEvent::PointerUp(26, 6), &mut conversation, &mut tui, 8.0);
        assert!(!tui.swipe_active);
        assert_eq!(tui.status_message, "Replying to \"hi\"");
        assert!(tui.pressed.is_none());
    }

    #[test]
    fn test_focus_loss_cancels_without_reply() {
        let (mut conversation, mut tui) = setup();
        handle_pointer(TuiEvent::PointerDown(35, 6), &mut conversation, &mut tui, 8.0);
        handle_pointer(TuiEvent::PointerDrag(26, 6), &mut conversation, &mut tui, 8.0);
        handle_pointer(TuiEvent::FocusLost, &mut conversation, &mut tui, 8.0);

        assert!(!tui.swipe_active);
        assert!(tui.status_message.is_empty());
        assert!(tui.pressed.is_none());
    }

    #[test]
    fn test_press_outside_bubbles_drags_nothing() {
        let (mut conversation, mut tui) = setup();
        handle_pointer(TuiEvent::PointerDown(5, 30), &mut conversation, &mut tui, 8.0);
        handle_pointer(TuiEvent::PointerDrag(20, 30), &mut conversation, &mut tui, 8.0);
        assert_eq!(conversation.active_engines(), 0);
        assert_eq!(
            tui.pressed,
            Some(PressedPointer {
                message_id: None,
                last: (20, 30)
            })
        );
    }
}
