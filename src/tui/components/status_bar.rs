//! # StatusBar Component
//!
//! Single-line header above the conversation.
//!
//! ## Responsibilities
//!
//! - Name the conversation kind (group or one-to-one) and message count
//! - Show the latest gesture outcome ("Replying to ...", haptic tick)
//! - Flag that a swipe is in progress
//!
//! Purely presentational: every field is a prop filled in by the event loop.
//!
//! 1. **Swiping**: `"Bubbles (group · 9) | Replying to s4 | ⇆"`
//! 2. **Status message**: `"Bubbles (group · 9) | Replying to s4"`
//! 3. **Default**: `"Bubbles (group · 9)"`

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct StatusBar {
    pub is_group_chat: bool,
    pub message_count: usize,
    pub status_message: String,
    pub swipe_active: bool,
    /// Bold the bar for the frame after a haptic threshold crossing.
    pub haptic_flash: bool,
}

impl StatusBar {
    pub fn new(is_group_chat: bool, message_count: usize, status_message: String) -> Self {
        Self {
            is_group_chat,
            message_count,
            status_message,
            swipe_active: false,
            haptic_flash: false,
        }
    }

    pub fn text(&self) -> String {
        let kind = if self.is_group_chat { "group" } else { "direct" };
        let mut text = format!("Bubbles ({kind} · {})", self.message_count);
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(&self.status_message);
        }
        if self.swipe_active {
            text.push_str(" | ⇆");
        }
        text
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = if self.haptic_flash {
            Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default()
        };
        frame.render_widget(Line::from(Span::styled(self.text(), style)), area);
    }
}
