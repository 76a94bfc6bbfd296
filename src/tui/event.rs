use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers, MouseButton, MouseEventKind};

/// TUI-specific input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiEvent {
    Quit,
    ToggleGroupChat,

    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,

    // Left-button pointer stream, in terminal cells
    PointerDown(u16, u16),
    PointerDrag(u16, u16),
    PointerUp(u16, u16),

    // Terminal lost focus mid-drag: treat as a system cancel
    FocusLost,
    Resize,
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: Duration) -> io::Result<Option<TuiEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    Ok(translate(event::read()?))
}

fn translate(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key_event) => match (key_event.modifiers, key_event.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::Quit),
            (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => Some(TuiEvent::Quit),
            (_, KeyCode::Char('g')) => Some(TuiEvent::ToggleGroupChat),
            (_, KeyCode::Up) => Some(TuiEvent::ScrollUp),
            (_, KeyCode::Down) => Some(TuiEvent::ScrollDown),
            (_, KeyCode::PageUp) => Some(TuiEvent::ScrollPageUp),
            (_, KeyCode::PageDown) => Some(TuiEvent::ScrollPageDown),
            _ => None,
        },
        Event::Mouse(mouse_event) => {
            let (col, row) = (mouse_event.column, mouse_event.row);
            match mouse_event.kind {
                MouseEventKind::Down(MouseButton::Left) => Some(TuiEvent::PointerDown(col, row)),
                MouseEventKind::Drag(MouseButton::Left) => Some(TuiEvent::PointerDrag(col, row)),
                MouseEventKind::Up(MouseButton::Left) => Some(TuiEvent::PointerUp(col, row)),
                MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
                MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
                _ => None,
            }
        }
        Event::FocusLost => Some(TuiEvent::FocusLost),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}
