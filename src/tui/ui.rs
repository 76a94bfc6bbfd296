use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::core::state::ConversationState;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{BubbleList, StatusBar};

const HINTS: &str = "drag ←/→ on a bubble: reply or show time · drag ↕/wheel: scroll · g: group · q: quit";

/// Splits the screen into status line, bubble list and key hints.
pub fn screen_areas(area: Rect) -> [Rect; 3] {
    use Constraint::{Length, Min};
    Layout::vertical([Length(1), Min(0), Length(1)]).areas(area)
}

pub fn draw_ui(
    frame: &mut Frame,
    conversation: &mut ConversationState,
    tui: &mut TuiState,
    pixels_per_cell: f32,
) {
    let [status_area, list_area, hint_area] = screen_areas(frame.area());
    let plan_generation = conversation.refresh_plans();
    let conversation = &*conversation;

    let mut status_bar = StatusBar::new(
        conversation.is_group_chat,
        conversation.cached_plans().len(),
        tui.status_message.clone(),
    );
    status_bar.swipe_active = tui.swipe_active;
    status_bar.haptic_flash = tui.haptic_flash;
    status_bar.render(frame, status_area);

    BubbleList::new(
        &mut tui.bubble_list,
        conversation,
        plan_generation,
        pixels_per_cell,
    )
    .render(frame, list_area);

    frame.render_widget(
        Span::styled(HINTS, Style::default().add_modifier(Modifier::DIM)),
        hint_area,
    );
}
