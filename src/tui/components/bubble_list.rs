//! # BubbleList Component
//!
//! Scrollable view of one conversation's bubbles.
//!
//! ## Responsibilities
//!
//! - Lay out one band per render plan (bubble plus run gap)
//! - Hand each bubble its live swipe translation and reveal progress
//! - Hit testing for pointer-down, so gestures reach the right bubble
//! - Cache measured bubble sizes until the plans or the width change
//!
//! ## Architecture
//!
//! `BubbleList` is a transient component (created each frame) wrapping
//! `&'a mut BubbleListState` (persistent scroll and layout state) and a
//! shared borrow of the `ConversationState` it draws. Swipe offsets are
//! produced by the core in pixels; `pixels_per_cell` maps them onto the grid.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::grouping::GroupPosition;
use crate::core::layout::BubblePlan;
use crate::core::message::reveal_label;
use crate::core::state::ConversationState;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{Bubble, BubbleSize};
use crate::tui::event::TuiEvent;

/// Blank rows after the last bubble of a run.
const RUN_GAP: u16 = 1;

/// Layout and scroll state for the bubble list.
/// Must be persisted in the parent TuiState.
pub struct BubbleListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, keep the newest message in view.
    pub stick_to_bottom: bool,
    /// Last rendered list area, for hit testing between frames.
    pub area: Rect,
}

impl Default for BubbleListState {
    fn default() -> Self {
        Self::new()
    }
}

impl BubbleListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            area: Rect::default(),
        }
    }

    fn max_scroll(&self) -> u16 {
        self.layout
            .total_height()
            .saturating_sub(self.area.height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scroll offset as drawn on screen. While pinned, the view sits at the end.
    pub fn effective_offset(&self) -> u16 {
        if self.stick_to_bottom {
            self.max_scroll()
        } else {
            self.scroll_state.offset().y.min(self.max_scroll())
        }
    }

    /// Scrolls by whole rows; positive moves toward older messages.
    /// Used for drags the gesture engine handed back as vertical scrolls.
    pub fn scroll_rows(&mut self, rows: i32) {
        let current = self.scroll_state.offset();
        let y = (self.effective_offset() as i32 - rows).clamp(0, self.max_scroll() as i32) as u16;
        self.scroll_state.set_offset(Position { x: current.x, y });
        if rows > 0 {
            self.stick_to_bottom = false;
        } else {
            self.repin_if_at_bottom();
        }
    }

    /// Plan index of the bubble under a screen position, if any.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        if !self.area.contains(Position::new(column, row)) {
            return None;
        }
        let content_y = row - self.area.y + self.effective_offset();
        let index = self
            .layout
            .prefix_heights
            .partition_point(|&end| end <= content_y);
        let size = self.layout.sizes.get(index)?;
        let top = self.layout.top_of(index);
        // The run gap below a bubble is not part of it.
        (content_y < top + size.height).then_some(index)
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct BubbleList<'a> {
    pub state: &'a mut BubbleListState,
    pub conversation: &'a ConversationState,
    /// Plan generation returned by `ConversationState::refresh_plans`.
    pub plan_generation: usize,
    pub pixels_per_cell: f32,
}

impl<'a> BubbleList<'a> {
    pub fn new(
        state: &'a mut BubbleListState,
        conversation: &'a ConversationState,
        plan_generation: usize,
        pixels_per_cell: f32,
    ) -> Self {
        Self {
            state,
            conversation,
            plan_generation,
            pixels_per_cell,
        }
    }

    fn offset_cells(&self, plan: &BubblePlan, content_width: u16, size: BubbleSize) -> i32 {
        let px = self.pixels_per_cell;
        let translation = self.conversation.translation(
            &plan.message_id,
            plan.is_from_me,
            f32::from(content_width) * px,
            f32::from(size.width) * px,
        );
        (translation / px).round() as i32
    }
}

impl Component for BubbleList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let conversation = self.conversation;
        let plans = conversation.cached_plans();

        // 1. Update layout cache
        self.state
            .layout
            .ensure(plans, content_width, self.plan_generation);
        self.state.area = area;
        let total_height = self.state.layout.total_height();

        // 2. Clamp scroll offset
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }
        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible bubbles into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible_range {
            let plan = &plans[i];
            let Some(message) = conversation.messages.get(plan.index) else {
                continue;
            };
            let size = self.state.layout.sizes[i];
            let snapshot = conversation.snapshot(&plan.message_id);
            let label = if snapshot.date_reveal_progress > 0.0 {
                reveal_label(message, &Local)
            } else {
                String::new()
            };

            let band = Rect::new(0, self.state.layout.top_of(i), content_width, size.height);
            let bubble = Bubble {
                plan,
                message,
                size,
                offset: self.offset_cells(plan, content_width, size),
                date_reveal_progress: snapshot.date_reveal_progress,
                reveal_label: &label,
                reserve_avatar: conversation.is_group_chat,
            };
            scroll_view.render_widget(bubble, band);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler lives on `BubbleListState` because the list component is
/// rebuilt every frame and cannot hold scroll position itself.
impl EventHandler for BubbleListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
#[derive(Default)]
pub struct LayoutCache {
    pub sizes: Vec<BubbleSize>,
    /// Band heights: bubble height plus any run gap.
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    plan_generation: Option<usize>,
    content_width: u16,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self, plan_generation: usize, content_width: u16) -> bool {
        self.plan_generation == Some(plan_generation) && self.content_width == content_width
    }

    /// Re-measures every bubble when the plans or the width changed.
    pub fn ensure(&mut self, plans: &[BubblePlan], content_width: u16, plan_generation: usize) {
        if self.is_valid(plan_generation, content_width) && self.sizes.len() == plans.len() {
            return;
        }
        self.sizes = plans
            .iter()
            .map(|plan| BubbleSize::measure(plan, content_width))
            .collect();
        self.heights = plans
            .iter()
            .zip(&self.sizes)
            .map(|(plan, size)| size.height + band_gap(plan.group_position))
            .collect();
        self.rebuild_prefix_heights();
        self.plan_generation = Some(plan_generation);
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn top_of(&self, index: usize) -> u16 {
        if index == 0 {
            0
        } else {
            self.prefix_heights.get(index - 1).copied().unwrap_or(0)
        }
    }

    pub fn visible_range(
        &self,
        scroll_offset: u16,
        viewport_height: u16,
    ) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

fn band_gap(position: GroupPosition) -> u16 {
    if position.joins_next() { 0 } else { RUN_GAP }
}
