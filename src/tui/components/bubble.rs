use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border::Set as BorderSet;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::core::grouping::GroupPosition;
use crate::core::layout::BubblePlan;
use crate::core::message::{Message, Service};
use crate::core::segment::Segment;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
pub const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
pub const VERTICAL_OVERHEAD: u16 = 2;
/// Column reserved left of inbound bubbles in group chats.
pub const AVATAR_WIDTH: u16 = 3;
/// Bubbles never grow past this share of the container.
const MAX_WIDTH_PERCENT: u16 = 75;

const ROUNDED: BorderSet<'static> = BorderSet {
    top_left: "╭",
    top_right: "╮",
    bottom_left: "╰",
    bottom_right: "╯",
    vertical_left: "│",
    vertical_right: "│",
    horizontal_top: "─",
    horizontal_bottom: "─",
};

/// Corner style for a bubble at `position`. The side facing the sender is
/// squared off where the bubble joins a neighbour in the same run.
pub fn corners(position: GroupPosition, is_from_me: bool) -> BorderSet<'static> {
    let mut set = ROUNDED;
    let (top, bottom) = if is_from_me {
        (&mut set.top_right, &mut set.bottom_right)
    } else {
        (&mut set.top_left, &mut set.bottom_left)
    };
    if position.joins_previous() {
        *top = if is_from_me { "┐" } else { "┌" };
    }
    if position.joins_next() {
        *bottom = if is_from_me { "┘" } else { "└" };
    }
    set
}

/// Widest content line allowed for a container `width` cells wide.
pub fn max_content_width(container_width: u16) -> u16 {
    (container_width.saturating_mul(MAX_WIDTH_PERCENT) / 100)
        .saturating_sub(HORIZONTAL_OVERHEAD)
        .max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Text,
    Media,
    File,
    Link,
}

/// Flattens a plan's segments into display lines wrapped at `width`.
fn content_lines(segments: &[Segment], width: u16) -> Vec<(String, LineKind)> {
    let options = textwrap::Options::new(width.max(1) as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);

    let mut lines = Vec::new();
    for segment in segments {
        let (text, kind) = match segment {
            Segment::Text(text) => (text.clone(), LineKind::Text),
            Segment::Media(attachment) => {
                (format!("▣ {}", attachment.display_name()), LineKind::Media)
            }
            Segment::File(attachment) => {
                (format!("▤ {}", attachment.display_name()), LineKind::File)
            }
            Segment::LinkPreview(url) => (format!("↗ {url}"), LineKind::Link),
        };
        for paragraph in text.lines() {
            let wrapped = textwrap::wrap(paragraph, &options);
            if wrapped.is_empty() {
                lines.push((String::new(), kind));
            }
            lines.extend(wrapped.into_iter().map(|l| (l.into_owned(), kind)));
        }
    }
    lines
}

/// Outer size of the bubble box in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleSize {
    pub width: u16,
    pub height: u16,
}

impl BubbleSize {
    /// Predicts the rendered box for `plan` without rendering it, so the
    /// list can compute scroll geometry up front.
    pub fn measure(plan: &BubblePlan, container_width: u16) -> Self {
        let lines = content_lines(&plan.segments, max_content_width(container_width));
        let widest = lines
            .iter()
            .map(|(l, _)| UnicodeWidthStr::width(l.as_str()) as u16)
            .max()
            .unwrap_or(0)
            .max(1);
        Self {
            width: (widest + HORIZONTAL_OVERHEAD).min(container_width.max(1)),
            height: (lines.len() as u16).max(1) + VERTICAL_OVERHEAD,
        }
    }
}

/// Two-character badge for the avatar column.
pub fn avatar_initials(sender: Option<&str>) -> String {
    let Some(sender) = sender.map(str::trim).filter(|s| !s.is_empty()) else {
        return "?".into();
    };
    if sender.chars().any(char::is_alphabetic) {
        sender
            .split(|c: char| !c.is_alphanumeric())
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    } else {
        let digits: Vec<char> = sender.chars().filter(char::is_ascii_digit).collect();
        digits[digits.len().saturating_sub(2)..].iter().collect()
    }
}

fn bubble_color(message: &Message) -> Color {
    if message.has_error {
        Color::Red
    } else if !message.is_from_me {
        Color::Gray
    } else if message.service == Service::IMessage {
        Color::Blue
    } else {
        Color::Green
    }
}

/// One message bubble, positioned within its row band.
///
/// `area` passed to `render` is the full-width band the list assigned to
/// this message; the bubble aligns itself to the sender's side and applies
/// the horizontal `offset` (reply drag plus clearance) in cells.
pub struct Bubble<'a> {
    pub plan: &'a BubblePlan,
    pub message: &'a Message,
    pub size: BubbleSize,
    pub offset: i32,
    pub date_reveal_progress: f32,
    pub reveal_label: &'a str,
    pub reserve_avatar: bool,
}

impl Bubble<'_> {
    /// Left edge of the bubble box relative to the band.
    pub fn x_in(&self, band_width: u16) -> u16 {
        let gutter = if self.reserve_avatar && !self.plan.is_from_me {
            AVATAR_WIDTH
        } else {
            0
        };
        let resting = if self.plan.is_from_me {
            band_width.saturating_sub(self.size.width) as i32
        } else {
            gutter as i32
        };
        let max_x = band_width.saturating_sub(self.size.width) as i32;
        (resting + self.offset).clamp(0, max_x.max(0)) as u16
    }

    fn render_reveal_label(&self, band: Rect, bubble: Rect, buf: &mut Buffer) {
        if self.date_reveal_progress <= 0.0 || self.reveal_label.is_empty() {
            return;
        }
        let (start, room) = if self.plan.is_from_me {
            (band.x, bubble.x.saturating_sub(band.x + 1))
        } else {
            let start = bubble.right() + 1;
            (start, band.right().saturating_sub(start))
        };
        if room == 0 {
            return;
        }

        let total = self.reveal_label.chars().count();
        let shown = ((total as f32) * self.date_reveal_progress).ceil() as usize;
        let label: String = if self.plan.is_from_me {
            self.reveal_label.chars().skip(total - shown.min(total)).collect()
        } else {
            self.reveal_label.chars().take(shown).collect()
        };
        let label_width = (UnicodeWidthStr::width(label.as_str()) as u16).min(room);
        let x = if self.plan.is_from_me {
            start + room - label_width
        } else {
            start
        };
        let y = bubble.y + bubble.height.saturating_sub(1) / 2;
        buf.set_stringn(
            x,
            y,
            &label,
            label_width as usize,
            Style::default().fg(Color::DarkGray),
        );
    }
}

impl Widget for Bubble<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let x = area.x + self.x_in(area.width);
        let bubble_area = Rect::new(
            x,
            area.y,
            self.size.width.min(area.right().saturating_sub(x)),
            self.size.height.min(area.height),
        );

        if self.plan.show_avatar {
            let initials = avatar_initials(self.message.sender_address.as_deref());
            let y = bubble_area.bottom().saturating_sub(2);
            buf.set_stringn(
                area.x,
                y,
                &initials,
                AVATAR_WIDTH.saturating_sub(1) as usize,
                Style::default().fg(Color::Black).bg(Color::Gray),
            );
        }

        self.render_reveal_label(area, bubble_area, buf);

        let color = bubble_color(self.message);
        let block = Block::bordered()
            .border_set(corners(self.plan.group_position, self.plan.is_from_me))
            .border_style(Style::default().fg(color))
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner = block.inner(bubble_area);
        block.render(bubble_area, buf);

        let lines: Vec<Line> = content_lines(&self.plan.segments, inner.width)
            .into_iter()
            .map(|(text, kind)| {
                let style = match kind {
                    LineKind::Text => Style::default(),
                    LineKind::Media | LineKind::File => {
                        Style::default().fg(color).add_modifier(Modifier::ITALIC)
                    }
                    LineKind::Link => Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                };
                Line::from(Span::styled(text, style))
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::{has_detected_preview, plan};
    use crate::core::message::AttachmentKind;
    use crate::test_support::{inbound, outbound, with_attachments};

    fn single_plan(message: Message) -> BubblePlan {
        plan(&[message], false, has_detected_preview).remove(0)
    }

    // ==========================================================================
    // measure tests
    // ==========================================================================

    #[test]
    fn measure_short_text_hugs_content() {
        let size = BubbleSize::measure(&single_plan(outbound("1", "hello")), 80);
        assert_eq!(size.width, 5 + HORIZONTAL_OVERHEAD);
        assert_eq!(size.height, 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn measure_long_text_wraps_at_max_width() {
        let text = "word ".repeat(40);
        let size = BubbleSize::measure(&single_plan(outbound("1", &text)), 40);
        assert!(size.width <= 30);
        assert!(size.height > 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn measure_counts_one_line_per_attachment() {
        let message = with_attachments(
            inbound("1", "alice", "look"),
            &[AttachmentKind::Media, AttachmentKind::File],
        );
        let size = BubbleSize::measure(&single_plan(message), 80);
        assert_eq!(size.height, 3 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn measure_empty_bubble_keeps_chrome() {
        let mut message = outbound("1", "");
        message.text = None;
        let size = BubbleSize::measure(&single_plan(message), 80);
        assert_eq!(size.height, 1 + VERTICAL_OVERHEAD);
    }

    // ==========================================================================
    // corner and placement tests
    // ==========================================================================

    #[test]
    fn corners_square_off_sender_side_inside_runs() {
        let first = corners(GroupPosition::First, false);
        assert_eq!(first.top_left, "╭");
        assert_eq!(first.bottom_left, "└");

        let middle = corners(GroupPosition::Middle, true);
        assert_eq!(middle.top_right, "┐");
        assert_eq!(middle.bottom_right, "┘");
        assert_eq!(middle.top_left, "╭");

        let single = corners(GroupPosition::Single, true);
        assert_eq!(single.top_right, "╮");
        assert_eq!(single.bottom_right, "╯");
    }

    #[test]
    fn bubble_aligns_to_sender_side_and_applies_offset() {
        let out_plan = single_plan(outbound("1", "hi"));
        let message = outbound("1", "hi");
        let mut bubble = Bubble {
            plan: &out_plan,
            message: &message,
            size: BubbleSize { width: 10, height: 3 },
            offset: 0,
            date_reveal_progress: 0.0,
            reveal_label: "",
            reserve_avatar: true,
        };
        assert_eq!(bubble.x_in(40), 30);
        bubble.offset = -5;
        assert_eq!(bubble.x_in(40), 25);
        bubble.offset = 5;
        assert_eq!(bubble.x_in(40), 30, "clamped to the band");

        let in_plan = single_plan(inbound("2", "bob", "yo"));
        let in_message = inbound("2", "bob", "yo");
        let bubble = Bubble {
            plan: &in_plan,
            message: &in_message,
            size: BubbleSize { width: 10, height: 3 },
            offset: 4,
            date_reveal_progress: 0.0,
            reveal_label: "",
            reserve_avatar: true,
        };
        assert_eq!(bubble.x_in(40), AVATAR_WIDTH + 4);
    }

    #[test]
    fn avatar_initials_from_names_and_numbers() {
        assert_eq!(avatar_initials(Some("alice cooper")), "AC");
        assert_eq!(avatar_initials(Some("bob@example.com")), "BE");
        assert_eq!(avatar_initials(Some("+15550142")), "42");
        assert_eq!(avatar_initials(None), "?");
    }

    #[test]
    fn render_draws_text_and_reveal_label() {
        let message = outbound("1", "hi");
        let bubble_plan = single_plan(message.clone());
        let size = BubbleSize::measure(&bubble_plan, 30);
        let area = Rect::new(0, 0, 30, size.height);
        let mut buf = Buffer::empty(area);
        Bubble {
            plan: &bubble_plan,
            message: &message,
            size,
            offset: 0,
            date_reveal_progress: 1.0,
            reveal_label: "SMS 9:00 AM",
            reserve_avatar: false,
        }
        .render(area, &mut buf);

        let row: String = (0..30).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("hi"), "row was {row:?}");
        assert!(row.contains("SMS 9:00 AM"), "row was {row:?}");
    }
}
