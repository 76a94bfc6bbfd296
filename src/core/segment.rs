//! # Segmentation
//!
//! Splits one logical message into the ordered list of pieces the rendering
//! layer draws as separate bubbles:
//!
//! ```text
//! attachments (original order)  →  text  →  link preview
//! ```
//!
//! Plain-text messages never get here: [`needs_segmentation`] is the fast
//! path gate, and callers render those straight into a single bubble.

use crate::core::message::{Attachment, Message};

/// Object replacement character. iMessage puts one in the body text for
/// every inline attachment; it is never meant to be displayed.
const OBJECT_REPLACEMENT: char = '\u{FFFC}';

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Media(Attachment),
    LinkPreview(String),
    File(Attachment),
}

/// True iff the message has attachments or a link preview to show.
pub fn needs_segmentation(message: &Message, has_link_preview: bool) -> bool {
    !message.attachments.is_empty() || has_link_preview
}

/// Returns the ordered segments for `message`.
///
/// At most one `Text` segment is produced. Blank text yields no text
/// segment, so a whitespace-only message with nothing else returns an
/// empty list.
pub fn parse(message: &Message, has_link_preview: bool) -> Vec<Segment> {
    if !needs_segmentation(message, has_link_preview) {
        return message
            .visible_text()
            .map(|text| vec![Segment::Text(text.to_string())])
            .unwrap_or_default();
    }

    let preview_url = if has_link_preview {
        message.detected_link_preview_url.as_deref()
    } else {
        None
    };

    let mut segments = Vec::with_capacity(message.attachments.len() + 2);

    for attachment in &message.attachments {
        if attachment.kind.is_media() {
            segments.push(Segment::Media(attachment.clone()));
        } else {
            segments.push(Segment::File(attachment.clone()));
        }
    }

    if let Some(text) = message.text.as_deref() {
        let body = display_text(text, preview_url);
        if !body.is_empty() {
            segments.push(Segment::Text(body));
        }
    }

    if let Some(url) = preview_url {
        segments.push(Segment::LinkPreview(url.to_string()));
    }

    segments
}

/// Strips attachment placeholders and the first exact occurrence of the
/// previewed URL, then trims.
fn display_text(text: &str, preview_url: Option<&str>) -> String {
    let mut body: String = text.chars().filter(|&c| c != OBJECT_REPLACEMENT).collect();
    if let Some(url) = preview_url.filter(|u| !u.is_empty())
        && let Some(start) = body.find(url)
    {
        body.replace_range(start..start + url.len(), "");
    }
    body.trim().to_string()
}
