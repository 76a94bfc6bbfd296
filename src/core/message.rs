//! # Message Model
//!
//! The read-only snapshot of a conversation message that the rendering
//! pipeline consumes on every render cycle. Owned by the data layer; the
//! core never mutates it.
//!
//! ```text
//! Message
//! ├── id: String                      // stable identity (bubble key)
//! ├── is_from_me: bool                // alignment + swipe direction
//! ├── sender_address: Option<String>  // run-length grouping identity
//! ├── is_reaction: bool               // excluded from grouping/segmentation
//! ├── text: Option<String>
//! ├── attachments: Vec<Attachment>    // insertion order significant
//! ├── has_error / is_placed_sticker   // swipe eligibility gates
//! ├── detected_link_preview_url       // substring stripped from text
//! ├── service: Service                // iMessage / SMS / RCS
//! └── date_created: DateTime<Utc>     // shown by the date-reveal swipe
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Transport a message was delivered over.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Service {
    #[default]
    #[serde(rename = "iMessage")]
    IMessage,
    #[serde(rename = "SMS")]
    Sms,
    #[serde(rename = "RCS")]
    Rcs,
}

impl Service {
    pub fn label(self) -> &'static str {
        match self {
            Service::IMessage => "iMessage",
            Service::Sms => "SMS",
            Service::Rcs => "RCS",
        }
    }
}

/// Attachment category. Only the tag matters to the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Image, video or gif.
    Media,
    File,
    Vcard,
    Audio,
    /// Anything the data layer could not classify. Segments as a file.
    #[serde(other)]
    Unknown,
}

impl AttachmentKind {
    /// Classify by MIME type. Unrecognized types fall through to `File`.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        let top_level = mime.split('/').next().unwrap_or("");
        match top_level {
            "image" | "video" => AttachmentKind::Media,
            "audio" => AttachmentKind::Audio,
            _ if mime == "text/vcard" || mime == "text/x-vcard" => AttachmentKind::Vcard,
            _ => AttachmentKind::File,
        }
    }

    pub fn is_media(self) -> bool {
        matches!(self, AttachmentKind::Media)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attachment {
    pub guid: String,
    pub kind: AttachmentKind,
    /// Raw display metadata, carried through untouched.
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub transfer_name: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl Attachment {
    pub fn new(guid: impl Into<String>, kind: AttachmentKind) -> Self {
        Self {
            guid: guid.into(),
            kind,
            mime_type: None,
            transfer_name: None,
            width: None,
            height: None,
        }
    }

    /// Builds an attachment whose kind is derived from its MIME type.
    pub fn from_mime(guid: impl Into<String>, mime: &str) -> Self {
        Self {
            mime_type: Some(mime.to_string()),
            ..Self::new(guid, AttachmentKind::from_mime(mime))
        }
    }

    /// Human-readable name for file-style rendering.
    pub fn display_name(&self) -> &str {
        self.transfer_name.as_deref().unwrap_or(&self.guid)
    }
}

fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    #[serde(default = "new_message_id")]
    pub id: String,
    #[serde(default)]
    pub is_from_me: bool,
    #[serde(default)]
    pub sender_address: Option<String>,
    #[serde(default)]
    pub is_reaction: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub has_error: bool,
    #[serde(default)]
    pub is_placed_sticker: bool,
    #[serde(default)]
    pub detected_link_preview_url: Option<String>,
    #[serde(default)]
    pub service: Service,
    #[serde(default = "now")]
    pub date_created: DateTime<Utc>,
}

impl Message {
    /// Plain text message with no attachments, sent over iMessage.
    pub fn text(
        id: impl Into<String>,
        is_from_me: bool,
        sender_address: Option<&str>,
        text: &str,
    ) -> Self {
        Self {
            id: id.into(),
            is_from_me,
            sender_address: sender_address.map(str::to_string),
            is_reaction: false,
            text: Some(text.to_string()),
            attachments: Vec::new(),
            has_error: false,
            is_placed_sticker: false,
            detected_link_preview_url: None,
            service: Service::IMessage,
            date_created: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn is_imessage(&self) -> bool {
        self.service == Service::IMessage
    }

    /// True when `other` belongs to the same visual run as `self`.
    pub fn same_sender_as(&self, other: &Message) -> bool {
        self.is_from_me == other.is_from_me && self.sender_address == other.sender_address
    }

    /// Text with whitespace stripped, or `None` when there is nothing to show.
    pub fn visible_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Label revealed beside the bubble by the date-reveal swipe,
/// e.g. `"iMessage 3:04 PM"`.
pub fn reveal_label<Tz: TimeZone>(message: &Message, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = message.date_created.with_timezone(tz);
    format!("{} {}", message.service.label(), local.format("%-I:%M %p"))
}
