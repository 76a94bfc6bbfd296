//! # Transcripts
//!
//! A transcript is a JSON snapshot of one conversation window, the same
//! shape the data layer hands the pipeline:
//!
//! ```json
//! { "group_chat": true, "messages": [ { "id": "...", "text": "..." } ] }
//! ```
//!
//! Messages without an `id` get a fresh UUID on load.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::core::message::{Attachment, Message, Service};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transcript {
    #[serde(default)]
    pub group_chat: bool,
    pub messages: Vec<Message>,
}

#[derive(Debug)]
pub enum TranscriptError {
    Io(io::Error),
    Parse(serde_json::Error),
    /// Parsed fine but has nothing to show.
    Empty,
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::Io(e) => write!(f, "transcript I/O error: {e}"),
            TranscriptError::Parse(e) => write!(f, "transcript parse error: {e}"),
            TranscriptError::Empty => write!(f, "transcript has no messages"),
        }
    }
}

impl std::error::Error for TranscriptError {}

pub fn parse_transcript(json: &str) -> Result<Transcript, TranscriptError> {
    let transcript: Transcript = serde_json::from_str(json).map_err(TranscriptError::Parse)?;
    if transcript.messages.is_empty() {
        return Err(TranscriptError::Empty);
    }
    Ok(transcript)
}

pub fn load_transcript(path: &Path) -> Result<Transcript, TranscriptError> {
    let json = fs::read_to_string(path).map_err(TranscriptError::Io)?;
    let transcript = parse_transcript(&json)?;
    info!(
        "Loaded {} messages from {}",
        transcript.messages.len(),
        path.display()
    );
    Ok(transcript)
}

/// Built-in group conversation exercising every segment kind and grouping case.
pub fn sample_transcript() -> Transcript {
    let base = DateTime::<Utc>::from_timestamp(1_717_000_000, 0).unwrap_or_default();
    let at = |minutes: i64| base + Duration::minutes(minutes);

    let mut messages = vec![
        Message::text("s1", false, Some("+15550100"), "Anyone up for climbing Saturday?"),
        Message::text("s2", false, Some("+15550100"), "Gym opens at 9"),
        Message::text("s3", false, Some("+15550199"), "I'm in 🧗"),
        Message::text("s4", true, None, "Count me in too"),
        Message::text("s5", true, None, "Here's the route map https://maps.example.com/crag"),
        Message::text("s6", false, Some("+15550100"), "👍"),
        Message::text("s7", false, Some("+15550199"), "\u{FFFC}From last time"),
        Message::text("s8", true, None, "Sent over SMS by mistake"),
        Message::text("s9", false, Some("+15550199"), "\u{FFFC}"),
    ];

    messages[4].detected_link_preview_url = Some("https://maps.example.com/crag".into());
    messages[5].is_reaction = true;
    messages[6].attachments = vec![Attachment::from_mime("att-photo", "image/jpeg")];
    messages[7].service = Service::Sms;
    messages[8].attachments = vec![Attachment {
        transfer_name: Some("Climbing Crew.vcf".into()),
        ..Attachment::from_mime("att-card", "text/vcard")
    }];

    for (i, message) in messages.iter_mut().enumerate() {
        message.date_created = at(i as i64 * 3);
    }

    Transcript {
        group_chat: true,
        messages,
    }
}
