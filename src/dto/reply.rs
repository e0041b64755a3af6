//! Outbound reply shapes handed to the renderer and transport.

use crate::state::{ratings::RatingRecord, session::ParticipantId};

/// A render-and-notify instruction produced by the orchestrator.
///
/// When `board_fen` is set the renderer is asked for an image of that
/// position; on render failure the FEN is appended to the text instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Reply text, possibly containing `<@id>` mention tokens.
    pub text: String,
    /// Position to render alongside the text, if any.
    pub board_fen: Option<String>,
}

impl Notification {
    /// Text-only notification.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            board_fen: None,
        }
    }

    /// Notification with a board render of `fen`.
    pub fn with_board(text: impl Into<String>, fen: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            board_fen: Some(fen.into()),
        }
    }
}

/// Fully assembled message handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Reply text.
    pub text: String,
    /// Rendered board image, when one was produced.
    pub attachment: Option<BoardImage>,
}

/// Rendered board image bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardImage {
    /// Attachment file name.
    pub file_name: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

/// Mention token for a participant, interpreted by the transport.
pub fn mention(id: &ParticipantId) -> String {
    format!("<@{id}>")
}

/// How many history symbols the stats line shows.
const STATS_HISTORY_SHOWN: usize = 5;

/// One-line stats rendering for a participant's record.
pub fn stats_line(id: &ParticipantId, record: &RatingRecord) -> String {
    let history = if record.history.is_empty() {
        "none".to_string()
    } else {
        record
            .history
            .iter()
            .rev()
            .take(STATS_HISTORY_SHOWN)
            .rev()
            .map(|outcome| outcome.as_str())
            .collect::<Vec<_>>()
            .join(",")
    };
    format!(
        "{}: Elo **{}** | {}W-{}L | History: {}",
        mention(id),
        record.rating.round() as i64,
        record.wins,
        record.losses,
        history
    )
}
