//! Inbound chat events as the transport delivers them.

use std::fmt;

use crate::state::session::ParticipantId;

/// Opaque identifier of the chat channel a message arrived on; replies go
/// back to the same channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    /// Wrap a transport-provided channel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw channel identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One inbound text message with its sender and any mentioned participants.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Channel the message arrived on.
    pub channel: ChannelId,
    /// Identity of the sender.
    pub sender: ParticipantId,
    /// Raw message text.
    pub text: String,
    /// Participants mentioned in the message, in order of appearance.
    pub mentions: Vec<ParticipantId>,
}
