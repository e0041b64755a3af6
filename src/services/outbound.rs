//! Render-and-notify plumbing towards the external renderer and transport.

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::warn;

use crate::{
    dto::{
        message::ChannelId,
        reply::{BoardImage, Notification, OutboundMessage},
    },
    state::SharedState,
};

/// Outbound side of the chat transport.
pub trait ChatOutbound: Send + Sync {
    /// Deliver one reply to a channel.
    fn send(
        &self,
        channel: &ChannelId,
        message: OutboundMessage,
    ) -> BoxFuture<'static, Result<(), TransportError>>;
}

/// Board image renderer.
pub trait BoardRenderer: Send + Sync {
    /// Render the position described by `fen` into image bytes.
    fn render(&self, fen: &str) -> BoxFuture<'static, Result<Vec<u8>, RenderError>>;
}

/// Failure delivering a reply.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport rejected or could not deliver the message.
    #[error("transport send failed: {0}")]
    Send(String),
}

/// Failure producing a board image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No renderer is available in this deployment.
    #[error("board rendering unavailable")]
    Unavailable,
    /// The renderer failed on this position.
    #[error("board rendering failed: {0}")]
    Failed(String),
}

/// Issue the single render-and-notify call for one orchestrator outcome.
///
/// Render failures degrade to a text-only reply carrying the FEN; delivery
/// failures are logged and swallowed, since there is no one left to tell.
pub async fn notify(state: &SharedState, channel: &ChannelId, note: Notification) {
    let Notification { mut text, board_fen } = note;

    let attachment = match &board_fen {
        Some(fen) => match state.renderer().render(fen).await {
            Ok(bytes) => Some(BoardImage {
                file_name: "board.png".into(),
                bytes,
            }),
            Err(err) => {
                warn!(error = %err, "board render failed; sending text-only reply");
                None
            }
        },
        None => None,
    };

    if attachment.is_none()
        && let Some(fen) = board_fen
    {
        text = format!("{text}\n`{fen}`");
    }

    if let Err(err) = state
        .outbound()
        .send(channel, OutboundMessage { text, attachment })
        .await
    {
        warn!(channel = %channel, error = %err, "failed to deliver reply");
    }
}
