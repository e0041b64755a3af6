//! Error taxonomy for the session orchestration core.

use thiserror::Error;

use crate::{dao::storage::StorageError, engine::EngineError};

/// Errors that can occur in service layer operations.
///
/// Nothing here is fatal to the process: every variant is recovered at the
/// dispatch boundary and converted to either a silent no-op or a short
/// user-facing reply via [`ServiceError::user_reply`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The participant already has an active session.
    #[error("participant already has an active session")]
    SessionExists,
    /// The participant has no active session.
    #[error("no active session")]
    NoActiveSession,
    /// Invalid input provided by the participant.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed against the current session state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The puzzle catalog holds no puzzles.
    #[error("puzzle catalog is empty")]
    EmptyCatalog,
    /// A remote puzzle fetch failed.
    #[error("external fetch failed: {0}")]
    ExternalFetch(String),
    /// The rules engine rejected a position or setup it was handed.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Storage backend failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// Convert the error into the reply shown to the participant, if any.
    ///
    /// `NoActiveSession` is surfaced here because this path is only reached
    /// by explicit commands (`show-fen`, `show-pgn`); move-like text without
    /// a session never produces an error in the first place.
    pub fn user_reply(&self) -> Option<String> {
        match self {
            ServiceError::SessionExists => {
                Some("You already have a game in progress. Finish it first.".into())
            }
            ServiceError::NoActiveSession => Some("You have no active game.".into()),
            ServiceError::InvalidInput(message) => Some(message.clone()),
            ServiceError::InvalidState(message) => Some(message.clone()),
            ServiceError::EmptyCatalog => Some("No puzzles are loaded right now.".into()),
            ServiceError::ExternalFetch(_) => {
                Some("Could not fetch the daily puzzle. Try again later.".into())
            }
            ServiceError::Engine(_) | ServiceError::Storage(_) => {
                Some("Something went wrong on our side.".into())
            }
        }
    }
}
