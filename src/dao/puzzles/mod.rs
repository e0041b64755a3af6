//! Puzzle corpus ingestion and the remote daily-puzzle source.

pub mod file;
#[cfg(feature = "daily-puzzle")]
pub mod lichess;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::state::puzzles::PuzzleRecord;

/// Remote source for the daily puzzle, mapped into the same record shape as
/// the local corpus.
pub trait DailyPuzzleSource: Send + Sync {
    /// Fetch today's puzzle.
    fn fetch_daily(&self) -> BoxFuture<'static, Result<PuzzleRecord, FetchError>>;
}

/// Failure fetching or decoding a remote puzzle.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request itself failed (network, status).
    #[error("daily puzzle request failed: {0}")]
    Request(String),
    /// The payload did not decode into a usable puzzle.
    #[error("daily puzzle payload malformed: {0}")]
    Malformed(String),
}
