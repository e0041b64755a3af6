//! Daily puzzle fetched from the lichess API.

use futures::{FutureExt, future::BoxFuture};
use serde::Deserialize;

use crate::{
    dao::puzzles::{DailyPuzzleSource, FetchError},
    state::puzzles::{PuzzleRecord, PuzzleStart},
};

/// Endpoint serving the daily puzzle.
pub const DAILY_PUZZLE_URL: &str = "https://lichess.org/api/puzzle/daily";

/// [`DailyPuzzleSource`] backed by the public lichess API.
#[derive(Debug, Clone)]
pub struct LichessDailySource {
    client: reqwest::Client,
    url: String,
}

impl LichessDailySource {
    /// Source pointing at the public lichess endpoint.
    pub fn new() -> Self {
        Self::with_url(DAILY_PUZZLE_URL)
    }

    /// Source pointing at an alternative endpoint.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Default for LichessDailySource {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload shape of the daily-puzzle endpoint. The game comes as a movetext
/// truncated at the puzzle position instead of a FEN, and the solution is
/// UCI with the player to move first.
#[derive(Debug, Deserialize)]
struct DailyResponse {
    game: DailyGame,
    puzzle: DailyPuzzle,
}

#[derive(Debug, Deserialize)]
struct DailyGame {
    pgn: String,
}

#[derive(Debug, Deserialize)]
struct DailyPuzzle {
    id: String,
    rating: u32,
    solution: Vec<String>,
}

impl DailyPuzzleSource for LichessDailySource {
    fn fetch_daily(&self) -> BoxFuture<'static, Result<PuzzleRecord, FetchError>> {
        let client = self.client.clone();
        let url = self.url.clone();
        async move {
            let response = client
                .get(&url)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|err| FetchError::Request(err.to_string()))?;
            let payload: DailyResponse = response
                .json()
                .await
                .map_err(|err| FetchError::Malformed(err.to_string()))?;

            if payload.puzzle.solution.is_empty() || payload.puzzle.solution.len() % 2 == 0 {
                return Err(FetchError::Malformed(format!(
                    "puzzle {} has a solution that does not end on a player move",
                    payload.puzzle.id
                )));
            }

            Ok(PuzzleRecord {
                id: payload.puzzle.id,
                rating: payload.puzzle.rating,
                start: PuzzleStart::Moves(
                    payload
                        .game
                        .pgn
                        .split_whitespace()
                        .map(String::from)
                        .collect(),
                ),
                setup: None,
                solution: payload.puzzle.solution,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_maps_into_the_catalog_record_shape() {
        let json = r#"{
            "game": {"id": "abc", "pgn": "e4 e5 Nf3 Nc6 Bc4"},
            "puzzle": {"id": "daily1", "rating": 2032, "solution": ["f8c5", "c2c3", "d7d6"], "plays": 1}
        }"#;
        let payload: DailyResponse = serde_json::from_str(json).unwrap();

        assert_eq!(payload.puzzle.id, "daily1");
        assert_eq!(payload.puzzle.rating, 2032);
        assert_eq!(payload.puzzle.solution.len(), 3);
        assert_eq!(payload.game.pgn.split_whitespace().count(), 5);
    }
}
