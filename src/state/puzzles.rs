//! In-memory puzzle catalog, read-only once loaded.

use rand::seq::IndexedRandom;

/// How a puzzle's starting position is described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleStart {
    /// A FEN string (CSV corpus rows).
    Fen(String),
    /// Moves to replay from the standard start (daily-puzzle payloads, which
    /// carry a truncated game instead of a FEN).
    Moves(Vec<String>),
}

/// One scripted tactical puzzle.
///
/// Records are normalized at load time: `solution[0]` is the player's first
/// expected move, and the opponent move that sets the puzzle up (when the
/// corpus encodes one) is in `setup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleRecord {
    /// Unique identifier within the corpus.
    pub id: String,
    /// Difficulty rating.
    pub rating: u32,
    /// Starting position description.
    pub start: PuzzleStart,
    /// Scripted pre-move applied before the player sees the board.
    pub setup: Option<String>,
    /// Expected moves, alternating player and scripted reply, ending on a
    /// player move.
    pub solution: Vec<String>,
}

/// Ordered collection of puzzle records.
#[derive(Debug, Clone, Default)]
pub struct PuzzleCatalog {
    puzzles: Vec<PuzzleRecord>,
}

impl PuzzleCatalog {
    /// Catalog over an already-loaded set of records.
    pub fn new(puzzles: Vec<PuzzleRecord>) -> Self {
        Self { puzzles }
    }

    /// Catalog with no puzzles; the `puzzle` command reports it as empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of loaded puzzles.
    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    /// Whether any puzzles are loaded.
    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    /// Uniform-random puzzle pick.
    pub fn random(&self) -> Option<&PuzzleRecord> {
        self.puzzles.choose(&mut rand::rng())
    }
}
