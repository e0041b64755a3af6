//! Move-handling outcomes and puzzle-step progression.
//!
//! The decision logic that needs the engine, the registry and the ledger
//! lives in `services::move_service`; this module holds the outcome types it
//! produces and the pure parts of the puzzle state machine so they can be
//! tested without any collaborator.

use crate::{engine::AppliedMove, state::session::ParticipantId};

/// Result of driving one submitted move through a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Move malformed or illegal; nothing changed and nothing is notified.
    Rejected,
    /// Move accepted and the session continues.
    Applied {
        /// Position after the move (and any automated reply) for rendering.
        fen: String,
        /// What happened beyond the submitted move itself.
        followup: Followup,
    },
    /// The game ended; the session (or pairing) has been removed.
    Terminated(Termination),
    /// Puzzle attempt did not match the solution; position restored, the
    /// session stays open with its step unchanged.
    PuzzleIncorrect,
    /// Final solution step matched; the session has been removed.
    PuzzleSolved {
        /// Identifier of the solved puzzle.
        puzzle_id: String,
    },
}

/// What accompanied an accepted, non-terminal move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followup {
    /// The automated opponent answered with `san`.
    BotReplied {
        /// SAN of the automated reply.
        san: String,
    },
    /// It is now the paired opponent's turn.
    TurnHandoff {
        /// The participant to notify.
        opponent: ParticipantId,
    },
    /// A correct puzzle step, answered by the scripted reply.
    PuzzleAdvanced,
}

/// Terminal result of a bot or pvp game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    /// Final position, for the analysis link.
    pub fen: String,
    /// Who won, if anyone.
    pub result: GameResult,
}

/// Decisive-or-draw outcome of a finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameResult {
    /// Terminal draw (stalemate, insufficient material, ...).
    Draw,
    /// Decisive result.
    Winner(Winner),
}

/// The winning side of a decisive result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Winner {
    /// A chat participant delivered the final move.
    Participant(ParticipantId),
    /// The automated opponent's reply ended the game.
    Bot,
}

/// Progress through one puzzle's scripted solution.
///
/// `solution[0]` is always the player's first expected move (corpus rows are
/// normalized at load time); entries alternate player move, scripted reply,
/// ending on a player move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleProgress {
    /// Identifier of the puzzle being solved.
    pub id: String,
    /// Difficulty rating of the puzzle.
    pub rating: u32,
    solution: Vec<String>,
    step: usize,
}

/// What follows a correct player move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleAdvance {
    /// That was the final step; the puzzle is solved.
    Solved,
    /// The scripted opponent reply to apply before handing the turn back.
    ScriptedReply(String),
}

impl PuzzleProgress {
    /// Start at the first expected move of `solution`.
    pub fn new(id: impl Into<String>, rating: u32, solution: Vec<String>) -> Self {
        Self {
            id: id.into(),
            rating,
            solution,
            step: 0,
        }
    }

    /// The move expected from the player next, if any remain.
    pub fn expected(&self) -> Option<&str> {
        self.solution.get(self.step).map(String::as_str)
    }

    /// Index of the next expected move. Unchanged by failed attempts.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Advance past a correct player move.
    ///
    /// Steps advance in pairs (player move, then scripted reply) except on
    /// the final step, where no scripted reply follows.
    pub fn advance(&mut self) -> PuzzleAdvance {
        self.step += 1;
        if self.step >= self.solution.len() {
            return PuzzleAdvance::Solved;
        }
        let reply = self.solution[self.step].clone();
        self.step += 1;
        PuzzleAdvance::ScriptedReply(reply)
    }
}

/// Whether an accepted move matches an expected solution entry.
///
/// Corpora come in either notation, so the SAN (check/mate suffix ignored)
/// and the UCI text are both acceptable canonical forms.
pub fn notation_matches(applied: &AppliedMove, expected: &str) -> bool {
    let expected = expected.trim();
    applied.uci == expected
        || applied.san == expected
        || applied.san.trim_end_matches(['+', '#']) == expected.trim_end_matches(['+', '#'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_advance_in_pairs_until_the_final_step() {
        let mut progress = PuzzleProgress::new(
            "P1",
            1800,
            vec!["d7d5".into(), "c2c4".into(), "e7e5".into()],
        );

        assert_eq!(progress.expected(), Some("d7d5"));
        assert_eq!(
            progress.advance(),
            PuzzleAdvance::ScriptedReply("c2c4".into())
        );
        assert_eq!(progress.step(), 2);

        assert_eq!(progress.expected(), Some("e7e5"));
        assert_eq!(progress.advance(), PuzzleAdvance::Solved);
        assert_eq!(progress.expected(), None);
    }

    #[test]
    fn no_scripted_reply_follows_the_final_step() {
        let mut progress = PuzzleProgress::new("P2", 1200, vec!["h5f7".into()]);
        assert_eq!(progress.advance(), PuzzleAdvance::Solved);
    }

    #[test]
    fn matches_either_notation() {
        let applied = AppliedMove {
            san: "Qxf7#".into(),
            uci: "h5f7".into(),
        };

        assert!(notation_matches(&applied, "h5f7"));
        assert!(notation_matches(&applied, "Qxf7#"));
        assert!(notation_matches(&applied, "Qxf7"));
        assert!(!notation_matches(&applied, "Qxf3"));
        assert!(!notation_matches(&applied, "h5f6"));
    }
}
