//! Rules engine adapter seam.
//!
//! The orchestration core never implements chess rules. It consumes them
//! through [`RulesEngine`] and [`GamePosition`], which cover move
//! application, legality, termination, draw detection and notation export.
//! A shakmaty-backed implementation ships behind the `shakmaty-rules`
//! feature; the core and its tests only rely on the traits.

#[cfg(feature = "shakmaty-rules")]
pub mod shakmaty;

use thiserror::Error;

/// Factory for fresh game positions.
pub trait RulesEngine: Send + Sync {
    /// Create a position at the standard starting setup.
    fn new_game(&self) -> Box<dyn GamePosition>;

    /// Create a position from a FEN string.
    fn from_fen(&self, fen: &str) -> Result<Box<dyn GamePosition>, EngineError>;
}

/// One mutable game position, owned by a session (or shared by a pvp pair).
///
/// Move submission is the only mutation path. A move the engine does not
/// accept returns `None` from [`GamePosition::apply_move`]; "not a move" and
/// "illegal move" are the same expected control-flow branch, never a fault.
pub trait GamePosition: Send {
    /// Apply a move given in SAN or UCI/long-algebraic text.
    ///
    /// Returns the canonical notations of the accepted move, or `None` when
    /// the text is malformed or the move is illegal (no state change).
    fn apply_move(&mut self, text: &str) -> Option<AppliedMove>;

    /// Take back the most recently applied move, if any.
    fn undo(&mut self);

    /// Whether the game has ended (checkmate or any terminal draw).
    fn is_terminal(&self) -> bool;

    /// Whether a terminal position is a draw rather than a decisive result.
    fn is_draw(&self) -> bool;

    /// Legal moves from the current position, in UCI text.
    fn legal_moves(&self) -> Vec<String>;

    /// Current position as a FEN string.
    fn fen(&self) -> String;

    /// Moves played so far as PGN movetext.
    fn pgn(&self) -> String;
}

/// Canonical notations of a move the engine accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// Standard algebraic notation, including any check/mate suffix.
    pub san: String,
    /// UCI / long-algebraic notation.
    pub uci: String,
}

/// Error raised when the engine cannot build a requested position.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The provided FEN or move sequence does not describe a legal position.
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

#[cfg(test)]
pub mod testing {
    //! Scripted engine double used by unit tests across the crate.

    use super::{AppliedMove, EngineError, GamePosition, RulesEngine};

    /// A position that accepts every move except an explicit reject list and
    /// becomes terminal after a scripted number of applied moves.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedPosition {
        base_fen: String,
        applied: Vec<AppliedMove>,
        rejects: Vec<String>,
        terminal_after: Option<usize>,
        draw: bool,
        legal: Vec<String>,
    }

    impl ScriptedPosition {
        pub fn new() -> Self {
            Self {
                base_fen: "scripted".into(),
                legal: vec!["a2a3".into()],
                ..Self::default()
            }
        }

        pub fn rejecting(mut self, moves: &[&str]) -> Self {
            self.rejects = moves.iter().map(|m| (*m).into()).collect();
            self
        }

        pub fn terminal_after(mut self, applied_moves: usize) -> Self {
            self.terminal_after = Some(applied_moves);
            self
        }

        pub fn drawn(mut self) -> Self {
            self.draw = true;
            self
        }

        pub fn with_legal(mut self, moves: &[&str]) -> Self {
            self.legal = moves.iter().map(|m| (*m).into()).collect();
            self
        }
    }

    impl GamePosition for ScriptedPosition {
        fn apply_move(&mut self, text: &str) -> Option<AppliedMove> {
            if self.rejects.iter().any(|r| r == text) {
                return None;
            }
            let applied = AppliedMove {
                san: text.into(),
                uci: text.into(),
            };
            self.applied.push(applied.clone());
            Some(applied)
        }

        fn undo(&mut self) {
            self.applied.pop();
        }

        fn is_terminal(&self) -> bool {
            self.terminal_after
                .is_some_and(|limit| self.applied.len() >= limit)
        }

        fn is_draw(&self) -> bool {
            self.draw
        }

        fn legal_moves(&self) -> Vec<String> {
            self.legal.clone()
        }

        fn fen(&self) -> String {
            format!("{}#{}", self.base_fen, self.applied.len())
        }

        fn pgn(&self) -> String {
            self.applied
                .iter()
                .map(|m| m.san.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        }
    }

    /// Engine handing out clones of one scripted position template.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedEngine {
        pub template: ScriptedPosition,
    }

    impl ScriptedEngine {
        pub fn new(template: ScriptedPosition) -> Self {
            Self { template }
        }
    }

    impl RulesEngine for ScriptedEngine {
        fn new_game(&self) -> Box<dyn GamePosition> {
            Box::new(self.template.clone())
        }

        fn from_fen(&self, fen: &str) -> Result<Box<dyn GamePosition>, EngineError> {
            let mut position = self.template.clone();
            position.base_fen = fen.into();
            Ok(Box::new(position))
        }
    }
}
