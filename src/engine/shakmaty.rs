//! Rules engine adapter backed by shakmaty.

use shakmaty::{
    CastlingMode, Chess, EnPassantMode, Outcome, Position,
    fen::Fen,
    san::SanPlus,
    uci::UciMove,
};

use crate::engine::{AppliedMove, EngineError, GamePosition, RulesEngine};

/// Adapter handing out shakmaty-validated positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyRules;

impl RulesEngine for ShakmatyRules {
    fn new_game(&self) -> Box<dyn GamePosition> {
        Box::new(ShakmatyPosition::new(Chess::default()))
    }

    fn from_fen(&self, fen: &str) -> Result<Box<dyn GamePosition>, EngineError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|err| EngineError::InvalidPosition(format!("bad FEN `{fen}`: {err}")))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|err| EngineError::InvalidPosition(format!("bad FEN `{fen}`: {err}")))?;
        Ok(Box::new(ShakmatyPosition::new(position)))
    }
}

/// One mutable position plus the history needed for undo and PGN export.
#[derive(Debug, Clone)]
pub struct ShakmatyPosition {
    current: Chess,
    /// Position before each applied move, paired with that move's SAN.
    history: Vec<(Chess, String)>,
}

impl ShakmatyPosition {
    fn new(position: Chess) -> Self {
        Self {
            current: position,
            history: Vec::new(),
        }
    }

    /// Resolve SAN first, then UCI, against the current position.
    ///
    /// Both resolvers only ever yield moves that are legal in the current
    /// position, so the caller can play the result unchecked.
    fn resolve(&self, text: &str) -> Option<shakmaty::Move> {
        if let Ok(san) = text.parse::<SanPlus>()
            && let Ok(resolved) = san.san.to_move(&self.current)
        {
            return Some(resolved);
        }
        if let Ok(uci) = text.parse::<UciMove>()
            && let Ok(resolved) = uci.to_move(&self.current)
        {
            return Some(resolved);
        }
        None
    }
}

impl GamePosition for ShakmatyPosition {
    fn apply_move(&mut self, text: &str) -> Option<AppliedMove> {
        let resolved = self.resolve(text.trim())?;
        let uci = UciMove::from_move(&resolved, CastlingMode::Standard).to_string();

        let previous = self.current.clone();
        let san = SanPlus::from_move_and_play_unchecked(&mut self.current, &resolved).to_string();
        self.history.push((previous, san.clone()));

        Some(AppliedMove { san, uci })
    }

    fn undo(&mut self) {
        if let Some((previous, _)) = self.history.pop() {
            self.current = previous;
        }
    }

    fn is_terminal(&self) -> bool {
        self.current.outcome().is_some()
    }

    fn is_draw(&self) -> bool {
        matches!(self.current.outcome(), Some(Outcome::Draw))
    }

    fn legal_moves(&self) -> Vec<String> {
        self.current
            .legal_moves()
            .into_iter()
            .map(|chess_move| UciMove::from_move(&chess_move, CastlingMode::Standard).to_string())
            .collect()
    }

    fn fen(&self) -> String {
        Fen::from_position(self.current.clone(), EnPassantMode::Legal).to_string()
    }

    fn pgn(&self) -> String {
        let mut movetext = Vec::with_capacity(self.history.len() + 1);
        for (index, (_, san)) in self.history.iter().enumerate() {
            if index % 2 == 0 {
                movetext.push(format!("{}.", index / 2 + 1));
            }
            movetext.push(san.clone());
        }
        let result = self
            .current
            .outcome()
            .map(|outcome| outcome.as_str())
            .unwrap_or("*");
        movetext.push(result.to_string());
        movetext.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn starting_position_has_twenty_legal_moves() {
        let position = ShakmatyRules.new_game();
        assert_eq!(position.legal_moves().len(), 20);
        assert_eq!(position.fen(), START_FEN);
    }

    #[test]
    fn accepts_san_and_uci_for_the_same_move() {
        let mut via_san = ShakmatyRules.new_game();
        let mut via_uci = ShakmatyRules.new_game();

        let san = via_san.apply_move("e4").expect("SAN accepted");
        let uci = via_uci.apply_move("e2e4").expect("UCI accepted");

        assert_eq!(san, uci);
        assert_eq!(san.uci, "e2e4");
        assert_eq!(san.san, "e4");
        assert_eq!(via_san.fen(), via_uci.fen());
    }

    #[test]
    fn rejects_illegal_and_malformed_moves_without_mutation() {
        let mut position = ShakmatyRules.new_game();
        let before = position.fen();

        assert!(position.apply_move("e5").is_none());
        assert!(position.apply_move("hello there").is_none());
        assert!(position.apply_move("e2e5").is_none());
        assert_eq!(position.fen(), before);
    }

    #[test]
    fn undo_restores_the_previous_position() {
        let mut position = ShakmatyRules.new_game();
        let before = position.fen();

        position.apply_move("e4").expect("accepted");
        assert_ne!(position.fen(), before);

        position.undo();
        assert_eq!(position.fen(), before);
    }

    #[test]
    fn scholars_mate_is_terminal_and_decisive() {
        let mut position = ShakmatyRules.new_game();
        for chess_move in ["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6"] {
            position.apply_move(chess_move).expect("legal prefix");
            assert!(!position.is_terminal());
        }

        let mate = position.apply_move("Qxf7#").expect("mate is legal");
        assert_eq!(mate.san, "Qxf7#");
        assert!(position.is_terminal());
        assert!(!position.is_draw());
        assert!(position.pgn().ends_with("1-0"));
    }

    #[test]
    fn from_fen_round_trips_and_rejects_garbage() {
        let fen = "8/8/8/8/8/5k2/7q/7K w - - 0 1";
        let position = ShakmatyRules.from_fen(fen).expect("valid FEN");
        assert_eq!(position.fen(), fen);

        assert!(ShakmatyRules.from_fen("not a fen").is_err());
    }
}
