//! Drives one submitted move through a session.
//!
//! Lock order is always session, then game, then (for rated terminations)
//! the ledger. The two sides of a pvp pairing meet at the shared game lock,
//! so concurrent submissions cannot interleave on the position.

use rand::seq::IndexedRandom;
use tracing::warn;

use crate::{
    error::ServiceError,
    state::{
        SharedState,
        machine::{
            self, Followup, GameResult, MoveOutcome, PuzzleAdvance, Termination, Winner,
        },
        ratings::PairedOutcome,
        session::{ParticipantId, SessionKind},
    },
};

/// Apply `text` as a move for `mover` and decide what happened.
///
/// A move the engine does not accept returns [`MoveOutcome::Rejected`] with
/// no state change; so does a submission from a participant with no session,
/// since chat messages are frequently not move attempts at all.
pub async fn submit_move(
    state: &SharedState,
    mover: &ParticipantId,
    text: &str,
) -> Result<MoveOutcome, ServiceError> {
    let Some(handle) = state.sessions().get(mover) else {
        return Ok(MoveOutcome::Rejected);
    };
    let mut session = handle.lock().await;
    let game = session.game.clone();
    let mut position = game.position().lock().await;

    let Some(applied) = position.apply_move(text) else {
        return Ok(MoveOutcome::Rejected);
    };
    game.touch();

    match &mut session.kind {
        SessionKind::Puzzle(progress) => {
            let Some(expected) = progress.expected().map(str::to_owned) else {
                // An exhausted solution means the session should already be
                // gone; close it as solved rather than leave it dangling.
                let puzzle_id = progress.id.clone();
                state.sessions().remove(mover);
                return Ok(MoveOutcome::PuzzleSolved { puzzle_id });
            };

            if !machine::notation_matches(&applied, &expected) {
                position.undo();
                return Ok(MoveOutcome::PuzzleIncorrect);
            }

            match progress.advance() {
                PuzzleAdvance::Solved => {
                    let puzzle_id = progress.id.clone();
                    state.sessions().remove(mover);
                    Ok(MoveOutcome::PuzzleSolved { puzzle_id })
                }
                PuzzleAdvance::ScriptedReply(reply) => {
                    if position.apply_move(&reply).is_none() {
                        let puzzle_id = progress.id.clone();
                        warn!(
                            puzzle = %puzzle_id,
                            reply = %reply,
                            "scripted reply rejected by the engine; closing session"
                        );
                        state.sessions().remove(mover);
                        return Err(ServiceError::InvalidState(format!(
                            "Puzzle {puzzle_id} is corrupt; closing it."
                        )));
                    }
                    game.touch();
                    Ok(MoveOutcome::Applied {
                        fen: position.fen(),
                        followup: Followup::PuzzleAdvanced,
                    })
                }
            }
        }

        SessionKind::Bot => {
            if position.is_terminal() {
                let termination = Termination {
                    fen: position.fen(),
                    result: decisive_or_draw(position.is_draw(), Winner::Participant(mover.clone())),
                };
                state.sessions().remove(mover);
                return Ok(MoveOutcome::Terminated(termination));
            }

            // Uniform-random reply; opponent strength is out of scope.
            let legal = position.legal_moves();
            let Some(choice) = legal.choose(&mut rand::rng()).cloned() else {
                state.sessions().remove(mover);
                return Err(ServiceError::InvalidState(
                    "The game reached an unplayable position; closing it.".into(),
                ));
            };
            let Some(reply) = position.apply_move(&choice) else {
                state.sessions().remove(mover);
                return Err(ServiceError::InvalidState(
                    "The game reached an unplayable position; closing it.".into(),
                ));
            };
            game.touch();

            if position.is_terminal() {
                // Automated-opponent games never touch the ledger.
                let termination = Termination {
                    fen: position.fen(),
                    result: decisive_or_draw(position.is_draw(), Winner::Bot),
                };
                state.sessions().remove(mover);
                return Ok(MoveOutcome::Terminated(termination));
            }

            Ok(MoveOutcome::Applied {
                fen: position.fen(),
                followup: Followup::BotReplied { san: reply.san },
            })
        }

        SessionKind::Pvp { opponent } => {
            let opponent = opponent.clone();
            if position.is_terminal() {
                let draw = position.is_draw();
                let outcome = if draw {
                    PairedOutcome::Draw
                } else {
                    PairedOutcome::FirstWins
                };
                state.ratings().apply_result(mover, &opponent, outcome).await;
                state.sessions().remove_pair(mover, &opponent);

                let termination = Termination {
                    fen: position.fen(),
                    result: decisive_or_draw(draw, Winner::Participant(mover.clone())),
                };
                return Ok(MoveOutcome::Terminated(termination));
            }

            Ok(MoveOutcome::Applied {
                fen: position.fen(),
                followup: Followup::TurnHandoff { opponent },
            })
        }
    }
}

fn decisive_or_draw(draw: bool, winner: Winner) -> GameResult {
    if draw {
        GameResult::Draw
    } else {
        GameResult::Winner(winner)
    }
}
