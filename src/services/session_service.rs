//! Session creation for games and puzzles, plus the current-session
//! introspection commands.

use crate::{
    dto::reply::{Notification, mention},
    error::ServiceError,
    state::{
        SharedState,
        machine::PuzzleProgress,
        puzzles::{PuzzleRecord, PuzzleStart},
        session::{ParticipantId, Session, SessionKind, SharedGame},
    },
};

/// Start a game for `owner`: paired against `opponent` when one is
/// mentioned, against the automated opponent otherwise.
pub async fn start_match(
    state: &SharedState,
    owner: ParticipantId,
    opponent: Option<ParticipantId>,
) -> Result<Notification, ServiceError> {
    match opponent {
        Some(opponent) if opponent == owner => Err(ServiceError::InvalidInput(
            "You cannot start a game against yourself.".into(),
        )),
        Some(opponent) => {
            let game = SharedGame::new(state.engine().new_game());
            let fen = game.position().lock().await.fen();

            state.sessions().create_paired(
                owner.clone(),
                Session {
                    kind: SessionKind::Pvp {
                        opponent: opponent.clone(),
                    },
                    game: game.clone(),
                },
                opponent.clone(),
                Session {
                    kind: SessionKind::Pvp {
                        opponent: owner.clone(),
                    },
                    game,
                },
            )?;

            Ok(Notification::with_board(
                format!("Match on: {} vs {}.", mention(&owner), mention(&opponent)),
                fen,
            ))
        }
        None => {
            let game = SharedGame::new(state.engine().new_game());
            let fen = game.position().lock().await.fen();

            state.sessions().create(
                owner.clone(),
                Session {
                    kind: SessionKind::Bot,
                    game,
                },
            )?;

            Ok(Notification::with_board(
                format!("Match on: {} vs the bot.", mention(&owner)),
                fen,
            ))
        }
    }
}

/// Start a random puzzle from the local catalog.
pub async fn start_catalog_puzzle(
    state: &SharedState,
    owner: ParticipantId,
) -> Result<Notification, ServiceError> {
    ensure_no_session(state, &owner)?;
    let record = state
        .catalog()
        .random()
        .ok_or(ServiceError::EmptyCatalog)?
        .clone();
    start_puzzle(state, owner, record).await
}

/// Fetch the daily puzzle and start it.
pub async fn start_daily_puzzle(
    state: &SharedState,
    owner: ParticipantId,
) -> Result<Notification, ServiceError> {
    // Checked before the fetch so an existing session does not cost a
    // network round trip.
    ensure_no_session(state, &owner)?;
    let source = state.daily().ok_or_else(|| {
        ServiceError::ExternalFetch("no daily puzzle source configured".into())
    })?;
    let record = source
        .fetch_daily()
        .await
        .map_err(|err| ServiceError::ExternalFetch(err.to_string()))?;
    start_puzzle(state, owner, record).await
}

/// Show the sender's current position as FEN.
pub async fn show_fen(
    state: &SharedState,
    owner: &ParticipantId,
) -> Result<Notification, ServiceError> {
    let handle = state
        .sessions()
        .get(owner)
        .ok_or(ServiceError::NoActiveSession)?;
    let session = handle.lock().await;
    let fen = session.game.position().lock().await.fen();
    Ok(Notification::text(format!("`{fen}`")))
}

/// Show the sender's current game as PGN movetext.
pub async fn show_pgn(
    state: &SharedState,
    owner: &ParticipantId,
) -> Result<Notification, ServiceError> {
    let handle = state
        .sessions()
        .get(owner)
        .ok_or(ServiceError::NoActiveSession)?;
    let session = handle.lock().await;
    let pgn = session.game.position().lock().await.pgn();
    Ok(Notification::text(format!("`{pgn}`")))
}

fn ensure_no_session(state: &SharedState, owner: &ParticipantId) -> Result<(), ServiceError> {
    if state.sessions().get(owner).is_some() {
        return Err(ServiceError::SessionExists);
    }
    Ok(())
}

async fn start_puzzle(
    state: &SharedState,
    owner: ParticipantId,
    record: PuzzleRecord,
) -> Result<Notification, ServiceError> {
    let mut position = match &record.start {
        PuzzleStart::Fen(fen) => state.engine().from_fen(fen)?,
        PuzzleStart::Moves(moves) => {
            let mut position = state.engine().new_game();
            for chess_move in moves {
                if position.apply_move(chess_move).is_none() {
                    return Err(ServiceError::InvalidState(format!(
                        "Puzzle {} could not be set up; try another one.",
                        record.id
                    )));
                }
            }
            position
        }
    };

    if let Some(setup) = &record.setup
        && position.apply_move(setup).is_none()
    {
        return Err(ServiceError::InvalidState(format!(
            "Puzzle {} could not be set up; try another one.",
            record.id
        )));
    }

    let fen = position.fen();
    let text = format!(
        "Puzzle {} (rated {}): your move.",
        record.id, record.rating
    );

    let game = SharedGame::new(position);
    state.sessions().create(
        owner,
        Session {
            kind: SessionKind::Puzzle(PuzzleProgress::new(
                record.id,
                record.rating,
                record.solution,
            )),
            game,
        },
    )?;

    Ok(Notification::with_board(text, fen))
}
