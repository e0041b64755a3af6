//! Orchestrator: parses inbound chat events and drives the session core.
//!
//! Recognized commands are filtered out first, so a command word can never
//! reach the state machine as a move. Every `Applied`, `Terminated`,
//! `PuzzleSolved` and `PuzzleIncorrect` outcome issues exactly one
//! render-and-notify call; `Rejected` issues none.

use tracing::{debug, trace};

use crate::{
    dto::{
        command::Command,
        message::InboundMessage,
        reply::{Notification, mention},
    },
    error::ServiceError,
    services::{move_service, outbound, rating_service, session_service},
    state::{
        SharedState,
        machine::{Followup, GameResult, MoveOutcome, Termination, Winner},
    },
};

const HELP_TEXT: &str = "Commands: `start @opponent` (omit the mention to play the bot), \
`puzzle`, `daily-puzzle`, `stats @user`, `leaderboard`, `show-fen`, `show-pgn`, `help`. \
Anything else is treated as a move while you have a game.";

/// Handle one inbound chat event end to end.
pub async fn handle_message(state: &SharedState, message: InboundMessage) {
    if let Some(command) = Command::parse(&message) {
        let result = dispatch_command(state, &message, command).await;
        match result {
            Ok(note) => outbound::notify(state, &message.channel, note).await,
            Err(err) => {
                debug!(sender = %message.sender, error = %err, "command failed");
                if let Some(text) = err.user_reply() {
                    outbound::notify(state, &message.channel, Notification::text(text)).await;
                }
            }
        }
        return;
    }

    // Candidate move. Chat noise from participants without a session is
    // expected and never surfaced.
    if state.sessions().get(&message.sender).is_none() {
        trace!(sender = %message.sender, "ignoring move-like text without a session");
        return;
    }

    match move_service::submit_move(state, &message.sender, message.text.trim()).await {
        Ok(outcome) => {
            if let Some(note) = notification_for(outcome) {
                outbound::notify(state, &message.channel, note).await;
            }
        }
        Err(err) => {
            debug!(sender = %message.sender, error = %err, "move handling failed");
            if let Some(text) = err.user_reply() {
                outbound::notify(state, &message.channel, Notification::text(text)).await;
            }
        }
    }
}

async fn dispatch_command(
    state: &SharedState,
    message: &InboundMessage,
    command: Command,
) -> Result<Notification, ServiceError> {
    match command {
        Command::Start { opponent } => {
            session_service::start_match(state, message.sender.clone(), opponent).await
        }
        Command::Puzzle => session_service::start_catalog_puzzle(state, message.sender.clone()).await,
        Command::DailyPuzzle => {
            session_service::start_daily_puzzle(state, message.sender.clone()).await
        }
        Command::Stats { target } => {
            let target = target.unwrap_or_else(|| message.sender.clone());
            rating_service::stats(state, target).await
        }
        Command::Leaderboard => rating_service::leaderboard(state).await,
        Command::ShowFen => session_service::show_fen(state, &message.sender).await,
        Command::ShowPgn => session_service::show_pgn(state, &message.sender).await,
        Command::Help => Ok(Notification::text(HELP_TEXT)),
    }
}

/// The single reply owed for a state-machine outcome, if any.
fn notification_for(outcome: MoveOutcome) -> Option<Notification> {
    match outcome {
        MoveOutcome::Rejected => None,
        MoveOutcome::Applied { fen, followup } => Some(match followup {
            Followup::BotReplied { san } => {
                Notification::with_board(format!("Bot played {san}."), fen)
            }
            Followup::TurnHandoff { opponent } => {
                Notification::with_board(format!("{}'s turn.", mention(&opponent)), fen)
            }
            Followup::PuzzleAdvanced => Notification::with_board("Correct!", fen),
        }),
        MoveOutcome::Terminated(termination) => {
            Some(Notification::text(termination_text(&termination)))
        }
        MoveOutcome::PuzzleIncorrect => Some(Notification::text("Incorrect, try again.")),
        MoveOutcome::PuzzleSolved { .. } => Some(Notification::text("Solved! Nice work.")),
    }
}

fn termination_text(termination: &Termination) -> String {
    let headline = match &termination.result {
        GameResult::Draw => "Game over: draw.".to_string(),
        GameResult::Winner(Winner::Participant(winner)) => {
            format!("Game over: {} wins!", mention(winner))
        }
        GameResult::Winner(Winner::Bot) => "Game over: the bot wins!".to_string(),
    };
    format!(
        "{headline} Analysis: https://lichess.org/analysis/{}",
        termination.fen.replace(' ', "_")
    )
}
