//! Parsing of the chat command surface.

use crate::{dto::message::InboundMessage, state::session::ParticipantId};

/// A recognized command. Anything that does not parse into one is a
/// candidate move string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a game against the mentioned participant, or the bot when no
    /// one is mentioned.
    Start {
        /// The mentioned opponent, if any.
        opponent: Option<ParticipantId>,
    },
    /// Start a random puzzle from the catalog.
    Puzzle,
    /// Fetch and start the daily puzzle.
    DailyPuzzle,
    /// Show rating stats for the mentioned participant, or the sender.
    Stats {
        /// The mentioned participant, if any.
        target: Option<ParticipantId>,
    },
    /// Show the top-rated participants.
    Leaderboard,
    /// Show the sender's current position as FEN.
    ShowFen,
    /// Show the sender's current game as PGN.
    ShowPgn,
    /// List the available commands.
    Help,
}

impl Command {
    /// Parse a message into a command by its case-insensitive first token.
    ///
    /// Returns `None` for anything else, which the dispatcher treats as a
    /// candidate move. A recognized command never reaches the move path, so
    /// command words cannot be misread as moves.
    pub fn parse(message: &InboundMessage) -> Option<Self> {
        let first = message.text.split_whitespace().next()?;
        match first.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start {
                opponent: message.mentions.first().cloned(),
            }),
            "puzzle" => Some(Command::Puzzle),
            "daily-puzzle" => Some(Command::DailyPuzzle),
            "stats" => Some(Command::Stats {
                target: message.mentions.first().cloned(),
            }),
            "leaderboard" => Some(Command::Leaderboard),
            "show-fen" => Some(Command::ShowFen),
            "show-pgn" => Some(Command::ShowPgn),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::message::ChannelId;

    fn message(text: &str, mentions: &[&str]) -> InboundMessage {
        InboundMessage {
            channel: ChannelId::from("general"),
            sender: ParticipantId::from("alice"),
            text: text.into(),
            mentions: mentions.iter().map(|m| ParticipantId::from(*m)).collect(),
        }
    }

    #[test]
    fn first_token_is_case_insensitive() {
        assert_eq!(
            Command::parse(&message("Start", &[])),
            Some(Command::Start { opponent: None })
        );
        assert_eq!(
            Command::parse(&message("LEADERBOARD", &[])),
            Some(Command::Leaderboard)
        );
        assert_eq!(
            Command::parse(&message("daily-PUZZLE", &[])),
            Some(Command::DailyPuzzle)
        );
    }

    #[test]
    fn mentions_select_opponent_and_stats_target() {
        assert_eq!(
            Command::parse(&message("start @bob", &["bob"])),
            Some(Command::Start {
                opponent: Some(ParticipantId::from("bob"))
            })
        );
        assert_eq!(
            Command::parse(&message("stats @carol", &["carol"])),
            Some(Command::Stats {
                target: Some(ParticipantId::from("carol"))
            })
        );
    }

    #[test]
    fn non_commands_fall_through_to_the_move_path() {
        assert_eq!(Command::parse(&message("e4", &[])), None);
        assert_eq!(Command::parse(&message("Qxf7#", &[])), None);
        assert_eq!(Command::parse(&message("gg wp", &[])), None);
        assert_eq!(Command::parse(&message("   ", &[])), None);
    }
}
