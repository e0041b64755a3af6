//! Read-only projections of the rating ledger.

use crate::{
    dto::reply::{Notification, mention, stats_line},
    error::ServiceError,
    state::{SharedState, session::ParticipantId},
};

/// How many rows the leaderboard shows.
const LEADERBOARD_SIZE: usize = 10;

/// Rating stats for one participant. Unseen participants read as the
/// defaults; asking never creates a record.
pub async fn stats(
    state: &SharedState,
    target: ParticipantId,
) -> Result<Notification, ServiceError> {
    let record = state.ratings().record(&target).await;
    Ok(Notification::text(stats_line(&target, &record)))
}

/// Top-rated participants, highest first.
pub async fn leaderboard(state: &SharedState) -> Result<Notification, ServiceError> {
    let rows = state.ratings().leaderboard(LEADERBOARD_SIZE).await;
    if rows.is_empty() {
        return Ok(Notification::text("No rated games have been played yet."));
    }

    let lines: Vec<String> = rows
        .iter()
        .enumerate()
        .map(|(index, (id, record))| {
            format!(
                "{}. {}: {} ({}W-{}L)",
                index + 1,
                mention(id),
                record.rating.round() as i64,
                record.wins,
                record.losses
            )
        })
        .collect();
    Ok(Notification::text(lines.join("\n")))
}
