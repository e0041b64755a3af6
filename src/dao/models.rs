//! Serde entities for the persisted rating snapshot, with conversions to and
//! from the runtime types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::state::{
    ratings::{OutcomeSymbol, RatingRecord},
    session::ParticipantId,
};

/// Persisted form of one participant's rating record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRecordEntity {
    /// Current Elo rating.
    pub rating: f64,
    /// Decisive games won.
    pub wins: u32,
    /// Decisive games lost.
    pub losses: u32,
    /// Outcome symbols, oldest first.
    pub history: Vec<String>,
}

/// Whole-state snapshot of the rating ledger, written after every
/// transaction and read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingsSnapshotEntity {
    /// When the snapshot was taken, RFC 3339.
    pub saved_at: String,
    /// Every participant record the ledger holds.
    pub records: IndexMap<ParticipantId, RatingRecordEntity>,
}

impl RatingsSnapshotEntity {
    /// Capture the current ledger contents, stamped with the current time.
    pub fn capture(records: &IndexMap<ParticipantId, RatingRecord>) -> Self {
        Self {
            saved_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_else(|_| "invalid-timestamp".into()),
            records: records
                .iter()
                .map(|(id, record)| (id.clone(), record.into()))
                .collect(),
        }
    }

    /// Convert the snapshot back into runtime records.
    pub fn into_records(self) -> IndexMap<ParticipantId, RatingRecord> {
        self.records
            .into_iter()
            .map(|(id, entity)| (id, entity.into()))
            .collect()
    }
}

impl From<&RatingRecord> for RatingRecordEntity {
    fn from(value: &RatingRecord) -> Self {
        Self {
            rating: value.rating,
            wins: value.wins,
            losses: value.losses,
            history: value
                .history
                .iter()
                .map(|outcome| outcome.as_str().to_string())
                .collect(),
        }
    }
}

impl From<RatingRecordEntity> for RatingRecord {
    fn from(value: RatingRecordEntity) -> Self {
        Self {
            rating: value.rating,
            wins: value.wins,
            losses: value.losses,
            // Unknown symbols in a hand-edited snapshot are dropped.
            history: value
                .history
                .iter()
                .filter_map(|symbol| OutcomeSymbol::from_symbol(symbol))
                .collect(),
        }
    }
}
