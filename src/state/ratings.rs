//! Rating ledger with atomic paired Elo updates.

use std::{collections::VecDeque, sync::Arc};

use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::warn;

use crate::{
    dao::{models::RatingsSnapshotEntity, rating_store::RatingStore},
    state::session::ParticipantId,
};

/// Rating assigned to participants the ledger has never seen.
pub const DEFAULT_RATING: f64 = 1500.0;
/// Bound on the per-participant outcome history.
pub const HISTORY_CAP: usize = 10;
/// Fixed Elo K-factor.
const K_FACTOR: f64 = 32.0;

/// One finished-game outcome from a participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSymbol {
    /// Won a decisive game.
    Win,
    /// Lost a decisive game.
    Loss,
    /// Drew.
    Draw,
}

impl OutcomeSymbol {
    /// Single-letter form used in history displays and snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeSymbol::Win => "W",
            OutcomeSymbol::Loss => "L",
            OutcomeSymbol::Draw => "D",
        }
    }

    /// Parse the single-letter snapshot form.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "W" => Some(OutcomeSymbol::Win),
            "L" => Some(OutcomeSymbol::Loss),
            "D" => Some(OutcomeSymbol::Draw),
            _ => None,
        }
    }
}

/// Rating, record and bounded outcome history for one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRecord {
    /// Current Elo rating.
    pub rating: f64,
    /// Decisive games won. Draws increment neither counter.
    pub wins: u32,
    /// Decisive games lost.
    pub losses: u32,
    /// Most recent outcomes, oldest first, capped at [`HISTORY_CAP`].
    pub history: VecDeque<OutcomeSymbol>,
}

impl Default for RatingRecord {
    fn default() -> Self {
        Self {
            rating: DEFAULT_RATING,
            wins: 0,
            losses: 0,
            history: VecDeque::new(),
        }
    }
}

impl RatingRecord {
    fn push_outcome(&mut self, outcome: OutcomeSymbol) {
        if self.history.len() == HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(outcome);
    }
}

/// Outcome of a rated pairing, from the first argument's point of view.
///
/// "Second wins" is expressed by swapping the arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairedOutcome {
    /// The first participant won.
    FirstWins,
    /// The game was drawn.
    Draw,
}

/// Mapping from participant identity to rating record, with atomic paired
/// updates and a synchronous full-state snapshot after every transaction.
///
/// The whole ledger sits behind one lock, so a paired update is atomic
/// across both records and serialized against any other transaction
/// touching either identity.
pub struct RatingLedger {
    records: Mutex<IndexMap<ParticipantId, RatingRecord>>,
    store: Arc<dyn RatingStore>,
}

impl RatingLedger {
    /// Empty ledger persisting through `store`.
    pub fn new(store: Arc<dyn RatingStore>) -> Self {
        Self::with_records(store, IndexMap::new())
    }

    /// Ledger seeded from a loaded snapshot.
    pub fn with_records(
        store: Arc<dyn RatingStore>,
        records: IndexMap<ParticipantId, RatingRecord>,
    ) -> Self {
        Self {
            records: Mutex::new(records),
            store,
        }
    }

    /// Apply the paired Elo transaction for a finished rated game.
    ///
    /// Missing records are created at the defaults before deltas apply. The
    /// snapshot write happens inside the transaction; if it fails the error
    /// is logged and the in-memory state stays authoritative until the next
    /// successful write.
    pub async fn apply_result(
        &self,
        first: &ParticipantId,
        second: &ParticipantId,
        outcome: PairedOutcome,
    ) {
        let mut records = self.records.lock().await;

        let first_rating = records.entry(first.clone()).or_default().rating;
        let second_rating = records.entry(second.clone()).or_default().rating;

        let expected_first = 1.0 / (1.0 + 10f64.powf((second_rating - first_rating) / 400.0));
        let score_first = match outcome {
            PairedOutcome::FirstWins => 1.0,
            PairedOutcome::Draw => 0.5,
        };
        let transfer = K_FACTOR * (score_first - expected_first);

        if let Some(record) = records.get_mut(first) {
            record.rating += transfer;
            match outcome {
                PairedOutcome::FirstWins => {
                    record.wins += 1;
                    record.push_outcome(OutcomeSymbol::Win);
                }
                PairedOutcome::Draw => record.push_outcome(OutcomeSymbol::Draw),
            }
        }
        if let Some(record) = records.get_mut(second) {
            record.rating -= transfer;
            match outcome {
                PairedOutcome::FirstWins => {
                    record.losses += 1;
                    record.push_outcome(OutcomeSymbol::Loss);
                }
                PairedOutcome::Draw => record.push_outcome(OutcomeSymbol::Draw),
            }
        }

        let snapshot = RatingsSnapshotEntity::capture(&records);
        if let Err(err) = self.store.save(snapshot).await {
            warn!(error = %err, "failed to persist rating snapshot; in-memory state stays authoritative");
        }
    }

    /// Current record for `id`, or the defaults for an unseen participant.
    ///
    /// Reading never creates a record; records are created lazily on the
    /// first rating update.
    pub async fn record(&self, id: &ParticipantId) -> RatingRecord {
        let records = self.records.lock().await;
        records.get(id).cloned().unwrap_or_default()
    }

    /// Top `limit` participants by rating, highest first.
    pub async fn leaderboard(&self, limit: usize) -> Vec<(ParticipantId, RatingRecord)> {
        let records = self.records.lock().await;
        let mut rows: Vec<_> = records
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect();
        rows.sort_by(|a, b| b.1.rating.total_cmp(&a.1.rating));
        rows.truncate(limit);
        rows
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;
    use futures::future::{BoxFuture, ready};

    use super::*;
    use crate::dao::storage::StorageResult;

    #[derive(Default)]
    struct CountingStore {
        saves: AtomicUsize,
    }

    impl RatingStore for CountingStore {
        fn load(&self) -> BoxFuture<'static, StorageResult<Option<RatingsSnapshotEntity>>> {
            ready(Ok(None)).boxed()
        }

        fn save(&self, _snapshot: RatingsSnapshotEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            ready(Ok(())).boxed()
        }
    }

    fn ledger() -> (RatingLedger, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        (RatingLedger::new(store.clone()), store)
    }

    fn ids() -> (ParticipantId, ParticipantId) {
        (ParticipantId::from("alice"), ParticipantId::from("bob"))
    }

    #[tokio::test]
    async fn decisive_update_is_a_zero_sum_transfer() {
        let (ledger, _) = ledger();
        let (alice, bob) = ids();

        ledger
            .apply_result(&alice, &bob, PairedOutcome::FirstWins)
            .await;

        let winner = ledger.record(&alice).await;
        let loser = ledger.record(&bob).await;

        assert!(winner.rating > DEFAULT_RATING);
        assert!(loser.rating < DEFAULT_RATING);
        let gained = winner.rating - DEFAULT_RATING;
        let lost = DEFAULT_RATING - loser.rating;
        assert!((gained - lost).abs() < 1e-9);

        assert_eq!(winner.wins, 1);
        assert_eq!(winner.losses, 0);
        assert_eq!(loser.losses, 1);
        assert_eq!(winner.history, [OutcomeSymbol::Win]);
        assert_eq!(loser.history, [OutcomeSymbol::Loss]);
    }

    #[tokio::test]
    async fn draw_between_unequal_ratings_moves_them_closer_symmetrically() {
        let (ledger, _) = ledger();
        let (strong, weak) = ids();

        // Seed unequal ratings with two decisive games.
        ledger
            .apply_result(&strong, &weak, PairedOutcome::FirstWins)
            .await;
        ledger
            .apply_result(&strong, &weak, PairedOutcome::FirstWins)
            .await;
        let strong_before = ledger.record(&strong).await.rating;
        let weak_before = ledger.record(&weak).await.rating;
        assert!(strong_before > weak_before);

        ledger.apply_result(&strong, &weak, PairedOutcome::Draw).await;

        let strong_after = ledger.record(&strong).await;
        let weak_after = ledger.record(&weak).await;
        assert!(strong_after.rating < strong_before);
        assert!(weak_after.rating > weak_before);
        let dropped = strong_before - strong_after.rating;
        let gained = weak_after.rating - weak_before;
        assert!((dropped - gained).abs() < 1e-9);

        // Draws increment neither counter.
        assert_eq!(strong_after.wins, 2);
        assert_eq!(strong_after.losses, 0);
        assert_eq!(weak_after.wins, 0);
        assert_eq!(weak_after.losses, 2);
        assert_eq!(*strong_after.history.back().unwrap(), OutcomeSymbol::Draw);
    }

    #[tokio::test]
    async fn history_never_exceeds_the_cap_and_drops_oldest_first() {
        let (ledger, _) = ledger();
        let (alice, bob) = ids();

        for _ in 0..HISTORY_CAP {
            ledger
                .apply_result(&alice, &bob, PairedOutcome::FirstWins)
                .await;
        }
        ledger.apply_result(&alice, &bob, PairedOutcome::Draw).await;

        let record = ledger.record(&alice).await;
        assert_eq!(record.history.len(), HISTORY_CAP);
        assert_eq!(*record.history.front().unwrap(), OutcomeSymbol::Win);
        assert_eq!(*record.history.back().unwrap(), OutcomeSymbol::Draw);
    }

    #[tokio::test]
    async fn unseen_participants_read_as_defaults_without_being_created() {
        let (ledger, _) = ledger();
        let stranger = ParticipantId::from("stranger");

        let record = ledger.record(&stranger).await;
        assert_eq!(record.rating, DEFAULT_RATING);
        assert_eq!(record.wins, 0);
        assert_eq!(record.losses, 0);
        assert!(record.history.is_empty());
        assert!(ledger.leaderboard(10).await.is_empty());
    }

    #[tokio::test]
    async fn every_transaction_persists_one_snapshot() {
        let (ledger, store) = ledger();
        let (alice, bob) = ids();

        ledger
            .apply_result(&alice, &bob, PairedOutcome::FirstWins)
            .await;
        ledger.apply_result(&bob, &alice, PairedOutcome::Draw).await;

        assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn leaderboard_orders_by_rating_descending() {
        let (ledger, _) = ledger();
        let (alice, bob) = ids();

        ledger
            .apply_result(&alice, &bob, PairedOutcome::FirstWins)
            .await;

        let rows = ledger.leaderboard(10).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, alice);
        assert_eq!(rows[1].0, bob);
    }
}
