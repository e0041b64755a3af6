//! Storage abstraction for the persisted rating snapshot.

pub mod json_file;

use futures::future::BoxFuture;

use crate::dao::{models::RatingsSnapshotEntity, storage::StorageResult};

/// Abstraction over the persistence layer for rating snapshots.
///
/// The ledger writes the full state after every transaction and reads it
/// once at startup; last successful write wins.
pub trait RatingStore: Send + Sync {
    /// Read the last persisted snapshot, or `None` when none exists yet.
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<RatingsSnapshotEntity>>>;

    /// Replace the persisted snapshot with `snapshot`.
    fn save(&self, snapshot: RatingsSnapshotEntity) -> BoxFuture<'static, StorageResult<()>>;
}
