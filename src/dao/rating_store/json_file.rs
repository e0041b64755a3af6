//! Rating snapshot backend writing a single JSON file.

use std::{io::ErrorKind, path::PathBuf};

use futures::{FutureExt, future::BoxFuture};
use tokio::fs;

use crate::dao::{
    models::RatingsSnapshotEntity,
    rating_store::RatingStore,
    storage::{StorageError, StorageResult},
};

/// File-backed [`RatingStore`].
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileRatingStore {
    path: PathBuf,
}

impl JsonFileRatingStore {
    /// Store reading and writing `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RatingStore for JsonFileRatingStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<RatingsSnapshotEntity>>> {
        let path = self.path.clone();
        async move {
            let contents = match fs::read_to_string(&path).await {
                Ok(contents) => contents,
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
                Err(err) => {
                    return Err(StorageError::unavailable(
                        format!("reading rating snapshot `{}`", path.display()),
                        err,
                    ));
                }
            };
            let snapshot = serde_json::from_str(&contents).map_err(|err| {
                StorageError::corrupt(
                    format!("decoding rating snapshot `{}`", path.display()),
                    err,
                )
            })?;
            Ok(Some(snapshot))
        }
        .boxed()
    }

    fn save(&self, snapshot: RatingsSnapshotEntity) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path.clone();
        async move {
            let json = serde_json::to_vec_pretty(&snapshot).map_err(|err| {
                StorageError::corrupt("encoding rating snapshot".into(), err)
            })?;

            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).await.map_err(|err| {
                    StorageError::unavailable(
                        format!("creating snapshot directory `{}`", parent.display()),
                        err,
                    )
                })?;
            }

            let tmp = path.with_extension("tmp");
            fs::write(&tmp, &json).await.map_err(|err| {
                StorageError::unavailable(
                    format!("writing rating snapshot `{}`", tmp.display()),
                    err,
                )
            })?;
            fs::rename(&tmp, &path).await.map_err(|err| {
                StorageError::unavailable(
                    format!("replacing rating snapshot `{}`", path.display()),
                    err,
                )
            })?;
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::state::{
        ratings::{OutcomeSymbol, RatingRecord},
        session::ParticipantId,
    };

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRatingStore::new(dir.path().join("ratings.json"));

        let mut records: IndexMap<ParticipantId, RatingRecord> = IndexMap::new();
        records.insert(
            ParticipantId::from("alice"),
            RatingRecord {
                rating: 1481.5,
                wins: 0,
                losses: 1,
                history: [OutcomeSymbol::Loss].into(),
            },
        );

        store
            .save(RatingsSnapshotEntity::capture(&records))
            .await
            .unwrap();
        let loaded = store.load().await.unwrap().expect("snapshot exists");

        assert_eq!(loaded.into_records(), records);
    }

    #[tokio::test]
    async fn load_without_a_snapshot_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRatingStore::new(dir.path().join("missing.json"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileRatingStore::new(path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
