//! Persistence boundary: snapshot storage, entities and corpus loading.

/// Snapshot and entity model definitions.
pub mod models;
/// Puzzle corpus loading and the remote daily-puzzle source.
pub mod puzzles;
/// Rating snapshot storage backends.
pub mod rating_store;
/// Storage abstraction layer.
pub mod storage;
