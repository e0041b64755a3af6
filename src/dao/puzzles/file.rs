//! Puzzle corpus loader for the lichess CSV export format.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    dao::storage::{StorageError, StorageResult},
    state::puzzles::{PuzzleCatalog, PuzzleRecord, PuzzleStart},
};

/// One row of the corpus. Extra columns (themes, popularity, ...) are
/// ignored.
#[derive(Debug, Deserialize)]
struct PuzzleRow {
    #[serde(rename = "PuzzleId")]
    id: String,
    #[serde(rename = "FEN")]
    fen: String,
    #[serde(rename = "Moves")]
    moves: String,
    #[serde(rename = "Rating")]
    rating: u32,
}

/// Load the puzzle corpus from a CSV file at process start.
///
/// Rows are normalized so `solution[0]` is the player's first expected move:
/// the corpus stores the opponent's setup move as `Moves[0]`, which becomes
/// the record's `setup`. Rows whose move list cannot alternate player and
/// scripted reply ending on a player move are skipped.
pub fn load_catalog(path: &Path) -> StorageResult<PuzzleCatalog> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| {
        StorageError::unavailable(format!("opening puzzle corpus `{}`", path.display()), err)
    })?;

    let mut puzzles = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<PuzzleRow>() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                warn!(error = %err, "skipping unreadable puzzle row");
                skipped += 1;
                continue;
            }
        };
        match normalize(row) {
            Some(record) => puzzles.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped malformed puzzle rows");
    }
    info!(count = puzzles.len(), path = %path.display(), "loaded puzzle corpus");
    Ok(PuzzleCatalog::new(puzzles))
}

fn normalize(row: PuzzleRow) -> Option<PuzzleRecord> {
    let mut moves: Vec<String> = row.moves.split_whitespace().map(String::from).collect();
    // Setup move plus an odd-length solution ending on a player move.
    if moves.len() < 2 || moves.len() % 2 != 0 {
        warn!(puzzle = %row.id, "skipping puzzle with unusable move list");
        return None;
    }
    let setup = moves.remove(0);
    Some(PuzzleRecord {
        id: row.id,
        rating: row.rating,
        start: PuzzleStart::Fen(row.fen),
        setup: Some(setup),
        solution: moves,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_and_normalizes_corpus_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,GameUrl"
        )
        .unwrap();
        writeln!(
            file,
            "00sHx,r1bqkbnr/8/8/8/8/8/8/RNBQKB1R w KQkq - 0 1,e8d7 a2e6 d7d8 f7f8,1760,80,83,72,mate,https://lichess.org/x"
        )
        .unwrap();
        // Odd-length move list cannot end on a player move once the setup is
        // split off.
        writeln!(
            file,
            "00bad,8/8/8/8/8/8/8/8 w - - 0 1,e2e4 e7e5 g1f3,1500,80,83,72,opening,https://lichess.org/y"
        )
        .unwrap();
        // Unparseable rating.
        writeln!(
            file,
            "00ugly,8/8/8/8/8/8/8/8 w - - 0 1,e2e4 e7e5,not-a-number,80,83,72,opening,https://lichess.org/z"
        )
        .unwrap();

        let catalog = load_catalog(file.path()).unwrap();

        assert_eq!(catalog.len(), 1);
        let record = catalog.random().unwrap();
        assert_eq!(record.id, "00sHx");
        assert_eq!(record.rating, 1760);
        assert_eq!(record.setup.as_deref(), Some("e8d7"));
        assert_eq!(record.solution, ["a2e6", "d7d8", "f7f8"]);
        assert!(matches!(record.start, PuzzleStart::Fen(ref fen) if fen.starts_with("r1bqkbnr")));
    }

    #[test]
    fn missing_corpus_file_is_an_error() {
        let err = load_catalog(Path::new("/nonexistent/puzzles.csv")).unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));
    }
}
