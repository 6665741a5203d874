//! Saving a game to a JSON file and loading it back

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use mailbox::{MailboxBoard, Snapshot, SnapshotError};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("couldn't access the save file: {0}")]
    Io(#[from] io::Error),
    #[error("save file isn't valid JSON for a game: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save file describes an impossible game: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Write the whole game, history included, to the given file
pub fn save_game(board: &MailboxBoard, path: &Path) -> Result<(), PersistenceError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &board.snapshot())?;
    writer.flush()?;
    info!(path = %path.display(), moves = board.history().len(), "saved game");
    Ok(())
}

/// Read a game written by [`save_game`]
pub fn load_game(path: &Path) -> Result<MailboxBoard, PersistenceError> {
    let reader = BufReader::new(File::open(path)?);
    let snapshot: Snapshot = serde_json::from_reader(reader)?;
    let board = MailboxBoard::from_snapshot(snapshot)?;
    info!(path = %path.display(), moves = board.history().len(), "loaded game");
    Ok(board)
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf, process};

    use board::{Board, Position};

    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        env::temp_dir().join(format!("backend-{}-{name}", process::id()))
    }

    fn sq(name: &str) -> Position {
        name.parse().unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_file("round-trip.json");
        let mut board = MailboxBoard::initial_state();
        for (from, to) in [("e2", "e4"), ("c7", "c5"), ("e4", "e5"), ("d7", "d5")] {
            assert!(board.move_piece(sq(from), sq(to)));
        }
        save_game(&board, &path).unwrap();
        let mut loaded = load_game(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, board);
        // The loaded game carries on, en passant included
        assert!(loaded.move_piece(sq("e5"), sq("d6")));
        assert!(loaded.undo_last_move());
        assert!(loaded.undo_last_move());
        assert_eq!(loaded.piece_at(sq("d7")).map(|p| p.move_count), Some(0));
    }

    #[test]
    fn test_load_missing_file() {
        let path = temp_file("does-not-exist.json");
        assert!(matches!(load_game(&path), Err(PersistenceError::Io(_))));
    }

    #[test]
    fn test_load_garbage() {
        let path = temp_file("garbage.json");
        fs::write(&path, "{\"squares\": 3}").unwrap();
        let result = load_game(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(PersistenceError::Json(_))));
    }

    #[test]
    fn test_load_impossible_game() {
        let path = temp_file("impossible.json");
        let mut snapshot = MailboxBoard::initial_state().snapshot();
        snapshot.squares.truncate(6);
        fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        let result = load_game(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(
            result,
            Err(PersistenceError::Snapshot(SnapshotError::WrongRowCount(6)))
        ));
    }
}
