//! A plain copy of the whole board state, for saving a game and picking it up later

use board::{Color, Piece, Position};

use crate::{grid::Grid, MailboxBoard, MoveRecord, MovedFlags};

/// Everything a [`MailboxBoard`] knows, in a form that is easy to serialize
///
/// Squares are indexed by row then column, row 0 being rank 8.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub squares: Vec<Vec<Option<Piece>>>,
    pub side_to_move: Color,
    pub en_passant_target: Option<Position>,
    pub moved: MovedFlags,
    pub history: Vec<MoveRecord>,
}

/// Why a snapshot couldn't be turned back into a board
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot has {0} rows instead of 8")]
    WrongRowCount(usize),
    #[error("snapshot row {row} has {len} squares instead of 8")]
    WrongRowLength { row: usize, len: usize },
    #[error("{0} can't be an en passant target")]
    InvalidEnPassant(Position),
    #[error("history has two moves in a row by {0}")]
    HistoryOutOfTurn(Color),
}

impl MailboxBoard {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            squares: self.grid.rows().iter().map(|row| row.to_vec()).collect(),
            side_to_move: self.side_to_move,
            en_passant_target: self.en_passant_target,
            moved: self.moved,
            history: self.history.clone(),
        }
    }

    /// Rebuild a board from a snapshot, checking that it hangs together
    ///
    /// The board must be 8×8, an en passant target must be an empty square on the third or sixth
    /// rank, and the history must alternate colors, ending with the side that isn't to move.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        if snapshot.squares.len() != 8 {
            return Err(SnapshotError::WrongRowCount(snapshot.squares.len()));
        }
        let mut rows = [[None; 8]; 8];
        for (row, (squares, target)) in snapshot.squares.iter().zip(&mut rows).enumerate() {
            *target = squares
                .as_slice()
                .try_into()
                .map_err(|_| SnapshotError::WrongRowLength {
                    row,
                    len: squares.len(),
                })?;
        }
        let grid = Grid::from_rows(rows);

        if let Some(square) = snapshot.en_passant_target {
            if !grid.could_be_en_passant_target(square) {
                return Err(SnapshotError::InvalidEnPassant(square));
            }
        }

        let mut expected = snapshot.side_to_move;
        for record in snapshot.history.iter().rev() {
            expected = expected.other();
            if record.piece.color != expected {
                return Err(SnapshotError::HistoryOutOfTurn(record.piece.color));
            }
        }

        Ok(Self {
            grid,
            side_to_move: snapshot.side_to_move,
            en_passant_target: snapshot.en_passant_target,
            moved: snapshot.moved,
            history: snapshot.history,
        })
    }
}

#[cfg(test)]
mod tests {
    use board::{Board, PieceKind};

    use super::*;

    fn sq(name: &str) -> Position {
        name.parse().unwrap()
    }

    fn played(moves: &[(&str, &str)]) -> MailboxBoard {
        let mut board = MailboxBoard::initial_state();
        for &(from, to) in moves {
            assert!(board.move_piece(sq(from), sq(to)), "{from}-{to}");
        }
        board
    }

    #[test]
    fn test_snapshot_round_trip() {
        let board = played(&[("e2", "e4"), ("d7", "d5"), ("e4", "d5"), ("c7", "c5")]);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.squares.len(), 8);
        assert_eq!(snapshot.history.len(), 4);
        assert_eq!(snapshot.en_passant_target, Some(sq("c6")));

        let mut restored = MailboxBoard::from_snapshot(snapshot).unwrap();
        assert_eq!(restored, board);
        // Undo keeps working on the restored board
        assert!(restored.undo_last_move());
        assert!(restored.undo_last_move());
        assert_eq!(
            restored.piece_at(sq("d5")),
            Some(Piece {
                kind: PieceKind::Pawn,
                color: Color::Black,
                move_count: 1,
            })
        );
    }

    #[test]
    fn test_bad_shapes_rejected() {
        let mut snapshot = MailboxBoard::initial_state().snapshot();
        snapshot.squares.pop();
        assert_eq!(
            MailboxBoard::from_snapshot(snapshot),
            Err(SnapshotError::WrongRowCount(7))
        );

        let mut snapshot = MailboxBoard::initial_state().snapshot();
        snapshot.squares[3].push(None);
        assert_eq!(
            MailboxBoard::from_snapshot(snapshot),
            Err(SnapshotError::WrongRowLength { row: 3, len: 9 })
        );
    }

    #[test]
    fn test_bad_en_passant_rejected() {
        let mut snapshot = MailboxBoard::initial_state().snapshot();
        snapshot.en_passant_target = Some(sq("e4"));
        assert_eq!(
            MailboxBoard::from_snapshot(snapshot),
            Err(SnapshotError::InvalidEnPassant(sq("e4")))
        );

        let mut snapshot = MailboxBoard::initial_state().snapshot();
        snapshot.en_passant_target = Some(sq("e2"));
        assert!(MailboxBoard::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_history_must_alternate() {
        let mut snapshot = played(&[("e2", "e4")]).snapshot();
        snapshot.side_to_move = Color::White;
        assert_eq!(
            MailboxBoard::from_snapshot(snapshot),
            Err(SnapshotError::HistoryOutOfTurn(Color::White))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_snapshot_json() {
        let board = played(&[("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6")]);
        let json = serde_json::to_string(&board.snapshot()).unwrap();
        assert!(json.contains("\"e4\""));
        let snapshot: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(MailboxBoard::from_snapshot(snapshot).unwrap(), board);
    }
}
