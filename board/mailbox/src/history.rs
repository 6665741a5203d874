use core::fmt;

use board::{Piece, PieceKind, Position};
use tracing::debug;

use crate::{MailboxBoard, MovedFlags};

/// What a move does besides moving a piece from one square to another
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveKind {
    /// Nothing: the piece moves, capturing whatever was on the target
    Normal,
    /// A king moving two squares, taking the rook along to the square it crossed
    Castle {
        rook_from: Position,
        rook_to: Position,
    },
    /// A pawn capturing the pawn beside it that just made a double step
    EnPassant { captured_at: Position },
    /// A pawn reaching the last row, where it becomes a queen
    Promotion,
}

/// Everything needed to take back a move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveRecord {
    pub from: Position,
    pub to: Position,
    /// The piece that moved, as it was before moving
    pub piece: Piece,
    /// The piece that was taken, if any
    pub captured: Option<Piece>,
    pub kind: MoveKind,
    /// The en passant target before this move
    pub prior_en_passant: Option<Position>,
    /// The moved flags before this move
    pub prior_moved: MovedFlags,
}
impl MoveRecord {
    /// The square the captured piece stood on
    ///
    /// This is the target square, except for en passant.
    pub const fn captured_at(&self) -> Position {
        match self.kind {
            MoveKind::EnPassant { captured_at } => captured_at,
            MoveKind::Normal | MoveKind::Castle { .. } | MoveKind::Promotion => self.to,
        }
    }

    /// Whether the king moved towards the h-file, for castles
    fn is_kingside(&self) -> bool {
        self.to.col() > self.from.col()
    }
}
/// Writes the move like `Ng1-f3`, `e4xd5`, `e7-e8=Q` or `O-O`
impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let MoveKind::Castle { .. } = self.kind {
            return f.write_str(if self.is_kingside() { "O-O" } else { "O-O-O" });
        }
        let capture = if self.captured.is_some() { 'x' } else { '-' };
        write!(
            f,
            "{}{}{}{}",
            self.piece.kind.notation_prefix(),
            self.from,
            capture,
            self.to
        )?;
        if self.kind == MoveKind::Promotion {
            write!(f, "={}", PieceKind::Queen.fen_letter())?;
        }
        Ok(())
    }
}

impl MailboxBoard {
    /// Take back the most recent move, returning what it was
    ///
    /// Every effect of the move is reversed: castled rooks go back to their corner, pawns taken
    /// en passant reappear, promoted queens become pawns again, and the castling flags and en
    /// passant target return to what they were.
    pub fn pop_move(&mut self) -> Option<MoveRecord> {
        let record = self.history.pop()?;
        self.grid.revert(&record);
        self.en_passant_target = record.prior_en_passant;
        self.moved = record.prior_moved;
        self.side_to_move = record.piece.color;
        debug!(%record, "undid move");
        Some(record)
    }
}
