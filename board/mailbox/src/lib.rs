//! A chess board stored as an 8×8 array of squares, with full move legality, special moves,
//! check detection and reversible history.

use core::fmt;

use board::{Board, Color, FenError, Piece, PieceKind, Position};
use tracing::{debug, trace};

mod fen;
mod game_state;
mod grid;
mod history;
mod legality;
mod snapshot;

pub use crate::fen::INITIAL_FEN;
use crate::grid::Grid;
pub use crate::history::{MoveKind, MoveRecord};
pub use crate::snapshot::{Snapshot, SnapshotError};

pub type Result<T, E = MoveError> = core::result::Result<T, E>;

bitflags::bitflags! {
    /// Which kings and rooks have left their starting squares
    ///
    /// Once set, a flag stays set for the rest of the game; only undoing the move that set it
    /// clears it. The rook flags belong to the starting square, not to whichever rook is there.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct MovedFlags: u8 {
        const WhiteKing = 0b0000_0001;
        const WhiteQueensideRook = 0b0000_0010;
        const WhiteKingsideRook = 0b0000_0100;
        const BlackKing = 0b0000_1000;
        const BlackQueensideRook = 0b0001_0000;
        const BlackKingsideRook = 0b0010_0000;
    }
}
impl MovedFlags {
    /// The flag for the given color's king
    pub const fn king(color: Color) -> Self {
        match color {
            Color::White => Self::WhiteKing,
            Color::Black => Self::BlackKing,
        }
    }

    /// The flag for the given color's rook starting on the h-file (kingside) or a-file
    pub const fn rook(color: Color, kingside: bool) -> Self {
        match (color, kingside) {
            (Color::White, true) => Self::WhiteKingsideRook,
            (Color::White, false) => Self::WhiteQueensideRook,
            (Color::Black, true) => Self::BlackKingsideRook,
            (Color::Black, false) => Self::BlackQueensideRook,
        }
    }

    /// The flag set by a rook leaving `from`, if that's one of its starting squares
    fn rook_leaving(color: Color, from: Position) -> Self {
        if from.row() != color.home_row() {
            return Self::empty();
        }
        match from.col() {
            0 => Self::rook(color, false),
            7 => Self::rook(color, true),
            _ => Self::empty(),
        }
    }
}

/// Why a move was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum MoveError {
    #[error("required piece not found at move source {0}")]
    SourcePieceMissing(Position),
    #[error("it is {side_to_move}'s turn to move")]
    NotYourTurn { side_to_move: Color },
    #[error("{0} is occupied by a piece of the moving side")]
    TargetOccupiedByOwnPiece(Position),
    #[error("a {} can never make that move", .kind.name())]
    MoveNeverLegal { kind: PieceKind },
    #[error("attempted castle not allowed in current board state")]
    IllegalCastle,
    #[error("attempted move puts moving side's king in check")]
    MovingIntoCheck,
}

/// The pieces on the back rank at the start of a game, from the a-file to the h-file
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// The authoritative state of a game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailboxBoard {
    // piece placement
    grid: Grid,

    // flags
    side_to_move: Color,
    /// The square a pawn skipped over on the previous move, if the previous move was a double
    /// pawn step
    en_passant_target: Option<Position>,
    /// Which kings and rooks have moved, which determines the castles allowed
    ///
    /// These castles aren't necessarily legal right now, as they may be blocked by intervening
    /// pieces and/or checks.
    moved: MovedFlags,

    /// Every move made so far, most recent last
    history: Vec<MoveRecord>,
}

impl MailboxBoard {
    /// A board with no pieces on it and no moves made, with white to move
    pub const fn empty() -> Self {
        Self {
            grid: Grid::EMPTY,
            side_to_move: Color::White,
            en_passant_target: None,
            moved: MovedFlags::empty(),
            history: Vec::new(),
        }
    }

    /// The state at the start of a chess game
    pub fn initial_state() -> Self {
        let mut board = Self::empty();
        for color in [Color::White, Color::Black] {
            for (col, kind) in (0..8).zip(BACK_RANK) {
                board.grid.set_at(color.home_row(), col, Some(Piece::new(kind, color)));
                board.grid.set_at(
                    color.pawn_row(),
                    col,
                    Some(Piece::new(PieceKind::Pawn, color)),
                );
            }
        }
        board
    }

    /// Put a piece on (or clear) a square, without any legality checks
    ///
    /// This is meant for setting up positions and doesn't touch the history.
    pub fn set_piece(&mut self, position: Position, piece: Option<Piece>) {
        self.grid.set(position, piece);
    }

    /// Change whose turn it is, without any legality checks
    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    /// Find the piece, if any, at the given square
    pub fn piece_at(&self, position: Position) -> Option<Piece> {
        self.grid.get(position)
    }

    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// The square onto which a pawn may capture en passant on this move
    pub const fn en_passant_target(&self) -> Option<Position> {
        self.en_passant_target
    }

    pub const fn moved_flags(&self) -> MovedFlags {
        self.moved
    }

    /// Every move made so far, oldest first
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    /// Whether the given color may still castle to that side, as far as the history of moves
    /// and the squares between king and rook are concerned
    ///
    /// This doesn't look at checks; those are part of the legality of the castling move itself.
    pub fn can_castle(&self, color: Color, kingside: bool) -> bool {
        if self
            .moved
            .intersects(MovedFlags::king(color) | MovedFlags::rook(color, kingside))
        {
            return false;
        }
        let between: &[u8] = if kingside { &[5, 6] } else { &[1, 2, 3] };
        between
            .iter()
            .all(|&col| self.grid.get_at(color.home_row(), col).is_none())
    }

    /// If the given move is legal for the side to move, then do it.
    ///
    /// Otherwise, this method returns `Err(..)` with why the move is illegal and leaves the board
    /// untouched.
    pub fn commit(&mut self, from: Position, to: Position) -> Result<MoveRecord> {
        let checked = match self.grid.get(from) {
            None => Err(MoveError::SourcePieceMissing(from)),
            Some(piece) if piece.color != self.side_to_move => Err(MoveError::NotYourTurn {
                side_to_move: self.side_to_move,
            }),
            Some(_) => self.check_move_legality(from, to),
        };
        match checked {
            Ok((piece, kind)) => Ok(self.do_move(from, to, piece, kind)),
            Err(err) => {
                trace!(%from, %to, reason = %err, "rejected move");
                Err(err)
            }
        }
    }

    /// Do the move, which must already have passed the legality check
    fn do_move(&mut self, from: Position, to: Position, piece: Piece, kind: MoveKind) -> MoveRecord {
        let prior_en_passant = self.en_passant_target.take();
        let prior_moved = self.moved;
        let captured = self.grid.apply(from, to, kind);

        match piece.kind {
            PieceKind::King => {
                self.moved |= MovedFlags::king(piece.color);
                if let MoveKind::Castle { rook_from, .. } = kind {
                    self.moved |= MovedFlags::rook_leaving(piece.color, rook_from);
                }
            }
            PieceKind::Rook => self.moved |= MovedFlags::rook_leaving(piece.color, from),
            PieceKind::Pawn => {
                let (rows, _) = from.delta_to(to);
                if rows.abs() == 2 {
                    self.en_passant_target = from.offset(piece.color.pawn_direction(), 0);
                }
            }
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Queen => {}
        }

        let record = MoveRecord {
            from,
            to,
            piece,
            captured,
            kind,
            prior_en_passant,
            prior_moved,
        };
        self.history.push(record);
        self.side_to_move = self.side_to_move.other();
        debug!(%record, color = %piece.color, "committed move");
        record
    }
}

impl Default for MailboxBoard {
    fn default() -> Self {
        Self::initial_state()
    }
}

impl Board for MailboxBoard {
    type Err = MoveError;

    fn from_fen(fen: &str) -> Result<Self, FenError> {
        Self::parse_fen(fen)
    }

    fn to_fen(&self) -> String {
        self.fen()
    }

    fn initial_state() -> Self {
        MailboxBoard::initial_state()
    }

    fn piece_at(&self, position: Position) -> Option<Piece> {
        MailboxBoard::piece_at(self, position)
    }

    fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    fn is_valid_move(&self, from: Position, to: Position) -> bool {
        self.check_move_legality(from, to).is_ok()
    }

    fn try_move(&mut self, from: Position, to: Position) -> Result<()> {
        self.commit(from, to).map(|_| ())
    }

    fn undo_last_move(&mut self) -> bool {
        self.pop_move().is_some()
    }

    fn can_castle(&self, color: Color, kingside: bool) -> bool {
        MailboxBoard::can_castle(self, color, kingside)
    }

    fn is_in_check(&self, color: Color) -> bool {
        self.grid.is_in_check(color)
    }

    fn is_checkmate(&self, color: Color) -> bool {
        self.grid.is_in_check(color) && !self.has_legal_move(color)
    }

    fn is_stalemate(&self, color: Color) -> bool {
        !self.grid.is_in_check(color) && !self.has_legal_move(color)
    }
}

/// Display as a TUI version of the board, white at the bottom
impl fmt::Display for MailboxBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8 {
                let symbol = self.grid.get_at(row, col).map_or('.', Piece::fen_letter);
                write!(f, " {symbol}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Position {
        name.parse().unwrap()
    }

    #[test]
    fn test_initial_state_layout() {
        let board = MailboxBoard::initial_state();
        assert_eq!(
            board.piece_at(sq("e1")),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            board.piece_at(sq("d8")),
            Some(Piece::new(PieceKind::Queen, Color::Black))
        );
        assert_eq!(
            board.piece_at(sq("c7")),
            Some(Piece::new(PieceKind::Pawn, Color::Black))
        );
        assert_eq!(board.piece_at(sq("e4")), None);
        assert_eq!(Position::all().filter_map(|p| board.piece_at(p)).count(), 32);
        assert!(board.is_white_turn());
        assert!(board.history().is_empty());
    }

    #[test]
    fn test_get_piece_out_of_range_is_absent() {
        let board = MailboxBoard::initial_state();
        assert!(board.get_piece(-1, 0).is_none());
        assert!(board.get_piece(0, 8).is_none());
        assert!(board.get_piece(7, 4).is_some());
    }

    #[test]
    fn test_rejections_leave_board_untouched() {
        let mut board = MailboxBoard::initial_state();
        let before = board.clone();
        assert_eq!(
            board.commit(sq("e4"), sq("e5")),
            Err(MoveError::SourcePieceMissing(sq("e4")))
        );
        assert_eq!(
            board.commit(sq("e7"), sq("e5")),
            Err(MoveError::NotYourTurn {
                side_to_move: Color::White
            })
        );
        assert_eq!(
            board.commit(sq("a1"), sq("a2")),
            Err(MoveError::TargetOccupiedByOwnPiece(sq("a2")))
        );
        assert_eq!(
            board.commit(sq("g1"), sq("g3")),
            Err(MoveError::MoveNeverLegal {
                kind: PieceKind::Knight
            })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_turn_alternates_only_on_success() {
        let mut board = MailboxBoard::initial_state();
        assert!(board.move_piece(sq("e2"), sq("e4")));
        assert!(!board.is_white_turn());
        assert!(!board.move_piece(sq("e4"), sq("e5")));
        assert!(!board.is_white_turn());
        assert!(board.move_piece(sq("e7"), sq("e5")));
        assert!(board.is_white_turn());
    }

    #[test]
    fn test_move_counts_increase() {
        let mut board = MailboxBoard::initial_state();
        assert!(board.move_piece(sq("g1"), sq("f3")));
        assert!(board.move_piece(sq("g8"), sq("f6")));
        assert!(board.move_piece(sq("f3"), sq("g1")));
        assert_eq!(board.piece_at(sq("g1")).map(|p| p.move_count), Some(2));
        assert_eq!(board.piece_at(sq("f6")).map(|p| p.move_count), Some(1));
    }

    #[test]
    fn test_rook_flag_only_from_home_square() {
        let mut board = MailboxBoard::empty();
        board.set_piece(sq("e1"), Some(Piece::new(PieceKind::King, Color::White)));
        board.set_piece(sq("e8"), Some(Piece::new(PieceKind::King, Color::Black)));
        board.set_piece(sq("a3"), Some(Piece::new(PieceKind::Rook, Color::White)));
        board.set_piece(sq("h1"), Some(Piece::new(PieceKind::Rook, Color::White)));
        assert!(board.move_piece(sq("a3"), sq("a4")));
        assert_eq!(board.moved_flags(), MovedFlags::empty());
        assert!(board.move_piece(sq("e8"), sq("d8")));
        assert_eq!(board.moved_flags(), MovedFlags::BlackKing);
        assert!(board.move_piece(sq("h1"), sq("h2")));
        assert_eq!(
            board.moved_flags(),
            MovedFlags::BlackKing | MovedFlags::WhiteKingsideRook
        );
    }

    #[test]
    fn test_display_grid() {
        let rendered = MailboxBoard::initial_state().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[4], "4  . . . . . . . .");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }
}
