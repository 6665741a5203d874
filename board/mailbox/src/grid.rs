//! The squares of the board and the raw movement rules of each kind of piece

use board::{Color, Piece, PieceKind, Position};

use crate::{MoveKind, MoveRecord};

/// The contents of all 64 squares, indexed by row then column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Grid([[Option<Piece>; 8]; 8]);

impl Grid {
    pub(crate) const EMPTY: Self = Self([[None; 8]; 8]);

    pub(crate) const fn from_rows(rows: [[Option<Piece>; 8]; 8]) -> Self {
        Self(rows)
    }

    pub(crate) const fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.0
    }

    pub(crate) fn get(&self, position: Position) -> Option<Piece> {
        self.0[position.row() as usize][position.col() as usize]
    }

    /// Like [`Self::get`], for coordinates already known to be on the board
    pub(crate) fn get_at(&self, row: u8, col: u8) -> Option<Piece> {
        self.0[row as usize][col as usize]
    }

    pub(crate) fn set(&mut self, position: Position, piece: Option<Piece>) {
        self.0[position.row() as usize][position.col() as usize] = piece;
    }

    pub(crate) fn set_at(&mut self, row: u8, col: u8, piece: Option<Piece>) {
        self.0[row as usize][col as usize] = piece;
    }

    pub(crate) fn take(&mut self, position: Position) -> Option<Piece> {
        self.0[position.row() as usize][position.col() as usize].take()
    }

    pub(crate) fn is_empty(&self, position: Position) -> bool {
        self.get(position).is_none()
    }

    /// Whether a double pawn step could have skipped over this square, leaving it empty on the
    /// third or sixth rank
    pub(crate) fn could_be_en_passant_target(&self, position: Position) -> bool {
        matches!(position.row(), 2 | 5) && self.is_empty(position)
    }

    /// Every occupied square along with its piece, row by row
    pub(crate) fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(|position| Some((position, self.get(position)?)))
    }

    /// The square of the given color's king
    ///
    /// If there is more than one, this is the first found scanning row by row.
    pub(crate) fn find_king(&self, color: Color) -> Option<Position> {
        self.pieces()
            .find(|(_, piece)| piece.kind == PieceKind::King && piece.color == color)
            .map(|(position, _)| position)
    }

    /// Returns `true` if every square strictly between `from` and `to` is empty
    ///
    /// The two squares must share a row, column or diagonal.
    pub(crate) fn path_clear(&self, from: Position, to: Position) -> bool {
        let (rows, cols) = from.delta_to(to);
        let (row_step, col_step) = (rows.signum(), cols.signum());
        if (row_step, col_step) == (0, 0) {
            return true;
        }
        let mut current = from.offset(row_step, col_step);
        while let Some(square) = current {
            if square == to {
                return true;
            }
            if !self.is_empty(square) {
                return false;
            }
            current = square.offset(row_step, col_step);
        }
        debug_assert!(false, "Unreachable: path between squares not on a line");
        false
    }

    /// Whether `piece`, standing on `from`, can move to `to` by its shape of movement
    ///
    /// This checks that sliding pieces aren't blocked and that pawns only step onto empty squares
    /// and only capture diagonally. It doesn't check what is on `to` for other pieces, the safety
    /// of the mover's king, castling or en passant; those belong to the board.
    pub(crate) fn follows_geometry(&self, piece: Piece, from: Position, to: Position) -> bool {
        let (rows, cols) = from.delta_to(to);
        match piece.kind {
            PieceKind::Pawn => {
                let direction = piece.color.pawn_direction();
                if cols == 0 && rows == direction {
                    self.is_empty(to)
                } else if cols == 0 && rows == 2 * direction && !piece.has_moved() {
                    // Double pawn move only if the middle square is clear
                    from.offset(direction, 0)
                        .is_some_and(|middle| self.is_empty(middle))
                        && self.is_empty(to)
                } else if cols.abs() == 1 && rows == direction {
                    self.get(to).is_some_and(|target| target.color != piece.color)
                } else {
                    false
                }
            }
            PieceKind::Knight => matches!((rows.abs(), cols.abs()), (2, 1) | (1, 2)),
            PieceKind::Bishop => Self::is_diagonal(rows, cols) && self.path_clear(from, to),
            PieceKind::Rook => Self::is_straight(rows, cols) && self.path_clear(from, to),
            // Break the queen down into a rook and a bishop
            PieceKind::Queen => {
                (Self::is_diagonal(rows, cols) || Self::is_straight(rows, cols))
                    && self.path_clear(from, to)
            }
            PieceKind::King => rows.abs() <= 1 && cols.abs() <= 1 && (rows, cols) != (0, 0),
        }
    }

    const fn is_diagonal(rows: i8, cols: i8) -> bool {
        rows != 0 && rows.abs() == cols.abs()
    }

    const fn is_straight(rows: i8, cols: i8) -> bool {
        (rows == 0) != (cols == 0)
    }

    /// Whether `piece`, standing on `from`, threatens `target`
    ///
    /// This is the movement geometry except that pawns threaten both forward diagonals whether
    /// or not anything stands there, and a king never threatens by castling.
    pub(crate) fn attacks(&self, piece: Piece, from: Position, target: Position) -> bool {
        match piece.kind {
            PieceKind::Pawn => {
                let (rows, cols) = from.delta_to(target);
                rows == piece.color.pawn_direction() && cols.abs() == 1
            }
            _ => self.follows_geometry(piece, from, target),
        }
    }

    /// Returns `true` if any piece of the color `by` threatens `square`
    pub(crate) fn is_attacked(&self, square: Position, by: Color) -> bool {
        self.pieces().any(|(from, piece)| {
            piece.color == by && from != square && self.attacks(piece, from, square)
        })
    }

    /// Returns `true` if the given color's king is in check
    ///
    /// A side without a king is never in check.
    pub(crate) fn is_in_check(&self, color: Color) -> bool {
        self.find_king(color)
            .is_some_and(|king| self.is_attacked(king, color.other()))
    }

    /// Relocate the piece on `from` to `to` along with the side effects of the kind of move
    ///
    /// Returns the captured piece, if any. The same mutation serves both committed moves and the
    /// scratch copies used to test king safety.
    pub(crate) fn apply(&mut self, from: Position, to: Position, kind: MoveKind) -> Option<Piece> {
        let mut piece = self.take(from)?;
        let captured = match kind {
            MoveKind::EnPassant { captured_at } => self.take(captured_at),
            MoveKind::Normal | MoveKind::Castle { .. } | MoveKind::Promotion => self.take(to),
        };
        if let MoveKind::Castle { rook_from, rook_to } = kind {
            let rook = self.take(rook_from);
            self.set(rook_to, rook);
        }
        piece.move_count = piece.move_count.saturating_add(1);
        if kind == MoveKind::Promotion {
            piece = Piece::new(PieceKind::Queen, piece.color);
        }
        self.set(to, Some(piece));
        captured
    }

    /// Undo [`Self::apply`] for the move described by the record
    pub(crate) fn revert(&mut self, record: &MoveRecord) {
        self.set(record.to, None);
        if let MoveKind::Castle { rook_from, rook_to } = record.kind {
            let rook = self.take(rook_to);
            self.set(rook_from, rook);
        }
        self.set(record.from, Some(record.piece));
        if let Some(captured) = record.captured {
            self.set(record.captured_at(), Some(captured));
        }
    }
}
