use board::{Piece, PieceKind, Position};

use crate::{MailboxBoard, MoveError, MoveKind, Result};

impl MailboxBoard {
    /// Check if this move is legal to do right now.
    ///
    /// Whose turn it is isn't considered, so this can be asked about either side. Returns the
    /// moving piece and the kind of move if it is legal, otherwise `Err(..)` containing the
    /// reason why the move is illegal.
    pub(crate) fn check_move_legality(
        &self,
        from: Position,
        to: Position,
    ) -> Result<(Piece, MoveKind)> {
        let piece = self
            .grid
            .get(from)
            .ok_or(MoveError::SourcePieceMissing(from))?;
        if self
            .grid
            .get(to)
            .is_some_and(|target| target.color == piece.color)
        {
            return Err(MoveError::TargetOccupiedByOwnPiece(to));
        }
        let kind = self.classify(piece, from, to)?;
        // Check that we aren't moving into check by trying the move on a copy
        let mut post_move = self.grid;
        post_move.apply(from, to, kind);
        if post_move.is_in_check(piece.color) {
            return Err(MoveError::MovingIntoCheck);
        }
        Ok((piece, kind))
    }

    /// Work out which kind of move this is, if the piece can move that way at all
    fn classify(&self, piece: Piece, from: Position, to: Position) -> Result<MoveKind> {
        let (rows, cols) = from.delta_to(to);
        match piece.kind {
            PieceKind::King if rows == 0 && cols.abs() == 2 => {
                self.castle_kind(piece, from, cols > 0)
            }
            PieceKind::Pawn
                if self.en_passant_target == Some(to)
                    && rows == piece.color.pawn_direction()
                    && cols.abs() == 1 =>
            {
                let captured_at = to
                    .offset(-rows, 0)
                    .filter(|&square| {
                        self.grid.get(square).is_some_and(|victim| {
                            victim.kind == PieceKind::Pawn && victim.color != piece.color
                        })
                    })
                    .ok_or(MoveError::MoveNeverLegal { kind: piece.kind })?;
                Ok(MoveKind::EnPassant { captured_at })
            }
            _ if self.grid.follows_geometry(piece, from, to) => {
                if piece.kind == PieceKind::Pawn && to.row() == piece.color.promotion_row() {
                    Ok(MoveKind::Promotion)
                } else {
                    Ok(MoveKind::Normal)
                }
            }
            _ => Err(MoveError::MoveNeverLegal { kind: piece.kind }),
        }
    }

    /// Check a king's two-square move as a castle
    ///
    /// The king must be unmoved on its starting square, the castle still allowed, the rook in
    /// its corner, and the king may not start on or cross an attacked square. Whether it ends up
    /// in check is left to the usual king safety check.
    fn castle_kind(&self, king: Piece, from: Position, kingside: bool) -> Result<MoveKind> {
        let color = king.color;
        let row = color.home_row();
        let (rook_col, crossed_col) = if kingside { (7, 5) } else { (0, 3) };
        let (Some(start), Some(rook_from), Some(rook_to)) = (
            Position::new(row, 4),
            Position::new(row, rook_col),
            Position::new(row, crossed_col),
        ) else {
            return Err(MoveError::IllegalCastle);
        };
        if king.has_moved() || from != start || !self.can_castle(color, kingside) {
            return Err(MoveError::IllegalCastle);
        }
        if !self
            .grid
            .get(rook_from)
            .is_some_and(|rook| rook.kind == PieceKind::Rook && rook.color == color)
        {
            return Err(MoveError::IllegalCastle);
        }
        if self.grid.is_in_check(color) || self.grid.is_attacked(rook_to, color.other()) {
            return Err(MoveError::IllegalCastle);
        }
        Ok(MoveKind::Castle { rook_from, rook_to })
    }
}
