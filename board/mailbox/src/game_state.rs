use board::{Color, CoordinateMove, Position};

use crate::MailboxBoard;

impl MailboxBoard {
    /// Every legal move for the given color, regardless of whose turn it is
    pub fn legal_moves(&self, color: Color) -> Vec<CoordinateMove> {
        self.grid
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .flat_map(|(from, _)| {
                Position::all()
                    .filter(move |&to| self.check_move_legality(from, to).is_ok())
                    .map(move |to| CoordinateMove { from, to })
            })
            .collect()
    }

    /// Whether the given color could make any move at all
    ///
    /// Stops at the first legal move found.
    pub fn has_legal_move(&self, color: Color) -> bool {
        self.grid
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .any(|(from, _)| Position::all().any(|to| self.check_move_legality(from, to).is_ok()))
    }
}

#[cfg(test)]
mod tests {
    use board::{Board, GameOutcome, GameStatus, Piece, PieceKind};

    use super::*;

    fn sq(name: &str) -> Position {
        name.parse().unwrap()
    }

    #[test]
    fn test_twenty_opening_moves_each() {
        let board = MailboxBoard::initial_state();
        assert_eq!(board.legal_moves(Color::White).len(), 20);
        assert_eq!(board.legal_moves(Color::Black).len(), 20);
        assert_eq!(board.status(), GameStatus::Ongoing);
        assert_eq!(board.outcome(), None);
    }

    #[test]
    fn test_fools_mate() {
        let mut board = MailboxBoard::initial_state();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            assert!(board.move_piece(sq(from), sq(to)), "{from}-{to}");
        }
        assert!(board.is_in_check(Color::White));
        assert!(board.is_checkmate(Color::White));
        assert!(!board.is_stalemate(Color::White));
        assert!(!board.has_legal_move(Color::White));
        assert!(board.legal_moves(Color::White).is_empty());
        assert_eq!(board.status(), GameStatus::Checkmate);
        assert_eq!(
            board.outcome(),
            Some(GameOutcome::Checkmate {
                winner: Color::Black
            })
        );
    }

    #[test]
    fn test_check_with_escape() {
        let mut board = MailboxBoard::initial_state();
        for (from, to) in [("e2", "e4"), ("f7", "f6"), ("d1", "h5")] {
            assert!(board.move_piece(sq(from), sq(to)), "{from}-{to}");
        }
        assert_eq!(board.status(), GameStatus::Check);
        assert!(!board.is_checkmate(Color::Black));
        // Only blocking with the g-pawn gets out of check
        let moves: Vec<String> = board
            .legal_moves(Color::Black)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(moves, vec!["g7g6"]);
    }

    #[test]
    fn test_stalemate() {
        let mut board = MailboxBoard::empty();
        board.set_piece(sq("a8"), Some(Piece::new(PieceKind::King, Color::Black)));
        board.set_piece(sq("a6"), Some(Piece::new(PieceKind::King, Color::White)));
        board.set_piece(sq("b6"), Some(Piece::new(PieceKind::Queen, Color::White)));
        board.set_side_to_move(Color::Black);
        assert!(!board.is_in_check(Color::Black));
        assert!(board.is_stalemate(Color::Black));
        assert!(!board.is_checkmate(Color::Black));
        assert_eq!(board.status(), GameStatus::Stalemate);
        assert_eq!(board.outcome(), Some(GameOutcome::Stalemate));
        // White is not stalemated just because black is
        assert!(!board.is_stalemate(Color::White));
    }

    #[test]
    fn test_lone_kings_are_never_mated() {
        let mut board = MailboxBoard::empty();
        board.set_piece(sq("e1"), Some(Piece::new(PieceKind::King, Color::White)));
        board.set_piece(sq("e8"), Some(Piece::new(PieceKind::King, Color::Black)));
        for color in [Color::White, Color::Black] {
            assert!(!board.is_checkmate(color));
            assert!(!board.is_stalemate(color));
            assert_eq!(board.legal_moves(color).len(), 5);
        }
    }
}
