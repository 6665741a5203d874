use board::{Color, FenError, Piece, PieceKind};

use crate::{grid::Grid, MailboxBoard, MovedFlags};

/// The FEN of the usual starting position
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// The castling letters in the order FEN writes them
const CASTLES: [(char, Color, bool); 4] = [
    ('K', Color::White, true),
    ('Q', Color::White, false),
    ('k', Color::Black, true),
    ('q', Color::Black, false),
];

impl MailboxBoard {
    /// Parse a position out of a FEN string
    ///
    /// The piece placement, side to move, castling and en passant fields are required. The clocks
    /// are optional and ignored. A castle missing from the castling field marks that rook as
    /// moved, and a pawn off its starting row counts as having moved once. An en passant target
    /// has to be an empty square on the third or sixth rank. The history is empty.
    pub fn parse_fen(fen: &str) -> Result<Self, FenError> {
        let mut terms = fen.split_whitespace();
        let mut board = Self::empty();

        let placement = terms.next().ok_or(FenError::MissingField("piece placement"))?;
        board.grid = parse_placement(placement)?;

        let side_to_move = terms.next().ok_or(FenError::MissingField("side to move"))?;
        board.side_to_move = match side_to_move {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSideToMove(other.to_string())),
        };

        let castling = terms.next().ok_or(FenError::MissingField("castling"))?;
        if castling != "-"
            && (castling.is_empty()
                || !castling.chars().all(|c| "KQkq".contains(c))
                || castling.len() > 4)
        {
            return Err(FenError::InvalidCastling(castling.to_string()));
        }
        for (letter, color, kingside) in CASTLES {
            if !castling.contains(letter) {
                board.moved |= MovedFlags::rook(color, kingside);
            }
        }

        let en_passant = terms.next().ok_or(FenError::MissingField("en passant"))?;
        board.en_passant_target = match en_passant {
            "-" => None,
            square => {
                let square = square.parse()?;
                if !board.grid.could_be_en_passant_target(square) {
                    return Err(FenError::ImpossibleEnPassant(square));
                }
                Some(square)
            }
        };

        Ok(board)
    }

    /// Write the position as a FEN string
    ///
    /// The halfmove clock isn't tracked, so it is always written as 0. The fullmove number counts
    /// from 1 at the position the board was set up from, whichever side moved first.
    pub fn fen(&self) -> String {
        let placement = self
            .grid
            .rows()
            .iter()
            .map(|row| {
                let mut rank = String::with_capacity(8);
                let mut empty_run = 0;
                for square in row {
                    match square {
                        Some(piece) => {
                            if empty_run > 0 {
                                rank.push_str(&empty_run.to_string());
                                empty_run = 0;
                            }
                            rank.push(piece.fen_letter());
                        }
                        None => empty_run += 1,
                    }
                }
                if empty_run > 0 {
                    rank.push_str(&empty_run.to_string());
                }
                rank
            })
            .collect::<Vec<String>>()
            .join("/");
        let side_to_move = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        let mut castling: String = CASTLES
            .iter()
            .filter(|&&(_, color, kingside)| {
                !self
                    .moved
                    .intersects(MovedFlags::king(color) | MovedFlags::rook(color, kingside))
            })
            .map(|&(letter, _, _)| letter)
            .collect();
        if castling.is_empty() {
            castling.push('-');
        }
        let en_passant = self
            .en_passant_target
            .map_or_else(|| "-".to_string(), |square| square.to_string());
        let started_with_black = self
            .history
            .first()
            .map_or(self.side_to_move, |record| record.piece.color)
            == Color::Black;
        let fullmove = (self.history.len() + usize::from(started_with_black)) / 2 + 1;
        format!("{placement} {side_to_move} {castling} {en_passant} 0 {fullmove}")
    }
}

fn parse_placement(placement: &str) -> Result<Grid, FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount(ranks.len()));
    }
    let mut rows = [[None; 8]; 8];
    for ((row_idx, rank), row) in ranks.iter().enumerate().zip(&mut rows) {
        let bad_length = || FenError::BadRankLength {
            rank: 8 - row_idx as u8,
        };
        let mut col = 0;
        for c in rank.chars() {
            if let Some(skip) = c.to_digit(10) {
                col += skip as usize;
                continue;
            }
            let mut piece = Piece::from_fen_letter(c).ok_or(FenError::UnknownPiece(c))?;
            if piece.kind == PieceKind::Pawn && row_idx != usize::from(piece.color.pawn_row()) {
                piece.move_count = 1;
            }
            *row.get_mut(col).ok_or_else(bad_length)? = Some(piece);
            col += 1;
        }
        if col != 8 {
            return Err(bad_length());
        }
    }
    Ok(Grid::from_rows(rows))
}
