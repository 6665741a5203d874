use core::{fmt, str::FromStr};

/// The types of pieces there are
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}
impl PieceKind {
    /// All the kinds of pieces there are
    pub const KINDS: [PieceKind; 6] = [
        Self::Pawn,
        Self::Rook,
        Self::Knight,
        Self::Bishop,
        Self::Queen,
        Self::King,
    ];

    /// The capitalized version of the letter used for this piece in FEN
    pub const fn fen_letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    /// The kind named by the given FEN letter, in either case
    pub const fn from_fen_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'P' => Some(Self::Pawn),
            'R' => Some(Self::Rook),
            'N' => Some(Self::Knight),
            'B' => Some(Self::Bishop),
            'Q' => Some(Self::Queen),
            'K' => Some(Self::King),
            _ => None,
        }
    }

    /// The prefix written before a move of this piece, which is empty for pawns
    pub const fn notation_prefix(self) -> &'static str {
        match self {
            Self::Pawn => "",
            Self::Rook => "R",
            Self::Knight => "N",
            Self::Bishop => "B",
            Self::Queen => "Q",
            Self::King => "K",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Rook => "rook",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }
}

/// The colors a piece can have
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    White,
    Black,
}
impl Color {
    pub const fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn is_white(self) -> bool {
        match self {
            Color::White => true,
            Color::Black => false,
        }
    }

    /// The row on which this color's king and rooks start
    pub const fn home_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// The row on which this color's pawns start
    pub const fn pawn_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// The row a pawn of this color promotes on
    pub const fn promotion_row(self) -> u8 {
        self.other().home_row()
    }

    /// The row delta of a forward pawn step
    ///
    /// White moves towards row 0 (rank 8), black towards row 7 (rank 1).
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }
}
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "White",
            Color::Black => "Black",
        })
    }
}

/// A piece, along with how many moves it has made
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    /// Incremented each time this piece moves and decremented when that move is undone
    pub move_count: u16,
}
impl Piece {
    /// A piece which hasn't moved yet
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            move_count: 0,
        }
    }

    pub const fn fen_letter(self) -> char {
        match self.color {
            Color::White => self.kind.fen_letter().to_ascii_uppercase(),
            Color::Black => self.kind.fen_letter().to_ascii_lowercase(),
        }
    }

    /// The unmoved piece named by the given FEN letter (uppercase is white)
    pub const fn from_fen_letter(letter: char) -> Option<Self> {
        let color = if letter.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match PieceKind::from_fen_letter(letter) {
            Some(kind) => Some(Self::new(kind, color)),
            None => None,
        }
    }

    pub const fn has_moved(self) -> bool {
        self.move_count > 0
    }
}

/// The state of the game from the point of view of the side to move
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GameStatus {
    /// The side to move has legal moves and isn't in check
    Ongoing,
    /// The side to move is in check but can get out of it
    Check,
    /// The side to move is in check and has no legal moves
    Checkmate,
    /// The side to move isn't in check but has no legal moves
    Stalemate,
}
/// Returns the status as appended to a move in algebraic notation
impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ongoing | Self::Stalemate => "",
            Self::Check => "+",
            Self::Checkmate => "#",
        })
    }
}

/// The possible outcomes of a game
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GameOutcome {
    /// The winner checkmated the other side
    Checkmate { winner: Color },
    /// Draw because the side to move couldn't make any moves
    Stalemate,
    /// The loser gave up
    Resignation { winner: Color },
}
impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkmate { winner } => write!(f, "{winner} wins by checkmate"),
            Self::Stalemate => f.write_str("Draw by stalemate"),
            Self::Resignation { winner } => write!(f, "{winner} wins by resignation"),
        }
    }
}

/// An error parsing a position out of a FEN string
#[derive(Debug, thiserror::Error)]
pub enum FenError {
    #[error("FEN is missing the {0} field")]
    MissingField(&'static str),
    #[error("FEN piece placement must have 8 ranks, found {0}")]
    WrongRankCount(usize),
    #[error("FEN rank {rank} doesn't describe exactly 8 squares")]
    BadRankLength { rank: u8 },
    #[error("unknown piece letter `{0}` in FEN")]
    UnknownPiece(char),
    #[error("invalid side to move `{0}` in FEN")]
    InvalidSideToMove(String),
    #[error("invalid castling field `{0}` in FEN")]
    InvalidCastling(String),
    #[error("invalid en passant field in FEN: {0}")]
    InvalidEnPassant(#[from] PositionParseError),
    #[error("{0} can't be the en passant target in FEN")]
    ImpossibleEnPassant(Position),
}

/// Functionality belonging to all boards that can be made
///
/// This is the whole surface a front end needs: it can query pieces and legal destinations,
/// commit and undo moves, and ask whether the game is over.
pub trait Board: Sized {
    /// An error type that can be returned
    type Err: fmt::Debug + fmt::Display;

    /// Parse a board from the given FEN
    fn from_fen(fen: &str) -> Result<Self, FenError>;

    /// Convert to a FEN string
    fn to_fen(&self) -> String;

    /// Get the state at the start of a chess game
    fn initial_state() -> Self;

    /// The piece on the given square, if any
    fn piece_at(&self, position: Position) -> Option<Piece>;

    /// The piece at the given coordinates, or `None` if they're off the board
    fn get_piece(&self, row: i32, col: i32) -> Option<Piece> {
        Position::checked(row, col).and_then(|position| self.piece_at(position))
    }

    /// The color whose turn it is
    fn side_to_move(&self) -> Color;

    fn is_white_turn(&self) -> bool {
        self.side_to_move().is_white()
    }

    /// Whether the piece on `from` may legally move to `to`
    ///
    /// This doesn't consider whose turn it is, so it can be asked about either side's pieces.
    fn is_valid_move(&self, from: Position, to: Position) -> bool;

    /// All squares the piece on `from` may legally move to
    fn valid_moves(&self, from: Position) -> Vec<Position> {
        Position::all()
            .filter(|&to| self.is_valid_move(from, to))
            .collect()
    }

    /// Make the given move, in place
    ///
    /// Returns `Ok(())` if the move is legal, and `Err(..)` with the reason if it isn't, in which
    /// case the board is unchanged.
    fn try_move(&mut self, from: Position, to: Position) -> Result<(), Self::Err>;

    /// Make the given move if it is legal, returning whether it was made
    fn move_piece(&mut self, from: Position, to: Position) -> bool {
        self.try_move(from, to).is_ok()
    }

    fn make_move(&mut self, mv: CoordinateMove) -> Result<(), Self::Err> {
        self.try_move(mv.from, mv.to)
    }

    /// Make the board after the given sequence of moves
    fn from_move_sequence(moves: impl Iterator<Item = CoordinateMove>) -> Result<Self, Self::Err> {
        let mut state = Self::initial_state();
        for m in moves {
            state.make_move(m)?;
        }
        Ok(state)
    }

    /// Take back the most recent move, returning `false` if there is none
    fn undo_last_move(&mut self) -> bool;

    /// Whether neither the king nor the rook on that side has moved and the squares between them
    /// are empty
    fn can_castle(&self, color: Color, kingside: bool) -> bool;

    fn is_in_check(&self, color: Color) -> bool;

    fn is_checkmate(&self, color: Color) -> bool;

    fn is_stalemate(&self, color: Color) -> bool;

    /// Returns if the side to move is currently in check, checkmate or stalemate
    fn status(&self) -> GameStatus {
        let side = self.side_to_move();
        if self.is_checkmate(side) {
            GameStatus::Checkmate
        } else if self.is_stalemate(side) {
            GameStatus::Stalemate
        } else if self.is_in_check(side) {
            GameStatus::Check
        } else {
            GameStatus::Ongoing
        }
    }

    /// How the game ended, if it has
    fn outcome(&self) -> Option<GameOutcome> {
        match self.status() {
            GameStatus::Checkmate => Some(GameOutcome::Checkmate {
                winner: self.side_to_move().other(),
            }),
            GameStatus::Stalemate => Some(GameOutcome::Stalemate),
            GameStatus::Ongoing | GameStatus::Check => None,
        }
    }
}

/// A square on the board
///
/// Row 0 is rank 8 (black's home row) and row 7 is rank 1, while columns 0 through 7 are files
/// `a` through `h`. Both coordinates are always on the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Position {
    row: u8,
    col: u8,
}
impl Position {
    /// Produce a position from the row and column, returning `None` if they're off the board
    ///
    /// ```
    /// use board::Position;
    /// let e2 = Position::new(6, 4).unwrap();
    /// assert_eq!(e2.to_string(), "e2");
    /// assert!(Position::new(8, 0).is_none());
    /// ```
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Like [`Self::new`], but accepts any integers
    pub fn checked(row: i32, col: i32) -> Option<Self> {
        Self::new(u8::try_from(row).ok()?, u8::try_from(col).ok()?)
    }

    /// Returns if the given coordinates are on the board
    ///
    /// ```
    /// use board::Position;
    /// assert!(Position::is_valid(0, 7));
    /// assert!(!Position::is_valid(-1, 3));
    /// assert!(!Position::is_valid(2, 8));
    /// ```
    pub const fn is_valid(row: i32, col: i32) -> bool {
        0 <= row && row < 8 && 0 <= col && col < 8
    }

    pub const fn row(self) -> u8 {
        self.row
    }

    pub const fn col(self) -> u8 {
        self.col
    }

    /// The rank number, from 1 to 8
    pub const fn rank(self) -> u8 {
        8 - self.row
    }

    /// The file letter, from `a` to `h`
    pub const fn file(self) -> char {
        (b'a' + self.col) as char
    }

    /// Offset the given number of rows and columns, returning `None` if that leaves the board
    ///
    /// ```rust
    /// use board::Position;
    /// let a1: Position = "a1".parse().unwrap();
    /// assert_eq!(a1.offset(-1, 3), Some("d2".parse().unwrap()));
    /// assert_eq!(a1.offset(0, 0), Some(a1));
    /// assert!(a1.offset(1, 0).is_none());
    /// assert!(a1.offset(0, -1).is_none());
    /// ```
    pub const fn offset(self, rows: i8, cols: i8) -> Option<Self> {
        let (Some(row), Some(col)) = (
            (self.row as i8).checked_add(rows),
            (self.col as i8).checked_add(cols),
        ) else {
            return None;
        };
        if row < 0 || col < 0 {
            return None;
        }
        Self::new(row as u8, col as u8)
    }

    /// The signed `(rows, columns)` to get from `self` to `other`
    pub const fn delta_to(self, other: Self) -> (i8, i8) {
        (
            other.row as i8 - self.row as i8,
            other.col as i8 - self.col as i8,
        )
    }

    /// An iterator over all squares on the board, row by row
    ///
    /// ```
    /// assert_eq!(board::Position::all().count(), 64);
    /// ```
    pub fn all() -> impl Iterator<Item = Self> {
        (0..64).map(|idx| Self {
            row: idx >> 3,
            col: idx & 0x07,
        })
    }
}
impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("row", &self.row)
            .field("col", &self.col)
            .field("readable", &format_args!("{self}"))
            .finish()
    }
}
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a board position")]
pub struct PositionParseError(pub String);

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PositionParseError(s.to_string());
        let &[file, rank] = s.as_bytes() else {
            return Err(err());
        };
        let col = match file {
            b'a'..=b'h' => file - b'a',
            _ => return Err(err()),
        };
        let row = match rank {
            b'1'..=b'8' => b'8' - rank,
            _ => return Err(err()),
        };
        Ok(Self { row, col })
    }
}
impl TryFrom<String> for Position {
    type Error = PositionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl From<Position> for String {
    fn from(value: Position) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a move in coordinate notation")]
pub struct CoordinateMoveParseError(pub String);

/// A move given only by its source and target squares
///
/// Written as `e2e4`; `e2-e4`, `e2xd3` and `e2 e4` are accepted when parsing.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinateMove {
    pub from: Position,
    pub to: Position,
}
impl fmt::Display for CoordinateMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}
impl FromStr for CoordinateMove {
    type Err = CoordinateMoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CoordinateMoveParseError(s.to_string());
        let trimmed = s.trim();
        let (from, to) = match trimmed.len() {
            4 => (trimmed.get(..2), trimmed.get(2..)),
            5 => match trimmed.as_bytes()[2] {
                b'-' | b'x' | b' ' => (trimmed.get(..2), trimmed.get(3..)),
                _ => return Err(err()),
            },
            _ => return Err(err()),
        };
        let (Some(from), Some(to)) = (from, to) else {
            return Err(err());
        };
        Ok(Self {
            from: from.parse().map_err(|_| err())?,
            to: to.parse().map_err(|_| err())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_name_round_trip() {
        for position in Position::all() {
            assert_eq!(position, Position::from_str(&position.to_string()).unwrap());
        }
    }

    #[test]
    fn test_position_algebraic_mapping() {
        let a8 = Position::new(0, 0).unwrap();
        assert_eq!(a8.to_string(), "a8");
        let h1 = Position::new(7, 7).unwrap();
        assert_eq!(h1.to_string(), "h1");
        assert_eq!(h1.rank(), 1);
        assert_eq!(h1.file(), 'h');
    }

    #[test]
    fn test_position_rejects_garbage() {
        for bad in ["", "e", "e9", "i1", "e22", "E2", "0a"] {
            assert!(bad.parse::<Position>().is_err(), "{bad} parsed");
        }
    }

    #[test]
    fn test_checked_out_of_range() {
        assert!(Position::checked(-1, 0).is_none());
        assert!(Position::checked(0, 8).is_none());
        assert!(Position::checked(300, 0).is_none());
        assert_eq!(Position::checked(7, 7), Position::new(7, 7));
    }

    #[test]
    fn test_coordinate_move_parsing() {
        #[track_caller]
        fn assert_parses(input: &str, from: &str, to: &str) {
            let mv = CoordinateMove::from_str(input).expect("Couldn't parse move");
            assert_eq!(mv.from.to_string(), from);
            assert_eq!(mv.to.to_string(), to);
        }
        assert_parses("e2e4", "e2", "e4");
        assert_parses("e2-e4", "e2", "e4");
        assert_parses("e5xd6", "e5", "d6");
        assert_parses(" g1 f3 ", "g1", "f3");
        assert!(CoordinateMove::from_str("e2e").is_err());
        assert!(CoordinateMove::from_str("e2+e4").is_err());
        assert!(CoordinateMove::from_str("Nf3").is_err());
    }

    #[test]
    fn test_fen_letters() {
        for kind in PieceKind::KINDS {
            let white = Piece::new(kind, Color::White);
            let black = Piece::new(kind, Color::Black);
            assert_eq!(Piece::from_fen_letter(white.fen_letter()), Some(white));
            assert_eq!(Piece::from_fen_letter(black.fen_letter()), Some(black));
        }
        assert_eq!(Piece::from_fen_letter('x'), None);
    }

    #[test]
    fn test_pawn_directions_point_at_promotion_rows() {
        for color in [Color::White, Color::Black] {
            let steps = color.promotion_row() as i8 - color.pawn_row() as i8;
            assert_eq!(steps.signum(), color.pawn_direction());
            assert_eq!(steps.abs(), 6);
        }
    }
}
