//! Board primitives commonly used within [`crate::chess`].

use std::{fmt, mem};

use anyhow::bail;
use strum_macros::EnumIter;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Represents a column (vertical row) of the chessboard. In chess notation, it
/// is normally represented with a lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", (b'a' + *self as u8) as char)
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file {
            'a'..='h' => Ok(unsafe { mem::transmute::<u8, Self>(file as u8 - b'a') }),
            _ => bail!("unknown file: expected within 'a'..='h', got '{file}'"),
        }
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;

    fn try_from(column: u8) -> anyhow::Result<Self> {
        match column {
            0..=7 => Ok(unsafe { mem::transmute::<u8, Self>(column) }),
            _ => bail!("unknown file: expected within 0..BOARD_WIDTH, got {column}"),
        }
    }
}

/// Represents a horizontal row of the chessboard. Zero-based: rank 1 is 0.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(unsafe { mem::transmute::<u8, Self>(rank as u8 - b'1') }),
            _ => bail!("unknown rank: expected within '1'..='8', got '{rank}'"),
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;

    fn try_from(row: u8) -> anyhow::Result<Self> {
        match row {
            0..=7 => Ok(unsafe { mem::transmute::<u8, Self>(row) }),
            _ => bail!("unknown rank: expected within 0..BOARD_WIDTH, got {row}"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// Board squares, indexed from `A1 = 0` to `H8 = 63`, left to right then
/// bottom to top, matching `rank 0 = White's first rank`.
///
/// ```
/// use caissa::chess::core::Square;
///
/// assert_eq!(Square::A1 as u8, 0);
/// assert_eq!(Square::E1 as u8, 4);
/// assert_eq!(Square::H1 as u8, 7);
/// assert_eq!(Square::A4 as u8, 8 * 3);
/// assert_eq!(Square::H8 as u8, 63);
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

/// Directions used by [`Square::shift`], named by compass point from White's
/// point of view (North = toward rank 8).
#[derive(Copy, Clone, Debug)]
#[allow(missing_docs)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub fn new(file: File, rank: Rank) -> Self {
        unsafe { mem::transmute::<u8, Self>(file as u8 + (rank as u8) * BOARD_WIDTH) }
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub fn file(self) -> File {
        unsafe { mem::transmute::<u8, File>(self as u8 % BOARD_WIDTH) }
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub fn rank(self) -> Rank {
        unsafe { mem::transmute::<u8, Rank>(self as u8 / BOARD_WIDTH) }
    }

    /// Moves one square in `direction`, returning `None` if that would leave
    /// the board.
    #[must_use]
    pub fn shift(self, direction: Direction) -> Option<Self> {
        match direction {
            Direction::East | Direction::NorthEast | Direction::SouthEast => {
                if self.file() == File::H {
                    return None;
                }
            },
            Direction::West | Direction::NorthWest | Direction::SouthWest => {
                if self.file() == File::A {
                    return None;
                }
            },
            Direction::North | Direction::South => (),
        }
        let shift: i8 = match direction {
            Direction::North => BOARD_WIDTH as i8,
            Direction::South => -(BOARD_WIDTH as i8),
            Direction::East => 1,
            Direction::West => -1,
            Direction::NorthEast => BOARD_WIDTH as i8 + 1,
            Direction::NorthWest => BOARD_WIDTH as i8 - 1,
            Direction::SouthEast => -(BOARD_WIDTH as i8 - 1),
            Direction::SouthWest => -(BOARD_WIDTH as i8 + 1),
        };
        let candidate = self as i8 + shift;
        if !(0..BOARD_SIZE as i8).contains(&candidate) {
            return None;
        }
        Self::try_from(candidate as u8).ok()
    }

    /// Iterates over all 64 squares, `A1` first.
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).map(|index| Self::try_from(index).expect("index is within board bounds"))
    }
}

impl TryFrom<u8> for Square {
    type Error = anyhow::Error;

    /// Creates a square given its position on the board.
    ///
    /// # Errors
    ///
    /// If given square index is outside 0..[`BOARD_SIZE`] range.
    fn try_from(square_index: u8) -> anyhow::Result<Self> {
        const MAX_INDEX: u8 = BOARD_SIZE - 1;
        match square_index {
            0..=MAX_INDEX => Ok(unsafe { mem::transmute::<u8, Self>(square_index) }),
            _ => bail!("unknown square index: needs to be in 0..BOARD_SIZE, got {square_index}"),
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        let bytes = square.as_bytes();
        if bytes.len() != 2 {
            bail!(
                "unknown square: should be two-char, got {square} with {} chars",
                bytes.len()
            );
        }
        let (file, rank) = (bytes[0] as char, bytes[1] as char);
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Returns the other player.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl TryFrom<&str> for Color {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("unknown player: expected 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// Standard [chess pieces](https://en.wikipedia.org/wiki/Chess_piece).
#[allow(missing_docs)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Material value in centipawns, per `spec.md` §4.4. The king is
    /// uncounted (`0`) since it is never traded.
    #[must_use]
    pub fn material_value(self) -> i32 {
        match self {
            Self::Pawn => 100,
            Self::Knight => 320,
            Self::Bishop => 330,
            Self::Rook => 500,
            Self::Queen => 900,
            Self::King => 0,
        }
    }
}

/// A piece owned by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    #[allow(missing_docs)]
    pub owner: Color,
    #[allow(missing_docs)]
    pub kind: PieceKind,
}

impl Piece {
    /// Algebraic notation symbol used in FEN. Uppercase for white, lowercase
    /// for black.
    #[must_use]
    pub fn algebraic_symbol(&self) -> char {
        let result = match self.kind {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        };
        match self.owner {
            Color::White => result.to_ascii_uppercase(),
            Color::Black => result,
        }
    }
}

impl TryFrom<char> for Piece {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        let owner = if symbol.is_ascii_uppercase() { Color::White } else { Color::Black };
        let kind = match symbol.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => bail!("unknown piece symbol: expected within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        Ok(Self { owner, kind })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.algebraic_symbol())
    }
}

bitflags::bitflags! {
    /// Tracks the ability to [castle](https://www.chessprogramming.org/Castling)
    /// on each side, for both players, in a single byte. When the king moves
    /// both rights for that color are lost; when a rook moves (or is
    /// captured) from its home square, only the matching side's right is
    /// lost.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CastlingRights: u8 {
        #[allow(missing_docs)]
        const WHITE_SHORT = 0b0001;
        #[allow(missing_docs)]
        const WHITE_LONG  = 0b0010;
        #[allow(missing_docs)]
        const BLACK_SHORT = 0b0100;
        #[allow(missing_docs)]
        const BLACK_LONG  = 0b1000;
    }
}

impl CastlingRights {
    /// Renders castling rights using the FEN `KQkq`/`-` convention.
    #[must_use]
    pub fn fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut result = String::with_capacity(4);
        if self.contains(Self::WHITE_SHORT) {
            result.push('K');
        }
        if self.contains(Self::WHITE_LONG) {
            result.push('Q');
        }
        if self.contains(Self::BLACK_SHORT) {
            result.push('k');
        }
        if self.contains(Self::BLACK_LONG) {
            result.push('q');
        }
        result
    }

    /// Parses the FEN castling-rights field (`KQkq` subset, or `-`).
    ///
    /// # Errors
    ///
    /// Returns an error if an unexpected character is present.
    pub fn from_fen(fen: &str) -> anyhow::Result<Self> {
        if fen == "-" {
            return Ok(Self::empty());
        }
        let mut result = Self::empty();
        for ch in fen.chars() {
            result |= match ch {
                'K' => Self::WHITE_SHORT,
                'Q' => Self::WHITE_LONG,
                'k' => Self::BLACK_SHORT,
                'q' => Self::BLACK_LONG,
                _ => bail!("unknown castling rights symbol: '{ch}' in '{fen}'"),
            };
        }
        Ok(result)
    }

    /// The two rights lost when `color` castles or moves its king.
    #[must_use]
    pub fn both(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_SHORT | Self::WHITE_LONG,
            Color::Black => Self::BLACK_SHORT | Self::BLACK_LONG,
        }
    }
}

/// Distinguishes the kinds of moves the legality/apply logic must special-case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MoveFlag {
    Normal,
    DoublePush,
    EnPassant,
    CastleShort,
    CastleLong,
}

/// A single chess move: `{from, to, promote, flag}`, per `spec.md` §3.
/// Equality is structural on all four fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    #[allow(missing_docs)]
    pub from: Square,
    #[allow(missing_docs)]
    pub to: Square,
    #[allow(missing_docs)]
    pub promote: Option<PieceKind>,
    #[allow(missing_docs)]
    pub flag: MoveFlag,
}

impl Move {
    /// A plain (non-special) move between two squares.
    #[must_use]
    pub fn quiet(from: Square, to: Square) -> Self {
        Self { from, to, promote: None, flag: MoveFlag::Normal }
    }

    /// Renders the move in UCI move text:
    /// `<from-file><from-rank><to-file><to-rank>[promotion]`.
    #[must_use]
    pub fn to_uci(self) -> String {
        let mut result = format!("{}{}", self.from, self.to);
        if let Some(promote) = self.promote {
            let symbol = match promote {
                PieceKind::Queen => 'q',
                PieceKind::Rook => 'r',
                PieceKind::Bishop => 'b',
                PieceKind::Knight => 'n',
                _ => unreachable!("only Q/R/B/N promotions are constructed"),
            };
            result.push(symbol);
        }
        result
    }

    /// Parses UCI move text. This does not validate legality: it only parses
    /// syntax and leaves `flag` as [`MoveFlag::Normal`]; the move generator
    /// is responsible for matching this against an actual legal move to
    /// recover the real flag (castling, en-passant, double push).
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid UCI move syntax.
    pub fn from_uci(text: &str) -> anyhow::Result<Self> {
        if text.len() < 4 || text.len() > 5 {
            bail!("unknown move: expected 4 or 5 characters, got '{text}'");
        }
        let from = Square::try_from(&text[0..2])?;
        let to = Square::try_from(&text[2..4])?;
        let promote = match text.as_bytes().get(4) {
            None => None,
            Some(b'q') => Some(PieceKind::Queen),
            Some(b'r') => Some(PieceKind::Rook),
            Some(b'b') => Some(PieceKind::Bishop),
            Some(b'n') => Some(PieceKind::Knight),
            Some(other) => bail!("unknown promotion piece: '{}'", *other as char),
        };
        Ok(Self { from, to, promote, flag: MoveFlag::Normal })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{
        CastlingRights, Direction, File, Move, MoveFlag, PieceKind, Rank, Square, BOARD_SIZE,
        BOARD_WIDTH,
    };

    #[test]
    fn rank() {
        assert_eq!(
            ('1'..='9').filter_map(|ch| Rank::try_from(ch).ok()).collect::<Vec<Rank>>(),
            vec![
                Rank::One,
                Rank::Two,
                Rank::Three,
                Rank::Four,
                Rank::Five,
                Rank::Six,
                Rank::Seven,
                Rank::Eight,
            ]
        );
    }

    #[test]
    #[should_panic(expected = "unknown rank")]
    fn rank_from_incorrect_char() {
        let _ = Rank::try_from('9').unwrap();
    }

    #[test]
    #[should_panic(expected = "unknown file")]
    fn file_from_incorrect_index() {
        let _ = File::try_from(BOARD_WIDTH).unwrap();
    }

    #[test]
    fn square() {
        let squares: Vec<_> =
            [0u8, BOARD_SIZE - 1, BOARD_WIDTH - 1, BOARD_WIDTH, BOARD_WIDTH * 2 + 5, BOARD_SIZE]
                .iter()
                .filter_map(|square| Square::try_from(*square).ok())
                .collect();
        assert_eq!(squares, vec![Square::A1, Square::H8, Square::H1, Square::A2, Square::F3]);
    }

    #[test]
    #[should_panic(expected = "unknown square index")]
    fn square_from_incorrect_index() {
        let _ = Square::try_from(BOARD_SIZE).unwrap();
    }

    #[test]
    fn within_board_shift() {
        let square = Square::E4;
        assert_eq!(square.shift(Direction::West), Some(Square::D4));
        assert_eq!(square.shift(Direction::North), Some(Square::E5));
        assert_eq!(square.shift(Direction::NorthEast), Some(Square::F5));
        assert_eq!(square.shift(Direction::NorthWest), Some(Square::D5));
        assert_eq!(square.shift(Direction::East), Some(Square::F4));
        assert_eq!(square.shift(Direction::South), Some(Square::E3));
        assert_eq!(square.shift(Direction::SouthEast), Some(Square::F3));
        assert_eq!(square.shift(Direction::SouthWest), Some(Square::D3));
    }

    #[test]
    fn corner_squares_shift() {
        let square = Square::A1;
        assert_eq!(square.shift(Direction::North), Some(Square::A2));
        assert_eq!(square.shift(Direction::NorthEast), Some(Square::B2));
        assert_eq!(square.shift(Direction::East), Some(Square::B1));
        for direction in [
            Direction::West,
            Direction::NorthWest,
            Direction::South,
            Direction::SouthEast,
            Direction::SouthWest,
        ] {
            assert_eq!(square.shift(direction), None);
        }

        let square = Square::H8;
        assert_eq!(square.shift(Direction::West), Some(Square::G8));
        assert_eq!(square.shift(Direction::South), Some(Square::H7));
        assert_eq!(square.shift(Direction::SouthWest), Some(Square::G7));
        for direction in [
            Direction::North,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::East,
            Direction::SouthEast,
        ] {
            assert_eq!(square.shift(direction), None);
        }
    }

    #[test]
    fn castling_rights_fen_roundtrip() {
        assert_eq!(CastlingRights::from_fen("-").unwrap().fen(), "-");
        assert_eq!(CastlingRights::from_fen("KQkq").unwrap().fen(), "KQkq");
        assert_eq!(CastlingRights::from_fen("Kq").unwrap().fen(), "Kq");
    }

    #[test]
    fn move_uci_roundtrip() {
        let mv = Move::from_uci("e2e4").unwrap();
        assert_eq!(mv.to_uci(), "e2e4");
        let promotion = Move {
            from: Square::E7,
            to: Square::E8,
            promote: Some(PieceKind::Queen),
            flag: MoveFlag::Normal,
        };
        assert_eq!(promotion.to_uci(), "e7e8q");
    }

    #[test]
    fn move_from_uci_rejects_garbage() {
        assert!(Move::from_uci("e2").is_err());
        assert!(Move::from_uci("z9z9").is_err());
    }
}
