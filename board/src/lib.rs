use core::{fmt, str::FromStr};

mod coordinate;
mod grid;

pub use crate::coordinate::{
    AlgebraicCoordinate, Coordinate, CoordinateError, Offset, BOARD_SIZE,
};
pub use crate::grid::{Grid, GridError, Mask};

/// The types of pieces there are
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
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

    /// The kind named by the given letter, in either case
    ///
    /// ```
    /// use board::PieceKind;
    /// assert_eq!(PieceKind::from_letter('n'), Some(PieceKind::Knight));
    /// assert_eq!(PieceKind::from_letter('X'), None);
    /// ```
    pub const fn from_letter(letter: char) -> Option<Self> {
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

    /// Whether a pawn can promote into this kind of piece
    pub const fn is_promotable(self) -> bool {
        match self {
            PieceKind::Pawn | PieceKind::King => false,
            PieceKind::Rook | PieceKind::Queen | PieceKind::Knight | PieceKind::Bishop => true,
        }
    }

    /// Whether this piece moves along rays until something blocks it
    pub const fn is_sliding(self) -> bool {
        matches!(self, PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen)
    }
}
impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pawn => "pawn",
            Self::Rook => "rook",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Queen => "queen",
            Self::King => "king",
        })
    }
}

/// The colors a piece can have
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
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
}
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "white",
            Color::Black => "black",
        })
    }
}

/// A piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}
impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    pub const fn fen_letter(self) -> char {
        match self.color {
            Color::White => self.kind.fen_letter().to_ascii_uppercase(),
            Color::Black => self.kind.fen_letter().to_ascii_lowercase(),
        }
    }
}
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

/// A move named by its source and target squares, such as `e2e4`
///
/// This is the only notation we understand: the squares must be spelled out, optionally separated
/// by whitespace or a hyphen.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CoordinateMove {
    pub source: AlgebraicCoordinate,
    pub target: AlgebraicCoordinate,
}
impl CoordinateMove {
    pub const fn new(source: AlgebraicCoordinate, target: AlgebraicCoordinate) -> Self {
        Self { source, target }
    }
}
impl fmt::Display for CoordinateMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.source, self.target)
    }
}
impl FromStr for CoordinateMove {
    type Err = CoordinateError;

    /// ```
    /// use board::CoordinateMove;
    /// let mv: CoordinateMove = "e2 e4".parse().unwrap();
    /// assert_eq!(mv, "e2-e4".parse().unwrap());
    /// assert_eq!(mv.to_string(), "e2e4");
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squares: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if squares.len() != 4 || !squares.is_ascii() {
            return Err(CoordinateError::Malformed(s.to_string()));
        }
        Ok(Self {
            source: squares[..2].parse()?,
            target: squares[2..].parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_letters_match_color() {
        for kind in PieceKind::KINDS {
            let white = Piece::new(kind, Color::White).fen_letter();
            let black = Piece::new(kind, Color::Black).fen_letter();
            assert!(white.is_ascii_uppercase());
            assert_eq!(white.to_ascii_lowercase(), black);
            assert_eq!(PieceKind::from_letter(black), Some(kind));
        }
    }

    #[test]
    fn test_only_four_kinds_promotable() {
        let promotable: Vec<_> = PieceKind::KINDS
            .into_iter()
            .filter(|kind| kind.is_promotable())
            .collect();
        assert_eq!(
            promotable,
            [
                PieceKind::Rook,
                PieceKind::Knight,
                PieceKind::Bishop,
                PieceKind::Queen
            ]
        );
    }

    #[test]
    fn test_coordinate_move_rejects_garbage() {
        assert!("e2".parse::<CoordinateMove>().is_err());
        assert!("e2e9".parse::<CoordinateMove>().is_err());
        assert!("i2e4".parse::<CoordinateMove>().is_err());
        assert!("e2e4e5".parse::<CoordinateMove>().is_err());
        assert!("é2e4".parse::<CoordinateMove>().is_err());
    }
}
