//! Ways of naming a cell on a grid

use core::{fmt, str::FromStr};

/// The number of ranks and files on a chess board
pub const BOARD_SIZE: u8 = 8;

/// A zero-based `(row, column)` pair
///
/// A coordinate does not know which grid it belongs to, and may lie outside of every grid. Move
/// generation relies on this: it steps off the edge freely and then asks the grid whether the
/// result exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub row: i8,
    pub column: i8,
}
impl Coordinate {
    pub const fn new(row: i8, column: i8) -> Self {
        Self { row, column }
    }

    /// Step by the given offset
    ///
    /// This saturates instead of overflowing, which still lands outside of any supported grid.
    ///
    /// ```
    /// use board::{Coordinate, Offset};
    /// assert_eq!(Coordinate::new(3, 4).offset(Offset::new(-1, 2)), Coordinate::new(2, 6));
    /// ```
    pub const fn offset(self, offset: Offset) -> Self {
        Self {
            row: self.row.saturating_add(offset.rows),
            column: self.column.saturating_add(offset.columns),
        }
    }

    /// The offset which carries `self` onto `other`
    pub const fn offset_to(self, other: Self) -> Offset {
        Offset {
            rows: other.row.saturating_sub(self.row),
            columns: other.column.saturating_sub(self.column),
        }
    }
}
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// A displacement between two coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    pub rows: i8,
    pub columns: i8,
}
impl Offset {
    /// The offsets corresponding to all possible knight moves
    pub const KNIGHT_MOVES: [Offset; 8] = [
        Self::new(2, 1),
        Self::new(2, -1),
        Self::new(-2, 1),
        Self::new(-2, -1),
        Self::new(1, 2),
        Self::new(1, -2),
        Self::new(-1, 2),
        Self::new(-1, -2),
    ];

    /// The offsets corresponding to all possible king moves
    pub const KING_MOVES: [Offset; 8] = [
        Self::new(1, 1),
        Self::new(1, 0),
        Self::new(1, -1),
        Self::new(0, 1),
        Self::new(0, -1),
        Self::new(-1, 1),
        Self::new(-1, 0),
        Self::new(-1, -1),
    ];

    /// The directions a rook slides in
    pub const ORTHOGONAL: [Offset; 4] = [
        Self::new(1, 0),
        Self::new(-1, 0),
        Self::new(0, 1),
        Self::new(0, -1),
    ];

    /// The directions a bishop slides in
    pub const DIAGONAL: [Offset; 4] = [
        Self::new(1, 1),
        Self::new(1, -1),
        Self::new(-1, 1),
        Self::new(-1, -1),
    ];

    pub const fn new(rows: i8, columns: i8) -> Self {
        Self { rows, columns }
    }

    /// Gets the Chebyshev distance for this offset
    ///
    /// This is the number of cells moved in one direction, for whichever direction is larger.
    pub const fn chebyshev_distance(self) -> u8 {
        let rows = self.rows.unsigned_abs();
        let columns = self.columns.unsigned_abs();
        if rows > columns {
            rows
        } else {
            columns
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    #[error("file `{0}` is not between `a` and `h`")]
    InvalidFile(char),
    #[error("rank {0} is not between 1 and 8")]
    InvalidRank(u8),
    #[error("`{0}` is not a square name such as `e4`")]
    Malformed(String),
    #[error("coordinate {0} is not on the board")]
    OffBoard(Coordinate),
}

/// A square named the way players name it: a file letter followed by a rank number
///
/// Only the 8x8 chess board is addressable this way. Rank 8 is row 0, so white's pieces start in
/// the rows with the largest indices.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlgebraicCoordinate {
    file: char,
    rank: u8,
}
impl AlgebraicCoordinate {
    /// Name a square, checking that it is on the board
    pub fn new(file: char, rank: u8) -> Result<Self, CoordinateError> {
        if !matches!(file, 'a'..='h') {
            return Err(CoordinateError::InvalidFile(file));
        }
        if rank < 1 || rank > BOARD_SIZE {
            return Err(CoordinateError::InvalidRank(rank));
        }
        Ok(Self { file, rank })
    }

    pub const fn file(self) -> char {
        self.file
    }

    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// The grid coordinate of this square
    ///
    /// ```
    /// use board::{AlgebraicCoordinate, Coordinate};
    /// let a8 = AlgebraicCoordinate::new('a', 8).unwrap();
    /// assert_eq!(a8.to_coordinate(), Coordinate::new(0, 0));
    /// let h1 = AlgebraicCoordinate::new('h', 1).unwrap();
    /// assert_eq!(h1.to_coordinate(), Coordinate::new(7, 7));
    /// ```
    pub const fn to_coordinate(self) -> Coordinate {
        Coordinate {
            row: (BOARD_SIZE - self.rank) as i8,
            column: (self.file as u8 - b'a') as i8,
        }
    }

    /// The name of the given grid coordinate, if it lies on the chess board
    pub fn from_coordinate(coordinate: Coordinate) -> Result<Self, CoordinateError> {
        let size = BOARD_SIZE as i8;
        if !(0..size).contains(&coordinate.row) || !(0..size).contains(&coordinate.column) {
            return Err(CoordinateError::OffBoard(coordinate));
        }
        Ok(Self {
            file: char::from(b'a' + coordinate.column as u8),
            rank: BOARD_SIZE - coordinate.row as u8,
        })
    }

    /// An iterator over all squares on the board, from a8 to h1
    ///
    /// ```
    /// assert_eq!(board::AlgebraicCoordinate::all_squares().count(), 64);
    /// ```
    pub fn all_squares() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).flat_map(|row| {
            (0..BOARD_SIZE).map(move |column| Self {
                file: char::from(b'a' + column),
                rank: BOARD_SIZE - row,
            })
        })
    }
}
impl TryFrom<Coordinate> for AlgebraicCoordinate {
    type Error = CoordinateError;

    fn try_from(value: Coordinate) -> Result<Self, Self::Error> {
        Self::from_coordinate(value)
    }
}
impl From<AlgebraicCoordinate> for Coordinate {
    fn from(value: AlgebraicCoordinate) -> Self {
        value.to_coordinate()
    }
}
impl fmt::Debug for AlgebraicCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgebraicCoordinate")
            .field("readable", &format_args!("{self}"))
            .field("coordinate", &self.to_coordinate())
            .finish()
    }
}
impl fmt::Display for AlgebraicCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file, self.rank)
    }
}
impl FromStr for AlgebraicCoordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(CoordinateError::Malformed(s.to_string()));
        };
        let Some(rank) = rank.to_digit(10) else {
            return Err(CoordinateError::Malformed(s.to_string()));
        };
        Self::new(file, rank as u8)
    }
}
