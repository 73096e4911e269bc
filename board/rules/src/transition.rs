use board::Coordinate;

use crate::PieceId;

bitflags::bitflags! {
    /// The rules a move invokes beyond relocating one piece
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u8 {
        const Capture = 0b0000_0001;
        /// The captured pawn stands beside the target rather than on it
        const EnPassant = 0b0000_0010;
        const CastleKingside = 0b0000_0100;
        const CastleQueenside = 0b0000_1000;
        /// A mask for a castle in either direction
        const Castle = 0b0000_1100;
        /// A pawn moving two rows from its starting square
        const DoubleAdvance = 0b0001_0000;
        /// A pawn arriving on the farthest row
        const Promotion = 0b0010_0000;
    }
}

/// A piece leaving the board as part of a move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capture {
    pub piece: PieceId,
    /// Where the captured piece stood, which is not the target square for en passant
    pub square: Coordinate,
}

/// The rook that travels with a castling king
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RookShift {
    pub rook: PieceId,
    pub source: Coordinate,
    pub target: Coordinate,
}

/// Everything a move changes on a [`Position`](crate::Position), figured out in advance
///
/// A transition is built against a specific position, and is only meaningful there: applying it
/// is the forward step, and reverting it afterwards restores that position exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub piece: PieceId,
    pub source: Coordinate,
    pub target: Coordinate,
    pub capture: Option<Capture>,
    pub rook: Option<RookShift>,
    pub flags: MoveFlags,
}
impl Transition {
    /// A plain relocation, with nothing captured and no special rule
    pub const fn quiet(piece: PieceId, source: Coordinate, target: Coordinate) -> Self {
        Self {
            piece,
            source,
            target,
            capture: None,
            rook: None,
            flags: MoveFlags::empty(),
        }
    }

    pub const fn is_capture(&self) -> bool {
        self.flags.contains(MoveFlags::Capture)
    }

    pub const fn is_castle(&self) -> bool {
        self.flags.intersects(MoveFlags::Castle)
    }

    pub const fn is_en_passant(&self) -> bool {
        self.flags.contains(MoveFlags::EnPassant)
    }

    pub const fn is_double_advance(&self) -> bool {
        self.flags.contains(MoveFlags::DoubleAdvance)
    }

    pub const fn is_promotion(&self) -> bool {
        self.flags.contains(MoveFlags::Promotion)
    }
}
