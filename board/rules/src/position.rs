//! Pieces stored by stable index, and the grid that refers to them

use core::fmt;
use std::collections::BTreeSet;

use board::{Color, Coordinate, Grid, GridError, Piece, PieceKind};

/// A handle to a piece in a [`Position`]
///
/// Handles are minted by [`Position::spawn`] and never reused, so a captured or promoted piece
/// keeps its handle (and its record) after it leaves the board.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) u16);
impl PieceId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}
impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What we know about one piece
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceRecord {
    pub piece: Piece,
    /// Incremented for every move the piece makes, and decremented when a move is reverted
    pub move_count: u32,
    /// Where the piece stands, or `None` once it left the board
    pub position: Option<Coordinate>,
}

/// A grid of pieces, together with the bookkeeping for which pieces are still in play
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    grid: Grid<PieceId>,
    records: Vec<PieceRecord>,
    on_board: BTreeSet<PieceId>,
    /// In capture order, so reverting a move pops the last one
    captured: Vec<PieceId>,
}

impl Position {
    /// An empty position on a grid of the given size
    pub fn new(rows: u8, columns: u8) -> Result<Self, GridError> {
        Ok(Self {
            grid: Grid::new(rows, columns)?,
            records: Vec::new(),
            on_board: BTreeSet::new(),
            captured: Vec::new(),
        })
    }

    pub const fn grid(&self) -> &Grid<PieceId> {
        &self.grid
    }

    /// The record of the given piece
    ///
    /// # Panics
    /// If the handle came from a different position.
    pub fn record(&self, id: PieceId) -> &PieceRecord {
        &self.records[id.index()]
    }

    fn record_mut(&mut self, id: PieceId) -> &mut PieceRecord {
        &mut self.records[id.index()]
    }

    /// The piece standing on the given square
    pub fn piece_at(&self, square: Coordinate) -> Result<Option<PieceId>, GridError> {
        Ok(self.grid.occupant(square)?.copied())
    }

    /// The color of the piece on the given square
    ///
    /// Returns `None` for an empty square and for a square off the grid.
    pub fn color_at(&self, square: Coordinate) -> Option<Color> {
        self.grid
            .occupant(square)
            .ok()
            .flatten()
            .map(|id| self.record(*id).piece.color)
    }

    /// The pieces currently on the board, in the order they were created
    pub fn on_board(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.on_board.iter().copied()
    }

    /// The pieces of one color currently on the board
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = PieceId> + '_ {
        self.on_board()
            .filter(move |id| self.record(*id).piece.color == color)
    }

    /// The pieces captured so far, oldest first
    pub fn captured(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.captured.iter().copied()
    }

    /// The king of the given color, if it's on the board
    pub fn king(&self, color: Color) -> Option<PieceId> {
        self.pieces_of(color)
            .find(|id| self.record(*id).piece.kind == PieceKind::King)
    }

    /// Create a new piece on an empty square
    pub fn spawn(&mut self, piece: Piece, square: Coordinate) -> Result<PieceId, GridError> {
        let id = PieceId(self.records.len() as u16);
        self.grid.place(id, square)?;
        self.records.push(PieceRecord {
            piece,
            move_count: 0,
            position: Some(square),
        });
        self.on_board.insert(id);
        Ok(id)
    }

    /// Take a piece off the board for good, without counting it as captured
    ///
    /// The record stays behind so the handle remains valid.
    pub fn retire(&mut self, id: PieceId) -> Result<(), GridError> {
        if let Some(square) = self.record(id).position {
            self.grid.remove(square)?;
        }
        self.record_mut(id).position = None;
        self.on_board.remove(&id);
        Ok(())
    }

    /// Lift a piece off its square and set it down on another
    fn relocate(&mut self, id: PieceId, from: Coordinate, to: Coordinate) -> Result<(), GridError> {
        debug_assert_eq!(self.piece_at(from), Ok(Some(id)));
        self.grid.remove(from)?;
        self.grid.place(id, to)?;
        self.record_mut(id).position = Some(to);
        Ok(())
    }

    /// Perform the transition
    ///
    /// The transition must have been built against this exact position. An error means the
    /// bookkeeping no longer agrees with the grid, and the position should be discarded.
    pub fn apply(&mut self, transition: &crate::Transition) -> Result<(), GridError> {
        if let Some(capture) = transition.capture {
            self.grid.remove(capture.square)?;
            self.record_mut(capture.piece).position = None;
            self.on_board.remove(&capture.piece);
            self.captured.push(capture.piece);
        }
        self.relocate(transition.piece, transition.source, transition.target)?;
        self.record_mut(transition.piece).move_count += 1;
        if let Some(shift) = transition.rook {
            self.relocate(shift.rook, shift.source, shift.target)?;
            self.record_mut(shift.rook).move_count += 1;
        }
        Ok(())
    }

    /// Undo a transition applied with [`Position::apply`]
    ///
    /// Each step of `apply` is reversed in the opposite order, so the position afterwards is equal
    /// to the one the transition was applied to.
    pub fn revert(&mut self, transition: &crate::Transition) -> Result<(), GridError> {
        if let Some(shift) = transition.rook {
            self.record_mut(shift.rook).move_count -= 1;
            self.relocate(shift.rook, shift.target, shift.source)?;
        }
        self.record_mut(transition.piece).move_count -= 1;
        self.relocate(transition.piece, transition.target, transition.source)?;
        if let Some(capture) = transition.capture {
            let restored = self.captured.pop();
            debug_assert_eq!(restored, Some(capture.piece));
            self.grid.place(capture.piece, capture.square)?;
            self.record_mut(capture.piece).position = Some(capture.square);
            self.on_board.insert(capture.piece);
        }
        Ok(())
    }

    /// What stands where, without the bookkeeping
    pub fn snapshot(&self) -> Grid<Piece> {
        self.grid.map(|id| self.record(*id).piece)
    }
}
