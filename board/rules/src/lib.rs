//! The rules of chess, played out on a grid of arena-indexed pieces
//!
//! A [`Match`] owns everything about one game and only changes through its move protocol: a
//! submitted move is either accepted in full, or rejected with an [`Error`] and no observable
//! change at all.

use core::fmt;

use board::{
    AlgebraicCoordinate, Color, Coordinate, CoordinateMove, Grid, GridError, Mask, Offset, Piece,
    PieceKind, BOARD_SIZE,
};
use log::{debug, error, info, trace};

mod movegen;
mod position;
mod transition;

pub use crate::movegen::{is_attacked, pawn_direction, possible_moves, promotion_row};
pub use crate::position::{PieceId, PieceRecord, Position};
pub use crate::transition::{Capture, MoveFlags, RookShift, Transition};

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("there is no piece at {0}")]
    NoPieceAtSource(AlgebraicCoordinate),
    #[error("the piece at {square} is {owner}, and it is not {owner}'s turn")]
    WrongTurnOwner {
        square: AlgebraicCoordinate,
        owner: Color,
    },
    #[error("the piece at {0} has nowhere to go")]
    NoLegalMoves(AlgebraicCoordinate),
    #[error("the piece at {from} can't move to {to}")]
    IllegalTarget {
        from: AlgebraicCoordinate,
        to: AlgebraicCoordinate,
    },
    #[error("moving from {from} to {to} leaves the king attacked")]
    SelfCheckViolation {
        from: AlgebraicCoordinate,
        to: AlgebraicCoordinate,
    },
    #[error("no pawn is waiting to be promoted")]
    NoPromotionPending,
    #[error("`{0}` is not one of B, N, R or Q")]
    InvalidPromotionChoice(char),
    #[error("a pawn must be promoted before the next move")]
    PromotionPending,
    #[error("the match is over ({0})")]
    MatchOver(MatchStatus),
    #[error("the match was aborted after an internal error")]
    MatchAborted,
    #[error("a layout needs exactly one {color} king, but has {count}")]
    KingCount { color: Color, count: usize },
    #[error("the {0} king is attacked, but it is not {0}'s turn")]
    IdleKingAttacked(Color),
    #[error("invalid layout: {0}")]
    InvalidLayout(GridError),
    #[error("the {0} king is missing from the board")]
    MissingKing(Color),
    #[error("piece {0} should be on the board but isn't")]
    Detached(PieceId),
    #[error("the board no longer matches the piece records: {0}")]
    Corrupted(#[from] GridError),
}
impl Error {
    /// Whether this error means the match is broken, rather than that a request was refused
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MissingKing(_) | Error::Detached(_) | Error::Corrupted(_)
        )
    }
}

/// Where a match stands, from the point of view of the side to move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    InProgress,
    /// The side to move is in check, but can get out of it
    Check,
    Checkmate {
        winner: Color,
    },
    Stalemate,
    /// An internal error ended the match
    Aborted,
}
impl MatchStatus {
    /// Whether no further moves will be accepted
    pub const fn is_over(self) -> bool {
        !matches!(self, MatchStatus::InProgress | MatchStatus::Check)
    }
}
impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::InProgress => f.write_str("in progress"),
            MatchStatus::Check => f.write_str("check"),
            MatchStatus::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            MatchStatus::Stalemate => f.write_str("stalemate"),
            MatchStatus::Aborted => f.write_str("aborted"),
        }
    }
}

/// What an accepted move did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub captured: Option<Piece>,
    /// The moved pawn reached the last row and must be promoted before play continues
    pub promotion_pending: bool,
    pub status: MatchStatus,
}

/// The back rank, from the a-file to the h-file
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// The pieces of a new game, white's first
pub fn standard_layout() -> Vec<(AlgebraicCoordinate, Piece)> {
    let mut layout = Vec::with_capacity(32);
    for (color, back, front) in [(Color::White, 1, 2), (Color::Black, 8, 7)] {
        for (square, kind) in AlgebraicCoordinate::all_squares()
            .filter(|square| square.rank() == back)
            .zip(BACK_RANK)
        {
            layout.push((square, Piece::new(kind, color)));
        }
        for square in AlgebraicCoordinate::all_squares().filter(|square| square.rank() == front) {
            layout.push((square, Piece::new(PieceKind::Pawn, color)));
        }
    }
    layout
}

/// Name a square of the match's grid
fn name(square: Coordinate) -> Result<AlgebraicCoordinate> {
    AlgebraicCoordinate::from_coordinate(square)
        .map_err(|_| Error::Corrupted(GridError::OutOfBounds(square)))
}

/// One game of chess
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    position: Position,
    /// Starts at 1 and counts half-moves that didn't end the game
    turn: u32,
    current_player: Color,
    status: MatchStatus,
    /// The pawn that advanced two rows on the previous half-move
    en_passant_vulnerable: Option<PieceId>,
    /// The pawn on the last row, waiting to be replaced
    promoted: Option<PieceId>,
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl Match {
    /// A match with the pieces where a game of chess starts, white to move
    pub fn new() -> Self {
        Self::from_layout(&standard_layout(), Color::White)
            .expect("the standard layout is a valid layout")
    }

    /// A match starting from the given pieces, which must include exactly one king of each color
    ///
    /// Every piece starts out as if it has never moved. The status of the side to move is
    /// evaluated right away, so a layout may start in check, checkmate or stalemate.
    ///
    /// ```
    /// use board::{Color, Piece, PieceKind};
    /// use rules::{Match, MatchStatus};
    ///
    /// let layout = [
    ///     ("e1".parse().unwrap(), Piece::new(PieceKind::King, Color::White)),
    ///     ("e8".parse().unwrap(), Piece::new(PieceKind::King, Color::Black)),
    ///     ("e4".parse().unwrap(), Piece::new(PieceKind::Rook, Color::Black)),
    /// ];
    /// let game = Match::from_layout(&layout, Color::White).unwrap();
    /// assert_eq!(game.status(), MatchStatus::Check);
    /// ```
    pub fn from_layout(
        placements: &[(AlgebraicCoordinate, Piece)],
        to_move: Color,
    ) -> Result<Self> {
        let mut position =
            Position::new(BOARD_SIZE, BOARD_SIZE).map_err(Error::InvalidLayout)?;
        for (square, piece) in placements {
            position
                .spawn(*piece, square.to_coordinate())
                .map_err(Error::InvalidLayout)?;
        }
        for color in [Color::White, Color::Black] {
            let count = position
                .pieces_of(color)
                .filter(|id| position.record(*id).piece.kind == PieceKind::King)
                .count();
            if count != 1 {
                return Err(Error::KingCount { color, count });
            }
        }
        let mut game = Self {
            position,
            turn: 1,
            current_player: to_move,
            status: MatchStatus::InProgress,
            en_passant_vulnerable: None,
            promoted: None,
        };
        if game.king_attacked(to_move.other())? {
            return Err(Error::IdleKingAttacked(to_move.other()));
        }
        game.status = game.evaluate(to_move)?;
        debug!("Set up a match with {} pieces: {}", placements.len(), game.status);
        Ok(game)
    }

    pub const fn turn(&self) -> u32 {
        self.turn
    }

    pub const fn current_player(&self) -> Color {
        self.current_player
    }

    pub const fn status(&self) -> MatchStatus {
        self.status
    }

    /// Whether the side to move is in check, including when it's checkmated
    pub const fn is_check(&self) -> bool {
        matches!(
            self.status,
            MatchStatus::Check | MatchStatus::Checkmate { .. }
        )
    }

    pub const fn is_checkmate(&self) -> bool {
        matches!(self.status, MatchStatus::Checkmate { .. })
    }

    /// What stands where, for drawing the board
    pub fn board_snapshot(&self) -> Grid<Piece> {
        self.position.snapshot()
    }

    pub fn piece_at(&self, square: AlgebraicCoordinate) -> Option<Piece> {
        self.position
            .piece_at(square.to_coordinate())
            .ok()
            .flatten()
            .map(|id| self.position.record(id).piece)
    }

    /// How many times the piece on the given square has moved
    pub fn move_count(&self, square: AlgebraicCoordinate) -> Option<u32> {
        self.position
            .piece_at(square.to_coordinate())
            .ok()
            .flatten()
            .map(|id| self.position.record(id).move_count)
    }

    /// The captured pieces, in the order they were taken
    pub fn captured_pieces(&self) -> Vec<Piece> {
        self.position
            .captured()
            .map(|id| self.position.record(id).piece)
            .collect()
    }

    /// The pieces still in play and where they stand
    pub fn pieces_on_board(&self) -> Vec<(Coordinate, Piece)> {
        self.position
            .grid()
            .occupied()
            .map(|(square, id)| (square, self.position.record(*id).piece))
            .collect()
    }

    /// The square of the pawn that may be taken en passant on this half-move
    pub fn en_passant_vulnerable(&self) -> Option<AlgebraicCoordinate> {
        self.square_of(self.en_passant_vulnerable?)
    }

    /// The square of the pawn waiting for [`Match::resolve_promotion`]
    pub fn pending_promotion(&self) -> Option<AlgebraicCoordinate> {
        self.square_of(self.promoted?)
    }

    fn square_of(&self, id: PieceId) -> Option<AlgebraicCoordinate> {
        AlgebraicCoordinate::from_coordinate(self.position.record(id).position?).ok()
    }

    /// The squares the piece on `source` may legally move to
    ///
    /// The source is checked the same way a submitted move's is, so an empty square or a piece
    /// of the side not to move is refused. The mask is empty when the match isn't accepting
    /// moves.
    pub fn legal_move_mask(&self, source: AlgebraicCoordinate) -> Result<Mask> {
        let mut mask = Mask::for_grid(self.position.grid());
        let id = self.owned_piece(source)?;
        if self.ensure_accepting_moves().is_err() {
            return Ok(mask);
        }
        let mut scratch = self.clone();
        for transition in scratch.legal_transitions(id)? {
            mask.insert(transition.target);
        }
        Ok(mask)
    }

    /// Every move the side to move may make
    pub fn legal_moves(&self) -> Result<Vec<CoordinateMove>> {
        if self.ensure_accepting_moves().is_err() {
            return Ok(Vec::new());
        }
        let mut scratch = self.clone();
        let mut moves = Vec::new();
        for id in self.position.pieces_of(self.current_player) {
            for transition in scratch.legal_transitions(id)? {
                moves.push(CoordinateMove::new(
                    name(transition.source)?,
                    name(transition.target)?,
                ));
            }
        }
        Ok(moves)
    }

    /// Play the given move for the side to move
    pub fn submit(&mut self, m: CoordinateMove) -> Result<MoveOutcome> {
        self.submit_move(m.source, m.target)
    }

    /// Move the piece on `source` to `target`
    ///
    /// If this fails with a non-fatal error, the match is exactly as it was before the call.
    pub fn submit_move(
        &mut self,
        source: AlgebraicCoordinate,
        target: AlgebraicCoordinate,
    ) -> Result<MoveOutcome> {
        let mover = self.current_player;
        let result = self.try_submit_move(source, target);
        match &result {
            Ok(outcome) => debug!("{mover} played {source}{target}: {}", outcome.status),
            Err(e) => debug!("Rejected {source}{target} for {mover}: {e}"),
        }
        self.abort_on_fatal(result)
    }

    fn try_submit_move(
        &mut self,
        source: AlgebraicCoordinate,
        target: AlgebraicCoordinate,
    ) -> Result<MoveOutcome> {
        self.ensure_accepting_moves()?;
        let id = self.validate_source(source)?;
        let (from, to) = (source.to_coordinate(), target.to_coordinate());

        let transition = if possible_moves(&self.position, id).contains(to) {
            self.plain_transition(id, from, to)?
        } else if let Some(castle) = self.castle_transition(id, from, to)? {
            if !self.castle_is_safe(&castle)? {
                return Err(Error::SelfCheckViolation {
                    from: source,
                    to: target,
                });
            }
            castle
        } else {
            self.en_passant_transition(id, from, to)?
                .ok_or(Error::IllegalTarget {
                    from: source,
                    to: target,
                })?
        };

        self.position.apply(&transition)?;
        if self.king_attacked(self.current_player)? {
            self.position.revert(&transition)?;
            return Err(Error::SelfCheckViolation {
                from: source,
                to: target,
            });
        }
        let captured = transition
            .capture
            .map(|capture| self.position.record(capture.piece).piece);
        if let Some(victim) = captured.filter(|_| transition.is_capture()) {
            let how = if transition.is_en_passant() {
                " en passant"
            } else {
                ""
            };
            debug!("{source}{target} takes the {} {}{how}", victim.color, victim.kind);
        }

        if transition.is_promotion() {
            info!("{} pawn on {target} awaits promotion", self.current_player);
            self.promoted = Some(id);
            self.en_passant_vulnerable = None;
            self.status = MatchStatus::InProgress;
            return Ok(MoveOutcome {
                captured,
                promotion_pending: true,
                status: self.status,
            });
        }
        self.finish_half_move(transition.is_double_advance().then_some(id))?;
        Ok(MoveOutcome {
            captured,
            promotion_pending: false,
            status: self.status,
        })
    }

    /// Replace the pawn waiting on the last row, given the letter of its replacement
    ///
    /// Letters are accepted in either case. An unknown letter leaves the pawn waiting.
    pub fn resolve_promotion(&mut self, code: char) -> Result<PieceKind> {
        self.ensure_promotion_pending()?;
        let kind = PieceKind::from_letter(code)
            .filter(|kind| kind.is_promotable())
            .ok_or(Error::InvalidPromotionChoice(code))?;
        self.resolve_promotion_kind(kind)
    }

    /// Replace the pawn waiting on the last row with a new piece of the given kind
    pub fn resolve_promotion_kind(&mut self, kind: PieceKind) -> Result<PieceKind> {
        let result = self.try_resolve_promotion(kind);
        self.abort_on_fatal(result)
    }

    fn try_resolve_promotion(&mut self, kind: PieceKind) -> Result<PieceKind> {
        let pawn = self.ensure_promotion_pending()?;
        if !kind.is_promotable() {
            return Err(Error::InvalidPromotionChoice(kind.fen_letter()));
        }
        let record = *self.position.record(pawn);
        let square = record.position.ok_or(Error::Detached(pawn))?;
        self.position.retire(pawn)?;
        self.position
            .spawn(Piece::new(kind, record.piece.color), square)?;
        self.promoted = None;
        info!("{} pawn on {} promoted to {kind}", record.piece.color, name(square)?);
        self.finish_half_move(None)?;
        Ok(kind)
    }

    fn ensure_accepting_moves(&self) -> Result<()> {
        match self.status {
            MatchStatus::Aborted => Err(Error::MatchAborted),
            status if status.is_over() => Err(Error::MatchOver(status)),
            _ if self.promoted.is_some() => Err(Error::PromotionPending),
            _ => Ok(()),
        }
    }

    fn ensure_promotion_pending(&self) -> Result<PieceId> {
        if self.status == MatchStatus::Aborted {
            return Err(Error::MatchAborted);
        }
        self.promoted.ok_or(Error::NoPromotionPending)
    }

    fn abort_on_fatal<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_fatal() {
                error!("Aborting match on turn {}: {e}", self.turn);
                self.status = MatchStatus::Aborted;
            }
        }
        result
    }

    /// Check that `source` holds a piece of the side to move which has somewhere to go
    fn validate_source(&self, source: AlgebraicCoordinate) -> Result<PieceId> {
        let id = self.owned_piece(source)?;
        if self.candidate_transitions(id)?.is_empty() {
            return Err(Error::NoLegalMoves(source));
        }
        Ok(id)
    }

    /// The piece on `source`, if it belongs to the side to move
    fn owned_piece(&self, source: AlgebraicCoordinate) -> Result<PieceId> {
        let id = self
            .position
            .piece_at(source.to_coordinate())?
            .ok_or(Error::NoPieceAtSource(source))?;
        let owner = self.position.record(id).piece.color;
        if owner != self.current_player {
            return Err(Error::WrongTurnOwner {
                square: source,
                owner,
            });
        }
        Ok(id)
    }

    /// Settle everything that follows a completed half-move
    fn finish_half_move(&mut self, double_advance: Option<PieceId>) -> Result<()> {
        self.en_passant_vulnerable = double_advance;
        let defender = self.current_player.other();
        self.status = self.evaluate(defender)?;
        match self.status {
            MatchStatus::Checkmate { winner } => {
                info!("Checkmate on turn {}, {winner} wins", self.turn)
            }
            MatchStatus::Stalemate => info!("Stalemate on turn {}", self.turn),
            MatchStatus::Check => info!("{defender} is in check"),
            _ => {}
        }
        if !self.status.is_over() {
            self.turn += 1;
            self.current_player = defender;
        }
        Ok(())
    }

    /// The status of a match where `defender` is about to move
    fn evaluate(&mut self, defender: Color) -> Result<MatchStatus> {
        let check = self.king_attacked(defender)?;
        let escape = self.has_legal_response(defender)?;
        Ok(match (check, escape) {
            (true, true) => MatchStatus::Check,
            (true, false) => MatchStatus::Checkmate {
                winner: defender.other(),
            },
            (false, true) => MatchStatus::InProgress,
            (false, false) => MatchStatus::Stalemate,
        })
    }

    fn king_attacked(&self, color: Color) -> Result<bool> {
        let king = self.position.king(color).ok_or(Error::MissingKing(color))?;
        let square = self
            .position
            .record(king)
            .position
            .ok_or(Error::Detached(king))?;
        Ok(is_attacked(&self.position, square, color.other()))
    }

    /// Whether any piece of the given color has a move which keeps its king safe
    fn has_legal_response(&mut self, color: Color) -> Result<bool> {
        let pieces: Vec<_> = self.position.pieces_of(color).collect();
        for id in pieces {
            for transition in self.candidate_transitions(id)? {
                if self.is_legal(&transition)? {
                    trace!("{color} can answer with {transition:?}");
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn legal_transitions(&mut self, id: PieceId) -> Result<Vec<Transition>> {
        let mut legal = Vec::new();
        for transition in self.candidate_transitions(id)? {
            if self.is_legal(&transition)? {
                legal.push(transition);
            }
        }
        Ok(legal)
    }

    fn is_legal(&mut self, transition: &Transition) -> Result<bool> {
        if transition.is_castle() && !self.castle_is_safe(transition)? {
            return Ok(false);
        }
        self.is_safe(transition)
    }

    /// Try the transition, and report whether the mover's king survives it
    fn is_safe(&mut self, transition: &Transition) -> Result<bool> {
        let color = self.position.record(transition.piece).piece.color;
        self.position.apply(transition)?;
        let safe = !self.king_attacked(color)?;
        self.position.revert(transition)?;
        Ok(safe)
    }

    /// Every move the piece could make, before checking the safety of its king
    fn candidate_transitions(&self, id: PieceId) -> Result<Vec<Transition>> {
        let record = *self.position.record(id);
        let Some(from) = record.position else {
            return Ok(Vec::new());
        };
        let mut candidates = Vec::new();
        for to in possible_moves(&self.position, id).iter() {
            candidates.push(self.plain_transition(id, from, to)?);
        }
        match record.piece.kind {
            PieceKind::King => {
                for columns in [2, -2] {
                    let to = from.offset(Offset::new(0, columns));
                    candidates.extend(self.castle_transition(id, from, to)?);
                }
            }
            PieceKind::Pawn => {
                for side in [-1, 1] {
                    let to = from.offset(Offset::new(pawn_direction(record.piece.color), side));
                    candidates.extend(self.en_passant_transition(id, from, to)?);
                }
            }
            _ => {}
        }
        Ok(candidates)
    }

    /// A move the piece's geometry allows
    fn plain_transition(
        &self,
        id: PieceId,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Transition> {
        let piece = self.position.record(id).piece;
        let mut transition = Transition::quiet(id, from, to);
        if let Some(victim) = self.position.piece_at(to)? {
            transition.capture = Some(Capture {
                piece: victim,
                square: to,
            });
            transition.flags |= MoveFlags::Capture;
        }
        if piece.kind == PieceKind::Pawn {
            if from.offset_to(to).rows.abs() == 2 {
                transition.flags |= MoveFlags::DoubleAdvance;
            }
            if to.row == promotion_row(piece.color, self.position.grid().rows()) {
                transition.flags |= MoveFlags::Promotion;
            }
        }
        Ok(transition)
    }

    /// The castle a king moving from `from` to `to` would make, if nothing stands in its way
    ///
    /// The king and the rook must both be unmoved. Whether the king passes through danger is
    /// left to [`Match::castle_is_safe`].
    fn castle_transition(
        &self,
        id: PieceId,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Option<Transition>> {
        let king = self.position.record(id);
        let offset = from.offset_to(to);
        if king.piece.kind != PieceKind::King
            || king.move_count != 0
            || offset.rows != 0
            || offset.columns.abs() != 2
        {
            return Ok(None);
        }
        let step = offset.columns.signum();
        let (distance, flag) = if step > 0 {
            (3, MoveFlags::CastleKingside)
        } else {
            (4, MoveFlags::CastleQueenside)
        };
        let rook_square = from.offset(Offset::new(0, step * distance));
        let Some(rook) = self.position.grid().occupant(rook_square).ok().flatten().copied() else {
            return Ok(None);
        };
        let rook_record = self.position.record(rook);
        if rook_record.piece != Piece::new(PieceKind::Rook, king.piece.color)
            || rook_record.move_count != 0
        {
            return Ok(None);
        }
        for n in 1..distance {
            if self
                .position
                .grid()
                .has_piece(from.offset(Offset::new(0, step * n)))?
            {
                return Ok(None);
            }
        }
        Ok(Some(Transition {
            rook: Some(RookShift {
                rook,
                source: rook_square,
                target: from.offset(Offset::new(0, step)),
            }),
            flags: flag,
            ..Transition::quiet(id, from, to)
        }))
    }

    /// Whether the king may start a castle: it must not be in check, nor cross an attacked square
    ///
    /// The square the king lands on is covered by the usual test after the move.
    fn castle_is_safe(&mut self, castle: &Transition) -> Result<bool> {
        let color = self.position.record(castle.piece).piece.color;
        if self.king_attacked(color)? {
            return Ok(false);
        }
        let step = castle.source.offset_to(castle.target).columns.signum();
        let transit = castle.source.offset(Offset::new(0, step));
        self.is_safe(&Transition::quiet(castle.piece, castle.source, transit))
    }

    /// The en passant capture a pawn moving from `from` to `to` would make, if one is available
    fn en_passant_transition(
        &self,
        id: PieceId,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Option<Transition>> {
        let pawn = self.position.record(id).piece;
        let offset = from.offset_to(to);
        let grid = self.position.grid();
        if pawn.kind != PieceKind::Pawn
            || offset.rows != pawn_direction(pawn.color)
            || offset.columns.abs() != 1
            || !grid.position_exists(to)
            || grid.has_piece(to)?
        {
            return Ok(None);
        }
        let beside = Coordinate::new(from.row, to.column);
        let Some(victim) = self.position.piece_at(beside)? else {
            return Ok(None);
        };
        if self.en_passant_vulnerable != Some(victim)
            || self.position.record(victim).piece.color == pawn.color
        {
            return Ok(None);
        }
        Ok(Some(Transition {
            capture: Some(Capture {
                piece: victim,
                square: beside,
            }),
            flags: MoveFlags::Capture | MoveFlags::EnPassant,
            ..Transition::quiet(id, from, to)
        }))
    }
}
