//! Where each kind of piece may go, judged by geometry alone
//!
//! Nothing in here knows whose turn it is or whether a king ends up in check: those are the
//! match's business. Castling and en passant are also left out, because they depend on the
//! history of the game rather than on the board.

use board::{Color, Coordinate, Mask, Offset, PieceKind};

use crate::{PieceId, Position};

/// The row step a pawn of the given color advances by
pub const fn pawn_direction(color: Color) -> i8 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}

/// The row a pawn of the given color promotes on
pub const fn promotion_row(color: Color, rows: u8) -> i8 {
    match color {
        Color::White => 0,
        Color::Black => rows as i8 - 1,
    }
}

/// The squares the given piece could move to, ignoring the safety of its own king
///
/// A piece that is not on the board can't move anywhere.
pub fn possible_moves(position: &Position, id: PieceId) -> Mask {
    let record = position.record(id);
    let mut mask = Mask::for_grid(position.grid());
    let Some(origin) = record.position else {
        return mask;
    };
    let color = record.piece.color;
    match record.piece.kind {
        PieceKind::King => step_moves(position, origin, color, &Offset::KING_MOVES, &mut mask),
        PieceKind::Knight => step_moves(position, origin, color, &Offset::KNIGHT_MOVES, &mut mask),
        PieceKind::Bishop => ray_moves(position, origin, color, &Offset::DIAGONAL, &mut mask),
        PieceKind::Rook => ray_moves(position, origin, color, &Offset::ORTHOGONAL, &mut mask),
        PieceKind::Queen => {
            ray_moves(position, origin, color, &Offset::DIAGONAL, &mut mask);
            ray_moves(position, origin, color, &Offset::ORTHOGONAL, &mut mask);
        }
        PieceKind::Pawn => pawn_moves(position, origin, color, record.move_count, &mut mask),
    }
    mask
}

/// Whether any piece of the given color could move onto the square
///
/// Pawns only count as attacking a square when there is something on it to capture, so this is
/// only a faithful attack test for occupied squares such as the one a king stands on.
pub fn is_attacked(position: &Position, square: Coordinate, by: Color) -> bool {
    position
        .pieces_of(by)
        .any(|id| possible_moves(position, id).contains(square))
}

/// Mark each square one offset away that is empty or holds an opponent
fn step_moves(
    position: &Position,
    origin: Coordinate,
    color: Color,
    offsets: &[Offset],
    mask: &mut Mask,
) {
    for offset in offsets {
        let square = origin.offset(*offset);
        if position.grid().position_exists(square) && position.color_at(square) != Some(color) {
            mask.insert(square);
        }
    }
}

/// Walk outward in each direction until something is in the way
///
/// The blocking square is reachable only if an opponent stands on it.
fn ray_moves(
    position: &Position,
    origin: Coordinate,
    color: Color,
    directions: &[Offset],
    mask: &mut Mask,
) {
    for direction in directions {
        let mut square = origin.offset(*direction);
        while position.grid().position_exists(square) {
            match position.color_at(square) {
                None => {
                    mask.insert(square);
                }
                Some(occupant) => {
                    if occupant != color {
                        mask.insert(square);
                    }
                    break;
                }
            }
            square = square.offset(*direction);
        }
    }
}

fn pawn_moves(
    position: &Position,
    origin: Coordinate,
    color: Color,
    move_count: u32,
    mask: &mut Mask,
) {
    let forward = pawn_direction(color);
    let grid = position.grid();
    let is_empty =
        |square: Coordinate| grid.position_exists(square) && grid.has_piece(square) == Ok(false);

    let one_step = origin.offset(Offset::new(forward, 0));
    if is_empty(one_step) {
        mask.insert(one_step);
        let two_steps = one_step.offset(Offset::new(forward, 0));
        if move_count == 0 && is_empty(two_steps) {
            mask.insert(two_steps);
        }
    }
    for side in [-1, 1] {
        let diagonal = origin.offset(Offset::new(forward, side));
        if position
            .color_at(diagonal)
            .is_some_and(|occupant| occupant != color)
        {
            mask.insert(diagonal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use board::{AlgebraicCoordinate, Piece};
    use quickcheck::{quickcheck, Arbitrary, Gen};

    fn sq(name: &str) -> Coordinate {
        name.parse::<AlgebraicCoordinate>().unwrap().to_coordinate()
    }

    fn setup(pieces: &[(&str, PieceKind, Color)]) -> (Position, Vec<PieceId>) {
        let mut position = Position::new(8, 8).unwrap();
        let ids = pieces
            .iter()
            .map(|(square, kind, color)| {
                position
                    .spawn(Piece::new(*kind, *color), sq(square))
                    .unwrap()
            })
            .collect();
        (position, ids)
    }

    fn squares(mask: &Mask) -> Vec<String> {
        let mut names: Vec<_> = mask
            .iter()
            .map(|c| AlgebraicCoordinate::from_coordinate(c).unwrap().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_knight_in_corner() {
        let (position, ids) = setup(&[("a1", PieceKind::Knight, Color::White)]);
        assert_eq!(squares(&possible_moves(&position, ids[0])), ["b3", "c2"]);
    }

    #[test]
    fn test_king_skips_friends_and_takes_enemies() {
        let (position, ids) = setup(&[
            ("e1", PieceKind::King, Color::White),
            ("d1", PieceKind::Queen, Color::White),
            ("e2", PieceKind::Pawn, Color::Black),
        ]);
        assert_eq!(
            squares(&possible_moves(&position, ids[0])),
            ["d2", "e2", "f1", "f2"]
        );
    }

    #[test]
    fn test_rook_rays_stop_at_first_piece() {
        let (position, ids) = setup(&[
            ("d4", PieceKind::Rook, Color::White),
            ("d6", PieceKind::Pawn, Color::White),
            ("f4", PieceKind::Knight, Color::Black),
            ("h4", PieceKind::Queen, Color::Black),
        ]);
        assert_eq!(
            squares(&possible_moves(&position, ids[0])),
            ["a4", "b4", "c4", "d1", "d2", "d3", "d5", "e4", "f4"]
        );
    }

    #[test]
    fn test_bishop_diagonals() {
        let (position, ids) = setup(&[
            ("c1", PieceKind::Bishop, Color::Black),
            ("e3", PieceKind::Pawn, Color::Black),
            ("a3", PieceKind::Pawn, Color::White),
        ]);
        assert_eq!(
            squares(&possible_moves(&position, ids[0])),
            ["a3", "b2", "d2"]
        );
    }

    #[test]
    fn test_queen_is_rook_plus_bishop() {
        let layout = [
            ("d4", PieceKind::Queen, Color::White),
            ("f6", PieceKind::Pawn, Color::Black),
            ("d2", PieceKind::Bishop, Color::White),
        ];
        let (position, ids) = setup(&layout);
        let mut expected = Mask::for_grid(position.grid());
        for kind in [PieceKind::Rook, PieceKind::Bishop] {
            let mut layout = layout;
            layout[0].1 = kind;
            let (position, ids) = setup(&layout);
            expected.union_with(&possible_moves(&position, ids[0]));
        }
        assert_eq!(possible_moves(&position, ids[0]), expected);
        assert_eq!(expected.count(), 23);
    }

    #[test]
    fn test_pawn_double_step_needs_clear_path_and_no_moves() {
        let (mut position, ids) = setup(&[
            ("e2", PieceKind::Pawn, Color::White),
            ("d7", PieceKind::Pawn, Color::Black),
            ("d6", PieceKind::Knight, Color::White),
        ]);
        assert_eq!(squares(&possible_moves(&position, ids[0])), ["e3", "e4"]);
        // Blocked directly in front, so neither step is offered
        assert!(!possible_moves(&position, ids[1]).any());

        let step = crate::Transition::quiet(ids[0], sq("e2"), sq("e3"));
        position.apply(&step).unwrap();
        assert_eq!(squares(&possible_moves(&position, ids[0])), ["e4"]);
    }

    #[test]
    fn test_pawn_double_step_blocked_on_far_square() {
        let (position, ids) = setup(&[
            ("b7", PieceKind::Pawn, Color::Black),
            ("b5", PieceKind::Pawn, Color::White),
        ]);
        assert_eq!(squares(&possible_moves(&position, ids[0])), ["b6"]);
    }

    #[test]
    fn test_pawn_captures_only_diagonally_forward() {
        let (position, ids) = setup(&[
            ("d5", PieceKind::Pawn, Color::Black),
            ("c4", PieceKind::Knight, Color::White),
            ("e4", PieceKind::Knight, Color::Black),
            ("d4", PieceKind::Rook, Color::White),
            ("c6", PieceKind::Rook, Color::White),
        ]);
        assert_eq!(squares(&possible_moves(&position, ids[0])), ["c4"]);
    }

    #[test]
    fn test_pawn_on_last_row_stays_on_board() {
        let (position, ids) = setup(&[("a8", PieceKind::Pawn, Color::White)]);
        assert!(!possible_moves(&position, ids[0]).any());
    }

    #[test]
    fn test_attack_detection() {
        let (position, _) = setup(&[
            ("e8", PieceKind::King, Color::Black),
            ("e1", PieceKind::Rook, Color::White),
            ("a3", PieceKind::Bishop, Color::White),
            ("d7", PieceKind::Pawn, Color::Black),
        ]);
        assert!(position.color_at(sq("e8")).is_some());
        assert!(is_attacked(&position, sq("e8"), Color::White));
        assert!(!is_attacked(&position, sq("d7"), Color::White));
        assert!(!is_attacked(&position, sq("e1"), Color::Black));
    }

    /// A handful of pieces scattered over a board
    #[derive(Clone, Debug)]
    struct Scatter(Vec<(i8, i8, PieceKind, Color)>);

    impl Arbitrary for Scatter {
        fn arbitrary(g: &mut Gen) -> Self {
            let count = usize::arbitrary(g) % 24;
            Self(
                (0..count)
                    .map(|_| {
                        (
                            (u8::arbitrary(g) % 8) as i8,
                            (u8::arbitrary(g) % 8) as i8,
                            *g.choose(&PieceKind::KINDS).unwrap(),
                            if bool::arbitrary(g) {
                                Color::White
                            } else {
                                Color::Black
                            },
                        )
                    })
                    .collect(),
            )
        }
    }

    impl Scatter {
        fn build(&self) -> Position {
            let mut position = Position::new(8, 8).unwrap();
            for (row, column, kind, color) in &self.0 {
                // Repeated squares keep their first piece
                let _ = position.spawn(Piece::new(*kind, *color), Coordinate::new(*row, *column));
            }
            position
        }
    }

    quickcheck! {
        fn prop_moves_never_land_on_friends(scatter: Scatter) -> bool {
            let position = scatter.build();
            let result = position.on_board().all(|id| {
                let color = position.record(id).piece.color;
                possible_moves(&position, id)
                    .iter()
                    .all(|square| {
                        position.grid().position_exists(square)
                            && position.color_at(square) != Some(color)
                    })
            });
            result
        }

        fn prop_sliders_stop_at_first_piece(scatter: Scatter) -> bool {
            let position = scatter.build();
            let result = position.on_board().filter(|id| position.record(*id).piece.kind.is_sliding()).all(|id| {
                let record = position.record(id);
                let origin = record.position.unwrap();
                let mask = possible_moves(&position, id);
                let result = mask.iter().all(|square| {
                    let offset = origin.offset_to(square);
                    let distance = offset.chebyshev_distance() as i8;
                    let step = Offset::new(offset.rows / distance, offset.columns / distance);
                    // Every square strictly between the piece and its target must be empty
                    (1..distance).all(|n| {
                        let between = origin.offset(Offset::new(step.rows * n, step.columns * n));
                        position.color_at(between).is_none()
                    })
                });
                result
            });
            result
        }
    }
}
