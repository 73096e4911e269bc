use core::fmt;

use board::{Color, CoordinateMove};
use log::{debug, info};
use players::Player;
use rules::{Match, MatchStatus};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("opening move {mv} was refused: {error}")]
    Opening { mv: CoordinateMove, error: rules::Error },
    #[error("the match broke down: {0}")]
    Match(#[from] rules::Error),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// How a game came to an end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEnd {
    /// The match reached checkmate or stalemate
    Finished(MatchStatus),
    /// The player of the given color stopped choosing moves
    Abandoned(Color),
}
impl fmt::Display for GameEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEnd::Finished(status) => write!(f, "game over: {status}"),
            GameEnd::Abandoned(color) => write!(f, "{color} stopped playing"),
        }
    }
}

/// A backend which queries moves from the two players until the game is done
pub struct Backend<White, Black> {
    /// The current state of the game
    game: Match,
    /// The white player
    white_player: White,
    /// The black player
    black_player: Black,
}

impl<White: Player, Black: Player> Backend<White, Black> {
    /// Create a new instance with the chess starting board
    pub fn new(white_player: White, black_player: Black) -> Self {
        Self {
            game: Match::new(),
            white_player,
            black_player,
        }
    }

    /// Play the given moves before asking the players for anything
    ///
    /// A pawn promoted during the opening becomes a queen.
    pub fn with_opening(mut self, moves: &[CoordinateMove]) -> Result<Self> {
        for &mv in moves {
            let outcome = self
                .game
                .submit(mv)
                .map_err(|error| Error::Opening { mv, error })?;
            if outcome.promotion_pending {
                self.game.resolve_promotion('Q')?;
            }
        }
        debug!("Played {} opening moves", moves.len());
        Ok(self)
    }

    /// Query whoever's turn it is to make a move
    ///
    /// Refused moves are reported back to the player, who is asked again. This updates the game
    /// state and also informs the other player that the move was made. Returns how the game
    /// ended, if this half-move ended it.
    pub fn play_half_move(&mut self) -> Result<Option<GameEnd>> {
        let mover = self.game.current_player();
        let (game, player, opponent): (&mut Match, &mut dyn Player, &mut dyn Player) = match mover
        {
            Color::White => (&mut self.game, &mut self.white_player, &mut self.black_player),
            Color::Black => (&mut self.game, &mut self.black_player, &mut self.white_player),
        };

        let mv = loop {
            let Some(mv) = player.choose_move(game) else {
                info!("{mover} stopped playing");
                return Ok(Some(GameEnd::Abandoned(mover)));
            };
            match game.submit(mv) {
                Ok(outcome) if outcome.promotion_pending => {
                    resolve_promotion(game, player)?;
                    break mv;
                }
                Ok(_) => break mv,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => player.reject(&e),
            }
        };
        opponent.react_to_move(mv, game);

        let status = game.status();
        Ok(status.is_over().then_some(GameEnd::Finished(status)))
    }

    /// Play the game until it ends
    pub fn play_game(&mut self) -> Result<GameEnd> {
        loop {
            let status = self.game.status();
            if status.is_over() {
                return Ok(GameEnd::Finished(status));
            }
            if let Some(end) = self.play_half_move()? {
                info!("{end}");
                return Ok(end);
            }
        }
    }

    /// Get the state of the game right now
    pub const fn game(&self) -> &Match {
        &self.game
    }

    pub const fn white_player(&self) -> &White {
        &self.white_player
    }

    pub const fn black_player(&self) -> &Black {
        &self.black_player
    }
}

/// Keep asking the player until the waiting pawn is promoted
fn resolve_promotion(game: &mut Match, player: &mut dyn Player) -> Result<()> {
    loop {
        let code = player.choose_promotion(game);
        match game.resolve_promotion(code) {
            Ok(kind) => {
                debug!("Pawn promoted to {kind}");
                return Ok(());
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => player.reject(&e),
        }
    }
}

impl<White: Player + Default, Black: Player + Default> Default for Backend<White, Black> {
    fn default() -> Self {
        Self::new(White::default(), Black::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Stdin, Stdout};

    use board::{Piece, PieceKind};
    use players::ScriptedPlayer;
    use terminal_ui::TerminalUIPlayer;

    fn script(moves: &str) -> ScriptedPlayer {
        ScriptedPlayer::new(moves.split_whitespace().map(|m| m.parse().unwrap()))
    }

    #[test]
    fn test_fools_mate() {
        let mut backend = Backend::new(script("f2f3 g2g4 a2a3"), script("e7e5 d8h4"));
        assert_eq!(
            backend.play_game().unwrap(),
            GameEnd::Finished(MatchStatus::Checkmate {
                winner: Color::Black
            })
        );
        assert_eq!(backend.game().turn(), 4);
        assert_eq!(backend.white_player().remaining(), 1);
        assert_eq!(backend.black_player().remaining(), 0);
    }

    #[test]
    fn test_refused_moves_are_retried() {
        let mut backend = Backend::new(script("e2e5 e7e5 e2e4"), script(""));
        assert_eq!(
            backend.play_game().unwrap(),
            GameEnd::Abandoned(Color::Black)
        );
        assert_eq!(backend.white_player().rejections().len(), 2);
        assert_eq!(backend.game().turn(), 2);
    }

    #[test]
    fn test_promotion_asks_the_player() {
        let opening: Vec<CoordinateMove> = "a2a4 b7b5 a4b5 a7a6 b5a6 c8b7 a6b7 b8c6"
            .split_whitespace()
            .map(|m| m.parse().unwrap())
            .collect();
        let mut backend = Backend::new(
            script("b7a8").with_promotions(['K', 'r']),
            ScriptedPlayer::default(),
        )
        .with_opening(&opening)
        .unwrap();
        assert_eq!(backend.play_half_move().unwrap(), None);
        assert_eq!(
            backend.game().piece_at("a8".parse().unwrap()),
            Some(Piece::new(PieceKind::Rook, Color::White))
        );
        assert_eq!(
            backend.white_player().rejections(),
            [rules::Error::InvalidPromotionChoice('K')]
        );
        assert_eq!(backend.game().current_player(), Color::Black);
    }

    #[test]
    fn test_two_terminal_players() {
        type Terminal = TerminalUIPlayer<Stdin, Stdout>;
        let backend: Backend<Terminal, Terminal> = Backend::default();
        assert_eq!(backend.game().turn(), 1);
        let backend = Backend::new(TerminalUIPlayer::new(), TerminalUIPlayer::new());
        assert_eq!(backend.game().current_player(), Color::White);
    }

    #[test]
    fn test_bad_opening() {
        let result = Backend::new(script(""), script(""))
            .with_opening(&["e2e5".parse().unwrap()]);
        assert!(matches!(result, Err(Error::Opening { .. })));
    }
}
