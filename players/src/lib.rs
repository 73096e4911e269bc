//! Traits for an arbitrary player

use std::collections::VecDeque;

use board::CoordinateMove;
use log::debug;
use rules::{Error, Match};

/// A player in a game
///
/// This trait is generic over how the players decides what to do, so terminal and scripted
/// players can both implement this. The match itself is owned by whoever drives the game, and
/// players only get to look at it.
pub trait Player {
    /// Decide on a move to make, or `None` to stop playing
    fn choose_move(&mut self, game: &Match) -> Option<CoordinateMove>;

    /// Pick the letter of the piece a pawn on the last row turns into
    fn choose_promotion(&mut self, _game: &Match) -> char {
        'Q'
    }

    /// Hear that the last move or promotion choice was refused
    ///
    /// The player is asked again afterwards.
    fn reject(&mut self, error: &Error) {
        debug!("Player's choice was refused: {error}");
    }

    /// React to the opponent making the given move
    fn react_to_move(&mut self, _opponent_move: CoordinateMove, _game: &Match) {}
}

/// A player which plays a fixed list of moves, then stops
#[derive(Clone, Debug, Default)]
pub struct ScriptedPlayer {
    moves: VecDeque<CoordinateMove>,
    promotions: VecDeque<char>,
    rejections: Vec<Error>,
}

impl ScriptedPlayer {
    pub fn new(moves: impl IntoIterator<Item = CoordinateMove>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Answer promotions with these letters, in order, and with `Q` once they run out
    pub fn with_promotions(mut self, promotions: impl IntoIterator<Item = char>) -> Self {
        self.promotions = promotions.into_iter().collect();
        self
    }

    /// The moves not played yet
    pub fn remaining(&self) -> usize {
        self.moves.len()
    }

    /// Every refusal this player has heard, oldest first
    pub fn rejections(&self) -> &[Error] {
        &self.rejections
    }
}

impl Player for ScriptedPlayer {
    fn choose_move(&mut self, _game: &Match) -> Option<CoordinateMove> {
        self.moves.pop_front()
    }

    fn choose_promotion(&mut self, _game: &Match) -> char {
        self.promotions.pop_front().unwrap_or('Q')
    }

    fn reject(&mut self, error: &Error) {
        debug!("Scripted choice was refused: {error}");
        self.rejections.push(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_player_runs_out() {
        let game = Match::new();
        let e2e4: CoordinateMove = "e2e4".parse().unwrap();
        let mut player = ScriptedPlayer::new([e2e4]).with_promotions(['n']);
        assert_eq!(player.remaining(), 1);
        assert_eq!(player.choose_move(&game), Some(e2e4));
        assert_eq!(player.choose_move(&game), None);
        assert_eq!(player.choose_promotion(&game), 'n');
        assert_eq!(player.choose_promotion(&game), 'Q');
        player.reject(&Error::NoPromotionPending);
        assert_eq!(player.rejections(), [Error::NoPromotionPending]);
    }
}
