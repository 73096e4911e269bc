//! A player for a human typing in the terminal

use std::io::{self, BufRead, Cursor, Stdin, Stdout, Write};

use board::{AlgebraicCoordinate, CoordinateMove, Grid, Mask, Piece};
use log::error;
use rules::{Error, Match};

/// Draw the board as text, rank 8 at the top
///
/// Empty squares in `highlight` are drawn as `*`, and occupied ones have their letter wrapped in
/// brackets.
pub fn render_board(board: &Grid<Piece>, highlight: Option<&Mask>) -> String {
    let mut text = String::new();
    for square in AlgebraicCoordinate::all_squares() {
        let coordinate = square.to_coordinate();
        if square.file() == 'a' {
            text.push_str(&format!("{} ", square.rank()));
        }
        let marked = highlight.is_some_and(|mask| mask.contains(coordinate));
        let piece = board.occupant(coordinate).ok().flatten();
        match (piece, marked) {
            (Some(piece), true) => text.push_str(&format!("[{}]", piece.fen_letter())),
            (Some(piece), false) => text.push_str(&format!(" {} ", piece.fen_letter())),
            (None, true) => text.push_str(" * "),
            (None, false) => text.push_str(" . "),
        }
        if square.file() == 'h' {
            text.push('\n');
        }
    }
    text.push_str("   a  b  c  d  e  f  g  h\n");
    text
}

/// Somewhere typed lines come from
///
/// Standard input is read through [`Stdin`] itself, which takes its lock for one line at a time,
/// so any number of players can share it.
pub trait LineSource {
    /// Append the next line to `buffer`, returning how many bytes were read, or 0 at the end
    fn read_line(&mut self, buffer: &mut String) -> io::Result<usize>;
}
impl LineSource for Stdin {
    fn read_line(&mut self, buffer: &mut String) -> io::Result<usize> {
        Stdin::read_line(&*self, buffer)
    }
}
impl<T: AsRef<[u8]>> LineSource for Cursor<T> {
    fn read_line(&mut self, buffer: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buffer)
    }
}

/// An input for a human typing in the terminal
///
/// Moves are typed as a pair of squares such as `e2e4`. Typing a single square shows where the
/// piece on it may go, and `quit` (or the end of input) stops playing.
pub struct TerminalUIPlayer<R, W> {
    input: R,
    output: W,
}

impl TerminalUIPlayer<Stdin, Stdout> {
    /// A player reading from standard input and writing to standard output
    pub fn new() -> Self {
        Self::with_io(io::stdin(), io::stdout())
    }
}

impl Default for TerminalUIPlayer<Stdin, Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: LineSource, W: Write> TerminalUIPlayer<R, W> {
    pub fn with_io(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Hand back the input and output, such as to inspect what was written
    pub fn into_io(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Print the prompt, then read one trimmed line, or `None` at the end of input
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut buffer = String::new();
        if self.input.read_line(&mut buffer)? == 0 {
            return Ok(None);
        }
        Ok(Some(buffer.trim().to_string()))
    }

    fn try_choose_move(&mut self, game: &Match) -> io::Result<Option<CoordinateMove>> {
        writeln!(self.output, "{}", render_board(&game.board_snapshot(), None))?;
        if game.is_check() {
            writeln!(self.output, "Check!")?;
        }
        let prompt = format!("{} to move (turn {}): ", game.current_player(), game.turn());
        loop {
            let Some(line) = self.prompt(&prompt)? else {
                return Ok(None);
            };
            if line == "quit" {
                return Ok(None);
            }
            if let Ok(square) = line.parse::<AlgebraicCoordinate>() {
                match game.legal_move_mask(square) {
                    Ok(mask) => {
                        let board = render_board(&game.board_snapshot(), Some(&mask));
                        writeln!(self.output, "{board}")?;
                    }
                    Err(e) => writeln!(self.output, "{e}")?,
                }
                continue;
            }
            match line.parse::<CoordinateMove>() {
                Ok(m) => return Ok(Some(m)),
                Err(e) => writeln!(self.output, "Couldn't read a move: {e}")?,
            }
        }
    }

    fn try_choose_promotion(&mut self) -> io::Result<char> {
        let line = self.prompt("Promote to (Q, R, B, N) [Q]: ")?;
        Ok(line.and_then(|line| line.chars().next()).unwrap_or('Q'))
    }
}

impl<R: LineSource, W: Write> players::Player for TerminalUIPlayer<R, W> {
    fn choose_move(&mut self, game: &Match) -> Option<CoordinateMove> {
        self.try_choose_move(game).unwrap_or_else(|e| {
            error!("Error talking to the terminal: {e}");
            None
        })
    }

    fn choose_promotion(&mut self, _game: &Match) -> char {
        self.try_choose_promotion().unwrap_or_else(|e| {
            error!("Error talking to the terminal: {e}");
            'Q'
        })
    }

    fn reject(&mut self, error: &Error) {
        if let Err(e) = writeln!(self.output, "Illegal move: {error}") {
            error!("Error talking to the terminal: {e}");
        }
    }

    fn react_to_move(&mut self, opponent_move: CoordinateMove, _game: &Match) {
        if let Err(e) = writeln!(self.output, "Opponent made move: {opponent_move}") {
            error!("Error talking to the terminal: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use players::Player;

    fn player(input: &str) -> TerminalUIPlayer<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalUIPlayer::with_io(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(player: TerminalUIPlayer<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(player.into_io().1).unwrap()
    }

    #[test]
    fn test_render_initial_board() {
        let board = render_board(&Match::new().board_snapshot(), None);
        let lines: Vec<_> = board.lines().collect();
        assert_eq!(lines[0], "8  r  n  b  q  k  b  n  r ");
        assert_eq!(lines[4], "4  .  .  .  .  .  .  .  . ");
        assert_eq!(lines[7], "1  R  N  B  Q  K  B  N  R ");
        assert_eq!(lines[8], "   a  b  c  d  e  f  g  h");
    }

    #[test]
    fn test_reads_moves_and_skips_garbage() {
        let game = Match::new();
        let mut player = player("nonsense\ne2 e4\n");
        assert_eq!(player.choose_move(&game), Some("e2e4".parse().unwrap()));
        assert!(output(player).contains("Couldn't read a move"));
    }

    #[test]
    fn test_square_shows_where_it_can_go() {
        let game = Match::new();
        let mut player = player("g1\nquit\n");
        assert_eq!(player.choose_move(&game), None);
        let text = output(player);
        assert!(text.contains("3  .  .  .  .  .  *  .  * "));
        assert!(!text.contains('['));
    }

    #[test]
    fn test_end_of_input_stops() {
        let mut player = player("");
        assert_eq!(player.choose_move(&Match::new()), None);
    }

    #[test]
    fn test_terminal_players_share_stdin() {
        let players = [TerminalUIPlayer::new(), TerminalUIPlayer::default()];
        assert_eq!(players.len(), 2);
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let game = Match::new();
        assert_eq!(player("\n").choose_promotion(&game), 'Q');
        assert_eq!(player("n\n").choose_promotion(&game), 'n');
        assert_eq!(player("").choose_promotion(&game), 'Q');
    }
}
