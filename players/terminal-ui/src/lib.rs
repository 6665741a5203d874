//! A human player typing commands into the terminal

use std::io::{self, BufRead, BufReader, Cursor, Read, Write};

use board::{Color, CoordinateMove};
use players::{Command, Player};
use tracing::warn;

/// Somewhere lines of typed input come from
pub trait LineSource {
    /// Append the next line to `buf`, returning how many bytes were read (0 at the end)
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

/// Standard input is only locked for the length of each read, so any number of players can share
/// it on one thread without any of them reading ahead of the others
impl LineSource for io::Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        io::Stdin::read_line(self, buf)
    }
}

impl<T: AsRef<[u8]>> LineSource for Cursor<T> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

impl<R: Read> LineSource for BufReader<R> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        LineSource::read_line(&mut **self, buf)
    }
}

/// An input for a human typing in the terminal
///
/// Two of these make a hot-seat game, each prompting on its own side's turn.
pub struct TerminalUIPlayer<R = io::Stdin> {
    input: R,
}

impl TerminalUIPlayer {
    /// Create a new player reading from standard input
    pub fn new() -> Self {
        Self::with_input(io::stdin())
    }
}

impl<R: LineSource> TerminalUIPlayer<R> {
    /// Create a new player reading lines from the given input
    pub const fn with_input(input: R) -> Self {
        Self { input }
    }

    /// Read lines until one parses as a command
    ///
    /// The end of the input, or a failure reading it, is taken as quitting.
    fn read_command(&mut self) -> Command {
        loop {
            let mut buffer = String::new();
            match self.input.read_line(&mut buffer) {
                Ok(0) => return Command::Quit,
                Ok(_) => {}
                Err(err) => {
                    warn!(%err, "error reading human input");
                    return Command::Quit;
                }
            }
            match buffer.parse() {
                Ok(command) => return command,
                Err(err) => {
                    println!("{err}");
                    print!("Try again: ");
                    let _ = io::stdout().flush();
                }
            }
        }
    }
}

impl<R: LineSource> Player for TerminalUIPlayer<R> {
    fn next_command(&mut self, side: Color) -> Command {
        print!("{side} to move (e.g. e2e4, undo, moves e2, save FILE, load FILE, resign, quit): ");
        let _ = io::stdout().flush();
        self.read_command()
    }

    fn react_to_move(&mut self, opponent_move: CoordinateMove) {
        println!("Opponent made move: {opponent_move}");
    }

    fn react_to_error(&mut self, message: &str) {
        println!("{message}");
    }
}

impl Default for TerminalUIPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_reads_commands_and_skips_garbage() {
        let mut player = TerminalUIPlayer::with_input(Cursor::new("e2e4\n\nnonsense\nundo\n"));
        assert_eq!(
            player.next_command(Color::White),
            Command::Move("e2e4".parse().unwrap())
        );
        assert_eq!(player.next_command(Color::Black), Command::Undo);
        assert_eq!(player.next_command(Color::White), Command::Quit);
    }

    #[test]
    fn test_two_players_share_stdin() {
        let white = TerminalUIPlayer::new();
        let black = TerminalUIPlayer::default();
        // Neither player holds standard input between reads
        drop(io::stdin().lock());
        drop((white, black));
    }

    #[test]
    fn test_players_take_turns_on_one_input() {
        let mut input = Cursor::new("e2e4\ne7e5\n");
        let first = TerminalUIPlayer::with_input(&mut input).next_command(Color::White);
        let second = TerminalUIPlayer::with_input(&mut input).next_command(Color::Black);
        assert_eq!(first, Command::Move("e2e4".parse().unwrap()));
        assert_eq!(second, Command::Move("e7e5".parse().unwrap()));
    }

    #[test]
    fn test_end_of_input_quits() {
        let mut player = TerminalUIPlayer::with_input(Cursor::new(""));
        assert_eq!(player.next_command(Color::White), Command::Quit);
    }
}
