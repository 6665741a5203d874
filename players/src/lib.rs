//! Traits for an arbitrary player

use std::{collections::VecDeque, path::PathBuf, str::FromStr};

use board::{Color, CoordinateMove, Position, PositionParseError};

/// Something a player asks the game to do on their turn
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Move the piece on one square to another
    Move(CoordinateMove),
    /// Take back the last move
    Undo,
    /// List where the piece on the given square may go
    ShowMoves(Position),
    /// Write the game to a file
    Save(PathBuf),
    /// Replace the game with the one in a file
    Load(PathBuf),
    /// Give up, handing the other side the win
    Resign,
    /// Stop playing without a result
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("no command given")]
    Empty,
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    BadSquare(#[from] PositionParseError),
    #[error("`{0}` is neither a move nor a known command")]
    Unknown(String),
}

/// Parses what a person would type: a move like `e2e4`, `e2 e4` or `e2-e4`, or one of `undo`,
/// `moves <square>`, `save <file>`, `load <file>`, `resign` and `quit`
impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CommandParseError::Empty);
        }
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (trimmed, ""),
        };
        let argument = |name| {
            if rest.is_empty() {
                Err(CommandParseError::MissingArgument(name))
            } else {
                Ok(rest)
            }
        };
        match word.to_ascii_lowercase().as_str() {
            "undo" => Ok(Self::Undo),
            "resign" => Ok(Self::Resign),
            "quit" | "exit" => Ok(Self::Quit),
            "moves" => Ok(Self::ShowMoves(argument("moves")?.parse()?)),
            "save" => Ok(Self::Save(argument("save")?.into())),
            "load" => Ok(Self::Load(argument("load")?.into())),
            _ => trimmed
                .parse()
                .map(Self::Move)
                .map_err(|_| CommandParseError::Unknown(trimmed.to_string())),
        }
    }
}

/// A player in a game
///
/// This trait is generic over how the player decides what to do, so a person at a terminal and a
/// scripted test player can both implement this.
pub trait Player {
    /// Decide what to do on `side`'s turn
    ///
    /// This is asked again after a command that doesn't end the turn, such as an illegal move or
    /// listing moves.
    fn next_command(&mut self, side: Color) -> Command;

    /// React to the opponent making the given move
    fn react_to_move(&mut self, _opponent_move: CoordinateMove) {}

    /// Be told why the last command couldn't be carried out
    fn react_to_error(&mut self, _message: &str) {}
}

/// A player which gives a fixed list of commands, then quits
#[derive(Clone, Debug, Default)]
pub struct ScriptedPlayer {
    commands: VecDeque<Command>,
    errors: Vec<String>,
}

impl ScriptedPlayer {
    pub fn new(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
            errors: Vec::new(),
        }
    }

    /// Parse each line as a command
    pub fn from_lines<'a>(
        lines: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, CommandParseError> {
        let commands = lines
            .into_iter()
            .map(str::parse::<Command>)
            .collect::<Result<Vec<Command>, _>>()?;
        Ok(Self::new(commands))
    }

    /// The error messages this player has been shown, oldest first
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl Player for ScriptedPlayer {
    fn next_command(&mut self, _side: Color) -> Command {
        self.commands.pop_front().unwrap_or(Command::Quit)
    }

    fn react_to_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
