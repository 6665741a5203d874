use board::{Board, Color, GameOutcome, GameStatus};
use mailbox::MailboxBoard;
use players::{Command, Player};
use tracing::{info, warn};

pub mod persistence;

/// What came of one player's turn
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TurnResult {
    /// The board changed and it may be the other side's turn now
    Played,
    /// The game ended, with no result if the player quit
    Finished(Option<GameOutcome>),
}

/// A backend which queries commands from the two players until the game is done
pub struct Backend<White, Black> {
    /// The current state of the board
    gamestate: MailboxBoard,
    /// The white player
    white_player: White,
    /// The black player
    black_player: Black,
}

impl<White: Player, Black: Player> Backend<White, Black> {
    /// Create a new instance with the chess starting board
    pub fn new(white_player: White, black_player: Black) -> Self {
        Self::from_board(MailboxBoard::initial_state(), white_player, black_player)
    }

    /// Create a new instance carrying on from the given board
    pub const fn from_board(gamestate: MailboxBoard, white_player: White, black_player: Black) -> Self {
        Self {
            gamestate,
            white_player,
            black_player,
        }
    }

    fn player(&mut self, color: Color) -> &mut dyn Player {
        match color {
            Color::White => &mut self.white_player,
            Color::Black => &mut self.black_player,
        }
    }

    /// Query whoever's turn it is until they do something that changes the board or ends the game
    ///
    /// A legal move is passed on to the other player.
    pub fn play_turn(&mut self) -> TurnResult {
        let side = self.gamestate.side_to_move();
        loop {
            match self.player(side).next_command(side) {
                Command::Move(mv) => match self.gamestate.commit(mv.from, mv.to) {
                    Ok(record) => {
                        println!("{side} played {record}{}", self.gamestate.status());
                        self.player(side.other()).react_to_move(mv);
                        return TurnResult::Played;
                    }
                    Err(err) => self.player(side).react_to_error(&format!("Illegal move: {err}")),
                },
                Command::Undo => match self.gamestate.pop_move() {
                    Some(record) => {
                        println!("Took back {record}");
                        return TurnResult::Played;
                    }
                    None => self.player(side).react_to_error("There are no moves to take back"),
                },
                Command::ShowMoves(from) => {
                    let destinations = self.gamestate.valid_moves(from);
                    let message = if destinations.is_empty() {
                        format!("The piece on {from} has no legal moves")
                    } else {
                        let names: Vec<String> =
                            destinations.iter().map(ToString::to_string).collect();
                        format!("{from} can move to {}", names.join(" "))
                    };
                    println!("{message}");
                }
                Command::Save(path) => match persistence::save_game(&self.gamestate, &path) {
                    Ok(()) => println!("Saved game to {}", path.display()),
                    Err(err) => {
                        warn!(%err, path = %path.display(), "failed to save game");
                        self.player(side).react_to_error(&format!("Couldn't save: {err}"));
                    }
                },
                Command::Load(path) => match persistence::load_game(&path) {
                    Ok(board) => {
                        self.gamestate = board;
                        println!("Loaded game from {}", path.display());
                        return TurnResult::Played;
                    }
                    Err(err) => {
                        warn!(%err, path = %path.display(), "failed to load game");
                        self.player(side).react_to_error(&format!("Couldn't load: {err}"));
                    }
                },
                Command::Resign => {
                    return TurnResult::Finished(Some(GameOutcome::Resignation {
                        winner: side.other(),
                    }));
                }
                Command::Quit => return TurnResult::Finished(None),
            }
        }
    }

    /// Play the game until it ends, returning the result if there was one
    pub fn play_game(&mut self) -> Option<GameOutcome> {
        let outcome = loop {
            println!("\n{}", self.gamestate);
            if let Some(outcome) = self.gamestate.outcome() {
                break Some(outcome);
            }
            if self.gamestate.status() == GameStatus::Check {
                println!("{} is in check", self.gamestate.side_to_move());
            }
            if let TurnResult::Finished(outcome) = self.play_turn() {
                break outcome;
            }
        };
        match outcome {
            Some(outcome) => {
                println!("{outcome}");
                info!(%outcome, moves = self.gamestate.history().len(), "game over");
            }
            None => info!(moves = self.gamestate.history().len(), "game abandoned"),
        }
        outcome
    }

    /// Get the state of the game right now
    pub const fn game_state(&self) -> &MailboxBoard {
        &self.gamestate
    }

    pub fn into_players(self) -> (White, Black) {
        (self.white_player, self.black_player)
    }
}
