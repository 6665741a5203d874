use std::{path::PathBuf, process::ExitCode};

use backend::{persistence, Backend};
use board::Board;
use clap::Parser;
use mailbox::MailboxBoard;
use terminal_ui::TerminalUIPlayer;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Play chess against another person at the same terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Carry on with a game saved earlier
    #[arg(long, value_name = "FILE", conflicts_with = "fen")]
    load: Option<PathBuf>,

    /// Start from the given position instead of the usual one
    #[arg(long)]
    fen: Option<String>,

    /// Which log messages to show, as in `RUST_LOG` (overrides it)
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let board = if let Some(path) = &args.load {
        match persistence::load_game(path) {
            Ok(board) => board,
            Err(err) => {
                error!(%err, path = %path.display(), "failed to load game");
                eprintln!("Couldn't load {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        }
    } else if let Some(fen) = &args.fen {
        match MailboxBoard::from_fen(fen) {
            Ok(board) => board,
            Err(err) => {
                error!(%err, fen = %fen, "failed to parse FEN");
                eprintln!("Couldn't read the position: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        MailboxBoard::initial_state()
    };

    let mut backend = Backend::from_board(board, TerminalUIPlayer::new(), TerminalUIPlayer::new());
    backend.play_game();
    ExitCode::SUCCESS
}
