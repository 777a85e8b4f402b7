use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use crate::magic_bitboard::initialize_magic_bitboards;
use crate::uci::UciInterface;

mod bench;
mod bitboard;
mod board;
mod eval_params;
mod evaluate;
mod magic_bitboard;
mod move_generator;
mod moves;
mod perft;
mod search;
mod time_management;
mod transposition_table;
mod uci;
mod zobrist;

pub static STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn main() {
    // Stdout carries the UCI conversation, so logs go to stderr
    if let Err(e) = TermLogger::init(LevelFilter::Info, Config::default(), TerminalMode::Stderr, ColorChoice::Never) {
        eprintln!("Failed to initialize logging: {e}");
    }

    initialize_magic_bitboards();

    let (message_rx, stop_rx) = UciInterface::process_stdin_uci();
    let mut uci = UciInterface::new(stop_rx);

    while let Ok(cmds) = message_rx.recv() {
        if uci.process_command(cmds) {
            break;
        }
    }
}
