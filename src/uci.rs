use std::io;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Instant;

use log::{debug, error};
use vampirc_uci::{parse_with_unknown, UciFen, UciMessage, UciMove, UciPiece};

use crate::bench::bench;
use crate::board::Board;
use crate::perft::{perft, perft_divide, run_perft};
use crate::search::Searcher;
use crate::time_management::limits_from_go;

pub struct UciInterface {
    board: Board,
    searcher: Searcher,
    debug_mode: bool,
}

impl UciInterface {
    pub fn new(stop_rx: Receiver<()>) -> UciInterface {
        UciInterface {
            board: Board::startpos(),
            searcher: Searcher::new(stop_rx),
            debug_mode: false,
        }
    }

    /// Dispatches one line's worth of parsed messages. Returns true on quit.
    pub fn process_command(&mut self, cmds: (String, Vec<UciMessage>)) -> bool {
        debug!("Received UCI cmd string (trimmed) '{}'", cmds.0.trim());
        for message in cmds.1 {
            match message {
                UciMessage::Uci => {
                    println!("id name Marten Chess {}", env!("CARGO_PKG_VERSION"));
                    println!("id author the Marten Chess developers");
                    println!("option name Hash type spin default 128 min 1 max 16384");
                    println!("option name Clear Hash type button");
                    println!("uciok");
                }
                UciMessage::IsReady => {
                    println!("readyok");
                }
                UciMessage::Debug(on) => {
                    self.debug_mode = on;
                }
                UciMessage::UciNewGame => {
                    self.board = Board::startpos();
                    self.searcher.new_game();
                }
                UciMessage::Position { startpos, fen, moves } => {
                    self.set_position(startpos, fen, &moves);
                }
                UciMessage::Go {
                    time_control,
                    search_control,
                } => {
                    let limits = limits_from_go(&time_control, &search_control, &self.board);

                    // Search a copy so an abort can never leave the game
                    // state torn
                    let mut search_board = self.board.clone();
                    let best =
                        self.searcher
                            .think(&mut search_board, limits.soft_ms, limits.hard_ms, limits.depth, limits.nodes);
                    println!("bestmove {}", best.to_uci());
                }
                // Stop is forwarded on a separate channel by the reader
                // thread so it reaches a running search
                UciMessage::Stop => {}
                UciMessage::Quit => {
                    return true;
                }
                UciMessage::SetOption { name, value } => {
                    self.set_option(&name, value);
                }
                UciMessage::Unknown(message, err) => {
                    self.handle_unknown(message.trim(), format!("{err:?}"));
                }
                _ => {
                    error!("Unhandled UCI cmd in (trimmed) '{}'", cmds.0.trim());
                }
            }
        }

        false
    }

    fn set_position(&mut self, startpos: bool, fen: Option<UciFen>, moves: &[UciMove]) {
        if startpos {
            self.board = Board::startpos();
        } else if let Some(fen) = fen {
            match Board::from_fen(&fen.0) {
                Ok(board) => self.board = board,
                Err(err_msg) => {
                    error!("Failed to parse FEN from UCI. Error message: {err_msg}. FEN: {}", fen.0);
                    return;
                }
            }
        }

        for m in moves {
            let uci = uci_move_string(m);
            match self.board.parse_uci_move(&uci) {
                Some(parsed) => {
                    self.board.make_move(parsed);
                }
                None => {
                    error!("Move '{uci}' is not legal in the current position, ignoring the rest");
                    break;
                }
            }
        }
    }

    fn set_option(&mut self, name: &str, value: Option<String>) {
        match name.to_ascii_lowercase().as_str() {
            "hash" => {
                let Some(value) = value else {
                    error!("Expected a value for option Hash");
                    return;
                };
                match value.parse::<usize>() {
                    Ok(size_mb) => {
                        let size_mb = size_mb.clamp(1, 16384);
                        self.searcher.set_hash_size(size_mb);
                        if self.debug_mode {
                            println!("info string Hash set to {size_mb} MB");
                        }
                    }
                    Err(e) => {
                        error!("Failed to parse Hash value as a natural number: {e}");
                    }
                }
            }
            "clear hash" => {
                self.searcher.set_hash_size(self.searcher.hash_size_mb());
                if self.debug_mode {
                    println!("info string Hash cleared");
                }
            }
            _ => {
                // Other options are silently tolerated for GUI compatibility
                debug!("Ignoring unknown UCI option '{name}'");
            }
        }
    }

    /// Non-standard commands arrive unparsed: perft, divide, fen, display,
    /// moves, bench.
    fn handle_unknown(&mut self, message: &str, parse_err: String) {
        let parts: Vec<&str> = message.split_whitespace().collect();

        match parts.as_slice() {
            ["go", "perft", depth] => match depth.parse::<u32>() {
                Ok(depth) => {
                    let start_time = Instant::now();
                    let nodes = perft(&mut self.board, depth);
                    let elapsed = start_time.elapsed().as_millis() as u64;
                    let nps = if elapsed > 0 { nodes * 1000 / elapsed } else { 0 };
                    println!("info nodes {nodes} time {elapsed} nps {nps}");
                    println!("bestmove 0000");
                }
                Err(e) => error!("Failed to parse perft depth: {e}"),
            },
            ["perft", depth] => match depth.parse::<u32>() {
                Ok(depth) => {
                    let start_time = Instant::now();
                    let nodes = run_perft(&mut self.board, depth);
                    let elapsed = start_time.elapsed().as_millis();
                    println!("Nodes: {nodes}");
                    println!("Time: {elapsed} ms");
                }
                Err(e) => error!("Failed to parse perft depth: {e}"),
            },
            ["divide", depth] => match depth.parse::<u32>() {
                Ok(depth) if depth > 0 => {
                    perft_divide(&mut self.board, depth);
                }
                _ => error!("Expected format: divide [depth]"),
            },
            ["fen"] => {
                println!("{}", self.board.to_fen());
            }
            ["d"] | ["display"] => {
                self.board.print();
            }
            ["moves"] => {
                let moves = self.board.legal_moves();
                println!("Legal moves ({}):", moves.len());
                let ucis: Vec<String> = moves.iter().map(|m| m.to_uci()).collect();
                println!("{}", ucis.join(" "));
            }
            ["bench"] => {
                bench();
            }
            _ => {
                error!("Unknown UCI cmd in '{message}'. Parsing error: {parse_err}");
            }
        }
    }

    /// For testing
    pub fn get_board_copy(&self) -> Board {
        self.board.clone()
    }

    /// Spawns the stdin reader. Stop and quit are forwarded immediately on
    /// their own channel so they reach a search in progress.
    pub fn process_stdin_uci() -> (Receiver<(String, Vec<UciMessage>)>, Receiver<()>) {
        let (message_tx, message_rx) = mpsc::channel::<(String, Vec<UciMessage>)>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        thread::spawn(move || loop {
            let mut buffer = String::new();
            let bytes = match io::stdin().read_line(&mut buffer) {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!("Failed to read from stdin: {e}");
                    break;
                }
            };
            if bytes == 0 {
                // EOF behaves like quit
                let _ = message_tx.send((String::from("quit"), vec![UciMessage::Quit]));
                break;
            }

            let messages = parse_with_unknown(&buffer);

            for m in &messages {
                match m {
                    UciMessage::Stop | UciMessage::Quit => {
                        if stop_tx.send(()).is_err() {
                            return;
                        }
                    }
                    _ => {}
                }
            }

            if message_tx.send((buffer, messages)).is_err() {
                return;
            }
        });

        (message_rx, stop_rx)
    }
}

fn uci_move_string(m: &UciMove) -> String {
    let mut s = format!("{}{}{}{}", m.from.file, m.from.rank, m.to.file, m.to.rank);
    if let Some(promotion) = m.promotion {
        s.push(match promotion {
            UciPiece::Knight => 'n',
            UciPiece::Bishop => 'b',
            UciPiece::Rook => 'r',
            UciPiece::Queen => 'q',
            _ => '?',
        });
    }
    s
}

#[cfg(test)]
mod uci_tests {
    use super::*;

    fn test_interface() -> UciInterface {
        let (_stop_tx, stop_rx) = mpsc::channel::<()>();
        UciInterface::new(stop_rx)
    }

    fn send(uci: &mut UciInterface, command: &str) -> bool {
        let messages = parse_with_unknown(command);
        uci.process_command((String::from(command), messages))
    }

    #[test]
    fn position_startpos_with_moves() {
        let mut uci = test_interface();
        send(&mut uci, "position startpos moves e2e4 e7e5");

        let board = uci.get_board_copy();
        assert_eq!(board.to_fen(), "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2");
    }

    #[test]
    fn position_fen_with_moves_matches_direct_setup() {
        let kiwipete = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut uci = test_interface();
        send(&mut uci, &format!("position fen {kiwipete} moves e1g1"));

        let mut reference = Board::from_fen(kiwipete).unwrap();
        let castle = reference.parse_uci_move("e1g1").unwrap();
        reference.make_move(castle);

        let board = uci.get_board_copy();
        assert_eq!(board.to_fen(), reference.to_fen());
        assert_eq!(board.hash, reference.hash);
    }

    #[test]
    fn illegal_moves_stop_the_move_list() {
        let mut uci = test_interface();
        send(&mut uci, "position startpos moves e2e4 e2e4 e7e5");

        // Only the first move applied
        let board = uci.get_board_copy();
        assert_eq!(board.to_fen(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
    }

    #[test]
    fn quit_ends_the_session() {
        let mut uci = test_interface();
        assert!(!send(&mut uci, "isready"));
        assert!(send(&mut uci, "quit"));
    }

    #[test]
    fn ucinewgame_resets_the_board() {
        let mut uci = test_interface();
        send(&mut uci, "position startpos moves e2e4");
        send(&mut uci, "ucinewgame");
        assert_eq!(uci.get_board_copy().to_fen(), crate::STARTING_FEN);
    }
}
