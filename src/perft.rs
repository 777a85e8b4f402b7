use std::time::Instant;

use log::info;
use num_format::{Locale, ToFormattedString};

use crate::board::Board;
use crate::moves::MoveList;

/// Leaf count of the legal move tree at the given depth.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut moves = MoveList::new();
    board.generate_legal_moves(&mut moves);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for m in moves {
        let undo = board.make_move(m);
        nodes += perft(board, depth - 1);
        board.unmake_move(m, undo);
    }
    nodes
}

/// Per-root-move leaf counts, printed one move per line.
pub fn perft_divide(board: &mut Board, depth: u32) -> u64 {
    let mut moves = MoveList::new();
    board.generate_legal_moves(&mut moves);

    let mut total = 0;
    for m in moves {
        let undo = board.make_move(m);
        let nodes = if depth > 1 { perft(board, depth - 1) } else { 1 };
        board.unmake_move(m, undo);

        println!("{}: {nodes}", m.to_uci());
        total += nodes;
    }

    println!("Total: {total}");
    total
}

/// Timed wrapper used by the UCI `perft` command.
pub fn run_perft(board: &mut Board, depth: u32) -> u64 {
    let start_time = Instant::now();
    let nodes = perft(board, depth);
    let elapsed = start_time.elapsed();

    let nps = nodes as f64 / elapsed.as_secs_f64();
    info!(
        "perft depth {depth} in {elapsed:#?}. Nodes: {}. Nodes per second: {}",
        nodes.to_formatted_string(&Locale::en),
        (nps as u64).to_formatted_string(&Locale::en)
    );

    nodes
}

#[cfg(test)]
mod perft_tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

    #[test]
    fn startpos_shallow_counts() {
        let mut board = Board::startpos();
        assert_eq!(perft(&mut board, 1), 20);
        assert_eq!(perft(&mut board, 2), 400);
        assert_eq!(perft(&mut board, 3), 8902);
        assert_eq!(perft(&mut board, 4), 197_281);
    }

    #[test]
    #[ignore = "several seconds without optimizations"]
    fn startpos_depth_five() {
        let mut board = Board::startpos();
        assert_eq!(perft(&mut board, 5), 4_865_609);
    }

    #[test]
    fn kiwipete_counts() {
        let mut board = Board::from_fen(KIWIPETE).unwrap();
        assert_eq!(perft(&mut board, 1), 48);
        assert_eq!(perft(&mut board, 2), 2039);
        assert_eq!(perft(&mut board, 3), 97_862);
    }

    #[test]
    fn position_3_depth_five() {
        let mut board = Board::from_fen(POSITION_3).unwrap();
        assert_eq!(perft(&mut board, 1), 14);
        assert_eq!(perft(&mut board, 2), 191);
        assert_eq!(perft(&mut board, 3), 2812);
        assert_eq!(perft(&mut board, 5), 674_624);
    }

    #[test]
    fn position_4_depth_four() {
        let mut board = Board::from_fen(POSITION_4).unwrap();
        assert_eq!(perft(&mut board, 1), 6);
        assert_eq!(perft(&mut board, 2), 264);
        assert_eq!(perft(&mut board, 3), 9467);
        assert_eq!(perft(&mut board, 4), 422_333);
    }

    #[test]
    fn divide_total_matches_perft() {
        let mut board = Board::from_fen(KIWIPETE).unwrap();
        assert_eq!(perft_divide(&mut board, 2), 2039);
    }

    #[test]
    fn board_is_restored_after_perft() {
        let mut board = Board::from_fen(KIWIPETE).unwrap();
        let fen = board.to_fen();
        let hash = board.hash;
        perft(&mut board, 3);
        assert_eq!(board.to_fen(), fen);
        assert_eq!(board.hash, hash);
    }
}
