use std::sync::mpsc;
use std::time::Instant;

use crate::board::Board;
use crate::search::Searcher;

const BENCH_DEPTH: i32 = 7;

/// Fixed-depth searches over a small mixed suite, for quick speed and
/// search-shape comparisons between builds.
pub fn bench() {
    let bench_fens = [
        crate::STARTING_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "r1bqk2r/pp3pbp/2n2np1/1B1p2B1/3P4/P1N2N2/1P3PPP/R2QK2R b KQkq - 3 10",
        "2r1r1k1/5p2/4q2Q/p2p1p2/3Pn3/4P2P/5PPB/1R1R2K1 w - - 1 32",
        "8/8/5pk1/2R5/6P1/7r/5K2/8 b - - 18 60",
        "8/1n1n1p2/5k1p/p7/1BP2P1P/4K3/2B5/8 w - - 0 54",
        "r1bqkbnr/pp2pppp/2n5/2pp4/3P4/2P1PN2/PP3PPP/RNBQKB1R b KQkq - 0 4",
        "6k1/p4pp1/2b5/1p5p/3P1P1P/P1Pp2K1/1R1B2P1/3r4 w - - 2 32",
        "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
        "8/P7/8/8/8/8/8/k6K w - - 0 1",
    ];

    let (_stop_tx, stop_rx) = mpsc::channel::<()>();
    let mut searcher = Searcher::with_hash_mb(stop_rx, 16);

    let mut nodes = 0;
    let start_time = Instant::now();

    for fen in bench_fens {
        let mut board = Board::from_fen(fen).unwrap();
        searcher.new_game();
        searcher.think(&mut board, 0, 0, BENCH_DEPTH, 0);
        nodes += searcher.nodes;
    }

    let elapsed = start_time.elapsed();
    let nps = nodes as f64 / elapsed.as_secs_f64();
    println!("Nodes: {nodes} NPS: {nps:.0} Time: {elapsed:#?}");
}
