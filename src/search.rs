use std::sync::mpsc::Receiver;
use std::sync::LazyLock;
use std::time::Instant;

use arrayvec::ArrayVec;

use crate::board::{Board, PieceType};
use crate::eval_params::EvalParams;
use crate::moves::{Move, MoveKind, MoveList};
use crate::transposition_table::{Bound, TTEntry, TranspositionTable};

pub const INF: i32 = 30000;
pub const MATE: i32 = 20000;

const DEFAULT_HASH_MB: usize = 128;
const MAX_PLY: i32 = 128;

// Log-log reduction schedule indexed by [depth][move count]
static LMR_TABLE: LazyLock<[[i32; 64]; 64]> = LazyLock::new(|| {
    let mut table = [[0; 64]; 64];
    for depth in 1..64 {
        for count in 1..64 {
            table[depth][count] = 1 + ((depth as f64).ln() * (count as f64).ln() / 2.5) as i32;
        }
    }
    table
});

/// Mate scores are stored relative to the probing node and adjusted back by
/// ply on retrieval, so "mate in N" survives transposition.
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score > MATE - 100 {
        score + ply
    } else if score < -MATE + 100 {
        score - ply
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score > MATE - 100 {
        score - ply
    } else if score < -MATE + 100 {
        score + ply
    } else {
        score
    }
}

fn score_string(score: i32) -> String {
    if score.abs() >= MATE - 100 {
        let mate_ply = MATE - score.abs();
        let mate_in = (mate_ply + 1) / 2;
        if score > 0 { format!("mate {mate_in}") } else { format!("mate -{mate_in}") }
    } else {
        format!("cp {score}")
    }
}

/// One engine session: transposition table, move-ordering state, and the
/// previous iteration's root choice all persist between `think` calls.
pub struct Searcher {
    params: EvalParams,
    tt: TranspositionTable,
    stop_rx: Receiver<()>,
    history: [[i32; 64]; 64],
    killers: [[Move; 2]; MAX_PLY as usize],
    counter_moves: [[Move; 64]; 64],
    best_root: Move,
    prev_root: Move,
    prev_score: i32,
    pub nodes: u64,
    sel_depth: i32,
    time_up: bool,
    start: Instant,
    soft_ms: u64,
    hard_ms: u64,
    max_nodes: u64,
}

impl Searcher {
    pub fn new(stop_rx: Receiver<()>) -> Searcher {
        Searcher::with_hash_mb(stop_rx, DEFAULT_HASH_MB)
    }

    pub fn with_hash_mb(stop_rx: Receiver<()>, hash_mb: usize) -> Searcher {
        Searcher {
            params: EvalParams::defaults(),
            tt: TranspositionTable::with_mb(hash_mb),
            stop_rx,
            history: [[0; 64]; 64],
            killers: [[Move::NULL; 2]; MAX_PLY as usize],
            counter_moves: [[Move::NULL; 64]; 64],
            best_root: Move::NULL,
            prev_root: Move::NULL,
            prev_score: 0,
            nodes: 0,
            sel_depth: 0,
            time_up: false,
            start: Instant::now(),
            soft_ms: 0,
            hard_ms: 0,
            max_nodes: 0,
        }
    }

    pub fn set_hash_size(&mut self, size_mb: usize) {
        self.tt = TranspositionTable::with_mb(size_mb);
    }

    pub fn hash_size_mb(&self) -> usize {
        self.tt.size_mb()
    }

    pub fn probe_tt(&self, key: u64) -> Option<TTEntry> {
        self.tt.probe(key)
    }

    /// Transposition table occupancy in permille, for the info line.
    pub fn hashfull(&self) -> u32 {
        self.tt.hashfull()
    }

    pub fn new_game(&mut self) {
        self.tt.clear();
        self.history = [[0; 64]; 64];
        self.killers = [[Move::NULL; 2]; MAX_PLY as usize];
        self.counter_moves = [[Move::NULL; 64]; 64];
        self.prev_root = Move::NULL;
        self.prev_score = 0;
    }

    pub fn eval_params(&self) -> &EvalParams {
        &self.params
    }

    pub fn set_eval_params(&mut self, params: EvalParams) {
        self.params = params;
    }

    pub fn last_score(&self) -> i32 {
        self.prev_score
    }

    /// Iterative deepening driver. `soft_ms` stops new iterations, `hard_ms`
    /// aborts mid-search, zero means unlimited for either; `max_nodes` zero
    /// is likewise unlimited. Returns the null move only when the position
    /// has no legal moves at all.
    pub fn think(&mut self, board: &mut Board, soft_ms: u64, hard_ms: u64, max_depth: i32, max_nodes: u64) -> Move {
        self.soft_ms = soft_ms;
        self.hard_ms = hard_ms;
        self.max_nodes = max_nodes;
        self.time_up = false;
        self.nodes = 0;
        self.sel_depth = 0;
        self.start = Instant::now();

        // Drop stop requests that arrived between searches
        while self.stop_rx.try_recv().is_ok() {}

        let root_moves = board.legal_moves();
        if root_moves.is_empty() {
            return Move::NULL;
        }

        // A stale previous root from another position must not leak through
        if self.prev_root.is_null() || !root_moves.iter().any(|m| *m == self.prev_root) {
            self.prev_root = root_moves[0];
        }
        self.best_root = self.prev_root;

        let max_depth = max_depth.clamp(1, MAX_PLY - 1);
        for depth in 1..=max_depth {
            // Gradual decay so old history stops dominating move ordering
            for row in self.history.iter_mut() {
                for value in row.iter_mut() {
                    *value >>= 1;
                }
            }
            self.sel_depth = 0;

            let mut alpha = -INF;
            let mut beta = INF;
            if depth >= 5 {
                alpha = self.prev_score - 50;
                beta = self.prev_score + 50;
            }

            let mut score = self.search(board, depth, alpha, beta, 0, Move::NULL, false);
            if !self.time_up && (score <= alpha || score >= beta) {
                score = self.search(board, depth, -INF, INF, 0, Move::NULL, false);
            }
            if self.time_up {
                break;
            }

            self.prev_root = self.best_root;
            self.prev_score = score;

            let elapsed = self.start.elapsed().as_millis() as u64;
            let nps = if elapsed > 0 { self.nodes * 1000 / elapsed } else { 0 };
            println!(
                "info depth {depth} seldepth {} score {} time {elapsed} nodes {} nps {nps} hashfull {} pv {}",
                self.sel_depth,
                score_string(score),
                self.nodes,
                self.hashfull(),
                self.best_root.to_uci()
            );

            if self.soft_ms > 0 && elapsed >= self.soft_ms {
                break;
            }
            if score.abs() >= MATE - 100 {
                break;
            }
        }

        // A partial iteration never overrides the last completed one
        let mut result = if self.time_up { self.prev_root } else { self.best_root };
        if result.is_null() {
            result = root_moves[0];
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn search(
        &mut self,
        board: &mut Board,
        mut depth: i32,
        mut alpha: i32,
        beta: i32,
        ply: i32,
        prev_move: Move,
        was_null: bool,
    ) -> i32 {
        if ply >= 100 {
            return board.evaluate(&self.params);
        }
        if ply > self.sel_depth {
            self.sel_depth = ply;
        }

        self.nodes += 1;
        if self.nodes & 2047 == 0 {
            if self.stop_rx.try_recv().is_ok() {
                self.time_up = true;
                return 0;
            }
            if self.hard_ms > 0 && self.start.elapsed().as_millis() as u64 >= self.hard_ms {
                self.time_up = true;
                return 0;
            }
            if self.max_nodes > 0 && self.nodes >= self.max_nodes {
                self.time_up = true;
                return 0;
            }
        }

        let is_root = ply == 0;
        let pv_node = beta - alpha > 1;
        let orig_alpha = alpha;

        if board.is_draw(ply) {
            return 0;
        }

        // Check extension before the horizon test and TT probe
        let in_check = board.in_check();
        if in_check {
            depth += 1;
        }

        if depth <= 0 {
            return self.quiescence(board, alpha, beta, 0);
        }

        let key = board.hash;
        let mut tt_move = Move::NULL;
        if let Some(entry) = self.tt.probe(key) {
            tt_move = entry.best_move;
            if !is_root && entry.depth >= depth {
                let tt_score = score_from_tt(entry.score, ply);
                match entry.bound {
                    Bound::Exact => return tt_score,
                    Bound::Lower if !pv_node && tt_score >= beta => return tt_score,
                    Bound::Upper if !pv_node && tt_score <= alpha => return tt_score,
                    _ => {}
                }
            }
        }

        let static_eval = if in_check { -MATE } else { board.evaluate(&self.params) };
        let late_endgame = board.is_low_material_ending();

        // Reverse futility pruning
        if !pv_node && !in_check && depth <= 6 && static_eval - 90 * depth >= beta {
            return static_eval;
        }

        // Null-move pruning, never twice in a row
        if !in_check && !pv_node && !was_null && depth >= 3 && static_eval >= beta && board.has_non_pawn_material() {
            let undo = board.make_null_move();
            let reduction = 3 + depth / 4;
            let score = -self.search(board, depth - reduction, -beta, -beta + 1, ply + 1, Move::NULL, true);
            board.unmake_null_move(undo);
            if self.time_up {
                return 0;
            }
            if score >= beta {
                return score;
            }
        }

        // Internal iterative deepening seeds a TT move at PV nodes
        if depth >= 6 && pv_node && tt_move.is_null() {
            self.search(board, depth - 3, alpha, beta, ply, prev_move, was_null);
            if let Some(entry) = self.tt.probe(key) {
                tt_move = entry.best_move;
            }
        }

        let mut moves = MoveList::new();
        board.generate_legal_moves(&mut moves);
        if moves.is_empty() {
            if !in_check {
                return 0;
            }
            return -MATE + ply;
        }

        // A TT move that is not legal here is a key collision artifact
        if !tt_move.is_null() && !moves.iter().any(|m| *m == tt_move) {
            tt_move = Move::NULL;
        }

        // TT move, captures by MVV-LVA, promotions, killers and the counter
        // move, then quiets by history
        let mut scored: ArrayVec<(i32, Move), 256> = moves
            .iter()
            .map(|&m| {
                let score = if m == tt_move {
                    2_000_000
                } else {
                    let is_capture = !board.is_empty(m.to()) || m.kind() == MoveKind::EnPassant;
                    if is_capture {
                        let moving = board.piece_at(m.from());
                        let captured = if m.kind() == MoveKind::EnPassant {
                            PieceType::Pawn
                        } else {
                            board.piece_at(m.to())
                        };
                        1_000_000 + self.mvv_lva(moving, captured)
                    } else if m.kind() == MoveKind::Promotion {
                        900_000 + self.params.piece_values[m.promotion() as usize] as i32
                    } else if m == self.killers[ply as usize][0] {
                        800_000
                    } else if !prev_move.is_null()
                        && m == self.counter_moves[prev_move.from() as usize][prev_move.to() as usize]
                    {
                        750_000
                    } else if m == self.killers[ply as usize][1] {
                        700_000
                    } else {
                        self.history[m.from() as usize][m.to() as usize]
                    }
                };
                (score, m)
            })
            .collect();
        scored.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        let mut best_score = -INF;
        let mut best_move = scored[0].1;
        let mut moves_searched: i32 = 0;
        let lmr_row = &LMR_TABLE[depth.min(63) as usize];
        let mut quiets_tried: ArrayVec<Move, 256> = ArrayVec::new();

        for &(_, m) in scored.iter() {
            let is_capture = !board.is_empty(m.to()) || m.kind() == MoveKind::EnPassant;
            let is_promotion = m.kind() == MoveKind::Promotion;
            let is_quiet = !is_capture && !is_promotion;

            // Skip captures that clearly lose material once one move has
            // been searched
            if m.kind() != MoveKind::EnPassant && !board.is_empty(m.to()) && moves_searched > 0 && !is_promotion {
                let attacker = board.piece_at(m.from());
                let victim = board.piece_at(m.to());
                if self.params.piece_values[attacker as usize] - self.params.piece_values[victim as usize] > 80.0
                    && depth <= 6
                    && moves_searched >= 2
                    && self.see(board, m) < -100
                {
                    continue;
                }
            }

            // Futility and late-move-count pruning of quiets
            if !late_endgame
                && !pv_node
                && !in_check
                && depth <= 7
                && static_eval + 100 * depth < alpha
                && moves_searched > 0
                && is_quiet
                && best_score > -19000
            {
                continue;
            }
            if !late_endgame
                && !pv_node
                && !in_check
                && depth <= 5
                && moves_searched >= 4 + depth * depth / 2
                && is_quiet
                && best_score > -19000
            {
                continue;
            }

            let undo = board.make_move(m);
            let gives_check = board.in_check();

            let score;
            if moves_searched >= 3 && depth >= 3 && is_quiet && !in_check && !gives_check {
                // Late-move reduction with a verification re-search
                let mut reduction = lmr_row[moves_searched.min(63) as usize];
                reduction = reduction.min(depth - 2);
                if pv_node {
                    reduction = (reduction - 1).max(0);
                }
                if late_endgame {
                    reduction = (reduction - 1).max(0);
                }
                let mut s = -self.search(board, depth - 1 - reduction, -alpha - 1, -alpha, ply + 1, m, false);
                if s > alpha {
                    s = -self.search(board, depth - 1, -beta, -alpha, ply + 1, m, false);
                }
                score = s;
            } else if moves_searched == 0 {
                score = -self.search(board, depth - 1, -beta, -alpha, ply + 1, m, false);
            } else {
                let mut s = -self.search(board, depth - 1, -alpha - 1, -alpha, ply + 1, m, false);
                if s > alpha && s < beta {
                    s = -self.search(board, depth - 1, -beta, -alpha, ply + 1, m, false);
                }
                score = s;
            }

            board.unmake_move(m, undo);
            moves_searched += 1;

            if self.time_up {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
                if score > alpha {
                    alpha = score;
                    if is_root {
                        self.best_root = m;
                    }
                    if alpha >= beta {
                        if is_quiet {
                            self.history[m.from() as usize][m.to() as usize] += depth * depth;
                            // The quiets tried before the cutoff move get the
                            // mirror-image penalty
                            for q in &quiets_tried {
                                self.history[q.from() as usize][q.to() as usize] -= depth * depth;
                            }
                            if m != self.killers[ply as usize][0] {
                                self.killers[ply as usize][1] = self.killers[ply as usize][0];
                                self.killers[ply as usize][0] = m;
                            }
                            if !prev_move.is_null() {
                                self.counter_moves[prev_move.from() as usize][prev_move.to() as usize] = m;
                            }
                        }
                        break;
                    }
                }
            }

            if is_quiet {
                quiets_tried.push(m);
            }
        }

        let bound = if best_score <= orig_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(key, depth, score_to_tt(best_score, ply), best_move, bound);

        best_score
    }

    /// Captures and promotions only, capped at ten plies past the horizon.
    fn quiescence(&mut self, board: &mut Board, mut alpha: i32, beta: i32, q_depth: i32) -> i32 {
        if self.stop_rx.try_recv().is_ok() {
            self.time_up = true;
            return 0;
        }
        if self.time_up || q_depth > 10 {
            return board.evaluate(&self.params);
        }

        let low_material = board.is_low_material_ending();
        let stand_pat = board.evaluate(&self.params);
        if stand_pat >= beta {
            return beta;
        }
        if alpha < stand_pat {
            alpha = stand_pat;
        }

        let mut moves = MoveList::new();
        board.generate_legal_moves(&mut moves);

        let mut scored: ArrayVec<(i32, Move), 256> = ArrayVec::new();
        for &m in moves.iter() {
            let is_capture = !board.is_empty(m.to()) || m.kind() == MoveKind::EnPassant;
            let is_promotion = m.kind() == MoveKind::Promotion;
            if !is_capture && !is_promotion {
                continue;
            }

            let mut score = 0;
            if is_capture {
                let captured = if m.kind() == MoveKind::EnPassant {
                    PieceType::Pawn
                } else {
                    board.piece_at(m.to())
                };
                score = (self.params.piece_values[captured as usize] * 10.0
                    - self.params.piece_values[board.piece_at(m.from()) as usize]) as i32;
            }
            if is_promotion {
                score += 8000;
            }
            scored.push((score, m));
        }

        if scored.is_empty() {
            return alpha;
        }
        scored.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        for &(_, m) in scored.iter() {
            let is_capture = !board.is_empty(m.to()) || m.kind() == MoveKind::EnPassant;
            let is_promotion = m.kind() == MoveKind::Promotion;

            if !is_promotion {
                // Delta pruning: even winning this piece cannot reach alpha
                let captured = if m.kind() == MoveKind::EnPassant {
                    PieceType::Pawn
                } else {
                    board.piece_at(m.to())
                };
                let margin = if captured == PieceType::Pawn || low_material { 0 } else { 200 };
                if stand_pat + self.params.piece_values[captured as usize] as i32 + margin < alpha {
                    continue;
                }
            }

            if !is_promotion && is_capture {
                let attacker = self.params.piece_values[board.piece_at(m.from()) as usize] as i32;
                let captured = if m.kind() == MoveKind::EnPassant {
                    PieceType::Pawn
                } else {
                    board.piece_at(m.to())
                };
                let victim = self.params.piece_values[captured as usize] as i32;
                if attacker - victim > 80 && attacker > victim && self.see(board, m) < 0 {
                    continue;
                }
            }

            let undo = board.make_move(m);
            let score = -self.quiescence(board, -beta, -alpha, q_depth + 1);
            board.unmake_move(m, undo);

            if self.time_up {
                return 0;
            }

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    fn mvv_lva(&self, attacker: PieceType, victim: PieceType) -> i32 {
        (self.params.piece_values[victim as usize] * 10.0 - self.params.piece_values[attacker as usize]) as i32
    }

    /// Static exchange evaluation by playing the capture sequence out on the
    /// board, always recapturing with the least valuable attacker.
    fn see(&self, board: &mut Board, m: Move) -> i32 {
        let is_capture = !board.is_empty(m.to()) || m.kind() == MoveKind::EnPassant;
        if !is_capture {
            return 0;
        }

        let captured = if m.kind() == MoveKind::EnPassant {
            PieceType::Pawn
        } else {
            board.piece_at(m.to())
        };
        let mut value = self.params.piece_values[captured as usize] as i32;

        let mover = board.piece_at(m.from());
        if m.kind() == MoveKind::Promotion {
            value += (self.params.piece_values[m.promotion() as usize] - 100.0) as i32;
        }

        let undo = board.make_move(m);
        let next_victim = if m.kind() == MoveKind::Promotion { m.promotion() } else { mover };
        let recapture = self.see_recapture(board, m.to(), next_victim);
        board.unmake_move(m, undo);

        value - recapture
    }

    fn see_recapture(&self, board: &mut Board, square: u8, last_victim: PieceType) -> i32 {
        let mut min_value = INF;
        let mut best = Move::NULL;

        for m in board.legal_moves() {
            if m.to() != square {
                continue;
            }
            let attacker_value = self.params.piece_values[board.piece_at(m.from()) as usize] as i32;
            if attacker_value < min_value {
                min_value = attacker_value;
                best = m;
            }
        }

        if best.is_null() {
            return 0;
        }

        let undo = board.make_move(best);
        let next_victim = board.piece_at(best.to());
        let value = self.params.piece_values[last_victim as usize] as i32;
        let next = self.see_recapture(board, square, next_victim);
        board.unmake_move(best, undo);

        // Standing pat on the exchange is always allowed
        (value - next).max(0)
    }
}

#[cfg(test)]
mod search_tests {
    use super::*;
    use std::sync::mpsc;

    fn test_searcher() -> Searcher {
        let (_tx, stop_rx) = mpsc::channel::<()>();
        Searcher::with_hash_mb(stop_rx, 2)
    }

    #[test]
    fn finds_mate_in_one() {
        let mut searcher = test_searcher();
        let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();

        let best = searcher.think(&mut board, 0, 0, 4, 0);
        assert_eq!(best.to_uci(), "a1a8");
        assert_eq!(searcher.last_score(), MATE - 1);
        assert_eq!(score_string(searcher.last_score()), "mate 1");
    }

    #[test]
    fn stalemate_returns_the_null_move() {
        let mut searcher = test_searcher();
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let best = searcher.think(&mut board, 0, 0, 4, 0);
        assert!(best.is_null());
    }

    #[test]
    fn root_entry_lands_in_the_transposition_table() {
        let mut searcher = test_searcher();
        let mut board = Board::startpos();

        let best = searcher.think(&mut board, 0, 0, 4, 0);
        let legal = board.legal_moves();
        assert!(legal.iter().any(|m| *m == best));

        let entry = searcher.probe_tt(board.hash).expect("root position should be in the table");
        assert!(legal.iter().any(|m| *m == entry.best_move));
    }

    #[test]
    fn pawn_endgame_move_is_legal_and_improving() {
        let mut searcher = test_searcher();
        let mut board = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();

        let best = searcher.think(&mut board, 0, 0, 6, 0);
        assert!(board.legal_moves().iter().any(|m| *m == best));
        assert!(searcher.last_score() > 0);
    }

    #[test]
    fn node_budget_stops_the_search() {
        let mut searcher = test_searcher();
        let mut board = Board::startpos();

        let best = searcher.think(&mut board, 0, 0, 64, 4000);
        assert!(board.legal_moves().iter().any(|m| *m == best));
        // The budget is polled every 2048 nodes, so allow one window of slack
        assert!(searcher.nodes < 4000 + 4096);
    }

    #[test]
    fn board_is_unchanged_after_think() {
        let mut searcher = test_searcher();
        let mut board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        let fen_before = board.to_fen();
        let hash_before = board.hash;

        searcher.think(&mut board, 0, 0, 3, 0);

        assert_eq!(board.to_fen(), fen_before);
        assert_eq!(board.hash, hash_before);
    }

    #[test]
    fn see_flags_losing_and_winning_captures() {
        let searcher = test_searcher();

        // Queen takes a pawn defended by a pawn: loses the queen
        let mut board = Board::from_fen("4k3/8/3p4/4p3/8/8/4Q3/4K3 w - - 0 1").unwrap();
        let qxe5 = board.parse_uci_move("e2e5").unwrap();
        assert!(searcher.see(&mut board, qxe5) < 0);

        // Pawn takes an undefended queen: wins material
        let mut board = Board::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let exd5 = board.parse_uci_move("e4d5").unwrap();
        assert!(searcher.see(&mut board, exd5) > 800);
    }

    #[test]
    fn eval_params_can_be_swapped_for_tuning() {
        let mut searcher = test_searcher();
        let mut params = searcher.eval_params().clone();
        params.piece_values[0] = 150.0;
        searcher.set_eval_params(params);
        assert_eq!(searcher.eval_params().piece_values[0], 150.0);

        let board = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        let default_eval = board.evaluate(&EvalParams::defaults());
        let tuned_eval = board.evaluate(searcher.eval_params());
        assert!(tuned_eval > default_eval);
    }

    #[test]
    fn mate_scores_adjust_by_ply_through_the_table() {
        assert_eq!(score_from_tt(score_to_tt(MATE - 3, 2), 2), MATE - 3);
        assert_eq!(score_from_tt(score_to_tt(-(MATE - 5), 4), 4), -(MATE - 5));
        assert_eq!(score_to_tt(150, 7), 150);
    }
}
