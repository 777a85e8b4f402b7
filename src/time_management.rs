use vampirc_uci::{UciSearchControl, UciTimeControl};

use crate::board::{Board, Color};

/// Budgets handed to the searcher: zero means unlimited for each field.
pub struct SearchLimits {
    pub soft_ms: u64,
    pub hard_ms: u64,
    pub depth: i32,
    pub nodes: u64,
}

/// Maps a `go` command onto soft/hard time budgets. Fixed depth or node
/// searches, infinite, and ponder all run without a clock.
pub fn limits_from_go(
    time_control: &Option<UciTimeControl>,
    search_control: &Option<UciSearchControl>,
    board: &Board,
) -> SearchLimits {
    let mut limits = SearchLimits {
        soft_ms: 0,
        hard_ms: 0,
        depth: 128,
        nodes: 0,
    };

    let mut fixed_search = false;
    if let Some(sc) = search_control {
        if let Some(depth) = sc.depth {
            limits.depth = depth as i32;
            fixed_search = true;
        }
        if let Some(nodes) = sc.nodes {
            limits.nodes = nodes;
            fixed_search = true;
        }
    }

    // A depth or node limit overrides the clock entirely, whatever else the
    // go command carried
    if fixed_search {
        return limits;
    }

    match time_control {
        None => {
            // Nothing to go on at all: pick something playable
            limits.soft_ms = 1000;
            limits.hard_ms = 5000;
        }
        Some(UciTimeControl::Infinite) | Some(UciTimeControl::Ponder) => {}
        Some(UciTimeControl::MoveTime(duration)) => {
            let ms = duration.num_milliseconds().max(1) as u64;
            limits.soft_ms = ms;
            limits.hard_ms = ms;
        }
        Some(UciTimeControl::TimeLeft {
            white_time,
            black_time,
            white_increment,
            black_increment,
            moves_to_go,
        }) => {
            let white_to_move = board.side_to_move == Color::White;
            let time_left = if white_to_move { white_time } else { black_time }
                .as_ref()
                .map_or(0, |d| d.num_milliseconds())
                .max(0);
            let increment = if white_to_move { white_increment } else { black_increment }
                .as_ref()
                .map_or(0, |d| d.num_milliseconds())
                .max(0);

            let mut soft;
            let mut hard;
            if let Some(mtg) = moves_to_go {
                let mtg = *mtg as i64;
                soft = time_left / (mtg + 2);
                hard = time_left / (mtg / 2).max(1);
            } else {
                soft = time_left / 40;
                if increment > 0 {
                    soft += increment * 3 / 4;
                }
                hard = (time_left / 4).min(soft * 5);
            }

            // Safety margins against losing on time at the interface
            soft = (soft - 10).max(1);
            hard = (hard - 50).max(1);

            // Near the fifty-move horizon resolve the position rather than
            // shuffle into a claimable draw
            if board.halfmove_clock > 80 {
                let urgency = (100 - board.halfmove_clock as i64).max(1);
                soft = (time_left / 2).min(soft + (soft * urgency / 40).max(5));
                hard = (time_left / 2).min(hard.max(soft * 2));
            }

            limits.soft_ms = soft.max(0) as u64;
            limits.hard_ms = hard.max(0) as u64;
        }
    }

    limits
}

#[cfg(test)]
mod time_management_tests {
    use super::*;
    use vampirc_uci::{parse_with_unknown, UciMessage};

    fn parse_go(command: &str) -> (Option<UciTimeControl>, Option<UciSearchControl>) {
        match parse_with_unknown(command).into_iter().next() {
            Some(UciMessage::Go {
                time_control,
                search_control,
            }) => (time_control, search_control),
            other => panic!("expected a go command, got {other:?}"),
        }
    }

    #[test]
    fn movetime_sets_both_budgets() {
        let board = Board::startpos();
        let (tc, sc) = parse_go("go movetime 750");
        let limits = limits_from_go(&tc, &sc, &board);
        assert_eq!(limits.soft_ms, 750);
        assert_eq!(limits.hard_ms, 750);
    }

    #[test]
    fn infinite_and_fixed_depth_run_unclocked() {
        let board = Board::startpos();

        let (tc, sc) = parse_go("go infinite");
        let limits = limits_from_go(&tc, &sc, &board);
        assert_eq!(limits.soft_ms, 0);
        assert_eq!(limits.hard_ms, 0);

        let (tc, sc) = parse_go("go depth 7");
        let limits = limits_from_go(&tc, &sc, &board);
        assert_eq!(limits.soft_ms, 0);
        assert_eq!(limits.hard_ms, 0);
        assert_eq!(limits.depth, 7);
    }

    #[test]
    fn fixed_depth_overrides_movetime() {
        let board = Board::startpos();
        let (tc, sc) = parse_go("go depth 5 movetime 500");
        let limits = limits_from_go(&tc, &sc, &board);
        assert_eq!(limits.depth, 5);
        assert_eq!(limits.soft_ms, 0);
        assert_eq!(limits.hard_ms, 0);
    }

    #[test]
    fn node_limit_passes_through() {
        let board = Board::startpos();
        let (tc, sc) = parse_go("go nodes 50000");
        let limits = limits_from_go(&tc, &sc, &board);
        assert_eq!(limits.nodes, 50_000);
        assert_eq!(limits.hard_ms, 0);
    }

    #[test]
    fn clock_time_is_divided_up() {
        let board = Board::startpos();
        let (tc, sc) = parse_go("go wtime 60000 btime 60000");
        let limits = limits_from_go(&tc, &sc, &board);
        assert!(limits.soft_ms > 0);
        assert!(limits.hard_ms >= limits.soft_ms);
        assert!(limits.hard_ms <= 15_000);
    }

    #[test]
    fn increment_extends_the_soft_budget() {
        let board = Board::startpos();
        let (tc, sc) = parse_go("go wtime 60000 btime 60000");
        let bare = limits_from_go(&tc, &sc, &board);

        let (tc, sc) = parse_go("go wtime 60000 btime 60000 winc 2000 binc 2000");
        let with_increment = limits_from_go(&tc, &sc, &board);
        assert!(with_increment.soft_ms > bare.soft_ms);
    }

    #[test]
    fn movestogo_splits_the_remaining_time() {
        let board = Board::startpos();
        let (tc, sc) = parse_go("go wtime 30000 btime 30000 movestogo 10");
        let limits = limits_from_go(&tc, &sc, &board);
        // soft = 30000 / 12 - 10, hard = 30000 / 5 - 50
        assert_eq!(limits.soft_ms, 2490);
        assert_eq!(limits.hard_ms, 5950);
    }

    #[test]
    fn no_inputs_fall_back_to_defaults() {
        let board = Board::startpos();
        let limits = limits_from_go(&None, &None, &board);
        assert_eq!(limits.soft_ms, 1000);
        assert_eq!(limits.hard_ms, 5000);
    }
}
