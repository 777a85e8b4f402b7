use std::sync::LazyLock;

use crate::bitboard::{
    file_of, lookup_knight_attack, lookup_pawn_attack, pop_lsb, rank_of, A_FILE, BIT_SQUARES, DARK_SQUARES, H_FILE,
    LIGHT_SQUARES, RANK_1, RANK_8,
};
use crate::board::{
    Board, Color, PieceType, BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE, WHITE_QUEENSIDE,
};
use crate::eval_params::EvalParams;
use crate::magic_bitboard::{lookup_bishop_attack, lookup_queen_attack, lookup_rook_attack};

/// Phase contribution per piece type; the sum is clamped to 24
const PIECE_PHASE: [i32; 7] = [0, 1, 1, 2, 4, 0, 0];
pub const MAX_PHASE: i32 = 24;

const CENTRAL_SQUARES: u64 = 0x00003C3C3C3C0000;
const WHITE_SHIELD_RANKS: u64 = 0x0000000000FFFF00;
const BLACK_SHIELD_RANKS: u64 = 0x00FFFF0000000000;

struct EvalMasks {
    file: [u64; 64],
    neighbor_files: [u64; 64],
    white_passed: [u64; 64],
    black_passed: [u64; 64],
    king_zone: [u64; 64],
}

static EVAL_MASKS: LazyLock<EvalMasks> = LazyLock::new(|| {
    let mut masks = EvalMasks {
        file: [0; 64],
        neighbor_files: [0; 64],
        white_passed: [0; 64],
        black_passed: [0; 64],
        king_zone: [0; 64],
    };

    for sq in 0..64 {
        let file = (sq & 7) as i32;
        let rank = (sq >> 3) as i32;

        let file_mask = A_FILE << file;
        masks.file[sq] = file_mask;

        let mut adjacent = 0u64;
        if file > 0 {
            adjacent |= A_FILE << (file - 1);
        }
        if file < 7 {
            adjacent |= A_FILE << (file + 1);
        }
        masks.neighbor_files[sq] = adjacent;

        let mut front_white = 0u64;
        for r in rank + 1..8 {
            front_white |= 0xFFu64 << (r * 8);
        }
        masks.white_passed[sq] = (file_mask | adjacent) & front_white;

        let mut front_black = 0u64;
        for r in 0..rank {
            front_black |= 0xFFu64 << (r * 8);
        }
        masks.black_passed[sq] = (file_mask | adjacent) & front_black;

        // Files k-1..k+1, ranks k-1..k+2
        let mut zone = 0u64;
        for f in (file - 1).max(0)..=(file + 1).min(7) {
            for r in (rank - 1).max(0)..=(rank + 2).min(7) {
                zone |= 1u64 << (r * 8 + f);
            }
        }
        masks.king_zone[sq] = zone;
    }

    masks
});

impl Board {
    /// True when the side to move still has a knight, bishop, rook, or queen.
    pub fn has_non_pawn_material(&self) -> bool {
        let us = self.side_to_move;
        self.piece_bb(us, PieceType::Knight)
            | self.piece_bb(us, PieceType::Bishop)
            | self.piece_bb(us, PieceType::Rook)
            | self.piece_bb(us, PieceType::Queen)
            != 0
    }

    pub fn is_low_material_ending(&self) -> bool {
        let non_pawn = self.piece_bb(Color::White, PieceType::Knight)
            | self.piece_bb(Color::White, PieceType::Bishop)
            | self.piece_bb(Color::White, PieceType::Rook)
            | self.piece_bb(Color::White, PieceType::Queen)
            | self.piece_bb(Color::Black, PieceType::Knight)
            | self.piece_bb(Color::Black, PieceType::Bishop)
            | self.piece_bb(Color::Black, PieceType::Rook)
            | self.piece_bb(Color::Black, PieceType::Queen);
        let pawns = self.piece_bb(Color::White, PieceType::Pawn) | self.piece_bb(Color::Black, PieceType::Pawn);

        non_pawn.count_ones() <= 2 && pawns.count_ones() <= 6
    }

    /// Centipawn score from the side to move's perspective, tapered between
    /// middlegame and endgame by material phase.
    pub fn evaluate(&self, params: &EvalParams) -> i32 {
        let masks = &*EVAL_MASKS;

        let mut mg_score = 0i32;
        let mut eg_score = 0i32;
        let mut phase = 0i32;
        let mut white_light_bishop = false;
        let mut white_dark_bishop = false;
        let mut black_light_bishop = false;
        let mut black_dark_bishop = false;
        let mut white_passed = false;
        let mut black_passed = false;

        let white_pawns = self.piece_bb(Color::White, PieceType::Pawn);
        let black_pawns = self.piece_bb(Color::Black, PieceType::Pawn);
        let all_pieces = self.occupied;
        let white_pawn_attacks = ((white_pawns & !A_FILE) << 7) | ((white_pawns & !H_FILE) << 9);
        let black_pawn_attacks = ((black_pawns & !H_FILE) >> 7) | ((black_pawns & !A_FILE) >> 9);

        let white_pawn_count = white_pawns.count_ones() as i32;
        let black_pawn_count = black_pawns.count_ones() as i32;
        let white_knight_count = self.piece_bb(Color::White, PieceType::Knight).count_ones() as i32;
        let black_knight_count = self.piece_bb(Color::Black, PieceType::Knight).count_ones() as i32;
        let white_bishop_count = self.piece_bb(Color::White, PieceType::Bishop).count_ones() as i32;
        let black_bishop_count = self.piece_bb(Color::Black, PieceType::Bishop).count_ones() as i32;
        let white_rook_count = self.piece_bb(Color::White, PieceType::Rook).count_ones() as i32;
        let black_rook_count = self.piece_bb(Color::Black, PieceType::Rook).count_ones() as i32;
        let white_queen_count = self.piece_bb(Color::White, PieceType::Queen).count_ones() as i32;
        let black_queen_count = self.piece_bb(Color::Black, PieceType::Queen).count_ones() as i32;

        let white_king_sq = self.king_sq(Color::White);
        let black_king_sq = self.king_sq(Color::Black);
        let white_king_zone = masks.king_zone[white_king_sq as usize];
        let black_king_zone = masks.king_zone[black_king_sq as usize];

        // Attackers of each king's zone, counted from the defender's side
        let mut white_king_attackers = 0i32;
        let mut white_king_attack_units = 0i32;
        let mut black_king_attackers = 0i32;
        let mut black_king_attack_units = 0i32;

        // White pawns
        let mut bb = white_pawns;
        while bb != 0 {
            let sq = pop_lsb(&mut bb);
            let file = file_of(sq) as i32;
            let rank = rank_of(sq) as i32;

            let pst_value = params.pst[0][sq as usize] as i32;
            let base = params.piece_values[0] as i32 + pst_value;
            mg_score += base;
            eg_score += base;

            // Doubled
            if masks.file[sq as usize] & white_pawns != BIT_SQUARES[sq as usize] {
                mg_score -= 10;
                eg_score -= 25;
            }

            // Isolated or connected
            if masks.neighbor_files[sq as usize] & white_pawns == 0 {
                mg_score -= 15;
                eg_score -= 15;
            } else {
                mg_score += 10;
                eg_score += 15;
            }

            if masks.white_passed[sq as usize] & black_pawns == 0 {
                let mut bonus = params.passed_pawn_bonus[rank as usize] as i32;
                let dist_own = (file - file_of(white_king_sq) as i32).abs() + (rank - rank_of(white_king_sq) as i32).abs();
                let dist_enemy =
                    (file - file_of(black_king_sq) as i32).abs() + (rank - rank_of(black_king_sq) as i32).abs();
                bonus += dist_enemy * 5 - dist_own * 2;
                if rank < 7 && all_pieces & BIT_SQUARES[sq as usize + 8] != 0 {
                    bonus /= 2;
                }
                mg_score += bonus;
                eg_score += bonus * 2;
                white_passed = true;
            }
        }

        // Black pawns
        let mut bb = black_pawns;
        while bb != 0 {
            let sq = pop_lsb(&mut bb);
            let file = file_of(sq) as i32;
            let rank = rank_of(sq) as i32;
            let pst_sq = (sq ^ 56) as usize;

            let pst_value = params.pst[0][pst_sq] as i32;
            let base = params.piece_values[0] as i32 + pst_value;
            mg_score -= base;
            eg_score -= base;

            if masks.file[sq as usize] & black_pawns != BIT_SQUARES[sq as usize] {
                mg_score += 10;
                eg_score += 25;
            }

            if masks.neighbor_files[sq as usize] & black_pawns == 0 {
                mg_score += 15;
                eg_score += 15;
            } else {
                mg_score -= 10;
                eg_score -= 15;
            }

            if masks.black_passed[sq as usize] & white_pawns == 0 {
                let mut bonus = params.passed_pawn_bonus[(7 - rank) as usize] as i32;
                let dist_own = (file - file_of(black_king_sq) as i32).abs() + (rank - rank_of(black_king_sq) as i32).abs();
                let dist_enemy =
                    (file - file_of(white_king_sq) as i32).abs() + (rank - rank_of(white_king_sq) as i32).abs();
                bonus += dist_enemy * 5 - dist_own * 2;
                if rank > 0 && all_pieces & BIT_SQUARES[sq as usize - 8] != 0 {
                    bonus /= 2;
                }
                mg_score -= bonus;
                eg_score -= bonus * 2;
                black_passed = true;
            }
        }

        // Everything else
        for color in [Color::White, Color::Black] {
            let is_white = color == Color::White;
            let sign: i32 = if is_white { 1 } else { -1 };
            let friendly_pawns = if is_white { white_pawns } else { black_pawns };
            let enemy_pawns = if is_white { black_pawns } else { white_pawns };
            let enemy_pawn_attacks = if is_white { black_pawn_attacks } else { white_pawn_attacks };
            let enemy_king_sq = if is_white { black_king_sq } else { white_king_sq };

            for piece_type in [PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen, PieceType::King]
            {
                let pt = piece_type as usize;
                let mut pieces = self.piece_bb(color, piece_type);

                while pieces != 0 {
                    let sq = pop_lsb(&mut pieces);
                    let pst_sq = if is_white { sq as usize } else { (sq ^ 56) as usize };

                    let pst_value = params.pst[pt][pst_sq] as i32;
                    let base_val = params.piece_values[pt] as i32 + pst_value;
                    mg_score += sign * base_val;

                    if piece_type == PieceType::King {
                        eg_score += sign * (params.piece_values[pt] as i32 + params.king_endgame[pst_sq] as i32);
                    } else {
                        eg_score += sign * base_val;
                    }

                    phase += PIECE_PHASE[pt];

                    if piece_type != PieceType::King {
                        let attacks = match piece_type {
                            PieceType::Knight => lookup_knight_attack(sq),
                            PieceType::Bishop => lookup_bishop_attack(sq, all_pieces),
                            PieceType::Rook => lookup_rook_attack(sq, all_pieces),
                            _ => lookup_queen_attack(sq, all_pieces),
                        };

                        // Squares covered by enemy pawns count at a quarter
                        let safe_moves = (attacks & !enemy_pawn_attacks).count_ones() as i32;
                        let unsafe_moves = (attacks & enemy_pawn_attacks).count_ones() as i32;
                        let effective_mobility = safe_moves as f64 + unsafe_moves as f64 * 0.25;
                        let mob_score = (sign as f64 * effective_mobility * params.mobility_bonus[pt]) as i32;
                        mg_score += mob_score;
                        eg_score += mob_score;

                        let zone_hits = attacks & if is_white { black_king_zone } else { white_king_zone };
                        if zone_hits != 0 {
                            let hits = zone_hits.count_ones() as i32;
                            if is_white {
                                black_king_attackers += 1;
                                black_king_attack_units += (params.piece_attack_value[pt] * hits as f64) as i32;
                            } else {
                                white_king_attackers += 1;
                                white_king_attack_units += (params.piece_attack_value[pt] * hits as f64) as i32;
                            }
                        }
                    }

                    if piece_type == PieceType::Knight {
                        let rank = rank_of(sq) as i32;
                        let outpost_rank = if is_white { (3..=5).contains(&rank) } else { (2..=4).contains(&rank) };
                        if outpost_rank {
                            let supportive = lookup_pawn_attack(sq, !is_white) & friendly_pawns;
                            let enemy = lookup_pawn_attack(sq, is_white) & enemy_pawns;
                            if supportive != 0 && enemy == 0 {
                                mg_score += (sign as f64 * params.knight_outpost_bonus[0]) as i32;
                                eg_score += (sign as f64 * params.knight_outpost_bonus[1]) as i32;
                            }
                        }
                    } else if piece_type == PieceType::Rook {
                        if masks.file[sq as usize] & friendly_pawns == 0 {
                            let mut bonus = params.rook_file_bonus[0] as i32;
                            if masks.file[sq as usize] & enemy_pawns == 0 {
                                bonus += params.rook_file_bonus[1] as i32;
                            }
                            mg_score += sign * bonus;
                            eg_score += sign * bonus;
                        }

                        let relative_rank = if is_white { rank_of(sq) as i32 } else { 7 - rank_of(sq) as i32 };
                        if relative_rank == 6 {
                            mg_score += sign * params.rook_seventh_bonus[0] as i32;
                            eg_score += sign * params.rook_seventh_bonus[1] as i32;
                            let enemy_king_rel_rank = if is_white {
                                rank_of(black_king_sq) as i32
                            } else {
                                7 - rank_of(white_king_sq) as i32
                            };
                            if enemy_king_rel_rank == 7 {
                                mg_score += sign * 10;
                                eg_score += sign * 15;
                            }
                        }
                    } else if piece_type != PieceType::King && phase > 8 {
                        // Bishops and queens near the enemy king
                        let dist = (file_of(sq) as i32 - file_of(enemy_king_sq) as i32).abs()
                            + (rank_of(sq) as i32 - rank_of(enemy_king_sq) as i32).abs();
                        if dist <= 3 {
                            mg_score += sign * 6;
                        }
                    }

                    if piece_type == PieceType::Bishop {
                        let dark_squared = (file_of(sq) + rank_of(sq)) & 1 == 0;
                        if is_white {
                            if dark_squared {
                                white_dark_bishop = true;
                            } else {
                                white_light_bishop = true;
                            }
                        } else if dark_squared {
                            black_dark_bishop = true;
                        } else {
                            black_light_bishop = true;
                        }

                        // Own pawns fixed on the bishop's color hem it in,
                        // worst in the central sixteen squares
                        let same_color_squares = if dark_squared { DARK_SQUARES } else { LIGHT_SQUARES };
                        let blocked_central =
                            (friendly_pawns & same_color_squares & CENTRAL_SQUARES).count_ones() as i32;
                        let blocked_other =
                            (friendly_pawns & same_color_squares & !CENTRAL_SQUARES).count_ones() as i32;
                        let penalty = blocked_central * params.bad_bishop_penalty[0] as i32
                            + blocked_other * params.bad_bishop_penalty[1] as i32;
                        mg_score -= sign * penalty;
                        eg_score -= sign * (penalty as f64 / 1.5) as i32;
                    }
                }
            }
        }

        mg_score += development(self, params, phase);

        if phase > 0 {
            mg_score += king_safety(
                self,
                params,
                masks,
                true,
                white_pawns,
                black_pawns,
                phase,
                white_king_attackers,
                white_king_attack_units,
            );
            mg_score -= king_safety(
                self,
                params,
                masks,
                false,
                black_pawns,
                white_pawns,
                phase,
                black_king_attackers,
                black_king_attack_units,
            );
        }

        if phase > 12 {
            let w_rank = rank_of(white_king_sq) as i32;
            if w_rank < 2 {
                if masks.file[white_king_sq as usize] & white_pawns == 0 {
                    mg_score -= 25;
                } else if lookup_pawn_attack(white_king_sq, false) & white_pawns == 0 {
                    mg_score -= 10;
                }
                if masks.neighbor_files[white_king_sq as usize] & white_pawns == 0 {
                    mg_score -= 10;
                }
            }
            let b_rank = rank_of(black_king_sq) as i32;
            if b_rank > 5 {
                if masks.file[black_king_sq as usize] & black_pawns == 0 {
                    mg_score += 25;
                } else if lookup_pawn_attack(black_king_sq, true) & black_pawns == 0 {
                    mg_score += 10;
                }
                if masks.neighbor_files[black_king_sq as usize] & black_pawns == 0 {
                    mg_score += 10;
                }
            }
        }

        if white_bishop_count >= 2 {
            mg_score += 20;
            eg_score += 40;
        }
        if black_bishop_count >= 2 {
            mg_score -= 20;
            eg_score -= 40;
        }

        let total_non_pawn = white_knight_count
            + white_bishop_count
            + white_rook_count
            + white_queen_count
            + black_knight_count
            + black_bishop_count
            + black_rook_count
            + black_queen_count;
        let total_pawns = white_pawn_count + black_pawn_count;

        // Trivially drawn material
        if total_pawns == 0 {
            if total_non_pawn == 0 {
                return 0;
            }
            if total_non_pawn == 1
                && white_bishop_count + black_bishop_count + white_knight_count + black_knight_count == 1
            {
                return 0;
            }
            if total_non_pawn == 2 && white_bishop_count == 1 && black_bishop_count == 1 {
                return 0;
            }
        }

        let final_phase = phase.min(MAX_PHASE);
        let mut score = (mg_score * final_phase + eg_score * (MAX_PHASE - final_phase)) / MAX_PHASE;

        // Opposite-colored bishops drag low-material endings toward a draw
        let white_only_light = white_light_bishop && !white_dark_bishop && white_bishop_count > 0;
        let white_only_dark = white_dark_bishop && !white_light_bishop && white_bishop_count > 0;
        let black_only_light = black_light_bishop && !black_dark_bishop && black_bishop_count > 0;
        let black_only_dark = black_dark_bishop && !black_light_bishop && black_bishop_count > 0;
        let ocb = (white_only_light && black_only_dark) || (white_only_dark && black_only_light);
        let no_majors_no_knights = white_rook_count
            + black_rook_count
            + white_queen_count
            + black_queen_count
            + white_knight_count
            + black_knight_count
            == 0;
        if ocb && no_majors_no_knights {
            let mut scale = 4;
            if !white_passed && !black_passed && total_pawns <= 4 {
                scale = 8;
            }
            score /= scale;
        }

        // Approaching the fifty-move rule flattens everything
        let fifty_remaining = (100 - self.halfmove_clock as i32).max(0);
        if fifty_remaining < 20 {
            score = score * fifty_remaining / 20;
        }

        // Mop-up: drive the losing king to the edge, bring ours closer
        if phase < 6 {
            let winning_white = score > 0;
            let winning_king = if winning_white { white_king_sq } else { black_king_sq };
            let losing_king = if winning_white { black_king_sq } else { white_king_sq };
            let lk_rank = rank_of(losing_king) as i32;
            let lk_file = file_of(losing_king) as i32;
            let lk_dist_center = (3 - lk_file).max(lk_file - 4) + (3 - lk_rank).max(lk_rank - 4);
            let dist_kings = (lk_file - file_of(winning_king) as i32).abs()
                + (lk_rank - rank_of(winning_king) as i32).abs();
            let mop_up = lk_dist_center * 10 + (14 - dist_kings) * 4;
            if winning_white {
                score += mop_up;
            } else {
                score -= mop_up;
            }
        }

        // No side-to-move tempo term
        if self.side_to_move == Color::White { score } else { -score }
    }
}

fn development(board: &Board, params: &EvalParams, phase: i32) -> i32 {
    if phase < 16 {
        return 0;
    }

    let undeveloped_penalty = params.development_weights[0] as i32;
    let castle_king_bonus = params.development_weights[1] as i32;
    let castle_queen_bonus = params.development_weights[2] as i32;
    let castled_bonus = params.development_weights[3] as i32;

    let white_minor = board.piece_bb(Color::White, PieceType::Knight) | board.piece_bb(Color::White, PieceType::Bishop);
    let black_minor = board.piece_bb(Color::Black, PieceType::Knight) | board.piece_bb(Color::Black, PieceType::Bishop);

    let mut score = 0;
    score -= (white_minor & RANK_1).count_ones() as i32 * undeveloped_penalty;
    score += (black_minor & RANK_8).count_ones() as i32 * undeveloped_penalty;

    if board.castling_rights & WHITE_KINGSIDE != 0 {
        score += castle_king_bonus;
    }
    if board.castling_rights & WHITE_QUEENSIDE != 0 {
        score += castle_queen_bonus;
    }
    if board.castling_rights & BLACK_KINGSIDE != 0 {
        score -= castle_king_bonus;
    }
    if board.castling_rights & BLACK_QUEENSIDE != 0 {
        score -= castle_queen_bonus;
    }

    let white_king_file = file_of(board.king_sq(Color::White));
    let black_king_file = file_of(board.king_sq(Color::Black));
    if white_king_file <= 1 || white_king_file >= 6 {
        score += castled_bonus;
    }
    if black_king_file <= 1 || black_king_file >= 6 {
        score -= castled_bonus;
    }

    score
}

#[allow(clippy::too_many_arguments)]
fn king_safety(
    board: &Board,
    params: &EvalParams,
    masks: &EvalMasks,
    white: bool,
    friendly_pawns: u64,
    enemy_pawns: u64,
    phase: i32,
    attackers: i32,
    attack_units: i32,
) -> i32 {
    if phase < 10 || attackers == 0 {
        return 0;
    }
    let attackers = attackers.min(8) as usize;

    let shield_value = params.king_shield_values[0] as i32;
    let semi_open_penalty = params.king_shield_values[1] as i32;
    let open_extra_penalty = params.king_shield_values[2] as i32;

    let mut safety = 0;
    safety -= ((attack_units as f64 * params.attack_weight[attackers]) / 100.0) as i32;

    let king_sq = board.king_sq(if white { Color::White } else { Color::Black });
    let king_zone = masks.king_zone[king_sq as usize];

    let shield_zone = if white { king_zone & WHITE_SHIELD_RANKS } else { king_zone & BLACK_SHIELD_RANKS };
    safety += (friendly_pawns & shield_zone).count_ones() as i32 * shield_value;

    let king_file = file_of(king_sq) as i32;
    for file in (king_file - 1).max(0)..=(king_file + 1).min(7) {
        let file_mask = A_FILE << file;
        if file_mask & friendly_pawns == 0 {
            safety -= semi_open_penalty;
            if file_mask & enemy_pawns == 0 {
                safety -= open_extra_penalty;
            }
        }
    }

    safety
}

#[cfg(test)]
mod evaluate_tests {
    use super::*;
    use crate::eval_params::EvalParams;

    #[test]
    fn starting_position_is_balanced() {
        let params = EvalParams::defaults();
        let board = Board::startpos();
        assert_eq!(board.evaluate(&params), 0);
    }

    #[test]
    fn score_negates_with_the_side_to_move() {
        let params = EvalParams::defaults();
        let white = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        let black = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1").unwrap();
        assert_eq!(white.evaluate(&params), -black.evaluate(&params));
    }

    #[test]
    fn material_advantage_shows_up() {
        let params = EvalParams::defaults();
        let board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(board.evaluate(&params) > 500);
    }

    #[test]
    fn insufficient_material_is_drawn() {
        let params = EvalParams::defaults();
        for fen in [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/2B1K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/2N1K3 b - - 0 1",
            "2b1k3/8/8/8/8/8/8/2B1K3 w - - 0 1",
        ] {
            let board = Board::from_fen(fen).unwrap();
            assert_eq!(board.evaluate(&params), 0, "{fen}");
        }
    }

    #[test]
    fn mop_up_prefers_cornered_defender_and_close_kings() {
        let params = EvalParams::defaults();
        let cornered = Board::from_fen("k7/8/1K6/8/8/8/8/1Q6 w - - 0 1").unwrap();
        let central = Board::from_fen("8/8/3k4/8/8/3K4/8/1Q6 w - - 0 1").unwrap();
        assert!(cornered.evaluate(&params) > central.evaluate(&params));
    }

    #[test]
    fn fifty_move_proximity_scales_the_score_down() {
        let params = EvalParams::defaults();
        let fresh = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let stale = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 95 1").unwrap();
        let fresh_score = fresh.evaluate(&params);
        let stale_score = stale.evaluate(&params);
        assert!(stale_score.abs() < fresh_score.abs());
        assert!(stale_score > 0);
    }

    #[test]
    fn material_helpers() {
        let startpos = Board::startpos();
        assert!(startpos.has_non_pawn_material());
        assert!(!startpos.is_low_material_ending());

        let kpk = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        assert!(!kpk.has_non_pawn_material());
        assert!(kpk.is_low_material_ending());
    }

    #[test]
    fn passed_pawn_outweighs_a_blocked_one() {
        let params = EvalParams::defaults();
        // Same material; in the second position the pawn's path is blocked
        // by the enemy king standing right in front of it
        let running = Board::from_fen("4k3/8/8/8/1P6/8/8/4K3 w - - 0 1").unwrap();
        let blocked = Board::from_fen("8/8/8/1k6/1P6/8/8/4K3 w - - 0 1").unwrap();
        assert!(running.evaluate(&params) > blocked.evaluate(&params));
    }
}
