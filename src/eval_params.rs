/// Evaluation weights kept as doubles so tuning pipelines can nudge them in
/// fractional steps; evaluation truncates to centipawns at the point of use.
#[derive(Clone)]
pub struct EvalParams {
    pub piece_values: [f64; 7],
    pub mobility_bonus: [f64; 7],
    /// Indexed by attacker count, clamped to 8
    pub attack_weight: [f64; 9],
    pub piece_attack_value: [f64; 7],
    /// Indexed by the pawn's relative rank
    pub passed_pawn_bonus: [f64; 8],
    /// (midgame, endgame)
    pub knight_outpost_bonus: [f64; 2],
    /// (semi-open, extra when fully open)
    pub rook_file_bonus: [f64; 2],
    /// (undeveloped minor, kingside right, queenside right, castled king)
    pub development_weights: [f64; 4],
    /// (shield pawn, semi-open file, extra when fully open)
    pub king_shield_values: [f64; 3],
    /// (midgame, endgame)
    pub rook_seventh_bonus: [f64; 2],
    /// (central blocked pawn, other blocked pawn)
    pub bad_bishop_penalty: [f64; 2],
    /// [pawn, knight, bishop, rook, queen, king middlegame][square]
    pub pst: [[f64; 64]; 6],
    pub king_endgame: [f64; 64],
}

#[rustfmt::skip]
const PAWN_PST: [i16; 64] = [
    0,   0,   0,   0,   0,   0,   0,   0,
    5,   5,   5,  -20, -20,  5,   5,   5,
    5,   5,   5,   5,   5,   5,   5,   5,
    5,  10,  20,  35,  35,  20,  10,  5,
    10, 20,  25,  30,  30,  25,  20,  10,
    20, 30,  35,  55,  55,  35,  30,  20,
    50, 60,  70,  80,  80,  70,  60,  50,
    0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i16; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,   5,   5,   0, -20,-40,
    -30,  5,  20,  25,  25,  20,  5, -30,
    -30,  5,  25,  30,  30,  25,  5, -30,
    -30,  0,  25,  30,  30,  25,  0, -30,
    -30,  5,  15,  20,  20,  15,  5, -30,
    -40,-20,  0,   5,   5,   0, -20,-40,
    -50,-40,-20,-30,-30,-20,-40,-50,
];

#[rustfmt::skip]
const BISHOP_PST: [i16; 64] = [
    -20,-10,-40,-10,-10,-40,-10,-20,
    -10,  25,  10,  10,  10,  10,  25,-10,
    -10,  10,  15,  15,  15,  15,  10,-10,
    -10,  10,  15,  20,  20,  15,  10,-10,
    -10,  10,  15,  20,  20,  15,  10,-10,
    -10,  15,  15,  15,  15,  15,  15,-10,
    -10,  25,  10,  10,  10,  10,  25,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_PST: [i16; 64] = [
    5,   5,   10,  10,  10,  10,  5,   5,
    0,   0,   0,   0,   0,   0,   0,   0,
    0,   0,   0,   0,   0,   0,   0,   0,
    0,   0,   0,   0,   0,   0,   0,   0,
    0,   0,   0,   0,   0,   0,   0,   0,
    0,   0,   0,   0,   0,   0,   0,   0,
    20,  20,  20,  20,  20,  20,  20,  20,
    0,   5,   5,   5,   5,   5,   5,   0,
];

#[rustfmt::skip]
const QUEEN_PST: [i16; 64] = [
    -20,-10,-10, -5,  -5, -10,-10,-20,
    -10,  0,   0,   0,   0,   0,   0, -10,
    -10,  0,   5,   5,   5,   5,   0, -10,
    -5,   0,   5,   10,  10,  5,   0,  -5,
    -5,   0,   5,   10,  10,  5,   0,  -5,
    -10,  0,   5,   5,   5,   5,   0, -10,
    -10,  0,   0,   0,   0,   0,   0, -10,
    -20,-10,-10, -5,  -5, -10,-10,-20,
];

#[rustfmt::skip]
const KING_MIDGAME_PST: [i16; 64] = [
    -40,-50,-50,-60,-60,-50,-50,-40,
    -40,-50,-50,-60,-60,-50,-50,-40,
    -40,-50,-50,-60,-60,-50,-50,-40,
    -40,-50,-50,-60,-60,-50,-50,-40,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    10,  10, -10, -20, -20, -10,  10,  10,
    10,  25,  30,  -15,  0,  -15,  30,  25,
];

#[rustfmt::skip]
const KING_ENDGAME_PST: [i16; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0, -10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

impl EvalParams {
    pub fn defaults() -> EvalParams {
        EvalParams {
            piece_values: [99.1802, 315.696, 379.541, 541.839, 1045.78, 20000.2, 0.0],
            mobility_bonus: [0.558513, 6.02874, 6.76868, 4.99854, 5.36574, -1.17361, 1.06308],
            attack_weight: [
                -1.38263, 3.8379, 39.6664, 51.0186, 85.7022, 74.4797, 64.7077, 86.6042, 116.352,
            ],
            piece_attack_value: [-0.127949, 9.01816, 17.0672, 41.3365, 62.978, -0.344534, -1.83642],
            passed_pawn_bonus: [-2.11314, -2.56899, 12.6536, 10.6128, 44.3603, 85.3953, 131.088, 2.05708],
            knight_outpost_bonus: [15.1689, 11.0465],
            rook_file_bonus: [16.7742, 10.5363],
            development_weights: [23.0955, 12.6867, 8.71504, 36.1943],
            king_shield_values: [10.5231, 20.2514, 16.2529],
            rook_seventh_bonus: [25.0444, 39.8164],
            bad_bishop_penalty: [12.2557, 3.85626],
            pst: [
                PAWN_PST.map(f64::from),
                KNIGHT_PST.map(f64::from),
                BISHOP_PST.map(f64::from),
                ROOK_PST.map(f64::from),
                QUEEN_PST.map(f64::from),
                KING_MIDGAME_PST.map(f64::from),
            ],
            king_endgame: KING_ENDGAME_PST.map(f64::from),
        }
    }
}

impl Default for EvalParams {
    fn default() -> Self {
        EvalParams::defaults()
    }
}
