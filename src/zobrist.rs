use std::sync::LazyLock;

/// Deterministic key schedule so hashes are reproducible across runs.
pub struct ZobristKeys {
    /// [color][piece type][square]
    pub piece: [[[u64; 64]; 6]; 2],
    /// Indexed directly by the castling rights bitmask
    pub castling: [u64; 16],
    /// Indexed by the file of the en passant square
    pub ep_file: [u64; 8],
    pub side_to_move: u64,
}

const SEED: u64 = 0x123456789abcdef;

pub static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(|| {
    let mut state = SEED;
    let mut keys = ZobristKeys {
        piece: [[[0; 64]; 6]; 2],
        castling: [0; 16],
        ep_file: [0; 8],
        side_to_move: 0,
    };

    for color in 0..2 {
        for piece_type in 0..6 {
            for square in 0..64 {
                keys.piece[color][piece_type][square] = splitmix64(&mut state);
            }
        }
    }
    for rights in 0..16 {
        keys.castling[rights] = splitmix64(&mut state);
    }
    for file in 0..8 {
        keys.ep_file[file] = splitmix64(&mut state);
    }
    keys.side_to_move = splitmix64(&mut state);

    keys
});

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod zobrist_tests {
    use super::*;

    #[test]
    fn keys_are_deterministic() {
        let mut state = SEED;
        let first = splitmix64(&mut state);
        assert_eq!(first, ZOBRIST.piece[0][0][0]);
    }

    #[test]
    fn keys_are_distinct() {
        let keys = &*ZOBRIST;
        assert_ne!(keys.piece[0][0][0], keys.piece[1][0][0]);
        assert_ne!(keys.castling[1], keys.castling[2]);
        assert_ne!(keys.side_to_move, 0);

        // No collisions anywhere in the schedule
        let mut all: Vec<u64> = Vec::new();
        for c in 0..2 {
            for pt in 0..6 {
                all.extend_from_slice(&keys.piece[c][pt]);
            }
        }
        all.extend_from_slice(&keys.castling);
        all.extend_from_slice(&keys.ep_file);
        all.push(keys.side_to_move);
        let count = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), count);
    }
}
