use crate::moves::Move;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Bound {
    Exact = 1,
    Lower = 2,
    Upper = 3,
}

#[derive(Clone, Copy)]
pub struct TTEntry {
    pub key: u64,
    pub depth: i32,
    pub score: i32,
    pub best_move: Move,
    pub bound: Bound,
}

impl Default for TTEntry {
    fn default() -> Self {
        TTEntry {
            key: 0,
            depth: -1,
            score: 0,
            best_move: Move::NULL,
            bound: Bound::Upper,
        }
    }
}

/// Direct-mapped cache over the Zobrist hash. A slot is overwritten when it
/// is empty or the incoming entry searched at least as deep.
pub struct TranspositionTable {
    table: Vec<TTEntry>,
    size_mb: usize,
}

impl TranspositionTable {
    pub fn with_mb(size_mb: usize) -> TranspositionTable {
        let bytes = size_mb * 1024 * 1024;
        let max_entries = bytes / std::mem::size_of::<TTEntry>();

        // Round down to a power of two so indexing is a mask
        let mut entries = 1;
        while entries * 2 <= max_entries {
            entries *= 2;
        }

        TranspositionTable {
            table: vec![TTEntry::default(); entries],
            size_mb,
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        key as usize & (self.table.len() - 1)
    }

    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        let entry = self.table[self.index(key)];
        if entry.key == key { Some(entry) } else { None }
    }

    pub fn store(&mut self, key: u64, depth: i32, score: i32, best_move: Move, bound: Bound) {
        let index = self.index(key);
        let entry = &mut self.table[index];
        if entry.key == 0 || depth >= entry.depth {
            *entry = TTEntry {
                key,
                depth,
                score,
                best_move,
                bound,
            };
        }
    }

    pub fn clear(&mut self) {
        self.table.iter_mut().for_each(|e| *e = TTEntry::default());
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn size_mb(&self) -> usize {
        self.size_mb
    }

    /// Permille occupancy estimate from a fixed-size sample.
    pub fn hashfull(&self) -> u32 {
        let sample = self.table.len().min(1000);
        let used = self.table[..sample].iter().filter(|e| e.key != 0).count();
        (used * 1000 / sample) as u32
    }
}

#[cfg(test)]
mod transposition_table_tests {
    use super::*;

    #[test]
    fn size_rounds_down_to_a_power_of_two() {
        let tt = TranspositionTable::with_mb(2);
        assert!(tt.len().is_power_of_two());
        assert!(tt.len() * std::mem::size_of::<TTEntry>() <= 2 * 1024 * 1024);
    }

    #[test]
    fn store_and_probe_round_trip() {
        let mut tt = TranspositionTable::with_mb(1);
        let key = 0xdeadbeefcafef00d;
        tt.store(key, 5, 42, Move::normal(12, 28), Bound::Exact);

        let entry = tt.probe(key).unwrap();
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.score, 42);
        assert_eq!(entry.best_move, Move::normal(12, 28));
        assert_eq!(entry.bound, Bound::Exact);

        assert!(tt.probe(key ^ 1).is_none());
    }

    #[test]
    fn shallower_entries_do_not_replace_deeper_ones() {
        let mut tt = TranspositionTable::with_mb(1);
        let key = 0x1234567890abcdef;
        tt.store(key, 8, 100, Move::normal(0, 1), Bound::Exact);
        tt.store(key, 3, -50, Move::normal(1, 2), Bound::Lower);

        let entry = tt.probe(key).unwrap();
        assert_eq!(entry.depth, 8);
        assert_eq!(entry.score, 100);
    }

    #[test]
    fn hashfull_grows_with_stores() {
        let mut tt = TranspositionTable::with_mb(1);
        assert_eq!(tt.hashfull(), 0);
        // Fill the sampled prefix directly
        for i in 0..500u64 {
            // Keys that index into the first slots; key 0 marks empty so skip it
            let key = i * tt.len() as u64 + i + 1;
            tt.store(key, 1, 0, Move::NULL, Bound::Exact);
        }
        assert!(tt.hashfull() > 0);
    }

    #[test]
    fn clear_empties_the_table() {
        let mut tt = TranspositionTable::with_mb(1);
        tt.store(0xabcdef, 4, 10, Move::NULL, Bound::Upper);
        tt.clear();
        assert!(tt.probe(0xabcdef).is_none());
        assert_eq!(tt.hashfull(), 0);
    }
}
