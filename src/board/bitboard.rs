//! Fixed-size cell set over the whole board
//!
//! Used for the move frontier and for de-duplicating cells during the
//! incremental priority refresh. Iteration is always in index order, which
//! keeps every consumer deterministic.

use super::{Pos, TOTAL_CELLS};

const WORDS: usize = TOTAL_CELLS.div_ceil(64);

/// One bit per cell. 6 x u64 cover the 361 cells (384 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitboard {
    bits: [u64; WORDS],
}

impl Bitboard {
    /// Create empty bitboard
    pub const fn new() -> Self {
        Self { bits: [0; WORDS] }
    }

    /// Add a cell. Returns `true` if it was not present before.
    #[inline]
    pub fn insert(&mut self, pos: Pos) -> bool {
        let (word, mask) = Self::slot(pos);
        let fresh = self.bits[word] & mask == 0;
        self.bits[word] |= mask;
        fresh
    }

    /// Remove a cell. Returns `true` if it was present.
    #[inline]
    pub fn remove(&mut self, pos: Pos) -> bool {
        let (word, mask) = Self::slot(pos);
        let present = self.bits[word] & mask != 0;
        self.bits[word] &= !mask;
        present
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        let (word, mask) = Self::slot(pos);
        self.bits[word] & mask != 0
    }

    /// Number of cells in the set
    #[inline]
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    pub fn clear(&mut self) {
        self.bits = [0; WORDS];
    }

    /// `n`-th cell in index order.
    pub fn nth(&self, mut n: usize) -> Option<Pos> {
        for (word_idx, &word) in self.bits.iter().enumerate() {
            let ones = word.count_ones() as usize;
            if n >= ones {
                n -= ones;
                continue;
            }
            let mut rest = word;
            for _ in 0..n {
                rest &= rest - 1;
            }
            return Some(Pos::from_index(word_idx * 64 + rest.trailing_zeros() as usize));
        }
        None
    }

    /// Iterate over set bit positions
    pub fn iter(&self) -> BitboardIter {
        BitboardIter {
            bits: self.bits,
            word_idx: 0,
            current_word: self.bits[0],
        }
    }

    #[inline]
    fn slot(pos: Pos) -> (usize, u64) {
        let idx = pos.to_index();
        (idx / 64, 1u64 << (idx % 64))
    }
}

impl FromIterator<Pos> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Pos>>(iter: I) -> Self {
        let mut set = Bitboard::new();
        for pos in iter {
            set.insert(pos);
        }
        set
    }
}

/// Iterator over set bits in a Bitboard
pub struct BitboardIter {
    bits: [u64; WORDS],
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitboardIter {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current_word == 0 {
            self.word_idx += 1;
            if self.word_idx >= WORDS {
                return None;
            }
            self.current_word = self.bits[self.word_idx];
        }

        let bit_pos = self.current_word.trailing_zeros() as usize;
        let idx = self.word_idx * 64 + bit_pos;
        self.current_word &= self.current_word - 1;

        // Only cells ever get inserted, so idx < TOTAL_CELLS
        Some(Pos::from_index(idx))
    }
}
