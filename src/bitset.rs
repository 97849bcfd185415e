//! Growable packed bitset.
//!
//! Values are packed into `u32` words, 32 values per word:
//!
//! ```text
//! Word 0: [v 31] [v 30] ... [v 1] [v 0]    (LSB = v 0)
//! Word 1: [v 63] [v 62] ... [v 33] [v 32]
//! ```
//!
//! A value past the last stored word is simply absent. The bitset grows with
//! zeroed words when a larger value is inserted and never shrinks.

use serde::{Deserialize, Serialize};

/// Storage word of every bitset.
///
/// Binned split masks arrive from training packed into `u32` words and are
/// adopted verbatim, so this must stay in lockstep with that format.
pub type Word = u32;

/// Number of values stored per [`Word`].
pub const WORD_BITS: u32 = Word::BITS;

/// Words past this count hold no `u32` value.
const MAX_WORDS: usize = (u32::MAX / WORD_BITS) as usize + 1;

/// Split a value into `(word_idx, bit_idx)`.
#[inline]
fn locate(value: u32) -> (usize, u32) {
    ((value / WORD_BITS) as usize, value % WORD_BITS)
}

// =============================================================================
// Bitset
// =============================================================================

/// Set of small non-negative integers stored as packed `u32` words.
///
/// Bit `b` of word `w` represents the value `32 * w + b`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bitset {
    words: Vec<Word>,
}

impl Bitset {
    /// Create an empty bitset with no words.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt already packed words as-is.
    pub fn from_words(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Check whether `value` is in the set.
    ///
    /// Values beyond the stored words are reported as absent.
    #[inline]
    pub fn contains(&self, value: u32) -> bool {
        let (word_idx, bit_idx) = locate(value);
        match self.words.get(word_idx) {
            Some(&word) => (word >> bit_idx) & 1 != 0,
            None => false,
        }
    }

    /// Add `value` to the set, growing with zeroed words when needed.
    pub fn insert(&mut self, value: u32) {
        let (word_idx, bit_idx) = locate(value);
        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }
        self.words[word_idx] |= 1 << bit_idx;
    }

    /// The packed words.
    #[inline]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    #[inline]
    pub fn n_words(&self) -> usize {
        self.words.len()
    }

    /// Number of representable values, `32 * n_words`.
    #[inline]
    pub fn bit_len(&self) -> u64 {
        self.words.len() as u64 * u64::from(WORD_BITS)
    }

    /// Number of values in the set.
    pub fn count(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// True when no bit is set, regardless of how many words are stored.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Largest value in the set, if any.
    pub fn last(&self) -> Option<u32> {
        let words = &self.words[..self.words.len().min(MAX_WORDS)];
        let (word_idx, &word) = words.iter().enumerate().rev().find(|(_, &w)| w != 0)?;
        Some(word_idx as u32 * WORD_BITS + (WORD_BITS - 1 - word.leading_zeros()))
    }

    /// Iterate over the values in the set in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        let words = &self.words[..self.words.len().min(MAX_WORDS)];
        Iter {
            words,
            word_idx: 0,
            current: words.first().copied().unwrap_or(0),
        }
    }
}

impl FromIterator<u32> for Bitset {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut bitset = Self::new();
        bitset.extend(iter);
        bitset
    }
}

impl Extend<u32> for Bitset {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a> IntoIterator for &'a Bitset {
    type Item = u32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over the values of a [`Bitset`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    words: &'a [Word],
    word_idx: usize,
    /// Remaining unvisited bits of `words[word_idx]`.
    current: Word,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        loop {
            if self.current != 0 {
                let bit_idx = self.current.trailing_zeros();
                // Clear the lowest set bit.
                self.current &= self.current - 1;
                return Some(self.word_idx as u32 * WORD_BITS + bit_idx);
            }
            self.word_idx += 1;
            self.current = *self.words.get(self.word_idx)?;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bitset() {
        let bs = Bitset::new();
        assert!(bs.is_empty());
        assert_eq!(bs.n_words(), 0);
        assert!(!bs.contains(0));
        assert!(!bs.contains(u32::MAX));
        assert_eq!(bs.iter().next(), None);
    }

    #[test]
    fn insert_single_word() {
        let mut bs = Bitset::new();
        bs.insert(0);
        bs.insert(3);
        bs.insert(31);

        assert_eq!(bs.words(), &[0x8000_0009]);
        assert!(bs.contains(0));
        assert!(bs.contains(3));
        assert!(bs.contains(31));
        assert!(!bs.contains(1));
        assert!(!bs.contains(32));
        assert_eq!(bs.count(), 3);
    }

    #[test]
    fn insert_grows_with_zeroed_words() {
        let mut bs = Bitset::new();
        bs.insert(5);
        bs.insert(100); // word 3, bit 4

        assert_eq!(bs.n_words(), 4);
        assert_eq!(bs.words(), &[0b10_0000, 0, 0, 0b1_0000]);
        assert_eq!(bs.bit_len(), 128);
        assert!(bs.contains(5));
        assert!(bs.contains(100));
        assert!(!bs.contains(64));
    }

    #[test]
    fn insert_is_idempotent() {
        let mut once = Bitset::new();
        once.insert(42);

        let mut twice = Bitset::new();
        twice.insert(42);
        twice.insert(42);

        assert_eq!(once, twice);
        assert_eq!(twice.count(), 1);
    }

    #[test]
    fn beyond_length_is_absent() {
        let bs = Bitset::from_words(vec![u32::MAX]);
        assert!(bs.contains(31));
        assert!(!bs.contains(32));
        assert!(!bs.contains(1_000_000));
    }

    #[test]
    fn zero_words_are_empty() {
        let bs = Bitset::from_words(vec![0, 0, 0]);
        assert!(bs.is_empty());
        assert_eq!(bs.n_words(), 3);
        assert_eq!(bs.count(), 0);
    }

    #[test]
    fn iter_ascending_across_words() {
        let bs: Bitset = [64, 1, 35, 0, 31].into_iter().collect();
        let values: Vec<u32> = bs.iter().collect();
        assert_eq!(values, vec![0, 1, 31, 35, 64]);
    }

    #[test]
    fn iter_skips_empty_words() {
        let bs = Bitset::from_words(vec![0, 0, 0b100]);
        assert_eq!((&bs).into_iter().collect::<Vec<_>>(), vec![66]);
    }

    #[test]
    fn last_ignores_trailing_zero_words() {
        assert_eq!(Bitset::new().last(), None);
        assert_eq!(Bitset::from_words(vec![0, 0]).last(), None);
        assert_eq!(Bitset::from_words(vec![0b1, 0b100, 0]).last(), Some(34));
        assert_eq!(Bitset::from_words(vec![0x8000_0000]).last(), Some(31));
    }

    #[test]
    fn serde_is_transparent() {
        let bs = Bitset::from_words(vec![5, 1]);
        let json = serde_json::to_string(&bs).unwrap();
        assert_eq!(json, "[5,1]");
        let back: Bitset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bs);
    }
}
