//! Fixed size bit sets, the storage behind every fragment.

use std::{fmt::Display, str::FromStr};

use context_error::*;
use serde::{Deserialize, Serialize};

type Word = u64;
const WORD_BITS: usize = Word::BITS as usize;

/// A fixed size set of bits, densely packed in 64 bit words.
///
/// The size is set at construction and never changes. All operations that take an index panic
/// if the index is equal to or greater than the size. Bits outside of the size are always kept
/// unset, so two sets of the same size are equal exactly if the same indices are set.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "StoredBitSet")]
pub struct BitSet {
    size: usize,
    words: Vec<Word>,
}

/// The serialised form, checked before it becomes a [`BitSet`]
#[derive(Deserialize)]
struct StoredBitSet {
    size: usize,
    words: Vec<Word>,
}

impl TryFrom<StoredBitSet> for BitSet {
    type Error = String;

    fn try_from(value: StoredBitSet) -> Result<Self, Self::Error> {
        let expected = num_words(value.size);
        if value.words.len() != expected {
            return Err(format!(
                "A bit set of size {} needs {expected} words but {} were given",
                value.size,
                value.words.len()
            ));
        }
        let result = Self {
            size: value.size,
            words: value.words,
        };
        let mut trimmed = result.clone();
        trimmed.clear_excess_bits();
        if trimmed == result {
            Ok(result)
        } else {
            Err(format!(
                "A bit set of size {} has bits set outside of its size",
                value.size
            ))
        }
    }
}

const fn num_words(size: usize) -> usize {
    size.div_ceil(WORD_BITS)
}

const fn word_mask(index: usize) -> (usize, Word) {
    (index / WORD_BITS, 1 << (index % WORD_BITS))
}

impl BitSet {
    /// Create a new set with the given size and no bits set.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            words: vec![0; num_words(size)],
        }
    }

    /// Create a new set with the given size and all bits set.
    pub fn filled(size: usize) -> Self {
        let mut result = Self {
            size,
            words: vec![Word::MAX; num_words(size)],
        };
        result.clear_excess_bits();
        result
    }

    /// Create a new set with the given size and only the given indices set.
    /// # Panics
    /// If any of the indices is out of range.
    pub fn from_indices(size: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut result = Self::new(size);
        for index in indices {
            result.set(index);
        }
        result
    }

    fn clear_excess_bits(&mut self) {
        let used = self.size % WORD_BITS;
        if used > 0
            && let Some(last) = self.words.last_mut()
        {
            *last &= (1 << used) - 1;
        }
    }

    /// The number of bits in this set, this is fixed at construction.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Check if the bit at the given index is set.
    /// # Panics
    /// If the index is out of range.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(
            index < self.size,
            "Bit index {index} out of range for a set of size {}",
            self.size
        );
        let (word, mask) = word_mask(index);
        self.words[word] & mask != 0
    }

    /// Set the bit at the given index.
    /// # Panics
    /// If the index is out of range.
    #[inline]
    pub fn set(&mut self, index: usize) {
        assert!(
            index < self.size,
            "Bit index {index} out of range for a set of size {}",
            self.size
        );
        let (word, mask) = word_mask(index);
        self.words[word] |= mask;
    }

    /// Unset the bit at the given index.
    /// # Panics
    /// If the index is out of range.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        assert!(
            index < self.size,
            "Bit index {index} out of range for a set of size {}",
            self.size
        );
        let (word, mask) = word_mask(index);
        self.words[word] &= !mask;
    }

    /// Set or unset the bit at the given index.
    /// # Panics
    /// If the index is out of range.
    #[inline]
    pub fn set_value(&mut self, index: usize, value: bool) {
        if value {
            self.set(index);
        } else {
            self.clear(index);
        }
    }

    /// Unset all bits, the size stays the same.
    pub fn nullify(&mut self) {
        self.words.fill(0);
    }

    /// The number of set bits.
    pub fn cardinality(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Check if no bits are set.
    pub fn is_clear(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Iterate over the indices of all set bits, in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(index, word)| {
            let mut word = *word;
            std::iter::from_fn(move || {
                (word != 0).then(|| {
                    let bit = word.trailing_zeros() as usize;
                    word &= word - 1;
                    index * WORD_BITS + bit
                })
            })
        })
    }

    /// All indices of the set bits, in ascending order.
    pub fn set_indices(&self) -> Vec<usize> {
        self.ones().collect()
    }

    /// The lowest index that is set, if any.
    pub fn first_set(&self) -> Option<usize> {
        self.words
            .iter()
            .position(|w| *w != 0)
            .map(|index| index * WORD_BITS + self.words[index].trailing_zeros() as usize)
    }

    /// The bits that are set in this set but not in the other set.
    /// # Panics
    /// If both sets do not have the same size.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        assert_eq!(
            self.size, other.size,
            "Cannot take the difference of bit sets with different sizes"
        );
        Self {
            size: self.size,
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & !b)
                .collect(),
        }
    }

    /// Check if all bits set in this set are also set in the other set. Sets of different sizes
    /// are never subsets of each other.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.size == other.size
            && self
                .words
                .iter()
                .zip(&other.words)
                .all(|(a, b)| a & !b == 0)
    }
}

impl Display for BitSet {
    /// One character per bit, `1` for set and `0` for unset, starting with index 0.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for index in 0..self.size {
            f.write_str(if self.get(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for BitSet {
    type Err = BoxedError<'static, BasicKind>;

    /// Parse the text form as written by [`Display`], one `0` or `1` for every bit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut result = Self::new(s.len());
        for (index, c) in s.char_indices() {
            match c {
                '1' => result.set(index),
                '0' => (),
                _ => {
                    return Err(BoxedError::new(
                        BasicKind::Error,
                        "Invalid bit set",
                        "A bit set can only contain '0' and '1' characters",
                        Context::line(None, s, index, c.len_utf8()).to_owned(),
                    ));
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use super::BitSet;

    #[test]
    fn filled_respects_size() {
        for size in [0, 1, 63, 64, 65, 130] {
            let set = BitSet::filled(size);
            assert_eq!(set.cardinality(), size);
            assert_eq!(set.set_indices(), (0..size).collect::<Vec<_>>());
        }
        assert_eq!(BitSet::filled(70), BitSet::from_indices(70, 0..70));
    }

    #[test]
    fn set_and_clear() {
        let mut set = BitSet::new(100);
        set.set(3);
        set.set(64);
        set.set(64);
        set.set(99);
        assert_eq!(set.cardinality(), 3);
        assert!(set.get(64));
        set.clear(64);
        assert!(!set.get(64));
        set.set_value(10, true);
        set.set_value(3, false);
        assert_eq!(set.set_indices(), vec![10, 99]);
        assert_eq!(set.first_set(), Some(10));
        set.nullify();
        assert!(set.is_clear());
        assert_eq!(set.first_set(), None);
        assert_eq!(set.size(), 100);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range() {
        let mut set = BitSet::new(5);
        set.set(5);
    }

    #[test]
    fn difference() {
        let a = BitSet::from_indices(70, [0, 1, 5, 66, 69]);
        let b = BitSet::from_indices(70, [1, 2, 66]);
        let diff = a.difference(&b);
        assert_eq!(diff.set_indices(), vec![0, 5, 69]);
        let expected = (0..70).filter(|i| a.get(*i) && !b.get(*i)).count();
        assert_eq!(diff.cardinality(), expected);
        assert!(diff.is_subset_of(&a));
        assert!(!a.is_subset_of(&diff));
    }

    #[test]
    #[should_panic(expected = "different sizes")]
    fn difference_size_mismatch() {
        let _difference = BitSet::new(4).difference(&BitSet::new(5));
    }

    #[test]
    fn equality_needs_same_size() {
        assert_ne!(BitSet::new(4), BitSet::new(5));
        assert!(!BitSet::new(4).is_subset_of(&BitSet::new(5)));
        assert_eq!(BitSet::from_indices(4, [1]), BitSet::from_indices(4, [1]));
    }

    #[test]
    fn clone_is_independent() {
        let a = BitSet::from_indices(10, [2, 4]);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.set(7);
        b.clear(2);
        assert_eq!(a.set_indices(), vec![2, 4]);
        assert_ne!(a, b);
    }

    #[test]
    fn text_form() {
        let set = BitSet::from_indices(6, [0, 3, 4]);
        assert_eq!(set.to_string(), "100110");
        assert_eq!("100110".parse::<BitSet>().unwrap(), set);
        assert_eq!("".parse::<BitSet>().unwrap(), BitSet::new(0));
        assert!("10a1".parse::<BitSet>().is_err());
    }

    #[test]
    fn serde_checks_words() {
        let set = BitSet::from_indices(70, [1, 65]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(serde_json::from_str::<BitSet>(&json).unwrap(), set);
        assert_eq!(
            serde_json::from_str::<BitSet>(r#"{"size":2,"words":[3]}"#).unwrap(),
            BitSet::filled(2)
        );
        assert!(serde_json::from_str::<BitSet>(r#"{"size":2,"words":[7]}"#).is_err());
        assert!(serde_json::from_str::<BitSet>(r#"{"size":100,"words":[]}"#).is_err());
        assert!(serde_json::from_str::<BitSet>(r#"{"size":10,"words":[0,0]}"#).is_err());
        assert!(serde_json::from_str::<BitSet>(r#"{"size":0,"words":[]}"#).is_ok());
    }
}
