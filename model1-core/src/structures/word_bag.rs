//! Bag-of-words entry as stored in a forward index

use rustc_hash::FxHashMap;

use crate::{WordId, WordQty};

/// Query or document entry: parallel arrays of word ids and their quantities
///
/// Ids are expected to be unique within an entry (the forward index aggregates
/// them), but nothing here enforces it. Negative ids denote OOV words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBag {
    word_ids: Vec<WordId>,
    qtys: Vec<WordQty>,
}

impl WordBag {
    /// Create an empty entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from (word_id, qty) pairs, keeping their order
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (WordId, WordQty)>,
    {
        let (word_ids, qtys) = pairs.into_iter().unzip();
        Self { word_ids, qtys }
    }

    /// Aggregate a word id sequence into an entry sorted by word id
    ///
    /// Mirrors how the forward index builds entries: repeated ids are counted,
    /// OOV ids are kept (all collapsed into the ids they were given).
    pub fn from_word_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = WordId>,
    {
        let mut counts: FxHashMap<WordId, WordQty> = FxHashMap::default();
        for id in ids {
            *counts.entry(id).or_default() += 1;
        }
        let mut pairs: Vec<(WordId, WordQty)> = counts.into_iter().collect();
        pairs.sort_unstable_by_key(|&(id, _)| id);
        Self::from_pairs(pairs)
    }

    /// Number of entries (distinct words in an aggregated bag)
    #[inline]
    pub fn len(&self) -> usize {
        self.word_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.word_ids.is_empty()
    }

    #[inline]
    pub fn word_ids(&self) -> &[WordId] {
        &self.word_ids
    }

    #[inline]
    pub fn qtys(&self) -> &[WordQty] {
        &self.qtys
    }

    /// Iterate (word_id, qty) pairs
    pub fn iter(&self) -> impl Iterator<Item = (WordId, WordQty)> + '_ {
        self.word_ids.iter().copied().zip(self.qtys.iter().copied())
    }

    /// Sum of all quantities
    pub fn total_qty(&self) -> u64 {
        self.qtys.iter().map(|&q| q as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_word_ids_aggregates_and_sorts() {
        let bag = WordBag::from_word_ids([7, 3, 7, -1, 3, 7]);
        assert_eq!(bag.word_ids(), &[-1, 3, 7]);
        assert_eq!(bag.qtys(), &[1, 2, 3]);
        assert_eq!(bag.total_qty(), 6);
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn test_from_pairs_keeps_order() {
        let bag = WordBag::from_pairs([(5, 1), (2, 4)]);
        let pairs: Vec<_> = bag.iter().collect();
        assert_eq!(pairs, vec![(5, 1), (2, 4)]);
    }

    #[test]
    fn test_empty() {
        let bag = WordBag::new();
        assert!(bag.is_empty());
        assert_eq!(bag.total_qty(), 0);
    }
}
