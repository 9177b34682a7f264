//! Variable-dimension sparse vectors for inner-product retrieval

use serde::{Deserialize, Serialize};

use crate::{Score, WordId};

/// Sparse vector with ids sorted ascending
///
/// Dimensionality is unbounded: ids are arbitrary word ids, so consumers must
/// support integer-keyed sparse inner products rather than fixed-width dense ones.
///
/// Deserialization goes through [`SparseVector::from_pairs`], so stored vectors
/// may list ids in any order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSparseVector")]
pub struct SparseVector {
    ids: Vec<WordId>,
    vals: Vec<Score>,
}

#[derive(Deserialize)]
struct RawSparseVector {
    ids: Vec<WordId>,
    vals: Vec<Score>,
}

impl TryFrom<RawSparseVector> for SparseVector {
    type Error = String;

    fn try_from(raw: RawSparseVector) -> Result<Self, Self::Error> {
        if raw.ids.len() != raw.vals.len() {
            return Err(format!(
                "sparse vector has {} ids but {} values",
                raw.ids.len(),
                raw.vals.len()
            ));
        }
        Ok(Self::from_pairs(raw.ids.into_iter().zip(raw.vals).collect()))
    }
}

impl SparseVector {
    /// Create from (id, weight) pairs in any order
    ///
    /// Pairs are sorted by id; the sort is stable, so for repeated ids the
    /// relative input order is kept.
    pub fn from_pairs(mut pairs: Vec<(WordId, Score)>) -> Self {
        pairs.sort_by_key(|&(id, _)| id);
        let (ids, vals) = pairs.into_iter().unzip();
        Self { ids, vals }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn ids(&self) -> &[WordId] {
        &self.ids
    }

    #[inline]
    pub fn vals(&self) -> &[Score] {
        &self.vals
    }

    pub fn iter(&self) -> impl Iterator<Item = (WordId, Score)> + '_ {
        self.ids.iter().copied().zip(self.vals.iter().copied())
    }

    /// Weight of `id`, if present
    pub fn get(&self, id: WordId) -> Option<Score> {
        self.ids.binary_search(&id).ok().map(|i| self.vals[i])
    }

    /// Inner product via a sorted merge, accumulated in f64
    pub fn inner_product(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f64;
        while i < self.ids.len() && j < other.ids.len() {
            match self.ids[i].cmp(&other.ids[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.vals[i] as f64 * other.vals[j] as f64;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}
