//! Trained Model 1 data: translation table plus collection probabilities

mod table;

pub use table::*;

use crate::WordId;

/// Probability of every word in the field's whole corpus
///
/// Stored as a flat `Vec<f32>` indexed by word id. Ids outside the table
/// (including OOV ids) have probability 0 and fall back to the OOV floor.
#[derive(Debug, Clone, Default)]
pub struct CollectionProbs {
    probs: Vec<f32>,
}

impl CollectionProbs {
    pub fn new(probs: Vec<f32>) -> Self {
        Self { probs }
    }

    /// Derive probabilities from raw term counts indexed by word id
    pub fn from_counts(counts: &[u64]) -> Self {
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return Self::new(vec![0.0; counts.len()]);
        }
        let inv = 1.0 / total as f64;
        Self::new(counts.iter().map(|&c| (c as f64 * inv) as f32).collect())
    }

    #[inline]
    pub fn get(&self, word_id: WordId) -> f32 {
        usize::try_from(word_id)
            .ok()
            .and_then(|i| self.probs.get(i).copied())
            .unwrap_or(0.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }
}

/// Everything the scorer needs from a trained translation model
#[derive(Debug, Clone, Default)]
pub struct Model1Data {
    pub table: TranslationTable,
    pub collection: CollectionProbs,
}

impl Model1Data {
    pub fn new(table: TranslationTable, collection: CollectionProbs) -> Self {
        Self { table, collection }
    }
}
