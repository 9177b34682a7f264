//! Sparse translation probability table

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::{WordId, is_known_word};

/// Translation probabilities of one source word, sorted by destination id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationRow {
    dst_ids: Box<[WordId]>,
    probs: Box<[f32]>,
}

impl TranslationRow {
    fn from_sorted(entries: Vec<(WordId, f32)>) -> Self {
        let (dst_ids, probs): (Vec<WordId>, Vec<f32>) = entries.into_iter().unzip();
        Self {
            dst_ids: dst_ids.into_boxed_slice(),
            probs: probs.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn dst_ids(&self) -> &[WordId] {
        &self.dst_ids
    }

    #[inline]
    pub fn probs(&self) -> &[f32] {
        &self.probs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dst_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dst_ids.is_empty()
    }

    /// Probability of translating into `dst_id`, if listed
    #[inline]
    pub fn prob(&self, dst_id: WordId) -> Option<f32> {
        self.dst_ids
            .binary_search(&dst_id)
            .ok()
            .map(|i| self.probs[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (WordId, f32)> + '_ {
        self.dst_ids.iter().copied().zip(self.probs.iter().copied())
    }
}

/// Immutable source word → sparse (destination word, probability) mapping
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    rows: FxHashMap<WordId, TranslationRow>,
}

impl TranslationTable {
    /// Row of `src_id`, `None` when the word has no translations at all
    #[inline]
    pub fn row(&self, src_id: WordId) -> Option<&TranslationRow> {
        self.rows.get(&src_id)
    }

    /// Explicitly listed probability of `src_id` → `dst_id`
    #[inline]
    pub fn tran_prob(&self, src_id: WordId, dst_id: WordId) -> Option<f32> {
        self.rows.get(&src_id).and_then(|row| row.prob(dst_id))
    }

    /// Number of source words with at least one translation
    pub fn num_sources(&self) -> usize {
        self.rows.len()
    }

    /// Total number of (source, destination) entries
    pub fn num_entries(&self) -> usize {
        self.rows.values().map(TranslationRow::len).sum()
    }

    /// Largest word id mentioned on either side, if any
    pub fn max_word_id(&self) -> Option<WordId> {
        self.rows
            .iter()
            .flat_map(|(&src, row)| std::iter::once(src).chain(row.dst_ids().iter().copied()))
            .max()
    }
}

/// Accumulates raw (source, destination, probability) triples
///
/// Repeated pairs keep the larger probability.
#[derive(Debug, Clone, Default)]
pub struct TranslationTableBuilder {
    rows: FxHashMap<WordId, FxHashMap<WordId, f32>>,
}

impl TranslationTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one translation record
    pub fn add(&mut self, src_id: WordId, dst_id: WordId, prob: f32) -> Result<&mut Self> {
        if !is_known_word(src_id) || !is_known_word(dst_id) {
            return Err(Error::InvalidTranslation(format!(
                "negative word id in {} -> {}",
                src_id, dst_id
            )));
        }
        if !prob.is_finite() || prob <= 0.0 || prob > 1.0 {
            return Err(Error::InvalidTranslation(format!(
                "probability {} of {} -> {} is outside (0, 1]",
                prob, src_id, dst_id
            )));
        }
        let slot = self.rows.entry(src_id).or_default().entry(dst_id).or_insert(prob);
        *slot = slot.max(prob);
        Ok(self)
    }

    /// Build the table exactly as recorded
    pub fn build(self) -> TranslationTable {
        let rows = self
            .rows
            .into_iter()
            .map(|(src, dsts)| {
                let mut entries: Vec<(WordId, f32)> = dsts.into_iter().collect();
                entries.sort_unstable_by_key(|&(dst, _)| dst);
                (src, TranslationRow::from_sorted(entries))
            })
            .collect();
        TranslationTable { rows }
    }

    /// Build with the self-translation prior mixed in
    ///
    /// For every source word `s`, non-self probabilities are scaled by
    /// `1 - prob_self_tran` and the self probability becomes
    /// `prob_self_tran + (1 - prob_self_tran) * p(s -> s)`, added when missing.
    /// Afterwards non-self entries below `min_prob` are dropped, so every row
    /// satisfies `p(s -> s) >= prob_self_tran` (zero self probabilities are
    /// left out rather than stored).
    pub fn build_rescaled(self, prob_self_tran: f32, min_prob: f32) -> TranslationTable {
        let scale = 1.0 - prob_self_tran;
        let rows = self
            .rows
            .into_iter()
            .map(|(src, dsts)| {
                let self_prob = prob_self_tran + scale * dsts.get(&src).copied().unwrap_or(0.0);
                let mut entries: Vec<(WordId, f32)> = dsts
                    .into_iter()
                    .filter(|&(dst, _)| dst != src)
                    .map(|(dst, p)| (dst, p * scale))
                    .filter(|&(_, p)| p >= min_prob)
                    .collect();
                if self_prob > 0.0 {
                    entries.push((src, self_prob));
                }
                entries.sort_unstable_by_key(|&(dst, _)| dst);
                (src, TranslationRow::from_sorted(entries))
            })
            .collect();
        TranslationTable { rows }
    }
}
