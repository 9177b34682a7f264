//! Per-word translation language model scores

use std::sync::Arc;

use crate::config::ScoringParams;
use crate::error::{Error, Result};
use crate::structures::WordBag;
use crate::translation::Model1Data;
use crate::{WordId, is_known_word};

/// Slack allowed between the table's self-translation probability and the prior
pub const SELF_TRAN_TOLERANCE: f32 = 1e-6;

/// Scores query words against one document with the smoothed Model 1 mixture
///
/// For a query word `w` and document `D`:
///
/// ```text
/// T(w)     = sum_d p(d) * tran(d, w)          (only tran >= min_model1_prob)
/// bg(w)    = max(prob_oov, collection(w))
/// score(w) = ln((1 - lambda) * T(w) + lambda * bg(w)) - ln(lambda * bg(w))
/// ```
///
/// where `p(d) = qty(d) / max(1, sum of qtys)`.
#[derive(Debug, Clone)]
pub struct WordScorer {
    data: Arc<Model1Data>,
    prob_self_tran: f32,
    min_model1_prob: f32,
    lambda: f64,
    prob_oov: f64,
}

impl WordScorer {
    pub fn new(data: Arc<Model1Data>, params: &ScoringParams) -> Self {
        Self {
            data,
            prob_self_tran: params.prob_self_tran,
            min_model1_prob: params.min_model1_prob,
            lambda: params.lambda as f64,
            prob_oov: params.prob_oov as f64,
        }
    }

    /// Score each of `word_ids` against `doc`, preserving order
    ///
    /// Fails when a document word translating into itself carries a table
    /// probability below the self-translation prior: the translation data was
    /// not rescaled with the configured prior.
    pub fn score_words(&self, word_ids: &[WordId], doc: &WordBag) -> Result<Vec<f64>> {
        let inv_sum = 1.0 / (doc.total_qty().max(1) as f64);
        let source_probs: Vec<f64> = doc.qtys().iter().map(|&q| q as f64 * inv_sum).collect();

        word_ids
            .iter()
            .map(|&word_id| {
                let tran_prob = if is_known_word(word_id) {
                    self.translation_evidence(word_id, doc.word_ids(), &source_probs)?
                } else {
                    0.0
                };
                Ok(self.log_odds(word_id, tran_prob))
            })
            .collect()
    }

    /// Score a single word against `doc`
    pub fn score_word(&self, word_id: WordId, doc: &WordBag) -> Result<f64> {
        Ok(self.score_words(&[word_id], doc)?[0])
    }

    fn translation_evidence(
        &self,
        word_id: WordId,
        doc_word_ids: &[WordId],
        source_probs: &[f64],
    ) -> Result<f64> {
        let mut total = 0.0f64;
        for (&src_id, &src_prob) in doc_word_ids.iter().zip(source_probs) {
            let tran_prob = self.tran_prob(src_id, word_id)?;
            if tran_prob >= self.min_model1_prob {
                total += tran_prob as f64 * src_prob;
            }
        }
        Ok(total)
    }

    fn tran_prob(&self, src_id: WordId, dst_id: WordId) -> Result<f32> {
        let listed = self.data.table.tran_prob(src_id, dst_id);
        if src_id != dst_id {
            return Ok(listed.unwrap_or(0.0));
        }
        match listed {
            Some(p) if self.prob_self_tran - p > SELF_TRAN_TOLERANCE => {
                Err(Error::SelfTranslationMismatch {
                    word_id: src_id,
                    expected: self.prob_self_tran,
                    found: p,
                })
            }
            Some(p) => Ok(p),
            None => Ok(self.prob_self_tran),
        }
    }

    /// Background probability of a word
    #[inline]
    pub fn background_prob(&self, word_id: WordId) -> f64 {
        if is_known_word(word_id) {
            self.prob_oov.max(self.data.collection.get(word_id) as f64)
        } else {
            self.prob_oov
        }
    }

    #[inline]
    fn log_odds(&self, word_id: WordId, tran_prob: f64) -> f64 {
        let smoothed_bg = self.lambda * self.background_prob(word_id);
        ((1.0 - self.lambda) * tran_prob + smoothed_bg).ln() - smoothed_bg.ln()
    }
}
