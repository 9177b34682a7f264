//! Candidate expansion: query words a document can plausibly explain

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::cache::TopCandidateCache;
use super::word::WordScorer;
use crate::config::ScoringParams;
use crate::error::Result;
use crate::structures::{ScoredCandidate, WordBag};
use crate::translation::Model1Data;
use crate::WordId;

/// Expands a document into its top translation candidates and scores them
///
/// The candidate universe is the union of every document word's top
/// translations (the words themselves included), which bounds the work to the
/// document's translation neighborhood instead of the whole vocabulary.
#[derive(Debug)]
pub struct CandidateExpander {
    scorer: WordScorer,
    cache: TopCandidateCache,
    min_score: f32,
    max_per_doc_word: Option<usize>,
}

impl CandidateExpander {
    pub fn new(data: Arc<Model1Data>, params: &ScoringParams) -> Self {
        Self {
            scorer: WordScorer::new(Arc::clone(&data), params),
            cache: TopCandidateCache::new(data, params),
            min_score: params.min_tran_score_per_doc_word,
            max_per_doc_word: params.top_tran_scores_per_doc_word_qty,
        }
    }

    #[inline]
    pub fn word_scorer(&self) -> &WordScorer {
        &self.scorer
    }

    #[inline]
    pub fn cache(&self) -> &TopCandidateCache {
        &self.cache
    }

    /// Deduplicated union of the top candidates of every document word
    pub fn candidate_ids(&self, doc: &WordBag) -> Vec<WordId> {
        let mut seen: FxHashSet<WordId> = FxHashSet::default();
        let mut ids = Vec::new();
        for &word_id in doc.word_ids() {
            for &dst_id in self.cache.top_candidates(word_id).iter() {
                if seen.insert(dst_id) {
                    ids.push(dst_id);
                }
            }
        }
        ids
    }

    /// Scored candidates of `doc`, descending by score (ties by id)
    ///
    /// Only candidates scoring strictly above `min_tran_score_per_doc_word`
    /// are kept. With a finite `top_tran_scores_per_doc_word_qty` the list is
    /// truncated to `doc.len() * top_tran_scores_per_doc_word_qty`, dropping
    /// the lowest scores first.
    pub fn top_scored_candidates(&self, doc: &WordBag) -> Result<Vec<ScoredCandidate>> {
        let ids = self.candidate_ids(doc);
        let scores = self.scorer.score_words(&ids, doc)?;
        let num_expanded = ids.len();

        let mut res: Vec<ScoredCandidate> = ids
            .into_iter()
            .zip(scores)
            .filter(|&(_, score)| score > self.min_score as f64)
            .map(|(id, score)| ScoredCandidate::new(id, score as f32))
            .collect();
        res.sort_unstable_by(ScoredCandidate::cmp_by_score_desc);

        if let Some(per_word) = self.max_per_doc_word {
            res.truncate(doc.len().saturating_mul(per_word));
        }

        log::trace!(
            "[candidates] doc words={}: expanded {} -> kept {}",
            doc.len(),
            num_expanded,
            res.len()
        );
        Ok(res)
    }
}
