//! Document-query similarity from per-word Model 1 scores

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::candidates::CandidateExpander;
use super::projector::SparseProjector;
use crate::config::{ScoringParams, ScoringPath};
use crate::error::Result;
use crate::structures::WordBag;
use crate::translation::Model1Data;
use crate::{WordId, WordQty};

/// Combines per-word scores into one query-document score
///
/// Two algorithms are available:
/// - `ScoringPath::Pruned` (default): expand the document into its top scored
///   candidates and sum `qty * score` over the candidates the query contains.
/// - `ScoringPath::Exhaustive`: score every query word against the document.
///
/// Both normalize by `max(1, number of query entries)`.
#[derive(Debug)]
pub struct AggregateScorer {
    expander: CandidateExpander,
    path: ScoringPath,
    flip_doc_query: bool,
}

impl AggregateScorer {
    pub fn new(data: Arc<Model1Data>, params: &ScoringParams) -> Self {
        Self {
            expander: CandidateExpander::new(data, params),
            path: params.path,
            flip_doc_query: params.flip_doc_query,
        }
    }

    #[inline]
    pub fn expander(&self) -> &CandidateExpander {
        &self.expander
    }

    #[inline]
    pub fn path(&self) -> ScoringPath {
        self.path
    }

    #[inline]
    pub fn flip_doc_query(&self) -> bool {
        self.flip_doc_query
    }

    /// Sparse projector sharing this scorer's candidate cache
    pub fn projector(&self) -> SparseProjector<'_> {
        SparseProjector::new(&self.expander, self.flip_doc_query)
    }

    /// Feature value of a (query, document) pair, honoring `flip_doc_query`
    pub fn score(&self, query: &WordBag, doc: &WordBag) -> Result<f64> {
        if self.flip_doc_query {
            self.overall_score(doc, query)
        } else {
            self.overall_score(query, doc)
        }
    }

    /// Score `query` against `doc` with the configured path (no flipping)
    pub fn overall_score(&self, query: &WordBag, doc: &WordBag) -> Result<f64> {
        self.overall_score_with_path(query, doc, self.path)
    }

    /// Score `query` against `doc` with an explicit path (no flipping)
    pub fn overall_score_with_path(
        &self,
        query: &WordBag,
        doc: &WordBag,
        path: ScoringPath,
    ) -> Result<f64> {
        let log_score = match path {
            ScoringPath::Exhaustive => self.exhaustive_sum(query, doc)?,
            ScoringPath::Pruned => self.pruned_sum(query, doc)?,
        };
        Ok(log_score / query.len().max(1) as f64)
    }

    fn exhaustive_sum(&self, query: &WordBag, doc: &WordBag) -> Result<f64> {
        let scores = self
            .expander
            .word_scorer()
            .score_words(query.word_ids(), doc)?;
        Ok(query
            .qtys()
            .iter()
            .zip(scores)
            .map(|(&qty, score)| qty as f64 * score)
            .sum())
    }

    /// Sum of `qty * score` over the document's candidates found in the query
    ///
    /// Query quantities are looked up by id: for repeated ids the later quantity
    /// overwrites the earlier one, whereas the exhaustive path sums every entry.
    fn pruned_sum(&self, query: &WordBag, doc: &WordBag) -> Result<f64> {
        let query_qtys: FxHashMap<WordId, WordQty> = query.iter().collect();
        if query_qtys.is_empty() {
            return Ok(0.0);
        }

        let mut log_score = 0.0f64;
        for cand in self.expander.top_scored_candidates(doc)? {
            if let Some(&qty) = query_qtys.get(&cand.id) {
                log_score += qty as f64 * cand.score as f64;
            }
        }
        Ok(log_score)
    }
}
