//! Sparse projections for inner-product retrieval
//!
//! The document vector holds the document's pruned candidate scores and the
//! query vector holds normalized query quantities, so their inner product is
//! the pruned aggregate score.

use super::candidates::CandidateExpander;
use crate::error::Result;
use crate::structures::{SparseVector, WordBag};
use crate::{Score, is_known_word};

/// Maps query and document entries to sparse (word id → weight) vectors
#[derive(Debug, Clone, Copy)]
pub struct SparseProjector<'a> {
    expander: &'a CandidateExpander,
    flip_doc_query: bool,
}

impl<'a> SparseProjector<'a> {
    pub fn new(expander: &'a CandidateExpander, flip_doc_query: bool) -> Self {
        Self {
            expander,
            flip_doc_query,
        }
    }

    /// Project `entry` on the query or the document side
    ///
    /// With `flip_doc_query` the sides are swapped, mirroring the aggregate scorer.
    pub fn project(&self, entry: &WordBag, is_query: bool) -> Result<SparseVector> {
        if is_query != self.flip_doc_query {
            Ok(self.query_vector(entry))
        } else {
            self.doc_vector(entry)
        }
    }

    /// Top scored candidates of the document, sorted by word id
    pub fn doc_vector(&self, doc: &WordBag) -> Result<SparseVector> {
        let pairs = self
            .expander
            .top_scored_candidates(doc)?
            .into_iter()
            .map(|c| (c.id, c.score))
            .collect();
        Ok(SparseVector::from_pairs(pairs))
    }

    /// Known query words weighted by `qty / max(1, number of entries)`
    pub fn query_vector(&self, query: &WordBag) -> SparseVector {
        let inv = 1.0 / query.len().max(1) as Score;
        let pairs = query
            .iter()
            .filter(|&(word_id, _)| is_known_word(word_id))
            .map(|(word_id, qty)| (word_id, qty as Score * inv))
            .collect();
        SparseVector::from_pairs(pairs)
    }
}
