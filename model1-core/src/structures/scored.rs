//! Word id / score pairs

use std::cmp::Ordering;

use crate::{Score, WordId};

/// A candidate query word together with its translation score
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate {
    pub id: WordId,
    pub score: Score,
}

impl ScoredCandidate {
    #[inline]
    pub fn new(id: WordId, score: Score) -> Self {
        Self { id, score }
    }

    /// Descending by score, ties broken by ascending id
    #[inline]
    pub fn cmp_by_score_desc(a: &Self, b: &Self) -> Ordering {
        b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
    }
}

impl std::fmt::Display for ScoredCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.id, self.score)
    }
}

impl PartialEq for ScoredCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredCandidate {}

impl Ord for ScoredCandidate {
    // Smaller ids first
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.score.total_cmp(&other.score))
    }
}

impl PartialOrd for ScoredCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
