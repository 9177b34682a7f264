//! Lazy per-word cache of top translation candidates
//!
//! Key design principles:
//! - **Lazy computation**: a word's candidates are computed on first request
//! - **At most once per key**: concurrent first requests for the same word share
//!   one computation through a per-key `OnceLock`
//! - **Bound to the scorer**: no eviction, no global state; the cache lives and
//!   dies with the scorer that owns it

use std::sync::{Arc, OnceLock};

use log::trace;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::config::ScoringParams;
use crate::translation::Model1Data;
use crate::{WordId, is_known_word};

type CandidateSlot = Arc<OnceLock<Arc<[WordId]>>>;

/// Memoizes, per source word, the destination words with the highest
/// translation probability (the word itself always included)
pub struct TopCandidateCache {
    data: Arc<Model1Data>,
    prob_self_tran: f32,
    max_candidates: Option<usize>,
    slots: RwLock<FxHashMap<WordId, CandidateSlot>>,
}

impl TopCandidateCache {
    pub fn new(data: Arc<Model1Data>, params: &ScoringParams) -> Self {
        let capacity = data.collection.len();
        Self {
            data,
            prob_self_tran: params.prob_self_tran,
            max_candidates: params.top_tran_cand_word_qty,
            slots: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Top translation candidates of `word_id`, sorted descending by probability
    ///
    /// At most `top_tran_cand_word_qty` ids. OOV ids have no candidates.
    pub fn top_candidates(&self, word_id: WordId) -> Arc<[WordId]> {
        // Fast path: already populated
        {
            let slots = self.slots.read();
            if let Some(slot) = slots.get(&word_id)
                && let Some(cands) = slot.get()
            {
                return Arc::clone(cands);
            }
        }

        // Slow path: claim the key's slot, then populate it outside the map lock
        let slot = {
            let mut slots = self.slots.write();
            Arc::clone(slots.entry(word_id).or_default())
        };
        Arc::clone(slot.get_or_init(|| self.compute(word_id)))
    }

    /// Number of words with a populated entry
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn compute(&self, word_id: WordId) -> Arc<[WordId]> {
        if !is_known_word(word_id) {
            return Arc::from(Vec::new());
        }

        let mut recs: Vec<(WordId, f32)> = match self.data.table.row(word_id) {
            Some(row) => row.iter().collect(),
            None => Vec::with_capacity(1),
        };
        if !recs.iter().any(|&(dst, _)| dst == word_id) {
            recs.push((word_id, self.prob_self_tran));
        }

        // Descending by probability, ties by destination id
        recs.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max) = self.max_candidates {
            recs.truncate(max);
        }

        trace!(
            "[candidate cache] word {}: {} candidates",
            word_id,
            recs.len()
        );
        recs.into_iter().map(|(dst, _)| dst).collect()
    }
}

impl std::fmt::Debug for TopCandidateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopCandidateCache")
            .field("prob_self_tran", &self.prob_self_tran)
            .field("max_candidates", &self.max_candidates)
            .field("cached_words", &self.len())
            .finish()
    }
}
