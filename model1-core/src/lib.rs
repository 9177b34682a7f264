//! Model1 - translation language model relevance scoring
//!
//! Scores a query against a document with a smoothed IBM Model 1 translation
//! language model: every document word "translates" into query words with a
//! learned probability, and the per-word score is the log-likelihood ratio of
//! the translation mixture against the collection (background) model.
//!
//! This library provides:
//! - Lazily populated, thread-safe top translation candidate cache
//! - Exhaustive and top-K pruned aggregate scoring paths
//! - Sparse vector projection whose inner product reproduces the pruned score
//! - A `FeatureExtractor` implementation over a forward index and translation resources

pub mod config;
pub mod error;
pub mod feature;
pub mod index;
pub mod resources;
pub mod scorer;
pub mod structures;
pub mod translation;

pub use config::{Model1Config, ScoringParams, ScoringPath};
pub use error::{Error, Result};
pub use feature::{
    EXTRACTOR_TYPE, FeatureExtractor, FeatureVectors, Model1Similarity, QueryData, init_result_set,
};
pub use index::{ForwardIndex, InMemoryForwardIndex};
pub use resources::{FeatureResources, Model1Key, RawTranslationModel, ResourceProvider};
pub use scorer::{AggregateScorer, CandidateExpander, SparseProjector, TopCandidateCache, WordScorer};
pub use structures::{ScoredCandidate, SparseVector, WordBag};
pub use translation::{CollectionProbs, Model1Data, TranslationRow, TranslationTable, TranslationTableBuilder};

/// Word identifier; negative values mark out-of-vocabulary terms
pub type WordId = i32;
/// Quantity of a word in an entry
pub type WordQty = u32;
/// Candidate / sparse vector weight
pub type Score = f32;

/// Sentinel id the forward index assigns to unknown words
pub const OOV_WORD_ID: WordId = -1;

/// Whether `word_id` denotes a known (in-vocabulary) word
#[inline]
pub fn is_known_word(word_id: WordId) -> bool {
    word_id >= 0
}
