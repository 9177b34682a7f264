//! Cross-component scoring tests
//!
//! Fixtures are random translation tables built with the self-translation
//! prior mixed in, so every property below runs against data that satisfies
//! the scorer's preconditions.

use std::sync::Arc;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use super::{AggregateScorer, CandidateExpander, TopCandidateCache};
use crate::config::{ScoringParams, ScoringPath};
use crate::error::Error;
use crate::structures::WordBag;
use crate::translation::{CollectionProbs, Model1Data, TranslationTableBuilder};
use crate::{OOV_WORD_ID, WordId};

const VOCAB: WordId = 40;
const PROB_SELF_TRAN: f32 = 0.05;

fn random_data(seed: u64, prob_self_tran: f32) -> Arc<Model1Data> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = TranslationTableBuilder::new();

    for src in 0..VOCAB {
        // some words have no translations at all
        if rng.random_bool(0.2) {
            continue;
        }
        let n = rng.random_range(1..6);
        let weights: Vec<(WordId, f32)> = (0..n)
            .map(|_| (rng.random_range(0..VOCAB), rng.random_range(0.05f32..1.0)))
            .collect();
        let total: f32 = weights.iter().map(|&(_, w)| w).sum();
        for (dst, w) in weights {
            builder.add(src, dst, (w / total).min(1.0)).unwrap();
        }
    }

    let counts: Vec<u64> = (0..VOCAB).map(|_| rng.random_range(1..100)).collect();
    Arc::new(Model1Data::new(
        builder.build_rescaled(prob_self_tran, 0.0),
        CollectionProbs::from_counts(&counts),
    ))
}

fn random_bag(rng: &mut StdRng, max_len: usize) -> WordBag {
    let len = rng.random_range(0..=max_len);
    WordBag::from_word_ids((0..len).map(|_| {
        if rng.random_bool(0.05) {
            OOV_WORD_ID
        } else {
            rng.random_range(0..VOCAB)
        }
    }))
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
}

fn candidate_set(expander: &CandidateExpander, doc: &WordBag) -> FxHashSet<WordId> {
    expander
        .top_scored_candidates(doc)
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect()
}

#[test]
fn test_end_to_end_single_word_example() {
    let mut b = TranslationTableBuilder::new();
    b.add(0, 0, 0.9).unwrap();
    b.add(0, 1, 0.1).unwrap();
    let data = Arc::new(Model1Data::new(
        b.build(),
        CollectionProbs::new(vec![0.5, 0.5]),
    ));
    let scorer = AggregateScorer::new(data, &ScoringParams::new(0.05, 0.0, 0.5));

    let doc = WordBag::from_pairs([(0, 2)]);
    let query = WordBag::from_pairs([(1, 1)]);
    let score = scorer.score(&query, &doc).unwrap();
    assert!((score - 0.1823).abs() < 1e-4, "score={}", score);

    let projector = scorer.projector();
    let dot = projector
        .project(&doc, false)
        .unwrap()
        .inner_product(&projector.project(&query, true).unwrap());
    assert!((dot - score).abs() < 1e-6);
}

#[test]
fn test_unrescaled_table_is_fatal_on_every_surface() {
    let mut b = TranslationTableBuilder::new();
    b.add(0, 0, 0.01).unwrap();
    b.add(0, 1, 0.99).unwrap();
    let data = Arc::new(Model1Data::new(
        b.build(),
        CollectionProbs::new(vec![0.5, 0.5]),
    ));
    let scorer = AggregateScorer::new(data, &ScoringParams::new(0.05, 0.0, 0.5));
    let doc = WordBag::from_pairs([(0, 1)]);
    let query = WordBag::from_pairs([(0, 1), (1, 1)]);

    for path in [ScoringPath::Pruned, ScoringPath::Exhaustive] {
        let err = scorer
            .overall_score_with_path(&query, &doc, path)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SelfTranslationMismatch { word_id: 0, .. }
        ));
    }
    assert!(scorer.projector().doc_vector(&doc).is_err());
}

#[test]
fn test_rowless_words_translate_into_themselves() {
    // no row: the word is still its own candidate at the prior
    let data = random_data(7, PROB_SELF_TRAN);
    let rowless: Vec<WordId> = (0..VOCAB)
        .filter(|&w| data.table.row(w).is_none())
        .collect();
    let cache = TopCandidateCache::new(Arc::clone(&data), &ScoringParams::new(0.05, 0.0, 0.5));
    for w in rowless {
        assert_eq!(&*cache.top_candidates(w), &[w]);
    }
}

#[test]
fn test_cache_shared_across_threads_is_idempotent() {
    let data = random_data(11, PROB_SELF_TRAN);
    let params = ScoringParams::new(PROB_SELF_TRAN, 0.0, 0.5).with_top_tran_cand_word_qty(Some(3));
    let cache = TopCandidateCache::new(Arc::clone(&data), &params);
    let fresh = TopCandidateCache::new(data, &params);

    let shared: Vec<Vec<WordId>> = (0..VOCAB * 8)
        .into_par_iter()
        .map(|i| cache.top_candidates(i % VOCAB).to_vec())
        .collect();
    for (i, cands) in shared.iter().enumerate() {
        let w = i as WordId % VOCAB;
        assert_eq!(cands.as_slice(), &*fresh.top_candidates(w));
    }
    assert_eq!(cache.len(), VOCAB as usize);
}

#[test]
fn test_parallel_scoring_matches_sequential() {
    let data = random_data(23, PROB_SELF_TRAN);
    let params = ScoringParams::new(PROB_SELF_TRAN, 1e-3, 0.3);
    let shared = AggregateScorer::new(Arc::clone(&data), &params);

    let mut rng = StdRng::seed_from_u64(24);
    let query = random_bag(&mut rng, 6);
    let docs: Vec<WordBag> = (0..64).map(|_| random_bag(&mut rng, 12)).collect();

    let parallel: Vec<f64> = docs
        .par_iter()
        .map(|doc| shared.score(&query, doc).unwrap())
        .collect();
    let sequential = AggregateScorer::new(data, &params);
    for (doc, score) in docs.iter().zip(parallel) {
        assert_eq!(score, sequential.score(&query, doc).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Inner product of the projections equals the pruned aggregate score
    #[test]
    fn projection_matches_pruned_score(
        seed in any::<u64>(),
        lambda in 0.05f32..0.95,
        min_model1_prob in 0.0f32..0.2,
        cand_cap in prop::option::of(1usize..6),
        doc_cap in prop::option::of(1usize..6),
    ) {
        let data = random_data(seed, PROB_SELF_TRAN);
        let params = ScoringParams::new(PROB_SELF_TRAN, min_model1_prob, lambda)
            .with_top_tran_cand_word_qty(cand_cap)
            .with_top_tran_scores_per_doc_word_qty(doc_cap);
        let scorer = AggregateScorer::new(data, &params);
        let projector = scorer.projector();

        let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
        let doc = random_bag(&mut rng, 10);
        let query = random_bag(&mut rng, 6);

        let dot = projector
            .doc_vector(&doc)
            .unwrap()
            .inner_product(&projector.query_vector(&query));
        let score = scorer.overall_score(&query, &doc).unwrap();
        prop_assert!(close(dot, score, 1e-5), "dot={} score={}", dot, score);
    }

    /// Swapping roles with flip equals scoring the swapped pair
    #[test]
    fn flip_swaps_query_and_document(seed in any::<u64>(), lambda in 0.05f32..0.95) {
        let data = random_data(seed, PROB_SELF_TRAN);
        let params = ScoringParams::new(PROB_SELF_TRAN, 0.0, lambda);
        let plain = AggregateScorer::new(Arc::clone(&data), &params);
        let flipped = AggregateScorer::new(data, &params.with_flip_doc_query(true));

        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let a = random_bag(&mut rng, 8);
        let b = random_bag(&mut rng, 8);
        prop_assert_eq!(flipped.score(&a, &b).unwrap(), plain.score(&b, &a).unwrap());
    }

    /// Raising either floor never grows the contributing candidate set
    #[test]
    fn floors_never_add_candidates(
        seed in any::<u64>(),
        lo in 0.0f32..0.1,
        delta in 0.0f32..0.3,
        min_score_lo in 0.0f32..0.5,
        min_score_delta in 0.0f32..1.0,
    ) {
        let data = random_data(seed, PROB_SELF_TRAN);
        let base = ScoringParams::new(PROB_SELF_TRAN, lo, 0.5)
            .with_min_tran_score_per_doc_word(min_score_lo);

        let mut rng = StdRng::seed_from_u64(!seed);
        let doc = random_bag(&mut rng, 10);

        let loose = candidate_set(&CandidateExpander::new(Arc::clone(&data), &base), &doc);
        let strict_prob = candidate_set(
            &CandidateExpander::new(
                Arc::clone(&data),
                &ScoringParams { min_model1_prob: lo + delta, ..base },
            ),
            &doc,
        );
        let strict_score = candidate_set(
            &CandidateExpander::new(
                data,
                &base.with_min_tran_score_per_doc_word(min_score_lo + min_score_delta),
            ),
            &doc,
        );
        prop_assert!(strict_prob.is_subset(&loose));
        prop_assert!(strict_score.is_subset(&loose));
    }

    /// Without pruning limits the two paths agree on aggregated queries
    #[test]
    fn paths_converge_without_limits(
        seed in any::<u64>(),
        lambda in 0.05f32..0.95,
        min_model1_prob in 0.0f32..0.2,
    ) {
        let data = random_data(seed, PROB_SELF_TRAN);
        let params = ScoringParams::new(PROB_SELF_TRAN, min_model1_prob, lambda)
            .with_min_tran_score_per_doc_word(0.0);
        let scorer = AggregateScorer::new(data, &params);

        let mut rng = StdRng::seed_from_u64(seed.rotate_left(17));
        let doc = random_bag(&mut rng, 10);
        let query = random_bag(&mut rng, 6);

        let pruned = scorer
            .overall_score_with_path(&query, &doc, ScoringPath::Pruned)
            .unwrap();
        let exhaustive = scorer
            .overall_score_with_path(&query, &doc, ScoringPath::Exhaustive)
            .unwrap();
        prop_assert!(close(pruned, exhaustive, 1e-5), "pruned={} exhaustive={}", pruned, exhaustive);
    }

    /// Pruning only drops non-negative contributions
    #[test]
    fn pruned_never_exceeds_exhaustive(
        seed in any::<u64>(),
        cand_cap in prop::option::of(1usize..4),
        doc_cap in prop::option::of(1usize..4),
        min_score in 0.0f32..0.5,
    ) {
        let data = random_data(seed, PROB_SELF_TRAN);
        let params = ScoringParams::new(PROB_SELF_TRAN, 0.0, 0.5)
            .with_top_tran_cand_word_qty(cand_cap)
            .with_top_tran_scores_per_doc_word_qty(doc_cap)
            .with_min_tran_score_per_doc_word(min_score);
        let scorer = AggregateScorer::new(data, &params);

        let mut rng = StdRng::seed_from_u64(seed ^ 0xabcd);
        let doc = random_bag(&mut rng, 10);
        let query = random_bag(&mut rng, 6);

        let pruned = scorer
            .overall_score_with_path(&query, &doc, ScoringPath::Pruned)
            .unwrap();
        let exhaustive = scorer
            .overall_score_with_path(&query, &doc, ScoringPath::Exhaustive)
            .unwrap();
        prop_assert!(pruned >= 0.0);
        prop_assert!(pruned <= exhaustive + 1e-5 * exhaustive.max(1.0));
    }
}
