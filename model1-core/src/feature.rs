//! Model1 similarity as a single-valued document feature

use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::config::Model1Config;
use crate::error::{Error, Result};
use crate::index::ForwardIndex;
use crate::resources::{Model1Key, ResourceProvider};
use crate::scorer::AggregateScorer;
use crate::structures::{SparseVector, WordBag};

/// Registered type name of the extractor
pub const EXTRACTOR_TYPE: &str = "Model1Similarity";

/// Query content keyed by field name
pub type QueryData = HashMap<String, String>;

/// Feature values keyed by document id
pub type FeatureVectors = FxHashMap<String, Vec<f64>>;

/// Zero-filled result with one vector of `feature_qty` values per document
pub fn init_result_set(doc_ids: &[String], feature_qty: usize) -> FeatureVectors {
    doc_ids
        .iter()
        .map(|id| (id.clone(), vec![0.0; feature_qty]))
        .collect()
}

/// Computes features for a batch of documents against one query
pub trait FeatureExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn field_name(&self) -> &str;

    /// Number of values produced per document
    fn feature_qty(&self) -> usize;

    fn is_sparse(&self) -> bool;

    /// Dimensionality of dense projections (0 when sparse)
    fn dim(&self) -> usize;

    /// Feature vectors of `doc_ids`; every requested id gets an entry
    fn features(&self, doc_ids: &[String], query_data: &QueryData) -> Result<FeatureVectors>;

    /// Vector whose inner product with the other side's vector gives the feature
    fn inner_prod_vector(&self, entry: &WordBag, is_query: bool) -> Result<SparseVector>;
}

/// Translation language model similarity between the query and each document
pub struct Model1Similarity {
    config: Model1Config,
    index: Arc<dyn ForwardIndex>,
    scorer: AggregateScorer,
}

impl Model1Similarity {
    /// Validate `config` and resolve its forward index and translation model
    pub fn new(resources: &dyn ResourceProvider, config: Model1Config) -> Result<Self> {
        config.validate()?;
        let index = resources.forward_index(&config.field_name)?;
        let data = resources.model1_data(&Model1Key::from_config(&config))?;

        let params = &config.params;
        info!(
            "{} field={} model={} iter={}: flipDocQuery={} path={:?} topTranScoresPerDocWordQty={:?} \
             topTranCandWordQty={:?} minTranScorePerDocWord={}",
            EXTRACTOR_TYPE,
            config.field_name,
            config.model1_subdir(),
            config.giza_iter_qty,
            params.flip_doc_query,
            params.path,
            params.top_tran_scores_per_doc_word_qty,
            params.top_tran_cand_word_qty,
            params.min_tran_score_per_doc_word
        );

        let scorer = AggregateScorer::new(data, params);
        Ok(Self {
            config,
            index,
            scorer,
        })
    }

    pub fn config(&self) -> &Model1Config {
        &self.config
    }

    pub fn scorer(&self) -> &AggregateScorer {
        &self.scorer
    }

    pub fn index(&self) -> &Arc<dyn ForwardIndex> {
        &self.index
    }

    /// Query entry built from the field's text, `None` when there is no content
    pub fn query_entry(&self, query_data: &QueryData) -> Option<WordBag> {
        query_data
            .get(&self.config.field_name)
            .and_then(|text| self.index.query_entry(text))
    }
}

impl FeatureExtractor for Model1Similarity {
    fn name(&self) -> &str {
        EXTRACTOR_TYPE
    }

    fn field_name(&self) -> &str {
        &self.config.field_name
    }

    fn feature_qty(&self) -> usize {
        1
    }

    fn is_sparse(&self) -> bool {
        true
    }

    fn dim(&self) -> usize {
        0
    }

    fn features(&self, doc_ids: &[String], query_data: &QueryData) -> Result<FeatureVectors> {
        let mut res = init_result_set(doc_ids, self.feature_qty());
        let Some(query) = self.query_entry(query_data) else {
            return Ok(res);
        };

        let scores: Vec<f64> = doc_ids
            .par_iter()
            .map(|doc_id| -> Result<f64> {
                let doc = self
                    .index
                    .doc_entry(doc_id)
                    .ok_or_else(|| Error::DocumentNotFound(doc_id.clone()))?;
                self.scorer.score(&query, doc)
            })
            .collect::<Result<_>>()?;

        for (doc_id, score) in doc_ids.iter().zip(scores) {
            if let Some(values) = res.get_mut(doc_id) {
                values[0] = score;
            }
        }
        Ok(res)
    }

    fn inner_prod_vector(&self, entry: &WordBag, is_query: bool) -> Result<SparseVector> {
        self.scorer.projector().project(entry, is_query)
    }
}

impl std::fmt::Debug for Model1Similarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model1Similarity")
            .field("config", &self.config)
            .field("scorer", &self.scorer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScoringParams, ScoringPath};
    use crate::index::InMemoryForwardIndex;
    use crate::resources::{FeatureResources, RawTranslationModel};
    use crate::translation::CollectionProbs;

    fn make_resources() -> FeatureResources {
        let mut index = InMemoryForwardIndex::new("text");
        index.add_document("d1", "a a");
        index.add_document("d2", "b");
        index.add_document("d3", "");
        let a = index.word_id("a").unwrap();
        let b = index.word_id("b").unwrap();

        let mut res = FeatureResources::new();
        res.register_index("text", Arc::new(index));
        res.register_model(
            "text",
            5,
            RawTranslationModel::new(
                vec![(a, a, 0.9), (a, b, 0.1), (b, b, 1.0)],
                CollectionProbs::new(vec![0.5, 0.5]),
            ),
        );
        res
    }

    fn config() -> Model1Config {
        Model1Config::new("text", 5, ScoringParams::new(0.0, 0.0, 0.5))
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn query(text: &str) -> QueryData {
        QueryData::from([("text".to_string(), text.to_string())])
    }

    #[test]
    fn test_metadata() {
        let extractor = Model1Similarity::new(&make_resources(), config()).unwrap();
        assert_eq!(extractor.name(), EXTRACTOR_TYPE);
        assert_eq!(extractor.field_name(), "text");
        assert_eq!(extractor.feature_qty(), 1);
        assert!(extractor.is_sparse());
        assert_eq!(extractor.dim(), 0);
    }

    #[test]
    fn test_features_worked_example() {
        let extractor = Model1Similarity::new(&make_resources(), config()).unwrap();
        let res = extractor
            .features(&ids(&["d1", "d2", "d3"]), &query("b"))
            .unwrap();
        assert_eq!(res.len(), 3);
        assert!((res["d1"][0] - 0.1823).abs() < 1e-4, "d1={}", res["d1"][0]);
        // d2 = {b}: T(b) = 1, ln(0.75 / 0.25)
        assert!((res["d2"][0] - 3.0f64.ln()).abs() < 1e-6);
        assert_eq!(res["d3"][0], 0.0);

        let exhaustive = Model1Config::new(
            "text",
            5,
            ScoringParams::new(0.0, 0.0, 0.5).with_path(ScoringPath::Exhaustive),
        );
        let extractor = Model1Similarity::new(&make_resources(), exhaustive).unwrap();
        let other = extractor.features(&ids(&["d1"]), &query("b")).unwrap();
        assert!((other["d1"][0] - res["d1"][0]).abs() < 1e-6);
    }

    #[test]
    fn test_absent_query_yields_zeros() {
        let extractor = Model1Similarity::new(&make_resources(), config()).unwrap();
        let docs = ids(&["d1", "unknown"]);
        for data in [QueryData::new(), query(""), query("   ")] {
            let res = extractor.features(&docs, &data).unwrap();
            assert_eq!(res.len(), 2);
            assert!(res.values().all(|v| v == &vec![0.0]));
        }
    }

    #[test]
    fn test_missing_document_fails_batch() {
        let extractor = Model1Similarity::new(&make_resources(), config()).unwrap();
        let err = extractor
            .features(&ids(&["d1", "nope"]), &query("a b"))
            .unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound(id) if id == "nope"));
    }

    #[test]
    fn test_unknown_query_words_score_zero() {
        let extractor = Model1Similarity::new(&make_resources(), config()).unwrap();
        let res = extractor
            .features(&ids(&["d1"]), &query("zebra"))
            .unwrap();
        assert_eq!(res["d1"][0], 0.0);
    }

    #[test]
    fn test_inner_prod_vectors_reproduce_feature() {
        let extractor = Model1Similarity::new(&make_resources(), config()).unwrap();
        let index = extractor.index();
        let doc = index.doc_entry("d1").unwrap();
        let q = index.query_entry("a b b").unwrap();

        let dot = extractor
            .inner_prod_vector(doc, false)
            .unwrap()
            .inner_product(&extractor.inner_prod_vector(&q, true).unwrap());
        let res = extractor.features(&ids(&["d1"]), &query("a b b")).unwrap();
        assert!((dot - res["d1"][0]).abs() < 1e-6);
    }

    #[test]
    fn test_flip_scores_document_against_query() {
        let flipped = Model1Config::new(
            "text",
            5,
            ScoringParams::new(0.0, 0.0, 0.5).with_flip_doc_query(true),
        );
        let resources = make_resources();
        let plain = Model1Similarity::new(&resources, config()).unwrap();
        let extractor = Model1Similarity::new(&resources, flipped).unwrap();

        let res = extractor.features(&ids(&["d2"]), &query("a")).unwrap();
        // with flip, "a" plays the document and d2 = {b} the query
        let index = plain.index();
        let expected = plain
            .scorer()
            .overall_score(index.doc_entry("d2").unwrap(), &index.query_entry("a").unwrap())
            .unwrap();
        assert_eq!(res["d2"][0], expected);
        assert!(expected > 0.0);
    }

    #[test]
    fn test_construction_failures() {
        let resources = make_resources();
        assert!(matches!(
            Model1Similarity::new(&resources, Model1Config::new("title", 5, ScoringParams::new(0.0, 0.0, 0.5))),
            Err(Error::ResourceNotFound(_))
        ));
        assert!(matches!(
            Model1Similarity::new(&resources, Model1Config::new("text", 5, ScoringParams::new(0.0, 0.0, 1.5))),
            Err(Error::InvalidOption { .. })
        ));
        assert!(matches!(
            Model1Similarity::new(&resources, Model1Config::new("text", 9, ScoringParams::new(0.0, 0.0, 0.5))),
            Err(Error::ResourceNotFound(_))
        ));
    }
}
