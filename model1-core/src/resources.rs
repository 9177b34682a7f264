//! Shared resources: forward indexes and trained translation models
//!
//! Raw translation models are registered per (subdirectory, GIZA iteration
//! count). The rescaled `Model1Data` the scorer consumes depends on the
//! self-translation prior and the probability floor too, so it is built on
//! first request and memoized per full [`Model1Key`].

use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::config::Model1Config;
use crate::error::{Error, Result};
use crate::index::ForwardIndex;
use crate::translation::{CollectionProbs, Model1Data, TranslationTableBuilder};
use crate::WordId;

/// Identifies one rescaled translation model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Model1Key {
    subdir: String,
    giza_iter_qty: u32,
    prob_self_tran_bits: u32,
    min_model1_prob_bits: u32,
}

impl Model1Key {
    pub fn new(
        subdir: impl Into<String>,
        giza_iter_qty: u32,
        prob_self_tran: f32,
        min_model1_prob: f32,
    ) -> Self {
        Self {
            subdir: subdir.into(),
            giza_iter_qty,
            prob_self_tran_bits: prob_self_tran.to_bits(),
            min_model1_prob_bits: min_model1_prob.to_bits(),
        }
    }

    pub fn from_config(config: &Model1Config) -> Self {
        Self::new(
            config.model1_subdir(),
            config.giza_iter_qty,
            config.params.prob_self_tran,
            config.params.min_model1_prob,
        )
    }

    pub fn subdir(&self) -> &str {
        &self.subdir
    }

    pub fn giza_iter_qty(&self) -> u32 {
        self.giza_iter_qty
    }

    pub fn prob_self_tran(&self) -> f32 {
        f32::from_bits(self.prob_self_tran_bits)
    }

    pub fn min_model1_prob(&self) -> f32 {
        f32::from_bits(self.min_model1_prob_bits)
    }
}

/// Translation records as produced by training, before rescaling
#[derive(Debug, Clone, Default)]
pub struct RawTranslationModel {
    pub entries: Vec<(WordId, WordId, f32)>,
    pub collection: CollectionProbs,
}

impl RawTranslationModel {
    pub fn new(entries: Vec<(WordId, WordId, f32)>, collection: CollectionProbs) -> Self {
        Self {
            entries,
            collection,
        }
    }

    /// Rescale with the key's prior and floor
    pub fn build(&self, key: &Model1Key) -> Result<Model1Data> {
        let mut builder = TranslationTableBuilder::new();
        for &(src, dst, prob) in &self.entries {
            builder.add(src, dst, prob)?;
        }
        let table = builder.build_rescaled(key.prob_self_tran(), key.min_model1_prob());
        Ok(Model1Data::new(table, self.collection.clone()))
    }
}

/// Source of everything a feature extractor needs
pub trait ResourceProvider: Send + Sync {
    /// Forward index of a field
    fn forward_index(&self, field_name: &str) -> Result<Arc<dyn ForwardIndex>>;

    /// Rescaled translation model for `key`
    fn model1_data(&self, key: &Model1Key) -> Result<Arc<Model1Data>>;
}

/// In-memory [`ResourceProvider`]
#[derive(Default)]
pub struct FeatureResources {
    indexes: FxHashMap<String, Arc<dyn ForwardIndex>>,
    models: FxHashMap<(String, u32), Arc<RawTranslationModel>>,
    built: RwLock<FxHashMap<Model1Key, Arc<Model1Data>>>,
}

impl FeatureResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_index(&mut self, field_name: impl Into<String>, index: Arc<dyn ForwardIndex>) {
        self.indexes.insert(field_name.into(), index);
    }

    pub fn register_model(
        &mut self,
        subdir: impl Into<String>,
        giza_iter_qty: u32,
        model: RawTranslationModel,
    ) {
        self.models
            .insert((subdir.into(), giza_iter_qty), Arc::new(model));
    }

    /// Number of rescaled models built so far
    pub fn num_built(&self) -> usize {
        self.built.read().len()
    }
}

impl ResourceProvider for FeatureResources {
    fn forward_index(&self, field_name: &str) -> Result<Arc<dyn ForwardIndex>> {
        self.indexes
            .get(field_name)
            .cloned()
            .ok_or_else(|| Error::ResourceNotFound(format!("forward index for field '{}'", field_name)))
    }

    fn model1_data(&self, key: &Model1Key) -> Result<Arc<Model1Data>> {
        {
            let built = self.built.read();
            if let Some(data) = built.get(key) {
                return Ok(Arc::clone(data));
            }
        }

        let raw = self
            .models
            .get(&(key.subdir().to_string(), key.giza_iter_qty()))
            .ok_or_else(|| {
                Error::ResourceNotFound(format!(
                    "translation model '{}' after {} GIZA iterations",
                    key.subdir(),
                    key.giza_iter_qty()
                ))
            })?;
        let data = Arc::new(raw.build(key)?);
        debug!(
            "Built translation model '{}' (iter={}, probSelfTran={}, minModel1Prob={}): {} sources, {} entries",
            key.subdir(),
            key.giza_iter_qty(),
            key.prob_self_tran(),
            key.min_model1_prob(),
            data.table.num_sources(),
            data.table.num_entries()
        );

        // Another thread may have built the same key meanwhile; keep the first
        let mut built = self.built.write();
        Ok(Arc::clone(built.entry(key.clone()).or_insert(data)))
    }
}

impl std::fmt::Debug for FeatureResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureResources")
            .field("fields", &self.indexes.keys().collect::<Vec<_>>())
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .field("built", &self.num_built())
            .finish()
    }
}
