//! JSON bundle loading: documents, word-form translation table and
//! optional collection probabilities

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use model1_core::{
    CollectionProbs, FeatureResources, InMemoryForwardIndex, Model1Config, RawTranslationModel,
    WordId,
};

#[derive(Debug, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslationRecord {
    pub src: String,
    pub dst: String,
    pub prob: f32,
}

/// Everything needed to run the scorer outside an index
#[derive(Debug, Deserialize)]
pub struct Bundle {
    pub documents: Vec<DocumentRecord>,
    pub translations: Vec<TranslationRecord>,
    /// Word → collection probability; derived from the documents when absent
    #[serde(default)]
    pub collection: Option<HashMap<String, f32>>,
}

impl Bundle {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("Failed to read bundle {:?}", path))?;
        serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse bundle {:?}", path))
    }

    /// Index the documents and register the translation model where `config` looks for them
    pub fn into_resources(
        self,
        config: &Model1Config,
    ) -> Result<(FeatureResources, Arc<InMemoryForwardIndex>)> {
        let mut index = InMemoryForwardIndex::new(config.field_name.clone());
        for doc in &self.documents {
            index.add_document(doc.id.clone(), &doc.text);
        }

        // interning normalizes words the way document and query text is tokenized
        let entries: Vec<(WordId, WordId, f32)> = self
            .translations
            .iter()
            .map(|t| (index.intern(&t.src), index.intern(&t.dst), t.prob))
            .collect();

        let collection = match &self.collection {
            Some(probs) => {
                let mut values = vec![0.0f32; index.vocab_size()];
                for (word, &prob) in probs {
                    let id = index.intern(word) as usize;
                    if id >= values.len() {
                        values.resize(id + 1, 0.0);
                    }
                    values[id] = prob;
                }
                CollectionProbs::new(values)
            }
            None => index.collection_probs(),
        };

        info!(
            "Loaded {} documents, {} words, {} translation records",
            index.num_docs(),
            index.vocab_size(),
            entries.len()
        );

        let index = Arc::new(index);
        let mut resources = FeatureResources::new();
        resources.register_index(config.field_name.clone(), index.clone());
        resources.register_model(
            config.model1_subdir(),
            config.giza_iter_qty,
            RawTranslationModel::new(entries, collection),
        );
        Ok((resources, index))
    }
}

/// Read and validate a JSON config file
pub fn load_config(path: &Path) -> Result<Model1Config> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read config {:?}", path))?;
    Model1Config::from_json(&bytes).with_context(|| format!("Invalid config {:?}", path))
}
