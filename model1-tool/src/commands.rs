//! Subcommand implementations; each writes JSON to the given writer

use std::io::Write;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use model1_core::{
    FeatureExtractor, ForwardIndex, InMemoryForwardIndex, Model1Similarity, QueryData,
    SparseVector, WordId,
};

#[derive(Debug, Serialize)]
struct DocScore<'a> {
    doc_id: &'a str,
    score: f64,
}

#[derive(Debug, Serialize)]
struct WeightedWord {
    word: String,
    id: WordId,
    weight: f32,
}

#[derive(Debug, Serialize)]
struct Projection<'a> {
    query: Vec<WeightedWord>,
    documents: Vec<(&'a str, Vec<WeightedWord>)>,
}

fn word_of(index: &InMemoryForwardIndex, id: WordId) -> String {
    index
        .word(id)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", id))
}

fn weighted_words(index: &InMemoryForwardIndex, vector: &SparseVector) -> Vec<WeightedWord> {
    vector
        .iter()
        .map(|(id, weight)| WeightedWord {
            word: word_of(index, id),
            id,
            weight,
        })
        .collect()
}

/// Requested document ids, or every indexed document
fn select_docs(index: &InMemoryForwardIndex, docs: &[String]) -> Vec<String> {
    if docs.is_empty() {
        index.doc_ids().into_iter().map(str::to_string).collect()
    } else {
        docs.to_vec()
    }
}

/// Score documents for `query`, best first (ties by id)
pub fn run_score(
    extractor: &Model1Similarity,
    index: &InMemoryForwardIndex,
    query: &str,
    docs: &[String],
    top: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let doc_ids = select_docs(index, docs);
    let query_data = QueryData::from([(extractor.field_name().to_string(), query.to_string())]);
    let features = extractor
        .features(&doc_ids, &query_data)
        .context("Scoring failed")?;

    let mut scored: Vec<DocScore<'_>> = doc_ids
        .iter()
        .map(|id| DocScore {
            doc_id: id,
            score: features.get(id).map_or(0.0, |v| v[0]),
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(b.doc_id)));
    if let Some(top) = top {
        scored.truncate(top);
    }

    info!("Scored {} documents", doc_ids.len());
    serde_json::to_writer_pretty(&mut *out, &scored)?;
    writeln!(out)?;
    Ok(())
}

/// Print the query vector and each document's sparse vector
pub fn run_project(
    extractor: &Model1Similarity,
    index: &InMemoryForwardIndex,
    query: &str,
    docs: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let query_vector = match index.query_entry(query) {
        Some(entry) => extractor.inner_prod_vector(&entry, true)?,
        None => SparseVector::default(),
    };

    let doc_ids = select_docs(index, docs);
    let mut documents = Vec::with_capacity(doc_ids.len());
    for doc_id in &doc_ids {
        let Some(entry) = index.doc_entry(doc_id) else {
            bail!("Unknown document '{}'", doc_id);
        };
        let vector = extractor
            .inner_prod_vector(entry, false)
            .with_context(|| format!("Failed to project document '{}'", doc_id))?;
        documents.push((doc_id.as_str(), weighted_words(index, &vector)));
    }

    let projection = Projection {
        query: weighted_words(index, &query_vector),
        documents,
    };
    serde_json::to_writer_pretty(&mut *out, &projection)?;
    writeln!(out)?;
    Ok(())
}

/// Print a document's top scored candidates
pub fn run_candidates(
    extractor: &Model1Similarity,
    index: &InMemoryForwardIndex,
    doc_id: &str,
    out: &mut impl Write,
) -> Result<()> {
    let Some(entry) = index.doc_entry(doc_id) else {
        bail!("Unknown document '{}'", doc_id);
    };
    let candidates = extractor
        .scorer()
        .expander()
        .top_scored_candidates(entry)
        .with_context(|| format!("Failed to expand document '{}'", doc_id))?;

    info!("Document '{}': {} candidates", doc_id, candidates.len());
    let words: Vec<WeightedWord> = candidates
        .into_iter()
        .map(|c| WeightedWord {
            word: word_of(index, c.id),
            id: c.id,
            weight: c.score,
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &words)?;
    writeln!(out)?;
    Ok(())
}
