//! Forward index: per-document bags of word ids for one field

use rustc_hash::FxHashMap;

use crate::structures::WordBag;
use crate::translation::CollectionProbs;
use crate::{OOV_WORD_ID, WordId, is_known_word};

/// Read access to the entries of one indexed field
pub trait ForwardIndex: Send + Sync {
    /// Stored entry of a document, `None` if the id is unknown
    fn doc_entry(&self, doc_id: &str) -> Option<&WordBag>;

    /// Entry for free query text; `None` when the text has no tokens
    ///
    /// Words outside the vocabulary map to [`OOV_WORD_ID`].
    fn query_entry(&self, text: &str) -> Option<WordBag>;

    /// Id of a vocabulary word, looked up in normalized form
    fn word_id(&self, word: &str) -> Option<WordId>;

    /// Vocabulary word of an id
    fn word(&self, word_id: WordId) -> Option<&str>;
}

/// Vocabulary form of a word
pub fn normalize_word(word: &str) -> String {
    word.to_lowercase()
}

/// Normalized whitespace tokens
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(normalize_word)
}

/// Forward index held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryForwardIndex {
    field_name: String,
    vocab: FxHashMap<String, WordId>,
    words: Vec<String>,
    docs: FxHashMap<String, WordBag>,
    term_counts: Vec<u64>,
}

impl InMemoryForwardIndex {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            ..Default::default()
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Id of the normalized `word`, assigning the next free id if it is new
    pub fn intern(&mut self, word: &str) -> WordId {
        let word = normalize_word(word);
        if let Some(&id) = self.vocab.get(&word) {
            return id;
        }
        let id = self.words.len() as WordId;
        self.vocab.insert(word.clone(), id);
        self.words.push(word);
        id
    }

    /// Tokenize `text`, growing the vocabulary, and store it under `doc_id`
    pub fn add_document(&mut self, doc_id: impl Into<String>, text: &str) -> &WordBag {
        let ids: Vec<WordId> = tokenize(text).map(|w| self.intern(&w)).collect();
        self.insert_entry(doc_id, WordBag::from_word_ids(ids))
    }

    /// Store a pre-built entry, replacing any previous entry of `doc_id`
    pub fn insert_entry(&mut self, doc_id: impl Into<String>, entry: WordBag) -> &WordBag {
        let doc_id = doc_id.into();
        for (word_id, qty) in entry.iter().filter(|&(id, _)| is_known_word(id)) {
            let idx = word_id as usize;
            if idx >= self.term_counts.len() {
                self.term_counts.resize(idx + 1, 0);
            }
            self.term_counts[idx] += qty as u64;
        }
        if let Some(old) = self.docs.remove(&doc_id) {
            for (word_id, qty) in old.iter().filter(|&(id, _)| is_known_word(id)) {
                let count = &mut self.term_counts[word_id as usize];
                *count = count.saturating_sub(qty as u64);
            }
        }
        self.docs.entry(doc_id).or_insert(entry)
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn vocab_size(&self) -> usize {
        self.words.len()
    }

    /// Ids of all stored documents, sorted
    pub fn doc_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.docs.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Collection probabilities from the indexed term counts
    pub fn collection_probs(&self) -> CollectionProbs {
        let mut counts = self.term_counts.clone();
        counts.resize(counts.len().max(self.words.len()), 0);
        CollectionProbs::from_counts(&counts)
    }
}

impl ForwardIndex for InMemoryForwardIndex {
    fn doc_entry(&self, doc_id: &str) -> Option<&WordBag> {
        self.docs.get(doc_id)
    }

    fn query_entry(&self, text: &str) -> Option<WordBag> {
        let ids: Vec<WordId> = tokenize(text)
            .map(|w| self.vocab.get(&w).copied().unwrap_or(OOV_WORD_ID))
            .collect();
        if ids.is_empty() {
            return None;
        }
        Some(WordBag::from_word_ids(ids))
    }

    fn word_id(&self, word: &str) -> Option<WordId> {
        self.vocab.get(&normalize_word(word)).copied()
    }

    fn word(&self, word_id: WordId) -> Option<&str> {
        usize::try_from(word_id)
            .ok()
            .and_then(|i| self.words.get(i))
            .map(String::as_str)
    }
}
