//! Model1 similarity configuration
//!
//! Configuration arrives as a flat set of named options (or a JSON object with
//! the same keys) and is validated once, at construction. Required options:
//! `fieldName`, `gizaIterQty`, `probSelfTran`, `minModel1Prob`, `lambda`.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const FIELD_NAME: &str = "fieldName";
pub const MODEL1_SUBDIR: &str = "model1SubDir";
pub const GIZA_ITER_QTY: &str = "gizaIterQty";
pub const PROB_SELF_TRAN: &str = "probSelfTran";
pub const MIN_MODEL1_PROB: &str = "minModel1Prob";
pub const LAMBDA: &str = "lambda";
pub const OOV_PROB: &str = "ProbOOV";
pub const FLIP_DOC_QUERY: &str = "flipDocQuery";
pub const TOP_TRAN_SCORES_PER_DOCWORD_QTY: &str = "topTranScoresPerDocWordQty";
pub const TOP_TRAN_CANDWORD_QTY: &str = "topTranCandWordQty";
pub const MIN_TRAN_SCORE_PERDOCWORD: &str = "minTranScorePerDocWord";
pub const SCORING_PATH: &str = "scoringPath";

pub const DEFAULT_PROB_OOV: f32 = 1e-9;
pub const DEFAULT_MIN_TRAN_SCORE_PER_DOC_WORD: f32 = 1e-6;

/// Which aggregate scoring algorithm to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoringPath {
    /// Score only the pruned candidate set expanded from the document
    #[default]
    Pruned,
    /// Score every query word directly against the full document
    Exhaustive,
}

impl FromStr for ScoringPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pruned" => Ok(Self::Pruned),
            "exhaustive" => Ok(Self::Exhaustive),
            other => Err(Error::InvalidOption {
                key: SCORING_PATH,
                reason: format!("unknown scoring path '{}'", other),
            }),
        }
    }
}

/// Numeric parameters of the scoring algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    /// Self-translation probability prior
    pub prob_self_tran: f32,
    /// Translation probabilities below this floor contribute nothing
    pub min_model1_prob: f32,
    /// Mixture weight of the collection (background) model
    pub lambda: f32,
    /// Background probability floor for unseen words
    pub prob_oov: f32,
    /// Swap which entry plays the query and which the document
    pub flip_doc_query: bool,
    /// Cap on candidates kept per document word (None = unbounded)
    pub top_tran_scores_per_doc_word_qty: Option<usize>,
    /// Cap on translation candidates per source word (None = unbounded)
    pub top_tran_cand_word_qty: Option<usize>,
    /// Candidates scoring at or below this value are pruned
    pub min_tran_score_per_doc_word: f32,
    /// Aggregate scoring algorithm
    pub path: ScoringPath,
}

impl ScoringParams {
    /// Create parameters from the required values, everything else at defaults
    pub fn new(prob_self_tran: f32, min_model1_prob: f32, lambda: f32) -> Self {
        Self {
            prob_self_tran,
            min_model1_prob,
            lambda,
            prob_oov: DEFAULT_PROB_OOV,
            flip_doc_query: false,
            top_tran_scores_per_doc_word_qty: None,
            top_tran_cand_word_qty: None,
            min_tran_score_per_doc_word: DEFAULT_MIN_TRAN_SCORE_PER_DOC_WORD,
            path: ScoringPath::Pruned,
        }
    }

    pub fn with_prob_oov(mut self, prob_oov: f32) -> Self {
        self.prob_oov = prob_oov;
        self
    }

    pub fn with_flip_doc_query(mut self, flip: bool) -> Self {
        self.flip_doc_query = flip;
        self
    }

    pub fn with_top_tran_scores_per_doc_word_qty(mut self, qty: Option<usize>) -> Self {
        self.top_tran_scores_per_doc_word_qty = qty;
        self
    }

    pub fn with_top_tran_cand_word_qty(mut self, qty: Option<usize>) -> Self {
        self.top_tran_cand_word_qty = qty;
        self
    }

    pub fn with_min_tran_score_per_doc_word(mut self, min_score: f32) -> Self {
        self.min_tran_score_per_doc_word = min_score;
        self
    }

    pub fn with_path(mut self, path: ScoringPath) -> Self {
        self.path = path;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        check_prob(PROB_SELF_TRAN, self.prob_self_tran)?;
        check_prob(MIN_MODEL1_PROB, self.min_model1_prob)?;
        if !(self.lambda > 0.0 && self.lambda < 1.0) {
            return Err(Error::InvalidOption {
                key: LAMBDA,
                reason: format!("{} is outside (0, 1)", self.lambda),
            });
        }
        if !(self.prob_oov > 0.0 && self.prob_oov <= 1.0) {
            return Err(Error::InvalidOption {
                key: OOV_PROB,
                reason: format!("{} is outside (0, 1]", self.prob_oov),
            });
        }
        if !self.min_tran_score_per_doc_word.is_finite() {
            return Err(Error::InvalidOption {
                key: MIN_TRAN_SCORE_PERDOCWORD,
                reason: "must be finite".to_string(),
            });
        }
        check_cap(
            TOP_TRAN_SCORES_PER_DOCWORD_QTY,
            self.top_tran_scores_per_doc_word_qty,
        )?;
        check_cap(TOP_TRAN_CANDWORD_QTY, self.top_tran_cand_word_qty)?;
        Ok(())
    }
}

fn check_prob(key: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidOption {
            key,
            reason: format!("{} is outside [0, 1]", value),
        })
    }
}

fn check_cap(key: &'static str, value: Option<usize>) -> Result<()> {
    match value {
        Some(0) => Err(Error::InvalidOption {
            key,
            reason: "must be at least 1".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Full configuration of one Model1 similarity feature
#[derive(Debug, Clone, PartialEq)]
pub struct Model1Config {
    /// Forward index field the feature is computed on
    pub field_name: String,
    /// Subdirectory of the trained model (defaults to the field name)
    pub model1_subdir: Option<String>,
    /// GIZA iteration whose table is used
    pub giza_iter_qty: u32,
    pub params: ScoringParams,
}

impl Model1Config {
    pub fn new(field_name: impl Into<String>, giza_iter_qty: u32, params: ScoringParams) -> Self {
        Self {
            field_name: field_name.into(),
            model1_subdir: None,
            giza_iter_qty,
            params,
        }
    }

    pub fn with_model1_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.model1_subdir = Some(subdir.into());
        self
    }

    /// Model subdirectory, falling back to the field name
    pub fn model1_subdir(&self) -> &str {
        self.model1_subdir.as_deref().unwrap_or(&self.field_name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.field_name.is_empty() {
            return Err(Error::MissingOption(FIELD_NAME));
        }
        self.params.validate()
    }

    /// Parse and validate a flat set of named options
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self> {
        let opts = Options(options);

        let field_name = opts.required_str(FIELD_NAME)?.to_string();
        let model1_subdir = opts.get(MODEL1_SUBDIR).map(str::to_string);
        let giza_iter_qty = opts.required::<u32>(GIZA_ITER_QTY)?;

        let mut params = ScoringParams::new(
            opts.required(PROB_SELF_TRAN)?,
            opts.required(MIN_MODEL1_PROB)?,
            opts.required(LAMBDA)?,
        );
        if let Some(prob_oov) = opts.optional(OOV_PROB)? {
            params.prob_oov = prob_oov;
        }
        if let Some(flip) = opts.optional_bool(FLIP_DOC_QUERY)? {
            params.flip_doc_query = flip;
        }
        params.top_tran_scores_per_doc_word_qty = opts.optional_cap(TOP_TRAN_SCORES_PER_DOCWORD_QTY)?;
        params.top_tran_cand_word_qty = opts.optional_cap(TOP_TRAN_CANDWORD_QTY)?;
        if let Some(min_score) = opts.optional(MIN_TRAN_SCORE_PERDOCWORD)? {
            params.min_tran_score_per_doc_word = min_score;
        }
        if let Some(path) = opts.get(SCORING_PATH) {
            params.path = path.parse()?;
        }

        let config = Self {
            field_name,
            model1_subdir,
            giza_iter_qty,
            params,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON object whose keys are the option names
    pub fn from_json(json_bytes: &[u8]) -> Result<Self> {
        let map: HashMap<String, serde_json::Value> = serde_json::from_slice(json_bytes)
            .map_err(|e| Error::Serialization(format!("Failed to parse config JSON: {}", e)))?;

        let mut options = HashMap::with_capacity(map.len());
        for (key, value) in map {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => continue,
                other => {
                    return Err(Error::Serialization(format!(
                        "option '{}' must be a scalar, got {}",
                        key, other
                    )));
                }
            };
            options.insert(key, text);
        }
        Self::from_options(&options)
    }
}

struct Options<'a>(&'a HashMap<String, String>);

impl Options<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.trim())
    }

    fn required_str(&self, key: &'static str) -> Result<&str> {
        match self.get(key) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(Error::MissingOption(key)),
        }
    }

    fn required<T: FromStr>(&self, key: &'static str) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        parse_value(key, self.required_str(key)?)
    }

    fn optional<T: FromStr>(&self, key: &'static str) -> Result<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        self.get(key).map(|v| parse_value(key, v)).transpose()
    }

    fn optional_bool(&self, key: &'static str) -> Result<Option<bool>> {
        self.get(key)
            .map(|v| match v.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                other => Err(Error::InvalidOption {
                    key,
                    reason: format!("'{}' is not a boolean", other),
                }),
            })
            .transpose()
    }

    /// Pruning caps; `i32::MAX` and above are treated as "unbounded"
    fn optional_cap(&self, key: &'static str) -> Result<Option<usize>> {
        Ok(self
            .optional::<u64>(key)?
            .filter(|&v| v < i32::MAX as u64)
            .map(|v| v as usize))
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| Error::InvalidOption {
        key,
        reason: format!("'{}': {}", value, e),
    })
}
