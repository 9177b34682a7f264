//! Error types for model1

use crate::WordId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inconsistent data or bug: can't find document with id '{0}'")]
    DocumentNotFound(String),

    #[error(
        "Bug in re-scaling translation tables: self-translation probability for id={word_id} \
         is {found}, expected at least {expected}"
    )]
    SelfTranslationMismatch {
        word_id: WordId,
        expected: f32,
        found: f32,
    },

    #[error("Missing required option: {0}")]
    MissingOption(&'static str),

    #[error("Invalid value for option '{key}': {reason}")]
    InvalidOption { key: &'static str, reason: String },

    #[error("Invalid translation entry: {0}")]
    InvalidTranslation(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;
