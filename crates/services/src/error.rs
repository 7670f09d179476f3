//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::PromptError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `PromptSource` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PromptSourceError {
    #[error("prompt request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("prompt rejected: {0}")]
    InvalidPrompt(#[from] PromptError),
    #[error("expected {expected} distractors, got {actual}")]
    DistractorCount { expected: usize, actual: usize },
    #[error("prompt source unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted by `QuizController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while reading `QuizConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid prompt url {raw:?}")]
    InvalidUrl { raw: String },
    #[error("invalid {key} value: {raw:?}")]
    InvalidNumber { key: &'static str, raw: String },
    #[error("distractor count must be at least 1")]
    NoDistractors,
}

/// Errors emitted while bootstrapping quiz services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    PromptSource(#[from] PromptSourceError),
}
