#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod prompt_source;
pub mod quiz_controller;
pub mod score_store;

pub use app_services::QuizServices;
pub use config::QuizConfig;
pub use error::{ConfigError, PromptSourceError, QuizError, QuizServicesError};
pub use prompt_source::{HttpPromptSource, PromptSource};
pub use quiz_controller::{FetchCompletion, QuizController, ScoredAnswer, fetch_prompt};
pub use score_store::{PLAY_STATE_KEY, ScoreStore};
