use std::sync::Arc;

use storage::repository::Storage;

use crate::config::QuizConfig;
use crate::error::QuizServicesError;
use crate::prompt_source::{HttpPromptSource, PromptSource};
use crate::quiz_controller::QuizController;
use crate::score_store::ScoreStore;

/// Assembles the app-facing quiz collaborators.
#[derive(Clone)]
pub struct QuizServices {
    config: QuizConfig,
    prompts: Arc<dyn PromptSource>,
    scores: ScoreStore,
}

impl QuizServices {
    #[must_use]
    pub fn new(config: QuizConfig, prompts: Arc<dyn PromptSource>, storage: &Storage) -> Self {
        Self {
            config,
            prompts,
            scores: ScoreStore::new(Arc::clone(&storage.kv)),
        }
    }

    /// Build services backed by `SQLite` storage and the HTTP prompt source.
    ///
    /// # Errors
    ///
    /// Returns `QuizServicesError` if the config is invalid, storage
    /// initialization fails, or the HTTP client cannot be built.
    pub async fn new_sqlite(db_url: &str, config: QuizConfig) -> Result<Self, QuizServicesError> {
        config.validate()?;
        let storage = Storage::sqlite(db_url).await?;
        let prompts: Arc<dyn PromptSource> = Arc::new(HttpPromptSource::from_config(&config)?);
        Ok(Self::new(config, prompts, &storage))
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn prompt_source(&self) -> Arc<dyn PromptSource> {
        Arc::clone(&self.prompts)
    }

    #[must_use]
    pub fn scores(&self) -> ScoreStore {
        self.scores.clone()
    }

    /// A fresh controller in `Intro`, configured from `QuizConfig`.
    #[must_use]
    pub fn controller(&self) -> QuizController {
        QuizController::new(Arc::clone(&self.prompts), self.scores.clone())
            .with_answer_delay(self.config.answer_delay)
            .with_distractor_count(self.config.distractor_count)
    }
}
