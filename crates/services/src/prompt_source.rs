use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use quiz_core::model::{Prompt, PromptError};

use crate::config::QuizConfig;
use crate::error::PromptSourceError;

/// Supplies a new prompt for every round.
#[async_trait]
pub trait PromptSource: Send + Sync {
    /// Fetch the next prompt. May suspend while a network round-trip completes.
    ///
    /// # Errors
    ///
    /// Returns `PromptSourceError` if no usable prompt could be obtained.
    async fn fetch_prompt(&self) -> Result<Prompt, PromptSourceError>;
}

/// Reads prompts from `GET {base_url}/line`.
#[derive(Clone)]
pub struct HttpPromptSource {
    client: Client,
    endpoint: String,
}

impl HttpPromptSource {
    /// # Errors
    ///
    /// Returns `PromptSourceError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PromptSourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = format!("{}/line", base_url.trim_end_matches('/'));
        Ok(Self { client, endpoint })
    }

    /// # Errors
    ///
    /// Returns `PromptSourceError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &QuizConfig) -> Result<Self, PromptSourceError> {
        Self::new(&config.prompt_base_url, config.request_timeout)
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PromptSource for HttpPromptSource {
    async fn fetch_prompt(&self) -> Result<Prompt, PromptSourceError> {
        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(PromptSourceError::HttpStatus(response.status()));
        }

        let record: LineRecord = response.json().await?;
        debug!(endpoint = %self.endpoint, "prompt received");
        Ok(record.into_prompt()?)
    }
}

/// Wire shape of `/line`; `choices` holds the distractors only.
#[derive(Debug, Deserialize)]
struct LineRecord {
    title: String,
    line: String,
    choices: Vec<String>,
}

impl LineRecord {
    fn into_prompt(self) -> Result<Prompt, PromptError> {
        Prompt::new(self.line, self.title, self.choices)
    }
}
