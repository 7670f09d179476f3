use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_PROMPT_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_ANSWER_DELAY: Duration = Duration::from_millis(1200);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_PROMPT_URL: &str = "QUIZ_PROMPT_URL";
pub const ENV_ANSWER_DELAY_MS: &str = "QUIZ_ANSWER_DELAY_MS";
pub const ENV_DISTRACTORS: &str = "QUIZ_DISTRACTORS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "QUIZ_REQUEST_TIMEOUT_SECS";

/// Runtime knobs for a quiz session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    /// Base URL of the service exposing `GET /line`.
    pub prompt_base_url: String,
    /// How long the answer stays revealed before the next prompt loads.
    pub answer_delay: Duration,
    /// Required distractors per prompt. `None` pins the count of the first
    /// prompt a session receives.
    pub distractor_count: Option<usize>,
    pub request_timeout: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            prompt_base_url: DEFAULT_PROMPT_URL.to_string(),
            answer_delay: DEFAULT_ANSWER_DELAY,
            distractor_count: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl QuizConfig {
    /// Read overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read overrides through `lookup`, falling back to defaults for unset keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a value is set but unusable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_PROMPT_URL).filter(|value| !value.trim().is_empty()) {
            config.prompt_base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_ANSWER_DELAY_MS) {
            config.answer_delay = Duration::from_millis(parse_number(ENV_ANSWER_DELAY_MS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_DISTRACTORS) {
            let count = parse_number(ENV_DISTRACTORS, &raw)?;
            config.distractor_count =
                Some(usize::try_from(count).map_err(|_| ConfigError::InvalidNumber {
                    key: ENV_DISTRACTORS,
                    raw: raw.clone(),
                })?);
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout =
                Duration::from_secs(parse_number(ENV_REQUEST_TIMEOUT_SECS, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not http(s) or the distractor count is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.prompt_base_url).map_err(|_| ConfigError::InvalidUrl {
            raw: self.prompt_base_url.clone(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                raw: self.prompt_base_url.clone(),
            });
        }
        if self.distractor_count == Some(0) {
            return Err(ConfigError::NoDistractors);
        }
        Ok(())
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        raw: raw.to_string(),
    })
}
