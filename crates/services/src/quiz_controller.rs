use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use quiz_core::model::{AdvanceTicket, FetchTicket, Prompt, SessionScore};
use quiz_core::{AnswerOutcome, QuizSession, QuizSnapshot, SessionPhase};

use crate::config::DEFAULT_ANSWER_DELAY;
use crate::error::{PromptSourceError, QuizError};
use crate::prompt_source::PromptSource;
use crate::score_store::ScoreStore;

/// A finished prompt fetch, tagged with the ticket it was issued for.
#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: Result<Prompt, PromptSourceError>,
}

/// Run one fetch without holding the controller, so the session can be
/// restarted while the request is in flight.
pub async fn fetch_prompt(source: Arc<dyn PromptSource>, ticket: FetchTicket) -> FetchCompletion {
    let result = source.fetch_prompt().await;
    FetchCompletion { ticket, result }
}

/// Outcome of an accepted answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub outcome: AnswerOutcome,
    /// `false` when the score could not be written; the round still counts.
    pub persisted: bool,
}

/// Owns one quiz session and is the only writer of the saved score.
pub struct QuizController {
    session: QuizSession,
    source: Arc<dyn PromptSource>,
    scores: ScoreStore,
    rng: StdRng,
    answer_delay: Duration,
    distractor_count: Option<usize>,
    pinned_distractors: Option<usize>,
}

impl QuizController {
    #[must_use]
    pub fn new(source: Arc<dyn PromptSource>, scores: ScoreStore) -> Self {
        Self {
            session: QuizSession::new(),
            source,
            scores,
            rng: StdRng::from_rng(&mut rand::rng()),
            answer_delay: DEFAULT_ANSWER_DELAY,
            distractor_count: None,
            pinned_distractors: None,
        }
    }

    /// Use a seeded RNG so choice order is reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_answer_delay(mut self, delay: Duration) -> Self {
        self.answer_delay = delay;
        self
    }

    /// Require exactly `count` distractors per prompt. With `None`, the count
    /// of the first accepted prompt is required from then on.
    #[must_use]
    pub fn with_distractor_count(mut self, count: Option<usize>) -> Self {
        self.distractor_count = count;
        self
    }

    #[must_use]
    pub fn answer_delay(&self) -> Duration {
        self.answer_delay
    }

    #[must_use]
    pub fn prompt_source(&self) -> Arc<dyn PromptSource> {
        Arc::clone(&self.source)
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    #[must_use]
    pub fn score(&self) -> SessionScore {
        self.session.score()
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        self.session.snapshot()
    }

    /// Restore the saved score and move to `Loading`.
    ///
    /// Returns the ticket for the first fetch, or `None` if the session has
    /// already started.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the store cannot be read; the session
    /// then stays in `Intro`.
    pub async fn start(&mut self) -> Result<Option<FetchTicket>, QuizError> {
        if self.session.phase() != SessionPhase::Intro {
            return Ok(None);
        }
        let score = self.scores.restore().await?;
        let ticket = self.session.begin(score);
        info!(
            generation = %self.session.generation(),
            streak = score.streak_correct(),
            played = score.total_played(),
            "quiz started"
        );
        Ok(ticket)
    }

    /// Apply a finished fetch. Stale completions are dropped.
    ///
    /// Returns `true` if the completion was for the fetch the session awaited.
    pub fn complete_fetch(&mut self, completion: FetchCompletion) -> bool {
        let FetchCompletion { ticket, result } = completion;
        if self.session.pending_fetch() != Some(ticket) {
            debug!(%ticket, "dropping stale prompt fetch");
            return false;
        }

        match result.and_then(|prompt| self.check_distractors(prompt)) {
            Ok(prompt) => {
                self.pinned_distractors
                    .get_or_insert(prompt.distractors().len());
                debug!(%ticket, "prompt loaded");
                self.session.prompt_loaded(ticket, prompt, &mut self.rng)
            }
            Err(err) => {
                warn!(%ticket, error = %err, "prompt fetch failed");
                self.session.prompt_failed(ticket, err.to_string())
            }
        }
    }

    /// Fetch and apply the prompt for `ticket` in one step.
    pub async fn load_prompt(&mut self, ticket: FetchTicket) -> bool {
        let completion = fetch_prompt(self.prompt_source(), ticket).await;
        self.complete_fetch(completion)
    }

    /// Score an answer and persist the new counters before returning.
    ///
    /// Returns `None` when the answer is not accepted (not `Playing`, already
    /// answered, or not one of the offered choices).
    pub async fn submit_answer(&mut self, choice: &str) -> Option<ScoredAnswer> {
        let outcome = self.session.submit(choice)?;
        let persisted = match self.scores.save(outcome.score).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to persist score");
                false
            }
        };
        debug!(
            correct = outcome.is_correct(),
            streak = outcome.score.streak_correct(),
            advance = %outcome.advance,
            "answer scored"
        );
        Some(ScoredAnswer { outcome, persisted })
    }

    /// Leave the revealed answer and ask for the next prompt.
    pub fn advance(&mut self, ticket: AdvanceTicket) -> Option<FetchTicket> {
        let next = self.session.advance(ticket);
        if next.is_none() {
            debug!(%ticket, "ignoring stale advance");
        }
        next
    }

    pub fn retry_fetch(&mut self) -> Option<FetchTicket> {
        self.session.retry_fetch()
    }

    pub fn request_restart(&mut self) {
        self.session.request_restart();
    }

    pub fn cancel_restart(&mut self) {
        self.session.cancel_restart();
    }

    /// Wipe the saved score and return to `Intro`.
    ///
    /// Returns `false` without touching anything unless a restart was requested.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the store cannot be cleared; the session
    /// is left as it was.
    pub async fn confirm_restart(&mut self) -> Result<bool, QuizError> {
        if !self.session.is_confirming_restart() {
            return Ok(false);
        }
        self.scores.clear().await?;
        self.session.reset();
        info!(generation = %self.session.generation(), "quiz restarted");
        Ok(true)
    }

    fn check_distractors(&self, prompt: Prompt) -> Result<Prompt, PromptSourceError> {
        let actual = prompt.distractors().len();
        match self.distractor_count.or(self.pinned_distractors) {
            Some(expected) if expected != actual => {
                Err(PromptSourceError::DistractorCount { expected, actual })
            }
            _ => Ok(prompt),
        }
    }
}
