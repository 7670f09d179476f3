//! Presentation state machine for one quiz session.
//!
//! The session cycles `Intro -> Loading -> Playing -> Revealed -> Loading ...`
//! until it is reset. It performs no I/O: callers run the prompt fetch and the
//! reveal delay themselves and report back with the ticket they were handed.
//! Completions carrying a ticket the session is no longer waiting for are
//! dropped, which keeps a late response from leaking into a restarted session.

use rand::Rng;

use crate::model::{AdvanceTicket, ChoiceSet, FetchTicket, Generation, Prompt, SessionScore};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Not started yet.
    #[default]
    Intro,
    /// Waiting for a prompt.
    Loading,
    /// Prompt shown, waiting for an answer.
    Playing,
    /// Answer shown, next round pending.
    Revealed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerKind {
    Correct,
    Incorrect,
}

/// Result of the single answer accepted for a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub kind: AnswerKind,
    pub chosen: String,
    pub title: String,
    pub score: SessionScore,
    pub advance: AdvanceTicket,
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.kind == AnswerKind::Correct
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceView {
    pub title: String,
    /// Only set once the round is revealed.
    pub is_answer: bool,
}

/// Owned copy of everything a view needs to draw the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuizSnapshot {
    pub phase: SessionPhase,
    pub score: SessionScore,
    pub line: Option<String>,
    pub choices: Vec<ChoiceView>,
    pub revealed: bool,
    pub fetch_error: Option<String>,
    pub confirming_restart: bool,
}

#[derive(Clone, Debug)]
struct Round {
    prompt: Prompt,
    choices: ChoiceSet,
    advance: Option<AdvanceTicket>,
}

#[derive(Clone, Debug, Default)]
pub struct QuizSession {
    phase: SessionPhase,
    score: SessionScore,
    round: Option<Round>,
    pending_fetch: Option<FetchTicket>,
    fetch_error: Option<String>,
    confirming_restart: bool,
    generation: Generation,
    last_ticket: u64,
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave the intro with a restored score and ask for the first prompt.
    ///
    /// Returns `None` (and changes nothing) outside `Intro`.
    pub fn begin(&mut self, score: SessionScore) -> Option<FetchTicket> {
        if self.phase != SessionPhase::Intro {
            return None;
        }
        self.score = score;
        Some(self.enter_loading())
    }

    /// Install a fetched prompt and shuffle its choices once.
    ///
    /// Returns `false` if the session was not waiting for `ticket`.
    pub fn prompt_loaded<R: Rng + ?Sized>(
        &mut self,
        ticket: FetchTicket,
        prompt: Prompt,
        rng: &mut R,
    ) -> bool {
        if !self.awaits(ticket) {
            return false;
        }
        let choices = ChoiceSet::shuffled(&prompt, rng);
        self.round = Some(Round {
            prompt,
            choices,
            advance: None,
        });
        self.pending_fetch = None;
        self.fetch_error = None;
        self.phase = SessionPhase::Playing;
        true
    }

    /// Record a failed fetch. The session stays in `Loading` until retried.
    ///
    /// Returns `false` if the session was not waiting for `ticket`.
    pub fn prompt_failed(&mut self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        if !self.awaits(ticket) {
            return false;
        }
        self.pending_fetch = None;
        self.fetch_error = Some(message.into());
        true
    }

    /// Issue a fresh fetch after a failure.
    pub fn retry_fetch(&mut self) -> Option<FetchTicket> {
        if self.phase != SessionPhase::Loading || self.fetch_error.is_none() {
            return None;
        }
        Some(self.enter_loading())
    }

    /// Score the answer for the current round.
    ///
    /// Only the first answer in `Playing` counts; anything else, including a
    /// title that is not on offer, returns `None` and leaves the score alone.
    pub fn submit(&mut self, choice: &str) -> Option<AnswerOutcome> {
        if self.phase != SessionPhase::Playing {
            return None;
        }
        let offered = self
            .round
            .as_ref()
            .is_some_and(|round| round.choices.contains(choice));
        if !offered {
            return None;
        }
        let advance = AdvanceTicket::new(self.bump_ticket());
        let round = self.round.as_mut()?;

        let kind = if round.prompt.is_correct(choice) {
            self.score.record_correct();
            AnswerKind::Correct
        } else {
            self.score.record_incorrect();
            AnswerKind::Incorrect
        };
        round.advance = Some(advance);
        let title = round.prompt.title().to_owned();
        self.phase = SessionPhase::Revealed;

        Some(AnswerOutcome {
            kind,
            chosen: choice.to_owned(),
            title,
            score: self.score,
            advance,
        })
    }

    /// Move from the revealed answer to the next prompt fetch.
    ///
    /// Returns `None` for stale or unexpected tickets.
    pub fn advance(&mut self, ticket: AdvanceTicket) -> Option<FetchTicket> {
        if self.phase != SessionPhase::Revealed {
            return None;
        }
        let expected = self.round.as_ref().and_then(|round| round.advance);
        if expected != Some(ticket) {
            return None;
        }
        Some(self.enter_loading())
    }

    pub fn request_restart(&mut self) {
        self.confirming_restart = true;
    }

    pub fn cancel_restart(&mut self) {
        self.confirming_restart = false;
    }

    /// Drop every piece of session state and return to `Intro`.
    ///
    /// Outstanding tickets are invalidated; ticket numbers keep increasing
    /// across generations so an old ticket can never match a new one.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Intro;
        self.score = SessionScore::zero();
        self.round = None;
        self.pending_fetch = None;
        self.fetch_error = None;
        self.confirming_restart = false;
        self.generation = self.generation.next();
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> SessionScore {
        self.score
    }

    #[must_use]
    pub fn prompt(&self) -> Option<&Prompt> {
        self.round.as_ref().map(|round| &round.prompt)
    }

    #[must_use]
    pub fn choices(&self) -> Option<&ChoiceSet> {
        self.round.as_ref().map(|round| &round.choices)
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.phase == SessionPhase::Revealed
    }

    #[must_use]
    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    #[must_use]
    pub fn pending_fetch(&self) -> Option<FetchTicket> {
        self.pending_fetch
    }

    #[must_use]
    pub fn is_confirming_restart(&self) -> bool {
        self.confirming_restart
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        let revealed = self.is_revealed();
        let (line, choices) = match self.round.as_ref() {
            Some(round) => (
                Some(round.prompt.line().to_owned()),
                round
                    .choices
                    .iter()
                    .map(|title| ChoiceView {
                        title: title.to_owned(),
                        is_answer: revealed && round.prompt.is_correct(title),
                    })
                    .collect(),
            ),
            None => (None, Vec::new()),
        };

        QuizSnapshot {
            phase: self.phase,
            score: self.score,
            line,
            choices,
            revealed,
            fetch_error: self.fetch_error.clone(),
            confirming_restart: self.confirming_restart,
        }
    }

    fn awaits(&self, ticket: FetchTicket) -> bool {
        self.phase == SessionPhase::Loading && self.pending_fetch == Some(ticket)
    }

    fn enter_loading(&mut self) -> FetchTicket {
        let ticket = FetchTicket::new(self.bump_ticket());
        self.round = None;
        self.fetch_error = None;
        self.pending_fetch = Some(ticket);
        self.phase = SessionPhase::Loading;
        ticket
    }

    fn bump_ticket(&mut self) -> u64 {
        self.last_ticket = self.last_ticket.wrapping_add(1);
        self.last_ticket
    }
}
