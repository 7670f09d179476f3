use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::Prompt;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChoiceSetError {
    #[error("expected {expected} choices, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("choice {0:?} does not belong to the prompt")]
    Foreign(String),

    #[error("choice {0:?} is listed twice")]
    Repeated(String),
}

/// Answer options for one prompt, in the order they are shown.
///
/// The order is fixed when the set is built and never changes afterwards, so
/// rendering the same round twice shows the same layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet {
    choices: Vec<String>,
}

impl ChoiceSet {
    /// Combine the distractors and the title, then apply a uniform random
    /// permutation (Fisher-Yates).
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(prompt: &Prompt, rng: &mut R) -> Self {
        let mut choices = Vec::with_capacity(prompt.choice_count());
        choices.extend(prompt.distractors().iter().cloned());
        choices.push(prompt.title().to_owned());
        choices.as_mut_slice().shuffle(rng);
        Self { choices }
    }

    /// Rebuild a set in a known order.
    ///
    /// # Errors
    ///
    /// Returns `ChoiceSetError` unless `order` is a permutation of the prompt's
    /// distractors plus its title.
    pub fn from_order(prompt: &Prompt, order: Vec<String>) -> Result<Self, ChoiceSetError> {
        if order.len() != prompt.choice_count() {
            return Err(ChoiceSetError::CountMismatch {
                expected: prompt.choice_count(),
                actual: order.len(),
            });
        }
        for (idx, choice) in order.iter().enumerate() {
            let known = prompt.is_correct(choice) || prompt.distractors().contains(choice);
            if !known {
                return Err(ChoiceSetError::Foreign(choice.clone()));
            }
            if order[..idx].contains(choice) {
                return Err(ChoiceSetError::Repeated(choice.clone()));
            }
        }
        Ok(Self { choices: order })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    #[must_use]
    pub fn contains(&self, choice: &str) -> bool {
        self.position(choice).is_some()
    }

    #[must_use]
    pub fn position(&self, choice: &str) -> Option<usize> {
        self.choices.iter().position(|item| item == choice)
    }
}
