use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PromptError {
    #[error("lyric line is empty")]
    EmptyLine,

    #[error("title is empty")]
    EmptyTitle,

    #[error("prompt has no distractors")]
    NoDistractors,

    #[error("distractor #{0} is empty")]
    EmptyDistractor(usize),

    #[error("title {0:?} appears among the distractors")]
    TitleInDistractors(String),

    #[error("distractor {0:?} appears more than once")]
    DuplicateDistractor(String),
}

/// One quiz round: a lyric line, the song it comes from, and wrong titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    line: String,
    title: String,
    distractors: Vec<String>,
}

impl Prompt {
    /// Build a prompt, checking that the title is not offered as a distractor.
    ///
    /// # Errors
    ///
    /// Returns `PromptError` if the line or title is blank, the distractor list is
    /// empty or contains blanks/duplicates, or it contains the title.
    pub fn new(
        line: impl Into<String>,
        title: impl Into<String>,
        distractors: Vec<String>,
    ) -> Result<Self, PromptError> {
        let line = line.into();
        let title = title.into();

        if line.trim().is_empty() {
            return Err(PromptError::EmptyLine);
        }
        if title.trim().is_empty() {
            return Err(PromptError::EmptyTitle);
        }
        if distractors.is_empty() {
            return Err(PromptError::NoDistractors);
        }

        for (idx, distractor) in distractors.iter().enumerate() {
            if distractor.trim().is_empty() {
                return Err(PromptError::EmptyDistractor(idx));
            }
            if *distractor == title {
                return Err(PromptError::TitleInDistractors(title));
            }
            if distractors[..idx].contains(distractor) {
                return Err(PromptError::DuplicateDistractor(distractor.clone()));
            }
        }

        Ok(Self {
            line,
            title,
            distractors,
        })
    }

    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn distractors(&self) -> &[String] {
        &self.distractors
    }

    /// Number of answer slots this prompt fills (distractors plus the title).
    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.distractors.len() + 1
    }

    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.title == choice
    }
}
