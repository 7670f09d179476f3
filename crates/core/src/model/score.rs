use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("total correct ({correct}) exceeds total played ({played})")]
    CorrectExceedsPlayed { correct: u32, played: u32 },

    #[error("streak ({streak}) exceeds total correct ({correct})")]
    StreakExceedsCorrect { streak: u32, correct: u32 },
}

/// Streak and lifetime counters for a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SessionScore {
    streak_correct: u32,
    total_correct: u32,
    total_played: u32,
}

impl SessionScore {
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            streak_correct: 0,
            total_correct: 0,
            total_played: 0,
        }
    }

    /// Rehydrate counters from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError` if the counters are inconsistent with each other.
    pub fn from_persisted(
        streak_correct: u32,
        total_correct: u32,
        total_played: u32,
    ) -> Result<Self, ScoreError> {
        if total_correct > total_played {
            return Err(ScoreError::CorrectExceedsPlayed {
                correct: total_correct,
                played: total_played,
            });
        }
        if streak_correct > total_correct {
            return Err(ScoreError::StreakExceedsCorrect {
                streak: streak_correct,
                correct: total_correct,
            });
        }
        Ok(Self {
            streak_correct,
            total_correct,
            total_played,
        })
    }

    pub fn record_correct(&mut self) {
        self.streak_correct = self.streak_correct.saturating_add(1);
        self.total_correct = self.total_correct.saturating_add(1);
        self.total_played = self.total_played.saturating_add(1);
    }

    pub fn record_incorrect(&mut self) {
        self.streak_correct = 0;
        self.total_played = self.total_played.saturating_add(1);
    }

    #[must_use]
    pub fn streak_correct(&self) -> u32 {
        self.streak_correct
    }

    #[must_use]
    pub fn total_correct(&self) -> u32 {
        self.total_correct
    }

    #[must_use]
    pub fn total_played(&self) -> u32 {
        self.total_played
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}
