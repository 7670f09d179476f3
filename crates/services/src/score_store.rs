use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use quiz_core::model::SessionScore;
use storage::repository::{KeyValueStore, StorageError};

/// Key under which the score record lives.
pub const PLAY_STATE_KEY: &str = "playState";

/// Persisted shape: `{"sc": streak, "tc": total correct, "tp": total played}`.
#[derive(Debug, Serialize, Deserialize)]
struct PlayStateRecord {
    sc: u32,
    tc: u32,
    tp: u32,
}

impl From<SessionScore> for PlayStateRecord {
    fn from(score: SessionScore) -> Self {
        Self {
            sc: score.streak_correct(),
            tc: score.total_correct(),
            tp: score.total_played(),
        }
    }
}

/// Reads and writes the score record in a key-value store.
#[derive(Clone)]
pub struct ScoreStore {
    store: Arc<dyn KeyValueStore>,
}

impl ScoreStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the saved score, or zero if nothing usable is stored.
    ///
    /// A record that does not parse, has the wrong shape, or breaks the
    /// counter invariants is logged and the whole store is cleared.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the store itself fails.
    pub async fn restore(&self) -> Result<SessionScore, StorageError> {
        let Some(raw) = self.store.get(PLAY_STATE_KEY).await? else {
            debug!("no saved score");
            return Ok(SessionScore::zero());
        };

        match decode(&raw) {
            Ok(score) => {
                debug!(
                    streak = score.streak_correct(),
                    correct = score.total_correct(),
                    played = score.total_played(),
                    "restored saved score"
                );
                Ok(score)
            }
            Err(reason) => {
                warn!(%reason, "discarding malformed saved score");
                self.store.clear().await?;
                Ok(SessionScore::zero())
            }
        }
    }

    /// Overwrite the saved score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub async fn save(&self, score: SessionScore) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&PlayStateRecord::from(score))
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.store.set(PLAY_STATE_KEY, &raw).await
    }

    /// Wipe the whole store, not just the score key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.clear().await
    }
}

fn decode(raw: &str) -> Result<SessionScore, String> {
    let record: PlayStateRecord = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    SessionScore::from_persisted(record.sc, record.tc, record.tp).map_err(|err| err.to_string())
}
