use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::chapters::UNLOCK_THRESHOLD;

/// Running player statistics, updated once per finished session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default, alias = "lastPlayed")]
    pub last_played: Option<DateTime<Utc>>,
}

impl Stats {
    /// Passing sessions (same threshold as chapter completion, in any mode)
    /// extend the streak; anything else resets it.
    pub fn record_session(&mut self, accuracy: u32, played_at: DateTime<Utc>) {
        if accuracy >= UNLOCK_THRESHOLD {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        self.best_streak = self.best_streak.max(self.streak);
        self.total_sessions += 1;
        self.last_played = Some(played_at);
    }
}
