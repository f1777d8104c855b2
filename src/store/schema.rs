use serde::{Deserialize, Serialize};

use crate::engine::chapters::ChapterBook;
use crate::engine::stats::Stats;

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsData {
    pub schema_version: u32,
    #[serde(flatten)]
    pub stats: Stats,
}

impl Default for StatsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats: Stats::default(),
        }
    }
}

impl StatsData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChapterProgressData {
    pub schema_version: u32,
    pub chapters: ChapterBook,
}

impl Default for ChapterProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            chapters: ChapterBook::default(),
        }
    }
}

impl ChapterProgressData {
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
