use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::store::schema::{ChapterProgressData, StatsData};

const STATS_FILE: &str = "stats.json";
const CHAPTERS_FILE: &str = "chapter_progress.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ordr");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing file gives defaults silently; an unreadable or unparsable
    /// one gives defaults with a warning.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(serde_json::from_str(&content)?));
        match parsed {
            Ok(data) => data,
            Err(err) => {
                warn!(file = name, %err, "discarding unreadable store file");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_stats(&self) -> StatsData {
        let data: StatsData = self.load(STATS_FILE);
        if data.needs_reset() {
            warn!(version = data.schema_version, "stale stats schema, resetting");
            return StatsData::default();
        }
        data
    }

    pub fn save_stats(&self, data: &StatsData) -> Result<()> {
        self.save(STATS_FILE, data)
    }

    /// Chapter progress always comes back normalized: every chapter present
    /// and the first one unlocked.
    pub fn load_chapter_progress(&self) -> ChapterProgressData {
        let mut data: ChapterProgressData = self.load(CHAPTERS_FILE);
        if data.needs_reset() {
            warn!(version = data.schema_version, "stale chapter schema, resetting");
            return ChapterProgressData::default();
        }
        data.chapters.normalize();
        data
    }

    pub fn save_chapter_progress(&self, data: &ChapterProgressData) -> Result<()> {
        self.save(CHAPTERS_FILE, data)
    }
}
