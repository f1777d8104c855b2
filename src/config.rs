use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::catalog::Difficulty;
use crate::engine::chapters::ChapterId;
use crate::engine::drill::GameMode;
use crate::engine::music::{DEFAULT_DUCKED_VOLUME, DEFAULT_NORMAL_VOLUME};

pub const LANGUAGES: &[&str] = &["en", "nb"];
pub const MIN_WORD_COUNT: usize = 1;
pub const MAX_WORD_COUNT: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_game_mode")]
    pub game_mode: GameMode,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    #[serde(default = "default_word_count")]
    pub word_count: usize,
    #[serde(default = "default_show_translation")]
    pub show_translation: bool,
    #[serde(default = "default_current_chapter")]
    pub current_chapter: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: String,
    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,
    #[serde(default = "default_music_dir")]
    pub music_dir: String,
    #[serde(default = "default_normal_music_volume")]
    pub normal_music_volume: f32,
    #[serde(default = "default_ducked_music_volume")]
    pub ducked_music_volume: f32,
    #[serde(default)]
    pub max_carry_over_secs: Option<u32>,
}

fn default_game_mode() -> GameMode {
    GameMode::Practice
}
fn default_difficulty() -> Difficulty {
    Difficulty::Easy
}
fn default_word_count() -> usize {
    10
}
fn default_show_translation() -> bool {
    true
}
fn default_current_chapter() -> String {
    ChapterId::first().to_key().to_string()
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn data_subdir(name: &str) -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ordr")
        .join(name)
        .to_string_lossy()
        .to_string()
}
fn default_catalog_dir() -> String {
    data_subdir("chapters")
}
fn default_audio_dir() -> String {
    data_subdir("audio")
}
fn default_music_dir() -> String {
    data_subdir("music")
}
fn default_normal_music_volume() -> f32 {
    DEFAULT_NORMAL_VOLUME
}
fn default_ducked_music_volume() -> f32 {
    DEFAULT_DUCKED_VOLUME
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game_mode: default_game_mode(),
            difficulty: default_difficulty(),
            word_count: default_word_count(),
            show_translation: default_show_translation(),
            current_chapter: default_current_chapter(),
            theme: default_theme(),
            language: default_language(),
            catalog_dir: default_catalog_dir(),
            audio_dir: default_audio_dir(),
            music_dir: default_music_dir(),
            normal_music_volume: default_normal_music_volume(),
            ducked_music_volume: default_ducked_music_volume(),
            max_carry_over_secs: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ordr")
            .join("config.toml")
    }

    /// Clamp numeric fields into range and reset unknown chapter, theme or
    /// language keys. Call after loading and after CLI overrides.
    pub fn validate(&mut self, valid_themes: &[&str]) {
        self.word_count = self.word_count.clamp(MIN_WORD_COUNT, MAX_WORD_COUNT);
        self.normal_music_volume = self.normal_music_volume.clamp(0.0, 1.0);
        self.ducked_music_volume = self.ducked_music_volume.clamp(0.0, 1.0);
        if ChapterId::from_key(&self.current_chapter).is_none() {
            self.current_chapter = default_current_chapter();
        }
        if !valid_themes.contains(&self.theme.as_str()) {
            self.theme = default_theme();
        }
        if !LANGUAGES.contains(&self.language.as_str()) {
            self.language = default_language();
        }
    }

    pub fn chapter(&self) -> ChapterId {
        ChapterId::from_key(&self.current_chapter).unwrap_or_else(ChapterId::first)
    }

    pub fn set_chapter(&mut self, chapter: ChapterId) {
        self.current_chapter = chapter.to_key().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.game_mode, GameMode::Practice);
        assert_eq!(config.difficulty, Difficulty::Easy);
        assert_eq!(config.word_count, 10);
        assert!(config.show_translation);
        assert_eq!(config.chapter(), ChapterId::CapitalOne);
        assert_eq!(config.max_carry_over_secs, None);
        assert!(config.music_dir.contains("music"));
    }

    #[test]
    fn test_config_serde_partial_file() {
        let toml_str = r#"
game_mode = "action"
difficulty = "hard"
current_chapter = "capital_two"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.game_mode, GameMode::Action);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.chapter(), ChapterId::CapitalTwo);
        assert_eq!(config.word_count, 10);
    }

    #[test]
    fn test_config_validate_clamps_values() {
        let mut config = Config::default();
        config.word_count = 999;
        config.normal_music_volume = 3.0;
        config.ducked_music_volume = -1.0;
        config.current_chapter = "capital_nine".to_string();
        config.theme = "nonexistent".to_string();
        config.language = "de".to_string();

        config.validate(&["terminal-default", "catppuccin-mocha"]);

        assert_eq!(config.word_count, 100);
        assert_eq!(config.normal_music_volume, 1.0);
        assert_eq!(config.ducked_music_volume, 0.0);
        assert_eq!(config.current_chapter, "capital_one");
        assert_eq!(config.theme, "terminal-default");
        assert_eq!(config.language, "en");

        config.word_count = 0;
        config.validate(&["terminal-default"]);
        assert_eq!(config.word_count, 1);
    }

    #[test]
    fn test_config_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.game_mode = GameMode::Action;
        config.max_carry_over_secs = Some(30);
        config.set_chapter(ChapterId::CapitalThree);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }
}
