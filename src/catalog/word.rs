use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

/// A single vocabulary entry. The on-disk field names follow the exported
/// chapter files (`word`, `translation`, `audio`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    #[serde(rename = "word")]
    pub text: String,
    #[serde(default)]
    pub translation: String,
    #[serde(rename = "audio", default)]
    pub audio_ref: Option<String>,
}

impl Word {
    pub fn new(text: &str, translation: &str) -> Self {
        Self {
            text: text.to_string(),
            translation: translation.to_string(),
            audio_ref: None,
        }
    }

    pub fn with_audio(mut self, audio_ref: &str) -> Self {
        self.audio_ref = Some(audio_ref.to_string());
        self
    }

    /// Clip used by the listening playlist, which always tries the
    /// conventional `audio/<word>.mp3` path when no reference was exported.
    pub fn listening_clip(&self) -> String {
        self.audio_ref
            .clone()
            .unwrap_or_else(|| format!("audio/{}.mp3", self.text))
    }
}

/// Words of one chapter grouped by difficulty tier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub easy: Vec<Word>,
    #[serde(default)]
    pub medium: Vec<Word>,
    #[serde(default)]
    pub hard: Vec<Word>,
}

impl Catalog {
    pub fn tier(&self, difficulty: Difficulty) -> &[Word] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    /// All tiers concatenated easy → medium → hard, in file order.
    pub fn flatten(&self) -> Vec<Word> {
        self.easy
            .iter()
            .chain(self.medium.iter())
            .chain(self.hard.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.easy.len() + self.medium.len() + self.hard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Minimal word set used when a chapter file cannot be loaded.
    pub fn fallback() -> Self {
        Self {
            easy: vec![Word::new("hei", "hello"), Word::new("takk", "thanks")],
            medium: vec![Word::new("velkommen", "welcome")],
            hard: vec![Word::new("Innsatsfaktorer", "input factors")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_parses_export_format() {
        let json = r#"{"word": "hei", "translation": "hello", "audio": "audio/hei.mp3"}"#;
        let word: Word = serde_json::from_str(json).unwrap();
        assert_eq!(word.text, "hei");
        assert_eq!(word.translation, "hello");
        assert_eq!(word.audio_ref.as_deref(), Some("audio/hei.mp3"));
    }

    #[test]
    fn test_word_null_audio_is_none() {
        let json = r#"{"word": "takk", "translation": "thanks", "audio": null}"#;
        let word: Word = serde_json::from_str(json).unwrap();
        assert!(word.audio_ref.is_none());
        assert_eq!(word.listening_clip(), "audio/takk.mp3");
    }

    #[test]
    fn test_flatten_keeps_tier_order() {
        let catalog = Catalog::fallback();
        let texts: Vec<String> = catalog.flatten().into_iter().map(|w| w.text).collect();
        assert_eq!(texts, vec!["hei", "takk", "velkommen", "Innsatsfaktorer"]);
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_missing_tier_defaults_to_empty() {
        let catalog: Catalog = serde_json::from_str(r#"{"easy": []}"#).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.tier(Difficulty::Hard).is_empty());
    }

    #[test]
    fn test_difficulty_keys_round_trip() {
        for &d in Difficulty::all() {
            assert_eq!(Difficulty::from_key(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_key("extreme"), None);
    }
}
