use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::drill::GameMode;

/// Minimum action-mode accuracy that completes a chapter.
pub const UNLOCK_THRESHOLD: u32 = 70;

// --- Chapter ID ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChapterId {
    CapitalOne,
    CapitalTwo,
    CapitalThree,
}

impl ChapterId {
    pub fn to_key(self) -> &'static str {
        match self {
            ChapterId::CapitalOne => "capital_one",
            ChapterId::CapitalTwo => "capital_two",
            ChapterId::CapitalThree => "capital_three",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "capital_one" => Some(ChapterId::CapitalOne),
            "capital_two" => Some(ChapterId::CapitalTwo),
            "capital_three" => Some(ChapterId::CapitalThree),
            _ => None,
        }
    }

    /// Fixed play order.
    pub fn all() -> &'static [ChapterId] {
        &[
            ChapterId::CapitalOne,
            ChapterId::CapitalTwo,
            ChapterId::CapitalThree,
        ]
    }

    pub fn position(self) -> usize {
        Self::all().iter().position(|&c| c == self).unwrap_or(0)
    }

    pub fn next(self) -> Option<Self> {
        Self::all().get(self.position() + 1).copied()
    }

    pub fn first() -> Self {
        ChapterId::CapitalOne
    }

    pub fn definition(self) -> &'static ChapterDefinition {
        &ALL_CHAPTERS[self.position()]
    }
}

// --- Static Definitions ---

pub struct ChapterDefinition {
    pub id: ChapterId,
    pub number: u32,
    pub name: &'static str,
}

pub const ALL_CHAPTERS: &[ChapterDefinition] = &[
    ChapterDefinition {
        id: ChapterId::CapitalOne,
        number: 1,
        name: "Grunnleggende",
    },
    ChapterDefinition {
        id: ChapterId::CapitalTwo,
        number: 2,
        name: "Middels",
    },
    ChapterDefinition {
        id: ChapterId::CapitalThree,
        number: 3,
        name: "Avansert",
    },
];

// --- Persisted Progress ---

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterProgress {
    pub unlocked: bool,
    pub completed: bool,
    #[serde(alias = "bestScore")]
    pub best_score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChapterStatus {
    Locked,
    Available,
    Completed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub new_best: bool,
    pub completed: bool,
    pub unlocked: Option<ChapterId>,
    pub all_complete: bool,
}

/// What the result screen says about chapter progress after a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChapterOutcome {
    KeepPracticing,
    NextUnlocked(ChapterId),
    AllComplete,
    SwitchToAction,
}

impl ChapterOutcome {
    pub fn for_session(mode: GameMode, accuracy: u32, update: &ProgressUpdate) -> Self {
        if accuracy < UNLOCK_THRESHOLD {
            return ChapterOutcome::KeepPracticing;
        }
        match (mode, update.unlocked) {
            (GameMode::Practice, _) => ChapterOutcome::SwitchToAction,
            (GameMode::Action, Some(next)) => ChapterOutcome::NextUnlocked(next),
            (GameMode::Action, None) if update.all_complete => ChapterOutcome::AllComplete,
            (GameMode::Action, None) => ChapterOutcome::KeepPracticing,
        }
    }

    pub fn is_pass(self) -> bool {
        matches!(
            self,
            ChapterOutcome::NextUnlocked(_) | ChapterOutcome::AllComplete
        )
    }
}

/// Unlock/completion state for every chapter, keyed by chapter key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterBook {
    entries: BTreeMap<String, ChapterProgress>,
}

impl Default for ChapterBook {
    fn default() -> Self {
        let mut book = Self {
            entries: BTreeMap::new(),
        };
        book.normalize();
        book
    }
}

impl ChapterBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure every known chapter has an entry, the first chapter is
    /// unlocked, and best scores sit in 0..=100. Unknown keys from older
    /// files are dropped.
    pub fn normalize(&mut self) {
        self.entries
            .retain(|key, _| ChapterId::from_key(key).is_some());
        for &id in ChapterId::all() {
            let entry = self.entries.entry(id.to_key().to_string()).or_default();
            entry.best_score = entry.best_score.min(100);
        }
        if let Some(first) = self.entries.get_mut(ChapterId::first().to_key()) {
            first.unlocked = true;
        }
    }

    pub fn progress(&self, id: ChapterId) -> ChapterProgress {
        self.entries.get(id.to_key()).cloned().unwrap_or_default()
    }

    pub fn is_unlocked(&self, id: ChapterId) -> bool {
        id == ChapterId::first() || self.progress(id).unlocked
    }

    pub fn status(&self, id: ChapterId) -> ChapterStatus {
        let p = self.progress(id);
        if p.completed {
            ChapterStatus::Completed
        } else if self.is_unlocked(id) {
            ChapterStatus::Available
        } else {
            ChapterStatus::Locked
        }
    }

    pub fn unlocked_chapters(&self) -> Vec<ChapterId> {
        ChapterId::all()
            .iter()
            .copied()
            .filter(|&id| self.is_unlocked(id))
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        ChapterId::all()
            .iter()
            .filter(|&&id| self.progress(id).completed)
            .count()
    }

    /// Pre-seed a chapter as unlocked without completing its predecessor.
    pub fn unlock(&mut self, id: ChapterId) {
        self.entries
            .entry(id.to_key().to_string())
            .or_default()
            .unlocked = true;
    }

    /// Record a finished session. Best score always tracks the maximum;
    /// completion and unlocking the next chapter need an action-mode run at
    /// or above the threshold.
    pub fn update_progress(
        &mut self,
        id: ChapterId,
        mode: GameMode,
        accuracy: u32,
    ) -> ProgressUpdate {
        let accuracy = accuracy.min(100);
        let mut update = ProgressUpdate::default();

        let entry = self.entries.entry(id.to_key().to_string()).or_default();
        if accuracy > entry.best_score {
            entry.best_score = accuracy;
            update.new_best = true;
        }

        if mode == GameMode::Action && accuracy >= UNLOCK_THRESHOLD {
            entry.completed = true;
            update.completed = true;
            match id.next() {
                Some(next) => {
                    self.unlock(next);
                    update.unlocked = Some(next);
                    info!(chapter = id.to_key(), next = next.to_key(), "chapter completed");
                }
                None => {
                    update.all_complete = true;
                    info!(chapter = id.to_key(), "final chapter completed");
                }
            }
        }

        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seeds_first_chapter_only() {
        let book = ChapterBook::new();
        assert_eq!(book.status(ChapterId::CapitalOne), ChapterStatus::Available);
        assert_eq!(book.status(ChapterId::CapitalTwo), ChapterStatus::Locked);
        assert_eq!(book.status(ChapterId::CapitalThree), ChapterStatus::Locked);
        assert_eq!(book.unlocked_chapters(), vec![ChapterId::CapitalOne]);
    }

    #[test]
    fn test_action_pass_completes_and_unlocks_next() {
        let mut book = ChapterBook::new();
        let update = book.update_progress(ChapterId::CapitalOne, GameMode::Action, 70);
        assert!(update.completed);
        assert_eq!(update.unlocked, Some(ChapterId::CapitalTwo));
        assert_eq!(book.status(ChapterId::CapitalOne), ChapterStatus::Completed);
        assert!(book.is_unlocked(ChapterId::CapitalTwo));
        assert!(!book.is_unlocked(ChapterId::CapitalThree));
    }

    #[test]
    fn test_practice_never_unlocks() {
        let mut book = ChapterBook::new();
        let update = book.update_progress(ChapterId::CapitalOne, GameMode::Practice, 100);
        assert!(!update.completed);
        assert_eq!(update.unlocked, None);
        assert_eq!(book.progress(ChapterId::CapitalOne).best_score, 100);
        assert!(!book.is_unlocked(ChapterId::CapitalTwo));
    }

    #[test]
    fn test_action_below_threshold_only_updates_best() {
        let mut book = ChapterBook::new();
        let update = book.update_progress(ChapterId::CapitalOne, GameMode::Action, 69);
        assert!(update.new_best);
        assert!(!update.completed);
        assert!(!book.is_unlocked(ChapterId::CapitalTwo));
    }

    #[test]
    fn test_best_score_never_decreases() {
        let mut book = ChapterBook::new();
        book.update_progress(ChapterId::CapitalOne, GameMode::Practice, 80);
        let update = book.update_progress(ChapterId::CapitalOne, GameMode::Action, 40);
        assert!(!update.new_best);
        assert_eq!(book.progress(ChapterId::CapitalOne).best_score, 80);
    }

    #[test]
    fn test_last_chapter_reports_all_complete() {
        let mut book = ChapterBook::new();
        book.unlock(ChapterId::CapitalThree);
        let update = book.update_progress(ChapterId::CapitalThree, GameMode::Action, 90);
        assert!(update.completed);
        assert!(update.all_complete);
        assert_eq!(update.unlocked, None);
    }

    #[test]
    fn test_normalize_repairs_loaded_map() {
        let json = r#"{
            "capital_one": {"unlocked": false, "completed": false, "bestScore": 250},
            "capital_nine": {"unlocked": true, "completed": true, "best_score": 10}
        }"#;
        let mut book: ChapterBook = serde_json::from_str(json).unwrap();
        book.normalize();
        assert!(book.is_unlocked(ChapterId::CapitalOne));
        assert_eq!(book.progress(ChapterId::CapitalOne).best_score, 100);
        assert_eq!(book.progress(ChapterId::CapitalThree), ChapterProgress::default());
        let round_trip = serde_json::to_string(&book).unwrap();
        assert!(!round_trip.contains("capital_nine"));
    }

    #[test]
    fn test_outcome_messages() {
        let mut book = ChapterBook::new();
        let update = book.update_progress(ChapterId::CapitalOne, GameMode::Action, 75);
        assert_eq!(
            ChapterOutcome::for_session(GameMode::Action, 75, &update),
            ChapterOutcome::NextUnlocked(ChapterId::CapitalTwo)
        );

        let update = book.update_progress(ChapterId::CapitalOne, GameMode::Practice, 95);
        assert_eq!(
            ChapterOutcome::for_session(GameMode::Practice, 95, &update),
            ChapterOutcome::SwitchToAction
        );

        let update = book.update_progress(ChapterId::CapitalOne, GameMode::Action, 40);
        assert_eq!(
            ChapterOutcome::for_session(GameMode::Action, 40, &update),
            ChapterOutcome::KeepPracticing
        );

        book.unlock(ChapterId::CapitalThree);
        let update = book.update_progress(ChapterId::CapitalThree, GameMode::Action, 100);
        let outcome = ChapterOutcome::for_session(GameMode::Action, 100, &update);
        assert_eq!(outcome, ChapterOutcome::AllComplete);
        assert!(outcome.is_pass());
    }

    #[test]
    fn test_below_threshold_keeps_practicing_in_either_mode() {
        let mut book = ChapterBook::new();
        book.update_progress(ChapterId::CapitalOne, GameMode::Action, 90);
        assert!(book.is_unlocked(ChapterId::CapitalTwo));

        // An earlier unlock does not turn a weak run into a pass.
        let update = book.update_progress(ChapterId::CapitalOne, GameMode::Action, 50);
        assert_eq!(
            ChapterOutcome::for_session(GameMode::Action, 50, &update),
            ChapterOutcome::KeepPracticing
        );
        let update = book.update_progress(ChapterId::CapitalOne, GameMode::Practice, 50);
        assert_eq!(
            ChapterOutcome::for_session(GameMode::Practice, 50, &update),
            ChapterOutcome::KeepPracticing
        );
    }

    #[test]
    fn test_chapter_order() {
        assert_eq!(ChapterId::CapitalOne.next(), Some(ChapterId::CapitalTwo));
        assert_eq!(ChapterId::CapitalThree.next(), None);
        assert_eq!(ChapterId::CapitalTwo.definition().number, 2);
    }
}
