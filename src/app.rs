use std::path::PathBuf;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::audio::{AudioPlayer, discover_tracks};
use crate::catalog::{Catalog, CatalogLoader, Difficulty};
use crate::config::{Config, LANGUAGES, MAX_WORD_COUNT, MIN_WORD_COUNT};
use crate::engine::chapters::{ChapterBook, ChapterId, ChapterOutcome, ProgressUpdate};
use crate::engine::drill::{DrillEngine, DrillSettings, GameMode, SessionSummary};
use crate::engine::events::{DrillEvent, Notice};
use crate::engine::listening::{ListeningEngine, ListeningEvent};
use crate::engine::music::{BackgroundMusic, MusicCommand};
use crate::engine::stats::Stats;
use crate::store::json_store::JsonStore;
use crate::store::schema::{ChapterProgressData, StatsData};
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

pub const TOAST_MS: u64 = 2_000;
const WORD_COUNT_STEP: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Drill,
    DrillResult,
    Listening,
    Chapters,
    Settings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsField {
    GameMode,
    Difficulty,
    WordCount,
    ShowTranslation,
    Chapter,
    Theme,
    Language,
}

impl SettingsField {
    pub const ALL: [SettingsField; 7] = [
        SettingsField::GameMode,
        SettingsField::Difficulty,
        SettingsField::WordCount,
        SettingsField::ShowTranslation,
        SettingsField::Chapter,
        SettingsField::Theme,
        SettingsField::Language,
    ];

    pub fn label_key(self) -> &'static str {
        match self {
            SettingsField::GameMode => "settings.mode",
            SettingsField::Difficulty => "settings.difficulty",
            SettingsField::WordCount => "settings.word_count",
            SettingsField::ShowTranslation => "settings.show_translation",
            SettingsField::Chapter => "settings.chapter",
            SettingsField::Theme => "settings.theme",
            SettingsField::Language => "settings.language",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub notice: Notice,
    pub expires_at: u64,
}

/// Everything the result screen shows about a finished session.
#[derive(Clone, Debug)]
pub struct SessionReport {
    pub summary: SessionSummary,
    pub chapter: ChapterId,
    pub update: ProgressUpdate,
    pub outcome: ChapterOutcome,
    pub streak: u32,
    pub best_streak: u32,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub drill: DrillEngine,
    pub listening: ListeningEngine,
    pub catalog: Catalog,
    pub stats: Stats,
    pub chapters: ChapterBook,
    pub store: Option<JsonStore>,
    pub last_report: Option<SessionReport>,
    pub toast: Option<Toast>,
    pub chapter_selected: usize,
    pub settings_selected: usize,
    pub should_quit: bool,
    loader: CatalogLoader,
    audio: Box<dyn AudioPlayer>,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config, store: Option<JsonStore>, audio: Box<dyn AudioPlayer>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let menu = Menu::new(theme);
        rust_i18n::set_locale(&config.language);

        let (stats, chapters) = match &store {
            Some(s) => (s.load_stats().stats, s.load_chapter_progress().chapters),
            None => (Stats::default(), ChapterBook::default()),
        };

        let loader = CatalogLoader::new(Some(PathBuf::from(&config.catalog_dir)));
        let mut chapter = config.chapter();
        if !chapters.is_unlocked(chapter) {
            warn!(chapter = chapter.to_key(), "configured chapter is locked, using first");
            chapter = ChapterId::first();
        }
        let catalog = loader.load_or_fallback(chapter);

        let music = BackgroundMusic::new(
            discover_tracks(PathBuf::from(&config.music_dir).as_path()),
            config.normal_music_volume,
            config.ducked_music_volume,
        );
        let listening = ListeningEngine::new(chapter, music);

        let mut app = Self {
            screen: AppScreen::Menu,
            menu,
            theme,
            config,
            drill: DrillEngine::new(),
            listening,
            catalog,
            stats,
            chapters,
            store,
            last_report: None,
            toast: None,
            chapter_selected: chapter.position(),
            settings_selected: 0,
            should_quit: false,
            loader,
            audio,
            rng: SmallRng::from_entropy(),
        };
        app.config.set_chapter(chapter);
        app
    }

    /// Seeded shuffles for tests and benchmarks.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn chapter(&self) -> ChapterId {
        self.config.chapter()
    }

    fn notify(&mut self, notice: Notice, now_ms: u64) {
        debug!(?notice, "toast");
        self.toast = Some(Toast {
            notice,
            expires_at: now_ms + TOAST_MS,
        });
    }

    /// Advance both engines to `now_ms` and route audio completion back
    /// into them.
    pub fn tick(&mut self, now_ms: u64) {
        self.drill.tick(now_ms);
        self.process_drill_events(now_ms);

        if self.audio.poll_clip_finished() && self.screen == AppScreen::Listening {
            self.listening.clip_finished(now_ms);
        }
        if self.audio.poll_music_finished() {
            self.listening.music_track_finished();
        }
        self.listening.tick(now_ms);
        self.process_listening_events(now_ms);

        if self.toast.as_ref().is_some_and(|t| now_ms >= t.expires_at) {
            self.toast = None;
        }
    }

    // --- Drill ---

    pub fn drill_settings(&self) -> DrillSettings {
        DrillSettings {
            mode: self.config.game_mode,
            difficulty: self.config.difficulty,
            word_count: self.config.word_count,
            show_translation: self.config.show_translation,
            carry_cap: self.config.max_carry_over_secs,
        }
    }

    pub fn start_drill(&mut self, now_ms: u64) -> bool {
        let settings = self.drill_settings();
        match self
            .drill
            .start(settings, &self.catalog, &mut self.rng, now_ms)
        {
            Ok(()) => {
                self.last_report = None;
                self.screen = AppScreen::Drill;
                self.process_drill_events(now_ms);
                true
            }
            Err(err) => {
                warn!(%err, "cannot start drill");
                self.notify(Notice::NoWords, now_ms);
                false
            }
        }
    }

    pub fn type_char(&mut self, ch: char) {
        self.drill.type_char(ch);
    }

    pub fn backspace(&mut self) {
        self.drill.backspace();
    }

    pub fn submit(&mut self, now_ms: u64) {
        self.drill.submit_input(now_ms);
        self.process_drill_events(now_ms);
    }

    pub fn hint(&mut self, now_ms: u64) {
        self.drill.hint(now_ms);
        self.process_drill_events(now_ms);
    }

    pub fn replay_clip(&mut self, now_ms: u64) {
        self.drill.replay_clip();
        self.process_drill_events(now_ms);
    }

    pub fn quit_drill(&mut self, now_ms: u64) {
        self.drill.abandon();
        self.process_drill_events(now_ms);
        self.go_to_menu(now_ms);
    }

    fn process_drill_events(&mut self, now_ms: u64) {
        for event in self.drill.drain_events() {
            match event {
                DrillEvent::PlayClip(clip) => {
                    if let Err(err) = self.audio.play_clip(&clip) {
                        warn!(%err, clip = %clip, "clip playback failed");
                        self.notify(Notice::AudioFailed, now_ms);
                    }
                }
                DrillEvent::StopClip => self.audio.stop_clip(),
                DrillEvent::Notify(notice) => self.notify(notice, now_ms),
                DrillEvent::Ended(summary) => self.finish_session(summary),
                _ => {}
            }
        }
    }

    /// Record a finished session: streak, chapter progress, then persist.
    fn finish_session(&mut self, summary: SessionSummary) {
        let chapter = self.chapter();
        self.stats.record_session(summary.accuracy, Utc::now());
        let update = self
            .chapters
            .update_progress(chapter, summary.mode, summary.accuracy);
        let outcome = ChapterOutcome::for_session(summary.mode, summary.accuracy, &update);
        info!(
            chapter = chapter.to_key(),
            accuracy = summary.accuracy,
            streak = self.stats.streak,
            ?outcome,
            "session recorded"
        );
        self.last_report = Some(SessionReport {
            summary,
            chapter,
            update,
            outcome,
            streak: self.stats.streak,
            best_streak: self.stats.best_streak,
        });
        self.save_data();
        self.screen = AppScreen::DrillResult;
    }

    fn save_data(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let stats = StatsData {
            stats: self.stats.clone(),
            ..StatsData::default()
        };
        if let Err(err) = store.save_stats(&stats) {
            warn!(%err, "failed to save stats");
        }
        let chapters = ChapterProgressData {
            chapters: self.chapters.clone(),
            ..ChapterProgressData::default()
        };
        if let Err(err) = store.save_chapter_progress(&chapters) {
            warn!(%err, "failed to save chapter progress");
        }
    }

    // --- Navigation ---

    pub fn go_to_menu(&mut self, now_ms: u64) {
        if self.screen == AppScreen::Listening {
            self.listening.close(now_ms);
            self.process_listening_events(now_ms);
        }
        if self.drill.is_active() {
            self.drill.abandon();
            self.process_drill_events(now_ms);
        }
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_chapters(&mut self) {
        self.chapter_selected = self.chapter().position();
        self.screen = AppScreen::Chapters;
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    pub fn go_to_listening(&mut self, now_ms: u64) {
        self.listening.select_chapter(self.chapter(), now_ms);
        self.process_listening_events(now_ms);
        self.screen = AppScreen::Listening;
    }

    // --- Chapters ---

    pub fn chapters_next(&mut self) {
        self.chapter_selected = (self.chapter_selected + 1) % ChapterId::all().len();
    }

    pub fn chapters_prev(&mut self) {
        let len = ChapterId::all().len();
        self.chapter_selected = (self.chapter_selected + len - 1) % len;
    }

    /// Make the highlighted chapter current. Locked chapters are refused.
    pub fn select_chapter(&mut self, now_ms: u64) -> bool {
        let Some(&chapter) = ChapterId::all().get(self.chapter_selected) else {
            return false;
        };
        if !self.chapters.is_unlocked(chapter) {
            self.notify(Notice::ChapterLocked, now_ms);
            return false;
        }
        self.set_chapter(chapter);
        self.save_config();
        true
    }

    fn set_chapter(&mut self, chapter: ChapterId) {
        if chapter == self.chapter() && !self.catalog.is_empty() {
            return;
        }
        self.config.set_chapter(chapter);
        self.catalog = self.loader.load_or_fallback(chapter);
        info!(chapter = chapter.to_key(), words = self.catalog.len(), "chapter selected");
    }

    /// Neighbouring unlocked chapter of `from`, wrapping.
    fn cycle_unlocked_chapter(&self, from: ChapterId, forward: bool) -> ChapterId {
        let unlocked = self.chapters.unlocked_chapters();
        let current = unlocked.iter().position(|&c| c == from).unwrap_or(0);
        let len = unlocked.len().max(1);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        unlocked.get(next).copied().unwrap_or_else(ChapterId::first)
    }

    // --- Listening ---

    pub fn listening_toggle(&mut self, now_ms: u64) {
        self.listening.toggle(now_ms, &self.loader);
        self.process_listening_events(now_ms);
    }

    pub fn listening_next(&mut self, now_ms: u64) {
        self.listening.next(now_ms);
        self.process_listening_events(now_ms);
    }

    pub fn listening_previous(&mut self, now_ms: u64) {
        self.listening.previous(now_ms);
        self.process_listening_events(now_ms);
    }

    pub fn listening_stop(&mut self, now_ms: u64) {
        self.listening.stop(now_ms);
        self.process_listening_events(now_ms);
    }

    pub fn listening_toggle_music(&mut self, now_ms: u64) {
        self.listening.toggle_music();
        self.process_listening_events(now_ms);
    }

    /// Switch the listening playlist to the next unlocked chapter.
    pub fn listening_cycle_chapter(&mut self, now_ms: u64) {
        let next = self.cycle_unlocked_chapter(self.listening.chapter(), true);
        self.listening.select_chapter(next, now_ms);
        self.process_listening_events(now_ms);
    }

    /// Execute queued playback commands. Failures feed back into the
    /// engine, which may queue more, so drain until empty.
    fn process_listening_events(&mut self, now_ms: u64) {
        loop {
            let events = self.listening.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                match event {
                    ListeningEvent::PlayClip(clip) => {
                        if let Err(err) = self.audio.play_clip(&clip) {
                            warn!(%err, clip = %clip, "listening clip failed");
                            self.listening.clip_failed(now_ms);
                        }
                    }
                    ListeningEvent::StopClip => self.audio.stop_clip(),
                    ListeningEvent::Music(MusicCommand::PlayTrack(track)) => {
                        if let Err(err) = self.audio.play_music(&track) {
                            warn!(%err, track = %track, "music track failed");
                            self.listening.music_track_failed();
                        }
                    }
                    ListeningEvent::Music(MusicCommand::SetVolume(volume)) => {
                        self.audio.set_music_volume(volume);
                    }
                    ListeningEvent::Music(MusicCommand::Stop) => self.audio.stop_music(),
                    ListeningEvent::Notify(notice) => self.notify(notice, now_ms),
                }
            }
        }
    }

    // --- Settings ---

    pub fn settings_next(&mut self) {
        self.settings_selected = (self.settings_selected + 1).min(SettingsField::ALL.len() - 1);
    }

    pub fn settings_prev(&mut self) {
        self.settings_selected = self.settings_selected.saturating_sub(1);
    }

    pub fn settings_field(&self) -> SettingsField {
        SettingsField::ALL[self.settings_selected.min(SettingsField::ALL.len() - 1)]
    }

    pub fn settings_cycle_forward(&mut self) {
        self.settings_cycle(true);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.settings_cycle(false);
    }

    fn settings_cycle(&mut self, forward: bool) {
        match self.settings_field() {
            SettingsField::GameMode => {
                self.config.game_mode = match self.config.game_mode {
                    GameMode::Practice => GameMode::Action,
                    GameMode::Action => GameMode::Practice,
                };
            }
            SettingsField::Difficulty => {
                let all = Difficulty::all();
                let idx = all
                    .iter()
                    .position(|&d| d == self.config.difficulty)
                    .unwrap_or(0);
                self.config.difficulty = all[cycle_index(idx, all.len(), forward)];
            }
            SettingsField::WordCount => {
                self.config.word_count = step_word_count(self.config.word_count, forward);
            }
            SettingsField::ShowTranslation => {
                self.config.show_translation = !self.config.show_translation;
            }
            SettingsField::Chapter => {
                let next = self.cycle_unlocked_chapter(self.chapter(), forward);
                self.set_chapter(next);
            }
            SettingsField::Theme => {
                let themes = Theme::available_themes();
                if themes.is_empty() {
                    return;
                }
                let idx = themes
                    .iter()
                    .position(|t| *t == self.config.theme)
                    .unwrap_or(0);
                self.config.theme = themes[cycle_index(idx, themes.len(), forward)].clone();
                if let Some(new_theme) = Theme::load(&self.config.theme) {
                    let theme: &'static Theme = Box::leak(Box::new(new_theme));
                    self.theme = theme;
                    self.menu.theme = theme;
                }
            }
            SettingsField::Language => {
                let idx = LANGUAGES
                    .iter()
                    .position(|&l| l == self.config.language)
                    .unwrap_or(0);
                self.config.language = LANGUAGES[cycle_index(idx, LANGUAGES.len(), forward)].to_string();
                rust_i18n::set_locale(&self.config.language);
            }
        }
    }

    pub fn save_config(&self) {
        if let Err(err) = self.config.save() {
            warn!(%err, "failed to save config");
        }
    }
}

/// Steps of one up to five words, then steps of five.
fn step_word_count(count: usize, forward: bool) -> usize {
    let next = if forward {
        count + if count < WORD_COUNT_STEP { 1 } else { WORD_COUNT_STEP }
    } else {
        count.saturating_sub(if count <= WORD_COUNT_STEP { 1 } else { WORD_COUNT_STEP })
    };
    next.clamp(MIN_WORD_COUNT, MAX_WORD_COUNT)
}

fn cycle_index(idx: usize, len: usize, forward: bool) -> usize {
    if forward {
        (idx + 1) % len
    } else if idx == 0 {
        len - 1
    } else {
        idx - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentPlayer;
    use crate::engine::drill::Phase;
    use tempfile::TempDir;

    fn make_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.catalog_dir = dir.path().join("chapters").to_string_lossy().to_string();
        config.music_dir = dir.path().join("music").to_string_lossy().to_string();
        let store = JsonStore::with_base_dir(dir.path().join("data")).unwrap();
        let app = App::new(config, Some(store), Box::new(SilentPlayer::new())).with_seed(42);
        (dir, app)
    }

    #[test]
    fn test_new_app_starts_on_menu_with_bundled_catalog() {
        let (_dir, app) = make_app();
        assert_eq!(app.screen, AppScreen::Menu);
        assert_eq!(app.chapter(), ChapterId::CapitalOne);
        assert!(app.catalog.len() > Catalog::fallback().len());
    }

    #[test]
    fn test_empty_submit_shows_warning_toast() {
        let (_dir, mut app) = make_app();
        assert!(app.start_drill(0));
        app.submit(100);
        assert_eq!(
            app.toast.as_ref().map(|t| t.notice.clone()),
            Some(Notice::EmptyAnswer)
        );
        app.tick(100 + TOAST_MS);
        assert!(app.toast.is_none());
    }

    #[test]
    fn test_finished_session_is_recorded_and_saved() {
        let (dir, mut app) = make_app();
        app.config.game_mode = GameMode::Action;
        assert!(app.start_drill(0));
        let mut now = 0;
        while app.screen == AppScreen::Drill {
            let word = app
                .drill
                .session()
                .and_then(|s| s.current_word())
                .map(|w| w.text.clone());
            if let Some(word) = word {
                if app.drill.phase() == Phase::Answering {
                    for ch in word.chars() {
                        app.type_char(ch);
                    }
                    app.submit(now);
                }
            }
            now += 2_000;
            app.tick(now);
        }
        assert_eq!(app.screen, AppScreen::DrillResult);
        let report = app.last_report.as_ref().unwrap();
        assert_eq!(report.summary.accuracy, 100);
        assert_eq!(report.outcome, ChapterOutcome::NextUnlocked(ChapterId::CapitalTwo));
        assert_eq!(app.stats.streak, 1);

        let store = JsonStore::with_base_dir(dir.path().join("data")).unwrap();
        assert!(store.load_chapter_progress().chapters.is_unlocked(ChapterId::CapitalTwo));
        assert_eq!(store.load_stats().stats.total_sessions, 1);
    }

    #[test]
    fn test_locked_chapter_cannot_be_selected() {
        let (_dir, mut app) = make_app();
        app.go_to_chapters();
        app.chapters_next();
        assert!(!app.select_chapter(0));
        assert_eq!(app.chapter(), ChapterId::CapitalOne);
        assert_eq!(
            app.toast.as_ref().map(|t| t.notice.clone()),
            Some(Notice::ChapterLocked)
        );
    }

    #[test]
    fn test_settings_chapter_only_cycles_unlocked() {
        let (_dir, mut app) = make_app();
        app.settings_selected = 4;
        assert_eq!(app.settings_field(), SettingsField::Chapter);
        app.settings_cycle_forward();
        assert_eq!(app.chapter(), ChapterId::CapitalOne);

        app.chapters.unlock(ChapterId::CapitalTwo);
        app.settings_cycle_forward();
        assert_eq!(app.chapter(), ChapterId::CapitalTwo);
    }

    #[test]
    fn test_word_count_stays_in_range() {
        let (_dir, mut app) = make_app();
        app.settings_selected = 2;
        for _ in 0..50 {
            app.settings_cycle_forward();
        }
        assert_eq!(app.config.word_count, MAX_WORD_COUNT);
        for _ in 0..50 {
            app.settings_cycle_backward();
        }
        assert_eq!(app.config.word_count, MIN_WORD_COUNT);
    }

    #[test]
    fn test_word_count_steps_reach_every_small_value() {
        assert_eq!(step_word_count(10, false), 5);
        assert_eq!(step_word_count(5, false), 4);
        assert_eq!(step_word_count(2, false), 1);
        assert_eq!(step_word_count(1, false), 1);
        assert_eq!(step_word_count(1, true), 2);
        assert_eq!(step_word_count(4, true), 5);
        assert_eq!(step_word_count(5, true), 10);
        assert_eq!(step_word_count(98, true), MAX_WORD_COUNT);
    }

    #[test]
    fn test_listening_plays_through_silent_player() {
        let (_dir, mut app) = make_app();
        app.go_to_listening(0);
        app.listening_toggle(0);
        assert_eq!(app.listening.index(), 0);
        // Silent clips end on the next poll, then the 10 s pause runs
        app.tick(50);
        app.tick(10_050);
        assert_eq!(app.listening.index(), 1);

        app.go_to_menu(11_000);
        assert_eq!(app.screen, AppScreen::Menu);
        assert_eq!(
            app.listening.state(),
            crate::engine::listening::ListeningState::Stopped
        );
    }

    #[test]
    fn test_quit_drill_discards_session() {
        let (_dir, mut app) = make_app();
        app.start_drill(0);
        app.quit_drill(500);
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.drill.session().is_none());
        assert_eq!(app.stats.total_sessions, 0);
    }
}
