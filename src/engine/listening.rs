//! Hands-free listening playlist: plays every word of a chapter in order,
//! pausing between words, with optional background music ducked under
//! each clip.

use tracing::{debug, info, warn};

use crate::catalog::{CatalogSource, Word};
use crate::engine::chapters::ChapterId;
use crate::engine::events::Notice;
use crate::engine::music::{BackgroundMusic, MusicCommand};
use crate::engine::scheduler::{Scheduler, TaskHandle};

pub const AUTO_ADVANCE_MS: u64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListeningState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListeningStatus {
    Idle,
    Playing(String),
    Waiting,
    Paused,
    Finished,
    PlaybackFailed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListeningEvent {
    PlayClip(String),
    StopClip,
    Music(MusicCommand),
    Notify(Notice),
}

/// What the listening panel shows. `position` is 1-based; 0 with an empty
/// list.
#[derive(Clone, Debug, PartialEq)]
pub struct ListeningDisplay<'a> {
    pub position: usize,
    pub total: usize,
    pub word: Option<&'a Word>,
    pub progress: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListeningTask {
    AutoAdvance,
    FadeStep,
}

#[derive(Debug)]
pub struct ListeningEngine {
    chapter: ChapterId,
    words: Vec<Word>,
    index: usize,
    state: ListeningState,
    status: ListeningStatus,
    clip_playing: bool,
    advance: Option<TaskHandle>,
    scheduler: Scheduler<ListeningTask>,
    music: BackgroundMusic,
    events: Vec<ListeningEvent>,
}

impl ListeningEngine {
    pub fn new(chapter: ChapterId, music: BackgroundMusic) -> Self {
        Self {
            chapter,
            words: Vec::new(),
            index: 0,
            state: ListeningState::Stopped,
            status: ListeningStatus::Idle,
            clip_playing: false,
            advance: None,
            scheduler: Scheduler::new(),
            music,
            events: Vec::new(),
        }
    }

    pub fn chapter(&self) -> ChapterId {
        self.chapter
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    pub fn status(&self) -> &ListeningStatus {
        &self.status
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn music(&self) -> &BackgroundMusic {
        &self.music
    }

    pub fn auto_advance_pending(&self) -> bool {
        self.advance.is_some()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    pub fn display(&self) -> ListeningDisplay<'_> {
        let total = self.words.len();
        if total == 0 {
            return ListeningDisplay {
                position: 0,
                total: 0,
                word: None,
                progress: 0.0,
            };
        }
        let position = self.index + 1;
        ListeningDisplay {
            position,
            total,
            word: self.words.get(self.index),
            progress: position as f64 / total as f64,
        }
    }

    pub fn drain_events(&mut self) -> Vec<ListeningEvent> {
        std::mem::take(&mut self.events)
    }

    /// Switch chapters. Playback stops and the new list loads lazily on the
    /// next `play`.
    pub fn select_chapter(&mut self, chapter: ChapterId, now_ms: u64) {
        if chapter == self.chapter && !self.words.is_empty() {
            return;
        }
        self.stop(now_ms);
        self.chapter = chapter;
        self.words.clear();
        debug!(chapter = chapter.to_key(), "listening chapter selected");
    }

    /// Play from the current index, loading the chapter's words first if
    /// needed. Returns false when there is nothing to play.
    pub fn play(&mut self, now_ms: u64, source: &dyn CatalogSource) -> bool {
        if self.state == ListeningState::Playing {
            return true;
        }
        if self.words.is_empty() {
            self.words = match source.load(self.chapter) {
                Ok(catalog) => catalog.flatten(),
                Err(err) => {
                    warn!(chapter = self.chapter.to_key(), %err, "listening words unavailable");
                    Vec::new()
                }
            };
            self.index = 0;
            if self.words.is_empty() {
                self.events.push(ListeningEvent::Notify(Notice::NoListeningWords));
                return false;
            }
            info!(chapter = self.chapter.to_key(), words = self.words.len(), "listening list loaded");
        }
        self.state = ListeningState::Playing;
        self.play_current(now_ms);
        true
    }

    pub fn toggle(&mut self, now_ms: u64, source: &dyn CatalogSource) {
        if self.state == ListeningState::Playing {
            self.pause(now_ms);
        } else {
            self.play(now_ms, source);
        }
    }

    pub fn pause(&mut self, now_ms: u64) {
        if self.state != ListeningState::Playing {
            return;
        }
        self.state = ListeningState::Paused;
        self.interrupt(now_ms);
        self.status = ListeningStatus::Paused;
    }

    /// Stop playback and rewind to the first word.
    pub fn stop(&mut self, now_ms: u64) {
        self.interrupt(now_ms);
        self.state = ListeningState::Stopped;
        self.index = 0;
        self.status = ListeningStatus::Idle;
    }

    /// Leave listening mode: playback and music both end.
    pub fn close(&mut self, now_ms: u64) {
        self.stop(now_ms);
        self.music.disable(&mut self.scheduler);
        self.pull_music();
    }

    pub fn next(&mut self, now_ms: u64) {
        if self.words.is_empty() {
            return;
        }
        self.interrupt(now_ms);
        if self.index + 1 < self.words.len() {
            self.index += 1;
            if self.state == ListeningState::Playing {
                self.play_current(now_ms);
            }
        } else {
            info!(chapter = self.chapter.to_key(), "listening list finished");
            self.stop(now_ms);
            self.status = ListeningStatus::Finished;
        }
    }

    pub fn previous(&mut self, now_ms: u64) {
        if self.words.is_empty() {
            return;
        }
        self.interrupt(now_ms);
        self.index = if self.index == 0 {
            self.words.len() - 1
        } else {
            self.index - 1
        };
        if self.state == ListeningState::Playing {
            self.play_current(now_ms);
        }
    }

    /// The current clip played to the end: bring the music back up and
    /// wait before moving on.
    pub fn clip_finished(&mut self, now_ms: u64) {
        if !self.clip_playing {
            return;
        }
        self.clip_playing = false;
        if self.state != ListeningState::Playing {
            return;
        }
        self.restore_music(now_ms);
        self.status = ListeningStatus::Waiting;
        self.schedule_advance(now_ms);
    }

    /// The clip could not start. Music comes back up and the playlist still
    /// moves on after the usual pause.
    pub fn clip_failed(&mut self, now_ms: u64) {
        if !self.clip_playing {
            return;
        }
        self.clip_playing = false;
        self.restore_music(now_ms);
        self.events.push(ListeningEvent::Notify(Notice::AudioFailed));
        if let Some(word) = self.words.get(self.index) {
            self.status = ListeningStatus::PlaybackFailed(word.text.clone());
        }
        if self.state == ListeningState::Playing {
            self.schedule_advance(now_ms);
        }
    }

    pub fn toggle_music(&mut self) -> bool {
        if !self.music.is_enabled() && !self.music.has_tracks() {
            self.events.push(ListeningEvent::Notify(Notice::MusicUnavailable));
            return false;
        }
        let enabled = self.music.toggle(&mut self.scheduler);
        self.pull_music();
        enabled
    }

    pub fn music_track_finished(&mut self) {
        self.music.track_finished();
        self.pull_music();
    }

    pub fn music_track_failed(&mut self) {
        if !self.music.track_failed(&mut self.scheduler) {
            self.events.push(ListeningEvent::Notify(Notice::MusicUnavailable));
        }
        self.pull_music();
    }

    pub fn tick(&mut self, now_ms: u64) {
        while let Some((due, task)) = self.scheduler.pop_due(now_ms) {
            match task {
                ListeningTask::AutoAdvance => {
                    self.advance = None;
                    self.next(due);
                }
                ListeningTask::FadeStep => {
                    self.music
                        .on_fade_step(&mut self.scheduler, due, ListeningTask::FadeStep);
                    self.pull_music();
                }
            }
        }
    }

    fn play_current(&mut self, now_ms: u64) {
        let Some(word) = self.words.get(self.index) else {
            return;
        };
        let clip = word.listening_clip();
        let text = word.text.clone();

        if self.clip_playing {
            self.events.push(ListeningEvent::StopClip);
        }
        self.music
            .duck(&mut self.scheduler, now_ms, ListeningTask::FadeStep);
        self.pull_music();

        debug!(word = %text, index = self.index, "listening clip");
        self.events.push(ListeningEvent::PlayClip(clip));
        self.clip_playing = true;
        self.status = ListeningStatus::Playing(text);
    }

    /// Cancel the pending advance and silence the current clip.
    fn interrupt(&mut self, now_ms: u64) {
        if let Some(handle) = self.advance.take() {
            self.scheduler.cancel(handle);
        }
        if self.clip_playing {
            self.clip_playing = false;
            self.events.push(ListeningEvent::StopClip);
            self.restore_music(now_ms);
        }
    }

    fn schedule_advance(&mut self, now_ms: u64) {
        if let Some(handle) = self.advance.take() {
            self.scheduler.cancel(handle);
        }
        self.advance = Some(
            self.scheduler
                .schedule(now_ms + AUTO_ADVANCE_MS, ListeningTask::AutoAdvance),
        );
    }

    fn restore_music(&mut self, now_ms: u64) {
        self.music
            .restore(&mut self.scheduler, now_ms, ListeningTask::FadeStep);
        self.pull_music();
    }

    fn pull_music(&mut self) {
        self.events
            .extend(self.music.drain_commands().into_iter().map(ListeningEvent::Music));
    }
}
