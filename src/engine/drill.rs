//! Drill session state machine.
//!
//! `Idle → Answering → Reviewing → Answering | Ended`. Only `Answering` and
//! `Reviewing` can have work in the scheduler; every transition that
//! replaces pending work cancels it first. The engine never sleeps: the
//! caller feeds it a millisecond clock through [`DrillEngine::tick`] and
//! drains the resulting [`DrillEvent`]s.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{Catalog, Difficulty, Word};
use crate::engine::events::{AnswerResult, DrillEvent, Instruction, Notice};
use crate::engine::matching;
use crate::engine::scheduler::{Scheduler, TaskHandle};
use crate::engine::timer::{self, Countdown, TickOutcome};

pub const STARTING_HEARTS: u32 = 3;
pub const POINTS_PER_WORD: u32 = 10;
pub const FEEDBACK_DELAY_MS: u64 = 2_000;
pub const CLIP_DELAY_MS: u64 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Practice,
    Action,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Practice => "practice",
            GameMode::Action => "action",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "practice" => Some(GameMode::Practice),
            "action" => Some(GameMode::Action),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrillError {
    #[error("no words available for {mode} mode at {difficulty} difficulty")]
    EmptyCatalog { mode: &'static str, difficulty: &'static str },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Answering,
    Reviewing,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissReason {
    Timeout,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedWord {
    pub word: String,
    pub translation: String,
    pub reason: MissReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrillSettings {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub word_count: usize,
    pub show_translation: bool,
    pub carry_cap: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Not answering right now (idle, reviewing, or ended).
    Ignored,
    /// Blank input; nothing changed.
    Empty,
    Correct,
    /// Practice mode: wrong, input cleared, clock still running.
    Retry,
    /// Action mode: wrong, one heart gone.
    LostHeart,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HintOutcome {
    Revealed(String),
    Exhausted,
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub correct: usize,
    pub total_words: usize,
    pub attempted: usize,
    pub score: u32,
    pub accuracy: u32,
    pub hearts_left: u32,
    pub missed: Vec<MissedWord>,
    pub out_of_hearts: bool,
}

/// `round(correct / total * 100)`, clamped to 0..=100.
pub fn accuracy(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Words for one session: every word of every tier in action mode, or a
/// truncated draw from one tier in practice mode. Always shuffled.
pub fn build_pool<R: Rng + ?Sized>(
    catalog: &Catalog,
    mode: GameMode,
    difficulty: Difficulty,
    word_count: usize,
    rng: &mut R,
) -> Vec<Word> {
    match mode {
        GameMode::Action => {
            let mut words = catalog.flatten();
            words.shuffle(rng);
            words
        }
        GameMode::Practice => {
            let mut words = catalog.tier(difficulty).to_vec();
            words.shuffle(rng);
            words.truncate(word_count);
            words
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DrillTask {
    TimerTick,
    PlayClip,
    Advance,
    Finish,
}

#[derive(Debug)]
pub struct Session {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub words: Vec<Word>,
    pub index: usize,
    pub hearts: u32,
    pub correct: usize,
    pub attempted: usize,
    pub score: u32,
    pub missed: Vec<MissedWord>,
    pub carry_over: u32,
    pub input: String,
    pub phase: Phase,
    pub last_result: Option<AnswerResult>,
    show_translation: bool,
    carry_cap: Option<u32>,
    timer: Countdown,
}

impl Session {
    fn new(settings: DrillSettings, words: Vec<Word>) -> Self {
        Self {
            mode: settings.mode,
            difficulty: settings.difficulty,
            words,
            index: 0,
            hearts: STARTING_HEARTS,
            correct: 0,
            attempted: 0,
            score: 0,
            missed: Vec::new(),
            carry_over: 0,
            input: String::new(),
            phase: Phase::Idle,
            last_result: None,
            show_translation: settings.show_translation,
            carry_cap: settings.carry_cap,
            timer: Countdown::new(),
        }
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.words.get(self.index)
    }

    pub fn total_words(&self) -> usize {
        self.words.len()
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn time_remaining(&self) -> u32 {
        self.timer.remaining()
    }

    pub fn instruction(&self) -> Option<Instruction> {
        let word = self.current_word()?;
        Some(if self.show_translation {
            Instruction::Translate(word.translation.clone())
        } else {
            Instruction::Listen
        })
    }

    pub fn accuracy(&self) -> u32 {
        accuracy(self.correct, self.words.len())
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            mode: self.mode,
            difficulty: self.difficulty,
            correct: self.correct,
            total_words: self.words.len(),
            attempted: self.attempted,
            score: self.score,
            accuracy: self.accuracy(),
            hearts_left: self.hearts,
            missed: self.missed.clone(),
            out_of_hearts: self.hearts == 0,
        }
    }

    fn record_miss(&mut self, reason: MissReason) {
        if let Some(word) = self.current_word() {
            let missed = MissedWord {
                word: word.text.clone(),
                translation: word.translation.clone(),
                reason,
            };
            self.missed.push(missed);
        }
    }
}

#[derive(Debug, Default)]
pub struct DrillEngine {
    session: Option<Session>,
    scheduler: Scheduler<DrillTask>,
    pending_clip: Option<TaskHandle>,
    events: Vec<DrillEvent>,
}

impl DrillEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase(), Phase::Answering | Phase::Reviewing)
    }

    pub fn drain_events(&mut self) -> Vec<DrillEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    /// Begin a new session and present its first word. Any session still
    /// running is discarded along with its pending work.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        settings: DrillSettings,
        catalog: &Catalog,
        rng: &mut R,
        now_ms: u64,
    ) -> Result<(), DrillError> {
        let words = build_pool(
            catalog,
            settings.mode,
            settings.difficulty,
            settings.word_count,
            rng,
        );
        if words.is_empty() {
            return Err(DrillError::EmptyCatalog {
                mode: settings.mode.as_str(),
                difficulty: settings.difficulty.as_str(),
            });
        }

        self.cancel_all();
        info!(
            mode = settings.mode.as_str(),
            difficulty = settings.difficulty.as_str(),
            words = words.len(),
            "drill session started"
        );
        self.session = Some(Session::new(settings, words));
        self.events.push(DrillEvent::HeartsChanged(STARTING_HEARTS));
        self.advance(now_ms);
        Ok(())
    }

    /// Drop the session without recording anything.
    pub fn abandon(&mut self) {
        if self.session.take().is_some() {
            self.cancel_all();
            self.events.push(DrillEvent::StopClip);
            self.events.push(DrillEvent::TimerStopped);
            debug!("drill session abandoned");
        }
    }

    /// Run every task due at or before `now_ms`, each at its own due time.
    pub fn tick(&mut self, now_ms: u64) {
        while let Some((due, task)) = self.scheduler.pop_due(now_ms) {
            match task {
                DrillTask::TimerTick => self.on_timer_tick(due),
                DrillTask::PlayClip => {
                    self.pending_clip = None;
                    self.request_clip();
                }
                DrillTask::Advance => {
                    if let Some(s) = self.session.as_mut() {
                        s.index += 1;
                    }
                    self.advance(due);
                }
                DrillTask::Finish => self.end(),
            }
        }
    }

    pub fn type_char(&mut self, ch: char) {
        if let Some(s) = self.answering_mut() {
            s.input.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(s) = self.answering_mut() {
            s.input.pop();
        }
    }

    /// Submit whatever is in the input buffer.
    pub fn submit_input(&mut self, now_ms: u64) -> SubmitOutcome {
        let input = match self.session.as_ref() {
            Some(s) => s.input.clone(),
            None => return SubmitOutcome::Ignored,
        };
        self.submit(&input, now_ms)
    }

    /// Overdue tasks run first, so an answer that arrives after the deadline
    /// finds the word already timed out.
    pub fn submit(&mut self, raw: &str, now_ms: u64) -> SubmitOutcome {
        self.tick(now_ms);
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.phase == Phase::Answering)
        else {
            return SubmitOutcome::Ignored;
        };
        let typed = raw.trim().to_string();
        if typed.is_empty() {
            self.events.push(DrillEvent::Notify(Notice::EmptyAnswer));
            return SubmitOutcome::Empty;
        }
        let Some(expected) = session.current_word().map(|w| w.text.clone()) else {
            return SubmitOutcome::Ignored;
        };

        if matching::is_correct(&typed, &expected) {
            self.on_correct(expected, now_ms);
            return SubmitOutcome::Correct;
        }

        match session.mode {
            GameMode::Practice => {
                session.input.clear();
                let result = AnswerResult::Incorrect { typed, expected };
                session.last_result = Some(result.clone());
                self.events.push(DrillEvent::Result(result));
                self.events.push(DrillEvent::Notify(Notice::TryAgain));
                self.events.push(DrillEvent::InputChanged(String::new()));
                SubmitOutcome::Retry
            }
            GameMode::Action => {
                self.on_action_miss(typed, expected, now_ms);
                SubmitOutcome::LostHeart
            }
        }
    }

    /// Reveal one more leading character of the current word.
    pub fn hint(&mut self, now_ms: u64) -> HintOutcome {
        self.tick(now_ms);
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.phase == Phase::Answering)
        else {
            return HintOutcome::Unavailable;
        };
        let Some(word) = session.current_word().map(|w| w.text.clone()) else {
            return HintOutcome::Unavailable;
        };
        let shown = session.input.chars().count();
        if shown >= word.chars().count() {
            self.events.push(DrillEvent::Notify(Notice::NoMoreHints));
            return HintOutcome::Exhausted;
        }
        let prefix = matching::char_prefix(&word, shown + 1);
        session.input = prefix.clone();
        self.events.push(DrillEvent::InputChanged(prefix.clone()));
        self.events.push(DrillEvent::Notify(Notice::HintAdded));
        HintOutcome::Revealed(prefix)
    }

    /// Play the current word again on request.
    pub fn replay_clip(&mut self) {
        if self.phase() == Phase::Answering {
            self.request_clip();
        }
    }

    fn answering_mut(&mut self) -> Option<&mut Session> {
        self.session
            .as_mut()
            .filter(|s| s.phase == Phase::Answering)
    }

    fn cancel_all(&mut self) {
        self.scheduler.clear();
        self.pending_clip = None;
        if let Some(s) = self.session.as_mut() {
            // The handle it holds is gone with the cleared queue.
            s.timer.stop(&mut self.scheduler);
        }
    }

    fn cancel_clip(&mut self) {
        if let Some(handle) = self.pending_clip.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn request_clip(&mut self) {
        let Some(word) = self.session.as_ref().and_then(|s| s.current_word()) else {
            return;
        };
        match &word.audio_ref {
            Some(clip) => self.events.push(DrillEvent::PlayClip(clip.clone())),
            None => self.events.push(DrillEvent::Notify(Notice::NoAudio)),
        }
    }

    fn stop_timer(&mut self) {
        if let Some(s) = self.session.as_mut() {
            if s.timer.stop(&mut self.scheduler) {
                self.events.push(DrillEvent::TimerStopped);
            }
        }
    }

    fn stop_audio(&mut self) {
        self.cancel_clip();
        self.events.push(DrillEvent::StopClip);
    }

    /// Present `words[index]`, or end the session when the list is used up.
    fn advance(&mut self, now_ms: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.index >= session.words.len() {
            self.end();
            return;
        }

        session.phase = Phase::Answering;
        session.attempted += 1;
        session.input.clear();
        session.last_result = None;

        let budget = timer::word_budget(
            session.mode,
            session.difficulty,
            session.carry_over,
            session.carry_cap,
        );
        session.carry_over = 0;
        session
            .timer
            .start(&mut self.scheduler, now_ms, budget, DrillTask::TimerTick);

        let presented = DrillEvent::WordPresented {
            index: session.index,
            total: session.words.len(),
            instruction: session.instruction().unwrap_or(Instruction::Listen),
        };
        debug!(index = session.index, budget, "word presented");
        self.events.push(presented);
        self.events.push(DrillEvent::InputChanged(String::new()));
        self.events.push(DrillEvent::TimerStarted(budget));

        self.cancel_clip();
        self.pending_clip = Some(
            self.scheduler
                .schedule(now_ms + CLIP_DELAY_MS, DrillTask::PlayClip),
        );
    }

    fn on_correct(&mut self, answer: String, now_ms: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.mode == GameMode::Action {
            session.carry_over = session.timer.remaining();
        }
        session.correct += 1;
        session.score += POINTS_PER_WORD;
        session.phase = Phase::Reviewing;
        let result = AnswerResult::Correct { answer };
        session.last_result = Some(result.clone());

        self.stop_timer();
        self.stop_audio();
        self.events.push(DrillEvent::Result(result));
        self.events.push(DrillEvent::Notify(Notice::Correct));
        self.scheduler
            .schedule(now_ms + FEEDBACK_DELAY_MS, DrillTask::Advance);
    }

    fn on_action_miss(&mut self, typed: String, expected: String, now_ms: u64) {
        self.stop_timer();
        self.stop_audio();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.hearts = session.hearts.saturating_sub(1);
        session.phase = Phase::Reviewing;
        session.record_miss(MissReason::Incorrect);
        let result = AnswerResult::Incorrect { typed, expected };
        session.last_result = Some(result.clone());
        let hearts = session.hearts;

        self.events.push(DrillEvent::HeartsChanged(hearts));
        self.events.push(DrillEvent::Result(result));
        self.events.push(DrillEvent::Notify(Notice::LostHeart));
        let next = if hearts == 0 {
            DrillTask::Finish
        } else {
            DrillTask::Advance
        };
        self.scheduler.schedule(now_ms + FEEDBACK_DELAY_MS, next);
    }

    fn on_timer_tick(&mut self, due_ms: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.phase != Phase::Answering {
            return;
        }
        match session
            .timer
            .on_tick(&mut self.scheduler, due_ms, DrillTask::TimerTick)
        {
            TickOutcome::Running { remaining, low } => {
                self.events.push(DrillEvent::TimerTick { remaining, low });
            }
            TickOutcome::Expired => {
                self.events.push(DrillEvent::TimerTick {
                    remaining: 0,
                    low: true,
                });
                self.events.push(DrillEvent::TimerStopped);
                self.on_timeout(due_ms);
            }
        }
    }

    /// Practice loses a heart on timeout; action only records the miss.
    fn on_timeout(&mut self, due_ms: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(expected) = session.current_word().map(|w| w.text.clone()) else {
            return;
        };
        session.phase = Phase::Reviewing;
        session.record_miss(MissReason::Timeout);
        let result = AnswerResult::TimedOut { expected };
        session.last_result = Some(result.clone());
        let mode = session.mode;

        match mode {
            GameMode::Practice => {
                session.hearts = session.hearts.saturating_sub(1);
                let hearts = session.hearts;
                self.events.push(DrillEvent::HeartsChanged(hearts));
                self.events.push(DrillEvent::Result(result));
                self.events
                    .push(DrillEvent::Notify(Notice::TimeoutLostHeart));
            }
            GameMode::Action => {
                self.stop_audio();
                self.events.push(DrillEvent::Result(result));
                self.events.push(DrillEvent::Notify(Notice::TimeoutNoAnswer));
            }
        }
        debug!(mode = mode.as_str(), "word timed out");
        self.scheduler
            .schedule(due_ms + FEEDBACK_DELAY_MS, DrillTask::Advance);
    }

    fn end(&mut self) {
        self.cancel_all();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.phase == Phase::Ended {
            return;
        }
        session.phase = Phase::Ended;
        let summary = session.summary();
        info!(
            mode = summary.mode.as_str(),
            correct = summary.correct,
            total = summary.total_words,
            accuracy = summary.accuracy,
            "drill session ended"
        );
        self.events.push(DrillEvent::TimerStopped);
        self.events.push(DrillEvent::StopClip);
        self.events.push(DrillEvent::Ended(summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn catalog() -> Catalog {
        Catalog {
            easy: vec![
                Word::new("hei", "hello").with_audio("audio/hei.mp3"),
                Word::new("takk", "thanks"),
                Word::new("ja", "yes"),
            ],
            medium: vec![Word::new("velkommen", "welcome")],
            hard: vec![Word::new("produksjon", "production")],
        }
    }

    fn settings(mode: GameMode, difficulty: Difficulty, word_count: usize) -> DrillSettings {
        DrillSettings {
            mode,
            difficulty,
            word_count,
            show_translation: true,
            carry_cap: None,
        }
    }

    fn started(mode: GameMode, difficulty: Difficulty) -> DrillEngine {
        let mut engine = DrillEngine::new();
        let mut rng = SmallRng::seed_from_u64(7);
        engine
            .start(settings(mode, difficulty, 10), &catalog(), &mut rng, 0)
            .unwrap();
        engine
    }

    fn current(engine: &DrillEngine) -> String {
        engine.session().unwrap().current_word().unwrap().text.clone()
    }

    #[test]
    fn test_accuracy_rounds() {
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(0, 5), 0);
        assert_eq!(accuracy(5, 5), 100);
        assert_eq!(accuracy(0, 0), 0);
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let mut engine = DrillEngine::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let empty = Catalog::default();
        let err = engine
            .start(settings(GameMode::Practice, Difficulty::Easy, 5), &empty, &mut rng, 0)
            .unwrap_err();
        assert!(matches!(err, DrillError::EmptyCatalog { .. }));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn test_start_presents_first_word() {
        let mut engine = started(GameMode::Practice, Difficulty::Easy);
        let s = engine.session().unwrap();
        assert_eq!(s.phase, Phase::Answering);
        assert_eq!(s.attempted, 1);
        assert_eq!(s.hearts, STARTING_HEARTS);
        assert_eq!(s.time_remaining(), timer::PRACTICE_SECS);
        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            DrillEvent::WordPresented { index: 0, total: 3, instruction: Instruction::Translate(_) }
        )));
        assert!(events.contains(&DrillEvent::TimerStarted(20)));
    }

    #[test]
    fn test_clip_plays_after_delay() {
        let mut engine = started(GameMode::Practice, Difficulty::Medium);
        engine.drain_events();
        engine.tick(CLIP_DELAY_MS - 1);
        assert!(engine.drain_events().is_empty());
        engine.tick(CLIP_DELAY_MS);
        // "velkommen" has no audio reference
        assert_eq!(
            engine.drain_events(),
            vec![DrillEvent::Notify(Notice::NoAudio)]
        );
    }

    #[test]
    fn test_empty_submit_changes_nothing() {
        let mut engine = started(GameMode::Action, Difficulty::Easy);
        engine.drain_events();
        assert_eq!(engine.submit("   ", 100), SubmitOutcome::Empty);
        assert_eq!(
            engine.drain_events(),
            vec![DrillEvent::Notify(Notice::EmptyAnswer)]
        );
        let s = engine.session().unwrap();
        assert_eq!(s.hearts, 3);
        assert_eq!(s.phase, Phase::Answering);
    }

    #[test]
    fn test_correct_answer_scores_and_advances_after_delay() {
        let mut engine = started(GameMode::Practice, Difficulty::Easy);
        let word = current(&engine);
        assert_eq!(engine.submit(&word.to_uppercase(), 1_000), SubmitOutcome::Correct);
        let s = engine.session().unwrap();
        assert_eq!(s.correct, 1);
        assert_eq!(s.score, POINTS_PER_WORD);
        assert_eq!(s.phase, Phase::Reviewing);
        assert!(!s.timer_running());

        engine.tick(2_999);
        assert_eq!(engine.session().unwrap().index, 0);
        engine.tick(3_000);
        let s = engine.session().unwrap();
        assert_eq!(s.index, 1);
        assert_eq!(s.phase, Phase::Answering);
        assert_eq!(s.attempted, 2);
    }

    #[test]
    fn test_submit_while_reviewing_is_ignored() {
        let mut engine = started(GameMode::Practice, Difficulty::Easy);
        let word = current(&engine);
        engine.submit(&word, 100);
        assert_eq!(engine.submit(&word, 200), SubmitOutcome::Ignored);
        assert_eq!(engine.session().unwrap().correct, 1);
    }

    #[test]
    fn test_practice_wrong_answer_keeps_clock_running() {
        let mut engine = started(GameMode::Practice, Difficulty::Easy);
        engine.tick(5_000);
        assert_eq!(engine.session().unwrap().time_remaining(), 15);
        engine.type_char('x');
        assert_eq!(engine.submit_input(5_100), SubmitOutcome::Retry);
        let s = engine.session().unwrap();
        assert!(s.input.is_empty());
        assert_eq!(s.hearts, 3);
        assert!(s.timer_running());
        engine.tick(6_000);
        assert_eq!(engine.session().unwrap().time_remaining(), 14);
    }

    #[test]
    fn test_practice_timeout_costs_heart_and_records_miss() {
        let mut engine = started(GameMode::Practice, Difficulty::Easy);
        let word = current(&engine);
        engine.tick(20_000);
        let s = engine.session().unwrap();
        assert_eq!(s.hearts, 2);
        assert_eq!(s.phase, Phase::Reviewing);
        assert_eq!(s.missed.len(), 1);
        assert_eq!(s.missed[0].word, word);
        assert_eq!(s.missed[0].reason, MissReason::Timeout);
        engine.tick(22_000);
        assert_eq!(engine.session().unwrap().index, 1);
    }

    #[test]
    fn test_practice_hearts_never_go_negative() {
        let mut engine = DrillEngine::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let big = Catalog {
            easy: (0..6).map(|i| Word::new(&format!("ord{i}"), "word")).collect(),
            ..Catalog::default()
        };
        engine
            .start(settings(GameMode::Practice, Difficulty::Easy, 6), &big, &mut rng, 0)
            .unwrap();
        let mut now = 0;
        for _ in 0..6 {
            now += 20_000;
            engine.tick(now);
            now += FEEDBACK_DELAY_MS;
            engine.tick(now);
        }
        let s = engine.session().unwrap();
        assert_eq!(s.hearts, 0);
        assert_eq!(s.phase, Phase::Ended);
        assert_eq!(s.missed.len(), 6);
    }

    #[test]
    fn test_action_wrong_answer_costs_heart() {
        let mut engine = started(GameMode::Action, Difficulty::Easy);
        assert_eq!(engine.submit("feil", 1_000), SubmitOutcome::LostHeart);
        let s = engine.session().unwrap();
        assert_eq!(s.hearts, 2);
        assert!(!s.timer_running());
        assert_eq!(s.missed[0].reason, MissReason::Incorrect);
        let events = engine.drain_events();
        assert!(events.contains(&DrillEvent::StopClip));
        assert!(events.contains(&DrillEvent::HeartsChanged(2)));
    }

    #[test]
    fn test_action_ends_when_hearts_run_out() {
        let mut engine = started(GameMode::Action, Difficulty::Easy);
        let mut now = 0;
        for _ in 0..3 {
            engine.submit("feil", now);
            now += FEEDBACK_DELAY_MS;
            engine.tick(now);
        }
        let s = engine.session().unwrap();
        assert_eq!(s.phase, Phase::Ended);
        assert_eq!(s.hearts, 0);
        assert_eq!(s.attempted, 3);
        let ended = engine
            .drain_events()
            .into_iter()
            .find_map(|e| match e {
                DrillEvent::Ended(summary) => Some(summary),
                _ => None,
            })
            .unwrap();
        assert!(ended.out_of_hearts);
        assert_eq!(ended.total_words, 5);
        assert_eq!(ended.accuracy, 0);
    }

    #[test]
    fn test_action_timeout_keeps_hearts() {
        let mut engine = started(GameMode::Action, Difficulty::Easy);
        engine.tick(10_000);
        let s = engine.session().unwrap();
        assert_eq!(s.hearts, 3);
        assert_eq!(s.missed.len(), 1);
        assert_eq!(s.missed[0].reason, MissReason::Timeout);
    }

    #[test]
    fn test_carry_over_feeds_next_budget() {
        let mut engine = started(GameMode::Action, Difficulty::Easy);
        engine.tick(4_000);
        assert_eq!(engine.session().unwrap().time_remaining(), 6);
        let word = current(&engine);
        engine.submit(&word, 4_200);
        assert_eq!(engine.session().unwrap().carry_over, 6);
        engine.tick(6_200);
        let s = engine.session().unwrap();
        assert_eq!(s.time_remaining(), 16);
        assert_eq!(s.carry_over, 0);
    }

    #[test]
    fn test_carry_over_cap_applies() {
        let mut engine = DrillEngine::new();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut capped = settings(GameMode::Action, Difficulty::Easy, 10);
        capped.carry_cap = Some(2);
        engine.start(capped, &catalog(), &mut rng, 0).unwrap();
        let word = current(&engine);
        engine.submit(&word, 100);
        engine.tick(2_100);
        assert_eq!(engine.session().unwrap().time_remaining(), 12);
    }

    #[test]
    fn test_hint_reveals_prefix_until_exhausted() {
        let mut engine = started(GameMode::Practice, Difficulty::Medium);
        assert_eq!(engine.hint(100), HintOutcome::Revealed("v".to_string()));
        assert_eq!(engine.hint(100), HintOutcome::Revealed("ve".to_string()));
        engine.type_char('x');
        // Wrong third character is overwritten with the correct prefix
        assert_eq!(engine.hint(100), HintOutcome::Revealed("velk".to_string()));
        for _ in 0..5 {
            engine.hint(100);
        }
        assert_eq!(engine.session().unwrap().input, "velkommen");
        assert_eq!(engine.hint(100), HintOutcome::Exhausted);
    }

    #[test]
    fn test_hint_after_deadline_is_unavailable() {
        let mut engine = started(GameMode::Practice, Difficulty::Easy);
        engine.tick(19_900);
        assert_eq!(engine.hint(20_050), HintOutcome::Unavailable);
        let s = engine.session().unwrap();
        assert_eq!(s.hearts, 2);
        assert!(s.input.is_empty());
    }

    #[test]
    fn test_last_word_correct_ends_session() {
        let mut engine = started(GameMode::Practice, Difficulty::Hard);
        engine.submit("produksjon", 500);
        engine.tick(2_500);
        assert_eq!(engine.phase(), Phase::Ended);
        let summary = engine
            .drain_events()
            .into_iter()
            .find_map(|e| match e {
                DrillEvent::Ended(s) => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(summary.accuracy, 100);
        assert_eq!(summary.score, 10);
        assert!(summary.missed.is_empty());
        assert!(engine.next_due().is_none());
    }

    #[test]
    fn test_abandon_cancels_pending_work() {
        let mut engine = started(GameMode::Action, Difficulty::Easy);
        engine.abandon();
        assert!(engine.session().is_none());
        assert!(engine.next_due().is_none());
        engine.tick(100_000);
        assert!(
            !engine
                .drain_events()
                .iter()
                .any(|e| matches!(e, DrillEvent::Ended(_)))
        );
    }

    #[test]
    fn test_listen_instruction_without_translation() {
        let mut engine = DrillEngine::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let mut s = settings(GameMode::Practice, Difficulty::Easy, 1);
        s.show_translation = false;
        engine.start(s, &catalog(), &mut rng, 0).unwrap();
        assert_eq!(
            engine.session().unwrap().instruction(),
            Some(Instruction::Listen)
        );
    }
}
