use tracing::debug;

use crate::catalog::Difficulty;
use crate::engine::drill::GameMode;
use crate::engine::scheduler::{Scheduler, TaskHandle};

pub const PRACTICE_SECS: u32 = 20;
pub const LOW_TIME_SECS: u32 = 3;
pub const TICK_MS: u64 = 1_000;

pub fn action_base_secs(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 10,
        Difficulty::Medium => 15,
        Difficulty::Hard => 20,
    }
}

/// Seconds on the clock for the next word. Practice always gets the fixed
/// budget; action adds whatever was carried over from an early answer,
/// optionally capped.
pub fn word_budget(
    mode: GameMode,
    difficulty: Difficulty,
    carry_over: u32,
    carry_cap: Option<u32>,
) -> u32 {
    match mode {
        GameMode::Practice => PRACTICE_SECS,
        GameMode::Action => {
            let carry = carry_cap.map_or(carry_over, |cap| carry_over.min(cap));
            action_base_secs(difficulty) + carry
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32, low: bool },
    Expired,
}

/// A whole-second countdown backed by a single pending tick task.
#[derive(Debug, Default)]
pub struct Countdown {
    remaining: u32,
    tick: Option<TaskHandle>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.tick.is_some()
    }

    /// Arm the countdown. Any tick still pending from a previous start is
    /// cancelled first so two countdowns can never run at once.
    pub fn start<T>(&mut self, scheduler: &mut Scheduler<T>, now_ms: u64, secs: u32, tick_task: T) {
        self.stop(scheduler);
        self.remaining = secs;
        self.tick = Some(scheduler.schedule(now_ms + TICK_MS, tick_task));
        debug!(secs, "timer started");
    }

    /// Returns true if a countdown was running.
    pub fn stop<T>(&mut self, scheduler: &mut Scheduler<T>) -> bool {
        match self.tick.take() {
            Some(handle) => {
                scheduler.cancel(handle);
                debug!(remaining = self.remaining, "timer stopped");
                true
            }
            None => false,
        }
    }

    /// Handle a fired tick. The caller has already popped the task, so the
    /// stored handle is stale and gets replaced or dropped here.
    pub fn on_tick<T>(&mut self, scheduler: &mut Scheduler<T>, due_ms: u64, tick_task: T) -> TickOutcome {
        self.tick = None;
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            debug!("timer expired");
            return TickOutcome::Expired;
        }
        self.tick = Some(scheduler.schedule(due_ms + TICK_MS, tick_task));
        TickOutcome::Running {
            remaining: self.remaining,
            low: self.remaining <= LOW_TIME_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_practice_budget_ignores_carry_over() {
        assert_eq!(word_budget(GameMode::Practice, Difficulty::Hard, 7, None), 20);
    }

    #[test]
    fn test_action_budget_adds_carry_over() {
        assert_eq!(word_budget(GameMode::Action, Difficulty::Easy, 0, None), 10);
        assert_eq!(word_budget(GameMode::Action, Difficulty::Medium, 6, None), 21);
        assert_eq!(word_budget(GameMode::Action, Difficulty::Hard, 40, None), 60);
    }

    #[test]
    fn test_action_budget_respects_cap() {
        assert_eq!(word_budget(GameMode::Action, Difficulty::Medium, 40, Some(10)), 25);
    }

    #[test]
    fn test_countdown_runs_to_expiry() {
        let mut sched = Scheduler::new();
        let mut cd = Countdown::new();
        cd.start(&mut sched, 0, 3, ());

        let (due, _) = sched.pop_due(1_000).unwrap();
        assert_eq!(
            cd.on_tick(&mut sched, due, ()),
            TickOutcome::Running { remaining: 2, low: true }
        );
        let (due, _) = sched.pop_due(2_000).unwrap();
        assert_eq!(
            cd.on_tick(&mut sched, due, ()),
            TickOutcome::Running { remaining: 1, low: true }
        );
        let (due, _) = sched.pop_due(3_000).unwrap();
        assert_eq!(cd.on_tick(&mut sched, due, ()), TickOutcome::Expired);
        assert!(!cd.is_running());
        assert!(sched.is_empty());
    }

    #[test]
    fn test_restart_cancels_previous_tick() {
        let mut sched = Scheduler::new();
        let mut cd = Countdown::new();
        cd.start(&mut sched, 0, 5, ());
        cd.start(&mut sched, 500, 5, ());
        assert_eq!(sched.len(), 1);
        assert_eq!(sched.next_due(), Some(1_500));
    }

    #[test]
    fn test_stop_clears_pending_tick() {
        let mut sched = Scheduler::new();
        let mut cd = Countdown::new();
        cd.start(&mut sched, 0, 5, ());
        assert!(cd.stop(&mut sched));
        assert!(!cd.stop(&mut sched));
        assert!(sched.is_empty());
    }
}
