//! Deferred work for the tick-driven engines.
//!
//! Every delayed action (timer ticks, feedback delays, fade steps) is a task
//! with a due time in milliseconds on the engine's clock. Scheduling returns
//! a [`TaskHandle`]; a cancelled handle never fires, which is what keeps a
//! superseded timeout from racing a submitted answer.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Scheduled<T> {
    id: u64,
    due_ms: u64,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, task: T) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Scheduled { id, due_ms, task });
        TaskHandle(id)
    }

    /// Returns true when the task was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != handle.0);
        self.pending.len() != before
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|s| s.due_ms).min()
    }

    /// Remove and return the earliest task due at or before `now_ms`, along
    /// with its due time. Ties fire in scheduling order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, T)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= now_ms)
            .min_by_key(|(_, s)| (s.due_ms, s.id))
            .map(|(i, _)| i)?;
        let scheduled = self.pending.remove(idx);
        Some((scheduled.due_ms, scheduled.task))
    }
}
