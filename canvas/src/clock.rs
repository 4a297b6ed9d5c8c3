//! Virtual clock and deferred-task queue.
//!
//! Time only moves when the host calls [`Scheduler::advance`], so delayed
//! behavior (overlay reveal) is driven by the event loop in production and by
//! explicit steps in tests.

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due_ms: u64,
    seq: u64,
    task: T,
}

/// Queue of tasks keyed by virtual due time.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_seq: u64,
    queue: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self { now_ms: 0, next_seq: 0, queue: Vec::new() }
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Queue `task` to fire `delay_ms` after the current virtual time.
    pub fn schedule(&mut self, delay_ms: u64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled { due_ms: self.now_ms.saturating_add(delay_ms), seq, task });
    }

    /// Move time forward and return every task now due, earliest first.
    /// Tasks due at the same instant fire in scheduling order.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<T> {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
        let now = self.now_ms;

        let (mut due, pending): (Vec<_>, Vec<_>) = self.queue.drain(..).partition(|s| s.due_ms <= now);
        self.queue = pending;
        due.sort_by_key(|s| (s.due_ms, s.seq));
        due.into_iter().map(|s| s.task).collect()
    }

    /// Due time of the earliest pending task.
    #[must_use]
    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.iter().map(|s| s.due_ms).min()
    }

    /// Drop every pending task. Virtual time is not rewound.
    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
