//! Cooperative timer queue for the single-threaded event loop.
//!
//! Tasks are kept in a min-heap keyed by due time (ms since epoch). The event
//! loop asks how long until the next deadline, waits at most that long for a
//! command, then drains whatever is due. Tasks due at the same instant run in
//! the order they were scheduled.
//!
//! # Example Usage
//! ```rust,ignore
//! let mut scheduler = Scheduler::new();
//! scheduler.schedule_after(now, Duration::from_millis(100), Task::SendPasteKeystroke { entry_id });
//!
//! loop {
//!     let timeout = scheduler.time_until_next(clock.now_millis());
//!     // ... wait for a command up to `timeout` ...
//!     while let Some(task) = scheduler.pop_due(clock.now_millis()) {
//!         run_task(task);
//!     }
//! }
//! ```

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

struct Scheduled<T> {
    due_ms: i64,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_ms, self.seq).cmp(&(other.due_ms, other.seq))
    }
}

pub struct Scheduler<T> {
    heap: BinaryHeap<Reverse<Scheduled<T>>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Scheduler {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule_at(&mut self, due_ms: i64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled { due_ms, seq, task }));
    }

    pub fn schedule_after(&mut self, now_ms: i64, delay: Duration, task: T) {
        self.schedule_at(now_ms.saturating_add(delay.as_millis() as i64), task);
    }

    /// Remove and return the earliest task if it is due at `now_ms`
    pub fn pop_due(&mut self, now_ms: i64) -> Option<T> {
        if self.heap.peek()?.0.due_ms > now_ms {
            return None;
        }
        self.heap.pop().map(|Reverse(scheduled)| scheduled.task)
    }

    pub fn next_deadline(&self) -> Option<i64> {
        self.heap.peek().map(|Reverse(scheduled)| scheduled.due_ms)
    }

    /// Time until the next task is due; `None` when nothing is scheduled
    pub fn time_until_next(&self, now_ms: i64) -> Option<Duration> {
        self.next_deadline()
            .map(|due| Duration::from_millis(due.saturating_sub(now_ms).max(0) as u64))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_due_respects_deadlines() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(200, "late");
        scheduler.schedule_at(100, "early");

        assert_eq!(scheduler.pop_due(50), None);
        assert_eq!(scheduler.pop_due(100), Some("early"));
        assert_eq!(scheduler.pop_due(150), None);
        assert_eq!(scheduler.pop_due(250), Some("late"));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_same_deadline_runs_in_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(10, 1);
        scheduler.schedule_at(10, 2);
        scheduler.schedule_at(10, 3);

        let drained: Vec<i32> = std::iter::from_fn(|| scheduler.pop_due(10)).collect();
        assert_eq!(drained, vec![1, 2, 3]);
    }

    #[test]
    fn test_time_until_next() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        assert_eq!(scheduler.time_until_next(0), None);

        scheduler.schedule_after(1_000, Duration::from_millis(100), ());
        assert_eq!(scheduler.next_deadline(), Some(1_100));
        assert_eq!(scheduler.time_until_next(1_050), Some(Duration::from_millis(50)));
        // Overdue tasks report zero, not a negative wait
        assert_eq!(scheduler.time_until_next(2_000), Some(Duration::ZERO));
        assert_eq!(scheduler.len(), 1);
    }
}
