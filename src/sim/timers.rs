//! Deadline-ordered delayed effects
//!
//! A minimal single-threaded timer wheel: effects are queued with an absolute
//! deadline in round time (ms) and popped by the frame whose clock first
//! reaches that deadline. Ties fire in scheduling order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry<E> {
    deadline_ms: f64,
    seq: u64,
    effect: E,
}

/// Pending effects for one owner (the match clock or a single fighter)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerWheel<E> {
    entries: Vec<Entry<E>>,
    next_seq: u64,
}

impl<E> Default for TimerWheel<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<E> TimerWheel<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `effect` to fire once the clock reaches `deadline_ms`
    pub fn schedule_at(&mut self, deadline_ms: f64, effect: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            deadline_ms,
            seq,
            effect,
        });
    }

    /// Queue `effect` to fire `delay_ms` after `now_ms`
    pub fn schedule_in(&mut self, now_ms: f64, delay_ms: f32, effect: E) {
        self.schedule_at(now_ms + delay_ms as f64, effect);
    }

    /// Remove and return the earliest effect due at `now_ms`, if any
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(f64, E)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline_ms <= now_ms)
            .min_by(|(_, a), (_, b)| {
                a.deadline_ms
                    .total_cmp(&b.deadline_ms)
                    .then(a.seq.cmp(&b.seq))
            })
            .map(|(i, _)| i)?;
        let entry = self.entries.swap_remove(idx);
        Some((entry.deadline_ms, entry.effect))
    }

    /// Drop every pending effect
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_fired_before_deadline() {
        let mut wheel = TimerWheel::new();
        wheel.schedule_in(0.0, 200.0, "end");
        assert!(wheel.pop_due(199.9).is_none());
        assert_eq!(wheel.pop_due(200.0), Some((200.0, "end")));
        assert!(wheel.is_empty());
    }

    #[test]
    fn test_fires_in_deadline_then_insertion_order() {
        let mut wheel = TimerWheel::new();
        wheel.schedule_at(300.0, 'c');
        wheel.schedule_at(100.0, 'a');
        wheel.schedule_at(100.0, 'b');
        let mut fired = Vec::new();
        while let Some((_, e)) = wheel.pop_due(1000.0) {
            fired.push(e);
        }
        assert_eq!(fired, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_cancel_all() {
        let mut wheel = TimerWheel::new();
        wheel.schedule_at(10.0, 1);
        wheel.schedule_at(20.0, 2);
        assert_eq!(wheel.len(), 2);
        wheel.cancel_all();
        assert!(wheel.is_empty());
        assert!(wheel.pop_due(f64::MAX).is_none());
    }
}
