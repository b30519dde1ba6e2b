//! Virtual-time timer queue.
//!
//! Every timer in a round (clock ticks, spawns, expiries, post-hit removals)
//! is an entry here. Entries fire in due-time order; entries due at the same
//! instant fire in the order they were scheduled.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Milliseconds of virtual time
pub type Millis = u64;

#[derive(Debug)]
struct Entry<E> {
    due: Millis,
    /// Scheduling order, breaks ties between equal due times
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

#[derive(Debug)]
pub struct Scheduler<E> {
    now: Millis,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Entry<E>>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule `event` to fire `delay` ms after the current virtual time
    pub fn schedule_after(&mut self, delay: Millis, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            due: self.now.saturating_add(delay),
            seq,
            event,
        }));
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time so follow-up timers are scheduled relative to it.
    pub fn pop_due(&mut self, until: Millis) -> Option<(Millis, E)> {
        match self.queue.peek() {
            Some(Reverse(e)) if e.due <= until => {}
            _ => return None,
        }
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some((entry.due, entry.event))
    }

    /// Move the clock forward; never backwards
    pub fn set_now(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }
}
