use crate::event::Event;
use std::collections::VecDeque;

/// Ordered event log with a fixed capacity.
///
/// Appends at the tail; once the cap is exceeded the oldest entries are
/// dropped from the front. Relative order of the survivors never changes.
#[derive(Debug)]
pub struct BoundedLog {
    entries: VecDeque<Event>,
    capacity: usize,
}

impl BoundedLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.entries.push_back(event);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently appended entry
    pub fn latest(&self) -> Option<&Event> {
        self.entries.back()
    }

    /// The most recent `limit` entries, optionally restricted to those
    /// strictly newer than `since`, returned oldest-first.
    pub fn window(&self, limit: usize, since: Option<i64>) -> Vec<Event> {
        let mut out: Vec<Event> = self
            .entries
            .iter()
            .rev()
            .filter(|e| since.map_or(true, |s| e.timestamp > s))
            .take(limit)
            .cloned()
            .collect();
        out.reverse();
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }
}
