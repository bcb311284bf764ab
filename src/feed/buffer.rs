use crate::config::FeedConfig;
use crate::event::Event;
use std::collections::{HashMap, HashSet, VecDeque};

/// Consumer-side deduplicating ingestion buffer.
///
/// Pairs a bounded identity index (logical key -> most recent event, with
/// oldest-key eviction) with a bounded feed list. Pushing an event whose
/// key is already indexed refreshes the index entry only; the feed does
/// not grow, so bursts of updates to one logical slot consume one slot.
///
/// The raw feed may transiently hold two entries for a key whose index
/// entry was evicted and later re-inserted; [`DedupBuffer::snapshot`]
/// resolves those shadows, so the externally visible sequence never
/// contains a duplicate key.
pub struct DedupBuffer {
    index: HashMap<String, Event>,
    index_order: VecDeque<String>,
    feed: VecDeque<Event>,
    index_capacity: usize,
    feed_capacity: usize,
    bucket_ms: i64,
}

impl DedupBuffer {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            index: HashMap::new(),
            index_order: VecDeque::new(),
            feed: VecDeque::new(),
            index_capacity: config.index_capacity.max(1),
            feed_capacity: config.feed_capacity.max(1),
            bucket_ms: config.dedup_bucket_ms,
        }
    }

    pub fn push(&mut self, event: Event) {
        let key = event.logical_key(self.bucket_ms);

        if self.index.contains_key(&key) {
            // known logical slot: refresh the latest copy, feed untouched
            self.index.insert(key, event);
            return;
        }

        self.index.insert(key.clone(), event.clone());
        self.index_order.push_back(key);
        while self.index_order.len() > self.index_capacity {
            if let Some(oldest) = self.index_order.pop_front() {
                self.index.remove(&oldest);
            }
        }

        self.feed.push_back(event);
        while self.feed.len() > self.feed_capacity {
            self.feed.pop_front();
        }
    }

    /// Deduplicated chronological view.
    ///
    /// Walks the feed newest to oldest, keeps the first occurrence of each
    /// logical key (substituting the index's fresher copy when one exists),
    /// then reverses back to chronological order.
    pub fn snapshot(&self) -> Vec<Event> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.feed.len());

        for event in self.feed.iter().rev() {
            let key = event.logical_key(self.bucket_ms);
            if seen.insert(key.clone()) {
                match self.index.get(&key) {
                    Some(latest) => out.push(latest.clone()),
                    None => out.push(event.clone()),
                }
            }
        }

        out.reverse();
        out
    }

    pub fn feed_len(&self) -> usize {
        self.feed.len()
    }

    pub fn index_len(&self) -> usize {
        self.index.len()
    }
}
