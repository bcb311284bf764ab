// Consumer-side dedup feed: bounded buffer, periodic flush, polling client

mod buffer;
mod poller;

pub use buffer::DedupBuffer;
pub use poller::EventPoller;

use crate::config::FeedConfig;
use crate::event::Event;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::IntervalStream;
use tracing::info;

/// Coalescing front for a [`DedupBuffer`].
///
/// `push` may arrive at arbitrary cadence (a receive callback, a poll
/// cycle); consumers observe the buffer only "as of the last flush tick"
/// through a watch channel. Bursts between two ticks are absorbed without
/// a matching burst of downstream recomputation.
pub struct FeedAggregator {
    buffer: Mutex<DedupBuffer>,
    snapshot_tx: watch::Sender<Vec<Event>>,
    flush_interval: Duration,
}

impl FeedAggregator {
    pub fn new(config: &FeedConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(Vec::new());
        Self {
            buffer: Mutex::new(DedupBuffer::new(config)),
            snapshot_tx,
            flush_interval: Duration::from_millis(config.flush_interval_ms.max(1)),
        }
    }

    pub fn push(&self, event: Event) {
        self.buffer.lock().unwrap().push(event);
    }

    /// Immediate deduplicated view, bypassing the flush cadence
    pub fn snapshot(&self) -> Vec<Event> {
        self.buffer.lock().unwrap().snapshot()
    }

    /// Receiver observing the state as of the last flush tick
    pub fn watch(&self) -> watch::Receiver<Vec<Event>> {
        self.snapshot_tx.subscribe()
    }

    /// Periodic flush loop; publishes a snapshot every tick until the
    /// shutdown signal flips to true.
    pub async fn run_flusher(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticks = IntervalStream::new(tokio::time::interval(self.flush_interval));
        info!(
            interval_ms = self.flush_interval.as_millis() as u64,
            "Feed flusher started"
        );

        loop {
            tokio::select! {
                _ = ticks.next() => {
                    let snapshot = self.snapshot();
                    let _ = self.snapshot_tx.send(snapshot);
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Feed flusher stopped");
                        return;
                    }
                }
            }
        }
    }
}
