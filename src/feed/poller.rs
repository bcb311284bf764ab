use super::FeedAggregator;
use crate::event::Event;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Pull-mode consumer: periodically fetches events newer than its cursor
/// from a Skywatch server and feeds them into a local [`FeedAggregator`].
///
/// A failed cycle (network error, bad status, undecodable body) is logged
/// and skipped; the next tick retries. The loop ends only on shutdown.
pub struct EventPoller {
    client: reqwest::Client,
    base_url: String,
    interval: Duration,
    since: i64,
}

impl EventPoller {
    pub fn new(base_url: impl Into<String>, interval: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            interval,
            since: 0,
        }
    }

    pub async fn run(
        mut self,
        aggregator: Arc<FeedAggregator>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        info!(base_url = %self.base_url, "Event poller started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.fetch_new_events().await {
                        Ok(events) => {
                            debug!(count = events.len(), since = self.since, "Poll cycle complete");
                            for event in events {
                                self.since = self.since.max(event.timestamp);
                                aggregator.push(event);
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Poll cycle failed, retrying on next tick");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Event poller stopped");
                        return;
                    }
                }
            }
        }
    }

    fn poll_url(&self) -> String {
        format!("{}/api/events?since={}", self.base_url, self.since)
    }

    async fn fetch_new_events(&self) -> Result<Vec<Event>> {
        let response = self
            .client
            .get(self.poll_url())
            .send()
            .await
            .context("request failed")?
            .error_for_status()
            .context("server returned error status")?;

        let events: Vec<Event> = response.json().await.context("undecodable response body")?;
        Ok(events)
    }
}
