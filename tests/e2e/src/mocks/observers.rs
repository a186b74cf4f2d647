//! Scripted Observers
//!
//! Observers run on detached tasks, so `EventLog::wait_for` polls until the
//! expected number of events has landed.

use std::sync::Mutex;
use std::time::Duration;

use seoulmate_core::{ObserverError, RecommendationEvent, RecommendationObserver};

/// How long `wait_for` polls before giving up
const WAIT_LIMIT: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Observer that records every event it receives
#[derive(Default)]
pub struct EventLog(Mutex<Vec<RecommendationEvent>>);

impl EventLog {
    /// Snapshot of the events once at least `count` have arrived
    ///
    /// Returns whatever arrived if the limit passes first.
    pub async fn wait_for(&self, count: usize) -> Vec<RecommendationEvent> {
        let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
        loop {
            let events = self.snapshot();
            if events.len() >= count || tokio::time::Instant::now() >= deadline {
                return events;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Events received so far
    pub fn snapshot(&self) -> Vec<RecommendationEvent> {
        self.0.lock().expect("event log lock").clone()
    }
}

impl RecommendationObserver for EventLog {
    fn on_recommendation(&self, event: &RecommendationEvent) -> Result<(), ObserverError> {
        self.0.lock().expect("event log lock").push(event.clone());
        Ok(())
    }
}

/// Observer that panics on every event
pub struct PanickingObserver;

impl RecommendationObserver for PanickingObserver {
    fn on_recommendation(&self, event: &RecommendationEvent) -> Result<(), ObserverError> {
        panic!("analytics sink exploded on {}", event.request_id);
    }
}
