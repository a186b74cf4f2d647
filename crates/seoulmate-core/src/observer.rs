//! Recommendation observers
//!
//! Hooks for analytics and observability collaborators. Observers run on
//! detached blocking tasks after the ranked result is built; an observer
//! error or panic is logged and otherwise ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recommendation::DegradationReason;
use crate::query::Intent;
use crate::search::SearchFilters;

/// Observer error
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The sink rejected or failed to store the event
    #[error("Observer sink failed: {0}")]
    Sink(String),
}

/// Summary of one completed recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEvent {
    /// Request identifier shared with the log lines of the request
    pub request_id: String,
    /// When the result was produced
    pub timestamp: DateTime<Utc>,
    /// Query as received
    pub query: String,
    /// Classified intent
    pub intent: Intent,
    /// Semantic weight actually used
    pub alpha: f32,
    /// Returned item ids, in rank order
    pub item_ids: Vec<String>,
    /// Filters applied (explicit and query-derived)
    pub filters: SearchFilters,
    /// Degradations encountered
    pub degradations: Vec<DegradationReason>,
    /// Wall time spent in the pipeline
    pub elapsed_ms: u64,
}

/// Receives an event per completed recommendation
pub trait RecommendationObserver: Send + Sync {
    /// Handle a finished recommendation
    fn on_recommendation(&self, event: &RecommendationEvent) -> Result<(), ObserverError>;
}

/// Logs each event at `info`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RecommendationObserver for TracingObserver {
    fn on_recommendation(&self, event: &RecommendationEvent) -> Result<(), ObserverError> {
        let reasons: Vec<&str> = event.degradations.iter().map(|r| r.code()).collect();
        tracing::info!(
            request_id = %event.request_id,
            intent = %event.intent,
            alpha = event.alpha,
            results = event.item_ids.len(),
            degradations = ?reasons,
            elapsed_ms = event.elapsed_ms,
            "Recommendation served"
        );
        Ok(())
    }
}
