//! Provider abstraction for fetching observation series.

use crate::core::observation::Observation;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// Per-series fetch failures. Both variants are non-fatal to a run: the
/// orchestrator logs them and the series contributes zero rows.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout, or non-success HTTP status.
    #[error("transport error for series {series_id}: {reason}")]
    Transport { series_id: String, reason: String },

    /// Response body did not match the expected shape, or the series was
    /// empty once missing values were dropped.
    #[error("unexpected payload for series {series_id}: {reason}")]
    UnexpectedPayload { series_id: String, reason: String },
}

#[async_trait]
pub trait ObservationProvider: Send + Sync {
    /// Fetch and clean one series over an inclusive date range. A single
    /// attempt, no retries.
    async fn fetch_series(
        &self,
        series_id: &str,
        api_key: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>, FetchError>;
}
