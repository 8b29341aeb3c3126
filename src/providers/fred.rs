//! FRED observations API client.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::core::fetch::{FetchError, ObservationProvider};
use crate::core::observation::{Observation, RawObservation, normalize};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct FredClient {
    base_url: String,
}

impl FredClient {
    pub fn new(base_url: &str) -> Self {
        FredClient {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

fn transport(series_id: &str, reason: impl ToString) -> FetchError {
    FetchError::Transport {
        series_id: series_id.to_string(),
        reason: reason.to_string(),
    }
}

fn unexpected(series_id: &str, reason: impl ToString) -> FetchError {
    FetchError::UnexpectedPayload {
        series_id: series_id.to_string(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl ObservationProvider for FredClient {
    #[instrument(
        name = "FredSeriesFetch",
        skip(self, api_key),
        fields(series_id = %series_id)
    )]
    async fn fetch_series(
        &self,
        series_id: &str,
        api_key: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>, FetchError> {
        let url = format!("{}/fred/series/observations", self.base_url);
        debug!("Requesting observations from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("fredfetch/0.1")
            .build()
            .map_err(|e| transport(series_id, e))?;

        let response = client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("observation_start", &start.format(DATE_FORMAT).to_string()),
                ("observation_end", &end.format(DATE_FORMAT).to_string()),
            ])
            .send()
            .await
            .map_err(|e| transport(series_id, e))?;

        if !response.status().is_success() {
            return Err(transport(
                series_id,
                format!("HTTP error: {}", response.status()),
            ));
        }

        let text = response.text().await.map_err(|e| transport(series_id, e))?;
        let data: ObservationsResponse = serde_json::from_str(&text)
            .map_err(|e| unexpected(series_id, format!("no observations found: {e}")))?;

        let observations =
            normalize(&data.observations, series_id).map_err(|e| unexpected(series_id, e))?;

        if observations.is_empty() {
            return Err(unexpected(series_id, "empty dataset after cleaning"));
        }

        info!(
            "Fetched {} observations for {}",
            observations.len(),
            series_id
        );
        Ok(observations)
    }
}
