//! Top-level fetch driver: definition files in, per-indicator and combined
//! data files out.

use crate::core::catalog::SeriesCatalog;
use crate::core::fetch::ObservationProvider;
use crate::core::observation::Observation;
use crate::definitions::{list_definitions, parse_definition};
use crate::persist::{OutputFormat, Persister, sanitize_name};
use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

pub const COMBINED_DATASET_NAME: &str = "all_economic_indicators";

/// One indicator's fetched dataset, in run-processing order.
#[derive(Debug)]
pub struct IndicatorData {
    pub name: String,
    pub observations: Vec<Observation>,
}

pub struct FetchOrchestrator<'a> {
    provider: &'a dyn ObservationProvider,
    persister: Persister,
    catalog: SeriesCatalog,
    definitions_dir: PathBuf,
    /// Effective API key for the run. When the config carries no key, the
    /// first definition file with an embedded key supplies it; with several
    /// disagreeing files the winner depends on directory enumeration order.
    api_key: Option<String>,
    delay: std::time::Duration,
}

impl<'a> FetchOrchestrator<'a> {
    pub fn new(
        provider: &'a dyn ObservationProvider,
        persister: Persister,
        definitions_dir: impl Into<PathBuf>,
        api_key: Option<String>,
        delay: std::time::Duration,
    ) -> Self {
        FetchOrchestrator {
            provider,
            persister,
            catalog: SeriesCatalog::new(),
            definitions_dir: definitions_dir.into(),
            api_key,
            delay,
        }
    }

    /// Fetch every indicator described in the definitions directory.
    ///
    /// Per-series failures are logged and skipped. Each indicator is
    /// persisted under its sanitized name; one combined, indicator-tagged
    /// dataset is persisted under `all_economic_indicators` when anything was
    /// fetched. Returns the per-indicator datasets in processing order.
    pub async fn fetch_all(
        &mut self,
        start_date: NaiveDate,
        format: OutputFormat,
    ) -> Result<Vec<IndicatorData>> {
        let end_date = Utc::now().date_naive();

        let files = match list_definitions(&self.definitions_dir) {
            Ok(files) => files,
            Err(e) => {
                error!(
                    "Definitions directory not found: {}: {}",
                    self.definitions_dir.display(),
                    e
                );
                return Ok(Vec::new());
            }
        };
        info!("Found {} definition files to process", files.len());

        let mut all_data: Vec<IndicatorData> = Vec::new();

        for file in files {
            info!("Processing {}", file.display());
            let definition = parse_definition(&file);

            let name = if definition.name.is_empty() {
                file.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            } else {
                definition.name.clone()
            };

            if self.api_key.is_none() && !definition.api_key.is_empty() {
                debug!("Using API key discovered in {}", file.display());
                self.api_key = Some(definition.api_key.clone());
            }

            let mut series_ids = self.catalog.resolve(&name);
            if series_ids.is_empty() {
                if definition.series_id.is_empty() {
                    warn!("No series ID found for {}", name);
                    continue;
                }
                series_ids = vec![definition.series_id.clone()];
            }

            let observations = self
                .fetch_indicator(&series_ids, start_date, end_date)
                .await;

            if observations.is_empty() {
                warn!("No data fetched for {}", name);
                continue;
            }

            if let Err(e) = self
                .persister
                .save(&observations, &sanitize_name(&name), format)
            {
                error!("Error saving {}: {}", name, e);
            }

            all_data.push(IndicatorData { name, observations });
        }

        if !all_data.is_empty() {
            info!("Creating combined dataset");
            let combined: Vec<Observation> = all_data
                .iter()
                .flat_map(|data| {
                    data.observations.iter().cloned().map(|mut obs| {
                        obs.indicator = Some(data.name.clone());
                        obs
                    })
                })
                .collect();

            if let Err(e) = self
                .persister
                .save(&combined, COMBINED_DATASET_NAME, format)
            {
                error!("Error saving combined dataset: {}", e);
            }
        }

        info!(
            "Data fetching completed. Processed {} indicators.",
            all_data.len()
        );
        Ok(all_data)
    }

    /// Rolling-window refresh: fetch everything from `days_back` days ago.
    pub async fn update(
        &mut self,
        days_back: i64,
        format: OutputFormat,
    ) -> Result<Vec<IndicatorData>> {
        let start_date = Utc::now().date_naive() - Duration::days(days_back);
        info!("Updating data from {}", start_date);
        self.fetch_all(start_date, format).await
    }

    /// Fetch and persist one series directly, bypassing the definition files.
    pub async fn fetch_single(
        &self,
        series_id: &str,
        start_date: NaiveDate,
        format: OutputFormat,
    ) -> Result<Vec<Observation>> {
        let end_date = Utc::now().date_naive();
        let api_key = self.api_key.clone().unwrap_or_default();

        let observations = self
            .provider
            .fetch_series(series_id, &api_key, start_date, end_date)
            .await?;
        tokio::time::sleep(self.delay).await;

        self.persister
            .save(&observations, &sanitize_name(series_id), format)?;
        Ok(observations)
    }

    /// Sequential per-series fetch with the unconditional rate-limit pause
    /// after every call. Failed series contribute zero rows.
    async fn fetch_indicator(
        &self,
        series_ids: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<Observation> {
        let api_key = self.api_key.clone().unwrap_or_default();
        let mut observations = Vec::new();

        for series_id in series_ids {
            match self
                .provider
                .fetch_series(series_id, &api_key, start_date, end_date)
                .await
            {
                Ok(series_observations) => observations.extend(series_observations),
                Err(e) => warn!("Error fetching data: {}", e),
            }

            // Rate limiting
            tokio::time::sleep(self.delay).await;
        }

        observations
    }
}
