pub mod core;
pub mod definitions;
pub mod orchestrator;
pub mod persist;
pub mod providers;
pub mod summary;

use crate::core::config::AppConfig;
use crate::orchestrator::{FetchOrchestrator, IndicatorData};
use crate::persist::{OutputFormat, Persister};
use crate::providers::fred::FredClient;
use anyhow::Result;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default start of the full historical window.
pub const DEFAULT_START_DATE: &str = "1990-01-01";

pub enum AppCommand {
    /// Full fetch of every indicator from a fixed historical start date.
    Fetch {
        start_date: NaiveDate,
        format: OutputFormat,
    },
    /// Refresh with a rolling N-day window.
    Update {
        days_back: i64,
        format: OutputFormat,
    },
    /// Fetch one series directly by its FRED identifier.
    Series {
        series_id: String,
        start_date: NaiveDate,
        format: OutputFormat,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Starting FRED data fetching process");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = FredClient::new(config.fred_base_url());
    let persister = Persister::new(config.default_data_path()?)?;
    let mut orchestrator = FetchOrchestrator::new(
        &provider,
        persister,
        &config.definitions_dir,
        config.api_key.clone(),
        Duration::from_millis(config.delay_ms),
    );

    match command {
        AppCommand::Fetch { start_date, format } => {
            let all_data = orchestrator.fetch_all(start_date, format).await?;
            report(all_data);
        }
        AppCommand::Update { days_back, format } => {
            let all_data = orchestrator.update(days_back, format).await?;
            report(all_data);
        }
        AppCommand::Series {
            series_id,
            start_date,
            format,
        } => {
            let observations = orchestrator
                .fetch_single(&series_id, start_date, format)
                .await?;
            report(vec![IndicatorData {
                name: series_id,
                observations,
            }]);
        }
    }

    Ok(())
}

fn report(all_data: Vec<IndicatorData>) {
    if all_data.is_empty() {
        error!("No data was fetched");
    } else {
        println!("{}", summary::render_run_summary(&all_data));
    }
}
