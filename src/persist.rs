//! Dataset persistence in csv, json, and parquet.

use crate::core::observation::Observation;
use chrono::NaiveDate;
use polars::prelude::*;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::info;

static SANITIZE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\-]").unwrap());

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to write {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Failed to encode dataset: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PersistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(PersistError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// File name base derived from an indicator display name: lowercased,
/// non-word characters replaced with underscores.
pub fn sanitize_name(name: &str) -> String {
    SANITIZE_RE.replace_all(&name.to_lowercase(), "_").into()
}

/// Writes datasets under a single output directory, one file per dataset,
/// overwritten wholesale on every run.
pub struct Persister {
    data_dir: PathBuf,
}

impl Persister {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| PersistError::Io {
            path: data_dir.clone(),
            reason: e.to_string(),
        })?;
        Ok(Persister { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Serialize the dataset to `<data_dir>/<base_name>.<format>`. Returns
    /// the written path so callers can tell a saved file from a failed one.
    pub fn save(
        &self,
        observations: &[Observation],
        base_name: &str,
        format: OutputFormat,
    ) -> Result<PathBuf, PersistError> {
        let path = self
            .data_dir
            .join(format!("{}.{}", base_name, format.extension()));

        match format {
            OutputFormat::Csv => write_csv(observations, &path)?,
            OutputFormat::Json => write_json(observations, &path)?,
            OutputFormat::Parquet => write_parquet(observations, &path)?,
        }

        info!("Data saved to {}", path.display());
        Ok(path)
    }
}

fn io_error(path: &Path, e: impl ToString) -> PersistError {
    PersistError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn write_csv(observations: &[Observation], path: &Path) -> Result<(), PersistError> {
    let has_indicator = observations.iter().any(|o| o.indicator.is_some());

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["date", "value", "series_id", "fetched_at"];
    if has_indicator {
        header.push("indicator");
    }
    writer
        .write_record(&header)
        .map_err(|e| PersistError::Encode(e.to_string()))?;

    for obs in observations {
        let mut record = vec![
            obs.date.format("%Y-%m-%d").to_string(),
            obs.value.to_string(),
            obs.series_id.clone(),
            obs.fetched_at.to_rfc3339(),
        ];
        if has_indicator {
            record.push(obs.indicator.clone().unwrap_or_default());
        }
        writer
            .write_record(&record)
            .map_err(|e| PersistError::Encode(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PersistError::Encode(e.to_string()))?;
    fs::write(path, bytes).map_err(|e| io_error(path, e))
}

fn write_json(observations: &[Observation], path: &Path) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(observations)
        .map_err(|e| PersistError::Encode(e.to_string()))?;
    fs::write(path, json).map_err(|e| io_error(path, e))
}

fn write_parquet(observations: &[Observation], path: &Path) -> Result<(), PersistError> {
    let df = to_dataframe(observations)?;
    let file = fs::File::create(path).map_err(|e| io_error(path, e))?;
    ParquetWriter::new(file)
        .finish(&mut df.clone())
        .map_err(|e| io_error(path, e))?;
    Ok(())
}

fn to_dataframe(observations: &[Observation]) -> Result<DataFrame, PersistError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let dates: Vec<i32> = observations
        .iter()
        .map(|o| (o.date - epoch).num_days() as i32)
        .collect();
    let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
    let series_ids: Vec<String> = observations.iter().map(|o| o.series_id.clone()).collect();
    let fetched_ats: Vec<i64> = observations
        .iter()
        .map(|o| o.fetched_at.timestamp_micros())
        .collect();

    let mut columns = vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| PersistError::Encode(format!("date cast: {e}")))?,
        Column::new("value".into(), values),
        Column::new("series_id".into(), series_ids),
        Column::new("fetched_at".into(), fetched_ats)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
            .map_err(|e| PersistError::Encode(format!("fetched_at cast: {e}")))?,
    ];

    if observations.iter().any(|o| o.indicator.is_some()) {
        let indicators: Vec<Option<String>> =
            observations.iter().map(|o| o.indicator.clone()).collect();
        columns.push(Column::new("indicator".into(), indicators));
    }

    DataFrame::new(columns).map_err(|e| PersistError::Encode(format!("dataframe creation: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_observations(indicator: Option<&str>) -> Vec<Observation> {
        let fetched_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        vec![
            Observation {
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                value: 257.971,
                series_id: "CPIAUCSL".to_string(),
                fetched_at,
                indicator: indicator.map(String::from),
            },
            Observation {
                date: NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(),
                value: 258.678,
                series_id: "CPIAUCSL".to_string(),
                fetched_at,
                indicator: indicator.map(String::from),
            },
        ]
    }

    #[test]
    fn test_unsupported_format_fails_before_any_io() {
        let result = OutputFormat::from_str("xml");
        match result {
            Err(PersistError::UnsupportedFormat(format)) => assert_eq!(format, "xml"),
            other => panic!("Expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("CPI data"), "cpi_data");
        assert_eq!(sanitize_name("S&P 500 data"), "s_p_500_data");
        assert_eq!(
            sanitize_name("Government Debt & Budget Deficit data"),
            "government_debt___budget_deficit_data"
        );
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = TempDir::new().unwrap();
        let persister = Persister::new(dir.path()).unwrap();
        let observations = sample_observations(None);

        let path = persister
            .save(&observations, "cpi_data", OutputFormat::Csv)
            .unwrap();
        assert_eq!(path, dir.path().join("cpi_data.csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(vec!["date", "value", "series_id", "fetched_at"])
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "2020-01-01");
        assert_eq!(rows[0][1].parse::<f64>().unwrap(), 257.971);
        assert_eq!(&rows[0][2], "CPIAUCSL");
    }

    #[test]
    fn test_csv_includes_indicator_column_when_tagged() {
        let dir = TempDir::new().unwrap();
        let persister = Persister::new(dir.path()).unwrap();
        let observations = sample_observations(Some("CPI data"));

        let path = persister
            .save(&observations, "all_economic_indicators", OutputFormat::Csv)
            .unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(vec![
                "date",
                "value",
                "series_id",
                "fetched_at",
                "indicator"
            ])
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][4], "CPI data");
    }

    #[test]
    fn test_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let persister = Persister::new(dir.path()).unwrap();
        let observations = sample_observations(None);

        let path = persister
            .save(&observations, "cpi_data", OutputFormat::Json)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // Pretty-printed with 2-space indentation
        assert!(content.contains("\n  {"));

        let restored: Vec<Observation> = serde_json::from_str(&content).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0].date, observations[0].date);
        assert_eq!(restored[0].value, observations[0].value);
        assert_eq!(restored[0].series_id, observations[0].series_id);
        assert!(restored[0].indicator.is_none());
    }

    #[test]
    fn test_parquet_round_trip() {
        let dir = TempDir::new().unwrap();
        let persister = Persister::new(dir.path()).unwrap();
        let observations = sample_observations(None);

        let path = persister
            .save(&observations, "cpi_data", OutputFormat::Parquet)
            .unwrap();

        let file = fs::File::open(&path).unwrap();
        let df = ParquetReader::new(file).finish().unwrap();
        assert_eq!(df.height(), 2);

        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let dates = df.column("date").unwrap().date().unwrap();
        let restored_date = epoch + chrono::Duration::days(dates.get(0).unwrap() as i64);
        assert_eq!(restored_date, observations[0].date);

        let values = df.column("value").unwrap().f64().unwrap();
        assert_eq!(values.get(0).unwrap(), 257.971);
        assert_eq!(values.get(1).unwrap(), 258.678);

        let series_ids = df.column("series_id").unwrap().str().unwrap();
        assert_eq!(series_ids.get(0).unwrap(), "CPIAUCSL");
    }

    #[test]
    fn test_parquet_includes_indicator_column_when_tagged() {
        let dir = TempDir::new().unwrap();
        let persister = Persister::new(dir.path()).unwrap();
        let observations = sample_observations(Some("CPI data"));

        let path = persister
            .save(
                &observations,
                "all_economic_indicators",
                OutputFormat::Parquet,
            )
            .unwrap();

        let file = fs::File::open(&path).unwrap();
        let df = ParquetReader::new(file).finish().unwrap();
        let indicators = df.column("indicator").unwrap().str().unwrap();
        assert_eq!(indicators.get(0).unwrap(), "CPI data");
    }

    #[test]
    fn test_save_to_unwritable_dir_surfaces_error() {
        let dir = TempDir::new().unwrap();
        let persister = Persister::new(dir.path()).unwrap();
        // Remove the directory out from under the persister.
        fs::remove_dir_all(dir.path()).unwrap();

        let result = persister.save(&sample_observations(None), "cpi_data", OutputFormat::Csv);
        assert!(matches!(result, Err(PersistError::Io { .. })));
    }
}
