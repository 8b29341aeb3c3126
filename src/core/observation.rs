//! Observation types and the cleaning step applied to raw API rows.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One date/value pair as returned by the FRED observations endpoint.
/// Both fields arrive as strings; missing values are encoded as ".".
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    pub date: String,
    pub value: String,
}

/// One cleaned data point, attributed to its source series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
    pub series_id: String,
    pub fetched_at: DateTime<Utc>,
    /// Set only when the row is folded into the combined all-indicators
    /// dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
}

/// Clean a raw observation list into a dataset for one series.
///
/// Values that fail numeric coercion (FRED uses "." for missing data) are
/// dropped. Rows are sorted ascending by date, ties keeping input order, and
/// every row is stamped with the series id and the wall-clock fetch time.
/// An unparseable date is a violation of the upstream contract and fails the
/// whole call.
pub fn normalize(raw: &[RawObservation], series_id: &str) -> Result<Vec<Observation>> {
    let fetched_at = Utc::now();
    let mut observations = Vec::with_capacity(raw.len());

    for row in raw {
        let Ok(value) = row.value.trim().parse::<f64>() else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .with_context(|| format!("Invalid observation date for {}: {}", series_id, row.date))?;

        observations.push(Observation {
            date,
            value,
            series_id: series_id.to_string(),
            fetched_at,
            indicator: None,
        });
    }

    observations.sort_by_key(|obs| obs.date);
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, value: &str) -> RawObservation {
        RawObservation {
            date: date.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_non_numeric_values_are_dropped() {
        let rows = vec![raw("2020-01-01", "."), raw("2020-02-01", "2.5")];
        let observations = normalize(&rows, "CPIAUCSL").unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].value, 2.5);
        assert_eq!(observations[0].series_id, "CPIAUCSL");
    }

    #[test]
    fn test_all_rows_dropped_yields_empty_dataset() {
        let rows = vec![raw("2020-01-01", ".")];
        let observations = normalize(&rows, "SP500").unwrap();
        assert!(observations.is_empty());
    }

    #[test]
    fn test_output_sorted_ascending_by_date() {
        let rows = vec![
            raw("2020-03-01", "3.0"),
            raw("2020-01-01", "1.0"),
            raw("2020-02-01", "2.0"),
        ];
        let observations = normalize(&rows, "GDP").unwrap();
        let dates: Vec<String> = observations
            .iter()
            .map(|o| o.date.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(dates, vec!["2020-01-01", "2020-02-01", "2020-03-01"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let rows = vec![
            raw("2020-01-01", "1.0"),
            raw("2020-01-01", "2.0"),
            raw("2020-01-01", "3.0"),
        ];
        let observations = normalize(&rows, "GDP").unwrap();
        let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_invalid_date_is_fatal() {
        let rows = vec![raw("not-a-date", "1.0")];
        let result = normalize(&rows, "GDP");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid observation date for GDP")
        );
    }

    #[test]
    fn test_rows_stamped_with_fetch_time() {
        let before = Utc::now();
        let observations = normalize(&[raw("2020-01-01", "1.0")], "GDP").unwrap();
        let after = Utc::now();
        assert!(observations[0].fetched_at >= before);
        assert!(observations[0].fetched_at <= after);
    }
}
