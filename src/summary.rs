//! End-of-run summary rendering.

use crate::orchestrator::IndicatorData;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Table of indicator, observation count, and covered date range for one run.
pub fn render_run_summary(all_data: &[IndicatorData]) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Indicator"),
        header_cell("Observations"),
        header_cell("From"),
        header_cell("To"),
    ]);

    let mut total = 0usize;
    for data in all_data {
        // Datasets are sorted per series; min/max must scan the whole set.
        let first = data.observations.iter().map(|o| o.date).min();
        let last = data.observations.iter().map(|o| o.date).max();
        total += data.observations.len();

        table.add_row(vec![
            Cell::new(&data.name),
            Cell::new(data.observations.len()).set_alignment(CellAlignment::Right),
            Cell::new(first.map_or("N/A".to_string(), |d| d.to_string())),
            Cell::new(last.map_or("N/A".to_string(), |d| d.to_string())),
        ]);
    }

    format!(
        "{}\n\n{}\n\nFetched {} observations across {} indicators",
        style("Fetched indicators").bold().underlined(),
        table,
        style(total).green().bold(),
        all_data.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observation::Observation;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_summary_lists_indicator_counts_and_range() {
        let observations = vec![
            Observation {
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                value: 1.0,
                series_id: "GDP".to_string(),
                fetched_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
                indicator: None,
            },
            Observation {
                date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                value: 2.0,
                series_id: "GDP".to_string(),
                fetched_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
                indicator: None,
            },
        ];
        let all_data = vec![IndicatorData {
            name: "GDP data".to_string(),
            observations,
        }];

        let rendered = render_run_summary(&all_data);
        assert!(rendered.contains("GDP data"));
        assert!(rendered.contains("2020-01-01"));
        assert!(rendered.contains("2021-01-01"));
        assert!(rendered.contains("across 1 indicators"));
    }
}
