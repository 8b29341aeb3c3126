//! Static mapping from indicator display names to FRED series identifiers.

use std::collections::HashMap;

/// Lookup table resolving an indicator name (as it appears in the request
/// definition files) to the FRED series that back it. Built once, never
/// mutated afterwards.
pub struct SeriesCatalog {
    mappings: HashMap<&'static str, Vec<&'static str>>,
}

impl SeriesCatalog {
    pub fn new() -> Self {
        let mappings = HashMap::from([
            ("CPI data", vec!["CPIAUCSL", "CPALTT01USM657N"]),
            ("GDP data", vec!["GDP", "GDPC1"]),
            ("UNRATE data", vec!["UNRATE"]),
            ("Interest Rate data", vec!["INTDSRUSM193", "FEDFUNDS", "DGS10"]),
            ("Consumer Confidence data", vec!["UMCSENT"]),
            ("Housing Starts data", vec!["HOUST"]),
            ("Trade Balance data", vec!["BOPGSTB"]),
            ("Current Account data", vec!["NETEXP"]),
            (
                "Government Debt & Budget Deficit data",
                vec!["GFDEGDQ188S", "FYFSGDA188S"],
            ),
            ("PPI data", vec!["PPIACO"]),
            ("PPI Gold Ore data", vec!["PCU2122212122"]),
            ("Crude Oil data", vec!["DCOILWTICO"]),
            ("S&P 500 data", vec!["SP500"]),
            ("Dow Jones Industrial Average data", vec!["DJIA"]),
            ("NASDAQ Composite data", vec!["NASDAQCOM"]),
            ("Currency Conversions data", vec!["DEXUSEU", "DEXJPUS", "DEXUSUK"]),
        ]);
        SeriesCatalog { mappings }
    }

    /// Series identifiers for an indicator, in fetch order. Unknown names
    /// resolve to an empty list rather than an error.
    pub fn resolve(&self, indicator_name: &str) -> Vec<String> {
        self.mappings
            .get(indicator_name)
            .map(|ids| ids.iter().map(|id| id.to_string()).collect())
            .unwrap_or_default()
    }
}

impl Default for SeriesCatalog {
    fn default() -> Self {
        Self::new()
    }
}
