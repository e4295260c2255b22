use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tradable index or instrument known to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// The short identifier, e.g. `^GSPC`.
    pub symbol: String,
    /// The human readable display name.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One day of open/high/low/close/volume data for a symbol.
///
/// Keyed by `(symbol, date)`; the store never holds two bars with the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Absent for some index feeds.
    #[serde(default)]
    pub volume: Option<i64>,
}

/// The portable payload produced by the upstream export and consumed by the loader.
///
/// Rows may arrive unsorted and may repeat a key; consumers apply
/// last-write-wins on `symbol` and on `(symbol, date)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub data: Vec<DailyBar>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_parses_export_payload() {
        let payload = r#"{
            "symbols": [
                {"symbol": "^GSPC", "name": "S&P 500", "description": "US large caps", "id": 1},
                {"symbol": "^N225", "name": "Nikkei 225"}
            ],
            "data": [
                {"symbol": "^GSPC", "date": "2020-01-02", "open": 3244.67, "high": 3258.14,
                 "low": 3235.53, "close": 3257.85, "volume": 3458250000},
                {"symbol": "^N225", "date": "2020-01-06", "open": 23319.76, "high": 23365.36,
                 "low": 23148.53, "close": 23204.86, "volume": null}
            ]
        }"#;

        let snapshot: Snapshot = serde_json::from_str(payload).unwrap();

        assert_eq!(snapshot.symbols.len(), 2);
        assert_eq!(snapshot.symbols[1].description, None);
        assert_eq!(snapshot.data[0].date, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(snapshot.data[0].volume, Some(3_458_250_000));
        assert_eq!(snapshot.data[1].volume, None);
    }

    #[test]
    fn snapshot_rejects_malformed_bar_date() {
        let payload = r#"{"symbols": [], "data": [
            {"symbol": "X", "date": "2020-02-30", "open": 1, "high": 1, "low": 1, "close": 1}
        ]}"#;

        assert!(serde_json::from_str::<Snapshot>(payload).is_err());
    }
}
