use crate::error::QueryError;
use chrono::NaiveDate;
use serde::Serialize;

/// The structured result of an operation that may find no data.
///
/// Serialises either as the payload itself or as `{"error": "..."}`, so a
/// caller can tell the two apart by the presence of the `error` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Data(T),
    Error(ErrorBody),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl<T> Outcome<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error(ErrorBody {
            error: message.into(),
        })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Data(data) => Some(data),
            Outcome::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Outcome::Data(_) => None,
            Outcome::Error(body) => Some(&body.error),
        }
    }

    /// Folds `NotFound` into the result; every other error still rejects the call.
    pub(crate) fn settle(result: Result<T, QueryError>) -> Result<Self, QueryError> {
        match result {
            Ok(data) => Ok(Outcome::Data(data)),
            Err(QueryError::NotFound(message)) => Ok(Outcome::error(message)),
            Err(err) => Err(err),
        }
    }

    /// Folds any error into the result, for one entry of a batch.
    pub(crate) fn degrade(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(data) => Outcome::Data(data),
            Err(err) => Outcome::error(err.to_string()),
        }
    }
}

/// One entry of the symbol directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub name: String,
    pub description: Option<String>,
}

/// Close price statistics of one symbol over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRange {
    pub symbol: String,
    pub name: String,
    /// `"<start> ~ <end>"`.
    pub period: String,
    pub min_price: f64,
    pub min_date: NaiveDate,
    pub max_price: f64,
    pub max_date: NaiveDate,
    pub avg_price: f64,
    pub trading_days: usize,
}

/// The stored bar of one symbol on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceOnDate {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}

/// A [`PriceRange`] with the period return, as reported by `compare_symbols`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolComparison {
    #[serde(flatten)]
    pub range: PriceRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_pct: Option<f64>,
}

/// One ranked day-over-day move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMove {
    pub date: NaiveDate,
    pub close: f64,
    pub change_pct: f64,
}

/// A calendar year at a glance. Fields without underlying data are `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySummary {
    pub symbol: String,
    pub year: i32,
    pub start_price: Option<f64>,
    pub end_price: Option<f64>,
    pub yearly_return_pct: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub avg_price: Option<f64>,
    pub trading_days: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_outcome_has_only_the_error_field() {
        let outcome: Outcome<PriceOnDate> = Outcome::error("no data: X on 2020-01-01");
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"error": "no data: X on 2020-01-01"})
        );
    }

    #[test]
    fn comparison_flattens_range_and_omits_missing_return() {
        let range = PriceRange {
            symbol: "A".into(),
            name: "Alpha".into(),
            period: "2020-01-01 ~ 2020-01-31".into(),
            min_price: 1.0,
            min_date: "2020-01-02".parse().unwrap(),
            max_price: 2.0,
            max_date: "2020-01-03".parse().unwrap(),
            avg_price: 1.5,
            trading_days: 2,
        };
        let with_return = SymbolComparison { range: range.clone(), return_pct: Some(100.0) };
        let without = SymbolComparison { range, return_pct: None };

        let value = serde_json::to_value(Outcome::Data(with_return)).unwrap();
        assert_eq!(value["min_date"], json!("2020-01-02"));
        assert_eq!(value["return_pct"], json!(100.0));
        assert!(serde_json::to_value(without).unwrap().get("return_pct").is_none());
    }

    #[test]
    fn settle_only_absorbs_not_found() {
        let found = Outcome::<u8>::settle(Err(QueryError::NotFound("gone".into()))).unwrap();
        assert_eq!(found.error_message(), Some("gone"));
        assert!(Outcome::<u8>::settle(Err(QueryError::InvalidArgument("bad".into()))).is_err());
        let degraded = Outcome::degrade(Err::<u8, _>(QueryError::InvalidArgument("bad".into())));
        assert_eq!(degraded.error_message(), Some("bad"));
    }
}
