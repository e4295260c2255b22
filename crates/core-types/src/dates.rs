//! Argument checks shared by every query.
//!
//! Dates are accepted only in the strict, zero padded `YYYY-MM-DD` form so that
//! the textual period echoed back to callers is exactly what they sent.

use crate::error::CoreError;
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_SYMBOL_LEN: usize = 32;

/// Parses a calendar date in strict `YYYY-MM-DD` form.
pub fn parse_date(input: &str) -> Result<NaiveDate, CoreError> {
    let well_shaped = input.len() == 10
        && input.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_shaped {
        return Err(CoreError::InvalidDate(input.to_string()));
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(input.to_string()))
}

/// Accepts a 4-digit calendar year.
pub fn parse_year(year: i64) -> Result<i32, CoreError> {
    if (1000..=9999).contains(&year) {
        Ok(year as i32)
    } else {
        Err(CoreError::InvalidYear(year))
    }
}

/// Expands a year into the literal inclusive range `[year-01-01, year-12-31]`.
pub fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), CoreError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(CoreError::InvalidYear(year.into()))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or(CoreError::InvalidYear(year.into()))?;
    Ok((start, end))
}

/// Rejects identifiers that cannot possibly name a symbol.
///
/// Unknown but well-formed identifiers pass; whether they have data is a
/// question for the store.
pub fn validate_symbol(symbol: &str) -> Result<&str, CoreError> {
    let bad = symbol.is_empty()
        || symbol.chars().count() > MAX_SYMBOL_LEN
        || symbol.chars().any(|c| c.is_whitespace() || c.is_control());
    if bad {
        tracing::debug!(symbol, "rejected symbol argument");
        return Err(CoreError::InvalidSymbol(symbol.to_string()));
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_dates() {
        assert_eq!(parse_date("2020-01-02").unwrap(), NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        for input in [
            "",
            "2020-1-2",
            "2020/01/02",
            "20200102",
            "2023-02-29",
            "2020-13-01",
            "2020-01-02T00:00",
            " 2020-01-02",
        ] {
            let expected = Err(CoreError::InvalidDate(input.to_string()));
            assert_eq!(parse_date(input), expected, "{input:?}");
        }
    }

    #[test]
    fn year_must_have_four_digits() {
        assert_eq!(parse_year(2020), Ok(2020));
        assert_eq!(parse_year(999), Err(CoreError::InvalidYear(999)));
        assert_eq!(parse_year(10000), Err(CoreError::InvalidYear(10000)));
        assert_eq!(parse_year(-2020), Err(CoreError::InvalidYear(-2020)));
    }

    #[test]
    fn year_bounds_are_literal_calendar_edges() {
        let (start, end) = year_bounds(2021).unwrap();
        assert_eq!(start.to_string(), "2021-01-01");
        assert_eq!(end.to_string(), "2021-12-31");
    }

    #[test]
    fn symbol_format() {
        assert_eq!(validate_symbol("^GSPC"), Ok("^GSPC"));
        assert_eq!(validate_symbol("NOT-LOADED"), Ok("NOT-LOADED"));
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol("^GS PC").is_err());
        assert!(validate_symbol("A\n").is_err());
        assert!(validate_symbol(&"X".repeat(33)).is_err());
    }
}
