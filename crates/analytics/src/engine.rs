use crate::error::QueryError;
use crate::report::{
    DailyMove, Outcome, PriceOnDate, PriceRange, SymbolComparison, SymbolInfo, YearlySummary,
};
use chrono::NaiveDate;
use core_types::{parse_date, parse_year, pct_change, validate_symbol, year_bounds};
use std::cmp::Ordering;
use std::sync::Arc;
use timeseries::{DailyChange, Extreme, StoreHandle, TimeSeriesStore};

/// Number of days returned by the best/worst rankings when the caller does not say.
pub const DEFAULT_DAY_LIMIT: i64 = 5;

/// Which end of the change distribution a ranking starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    Worst,
    Best,
}

/// The read-only analytical query engine.
///
/// Every operation is a pure function of the store current at the time of
/// the call. An operation takes one `Arc` of the store up front, so a reload
/// in the middle of a call (or of a `compare_symbols` batch) is never observed.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: StoreHandle,
}

impl QueryEngine {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    fn store(&self) -> Result<Arc<TimeSeriesStore>, QueryError> {
        Ok(self.store.current()?)
    }

    /// The symbol directory in its stable order.
    pub fn list_symbols(&self) -> Result<Vec<SymbolInfo>, QueryError> {
        let store = self.store()?;
        Ok(store
            .list_symbols()
            .iter()
            .map(|s| SymbolInfo {
                symbol: s.symbol.clone(),
                name: s.name.clone(),
                description: s.description.clone(),
            })
            .collect())
    }

    /// Min/max/average close and the dates of the extremes over `[start_date, end_date]`.
    pub fn get_price_range(
        &self,
        symbol: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Outcome<PriceRange>, QueryError> {
        let symbol = validate_symbol(symbol)?;
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        tracing::debug!(symbol, %start, %end, "get_price_range");

        let store = self.store()?;
        Outcome::settle(price_range(&store, symbol, start, end))
    }

    /// The stored bar on an exact date.
    pub fn get_price_on_date(
        &self,
        symbol: &str,
        date: &str,
    ) -> Result<Outcome<PriceOnDate>, QueryError> {
        let symbol = validate_symbol(symbol)?;
        let date = parse_date(date)?;
        tracing::debug!(symbol, %date, "get_price_on_date");

        let store = self.store()?;
        let result = store
            .bar(symbol, date)
            .map(|bar| PriceOnDate {
                symbol: bar.symbol.clone(),
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            })
            .ok_or_else(|| QueryError::NotFound(format!("no data: {symbol} on {date}")));
        Outcome::settle(result)
    }

    /// Price range statistics plus period return for each symbol, in input order.
    ///
    /// A symbol without data (or with a malformed identifier) yields an error
    /// entry; it never fails the batch.
    pub fn compare_symbols<S>(
        &self,
        symbols: &[S],
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<Outcome<SymbolComparison>>, QueryError>
    where
        S: AsRef<str>,
    {
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;
        tracing::debug!(symbols = symbols.len(), %start, %end, "compare_symbols");

        let store = self.store()?;
        let entries = symbols
            .iter()
            .map(|symbol| {
                let result = validate_symbol(symbol.as_ref())
                    .map_err(QueryError::from)
                    .and_then(|symbol| {
                        let range = price_range(&store, symbol, start, end)?;
                        Ok(SymbolComparison {
                            return_pct: period_return(&store, symbol, start, end),
                            range,
                        })
                    });
                Outcome::degrade(result)
            })
            .collect();
        Ok(entries)
    }

    /// The largest day-over-day declines of a calendar year, most negative first.
    pub fn get_worst_days(
        &self,
        symbol: &str,
        year: i64,
        limit: i64,
    ) -> Result<Vec<DailyMove>, QueryError> {
        self.ranked_days(symbol, year, limit, Ranking::Worst)
    }

    /// The largest day-over-day gains of a calendar year, most positive first.
    pub fn get_best_days(
        &self,
        symbol: &str,
        year: i64,
        limit: i64,
    ) -> Result<Vec<DailyMove>, QueryError> {
        self.ranked_days(symbol, year, limit, Ranking::Best)
    }

    /// Ranks the stored-bar-to-stored-bar changes of a year. Ties go to the earliest date.
    pub fn ranked_days(
        &self,
        symbol: &str,
        year: i64,
        limit: i64,
        ranking: Ranking,
    ) -> Result<Vec<DailyMove>, QueryError> {
        let symbol = validate_symbol(symbol)?;
        let year = parse_year(year)?;
        if limit < 1 {
            return Err(QueryError::InvalidArgument(format!(
                "invalid limit {limit}: must be at least 1"
            )));
        }
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let (start, end) = year_bounds(year)?;
        tracing::debug!(symbol, year, limit, ?ranking, "ranked_days");

        let store = self.store()?;
        let mut changes: Vec<DailyChange> = store.daily_changes(symbol, start, end).collect();
        changes.sort_by(|a, b| rank_order(a, b, ranking));
        changes.truncate(limit);

        Ok(changes
            .into_iter()
            .map(|c| DailyMove {
                date: c.date,
                close: c.close,
                change_pct: c.change_pct,
            })
            .collect())
    }

    /// Start/end close, return and close statistics of one calendar year.
    ///
    /// Start and end closes come from bars inside the year only, so a year
    /// without bars reports them as `None` even when neighbouring years have
    /// data. Missing pieces are reported as `None`; the call itself only fails
    /// on bad arguments.
    pub fn get_yearly_summary(&self, symbol: &str, year: i64) -> Result<YearlySummary, QueryError> {
        let symbol = validate_symbol(symbol)?;
        let year = parse_year(year)?;
        let (start, end) = year_bounds(year)?;
        tracing::debug!(symbol, year, "get_yearly_summary");

        let store = self.store()?;
        let start_price = store
            .first_close_on_or_after(symbol, start)
            .filter(|c| c.date <= end);
        let end_price = store
            .last_close_on_or_before(symbol, end)
            .filter(|c| c.date >= start);
        let yearly_return_pct = match (start_price, end_price) {
            (Some(first), Some(last)) => pct_change(first.close, last.close),
            _ => None,
        };
        let stats = store.range_stats(symbol, start, end);

        Ok(YearlySummary {
            symbol: symbol.to_string(),
            year,
            start_price: start_price.map(|c| c.close),
            end_price: end_price.map(|c| c.close),
            yearly_return_pct,
            min_price: stats.map(|s| s.min_close),
            max_price: stats.map(|s| s.max_close),
            avg_price: stats.map(|s| s.avg_close),
            trading_days: stats.map_or(0, |s| s.count),
        })
    }
}

fn price_range(
    store: &TimeSeriesStore,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceRange, QueryError> {
    let no_data = || QueryError::NotFound(format!("no data: {symbol} ({start} ~ {end})"));

    let stats = store.range_stats(symbol, start, end).ok_or_else(no_data)?;
    let min = store
        .extreme_date(symbol, start, end, Extreme::Min)
        .ok_or_else(no_data)?;
    let max = store
        .extreme_date(symbol, start, end, Extreme::Max)
        .ok_or_else(no_data)?;

    Ok(PriceRange {
        symbol: symbol.to_string(),
        name: store.symbol_name(symbol).to_string(),
        period: format!("{start} ~ {end}"),
        min_price: stats.min_close,
        min_date: min.date,
        max_price: stats.max_close,
        max_date: max.date,
        avg_price: stats.avg_close,
        trading_days: stats.count,
    })
}

/// Return between the first close on or after `start` and the last close on or before `end`.
fn period_return(
    store: &TimeSeriesStore,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Option<f64> {
    let first = store.first_close_on_or_after(symbol, start)?;
    let last = store.last_close_on_or_before(symbol, end)?;
    pct_change(first.close, last.close)
}

fn rank_order(a: &DailyChange, b: &DailyChange, ranking: Ranking) -> Ordering {
    let by_change = match ranking {
        Ranking::Worst => a.change_pct.total_cmp(&b.change_pct),
        Ranking::Best => b.change_pct.total_cmp(&a.change_pct),
    };
    by_change.then_with(|| a.date.cmp(&b.date))
}
