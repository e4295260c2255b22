use chrono::NaiveDate;
use core_types::{DailyBar, Snapshot, Symbol, mean_2dp, pct_change};
use std::collections::btree_map::{self, BTreeMap};
use std::collections::HashMap;

/// The immutable, indexed collection of daily bars plus the symbol directory.
///
/// Bars are held per symbol in a `BTreeMap` keyed by date, which gives the
/// ordered range scans and the nearest-at-or-before/after lookups every query
/// is built on. A store is never mutated after construction; reloading means
/// building a new one and swapping it in through a [`crate::StoreHandle`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TimeSeriesStore {
    symbols: Vec<Symbol>,
    directory: HashMap<String, usize>,
    series: HashMap<String, BTreeMap<NaiveDate, DailyBar>>,
}

/// Close price statistics over a date range with at least one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeStats {
    pub min_close: f64,
    pub max_close: f64,
    /// Rounded to two decimals.
    pub avg_close: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

/// A close price and the date it was recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// The close-to-close move of one stored bar relative to the previous stored bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyChange {
    pub date: NaiveDate,
    pub close: f64,
    /// Rounded to two decimals.
    pub change_pct: f64,
}

impl TimeSeriesStore {
    /// Builds a store from loose rows.
    ///
    /// A symbol or `(symbol, date)` key that appears more than once keeps its
    /// last occurrence. Directory order is the order of first appearance.
    pub fn build<S, B>(symbols: S, bars: B) -> Self
    where
        S: IntoIterator<Item = Symbol>,
        B: IntoIterator<Item = DailyBar>,
    {
        let mut store = Self::default();

        for symbol in symbols {
            match store.directory.get(&symbol.symbol) {
                Some(&idx) => store.symbols[idx] = symbol,
                None => {
                    store.directory.insert(symbol.symbol.clone(), store.symbols.len());
                    store.symbols.push(symbol);
                }
            }
        }

        for bar in bars {
            store
                .series
                .entry(bar.symbol.clone())
                .or_default()
                .insert(bar.date, bar);
        }

        let orphaned = store
            .series
            .keys()
            .filter(|id| !store.directory.contains_key(*id))
            .count();
        if orphaned > 0 {
            tracing::warn!(orphaned, "bars reference symbols missing from the directory");
        }
        tracing::debug!(
            symbols = store.symbols.len(),
            bars = store.bar_count(),
            "time series store built"
        );
        store
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::build(snapshot.symbols.iter().cloned(), snapshot.data.iter().cloned())
    }

    /// The symbol directory, in stable insertion order.
    pub fn list_symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbol(&self, id: &str) -> Option<&Symbol> {
        self.directory.get(id).map(|&idx| &self.symbols[idx])
    }

    /// The display name of a symbol, or the identifier itself when unknown.
    pub fn symbol_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.symbol(id).map_or(id, |s| s.name.as_str())
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn bar_count(&self) -> usize {
        self.series.values().map(BTreeMap::len).sum()
    }

    /// The bars of `id` with a date in `[start, end]`, oldest first.
    ///
    /// An inverted range is simply empty.
    pub fn bars(&self, id: &str, start: NaiveDate, end: NaiveDate) -> Bars<'_> {
        let inner = if start <= end {
            self.series.get(id).map(|series| series.range(start..=end))
        } else {
            None
        };
        Bars { inner }
    }

    /// Min, max and rounded mean close over `[start, end]`; `None` when no bar falls in range.
    pub fn range_stats(&self, id: &str, start: NaiveDate, end: NaiveDate) -> Option<RangeStats> {
        let mut count = 0;
        let mut min_close = f64::INFINITY;
        let mut max_close = f64::NEG_INFINITY;
        for bar in self.bars(id, start, end) {
            count += 1;
            min_close = min_close.min(bar.close);
            max_close = max_close.max(bar.close);
        }
        if count == 0 {
            return None;
        }
        let avg_close = mean_2dp(self.bars(id, start, end).map(|bar| bar.close))?;
        Some(RangeStats {
            min_close,
            max_close,
            avg_close,
            count,
        })
    }

    /// The first bar in `[start, end]` achieving the extreme close; ties go to the earliest date.
    pub fn extreme_date(
        &self,
        id: &str,
        start: NaiveDate,
        end: NaiveDate,
        which: Extreme,
    ) -> Option<DatedClose> {
        let mut best: Option<DatedClose> = None;
        for bar in self.bars(id, start, end) {
            let better = match (best, which) {
                (None, _) => true,
                (Some(b), Extreme::Min) => bar.close < b.close,
                (Some(b), Extreme::Max) => bar.close > b.close,
            };
            if better {
                best = Some(DatedClose {
                    date: bar.date,
                    close: bar.close,
                });
            }
        }
        best
    }

    pub fn bar(&self, id: &str, date: NaiveDate) -> Option<&DailyBar> {
        self.series.get(id)?.get(&date)
    }

    /// The earliest bar dated on or after `date`.
    pub fn first_close_on_or_after(&self, id: &str, date: NaiveDate) -> Option<DatedClose> {
        self.series
            .get(id)?
            .range(date..)
            .next()
            .map(|(date, bar)| DatedClose {
                date: *date,
                close: bar.close,
            })
    }

    /// The latest bar dated on or before `date`.
    pub fn last_close_on_or_before(&self, id: &str, date: NaiveDate) -> Option<DatedClose> {
        self.series
            .get(id)?
            .range(..=date)
            .next_back()
            .map(|(date, bar)| DatedClose {
                date: *date,
                close: bar.close,
            })
    }

    /// Day-over-day changes in `[start, end]`, computed lazily between
    /// consecutive *stored* bars.
    ///
    /// Calendar gaps are not filled: the bar after a holiday is compared with
    /// the last bar before it. The first bar of the range has no predecessor
    /// and is not yielded.
    pub fn daily_changes(&self, id: &str, start: NaiveDate, end: NaiveDate) -> DailyChanges<'_> {
        DailyChanges {
            bars: self.bars(id, start, end),
            prev_close: None,
        }
    }
}

/// Iterator over a date range of one symbol's bars.
#[derive(Debug, Clone)]
pub struct Bars<'a> {
    inner: Option<btree_map::Range<'a, NaiveDate, DailyBar>>,
}

impl<'a> Iterator for Bars<'a> {
    type Item = &'a DailyBar;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next().map(|(_, bar)| bar)
    }
}

impl DoubleEndedIterator for Bars<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next_back().map(|(_, bar)| bar)
    }
}

/// Single pass over a range carrying the previous close.
#[derive(Debug, Clone)]
pub struct DailyChanges<'a> {
    bars: Bars<'a>,
    prev_close: Option<f64>,
}

impl Iterator for DailyChanges<'_> {
    type Item = DailyChange;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let bar = self.bars.next()?;
            let Some(prev_close) = self.prev_close.replace(bar.close) else {
                continue;
            };
            // A zero previous close has no defined percentage move.
            if let Some(change_pct) = pct_change(prev_close, bar.close) {
                return Some(DailyChange {
                    date: bar.date,
                    close: bar.close,
                    change_pct,
                });
            }
        }
    }
}
