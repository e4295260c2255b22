use crate::DbError;
use chrono::NaiveDate;
use core_types::{DailyBar, Snapshot, Symbol};
use serde::Serialize;
use sqlx::FromRow;
use sqlx::sqlite::SqlitePool;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

/// What a snapshot load wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub symbols: usize,
    pub bars: usize,
}

/// This struct represents a row fetched from the symbols table.
#[derive(FromRow, Debug, Clone)]
struct DbSymbol {
    symbol: String,
    name: String,
    description: Option<String>,
}

/// This struct represents a row fetched from the stock_daily table.
#[derive(FromRow, Debug, Clone)]
struct DbDailyBar {
    symbol: String,
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<i64>,
}

impl From<DbSymbol> for Symbol {
    fn from(row: DbSymbol) -> Self {
        Symbol {
            symbol: row.symbol,
            name: row.name,
            description: row.description,
        }
    }
}

impl From<DbDailyBar> for DailyBar {
    fn from(row: DbDailyBar) -> Self {
        DailyBar {
            symbol: row.symbol,
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Writes a whole snapshot within a single transaction.
    ///
    /// Rows are upserted on their natural keys, so re-running the load with
    /// the same payload reproduces the same tables, and a key repeated inside
    /// the payload keeps its last occurrence.
    pub async fn upsert_snapshot(&self, snapshot: &Snapshot) -> Result<LoadSummary, DbError> {
        let mut tx = self.pool.begin().await?;

        for symbol in &snapshot.symbols {
            sqlx::query(
                r#"
                INSERT INTO symbols (symbol, name, description)
                VALUES (?1, ?2, ?3)
                ON CONFLICT (symbol) DO UPDATE SET
                    name = excluded.name,
                    description = excluded.description
                "#,
            )
            .bind(&symbol.symbol)
            .bind(&symbol.name)
            .bind(symbol.description.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        for bar in &snapshot.data {
            sqlx::query(
                r#"
                INSERT INTO stock_daily (symbol, date, open, high, low, close, volume)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT (symbol, date) DO UPDATE SET
                    open = excluded.open,
                    high = excluded.high,
                    low = excluded.low,
                    close = excluded.close,
                    volume = excluded.volume
                "#,
            )
            .bind(&bar.symbol)
            .bind(bar.date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let summary = LoadSummary {
            symbols: snapshot.symbols.len(),
            bars: snapshot.data.len(),
        };
        tracing::info!(symbols = summary.symbols, bars = summary.bars, "snapshot stored");
        Ok(summary)
    }

    /// Fetches the symbol directory in insertion order.
    pub async fn fetch_symbols(&self) -> Result<Vec<Symbol>, DbError> {
        let rows = sqlx::query_as::<_, DbSymbol>(
            "SELECT symbol, name, description FROM symbols ORDER BY rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Symbol::from).collect())
    }

    /// Fetches every stored bar, ordered by symbol then date.
    pub async fn fetch_bars(&self) -> Result<Vec<DailyBar>, DbError> {
        let rows = sqlx::query_as::<_, DbDailyBar>(
            r#"
            SELECT symbol, date, open, high, low, close, volume
            FROM stock_daily
            ORDER BY symbol ASC, date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(DailyBar::from).collect())
    }

    /// Counts the stored rows of both tables.
    pub async fn counts(&self) -> Result<LoadSummary, DbError> {
        let (symbols,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM symbols")
            .fetch_one(&self.pool)
            .await?;
        let (bars,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stock_daily")
            .fetch_one(&self.pool)
            .await?;
        Ok(LoadSummary {
            symbols: symbols as usize,
            bars: bars as usize,
        })
    }
}
