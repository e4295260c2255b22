use crate::error::StoreError;
use crate::store::TimeSeriesStore;
use database::DbRepository;

/// Builds a fresh store from the durable tables.
pub async fn load_store(repo: &DbRepository) -> Result<TimeSeriesStore, StoreError> {
    let symbols = repo.fetch_symbols().await?;
    let bars = repo.fetch_bars().await?;
    Ok(TimeSeriesStore::build(symbols, bars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{DailyBar, Snapshot, Symbol};
    use database::{connect, run_migrations};

    fn snapshot() -> Snapshot {
        let bar = |date: &str, close: f64| DailyBar {
            symbol: "^GSPC".into(),
            date: date.parse().unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: Some(100),
        };
        Snapshot {
            symbols: vec![Symbol {
                symbol: "^GSPC".into(),
                name: "S&P 500".into(),
                description: None,
            }],
            data: vec![bar("2020-01-03", 3234.85), bar("2020-01-02", 3257.85)],
        }
    }

    #[tokio::test]
    async fn database_round_trip_matches_direct_build() {
        let pool = connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = DbRepository::new(pool);

        repo.upsert_snapshot(&snapshot()).await.unwrap();
        let first = load_store(&repo).await.unwrap();
        repo.upsert_snapshot(&snapshot()).await.unwrap();
        let second = load_store(&repo).await.unwrap();

        assert_eq!(first, TimeSeriesStore::from_snapshot(&snapshot()));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_database_gives_empty_store() {
        let pool = connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = load_store(&DbRepository::new(pool)).await.unwrap();
        assert_eq!(store.symbol_count(), 0);
        assert_eq!(store.bar_count(), 0);
    }
}
