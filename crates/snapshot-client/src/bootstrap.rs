//! First-run population of the local database.

use crate::SnapshotSource;
use crate::error::SnapshotError;
use database::{DbRepository, LoadSummary};

/// True when the database was just created or holds no bars yet.
pub async fn needs_bootstrap(repo: &DbRepository, fresh: bool) -> Result<bool, SnapshotError> {
    Ok(fresh || repo.counts().await?.bars == 0)
}

/// Fetches one snapshot from `source` and upserts it in a single transaction.
pub async fn load_snapshot(
    source: &dyn SnapshotSource,
    repo: &DbRepository,
) -> Result<LoadSummary, SnapshotError> {
    let description = source.describe();
    tracing::info!(source = %description, "fetching snapshot");
    let snapshot = source.fetch().await?;

    let summary = repo.upsert_snapshot(&snapshot).await?;
    tracing::info!(symbols = summary.symbols, bars = summary.bars, "snapshot stored");
    Ok(summary)
}

/// Loads a snapshot when [`needs_bootstrap`] says so.
///
/// The source is only resolved once a load is actually needed, so a
/// populated database keeps working without any snapshot configuration.
/// Returns `None` when the database was left untouched.
pub async fn bootstrap_if_needed<F>(
    repo: &DbRepository,
    fresh: bool,
    source: F,
) -> Result<Option<LoadSummary>, SnapshotError>
where
    F: FnOnce() -> Result<Box<dyn SnapshotSource>, SnapshotError>,
{
    if !needs_bootstrap(repo, fresh).await? {
        tracing::debug!("local database already holds bars, skipping the first-run load");
        return Ok(None);
    }
    tracing::info!(fresh, "local database is empty, loading the configured snapshot");
    let source = source()?;
    load_snapshot(source.as_ref(), repo).await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileSnapshotSource;
    use std::io::Write;

    const PAYLOAD: &str = r#"{
        "symbols": [{"symbol": "^GSPC", "name": "S&P 500"}],
        "data": [
            {"symbol": "^GSPC", "date": "2020-01-02", "open": 1.0, "high": 2.0,
             "low": 0.5, "close": 1.5, "volume": 10},
            {"symbol": "^GSPC", "date": "2020-01-03", "open": 1.5, "high": 2.5,
             "low": 1.0, "close": 2.0, "volume": null}
        ]
    }"#;

    async fn repository() -> DbRepository {
        let pool = database::connect("sqlite::memory:").await.unwrap();
        database::run_migrations(&pool).await.unwrap();
        DbRepository::new(pool)
    }

    fn payload_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PAYLOAD.as_bytes()).unwrap();
        file
    }

    fn file_source(
        file: &tempfile::NamedTempFile,
    ) -> impl FnOnce() -> Result<Box<dyn SnapshotSource>, SnapshotError> + '_ {
        move || Ok(Box::new(FileSnapshotSource::new(file.path())) as Box<dyn SnapshotSource>)
    }

    #[tokio::test]
    async fn fresh_database_is_loaded() {
        let repo = repository().await;
        let file = payload_file();

        let summary = bootstrap_if_needed(&repo, true, file_source(&file)).await.unwrap();

        let summary = summary.unwrap();
        assert_eq!((summary.symbols, summary.bars), (1, 2));
        assert_eq!(repo.counts().await.unwrap().bars, 2);
    }

    #[tokio::test]
    async fn existing_database_without_bars_is_loaded() {
        let repo = repository().await;
        let file = payload_file();
        assert!(needs_bootstrap(&repo, false).await.unwrap());

        let summary = bootstrap_if_needed(&repo, false, file_source(&file)).await.unwrap();

        assert_eq!(summary.map(|s| s.bars), Some(2));
        assert!(!needs_bootstrap(&repo, false).await.unwrap());
    }

    #[tokio::test]
    async fn populated_database_is_left_alone() {
        let repo = repository().await;
        let file = payload_file();
        bootstrap_if_needed(&repo, true, file_source(&file)).await.unwrap();

        // Without any source configured, resolving one would fail.
        let summary = bootstrap_if_needed(&repo, false, || Err(SnapshotError::NotConfigured))
            .await
            .unwrap();

        assert!(summary.is_none());
        assert_eq!(repo.counts().await.unwrap().bars, 2);
    }

    #[tokio::test]
    async fn missing_source_fails_the_first_run() {
        let repo = repository().await;
        let result = bootstrap_if_needed(&repo, true, || Err(SnapshotError::NotConfigured)).await;
        assert!(matches!(result, Err(SnapshotError::NotConfigured)));
    }
}
