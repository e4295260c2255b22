use crate::error::DbError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Establishes a connection pool to the SQLite database at `database_url`.
///
/// The file is created if it does not exist yet. An in-memory URL gets a
/// single connection, since every SQLite connection to `:memory:` is its own
/// database.
pub async fn connect(database_url: &str) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|_| DbError::ConnectionConfigError(database_url.to_string()))?
        .create_if_missing(true);

    let max_connections = if is_in_memory(database_url) { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    tracing::debug!(database_url, "database pool ready");
    Ok(pool)
}

/// Applies the embedded migrations, creating the tables on first use.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Whether the database file behind `database_url` already exists on disk.
///
/// Used to decide whether the dataset has to be bootstrapped before serving.
pub fn database_exists(database_url: &str) -> bool {
    database_path(database_url).is_some_and(|path| path.exists())
}

/// The filesystem path of a file-backed SQLite URL.
pub fn database_path(database_url: &str) -> Option<PathBuf> {
    if is_in_memory(database_url) {
        return None;
    }
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() { None } else { Some(PathBuf::from(path)) }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_file_paths() {
        assert_eq!(database_path("sqlite://market_data.db"), Some(PathBuf::from("market_data.db")));
        assert_eq!(
            database_path("sqlite:data/market.db?mode=rwc"),
            Some(PathBuf::from("data/market.db"))
        );
        assert_eq!(database_path("sqlite:///tmp/m.db"), Some(PathBuf::from("/tmp/m.db")));
        assert_eq!(database_path("sqlite::memory:"), None);
    }

    #[tokio::test]
    async fn connect_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("fresh.db").display());
        assert!(!database_exists(&url));

        let pool = connect(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        assert!(database_exists(&url));
    }
}
