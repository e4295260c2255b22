use crate::error::ConfigError;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub snapshot: SnapshotConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Where the durable copy of the dataset lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// A sqlx SQLite URL, e.g. `sqlite://market_data.db`.
    pub database_url: String,
}

/// Where a snapshot payload is fetched from when the dataset is (re)loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// A local JSON file. Takes precedence over any URL.
    pub path: Option<PathBuf>,
    /// An explicit download URL.
    pub url: Option<String>,
    /// Owner of the repository publishing the `data-latest` release asset.
    pub repo_owner: Option<String>,
    pub repo_name: String,
    pub timeout_secs: u64,
}

/// Parameters for the HTTP tool transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://market_data.db".to_string(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            repo_owner: None,
            repo_name: "market-index-mcp".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl SnapshotConfig {
    /// The download URL: the explicit one, or the release asset of the configured repository.
    pub fn resolved_url(&self) -> Option<String> {
        if let Some(url) = &self.url {
            return Some(url.clone());
        }
        self.repo_owner.as_ref().map(|owner| {
            format!(
                "https://github.com/{}/{}/releases/download/data-latest/market_data.json",
                owner, self.repo_name
            )
        })
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Config {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.storage.database_url.starts_with("sqlite:") {
            return Err(ConfigError::Validation(format!(
                "storage.database_url must be a sqlite URL, got '{}'",
                self.storage.database_url
            )));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero".to_string()));
        }
        if self.snapshot.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "snapshot.timeout_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
