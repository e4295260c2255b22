use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{LoggingConfig, ServerConfig, SnapshotConfig, StorageConfig};

/// Prefix of environment overrides, e.g. `MARKET_INDEX__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "MARKET_INDEX";

/// Loads the application configuration.
///
/// Reads the given TOML file if it exists, layers `MARKET_INDEX__*`
/// environment variables on top, deserializes into our strongly-typed
/// `Config` and validates it. Every key has a default, so a missing file is
/// not an error.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.storage.database_url, "sqlite://market_data.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[storage]
database_url = "sqlite:///var/lib/market/market_data.db"

[snapshot]
path = "market_data.json"
timeout_secs = 5

[server]
host = "0.0.0.0"
port = 8080
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.storage.database_url, "sqlite:///var/lib/market/market_data.db");
        assert_eq!(config.snapshot.path.as_deref(), Some(Path::new("market_data.json")));
        assert_eq!(config.snapshot.timeout_secs, 5);
        assert_eq!(config.server.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 0").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Validation(_))));
    }
}
