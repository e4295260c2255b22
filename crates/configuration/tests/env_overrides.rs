//! Environment overrides mutate process-wide state, so they live in their
//! own test binary with a single test.

use configuration::load_config;

const PORT_VAR: &str = "MARKET_INDEX__SERVER__PORT";
const DATABASE_VAR: &str = "MARKET_INDEX__STORAGE__DATABASE_URL";

#[test]
fn environment_overrides_file_and_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market-index.toml");
    std::fs::write(&path, "[server]\nport = 8080\n").unwrap();

    // SAFETY: this binary runs no other test, so nothing reads the
    // environment concurrently.
    unsafe {
        std::env::set_var(PORT_VAR, "8181");
        std::env::set_var(DATABASE_VAR, "sqlite://override.db");
    }

    let from_file = load_config(&path);
    let from_defaults = load_config(&dir.path().join("absent.toml"));

    unsafe {
        std::env::remove_var(PORT_VAR);
        std::env::remove_var(DATABASE_VAR);
    }

    let config = from_file.unwrap();
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.storage.database_url, "sqlite://override.db");

    let config = from_defaults.unwrap();
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.storage.database_url, "sqlite://override.db");
    assert_eq!(config.logging.level, "info");
}
