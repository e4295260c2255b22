use async_trait::async_trait;
use configuration::SnapshotConfig;
use core_types::Snapshot;
use std::path::PathBuf;
use std::time::Duration;

pub mod bootstrap;
pub mod error;

pub use bootstrap::{bootstrap_if_needed, load_snapshot, needs_bootstrap};
pub use error::SnapshotError;

/// The abstract source of a snapshot payload.
///
/// The loader only needs "give me the payload"; whether it comes from disk or
/// from a published release asset is a deployment detail.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetches and parses the whole payload.
    async fn fetch(&self) -> Result<Snapshot, SnapshotError>;

    /// A short human readable description for logs.
    fn describe(&self) -> String;
}

/// Reads the payload from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    async fn fetch(&self) -> Result<Snapshot, SnapshotError> {
        let bytes = tokio::fs::read(&self.path).await?;
        parse_snapshot(&bytes)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Downloads the payload over HTTP(S).
#[derive(Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SnapshotError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<Snapshot, SnapshotError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SnapshotError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        parse_snapshot(&bytes)
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

/// Parses a snapshot payload.
pub fn parse_snapshot(bytes: &[u8]) -> Result<Snapshot, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_slice(bytes)?;
    tracing::debug!(
        symbols = snapshot.symbols.len(),
        bars = snapshot.data.len(),
        "snapshot parsed"
    );
    Ok(snapshot)
}

/// Picks the source named by the configuration: a local file first, then a URL.
pub fn source_from_config(
    config: &SnapshotConfig,
) -> Result<Box<dyn SnapshotSource>, SnapshotError> {
    if let Some(path) = &config.path {
        return Ok(Box::new(FileSnapshotSource::new(path.clone())));
    }
    let url = config.resolved_url().ok_or(SnapshotError::NotConfigured)?;
    let source = HttpSnapshotSource::new(url, Duration::from_secs(config.timeout_secs))?;
    Ok(Box::new(source))
}
