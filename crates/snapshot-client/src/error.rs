use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to download the snapshot: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Snapshot download from {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read the snapshot file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse the snapshot payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to store the snapshot: {0}")]
    Database(#[from] database::DbError),

    #[error("No snapshot source configured: set snapshot.path, snapshot.url or snapshot.repo_owner")]
    NotConfigured,
}
