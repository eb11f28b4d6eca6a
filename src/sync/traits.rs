use async_trait::async_trait;
use thiserror::Error;

use super::events::DepthSnapshot;

#[derive(Debug, Error)]
pub enum SnapshotFetchError {
    #[error("snapshot request failed: {0}")]
    Transport(String),
    #[error("snapshot decode failed: {0}")]
    Decode(String),
}

/// Capability to fetch a full depth snapshot for one symbol.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<DepthSnapshot, SnapshotFetchError>;
}
