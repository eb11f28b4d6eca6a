use std::time::Duration;

use async_trait::async_trait;

use crate::sync::{DepthSnapshot, SnapshotFetchError, SnapshotFetcher};

/// REST client for the exchange's per-symbol depth snapshot endpoint.
///
/// Every request carries a timeout: the gap-triggered re-fetch runs on the
/// ingestion loop, and an unbounded stall there would stop the loop from
/// observing shutdown or sending keepalives.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SnapshotFetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SnapshotFetchError::Transport(e.to_string()))?;
        Ok(RestClient {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl SnapshotFetcher for RestClient {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<DepthSnapshot, SnapshotFetchError> {
        let url = format!(
            "{}/fapi/v1/depth?symbol={}&limit=1000",
            self.base_url,
            symbol.to_uppercase()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SnapshotFetchError::Transport(e.to_string()))?;

        response
            .json::<DepthSnapshot>()
            .await
            .map_err(|e| SnapshotFetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_fetch_times_out_on_stalled_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept the request, then hold the connection open without
            // ever answering.
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                std::future::pending::<()>().await;
            }
        });

        let client =
            RestClient::new(format!("http://{addr}"), Duration::from_millis(100)).unwrap();
        let err = client.fetch_snapshot("btcusdt").await.unwrap_err();
        assert!(matches!(err, SnapshotFetchError::Transport(_)));
    }
}
