mod rest;
mod ws;

pub use rest::RestClient;
pub use ws::WsTransport;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Message source for one pair's depth stream.
#[async_trait]
pub trait FeedTransport: Send {
    /// The next complete wire message; `None` once the stream has ended.
    async fn next_message(&mut self) -> Result<Option<String>, TransportError>;

    /// Send an unsolicited keepalive frame.
    async fn keepalive(&mut self) -> Result<(), TransportError>;

    /// Graceful close: send a close frame and wait briefly for the peer's
    /// acknowledgment.
    async fn close(&mut self) -> Result<(), TransportError>;
}
