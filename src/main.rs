use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bookfeed::config::{self, FeedConfig};
use bookfeed::indicator::IndicatorSampler;
use bookfeed::supervisor::FeedSupervisor;
use bookfeed::sync::SyncEngine;
use bookfeed::transport::{RestClient, WsTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("bookfeed=info".parse()?))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "bookfeed.json".to_string());
    let config = config::load_config(&path)?;
    tracing::info!(pairs = ?config.pairs, "starting feed");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut pairs = Vec::new();
    for symbol in &config.pairs {
        pairs.push(tokio::spawn(run_pair(
            symbol.clone(),
            config.clone(),
            shutdown_rx.clone(),
        )));
    }
    for handle in pairs {
        let _ = handle.await;
    }

    Ok(())
}

/// One pair's whole lifecycle. Failures here end only this pair.
async fn run_pair(symbol: String, config: FeedConfig, shutdown: watch::Receiver<bool>) {
    let transport = match WsTransport::connect(&config.stream_url(&symbol)).await {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!(symbol = %symbol, error = %e, "dial failed, pair not started");
            return;
        }
    };

    let fetcher = match RestClient::new(config.rest_url.clone(), config.snapshot_timeout()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::error!(symbol = %symbol, error = %e, "rest client init failed, pair not started");
            return;
        }
    };
    let engine = match SyncEngine::new(symbol.clone(), fetcher).await {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(symbol = %symbol, error = %e, "snapshot fetch failed, pair not started");
            return;
        }
    };

    let sampler = IndicatorSampler::new(config.indicator_window);
    FeedSupervisor::new(symbol, transport, engine, sampler, &config)
        .run(shutdown)
        .await;
}
