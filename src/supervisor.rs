use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant};

use crate::config::FeedConfig;
use crate::indicator::IndicatorSampler;
use crate::sync::{decode_frame, ApplyOutcome, SnapshotFetcher, SyncEngine};
use crate::transport::FeedTransport;

/// Two-sided touch handed from the ingestion loop to the sampling task.
#[derive(Debug, Clone, Copy)]
pub struct TouchSample {
    pub best_bid: Decimal,
    pub best_ask: Decimal,
}

enum Step {
    Message(String),
    StreamEnded,
    Keepalive,
    Shutdown,
    Continue,
}

/// Runs one pair end to end: ingestion, indicator sampling and keepalive.
///
/// The pair's book and engine belong exclusively to the ingestion loop and
/// the sampler belongs exclusively to the sampling task; the only state
/// crossing between them is the single-slot touch relay.
pub struct FeedSupervisor<T, F> {
    symbol: String,
    transport: T,
    engine: SyncEngine<F>,
    sampler: IndicatorSampler,
    keepalive_interval: Duration,
    sample_interval: Duration,
    window_interval: Duration,
}

impl<T, F> FeedSupervisor<T, F>
where
    T: FeedTransport,
    F: SnapshotFetcher,
{
    pub fn new(
        symbol: impl Into<String>,
        transport: T,
        engine: SyncEngine<F>,
        sampler: IndicatorSampler,
        config: &FeedConfig,
    ) -> Self {
        FeedSupervisor {
            symbol: symbol.into(),
            transport,
            engine,
            sampler,
            keepalive_interval: config.keepalive_interval(),
            sample_interval: config.sample_interval(),
            window_interval: config.window_interval(),
        }
    }

    /// Drive the pair until the stream ends, the transport fails, or
    /// shutdown is signalled. Other pairs are unaffected by this one
    /// returning.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let FeedSupervisor {
            symbol,
            mut transport,
            mut engine,
            sampler,
            keepalive_interval,
            sample_interval,
            window_interval,
        } = self;

        // Capacity one: if the sampler has not drained the previous touch,
        // the new one is dropped so ingestion never stalls.
        let (touch_tx, touch_rx) = mpsc::channel::<TouchSample>(1);

        let sampler_task = tokio::spawn(sample_loop(
            symbol.clone(),
            sampler,
            touch_rx,
            sample_interval,
            window_interval,
            shutdown.clone(),
        ));

        let mut keepalive = interval_at(Instant::now() + keepalive_interval, keepalive_interval);

        loop {
            let step = tokio::select! {
                message = transport.next_message() => match message {
                    Ok(Some(raw)) => Step::Message(raw),
                    Ok(None) => Step::StreamEnded,
                    Err(e) => {
                        tracing::error!(symbol = %symbol, error = %e, "transport failed");
                        Step::StreamEnded
                    }
                },
                _ = keepalive.tick() => Step::Keepalive,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        Step::Shutdown
                    } else {
                        Step::Continue
                    }
                }
            };

            match step {
                Step::Message(raw) => ingest_message(&symbol, &mut engine, &raw, &touch_tx).await,
                Step::Keepalive => {
                    if let Err(e) = transport.keepalive().await {
                        tracing::error!(symbol = %symbol, error = %e, "keepalive failed");
                        break;
                    }
                }
                Step::Shutdown => {
                    tracing::info!(symbol = %symbol, "shutting down");
                    if let Err(e) = transport.close().await {
                        tracing::warn!(symbol = %symbol, error = %e, "close failed");
                    }
                    break;
                }
                Step::StreamEnded => {
                    tracing::warn!(symbol = %symbol, "stream ended");
                    break;
                }
                Step::Continue => {}
            }
        }

        // Dropping the sender lets the sampling task observe the pair
        // going away through the closed relay.
        drop(touch_tx);
        let _ = sampler_task.await;
    }
}

/// Decode one wire message and feed it through the engine. Per-event
/// failures are absorbed and logged; they never end the stream.
async fn ingest_message<F: SnapshotFetcher>(
    symbol: &str,
    engine: &mut SyncEngine<F>,
    raw: &str,
    touch_tx: &mpsc::Sender<TouchSample>,
) {
    let frame = match decode_frame(raw) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(symbol = %symbol, error = %e, "dropping undecodable message");
            return;
        }
    };

    match engine.apply(&frame.data).await {
        Ok(ApplyOutcome::Applied(touch)) => {
            tracing::debug!(
                symbol = %symbol,
                bid_unit = %touch.bid_unit_price,
                ask_unit = %touch.ask_unit_price,
                tenth_spread = %(touch.tenth_ask - touch.tenth_bid),
                "book updated"
            );
            if let (Some(best_bid), Some(best_ask)) = (touch.best_bid, touch.best_ask) {
                let _ = touch_tx.try_send(TouchSample { best_bid, best_ask });
            }
        }
        Ok(ApplyOutcome::Stale) | Ok(ApplyOutcome::Resynced) => {}
        Err(e) => {
            tracing::warn!(symbol = %symbol, error = %e, "dropping event");
        }
    }
}

/// Sampling cadences for one pair: drain the touch relay at the sample
/// interval, roll up and log once per window.
async fn sample_loop(
    symbol: String,
    mut sampler: IndicatorSampler,
    mut touch_rx: mpsc::Receiver<TouchSample>,
    sample_interval: Duration,
    window_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let start = Instant::now();
    let mut sample_tick = interval_at(start + sample_interval, sample_interval);
    let mut window_tick = interval_at(start + window_interval, window_interval);

    loop {
        tokio::select! {
            _ = sample_tick.tick() => match touch_rx.try_recv() {
                Ok(sample) => sampler.on_sample(sample.best_bid, sample.best_ask),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => break,
            },
            _ = window_tick.tick() => {
                let rollup = sampler.on_window_elapsed();
                match rollup.ewma {
                    Some(ewma) => tracing::info!(
                        symbol = %symbol,
                        sma = %rollup.sma,
                        ewma = %ewma,
                        samples = rollup.samples,
                        "mid-price rollup"
                    ),
                    None => tracing::info!(symbol = %symbol, "no samples this window"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
