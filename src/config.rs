use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Root configuration for the feed service, loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Pair symbols to subscribe to, e.g. "btcusdt". Normalized to
    /// lowercase on load.
    pub pairs: Vec<String>,
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Depth stream cadence in milliseconds (the exchange offers 100,
    /// 250 and 500).
    #[serde(default = "default_depth_speed")]
    pub depth_speed_ms: u64,
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval_ms: u64,
    /// Upper bound on one snapshot request; a stalled fetch must not wedge
    /// the pair's ingestion loop.
    #[serde(default = "default_snapshot_timeout")]
    pub snapshot_timeout_ms: u64,
    #[serde(default = "default_sample_interval")]
    pub sample_interval_ms: u64,
    /// Samples per indicator rollup window.
    #[serde(default = "default_indicator_window")]
    pub indicator_window: u32,
}

impl FeedConfig {
    /// Combined-stream URL for one pair's depth subscription.
    pub fn stream_url(&self, symbol: &str) -> String {
        format!(
            "{}/stream?streams={}@depth@{}ms",
            self.ws_url, symbol, self.depth_speed_ms
        )
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms)
    }

    pub fn snapshot_timeout(&self) -> Duration {
        Duration::from_millis(self.snapshot_timeout_ms)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn window_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms * u64::from(self.indicator_window))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config lists no pairs")]
    NoPairs,
}

pub fn load_config(path: impl AsRef<Path>) -> Result<FeedConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    load_config_from_str(&raw)
}

pub fn load_config_from_str(raw: &str) -> Result<FeedConfig, ConfigError> {
    let mut config: FeedConfig = serde_json::from_str(raw)?;
    if config.pairs.is_empty() {
        return Err(ConfigError::NoPairs);
    }
    for pair in &mut config.pairs {
        *pair = pair.to_lowercase();
    }
    Ok(config)
}

fn default_rest_url() -> String {
    "https://fapi.binance.com".to_string()
}

fn default_ws_url() -> String {
    "wss://fstream.binance.com".to_string()
}

fn default_depth_speed() -> u64 {
    100
}

fn default_keepalive_interval() -> u64 {
    15_000
}

fn default_snapshot_timeout() -> u64 {
    10_000
}

fn default_sample_interval() -> u64 {
    1_000
}

fn default_indicator_window() -> u32 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = load_config_from_str(r#"{"pairs": ["BTCUSDT", "ethusdt"]}"#).unwrap();
        assert_eq!(config.pairs, vec!["btcusdt", "ethusdt"]);
        assert_eq!(config.rest_url, "https://fapi.binance.com");
        assert_eq!(config.depth_speed_ms, 100);
        assert_eq!(config.keepalive_interval_ms, 15_000);
        assert_eq!(config.snapshot_timeout(), Duration::from_secs(10));
        assert_eq!(config.indicator_window, 60);
        assert_eq!(config.window_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_stream_url() {
        let config = load_config_from_str(r#"{"pairs": ["btcusdt"]}"#).unwrap();
        assert_eq!(
            config.stream_url("btcusdt"),
            "wss://fstream.binance.com/stream?streams=btcusdt@depth@100ms"
        );
    }

    #[test]
    fn test_overrides() {
        let raw = r#"{
            "pairs": ["btcusdt"],
            "rest_url": "http://localhost:8080",
            "ws_url": "ws://localhost:8080",
            "depth_speed_ms": 250,
            "sample_interval_ms": 10,
            "indicator_window": 6
        }"#;
        let config = load_config_from_str(raw).unwrap();
        assert_eq!(config.depth_speed_ms, 250);
        assert_eq!(config.window_interval(), Duration::from_millis(60));
    }

    #[test]
    fn test_empty_pairs_rejected() {
        assert!(matches!(
            load_config_from_str(r#"{"pairs": []}"#),
            Err(ConfigError::NoPairs)
        ));
    }
}
