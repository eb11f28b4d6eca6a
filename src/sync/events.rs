use serde::Deserialize;
use thiserror::Error;

use crate::book::BookError;

/// Combined-stream frame wrapping one depth update.
#[derive(Debug, Clone, Deserialize)]
pub struct DepthFrame {
    pub stream: String,
    pub data: DepthUpdateEvent,
}

/// One atomic transition of the authoritative book.
///
/// Prices and quantities stay as the wire's decimal strings until they are
/// applied; the exchange never sends native floats.
#[derive(Debug, Clone, Deserialize)]
pub struct DepthUpdateEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "T")]
    pub transaction_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "U")]
    pub first_update_id: i64,
    #[serde(rename = "u")]
    pub final_update_id: i64,
    #[serde(rename = "pu")]
    pub previous_final_update_id: i64,
    #[serde(rename = "b")]
    pub bids: Vec<[String; 2]>,
    #[serde(rename = "a")]
    pub asks: Vec<[String; 2]>,
}

/// Full point-in-time book listing from the REST depth endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DepthSnapshot {
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: i64,
    #[serde(rename = "E", default)]
    pub event_time: i64,
    #[serde(rename = "T", default)]
    pub transaction_time: i64,
    pub bids: Vec<[String; 2]>,
    pub asks: Vec<[String; 2]>,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed depth message: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Level(#[from] BookError),
}

/// Decode one raw wire message into a depth frame.
pub fn decode_frame(raw: &str) -> Result<DepthFrame, DecodeError> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_depth_frame() {
        let raw = r#"{
            "stream": "btcusdt@depth@100ms",
            "data": {
                "e": "depthUpdate",
                "E": 1712000000001,
                "T": 1712000000000,
                "s": "BTCUSDT",
                "U": 100,
                "u": 105,
                "pu": 99,
                "b": [["50000.00", "1.500"], ["49999.00", "0.000"]],
                "a": [["50001.00", "2.000"]]
            }
        }"#;

        let frame = decode_frame(raw).unwrap();
        assert_eq!(frame.stream, "btcusdt@depth@100ms");
        assert_eq!(frame.data.symbol, "BTCUSDT");
        assert_eq!(frame.data.first_update_id, 100);
        assert_eq!(frame.data.final_update_id, 105);
        assert_eq!(frame.data.previous_final_update_id, 99);
        assert_eq!(frame.data.bids.len(), 2);
        assert_eq!(frame.data.asks.len(), 1);
    }

    #[test]
    fn test_decode_rejects_malformed_message() {
        assert!(decode_frame("not json").is_err());
        assert!(decode_frame(r#"{"stream": "x"}"#).is_err());
    }

    #[test]
    fn test_decode_snapshot() {
        let raw = r#"{
            "lastUpdateId": 160,
            "E": 1712000000001,
            "T": 1712000000000,
            "bids": [["50000.00", "1.000"]],
            "asks": [["50001.00", "1.000"]]
        }"#;

        let snapshot: DepthSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.last_update_id, 160);
        assert_eq!(snapshot.bids.len(), 1);
    }

    #[test]
    fn test_decode_snapshot_without_timestamps() {
        // Spot-style snapshots omit E and T.
        let raw = r#"{"lastUpdateId": 10, "bids": [], "asks": []}"#;
        let snapshot: DepthSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.event_time, 0);
    }
}
