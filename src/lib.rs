//! Local order book replica over a differential depth stream.
//!
//! Each configured pair runs an independent pipeline: the WebSocket
//! transport yields incremental depth events, the sync engine reconciles
//! them against REST snapshots into an in-memory book, and a sampling
//! cadence rolls the resulting touch prices into mid-price indicators.

pub mod book;
pub mod config;
pub mod indicator;
pub mod supervisor;
pub mod sync;
pub mod transport;
