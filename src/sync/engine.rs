use thiserror::Error;

use crate::book::{BookTouch, OrderBook};

use super::events::{DecodeError, DepthUpdateEvent};
use super::state::SyncState;
use super::traits::{SnapshotFetchError, SnapshotFetcher};

/// What happened to one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Event applied; carries the derived touch tuple.
    Applied(BookTouch),
    /// Event predates the snapshot and was discarded.
    Stale,
    /// The update-id chain broke; a fresh snapshot was taken and the
    /// event discarded without being applied.
    Resynced,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotFetchError),
}

/// Snapshot-reconciliation state machine over one symbol's book.
///
/// The transport delivers events ordered and at most once, but may drop
/// some; the engine verifies each event's `pu` against the previous
/// event's `u` and falls back to a fresh snapshot when the chain breaks.
pub struct SyncEngine<F> {
    symbol: String,
    book: OrderBook,
    state: SyncState,
    snapshot_last_update_id: i64,
    previous_event_final_update_id: i64,
    fetcher: F,
}

impl<F: SnapshotFetcher> SyncEngine<F> {
    /// Fetch the initial snapshot and start unsynced. A failed fetch here
    /// is fatal to the pair's startup.
    pub async fn new(symbol: impl Into<String>, fetcher: F) -> Result<Self, SnapshotFetchError> {
        let symbol = symbol.into();
        let snapshot = fetcher.fetch_snapshot(&symbol).await?;
        tracing::info!(
            symbol = %symbol,
            last_update_id = snapshot.last_update_id,
            "snapshot taken"
        );

        Ok(SyncEngine {
            symbol,
            book: OrderBook::new(),
            state: SyncState::Unsynced,
            snapshot_last_update_id: snapshot.last_update_id,
            previous_event_final_update_id: 0,
            fetcher,
        })
    }

    /// Feed one inbound event through the stale/gap/apply decision.
    ///
    /// Errors leave the engine unchanged: a level that fails to parse
    /// drops the whole event, and a failed resync fetch keeps the stale
    /// chain state so the next event re-triggers the fetch.
    pub async fn apply(&mut self, event: &DepthUpdateEvent) -> Result<ApplyOutcome, SyncError> {
        if event.final_update_id < self.snapshot_last_update_id {
            tracing::debug!(
                symbol = %self.symbol,
                final_update_id = event.final_update_id,
                snapshot_last_update_id = self.snapshot_last_update_id,
                "discarding stale event"
            );
            return Ok(ApplyOutcome::Stale);
        }

        if self.state.is_synced()
            && event.previous_final_update_id != self.previous_event_final_update_id
        {
            tracing::warn!(
                symbol = %self.symbol,
                expected = self.previous_event_final_update_id,
                got = event.previous_final_update_id,
                "update-id chain broken, taking fresh snapshot"
            );
            let snapshot = self.fetcher.fetch_snapshot(&self.symbol).await?;
            self.snapshot_last_update_id = snapshot.last_update_id;
            self.state = SyncState::Unsynced;
            tracing::info!(
                symbol = %self.symbol,
                last_update_id = snapshot.last_update_id,
                "snapshot taken"
            );
            return Ok(ApplyOutcome::Resynced);
        }

        let touch = self
            .book
            .apply(&event.bids, &event.asks)
            .map_err(DecodeError::from)?;
        self.previous_event_final_update_id = event.final_update_id;
        self.state = SyncState::Synced;
        Ok(ApplyOutcome::Applied(touch))
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn snapshot_last_update_id(&self) -> i64 {
        self.snapshot_last_update_id
    }

    pub fn previous_event_final_update_id(&self) -> i64 {
        self.previous_event_final_update_id
    }
}
