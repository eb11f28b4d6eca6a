mod engine;
mod events;
mod state;
mod traits;

pub use engine::{ApplyOutcome, SyncEngine, SyncError};
pub use events::{decode_frame, DecodeError, DepthFrame, DepthSnapshot, DepthUpdateEvent};
pub use state::SyncState;
pub use traits::{SnapshotFetchError, SnapshotFetcher};
