/// Synchronization state of one symbol's replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No event applied since the last (re)snapshot.
    Unsynced,
    /// At least one event applied; the update-id chain is being verified.
    Synced,
}

impl SyncState {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncState::Synced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_state_predicates() {
        assert!(!SyncState::Unsynced.is_synced());
        assert!(SyncState::Synced.is_synced());
    }
}
