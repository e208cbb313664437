//! Desk registry: at most one running desk per auction.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use gavel_protocol::AuctionId;
use gavel_store::Storage;

use crate::AuctionLifecycle;
use crate::desk::{DeskHandle, spawn_desk};

/// Hands out desk handles, spawning desks on first use.
///
/// The map lock is only held for the lookup/insert itself, never across
/// an `.await`, so a plain `std` mutex is enough.
pub(crate) struct DeskRegistry<S: Storage> {
    desks: Mutex<HashMap<AuctionId, DeskHandle>>,
    lifecycle: AuctionLifecycle<S>,
    channel_size: usize,
}

impl<S: Storage> DeskRegistry<S> {
    pub(crate) fn new(lifecycle: AuctionLifecycle<S>, channel_size: usize) -> Self {
        Self {
            desks: Mutex::new(HashMap::new()),
            lifecycle,
            // A zero-capacity mpsc channel panics on creation.
            channel_size: channel_size.max(1),
        }
    }

    /// Returns the auction's desk, starting one if there is none.
    pub(crate) fn desk(&self, auction_id: AuctionId) -> DeskHandle {
        let mut desks = self.desks.lock().unwrap_or_else(PoisonError::into_inner);
        desks
            .entry(auction_id)
            .or_insert_with(|| {
                tracing::debug!(%auction_id, "spawning desk");
                spawn_desk(auction_id, self.lifecycle.clone(), self.channel_size)
            })
            .clone()
    }

    /// Forgets the auction's desk. The task itself stops once in-flight
    /// callers drop their handles.
    pub(crate) fn retire(&self, auction_id: AuctionId) {
        let removed = self
            .desks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&auction_id);
        if let Some(desk) = removed {
            tracing::debug!(auction_id = %desk.auction_id(), "desk retired");
        }
    }

    /// Number of desks currently registered.
    pub(crate) fn len(&self) -> usize {
        self.desks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gavel_store::MemoryStorage;

    use super::*;

    fn registry() -> DeskRegistry<MemoryStorage> {
        let store = Arc::new(MemoryStorage::new());
        DeskRegistry::new(AuctionLifecycle::new(store), 0)
    }

    #[tokio::test]
    async fn test_desk_reuses_existing_desk() {
        let registry = registry();

        let first = registry.desk(AuctionId(1));
        let second = registry.desk(AuctionId(1));
        registry.desk(AuctionId(2));

        assert!(first.sender_same_as(&second));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_retire_removes_desk() {
        let registry = registry();
        registry.desk(AuctionId(1));

        registry.retire(AuctionId(1));
        registry.retire(AuctionId(1));

        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_retired_desk_for_missing_auction_answers_not_found() {
        let registry = registry();
        let desk = registry.desk(AuctionId(9));
        registry.retire(AuctionId(9));

        // The handle outlives the registry entry and still gets an answer.
        let result = desk.place_bid(gavel_protocol::UserId(1), 10).await;

        assert!(matches!(result, Err(crate::MarketError::AuctionNotFound(_))));
    }
}
