//! Auction lifecycle: create, edit, close, delete.
//!
//! ```text
//! create() ──→ Open ──close()──→ Closed (terminal)
//!               │                  │
//!               └──── delete() ────┘   (removes the auction and its bids)
//! ```
//!
//! Only the auctioneer may edit, close, or delete. Closing settles the
//! auction: if anyone bid, the item changes hands to the highest bidder.
//! The mutating methods are crate-private because they must run on the
//! auction's desk; [`crate::Market`] is the public way in.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use gavel_protocol::{Auction, AuctionId, AuctionStatus, Bid, ItemId, Session, UserId};
use gavel_session::AuthorizationGuard;
use gavel_store::{Repository, Storage};

use crate::{BidEngine, MarketError};

/// Counter for auction ids.
static NEXT_AUCTION_ID: AtomicU64 = AtomicU64::new(1);

/// The outcome of closing an auction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// The auction, now closed.
    pub auction: Auction,
    /// The bid that won the item, if anyone bid.
    pub winning_bid: Option<Bid>,
}

/// Creates auctions and drives them through their states.
pub struct AuctionLifecycle<S: Storage> {
    store: Arc<S>,
    engine: BidEngine<S>,
    guard: AuthorizationGuard,
}

impl<S: Storage> Clone for AuctionLifecycle<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            engine: self.engine.clone(),
            guard: self.guard,
        }
    }
}

impl<S: Storage> AuctionLifecycle<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            engine: BidEngine::new(Arc::clone(&store)),
            store,
            guard: AuthorizationGuard,
        }
    }

    pub fn engine(&self) -> &BidEngine<S> {
        &self.engine
    }

    /// Lists a new, open auction.
    ///
    /// # Errors
    /// [`MarketError::UserNotFound`] / [`MarketError::ItemNotFound`] if the
    /// auctioneer or the item doesn't exist.
    pub async fn create(
        &self,
        auctioneer_id: UserId,
        title: String,
        description: String,
        start_price: u64,
        item_id: ItemId,
    ) -> Result<Auction, MarketError> {
        if self.store.users().find(&auctioneer_id).await?.is_none() {
            return Err(MarketError::UserNotFound(auctioneer_id));
        }
        if self.store.items().find(&item_id).await?.is_none() {
            return Err(MarketError::ItemNotFound(item_id));
        }

        let auction = Auction {
            id: AuctionId(NEXT_AUCTION_ID.fetch_add(1, Ordering::Relaxed)),
            title,
            description,
            start_price,
            status: AuctionStatus::Open,
            auctioneer_id,
            item_id,
        };
        let auction = self.store.auctions().save(auction).await?;

        tracing::info!(
            auction_id = %auction.id,
            %auctioneer_id,
            %item_id,
            start_price,
            "auction created"
        );
        Ok(auction)
    }

    /// Looks up one auction.
    pub async fn auction(&self, auction_id: AuctionId) -> Result<Auction, MarketError> {
        self.store
            .auctions()
            .find(&auction_id)
            .await?
            .ok_or(MarketError::AuctionNotFound(auction_id))
    }

    /// Every auction, in id order.
    pub async fn auctions(&self) -> Result<Vec<Auction>, MarketError> {
        Ok(self.store.auctions().find_all().await?)
    }

    /// Changes title and description. Price, item and auctioneer stay.
    pub(crate) async fn update(
        &self,
        auction_id: AuctionId,
        session: &Session,
        title: String,
        description: String,
    ) -> Result<Auction, MarketError> {
        let guard = self.guard;
        let auction = self
            .store
            .auctions()
            .modify(&auction_id, |auction| {
                guard.require_owner(session, auction.auctioneer_id)?;
                auction.title = title;
                auction.description = description;
                Ok::<_, MarketError>(())
            })
            .await?
            .ok_or(MarketError::AuctionNotFound(auction_id))?;

        tracing::info!(%auction_id, "auction updated");
        Ok(auction)
    }

    /// Closes the auction and hands the item to the highest bidder.
    ///
    /// With no bids the item stays where it is. The item changes hands
    /// before the auction is marked closed: while the auction is open its
    /// item can't be deleted, and a dangling item reference fails the close
    /// with nothing written.
    pub(crate) async fn close(
        &self,
        auction_id: AuctionId,
        session: &Session,
    ) -> Result<Settlement, MarketError> {
        let auction = self.auction(auction_id).await?;
        self.guard.require_owner(session, auction.auctioneer_id)?;
        if !auction.status.can_transition_to(AuctionStatus::Closed) {
            return Err(MarketError::AlreadyClosed(auction_id));
        }

        let winning_bid = self.engine.current_highest(auction_id).await?;
        let item_id = auction.item_id;
        if let Some(bid) = &winning_bid {
            let winner = bid.bidder_id;
            let sold = self
                .store
                .items()
                .modify(&item_id, |item| {
                    item.owner_id = winner;
                    Ok::<_, MarketError>(())
                })
                .await?;
            if sold.is_none() {
                tracing::warn!(%auction_id, %item_id, "closing auction references a missing item");
                return Err(MarketError::ItemNotFound(item_id));
            }
            tracing::info!(%auction_id, %item_id, %winner, price = bid.price, "item sold");
        }

        let auction = self
            .store
            .auctions()
            .modify(&auction_id, |auction| {
                auction.status = AuctionStatus::Closed;
                Ok::<_, MarketError>(())
            })
            .await?
            .ok_or(MarketError::AuctionNotFound(auction_id))?;

        tracing::info!(%auction_id, sold = winning_bid.is_some(), "auction closed");
        Ok(Settlement {
            auction,
            winning_bid,
        })
    }

    /// Removes the auction and every bid on it. Allowed in either state.
    pub(crate) async fn delete(
        &self,
        auction_id: AuctionId,
        session: &Session,
    ) -> Result<(), MarketError> {
        let auction = self.auction(auction_id).await?;
        self.guard.require_owner(session, auction.auctioneer_id)?;

        self.store.auctions().delete(&auction_id).await?;
        let bids = self
            .store
            .bids()
            .delete_by(move |b| b.auction_id == auction_id)
            .await?;

        tracing::info!(%auction_id, bids, "auction deleted");
        Ok(())
    }
}
