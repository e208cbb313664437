//! Bid rules and highest-bid lookup.
//!
//! The acceptance rule lives in [`check_bid`], a pure function over the
//! auction and its current highest bid. [`BidEngine::place_bid`] loads
//! those two things, runs the rule, and writes the bid. It is only ever
//! called from the auction's desk, which is what makes the
//! load-check-write sequence safe against other bids on the same auction.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use gavel_protocol::{Auction, AuctionId, Bid, BidId, UserId};
use gavel_store::{Repository, Storage};

use crate::MarketError;

/// Counter for bid ids. Ids grow in acceptance order, so sorting bids by
/// id gives the order they were placed in.
static NEXT_BID_ID: AtomicU64 = AtomicU64::new(1);

/// Decides whether `bidder_id` may bid `price` on `auction`.
///
/// Checks, in order:
/// 1. the auction is open (else [`MarketError::AuctionClosed`])
/// 2. the bidder is not the auctioneer (else [`MarketError::SelfBid`])
/// 3. with no bids yet, `price >= start_price`
///    (else [`MarketError::BelowStartPrice`])
/// 4. otherwise `price > highest.price`, ties lose
///    (else [`MarketError::NotHigher`])
///
/// The first bid may match the floor; every later bid must raise it.
pub fn check_bid(
    auction: &Auction,
    highest: Option<&Bid>,
    bidder_id: UserId,
    price: u64,
) -> Result<(), MarketError> {
    if !auction.status.is_open() {
        return Err(MarketError::AuctionClosed(auction.id));
    }
    if bidder_id == auction.auctioneer_id {
        return Err(MarketError::SelfBid {
            auction_id: auction.id,
            user: bidder_id,
        });
    }
    match highest {
        Some(h) if price <= h.price => Err(MarketError::NotHigher {
            price,
            highest: h.price,
        }),
        None if price < auction.start_price => Err(MarketError::BelowStartPrice {
            price,
            start_price: auction.start_price,
        }),
        _ => Ok(()),
    }
}

/// Reads and places bids.
pub struct BidEngine<S: Storage> {
    store: Arc<S>,
}

impl<S: Storage> Clone for BidEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Storage> BidEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The highest bid on an auction, or `None` if nobody has bid yet.
    ///
    /// # Errors
    /// [`MarketError::AuctionNotFound`] if the auction doesn't exist.
    pub async fn highest_bid(&self, auction_id: AuctionId) -> Result<Option<Bid>, MarketError> {
        self.load_auction(auction_id).await?;
        self.current_highest(auction_id).await
    }

    /// Every bid on an auction, oldest first.
    pub async fn bids(&self, auction_id: AuctionId) -> Result<Vec<Bid>, MarketError> {
        self.load_auction(auction_id).await?;
        Ok(self
            .store
            .bids()
            .find_by(move |b| b.auction_id == auction_id)
            .await?)
    }

    /// Highest bid without the existence check. Callers have already
    /// loaded the auction.
    pub(crate) async fn current_highest(
        &self,
        auction_id: AuctionId,
    ) -> Result<Option<Bid>, MarketError> {
        let bids = self
            .store
            .bids()
            .find_by(move |b| b.auction_id == auction_id)
            .await?;
        Ok(bids.into_iter().max_by_key(|b| b.price))
    }

    /// Validates and stores a bid.
    ///
    /// Must run on the auction's desk; see the module docs.
    pub(crate) async fn place_bid(
        &self,
        auction_id: AuctionId,
        bidder_id: UserId,
        price: u64,
    ) -> Result<Bid, MarketError> {
        let auction = self.load_auction(auction_id).await?;
        if self.store.users().find(&bidder_id).await?.is_none() {
            return Err(MarketError::UserNotFound(bidder_id));
        }

        let highest = self.current_highest(auction_id).await?;
        if let Err(e) = check_bid(&auction, highest.as_ref(), bidder_id, price) {
            tracing::debug!(%auction_id, %bidder_id, price, reason = %e, "bid rejected");
            return Err(e);
        }

        let bid = Bid {
            id: BidId(NEXT_BID_ID.fetch_add(1, Ordering::Relaxed)),
            price,
            bidder_id,
            auction_id,
        };
        let bid = self.store.bids().save(bid).await?;

        tracing::info!(%auction_id, bid_id = %bid.id, %bidder_id, price, "bid accepted");
        Ok(bid)
    }

    async fn load_auction(&self, auction_id: AuctionId) -> Result<Auction, MarketError> {
        self.store
            .auctions()
            .find(&auction_id)
            .await?
            .ok_or(MarketError::AuctionNotFound(auction_id))
    }
}

// =========================================================================
// Tests
// =========================================================================
