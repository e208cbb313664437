//! The market: auctions, bids, users and items behind one type.

use std::future::Future;
use std::sync::Arc;

use gavel_protocol::{
    Auction, AuctionDetail, AuctionId, AuctionStatus, Bid, BidDetail, ItemId, Session,
};
use gavel_store::Storage;

use crate::desk::DeskHandle;
use crate::registry::DeskRegistry;
use crate::{AuctionLifecycle, BidEngine, Directory, MarketConfig, MarketError, Settlement};

/// Entry point for everything auction-related.
///
/// Callers pass an already validated [`Session`] to the guarded methods;
/// checking tokens is the session layer's job. Writes to an open auction
/// are routed through its desk, reads go straight to storage. Once an
/// auction is closed its desk is retired, and bids on it are turned away
/// without one.
pub struct Market<S: Storage> {
    lifecycle: AuctionLifecycle<S>,
    directory: Directory<S>,
    desks: DeskRegistry<S>,
}

impl<S: Storage> Market<S> {
    pub fn new(store: Arc<S>, config: MarketConfig) -> Self {
        let lifecycle = AuctionLifecycle::new(Arc::clone(&store));
        Self {
            desks: DeskRegistry::new(lifecycle.clone(), config.desk_channel_size),
            directory: Directory::new(store),
            lifecycle,
        }
    }

    pub fn directory(&self) -> &Directory<S> {
        &self.directory
    }

    pub fn lifecycle(&self) -> &AuctionLifecycle<S> {
        &self.lifecycle
    }

    pub fn engine(&self) -> &BidEngine<S> {
        self.lifecycle.engine()
    }

    /// Number of auctions that currently have a running desk.
    pub fn active_desks(&self) -> usize {
        self.desks.len()
    }

    // -- Reads ------------------------------------------------------------

    pub async fn list_auctions(&self) -> Result<Vec<AuctionDetail>, MarketError> {
        let auctions = self.lifecycle.auctions().await?;
        let mut details = Vec::with_capacity(auctions.len());
        for auction in auctions {
            details.push(self.auction_detail(auction).await?);
        }
        Ok(details)
    }

    pub async fn get_auction(&self, auction_id: AuctionId) -> Result<AuctionDetail, MarketError> {
        let auction = self.lifecycle.auction(auction_id).await?;
        self.auction_detail(auction).await
    }

    pub async fn highest_bid(
        &self,
        auction_id: AuctionId,
    ) -> Result<Option<BidDetail>, MarketError> {
        match self.engine().highest_bid(auction_id).await? {
            Some(bid) => Ok(Some(self.bid_detail(bid).await?)),
            None => Ok(None),
        }
    }

    /// Bids on an auction, oldest first.
    pub async fn list_bids(&self, auction_id: AuctionId) -> Result<Vec<BidDetail>, MarketError> {
        let bids = self.engine().bids(auction_id).await?;
        let mut details = Vec::with_capacity(bids.len());
        for bid in bids {
            details.push(self.bid_detail(bid).await?);
        }
        Ok(details)
    }

    // -- Writes -----------------------------------------------------------

    /// Lists a new auction with the session's user as auctioneer.
    pub async fn create_auction(
        &self,
        session: &Session,
        title: String,
        description: String,
        start_price: u64,
        item_id: ItemId,
    ) -> Result<AuctionDetail, MarketError> {
        let auction = self
            .lifecycle
            .create(session.user_id, title, description, start_price, item_id)
            .await?;
        self.auction_detail(auction).await
    }

    pub async fn update_auction(
        &self,
        session: &Session,
        auction_id: AuctionId,
        title: String,
        description: String,
    ) -> Result<AuctionDetail, MarketError> {
        let session = session.clone();
        let auction = self
            .on_desk(auction_id, |desk| async move {
                desk.update(session, title, description).await
            })
            .await?;
        self.auction_detail(auction).await
    }

    /// Places a bid as the session's user.
    pub async fn place_bid(
        &self,
        session: &Session,
        auction_id: AuctionId,
        price: u64,
    ) -> Result<BidDetail, MarketError> {
        // Closed is terminal, so this read can't go stale.
        if self.lifecycle.auction(auction_id).await?.status == AuctionStatus::Closed {
            tracing::debug!(%auction_id, price, "bid on closed auction");
            return Err(MarketError::AuctionClosed(auction_id));
        }

        let bidder_id = session.user_id;
        let bid = self
            .on_desk(auction_id, |desk| async move {
                desk.place_bid(bidder_id, price).await
            })
            .await?;
        self.bid_detail(bid).await
    }

    pub async fn close_auction(
        &self,
        session: &Session,
        auction_id: AuctionId,
    ) -> Result<Settlement, MarketError> {
        let session = session.clone();
        let settlement = self
            .on_desk(auction_id, |desk| async move { desk.close(session).await })
            .await?;
        self.desks.retire(auction_id);
        Ok(settlement)
    }

    pub async fn delete_auction(
        &self,
        session: &Session,
        auction_id: AuctionId,
    ) -> Result<(), MarketError> {
        let session = session.clone();
        self.on_desk(auction_id, |desk| async move { desk.delete(session).await })
            .await?;
        self.desks.retire(auction_id);
        Ok(())
    }

    /// Runs `op` against the auction's desk.
    ///
    /// Unknown auctions are rejected before a desk is spawned. The desk is
    /// dropped from the registry once the auction is closed or gone, or if
    /// it stops answering.
    async fn on_desk<T, F, Fut>(&self, auction_id: AuctionId, op: F) -> Result<T, MarketError>
    where
        F: FnOnce(DeskHandle) -> Fut,
        Fut: Future<Output = Result<T, MarketError>>,
    {
        let auction = self.lifecycle.auction(auction_id).await?;

        let result = op(self.desks.desk(auction_id)).await;
        let finished = match &result {
            Err(
                MarketError::AuctionNotFound(_)
                | MarketError::Unavailable(_)
                | MarketError::AuctionClosed(_)
                | MarketError::AlreadyClosed(_),
            ) => true,
            _ => auction.status == AuctionStatus::Closed,
        };
        if finished {
            self.desks.retire(auction_id);
        }
        result
    }

    // -- Views ------------------------------------------------------------

    async fn auction_detail(&self, auction: Auction) -> Result<AuctionDetail, MarketError> {
        let auctioneer = self.directory.user_summary(auction.auctioneer_id).await?;
        let item = match self.directory.item(auction.item_id).await {
            Ok(item) => Some(item),
            Err(MarketError::ItemNotFound(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(AuctionDetail {
            auction,
            auctioneer,
            item,
        })
    }

    async fn bid_detail(&self, bid: Bid) -> Result<BidDetail, MarketError> {
        let bidder = self.directory.user_summary(bid.bidder_id).await?;
        Ok(BidDetail { bid, bidder })
    }
}
