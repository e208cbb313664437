//! Error types for the market layer.

use gavel_protocol::{AuctionId, ErrorKind, ItemId, UserId};
use gavel_session::SessionError;
use gavel_store::StoreError;

/// Errors raised by bidding, auction management, and the user/item
/// directory.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("Auction not found")]
    AuctionNotFound(AuctionId),

    #[error("User not found")]
    UserNotFound(UserId),

    #[error("Item not found")]
    ItemNotFound(ItemId),

    /// The auctioneer tried to bid on their own auction.
    #[error("Auctioneer can't bid on their own auction")]
    SelfBid { auction_id: AuctionId, user: UserId },

    /// A bid arrived after the auction closed.
    #[error("Auction is closed")]
    AuctionClosed(AuctionId),

    /// `close` on an auction that is already closed.
    #[error("Auction is already closed")]
    AlreadyClosed(AuctionId),

    /// The item is up for sale and can't be deleted until the auction ends.
    #[error("Item is listed in an open auction")]
    ItemListed { item_id: ItemId, auction_id: AuctionId },

    /// First bid under the start price.
    #[error("Bid can't be lower than starting price")]
    BelowStartPrice { price: u64, start_price: u64 },

    /// Later bid that doesn't beat the current highest.
    #[error("Bid must be higher than highest bid")]
    NotHigher { price: u64, highest: u64 },

    /// The auction's desk stopped answering.
    #[error("auction {0} is unavailable")]
    Unavailable(AuctionId),

    /// Ownership check failed, or the session layer's storage did.
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MarketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuctionNotFound(_) | Self::UserNotFound(_) | Self::ItemNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::SelfBid { .. } => ErrorKind::Forbidden,
            Self::AuctionClosed(_) | Self::AlreadyClosed(_) | Self::ItemListed { .. } => {
                ErrorKind::InvalidState
            }
            Self::BelowStartPrice { .. } | Self::NotHigher { .. } => ErrorKind::InvalidBid,
            Self::Unavailable(_) => ErrorKind::Internal,
            Self::Session(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}
