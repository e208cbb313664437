//! The [`Record`] trait: what it takes to live in a repository.

use std::fmt;

use gavel_protocol::{
    Auction, AuctionId, Bid, BidId, Item, ItemId, Session, SessionToken, User, UserId,
};

/// A storable record.
///
/// `Id` is `Ord` so repositories can keep records in id order; for the
/// numeric ids that is also creation order.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Ord + Send + Sync + fmt::Debug + fmt::Display + 'static;

    /// Name of the collection, used in logs and errors.
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// A secondary key that must be unique across the collection, if the
    /// record type has one.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

impl Record for User {
    type Id = UserId;
    const COLLECTION: &'static str = "users";

    fn id(&self) -> UserId {
        self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.username.clone())
    }
}

impl Record for Item {
    type Id = ItemId;
    const COLLECTION: &'static str = "items";

    fn id(&self) -> ItemId {
        self.id
    }
}

impl Record for Auction {
    type Id = AuctionId;
    const COLLECTION: &'static str = "auctions";

    fn id(&self) -> AuctionId {
        self.id
    }
}

impl Record for Bid {
    type Id = BidId;
    const COLLECTION: &'static str = "bids";

    fn id(&self) -> BidId {
        self.id
    }
}

impl Record for Session {
    type Id = SessionToken;
    const COLLECTION: &'static str = "sessions";

    fn id(&self) -> SessionToken {
        self.token.clone()
    }
}
