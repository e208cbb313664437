//! Read models: records joined with the records they point at.
//!
//! Listing endpoints return these instead of bare records so a client can
//! show "Lamp, listed by Ana" without a second round trip.

use serde::{Deserialize, Serialize};

use crate::{Auction, Bid, Item, Session, User, UserId};

/// The public face of a user: no credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
        }
    }
}

/// A user together with the items they currently own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserSummary,
    pub items: Vec<Item>,
}

/// An auction with its auctioneer and item resolved.
///
/// `item` is `None` once the item has been deleted, which its owner may do
/// after the auction closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionDetail {
    #[serde(flatten)]
    pub auction: Auction,
    pub auctioneer: UserSummary,
    pub item: Option<Item>,
}

/// A bid with its bidder resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidDetail {
    #[serde(flatten)]
    pub bid: Bid,
    pub bidder: UserSummary,
}

/// What a successful login hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedIn {
    pub session: Session,
    pub user: UserSummary,
}
