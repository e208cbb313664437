//! The five persisted record types.
//!
//! These are plain data: no behaviour beyond small predicates. The rules
//! that govern how they change live in `gavel-session` and `gavel-market`.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::{AuctionId, BidId, ItemId, SessionToken, UserId};

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// A login secret, compared for equality and nothing else.
///
/// How it was produced (plain password, hash, API key) is not this
/// crate's concern. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns `true` if `presented` is the same secret.
    pub fn matches(&self, presented: &Credential) -> bool {
        self.0 == presented.0
    }
}

impl From<&str> for Credential {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

// ---------------------------------------------------------------------------
// User / Item
// ---------------------------------------------------------------------------

/// A registered user. Identity never changes after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login name. Unique across all users.
    pub username: String,
    pub credential: Credential,
}

/// Something a user owns and may auction off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    /// Current owner. Changes when an auction for this item closes with
    /// at least one bid.
    pub owner_id: UserId,
}

// ---------------------------------------------------------------------------
// AuctionStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of an auction.
///
/// ```text
/// Open ──(close)──→ Closed
/// ```
///
/// `Closed` is terminal. Deleting an auction is not a transition; it can
/// happen from either state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Open,
    Closed,
}

impl AuctionStatus {
    /// Returns `true` if the auction still accepts bids.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// The state this one may move to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Open => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Auction / Bid
// ---------------------------------------------------------------------------

/// An auction listing. `start_price`, `auctioneer_id` and `item_id` are
/// fixed at creation; only title and description may be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub title: String,
    pub description: String,
    /// The lowest price the first bid may offer.
    pub start_price: u64,
    pub status: AuctionStatus,
    /// The user who listed the auction. Sole party allowed to manage it.
    pub auctioneer_id: UserId,
    pub item_id: ItemId,
}

/// A bid on an auction. Never edited once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub price: u64,
    pub bidder_id: UserId,
    pub auction_id: AuctionId,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A login session: who is behind a token, and until when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub expires_at: SystemTime,
}

impl Session {
    /// A session is dead from its expiry instant onwards, whether or not
    /// the record has been removed yet.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.expires_at <= now
    }
}
