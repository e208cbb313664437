//! Shared vocabulary for Gavel.
//!
//! This crate defines what every other layer talks about:
//!
//! - **Identifiers** ([`UserId`], [`AuctionId`], [`SessionToken`], ...):
//!   newtypes so an item id can never be passed where an auction id is
//!   expected.
//! - **Records** ([`User`], [`Item`], [`Auction`], [`Bid`], [`Session`]):
//!   the five persisted collections.
//! - **Views** ([`AuctionDetail`], [`BidDetail`], [`UserProfile`]):
//!   records joined with the records they reference.
//! - **Operations** ([`Operation`], [`Command`], [`Request`], [`Reply`]):
//!   the typed command set and the table of which commands need a session.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, typed values out.
//!
//! ```text
//! Command layer (Request/Reply) → Session → Market → Store (records)
//! ```

mod codec;
mod error;
mod ids;
mod model;
mod operation;
mod views;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{ErrorKind, ProtocolError};
pub use ids::{AuctionId, BidId, ItemId, SessionToken, UserId};
pub use model::{Auction, AuctionStatus, Bid, Credential, Item, Session, User};
pub use operation::{Access, Command, Failure, NewItem, Operation, Reply, Request};
pub use views::{AuctionDetail, BidDetail, SignedIn, UserProfile, UserSummary};
