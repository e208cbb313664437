//! # Gavel
//!
//! Auction marketplace core.
//!
//! Users register, list items, open auctions on them and bid until the
//! auctioneer closes the auction, at which point the item goes to the
//! highest bidder. Mutating operations need a session token obtained
//! from [`Marketplace::login`].
//!
//! ## Layers
//!
//! ```text
//! Request ──→ access table ──→ SessionManager ──→ Market ──→ Storage
//!                                   │               │
//!                           AuthorizationGuard   auction desks
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use gavel::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), GavelError> {
//! let market = Marketplace::builder().build_in_memory();
//!
//! let seller = market
//!     .register_user("Ana".into(), "ana".into(), Credential::new("pw"), vec![NewItem {
//!         name: "Lamp".into(),
//!         description: "Brass".into(),
//!     }])
//!     .await?;
//! let signed_in = market.login("ana", &Credential::new("pw")).await?;
//! let token = Some(signed_in.session.token.as_str());
//!
//! let auction = market
//!     .create_auction(token, "Lamp".into(), "Barely used".into(), 10, seller.items[0].id)
//!     .await?;
//! assert!(auction.auction.status.is_open());
//! # Ok(())
//! # }
//! ```

mod dispatch;
mod error;
mod marketplace;

pub use error::GavelError;
pub use marketplace::{Marketplace, MarketplaceBuilder};

/// Re-exports of everything needed to drive a marketplace.
pub mod prelude {
    pub use crate::{GavelError, Marketplace, MarketplaceBuilder};
    pub use gavel_market::{MarketConfig, Settlement};
    pub use gavel_protocol::{
        Access, Auction, AuctionDetail, AuctionId, AuctionStatus, Bid, BidDetail, BidId, Codec,
        Command, Credential, ErrorKind, Failure, Item, ItemId, JsonCodec, NewItem, Operation,
        Reply, Request, Session, SessionToken, SignedIn, User, UserId, UserProfile, UserSummary,
    };
    pub use gavel_session::{Clock, ManualClock, SessionConfig, SystemClock};
    pub use gavel_store::{MemoryStorage, Storage};
}
