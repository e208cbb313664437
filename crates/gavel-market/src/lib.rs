//! Bidding and auction lifecycle for Gavel.
//!
//! Every mutation of an auction (bid, edit, close, delete) runs on that
//! auction's *desk*: a Tokio task that owns a command channel and handles
//! one command at a time. Two bids on the same auction can therefore never
//! both read the same highest bid, and a close always sees every bid that
//! was accepted before it.
//!
//! # Key types
//!
//! - [`Market`]: the entry point; routes mutations through desks
//! - [`BidEngine`]: bid rules and highest-bid lookup
//! - [`AuctionLifecycle`]: create/update/close/delete and ownership transfer
//! - [`Directory`]: users and items
//! - [`MarketConfig`]: desk settings

mod config;
mod desk;
mod directory;
mod engine;
mod error;
mod lifecycle;
mod market;
mod registry;

pub use config::MarketConfig;
pub use directory::Directory;
pub use engine::{BidEngine, check_bid};
pub use error::MarketError;
pub use lifecycle::{AuctionLifecycle, Settlement};
pub use market::Market;
