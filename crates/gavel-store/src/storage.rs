//! The [`Storage`] bundle: one repository per record type.

use gavel_protocol::{Auction, Bid, Item, Session, User};

use crate::{MemoryRepository, Repository};

/// Everything the marketplace persists.
///
/// Components hold an `Arc<S: Storage>` and pick the repository they need.
/// References between records (auction → item, bid → auction, ...) are
/// plain ids; resolving them is the caller's job.
pub trait Storage: Send + Sync + 'static {
    type Users: Repository<User>;
    type Items: Repository<Item>;
    type Auctions: Repository<Auction>;
    type Bids: Repository<Bid>;
    type Sessions: Repository<Session>;

    fn users(&self) -> &Self::Users;
    fn items(&self) -> &Self::Items;
    fn auctions(&self) -> &Self::Auctions;
    fn bids(&self) -> &Self::Bids;
    fn sessions(&self) -> &Self::Sessions;
}

/// [`Storage`] held entirely in process memory.
#[derive(Default)]
pub struct MemoryStorage {
    users: MemoryRepository<User>,
    items: MemoryRepository<Item>,
    auctions: MemoryRepository<Auction>,
    bids: MemoryRepository<Bid>,
    sessions: MemoryRepository<Session>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    type Users = MemoryRepository<User>;
    type Items = MemoryRepository<Item>;
    type Auctions = MemoryRepository<Auction>;
    type Bids = MemoryRepository<Bid>;
    type Sessions = MemoryRepository<Session>;

    fn users(&self) -> &Self::Users {
        &self.users
    }

    fn items(&self) -> &Self::Items {
        &self.items
    }

    fn auctions(&self) -> &Self::Auctions {
        &self.auctions
    }

    fn bids(&self) -> &Self::Bids {
        &self.bids
    }

    fn sessions(&self) -> &Self::Sessions {
        &self.sessions
    }
}
