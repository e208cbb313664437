//! `Marketplace` builder and typed API.
//!
//! The marketplace ties the layers together: session validation in front,
//! the market behind it, one shared storage underneath.

use std::sync::Arc;

use gavel_market::{Market, MarketConfig, Settlement};
use gavel_protocol::{
    AuctionDetail, AuctionId, BidDetail, Credential, Item, ItemId, JsonCodec, NewItem, Session,
    SignedIn, UserId, UserProfile,
};
use gavel_session::{Clock, SessionConfig, SessionManager, SystemClock};
use gavel_store::{MemoryStorage, Storage};

use crate::GavelError;

/// Builder for a [`Marketplace`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use gavel::prelude::*;
///
/// let marketplace = Marketplace::builder()
///     .session_config(SessionConfig { ttl: Duration::from_secs(600) })
///     .build_in_memory();
/// assert_eq!(marketplace.sessions().config().ttl, Duration::from_secs(600));
/// ```
pub struct MarketplaceBuilder<C: Clock = SystemClock> {
    session_config: SessionConfig,
    market_config: MarketConfig,
    clock: C,
}

impl MarketplaceBuilder {
    /// Creates a builder with default settings and the system clock.
    pub fn new() -> Self {
        Self {
            session_config: SessionConfig::default(),
            market_config: MarketConfig::default(),
            clock: SystemClock,
        }
    }
}

impl Default for MarketplaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MarketplaceBuilder<C> {
    /// Sets the session configuration (token lifetime).
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the market configuration (desk queue size).
    pub fn market_config(mut self, config: MarketConfig) -> Self {
        self.market_config = config;
        self
    }

    /// Replaces the clock used for session expiry.
    pub fn clock<C2: Clock>(self, clock: C2) -> MarketplaceBuilder<C2> {
        MarketplaceBuilder {
            session_config: self.session_config,
            market_config: self.market_config,
            clock,
        }
    }

    /// Builds a marketplace on top of `store`.
    pub fn build<S: Storage>(self, store: Arc<S>) -> Marketplace<S, C> {
        tracing::debug!(
            ttl_secs = self.session_config.ttl.as_secs(),
            desk_channel_size = self.market_config.desk_channel_size,
            "building marketplace"
        );
        Marketplace {
            sessions: SessionManager::new(Arc::clone(&store), self.clock, self.session_config),
            market: Market::new(store, self.market_config),
            codec: JsonCodec,
        }
    }

    /// Builds a marketplace with fresh in-memory storage.
    pub fn build_in_memory(self) -> Marketplace<MemoryStorage, C> {
        self.build(Arc::new(MemoryStorage::new()))
    }
}

/// The auction marketplace.
///
/// Every method is one operation. Guarded ones take the caller's session
/// token as `Option<&str>`: `None` is "no token sent", which is reported
/// differently from a token that doesn't check out. For request/reply
/// style access see [`handle`](Self::handle).
pub struct Marketplace<S: Storage, C: Clock = SystemClock> {
    pub(crate) sessions: SessionManager<S, C>,
    pub(crate) market: Market<S>,
    pub(crate) codec: JsonCodec,
}

impl Marketplace<MemoryStorage> {
    /// Creates a new builder.
    pub fn builder() -> MarketplaceBuilder {
        MarketplaceBuilder::new()
    }
}

impl<S: Storage, C: Clock> Marketplace<S, C> {
    pub fn sessions(&self) -> &SessionManager<S, C> {
        &self.sessions
    }

    pub fn market(&self) -> &Market<S> {
        &self.market
    }

    async fn authorize(&self, token: Option<&str>) -> Result<Session, GavelError> {
        Ok(self.sessions.validate(token).await?)
    }

    // -- Sessions ---------------------------------------------------------

    pub async fn login(
        &self,
        username: &str,
        credential: &Credential,
    ) -> Result<SignedIn, GavelError> {
        let session = self.sessions.login(username, credential).await?;
        let user = self.market.directory().user_summary(session.user_id).await?;
        Ok(SignedIn { session, user })
    }

    pub async fn logout(&self, token: Option<&str>) -> Result<(), GavelError> {
        Ok(self.sessions.logout(token).await?)
    }

    /// Removes expired session records. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<usize, GavelError> {
        Ok(self.sessions.purge_expired().await?)
    }

    // -- Users and items --------------------------------------------------

    pub async fn register_user(
        &self,
        name: String,
        username: String,
        credential: Credential,
        items: Vec<NewItem>,
    ) -> Result<UserProfile, GavelError> {
        Ok(self
            .market
            .directory()
            .register_user(name, username, credential, items)
            .await?)
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, GavelError> {
        Ok(self.market.directory().users().await?)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<UserProfile, GavelError> {
        Ok(self.market.directory().user(user_id).await?)
    }

    /// Replaces the caller's own name, username and credential.
    pub async fn update_user(
        &self,
        token: Option<&str>,
        user_id: UserId,
        name: String,
        username: String,
        credential: Credential,
    ) -> Result<UserProfile, GavelError> {
        let session = self.authorize(token).await?;
        Ok(self
            .market
            .directory()
            .update_user(&session, user_id, name, username, credential)
            .await?)
    }

    pub async fn create_item(
        &self,
        token: Option<&str>,
        name: String,
        description: String,
    ) -> Result<Item, GavelError> {
        let session = self.authorize(token).await?;
        Ok(self
            .market
            .directory()
            .create_item(&session, name, description)
            .await?)
    }

    pub async fn list_items(&self) -> Result<Vec<Item>, GavelError> {
        Ok(self.market.directory().items().await?)
    }

    pub async fn get_item(&self, item_id: ItemId) -> Result<Item, GavelError> {
        Ok(self.market.directory().item(item_id).await?)
    }

    pub async fn update_item(
        &self,
        token: Option<&str>,
        item_id: ItemId,
        name: String,
        description: String,
    ) -> Result<Item, GavelError> {
        let session = self.authorize(token).await?;
        Ok(self
            .market
            .directory()
            .update_item(&session, item_id, name, description)
            .await?)
    }

    /// Deletes one of the caller's items, unless an open auction lists it.
    pub async fn delete_item(
        &self,
        token: Option<&str>,
        item_id: ItemId,
    ) -> Result<(), GavelError> {
        let session = self.authorize(token).await?;
        Ok(self.market.directory().delete_item(&session, item_id).await?)
    }

    // -- Auctions ---------------------------------------------------------

    pub async fn list_auctions(&self) -> Result<Vec<AuctionDetail>, GavelError> {
        Ok(self.market.list_auctions().await?)
    }

    pub async fn get_auction(&self, auction_id: AuctionId) -> Result<AuctionDetail, GavelError> {
        Ok(self.market.get_auction(auction_id).await?)
    }

    pub async fn highest_bid(
        &self,
        auction_id: AuctionId,
    ) -> Result<Option<BidDetail>, GavelError> {
        Ok(self.market.highest_bid(auction_id).await?)
    }

    pub async fn list_bids(&self, auction_id: AuctionId) -> Result<Vec<BidDetail>, GavelError> {
        Ok(self.market.list_bids(auction_id).await?)
    }

    pub async fn create_auction(
        &self,
        token: Option<&str>,
        title: String,
        description: String,
        start_price: u64,
        item_id: ItemId,
    ) -> Result<AuctionDetail, GavelError> {
        let session = self.authorize(token).await?;
        Ok(self
            .market
            .create_auction(&session, title, description, start_price, item_id)
            .await?)
    }

    pub async fn update_auction(
        &self,
        token: Option<&str>,
        auction_id: AuctionId,
        title: String,
        description: String,
    ) -> Result<AuctionDetail, GavelError> {
        let session = self.authorize(token).await?;
        Ok(self
            .market
            .update_auction(&session, auction_id, title, description)
            .await?)
    }

    pub async fn place_bid(
        &self,
        token: Option<&str>,
        auction_id: AuctionId,
        price: u64,
    ) -> Result<BidDetail, GavelError> {
        let session = self.authorize(token).await?;
        Ok(self.market.place_bid(&session, auction_id, price).await?)
    }

    pub async fn close_auction(
        &self,
        token: Option<&str>,
        auction_id: AuctionId,
    ) -> Result<Settlement, GavelError> {
        let session = self.authorize(token).await?;
        Ok(self.market.close_auction(&session, auction_id).await?)
    }

    pub async fn delete_auction(
        &self,
        token: Option<&str>,
        auction_id: AuctionId,
    ) -> Result<(), GavelError> {
        let session = self.authorize(token).await?;
        Ok(self.market.delete_auction(&session, auction_id).await?)
    }
}
