//! Users and items.
//!
//! Registration, profiles, and item listings. Users edit only themselves
//! and items only their owner touches. An item up for auction stays put
//! until the auction ends.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use gavel_protocol::{
    Credential, Item, ItemId, NewItem, Session, User, UserId, UserProfile, UserSummary,
};
use gavel_session::AuthorizationGuard;
use gavel_store::{Repository, Storage};

use crate::MarketError;

static NEXT_USER_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// User and item bookkeeping.
pub struct Directory<S: Storage> {
    store: Arc<S>,
    guard: AuthorizationGuard,
}

impl<S: Storage> Directory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            guard: AuthorizationGuard,
        }
    }

    // -- Users ------------------------------------------------------------

    /// Registers a user, plus any items they bring with them.
    ///
    /// # Errors
    /// A `Conflict` store error if the username is taken. No items are
    /// created in that case.
    pub async fn register_user(
        &self,
        name: String,
        username: String,
        credential: Credential,
        items: Vec<NewItem>,
    ) -> Result<UserProfile, MarketError> {
        let user = User {
            id: UserId(NEXT_USER_ID.fetch_add(1, Ordering::Relaxed)),
            name,
            username,
            credential,
        };
        let user = self.store.users().save(user).await?;

        let mut owned = Vec::with_capacity(items.len());
        for new in items {
            owned.push(self.insert_item(user.id, new.name, new.description).await?);
        }

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            items = owned.len(),
            "user registered"
        );
        Ok(UserProfile {
            user: UserSummary::from(&user),
            items: owned,
        })
    }

    /// Every user with the items they own.
    pub async fn users(&self) -> Result<Vec<UserProfile>, MarketError> {
        let users = self.store.users().find_all().await?;
        let mut by_owner: BTreeMap<UserId, Vec<Item>> = BTreeMap::new();
        for item in self.store.items().find_all().await? {
            by_owner.entry(item.owner_id).or_default().push(item);
        }

        Ok(users
            .iter()
            .map(|user| UserProfile {
                user: UserSummary::from(user),
                items: by_owner.remove(&user.id).unwrap_or_default(),
            })
            .collect())
    }

    /// One user with the items they own.
    pub async fn user(&self, user_id: UserId) -> Result<UserProfile, MarketError> {
        let summary = self.user_summary(user_id).await?;
        let items = self
            .store
            .items()
            .find_by(move |item| item.owner_id == user_id)
            .await?;
        Ok(UserProfile {
            user: summary,
            items,
        })
    }

    /// Replaces a user's name, username and credential.
    ///
    /// Only the user themselves may. Owned items and open sessions are
    /// left alone.
    ///
    /// # Errors
    /// `Forbidden` for anyone else, `Conflict` if the new username is
    /// taken, [`MarketError::UserNotFound`] if there is no such user.
    pub async fn update_user(
        &self,
        session: &Session,
        user_id: UserId,
        name: String,
        username: String,
        credential: Credential,
    ) -> Result<UserProfile, MarketError> {
        let guard = self.guard;
        self.store
            .users()
            .modify(&user_id, |user| {
                guard.require_owner(session, user.id)?;
                user.name = name;
                user.username = username;
                user.credential = credential;
                Ok::<_, MarketError>(())
            })
            .await?
            .ok_or(MarketError::UserNotFound(user_id))?;

        tracing::info!(%user_id, "user updated");
        self.user(user_id).await
    }

    /// A user's public fields.
    pub async fn user_summary(&self, user_id: UserId) -> Result<UserSummary, MarketError> {
        self.store
            .users()
            .find(&user_id)
            .await?
            .map(|user| UserSummary::from(&user))
            .ok_or(MarketError::UserNotFound(user_id))
    }

    // -- Items ------------------------------------------------------------

    /// Creates an item owned by the session's user.
    pub async fn create_item(
        &self,
        session: &Session,
        name: String,
        description: String,
    ) -> Result<Item, MarketError> {
        if self.store.users().find(&session.user_id).await?.is_none() {
            return Err(MarketError::UserNotFound(session.user_id));
        }
        self.insert_item(session.user_id, name, description).await
    }

    pub async fn items(&self) -> Result<Vec<Item>, MarketError> {
        Ok(self.store.items().find_all().await?)
    }

    pub async fn item(&self, item_id: ItemId) -> Result<Item, MarketError> {
        self.store
            .items()
            .find(&item_id)
            .await?
            .ok_or(MarketError::ItemNotFound(item_id))
    }

    /// Renames an item. Only its current owner may.
    ///
    /// The ownership check and the write happen in one store call, so an
    /// auction closing at the same moment can't have its transfer undone.
    pub async fn update_item(
        &self,
        session: &Session,
        item_id: ItemId,
        name: String,
        description: String,
    ) -> Result<Item, MarketError> {
        let guard = self.guard;
        let item = self
            .store
            .items()
            .modify(&item_id, |item| {
                guard.require_owner(session, item.owner_id)?;
                item.name = name;
                item.description = description;
                Ok::<_, MarketError>(())
            })
            .await?
            .ok_or(MarketError::ItemNotFound(item_id))?;

        tracing::info!(%item_id, owner = %item.owner_id, "item updated");
        Ok(item)
    }

    /// Deletes an item. Only its current owner may, and not while an open
    /// auction is selling it.
    ///
    /// Auctions that already closed keep their `item_id`; their detail
    /// view shows no item from then on.
    pub async fn delete_item(&self, session: &Session, item_id: ItemId) -> Result<(), MarketError> {
        let open = self
            .store
            .auctions()
            .find_by(move |auction| auction.item_id == item_id && auction.status.is_open())
            .await?;
        if let Some(auction) = open.first() {
            return Err(MarketError::ItemListed {
                item_id,
                auction_id: auction.id,
            });
        }

        let guard = self.guard;
        let item = self
            .store
            .items()
            .delete_if(&item_id, |item| {
                guard.require_owner(session, item.owner_id)?;
                Ok::<_, MarketError>(())
            })
            .await?
            .ok_or(MarketError::ItemNotFound(item_id))?;

        tracing::info!(%item_id, owner = %item.owner_id, "item deleted");
        Ok(())
    }

    async fn insert_item(
        &self,
        owner_id: UserId,
        name: String,
        description: String,
    ) -> Result<Item, MarketError> {
        let item = Item {
            id: ItemId(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed)),
            name,
            description,
            owner_id,
        };
        let item = self.store.items().save(item).await?;
        tracing::debug!(item_id = %item.id, %owner_id, "item created");
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use gavel_protocol::{ErrorKind, SessionToken};
    use gavel_store::MemoryStorage;

    use super::*;

    fn directory() -> Directory<MemoryStorage> {
        Directory::new(Arc::new(MemoryStorage::new()))
    }

    fn session_for(user: UserId) -> Session {
        Session {
            token: SessionToken::new("t"),
            user_id: user,
            expires_at: SystemTime::UNIX_EPOCH,
        }
    }

    fn lamp() -> NewItem {
        NewItem {
            name: "Lamp".into(),
            description: "Brass".into(),
        }
    }

    async fn register(
        dir: &Directory<MemoryStorage>,
        username: &str,
        items: Vec<NewItem>,
    ) -> UserProfile {
        dir.register_user(username.to_uppercase(), username.into(), Credential::new("pw"), items)
            .await
            .expect("register should succeed")
    }

    #[tokio::test]
    async fn test_register_user_creates_owned_items() {
        let dir = directory();

        let profile = register(&dir, "ana", vec![lamp()]).await;

        assert_eq!(profile.user.username, "ana");
        assert_eq!(profile.items.len(), 1);
        assert_eq!(profile.items[0].owner_id, profile.user.id);
        assert_eq!(dir.user(profile.user.id).await.unwrap(), profile);
    }

    #[tokio::test]
    async fn test_register_user_duplicate_username_conflicts_without_items() {
        let dir = directory();
        register(&dir, "ana", vec![]).await;

        let err = dir
            .register_user("Other".into(), "ana".into(), Credential::new("x"), vec![lamp()])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(dir.items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_users_groups_items_by_owner() {
        let dir = directory();
        let ana = register(&dir, "ana", vec![lamp(), lamp()]).await;
        let bob = register(&dir, "bob", vec![]).await;

        let users = dir.users().await.unwrap();

        let items_of = |id: UserId| users.iter().find(|p| p.user.id == id).map(|p| p.items.len());
        assert_eq!(items_of(ana.user.id), Some(2));
        assert_eq!(items_of(bob.user.id), Some(0));
    }

    #[tokio::test]
    async fn test_user_unknown_returns_not_found() {
        let dir = directory();
        assert!(matches!(
            dir.user(UserId(u64::MAX)).await,
            Err(MarketError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_item_owner_is_session_user() {
        let dir = directory();
        let ana = register(&dir, "ana", vec![]).await;

        let item = dir
            .create_item(&session_for(ana.user.id), "Vase".into(), "Blue".into())
            .await
            .unwrap();

        assert_eq!(item.owner_id, ana.user.id);
        assert_eq!(dir.item(item.id).await.unwrap(), item);
    }

    #[tokio::test]
    async fn test_update_item_by_owner_renames() {
        let dir = directory();
        let ana = register(&dir, "ana", vec![lamp()]).await;
        let item_id = ana.items[0].id;

        let updated = dir
            .update_item(&session_for(ana.user.id), item_id, "Lantern".into(), "Old".into())
            .await
            .unwrap();

        assert_eq!(updated.name, "Lantern");
        assert_eq!(updated.owner_id, ana.user.id);
    }

    #[tokio::test]
    async fn test_update_item_by_other_user_is_forbidden_and_unchanged() {
        let dir = directory();
        let ana = register(&dir, "ana", vec![lamp()]).await;
        let bob = register(&dir, "bob", vec![]).await;
        let item_id = ana.items[0].id;

        let err = dir
            .update_item(&session_for(bob.user.id), item_id, "Mine".into(), "now".into())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(dir.item(item_id).await.unwrap().name, "Lamp");
    }

    #[tokio::test]
    async fn test_update_user_by_self_changes_login_name() {
        let dir = directory();
        let ana = register(&dir, "ana", vec![lamp()]).await;

        let profile = dir
            .update_user(
                &session_for(ana.user.id),
                ana.user.id,
                "Ana Maria".into(),
                "anamaria".into(),
                Credential::new("new-pw"),
            )
            .await
            .unwrap();

        assert_eq!(profile.user.username, "anamaria");
        assert_eq!(profile.items, ana.items);
        let stored = dir.store.users().find(&ana.user.id).await.unwrap().unwrap();
        assert!(stored.credential.matches(&Credential::new("new-pw")));
    }

    #[tokio::test]
    async fn test_update_user_by_someone_else_is_forbidden() {
        let dir = directory();
        let ana = register(&dir, "ana", vec![]).await;
        let bob = register(&dir, "bob", vec![]).await;

        let err = dir
            .update_user(
                &session_for(bob.user.id),
                ana.user.id,
                "x".into(),
                "x".into(),
                Credential::new("x"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(dir.user(ana.user.id).await.unwrap().user.username, "ana");
    }

    #[tokio::test]
    async fn test_update_user_to_taken_username_conflicts() {
        let dir = directory();
        register(&dir, "ana", vec![]).await;
        let bob = register(&dir, "bob", vec![]).await;

        let err = dir
            .update_user(
                &session_for(bob.user.id),
                bob.user.id,
                "Bob".into(),
                "ana".into(),
                Credential::new("pw"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_delete_item_by_owner_removes_it() {
        let dir = directory();
        let ana = register(&dir, "ana", vec![lamp()]).await;
        let item_id = ana.items[0].id;

        dir.delete_item(&session_for(ana.user.id), item_id).await.unwrap();

        assert!(matches!(dir.item(item_id).await, Err(MarketError::ItemNotFound(_))));
        assert!(dir.user(ana.user.id).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_delete_item_by_other_user_is_forbidden_and_kept() {
        let dir = directory();
        let ana = register(&dir, "ana", vec![lamp()]).await;
        let bob = register(&dir, "bob", vec![]).await;
        let item_id = ana.items[0].id;

        let err = dir
            .delete_item(&session_for(bob.user.id), item_id)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert!(dir.item(item_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_item_unknown_returns_not_found() {
        let dir = directory();
        let ana = register(&dir, "ana", vec![]).await;

        let result = dir
            .delete_item(&session_for(ana.user.id), ItemId(u64::MAX))
            .await;

        assert!(matches!(result, Err(MarketError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_item_unknown_returns_not_found() {
        let dir = directory();
        let ana = register(&dir, "ana", vec![]).await;

        let result = dir
            .update_item(&session_for(ana.user.id), ItemId(u64::MAX), "x".into(), "y".into())
            .await;

        assert!(matches!(result, Err(MarketError::ItemNotFound(_))));
    }
}
