//! The session manager: issues, resolves, and revokes login sessions.
//!
//! This is the only component allowed to create or delete session
//! records. It's responsible for:
//! - Checking credentials and creating sessions at login
//! - Turning a presented token back into a live session
//! - Deleting sessions at logout
//! - Purging records whose expiry has passed
//!
//! # Expiry
//!
//! A session is valid strictly before its `expires_at` instant. Expired
//! records may linger in storage until [`SessionManager::purge_expired`]
//! runs; validation never depends on whether they have been purged.

use std::sync::Arc;

use gavel_protocol::{Credential, Session, SessionToken};
use gavel_store::{Repository, Storage};
use rand::Rng;

use crate::{Clock, SessionConfig, SessionError};

/// Issues and checks session tokens.
///
/// ## Lifecycle
///
/// ```text
/// login() ──→ [live] ──→ logout() ──→ (record deleted → InvalidSession)
///                │
///                ▼ (now ≥ expires_at)
///            [expired → ExpiredSession] ──→ purge_expired()
/// ```
pub struct SessionManager<S: Storage, C: Clock> {
    store: Arc<S>,
    clock: C,
    config: SessionConfig,
}

impl<S: Storage, C: Clock> SessionManager<S, C> {
    pub fn new(store: Arc<S>, clock: C, config: SessionConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Checks a username/credential pair and opens a session.
    ///
    /// # Errors
    /// [`SessionError::AuthenticationFailed`] for an unknown username AND
    /// for a wrong credential, so callers can't tell which usernames
    /// exist.
    pub async fn login(
        &self,
        username: &str,
        credential: &Credential,
    ) -> Result<Session, SessionError> {
        let user = self
            .store
            .users()
            .find_by(|u| u.username == username)
            .await?
            .into_iter()
            .next();

        let user = match user {
            Some(user) if user.credential.matches(credential) => user,
            _ => {
                tracing::debug!(%username, "login rejected");
                return Err(SessionError::AuthenticationFailed);
            }
        };

        let session = Session {
            token: SessionToken::new(generate_token()),
            user_id: user.id,
            expires_at: self.clock.now() + self.config.ttl,
        };
        let session = self.store.sessions().save(session).await?;

        tracing::info!(user_id = %user.id, token = %session.token, "session created");
        Ok(session)
    }

    /// Resolves a presented token to its live session.
    ///
    /// `token` is `None` when the caller sent no token at all; an empty
    /// or blank string counts as absent too.
    ///
    /// # Errors
    /// - [`SessionError::MissingToken`]: nothing presented
    /// - [`SessionError::InvalidSession`]: no such session
    /// - [`SessionError::ExpiredSession`]: session exists but has expired
    pub async fn validate(&self, token: Option<&str>) -> Result<Session, SessionError> {
        let token = match token {
            Some(t) if !t.trim().is_empty() => SessionToken::from(t),
            _ => return Err(SessionError::MissingToken),
        };

        let session = self
            .store
            .sessions()
            .find(&token)
            .await?
            .ok_or(SessionError::InvalidSession)?;

        if session.is_expired_at(self.clock.now()) {
            tracing::debug!(%token, user_id = %session.user_id, "session expired");
            return Err(SessionError::ExpiredSession);
        }

        Ok(session)
    }

    /// Ends a session.
    ///
    /// The token must still be valid: logging out twice, or logging out
    /// an expired session, fails with the same errors as
    /// [`validate`](Self::validate).
    pub async fn logout(&self, token: Option<&str>) -> Result<(), SessionError> {
        let session = self.validate(token).await?;
        self.store.sessions().delete(&session.token).await?;

        tracing::info!(user_id = %session.user_id, token = %session.token, "session revoked");
        Ok(())
    }

    /// Deletes every session record whose expiry has passed.
    ///
    /// Returns how many were removed. Purely housekeeping: expired
    /// sessions are already rejected by `validate` whether purged or not.
    pub async fn purge_expired(&self) -> Result<usize, SessionError> {
        let now = self.clock.now();
        let removed = self
            .store
            .sessions()
            .delete_by(move |s| s.is_expired_at(now))
            .await?;

        if removed > 0 {
            tracing::info!(removed, "expired sessions purged");
        }
        Ok(removed)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
