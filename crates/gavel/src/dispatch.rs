//! Request dispatch: typed commands in, replies out.
//!
//! The flow for every request is:
//!   1. Look the command's operation up in the access table
//!   2. If it needs a session, validate the token (or fail right here)
//!   3. Run the operation
//!   4. Wrap the result, or the failure, in a [`Reply`]

use gavel_protocol::{Codec, Command, Failure, ErrorKind, Reply, Request, Session};
use gavel_session::{Clock, SessionError};
use gavel_store::Storage;

use crate::{GavelError, Marketplace};

impl<S: Storage, C: Clock> Marketplace<S, C> {
    /// Handles one request and always produces a reply.
    ///
    /// Failures come back as [`Reply::Failure`]; nothing is retried.
    pub async fn handle(&self, request: Request) -> Reply {
        let operation = request.command.operation();
        match self.execute(request).await {
            Ok(reply) => reply,
            Err(e) => {
                let kind = e.kind();
                if kind == ErrorKind::Internal {
                    tracing::warn!(%operation, error = %e, "request failed");
                } else {
                    tracing::debug!(%operation, %kind, error = %e, "request rejected");
                }
                Reply::Failure(e.to_failure())
            }
        }
    }

    /// Decodes a request, handles it, and encodes the reply.
    ///
    /// Undecodable input gets a `bad_request` failure reply rather than an
    /// error, so the caller always has something to send back.
    pub async fn handle_bytes(&self, data: &[u8]) -> Result<Vec<u8>, GavelError> {
        let reply = match self.codec.decode::<Request>(data) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                tracing::debug!(error = %e, "undecodable request");
                Reply::Failure(Failure::new(e.kind(), e.to_string()))
            }
        };
        Ok(self.codec.encode(&reply)?)
    }

    async fn execute(&self, request: Request) -> Result<Reply, GavelError> {
        let Request { token, command } = request;
        let operation = command.operation();

        // Checked once here, for every guarded operation, before any work.
        let caller = if operation.access().requires_session() {
            Some(self.sessions.validate(token.as_deref()).await?)
        } else {
            None
        };

        let reply = match command {
            // -- Sessions -------------------------------------------------
            Command::Login {
                username,
                credential,
            } => Reply::SignedIn(self.login(&username, &credential).await?),
            Command::Logout => {
                self.logout(token.as_deref()).await?;
                Reply::Done
            }

            // -- Users and items ------------------------------------------
            Command::RegisterUser {
                name,
                username,
                credential,
                items,
            } => Reply::User(self.register_user(name, username, credential, items).await?),
            Command::ListUsers => Reply::Users(self.list_users().await?),
            Command::GetUser { user_id } => Reply::User(self.get_user(user_id).await?),
            Command::UpdateUser {
                user_id,
                name,
                username,
                credential,
            } => Reply::User(
                self.market
                    .directory()
                    .update_user(caller_of(&caller)?, user_id, name, username, credential)
                    .await?,
            ),
            Command::CreateItem { name, description } => Reply::Item(
                self.market
                    .directory()
                    .create_item(caller_of(&caller)?, name, description)
                    .await?,
            ),
            Command::ListItems => Reply::Items(self.list_items().await?),
            Command::GetItem { item_id } => Reply::Item(self.get_item(item_id).await?),
            Command::UpdateItem {
                item_id,
                name,
                description,
            } => Reply::Item(
                self.market
                    .directory()
                    .update_item(caller_of(&caller)?, item_id, name, description)
                    .await?,
            ),
            Command::DeleteItem { item_id } => {
                self.market
                    .directory()
                    .delete_item(caller_of(&caller)?, item_id)
                    .await?;
                Reply::Done
            }

            // -- Auctions -------------------------------------------------
            Command::ListAuctions => Reply::Auctions(self.list_auctions().await?),
            Command::GetAuction { auction_id } => {
                Reply::Auction(self.get_auction(auction_id).await?)
            }
            Command::GetHighestBid { auction_id } => {
                Reply::HighestBid(self.highest_bid(auction_id).await?)
            }
            Command::ListBids { auction_id } => Reply::Bids(self.list_bids(auction_id).await?),
            Command::CreateAuction {
                title,
                description,
                start_price,
                item_id,
            } => Reply::Auction(
                self.market
                    .create_auction(caller_of(&caller)?, title, description, start_price, item_id)
                    .await?,
            ),
            Command::UpdateAuction {
                auction_id,
                title,
                description,
            } => Reply::Auction(
                self.market
                    .update_auction(caller_of(&caller)?, auction_id, title, description)
                    .await?,
            ),
            Command::PlaceBid { auction_id, price } => Reply::Bid(
                self.market
                    .place_bid(caller_of(&caller)?, auction_id, price)
                    .await?,
            ),
            Command::CloseAuction { auction_id } => {
                self.market
                    .close_auction(caller_of(&caller)?, auction_id)
                    .await?;
                Reply::Done
            }
            Command::DeleteAuction { auction_id } => {
                self.market
                    .delete_auction(caller_of(&caller)?, auction_id)
                    .await?;
                Reply::Done
            }
        };

        Ok(reply)
    }
}

/// The validated session of a guarded command.
///
/// Always `Some` when the access table marks the operation as guarded;
/// a `None` here means the table and this match disagree.
fn caller_of(caller: &Option<Session>) -> Result<&Session, GavelError> {
    caller
        .as_ref()
        .ok_or(GavelError::Session(SessionError::MissingToken))
}
