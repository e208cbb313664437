//! Auction desk: a Tokio task that serializes writes to one auction.
//!
//! Each auction with recent write traffic has a desk. Bids, edits, closes
//! and deletes for that auction are sent to it as commands and handled
//! strictly one after another, each with a oneshot reply channel. Reads
//! never go through a desk.

use gavel_protocol::{Auction, AuctionId, Bid, Session, UserId};
use gavel_store::Storage;
use tokio::sync::{mpsc, oneshot};

use crate::{AuctionLifecycle, MarketError, Settlement};

type Reply<T> = oneshot::Sender<Result<T, MarketError>>;

/// Commands a desk understands.
pub(crate) enum DeskCommand {
    PlaceBid {
        bidder_id: UserId,
        price: u64,
        reply: Reply<Bid>,
    },
    Update {
        session: Session,
        title: String,
        description: String,
        reply: Reply<Auction>,
    },
    Close {
        session: Session,
        reply: Reply<Settlement>,
    },
    Delete {
        session: Session,
        reply: Reply<()>,
    },
}

/// Handle to a running desk. Cheap to clone.
///
/// The desk stops once every handle is dropped and its queue is drained.
#[derive(Clone)]
pub(crate) struct DeskHandle {
    auction_id: AuctionId,
    sender: mpsc::Sender<DeskCommand>,
}

impl DeskHandle {
    pub(crate) fn auction_id(&self) -> AuctionId {
        self.auction_id
    }

    #[cfg(test)]
    pub(crate) fn sender_same_as(&self, other: &DeskHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    pub(crate) async fn place_bid(
        &self,
        bidder_id: UserId,
        price: u64,
    ) -> Result<Bid, MarketError> {
        self.request(|reply| DeskCommand::PlaceBid {
            bidder_id,
            price,
            reply,
        })
        .await
    }

    pub(crate) async fn update(
        &self,
        session: Session,
        title: String,
        description: String,
    ) -> Result<Auction, MarketError> {
        self.request(|reply| DeskCommand::Update {
            session,
            title,
            description,
            reply,
        })
        .await
    }

    pub(crate) async fn close(&self, session: Session) -> Result<Settlement, MarketError> {
        self.request(|reply| DeskCommand::Close { session, reply }).await
    }

    pub(crate) async fn delete(&self, session: Session) -> Result<(), MarketError> {
        self.request(|reply| DeskCommand::Delete { session, reply }).await
    }

    /// Sends a command and waits for its reply. A closed channel on either
    /// side means the desk is gone.
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> DeskCommand,
    ) -> Result<T, MarketError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| MarketError::Unavailable(self.auction_id))?;
        reply_rx
            .await
            .map_err(|_| MarketError::Unavailable(self.auction_id))?
    }
}

/// The desk's state. Lives inside its task.
struct DeskActor<S: Storage> {
    auction_id: AuctionId,
    lifecycle: AuctionLifecycle<S>,
    receiver: mpsc::Receiver<DeskCommand>,
}

impl<S: Storage> DeskActor<S> {
    async fn run(mut self) {
        tracing::debug!(auction_id = %self.auction_id, "desk opened");
        let mut handled: u64 = 0;

        while let Some(cmd) = self.receiver.recv().await {
            handled += 1;
            let id = self.auction_id;
            match cmd {
                DeskCommand::PlaceBid {
                    bidder_id,
                    price,
                    reply,
                } => {
                    let result = self.lifecycle.engine().place_bid(id, bidder_id, price).await;
                    let _ = reply.send(result);
                }
                DeskCommand::Update {
                    session,
                    title,
                    description,
                    reply,
                } => {
                    let result = self.lifecycle.update(id, &session, title, description).await;
                    let _ = reply.send(result);
                }
                DeskCommand::Close { session, reply } => {
                    let result = self.lifecycle.close(id, &session).await;
                    let _ = reply.send(result);
                }
                DeskCommand::Delete { session, reply } => {
                    let result = self.lifecycle.delete(id, &session).await;
                    let _ = reply.send(result);
                }
            }
        }

        tracing::debug!(auction_id = %self.auction_id, handled, "desk closed");
    }
}

/// Starts a desk for `auction_id` and returns a handle to it.
///
/// `channel_size` bounds the command queue; when it is full, senders wait.
pub(crate) fn spawn_desk<S: Storage>(
    auction_id: AuctionId,
    lifecycle: AuctionLifecycle<S>,
    channel_size: usize,
) -> DeskHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = DeskActor {
        auction_id,
        lifecycle,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    DeskHandle {
        auction_id,
        sender: tx,
    }
}
