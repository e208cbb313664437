//! The command set and its access table.
//!
//! Every operation the marketplace exposes is a variant of [`Command`].
//! Whether it needs a session is answered by [`Operation::access`], a
//! plain `match`, so the public/guarded split is visible in one place and
//! checked before any command runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    AuctionDetail, AuctionId, BidDetail, Credential, ErrorKind, Item, ItemId,
    SignedIn, UserId, UserProfile,
};

// ---------------------------------------------------------------------------
// Access / Operation
// ---------------------------------------------------------------------------

/// What a caller must present to run an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone may call it.
    Public,
    /// Any logged-in user may call it.
    Session,
    /// A logged-in user who also owns the target resource. Ownership is
    /// checked once the resource is loaded.
    Owner,
}

impl Access {
    /// Returns `true` if a valid session must be presented.
    pub fn requires_session(self) -> bool {
        !matches!(self, Self::Public)
    }
}

/// The name of each operation, without its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Logout,
    RegisterUser,
    ListUsers,
    GetUser,
    UpdateUser,
    CreateItem,
    ListItems,
    GetItem,
    UpdateItem,
    DeleteItem,
    ListAuctions,
    GetAuction,
    GetHighestBid,
    ListBids,
    CreateAuction,
    UpdateAuction,
    PlaceBid,
    CloseAuction,
    DeleteAuction,
}

impl Operation {
    pub const ALL: [Operation; 20] = [
        Self::Login,
        Self::Logout,
        Self::RegisterUser,
        Self::ListUsers,
        Self::GetUser,
        Self::UpdateUser,
        Self::CreateItem,
        Self::ListItems,
        Self::GetItem,
        Self::UpdateItem,
        Self::DeleteItem,
        Self::ListAuctions,
        Self::GetAuction,
        Self::GetHighestBid,
        Self::ListBids,
        Self::CreateAuction,
        Self::UpdateAuction,
        Self::PlaceBid,
        Self::CloseAuction,
        Self::DeleteAuction,
    ];

    /// The access table.
    pub fn access(self) -> Access {
        match self {
            Self::Login
            | Self::RegisterUser
            | Self::ListUsers
            | Self::GetUser
            | Self::ListItems
            | Self::GetItem
            | Self::ListAuctions
            | Self::GetAuction
            | Self::GetHighestBid
            | Self::ListBids => Access::Public,

            Self::Logout | Self::CreateItem | Self::CreateAuction | Self::PlaceBid => {
                Access::Session
            }

            Self::UpdateUser
            | Self::UpdateItem
            | Self::DeleteItem
            | Self::UpdateAuction
            | Self::CloseAuction
            | Self::DeleteAuction => Access::Owner,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::RegisterUser => "register_user",
            Self::ListUsers => "list_users",
            Self::GetUser => "get_user",
            Self::UpdateUser => "update_user",
            Self::CreateItem => "create_item",
            Self::ListItems => "list_items",
            Self::GetItem => "get_item",
            Self::UpdateItem => "update_item",
            Self::DeleteItem => "delete_item",
            Self::ListAuctions => "list_auctions",
            Self::GetAuction => "get_auction",
            Self::GetHighestBid => "get_highest_bid",
            Self::ListBids => "list_bids",
            Self::CreateAuction => "create_auction",
            Self::UpdateAuction => "update_auction",
            Self::PlaceBid => "place_bid",
            Self::CloseAuction => "close_auction",
            Self::DeleteAuction => "delete_auction",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Command / Request
// ---------------------------------------------------------------------------

/// An item to create alongside a new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: String,
}

/// A decoded command with its arguments.
///
/// Internally tagged on `op`, so a bid looks like
/// `{ "op": "place_bid", "auction_id": 3, "price": 20 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Login {
        username: String,
        credential: Credential,
    },
    Logout,
    RegisterUser {
        name: String,
        username: String,
        credential: Credential,
        #[serde(default)]
        items: Vec<NewItem>,
    },
    ListUsers,
    GetUser {
        user_id: UserId,
    },
    /// Replaces a user's name, username and credential. Only the user
    /// themselves may.
    UpdateUser {
        user_id: UserId,
        name: String,
        username: String,
        credential: Credential,
    },
    CreateItem {
        name: String,
        description: String,
    },
    ListItems,
    GetItem {
        item_id: ItemId,
    },
    UpdateItem {
        item_id: ItemId,
        name: String,
        description: String,
    },
    DeleteItem {
        item_id: ItemId,
    },
    ListAuctions,
    GetAuction {
        auction_id: AuctionId,
    },
    GetHighestBid {
        auction_id: AuctionId,
    },
    ListBids {
        auction_id: AuctionId,
    },
    CreateAuction {
        title: String,
        description: String,
        start_price: u64,
        item_id: ItemId,
    },
    UpdateAuction {
        auction_id: AuctionId,
        title: String,
        description: String,
    },
    PlaceBid {
        auction_id: AuctionId,
        price: u64,
    },
    CloseAuction {
        auction_id: AuctionId,
    },
    DeleteAuction {
        auction_id: AuctionId,
    },
}

impl Command {
    /// Which operation this command invokes.
    pub fn operation(&self) -> Operation {
        match self {
            Self::Login { .. } => Operation::Login,
            Self::Logout => Operation::Logout,
            Self::RegisterUser { .. } => Operation::RegisterUser,
            Self::ListUsers => Operation::ListUsers,
            Self::GetUser { .. } => Operation::GetUser,
            Self::UpdateUser { .. } => Operation::UpdateUser,
            Self::CreateItem { .. } => Operation::CreateItem,
            Self::ListItems => Operation::ListItems,
            Self::GetItem { .. } => Operation::GetItem,
            Self::UpdateItem { .. } => Operation::UpdateItem,
            Self::DeleteItem { .. } => Operation::DeleteItem,
            Self::ListAuctions => Operation::ListAuctions,
            Self::GetAuction { .. } => Operation::GetAuction,
            Self::GetHighestBid { .. } => Operation::GetHighestBid,
            Self::ListBids { .. } => Operation::ListBids,
            Self::CreateAuction { .. } => Operation::CreateAuction,
            Self::UpdateAuction { .. } => Operation::UpdateAuction,
            Self::PlaceBid { .. } => Operation::PlaceBid,
            Self::CloseAuction { .. } => Operation::CloseAuction,
            Self::DeleteAuction { .. } => Operation::DeleteAuction,
        }
    }
}

/// A command plus the out-of-band session token.
///
/// The token sits beside the command, not inside it, the same way an
/// HTTP header sits beside the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub command: Command,
}

impl Request {
    /// A request without a session token.
    pub fn public(command: Command) -> Self {
        Self {
            token: None,
            command,
        }
    }

    /// A request carrying a session token.
    pub fn with_token(token: impl Into<String>, command: Command) -> Self {
        Self {
            token: Some(token.into()),
            command,
        }
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// A failed command, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    /// HTTP-style status code derived from `kind`.
    pub code: u16,
    /// Message fit to show an end user.
    pub message: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.status_code(),
            message: message.into(),
        }
    }
}

/// The outcome of a command.
///
/// Adjacently tagged: `{ "type": "Bid", "data": { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Reply {
    SignedIn(SignedIn),
    /// The command succeeded and has nothing to return.
    Done,
    User(UserProfile),
    Users(Vec<UserProfile>),
    Item(Item),
    Items(Vec<Item>),
    Auction(AuctionDetail),
    Auctions(Vec<AuctionDetail>),
    Bid(BidDetail),
    /// The highest bid, or `None` when the auction has no bids yet.
    HighestBid(Option<BidDetail>),
    Bids(Vec<BidDetail>),
    Failure(Failure),
}

impl Reply {
    /// Returns the failure if this reply is one.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failure(failure) => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_reads_are_public() {
        for op in [
            Operation::Login,
            Operation::ListAuctions,
            Operation::GetAuction,
            Operation::GetHighestBid,
            Operation::ListBids,
            Operation::ListUsers,
            Operation::GetItem,
        ] {
            assert_eq!(op.access(), Access::Public, "{op} should be public");
        }
    }

    #[test]
    fn test_access_auction_management_requires_owner() {
        for op in [
            Operation::UpdateAuction,
            Operation::CloseAuction,
            Operation::DeleteAuction,
            Operation::UpdateItem,
            Operation::DeleteItem,
            Operation::UpdateUser,
        ] {
            assert_eq!(op.access(), Access::Owner, "{op} should need owner");
            assert!(op.access().requires_session());
        }
    }

    #[test]
    fn test_access_every_mutation_requires_session() {
        let public_mutations: Vec<Operation> = Operation::ALL
            .into_iter()
            .filter(|op| !op.access().requires_session())
            .filter(|op| {
                !op.name().starts_with("list_") && !op.name().starts_with("get_")
            })
            .collect();

        // Logging in and signing up are the only writes a stranger may do.
        assert_eq!(
            public_mutations,
            vec![Operation::Login, Operation::RegisterUser]
        );
    }

    #[test]
    fn test_command_operation_matches_tag() {
        let cmd = Command::PlaceBid {
            auction_id: AuctionId(3),
            price: 20,
        };
        let json = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["op"], cmd.operation().name());
        assert_eq!(json["auction_id"], 3);
    }

    #[test]
    fn test_request_deserializes_without_token() {
        let req: Request =
            serde_json::from_str(r#"{"command":{"op":"list_auctions"}}"#).unwrap();

        assert_eq!(req.token, None);
        assert_eq!(req.command, Command::ListAuctions);
    }

    #[test]
    fn test_register_user_items_default_to_empty() {
        let req: Request = serde_json::from_str(
            r#"{"command":{"op":"register_user","name":"Ana","username":"ana","credential":"pw"}}"#,
        )
        .unwrap();

        match req.command {
            Command::RegisterUser { items, .. } => assert!(items.is_empty()),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_failure_carries_status_code() {
        let failure = Failure::new(ErrorKind::NotFound, "Auction not found");
        assert_eq!(failure.code, 404);
        assert_eq!(Reply::Failure(failure.clone()).failure(), Some(&failure));
        assert_eq!(Reply::Done.failure(), None);
    }
}
