//! Integration tests for request dispatch: the access table, reply shapes,
//! and the JSON byte interface.

use gavel::prelude::*;
use serde_json::{Value, json};

// =========================================================================
// Helpers
// =========================================================================

fn marketplace() -> Marketplace<MemoryStorage> {
    Marketplace::builder().build_in_memory()
}

async fn register(
    market: &Marketplace<MemoryStorage>,
    username: &str,
    items: &[&str],
) -> UserProfile {
    let reply = market
        .handle(Request::public(Command::RegisterUser {
            name: username.to_uppercase(),
            username: username.into(),
            credential: Credential::new("pw"),
            items: items
                .iter()
                .map(|name| NewItem {
                    name: (*name).into(),
                    description: "".into(),
                })
                .collect(),
        }))
        .await;
    match reply {
        Reply::User(profile) => profile,
        other => panic!("expected User, got {other:?}"),
    }
}

async fn login(market: &Marketplace<MemoryStorage>, username: &str) -> String {
    let reply = market
        .handle(Request::public(Command::Login {
            username: username.into(),
            credential: Credential::new("pw"),
        }))
        .await;
    match reply {
        Reply::SignedIn(signed_in) => signed_in.session.token.as_str().to_string(),
        other => panic!("expected SignedIn, got {other:?}"),
    }
}

fn failure_kind(reply: &Reply) -> Option<ErrorKind> {
    reply.failure().map(|f| f.kind)
}

// =========================================================================
// Access table
// =========================================================================

#[tokio::test]
async fn test_every_guarded_operation_rejects_missing_token() {
    let market = marketplace();
    let guarded = [
        Command::Logout,
        Command::CreateItem {
            name: "n".into(),
            description: "d".into(),
        },
        Command::UpdateItem {
            item_id: ItemId(1),
            name: "n".into(),
            description: "d".into(),
        },
        Command::DeleteItem { item_id: ItemId(1) },
        Command::UpdateUser {
            user_id: UserId(1),
            name: "n".into(),
            username: "u".into(),
            credential: Credential::new("c"),
        },
        Command::CreateAuction {
            title: "t".into(),
            description: "d".into(),
            start_price: 1,
            item_id: ItemId(1),
        },
        Command::UpdateAuction {
            auction_id: AuctionId(1),
            title: "t".into(),
            description: "d".into(),
        },
        Command::PlaceBid {
            auction_id: AuctionId(1),
            price: 1,
        },
        Command::CloseAuction {
            auction_id: AuctionId(1),
        },
        Command::DeleteAuction {
            auction_id: AuctionId(1),
        },
    ];

    for command in guarded {
        let op = command.operation();
        assert!(op.access().requires_session(), "{op} should be guarded");

        let reply = market.handle(Request::public(command)).await;

        assert_eq!(failure_kind(&reply), Some(ErrorKind::MissingToken), "{op}");
    }
}

#[tokio::test]
async fn test_token_is_checked_before_existence() {
    let market = marketplace();

    // The auction doesn't exist either, but the bad token is reported first.
    let reply = market
        .handle(Request::with_token(
            "not-a-session",
            Command::CloseAuction {
                auction_id: AuctionId(u64::MAX),
            },
        ))
        .await;

    assert_eq!(failure_kind(&reply), Some(ErrorKind::InvalidSession));
}

#[tokio::test]
async fn test_public_operations_ignore_a_bad_token() {
    let market = marketplace();

    let reply = market
        .handle(Request::with_token("garbage", Command::ListAuctions))
        .await;

    assert_eq!(reply, Reply::Auctions(vec![]));
}

#[test]
fn test_access_table_matches_operation_kinds() {
    for op in Operation::ALL {
        let expected = match op {
            Operation::UpdateUser
            | Operation::UpdateItem
            | Operation::DeleteItem
            | Operation::UpdateAuction
            | Operation::CloseAuction
            | Operation::DeleteAuction => Access::Owner,
            Operation::Logout
            | Operation::CreateItem
            | Operation::CreateAuction
            | Operation::PlaceBid => Access::Session,
            _ => Access::Public,
        };
        assert_eq!(op.access(), expected, "{op}");
    }
}

// =========================================================================
// Full flow through handle()
// =========================================================================

#[tokio::test]
async fn test_handle_auction_flow() {
    let market = marketplace();
    let seller = register(&market, "ana", &["Lamp"]).await;
    let buyer = register(&market, "bob", &[]).await;
    let seller_token = login(&market, "ana").await;
    let buyer_token = login(&market, "bob").await;

    let reply = market
        .handle(Request::with_token(
            seller_token.clone(),
            Command::CreateAuction {
                title: "Lamp".into(),
                description: "Brass".into(),
                start_price: 10,
                item_id: seller.items[0].id,
            },
        ))
        .await;
    let auction_id = match reply {
        Reply::Auction(detail) => detail.auction.id,
        other => panic!("expected Auction, got {other:?}"),
    };

    let self_bid = market
        .handle(Request::with_token(
            seller_token.clone(),
            Command::PlaceBid {
                auction_id,
                price: 50,
            },
        ))
        .await;
    assert_eq!(failure_kind(&self_bid), Some(ErrorKind::Forbidden));

    let low = market
        .handle(Request::with_token(
            buyer_token.clone(),
            Command::PlaceBid {
                auction_id,
                price: 9,
            },
        ))
        .await;
    assert_eq!(
        low.failure().map(|f| f.message.as_str()),
        Some("Bid can't be lower than starting price")
    );

    let ok = market
        .handle(Request::with_token(
            buyer_token.clone(),
            Command::PlaceBid {
                auction_id,
                price: 10,
            },
        ))
        .await;
    assert!(matches!(ok, Reply::Bid(ref b) if b.bidder.id == buyer.user.id));

    let highest = market
        .handle(Request::public(Command::GetHighestBid { auction_id }))
        .await;
    assert!(matches!(highest, Reply::HighestBid(Some(ref b)) if b.bid.price == 10));

    let closed = market
        .handle(Request::with_token(
            seller_token.clone(),
            Command::CloseAuction { auction_id },
        ))
        .await;
    assert_eq!(closed, Reply::Done);

    let late = market
        .handle(Request::with_token(
            buyer_token,
            Command::PlaceBid {
                auction_id,
                price: 99,
            },
        ))
        .await;
    assert_eq!(failure_kind(&late), Some(ErrorKind::InvalidState));

    let profile = market
        .handle(Request::public(Command::GetUser {
            user_id: buyer.user.id,
        }))
        .await;
    assert!(matches!(profile, Reply::User(ref p) if p.items.len() == 1));

    let logout = market
        .handle(Request::with_token(seller_token.clone(), Command::Logout))
        .await;
    assert_eq!(logout, Reply::Done);
    let after = market
        .handle(Request::with_token(
            seller_token,
            Command::DeleteAuction { auction_id },
        ))
        .await;
    assert_eq!(failure_kind(&after), Some(ErrorKind::InvalidSession));
}

// =========================================================================
// Bytes
// =========================================================================

async fn call(market: &Marketplace<MemoryStorage>, request: Value) -> Value {
    let bytes = serde_json::to_vec(&request).unwrap();
    let reply = market.handle_bytes(&bytes).await.expect("reply should encode");
    serde_json::from_slice(&reply).unwrap()
}

#[tokio::test]
async fn test_handle_bytes_register_and_login() {
    let market = marketplace();

    let registered = call(
        &market,
        json!({
            "command": {
                "op": "register_user",
                "name": "Ana",
                "username": "ana",
                "credential": "pw",
                "items": [{ "name": "Lamp", "description": "Brass" }]
            }
        }),
    )
    .await;
    assert_eq!(registered["type"], "User");
    assert_eq!(registered["data"]["username"], "ana");
    assert!(registered["data"].get("credential").is_none());
    assert_eq!(registered["data"]["items"][0]["name"], "Lamp");

    let signed_in = call(
        &market,
        json!({ "command": { "op": "login", "username": "ana", "credential": "pw" } }),
    )
    .await;
    assert_eq!(signed_in["type"], "SignedIn");
    assert_eq!(signed_in["data"]["user"]["username"], "ana");
    assert_eq!(signed_in["data"]["session"]["token"].as_str().map(str::len), Some(32));
}

#[tokio::test]
async fn test_handle_bytes_failure_envelope() {
    let market = marketplace();

    let reply = call(
        &market,
        json!({ "command": { "op": "get_auction", "auction_id": 12345 } }),
    )
    .await;

    assert_eq!(reply["type"], "Failure");
    assert_eq!(reply["data"]["kind"], "not_found");
    assert_eq!(reply["data"]["code"], 404);
    assert_eq!(reply["data"]["message"], "Auction not found");
}

#[tokio::test]
async fn test_handle_bytes_garbage_is_bad_request() {
    let market = marketplace();

    let reply = market.handle_bytes(b"{ not json").await.unwrap();
    let reply: Value = serde_json::from_slice(&reply).unwrap();

    assert_eq!(reply["data"]["kind"], "bad_request");
    assert_eq!(reply["data"]["code"], 400);
}

#[tokio::test]
async fn test_handle_bytes_delete_item_then_get_is_not_found() {
    let market = marketplace();
    let ana = register(&market, "ana", &["Lamp"]).await;
    let token = login(&market, "ana").await;
    let item_id = ana.items[0].id.0;

    let deleted = call(
        &market,
        json!({ "token": token, "command": { "op": "delete_item", "item_id": item_id } }),
    )
    .await;
    assert_eq!(deleted["type"], "Done");

    let gone = call(&market, json!({ "command": { "op": "get_item", "item_id": item_id } })).await;
    assert_eq!(gone["data"]["code"], 404);
}

#[tokio::test]
async fn test_handle_bytes_update_user_of_someone_else_is_forbidden() {
    let market = marketplace();
    let ana = register(&market, "ana", &[]).await;
    register(&market, "bob", &[]).await;
    let bob_token = login(&market, "bob").await;

    let reply = call(
        &market,
        json!({ "token": bob_token, "command": {
            "op": "update_user",
            "user_id": ana.user.id.0,
            "name": "Bob",
            "username": "ana2",
            "credential": "pw",
        }}),
    )
    .await;

    assert_eq!(reply["data"]["kind"], "forbidden");
    assert_eq!(reply["data"]["code"], 403);
}

#[tokio::test]
async fn test_handle_bytes_missing_token_on_guarded_op() {
    let market = marketplace();

    let reply = call(
        &market,
        json!({ "command": { "op": "place_bid", "auction_id": 1, "price": 5 } }),
    )
    .await;

    assert_eq!(reply["data"]["kind"], "missing_token");
    assert_eq!(reply["data"]["code"], 401);
    assert_eq!(reply["data"]["message"], "Missing session id");
}
