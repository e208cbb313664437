//! Scripted walkthrough of a Gavel marketplace.
//!
//! Every step is a JSON request pushed through `Marketplace::handle_bytes`,
//! the same path a transport would use. Run with `RUST_LOG=debug` to see
//! rejected requests and desk activity.

use std::error::Error;

use gavel::prelude::*;
use serde_json::{Value, json};

type DemoResult<T> = Result<T, Box<dyn Error>>;
type House = Marketplace<MemoryStorage>;

async fn send(house: &House, step: &str, request: Value) -> DemoResult<Value> {
    let bytes = serde_json::to_vec(&request)?;
    let reply: Value = serde_json::from_slice(&house.handle_bytes(&bytes).await?)?;
    println!("{step:<32} {reply}");
    Ok(reply)
}

/// Sends `command` on behalf of whoever holds `token`.
async fn send_as(house: &House, step: &str, token: &str, command: Value) -> DemoResult<Value> {
    send(house, step, json!({ "token": token, "command": command })).await
}

async fn register(house: &House, name: &str, items: Value) -> DemoResult<Value> {
    let username = name.to_lowercase();
    send(
        house,
        &format!("register {username}"),
        json!({ "command": {
            "op": "register_user",
            "name": name,
            "username": username,
            "credential": format!("{username}-pw"),
            "items": items,
        }}),
    )
    .await
}

async fn login(house: &House, username: &str) -> DemoResult<String> {
    let reply = send(
        house,
        &format!("login {username}"),
        json!({ "command": {
            "op": "login",
            "username": username,
            "credential": format!("{username}-pw"),
        }}),
    )
    .await?;
    reply["data"]["session"]["token"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| format!("login failed for {username}").into())
}

async fn bid(house: &House, who: &str, token: &str, auction_id: u64, price: u64) -> DemoResult<()> {
    send_as(
        house,
        &format!("{who} bids {price}"),
        token,
        json!({ "op": "place_bid", "auction_id": auction_id, "price": price }),
    )
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> DemoResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let house = Marketplace::builder().build_in_memory();
    tracing::info!("auction house open");

    let lamp = json!([{ "name": "Lamp", "description": "Brass, 1920s" }]);
    let ana = register(&house, "Ana", lamp).await?;
    register(&house, "Bob", json!([])).await?;
    register(&house, "Cleo", json!([])).await?;

    let item_id = ana["data"]["items"][0]["id"]
        .as_u64()
        .ok_or("registration reply has no item")?;

    let ana_token = login(&house, "ana").await?;
    let bob_token = login(&house, "bob").await?;
    let cleo_token = login(&house, "cleo").await?;

    let created = send_as(
        &house,
        "ana lists the lamp",
        &ana_token,
        json!({
            "op": "create_auction",
            "title": "Brass lamp",
            "description": "Works, needs a new bulb",
            "start_price": 10,
            "item_id": item_id,
        }),
    )
    .await?;
    let auction_id = created["data"]["id"]
        .as_u64()
        .ok_or("create_auction reply has no id")?;

    send_as(
        &house,
        "ana tries to scrap the lamp",
        &ana_token,
        json!({ "op": "delete_item", "item_id": item_id }),
    )
    .await?;

    bid(&house, "bob", &bob_token, auction_id, 10).await?;
    bid(&house, "cleo", &cleo_token, auction_id, 10).await?;
    bid(&house, "cleo", &cleo_token, auction_id, 15).await?;
    bid(&house, "ana", &ana_token, auction_id, 50).await?;
    bid(&house, "bob", &bob_token, auction_id, 20).await?;

    send(
        &house,
        "highest bid",
        json!({ "command": { "op": "get_highest_bid", "auction_id": auction_id } }),
    )
    .await?;
    let close = json!({ "op": "close_auction", "auction_id": auction_id });
    send_as(&house, "cleo tries to close", &cleo_token, close.clone()).await?;
    send_as(&house, "ana closes", &ana_token, close).await?;
    bid(&house, "cleo", &cleo_token, auction_id, 99).await?;

    send(&house, "who owns what", json!({ "command": { "op": "list_users" } })).await?;
    send_as(
        &house,
        "bob scraps the lamp he won",
        &bob_token,
        json!({ "op": "delete_item", "item_id": item_id }),
    )
    .await?;

    send_as(&house, "ana logs out", &ana_token, json!({ "op": "logout" })).await?;
    send_as(
        &house,
        "ana deletes (stale token)",
        &ana_token,
        json!({ "op": "delete_auction", "auction_id": auction_id }),
    )
    .await?;
    send(
        &house,
        "anonymous bid",
        json!({ "command": { "op": "place_bid", "auction_id": auction_id, "price": 500 } }),
    )
    .await?;

    tracing::info!("auction house closed");
    Ok(())
}
