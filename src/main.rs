//! NFT Flow Match - demo binary
//!
//! Seeds an in-memory store with a small orderbook, runs a search for a
//! single listing and a three-item offer, and prints the results as JSON.
//!
//! Pass a TOML file path as the first argument to override the matching
//! config. Log level follows `RUST_LOG` (default `info`).

use std::sync::Arc;

use nft_flow_match::store::MemoryOrderStore;
use nft_flow_match::types::{OrderData, OrderItemData, OrderStatus};
use nft_flow_match::{MatchingConfig, OrdersGraph};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

const HOUR_MS: u64 = 3_600_000;
const START_MS: u64 = 1_703_577_600_000;

fn order(id: &str, is_sell: bool, num_items: u32, price_eth: Decimal) -> OrderData {
    OrderData {
        id: id.to_string(),
        chain_id: "1".to_string(),
        is_sell_order: is_sell,
        num_items,
        start_price_eth: price_eth,
        end_price_eth: price_eth,
        start_time_ms: START_MS,
        end_time_ms: START_MS + 7 * 24 * HOUR_MS,
        maker_address: format!("0xmaker-{id}"),
        taker_address: None,
        complication_address: "0xcomplication".to_string(),
        currency_address: "0xweth".to_string(),
        status: OrderStatus::ValidActive,
    }
}

async fn insert(store: &MemoryOrderStore, data: OrderData, tokens: &[&str]) {
    let items = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| OrderItemData::for_order(&data, format!("{}-{i}", data.id), "0xcollection", Some(token.to_string()), 1))
        .collect();
    store.insert_order(data, items).await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => MatchingConfig::from_file(path).await?,
        None => MatchingConfig::default(),
    };
    info!(?config, "starting demo");

    let tenth = Decimal::new(1, 1);
    let store = Arc::new(MemoryOrderStore::new());
    insert(&store, order("listing-1", true, 1, tenth), &["1"]).await;
    insert(&store, order("listing-2", true, 1, tenth), &["2"]).await;
    insert(&store, order("listing-3", true, 1, tenth), &["3"]).await;
    insert(&store, order("offer-1", false, 1, tenth), &["1"]).await;
    insert(&store, order("offer-bundle", false, 3, Decimal::new(3, 1)), &["1", "2", "3"]).await;
    info!(orders = store.order_count().await, "store seeded");

    for root in ["listing-1", "offer-bundle"] {
        let graph = OrdersGraph::load(root, store.clone(), config.clone()).await?;
        let result = graph.search(None).await?;
        println!("{root}:");
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}
