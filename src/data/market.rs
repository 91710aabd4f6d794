//! Market snapshot: BTC/ETH prices plus global market figures

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::coingecko::{CoinGeckoClient, GlobalData, SimplePrice};
use super::format::{format_market_cap, format_price};
use super::UpstreamError;

/// Headline market numbers for the masthead ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub btc_price: f64,
    pub btc_price_formatted: String,
    pub btc_change_24h: f64,
    pub eth_price: f64,
    pub eth_price_formatted: String,
    pub eth_change_24h: f64,
    pub total_market_cap: f64,
    pub total_market_cap_formatted: String,
    pub market_cap_change_24h: f64,
    pub total_volume: f64,
    pub total_volume_formatted: String,
    pub btc_dominance: f64,
}

/// Served when CoinGecko is down and nothing has been cached yet
pub static FALLBACK: LazyLock<MarketSnapshot> = LazyLock::new(|| MarketSnapshot {
    btc_price: 97_000.0,
    btc_price_formatted: format_price(97_000.0),
    btc_change_24h: 0.0,
    eth_price: 3_400.0,
    eth_price_formatted: format_price(3_400.0),
    eth_change_24h: 0.0,
    total_market_cap: 3.4e12,
    total_market_cap_formatted: format_market_cap(3.4e12),
    market_cap_change_24h: 0.0,
    total_volume: 1.2e11,
    total_volume_formatted: format_market_cap(1.2e11),
    btc_dominance: 57.0,
});

/// Fetches prices and global data concurrently; both must succeed
pub async fn fetch_market_snapshot(
    coingecko: &CoinGeckoClient,
) -> Result<MarketSnapshot, UpstreamError> {
    let (prices, global) = tokio::try_join!(
        coingecko.simple_price(&["bitcoin", "ethereum"]),
        coingecko.global()
    )?;

    let btc = prices.get("bitcoin").cloned().unwrap_or_default();
    let eth = prices.get("ethereum").cloned().unwrap_or_default();
    Ok(build_snapshot(&btc, &eth, &global))
}

fn build_snapshot(btc: &SimplePrice, eth: &SimplePrice, global: &GlobalData) -> MarketSnapshot {
    let btc_price = btc.usd.unwrap_or(0.0);
    let eth_price = eth.usd.unwrap_or(0.0);
    let total_market_cap = global.market_cap_usd();
    let total_volume = global.volume_usd();

    MarketSnapshot {
        btc_price,
        btc_price_formatted: format_price(btc_price),
        btc_change_24h: btc.usd_24h_change.unwrap_or(0.0),
        eth_price,
        eth_price_formatted: format_price(eth_price),
        eth_change_24h: eth.usd_24h_change.unwrap_or(0.0),
        total_market_cap,
        total_market_cap_formatted: format_market_cap(total_market_cap),
        market_cap_change_24h: global.market_cap_change_percentage_24h_usd.unwrap_or(0.0),
        total_volume,
        total_volume_formatted: format_market_cap(total_volume),
        btc_dominance: global.btc_dominance(),
    }
}
