//! Coin lists: the top-100 table and the personal watchlist

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::coingecko::{CoinGeckoClient, MarketCoin};
use super::format::{format_market_cap, round1};
use super::UpstreamError;

/// Number of coins in the market table
pub const TOP_COINS_LIMIT: u32 = 100;

/// Breadth reported when there are no coins to measure
const NEUTRAL_BREADTH: f64 = 50.0;

/// A row of the market table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,
    pub rank: u32,
    pub price: f64,
    pub change_24h: f64,
    pub market_cap: f64,
    pub market_cap_formatted: String,
    pub volume: f64,
}

/// The top-100 coins by market cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCoins {
    pub coins: Vec<Coin>,
    pub count: usize,
    /// Percent of listed coins up over 24h
    pub breadth: f64,
}

/// A watchlist coin with longer-horizon fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedCoin {
    #[serde(flatten)]
    pub coin: Coin,
    pub change_7d: f64,
    pub change_30d: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub ath: f64,
    pub ath_change_percentage: f64,
    pub circulating_supply: f64,
}

/// The personal watchlist payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    pub coins: Vec<ExtendedCoin>,
}

/// Served when the watchlist has never loaded
pub static PERSONAL_FALLBACK: LazyLock<PersonalData> = LazyLock::new(|| PersonalData {
    coins: vec![
        placeholder("bitcoin", "BTC", "Bitcoin", 1),
        placeholder("ethereum", "ETH", "Ethereum", 2),
        placeholder("solana", "SOL", "Solana", 5),
    ],
});

fn placeholder(id: &str, symbol: &str, name: &str, rank: u32) -> ExtendedCoin {
    ExtendedCoin {
        coin: Coin {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            image: String::new(),
            rank,
            price: 0.0,
            change_24h: 0.0,
            market_cap: 0.0,
            market_cap_formatted: format_market_cap(0.0),
            volume: 0.0,
        },
        change_7d: 0.0,
        change_30d: 0.0,
        high_24h: 0.0,
        low_24h: 0.0,
        ath: 0.0,
        ath_change_percentage: 0.0,
        circulating_supply: 0.0,
    }
}

/// Fetches and normalizes the top-100 coins
pub async fn fetch_top_coins(coingecko: &CoinGeckoClient) -> Result<TopCoins, UpstreamError> {
    let rows = coingecko.top_markets(TOP_COINS_LIMIT).await?;
    Ok(build_top_coins(&rows))
}

/// Fetches the configured watchlist with extended fields
pub async fn fetch_personal(
    coingecko: &CoinGeckoClient,
    watchlist: &[String],
) -> Result<PersonalData, UpstreamError> {
    let rows = coingecko.markets_for_ids(watchlist).await?;
    Ok(PersonalData {
        coins: rows.iter().map(to_extended).collect(),
    })
}

pub(crate) fn build_top_coins(rows: &[MarketCoin]) -> TopCoins {
    let coins: Vec<Coin> = rows.iter().map(to_coin).collect();
    TopCoins {
        count: coins.len(),
        breadth: breadth(rows),
        coins,
    }
}

/// Percent of coins with a positive 24h change, one decimal
pub fn breadth(rows: &[MarketCoin]) -> f64 {
    if rows.is_empty() {
        return NEUTRAL_BREADTH;
    }
    let green = green_count(rows);
    round1(green as f64 / rows.len() as f64 * 100.0)
}

/// Number of coins with a positive 24h change
pub fn green_count(rows: &[MarketCoin]) -> usize {
    rows.iter()
        .filter(|c| c.price_change_percentage_24h.unwrap_or(0.0) > 0.0)
        .count()
}

fn to_coin(row: &MarketCoin) -> Coin {
    let market_cap = row.market_cap.unwrap_or(0.0);
    Coin {
        id: row.id.clone().unwrap_or_else(|| "?".to_string()),
        symbol: row
            .symbol
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "?".to_string()),
        name: row.name.clone().unwrap_or_else(|| "?".to_string()),
        image: row.image.clone().unwrap_or_default(),
        rank: row.market_cap_rank.unwrap_or(0),
        price: row.current_price.unwrap_or(0.0),
        change_24h: row.price_change_percentage_24h.unwrap_or(0.0),
        market_cap,
        market_cap_formatted: format_market_cap(market_cap),
        volume: row.total_volume.unwrap_or(0.0),
    }
}

fn to_extended(row: &MarketCoin) -> ExtendedCoin {
    ExtendedCoin {
        coin: to_coin(row),
        change_7d: row.price_change_percentage_7d_in_currency.unwrap_or(0.0),
        change_30d: row.price_change_percentage_30d_in_currency.unwrap_or(0.0),
        high_24h: row.high_24h.unwrap_or(0.0),
        low_24h: row.low_24h.unwrap_or(0.0),
        ath: row.ath.unwrap_or(0.0),
        ath_change_percentage: row.ath_change_percentage.unwrap_or(0.0),
        circulating_supply: row.circulating_supply.unwrap_or(0.0),
    }
}
