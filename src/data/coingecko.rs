//! CoinGecko REST client
//!
//! Wraps the three public endpoints the site depends on: `simple/price`,
//! `coins/markets` and `global`. Raw response structs default every field so
//! a partially populated payload still deserializes.

use std::collections::HashMap;

use serde::Deserialize;

use super::upstream::{join_url, Upstream, UpstreamError};

/// Default CoinGecko API base URL
pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const SOURCE: &str = "coingecko";

/// One coin's entry from `simple/price`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimplePrice {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub usd_24h_change: Option<f64>,
}

/// Envelope of the `global` endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalResponse {
    #[serde(default)]
    pub data: GlobalData,
}

/// Aggregate market figures from `global`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalData {
    #[serde(default)]
    pub total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_change_percentage_24h_usd: Option<f64>,
}

impl GlobalData {
    /// Total market cap in USD, 0 when missing
    pub fn market_cap_usd(&self) -> f64 {
        self.total_market_cap.get("usd").copied().unwrap_or(0.0)
    }

    /// Total 24h volume in USD, 0 when missing
    pub fn volume_usd(&self) -> f64 {
        self.total_volume.get("usd").copied().unwrap_or(0.0)
    }

    /// Bitcoin share of total market cap in percent, 0 when missing
    pub fn btc_dominance(&self) -> f64 {
        self.market_cap_percentage.get("btc").copied().unwrap_or(0.0)
    }
}

/// One row of `coins/markets`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketCoin {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub market_cap_change_24h: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_7d_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_30d_in_currency: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub ath: Option<f64>,
    #[serde(default)]
    pub ath_change_percentage: Option<f64>,
}

/// Client for the CoinGecko API
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    upstream: Upstream,
    base_url: String,
}

impl CoinGeckoClient {
    /// Creates a client against `base_url`
    pub fn new(upstream: Upstream, base_url: impl Into<String>) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
        }
    }

    /// USD price and 24h change for the given coin ids
    pub async fn simple_price(
        &self,
        ids: &[&str],
    ) -> Result<HashMap<String, SimplePrice>, UpstreamError> {
        let ids = ids.join(",");
        let request = self
            .upstream
            .get(&join_url(&self.base_url, "simple/price"))
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ]);
        self.upstream.json(SOURCE, request).await
    }

    /// Aggregate market cap, volume and dominance
    pub async fn global(&self) -> Result<GlobalData, UpstreamError> {
        let request = self.upstream.get(&join_url(&self.base_url, "global"));
        let response: GlobalResponse = self.upstream.json(SOURCE, request).await?;
        Ok(response.data)
    }

    /// Top coins by market cap
    pub async fn top_markets(&self, per_page: u32) -> Result<Vec<MarketCoin>, UpstreamError> {
        let per_page = per_page.to_string();
        let request = self
            .upstream
            .get(&join_url(&self.base_url, "coins/markets"))
            .query(&[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
                ("price_change_percentage", "24h"),
            ]);
        self.upstream.json(SOURCE, request).await
    }

    /// Market rows for specific coin ids, including 7d/30d changes
    pub async fn markets_for_ids(&self, ids: &[String]) -> Result<Vec<MarketCoin>, UpstreamError> {
        let ids = ids.join(",");
        let request = self
            .upstream
            .get(&join_url(&self.base_url, "coins/markets"))
            .query(&[
                ("vs_currency", "usd"),
                ("ids", ids.as_str()),
                ("order", "market_cap_desc"),
                ("sparkline", "false"),
                ("price_change_percentage", "24h,7d,30d"),
            ]);
        self.upstream.json(SOURCE, request).await
    }
}
