//! Combined market cap of the major USD stablecoins

use super::{normalized, MetricKind, NormalizedMetric};
use crate::data::coingecko::MarketCoin;
use crate::data::format::{format_change, format_market_cap};
use crate::data::{CoinGeckoClient, UpstreamError};

/// CoinGecko ids of the tracked stablecoins
const STABLECOINS: [&str; 5] = [
    "tether",
    "usd-coin",
    "dai",
    "ethena-usde",
    "first-digital-usd",
];

pub(super) async fn fetch(client: &CoinGeckoClient) -> Result<NormalizedMetric, UpstreamError> {
    let ids: Vec<String> = STABLECOINS.iter().map(|s| s.to_string()).collect();
    let rows = client.markets_for_ids(&ids).await?;
    Ok(build(&rows))
}

fn build(rows: &[MarketCoin]) -> NormalizedMetric {
    let total: f64 = rows.iter().filter_map(|r| r.market_cap).sum();
    let delta: f64 = rows.iter().filter_map(|r| r.market_cap_change_24h).sum();

    // Change relative to yesterday's supply
    let previous = total - delta;
    let change_pct = if previous > 0.0 {
        delta / previous * 100.0
    } else {
        0.0
    };
    let billions = (total / 1e9 * 10.0).round() / 10.0;

    normalized(
        MetricKind::StablecoinSupply,
        format_market_cap(total),
        billions,
        "USD",
        change_pct,
        Some(format_change(change_pct)),
        Vec::new(),
    )
}
