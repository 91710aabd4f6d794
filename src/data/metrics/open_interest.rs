//! BTC futures open interest across venues

use super::coinglass::{CoinGlassClient, OpenInterestRow};
use super::{normalized, MetricKind, NormalizedMetric};
use crate::data::format::{format_change, format_market_cap};
use crate::data::UpstreamError;

const SYMBOL: &str = "BTC";

/// Row CoinGlass uses for the all-venue aggregate
const AGGREGATE_ROW: &str = "All";

pub(super) async fn fetch(client: &CoinGlassClient) -> Result<NormalizedMetric, UpstreamError> {
    let rows = client.open_interest(SYMBOL).await?;
    Ok(build(&rows))
}

fn build(rows: &[OpenInterestRow]) -> NormalizedMetric {
    let (total, change_pct) = aggregate(rows);
    let billions = (total / 1e9 * 100.0).round() / 100.0;

    normalized(
        MetricKind::OpenInterest,
        format_market_cap(total),
        billions,
        "USD",
        change_pct.unwrap_or(0.0),
        change_pct.map(format_change),
        Vec::new(),
    )
}

/// Prefers the aggregate row; otherwise sums venues and reports no change
fn aggregate(rows: &[OpenInterestRow]) -> (f64, Option<f64>) {
    if let Some(all) = rows
        .iter()
        .find(|r| r.exchange_name.as_deref() == Some(AGGREGATE_ROW))
    {
        return (all.open_interest.unwrap_or(0.0), all.h24_change);
    }

    let total = rows.iter().filter_map(|r| r.open_interest).sum();
    (total, None)
}
