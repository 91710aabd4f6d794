//! Bitcoin's share of total crypto market cap

use super::{normalized, MetricKind, NormalizedMetric};
use crate::data::coingecko::GlobalData;
use crate::data::{CoinGeckoClient, UpstreamError};

pub(super) async fn fetch(client: &CoinGeckoClient) -> Result<NormalizedMetric, UpstreamError> {
    let global = client.global().await?;
    Ok(build(&global))
}

fn build(global: &GlobalData) -> NormalizedMetric {
    let dominance = (global.btc_dominance() * 10.0).round() / 10.0;
    normalized(
        MetricKind::BtcDominance,
        format!("{:.1}%", dominance),
        dominance,
        "%",
        dominance,
        None,
        Vec::new(),
    )
}
