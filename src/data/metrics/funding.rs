//! BTC perpetual funding rate, averaged across venues and annualized

use super::coinglass::{CoinGlassClient, FundingRow};
use super::{normalized, MetricKind, NormalizedMetric};
use crate::data::format::{annualize_funding, format_apr};
use crate::data::UpstreamError;

const SYMBOL: &str = "BTC";

pub(super) async fn fetch(client: &CoinGlassClient) -> Result<NormalizedMetric, UpstreamError> {
    let rows = client.funding().await?;
    Ok(build(&rows))
}

fn build(rows: &[FundingRow]) -> NormalizedMetric {
    let rate_pct = average_rate_pct(rows);
    // Venue rates are percent per 8h; annualization works on the fraction
    let apr = annualize_funding(rate_pct / 100.0);
    let apr_rounded = (apr * 100.0).round() / 100.0;

    normalized(
        MetricKind::FundingRates,
        format!("{:.4}%", rate_pct),
        apr_rounded,
        &format_apr(apr),
        apr,
        None,
        Vec::new(),
    )
}

/// Mean 8h rate in percent across venues reporting for BTC, 0 if none do
fn average_rate_pct(rows: &[FundingRow]) -> f64 {
    let rates: Vec<f64> = rows
        .iter()
        .filter(|r| {
            r.symbol
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(SYMBOL))
        })
        .flat_map(|r| r.u_margin_list.iter().filter_map(|v| v.rate))
        .filter(|r| r.is_finite())
        .collect();

    if rates.is_empty() {
        0.0
    } else {
        rates.iter().sum::<f64>() / rates.len() as f64
    }
}
