//! Spot BTC/ETH ETF net flows from SoSoValue
//!
//! The SoSoValue API needs a key. Without one the client produces
//! deterministic mock flows for the current day instead of failing, so the
//! page always has something plausible to render.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::format::format_market_cap;
use super::upstream::{join_url, Upstream, UpstreamError};

/// Default SoSoValue API base URL
pub const SOSOVALUE_BASE_URL: &str = "https://api.sosovalue.xyz";

const SOURCE: &str = "sosovalue";

/// Days of flow history kept per series
const HISTORY_DAYS: usize = 7;

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-soso-api-key";

/// A single trading day's net flow in USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyFlow {
    pub date: String,
    pub net_inflow: f64,
}

/// Flows for one ETF category, newest day first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtfFlowSeries {
    pub latest_date: String,
    pub latest_net_inflow: f64,
    pub latest_net_inflow_formatted: String,
    pub cumulative_net_inflow: f64,
    pub total_net_assets: f64,
    pub days: Vec<DailyFlow>,
}

/// BTC and ETH spot ETF flows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtfFlows {
    pub btc: EtfFlowSeries,
    pub eth: EtfFlowSeries,
    /// True when generated locally because no API key is configured
    pub mock: bool,
}

/// Served when SoSoValue fails and nothing has been cached
pub static FALLBACK: LazyLock<EtfFlows> = LazyLock::new(|| EtfFlows {
    btc: series_from_days(Vec::new(), 0.0, 0.0),
    eth: series_from_days(Vec::new(), 0.0, 0.0),
    mock: false,
});

#[derive(Debug, Deserialize)]
struct InflowResponse {
    #[serde(default)]
    data: Vec<InflowRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InflowRow {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    total_net_inflow: Option<f64>,
    #[serde(default)]
    total_net_assets: Option<f64>,
    #[serde(default)]
    cum_net_inflow: Option<f64>,
}

/// ETF category identifiers understood by SoSoValue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EtfKind {
    Btc,
    Eth,
}

impl EtfKind {
    fn api_type(self) -> &'static str {
        match self {
            EtfKind::Btc => "us-btc-spot",
            EtfKind::Eth => "us-eth-spot",
        }
    }
}

/// Client for the SoSoValue ETF API
#[derive(Debug, Clone)]
pub struct EtfFlowsClient {
    upstream: Upstream,
    base_url: String,
    api_key: Option<String>,
}

impl EtfFlowsClient {
    pub fn new(upstream: Upstream, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
            // An empty key is the same as no key
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Whether real data can be fetched
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetches both series concurrently, or mocks them without a key
    pub async fn fetch_flows(&self, today: NaiveDate) -> Result<EtfFlows, UpstreamError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(mock_flows(today));
        };

        let (btc, eth) = tokio::try_join!(
            self.fetch_series(api_key, EtfKind::Btc),
            self.fetch_series(api_key, EtfKind::Eth)
        )?;
        Ok(EtfFlows {
            btc,
            eth,
            mock: false,
        })
    }

    async fn fetch_series(&self, api_key: &str, kind: EtfKind) -> Result<EtfFlowSeries, UpstreamError> {
        let request = self
            .upstream
            .post(&join_url(&self.base_url, "openapi/v2/etf/historicalInflowChart"))
            .header(API_KEY_HEADER, api_key)
            .json(&json!({ "type": kind.api_type() }));
        let response: InflowResponse = self.upstream.json(SOURCE, request).await?;
        Ok(build_series(response.data))
    }
}

/// Sorts rows newest first and keeps the last week
fn build_series(mut rows: Vec<InflowRow>) -> EtfFlowSeries {
    rows.sort_by(|a, b| b.date.cmp(&a.date));

    let (cumulative, assets) = rows
        .first()
        .map(|r| {
            (
                r.cum_net_inflow.unwrap_or(0.0),
                r.total_net_assets.unwrap_or(0.0),
            )
        })
        .unwrap_or((0.0, 0.0));

    let days = rows
        .into_iter()
        .take(HISTORY_DAYS)
        .map(|r| DailyFlow {
            date: r.date.unwrap_or_else(|| "?".to_string()),
            net_inflow: r.total_net_inflow.unwrap_or(0.0),
        })
        .collect();

    series_from_days(days, cumulative, assets)
}

fn series_from_days(days: Vec<DailyFlow>, cumulative: f64, assets: f64) -> EtfFlowSeries {
    let (latest_date, latest) = days
        .first()
        .map(|d| (d.date.clone(), d.net_inflow))
        .unwrap_or_else(|| ("?".to_string(), 0.0));

    EtfFlowSeries {
        latest_date,
        latest_net_inflow: latest,
        latest_net_inflow_formatted: format_market_cap(latest),
        cumulative_net_inflow: cumulative,
        total_net_assets: assets,
        days,
    }
}

/// Fixed daily flow pattern in millions of USD, newest first
const MOCK_BTC_FLOWS_M: [f64; HISTORY_DAYS] = [412.5, -128.3, 287.0, 95.6, -56.2, 334.8, 171.4];
const MOCK_ETH_FLOWS_M: [f64; HISTORY_DAYS] = [58.1, -22.7, 41.3, 12.9, -8.4, 36.5, 19.2];

/// Deterministic flows for the last seven trading days up to `today`
pub fn mock_flows(today: NaiveDate) -> EtfFlows {
    let dates = trading_days_back(today, HISTORY_DAYS);
    EtfFlows {
        btc: mock_series(&dates, &MOCK_BTC_FLOWS_M, 39.2e9, 118.6e9),
        eth: mock_series(&dates, &MOCK_ETH_FLOWS_M, 3.1e9, 11.4e9),
        mock: true,
    }
}

fn mock_series(dates: &[NaiveDate], flows_m: &[f64], cumulative: f64, assets: f64) -> EtfFlowSeries {
    let days = dates
        .iter()
        .zip(flows_m)
        .map(|(date, m)| DailyFlow {
            date: date.format("%Y-%m-%d").to_string(),
            net_inflow: m * 1e6,
        })
        .collect();
    series_from_days(days, cumulative, assets)
}

/// The `count` most recent weekdays on or before `today`, newest first
fn trading_days_back(today: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut day = today;
    while days.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day -= Duration::days(1);
    }
    days
}
