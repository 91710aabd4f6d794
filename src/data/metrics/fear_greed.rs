//! alternative.me Fear & Greed Index

use chrono::DateTime;
use serde::Deserialize;

use super::{normalized, HistoryPoint, MetricKind, NormalizedMetric};
use crate::data::upstream::{join_url, Upstream, UpstreamError};

/// Default alternative.me API base URL
pub const FEAR_GREED_BASE_URL: &str = "https://api.alternative.me";

const SOURCE: &str = "alternative.me";

/// Days of history requested
const HISTORY_DAYS: &str = "7";

#[derive(Debug, Default, Deserialize)]
struct FngResponse {
    #[serde(default)]
    data: Vec<FngPoint>,
}

/// Values and timestamps arrive as strings
#[derive(Debug, Default, Deserialize)]
struct FngPoint {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Client for the Fear & Greed endpoint
#[derive(Debug, Clone)]
pub struct FearGreedClient {
    upstream: Upstream,
    base_url: String,
}

impl FearGreedClient {
    pub fn new(upstream: Upstream, base_url: impl Into<String>) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
        }
    }

    async fn recent(&self) -> Result<FngResponse, UpstreamError> {
        let request = self
            .upstream
            .get(&join_url(&self.base_url, "fng/"))
            .query(&[("limit", HISTORY_DAYS)]);
        self.upstream.json(SOURCE, request).await
    }
}

pub(super) async fn fetch(client: &FearGreedClient) -> Result<NormalizedMetric, UpstreamError> {
    let response = client.recent().await?;
    Ok(build(&response))
}

/// Upstream lists newest first; history is returned oldest first
fn build(response: &FngResponse) -> NormalizedMetric {
    let values: Vec<f64> = response.data.iter().map(parse_value).collect();
    let current = values.first().copied().unwrap_or(0.0);

    let change = values.get(1).map(|yesterday| {
        let delta = (current - yesterday).round() as i64;
        if delta > 0 {
            format!("+{}", delta)
        } else {
            delta.to_string()
        }
    });

    let history = response
        .data
        .iter()
        .rev()
        .map(|p| HistoryPoint {
            value: parse_value(p),
            date: parse_date(p),
        })
        .collect();

    normalized(
        MetricKind::FearGreed,
        format!("{}", current.round() as i64),
        current,
        "/100",
        current,
        change,
        history,
    )
}

fn parse_value(point: &FngPoint) -> f64 {
    point
        .value
        .as_deref()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0.0)
}

fn parse_date(point: &FngPoint) -> String {
    point
        .timestamp
        .as_deref()
        .and_then(|t| t.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "?".to_string())
}
