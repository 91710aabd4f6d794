//! CoinGlass public derivatives endpoints (funding and open interest)

use serde::Deserialize;

use crate::data::upstream::{join_url, Upstream, UpstreamError};

/// Default CoinGlass public API base URL
pub const COINGLASS_BASE_URL: &str = "https://open-api.coinglass.com/public/v2";

const SOURCE: &str = "coinglass";

#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Per-symbol funding, one entry per USDT-margined venue
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FundingRow {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub u_margin_list: Vec<VenueRate>,
}

/// Rates are quoted in percent per 8-hour period
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VenueRate {
    #[serde(default)]
    pub rate: Option<f64>,
}

/// Open interest per venue; the "All" row aggregates every venue
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OpenInterestRow {
    #[serde(default)]
    pub exchange_name: Option<String>,
    #[serde(default)]
    pub open_interest: Option<f64>,
    #[serde(default)]
    pub h24_change: Option<f64>,
}

/// Client for the CoinGlass public API
#[derive(Debug, Clone)]
pub struct CoinGlassClient {
    upstream: Upstream,
    base_url: String,
}

impl CoinGlassClient {
    pub fn new(upstream: Upstream, base_url: impl Into<String>) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
        }
    }

    pub(super) async fn funding(&self) -> Result<Vec<FundingRow>, UpstreamError> {
        let request = self.upstream.get(&join_url(&self.base_url, "funding"));
        let envelope: Envelope<FundingRow> = self.upstream.json(SOURCE, request).await?;
        Ok(envelope.data)
    }

    pub(super) async fn open_interest(
        &self,
        symbol: &str,
    ) -> Result<Vec<OpenInterestRow>, UpstreamError> {
        let request = self
            .upstream
            .get(&join_url(&self.base_url, "open_interest"))
            .query(&[("symbol", symbol)]);
        let envelope: Envelope<OpenInterestRow> = self.upstream.json(SOURCE, request).await?;
        Ok(envelope.data)
    }
}
