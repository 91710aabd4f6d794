//! The rotating "metric of the day"
//!
//! Five market indicators share one normalized shape. Which one is shown is
//! a pure function of the UTC weekday; each indicator is labelled by fixed
//! thresholds (inclusive upper bounds, checked in ascending order, first
//! match wins) and paired with a static context sentence.

mod coinglass;
mod dominance;
mod fear_greed;
mod funding;
mod open_interest;
mod stablecoins;

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::{CoinGeckoClient, UpstreamError};

pub use coinglass::{CoinGlassClient, COINGLASS_BASE_URL};
pub use fear_greed::{FearGreedClient, FEAR_GREED_BASE_URL};

/// Which indicator a metric describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    FearGreed,
    BtcDominance,
    FundingRates,
    OpenInterest,
    StablecoinSupply,
}

/// Sentiment bucket derived from a metric's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpretation {
    Bearish,
    Cautious,
    Neutral,
    Optimistic,
    Bullish,
}

/// One point of a metric's recent history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub value: f64,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
}

/// The normalized shape every daily metric is rendered from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMetric {
    pub metric: MetricKind,
    pub label: String,
    pub value: String,
    pub numeric_value: f64,
    pub unit: String,
    pub context: String,
    pub interpretation: Interpretation,
    pub change: Option<String>,
    pub history: Vec<HistoryPoint>,
}

/// Weekday rotation indexed by days since Sunday
const ROTATION: [MetricKind; 7] = [
    MetricKind::StablecoinSupply, // Sunday
    MetricKind::FearGreed,        // Monday
    MetricKind::BtcDominance,     // Tuesday
    MetricKind::FundingRates,     // Wednesday
    MetricKind::OpenInterest,     // Thursday
    MetricKind::StablecoinSupply, // Friday
    MetricKind::StablecoinSupply, // Saturday
];

/// Selects the metric for a weekday number, 0 = Sunday .. 6 = Saturday
///
/// Out-of-range inputs wrap modulo 7.
pub fn metric_for_weekday(day: u32) -> MetricKind {
    ROTATION[(day % 7) as usize]
}

/// Selects the metric for the UTC weekday of `now`
pub fn metric_for(now: DateTime<Utc>) -> MetricKind {
    metric_for_weekday(now.weekday().num_days_from_sunday())
}

impl MetricKind {
    /// All kinds, in rotation order from Monday
    pub const ALL: [MetricKind; 5] = [
        MetricKind::FearGreed,
        MetricKind::BtcDominance,
        MetricKind::FundingRates,
        MetricKind::OpenInterest,
        MetricKind::StablecoinSupply,
    ];

    fn index(self) -> usize {
        match self {
            MetricKind::FearGreed => 0,
            MetricKind::BtcDominance => 1,
            MetricKind::FundingRates => 2,
            MetricKind::OpenInterest => 3,
            MetricKind::StablecoinSupply => 4,
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::FearGreed => "Fear & Greed Index",
            MetricKind::BtcDominance => "Bitcoin Dominance",
            MetricKind::FundingRates => "BTC Funding Rate",
            MetricKind::OpenInterest => "BTC Open Interest",
            MetricKind::StablecoinSupply => "Stablecoin Supply",
        }
    }

    /// Threshold table: inclusive upper bounds and the label above the last
    fn bands(self) -> (&'static [(f64, Interpretation)], Interpretation) {
        use Interpretation::*;
        match self {
            MetricKind::FearGreed => (
                &[(20.0, Bearish), (40.0, Cautious), (60.0, Neutral), (80.0, Optimistic)],
                Bullish,
            ),
            // Percent of total market cap; low dominance means risk appetite
            MetricKind::BtcDominance => (
                &[(40.0, Bullish), (50.0, Optimistic), (58.0, Neutral), (65.0, Cautious)],
                Bearish,
            ),
            // Annualized percent
            MetricKind::FundingRates => (
                &[(-5.0, Bearish), (0.0, Cautious), (15.0, Neutral), (30.0, Optimistic)],
                Bullish,
            ),
            // 24h change in percent
            MetricKind::OpenInterest => (
                &[(-10.0, Bearish), (-3.0, Cautious), (3.0, Neutral), (10.0, Optimistic)],
                Bullish,
            ),
            // 24h change in percent
            MetricKind::StablecoinSupply => (
                &[(-1.0, Bearish), (-0.25, Cautious), (0.25, Neutral), (1.0, Optimistic)],
                Bullish,
            ),
        }
    }

    /// Labels `value` with this metric's thresholds
    pub fn interpret(self, value: f64) -> Interpretation {
        let (bands, otherwise) = self.bands();
        bands
            .iter()
            .find(|(upper, _)| value <= *upper)
            .map(|(_, label)| *label)
            .unwrap_or(otherwise)
    }

    /// Context sentence for an interpretation of this metric
    pub fn context(self, interpretation: Interpretation) -> &'static str {
        use Interpretation::*;
        match (self, interpretation) {
            (MetricKind::FearGreed, Bearish) => "Extreme fear. Sellers are exhausting themselves and capitulation is in the air.",
            (MetricKind::FearGreed, Cautious) => "Fear dominates. Investors are defensive and waiting for confirmation.",
            (MetricKind::FearGreed, Neutral) => "Sentiment is balanced. Neither greed nor fear is driving decisions.",
            (MetricKind::FearGreed, Optimistic) => "Greed is building. Confidence is returning, and so is risk-taking.",
            (MetricKind::FearGreed, Bullish) => "Extreme greed. Euphoria tends to precede pullbacks.",

            (MetricKind::BtcDominance, Bullish) => "Capital is rotating hard into altcoins. Risk appetite is at its widest.",
            (MetricKind::BtcDominance, Optimistic) => "Altcoins are taking share. Investors are reaching further out the curve.",
            (MetricKind::BtcDominance, Neutral) => "Bitcoin's share is steady. No decisive rotation in either direction.",
            (MetricKind::BtcDominance, Cautious) => "Money is consolidating into Bitcoin. Investors prefer the perceived safe asset.",
            (MetricKind::BtcDominance, Bearish) => "A flight to Bitcoin. Altcoin liquidity is draining away.",

            (MetricKind::FundingRates, Bearish) => "Shorts are paying heavily to stay short. Positioning is crowded to the downside.",
            (MetricKind::FundingRates, Cautious) => "Funding is flat to negative. Traders are hedged rather than leaning long.",
            (MetricKind::FundingRates, Neutral) => "Funding sits near its baseline. Leverage is balanced between longs and shorts.",
            (MetricKind::FundingRates, Optimistic) => "Longs are paying a premium. Demand for leveraged upside is growing.",
            (MetricKind::FundingRates, Bullish) => "Longs are paying a steep premium. Crowded leverage raises squeeze risk.",

            (MetricKind::OpenInterest, Bearish) => "Open interest is collapsing. Leverage is being flushed out of the system.",
            (MetricKind::OpenInterest, Cautious) => "Positions are being closed. Traders are reducing exposure.",
            (MetricKind::OpenInterest, Neutral) => "Open interest is stable. Leverage is neither building nor unwinding.",
            (MetricKind::OpenInterest, Optimistic) => "New positions are opening. Conviction is returning to derivatives.",
            (MetricKind::OpenInterest, Bullish) => "Leverage is surging. Big moves, in either direction, become more likely.",

            (MetricKind::StablecoinSupply, Bearish) => "Stablecoins are being redeemed. Dry powder is leaving the ecosystem.",
            (MetricKind::StablecoinSupply, Cautious) => "Stablecoin supply is shrinking slightly. Inflows have stalled.",
            (MetricKind::StablecoinSupply, Neutral) => "Stablecoin supply is flat. Sidelined capital is holding steady.",
            (MetricKind::StablecoinSupply, Optimistic) => "Stablecoin supply is growing. Fresh capital is arriving on-chain.",
            (MetricKind::StablecoinSupply, Bullish) => "Stablecoin issuance is surging. A wave of buying power is entering crypto.",
        }
    }
}

/// Assembles a metric from its value and display pieces
pub(crate) fn normalized(
    kind: MetricKind,
    value: String,
    numeric_value: f64,
    unit: &str,
    interpret_on: f64,
    change: Option<String>,
    history: Vec<HistoryPoint>,
) -> NormalizedMetric {
    let interpretation = kind.interpret(interpret_on);
    NormalizedMetric {
        metric: kind,
        label: kind.label().to_string(),
        value,
        numeric_value,
        unit: unit.to_string(),
        context: kind.context(interpretation).to_string(),
        interpretation,
        change,
        history,
    }
}

/// Clients the five metric fetchers draw on
#[derive(Debug, Clone)]
pub struct MetricSources {
    pub coingecko: CoinGeckoClient,
    pub fear_greed: FearGreedClient,
    pub coinglass: CoinGlassClient,
}

/// Fetches and normalizes the given metric
pub async fn fetch_metric(
    kind: MetricKind,
    sources: &MetricSources,
) -> Result<NormalizedMetric, UpstreamError> {
    match kind {
        MetricKind::FearGreed => fear_greed::fetch(&sources.fear_greed).await,
        MetricKind::BtcDominance => dominance::fetch(&sources.coingecko).await,
        MetricKind::FundingRates => funding::fetch(&sources.coinglass).await,
        MetricKind::OpenInterest => open_interest::fetch(&sources.coinglass).await,
        MetricKind::StablecoinSupply => stablecoins::fetch(&sources.coingecko).await,
    }
}

static FALLBACKS: LazyLock<[NormalizedMetric; 5]> = LazyLock::new(|| {
    [
        normalized(MetricKind::FearGreed, "50".to_string(), 50.0, "/100", 50.0, None, Vec::new()),
        normalized(MetricKind::BtcDominance, "57.0%".to_string(), 57.0, "%", 57.0, None, Vec::new()),
        normalized(
            MetricKind::FundingRates,
            "0.0100%".to_string(),
            10.95,
            "≈ 11% APR",
            10.95,
            None,
            Vec::new(),
        ),
        normalized(MetricKind::OpenInterest, "$60B".to_string(), 60.0, "USD", 0.0, None, Vec::new()),
        normalized(
            MetricKind::StablecoinSupply,
            "$200B".to_string(),
            200.0,
            "USD",
            0.0,
            None,
            Vec::new(),
        ),
    ]
});

/// Placeholder metric served when the upstream is down and nothing is cached
pub fn fallback(kind: MetricKind) -> &'static NormalizedMetric {
    &FALLBACKS[kind.index()]
}
