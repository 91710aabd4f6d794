//! Upstream clients and the normalized payloads they produce
//!
//! Each submodule calls one third-party source, maps its provider-specific
//! fields onto the application's camelCase schema, and derives any labels or
//! deltas the site renders. Raw upstream field names never leave this module.

pub mod coingecko;
pub mod coins;
pub mod etf_flows;
pub mod format;
pub mod market;
pub mod metrics;
pub mod mood;
pub mod podcast;
mod upstream;

pub use coingecko::CoinGeckoClient;
pub use coins::{Coin, ExtendedCoin, PersonalData, TopCoins};
pub use etf_flows::{EtfFlowSeries, EtfFlows, EtfFlowsClient};
pub use market::MarketSnapshot;
pub use metrics::{Interpretation, MetricKind, NormalizedMetric};
pub use mood::{DailyMoodPoint, MoodHistory, MoodReading, MoodReport};
pub use podcast::{Episode, PodcastClient, PodcastFeed};
pub use upstream::{Upstream, UpstreamError};
