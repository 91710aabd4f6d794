//! Shared handler state: upstream clients plus one cache slot per endpoint

use std::sync::Arc;

use crate::cache::{CacheSlot, Clock};
use crate::cli::Config;
use crate::data::metrics::{CoinGlassClient, FearGreedClient, MetricSources};
use crate::data::{
    CoinGeckoClient, EtfFlows, EtfFlowsClient, MarketSnapshot, MoodHistory, MoodReport,
    NormalizedMetric, PersonalData, PodcastClient, PodcastFeed, TopCoins, Upstream,
};

/// Cache slots, one per cached endpoint
///
/// All slots start empty and live as long as the process.
#[derive(Debug, Default)]
pub struct Caches {
    pub market: CacheSlot<MarketSnapshot>,
    pub top_coins: CacheSlot<TopCoins>,
    pub personal: CacheSlot<PersonalData>,
    pub daily_metric: CacheSlot<NormalizedMetric>,
    pub podcast: CacheSlot<PodcastFeed>,
    pub etf_flows: CacheSlot<EtfFlows>,
    pub mood: CacheSlot<MoodReport>,
}

/// State injected into every handler
pub struct AppState {
    pub coingecko: CoinGeckoClient,
    pub metrics: MetricSources,
    pub podcast: PodcastClient,
    pub etf_flows: EtfFlowsClient,
    pub watchlist: Vec<String>,
    pub mood_history: MoodHistory,
    pub caches: Caches,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Builds clients from `config`; all share one HTTP connection pool
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, reqwest::Error> {
        let upstream = Upstream::new(config.upstream_timeout)?;
        let coingecko = CoinGeckoClient::new(upstream.clone(), config.coingecko_url.clone());

        Ok(Self {
            metrics: MetricSources {
                coingecko: coingecko.clone(),
                fear_greed: FearGreedClient::new(upstream.clone(), config.fear_greed_url.clone()),
                coinglass: CoinGlassClient::new(upstream.clone(), config.coinglass_url.clone()),
            },
            podcast: PodcastClient::new(
                upstream.clone(),
                config.podcast_feed_url.clone(),
                config.podcast_episodes,
            ),
            etf_flows: EtfFlowsClient::new(
                upstream,
                config.sosovalue_url.clone(),
                config.sosovalue_api_key.clone(),
            ),
            coingecko,
            watchlist: config.watchlist.clone(),
            mood_history: MoodHistory::new(),
            caches: Caches::default(),
            clock,
        })
    }
}
