//! Command-line and environment configuration for the Litmus server
//!
//! Every option can be given as a flag or through an environment variable,
//! which is how the service is configured when deployed. Raw arguments are
//! validated into a [`Config`] before anything is started.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::coingecko::COINGECKO_BASE_URL;
use crate::data::etf_flows::SOSOVALUE_BASE_URL;
use crate::data::metrics::{COINGLASS_BASE_URL, FEAR_GREED_BASE_URL};
use crate::data::podcast::PODCAST_FEED_URL;

/// Error types for configuration validation
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The bind address is not a valid socket address
    #[error("Invalid bind address: '{0}'. Expected host:port, e.g. 0.0.0.0:3000")]
    InvalidBind(String),

    /// An upstream URL is not http(s)
    #[error("Invalid {name} URL: '{value}'. Expected an http:// or https:// URL")]
    InvalidUrl { name: &'static str, value: String },

    /// No coin ids left after trimming the watchlist
    #[error("Watchlist is empty; provide at least one CoinGecko coin id")]
    EmptyWatchlist,

    /// A zero timeout would fail every upstream call
    #[error("Upstream timeout must be at least 1 second")]
    ZeroTimeout,
}

/// The Litmus - crypto market data API
#[derive(Parser, Debug)]
#[command(name = "litmus")]
#[command(about = "Market data API for The Litmus crypto magazine")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "LITMUS_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// CoinGecko API base URL
    #[arg(long, env = "COINGECKO_BASE_URL", default_value = COINGECKO_BASE_URL)]
    pub coingecko_url: String,

    /// alternative.me API base URL (Fear & Greed index)
    #[arg(long, env = "FEAR_GREED_BASE_URL", default_value = FEAR_GREED_BASE_URL)]
    pub fear_greed_url: String,

    /// CoinGlass API base URL (funding rates, open interest)
    #[arg(long, env = "COINGLASS_BASE_URL", default_value = COINGLASS_BASE_URL)]
    pub coinglass_url: String,

    /// Podcast RSS feed URL
    #[arg(long, env = "PODCAST_FEED_URL", default_value = PODCAST_FEED_URL)]
    pub podcast_feed_url: String,

    /// SoSoValue API base URL (ETF flows)
    #[arg(long, env = "SOSOVALUE_BASE_URL", default_value = SOSOVALUE_BASE_URL)]
    pub sosovalue_url: String,

    /// SoSoValue API key; ETF flows are mocked without one
    #[arg(long, env = "SOSOVALUE_API_KEY", hide_env_values = true)]
    pub sosovalue_api_key: Option<String>,

    /// Comma-separated CoinGecko ids for the personal watchlist
    #[arg(
        long,
        env = "LITMUS_WATCHLIST",
        value_delimiter = ',',
        default_value = "bitcoin,ethereum,solana,chainlink,avalanche-2"
    )]
    pub watchlist: Vec<String>,

    /// Per-request upstream timeout in seconds
    #[arg(long, env = "LITMUS_UPSTREAM_TIMEOUT", default_value_t = 10)]
    pub upstream_timeout: u64,

    /// Maximum number of podcast episodes returned
    #[arg(long, env = "LITMUS_PODCAST_EPISODES", default_value_t = 20)]
    pub podcast_episodes: usize,

    /// Emit logs as JSON lines
    #[arg(long, env = "LITMUS_LOG_JSON")]
    pub log_json: bool,
}

/// Validated configuration used to build the server
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub coingecko_url: String,
    pub fear_greed_url: String,
    pub coinglass_url: String,
    pub podcast_feed_url: String,
    pub sosovalue_url: String,
    pub sosovalue_api_key: Option<String>,
    pub watchlist: Vec<String>,
    pub upstream_timeout: Duration,
    pub podcast_episodes: usize,
    pub log_json: bool,
}

fn check_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidUrl {
            name,
            value: value.to_string(),
        })
    }
}

impl Config {
    /// Validates parsed CLI arguments into a `Config`.
    ///
    /// # Returns
    /// * `Ok(Config)` with normalized URLs and watchlist ids
    /// * `Err(ConfigError)` naming the first invalid option
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let bind = cli
            .bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBind(cli.bind.clone()))?;

        let watchlist: Vec<String> = cli
            .watchlist
            .iter()
            .map(|id| id.trim().to_lowercase())
            .filter(|id| !id.is_empty())
            .collect();
        if watchlist.is_empty() {
            return Err(ConfigError::EmptyWatchlist);
        }

        if cli.upstream_timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Config {
            bind,
            coingecko_url: check_url("CoinGecko", &cli.coingecko_url)?,
            fear_greed_url: check_url("Fear & Greed", &cli.fear_greed_url)?,
            coinglass_url: check_url("CoinGlass", &cli.coinglass_url)?,
            // Feed URLs are used verbatim, only the scheme is checked
            podcast_feed_url: check_url("podcast feed", &cli.podcast_feed_url)
                .map(|_| cli.podcast_feed_url.trim().to_string())?,
            sosovalue_url: check_url("SoSoValue", &cli.sosovalue_url)?,
            sosovalue_api_key: cli
                .sosovalue_api_key
                .as_ref()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            watchlist,
            upstream_timeout: Duration::from_secs(cli.upstream_timeout),
            podcast_episodes: cli.podcast_episodes,
            log_json: cli.log_json,
        })
    }
}
