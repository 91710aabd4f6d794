//! Freshness windows and HTTP cache directives per endpoint

use chrono::Duration;

/// How long an endpoint's payload stays fresh and how clients may cache it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Freshness window in seconds
    pub window_secs: i64,
    /// Grace period advertised via `stale-while-revalidate`
    pub stale_while_revalidate_secs: i64,
    /// Whether entries are also keyed by the UTC calendar date
    pub date_keyed: bool,
}

impl CachePolicy {
    /// Market snapshot: 5 minutes
    pub const MARKET_SNAPSHOT: Self = Self::new(300, 60);
    /// Top-100 coins: 15 minutes
    pub const TOP_COINS: Self = Self::new(900, 300);
    /// Personal watchlist coins: 24 hours
    pub const PERSONAL: Self = Self::new(86_400, 3_600);
    /// Daily metric: 24 hours and the same UTC day
    pub const DAILY_METRIC: Self = Self::new(86_400, 3_600).keyed_by_date();
    /// Podcast feed: 10 minutes
    pub const PODCAST: Self = Self::new(600, 60);
    /// ETF flows: 1 hour
    pub const ETF_FLOWS: Self = Self::new(3_600, 600);
    /// Market mood: 1 hour, matching the hourly trail
    pub const MOOD: Self = Self::new(3_600, 300);

    const fn new(window_secs: i64, stale_while_revalidate_secs: i64) -> Self {
        Self {
            window_secs,
            stale_while_revalidate_secs,
            date_keyed: false,
        }
    }

    const fn keyed_by_date(self) -> Self {
        Self {
            date_keyed: true,
            ..self
        }
    }

    /// The freshness window as a duration
    pub fn window(&self) -> Duration {
        Duration::seconds(self.window_secs)
    }

    /// Value for the `Cache-Control` response header
    pub fn cache_control(&self) -> String {
        format!(
            "public, max-age={}, stale-while-revalidate={}",
            self.window_secs, self.stale_while_revalidate_secs
        )
    }
}
