//! Market mood: breadth and market-cap/volume ratio with a rolling trail
//!
//! Every fresh reading lands in an hourly trail, and the first reading of
//! each UTC day also lands in a daily trail. Unlike the other caches this
//! trail accumulates, so it sits behind a mutex.

use std::collections::VecDeque;
use std::sync::{LazyLock, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coingecko::MarketCoin;
use super::coins::{breadth, green_count, TOP_COINS_LIMIT};
use super::format::round1;
use super::{CoinGeckoClient, UpstreamError};

/// ~24 hours of hourly points plus one spare
const MAX_HOURLY_POINTS: usize = 25;

/// 7 days of daily points plus one spare
const MAX_DAILY_POINTS: usize = 8;

/// Ratio assumed when volume is zero
const DEFAULT_MV_RATIO: f64 = 20.0;

/// A single mood measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodReading {
    pub timestamp: DateTime<Utc>,
    /// Percent of top-100 coins up over 24h
    pub breadth: f64,
    /// Total market cap divided by 24h volume
    pub mv: f64,
    pub market_cap: f64,
    pub volume: f64,
    pub green_coins: usize,
    pub total_coins: usize,
}

/// A point on the mood trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodPoint {
    pub timestamp: DateTime<Utc>,
    pub breadth: f64,
    pub mv: f64,
}

impl From<&MoodReading> for MoodPoint {
    fn from(reading: &MoodReading) -> Self {
        Self {
            timestamp: reading.timestamp,
            breadth: reading.breadth,
            mv: reading.mv,
        }
    }
}

/// A point on the daily trail, which also keeps the raw totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMoodPoint {
    pub timestamp: DateTime<Utc>,
    pub breadth: f64,
    pub mv: f64,
    pub market_cap: f64,
    pub volume: f64,
}

impl From<&MoodReading> for DailyMoodPoint {
    fn from(reading: &MoodReading) -> Self {
        Self {
            timestamp: reading.timestamp,
            breadth: reading.breadth,
            mv: reading.mv,
            market_cap: reading.market_cap,
            volume: reading.volume,
        }
    }
}

/// Current reading plus both trails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodReport {
    pub current: MoodReading,
    pub hourly: Vec<MoodPoint>,
    pub daily: Vec<DailyMoodPoint>,
}

/// Served when nothing has ever been measured
pub static FALLBACK: LazyLock<MoodReport> = LazyLock::new(|| MoodReport {
    current: MoodReading {
        timestamp: DateTime::<Utc>::UNIX_EPOCH,
        breadth: 50.0,
        mv: DEFAULT_MV_RATIO,
        market_cap: 0.0,
        volume: 0.0,
        green_coins: 0,
        total_coins: 0,
    },
    hourly: Vec::new(),
    daily: Vec::new(),
});

#[derive(Debug, Default)]
struct Trail {
    hourly: VecDeque<MoodPoint>,
    daily: VecDeque<DailyMoodPoint>,
    last_daily_capture: Option<DateTime<Utc>>,
}

/// In-memory rolling history of mood readings
#[derive(Debug, Default)]
pub struct MoodHistory {
    trail: Mutex<Trail>,
}

impl MoodHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `reading` and returns the report including it
    pub fn record(&self, reading: MoodReading) -> MoodReport {
        let mut trail = self.trail.lock().unwrap_or_else(PoisonError::into_inner);
        trail.hourly.push_back(MoodPoint::from(&reading));
        while trail.hourly.len() > MAX_HOURLY_POINTS {
            trail.hourly.pop_front();
        }

        let new_day = trail
            .last_daily_capture
            .map_or(true, |last| reading.timestamp.date_naive() > last.date_naive());
        if new_day {
            trail.daily.push_back(DailyMoodPoint::from(&reading));
            while trail.daily.len() > MAX_DAILY_POINTS {
                trail.daily.pop_front();
            }
            trail.last_daily_capture = Some(reading.timestamp);
        }

        MoodReport {
            current: reading,
            hourly: trail.hourly.iter().cloned().collect(),
            daily: trail.daily.iter().cloned().collect(),
        }
    }
}

/// Measures the market and records the reading
pub async fn fetch_mood(
    coingecko: &CoinGeckoClient,
    history: &MoodHistory,
    now: DateTime<Utc>,
) -> Result<MoodReport, UpstreamError> {
    let (global, coins) = tokio::try_join!(coingecko.global(), coingecko.top_markets(TOP_COINS_LIMIT))?;
    let reading = measure(&coins, global.market_cap_usd(), global.volume_usd(), now);
    Ok(history.record(reading))
}

fn measure(coins: &[MarketCoin], market_cap: f64, volume: f64, now: DateTime<Utc>) -> MoodReading {
    let mv = if volume > 0.0 {
        round1(market_cap / volume)
    } else {
        DEFAULT_MV_RATIO
    };

    MoodReading {
        timestamp: now,
        breadth: breadth(coins),
        mv,
        market_cap,
        volume,
        green_coins: green_count(coins),
        total_coins: coins.len(),
    }
}
