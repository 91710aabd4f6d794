//! GET handlers, one per endpoint
//!
//! Each handler resolves its cache slot against the shared clock and turns
//! the outcome into an envelope. Upstream failures never escape as errors.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::response::{respond, Fallback};
use super::AppState;
use crate::cache::{resolve, CachePolicy};
use crate::data::coins::{build_top_coins, fetch_personal, fetch_top_coins, PERSONAL_FALLBACK};
use crate::data::market::{fetch_market_snapshot, FALLBACK as MARKET_FALLBACK};
use crate::data::metrics::{self, fetch_metric, metric_for};
use crate::data::mood::{fetch_mood, FALLBACK as MOOD_FALLBACK};
use crate::data::{etf_flows, podcast};

/// GET /api/market-data
pub async fn market_data(State(state): State<Arc<AppState>>) -> Response {
    let policy = CachePolicy::MARKET_SNAPSHOT;
    let resolution = resolve("market-data", &state.caches.market, policy, state.clock.as_ref(), || {
        fetch_market_snapshot(&state.coingecko)
    })
    .await;
    respond(resolution, policy, state.clock.now(), Fallback::Placeholder(&*MARKET_FALLBACK))
}

/// GET /api/top-coins
///
/// The only endpoint without a placeholder: a cold failure is a 500.
pub async fn top_coins(State(state): State<Arc<AppState>>) -> Response {
    let policy = CachePolicy::TOP_COINS;
    let resolution = resolve("top-coins", &state.caches.top_coins, policy, state.clock.as_ref(), || {
        fetch_top_coins(&state.coingecko)
    })
    .await;
    let empty = build_top_coins(&[]);
    respond(resolution, policy, state.clock.now(), Fallback::Unavailable(&empty))
}

/// GET /api/personal-data
pub async fn personal_data(State(state): State<Arc<AppState>>) -> Response {
    let policy = CachePolicy::PERSONAL;
    let resolution = resolve("personal-data", &state.caches.personal, policy, state.clock.as_ref(), || {
        fetch_personal(&state.coingecko, &state.watchlist)
    })
    .await;
    respond(resolution, policy, state.clock.now(), Fallback::Placeholder(&*PERSONAL_FALLBACK))
}

/// GET /api/daily-metric
pub async fn daily_metric(State(state): State<Arc<AppState>>) -> Response {
    let policy = CachePolicy::DAILY_METRIC;
    // Picked from the clock on every call so the rotation follows the UTC day
    let kind = metric_for(state.clock.now());
    let resolution = resolve("daily-metric", &state.caches.daily_metric, policy, state.clock.as_ref(), || {
        fetch_metric(kind, &state.metrics)
    })
    .await;
    respond(resolution, policy, state.clock.now(), Fallback::Placeholder(metrics::fallback(kind)))
}

/// GET /api/podcast
pub async fn podcast_feed(State(state): State<Arc<AppState>>) -> Response {
    let policy = CachePolicy::PODCAST;
    let resolution = resolve("podcast", &state.caches.podcast, policy, state.clock.as_ref(), || {
        state.podcast.fetch_feed()
    })
    .await;
    respond(resolution, policy, state.clock.now(), Fallback::Placeholder(&*podcast::FALLBACK))
}

/// GET /api/etf-flows
pub async fn etf_flows(State(state): State<Arc<AppState>>) -> Response {
    let policy = CachePolicy::ETF_FLOWS;
    let today = state.clock.now().date_naive();
    let resolution = resolve("etf-flows", &state.caches.etf_flows, policy, state.clock.as_ref(), || {
        state.etf_flows.fetch_flows(today)
    })
    .await;
    respond(resolution, policy, state.clock.now(), Fallback::Placeholder(&*etf_flows::FALLBACK))
}

/// GET /api/mood
pub async fn mood(State(state): State<Arc<AppState>>) -> Response {
    let policy = CachePolicy::MOOD;
    let now = state.clock.now();
    let resolution = resolve("mood", &state.caches.mood, policy, state.clock.as_ref(), || {
        fetch_mood(&state.coingecko, &state.mood_history, now)
    })
    .await;
    respond(resolution, policy, state.clock.now(), Fallback::Placeholder(&*MOOD_FALLBACK))
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Endpoints whose cache has been filled at least once
    pub warm_caches: Vec<&'static str>,
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let caches = &state.caches;
    let warm = [
        ("market-data", caches.market.is_populated()),
        ("top-coins", caches.top_coins.is_populated()),
        ("personal-data", caches.personal.is_populated()),
        ("daily-metric", caches.daily_metric.is_populated()),
        ("podcast", caches.podcast.is_populated()),
        ("etf-flows", caches.etf_flows.is_populated()),
        ("mood", caches.mood.is_populated()),
    ];

    let body = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: state.clock.now(),
        warm_caches: warm
            .into_iter()
            .filter_map(|(name, populated)| populated.then_some(name))
            .collect(),
    };

    ([(header::CACHE_CONTROL, "no-store")], Json(body)).into_response()
}
