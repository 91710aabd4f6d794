//! Integration tests for the HTTP endpoints
//!
//! Every upstream points at one mockito server; time is driven by a manual
//! clock so freshness windows can be crossed without sleeping.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::Value;
use tower::ServiceExt;

use litmus::api::{router, AppState};
use litmus::cache::ManualClock;
use litmus::cli::{Cli, Config};
use litmus::data::coins::PERSONAL_FALLBACK;
use litmus::data::{etf_flows, market, metrics, mood, podcast, MetricKind};

const SIMPLE_PRICE: &str = r#"{
    "bitcoin": {"usd": 101234.5, "usd_24h_change": 2.5},
    "ethereum": {"usd": 3821.0, "usd_24h_change": -1.25}
}"#;

const GLOBAL: &str = r#"{"data": {
    "total_market_cap": {"usd": 3.5e12},
    "total_volume": {"usd": 1.4e11},
    "market_cap_percentage": {"btc": 57.44},
    "market_cap_change_percentage_24h_usd": 1.8
}}"#;

const FNG: &str = r#"{"data": [
    {"value": "72", "timestamp": "1740960000"},
    {"value": "65", "timestamp": "1740873600"}
]}"#;

const TOP_MARKETS: &str = r#"[
    {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 101234.5, "market_cap": 2.0e12, "market_cap_rank": 1, "total_volume": 5.0e10, "price_change_percentage_24h": 2.5},
    {"id": "ethereum", "symbol": "eth", "name": "Ethereum", "current_price": 3821.0, "market_cap": 4.6e11, "market_cap_rank": 2, "total_volume": 2.0e10, "price_change_percentage_24h": -1.25}
]"#;

const FEED: &str = r#"<?xml version="1.0"?>
<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel>
  <title>The Litmus Podcast</title>
  <itunes:image href="https://img.example/show.jpg"/>
  <item>
    <title><![CDATA[Ep 1: Hello]]></title>
    <guid>ep-1</guid>
    <itunes:duration>25:00</itunes:duration>
    <enclosure url="https://cdn.example/ep1.mp3" type="audio/mpeg"/>
  </item>
</channel></rss>"#;

const PERSONAL_MARKETS: &str = r#"[
    {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 101234.5, "market_cap": 2.0e12, "market_cap_rank": 1,
     "price_change_percentage_24h": 2.5, "price_change_percentage_7d_in_currency": 6.1, "price_change_percentage_30d_in_currency": -4.3,
     "high_24h": 102000.0, "low_24h": 98500.0, "ath": 109000.0, "ath_change_percentage": -7.1, "circulating_supply": 19800000.0}
]"#;

const ETF_INFLOW: &str = r#"{"code": 0, "data": [
    {"date": "2025-02-28", "totalNetInflow": -1.2e8, "cumNetInflow": 3.88e10, "totalNetAssets": 1.15e11},
    {"date": "2025-03-03", "totalNetInflow": 2.5e8, "cumNetInflow": 3.9e10, "totalNetAssets": 1.18e11}
]}"#;

const FUNDING: &str = r#"{"code": "0", "data": [
    {"symbol": "BTC", "uMarginList": [{"exchangeName": "Binance", "rate": 0.01}, {"exchangeName": "OKX", "rate": 0.03}]},
    {"symbol": "ETH", "uMarginList": [{"exchangeName": "Binance", "rate": 0.5}]}
]}"#;

const OPEN_INTEREST: &str = r#"{"code": "0", "data": [
    {"exchangeName": "Binance", "openInterest": 1.2e10, "h24Change": 1.0},
    {"exchangeName": "All", "openInterest": 3.5e10, "h24Change": 4.2}
]}"#;

const STABLECOIN_MARKETS: &str = r#"[
    {"id": "tether", "symbol": "usdt", "market_cap": 1.5e11, "market_cap_change_24h": 1.5e9},
    {"id": "usd-coin", "symbol": "usdc", "market_cap": 5.0e10, "market_cap_change_24h": 5.0e8}
]"#;

struct Harness {
    server: ServerGuard,
    clock: Arc<ManualClock>,
    app: Router,
}

/// Monday 2025-03-03 12:00 UTC
async fn harness(extra_args: &[&str]) -> Harness {
    let server = mockito::Server::new_async().await;
    let url = server.url();
    let feed_url = format!("{}/feed", url);

    let mut args = vec![
        "litmus",
        "--coingecko-url",
        url.as_str(),
        "--fear-greed-url",
        url.as_str(),
        "--coinglass-url",
        url.as_str(),
        "--podcast-feed-url",
        feed_url.as_str(),
        "--sosovalue-url",
        url.as_str(),
        "--upstream-timeout",
        "5",
    ];
    args.extend_from_slice(extra_args);
    let config = Config::from_cli(&Cli::parse_from(args)).unwrap();

    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap()));
    let state = AppState::new(&config, clock.clone()).unwrap();

    Harness {
        server,
        clock,
        app: router(Arc::new(state)),
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

async fn mock_json(server: &mut ServerGuard, path: &str, body: &str, hits: usize) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

/// Asserts every payload field of `expected` appears unchanged in `body`
fn assert_payload_eq(body: &Value, expected: &Value) {
    for (key, value) in expected.as_object().unwrap() {
        assert_eq!(&body[key], value, "field {} differs", key);
    }
}

#[tokio::test]
async fn test_market_data_cold_failure_serves_fallback() {
    let h = harness(&[]).await;

    let (status, headers, body) = get(&h.app, "/api/market-data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, max-age=300, stale-while-revalidate=60"
    );
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["cached"], false);
    assert!(body["error"].is_string());
    assert_payload_eq(&body, &serde_json::to_value(&*market::FALLBACK).unwrap());
}

#[tokio::test]
async fn test_market_data_second_call_is_cached() {
    let mut h = harness(&[]).await;
    let price = mock_json(&mut h.server, "/simple/price", SIMPLE_PRICE, 1).await;
    let global = mock_json(&mut h.server, "/global", GLOBAL, 1).await;

    let (_, _, first) = get(&h.app, "/api/market-data").await;
    h.clock.advance(Duration::seconds(120));
    let (_, _, second) = get(&h.app, "/api/market-data").await;

    price.assert_async().await;
    global.assert_async().await;
    assert_eq!(first["cached"], false);
    assert_eq!(first["btcPrice"], 101234.5);
    assert_eq!(first["totalMarketCapFormatted"], "$3.5T");
    assert_eq!(second["cached"], true);
    assert_eq!(second["cacheAge"], 120);
    assert_eq!(second["updated"], first["updated"]);

    let mut expected = first.clone();
    let mut actual = second.clone();
    for v in [&mut expected, &mut actual] {
        let obj = v.as_object_mut().unwrap();
        obj.remove("cached");
        obj.remove("cacheAge");
    }
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_market_data_refetches_once_after_expiry() {
    let mut h = harness(&[]).await;
    let price = mock_json(&mut h.server, "/simple/price", SIMPLE_PRICE, 2).await;
    let global = mock_json(&mut h.server, "/global", GLOBAL, 2).await;

    get(&h.app, "/api/market-data").await;
    h.clock.advance(Duration::seconds(301));
    let (_, _, refreshed) = get(&h.app, "/api/market-data").await;
    let (_, _, cached) = get(&h.app, "/api/market-data").await;

    price.assert_async().await;
    global.assert_async().await;
    assert_eq!(refreshed["cached"], false);
    assert_eq!(cached["cached"], true);
}

#[tokio::test]
async fn test_market_data_serves_stale_after_window() {
    let mut h = harness(&[]).await;
    let price = mock_json(&mut h.server, "/simple/price", SIMPLE_PRICE, 1).await;
    let global = mock_json(&mut h.server, "/global", GLOBAL, 1).await;

    let (_, _, first) = get(&h.app, "/api/market-data").await;
    price.remove_async().await;
    global.remove_async().await;

    h.clock.advance(Duration::seconds(301));
    let (status, _, stale) = get(&h.app, "/api/market-data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stale["stale"], true);
    assert_eq!(stale["cached"], true);
    assert_eq!(stale["cacheAge"], 301);
    assert!(stale["error"].is_string());
    assert!(stale.get("source").is_none());
    assert_eq!(stale["btcPrice"], first["btcPrice"]);
    assert_eq!(stale["updated"], first["updated"]);
}

#[tokio::test]
async fn test_top_coins_cold_failure_is_500() {
    let h = harness(&[]).await;

    let (status, _, body) = get(&h.app, "/api/top-coins").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["coins"], Value::Array(Vec::new()));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_top_coins_breadth() {
    let mut h = harness(&[]).await;
    let markets = mock_json(&mut h.server, "/coins/markets", TOP_MARKETS, 1).await;

    let (status, headers, body) = get(&h.app, "/api/top-coins").await;

    markets.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, max-age=900, stale-while-revalidate=300"
    );
    assert_eq!(body["count"], 2);
    assert_eq!(body["breadth"], 50.0);
    assert_eq!(body["coins"][0]["symbol"], "BTC");
}

#[tokio::test]
async fn test_daily_metric_rotates_with_utc_day() {
    let mut h = harness(&[]).await;
    let fng = mock_json(&mut h.server, "/fng/", FNG, 1).await;
    let global = mock_json(&mut h.server, "/global", GLOBAL, 1).await;

    // Monday
    let (_, headers, monday) = get(&h.app, "/api/daily-metric").await;
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, max-age=86400, stale-while-revalidate=3600"
    );
    assert_eq!(monday["metric"], "fear_greed");
    assert_eq!(monday["value"], "72");
    assert_eq!(monday["interpretation"], "optimistic");
    assert_eq!(monday["change"], "+7");

    // Still inside the 24h window, but a new UTC day
    h.clock.advance(Duration::hours(13));
    let (_, _, tuesday) = get(&h.app, "/api/daily-metric").await;

    fng.assert_async().await;
    global.assert_async().await;
    assert_eq!(tuesday["metric"], "btc_dominance");
    assert_eq!(tuesday["value"], "57.4%");
    assert_eq!(tuesday["cached"], false);
}

#[tokio::test]
async fn test_daily_metric_fallback_matches_today() {
    let h = harness(&[]).await;

    let (status, _, body) = get(&h.app, "/api/daily-metric").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["metric"], "fear_greed");
}

#[tokio::test]
async fn test_personal_data_fallback() {
    let h = harness(&[]).await;

    let (status, _, body) = get(&h.app, "/api/personal-data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["coins"][0]["id"], "bitcoin");
}

#[tokio::test]
async fn test_podcast_feed() {
    let mut h = harness(&[]).await;
    let feed = h
        .server
        .mock("GET", "/feed")
        .with_header("content-type", "application/rss+xml")
        .with_body(FEED)
        .create_async()
        .await;

    let (_, _, body) = get(&h.app, "/api/podcast").await;

    feed.assert_async().await;
    assert_eq!(body["title"], "The Litmus Podcast");
    assert_eq!(body["episodeCount"], 1);
    assert_eq!(body["episodes"][0]["title"], "Ep 1: Hello");
    assert_eq!(body["episodes"][0]["durationSeconds"], 1500);
    assert_eq!(body["episodes"][0]["image"], "https://img.example/show.jpg");
}

#[tokio::test]
async fn test_podcast_malformed_feed_serves_fallback() {
    let mut h = harness(&[]).await;
    h.server
        .mock("GET", "/feed")
        .with_body("<rss><channel><title>broken</channel>")
        .create_async()
        .await;

    let (_, _, body) = get(&h.app, "/api/podcast").await;

    assert_eq!(body["source"], "fallback");
    assert_eq!(body["title"], podcast::FALLBACK.title);
}

#[tokio::test]
async fn test_etf_flows_without_key_are_mocked() {
    let h = harness(&[]).await;

    let (status, _, body) = get(&h.app, "/api/etf-flows").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mock"], true);
    assert_eq!(body["btc"]["latestDate"], "2025-03-03");
    assert!(body.get("source").is_none());
}

#[tokio::test]
async fn test_mood_records_trail() {
    let mut h = harness(&[]).await;
    let _global = mock_json(&mut h.server, "/global", GLOBAL, 2).await;
    let _markets = mock_json(&mut h.server, "/coins/markets", TOP_MARKETS, 2).await;

    let (_, _, first) = get(&h.app, "/api/mood").await;
    h.clock.advance(Duration::hours(1));
    let (_, _, second) = get(&h.app, "/api/mood").await;

    assert_eq!(first["current"]["breadth"], 50.0);
    assert_eq!(first["current"]["mv"], 25.0);
    assert_eq!(second["cached"], false);
    assert_eq!(second["hourly"].as_array().unwrap().len(), 2);
    assert_eq!(second["daily"].as_array().unwrap().len(), 1);
    assert_eq!(second["daily"][0]["marketCap"], 3.5e12);
    assert_eq!(second["daily"][0]["volume"], 1.4e11);
}

#[tokio::test]
async fn test_health_lists_warm_caches() {
    let mut h = harness(&[]).await;
    let _price = mock_json(&mut h.server, "/simple/price", SIMPLE_PRICE, 1).await;
    let _global = mock_json(&mut h.server, "/global", GLOBAL, 1).await;

    get(&h.app, "/api/market-data").await;
    let (status, headers, body) = get(&h.app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["warmCaches"], serde_json::json!(["market-data"]));
}

/// One upstream call an endpoint makes, and how often per refresh
struct Stub {
    method: &'static str,
    path: &'static str,
    body: &'static str,
    content_type: &'static str,
    per_fetch: usize,
}

impl Stub {
    const fn get(path: &'static str, body: &'static str) -> Self {
        Self {
            method: "GET",
            path,
            body,
            content_type: "application/json",
            per_fetch: 1,
        }
    }

    async fn mount(&self, server: &mut ServerGuard, fetches: usize) -> Mock {
        server
            .mock(self.method, self.path)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", self.content_type)
            .with_body(self.body)
            .expect(self.per_fetch * fetches)
            .create_async()
            .await
    }
}

/// A cacheable endpoint with the upstream calls one refresh makes
struct CachedEndpoint {
    uri: &'static str,
    args: &'static [&'static str],
    window_secs: i64,
    stubs: &'static [Stub],
}

const WITH_ETF_KEY: &[&str] = &["--sosovalue-api-key", "secret"];

const CACHED_ENDPOINTS: &[CachedEndpoint] = &[
    CachedEndpoint {
        uri: "/api/market-data",
        args: &[],
        window_secs: 300,
        stubs: &[Stub::get("/simple/price", SIMPLE_PRICE), Stub::get("/global", GLOBAL)],
    },
    CachedEndpoint {
        uri: "/api/top-coins",
        args: &[],
        window_secs: 900,
        stubs: &[Stub::get("/coins/markets", TOP_MARKETS)],
    },
    CachedEndpoint {
        uri: "/api/personal-data",
        args: &[],
        window_secs: 86_400,
        stubs: &[Stub::get("/coins/markets", PERSONAL_MARKETS)],
    },
    CachedEndpoint {
        uri: "/api/podcast",
        args: &[],
        window_secs: 600,
        stubs: &[Stub {
            method: "GET",
            path: "/feed",
            body: FEED,
            content_type: "application/rss+xml",
            per_fetch: 1,
        }],
    },
    CachedEndpoint {
        uri: "/api/etf-flows",
        args: WITH_ETF_KEY,
        window_secs: 3_600,
        // BTC and ETH series
        stubs: &[Stub {
            method: "POST",
            path: "/openapi/v2/etf/historicalInflowChart",
            body: ETF_INFLOW,
            content_type: "application/json",
            per_fetch: 2,
        }],
    },
    CachedEndpoint {
        uri: "/api/mood",
        args: &[],
        window_secs: 3_600,
        stubs: &[Stub::get("/global", GLOBAL), Stub::get("/coins/markets", TOP_MARKETS)],
    },
];

/// Drops the per-request cache bookkeeping so payloads can be compared
fn without_cache_fields(body: &Value) -> Value {
    let mut body = body.clone();
    let obj = body.as_object_mut().unwrap();
    obj.remove("cached");
    obj.remove("cacheAge");
    body
}

#[tokio::test]
async fn test_cold_failure_serves_each_fallback_in_full() {
    let cases = [
        ("/api/personal-data", &[][..], serde_json::to_value(&*PERSONAL_FALLBACK).unwrap()),
        (
            "/api/daily-metric",
            &[][..],
            serde_json::to_value(metrics::fallback(MetricKind::FearGreed)).unwrap(),
        ),
        ("/api/podcast", &[][..], serde_json::to_value(&*podcast::FALLBACK).unwrap()),
        ("/api/etf-flows", WITH_ETF_KEY, serde_json::to_value(&*etf_flows::FALLBACK).unwrap()),
        ("/api/mood", &[][..], serde_json::to_value(&*mood::FALLBACK).unwrap()),
    ];

    for (uri, args, expected) in cases {
        let h = harness(args).await;

        let (status, _, body) = get(&h.app, uri).await;

        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body["source"], "fallback", "{}", uri);
        assert_eq!(body["cached"], false, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
        assert_payload_eq(&body, &expected);
    }
}

#[tokio::test]
async fn test_second_call_within_window_is_cached() {
    for endpoint in CACHED_ENDPOINTS {
        let mut h = harness(endpoint.args).await;
        let mut mocks = Vec::new();
        for stub in endpoint.stubs {
            mocks.push(stub.mount(&mut h.server, 1).await);
        }

        let (status, _, first) = get(&h.app, endpoint.uri).await;
        h.clock.advance(Duration::seconds(endpoint.window_secs - 1));
        let (_, _, second) = get(&h.app, endpoint.uri).await;

        for mock in &mocks {
            mock.assert_async().await;
        }
        assert_eq!(status, StatusCode::OK, "{}", endpoint.uri);
        assert_eq!(first["cached"], false, "{}", endpoint.uri);
        assert!(first.get("source").is_none(), "{}", endpoint.uri);
        assert_eq!(second["cached"], true, "{}", endpoint.uri);
        assert_eq!(second["cacheAge"], endpoint.window_secs - 1, "{}", endpoint.uri);
        assert_eq!(
            without_cache_fields(&second),
            without_cache_fields(&first),
            "{}",
            endpoint.uri
        );
    }
}

#[tokio::test]
async fn test_exactly_one_refetch_after_window() {
    for endpoint in CACHED_ENDPOINTS {
        let mut h = harness(endpoint.args).await;
        let mut mocks = Vec::new();
        for stub in endpoint.stubs {
            mocks.push(stub.mount(&mut h.server, 2).await);
        }

        get(&h.app, endpoint.uri).await;
        h.clock.advance(Duration::seconds(endpoint.window_secs));
        let (_, _, refreshed) = get(&h.app, endpoint.uri).await;
        let (_, _, again) = get(&h.app, endpoint.uri).await;

        for mock in &mocks {
            mock.assert_async().await;
        }
        assert_eq!(refreshed["cached"], false, "{}", endpoint.uri);
        assert_eq!(again["cached"], true, "{}", endpoint.uri);
        assert_eq!(again["cacheAge"], 0, "{}", endpoint.uri);
    }
}

#[tokio::test]
async fn test_daily_metric_cached_within_same_day() {
    let mut h = harness(&[]).await;
    let fng = mock_json(&mut h.server, "/fng/", FNG, 1).await;

    let (_, _, first) = get(&h.app, "/api/daily-metric").await;
    h.clock.advance(Duration::hours(11));
    let (_, _, second) = get(&h.app, "/api/daily-metric").await;

    fng.assert_async().await;
    assert_eq!(second["cached"], true);
    assert_eq!(second["cacheAge"], 11 * 3_600);
    assert_eq!(without_cache_fields(&second), without_cache_fields(&first));
}

#[tokio::test]
async fn test_personal_data_requests_watchlist_with_long_changes() {
    let mut h = harness(&[]).await;
    let markets = h
        .server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "ids".into(),
                "bitcoin,ethereum,solana,chainlink,avalanche-2".into(),
            ),
            Matcher::UrlEncoded("price_change_percentage".into(), "24h,7d,30d".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(PERSONAL_MARKETS)
        .create_async()
        .await;

    let (status, headers, body) = get(&h.app, "/api/personal-data").await;

    markets.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, max-age=86400, stale-while-revalidate=3600"
    );
    let btc = &body["coins"][0];
    assert_eq!(btc["symbol"], "BTC");
    assert_eq!(btc["marketCapFormatted"], "$2T");
    assert_eq!(btc["change24h"], 2.5);
    assert_eq!(btc["change7d"], 6.1);
    assert_eq!(btc["change30d"], -4.3);
    assert_eq!(btc["high24h"], 102000.0);
    assert_eq!(btc["low24h"], 98500.0);
    assert_eq!(btc["ath"], 109000.0);
    assert_eq!(btc["athChangePercentage"], -7.1);
    assert_eq!(btc["circulatingSupply"], 19800000.0);
}

#[tokio::test]
async fn test_etf_flows_with_key_sends_header_and_sorts_days() {
    let mut h = harness(WITH_ETF_KEY).await;
    let btc = h
        .server
        .mock("POST", "/openapi/v2/etf/historicalInflowChart")
        .match_header("x-soso-api-key", "secret")
        .match_body(Matcher::PartialJson(serde_json::json!({"type": "us-btc-spot"})))
        .with_header("content-type", "application/json")
        .with_body(ETF_INFLOW)
        .create_async()
        .await;
    let eth = h
        .server
        .mock("POST", "/openapi/v2/etf/historicalInflowChart")
        .match_header("x-soso-api-key", "secret")
        .match_body(Matcher::PartialJson(serde_json::json!({"type": "us-eth-spot"})))
        .with_header("content-type", "application/json")
        .with_body(ETF_INFLOW)
        .create_async()
        .await;

    let (status, _, body) = get(&h.app, "/api/etf-flows").await;

    btc.assert_async().await;
    eth.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mock"], false);
    assert_eq!(body["btc"]["latestDate"], "2025-03-03");
    assert_eq!(body["btc"]["latestNetInflowFormatted"], "$250M");
    assert_eq!(body["btc"]["cumulativeNetInflow"], 3.9e10);
    assert_eq!(body["btc"]["days"][1]["netInflow"], -1.2e8);
}

#[tokio::test]
async fn test_wednesday_metric_is_btc_funding() {
    let mut h = harness(&[]).await;
    let funding = mock_json(&mut h.server, "/funding", FUNDING, 1).await;
    h.clock.set(Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap());

    let (status, _, body) = get(&h.app, "/api/daily-metric").await;

    funding.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metric"], "funding_rates");
    assert_eq!(body["value"], "0.0200%");
    assert_eq!(body["numericValue"], 21.9);
    assert_eq!(body["unit"], "≈ 22% APR");
    assert_eq!(body["interpretation"], "optimistic");
    assert!(body.get("source").is_none());
}

#[tokio::test]
async fn test_thursday_metric_is_open_interest() {
    let mut h = harness(&[]).await;
    let oi = h
        .server
        .mock("GET", "/open_interest")
        .match_query(Matcher::UrlEncoded("symbol".into(), "BTC".into()))
        .with_header("content-type", "application/json")
        .with_body(OPEN_INTEREST)
        .create_async()
        .await;
    h.clock.set(Utc.with_ymd_and_hms(2025, 3, 6, 12, 0, 0).unwrap());

    let (status, _, body) = get(&h.app, "/api/daily-metric").await;

    oi.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metric"], "open_interest");
    assert_eq!(body["value"], "$35B");
    assert_eq!(body["numericValue"], 35.0);
    assert_eq!(body["change"], "+4.2%");
    assert_eq!(body["interpretation"], "optimistic");
}

#[tokio::test]
async fn test_friday_metric_is_stablecoin_supply() {
    let mut h = harness(&[]).await;
    let markets = h
        .server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::UrlEncoded(
            "ids".into(),
            "tether,usd-coin,dai,ethena-usde,first-digital-usd".into(),
        ))
        .with_header("content-type", "application/json")
        .with_body(STABLECOIN_MARKETS)
        .create_async()
        .await;
    h.clock.set(Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap());

    let (status, _, body) = get(&h.app, "/api/daily-metric").await;

    markets.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metric"], "stablecoin_supply");
    assert_eq!(body["value"], "$200B");
    assert_eq!(body["numericValue"], 200.0);
    assert_eq!(body["change"], "+1.0%");
    assert_eq!(body["interpretation"], "bullish");
}
