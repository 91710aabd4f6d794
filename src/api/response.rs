//! JSON envelope and cache headers shared by every endpoint

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CachePolicy, Resolution};

/// Payload fields plus cache metadata, flattened into one JSON object
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<'a, T> {
    #[serde(flatten)]
    pub data: &'a T,
    /// Time of the fetch that produced `data`, or now for a fallback
    pub updated: DateTime<Utc>,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<i64>,
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What to send when the upstream failed and nothing is cached
pub enum Fallback<'a, T> {
    /// Placeholder payload, served as a normal 200 with `source="fallback"`
    Placeholder(&'a T),
    /// No placeholder exists; an empty payload goes out with HTTP 500
    Unavailable(&'a T),
}

/// Turns a cache resolution into an HTTP response
pub fn respond<T: Serialize>(
    resolution: Resolution<T>,
    policy: CachePolicy,
    now: DateTime<Utc>,
    fallback: Fallback<'_, T>,
) -> Response {
    let cache_control = policy.cache_control();

    match resolution {
        Resolution::Cached { entry, age_secs } => json(
            StatusCode::OK,
            cache_control,
            Envelope {
                data: &entry.data,
                updated: entry.cached_at,
                cached: true,
                cache_age: Some(age_secs),
                stale: false,
                source: None,
                error: None,
            },
        ),
        Resolution::Fresh { entry } => json(
            StatusCode::OK,
            cache_control,
            Envelope {
                data: &entry.data,
                updated: entry.cached_at,
                cached: false,
                cache_age: None,
                stale: false,
                source: None,
                error: None,
            },
        ),
        Resolution::Stale {
            entry,
            age_secs,
            error,
        } => json(
            StatusCode::OK,
            cache_control,
            Envelope {
                data: &entry.data,
                updated: entry.cached_at,
                cached: true,
                cache_age: Some(age_secs),
                stale: true,
                source: None,
                error: Some(error),
            },
        ),
        Resolution::Unavailable { error } => match fallback {
            Fallback::Placeholder(data) => json(
                StatusCode::OK,
                cache_control,
                Envelope {
                    data,
                    updated: now,
                    cached: false,
                    cache_age: None,
                    stale: false,
                    source: Some("fallback"),
                    error: Some(error),
                },
            ),
            Fallback::Unavailable(data) => json(
                StatusCode::INTERNAL_SERVER_ERROR,
                "no-store".to_string(),
                Envelope {
                    data,
                    updated: now,
                    cached: false,
                    cache_age: None,
                    stale: false,
                    source: None,
                    error: Some(error),
                },
            ),
        },
    }
}

fn json<T: Serialize>(status: StatusCode, cache_control: String, body: Envelope<'_, T>) -> Response {
    (status, [(header::CACHE_CONTROL, cache_control)], Json(body)).into_response()
}
