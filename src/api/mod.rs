//! HTTP surface: router, handler state and response envelope

mod handlers;
mod response;
mod state;

use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::HealthResponse;
pub use response::{respond, Envelope, Fallback};
pub use state::{AppState, Caches};

/// CORS: any origin may GET
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

/// Builds the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/market-data", get(handlers::market_data))
        .route("/api/top-coins", get(handlers::top_coins))
        .route("/api/personal-data", get(handlers::personal_data))
        .route("/api/daily-metric", get(handlers::daily_metric))
        .route("/api/podcast", get(handlers::podcast_feed))
        .route("/api/etf-flows", get(handlers::etf_flows))
        .route("/api/mood", get(handlers::mood))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}
