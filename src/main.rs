//! The Litmus - market data API for the crypto magazine site
//!
//! Serves cached JSON snapshots of prices, top coins, the daily metric,
//! podcast episodes, ETF flows and market mood.

use std::process;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use litmus::api::{self, AppState};
use litmus::cache::SystemClock;
use litmus::cli::{Cli, Config};

/// Default log filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "litmus=info,tower_http=info";

/// Installs the global tracing subscriber, as JSON lines if requested
fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    init_tracing(config.log_json);

    let state = Arc::new(AppState::new(&config, Arc::new(SystemClock))?);
    if !state.etf_flows.has_api_key() {
        warn!("SOSOVALUE_API_KEY not set, /api/etf-flows will serve mock data");
    }
    let app = api::router(state);

    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, watchlist = config.watchlist.len(), "litmus listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}
