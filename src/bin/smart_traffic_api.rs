//! Smart Traffic Web Server
//!
//! Route form at `/`, JSON routing at `/api/route`, status under `/v1`.
//!
//! Usage:
//!   cargo run --bin smart_traffic_api
//!
//! Environment:
//!   PORT / TRAFFIC_PORT      - Server port (default: 8080)
//!   TRAFFIC_HOST             - Server host (default: 0.0.0.0)
//!   OSRM_BASE_URL            - Directions service route endpoint
//!   OSRM_TIMEOUT_SECS        - Directions request timeout (default: none)
//!   TRAFFIC_UTC_OFFSET_HOURS - Local time offset for congestion rules (default: 7)
//!   RUST_LOG                 - Log level (default: info)

use smart_traffic::api::{create_router, start_cleanup_task, AppState};
use smart_traffic::{Navigator, TrafficConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Arc::new(TrafficConfig::from_env()?);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let navigator = Navigator::new(Arc::clone(&config))?;
    let state = Arc::new(AppState::new(navigator));
    let stats = Arc::clone(&state.stats);

    // Start background cleanup task for rate limiter
    start_cleanup_task();

    let app = create_router(state);

    info!("Smart Traffic starting on http://{}", addr);
    info!("Directions service: {}", config.osrm_base_url);
    info!("Endpoints:");
    info!("  GET  /               - Route form and map");
    info!("  POST /               - Route form submission");
    info!("  POST /api/route      - Route lookup (JSON)");
    info!("  GET  /v1/locations   - Locations with current congestion");
    info!("  GET  /v1/stats       - Route statistics");
    info!("  GET  /v1/health      - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    let summary = stats.snapshot();
    info!(
        total = summary.total_requests,
        served = summary.routes_served,
        congested = summary.congested_trips,
        upstream_errors = summary.upstream_errors,
        "Smart Traffic shutdown complete"
    );

    Ok(())
}
