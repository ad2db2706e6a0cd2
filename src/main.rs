// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{Router, routing::{get, post}};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::query_planner::QueryPlanner;
use crate::application::series_renderer::SeriesRenderer;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_api::HttpTelemetryApi;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_chart, get_dashboard, get_infra, health_check, reload_infra,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create API client (infrastructure layer)
    let api = Arc::new(HttpTelemetryApi::new(
        &config.api.base_url,
        Duration::from_secs(config.api.connect_timeout_secs),
        Duration::from_secs(config.api.timeout_secs),
    )?);

    // Create services (application layer)
    let dashboard_service = DashboardService::new(
        api,
        QueryPlanner::new(config.thresholds()?),
        SeriesRenderer::new(config.display_offset()?, config.style_table()),
        config.chart_kind(),
    );

    // Infra metadata is fetched once; a failure only shows up in the infra panel
    tokio::spawn({
        let service = dashboard_service.clone();
        async move {
            // logged and recorded in the dashboard state by the service
            if let Err(e) = service.load_infra_status().await {
                tracing::debug!("Startup infra load did not complete: {}", e);
            }
        }
    });

    let state = Arc::new(AppState {
        dashboard_service: dashboard_service.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/chart", get(get_chart))
        .route("/dashboard", get(get_dashboard))
        .route("/infra", get(get_infra))
        .route("/infra/reload", post(reload_infra))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid server.bind_addr '{}'", config.server.bind_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    dashboard_service.attach_surface().await;
    tracing::info!(
        "Starting telemetry-dashboard on {} (upstream {})",
        addr,
        config.api.base_url
    );

    axum::serve(listener, router).await?;

    Ok(())
}
