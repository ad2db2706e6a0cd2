// HTTP request handlers
use crate::application::dashboard_service::ChartRequest;
use crate::application::query_planner::{RangePreset, parse_bucket_hint};
use crate::infrastructure::json_mapper::{
    DashboardView, InfraView, dashboard_to_view, infra_to_view, refresh_to_view,
};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

/// Date pickers send empty strings when cleared, so every field is a raw string
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub bucket: Option<String>,
    pub preset: Option<String>,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Plan, fetch and render the chart for the requested window
pub async fn get_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> Response {
    let preset = match query.preset.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match RangePreset::parse(raw) {
            Some(preset) => Some(preset),
            None => {
                return error_response(StatusCode::BAD_REQUEST, format!("unknown preset '{}'", raw));
            }
        },
        None => None,
    };

    let request = ChartRequest {
        start_date: query.start_date,
        end_date: query.end_date,
        bucket: parse_bucket_hint(query.bucket.as_deref()),
        preset,
    };

    match state.dashboard_service.refresh(request).await {
        Ok(outcome) => Json(refresh_to_view(outcome.transition, &outcome.state)).into_response(),
        Err(e) => {
            tracing::debug!("Rejected chart request: {}", e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

/// Current dashboard state without issuing a request
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    let snapshot = state.dashboard_service.snapshot().await;
    Json(dashboard_to_view(&snapshot))
}

/// Infra metadata loaded at startup; null until it arrives
pub async fn get_infra(State(state): State<Arc<AppState>>) -> Json<Option<InfraView>> {
    let snapshot = state.dashboard_service.snapshot().await;
    Json(snapshot.infra().map(infra_to_view))
}

/// One more attempt at the infra endpoint
pub async fn reload_infra(State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard_service.load_infra_status().await {
        Ok(status) => Json(infra_to_view(&status)).into_response(),
        Err(e) => error_response(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}
