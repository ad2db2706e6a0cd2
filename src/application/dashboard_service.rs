// Dashboard service - Use case for refreshing the chart and the infra panel
use crate::application::query_planner::{PlanError, QueryPlanner, RangePreset};
use crate::application::series_renderer::SeriesRenderer;
use crate::application::telemetry_api::{ApiError, TelemetryApi};
use crate::domain::dashboard::{DashboardEvent, DashboardState, Transition};
use crate::domain::infra::InfraStatus;
use crate::domain::telemetry::{Bucket, ChartKind, QueryWindow};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// What the user picked: raw date inputs, a quick range, and/or a bucket
#[derive(Debug, Clone, Default)]
pub struct ChartRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub bucket: Option<Bucket>,
    pub preset: Option<RangePreset>,
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub transition: Transition,
    pub state: DashboardState,
}

#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn TelemetryApi>,
    planner: QueryPlanner,
    renderer: SeriesRenderer,
    state: Arc<RwLock<DashboardState>>,
}

impl DashboardService {
    pub fn new(
        api: Arc<dyn TelemetryApi>,
        planner: QueryPlanner,
        renderer: SeriesRenderer,
        chart_kind: ChartKind,
    ) -> Self {
        Self {
            api,
            planner,
            renderer,
            state: Arc::new(RwLock::new(DashboardState::new(chart_kind))),
        }
    }

    pub async fn attach_surface(&self) {
        self.state.write().await.attach_surface();
    }

    pub fn plan(&self, request: &ChartRequest, today: NaiveDate) -> Result<QueryWindow, PlanError> {
        match request.preset {
            Some(preset) => {
                let mut window = self.planner.plan_preset(preset, today);
                if let Some(bucket) = request.bucket {
                    window.bucket = bucket;
                }
                Ok(window)
            }
            None => self.planner.plan(
                request.start_date.as_deref(),
                request.end_date.as_deref(),
                request.bucket,
            ),
        }
    }

    pub async fn refresh(&self, request: ChartRequest) -> Result<RefreshOutcome, PlanError> {
        let window = self.plan(&request, Utc::now().date_naive())?;
        Ok(self.refresh_window(window).await)
    }

    /// Fetch, render and apply one window. Only the latest issued request may change the chart.
    pub async fn refresh_window(&self, window: QueryWindow) -> RefreshOutcome {
        let seq = self.state.write().await.begin_request(window.clone());
        tracing::debug!("Request #{} for {}", seq, window.query_string());

        let event = match self.api.fetch_rows(&window).await {
            Ok(rows) => {
                let series = self.renderer.render(&rows, window.bucket);
                tracing::debug!(
                    "Request #{} returned {} rows, {} points rendered",
                    seq,
                    rows.len(),
                    series.as_ref().map(|s| s.len()).unwrap_or(0)
                );
                DashboardEvent::SeriesLoaded { seq, window, series }
            }
            Err(e @ ApiError::Decode { .. }) => {
                tracing::warn!("Request #{} treated as empty: {}", seq, e);
                DashboardEvent::SeriesLoaded {
                    seq,
                    window,
                    series: None,
                }
            }
            Err(e) => {
                tracing::error!("Request #{} failed: {}", seq, e);
                DashboardEvent::SeriesFailed {
                    seq,
                    message: format!("Could not load telemetry: {}", e),
                }
            }
        };

        let mut state = self.state.write().await;
        let transition = state.apply(event);
        if transition == Transition::Stale {
            tracing::debug!(
                "Dropping response #{}, request #{} is newer",
                seq,
                state.latest_issued()
            );
        }

        RefreshOutcome {
            transition,
            state: state.clone(),
        }
    }

    /// One attempt; the outcome is recorded in state either way
    pub async fn load_infra_status(&self) -> Result<InfraStatus, ApiError> {
        match self.api.fetch_infra_status().await {
            Ok(status) => {
                tracing::info!(
                    "Infra status loaded: engine {}, {} active partitions",
                    status.engine_name,
                    status.active_partitions.len()
                );
                self.state
                    .write()
                    .await
                    .apply(DashboardEvent::InfraLoaded(status.clone()));
                Ok(status)
            }
            Err(e) => {
                tracing::error!("Error fetching infra status: {}", e);
                self.state
                    .write()
                    .await
                    .apply(DashboardEvent::InfraFailed(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }
}
