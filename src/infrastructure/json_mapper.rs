// Mapper to convert domain models to JSON views
use crate::domain::dashboard::{DashboardState, Transition};
use crate::domain::infra::InfraStatus;
use crate::domain::telemetry::{ChartSpec, QueryWindow, format_date};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WindowView {
    pub bucket: &'static str,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StyleView {
    pub color: String,
    pub title: String,
    pub point_radius: u32,
}

#[derive(Debug, Serialize)]
pub struct ChartView {
    pub generation: u64,
    pub kind: &'static str,
    pub window: WindowView,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub style: StyleView,
}

/// Served back under the field names the status endpoint uses
#[derive(Debug, Serialize)]
pub struct InfraView {
    pub motor: String,
    pub particoes_ativas: Vec<PartitionView>,
    pub agendamento_manutencao: MaintenanceView,
    pub custo_infra: String,
}

#[derive(Debug, Serialize)]
pub struct PartitionView {
    pub child_table: String,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceView {
    pub jobname: String,
    pub schedule: String,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub latest_request: u64,
    pub loading: bool,
    pub pending_window: Option<WindowView>,
    pub chart: Option<ChartView>,
    pub alert: Option<String>,
    pub infra: Option<InfraView>,
    pub infra_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshView {
    /// false when the response was stale or carried nothing to draw
    pub applied: bool,
    pub stale: bool,
    pub dashboard: DashboardView,
}

pub fn window_to_view(window: &QueryWindow) -> WindowView {
    WindowView {
        bucket: window.bucket.as_str(),
        start_date: window.start.map(format_date),
        end_date: window.end.map(format_date),
    }
}

pub fn chart_to_view(chart: &ChartSpec) -> ChartView {
    ChartView {
        generation: chart.generation,
        kind: chart.kind.as_str(),
        window: window_to_view(&chart.window),
        labels: chart.series.labels.clone(),
        values: chart.series.values.clone(),
        style: StyleView {
            color: chart.series.style.color.clone(),
            title: chart.series.style.title.clone(),
            point_radius: chart.series.style.point_radius,
        },
    }
}

pub fn infra_to_view(status: &InfraStatus) -> InfraView {
    InfraView {
        motor: status.engine_name.clone(),
        particoes_ativas: status
            .active_partitions
            .iter()
            .map(|table| PartitionView {
                child_table: table.clone(),
            })
            .collect(),
        agendamento_manutencao: MaintenanceView {
            jobname: status.maintenance_schedule.job_name.clone(),
            schedule: status.maintenance_schedule.cron_expression.clone(),
            active: status.maintenance_schedule.active,
        },
        custo_infra: status.infra_cost.clone(),
    }
}

pub fn dashboard_to_view(state: &DashboardState) -> DashboardView {
    DashboardView {
        latest_request: state.latest_issued(),
        loading: state.is_loading(),
        pending_window: state.pending_window().map(window_to_view),
        chart: state.chart().map(chart_to_view),
        alert: state.alert().map(str::to_string),
        infra: state.infra().map(infra_to_view),
        infra_error: state.infra_error().map(str::to_string),
    }
}

pub fn refresh_to_view(transition: Transition, state: &DashboardState) -> RefreshView {
    RefreshView {
        applied: transition == Transition::Applied,
        stale: transition == Transition::Stale,
        dashboard: dashboard_to_view(state),
    }
}
