// Dashboard state and the transitions that change it
use super::infra::InfraStatus;
use super::telemetry::{ChartKind, ChartSeries, ChartSpec, QueryWindow};

/// Monotonically increasing id of an issued data request
pub type RequestSeq = u64;

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    /// Rows for request `seq` arrived; `series` is None when there was nothing to draw
    SeriesLoaded {
        seq: RequestSeq,
        window: QueryWindow,
        series: Option<ChartSeries>,
    },
    SeriesFailed {
        seq: RequestSeq,
        message: String,
    },
    InfraLoaded(InfraStatus),
    InfraFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Event accepted but nothing visible changed
    Unchanged,
    /// Response belongs to a request that a newer one superseded
    Stale,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    chart_kind: ChartKind,
    surface_attached: bool,
    latest_issued: RequestSeq,
    pending: Option<QueryWindow>,
    chart: Option<ChartSpec>,
    alert: Option<String>,
    infra: Option<InfraStatus>,
    infra_error: Option<String>,
}

impl DashboardState {
    pub fn new(chart_kind: ChartKind) -> Self {
        Self {
            chart_kind,
            surface_attached: false,
            latest_issued: 0,
            pending: None,
            chart: None,
            alert: None,
            infra: None,
            infra_error: None,
        }
    }

    /// Charts are only built once something can display them
    pub fn attach_surface(&mut self) {
        self.surface_attached = true;
    }

    pub fn begin_request(&mut self, window: QueryWindow) -> RequestSeq {
        self.latest_issued += 1;
        self.pending = Some(window);
        self.latest_issued
    }

    pub fn apply(&mut self, event: DashboardEvent) -> Transition {
        match event {
            DashboardEvent::SeriesLoaded { seq, window, series } => {
                if seq < self.latest_issued {
                    return Transition::Stale;
                }
                self.pending = None;
                self.alert = None;
                match series {
                    Some(series) if self.surface_attached && !series.is_empty() => {
                        let generation =
                            self.chart.as_ref().map(|c| c.generation).unwrap_or(0) + 1;
                        // replace, never patch: the old chart object is dropped here
                        self.chart = Some(ChartSpec {
                            generation,
                            window,
                            kind: self.chart_kind,
                            series,
                        });
                        Transition::Applied
                    }
                    _ => Transition::Unchanged,
                }
            }
            DashboardEvent::SeriesFailed { seq, message } => {
                if seq < self.latest_issued {
                    return Transition::Stale;
                }
                self.pending = None;
                self.alert = Some(message);
                Transition::Applied
            }
            DashboardEvent::InfraLoaded(status) => {
                self.infra = Some(status);
                self.infra_error = None;
                Transition::Applied
            }
            DashboardEvent::InfraFailed(message) => {
                self.infra_error = Some(message);
                Transition::Applied
            }
        }
    }

    pub fn latest_issued(&self) -> RequestSeq {
        self.latest_issued
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_window(&self) -> Option<&QueryWindow> {
        self.pending.as_ref()
    }

    pub fn chart(&self) -> Option<&ChartSpec> {
        self.chart.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn infra(&self) -> Option<&InfraStatus> {
        self.infra.as_ref()
    }

    pub fn infra_error(&self) -> Option<&str> {
        self.infra_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::infra::MaintenanceSchedule;
    use crate::domain::telemetry::{Bucket, SeriesStyle};

    fn series(values: &[f64]) -> ChartSeries {
        ChartSeries {
            labels: values.iter().map(|v| format!("{v}")).collect(),
            values: values.to_vec(),
            style: SeriesStyle::new("#000000", "test", 0),
        }
    }

    fn window() -> QueryWindow {
        QueryWindow::new(None, None, Bucket::Minute)
    }

    fn attached() -> DashboardState {
        let mut state = DashboardState::new(ChartKind::Line);
        state.attach_surface();
        state
    }

    #[test]
    fn test_load_replaces_chart() {
        let mut state = attached();

        let seq = state.begin_request(window());
        assert!(state.is_loading());
        let event = DashboardEvent::SeriesLoaded {
            seq,
            window: window(),
            series: Some(series(&[1.0])),
        };
        assert_eq!(state.apply(event), Transition::Applied);
        assert!(!state.is_loading());
        assert_eq!(state.chart().unwrap().generation, 1);

        let seq = state.begin_request(window());
        let event = DashboardEvent::SeriesLoaded {
            seq,
            window: window(),
            series: Some(series(&[2.0, 3.0])),
        };
        assert_eq!(state.apply(event), Transition::Applied);

        let chart = state.chart().unwrap();
        assert_eq!(chart.generation, 2);
        assert_eq!(chart.series.values, vec![2.0, 3.0]);
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut state = attached();
        let first = state.begin_request(window());
        let second = state.begin_request(window());

        let newer = DashboardEvent::SeriesLoaded {
            seq: second,
            window: window(),
            series: Some(series(&[2.0])),
        };
        assert_eq!(state.apply(newer), Transition::Applied);

        let older = DashboardEvent::SeriesLoaded {
            seq: first,
            window: window(),
            series: Some(series(&[1.0])),
        };
        assert_eq!(state.apply(older), Transition::Stale);
        assert_eq!(state.chart().unwrap().series.values, vec![2.0]);

        let older_failure = DashboardEvent::SeriesFailed { seq: first, message: "boom".into() };
        assert_eq!(state.apply(older_failure), Transition::Stale);
        assert!(state.alert().is_none());
    }

    #[test]
    fn test_empty_series_keeps_previous_chart() {
        let mut state = attached();
        let seq = state.begin_request(window());
        state.apply(DashboardEvent::SeriesLoaded {
            seq,
            window: window(),
            series: Some(series(&[4.0])),
        });

        let seq = state.begin_request(window());
        let event = DashboardEvent::SeriesLoaded { seq, window: window(), series: None };
        assert_eq!(state.apply(event), Transition::Unchanged);
        assert_eq!(state.chart().unwrap().series.values, vec![4.0]);
        assert_eq!(state.chart().unwrap().generation, 1);
    }

    #[test]
    fn test_detached_surface_is_a_no_op() {
        let mut state = DashboardState::new(ChartKind::Bar);
        let seq = state.begin_request(window());
        let event = DashboardEvent::SeriesLoaded {
            seq,
            window: window(),
            series: Some(series(&[1.0])),
        };
        assert_eq!(state.apply(event), Transition::Unchanged);
        assert!(state.chart().is_none());
    }

    #[test]
    fn test_failure_sets_alert_until_next_load() {
        let mut state = attached();
        let seq = state.begin_request(window());
        state.apply(DashboardEvent::SeriesFailed { seq, message: "unreachable".into() });
        assert_eq!(state.alert(), Some("unreachable"));

        let seq = state.begin_request(window());
        state.apply(DashboardEvent::SeriesLoaded {
            seq,
            window: window(),
            series: Some(series(&[1.0])),
        });
        assert!(state.alert().is_none());
    }

    #[test]
    fn test_infra_events_do_not_touch_chart() {
        let mut state = attached();
        let seq = state.begin_request(window());
        state.apply(DashboardEvent::SeriesLoaded {
            seq,
            window: window(),
            series: Some(series(&[1.0])),
        });

        state.apply(DashboardEvent::InfraFailed("timeout".into()));
        assert_eq!(state.infra_error(), Some("timeout"));
        assert_eq!(state.chart().unwrap().generation, 1);

        let status = InfraStatus::new(
            "postgres".into(),
            vec!["telemetria_2024_05".into()],
            MaintenanceSchedule {
                job_name: "drop-old-partitions".into(),
                cron_expression: "0 3 * * *".into(),
                active: true,
            },
            "$0.00".into(),
        );
        state.apply(DashboardEvent::InfraLoaded(status.clone()));
        assert_eq!(state.infra(), Some(&status));
        assert!(state.infra_error().is_none());
        assert_eq!(state.chart().unwrap().generation, 1);
    }
}
