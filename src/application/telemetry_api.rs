// Port for the remote telemetry API
use crate::domain::infra::InfraStatus;
use crate::domain::telemetry::{QueryWindow, TelemetryRow};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection, DNS, TLS or timeout failure
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    /// Body was not the JSON shape we expected
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

#[async_trait]
pub trait TelemetryApi: Send + Sync {
    /// Rows for a window, in whatever order the endpoint returns them
    async fn fetch_rows(&self, window: &QueryWindow) -> Result<Vec<TelemetryRow>, ApiError>;

    /// Infrastructure metadata shown beside the chart
    async fn fetch_infra_status(&self) -> Result<InfraStatus, ApiError>;
}
