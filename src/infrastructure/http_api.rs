// HTTP implementation of the telemetry API port
use crate::application::telemetry_api::{ApiError, TelemetryApi};
use crate::domain::infra::{InfraStatus, MaintenanceSchedule};
use crate::domain::telemetry::{QueryWindow, TelemetryRow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpTelemetryApi {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct InfraStatusWire {
    motor: String,
    #[serde(default)]
    particoes_ativas: Vec<PartitionWire>,
    agendamento_manutencao: MaintenanceWire,
    custo_infra: String,
}

#[derive(Debug, Deserialize)]
struct PartitionWire {
    child_table: String,
}

#[derive(Debug, Deserialize)]
struct MaintenanceWire {
    jobname: String,
    schedule: String,
    active: bool,
}

impl From<InfraStatusWire> for InfraStatus {
    fn from(wire: InfraStatusWire) -> Self {
        InfraStatus::new(
            wire.motor,
            wire.particoes_ativas
                .into_iter()
                .map(|p| p.child_table)
                .collect(),
            MaintenanceSchedule {
                job_name: wire.agendamento_manutencao.jobname,
                cron_expression: wire.agendamento_manutencao.schedule,
                active: wire.agendamento_manutencao.active,
            },
            wire.custo_infra,
        )
    }
}

impl HttpTelemetryApi {
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn data_url(&self, window: &QueryWindow) -> String {
        window.request_path(&self.base_url)
    }

    fn infra_url(&self) -> String {
        format!("{}/infra/status", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                url: url.to_string(),
                reason: describe_transport_error(&e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                "GET {} failed with status {}: {}",
                url,
                status,
                snippet(&body)
            );
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            reason: describe_transport_error(&e),
        })?;

        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            reason: format!("{} (body: {})", e, snippet(&String::from_utf8_lossy(&bytes))),
        })
    }
}

#[async_trait]
impl TelemetryApi for HttpTelemetryApi {
    async fn fetch_rows(&self, window: &QueryWindow) -> Result<Vec<TelemetryRow>, ApiError> {
        let url = self.data_url(window);
        let raw: Vec<serde_json::Value> = self.get_json(&url).await?;
        Ok(parse_rows(&raw))
    }

    async fn fetch_infra_status(&self) -> Result<InfraStatus, ApiError> {
        let url = self.infra_url();
        let wire: InfraStatusWire = self.get_json(&url).await?;
        Ok(wire.into())
    }
}

/// Keep every row that parses; skip the rest
fn parse_rows(raw: &[serde_json::Value]) -> Vec<TelemetryRow> {
    let rows: Vec<TelemetryRow> = raw.iter().filter_map(TelemetryRow::from_json).collect();
    if rows.len() < raw.len() {
        tracing::debug!(
            "Skipped {} of {} telemetry rows that could not be parsed",
            raw.len() - rows.len(),
            raw.len()
        );
    }
    rows
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    let hint = if error.is_timeout() {
        " (timed out)"
    } else if error.is_connect() {
        " (connection failed)"
    } else {
        ""
    };
    format!("{}{}", error, hint)
}

fn snippet(body: &str) -> String {
    body.chars().take(300).collect()
}
