use crate::application::query_planner::BucketThresholds;
use crate::application::series_renderer::{StyleEntry, StyleTable};
use crate::domain::telemetry::ChartKind;
use anyhow::{anyhow, bail};
use chrono::FixedOffset;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub planner: PlannerSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub styles: StylesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlannerSettings {
    #[serde(default = "default_minute_max_days")]
    pub minute_max_days: i64,
    #[serde(default = "default_hour_max_days")]
    pub hour_max_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_chart_kind")]
    pub chart_kind: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StylesConfig {
    pub minute: Option<StyleConfig>,
    pub hour: Option<StyleConfig>,
    pub day: Option<StyleConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StyleConfig {
    pub color: String,
    pub title: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_url() -> String {
    "https://mympqg08a4.execute-api.us-east-1.amazonaws.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    2
}

fn default_minute_max_days() -> i64 {
    1
}

fn default_hour_max_days() -> i64 {
    31
}

fn default_chart_kind() -> String {
    "line".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            minute_max_days: default_minute_max_days(),
            hour_max_days: default_hour_max_days(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            chart_kind: default_chart_kind(),
        }
    }
}

impl DashboardConfig {
    pub fn thresholds(&self) -> anyhow::Result<BucketThresholds> {
        let PlannerSettings {
            minute_max_days,
            hour_max_days,
        } = self.planner;
        if minute_max_days < 0 || hour_max_days < minute_max_days {
            bail!(
                "planner thresholds must satisfy 0 <= minute_max_days <= hour_max_days, \
                 got {} and {}",
                minute_max_days,
                hour_max_days
            );
        }
        Ok(BucketThresholds {
            minute_max_days,
            hour_max_days,
        })
    }

    pub fn display_offset(&self) -> anyhow::Result<FixedOffset> {
        self.display
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                anyhow!(
                    "display.utc_offset_minutes out of range: {}",
                    self.display.utc_offset_minutes
                )
            })
    }

    pub fn chart_kind(&self) -> ChartKind {
        ChartKind::from_config(&self.display.chart_kind)
    }

    pub fn style_table(&self) -> StyleTable {
        let entry = |style: &Option<StyleConfig>| {
            style
                .as_ref()
                .map(|s| StyleEntry::new(s.color.clone(), s.title.clone()))
        };
        StyleTable {
            minute: entry(&self.styles.minute),
            hour: entry(&self.styles.hour),
            day: entry(&self.styles.day),
        }
    }
}

/// `config/dashboard.{toml,json,yaml}` if present, overridden by
/// `DASHBOARD__SECTION__KEY` variables
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::Bucket;

    fn from_toml(source: &str) -> DashboardConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = from_toml("");
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(
            config.thresholds().unwrap(),
            BucketThresholds {
                minute_max_days: 1,
                hour_max_days: 31
            }
        );
        assert_eq!(config.chart_kind(), ChartKind::Line);
        assert_eq!(config.display_offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn test_full_config() {
        let config = from_toml(
            r##"
            [api]
            base_url = "http://localhost:9000"
            timeout_secs = 3

            [planner]
            hour_max_days = 7

            [display]
            utc_offset_minutes = -180
            chart_kind = "bar"

            [styles.day]
            color = "#123456"
            title = "Daily mean"
            "##,
        );

        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.api.connect_timeout_secs, 2);
        assert_eq!(config.thresholds().unwrap().hour_max_days, 7);
        assert_eq!(config.thresholds().unwrap().minute_max_days, 1);
        assert_eq!(config.display_offset().unwrap().local_minus_utc(), -3 * 3600);
        assert_eq!(config.chart_kind(), ChartKind::Bar);

        let styles = config.style_table();
        assert!(styles.minute.is_none());
        assert_eq!(
            styles.resolve(Bucket::Day),
            StyleEntry::new("#123456", "Daily mean")
        );
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let config = from_toml("[planner]\nminute_max_days = 10\nhour_max_days = 7\n");
        assert!(config.thresholds().is_err());

        let config = from_toml("[display]\nutc_offset_minutes = 100000\n");
        assert!(config.display_offset().is_err());

        // minutes * 60 would overflow i32
        let config = from_toml("[display]\nutc_offset_minutes = 2147483647\n");
        assert!(config.display_offset().is_err());
        let config = from_toml("[display]\nutc_offset_minutes = -40000000\n");
        assert!(config.display_offset().is_err());
    }
}
