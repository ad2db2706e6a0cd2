// Telemetry data domain models
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Aggregation granularity of the time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Minute,
    Hour,
    Day,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Minute => "minute",
            Bucket::Hour => "hour",
            Bucket::Day => "day",
        }
    }

    /// Strict parse of a wire name
    pub fn parse(value: &str) -> Option<Bucket> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minute" => Some(Bucket::Minute),
            "hour" => Some(Bucket::Hour),
            "day" => Some(Bucket::Day),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRow {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl TelemetryRow {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Build a row from one `{data_envio, valor}` object of the data endpoint.
    /// Returns None when either field is missing or unparseable.
    pub fn from_json(row: &Value) -> Option<Self> {
        let timestamp = parse_timestamp(row.get("data_envio")?.as_str()?)?;
        let value = match row.get("valor")? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !value.is_finite() {
            return None;
        }
        Some(Self::new(timestamp, value))
    }
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// RFC 3339, an ISO or Postgres-style timestamp with a short offset (`+00`),
/// a naive timestamp taken as UTC, or a bare date at UTC midnight
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Bounds and granularity of one data request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub bucket: Bucket,
}

impl QueryWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>, bucket: Bucket) -> Self {
        Self { start, end, bucket }
    }

    /// Query parameters in the order the data endpoint documents them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("bucket", self.bucket.as_str().to_string())];
        if let Some(start) = self.start {
            pairs.push(("start_date", format_date(start)));
        }
        if let Some(end) = self.end {
            pairs.push(("end_date", format_date(end)));
        }
        pairs
    }

    pub fn query_string(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `{base}/data?{query}`
    pub fn request_path(&self, base: &str) -> String {
        format!("{}/data?{}", base.trim_end_matches('/'), self.query_string())
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    pub color: String,
    pub title: String,
    /// 0 hides point markers
    pub point_radius: u32,
}

impl SeriesStyle {
    pub fn new(color: impl Into<String>, title: impl Into<String>, point_radius: u32) -> Self {
        Self {
            color: color.into(),
            title: title.into(),
            point_radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub style: SeriesStyle,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

impl ChartKind {
    pub fn from_config(kind: &str) -> Self {
        match kind {
            "line" => ChartKind::Line,
            "bar" => ChartKind::Bar,
            _ => ChartKind::Line,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
        }
    }
}

/// The renderable chart object handed to the front-end
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub generation: u64,
    pub window: QueryWindow,
    pub kind: ChartKind,
    pub series: ChartSeries,
}
