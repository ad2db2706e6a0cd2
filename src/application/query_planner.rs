// Query planner - Decides window bounds and bucket for a data request
use crate::domain::telemetry::{Bucket, QueryWindow};
use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Largest span (in whole days) still served by each bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketThresholds {
    pub minute_max_days: i64,
    pub hour_max_days: i64,
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            minute_max_days: 1,
            hour_max_days: 31,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate { input: String },
    #[error("window ends on {end} before it starts on {start}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

/// Quick ranges offered next to the date pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Today,
    Week,
    Month,
    Quarter,
}

impl RangePreset {
    pub fn parse(value: &str) -> Option<RangePreset> {
        match value.trim().to_ascii_lowercase().as_str() {
            "today" | "1d" => Some(RangePreset::Today),
            "week" | "7d" => Some(RangePreset::Week),
            "month" | "31d" => Some(RangePreset::Month),
            "quarter" | "90d" => Some(RangePreset::Quarter),
            _ => None,
        }
    }

    /// Number of calendar days covered, today included
    pub fn days(&self) -> i64 {
        match self {
            RangePreset::Today => 1,
            RangePreset::Week => 7,
            RangePreset::Month => 31,
            RangePreset::Quarter => 90,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryPlanner {
    thresholds: BucketThresholds,
}

impl QueryPlanner {
    pub fn new(thresholds: BucketThresholds) -> Self {
        Self { thresholds }
    }

    /// Plan from raw date-picker input. Empty strings count as absent.
    pub fn plan(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        explicit_bucket: Option<Bucket>,
    ) -> Result<QueryWindow, PlanError> {
        let start = parse_date_input(start)?;
        let end = parse_date_input(end)?;
        self.plan_dates(start, end, explicit_bucket)
    }

    pub fn plan_dates(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        explicit_bucket: Option<Bucket>,
    ) -> Result<QueryWindow, PlanError> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(PlanError::InvertedWindow { start, end });
            }
        }

        let bucket = match (explicit_bucket, start, end) {
            (Some(bucket), _, _) => bucket,
            (None, Some(start), Some(end)) => self.infer_bucket(start, end),
            (None, _, _) => Bucket::Minute,
        };

        Ok(QueryWindow::new(start, end, bucket))
    }

    pub fn plan_preset(&self, preset: RangePreset, today: NaiveDate) -> QueryWindow {
        let start = today - Duration::days(preset.days() - 1);
        QueryWindow::new(Some(start), Some(today), self.infer_bucket(start, today))
    }

    /// Bucket for a window, from its span in whole days
    pub fn infer_bucket(&self, start: NaiveDate, end: NaiveDate) -> Bucket {
        let span_days = end.signed_duration_since(start).num_days();
        if span_days <= self.thresholds.minute_max_days {
            Bucket::Minute
        } else if span_days <= self.thresholds.hour_max_days {
            Bucket::Hour
        } else {
            Bucket::Day
        }
    }
}

fn parse_date_input(input: Option<&str>) -> Result<Option<NaiveDate>, PlanError> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| PlanError::InvalidDate {
            input: raw.to_string(),
        })
}

/// Explicit bucket from a request parameter; unknown names fall back to `Hour`
pub fn parse_bucket_hint(input: Option<&str>) -> Option<Bucket> {
    let raw = input.map(str::trim).filter(|s| !s.is_empty())?;
    let bucket = Bucket::parse(raw).unwrap_or_else(|| {
        tracing::warn!("Unknown bucket '{}', falling back to hour", raw);
        Bucket::Hour
    });
    Some(bucket)
}
