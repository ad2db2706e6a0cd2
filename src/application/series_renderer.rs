// Series renderer - Turns raw telemetry rows into a chart series
use crate::domain::telemetry::{Bucket, ChartSeries, SeriesStyle, TelemetryRow};
use chrono::{DateTime, FixedOffset, Offset, Utc};

const MARKER_RADIUS: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct StyleEntry {
    pub color: String,
    pub title: String,
}

impl StyleEntry {
    pub fn new(color: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            title: title.into(),
        }
    }
}

/// Per-bucket color and title. Missing entries resolve through the hour entry.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    pub minute: Option<StyleEntry>,
    pub hour: Option<StyleEntry>,
    pub day: Option<StyleEntry>,
}

impl StyleTable {
    fn configured(&self, bucket: Bucket) -> Option<&StyleEntry> {
        match bucket {
            Bucket::Minute => self.minute.as_ref(),
            Bucket::Hour => self.hour.as_ref(),
            Bucket::Day => self.day.as_ref(),
        }
    }

    pub fn resolve(&self, bucket: Bucket) -> StyleEntry {
        self.configured(bucket)
            .or(self.hour.as_ref())
            .cloned()
            .unwrap_or_else(|| builtin_style(bucket))
    }
}

fn builtin_style(bucket: Bucket) -> StyleEntry {
    match bucket {
        Bucket::Minute => StyleEntry::new("#3b82f6", "Readings per minute"),
        Bucket::Hour => StyleEntry::new("#10b981", "Hourly average"),
        Bucket::Day => StyleEntry::new("#f59e0b", "Daily average"),
    }
}

#[derive(Debug, Clone)]
pub struct SeriesRenderer {
    display_offset: FixedOffset,
    styles: StyleTable,
}

impl Default for SeriesRenderer {
    fn default() -> Self {
        Self::new(Utc.fix(), StyleTable::default())
    }
}

impl SeriesRenderer {
    pub fn new(display_offset: FixedOffset, styles: StyleTable) -> Self {
        Self {
            display_offset,
            styles,
        }
    }

    /// Build a fresh series, or None when there is nothing to draw
    pub fn render(&self, rows: &[TelemetryRow], bucket: Bucket) -> Option<ChartSeries> {
        if rows.is_empty() {
            return None;
        }

        // The endpoint hands rows back newest first
        let mut sorted: Vec<&TelemetryRow> = rows.iter().collect();
        sorted.sort_by_key(|row| row.timestamp);

        let labels = sorted
            .iter()
            .map(|row| self.format_label(row.timestamp, bucket))
            .collect();
        let values = sorted.iter().map(|row| row.value).collect();

        let entry = self.styles.resolve(bucket);
        let point_radius = match bucket {
            Bucket::Minute => 0,
            Bucket::Hour | Bucket::Day => MARKER_RADIUS,
        };

        Some(ChartSeries {
            labels,
            values,
            style: SeriesStyle::new(entry.color, entry.title, point_radius),
        })
    }

    fn format_label(&self, timestamp: DateTime<Utc>, bucket: Bucket) -> String {
        let local = timestamp.with_timezone(&self.display_offset);
        let pattern = match bucket {
            Bucket::Day => "%d/%m",
            Bucket::Hour => "%H:00",
            Bucket::Minute => "%H:%M",
        };
        local.format(pattern).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(h: u32, m: u32, value: f64) -> TelemetryRow {
        TelemetryRow::new(Utc.with_ymd_and_hms(2024, 5, 20, h, m, 0).unwrap(), value)
    }

    #[test]
    fn test_minute_rows_are_sorted_and_labelled() {
        let renderer = SeriesRenderer::default();
        let rows = vec![row(10, 5, 7.0), row(10, 0, 5.0)];

        let series = renderer.render(&rows, Bucket::Minute).unwrap();
        assert_eq!(series.labels, vec!["10:00", "10:05"]);
        assert_eq!(series.values, vec![5.0, 7.0]);
        assert_eq!(series.style.point_radius, 0);
    }

    #[test]
    fn test_empty_rows_render_nothing() {
        let renderer = SeriesRenderer::default();
        assert!(renderer.render(&[], Bucket::Hour).is_none());
    }

    #[test]
    fn test_reverse_chronological_input() {
        let renderer = SeriesRenderer::default();
        let rows: Vec<TelemetryRow> = (0..30).rev().map(|m| row(8, m, m as f64)).collect();

        let series = renderer.render(&rows, Bucket::Minute).unwrap();
        assert_eq!(series.labels.len(), series.values.len());
        assert_eq!(series.len(), rows.len());
        let expected: Vec<f64> = (0..30).map(|m| m as f64).collect();
        assert_eq!(series.values, expected);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let renderer = SeriesRenderer::default();
        let rows = vec![row(9, 0, 2.0), row(8, 0, 1.0), row(9, 0, 3.0)];
        let series = renderer.render(&rows, Bucket::Hour).unwrap();
        assert_eq!(series.values, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.labels, vec!["08:00", "09:00", "09:00"]);
    }

    #[test]
    fn test_hour_and_day_labels_show_markers() {
        let renderer = SeriesRenderer::default();
        let rows = vec![row(14, 37, 1.0)];

        let hourly = renderer.render(&rows, Bucket::Hour).unwrap();
        assert_eq!(hourly.labels, vec!["14:00"]);
        assert_eq!(hourly.style.point_radius, MARKER_RADIUS);

        let daily = renderer.render(&rows, Bucket::Day).unwrap();
        assert_eq!(daily.labels, vec!["20/05"]);
        assert_eq!(daily.style.point_radius, MARKER_RADIUS);
    }

    #[test]
    fn test_labels_use_display_offset() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let renderer = SeriesRenderer::new(offset, StyleTable::default());
        let series = renderer.render(&[row(1, 30, 1.0)], Bucket::Minute).unwrap();
        assert_eq!(series.labels, vec!["22:30"]);

        let series = renderer.render(&[row(1, 30, 1.0)], Bucket::Day).unwrap();
        assert_eq!(series.labels, vec!["19/05"]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let renderer = SeriesRenderer::default();
        let rows = vec![row(12, 1, 3.5), row(11, 59, 1.5), row(12, 0, 2.5)];
        let first = renderer.render(&rows, Bucket::Minute).unwrap();
        let second = renderer.render(&rows, Bucket::Minute).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_style_lookup_falls_back_to_hour() {
        let builtin = StyleTable::default();
        assert_eq!(builtin.resolve(Bucket::Day), builtin_style(Bucket::Day));

        let styles = StyleTable {
            minute: None,
            hour: Some(StyleEntry::new("#ff0000", "Per hour")),
            day: Some(StyleEntry::new("#00ff00", "Per day")),
        };
        assert_eq!(styles.resolve(Bucket::Minute), StyleEntry::new("#ff0000", "Per hour"));
        assert_eq!(styles.resolve(Bucket::Day), StyleEntry::new("#00ff00", "Per day"));

        let renderer = SeriesRenderer::new(FixedOffset::east_opt(0).unwrap(), styles);
        let series = renderer.render(&[row(0, 0, 1.0)], Bucket::Minute).unwrap();
        assert_eq!(series.style.color, "#ff0000");
        assert_eq!(series.style.title, "Per hour");
    }
}
