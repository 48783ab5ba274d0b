use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];
}

/// One OHLCV bar. Any field may be missing upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
        }
    }

    pub fn with_close(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            close: Some(close),
            ..Self::new(timestamp)
        }
    }

    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Open => self.open,
            Column::High => self.high,
            Column::Low => self.low,
            Column::Close => self.close,
            Column::Volume => self.volume,
        }
    }

    fn clear(&mut self, column: Column) {
        match column {
            Column::Open => self.open = None,
            Column::High => self.high = None,
            Column::Low => self.low = None,
            Column::Close => self.close = None,
            Column::Volume => self.volume = None,
        }
    }

    /// True when every price and volume field is missing.
    pub fn is_all_null(&self) -> bool {
        Column::ALL.iter().all(|c| self.value(*c).is_none())
    }
}

/// Chronologically ordered bars plus the set of columns the provider
/// actually returned. A column can be present with every value null,
/// which is not the same as the column being absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TimeSeries {
    columns: BTreeSet<Column>,
    bars: Vec<Bar>,
}

impl TimeSeries {
    /// Builds a series sorted by timestamp. When two bars share a timestamp
    /// the later one wins. Values for columns outside `columns` are cleared.
    pub fn new(columns: impl IntoIterator<Item = Column>, mut bars: Vec<Bar>) -> Self {
        let columns: BTreeSet<Column> = columns.into_iter().collect();

        for bar in bars.iter_mut() {
            for column in Column::ALL {
                if !columns.contains(&column) {
                    bar.clear(column);
                }
            }
        }

        bars.sort_by_key(|b| b.timestamp);
        let mut unique: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match unique.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => unique.push(bar),
            }
        }

        Self {
            columns,
            bars: unique,
        }
    }

    /// Series carrying all five OHLCV columns.
    pub fn ohlcv(bars: Vec<Bar>) -> Self {
        Self::new(Column::ALL, bars)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn columns(&self) -> &BTreeSet<Column> {
        &self.columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Non-null values of a column in chronological order. Empty when the
    /// column is absent.
    pub fn values(&self, column: Column) -> Vec<f64> {
        if !self.has_column(column) {
            return Vec::new();
        }
        self.bars.iter().filter_map(|b| b.value(column)).collect()
    }

    /// Drops bars with no values at all.
    pub fn drop_all_null_rows(mut self) -> Self {
        self.bars.retain(|b| !b.is_all_null());
        self
    }
}

/// Outcome of one fetch. `Empty` means the provider answered with no rows
/// and is not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResult {
    Data(TimeSeries),
    Empty,
    Failed { message: String },
}

impl FetchResult {
    /// Wraps a series, mapping an empty one to `Empty`.
    pub fn from_series(series: TimeSeries) -> Self {
        if series.is_empty() {
            FetchResult::Empty
        } else {
            FetchResult::Data(series)
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        FetchResult::Failed {
            message: message.into(),
        }
    }

    pub fn series(&self) -> Option<&TimeSeries> {
        match self {
            FetchResult::Data(series) => Some(series),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchResult::Failed { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchResult::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Headline figures. `None` means unknown and is rendered as a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Metrics {
    pub last: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub period_high: Option<f64>,
    pub period_low: Option<f64>,
    pub latest_volume: Option<f64>,
}

impl Metrics {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_all_unknown(&self) -> bool {
        *self == Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_series_is_sorted_and_deduplicated() {
        let series = TimeSeries::new(
            [Column::Close],
            vec![
                Bar::with_close(ts(3), 103.0),
                Bar::with_close(ts(1), 101.0),
                Bar::with_close(ts(3), 104.0),
                Bar::with_close(ts(2), 102.0),
            ],
        );

        let closes: Vec<f64> = series.values(Column::Close);
        assert_eq!(closes, vec![101.0, 102.0, 104.0]);
        assert_eq!(series.last().unwrap().timestamp, ts(3));
    }

    #[test]
    fn test_series_only_serializes_normalized_bars() {
        let series = TimeSeries::new(
            [Column::Close],
            vec![Bar::with_close(ts(2), 2.0), Bar::with_close(ts(1), 1.0)],
        );
        let json = serde_json::to_value(&series).unwrap();

        assert_eq!(json["columns"], serde_json::json!(["close"]));
        assert_eq!(json["bars"][0]["close"], serde_json::json!(1.0));
        assert_eq!(json["bars"][1]["close"], serde_json::json!(2.0));
        assert!(json["bars"][0]["volume"].is_null());
    }

    #[test]
    fn test_absent_columns_are_cleared() {
        let mut bar = Bar::with_close(ts(1), 10.0);
        bar.volume = Some(500.0);
        let series = TimeSeries::new([Column::Close], vec![bar]);

        assert!(!series.has_column(Column::Volume));
        assert_eq!(series.bars()[0].volume, None);
        assert!(series.values(Column::Volume).is_empty());
    }

    #[test]
    fn test_drop_all_null_rows() {
        let series = TimeSeries::ohlcv(vec![
            Bar::new(ts(1)),
            Bar::with_close(ts(2), 5.0),
            Bar::new(ts(3)),
        ])
        .drop_all_null_rows();

        assert_eq!(series.len(), 1);
        assert_eq!(series.bars()[0].timestamp, ts(2));
    }

    #[test]
    fn test_fetch_result_outcomes_stay_distinct() {
        assert_eq!(FetchResult::from_series(TimeSeries::empty()), FetchResult::Empty);
        assert!(!FetchResult::Empty.is_failure());

        let failed = FetchResult::failed("timeout");
        assert!(failed.is_failure());
        assert_eq!(failed.error_message(), Some("timeout"));
        assert_ne!(failed, FetchResult::Empty);

        let data = FetchResult::from_series(TimeSeries::ohlcv(vec![Bar::with_close(ts(1), 1.0)]));
        assert_eq!(data.series().map(|s| s.len()), Some(1));
    }
}
