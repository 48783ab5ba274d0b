use crate::models::{Column, Metrics, TimeSeries};

/// Derive the headline metrics for a series.
///
/// Every field that cannot be computed is left unknown; this never fails.
pub fn derive(series: &TimeSeries) -> Metrics {
    if series.is_empty() || !series.has_column(Column::Close) {
        return Metrics::unknown();
    }

    let closes = series.values(Column::Close);
    let last = match closes.last() {
        Some(last) => *last,
        None => return Metrics::unknown(),
    };

    let previous = closes.len().checked_sub(2).map(|i| closes[i]);
    let change = previous.map(|prev| last - prev);
    let change_percent = match (change, previous) {
        (Some(change), Some(prev)) if prev != 0.0 => finite(change / prev * 100.0),
        _ => None,
    };

    let period_high = series
        .values(Column::High)
        .into_iter()
        .reduce(f64::max);
    let period_low = series
        .values(Column::Low)
        .into_iter()
        .reduce(f64::min);

    let latest_volume = if series.has_column(Column::Volume) {
        series.last().and_then(|bar| bar.volume)
    } else {
        None
    };

    Metrics {
        last: Some(last),
        change,
        change_percent,
        period_high,
        period_low,
        latest_volume,
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bar;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()
    }

    fn bar(day: u32, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
        Bar {
            timestamp: ts(day),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }

    #[test]
    fn test_empty_series_is_all_unknown() {
        assert!(derive(&TimeSeries::empty()).is_all_unknown());
    }

    #[test]
    fn test_missing_close_column_is_all_unknown() {
        let series = TimeSeries::new(
            [Column::High, Column::Low, Column::Volume],
            vec![bar(1, 1.0, 2.0, 0.5, 1.5, 10.0)],
        );
        assert!(derive(&series).is_all_unknown());
    }

    #[test]
    fn test_all_null_closes_is_all_unknown() {
        let mut only_high = Bar::new(ts(1));
        only_high.high = Some(12.0);
        let series = TimeSeries::ohlcv(vec![only_high]);

        assert!(derive(&series).is_all_unknown());
    }

    #[test]
    fn test_single_close() {
        let series = TimeSeries::new([Column::Close], vec![Bar::with_close(ts(1), 100.0)]);
        let metrics = derive(&series);

        assert_eq!(metrics.last, Some(100.0));
        assert_eq!(metrics.change, None);
        assert_eq!(metrics.change_percent, None);
        assert_eq!(metrics.period_high, None);
        assert_eq!(metrics.period_low, None);
        assert_eq!(metrics.latest_volume, None);
    }

    #[test]
    fn test_two_closes() {
        let series = TimeSeries::new(
            [Column::Close],
            vec![Bar::with_close(ts(1), 100.0), Bar::with_close(ts(2), 110.0)],
        );
        let metrics = derive(&series);

        assert_eq!(metrics.last, Some(110.0));
        assert_eq!(metrics.change, Some(10.0));
        let pct = metrics.change_percent.unwrap();
        assert!((pct - 9.0909).abs() < 1e-3, "got {}", pct);
    }

    #[test]
    fn test_zero_previous_close_has_unknown_percent() {
        let series = TimeSeries::new(
            [Column::Close],
            vec![Bar::with_close(ts(1), 0.0), Bar::with_close(ts(2), 5.0)],
        );
        let metrics = derive(&series);

        assert_eq!(metrics.change, Some(5.0));
        assert_eq!(metrics.change_percent, None);
    }

    #[test]
    fn test_null_closes_are_skipped_for_change() {
        let mut gap = Bar::new(ts(2));
        gap.volume = Some(7.0);
        let series = TimeSeries::ohlcv(vec![
            Bar::with_close(ts(1), 50.0),
            gap,
            Bar::with_close(ts(3), 55.0),
        ]);
        let metrics = derive(&series);

        assert_eq!(metrics.last, Some(55.0));
        assert_eq!(metrics.change, Some(5.0));
        assert!((metrics.change_percent.unwrap() - 10.0).abs() < 1e-9);
        // volume is read from the final bar, which has none
        assert_eq!(metrics.latest_volume, None);
    }

    #[test]
    fn test_full_ohlcv_series() {
        let series = TimeSeries::ohlcv(vec![
            bar(1, 2000.0, 2010.0, 1990.0, 2005.0, 1200.0),
            bar(2, 2005.0, 2040.0, 2001.0, 2030.0, 1500.0),
            bar(3, 2030.0, 2035.0, 1985.0, 2020.0, 900.0),
        ]);
        let metrics = derive(&series);

        assert_eq!(metrics.last, Some(2020.0));
        assert_eq!(metrics.change, Some(-10.0));
        assert_eq!(metrics.period_high, Some(2040.0));
        assert_eq!(metrics.period_low, Some(1985.0));
        assert_eq!(metrics.latest_volume, Some(900.0));
    }
}
