//! Render model for one dashboard page: notices, metric tiles, chart,
//! volume and stats panels. Nothing here draws; renderers consume
//! [`DashboardView`].

use crate::catalog::{clamp_window, Interval, Window, WindowAdjustment};
use crate::config::Selection;
use crate::fetcher::DataFetcher;
use crate::metrics::derive;
use crate::models::{Bar, Column, FetchResult, Metrics};
use crate::stats::{describe_closes, DescriptiveStats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use tracing::{info, warn};

pub const TITLE: &str = "Commodities Dashboard";
pub const CAPTION: &str = "Data: Yahoo Finance chart API";
pub const PLACEHOLDER: &str = "—";
pub const NO_STATS_MESSAGE: &str = "No statistics available for this selection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Candlestick,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumePoint {
    pub timestamp: DateTime<Utc>,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub caption: &'static str,
    pub commodity: String,
    pub ticker: &'static str,
    pub window: Window,
    pub interval: Interval,
    pub adjustment: Option<WindowAdjustment>,
    pub notices: Vec<Notice>,
    pub metrics: Metrics,
    pub tiles: Vec<MetricTile>,
    pub last_refresh: String,
    pub chart: Option<Chart>,
    pub volume: Option<Vec<VolumePoint>>,
    pub stats: Option<DescriptiveStats>,
}

/// Run one render cycle: clamp the window, fetch, derive.
pub async fn render(
    fetcher: &DataFetcher,
    selection: &Selection,
    now: DateTime<Utc>,
) -> DashboardView {
    let (window, adjustment) = clamp_window(selection.window, selection.interval);
    if let Some(adjustment) = &adjustment {
        warn!(
            "Window {} not available at {} granularity, using {}",
            adjustment.requested, selection.interval, adjustment.applied
        );
    }

    info!(
        "Loading {} • period={} • interval={}",
        selection.commodity.label(),
        window,
        selection.interval
    );
    let result = fetcher
        .fetch(selection.commodity.ticker, window, selection.interval)
        .await;

    build_view(selection, window, adjustment, &result, now)
}

/// Assemble the view from an already fetched result.
pub fn build_view(
    selection: &Selection,
    window: Window,
    adjustment: Option<WindowAdjustment>,
    result: &FetchResult,
    now: DateTime<Utc>,
) -> DashboardView {
    let commodity = selection.commodity;
    let mut notices = Vec::new();
    if let Some(adjustment) = &adjustment {
        notices.push(Notice::new(NoticeLevel::Warning, adjustment.notice.clone()));
    }

    let metrics = result.series().map(derive).unwrap_or_default();

    let mut view = DashboardView {
        title: TITLE,
        caption: CAPTION,
        commodity: commodity.label(),
        ticker: commodity.ticker,
        window,
        interval: selection.interval,
        adjustment,
        notices,
        metrics,
        tiles: metric_tiles(&metrics),
        last_refresh: now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        chart: None,
        volume: None,
        stats: None,
    };

    let series = match result {
        FetchResult::Data(series) => series,
        FetchResult::Empty | FetchResult::Failed { .. } => {
            let mut message = format!("No data returned for {}.", commodity.label());
            if let Some(detail) = result.error_message() {
                write!(message, "\n\nDetails: {}", detail).ok();
            }
            view.notices.push(Notice::new(NoticeLevel::Error, message));
            return view;
        }
    };

    let has_ohlc = [Column::Open, Column::High, Column::Low, Column::Close]
        .iter()
        .all(|c| series.has_column(*c));
    view.chart = if selection.candlesticks && has_ohlc {
        Some(Chart {
            kind: ChartKind::Candlestick,
            bars: series.bars().to_vec(),
        })
    } else if series.has_column(Column::Close) {
        Some(Chart {
            kind: ChartKind::Line,
            bars: series.bars().to_vec(),
        })
    } else {
        None
    };

    if selection.show_volume && series.has_column(Column::Volume) {
        view.volume = Some(
            series
                .bars()
                .iter()
                .map(|b| VolumePoint {
                    timestamp: b.timestamp,
                    volume: b.volume.unwrap_or(0.0),
                })
                .collect(),
        );
    }

    view.stats = describe_closes(series);
    if view.stats.is_none() {
        view.notices.push(Notice::new(NoticeLevel::Info, NO_STATS_MESSAGE));
    }

    view
}

fn metric_tiles(metrics: &Metrics) -> Vec<MetricTile> {
    vec![
        tile("Last", metrics.last, |v| format_number(v, 2)),
        tile("Change", metrics.change, |v| format_number(v, 2)),
        tile("Change %", metrics.change_percent, |v| format!("{:.2}%", v)),
        tile("Period High", metrics.period_high, |v| format_number(v, 2)),
        tile("Period Low", metrics.period_low, |v| format_number(v, 2)),
        tile("Volume", metrics.latest_volume, |v| format_number(v, 0)),
    ]
}

fn tile(label: &'static str, value: Option<f64>, format: impl Fn(f64) -> String) -> MetricTile {
    MetricTile {
        label,
        value: value.map(format).unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}

/// Fixed-point formatting with comma thousands separators, e.g. `2,034.50`.
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Plain-text rendering of a view, one panel after another.
pub fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();

    writeln!(out, "📈 {}", view.title).ok();
    writeln!(out, "{}", view.caption).ok();
    writeln!(
        out,
        "{} • period={} • interval={}",
        view.commodity, view.window, view.interval
    )
    .ok();
    writeln!(out).ok();

    for notice in &view.notices {
        let tag = match notice.level {
            NoticeLevel::Info => "INFO",
            NoticeLevel::Warning => "WARNING",
            NoticeLevel::Error => "ERROR",
        };
        writeln!(out, "[{}] {}", tag, notice.message).ok();
    }

    for tile in &view.tiles {
        writeln!(out, "  {:<12} {}", tile.label, tile.value).ok();
    }
    writeln!(out, "Last refresh: {}", view.last_refresh).ok();

    if let Some(chart) = &view.chart {
        let kind = match chart.kind {
            ChartKind::Candlestick => "Candlestick",
            ChartKind::Line => "Line",
        };
        writeln!(out).ok();
        writeln!(out, "{} chart: {} bars", kind, chart.bars.len()).ok();
        if let (Some(first), Some(last)) = (chart.bars.first(), chart.bars.last()) {
            writeln!(
                out,
                "  {} → {}",
                first.timestamp.format("%b %d %Y"),
                last.timestamp.format("%b %d %Y")
            )
            .ok();
        }
    }

    if let Some(volume) = &view.volume {
        let total: f64 = volume.iter().map(|p| p.volume).sum();
        writeln!(out).ok();
        writeln!(out, "Volume: {} bars, total {}", volume.len(), format_number(total, 0)).ok();
    }

    if let Some(stats) = &view.stats {
        let std = stats
            .std
            .map(|v| format_number(v, 4))
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        writeln!(out).ok();
        writeln!(out, "Stats (Close)").ok();
        writeln!(out, "  count  {}", stats.count).ok();
        writeln!(out, "  mean   {}", format_number(stats.mean, 4)).ok();
        writeln!(out, "  std    {}", std).ok();
        writeln!(out, "  min    {}", format_number(stats.min, 4)).ok();
        writeln!(out, "  25%    {}", format_number(stats.q25, 4)).ok();
        writeln!(out, "  50%    {}", format_number(stats.median, 4)).ok();
        writeln!(out, "  75%    {}", format_number(stats.q75, 4)).ok();
        writeln!(out, "  max    {}", format_number(stats.max, 4)).ok();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{find_commodity, INTRADAY_CLAMP_NOTICE};
    use crate::models::TimeSeries;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 5).unwrap()
    }

    fn ohlcv_series() -> TimeSeries {
        let bar = |day: u32, close: f64, volume: Option<f64>| Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap(),
            open: Some(close - 1.0),
            high: Some(close + 2.0),
            low: Some(close - 3.0),
            close: Some(close),
            volume,
        };
        TimeSeries::ohlcv(vec![bar(1, 2300.0, Some(1000.0)), bar(2, 2346.0, None)])
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.0, 2), "999.00");
        assert_eq!(format_number(-1500.5, 2), "-1,500.50");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(12000.0, 0), "12,000");
    }

    #[test]
    fn test_data_view_has_all_panels() {
        let selection = Selection {
            show_volume: true,
            ..Selection::default()
        };
        let result = FetchResult::Data(ohlcv_series());
        let view = build_view(&selection, Window::SixMonths, None, &result, now());

        assert!(view.notices.is_empty());
        assert_eq!(view.last_refresh, "2024-06-03 14:30:05 UTC");
        assert_eq!(view.chart.as_ref().unwrap().kind, ChartKind::Candlestick);
        assert_eq!(view.tiles[0].value, "2,346.00");
        assert_eq!(view.tiles[1].value, "46.00");
        assert_eq!(view.tiles[2].value, "2.00%");
        assert_eq!(view.tiles[5].value, PLACEHOLDER);

        let volume = view.volume.unwrap();
        assert_eq!(volume[0].volume, 1000.0);
        assert_eq!(volume[1].volume, 0.0);
        assert_eq!(view.stats.unwrap().count, 2);
    }

    #[test]
    fn test_line_chart_when_candles_disabled_or_columns_missing() {
        let selection = Selection {
            candlesticks: false,
            ..Selection::default()
        };
        let result = FetchResult::Data(ohlcv_series());
        let view = build_view(&selection, Window::SixMonths, None, &result, now());
        assert_eq!(view.chart.unwrap().kind, ChartKind::Line);

        let close_only = TimeSeries::new([Column::Close], ohlcv_series().bars().to_vec());
        let result = FetchResult::Data(close_only);
        let view = build_view(&Selection::default(), Window::SixMonths, None, &result, now());
        assert_eq!(view.chart.unwrap().kind, ChartKind::Line);
        assert!(view.volume.is_none());
    }

    #[test]
    fn test_failure_view_names_symbol_and_detail() {
        let selection = Selection {
            commodity: find_commodity("CL=F").unwrap(),
            ..Selection::default()
        };
        let result = FetchResult::failed("Not Found: symbol may be delisted");
        let view = build_view(&selection, Window::SixMonths, None, &result, now());

        assert!(view.chart.is_none());
        assert!(view.stats.is_none());
        assert!(view.tiles.iter().all(|t| t.value == PLACEHOLDER));

        let error = view.notices.last().unwrap();
        assert_eq!(error.level, NoticeLevel::Error);
        assert_eq!(
            error.message,
            "No data returned for WTI Crude (CL=F).\n\nDetails: Not Found: symbol may be delisted"
        );
    }

    #[test]
    fn test_empty_view_has_no_details() {
        let result = FetchResult::Empty;
        let view = build_view(&Selection::default(), Window::SixMonths, None, &result, now());

        assert!(view.chart.is_none());
        assert_eq!(view.notices.len(), 1);
        assert_eq!(view.notices[0].message, "No data returned for Gold (GC=F).");
    }

    #[test]
    fn test_adjustment_notice_comes_first() {
        let selection = Selection {
            window: Window::OneYear,
            interval: Interval::Hourly,
            ..Selection::default()
        };
        let (window, adjustment) = clamp_window(selection.window, selection.interval);
        let view = build_view(&selection, window, adjustment, &FetchResult::Empty, now());

        assert_eq!(view.window, Window::ThreeMonths);
        assert_eq!(view.notices[0].level, NoticeLevel::Warning);
        assert_eq!(view.notices[0].message, INTRADAY_CLAMP_NOTICE);
    }

    #[test]
    fn test_render_text_shows_placeholders() {
        let result = FetchResult::Empty;
        let view = build_view(&Selection::default(), Window::SixMonths, None, &result, now());
        let text = render_text(&view);

        assert!(text.contains("[ERROR] No data returned for Gold (GC=F)."));
        assert!(text.contains(&format!("{:<12} {}", "Last", PLACEHOLDER)));
        assert!(!text.contains("chart:"));
    }
}
