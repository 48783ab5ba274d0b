//! Commodity futures dashboard feed.
//!
//! Fetches OHLCV history from Yahoo Finance through a short-lived cache,
//! derives headline metrics and descriptive statistics, and assembles a
//! render model for a single dashboard page.

pub mod api;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod models;
pub mod stats;


pub use api::{MarketDataProvider, YahooClient};
pub use catalog::{clamp_window, Commodity, Interval, Window, WindowAdjustment, COMMODITIES};
pub use config::{Config, OutputFormat, Selection};
pub use dashboard::{build_view, render, render_text, DashboardView};
pub use error::{DashboardError, Result};
pub use fetcher::DataFetcher;
pub use models::{Bar, Column, FetchResult, Metrics, TimeSeries};
