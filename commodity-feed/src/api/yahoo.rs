use crate::api::MarketDataProvider;
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::models::{Bar, Column, TimeSeries};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info};
use urlencoding::encode;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; commodity-feed/0.1)";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

impl QuoteColumns {
    fn column(&self, column: Column) -> Option<&Vec<Option<f64>>> {
        match column {
            Column::Open => self.open.as_ref(),
            Column::High => self.high.as_ref(),
            Column::Low => self.low.as_ref(),
            Column::Close => self.close.as_ref(),
            Column::Volume => self.volume.as_ref(),
        }
    }
}

/// Yahoo Finance chart API client.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.yahoo_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn chart_url(&self, symbol: &str, period: &str, interval: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}&interval={}&includePrePost=false&events=",
            self.base_url,
            encode(symbol),
            period,
            interval
        )
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn history(&self, symbol: &str, period: &str, interval: &str) -> Result<TimeSeries> {
        let url = self.chart_url(symbol, period, interval);
        debug!("Fetching {} history from Yahoo: {}", symbol, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        match parse_chart(&text) {
            Ok(series) => {
                info!(
                    "[YAHOO] {} {}/{}: {} bars",
                    symbol,
                    period,
                    interval,
                    series.len()
                );
                Ok(series)
            }
            Err(e) => {
                error!("Yahoo raw response: {}", text);
                Err(e)
            }
        }
    }
}

/// Error for a non-2xx answer. Yahoo reports unknown symbols as a 404
/// carrying a `chart.error` body; anything else is a bare status error.
pub fn status_error(status: StatusCode, body: &str) -> DashboardError {
    if let Ok(ChartResponse {
        chart: Chart { error: Some(e), .. },
    }) = serde_json::from_str::<ChartResponse>(body)
    {
        return DashboardError::Provider(format!("{}: {}", e.code, e.description));
    }

    DashboardError::Api {
        status: status.as_u16(),
        message: format!("Yahoo chart API returned status: {}", status),
    }
}

/// Decode a chart payload into a series. Columns missing from the quote
/// block are recorded as absent; a result with no timestamps is empty.
pub fn parse_chart(text: &str) -> Result<TimeSeries> {
    let response: ChartResponse = serde_json::from_str(text)?;

    if let Some(e) = response.chart.error {
        return Err(DashboardError::Provider(format!("{}: {}", e.code, e.description)));
    }

    let result = match response.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => return Ok(TimeSeries::empty()),
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let columns: Vec<Column> = Column::ALL
        .into_iter()
        .filter(|c| quote.column(*c).is_some())
        .collect();

    let at = |column: Column, i: usize| -> Option<f64> {
        quote
            .column(column)
            .and_then(|values| values.get(i).copied().flatten())
    };

    let bars: Vec<Bar> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, secs)| {
            let timestamp = Utc.timestamp_opt(*secs, 0).single()?;
            Some(Bar {
                timestamp,
                open: at(Column::Open, i),
                high: at(Column::High, i),
                low: at(Column::Low, i),
                close: at(Column::Close, i),
                volume: at(Column::Volume, i),
            })
        })
        .collect();

    Ok(TimeSeries::new(columns, bars))
}
