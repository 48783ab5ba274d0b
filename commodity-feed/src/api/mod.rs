pub mod yahoo;

pub use yahoo::YahooClient;

use crate::error::Result;
use crate::models::TimeSeries;
use async_trait::async_trait;

/// Upstream source of OHLCV history. `period` and `interval` are the
/// provider's own tokens, not UI labels.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn history(&self, symbol: &str, period: &str, interval: &str) -> Result<TimeSeries>;
}
