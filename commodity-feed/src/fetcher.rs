use crate::api::MarketDataProvider;
use crate::catalog::{Interval, Window};
use crate::models::FetchResult;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub window: Window,
    pub interval: Interval,
}

impl CacheKey {
    pub fn new(symbol: &str, window: Window, interval: Interval) -> Self {
        Self {
            symbol: symbol.to_string(),
            window,
            interval,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: FetchResult,
    pub fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) <= ttl
    }
}

/// Fetches history through a provider and keeps each result for `ttl`.
///
/// Provider errors never escape: they come back as `FetchResult::Failed`.
/// Failures are only cached when `cache_failures` is set, so by default a
/// provider outage is retried on the next call.
pub struct DataFetcher {
    provider: Arc<dyn MarketDataProvider>,
    cache: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    cache_failures: bool,
}

impl DataFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_ttl(provider, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(provider: Arc<dyn MarketDataProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            cache: Mutex::new(HashMap::new()),
            ttl,
            cache_failures: false,
        }
    }

    pub fn cache_failures(mut self, enabled: bool) -> Self {
        self.cache_failures = enabled;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn fetch(&self, symbol: &str, window: Window, interval: Interval) -> FetchResult {
        let key = CacheKey::new(symbol, window, interval);

        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(&key) {
                if entry.is_fresh(self.ttl, Instant::now()) {
                    debug!("Cache hit for {} {}/{}", symbol, window, interval);
                    return entry.result.clone();
                }
            }
        }

        info!("Cache miss for {} {}/{}, querying provider", symbol, window, interval);
        let result = match self
            .provider
            .history(symbol, window.provider_token(), interval.provider_token())
            .await
        {
            Ok(series) => FetchResult::from_series(series.drop_all_null_rows()),
            Err(e) => {
                warn!("Failed to fetch {} {}/{}: {}", symbol, window, interval, e);
                FetchResult::failed(e.to_string())
            }
        };

        let mut cache = self.cache.lock().await;
        if result.is_failure() && !self.cache_failures {
            cache.remove(&key);
        } else {
            cache.insert(
                key,
                CacheEntry {
                    result: result.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }

        result
    }

    pub async fn cached_keys(&self) -> usize {
        self.cache.lock().await.len()
    }
}
