use crate::catalog::{find_commodity, Commodity, Interval, Window, COMMODITIES};
use crate::error::{DashboardError, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// What the sidebar would have selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub commodity: Commodity,
    pub window: Window,
    pub interval: Interval,
    pub candlesticks: bool,
    pub show_volume: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            commodity: COMMODITIES[0],
            window: Window::default(),
            interval: Interval::default(),
            candlesticks: true,
            show_volume: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub yahoo_base_url: String,
    pub http_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_failures: bool,
    pub selection: Selection,
    pub output: OutputFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let yahoo_base_url = lookup("YAHOO_BASE_URL")
            .unwrap_or_else(|| "https://query1.finance.yahoo.com".to_string());

        let http_timeout_secs = lookup("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u64>()
            .map_err(|_| DashboardError::Config("Invalid HTTP_TIMEOUT_SECS".to_string()))?;

        let cache_ttl_secs = lookup("CACHE_TTL_SECS")
            .unwrap_or_else(|| "60".to_string())
            .parse::<u64>()
            .map_err(|_| DashboardError::Config("Invalid CACHE_TTL_SECS".to_string()))?;

        let cache_failures = parse_flag(&lookup, "CACHE_FAILURES", false)?;

        let commodity = match lookup("DASHBOARD_COMMODITY") {
            Some(value) => find_commodity(&value)?,
            None => COMMODITIES[0],
        };

        let window = match lookup("DASHBOARD_PERIOD") {
            Some(value) => value.parse::<Window>()?,
            None => Window::default(),
        };

        let interval = match lookup("DASHBOARD_INTERVAL") {
            Some(value) => value.parse::<Interval>()?,
            None => Interval::default(),
        };

        let output = match lookup("DASHBOARD_OUTPUT")
            .unwrap_or_else(|| "text".to_string())
            .to_lowercase()
            .as_str()
        {
            "text" => OutputFormat::Text,
            "json" => OutputFormat::Json,
            other => {
                return Err(DashboardError::Config(format!(
                    "Invalid DASHBOARD_OUTPUT: {}",
                    other
                )));
            }
        };

        Ok(Self {
            yahoo_base_url,
            http_timeout_secs,
            cache_ttl_secs,
            cache_failures,
            selection: Selection {
                commodity,
                window,
                interval,
                candlesticks: parse_flag(&lookup, "DASHBOARD_CANDLESTICKS", true)?,
                show_volume: parse_flag(&lookup, "DASHBOARD_SHOW_VOLUME", false)?,
            },
            output,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.yahoo_base_url.trim().is_empty() {
            return Err(DashboardError::Config(
                "YAHOO_BASE_URL cannot be empty".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(DashboardError::Config(
                "HTTP_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        if self.cache_ttl_secs == 0 {
            return Err(DashboardError::Config(
                "CACHE_TTL_SECS must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            http_timeout_secs: 10,
            cache_ttl_secs: 60,
            cache_failures: false,
            selection: Selection::default(),
            output: OutputFormat::Text,
        }
    }
}

fn parse_flag<F>(lookup: &F, name: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<bool>()
            .map_err(|_| DashboardError::Config(format!("Invalid {}", name))),
        None => Ok(default),
    }
}
