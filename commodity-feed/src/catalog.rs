//! Fixed display vocabulary: the commodity list and the two lookup tables
//! translating UI options into Yahoo period/interval tokens.

use crate::error::{DashboardError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Commodity {
    pub name: &'static str,
    pub ticker: &'static str,
}

impl Commodity {
    /// Sidebar label, e.g. `Gold (GC=F)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.ticker)
    }
}

pub const COMMODITIES: [Commodity; 12] = [
    Commodity { name: "Gold", ticker: "GC=F" },
    Commodity { name: "Silver", ticker: "SI=F" },
    Commodity { name: "WTI Crude", ticker: "CL=F" },
    Commodity { name: "Brent Crude", ticker: "BZ=F" },
    Commodity { name: "Natural Gas", ticker: "NG=F" },
    Commodity { name: "Copper", ticker: "HG=F" },
    Commodity { name: "Corn", ticker: "ZC=F" },
    Commodity { name: "Wheat", ticker: "ZW=F" },
    Commodity { name: "Soybeans", ticker: "ZS=F" },
    Commodity { name: "Coffee", ticker: "KC=F" },
    Commodity { name: "Cocoa", ticker: "CC=F" },
    Commodity { name: "Cotton", ticker: "CT=F" },
];

/// Look up a commodity by its full label, its name or its ticker.
pub fn find_commodity(query: &str) -> Result<Commodity> {
    let query = query.trim();
    COMMODITIES
        .iter()
        .find(|c| {
            c.label().eq_ignore_ascii_case(query)
                || c.name.eq_ignore_ascii_case(query)
                || c.ticker.eq_ignore_ascii_case(query)
        })
        .copied()
        .ok_or_else(|| DashboardError::InvalidSelection(format!("Unknown commodity: {}", query)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Window {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
}

impl Window {
    pub const ALL: [Window; 6] = [
        Window::OneMonth,
        Window::ThreeMonths,
        Window::SixMonths,
        Window::OneYear,
        Window::TwoYears,
        Window::FiveYears,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Window::OneMonth => "1M",
            Window::ThreeMonths => "3M",
            Window::SixMonths => "6M",
            Window::OneYear => "1Y",
            Window::TwoYears => "2Y",
            Window::FiveYears => "5Y",
        }
    }

    /// Yahoo `range` token.
    pub fn provider_token(self) -> &'static str {
        match self {
            Window::OneMonth => "1mo",
            Window::ThreeMonths => "3mo",
            Window::SixMonths => "6mo",
            Window::OneYear => "1y",
            Window::TwoYears => "2y",
            Window::FiveYears => "5y",
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::SixMonths
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Window {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Window::ALL
            .into_iter()
            .find(|w| w.label().eq_ignore_ascii_case(s) || w.provider_token() == s)
            .ok_or_else(|| DashboardError::InvalidSelection(format!("Unknown period: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Interval {
    Daily,
    Hourly,
    FifteenMinutes,
}

impl Interval {
    pub const ALL: [Interval; 3] = [Interval::Daily, Interval::Hourly, Interval::FifteenMinutes];

    pub fn label(self) -> &'static str {
        match self {
            Interval::Daily => "Daily",
            Interval::Hourly => "Hourly",
            Interval::FifteenMinutes => "15 min",
        }
    }

    /// Yahoo `interval` token.
    pub fn provider_token(self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Hourly => "1h",
            Interval::FifteenMinutes => "15m",
        }
    }

    pub fn is_intraday(self) -> bool {
        matches!(self, Interval::Hourly | Interval::FifteenMinutes)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Daily
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Interval {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Interval::ALL
            .into_iter()
            .find(|i| i.label().eq_ignore_ascii_case(s) || i.provider_token() == s)
            .ok_or_else(|| DashboardError::InvalidSelection(format!("Unknown interval: {}", s)))
    }
}

/// Longest window Yahoo serves at intraday granularity.
pub const MAX_INTRADAY_WINDOW: Window = Window::ThreeMonths;

pub const INTRADAY_CLAMP_NOTICE: &str =
    "Intraday intervals only support recent windows on Yahoo. Switching to 3M.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowAdjustment {
    pub requested: Window,
    pub applied: Window,
    pub notice: String,
}

/// Apply the intraday window limit before a fetch is issued.
///
/// Returns the window to request and, when it differs from the requested
/// one, the adjustment the caller must surface to the user.
pub fn clamp_window(window: Window, interval: Interval) -> (Window, Option<WindowAdjustment>) {
    if interval.is_intraday() && window > MAX_INTRADAY_WINDOW {
        let adjustment = WindowAdjustment {
            requested: window,
            applied: MAX_INTRADAY_WINDOW,
            notice: INTRADAY_CLAMP_NOTICE.to_string(),
        };
        (MAX_INTRADAY_WINDOW, Some(adjustment))
    } else {
        (window, None)
    }
}
