use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Lookback window applied to a series, measured back from its last bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1H")]
    OneHour,
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[default]
    #[serde(rename = "ALL")]
    All,
}

impl Timeframe {
    pub const ALL: [Timeframe; 8] = [
        Self::OneHour,
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::All,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneHour => "1H",
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
            Self::All => "ALL",
        }
    }

    /// Window length, or `None` for all history. Months count as 30 days, years as 365.
    pub fn window(self) -> Option<Duration> {
        let window = match self {
            Self::OneHour => Duration::hours(1),
            Self::OneDay => Duration::days(1),
            Self::OneWeek => Duration::weeks(1),
            Self::OneMonth => Duration::days(30),
            Self::ThreeMonths => Duration::days(90),
            Self::SixMonths => Duration::days(180),
            Self::OneYear => Duration::days(365),
            Self::All => return None,
        };
        Some(window)
    }
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized timeframe: {0}")]
pub struct ParseTimeframeError(pub String);

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let timeframe = match normalized.as_str() {
            "1H" | "1HOUR" => Self::OneHour,
            "1D" | "1DAY" => Self::OneDay,
            "1W" | "1WEEK" => Self::OneWeek,
            "1M" | "1MONTH" => Self::OneMonth,
            "3M" | "3MONTHS" => Self::ThreeMonths,
            "6M" | "6MONTHS" => Self::SixMonths,
            "1Y" | "1YEAR" => Self::OneYear,
            "ALL" | "MAX" => Self::All,
            _ => return Err(ParseTimeframeError(s.to_string())),
        };
        Ok(timeframe)
    }
}
