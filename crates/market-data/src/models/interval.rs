use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::Duration;
use log::debug;
use serde::{Deserialize, Serialize};

/// Candle granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
}

/// Native bar size of the historical endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarUnit {
    Minute,
    Hour,
    Day,
}

/// How an [`Interval`] is requested upstream: a native bar unit and a multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarSpec {
    pub unit: BarUnit,
    pub aggregate: u32,
}

impl Interval {
    pub const ALL: [Interval; 9] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::FourHours,
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
            Self::OneMonth => "1M",
        }
    }

    pub const fn bar_spec(self) -> BarSpec {
        let (unit, aggregate) = match self {
            Self::OneMinute => (BarUnit::Minute, 1),
            Self::FiveMinutes => (BarUnit::Minute, 5),
            Self::FifteenMinutes => (BarUnit::Minute, 15),
            Self::ThirtyMinutes => (BarUnit::Minute, 30),
            Self::OneHour => (BarUnit::Hour, 1),
            Self::FourHours => (BarUnit::Hour, 4),
            Self::OneDay => (BarUnit::Day, 1),
            Self::OneWeek => (BarUnit::Day, 7),
            Self::OneMonth => (BarUnit::Day, 30),
        };
        BarSpec { unit, aggregate }
    }

    /// Length of one bar.
    pub fn bar_duration(self) -> Duration {
        let spec = self.bar_spec();
        let aggregate = i64::from(spec.aggregate);
        match spec.unit {
            BarUnit::Minute => Duration::minutes(aggregate),
            BarUnit::Hour => Duration::hours(aggregate),
            BarUnit::Day => Duration::days(aggregate),
        }
    }

    /// Parse an interval label, falling back to daily bars for anything unrecognized.
    ///
    /// ```
    /// use aurora_market_data::Interval;
    ///
    /// assert_eq!(Interval::parse_or_default("15min"), Interval::FifteenMinutes);
    /// assert_eq!(Interval::parse_or_default("fortnightly"), Interval::OneDay);
    /// ```
    pub fn parse_or_default(label: &str) -> Self {
        label.parse().unwrap_or_else(|_| {
            debug!("Unrecognized interval '{}', using daily bars", label);
            Self::default()
        })
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from [`Interval::from_str`] for unrecognized labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized interval: {0}")]
pub struct ParseIntervalError(pub String);

impl FromStr for Interval {
    type Err = ParseIntervalError;

    /// Accepts compact labels (`1m`, `4h`, `1M`), spelled-out labels (`1 minute`,
    /// `4 hours`, `1 month`) and the long forms `5min`, `hourly`, `daily`, `weekly`,
    /// `monthly`. Whitespace is ignored. `m` is minutes and `M` is months; everything
    /// else is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let interval = match label.as_str() {
            "1m" => Self::OneMinute,
            "5m" => Self::FiveMinutes,
            "15m" => Self::FifteenMinutes,
            "30m" => Self::ThirtyMinutes,
            "1M" => Self::OneMonth,
            _ => match label.to_ascii_lowercase().as_str() {
                "1min" | "minute" | "1minute" => Self::OneMinute,
                "5min" | "5mins" | "5minutes" => Self::FiveMinutes,
                "15min" | "15mins" | "15minutes" => Self::FifteenMinutes,
                "30min" | "30mins" | "30minutes" => Self::ThirtyMinutes,
                "1h" | "60min" | "hourly" | "hour" | "1hour" => Self::OneHour,
                "4h" | "4hour" | "4hours" => Self::FourHours,
                "1d" | "daily" | "day" | "1day" => Self::OneDay,
                "1w" | "weekly" | "week" | "1week" => Self::OneWeek,
                "monthly" | "month" | "1month" | "1mo" => Self::OneMonth,
                _ => return Err(ParseIntervalError(s.to_string())),
            },
        };
        Ok(interval)
    }
}
