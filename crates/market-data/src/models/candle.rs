use aurora_indicators::IndicatorInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interval::Interval;
use super::timeframe::Timeframe;

/// One OHLCV bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time (UTC).
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Volume in units of the base asset.
    pub volume: f64,
}

/// Ordered bars for one (instrument, interval).
///
/// Candles are ascending by timestamp with no duplicate timestamps; [`Series::new`]
/// enforces this.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub symbol: String,
    pub interval: Interval,
    candles: Vec<Candle>,
}

impl Series {
    /// Build a series, sorting by timestamp. Of several bars sharing a timestamp the one
    /// that came last in `candles` is kept.
    pub fn new(symbol: impl Into<String>, interval: Interval, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        candles.reverse();
        candles.dedup_by_key(|c| c.timestamp);
        candles.reverse();

        Self {
            symbol: symbol.into(),
            interval,
            candles,
        }
    }

    pub fn empty(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            candles: Vec::new(),
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Bars with `timestamp >= last timestamp - window`.
    ///
    /// The boundary comes from the series itself, not the wall clock, so the same cached
    /// series always yields the same window. [`Timeframe::All`] keeps everything.
    pub fn window(&self, timeframe: Timeframe) -> Series {
        let (Some(window), Some(last)) = (timeframe.window(), self.candles.last()) else {
            return self.clone();
        };

        let Some(start) = last.timestamp.checked_sub_signed(window) else {
            return self.clone();
        };
        let first_kept = self.candles.partition_point(|c| c.timestamp < start);

        Series {
            symbol: self.symbol.clone(),
            interval: self.interval,
            candles: self.candles[first_kept..].to_vec(),
        }
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.candles.iter().map(|c| c.timestamp).collect()
    }

    /// Column-wise copy of the bars, for the indicator functions.
    pub fn columns(&self) -> SeriesColumns {
        let mut columns = SeriesColumns::with_capacity(self.candles.len());
        for candle in &self.candles {
            columns.opens.push(candle.open);
            columns.highs.push(candle.high);
            columns.lows.push(candle.low);
            columns.closes.push(candle.close);
            columns.volumes.push(candle.volume);
        }
        columns
    }
}

/// Aligned OHLCV columns of a [`Series`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesColumns {
    pub opens: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl SeriesColumns {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            opens: Vec::with_capacity(capacity),
            highs: Vec::with_capacity(capacity),
            lows: Vec::with_capacity(capacity),
            closes: Vec::with_capacity(capacity),
            volumes: Vec::with_capacity(capacity),
        }
    }

    /// All columns wired into an indicator input.
    pub fn indicator_input(&self) -> IndicatorInput<'_> {
        IndicatorInput::new(&self.closes)
            .with_high_low(&self.highs, &self.lows)
            .with_volumes(&self.volumes)
    }
}
