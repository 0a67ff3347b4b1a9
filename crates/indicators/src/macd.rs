//! MACD (Moving Average Convergence Divergence).

use serde::{Deserialize, Serialize};

use crate::moving_average::{ema, EmaSeed};
use crate::{over_defined, IndicatorSeries};

/// MACD periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacdParams {
    /// Fast EMA period (default: 12).
    pub fast: usize,
    /// Slow EMA period (default: 26).
    pub slow: usize,
    /// Signal line EMA period (default: 9).
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// MACD output, each series aligned with the input closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// Fast EMA − slow EMA.
    pub macd: IndicatorSeries,
    /// EMA of the MACD line.
    pub signal: IndicatorSeries,
    /// MACD − signal.
    pub histogram: IndicatorSeries,
}

/// Compute MACD, signal and histogram lines.
///
/// The MACD line is undefined wherever either EMA is undefined; the signal line is an EMA
/// over the defined part of the MACD line, seeded the same way as the price EMAs.
pub fn macd(closes: &[f64], params: MacdParams, seed: EmaSeed) -> MacdOutput {
    let fast = ema(closes, params.fast, seed);
    let slow = ema(closes, params.slow, seed);

    let macd_line: IndicatorSeries = fast
        .iter()
        .zip(&slow)
        .map(|(fast, slow)| match (fast, slow) {
            (Some(fast), Some(slow)) => Some(fast - slow),
            _ => None,
        })
        .collect();

    let signal = over_defined(&macd_line, |tail| ema(tail, params.signal, seed));

    let histogram = macd_line
        .iter()
        .zip(&signal)
        .map(|(line, signal)| match (line, signal) {
            (Some(line), Some(signal)) => Some(line - signal),
            _ => None,
        })
        .collect();

    MacdOutput {
        macd: macd_line,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_positions() {
        let closes: Vec<f64> = (1..=50).map(|i| 100.0 + i as f64).collect();
        let output = macd(&closes, MacdParams::default(), EmaSeed::Sma);

        assert_eq!(output.macd.len(), 50);
        assert!(output.macd[24].is_none());
        assert!(output.macd[25].is_some());
        // signal needs 9 MACD values: 25 + 9 - 1
        assert!(output.signal[32].is_none());
        assert!(output.signal[33].is_some());
        assert!(output.histogram[32].is_none());
        assert!(output.histogram[33].is_some());
    }

    #[test]
    fn test_rising_series_has_positive_macd() {
        let closes: Vec<f64> = (1..=60).map(|i| 100.0 + 2.0 * i as f64).collect();
        let output = macd(&closes, MacdParams::default(), EmaSeed::Sma);
        assert!(output.macd[59].unwrap() > 0.0);
    }

    #[test]
    fn test_short_series_is_undefined() {
        let closes = vec![1.0; 10];
        let output = macd(&closes, MacdParams::default(), EmaSeed::Sma);
        assert!(output.macd.iter().all(Option::is_none));
        assert!(output.signal.iter().all(Option::is_none));
    }

    #[test]
    fn test_params_default() {
        let params = MacdParams::default();
        assert_eq!((params.fast, params.slow, params.signal), (12, 26, 9));
    }
}
