//! Simple and exponential moving averages.

use serde::{Deserialize, Serialize};

use crate::IndicatorSeries;

/// How the first EMA value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmaSeed {
    /// Seed from the mean of the first `period` values; defined from index `period - 1`.
    #[default]
    Sma,
    /// Seed from the first value; defined from index 0.
    FirstValue,
}

/// Simple moving average over a trailing window of `period` values.
///
/// `output[i]` is the mean of `values[i + 1 - period ..= i]` once `i >= period - 1`.
/// Each window is summed from the input slice, so no error accumulates across positions.
/// A zero period yields an all-undefined series.
pub fn sma(values: &[f64], period: usize) -> IndicatorSeries {
    let mut output = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return output;
    }

    for (index, window) in values.windows(period).enumerate() {
        output[index + period - 1] = Some(window.iter().sum::<f64>() / period as f64);
    }
    output
}

/// Exponential moving average with smoothing factor `2 / (period + 1)`.
///
/// `EMA[i] = α·value[i] + (1 − α)·EMA[i − 1]`; positions before the seed are undefined.
pub fn ema(values: &[f64], period: usize, seed: EmaSeed) -> IndicatorSeries {
    let mut output = vec![None; values.len()];
    if period == 0 || values.is_empty() {
        return output;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let (start, mut current) = match seed {
        EmaSeed::Sma => {
            if values.len() < period {
                return output;
            }
            (period - 1, values[..period].iter().sum::<f64>() / period as f64)
        }
        EmaSeed::FirstValue => (0, values[0]),
    };

    output[start] = Some(current);
    for (index, value) in values.iter().enumerate().skip(start + 1) {
        current = alpha * value + (1.0 - alpha) * current;
        output[index] = Some(current);
    }
    output
}
