//! Stochastic oscillator (%K, %D).

use serde::{Deserialize, Serialize};

use crate::moving_average::sma;
use crate::{over_defined, IndicatorSeries};

/// Stochastic oscillator lookbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StochasticParams {
    /// High/low lookback for %K (default: 14).
    pub k_period: usize,
    /// SMA length applied to %K to produce %D (default: 3).
    pub d_period: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticOutput {
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

/// Compute %K and %D.
///
/// `%K[i] = 100·(close[i] − lowest low) / (highest high − lowest low)` over the trailing
/// `k_period` bars. A zero high−low range gives 0 rather than dividing by zero.
///
/// # Panics
///
/// Panics if `highs`, `lows` and `closes` differ in length.
pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    params: StochasticParams,
) -> StochasticOutput {
    assert!(
        highs.len() == closes.len() && lows.len() == closes.len(),
        "stochastic inputs must be aligned: highs={}, lows={}, closes={}",
        highs.len(),
        lows.len(),
        closes.len()
    );

    let period = params.k_period;
    let mut k = vec![None; closes.len()];
    if period > 0 && closes.len() >= period {
        for index in (period - 1)..closes.len() {
            let start = index + 1 - period;
            let highest = highs[start..=index]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            let lowest = lows[start..=index]
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);

            let range = highest - lowest;
            k[index] = Some(if range == 0.0 {
                0.0
            } else {
                100.0 * (closes[index] - lowest) / range
            });
        }
    }

    let d = over_defined(&k, |tail| sma(tail, params.d_period));
    StochasticOutput { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_uses_window_extremes() {
        let highs = [10.0, 12.0, 11.0];
        let lows = [8.0, 9.0, 10.0];
        let closes = [9.0, 11.0, 10.5];
        let output = stochastic(
            &highs,
            &lows,
            &closes,
            StochasticParams {
                k_period: 3,
                d_period: 1,
            },
        );

        assert_eq!(output.k[0], None);
        assert_eq!(output.k[1], None);
        // highest 12, lowest 8
        assert_eq!(output.k[2], Some(100.0 * (10.5 - 8.0) / 4.0));
        assert_eq!(output.d[2], output.k[2]);
    }

    #[test]
    fn test_flat_window_is_zero() {
        let flat = [5.0; 6];
        let output = stochastic(&flat, &flat, &flat, StochasticParams::default());
        assert!(output.k.iter().all(Option::is_none));

        let output = stochastic(
            &flat,
            &flat,
            &flat,
            StochasticParams {
                k_period: 3,
                d_period: 2,
            },
        );
        assert_eq!(output.k[2], Some(0.0));
        assert_eq!(output.k[5], Some(0.0));
        assert_eq!(output.d[2], None);
        assert_eq!(output.d[3], Some(0.0));
    }

    #[test]
    #[should_panic(expected = "stochastic inputs must be aligned")]
    fn test_mismatched_lengths_panic() {
        stochastic(&[1.0], &[1.0, 2.0], &[1.0], StochasticParams::default());
    }
}
