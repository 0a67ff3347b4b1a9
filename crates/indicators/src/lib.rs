//! Aurora Indicators Crate
//!
//! Pure technical-indicator functions over ordered price series.
//!
//! # Overview
//!
//! Every indicator takes one or more input columns (closes, highs, lows, volumes)
//! aligned index-for-index with the candle timestamps and returns an output of the
//! same length. Positions without enough lookback are `None` ("undefined"), never zero.
//!
//! | Indicator | Function | Inputs |
//! |-----------|----------|--------|
//! | Simple moving average | [`sma`] | closes (or volumes) |
//! | Exponential moving average | [`ema`] | closes |
//! | Relative strength index | [`rsi`] | closes |
//! | MACD | [`macd`] | closes |
//! | Stochastic oscillator | [`stochastic`] | highs, lows, closes |
//!
//! The functions hold no state between calls: identical input always yields identical
//! output, so callers recompute on every refresh instead of caching results.
//!
//! # Dispatch
//!
//! [`compute_indicator`] selects an indicator from an [`IndicatorSpec`] and validates the
//! input columns, returning [`IndicatorError`] instead of panicking on mismatched lengths.
//!
//! ```
//! use aurora_indicators::{compute_indicator, IndicatorInput, IndicatorSpec};
//!
//! let closes = [1.0, 2.0, 3.0, 4.0];
//! let output = compute_indicator(&IndicatorSpec::Sma { period: 2 }, &IndicatorInput::new(&closes))
//!     .unwrap();
//! assert_eq!(output.primary()[1], Some(1.5));
//! ```

mod change;
mod compute;
mod macd;
mod moving_average;
mod rsi;
mod stochastic;

pub use change::{bar_changes, percent_change, Trend};
pub use compute::{
    compute_indicator, IndicatorError, IndicatorInput, IndicatorKind, IndicatorOutput,
    IndicatorSpec,
};
pub use macd::{macd, MacdOutput, MacdParams};
pub use moving_average::{ema, sma, EmaSeed};
pub use rsi::rsi;
pub use stochastic::{stochastic, StochasticOutput, StochasticParams};

/// One aligned value per input position; `None` where the lookback is insufficient.
pub type IndicatorSeries = Vec<Option<f64>>;

/// Apply `f` to the contiguous defined tail of `series` and realign the result.
///
/// Used for indicators of indicators (MACD signal line, stochastic %D), whose input
/// starts with a run of undefined positions.
pub(crate) fn over_defined<F>(series: &[Option<f64>], f: F) -> IndicatorSeries
where
    F: Fn(&[f64]) -> IndicatorSeries,
{
    let mut output = vec![None; series.len()];
    let Some(start) = series.iter().position(Option::is_some) else {
        return output;
    };

    let tail: Vec<f64> = series[start..].iter().map_while(|value| *value).collect();
    for (offset, value) in f(&tail).into_iter().enumerate() {
        output[start + offset] = value;
    }
    output
}
