//! Indicator selection and input validation.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::macd::{macd, MacdOutput, MacdParams};
use crate::moving_average::{ema, sma, EmaSeed};
use crate::rsi::rsi;
use crate::stochastic::{stochastic, StochasticOutput, StochasticParams};
use crate::IndicatorSeries;

/// Indicator family, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Stochastic,
    VolumeSma,
}

impl IndicatorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sma => "SMA",
            Self::Ema => "EMA",
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::Stochastic => "STOCH",
            Self::VolumeSma => "VOL_SMA",
        }
    }
}

impl Display for IndicatorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An indicator together with its parameters.
///
/// Serialized with a `kind` tag, e.g. `{"kind": "rsi", "period": 14}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorSpec {
    Sma {
        period: usize,
    },
    Ema {
        period: usize,
        #[serde(default)]
        seed: EmaSeed,
    },
    Rsi {
        period: usize,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
        #[serde(default)]
        seed: EmaSeed,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
    VolumeSma {
        period: usize,
    },
}

impl IndicatorSpec {
    /// MACD(12, 26, 9) seeded from SMA.
    pub fn default_macd() -> Self {
        let params = MacdParams::default();
        Self::Macd {
            fast: params.fast,
            slow: params.slow,
            signal: params.signal,
            seed: EmaSeed::Sma,
        }
    }

    /// Stochastic(14, 3).
    pub fn default_stochastic() -> Self {
        let params = StochasticParams::default();
        Self::Stochastic {
            k_period: params.k_period,
            d_period: params.d_period,
        }
    }

    pub fn kind(&self) -> IndicatorKind {
        match self {
            Self::Sma { .. } => IndicatorKind::Sma,
            Self::Ema { .. } => IndicatorKind::Ema,
            Self::Rsi { .. } => IndicatorKind::Rsi,
            Self::Macd { .. } => IndicatorKind::Macd,
            Self::Stochastic { .. } => IndicatorKind::Stochastic,
            Self::VolumeSma { .. } => IndicatorKind::VolumeSma,
        }
    }

    /// Chart legend label, e.g. `SMA(14)` or `MACD(12,26,9)`.
    pub fn label(&self) -> String {
        match self {
            Self::Sma { period }
            | Self::Ema { period, .. }
            | Self::Rsi { period }
            | Self::VolumeSma { period } => format!("{}({})", self.kind(), period),
            Self::Macd {
                fast, slow, signal, ..
            } => format!("MACD({},{},{})", fast, slow, signal),
            Self::Stochastic { k_period, d_period } => {
                format!("STOCH({},{})", k_period, d_period)
            }
        }
    }
}

/// Input columns for [`compute_indicator`].
///
/// `closes` is always required; `highs`/`lows` are required by the stochastic
/// oscillator and `volumes` by the volume average.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorInput<'a> {
    pub closes: &'a [f64],
    pub highs: Option<&'a [f64]>,
    pub lows: Option<&'a [f64]>,
    pub volumes: Option<&'a [f64]>,
}

impl<'a> IndicatorInput<'a> {
    pub fn new(closes: &'a [f64]) -> Self {
        Self {
            closes,
            highs: None,
            lows: None,
            volumes: None,
        }
    }

    pub fn with_high_low(mut self, highs: &'a [f64], lows: &'a [f64]) -> Self {
        self.highs = Some(highs);
        self.lows = Some(lows);
        self
    }

    pub fn with_volumes(mut self, volumes: &'a [f64]) -> Self {
        self.volumes = Some(volumes);
        self
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        let expected = self.closes.len();
        let columns = [
            ("highs", self.highs),
            ("lows", self.lows),
            ("volumes", self.volumes),
        ];
        for (column, values) in columns {
            if let Some(values) = values {
                if values.len() != expected {
                    return Err(IndicatorError::LengthMismatch {
                        column,
                        expected,
                        actual: values.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Indicator result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorOutput {
    /// Single line (SMA, EMA, RSI, volume SMA).
    Line { values: IndicatorSeries },
    Macd(MacdOutput),
    Stochastic(StochasticOutput),
}

impl IndicatorOutput {
    /// The main line: the values, the MACD line, or %K.
    pub fn primary(&self) -> &IndicatorSeries {
        match self {
            Self::Line { values } => values,
            Self::Macd(output) => &output.macd,
            Self::Stochastic(output) => &output.k,
        }
    }

    pub fn len(&self) -> usize {
        self.primary().len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary().is_empty()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    /// An input column does not line up with the closes.
    #[error("Input column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The indicator needs a column that was not supplied.
    #[error("{indicator} requires the '{column}' column")]
    MissingInput {
        indicator: IndicatorKind,
        column: &'static str,
    },
}

/// Compute the indicator described by `spec` over `input`.
///
/// # Errors
///
/// Returns [`IndicatorError`] when a supplied column is misaligned with the closes or a
/// required column is missing.
pub fn compute_indicator(
    spec: &IndicatorSpec,
    input: &IndicatorInput<'_>,
) -> Result<IndicatorOutput, IndicatorError> {
    input.validate()?;

    let output = match *spec {
        IndicatorSpec::Sma { period } => IndicatorOutput::Line {
            values: sma(input.closes, period),
        },
        IndicatorSpec::Ema { period, seed } => IndicatorOutput::Line {
            values: ema(input.closes, period, seed),
        },
        IndicatorSpec::Rsi { period } => IndicatorOutput::Line {
            values: rsi(input.closes, period),
        },
        IndicatorSpec::Macd {
            fast,
            slow,
            signal,
            seed,
        } => IndicatorOutput::Macd(macd(
            input.closes,
            MacdParams { fast, slow, signal },
            seed,
        )),
        IndicatorSpec::Stochastic { k_period, d_period } => {
            let (highs, lows) = match (input.highs, input.lows) {
                (Some(highs), Some(lows)) => (highs, lows),
                (None, _) => return Err(missing(spec, "highs")),
                (_, None) => return Err(missing(spec, "lows")),
            };
            IndicatorOutput::Stochastic(stochastic(
                highs,
                lows,
                input.closes,
                StochasticParams { k_period, d_period },
            ))
        }
        IndicatorSpec::VolumeSma { period } => {
            let volumes = input.volumes.ok_or_else(|| missing(spec, "volumes"))?;
            IndicatorOutput::Line {
                values: sma(volumes, period),
            }
        }
    };
    Ok(output)
}

fn missing(spec: &IndicatorSpec, column: &'static str) -> IndicatorError {
    IndicatorError::MissingInput {
        indicator: spec.kind(),
        column,
    }
}
