//! Relative strength index with Wilder smoothing.

use crate::IndicatorSeries;

/// RSI over `period` bars.
///
/// Average gain/loss are seeded with the simple mean of the first `period` changes and
/// then smoothed as `avg = (avg·(period − 1) + current) / period`. The first defined value
/// sits at index `period`; an average loss of exactly zero yields 100.
pub fn rsi(closes: &[f64], period: usize) -> IndicatorSeries {
    let mut output = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return output;
    }

    let changes: Vec<f64> = closes.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let weight = period as f64;

    let mut avg_gain = changes[..period].iter().map(|c| gain(*c)).sum::<f64>() / weight;
    let mut avg_loss = changes[..period].iter().map(|c| loss(*c)).sum::<f64>() / weight;
    output[period] = Some(rsi_value(avg_gain, avg_loss));

    for (index, change) in changes.iter().enumerate().skip(period) {
        avg_gain = (avg_gain * (weight - 1.0) + gain(*change)) / weight;
        avg_loss = (avg_loss * (weight - 1.0) + loss(*change)) / weight;
        // changes[i] is the move into closes[i + 1]
        output[index + 1] = Some(rsi_value(avg_gain, avg_loss));
    }
    output
}

fn gain(change: f64) -> f64 {
    if change > 0.0 {
        change
    } else {
        0.0
    }
}

fn loss(change: f64) -> f64 {
    if change < 0.0 {
        -change
    } else {
        0.0
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
