//! Price change statistics over a series.

use serde::{Deserialize, Serialize};

/// Direction of a percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            Self::Up
        } else if change < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

/// Percent change from the first to the last close.
///
/// `None` with fewer than two closes or a non-positive starting price.
pub fn percent_change(closes: &[f64]) -> Option<f64> {
    let (first, last) = match closes {
        [first, .., last] => (*first, *last),
        _ => return None,
    };
    if first <= 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

/// Per-bar percent change from open to close; 0 where the open is not positive.
pub fn bar_changes(opens: &[f64], closes: &[f64]) -> Vec<f64> {
    opens
        .iter()
        .zip(closes)
        .map(|(open, close)| {
            if *open > 0.0 {
                (close - open) / open * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_first_to_last() {
        assert_eq!(percent_change(&[100.0, 90.0, 110.0]), Some(10.0));
        assert_eq!(percent_change(&[100.0]), None);
        assert_eq!(percent_change(&[]), None);
        assert_eq!(percent_change(&[0.0, 1.0]), None);
    }

    #[test]
    fn test_bar_changes_guard_zero_open() {
        assert_eq!(bar_changes(&[100.0, 0.0], &[101.0, 5.0]), vec![1.0, 0.0]);
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(Trend::of(0.5), Trend::Up);
        assert_eq!(Trend::of(-0.5), Trend::Down);
        assert_eq!(Trend::of(0.0), Trend::Flat);
    }
}
