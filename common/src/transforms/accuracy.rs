use strum::{AsRefStr, Display};

// Tier boundaries for the history table. High is strictly above, low strictly below.
pub const HIGH_ACCURACY_ABOVE: f64 = 99.5;
pub const LOW_ACCURACY_BELOW: f64 = 98.0;

/// How close a prediction landed, as a percentage of the actual price.
///
/// `max(0, 100 - |actual - predicted| / actual * 100)`, undefined for a zero
/// or non-finite actual price.
pub fn accuracy_pct(actual: f64, predicted: f64) -> Option<f64> {
    if actual == 0.0 || !actual.is_finite() || !predicted.is_finite() {
        return None;
    }
    let diff = (actual - predicted).abs();
    Some((100.0 - diff / actual * 100.0).max(0.0))
}

/// Per-point accuracy for two aligned series. Missing inputs stay `None` so
/// the plotted line breaks instead of interpolating.
pub fn accuracy_trend(prices: &[Option<f64>], predictions: &[Option<f64>]) -> Vec<Option<f64>> {
    prices
        .iter()
        .zip(predictions.iter())
        .map(|(actual, predicted)| match (actual, predicted) {
            (Some(actual), Some(predicted)) => accuracy_pct(*actual, *predicted),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum AccuracyTier {
    #[strum(serialize = "acc-high")]
    High,
    #[strum(serialize = "acc-mid")]
    Mid,
    #[strum(serialize = "acc-low")]
    Low,
}

impl AccuracyTier {
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy > HIGH_ACCURACY_ABOVE {
            AccuracyTier::High
        } else if accuracy < LOW_ACCURACY_BELOW {
            AccuracyTier::Low
        } else {
            AccuracyTier::Mid
        }
    }
}
