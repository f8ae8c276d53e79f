use chrono_tz::Tz;
use common::{
    accuracy_trend, price_axis_bounds, trailing_window, ChartSeries, DEFAULT_AXIS_PADDING,
    DEFAULT_AXIS_STEP,
};
use painter::{jitter, LiveChart, Pulse};
use rand::Rng;

/// Owned copy of the trailing window plus everything derived from it.
/// Animation frames read from here and never write back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartView {
    pub labels: Vec<f64>,
    pub prices: Vec<Option<f64>>,
    pub predictions: Vec<Option<f64>>,
    pub accuracy: Vec<Option<f64>>,
    pub high_band: Vec<Option<f64>>,
    pub low_band: Vec<Option<f64>>,
    pub price_bounds: Option<(f64, f64)>,
    /// Actual price at the "now" point, the base the pulse jitters around.
    pub last_actual_price: Option<f64>,
}

impl ChartView {
    pub fn from_series(series: &ChartSeries, k: usize) -> Self {
        let window = trailing_window(series, k);
        let band = |values: &Option<Vec<f64>>| -> Vec<Option<f64>> {
            match values {
                Some(values) => (window.start..window.start + window.len())
                    .map(|i| values.get(i).copied())
                    .collect(),
                None => Vec::new(),
            }
        };

        ChartView {
            labels: window.labels.to_vec(),
            prices: window.prices.to_vec(),
            predictions: window.predictions.to_vec(),
            accuracy: accuracy_trend(window.prices, window.predictions),
            high_band: band(&series.high_threshold),
            low_band: band(&series.low_threshold),
            price_bounds: price_axis_bounds(
                window.plotted_values(),
                DEFAULT_AXIS_PADDING,
                DEFAULT_AXIS_STEP,
            ),
            last_actual_price: window.current_index().and_then(|i| window.prices[i]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Chart for one animation frame. The current point is drawn at `now`
    /// with a jittered price; both only live in the returned builder.
    pub fn frame<R: Rng + ?Sized>(&self, timezone: Tz, now_ms: i64, rng: &mut R) -> LiveChart {
        let live_price = self.last_actual_price.map(|p| p + jitter(now_ms, rng));
        let live_time = self
            .last_actual_price
            .map(|_| now_ms as f64 / 1000.0);

        LiveChart::new(timezone)
            .with_series(
                self.labels.clone(),
                self.prices.clone(),
                self.predictions.clone(),
            )
            .with_accuracy(self.accuracy.clone())
            .with_bands(self.high_band.clone(), self.low_band.clone())
            .with_price_bounds(self.price_bounds)
            .with_pulse(Pulse::at(now_ms))
            .with_live_point(live_time, live_price)
    }
}
