use crate::ChartSeries;

/// Five hours of history plus the forecast point.
pub const DEFAULT_CHART_WINDOW: usize = 6;
pub const DEFAULT_AXIS_PADDING: f64 = 150.0;
pub const DEFAULT_AXIS_STEP: f64 = 50.0;

/// Borrowed tail of a [`ChartSeries`]. All three slices start at the same
/// index and have the same length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartWindow<'a> {
    pub start: usize,
    pub labels: &'a [f64],
    pub prices: &'a [Option<f64>],
    pub predictions: &'a [Option<f64>],
}

impl<'a> ChartWindow<'a> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The live "now" point, second to last.
    pub fn current_index(&self) -> Option<usize> {
        self.len().checked_sub(2)
    }

    /// The forecast point, last.
    pub fn forecast_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// Every finite actual and predicted value in the window.
    pub fn plotted_values(&self) -> impl Iterator<Item = f64> + 'a {
        self.prices
            .iter()
            .chain(self.predictions.iter())
            .filter_map(|v| *v)
            .filter(|v| v.is_finite())
    }
}

pub fn trailing_window(series: &ChartSeries, k: usize) -> ChartWindow<'_> {
    let len = series.len();
    let start = len.saturating_sub(k);

    ChartWindow {
        start,
        labels: &series.labels[start..len],
        prices: &series.prices[start..len],
        predictions: &series.prediction_point[start..len],
    }
}

/// Y-axis range covering every value, widened by `padding` on both sides and
/// snapped outwards to a multiple of `step`. A zero `step` skips the snapping.
pub fn price_axis_bounds<I>(values: I, padding: f64, step: f64) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((min, max)) => Some((min.min(v), max.max(v))),
            None => Some((v, v)),
        })?;

    let (low, high) = (min - padding, max + padding);
    if step > 0.0 {
        Some(((low / step).floor() * step, (high / step).ceil() * step))
    } else {
        Some((low, high))
    }
}
