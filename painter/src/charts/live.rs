use super::constants::*;
use super::labels::{draw_hallow_label, draw_labels, ChartLabel, Placement};
use super::png::encode_frame_png;
use super::pulse::Pulse;
use ab_glyph::FontArc;
use anyhow::anyhow;
use chrono_tz::Tz;
use common::intervals::datetime_from_secs;
use common::transforms::window::{price_axis_bounds, DEFAULT_AXIS_PADDING, DEFAULT_AXIS_STEP};
use image::RgbImage;
use plotters::prelude::*;
use std::error::Error;

const MARGIN_TOP: u32 = 30;
const MARGIN_BOTTOM: u32 = 30;
const MARGIN_LEFT: u32 = 70;
const MARGIN_RIGHT: u32 = 50;
// Maximum number of horizontal grid lines before the step is widened.
const MAX_GRID_LINES: f64 = 16.0;

/// Line chart of the trailing window: actual price, model price and the
/// accuracy trend on a fixed 0..100 scale.
///
/// `live_price`/`live_time` replace the drawn copy of the current point only.
/// The series handed to the builder are never modified.
#[derive(Clone, Debug)]
pub struct LiveChart {
    pub timezone: Tz,
    pub width: u32,
    pub height: u32,
    pub labels: Vec<f64>,
    pub prices: Vec<Option<f64>>,
    pub predictions: Vec<Option<f64>>,
    pub accuracy: Vec<Option<f64>>,
    pub high_band: Vec<Option<f64>>,
    pub low_band: Vec<Option<f64>>,
    pub price_bounds: Option<(f64, f64)>,
    pub pulse: Option<Pulse>,
    pub live_price: Option<f64>,
    pub live_time: Option<f64>,
    pub font_data: Option<Vec<u8>>,
}

impl LiveChart {
    pub fn new(timezone: Tz) -> Self {
        LiveChart {
            timezone,
            width: 768,
            height: 432,
            labels: Vec::new(),
            prices: Vec::new(),
            predictions: Vec::new(),
            accuracy: Vec::new(),
            high_band: Vec::new(),
            low_band: Vec::new(),
            price_bounds: None,
            pulse: None,
            live_price: None,
            live_time: None,
            font_data: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_series(
        mut self,
        labels: Vec<f64>,
        prices: Vec<Option<f64>>,
        predictions: Vec<Option<f64>>,
    ) -> Self {
        self.labels = labels;
        self.prices = prices;
        self.predictions = predictions;
        self
    }

    pub fn with_accuracy(mut self, accuracy: Vec<Option<f64>>) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_bands(mut self, high: Vec<Option<f64>>, low: Vec<Option<f64>>) -> Self {
        self.high_band = high;
        self.low_band = low;
        self
    }

    pub fn with_price_bounds(mut self, bounds: Option<(f64, f64)>) -> Self {
        self.price_bounds = bounds;
        self
    }

    pub fn with_pulse(mut self, pulse: Pulse) -> Self {
        self.pulse = Some(pulse);
        self
    }

    pub fn with_live_point(mut self, time: Option<f64>, price: Option<f64>) -> Self {
        self.live_time = time;
        self.live_price = price;
        self
    }

    pub fn with_font_data(mut self, font_data: Vec<u8>) -> Self {
        self.font_data = Some(font_data);
        self
    }

    fn len(&self) -> usize {
        self.labels
            .len()
            .min(self.prices.len())
            .min(self.predictions.len())
    }

    fn current_index(&self) -> Option<usize> {
        self.len().checked_sub(2)
    }

    fn forecast_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    fn drawn_labels(&self) -> Vec<f64> {
        let current = self.current_index();
        (0..self.len())
            .map(|i| match (current, self.live_time) {
                (Some(c), Some(t)) if c == i => t,
                _ => self.labels[i],
            })
            .collect()
    }

    fn drawn_prices(&self) -> Vec<Option<f64>> {
        let current = self.current_index();
        (0..self.len())
            .map(|i| match (current, self.live_price) {
                (Some(c), Some(p)) if c == i => Some(p),
                _ => self.prices[i],
            })
            .collect()
    }

    /// PNG bytes of the current frame.
    pub fn build(&self) -> anyhow::Result<Vec<u8>> {
        let img = self.render()?;
        encode_frame_png(&img)
    }

    pub fn render(&self) -> anyhow::Result<RgbImage> {
        let font = match &self.font_data {
            Some(data) => Some(FontArc::try_from_vec(data.clone())?),
            None => None,
        };

        let (mut img, labels) = self.plot().map_err(|e| anyhow!("Failed to plot chart: {e}"))?;

        if let Some(font) = font {
            draw_labels(&mut img, &font, &labels)?;
            if self.pulse.is_some() {
                draw_hallow_label(
                    &mut img,
                    &font,
                    "LIVE",
                    MARGIN_LEFT as f32 + 8.0,
                    6.0,
                    LABEL_SCALE,
                    ACTUAL_LABEL,
                    ACTUAL_LABEL,
                )?;
            }
        }

        Ok(img)
    }

    fn plot(&self) -> Result<(RgbImage, Vec<ChartLabel>), Box<dyn Error>> {
        let len = self.len();
        if len == 0 {
            return Err("Chart series is empty".into());
        }

        let labels = self.drawn_labels();
        let prices = self.drawn_prices();
        let predictions = &self.predictions[..len];

        let (mut x0, mut x1) = labels
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        if !x0.is_finite() || !x1.is_finite() {
            return Err("Chart labels are not finite".into());
        }
        if x1 - x0 < 1.0 {
            x0 -= 1800.0;
            x1 += 1800.0;
        }

        let (y0, y1) = match self.price_bounds {
            Some(bounds) => bounds,
            None => price_axis_bounds(
                prices.iter().chain(predictions.iter()).filter_map(|v| *v),
                DEFAULT_AXIS_PADDING,
                DEFAULT_AXIS_STEP,
            )
            .ok_or("No finite price to plot")?,
        };
        if y1 <= y0 {
            return Err(format!("Empty price range {y0}..{y1}").into());
        }

        let actual_points: Vec<(f64, f64)> = points(&labels, &prices);
        let model_points: Vec<(f64, f64)> = points(&labels, predictions);

        let (width, height) = (self.width, self.height);
        let mut buffer = vec![0; (width * height * 3) as usize];
        let mut chart_labels = Vec::new();

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&B_BLACK)?;

            let mut price_chart = ChartBuilder::on(&root)
                .margin_top(MARGIN_TOP)
                .margin_bottom(MARGIN_BOTTOM)
                .margin_left(MARGIN_LEFT)
                .margin_right(MARGIN_RIGHT)
                .build_cartesian_2d(x0..x1, y0..y1)?;
            let mut accuracy_chart = ChartBuilder::on(&root)
                .margin_top(MARGIN_TOP)
                .margin_bottom(MARGIN_BOTTOM)
                .margin_left(MARGIN_LEFT)
                .margin_right(MARGIN_RIGHT)
                .build_cartesian_2d(x0..x1, 0f64..100f64)?;

            // Grid
            for y in grid_levels(y0, y1) {
                price_chart.draw_series(LineSeries::new(
                    vec![(x0, y), (x1, y)],
                    B_GRID.stroke_width(1),
                ))?;
                chart_labels.push(axis_label(
                    price_chart.backend_coord(&(x0, y)),
                    format!("${y}"),
                    AXIS_COLOR,
                    Placement::LeftOf,
                ));
            }
            for pct in (0..=100).step_by(20) {
                let coord = accuracy_chart.backend_coord(&(x1, pct as f64));
                chart_labels.push(axis_label(
                    coord,
                    format!("{pct}%"),
                    AXIS_ACCURACY_COLOR,
                    Placement::RightOf,
                ));
            }
            for &x in labels.iter() {
                if let Some(dt) = datetime_from_secs(x, &self.timezone) {
                    chart_labels.push(axis_label(
                        price_chart.backend_coord(&(x, y0)),
                        dt.format("%-I %p").to_string(),
                        AXIS_COLOR,
                        Placement::Below,
                    ));
                }
            }

            // Threshold band
            let high_points = points(&labels, &self.high_band);
            let low_points = points(&labels, &self.low_band);
            if !high_points.is_empty() {
                price_chart.draw_series(DashedLineSeries::new(
                    high_points,
                    6,
                    6,
                    HIGH_BAND.stroke_width(1),
                ))?;
            }
            if !low_points.is_empty() {
                price_chart.draw_series(DashedLineSeries::new(
                    low_points,
                    6,
                    6,
                    LOW_BAND.stroke_width(1),
                ))?;
            }

            // Accuracy trend, broken wherever a point is undefined
            for segment in segments(&labels, &self.accuracy) {
                accuracy_chart.draw_series(AreaSeries::new(
                    segment.clone(),
                    0.0,
                    ACCURACY.mix(0.05).filled(),
                ))?;
                accuracy_chart
                    .draw_series(LineSeries::new(segment, ACCURACY.stroke_width(2)))?;
            }
            for (&x, value) in labels.iter().zip(self.accuracy.iter()) {
                if let Some(value) = value.filter(|v| v.is_finite()) {
                    accuracy_chart.draw_series(std::iter::once(Circle::new(
                        (x, value),
                        POINT_RADIUS,
                        ACCURACY.filled(),
                    )))?;
                    chart_labels.push(data_label(
                        accuracy_chart.backend_coord(&(x, value)),
                        format!("{value:.1}%"),
                        ACCURACY_LABEL,
                        Placement::Below,
                    ));
                }
            }

            // Actual price
            price_chart.draw_series(AreaSeries::new(
                actual_points.clone(),
                y0,
                ACTUAL.mix(0.1).filled(),
            ))?;
            price_chart.draw_series(LineSeries::new(
                actual_points.clone(),
                ACTUAL.stroke_width(3),
            ))?;
            price_chart.draw_series(
                actual_points
                    .iter()
                    .map(|p| Circle::new(*p, POINT_RADIUS, POINT_FILL.filled())),
            )?;

            // Model price
            price_chart.draw_series(DashedLineSeries::new(
                model_points.clone(),
                5,
                5,
                MODEL.stroke_width(2),
            ))?;
            price_chart.draw_series(
                model_points
                    .iter()
                    .map(|p| Circle::new(*p, POINT_RADIUS, MODEL.filled())),
            )?;

            // Live markers: actual on the current point, model on the forecast point
            let current = self
                .current_index()
                .and_then(|i| prices[i].map(|p| (labels[i], p)));
            let forecast = self
                .forecast_index()
                .and_then(|i| predictions[i].map(|p| (labels[i], p)));

            if let Some(pulse) = self.pulse {
                let radius = pulse.radius.round() as i32;
                let halo = (pulse.radius + pulse.glow / 2.0).round() as i32;
                for (point, color) in [(current, ACTUAL), (forecast, MODEL)] {
                    let Some(point) = point else { continue };
                    price_chart.draw_series(std::iter::once(Circle::new(
                        point,
                        halo,
                        ShapeStyle {
                            color: color.mix(pulse.alpha * 0.3),
                            filled: false,
                            stroke_width: pulse.glow.round() as u32,
                        },
                    )))?;
                    price_chart.draw_series(std::iter::once(Circle::new(
                        point,
                        radius,
                        color.mix(pulse.alpha).filled(),
                    )))?;
                }
            }

            if let Some(point) = current {
                chart_labels.push(data_label(
                    price_chart.backend_coord(&point),
                    format!("${:.1}", point.1),
                    ACTUAL_LABEL,
                    Placement::Above,
                ));
            }
            if let Some(point) = forecast {
                chart_labels.push(data_label(
                    price_chart.backend_coord(&point),
                    format!("${:.1}", point.1),
                    MODEL_LABEL,
                    Placement::Above,
                ));
            }

            root.present()?;
        }

        let img = RgbImage::from_raw(width, height, buffer).ok_or("Chart buffer size mismatch")?;
        Ok((img, chart_labels))
    }
}

/// Horizontal grid values between `y0` and `y1`, at most `MAX_GRID_LINES + 1`
/// of them even when the step vanishes against the magnitude of `y`.
fn grid_levels(y0: f64, y1: f64) -> Vec<f64> {
    let mut step = DEFAULT_AXIS_STEP;
    if (y1 - y0) / step > MAX_GRID_LINES {
        step = ((y1 - y0) / MAX_GRID_LINES / DEFAULT_AXIS_STEP).ceil() * DEFAULT_AXIS_STEP;
    }
    let first = (y0 / step).ceil() * step;

    (0..=MAX_GRID_LINES as usize + 1)
        .map(|i| first + i as f64 * step)
        .take_while(|y| *y <= y1)
        .collect()
}

fn points(labels: &[f64], values: &[Option<f64>]) -> Vec<(f64, f64)> {
    labels
        .iter()
        .zip(values.iter())
        .filter_map(|(x, v)| v.filter(|v| v.is_finite()).map(|v| (*x, v)))
        .collect()
}

fn segments(labels: &[f64], values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut all = Vec::new();
    let mut current = Vec::new();
    for (x, value) in labels.iter().zip(values.iter()) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => current.push((*x, v)),
            None => {
                if !current.is_empty() {
                    all.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        all.push(current);
    }
    all
}

fn axis_label(anchor: (i32, i32), text: String, color: Rgb<u8>, placement: Placement) -> ChartLabel {
    ChartLabel {
        anchor,
        text,
        color,
        placement,
        scale: AXIS_SCALE,
        background: None,
    }
}

fn data_label(anchor: (i32, i32), text: String, color: Rgb<u8>, placement: Placement) -> ChartLabel {
    ChartLabel {
        anchor,
        text,
        color,
        placement,
        scale: LABEL_SCALE,
        background: Some(LABEL_BG_COLOR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Bangkok;
    use image::Rgb;

    const HOUR: f64 = 3600.0;
    const T0: f64 = 1_772_600_400.0;

    fn sample_chart() -> LiveChart {
        let labels: Vec<f64> = (0..6).map(|i| T0 + i as f64 * HOUR).collect();
        let prices = vec![
            Some(2030.0),
            Some(2032.5),
            None,
            Some(2036.0),
            Some(2034.5),
            None,
        ];
        let predictions = vec![
            Some(2028.0),
            Some(2031.0),
            Some(2033.0),
            Some(2035.0),
            Some(2036.0),
            Some(2040.25),
        ];
        let accuracy = common::accuracy_trend(&prices, &predictions);

        LiveChart::new(Bangkok)
            .with_size(320, 200)
            .with_series(labels, prices, predictions)
            .with_accuracy(accuracy)
    }

    #[test]
    fn test_grid_levels() {
        assert_eq!(grid_levels(1850.0, 2000.0), vec![1850.0, 1900.0, 1950.0, 2000.0]);
        assert_eq!(grid_levels(1860.0, 1890.0), Vec::<f64>::new());

        // Wide ranges widen the step instead of adding lines.
        let levels = grid_levels(0.0, 10_000.0);
        assert!(levels.len() <= MAX_GRID_LINES as usize + 1);
        assert_eq!(levels.first(), Some(&0.0));
    }

    #[test]
    fn test_grid_levels_huge_magnitude() {
        let levels = grid_levels(1e18, 1e18 + 400.0);
        assert!(levels.len() <= MAX_GRID_LINES as usize + 2);
        assert!(levels.iter().all(|y| *y <= 1e18 + 400.0));
    }

    #[test]
    fn test_segments_break_on_gaps() {
        let labels = [1.0, 2.0, 3.0, 4.0, 5.0];
        let values = [Some(1.0), Some(2.0), None, Some(f64::NAN), Some(5.0)];

        let all = segments(&labels, &values);

        assert_eq!(all, vec![vec![(1.0, 1.0), (2.0, 2.0)], vec![(5.0, 5.0)]]);
    }

    #[test]
    fn test_render_frame() {
        let chart = sample_chart().with_pulse(Pulse::at(750));
        let img = chart.render().unwrap();

        assert_eq!(img.dimensions(), (320, 200));
        assert_eq!(img.get_pixel(0, 0), &Rgb([B_BLACK.0, B_BLACK.1, B_BLACK.2]));
        assert!(img
            .pixels()
            .any(|p| *p == Rgb([ACTUAL.0, ACTUAL.1, ACTUAL.2])));
    }

    #[test]
    fn test_build_png() {
        let png = sample_chart()
            .with_bands(vec![Some(2090.0); 6], vec![Some(1970.0); 6])
            .build()
            .unwrap();

        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (320, 200));
    }

    #[test]
    fn test_live_point_only_changes_drawn_copy() {
        let chart = sample_chart().with_live_point(Some(T0 + 4.5 * HOUR), Some(2034.6));

        assert_eq!(chart.drawn_prices()[4], Some(2034.6));
        assert_eq!(chart.drawn_labels()[4], T0 + 4.5 * HOUR);
        chart.render().unwrap();

        assert_eq!(chart.prices[4], Some(2034.5));
        assert_eq!(chart.labels[4], T0 + 4.0 * HOUR);
    }

    #[test]
    fn test_render_rejects_empty_series() {
        let error = LiveChart::new(Bangkok).render().unwrap_err();
        assert!(error.to_string().contains("empty"));
    }

    #[test]
    fn test_render_single_point() {
        let chart = LiveChart::new(Bangkok)
            .with_size(200, 120)
            .with_series(vec![T0], vec![Some(2000.0)], vec![None]);

        assert!(chart.render().is_ok());
    }

    #[test]
    fn test_bad_font_is_an_error() {
        let chart = sample_chart().with_font_data(vec![0, 1, 2, 3]);
        assert!(chart.render().is_err());
    }
}
