use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use common::intervals::{datetime_from_secs, is_on_the_hour};
use common::transforms::numbers::format_usd;
use common::{accuracy_pct, AccuracyTier, ChartSeries};

/// Which settled points make it into the history table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPolicy {
    /// Minimum age before a point is shown, so the live point stays off the table.
    pub guard: Duration,
    pub limit: usize,
    pub hourly_only: bool,
    pub timezone: Tz,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        HistoryPolicy {
            guard: Duration::from_secs(60),
            limit: 6,
            hourly_only: true,
            timezone: chrono_tz::Asia::Bangkok,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub timestamp: f64,
    pub actual: f64,
    pub predicted: f64,
    pub accuracy: f64,
    pub tier: AccuracyTier,
}

impl HistoryRow {
    /// `[time, actual, predicted, accuracy]` cells as shown in the table.
    pub fn cells(&self, tz: &Tz) -> [String; 4] {
        let time = datetime_from_secs(self.timestamp, tz)
            .map(|dt| dt.format("%-I:%M %p").to_string())
            .unwrap_or_else(|| "--".to_string());
        [
            time,
            format_usd(self.actual),
            format_usd(self.predicted),
            format!("{:.2}%", self.accuracy),
        ]
    }
}

pub fn select_history(
    series: &ChartSeries,
    now: DateTime<Utc>,
    policy: &HistoryPolicy,
) -> Vec<HistoryRow> {
    let cutoff = now.timestamp_millis() as f64 / 1000.0 - policy.guard.as_secs_f64();

    let mut seen = HashSet::new();
    let mut candidates: Vec<(f64, Option<f64>, Option<f64>)> = series
        .points()
        .filter(|(ts, _, _)| ts.is_finite() && *ts < cutoff)
        .filter(|(ts, _, _)| !policy.hourly_only || is_on_the_hour(*ts, &policy.timezone))
        .filter(|(ts, _, _)| seen.insert(ts.to_bits()))
        .collect();

    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
    candidates.truncate(policy.limit);

    // Rows missing a value still count towards the limit.
    candidates
        .into_iter()
        .filter_map(|(timestamp, actual, predicted)| {
            let (actual, predicted) = (actual?, predicted?);
            let accuracy = accuracy_pct(actual, predicted)?;
            Some(HistoryRow {
                timestamp,
                actual,
                predicted,
                accuracy,
                tier: AccuracyTier::from_accuracy(accuracy),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: f64 = 3600.0;
    // 2024-03-10 10:00:00 UTC, on the hour in Bangkok as well.
    const BASE: f64 = 1_710_064_800.0;

    fn at(secs: f64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis((secs * 1000.0) as i64).unwrap()
    }

    fn hourly(n: usize) -> ChartSeries {
        ChartSeries {
            labels: (0..n).map(|i| BASE + i as f64 * HOUR).collect(),
            prices: (0..n).map(|i| Some(2000.0 + i as f64)).collect(),
            prediction_point: (0..n).map(|i| Some(2000.0 + i as f64 + 5.0)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_guard_excludes_recent_points() {
        // Ten entries, the two most recent are within the guard window.
        let series = hourly(10);
        let now = at(series.labels[8] + 30.0);

        let rows = select_history(&series, now, &HistoryPolicy::default());
        let times: Vec<f64> = rows.iter().map(|r| r.timestamp).collect();

        let expected: Vec<f64> = (2..=7).rev().map(|i| series.labels[i]).collect();
        assert_eq!(times, expected);
    }

    #[test]
    fn test_dedupe_and_order() {
        let mut series = hourly(4);
        series.labels.push(series.labels[1]);
        series.prices.push(Some(9999.0));
        series.prediction_point.push(Some(9999.0));
        series.labels.swap(0, 3);
        series.prices.swap(0, 3);
        series.prediction_point.swap(0, 3);

        let now = at(BASE + 10.0 * HOUR);
        let rows = select_history(&series, now, &HistoryPolicy::default());

        let times: Vec<f64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(times, vec![BASE + 3.0 * HOUR, BASE + 2.0 * HOUR, BASE + HOUR, BASE]);
        assert!(rows.iter().all(|r| r.actual != 9999.0));
    }

    #[test]
    fn test_hourly_only() {
        let mut series = hourly(3);
        series.labels[1] += 1800.0;
        let now = at(BASE + 10.0 * HOUR);

        let rows = select_history(&series, now, &HistoryPolicy::default());
        assert_eq!(rows.len(), 2);

        let policy = HistoryPolicy {
            hourly_only: false,
            ..Default::default()
        };
        let rows = select_history(&series, now, &policy);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_hourly_only_uses_display_timezone() {
        let series = hourly(2);
        let now = at(BASE + 10.0 * HOUR);
        let policy = HistoryPolicy {
            timezone: chrono_tz::Asia::Kolkata,
            ..Default::default()
        };

        assert!(select_history(&series, now, &policy).is_empty());
    }

    #[test]
    fn test_incomplete_rows_dropped_after_limit() {
        let mut series = hourly(8);
        series.prices[7] = None;
        let now = at(BASE + 10.0 * HOUR);

        let rows = select_history(&series, now, &HistoryPolicy::default());

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].timestamp, series.labels[6]);
        assert_eq!(rows[4].timestamp, series.labels[2]);
    }

    #[test]
    fn test_row_accuracy_and_cells() {
        let series = ChartSeries {
            labels: vec![BASE],
            prices: vec![Some(2000.0)],
            prediction_point: vec![Some(2010.0)],
            ..Default::default()
        };
        let rows = select_history(&series, at(BASE + HOUR), &HistoryPolicy::default());

        assert_eq!(rows.len(), 1);
        assert!((rows[0].accuracy - 99.5).abs() < 1e-9);
        assert_eq!(rows[0].tier, AccuracyTier::Mid);

        let cells = rows[0].cells(&chrono_tz::Asia::Bangkok);
        assert_eq!(
            cells,
            [
                "5:00 PM".to_string(),
                "$2000.00".to_string(),
                "$2010.00".to_string(),
                "99.50%".to_string()
            ]
        );
    }
}
