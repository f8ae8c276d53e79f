use serde::{Deserialize, Serialize};

/// One payload from `GET /api/latest`.
///
/// Every field is optional: the server omits what it has not computed yet and
/// the board leaves the matching element untouched.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Snapshot {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub prediction: Option<f64>,
    #[serde(default)]
    pub prediction_raw: Option<String>,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub pct_change: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub accuracy_reason: Option<String>,
    // null and missing both mean "not known yet"
    #[serde(default)]
    pub last_correct: Option<bool>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub rsi: Option<f64>,
    #[serde(default)]
    pub market_news: Option<Vec<NewsItem>>,
    #[serde(default)]
    pub news_last_updated: Option<String>,
    #[serde(default)]
    pub chart: Option<ChartSeries>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub forecast_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary_th: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl NewsItem {
    pub fn impact(&self) -> Impact {
        Impact::from(self.impact.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Impact {
    Positive,
    Negative,
    Other(String),
}

impl From<&str> for Impact {
    fn from(value: &str) -> Self {
        match value {
            "Positive" => Impact::Positive,
            "Negative" => Impact::Negative,
            other => Impact::Other(other.to_string()),
        }
    }
}

/// Parallel time series: `labels[i]`, `prices[i]` and `prediction_point[i]`
/// describe the same hourly bucket. The last entry is the forecast point,
/// the one before it is "now".
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ChartSeries {
    /// Unix seconds, fractional allowed.
    #[serde(default)]
    pub labels: Vec<f64>,
    #[serde(default)]
    pub prices: Vec<Option<f64>>,
    #[serde(default)]
    pub prediction_point: Vec<Option<f64>>,
    #[serde(default)]
    pub high_threshold: Option<Vec<f64>>,
    #[serde(default)]
    pub low_threshold: Option<Vec<f64>>,
}

impl ChartSeries {
    /// Number of aligned entries. Unequal arrays are cut to their common prefix.
    pub fn len(&self) -> usize {
        self.labels
            .len()
            .min(self.prices.len())
            .min(self.prediction_point.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aligned `(timestamp_secs, actual, predicted)` triples.
    pub fn points(&self) -> impl Iterator<Item = (f64, Option<f64>, Option<f64>)> + '_ {
        (0..self.len()).map(|i| (self.labels[i], self.prices[i], self.prediction_point[i]))
    }
}
