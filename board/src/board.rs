use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use common::transforms::numbers::{format_score, format_usd};
use common::{ConfidenceTier, NewsItem, Snapshot, Tone, Trend};
use strum::IntoEnumIterator;

use crate::chart_view::ChartView;
use crate::elements::{Element, ElementId};
use crate::history::{select_history, HistoryPolicy, HistoryRow};

pub const FALLBACK_NEWS_LINK: &str = "https://www.investing.com/news/commodities/gold";
const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardSettings {
    pub chart_window: usize,
    pub history: HistoryPolicy,
    pub timezone: Tz,
}

impl Default for BoardSettings {
    fn default() -> Self {
        let history = HistoryPolicy::default();
        BoardSettings {
            chart_window: common::DEFAULT_CHART_WINDOW,
            timezone: history.timezone,
            history,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// No price in the payload, nothing was touched.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsCard {
    pub title: String,
    pub summary: String,
    pub impact: String,
    pub tone: Tone,
    pub link: String,
}

impl From<&NewsItem> for NewsCard {
    fn from(item: &NewsItem) -> Self {
        NewsCard {
            title: item.title.clone(),
            summary: item.summary_th.clone(),
            impact: item.impact.clone(),
            tone: item.impact().tone(),
            link: item
                .link
                .as_deref()
                .filter(|link| !link.is_empty())
                .unwrap_or(FALLBACK_NEWS_LINK)
                .to_string(),
        }
    }
}

/// Everything the terminal view draws, rebuilt from snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    settings: BoardSettings,
    elements: BTreeMap<ElementId, Element>,
    news: Vec<NewsCard>,
    history: Vec<HistoryRow>,
    chart: Option<ChartView>,
}

impl Board {
    pub fn init(settings: BoardSettings) -> Self {
        let elements = ElementId::iter()
            .map(|id| (id, Element::text(PLACEHOLDER)))
            .collect();

        Board {
            settings,
            elements,
            news: Vec::new(),
            history: Vec::new(),
            chart: None,
        }
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn text(&self, id: ElementId) -> &str {
        self.elements.get(&id).map(|e| e.text.as_str()).unwrap_or("")
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements.iter().map(|(id, element)| (*id, element))
    }

    pub fn news(&self) -> &[NewsCard] {
        &self.news
    }

    pub fn history(&self) -> &[HistoryRow] {
        &self.history
    }

    pub fn chart(&self) -> Option<&ChartView> {
        self.chart.as_ref()
    }

    fn set(&mut self, id: ElementId, element: Element) {
        self.elements.insert(id, element);
    }

    /// Applies one snapshot. Elements whose source field is missing keep
    /// their previous value.
    pub fn update(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> UpdateOutcome {
        let Some(price) = snapshot.price else {
            return UpdateOutcome::Skipped;
        };

        self.set(ElementId::CurrentPrice, Element::text(format_usd(price)));

        if let Some(prediction) = snapshot.prediction {
            self.set(ElementId::PredictionPrice, Element::text(format_usd(prediction)));
        } else if let Some(raw) = &snapshot.prediction_raw {
            self.set(ElementId::PredictionPrice, Element::text(raw.clone()));
        }

        if let Some(last_updated) = &snapshot.last_updated {
            self.set(ElementId::LastUpdated, Element::text(last_updated.clone()));
        }
        if let Some(forecast_time) = &snapshot.forecast_time {
            self.set(ElementId::ForecastTime, Element::text(forecast_time.clone()));
        }

        if let Some(accuracy) = snapshot.accuracy {
            self.set(ElementId::AccuracyRate, Element::text(format!("{accuracy:.1}%")));
            self.set(ElementId::LastPredictionStatus, last_status(snapshot.last_correct));
            if let Some(reason) = &snapshot.accuracy_reason {
                self.set(ElementId::AccuracyReason, Element::text(reason.clone()));
            }
        }

        if let Some(confidence) = snapshot.confidence {
            let tone = ConfidenceTier::from_score(confidence).tone();
            self.set(
                ElementId::ConfidenceScore,
                Element::toned(format_score(confidence), tone),
            );
        }
        if let Some(reasoning) = &snapshot.reasoning {
            self.set(ElementId::ConfidenceReasoning, Element::text(reasoning.clone()));
        }

        let trend = Trend::classify(snapshot.trend.as_deref().unwrap_or_default());
        self.set(
            ElementId::TrendIndicator,
            Element::classed(trend.display(snapshot.pct_change), trend.class().to_string()),
        );

        if let Some(sentiment) = &snapshot.sentiment {
            self.set(ElementId::Sentiment, Element::text(sentiment.clone()));
        }
        if let Some(rsi) = snapshot.rsi {
            self.set(ElementId::Rsi, Element::text(format!("{rsi:.2}")));
        }

        if let Some(items) = &snapshot.market_news {
            self.news = items.iter().map(NewsCard::from).collect();
        }
        if let Some(refreshed) = &snapshot.news_last_updated {
            self.set(
                ElementId::NewsLastUpdated,
                Element::text(format!("Refreshed: {refreshed}")),
            );
        }

        if let Some(series) = &snapshot.chart {
            self.chart = Some(ChartView::from_series(series, self.settings.chart_window));
            self.history = select_history(series, now, &self.settings.history);
        }

        UpdateOutcome::Applied
    }

    pub fn set_clock(&mut self, now: DateTime<Utc>) {
        let local = now.with_timezone(&self.settings.timezone);
        self.set(
            ElementId::DigitalClock,
            Element::text(local.format("%H:%M:%S").to_string()),
        );
    }
}

fn last_status(last_correct: Option<bool>) -> Element {
    match last_correct {
        Some(true) => Element::toned("Last 1h: Correct", Tone::Green),
        Some(false) => Element::toned("Last 1h: Incorrect", Tone::Red),
        None => Element::text("Last 1h: N/A"),
    }
}
