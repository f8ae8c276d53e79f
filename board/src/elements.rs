use common::Tone;
use strum::{AsRefStr, Display, EnumIter};

/// Display slots the loop writes into. The string form is the slot id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ElementId {
    CurrentPrice,
    PredictionPrice,
    TrendIndicator,
    ConfidenceScore,
    ConfidenceReasoning,
    AccuracyRate,
    AccuracyReason,
    LastPredictionStatus,
    #[strum(serialize = "sentiment-val")]
    Sentiment,
    #[strum(serialize = "rsi-val")]
    Rsi,
    LastUpdated,
    ForecastTime,
    NewsLastUpdated,
    DigitalClock,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub text: String,
    pub tone: Option<Tone>,
    pub class: Option<String>,
}

impl Element {
    pub fn text(text: impl Into<String>) -> Self {
        Element {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Element {
            text: text.into(),
            tone: Some(tone),
            class: None,
        }
    }

    pub fn classed(text: impl Into<String>, class: impl Into<String>) -> Self {
        Element {
            text: text.into(),
            tone: None,
            class: Some(class.into()),
        }
    }
}
