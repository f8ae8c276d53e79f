use strum::{AsRefStr, Display};

use crate::transforms::numbers::format_pct_change;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    StrongUp,
    Up,
    StrongDown,
    Down,
    Sideways,
}

/// Style class of the trend element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum TrendClass {
    #[strum(serialize = "trend-up")]
    Up,
    #[strum(serialize = "trend-down")]
    Down,
    #[strum(serialize = "trend-neutral")]
    Neutral,
}

impl Trend {
    /// Case-insensitive substring match: `UP` wins over `DOWN`, `STRONG`
    /// upgrades either one, anything else is sideways.
    pub fn classify(raw: &str) -> Self {
        let upper = raw.to_uppercase();
        let strong = upper.contains("STRONG");

        if upper.contains("UP") {
            if strong {
                Trend::StrongUp
            } else {
                Trend::Up
            }
        } else if upper.contains("DOWN") {
            if strong {
                Trend::StrongDown
            } else {
                Trend::Down
            }
        } else {
            Trend::Sideways
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::StrongUp => "🚀 STRONG UP",
            Trend::Up => "▲ Trending UP",
            Trend::StrongDown => "📉 STRONG DOWN",
            Trend::Down => "▼ Trending DOWN",
            Trend::Sideways => "〓 SIDEWAYS",
        }
    }

    pub fn class(&self) -> TrendClass {
        match self {
            Trend::StrongUp | Trend::Up => TrendClass::Up,
            Trend::StrongDown | Trend::Down => TrendClass::Down,
            Trend::Sideways => TrendClass::Neutral,
        }
    }

    /// Label with the signed percentage change appended, when known.
    pub fn display(&self, pct_change: Option<f64>) -> String {
        match pct_change {
            Some(pct) => format!("{}{}", self.label(), format_pct_change(pct)),
            None => self.label().to_string(),
        }
    }
}
