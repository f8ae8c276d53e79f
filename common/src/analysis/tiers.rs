use strum::{AsRefStr, Display};

use crate::Impact;

/// Display colors shared by the board and the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Tone {
    Green,
    Amber,
    Red,
    Cyan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    Full,
    Moderate,
    Weak,
}

impl ConfidenceTier {
    pub fn from_score(confidence: f64) -> Self {
        if confidence >= 100.0 {
            ConfidenceTier::Full
        } else if confidence >= 66.0 {
            ConfidenceTier::Moderate
        } else {
            ConfidenceTier::Weak
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            ConfidenceTier::Full => Tone::Green,
            ConfidenceTier::Moderate => Tone::Amber,
            ConfidenceTier::Weak => Tone::Red,
        }
    }
}

impl Impact {
    pub fn tone(&self) -> Tone {
        match self {
            Impact::Positive => Tone::Green,
            Impact::Negative => Tone::Red,
            Impact::Other(_) => Tone::Amber,
        }
    }
}
