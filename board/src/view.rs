use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use anyhow::Context;
use common::Tone;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};

use crate::board::Board;
use crate::elements::{Element, ElementId};

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Green => Color::DarkGreen,
        Tone::Amber => Color::DarkYellow,
        Tone::Red => Color::DarkRed,
        Tone::Cyan => Color::DarkCyan,
    }
}

// Style classes map onto the same palette as tones.
fn class_tone(class: &str) -> Option<Tone> {
    match class {
        "trend-up" | "acc-high" => Some(Tone::Green),
        "trend-down" | "acc-low" => Some(Tone::Red),
        "acc-mid" => Some(Tone::Amber),
        "trend-neutral" => Some(Tone::Cyan),
        _ => None,
    }
}

fn paint(text: &str, tone: Option<Tone>, color: bool) -> String {
    match tone {
        Some(tone) if color => text.with(tone_color(tone)).to_string(),
        _ => text.to_string(),
    }
}

fn paint_element(element: Option<&Element>, color: bool) -> String {
    match element {
        Some(element) => {
            let tone = element
                .tone
                .or_else(|| element.class.as_deref().and_then(class_tone));
            paint(&element.text, tone, color)
        }
        None => String::new(),
    }
}

/// Plain text rendering of the board. `color` adds ANSI escapes.
pub fn render_text(board: &Board, color: bool) -> String {
    let tz = board.settings().timezone;
    let el = |id: ElementId| paint_element(board.element(id), color);
    let mut out = String::new();

    let _ = writeln!(out, "GOLD LIVE  {}  ({})", el(ElementId::DigitalClock), tz);
    let _ = writeln!(out);
    let _ = writeln!(out, "  Price       {}", el(ElementId::CurrentPrice));
    let _ = writeln!(
        out,
        "  Prediction  {}  for {}",
        el(ElementId::PredictionPrice),
        el(ElementId::ForecastTime)
    );
    let _ = writeln!(out, "  Trend       {}", el(ElementId::TrendIndicator));
    let _ = writeln!(
        out,
        "  Confidence  {}  {}",
        el(ElementId::ConfidenceScore),
        el(ElementId::ConfidenceReasoning)
    );
    let _ = writeln!(
        out,
        "  Accuracy    {}  {}  {}",
        el(ElementId::AccuracyRate),
        el(ElementId::LastPredictionStatus),
        el(ElementId::AccuracyReason)
    );
    let _ = writeln!(
        out,
        "  Sentiment   {}  RSI {}",
        el(ElementId::Sentiment),
        el(ElementId::Rsi)
    );
    let _ = writeln!(out, "  Updated     {}", el(ElementId::LastUpdated));

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {:<10} {:>12} {:>12} {:>10}",
        "Time", "Actual", "Predicted", "Accuracy"
    );
    if board.history().is_empty() {
        let _ = writeln!(out, "  (no settled hours yet)");
    }
    for row in board.history() {
        let [time, actual, predicted, accuracy] = row.cells(&tz);
        let accuracy = paint(
            &format!("{accuracy:>10}"),
            class_tone(row.tier.as_ref()),
            color,
        );
        let _ = writeln!(out, "  {time:<10} {actual:>12} {predicted:>12} {accuracy}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  News  {}", el(ElementId::NewsLastUpdated));
    for card in board.news() {
        let impact = paint(&format!("[{}]", card.impact), Some(card.tone), color);
        let _ = writeln!(out, "  {impact} {}", card.title);
        if !card.summary.is_empty() {
            let _ = writeln!(out, "      {}", card.summary);
        }
        let _ = writeln!(out, "      {}", card.link);
    }

    out
}

/// Redraws the board on stdout, in place when attached to a terminal.
pub struct TerminalView {
    interactive: bool,
}

impl TerminalView {
    pub fn new() -> Self {
        TerminalView {
            interactive: std::io::stdout().is_terminal(),
        }
    }

    pub fn draw(&self, board: &Board) -> anyhow::Result<()> {
        let text = render_text(board, self.interactive);
        let mut stdout = std::io::stdout().lock();
        if self.interactive {
            queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .context("Failed to write board to stdout")
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}
