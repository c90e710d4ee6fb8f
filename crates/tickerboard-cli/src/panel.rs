//! Terminal rendering: boxed per-ticker panels laid out in a grid.

use std::fmt::Write as _;

use tickerboard_core::{BoardReport, FailureRecord, InstrumentKind, InstrumentSnapshot};

use crate::config::{Config, SymbolConfig};

const PERIOD_LABELS: [&str; 4] = ["24h", "7d", "30d", "YTD"];
const NO_CHART_DATA: &str = "No data";
const NOTHING_TO_SHOW: &str = "No data available for any tickers";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(u8, u8, u8);

impl Rgb {
    /// Parses `#RRGGBB`.
    pub fn parse_hex(input: &str) -> Option<Self> {
        let hex = input.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Direction of a percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

/// `$1,234.56` at or above 1000, two decimals at or above 1, else four.
pub fn format_price(price: f64, currency_symbol: &str) -> String {
    if price >= 1000.0 {
        format!("{currency_symbol}{}", group_thousands(&format!("{price:.2}")))
    } else if price >= 1.0 {
        format!("{currency_symbol}{price:.2}")
    } else {
        format!("{currency_symbol}{price:.4}")
    }
}

/// Arrow plus absolute change, e.g. `▼2.50%`. Unchanged values get a
/// blank in place of the arrow.
pub fn format_change(change: f64, symbols: &SymbolConfig) -> (String, Tone) {
    let (marker, tone) = if change > 0.0 {
        (symbols.up.as_str(), Tone::Positive)
    } else if change < 0.0 {
        (symbols.down.as_str(), Tone::Negative)
    } else {
        (" ", Tone::Neutral)
    };
    (format!("{marker}{:.2}%", change.abs()), tone)
}

/// Column chart of `data`, one column per point and `height` rows. The top
/// row holds the highest threshold; a cell is filled when the price
/// reaches that row's threshold.
pub fn ascii_chart(data: &[f64], width: usize, height: usize) -> Vec<String> {
    if data.len() < 2 {
        return vec![String::from(NO_CHART_DATA)];
    }

    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 {
        return vec!["─".repeat(width)];
    }

    let height = height.max(1);
    (0..height)
        .map(|row| {
            let threshold = max - range * row as f64 / height as f64;
            data.iter()
                .map(|price| if *price >= threshold { '█' } else { ' ' })
                .collect()
        })
        .collect()
}

fn group_thousands(fixed: &str) -> String {
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed, ""));
    let digits = integer.chars().collect::<Vec<_>>();

    let mut grouped = String::with_capacity(fixed.len() + digits.len() / 3);
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }
    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

/// Text fragment with an optional foreground color.
struct Span {
    text: String,
    color: Option<Rgb>,
}

type Line = Vec<Span>;

fn visible_width(line: &Line) -> usize {
    line.iter().map(|span| span.text.chars().count()).sum()
}

fn center(text: &str, width: usize) -> (String, String) {
    let gap = width.saturating_sub(text.chars().count());
    (" ".repeat(gap / 2), " ".repeat(gap - gap / 2))
}

/// A rendered panel; every line has the same visible `width`.
struct RenderedPanel {
    lines: Vec<String>,
    width: usize,
}

pub struct PanelRenderer<'a> {
    config: &'a Config,
    color: bool,
    crypto_symbol: String,
}

impl<'a> PanelRenderer<'a> {
    pub fn new(config: &'a Config, color: bool) -> Self {
        Self {
            config,
            color,
            crypto_symbol: config.currency.symbol.clone(),
        }
    }

    /// Price prefix for crypto panels, which are quoted in the board's
    /// currency rather than the configured default.
    pub fn with_crypto_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.crypto_symbol = symbol.into();
        self
    }

    /// Full screen for one refresh: the panel grid, then failed tickers.
    pub fn render_report(&self, report: &BoardReport) -> String {
        let mut out = String::new();
        let panels = report
            .snapshots()
            .map(|snapshot| self.render_panel(snapshot))
            .collect::<Vec<_>>();

        for row in panels.chunks(self.config.display.max_tickers_per_row.max(1)) {
            let height = row.iter().map(|panel| panel.lines.len()).max().unwrap_or(0);
            for index in 0..height {
                let cells = row
                    .iter()
                    .map(|panel| {
                        panel
                            .lines
                            .get(index)
                            .cloned()
                            .unwrap_or_else(|| " ".repeat(panel.width))
                    })
                    .collect::<Vec<_>>();
                out.push_str(&cells.join(" "));
                out.push('\n');
            }
            out.push('\n');
        }

        for failure in report.failures() {
            self.emit(&[self.failure_span(failure)], &mut out);
            out.push('\n');
        }

        if panels.is_empty() {
            let negative = self.paint(NOTHING_TO_SHOW, &self.config.colors.negative);
            self.emit(&[negative], &mut out);
            out.push('\n');
        }

        out
    }

    fn render_panel(&self, snapshot: &InstrumentSnapshot) -> RenderedPanel {
        let colors = &self.config.colors;
        let display = &self.config.display;
        let title = format!("{} Data", snapshot.kind.label());

        let mut content: Vec<Line> = vec![
            vec![self.paint(snapshot.symbol.as_str(), &colors.ticker)],
            vec![self.paint(
                &format_price(snapshot.current_price, self.price_symbol(snapshot.kind)),
                &colors.price,
            )],
            Vec::new(),
        ];
        content.extend(self.changes_table(snapshot));
        content.push(Vec::new());
        content.extend(
            ascii_chart(&snapshot.trend, display.chart_width, display.chart_height)
                .into_iter()
                .map(|row| vec![plain(row)]),
        );

        let content_width = content.iter().map(visible_width).max().unwrap_or(0);
        let inner = (content_width + 2).max(title.chars().count() + 4);

        let mut lines = Vec::with_capacity(content.len() + 2);
        lines.push(format!(
            "┌─ {title} {}┐",
            "─".repeat(inner - title.chars().count() - 3)
        ));
        for line in &content {
            let mut rendered = String::from("│ ");
            self.emit(line, &mut rendered);
            rendered.push_str(&" ".repeat(inner - 2 - visible_width(line)));
            rendered.push_str(" │");
            lines.push(rendered);
        }
        lines.push(format!("└{}┘", "─".repeat(inner)));

        RenderedPanel {
            lines,
            width: inner + 2,
        }
    }

    /// Header and value rows of the 24h/7d/30d/YTD table, columns
    /// centered on the wider of label and value.
    fn changes_table(&self, snapshot: &InstrumentSnapshot) -> [Line; 2] {
        let cells = snapshot
            .changes
            .as_array()
            .map(|change| format_change(change, &self.config.symbols));

        let mut header = Line::new();
        let mut values = Line::new();
        for (index, (label, (text, tone))) in PERIOD_LABELS.iter().zip(cells).enumerate() {
            if index > 0 {
                header.push(plain("  "));
                values.push(plain("  "));
            }
            let width = label.chars().count().max(text.chars().count());

            let (left, right) = center(label, width);
            header.push(plain(format!("{left}{label}{right}")));

            let (left, right) = center(&text, width);
            values.push(plain(left));
            values.push(self.paint(&text, self.tone_color(tone)));
            values.push(plain(right));
        }
        [header, values]
    }

    fn failure_span(&self, failure: &FailureRecord) -> Span {
        let mut text = format!(
            "Failed to fetch data for {} ({})",
            failure.symbol, failure.reason
        );
        if let Some(detail) = &failure.detail {
            let _ = write!(text, ": {detail}");
        }
        self.paint(&text, &self.config.colors.negative)
    }

    fn price_symbol(&self, kind: InstrumentKind) -> &str {
        match kind {
            InstrumentKind::Crypto => &self.crypto_symbol,
            InstrumentKind::Stock => &self.config.currency.symbol,
        }
    }

    fn tone_color(&self, tone: Tone) -> &str {
        match tone {
            Tone::Positive => &self.config.colors.positive,
            Tone::Negative => &self.config.colors.negative,
            Tone::Neutral => &self.config.colors.neutral,
        }
    }

    fn paint(&self, text: &str, hex: &str) -> Span {
        Span {
            text: text.to_owned(),
            color: if self.color { Rgb::parse_hex(hex) } else { None },
        }
    }

    fn emit(&self, line: &[Span], out: &mut String) {
        for span in line {
            match span.color {
                Some(Rgb(r, g, b)) => {
                    let _ = write!(out, "\x1b[38;2;{r};{g};{b}m{}\x1b[0m", span.text);
                }
                None => out.push_str(&span.text),
            }
        }
    }
}

fn plain(text: impl Into<String>) -> Span {
    Span {
        text: text.into(),
        color: None,
    }
}
