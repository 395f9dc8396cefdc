//! # Chart Geometry
//!
//! From-scratch vector geometry for the three chart kinds the documents
//! embed. Every function here is pure: numeric series in, [`Path`]s, rects
//! and [`Node`]s out, in a fixed native pixel coordinate space.
//!
//! - [`pie`]: donut ring sectors and the center percentage label
//! - [`bar`]: left-to-right bars with value labels
//! - [`line`]: dual-axis line/area chart, each channel scaled on its own
//!
//! ## Shared Rules
//!
//! - Missing or non-finite values read as 0.
//! - Colors are positional: entry `i` gets `PALETTE[i % PALETTE.len()]`.
//! - Bar and line charts with fewer than 2 points draw static markers only.
//!
//! [`Path`]: crate::scene::Path
//! [`Node`]: crate::scene::Node

pub mod bar;
pub mod line;
pub mod pie;

use crate::scene::{Color, Node, Point, Rect, TextNode};

/// Fixed chart palette.
pub const PALETTE: [Color; 6] = [
    Color::rgb(0x63, 0x66, 0xf1), // indigo
    Color::rgb(0xec, 0x48, 0x99), // pink
    Color::rgb(0x10, 0xb9, 0x81), // emerald
    Color::rgb(0xf5, 0x9e, 0x0b), // amber
    Color::rgb(0x0e, 0xa5, 0xe9), // sky
    Color::rgb(0x8b, 0x5c, 0xf6), // violet
];

/// Palette color for the entry at `index`.
#[inline]
pub fn color_at(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// Missing/non-finite → 0.
#[inline]
pub(crate) fn sanitize(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

// ============================================================================
// SERIES
// ============================================================================

/// Ordered `(label, value)` entries. Built fresh per render, read only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartSeries {
    entries: Vec<(String, f64)>,
}

impl ChartSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. `None` and non-finite values are stored as 0.
    pub fn entry(mut self, label: impl Into<String>, value: impl Into<Option<f64>>) -> Self {
        self.entries.push((label.into(), sanitize(value.into())));
        self
    }

    /// Zip labels with values; missing values read as 0.
    pub fn from_pairs<L: Into<String>>(labels: impl IntoIterator<Item = L>, values: &[f64]) -> Self {
        let entries = labels
            .into_iter()
            .enumerate()
            .map(|(i, l)| (l.into(), sanitize(values.get(i).copied())))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|&(_, v)| v)
    }

    pub fn get(&self, index: usize) -> Option<(&str, f64)> {
        self.entries.get(index).map(|(l, v)| (l.as_str(), *v))
    }

    /// Largest value, 0 for an empty series.
    pub fn max(&self) -> f64 {
        self.values().fold(0.0, f64::max)
    }
}

/// Two value channels over the same ordered labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DualSeries {
    pub labels: Vec<String>,
    pub names: [String; 2],
    pub channels: [Vec<f64>; 2],
}

impl DualSeries {
    /// Channels shorter than `labels` are padded with 0.
    pub fn new(labels: Vec<String>, names: [&str; 2], first: &[f64], second: &[f64]) -> Self {
        let n = labels.len();
        let pad = |vals: &[f64]| -> Vec<f64> { (0..n).map(|i| sanitize(vals.get(i).copied())).collect() };
        Self {
            names: [names[0].to_string(), names[1].to_string()],
            channels: [pad(first), pad(second)],
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ============================================================================
// LABEL HELPERS
// ============================================================================

/// Whole numbers print without decimals, others with one.
pub fn format_number(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        group_thousands(v.round() as i64)
    } else {
        format!("{:.1}", v)
    }
}

/// `1234567` → `"1 234 567"`.
pub fn group_thousands(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if v < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Horizontal legend: a color swatch plus label per entry.
pub fn legend(entries: &[(&str, Color)], at: Point, text_size: f64, text_color: Color) -> Vec<Node> {
    let swatch = text_size * 0.75;
    let mut nodes = Vec::with_capacity(entries.len() * 2);
    let mut x = at.x;
    for (label, color) in entries {
        nodes.push(Node::rounded_rect(
            Rect::new(x, at.y + (text_size - swatch) / 2.0, swatch, swatch),
            *color,
            swatch / 4.0,
        ));
        nodes.push(
            TextNode::new(*label, Point::new(x + swatch + 8.0, at.y), text_size)
                .color(text_color)
                .into(),
        );
        // bitmap glyphs are half as wide as tall
        x += swatch + 8.0 + label.chars().count() as f64 * text_size / 2.0 + 24.0;
    }
    nodes
}
