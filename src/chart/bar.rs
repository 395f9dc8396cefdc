//! Bar chart geometry.
//!
//! Bars are laid left to right, each in an equal horizontal slot of the plot
//! area. Heights scale against `max(values, 1)`, so an all-zero series never
//! divides by zero and still shows 2 px slivers with their value labels.

use serde::Serialize;

use super::{ChartSeries, color_at, format_number};
use crate::scene::{Color, Node, Point, Rect, TextNode};

/// Default horizontal gap between bars.
pub const BAR_GAP: f64 = 16.0;

/// Bars never get narrower than this unless the slot itself is narrower.
pub const MIN_BAR_WIDTH: f64 = 4.0;

/// Zero-value bars remain visible as a sliver this tall.
pub const MIN_BAR_HEIGHT: f64 = 2.0;

const MARKER_RADIUS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub source_index: usize,
    pub rect: Rect,
    pub value: f64,
    pub color: Color,
}

/// Lay out one bar per entry inside `plot`.
///
/// `count × (width + gap) == plot.width`: the configured gap shrinks when the
/// minimum width would otherwise push bars past the right edge.
pub fn layout(series: &ChartSeries, plot: Rect, gap: f64) -> Vec<Bar> {
    let n = series.len();
    if n == 0 {
        return Vec::new();
    }
    let available = plot.width.max(0.0);
    let slot = available / n as f64;
    let width = ((available - gap.max(0.0) * n as f64) / n as f64)
        .max(MIN_BAR_WIDTH)
        .min(slot);
    let gap = slot - width;

    let scale_max = series.max().max(1.0);
    series
        .values()
        .enumerate()
        .map(|(i, v)| {
            let height = (v.max(0.0) / scale_max * plot.height)
                .max(MIN_BAR_HEIGHT)
                .min(plot.height);
            Bar {
                source_index: i,
                rect: Rect::new(
                    plot.x + i as f64 * slot + gap / 2.0,
                    plot.bottom() - height,
                    width,
                    height,
                ),
                value: v,
                color: color_at(i),
            }
        })
        .collect()
}

/// A bar chart placed on a page.
#[derive(Debug, Clone, Copy)]
pub struct BarChart {
    pub plot: Rect,
    pub gap: f64,
    pub text_size: f64,
    pub text_color: Color,
    pub axis_color: Color,
    /// Paint every bar in this color instead of the positional palette.
    pub uniform: Option<Color>,
}

impl BarChart {
    pub fn new(plot: Rect) -> Self {
        Self {
            plot,
            gap: BAR_GAP,
            text_size: 16.0,
            text_color: Color::rgb(0x37, 0x41, 0x51),
            axis_color: Color::rgb(0xd1, 0xd5, 0xdb),
            uniform: None,
        }
    }

    pub fn text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn uniform(mut self, color: Color) -> Self {
        self.uniform = Some(color);
        self
    }

    /// Bars with value labels above and category labels below. Fewer than 2
    /// entries degrade to a marker per entry.
    pub fn to_nodes(&self, series: &ChartSeries) -> Vec<Node> {
        let bars = layout(series, self.plot, self.gap);
        let mut nodes = vec![Node::fill_rect(
            Rect::new(self.plot.x, self.plot.bottom(), self.plot.width, 1.0),
            self.axis_color,
        )];
        let static_markers = bars.len() < 2;
        for bar in &bars {
            let color = self.uniform.unwrap_or(bar.color);
            let cx = bar.rect.center().x;
            if static_markers {
                nodes.push(Node::circle(Point::new(cx, bar.rect.y), MARKER_RADIUS, color));
            } else {
                nodes.push(Node::rounded_rect(bar.rect, color, (bar.rect.width / 8.0).min(6.0)));
            }
            nodes.push(
                TextNode::new(
                    format_number(bar.value),
                    Point::new(cx, bar.rect.y - self.text_size - 6.0),
                    self.text_size,
                )
                .color(self.text_color)
                .bold()
                .center()
                .into(),
            );
            if let Some((label, _)) = series.get(bar.source_index) {
                nodes.push(
                    TextNode::new(label, Point::new(cx, self.plot.bottom() + 8.0), self.text_size)
                        .color(self.text_color)
                        .center()
                        .into(),
                );
            }
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> ChartSeries {
        values
            .iter()
            .enumerate()
            .fold(ChartSeries::new(), |s, (i, &v)| s.entry(format!("b{}", i), v))
    }

    fn assert_fits(values: &[f64], plot: Rect, gap: f64) {
        let bars = layout(&series(values), plot, gap);
        assert_eq!(bars.len(), values.len());
        for bar in &bars {
            assert!(bar.rect.height >= MIN_BAR_HEIGHT, "{:?}", bar);
            assert!(bar.rect.height <= plot.height + 1e-9, "{:?}", bar);
            assert!(bar.rect.width > 0.0);
            assert!(bar.rect.x >= plot.x - 1e-9);
            assert!(bar.rect.right() <= plot.right() + 1e-9);
        }
        if let Some(first) = bars.first() {
            let gap_used = if bars.len() > 1 {
                bars[1].rect.x - first.rect.right()
            } else {
                plot.width - first.rect.width
            };
            let total = bars.len() as f64 * (first.rect.width + gap_used);
            assert!(total <= plot.width + 1e-6, "total {} > {}", total, plot.width);
        }
    }

    #[test]
    fn test_bar_bounds_hold() {
        let plot = Rect::new(40.0, 20.0, 600.0, 300.0);
        assert_fits(&[10.0, 20.0, 5.0, 0.0], plot, BAR_GAP);
        assert_fits(&[0.0, 0.0, 0.0], plot, BAR_GAP);
        assert_fits(&[1.0; 200], plot, BAR_GAP);
        assert_fits(&[3.0], plot, BAR_GAP);
        assert_fits(&[5.0, 1e9], Rect::new(0.0, 0.0, 30.0, 50.0), 40.0);
    }

    #[test]
    fn test_all_zero_bars_are_slivers() {
        let plot = Rect::new(0.0, 0.0, 400.0, 200.0);
        let bars = layout(&series(&[0.0, 0.0]), plot, BAR_GAP);
        for bar in &bars {
            assert_eq!(bar.rect.height, MIN_BAR_HEIGHT);
            assert_eq!(bar.rect.bottom(), plot.bottom());
        }
    }

    #[test]
    fn test_heights_proportional_to_max() {
        let plot = Rect::new(0.0, 0.0, 400.0, 200.0);
        let bars = layout(&series(&[50.0, 100.0]), plot, BAR_GAP);
        assert_eq!(bars[1].rect.height, 200.0);
        assert_eq!(bars[0].rect.height, 100.0);
        assert_eq!(bars[1].rect.y, plot.y);
    }

    #[test]
    fn test_fractional_max_uses_one_floor() {
        let plot = Rect::new(0.0, 0.0, 400.0, 100.0);
        let bars = layout(&series(&[0.5, 0.25]), plot, BAR_GAP);
        assert_eq!(bars[0].rect.height, 50.0);
    }

    #[test]
    fn test_empty_series_has_no_bars() {
        assert!(layout(&ChartSeries::new(), Rect::new(0.0, 0.0, 100.0, 100.0), BAR_GAP).is_empty());
    }

    #[test]
    fn test_single_entry_renders_marker() {
        let chart = BarChart::new(Rect::new(0.0, 0.0, 300.0, 100.0));
        let nodes = chart.to_nodes(&series(&[7.0]));
        assert!(nodes.iter().any(|n| matches!(n, Node::Circle { .. })));
        assert!(!nodes.iter().any(|n| matches!(n, Node::Rect { radius, .. } if *radius > 0.0)));
    }

    #[test]
    fn test_value_labels_above_bars() {
        let chart = BarChart::new(Rect::new(0.0, 100.0, 300.0, 100.0));
        let nodes = chart.to_nodes(&series(&[0.0, 12500.0]));
        let labels: Vec<&str> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.content.as_str()),
                _ => None,
            })
            .collect();
        assert!(labels.contains(&"0"));
        assert!(labels.contains(&"12 500"));
    }
}
