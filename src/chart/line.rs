//! Dual-axis line/area chart geometry.
//!
//! The two channels share the x axis but not the y axis: each is normalized
//! against its own maximum, so reach in the thousands and clicks in the
//! hundreds both span the full plot height.

use serde::Serialize;

use super::{DualSeries, color_at};
use crate::scene::{Color, Node, Paint, Path, Point, Rect, Stroke, TextNode};

const LINE_WIDTH: f64 = 3.0;
const MARKER_RADIUS: f64 = 5.0;
const GLOW_RADIUS: f64 = 10.0;
const GLOW_ALPHA: u8 = 64;
const AREA_ALPHA: u8 = 90;
const GRID_LINES: usize = 4;

/// Screen points of one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub points: Vec<Point>,
    pub max: f64,
    pub color: Color,
}

impl Channel {
    /// Polyline through the points; empty below 2 points.
    pub fn polyline(&self) -> Path {
        if self.points.len() < 2 {
            return Path::new();
        }
        Path::polyline(&self.points)
    }

    /// Closed area from the polyline down to `baseline`; empty below 2 points.
    pub fn area(&self, baseline: f64) -> Path {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return Path::new();
        };
        if self.points.len() < 2 {
            return Path::new();
        }
        let mut outline = self.points.clone();
        outline.push(Point::new(last.x, baseline));
        outline.push(Point::new(first.x, baseline));
        Path::polygon(&outline)
    }
}

/// Both channels laid out in the same plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualLine {
    pub plot: Rect,
    pub channels: [Channel; 2],
}

/// X positions spread evenly across the plot; a single point sits centered.
fn x_positions(n: usize, plot: Rect) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![plot.x + plot.width / 2.0],
        _ => (0..n)
            .map(|i| plot.x + i as f64 / (n - 1) as f64 * plot.width)
            .collect(),
    }
}

fn scale_channel(values: &[f64], xs: &[f64], plot: Rect, color: Color) -> Channel {
    let max = values.iter().copied().fold(0.0, f64::max);
    let denom = if max > 0.0 { max } else { 1.0 };
    let points = values
        .iter()
        .zip(xs)
        .map(|(&v, &x)| {
            let ratio = (v.max(0.0) / denom).min(1.0);
            Point::new(x, plot.bottom() - ratio * plot.height)
        })
        .collect();
    Channel { points, max, color }
}

/// Map both channels into `plot`, each against its own maximum.
pub fn layout(series: &DualSeries, plot: Rect) -> DualLine {
    let xs = x_positions(series.len(), plot);
    DualLine {
        plot,
        channels: [
            scale_channel(&series.channels[0], &xs, plot, color_at(0)),
            scale_channel(&series.channels[1], &xs, plot, color_at(1)),
        ],
    }
}

/// A dual line chart placed on a page.
#[derive(Debug, Clone, Copy)]
pub struct LineChart {
    pub plot: Rect,
    pub text_size: f64,
    pub text_color: Color,
    pub grid_color: Color,
}

impl LineChart {
    pub fn new(plot: Rect) -> Self {
        Self {
            plot,
            text_size: 16.0,
            text_color: Color::rgb(0x37, 0x41, 0x51),
            grid_color: Color::rgb(0xe5, 0xe7, 0xeb),
        }
    }

    pub fn text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn grid_color(mut self, color: Color) -> Self {
        self.grid_color = color;
        self
    }

    pub fn to_nodes(&self, series: &DualSeries) -> Vec<Node> {
        let geometry = layout(series, self.plot);
        let mut nodes = Vec::new();

        for i in 0..=GRID_LINES {
            let y = self.plot.y + self.plot.height * i as f64 / GRID_LINES as f64;
            nodes.push(Node::fill_rect(
                Rect::new(self.plot.x, y, self.plot.width, 1.0),
                self.grid_color,
            ));
        }

        // areas first so neither channel's fill covers the other's line
        for channel in &geometry.channels {
            let area = channel.area(self.plot.bottom());
            if !area.is_empty() {
                nodes.push(Node::fill_path(
                    area,
                    Paint::vertical(
                        self.plot.y,
                        self.plot.bottom(),
                        channel.color.with_alpha(AREA_ALPHA),
                        channel.color.with_alpha(0),
                    ),
                ));
            }
        }
        for channel in &geometry.channels {
            let line = channel.polyline();
            if !line.is_empty() {
                nodes.push(Node::Path {
                    path: line,
                    fill: None,
                    stroke: Some(Stroke {
                        color: channel.color,
                        width: LINE_WIDTH,
                    }),
                });
            }
            for &p in &channel.points {
                nodes.push(Node::circle(p, GLOW_RADIUS, channel.color.with_alpha(GLOW_ALPHA)));
                nodes.push(Node::circle(p, MARKER_RADIUS, channel.color));
            }
        }

        let xs = x_positions(series.len(), self.plot);
        for (label, x) in series.labels.iter().zip(xs) {
            nodes.push(
                TextNode::new(label.as_str(), Point::new(x, self.plot.bottom() + 10.0), self.text_size)
                    .color(self.text_color)
                    .center()
                    .into(),
            );
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weeks(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("T{}", i)).collect()
    }

    #[test]
    fn test_each_channel_peaks_at_plot_top() {
        let plot = Rect::new(60.0, 40.0, 500.0, 240.0);
        let series = DualSeries::new(
            weeks(4),
            ["reach", "clicks"],
            &[15000.0, 19000.0, 25000.0, 26000.0],
            &[120.0, 340.0, 210.0, 90.0],
        );
        let geometry = layout(&series, plot);
        let top_reach = geometry.channels[0].points[3];
        let top_clicks = geometry.channels[1].points[1];
        assert!((top_reach.y - plot.y).abs() < 1e-9);
        assert!((top_clicks.y - plot.y).abs() < 1e-9);
        assert!(geometry.channels[1].points[3].y > plot.y);
    }

    #[test]
    fn test_points_span_plot_width() {
        let plot = Rect::new(0.0, 0.0, 300.0, 100.0);
        let series = DualSeries::new(weeks(3), ["a", "b"], &[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]);
        let g = layout(&series, plot);
        assert_eq!(g.channels[0].points[0].x, 0.0);
        assert_eq!(g.channels[0].points[2].x, 300.0);
    }

    #[test]
    fn test_zero_channel_sits_on_baseline() {
        let plot = Rect::new(0.0, 10.0, 100.0, 50.0);
        let series = DualSeries::new(weeks(2), ["a", "b"], &[0.0, 0.0], &[1.0, 2.0]);
        let g = layout(&series, plot);
        assert!(g.channels[0].points.iter().all(|p| p.y == plot.bottom()));
    }

    #[test]
    fn test_single_point_degrades_to_markers() {
        let chart = LineChart::new(Rect::new(0.0, 0.0, 200.0, 100.0));
        let series = DualSeries::new(weeks(1), ["a", "b"], &[5.0], &[2.0]);
        let nodes = chart.to_nodes(&series);
        assert!(!nodes.iter().any(|n| matches!(n, Node::Path { .. })));
        let circles = nodes.iter().filter(|n| matches!(n, Node::Circle { .. })).count();
        assert_eq!(circles, 4);
    }

    #[test]
    fn test_area_closes_to_baseline() {
        let plot = Rect::new(0.0, 0.0, 100.0, 100.0);
        let series = DualSeries::new(weeks(2), ["a", "b"], &[1.0, 2.0], &[1.0, 1.0]);
        let g = layout(&series, plot);
        let area = g.channels[0].area(plot.bottom());
        assert_eq!(area.to_svg_data(), "M 0 50 L 100 0 L 100 100 L 0 100 Z");
    }

    #[test]
    fn test_markers_glow_beneath_solid() {
        let chart = LineChart::new(Rect::new(0.0, 0.0, 200.0, 100.0));
        let series = DualSeries::new(weeks(2), ["a", "b"], &[1.0, 2.0], &[2.0, 1.0]);
        let nodes = chart.to_nodes(&series);
        let radii: Vec<f64> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::Circle { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect();
        assert_eq!(&radii[..2], &[GLOW_RADIUS, MARKER_RADIUS]);
    }
}
