//! Donut chart geometry.
//!
//! ```text
//!            -90° (start)
//!              │
//!        outer_start ──arc──► outer_end
//!              ▲                  │
//!              │                  ▼
//!        inner_start ◄──arc── inner_end
//! ```
//!
//! Segments run clockwise from 12 o'clock. The ring always has a hole; there
//! is no wedge down to the center.

use serde::Serialize;

use super::{ChartSeries, color_at};
use crate::scene::{Color, Node, Paint, Path, Point, TextNode, polar};

/// Angle of the first segment start (12 o'clock).
pub const START_ANGLE: f64 = -90.0;

/// Segments narrower than this are not drawn (still counted in the total).
pub const MIN_VISIBLE_SPAN: f64 = 0.1;

/// A full ring cannot be expressed as a single arc with identical endpoints.
const MAX_SWEEP: f64 = 359.99;

const MIN_INNER_RADIUS: f64 = 1.0;

/// One angular slice, derived from one series entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub source_index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub color: Color,
}

impl Segment {
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn is_visible(&self) -> bool {
        self.span() >= MIN_VISIBLE_SPAN
    }
}

/// Sum of non-negative values.
fn total(series: &ChartSeries) -> f64 {
    series.values().map(|v| v.max(0.0)).sum()
}

/// One contiguous segment per entry, span proportional to `value / total`.
///
/// With a zero total every span collapses to 0 at the start angle.
pub fn segments(series: &ChartSeries) -> Vec<Segment> {
    let total = total(series);
    let mut angle = START_ANGLE;
    series
        .values()
        .enumerate()
        .map(|(i, v)| {
            let span = if total > 0.0 { v.max(0.0) / total * 360.0 } else { 0.0 };
            let seg = Segment {
                source_index: i,
                start_angle: angle,
                end_angle: angle + span,
                color: color_at(i),
            };
            angle += span;
            seg
        })
        .collect()
}

/// Share of the first entry in percent, rounded to a whole number.
pub fn first_share_percent(series: &ChartSeries) -> u32 {
    let total = total(series);
    if total <= 0.0 {
        return 0;
    }
    let first = series.get(0).map(|(_, v)| v.max(0.0)).unwrap_or(0.0);
    (first / total * 100.0).round() as u32
}

/// Center label text, e.g. `"66%"`.
pub fn center_label(series: &ChartSeries) -> String {
    format!("{}%", first_share_percent(series))
}

/// Ring sector between `inner` and `outer` radius from `start` to `end`
/// degrees.
pub fn ring_sector(center: Point, outer: f64, inner: f64, start: f64, end: f64) -> Path {
    let inner = inner.clamp(MIN_INNER_RADIUS, (outer - MIN_INNER_RADIUS).max(MIN_INNER_RADIUS));
    let end = if end - start >= 360.0 { start + MAX_SWEEP } else { end };
    Path::new()
        .move_to(polar(center, outer, start))
        .arc(center, outer, start, end)
        .line_to(polar(center, inner, end))
        .arc(center, inner, end, start)
        .close()
}

/// A donut placed on a page.
#[derive(Debug, Clone, Copy)]
pub struct Donut {
    pub center: Point,
    pub outer_radius: f64,
    pub inner_radius: f64,
    /// Ring drawn beneath the segments.
    pub track: Color,
    pub label_color: Color,
}

impl Donut {
    pub fn new(center: Point, outer_radius: f64, inner_radius: f64) -> Self {
        Self {
            center,
            outer_radius,
            inner_radius,
            track: Color::rgb(0xe5, 0xe7, 0xeb),
            label_color: Color::rgb(0x11, 0x18, 0x27),
        }
    }

    pub fn track(mut self, color: Color) -> Self {
        self.track = color;
        self
    }

    pub fn label_color(mut self, color: Color) -> Self {
        self.label_color = color;
        self
    }

    /// Visible segment paths, in series order.
    pub fn segment_paths(&self, series: &ChartSeries) -> Vec<(Segment, Path)> {
        segments(series)
            .into_iter()
            .filter(Segment::is_visible)
            .map(|s| {
                let path = ring_sector(
                    self.center,
                    self.outer_radius,
                    self.inner_radius,
                    s.start_angle,
                    s.end_angle,
                );
                (s, path)
            })
            .collect()
    }

    pub fn to_nodes(&self, series: &ChartSeries) -> Vec<Node> {
        let mut nodes = Vec::new();
        // an empty series draws only its label
        if total(series) > 0.0 {
            nodes.push(Node::fill_path(
                ring_sector(self.center, self.outer_radius, self.inner_radius, START_ANGLE, START_ANGLE + 360.0),
                Paint::solid(self.track),
            ));
        }
        for (seg, path) in self.segment_paths(series) {
            nodes.push(Node::fill_path(path, Paint::solid(seg.color)));
        }
        let label_size = (self.inner_radius * 0.6).max(12.0);
        nodes.push(
            TextNode::new(
                center_label(series),
                Point::new(self.center.x, self.center.y - label_size / 2.0),
                label_size,
            )
            .color(self.label_color)
            .bold()
            .center()
            .into(),
        );
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PathSeg;

    fn series(values: &[f64]) -> ChartSeries {
        values
            .iter()
            .enumerate()
            .fold(ChartSeries::new(), |s, (i, &v)| s.entry(format!("e{}", i), v))
    }

    #[test]
    fn test_spans_sum_to_full_circle() {
        for values in [&[1.0, 2.0, 3.0][..], &[0.001, 1000.0], &[7.0], &[3.3, 0.0, 9.1, 1.7]] {
            let segs = segments(&series(values));
            let sum: f64 = segs.iter().map(Segment::span).sum();
            assert!((sum - 360.0).abs() < 1e-9, "{:?} sums to {}", values, sum);
        }
    }

    #[test]
    fn test_segments_are_contiguous_from_twelve_oclock() {
        let segs = segments(&series(&[1.0, 1.0, 2.0]));
        assert_eq!(segs[0].start_angle, START_ANGLE);
        for pair in segs.windows(2) {
            assert_eq!(pair[0].end_angle, pair[1].start_angle);
        }
        assert!((segs[2].end_angle - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_collapses() {
        let s = series(&[0.0, 0.0]);
        let segs = segments(&s);
        assert!(segs.iter().all(|seg| seg.span() == 0.0));
        assert_eq!(center_label(&s), "0%");
        let donut = Donut::new(Point::new(100.0, 100.0), 80.0, 50.0);
        assert!(donut.segment_paths(&s).is_empty());
        let nodes = donut.to_nodes(&s);
        assert_eq!(nodes.len(), 1);
        assert!(matches!(&nodes[0], Node::Text(t) if t.content == "0%"));
    }

    #[test]
    fn test_negative_values_count_as_zero() {
        let segs = segments(&series(&[-5.0, 10.0]));
        assert_eq!(segs[0].span(), 0.0);
        assert!((segs[1].span() - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_booking_share_example() {
        // 33 bookings out of 50 conversions
        let s = ChartSeries::new().entry("booked", 33.0).entry("other", 17.0);
        let segs = segments(&s);
        assert!((segs[0].span() - 237.6).abs() < 1e-9);
        assert_eq!(center_label(&s), "66%");
    }

    #[test]
    fn test_tiny_segment_dropped_but_counted() {
        let s = series(&[100000.0, 1.0]);
        let segs = segments(&s);
        assert!(!segs[1].is_visible());
        let donut = Donut::new(Point::new(0.0, 0.0), 10.0, 5.0);
        let drawn = donut.segment_paths(&s);
        assert_eq!(drawn.len(), 1);
        assert!(segs[0].span() < 360.0);
    }

    #[test]
    fn test_ring_sector_has_four_corners_and_hole() {
        let c = Point::new(50.0, 50.0);
        let path = ring_sector(c, 40.0, 0.0, -90.0, 0.0);
        let arcs: Vec<_> = path
            .segs
            .iter()
            .filter_map(|s| match s {
                PathSeg::Arc { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect();
        assert_eq!(arcs.len(), 2);
        assert!(arcs[1] > 0.0, "inner radius must stay positive");
        let PathSeg::MoveTo(start) = path.segs[0] else {
            panic!("path must start with move_to")
        };
        assert!((start.x - 50.0).abs() < 1e-9 && (start.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_ring_sweep_is_capped() {
        let path = ring_sector(Point::new(0.0, 0.0), 10.0, 5.0, -90.0, 270.0);
        match path.segs[1] {
            PathSeg::Arc { start, end, .. } => assert!(end - start < 360.0),
            _ => panic!("expected arc"),
        }
    }
}
