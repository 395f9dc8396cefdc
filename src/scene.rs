//! # Visual Tree
//!
//! The pure output of template rendering: an ordered list of drawing nodes in
//! native pixel coordinates (origin top-left, y down).
//!
//! ```text
//! document::render(kind, variant, payload)
//!        │
//!        ▼
//!   VisualTree { size, background, nodes }
//!        │
//!        ├──► preview::render_preview   (display scale, on screen)
//!        └──► render::rasterize          (export density, pixel exact)
//! ```
//!
//! Nothing in a tree depends on how it will be displayed. Scale and density
//! are applied by whoever paints it.

use serde::{Deserialize, Serialize};

use crate::config::CanvasSize;

// ============================================================================
// PRIMITIVES
// ============================================================================

/// An RGBA color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rrggbb`, `rrggbb` or `#rgb`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            3 => {
                let short = |i: usize| {
                    let v = u8::from_str_radix(hex.get(i..i + 1)?, 16).ok()?;
                    Some(v * 17)
                };
                Some(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A point in native pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Convert polar coordinates (degrees, 0° = 3 o'clock, clockwise) to a point.
#[inline]
pub fn polar(center: Point, radius: f64, angle_deg: f64) -> Point {
    let rad = angle_deg.to_radians();
    Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink by `d` on every side (never below zero size).
    pub fn inset(&self, d: f64) -> Self {
        Self::new(
            self.x + d,
            self.y + d,
            (self.width - 2.0 * d).max(0.0),
            (self.height - 2.0 * d).max(0.0),
        )
    }
}

// ============================================================================
// PATHS
// ============================================================================

/// One path command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathSeg {
    MoveTo(Point),
    LineTo(Point),
    /// Circular arc around `center` from the current point (which lies at
    /// `start` degrees) to `end` degrees. Direction follows the sign of
    /// `end - start`.
    Arc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
    },
    Close,
}

/// A vector path description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    pub segs: Vec<PathSeg>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Point) -> Self {
        self.segs.push(PathSeg::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.segs.push(PathSeg::LineTo(p));
        self
    }

    pub fn arc(mut self, center: Point, radius: f64, start: f64, end: f64) -> Self {
        self.segs.push(PathSeg::Arc {
            center,
            radius,
            start,
            end,
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.segs.push(PathSeg::Close);
        self
    }

    /// Open polyline through `points`.
    pub fn polyline(points: &[Point]) -> Self {
        let mut path = Self::new();
        for (i, &p) in points.iter().enumerate() {
            path = if i == 0 { path.move_to(p) } else { path.line_to(p) };
        }
        path
    }

    /// Closed polygon through `points`.
    pub fn polygon(points: &[Point]) -> Self {
        if points.is_empty() {
            return Self::new();
        }
        Self::polyline(points).close()
    }

    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    /// SVG path data (`d` attribute) for this path.
    pub fn to_svg_data(&self) -> String {
        let mut out = Vec::with_capacity(self.segs.len());
        for seg in &self.segs {
            match *seg {
                PathSeg::MoveTo(p) => out.push(format!("M {} {}", fmt(p.x), fmt(p.y))),
                PathSeg::LineTo(p) => out.push(format!("L {} {}", fmt(p.x), fmt(p.y))),
                PathSeg::Arc {
                    center,
                    radius,
                    start,
                    end,
                } => {
                    let to = polar(center, radius, end);
                    let large = if (end - start).abs() > 180.0 { 1 } else { 0 };
                    let sweep = if end >= start { 1 } else { 0 };
                    out.push(format!(
                        "A {} {} 0 {} {} {} {}",
                        fmt(radius),
                        fmt(radius),
                        large,
                        sweep,
                        fmt(to.x),
                        fmt(to.y)
                    ));
                }
                PathSeg::Close => out.push("Z".to_string()),
            }
        }
        out.join(" ")
    }
}

fn fmt(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

// ============================================================================
// PAINT
// ============================================================================

/// One color stop of a gradient, `offset` in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

/// Fill style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Paint {
    Solid { color: Color },
    Linear {
        from: Point,
        to: Point,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Paint::Solid { color }
    }

    /// Vertical gradient from `top` color at `y0` to `bottom` color at `y1`.
    pub fn vertical(y0: f64, y1: f64, top: Color, bottom: Color) -> Self {
        Paint::Linear {
            from: Point::new(0.0, y0),
            to: Point::new(0.0, y1),
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: top,
                },
                GradientStop {
                    offset: 1.0,
                    color: bottom,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

// ============================================================================
// TEXT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// A run of text. `at.x` is the anchor for `align`, `at.y` the top of the
/// first line. Wraps on word boundaries when `max_width` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub at: Point,
    pub content: String,
    /// Line box height in native pixels.
    pub size: f64,
    pub color: Color,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub max_width: Option<f64>,
}

/// Glyph advance as a fraction of the line height (bitmap fonts are 1:2).
pub const GLYPH_ASPECT: f64 = 0.5;

/// Width of a single line of `content` at line height `size`.
pub fn text_width(content: &str, size: f64) -> f64 {
    content.chars().count() as f64 * size * GLYPH_ASPECT
}

/// Break `content` into lines no wider than `max_width`, on word boundaries.
/// Explicit newlines always break; a single over-long word gets its own line.
pub fn wrap_lines(content: &str, size: f64, max_width: Option<f64>) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        let Some(max_width) = max_width else {
            lines.push(paragraph.to_string());
            continue;
        };
        let max_chars = ((max_width / (size * GLYPH_ASPECT)).floor() as usize).max(1);
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

impl TextNode {
    /// Lines after wrapping.
    pub fn lines(&self) -> Vec<String> {
        wrap_lines(&self.content, self.size, self.max_width)
    }

    /// Height of the wrapped block.
    pub fn block_height(&self) -> f64 {
        self.lines().len() as f64 * self.size
    }

    pub fn new(content: impl Into<String>, at: Point, size: f64) -> Self {
        Self {
            at,
            content: content.into(),
            size,
            color: Color::BLACK,
            align: Align::Left,
            bold: false,
            max_width: None,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn center(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn wrap(mut self, max_width: f64) -> Self {
        self.max_width = Some(max_width);
        self
    }
}

// ============================================================================
// NODES
// ============================================================================

/// A single drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Rect {
        rect: Rect,
        paint: Paint,
        #[serde(default)]
        radius: f64,
    },
    Path {
        path: Path,
        fill: Option<Paint>,
        stroke: Option<Stroke>,
    },
    Circle {
        center: Point,
        radius: f64,
        paint: Paint,
    },
    Text(TextNode),
    /// Raster image cover-fitted into `rect`. `source` is a URL or file path
    /// resolved before capture.
    Image { rect: Rect, source: String },
}

impl Node {
    pub fn fill_rect(rect: Rect, color: Color) -> Self {
        Node::Rect {
            rect,
            paint: Paint::solid(color),
            radius: 0.0,
        }
    }

    pub fn rounded_rect(rect: Rect, color: Color, radius: f64) -> Self {
        Node::Rect {
            rect,
            paint: Paint::solid(color),
            radius,
        }
    }

    pub fn circle(center: Point, radius: f64, color: Color) -> Self {
        Node::Circle {
            center,
            radius,
            paint: Paint::solid(color),
        }
    }

    pub fn stroke_path(path: Path, color: Color, width: f64) -> Self {
        Node::Path {
            path,
            fill: None,
            stroke: Some(Stroke { color, width }),
        }
    }

    pub fn fill_path(path: Path, paint: Paint) -> Self {
        Node::Path {
            path,
            fill: Some(paint),
            stroke: None,
        }
    }

    pub fn image(rect: Rect, source: impl Into<String>) -> Self {
        Node::Image {
            rect,
            source: source.into(),
        }
    }
}

impl From<TextNode> for Node {
    fn from(text: TextNode) -> Self {
        Node::Text(text)
    }
}

/// One page of a rendered document at native pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualTree {
    pub size: CanvasSize,
    pub background: Color,
    pub nodes: Vec<Node>,
}

impl VisualTree {
    pub fn new(size: CanvasSize, background: Color) -> Self {
        Self {
            size,
            background,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.nodes.push(node.into());
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.nodes.extend(nodes);
    }

    /// Full-canvas rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.width as f64, self.size.height as f64)
    }

    /// Distinct image sources referenced by this page, in first-use order.
    pub fn image_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for node in &self.nodes {
            if let Node::Image { source, .. } = node
                && !sources.contains(&source.as_str())
            {
                sources.push(source.as_str());
            }
        }
        sources
    }

    /// All text content on the page, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Text(t) => Some(t.content.as_str()),
            _ => None,
        })
    }
}
