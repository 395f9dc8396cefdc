//! Color themes and small drawing helpers shared by the layouts.

use crate::scene::{Color, Node, Point, Rect, TextNode, VisualTree};

/// A layout's color roles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color,
    /// Cards and tiles.
    pub surface: Color,
    pub ink: Color,
    pub muted: Color,
    pub accent: Color,
    /// Text drawn on `accent`.
    pub on_accent: Color,
    pub rule: Color,
}

impl Theme {
    /// White paper, navy accent.
    pub const PAPER: Self = Self {
        background: Color::WHITE,
        surface: Color::rgb(0xf3, 0xf4, 0xf6),
        ink: Color::rgb(0x11, 0x18, 0x27),
        muted: Color::rgb(0x6b, 0x72, 0x80),
        accent: Color::rgb(0x1e, 0x3a, 0x8a),
        on_accent: Color::WHITE,
        rule: Color::rgb(0xd1, 0xd5, 0xdb),
    };

    /// Dark slate with indigo accent.
    pub const NIGHT: Self = Self {
        background: Color::rgb(0x0f, 0x17, 0x2a),
        surface: Color::rgb(0x1e, 0x29, 0x3b),
        ink: Color::rgb(0xf8, 0xfa, 0xfc),
        muted: Color::rgb(0x94, 0xa3, 0xb8),
        accent: Color::rgb(0x63, 0x66, 0xf1),
        on_accent: Color::WHITE,
        rule: Color::rgb(0x33, 0x41, 0x55),
    };

    /// Cream paper with a gold accent.
    pub const IVORY: Self = Self {
        background: Color::rgb(0xfd, 0xfb, 0xf6),
        surface: Color::rgb(0xf5, 0xef, 0xe0),
        ink: Color::rgb(0x29, 0x25, 0x24),
        muted: Color::rgb(0x78, 0x71, 0x6c),
        accent: Color::rgb(0xa1, 0x62, 0x07),
        on_accent: Color::WHITE,
        rule: Color::rgb(0xd6, 0xc7, 0xa1),
    };

    /// Plain white and black.
    pub const MONO: Self = Self {
        background: Color::WHITE,
        surface: Color::rgb(0xfa, 0xfa, 0xfa),
        ink: Color::rgb(0x17, 0x17, 0x17),
        muted: Color::rgb(0x73, 0x73, 0x73),
        accent: Color::rgb(0x17, 0x17, 0x17),
        on_accent: Color::WHITE,
        rule: Color::rgb(0xe5, 0xe5, 0xe5),
    };

    /// Saturated violet for loud slides.
    pub const VIVID: Self = Self {
        background: Color::rgb(0x4c, 0x1d, 0x95),
        surface: Color::rgb(0x6d, 0x28, 0xd9),
        ink: Color::WHITE,
        muted: Color::rgb(0xdd, 0xd6, 0xfe),
        accent: Color::rgb(0xfa, 0xcc, 0x15),
        on_accent: Color::rgb(0x1c, 0x19, 0x17),
        rule: Color::rgb(0x8b, 0x5c, 0xf6),
    };

    pub fn page(&self, size: crate::config::CanvasSize) -> VisualTree {
        VisualTree::new(size, self.background)
    }
}

/// Text node helper: `size` px text in `color` at `(x, y)`.
pub fn text(content: impl Into<String>, x: f64, y: f64, size: f64, color: Color) -> TextNode {
    TextNode::new(content, Point::new(x, y), size).color(color)
}

/// One-pixel horizontal rule.
pub fn rule(x: f64, y: f64, width: f64, color: Color) -> Node {
    Node::fill_rect(Rect::new(x, y, width, 1.0), color)
}

/// Label above a big value, inside a rounded tile.
pub fn kpi_tile(page: &mut VisualTree, rect: Rect, label: &str, value: &str, theme: &Theme) {
    page.push(Node::rounded_rect(rect, theme.surface, 12.0));
    page.push(text(label, rect.x + 16.0, rect.y + 14.0, 14.0, theme.muted));
    let value_size = (rect.height * 0.36).clamp(16.0, 40.0);
    page.push(
        text(value, rect.x + 16.0, rect.bottom() - value_size - 14.0, value_size, theme.ink)
            .bold(),
    );
}
