//! Neutral page shown when no known template was selected.

use super::theme::text;
use super::{Composition, DocumentKind};
use crate::config::CanvasSize;
use crate::scene::{Color, Node, Rect, VisualTree};

pub const PROMPT: &str = "Wybierz szablon";

const BACKGROUND: Color = Color::rgb(0xf3, 0xf4, 0xf6);
const DASH: Color = Color::rgb(0x9c, 0xa3, 0xaf);

fn kind_label(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Report => "Raport",
        DocumentKind::Contract => "Umowa",
        DocumentKind::Presentation => "Prezentacja",
        DocumentKind::Graphic => "Grafika",
    }
}

/// Dashed outline of `rect`.
fn dashed(page: &mut VisualTree, rect: Rect, dash: f64, width: f64) {
    let mut x = rect.x;
    while x < rect.right() {
        let len = dash.min(rect.right() - x);
        page.push(Node::fill_rect(Rect::new(x, rect.y, len, width), DASH));
        page.push(Node::fill_rect(Rect::new(x, rect.bottom() - width, len, width), DASH));
        x += dash * 2.0;
    }
    let mut y = rect.y;
    while y < rect.bottom() {
        let len = dash.min(rect.bottom() - y);
        page.push(Node::fill_rect(Rect::new(rect.x, y, width, len), DASH));
        page.push(Node::fill_rect(Rect::new(rect.right() - width, y, width, len), DASH));
        y += dash * 2.0;
    }
}

pub(super) fn compose(kind: DocumentKind, size: CanvasSize) -> Composition {
    let mut page = VisualTree::new(size, BACKGROUND);
    let bounds = page.bounds();
    dashed(&mut page, bounds.inset(40.0), 16.0, 3.0);
    let center = bounds.center();
    page.push(text(kind_label(kind), center.x, center.y - 60.0, 20.0, DASH).center());
    page.push(text(PROMPT, center.x, center.y - 20.0, 40.0, Color::rgb(0x4b, 0x55, 0x63)).bold().center());
    Composition::single(page)
}
