//! Square promotional graphics for social media.
//!
//! Fourteen styles over one set of slots. Brand and accent colors come from
//! the payload (`#rrggbb`), so the same style works for any client.

use serde::Serialize;

use super::Composition;
use super::slots::{PLACEHOLDER_IMAGE, ResolvedSlots, SlotDef, SlotKind};
use super::theme::text;
use crate::config::CanvasSize;
use crate::scene::{Color, GradientStop, Node, Paint, Path, Point, Rect, VisualTree, polar, text_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicVariant {
    Gradient,
    Split,
    Minimal,
    Bold,
    Photo,
    Frame,
    Diagonal,
    Circle,
    Stripes,
    Quote,
    Sale,
    Event,
    Announcement,
    Testimonial,
}

pub(super) const SLOTS: &[SlotDef] = &[
    SlotDef::new("client_name", SlotKind::Text, "Marka"),
    SlotDef::new("headline", SlotKind::Text, "Twój nagłówek"),
    SlotDef::new("subheadline", SlotKind::Text, "Krótki opis oferty lub wydarzenia"),
    SlotDef::new("cta", SlotKind::Text, "Sprawdź"),
    SlotDef::new("handle", SlotKind::Text, "@marka"),
    SlotDef::new("image_url", SlotKind::Image, PLACEHOLDER_IMAGE),
    SlotDef::new("logo_url", SlotKind::Image, PLACEHOLDER_IMAGE),
    SlotDef::new("brand_color", SlotKind::Color, "#6366f1"),
    SlotDef::new("accent_color", SlotKind::Color, "#ec4899"),
    SlotDef::new("price", SlotKind::Text, "99 zł"),
    SlotDef::new("old_price", SlotKind::Text, "149 zł"),
    SlotDef::new("discount", SlotKind::Text, "-30%"),
    SlotDef::new("date", SlotKind::Text, "—"),
    SlotDef::new("location", SlotKind::Text, "—"),
    SlotDef::new("quote", SlotKind::Text, "Najlepsza decyzja, jaką podjęliśmy w tym roku."),
    SlotDef::new("author", SlotKind::Text, "Zadowolony klient"),
];

const DEFAULT_BRAND: Color = Color::rgb(0x63, 0x66, 0xf1);
const DEFAULT_ACCENT: Color = Color::rgb(0xec, 0x48, 0x99);
const INK: Color = Color::rgb(0x11, 0x18, 0x27);

/// Slot values every style reads.
struct Post<'a> {
    headline: &'a str,
    sub: &'a str,
    cta: &'a str,
    handle: &'a str,
    image: &'a str,
    logo: &'a str,
    brand: Color,
    accent: Color,
    slots: &'a ResolvedSlots,
}

impl<'a> Post<'a> {
    fn new(slots: &'a ResolvedSlots) -> Self {
        Self {
            headline: slots.text("headline"),
            sub: slots.text("subheadline"),
            cta: slots.text("cta"),
            handle: slots.text("handle"),
            image: slots.text("image_url"),
            logo: slots.text("logo_url"),
            brand: slots.color("brand_color", DEFAULT_BRAND),
            accent: slots.color("accent_color", DEFAULT_ACCENT),
            slots,
        }
    }

    fn get(&self, key: &str) -> &'a str {
        self.slots.text(key)
    }
}

/// Pill-shaped call-to-action button centered on `x`.
fn button(page: &mut VisualTree, label: &str, x: f64, y: f64, fill: Color, ink: Color) {
    let size = 32.0;
    let width = text_width(label, size) + 96.0;
    page.push(Node::rounded_rect(Rect::new(x - width / 2.0, y, width, 80.0), fill, 40.0));
    page.push(text(label, x, y + 24.0, size, ink).bold().center());
}

fn footer(page: &mut VisualTree, post: &Post, color: Color) {
    page.push(Node::image(Rect::new(60.0, 960.0, 60.0, 60.0), post.logo));
    page.push(text(post.handle, 1020.0, 978.0, 24.0, color).right());
}

pub(super) fn compose(variant: GraphicVariant, slots: &ResolvedSlots, size: CanvasSize) -> Composition {
    let post = Post::new(slots);
    let mut page = VisualTree::new(size, Color::WHITE);
    let draw: fn(&mut VisualTree, &Post) = match variant {
        GraphicVariant::Gradient => gradient,
        GraphicVariant::Split => split,
        GraphicVariant::Minimal => minimal,
        GraphicVariant::Bold => bold,
        GraphicVariant::Photo => photo,
        GraphicVariant::Frame => frame,
        GraphicVariant::Diagonal => diagonal,
        GraphicVariant::Circle => circle,
        GraphicVariant::Stripes => stripes,
        GraphicVariant::Quote => quote,
        GraphicVariant::Sale => sale,
        GraphicVariant::Event => event,
        GraphicVariant::Announcement => announcement,
        GraphicVariant::Testimonial => testimonial,
    };
    draw(&mut page, &post);
    Composition::single(page)
}

// ============================================================================
// STYLES
// ============================================================================

fn gradient(page: &mut VisualTree, post: &Post) {
    let b = page.bounds();
    page.push(Node::Rect {
        rect: b,
        paint: Paint::Linear {
            from: Point::new(0.0, 0.0),
            to: Point::new(b.width, b.height),
            stops: vec![
                GradientStop { offset: 0.0, color: post.brand },
                GradientStop { offset: 1.0, color: post.accent },
            ],
        },
        radius: 0.0,
    });
    page.push(text(post.headline, 540.0, 330.0, 88.0, Color::WHITE).bold().center().wrap(900.0));
    page.push(text(post.sub, 540.0, 560.0, 36.0, Color::WHITE.with_alpha(220)).center().wrap(860.0));
    button(page, post.cta, 540.0, 720.0, Color::WHITE, post.brand);
    footer(page, post, Color::WHITE);
}

fn split(page: &mut VisualTree, post: &Post) {
    page.push(Node::image(Rect::new(0.0, 0.0, 540.0, 1080.0), post.image));
    page.push(Node::fill_rect(Rect::new(540.0, 0.0, 540.0, 1080.0), post.brand));
    page.push(text(post.headline, 600.0, 300.0, 56.0, Color::WHITE).bold().wrap(420.0));
    page.push(text(post.sub, 600.0, 560.0, 28.0, Color::WHITE.with_alpha(220)).wrap(420.0));
    button(page, post.cta, 810.0, 800.0, post.accent, Color::WHITE);
    page.push(text(post.handle, 1020.0, 1000.0, 24.0, Color::WHITE).right());
}

fn minimal(page: &mut VisualTree, post: &Post) {
    page.background = Color::rgb(0xfa, 0xfa, 0xf9);
    page.push(Node::fill_rect(Rect::new(120.0, 360.0, 80.0, 6.0), post.brand));
    page.push(text(post.headline, 120.0, 400.0, 72.0, INK).bold().wrap(840.0));
    page.push(text(post.sub, 120.0, 620.0, 32.0, Color::rgb(0x73, 0x73, 0x73)).wrap(840.0));
    page.push(text(post.cta.to_uppercase(), 120.0, 780.0, 28.0, post.brand).bold());
    footer(page, post, INK);
}

fn bold(page: &mut VisualTree, post: &Post) {
    page.background = post.accent;
    page.push(Node::fill_rect(Rect::new(0.0, 760.0, 1080.0, 320.0), INK));
    page.push(text(post.headline.to_uppercase(), 60.0, 140.0, 120.0, Color::WHITE).bold().wrap(960.0));
    page.push(text(post.sub, 60.0, 820.0, 36.0, Color::WHITE).wrap(700.0));
    button(page, post.cta, 900.0, 830.0, post.brand, Color::WHITE);
}

fn photo(page: &mut VisualTree, post: &Post) {
    let b = page.bounds();
    page.push(Node::image(b, post.image));
    page.push(Node::Rect {
        rect: Rect::new(0.0, 480.0, 1080.0, 600.0),
        paint: Paint::vertical(480.0, 1080.0, Color::BLACK.with_alpha(0), Color::BLACK.with_alpha(220)),
        radius: 0.0,
    });
    page.push(text(post.headline, 60.0, 720.0, 64.0, Color::WHITE).bold().wrap(960.0));
    page.push(text(post.sub, 60.0, 880.0, 30.0, Color::WHITE.with_alpha(220)).wrap(960.0));
    page.push(text(post.handle, 1020.0, 1000.0, 24.0, Color::WHITE).right());
}

fn frame(page: &mut VisualTree, post: &Post) {
    page.background = post.brand;
    page.push(Node::rounded_rect(Rect::new(60.0, 60.0, 960.0, 960.0), Color::WHITE, 24.0));
    page.push(Node::image(Rect::new(100.0, 100.0, 880.0, 500.0), post.image));
    page.push(text(post.headline, 540.0, 640.0, 56.0, INK).bold().center().wrap(840.0));
    page.push(text(post.sub, 540.0, 790.0, 28.0, Color::rgb(0x52, 0x52, 0x5b)).center().wrap(800.0));
    button(page, post.cta, 540.0, 880.0, post.brand, Color::WHITE);
}

fn diagonal(page: &mut VisualTree, post: &Post) {
    page.push(Node::image(Rect::new(0.0, 0.0, 1080.0, 700.0), post.image));
    page.push(Node::fill_path(
        Path::polygon(&[
            Point::new(0.0, 520.0),
            Point::new(1080.0, 380.0),
            Point::new(1080.0, 1080.0),
            Point::new(0.0, 1080.0),
        ]),
        Paint::solid(post.brand),
    ));
    page.push(text(post.headline, 80.0, 600.0, 64.0, Color::WHITE).bold().wrap(920.0));
    page.push(text(post.sub, 80.0, 780.0, 30.0, Color::WHITE.with_alpha(220)).wrap(920.0));
    footer(page, post, Color::WHITE);
}

fn circle(page: &mut VisualTree, post: &Post) {
    page.background = Color::rgb(0xf5, 0xf5, 0xf4);
    let center = Point::new(540.0, 440.0);
    page.push(Node::circle(center, 330.0, post.brand));
    page.push(Node::circle(Point::new(880.0, 140.0), 70.0, post.accent));
    page.push(Node::circle(Point::new(170.0, 760.0), 40.0, post.accent.with_alpha(160)));
    page.push(text(post.headline, 540.0, 340.0, 60.0, Color::WHITE).bold().center().wrap(520.0));
    page.push(text(post.sub, 540.0, 820.0, 30.0, INK).center().wrap(860.0));
    button(page, post.cta, 540.0, 920.0, INK, Color::WHITE);
}

fn stripes(page: &mut VisualTree, post: &Post) {
    page.background = post.brand;
    for i in 0..12 {
        let x = -400.0 + i as f64 * 140.0;
        page.push(Node::fill_path(
            Path::polygon(&[
                Point::new(x, 1080.0),
                Point::new(x + 50.0, 1080.0),
                Point::new(x + 450.0, 0.0),
                Point::new(x + 400.0, 0.0),
            ]),
            Paint::solid(Color::WHITE.with_alpha(28)),
        ));
    }
    page.push(Node::rounded_rect(Rect::new(90.0, 320.0, 900.0, 440.0), Color::WHITE, 20.0));
    page.push(text(post.headline, 540.0, 380.0, 60.0, INK).bold().center().wrap(820.0));
    page.push(text(post.sub, 540.0, 560.0, 28.0, Color::rgb(0x52, 0x52, 0x5b)).center().wrap(800.0));
    page.push(text(post.cta.to_uppercase(), 540.0, 680.0, 30.0, post.accent).bold().center());
    footer(page, post, Color::WHITE);
}

fn quote(page: &mut VisualTree, post: &Post) {
    page.background = INK;
    page.push(text("\u{201e}", 100.0, 90.0, 200.0, post.accent).bold());
    page.push(text(post.get("quote"), 100.0, 330.0, 52.0, Color::WHITE).wrap(880.0));
    page.push(Node::fill_rect(Rect::new(100.0, 800.0, 80.0, 4.0), post.accent));
    page.push(text(post.get("author"), 100.0, 830.0, 30.0, Color::WHITE.with_alpha(200)).bold());
    footer(page, post, Color::WHITE.with_alpha(200));
}

fn sale(page: &mut VisualTree, post: &Post) {
    page.background = post.brand;
    // starburst badge
    let center = Point::new(800.0, 280.0);
    let points: Vec<Point> = (0..32)
        .map(|i| polar(center, if i % 2 == 0 { 200.0 } else { 165.0 }, i as f64 * 360.0 / 32.0))
        .collect();
    page.push(Node::fill_path(Path::polygon(&points), Paint::solid(post.accent)));
    page.push(text(post.get("discount"), center.x, center.y - 40.0, 80.0, Color::WHITE).bold().center());
    page.push(text(post.headline, 80.0, 520.0, 72.0, Color::WHITE).bold().wrap(920.0));
    page.push(text(post.get("old_price"), 80.0, 720.0, 40.0, Color::WHITE.with_alpha(160)));
    let strike_w = text_width(post.get("old_price"), 40.0);
    page.push(Node::fill_rect(Rect::new(76.0, 739.0, strike_w + 8.0, 3.0), Color::WHITE.with_alpha(160)));
    page.push(text(post.get("price"), 80.0, 780.0, 96.0, Color::WHITE).bold());
    footer(page, post, Color::WHITE);
}

fn event(page: &mut VisualTree, post: &Post) {
    page.background = Color::WHITE;
    page.push(Node::image(Rect::new(0.0, 0.0, 1080.0, 540.0), post.image));
    let card = Rect::new(80.0, 440.0, 220.0, 200.0);
    page.push(Node::rounded_rect(card, post.brand, 16.0));
    page.push(text(post.get("date"), card.center().x, card.y + 76.0, 44.0, Color::WHITE).bold().center());
    page.push(text(post.headline, 340.0, 580.0, 56.0, INK).bold().wrap(680.0));
    page.push(text(post.get("location"), 80.0, 720.0, 32.0, post.brand).bold());
    page.push(text(post.sub, 80.0, 780.0, 28.0, Color::rgb(0x52, 0x52, 0x5b)).wrap(920.0));
    button(page, post.cta, 540.0, 900.0, post.accent, Color::WHITE);
}

fn announcement(page: &mut VisualTree, post: &Post) {
    page.background = post.accent;
    page.push(Node::rounded_rect(Rect::new(80.0, 120.0, 380.0, 72.0), Color::WHITE, 36.0));
    page.push(text("OGŁOSZENIE", 270.0, 140.0, 32.0, post.accent).bold().center());
    page.push(text(post.headline, 80.0, 300.0, 84.0, Color::WHITE).bold().wrap(920.0));
    page.push(text(post.sub, 80.0, 640.0, 34.0, Color::WHITE.with_alpha(230)).wrap(920.0));
    page.push(Node::stroke_path(
        Path::new().move_to(Point::new(80.0, 860.0)).line_to(Point::new(1000.0, 860.0)),
        Color::WHITE.with_alpha(120),
        2.0,
    ));
    footer(page, post, Color::WHITE);
}

fn testimonial(page: &mut VisualTree, post: &Post) {
    page.background = Color::rgb(0xf8, 0xfa, 0xfc);
    page.push(Node::rounded_rect(Rect::new(80.0, 160.0, 920.0, 700.0), Color::WHITE, 32.0));
    page.push(Node::circle(Point::new(540.0, 160.0), 84.0, post.brand));
    page.push(Node::image(Rect::new(476.0, 96.0, 128.0, 128.0), post.image));
    // five stars
    for i in 0..5 {
        let center = Point::new(380.0 + i as f64 * 80.0, 330.0);
        let star: Vec<Point> = (0..10)
            .map(|k| polar(center, if k % 2 == 0 { 28.0 } else { 12.0 }, -90.0 + k as f64 * 36.0))
            .collect();
        page.push(Node::fill_path(Path::polygon(&star), Paint::solid(Color::rgb(0xf5, 0x9e, 0x0b))));
    }
    page.push(text(post.get("quote"), 540.0, 420.0, 40.0, INK).center().wrap(800.0));
    page.push(text(post.get("author"), 540.0, 740.0, 30.0, post.brand).bold().center());
    footer(page, post, INK);
}
