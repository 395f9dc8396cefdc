//! Six-slide agency pitch presentations.
//!
//! | # | Slide | Content slots |
//! |---|-------|---------------|
//! | 1 | Title | `title`, `subtitle`, `client_name`, `date` |
//! | 2 | About us | `about`, `image_url` |
//! | 3 | Goals | `goals` (list) |
//! | 4 | Strategy | `strategy` (list) |
//! | 5 | Budget | `budget_total`, `budget_split`, `budget_labels` |
//! | 6 | Contact | `contact_email`, `contact_phone`, `agency_name` |
//!
//! Each variant owns its slide frame (background, heading, decoration) and
//! hands back the content area; the slide bodies are shared.

use serde::Serialize;

use super::Composition;
use super::slots::{PLACEHOLDER_IMAGE, ResolvedSlots, SlotDef, SlotKind};
use super::theme::{Theme, rule, text};
use crate::chart::bar::BarChart;
use crate::chart::pie::Donut;
use crate::chart::{ChartSeries, color_at, format_number, legend};
use crate::config::CanvasSize;
use crate::scene::{Node, Paint, Path, Point, Rect, VisualTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationVariant {
    Corporate,
    Bold,
    Minimal,
}

pub(super) const SLOTS: &[SlotDef] = &[
    SlotDef::new("title", SlotKind::Text, "Strategia marketingowa"),
    SlotDef::new("subtitle", SlotKind::Text, "Propozycja współpracy"),
    SlotDef::new("client_name", SlotKind::Text, "Klient"),
    SlotDef::new("agency_name", SlotKind::Text, "Agencja"),
    SlotDef::new("date", SlotKind::Text, "—"),
    SlotDef::new(
        "about",
        SlotKind::Text,
        "Jesteśmy zespołem specjalistów od marketingu internetowego. Łączymy kreatywność z analizą danych.",
    ),
    SlotDef::new("image_url", SlotKind::Image, PLACEHOLDER_IMAGE),
    SlotDef::new(
        "goals",
        SlotKind::Text,
        "Zwiększenie rozpoznawalności marki; Wzrost liczby zapytań; Budowa zaangażowanej społeczności",
    ),
    SlotDef::new(
        "strategy",
        SlotKind::Text,
        "Regularne publikacje w mediach społecznościowych; Kampanie płatne z precyzyjnym targetowaniem; Comiesięczna analiza wyników",
    ),
    SlotDef::new("budget_total", SlotKind::Number, "10000"),
    SlotDef::new("budget_split", SlotKind::Series, "40,30,20,10"),
    SlotDef::new("budget_labels", SlotKind::Text, "Social media,Google Ads,Treści,Analityka"),
    SlotDef::new("contact_email", SlotKind::Text, "kontakt@agencja.pl"),
    SlotDef::new("contact_phone", SlotKind::Text, "—"),
];

/// Number of slides every variant produces.
pub const SLIDE_COUNT: usize = 6;

const HEADINGS: [&str; SLIDE_COUNT] = ["", "O nas", "Cele", "Strategia", "Budżet", "Kontakt"];

/// A variant's slide frame: draws the background and heading of slide
/// `index`, returns the theme and content area.
type Frame = fn(&mut VisualTree, usize, &str) -> (Theme, Rect);

pub(super) fn compose(variant: PresentationVariant, slots: &ResolvedSlots, size: CanvasSize) -> Composition {
    let frame: Frame = match variant {
        PresentationVariant::Corporate => corporate_frame,
        PresentationVariant::Bold => bold_frame,
        PresentationVariant::Minimal => minimal_frame,
    };
    let pages = (0..SLIDE_COUNT)
        .map(|index| {
            let mut slide = VisualTree::new(size, Theme::PAPER.background);
            let (theme, area) = frame(&mut slide, index, HEADINGS[index]);
            match index {
                0 => title_slide(&mut slide, slots, &theme, area),
                1 => about_slide(&mut slide, slots, &theme, area),
                2 => list_slide(&mut slide, slots.list("goals"), &theme, area),
                3 => list_slide(&mut slide, slots.list("strategy"), &theme, area),
                4 => budget_slide(&mut slide, slots, &theme, area),
                _ => contact_slide(&mut slide, slots, &theme, area),
            }
            slide
        })
        .collect();
    Composition {
        pages,
        notes: Vec::new(),
    }
}

// ============================================================================
// FRAMES
// ============================================================================

fn corporate_frame(slide: &mut VisualTree, index: usize, heading: &str) -> (Theme, Rect) {
    let theme = Theme::PAPER;
    let bounds = slide.bounds();
    slide.background = theme.background;
    if index == 0 {
        slide.background = theme.accent;
        slide.push(Node::fill_rect(Rect::new(0.0, bounds.bottom() - 24.0, bounds.width, 24.0), color_at(4)));
        let inverted = Theme {
            background: theme.accent,
            ink: theme.on_accent,
            muted: theme.on_accent.with_alpha(190),
            ..theme
        };
        return (inverted, bounds.inset(120.0));
    }
    slide.push(Node::fill_rect(Rect::new(0.0, 0.0, bounds.width, 140.0), theme.accent));
    slide.push(text(heading, 96.0, 46.0, 48.0, theme.on_accent).bold());
    slide.push(text(format!("{} / {}", index + 1, SLIDE_COUNT), bounds.width - 96.0, 60.0, 20.0, theme.on_accent).right());
    (theme, Rect::new(96.0, 200.0, bounds.width - 192.0, bounds.height - 280.0))
}

fn bold_frame(slide: &mut VisualTree, index: usize, heading: &str) -> (Theme, Rect) {
    let theme = Theme::VIVID;
    let bounds = slide.bounds();
    slide.background = theme.background;
    slide.push(Node::circle(Point::new(bounds.width - 120.0, 120.0), 260.0, theme.surface));
    slide.push(Node::circle(Point::new(140.0, bounds.bottom() - 60.0), 140.0, theme.accent.with_alpha(60)));
    if index == 0 {
        return (theme, bounds.inset(120.0));
    }
    slide.push(text(heading.to_uppercase(), 96.0, 72.0, 72.0, theme.accent).bold());
    (theme, Rect::new(96.0, 220.0, bounds.width - 192.0, bounds.height - 300.0))
}

fn minimal_frame(slide: &mut VisualTree, index: usize, heading: &str) -> (Theme, Rect) {
    let theme = Theme::MONO;
    let bounds = slide.bounds();
    slide.background = theme.background;
    slide.push(Node::fill_rect(Rect::new(96.0, 96.0, 64.0, 4.0), color_at(0)));
    slide.push(text(format!("{:02}", index + 1), bounds.width - 96.0, bounds.height - 96.0, 18.0, theme.muted).right());
    if index == 0 {
        return (theme, Rect::new(96.0, 200.0, bounds.width - 192.0, bounds.height - 400.0));
    }
    slide.push(text(heading, 96.0, 124.0, 40.0, theme.ink));
    (theme, Rect::new(96.0, 230.0, bounds.width - 192.0, bounds.height - 330.0))
}

// ============================================================================
// SLIDES
// ============================================================================

fn title_slide(slide: &mut VisualTree, slots: &ResolvedSlots, theme: &Theme, area: Rect) {
    slide.push(text(slots.text("title"), area.x, area.y + 80.0, 72.0, theme.ink).bold().wrap(area.width));
    slide.push(text(slots.text("subtitle"), area.x, area.y + 260.0, 32.0, theme.muted).wrap(area.width));
    slide.push(rule(area.x, area.y + 330.0, 160.0, theme.muted));
    slide.push(text(
        format!("dla: {}", slots.text("client_name")),
        area.x,
        area.y + 360.0,
        28.0,
        theme.ink,
    ));
    slide.push(text(
        format!("{} · {}", slots.text("agency_name"), slots.text("date")),
        area.x,
        area.y + 404.0,
        20.0,
        theme.muted,
    ));
}

fn about_slide(slide: &mut VisualTree, slots: &ResolvedSlots, theme: &Theme, area: Rect) {
    let column = area.width * 0.55;
    slide.push(text(slots.text("about"), area.x, area.y, 28.0, theme.ink).wrap(column - 40.0));
    let image = Rect::new(area.x + column, area.y, area.width - column, area.height);
    slide.push(Node::image(image, slots.text("image_url")));
}

fn list_slide(slide: &mut VisualTree, items: Vec<&str>, theme: &Theme, area: Rect) {
    let step = (area.height / items.len().max(1) as f64).min(110.0);
    for (i, item) in items.iter().enumerate() {
        let y = area.y + i as f64 * step;
        let color = color_at(i);
        slide.push(Node::circle(Point::new(area.x + 24.0, y + 20.0), 24.0, color));
        slide.push(text((i + 1).to_string(), area.x + 24.0, y + 8.0, 24.0, theme.background).bold().center());
        slide.push(text(*item, area.x + 72.0, y + 4.0, 32.0, theme.ink).wrap(area.width - 72.0));
    }
}

/// Budget split: percentages from `budget_split` applied to `budget_total`.
fn budget_series(slots: &ResolvedSlots) -> (ChartSeries, ChartSeries) {
    let total = slots.number("budget_total");
    let split = slots
        .series("budget_split")
        .unwrap_or_else(|| vec![40.0, 30.0, 20.0, 10.0]);
    let labels: Vec<&str> = slots.text("budget_labels").split(',').map(str::trim).collect();
    let label = |i: usize| labels.get(i).copied().filter(|l| !l.is_empty()).map_or_else(|| format!("Pozycja {}", i + 1), str::to_string);

    let share_sum: f64 = split.iter().map(|v| v.max(0.0)).sum();
    let mut shares = ChartSeries::new();
    let mut amounts = ChartSeries::new();
    for (i, &share) in split.iter().enumerate() {
        shares = shares.entry(label(i), share);
        let amount = if share_sum > 0.0 { (total * share.max(0.0) / share_sum).round() } else { 0.0 };
        amounts = amounts.entry(label(i), amount);
    }
    (shares, amounts)
}

fn budget_slide(slide: &mut VisualTree, slots: &ResolvedSlots, theme: &Theme, area: Rect) {
    let (shares, amounts) = budget_series(slots);
    let radius = (area.height / 2.0 - 40.0).min(220.0);
    let center = Point::new(area.x + radius, area.y + radius);
    slide.extend(
        Donut::new(center, radius, radius * 0.62)
            .track(theme.surface)
            .label_color(theme.ink)
            .to_nodes(&shares),
    );
    let labels: Vec<&str> = shares.labels().collect();
    let entries: Vec<_> = labels.iter().enumerate().map(|(i, l)| (*l, color_at(i))).collect();
    slide.extend(legend(&entries, Point::new(area.x, area.y + 2.0 * radius + 24.0), 18.0, theme.muted));

    let plot_x = area.x + 2.0 * radius + 120.0;
    let plot = Rect::new(plot_x, area.y + 50.0, area.right() - plot_x, area.height - 110.0);
    slide.push(text(
        format!("Budżet miesięczny: {} zł", format_number(slots.number("budget_total"))),
        plot.x,
        area.y,
        24.0,
        theme.ink,
    ).bold());
    slide.extend(BarChart::new(plot).text_color(theme.muted).to_nodes(&amounts));
}

fn contact_slide(slide: &mut VisualTree, slots: &ResolvedSlots, theme: &Theme, area: Rect) {
    let center = area.center();
    slide.push(text("Dziękujemy!", center.x, area.y + 20.0, 80.0, theme.ink).bold().center());
    // envelope glyph
    let icon = Rect::new(center.x - 40.0, area.y + 150.0, 80.0, 56.0);
    slide.push(Node::rounded_rect(icon, color_at(0), 6.0));
    slide.push(Node::stroke_path(
        Path::polyline(&[
            Point::new(icon.x, icon.y),
            Point::new(center.x, icon.y + 32.0),
            Point::new(icon.right(), icon.y),
        ]),
        theme.background,
        4.0,
    ));
    slide.push(text(slots.text("contact_email"), center.x, area.y + 240.0, 32.0, theme.ink).center());
    slide.push(text(slots.text("contact_phone"), center.x, area.y + 290.0, 28.0, theme.muted).center());
    slide.push(Node::fill_path(
        Path::polygon(&[
            Point::new(center.x - 80.0, area.y + 350.0),
            Point::new(center.x + 80.0, area.y + 350.0),
            Point::new(center.x + 80.0, area.y + 354.0),
            Point::new(center.x - 80.0, area.y + 354.0),
        ]),
        Paint::solid(theme.muted),
    ));
    slide.push(text(slots.text("agency_name"), center.x, area.y + 380.0, 28.0, theme.ink).bold().center());
}
