//! Monthly campaign report layouts.
//!
//! All three variants read the same figures: totals (reach, clicks,
//! conversions, bookings, spend, CTR) and optional weekly series. When a
//! weekly series is missing it is synthesized from the monthly total and the
//! chart gets a visible caption saying so.

use serde::Serialize;

use super::Composition;
use super::payload::{WEEKLY_CLICK_WEIGHTS, WEEKLY_REACH_WEIGHTS, synthesize};
use super::slots::{PLACEHOLDER_IMAGE, ResolvedSlots, SlotDef, SlotKind};
use super::theme::{Theme, kpi_tile, rule, text};
use crate::chart::bar::BarChart;
use crate::chart::line::LineChart;
use crate::chart::pie::Donut;
use crate::chart::{ChartSeries, DualSeries, color_at, format_number, legend};
use crate::config::CanvasSize;
use crate::scene::{Color, Node, Point, Rect, VisualTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportVariant {
    Classic,
    Modern,
    Slide,
}

pub(super) const SLOTS: &[SlotDef] = &[
    SlotDef::new("client_name", SlotKind::Text, "Klient"),
    SlotDef::new("report_title", SlotKind::Text, "Raport miesięczny"),
    SlotDef::new("period", SlotKind::Text, "—"),
    SlotDef::new("agency_name", SlotKind::Text, "Agencja"),
    SlotDef::new("logo_url", SlotKind::Image, PLACEHOLDER_IMAGE),
    SlotDef::new("reach", SlotKind::Number, "0"),
    SlotDef::new("clicks", SlotKind::Number, "0"),
    SlotDef::new("conversions", SlotKind::Number, "0"),
    SlotDef::new("bookings", SlotKind::Number, "0"),
    SlotDef::new("spend", SlotKind::Number, "0"),
    SlotDef::new("ctr", SlotKind::Number, "0"),
    SlotDef::new("weekly_reach_data", SlotKind::Series, "auto"),
    SlotDef::new("weekly_clicks_data", SlotKind::Series, "auto"),
    SlotDef::new("summary", SlotKind::Text, "Brak podsumowania dla tego okresu."),
];

/// Caption placed under any chart built from synthesized weekly data.
pub const ESTIMATED_CAPTION: &str = "* Rozkład tygodniowy oszacowany na podstawie sum miesięcznych";

const REACH_LABEL: &str = "Zasięg";
const CLICKS_LABEL: &str = "Kliknięcia";

/// Figures shared by every report layout.
struct Figures<'a> {
    title: &'a str,
    client: &'a str,
    period: &'a str,
    agency: &'a str,
    logo: &'a str,
    summary: &'a str,
    reach: f64,
    clicks: f64,
    conversions: f64,
    bookings: f64,
    spend: f64,
    ctr: f64,
    weekly: DualSeries,
    weekly_clicks: ChartSeries,
    conversion_split: ChartSeries,
    estimated: bool,
}

impl<'a> Figures<'a> {
    fn gather(slots: &'a ResolvedSlots, notes: &mut Vec<String>) -> Self {
        let reach = slots.number("reach");
        let clicks = slots.number("clicks");
        let conversions = slots.number("conversions");
        let bookings = slots.number("bookings");

        let mut estimated = false;
        let weekly_reach = slots.series("weekly_reach_data").unwrap_or_else(|| {
            estimated = true;
            notes.push("weekly reach estimated from the monthly total".to_string());
            synthesize(reach, &WEEKLY_REACH_WEIGHTS)
        });
        let weekly_clicks = slots.series("weekly_clicks_data").unwrap_or_else(|| {
            estimated = true;
            notes.push("weekly clicks estimated from the monthly total".to_string());
            synthesize(clicks, &WEEKLY_CLICK_WEIGHTS)
        });

        let weeks: Vec<String> = (1..=weekly_reach.len().max(weekly_clicks.len()))
            .map(|i| format!("Tydz. {}", i))
            .collect();
        let ctr = if slots.is_supplied("ctr") {
            slots.number("ctr")
        } else if reach > 0.0 {
            clicks / reach * 100.0
        } else {
            0.0
        };

        Self {
            title: slots.text("report_title"),
            client: slots.text("client_name"),
            period: slots.text("period"),
            agency: slots.text("agency_name"),
            logo: slots.text("logo_url"),
            summary: slots.text("summary"),
            reach,
            clicks,
            conversions,
            bookings,
            spend: slots.number("spend"),
            ctr,
            weekly_clicks: ChartSeries::from_pairs(weeks.clone(), &weekly_clicks),
            weekly: DualSeries::new(weeks, [REACH_LABEL, CLICKS_LABEL], &weekly_reach, &weekly_clicks),
            conversion_split: ChartSeries::new()
                .entry("Rezerwacje", bookings)
                .entry("Pozostałe konwersje", (conversions - bookings).max(0.0)),
            estimated,
        }
    }

    fn kpis(&self) -> [(&'static str, String); 4] {
        [
            (REACH_LABEL, format_number(self.reach)),
            (CLICKS_LABEL, format_number(self.clicks)),
            ("CTR", format!("{}%", format_number((self.ctr * 10.0).round() / 10.0))),
            ("Budżet", format!("{} zł", format_number(self.spend))),
        ]
    }

    fn booking_line(&self) -> String {
        format!(
            "Rezerwacje: {} z {} konwersji",
            format_number(self.bookings),
            format_number(self.conversions)
        )
    }
}

fn trend_legend(at: Point, size: f64, color: Color) -> Vec<Node> {
    legend(&[(REACH_LABEL, color_at(0)), (CLICKS_LABEL, color_at(1))], at, size, color)
}

fn split_legend(figures: &Figures, at: Point, size: f64, color: Color) -> Vec<Node> {
    let labels: Vec<&str> = figures.conversion_split.labels().collect();
    let entries: Vec<(&str, Color)> = labels.iter().enumerate().map(|(i, l)| (*l, color_at(i))).collect();
    legend(&entries, at, size, color)
}

pub(super) fn compose(variant: ReportVariant, slots: &ResolvedSlots, size: CanvasSize) -> Composition {
    let mut notes = Vec::new();
    let figures = Figures::gather(slots, &mut notes);
    let page = match variant {
        ReportVariant::Classic => classic(&figures, size),
        ReportVariant::Modern => modern(&figures, size),
        ReportVariant::Slide => slide(&figures, size),
    };
    Composition { pages: vec![page], notes }
}

// ============================================================================
// CLASSIC
// ============================================================================

fn classic(f: &Figures, size: CanvasSize) -> VisualTree {
    let theme = Theme::PAPER;
    let mut page = theme.page(size);
    let w = size.width as f64;
    let margin = 48.0;
    let content = w - 2.0 * margin;

    page.push(Node::fill_rect(Rect::new(0.0, 0.0, w, 150.0), theme.accent));
    page.push(text(f.title, margin, 36.0, 32.0, theme.on_accent).bold());
    page.push(text(f.client, margin, 80.0, 20.0, theme.on_accent));
    page.push(text(f.period, margin, 110.0, 16.0, theme.on_accent.with_alpha(200)));
    page.push(Node::image(Rect::new(w - margin - 80.0, 35.0, 80.0, 80.0), f.logo));

    let gap = 16.0;
    let tile_w = (content - 3.0 * gap) / 4.0;
    for (i, (label, value)) in f.kpis().iter().enumerate() {
        let rect = Rect::new(margin + i as f64 * (tile_w + gap), 180.0, tile_w, 96.0);
        kpi_tile(&mut page, rect, label, value, &theme);
    }

    page.push(text("Zasięg i kliknięcia tygodniowo", margin, 310.0, 20.0, theme.ink).bold());
    page.extend(trend_legend(Point::new(margin, 342.0), 14.0, theme.muted));
    page.extend(
        LineChart::new(Rect::new(72.0, 380.0, w - 144.0, 220.0))
            .text_color(theme.muted)
            .grid_color(theme.rule)
            .to_nodes(&f.weekly),
    );
    if f.estimated {
        page.push(text(ESTIMATED_CAPTION, margin, 640.0, 12.0, theme.muted));
    }

    page.push(text("Konwersje", margin, 690.0, 20.0, theme.ink).bold());
    page.extend(Donut::new(Point::new(210.0, 830.0), 100.0, 64.0).to_nodes(&f.conversion_split));
    page.push(text(f.booking_line(), 210.0, 945.0, 14.0, theme.muted).center());

    page.push(text("Kliknięcia tygodniowo", 440.0, 690.0, 20.0, theme.ink).bold());
    page.extend(
        BarChart::new(Rect::new(440.0, 740.0, w - 440.0 - margin - 16.0, 180.0))
            .text_color(theme.muted)
            .uniform(color_at(1))
            .to_nodes(&f.weekly_clicks),
    );

    page.push(text("Podsumowanie", margin, 980.0, 18.0, theme.ink).bold());
    page.push(text(f.summary, margin, 1006.0, 14.0, theme.ink).wrap(content));

    page.push(rule(margin, 1075.0, content, theme.rule));
    page.push(text(f.agency, margin, 1085.0, 12.0, theme.muted));
    page.push(text(f.period, w - margin, 1085.0, 12.0, theme.muted).right());
    page
}

// ============================================================================
// MODERN
// ============================================================================

fn modern(f: &Figures, size: CanvasSize) -> VisualTree {
    let theme = Theme::NIGHT;
    let mut page = theme.page(size);
    let w = size.width as f64;
    let margin = 48.0;
    let content = w - 2.0 * margin;

    page.push(text(f.client, margin, 48.0, 36.0, theme.ink).bold().wrap(content - 100.0));
    page.push(text(format!("{} · {}", f.title, f.period), margin, 100.0, 16.0, theme.muted));
    page.push(Node::image(Rect::new(w - margin - 72.0, 48.0, 72.0, 72.0), f.logo));
    page.push(Node::rounded_rect(Rect::new(margin, 140.0, 120.0, 4.0), theme.accent, 2.0));

    for (i, (label, value)) in f.kpis().iter().enumerate() {
        let rect = Rect::new(margin, 180.0 + i as f64 * 98.0, 250.0, 84.0);
        kpi_tile(&mut page, rect, label, value, &theme);
    }

    let center = Point::new(540.0, 330.0);
    page.extend(
        Donut::new(center, 130.0, 90.0)
            .track(theme.surface)
            .label_color(theme.ink)
            .to_nodes(&f.conversion_split),
    );
    page.push(text(f.booking_line(), center.x, 480.0, 14.0, theme.muted).center());
    page.extend(split_legend(f, Point::new(370.0, 512.0), 14.0, theme.muted));

    page.push(text("Trend tygodniowy", margin, 600.0, 20.0, theme.ink).bold());
    page.extend(trend_legend(Point::new(margin, 632.0), 14.0, theme.muted));
    page.extend(
        LineChart::new(Rect::new(72.0, 670.0, w - 144.0, 200.0))
            .text_color(theme.muted)
            .grid_color(theme.rule)
            .to_nodes(&f.weekly),
    );
    if f.estimated {
        page.push(text(ESTIMATED_CAPTION, margin, 910.0, 12.0, theme.muted));
    }

    let card = Rect::new(margin, 940.0, content, 140.0);
    page.push(Node::rounded_rect(card, theme.surface, 16.0));
    page.push(text("Podsumowanie", card.x + 20.0, card.y + 18.0, 16.0, theme.accent).bold());
    page.push(text(f.summary, card.x + 20.0, card.y + 46.0, 14.0, theme.ink).wrap(card.width - 40.0));
    page.push(text(f.agency, w - margin, 1095.0, 12.0, theme.muted).right());
    page
}

// ============================================================================
// SLIDE
// ============================================================================

fn slide(f: &Figures, size: CanvasSize) -> VisualTree {
    let theme = Theme::PAPER;
    let mut page = theme.page(size);
    let w = size.width as f64;
    let panel = 420.0;

    page.push(Node::fill_rect(Rect::new(0.0, 0.0, panel, size.height as f64), theme.accent));
    page.push(text(f.title, 48.0, 60.0, 24.0, theme.on_accent.with_alpha(200)));
    page.push(text(f.client, 48.0, 100.0, 40.0, theme.on_accent).bold().wrap(panel - 96.0));
    page.push(text(f.period, 48.0, 240.0, 20.0, theme.on_accent.with_alpha(200)));
    for (i, (label, value)) in f.kpis().iter().enumerate() {
        let y = 320.0 + i as f64 * 120.0;
        page.push(text(*label, 48.0, y, 16.0, theme.on_accent.with_alpha(180)));
        page.push(text(value.as_str(), 48.0, y + 24.0, 36.0, theme.on_accent).bold());
    }
    page.push(Node::image(Rect::new(48.0, 800.0, 56.0, 56.0), f.logo));

    let left = panel + 60.0;
    page.push(text("Zasięg i kliknięcia tygodniowo", left, 56.0, 24.0, theme.ink).bold());
    page.extend(trend_legend(Point::new(left, 96.0), 16.0, theme.muted));
    page.extend(
        LineChart::new(Rect::new(left + 20.0, 150.0, w - left - 90.0, 320.0))
            .text_color(theme.muted)
            .grid_color(theme.rule)
            .to_nodes(&f.weekly),
    );
    if f.estimated {
        page.push(text(ESTIMATED_CAPTION, left, 520.0, 14.0, theme.muted));
    }

    page.push(text("Konwersje", left, 560.0, 20.0, theme.ink).bold());
    page.extend(Donut::new(Point::new(left + 220.0, 730.0), 120.0, 80.0).to_nodes(&f.conversion_split));
    page.push(text(f.booking_line(), left + 220.0, 862.0, 14.0, theme.muted).center());

    page.push(text("Kliknięcia tygodniowo", 980.0, 560.0, 20.0, theme.ink).bold());
    page.extend(
        BarChart::new(Rect::new(980.0, 620.0, w - 980.0 - 70.0, 200.0))
            .text_color(theme.muted)
            .uniform(color_at(1))
            .to_nodes(&f.weekly_clicks),
    );
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::payload::Payload;
    use crate::document::slots::resolve;
    use crate::scene::TextNode;
    use pretty_assertions::assert_eq;

    fn slots(payload: Payload) -> ResolvedSlots {
        resolve(SLOTS, &payload)
    }

    fn all_text(page: &VisualTree) -> Vec<String> {
        page.texts().map(str::to_string).collect()
    }

    #[test]
    fn test_synthesized_weeks_are_captioned() {
        let slots = slots(Payload::new().with("reach", 100000).with("clicks", 1000));
        let mut notes = Vec::new();
        let figures = Figures::gather(&slots, &mut notes);
        assert!(figures.estimated);
        assert_eq!(figures.weekly.channels[0], vec![18000.0, 23000.0, 28000.0, 31000.0]);
        assert_eq!(figures.weekly.channels[1], vec![160.0, 220.0, 290.0, 330.0]);
        assert_eq!(notes.len(), 2);

        for variant in [ReportVariant::Classic, ReportVariant::Modern, ReportVariant::Slide] {
            let doc = compose(variant, &slots, CanvasSize::A4_PORTRAIT);
            assert!(all_text(&doc.pages[0]).iter().any(|t| t == ESTIMATED_CAPTION), "{:?}", variant);
        }
    }

    #[test]
    fn test_literal_series_skip_caption() {
        let slots = slots(
            Payload::new()
                .with("weekly_reach_data", "1200,1500,1800,2100,900")
                .with("weeklyClicksData", "12,15,18,21,9"),
        );
        let doc = compose(ReportVariant::Classic, &slots, CanvasSize::A4_PORTRAIT);
        assert!(doc.notes.is_empty());
        let texts = all_text(&doc.pages[0]);
        assert!(!texts.iter().any(|t| t == ESTIMATED_CAPTION));
        assert!(texts.iter().any(|t| t == "Tydz. 5"));
    }

    #[test]
    fn test_conversion_donut_label() {
        let slots = slots(Payload::new().with("conversions", 50).with("bookings", 33));
        let doc = compose(ReportVariant::Modern, &slots, CanvasSize::A4_PORTRAIT);
        let texts = all_text(&doc.pages[0]);
        assert!(texts.iter().any(|t| t == "66%"));
        assert!(texts.iter().any(|t| t == "Rezerwacje: 33 z 50 konwersji"));
    }

    #[test]
    fn test_bookings_above_conversions_do_not_go_negative() {
        let slots = slots(Payload::new().with("conversions", 10).with("bookings", 30));
        let mut notes = Vec::new();
        let figures = Figures::gather(&slots, &mut notes);
        assert_eq!(figures.conversion_split.get(1), Some(("Pozostałe konwersje", 0.0)));
    }

    #[test]
    fn test_ctr_derived_when_absent() {
        let slots = slots(Payload::new().with("reach", 20000).with("clicks", 500));
        let mut notes = Vec::new();
        let figures = Figures::gather(&slots, &mut notes);
        assert_eq!(figures.kpis()[2].1, "2.5%");
    }

    #[test]
    fn test_defaults_fill_every_text() {
        let doc = compose(ReportVariant::Classic, &slots(Payload::new()), CanvasSize::A4_PORTRAIT);
        for node in &doc.pages[0].nodes {
            if let Node::Text(TextNode { content, .. }) = node {
                assert!(!content.trim().is_empty());
            }
        }
        assert_eq!(doc.pages[0].image_sources(), vec![PLACEHOLDER_IMAGE]);
    }
}
