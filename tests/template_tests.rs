//! # Template Tests
//!
//! End-to-end checks of payload → rendered document, through the public API
//! only: chart geometry, slot resolution, variant lookup and page layout.

use pretty_assertions::assert_eq;
use vizdoc::CanvasSize;
use vizdoc::chart::{ChartSeries, DualSeries, bar, line, pie};
use vizdoc::document::payload::{WEEKLY_CLICK_WEIGHTS, WEEKLY_REACH_WEIGHTS, parse_number, synthesize};
use vizdoc::document::{DocumentKind, Payload, registry, render, render_template};
use vizdoc::scene::{Node, Rect, VisualTree};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn texts(page: &VisualTree) -> Vec<&str> {
    page.texts().collect()
}

fn report_payload() -> Payload {
    Payload::new()
        .with("client_name", "Hotel Mewa")
        .with("period", "2024-05")
        .with("reach", "100 000")
        .with("clicks", 4000)
        .with("conversions", 50)
        .with("bookings", 33)
        .with("spend", "2 500")
}

// ============================================================================
// CHART GEOMETRY
// ============================================================================

#[test]
fn test_pie_spans_sum_to_full_circle() {
    let series = ChartSeries::from_pairs(["a", "b", "c", "d"], &[3.0, 1.0, 0.0, 7.5]);
    let segments = pie::segments(&series);
    assert_eq!(segments.len(), 4);
    let total: f64 = segments.iter().map(|s| s.span()).sum();
    assert!((total - 360.0).abs() < 1e-9);
    assert_eq!(segments[0].start_angle, -90.0);
    for pair in segments.windows(2) {
        assert!((pair[0].end_angle - pair[1].start_angle).abs() < 1e-9);
    }
}

#[test]
fn test_bookings_share_of_conversions() {
    let series = ChartSeries::from_pairs(["Rezerwacje", "Pozostałe"], &[33.0, 17.0]);
    let segments = pie::segments(&series);
    assert!((segments[0].span() - 237.6).abs() < 1e-9);
    assert_eq!(pie::center_label(&series), "66%");
}

#[test]
fn test_zero_total_pie() {
    let series = ChartSeries::from_pairs(["a", "b"], &[0.0, 0.0]);
    assert_eq!(pie::center_label(&series), "0%");
    assert!(pie::segments(&series).iter().all(|s| s.span() == 0.0));
}

#[test]
fn test_bars_fit_their_plot() {
    let plot = Rect::new(0.0, 0.0, 300.0, 120.0);
    let values: Vec<f64> = (0..40).map(|i| (i * 37 % 11) as f64).collect();
    let labels: Vec<String> = (0..40).map(|i| i.to_string()).collect();
    let series = ChartSeries::from_pairs(labels, &values);
    let gap = 6.0;
    let bars = bar::layout(&series, plot, gap);
    assert_eq!(bars.len(), 40);
    let width = bars[0].rect.width;
    assert!(bars.len() as f64 * (width + bars_gap(&bars)) <= plot.width + 1e-6);
    for b in &bars {
        assert!(b.rect.height >= 2.0 && b.rect.height <= plot.height);
    }
}

/// Effective gap between neighbouring bars.
fn bars_gap(bars: &[bar::Bar]) -> f64 {
    match bars {
        [a, b, ..] => b.rect.x - a.rect.right(),
        _ => 0.0,
    }
}

#[test]
fn test_dual_line_channels_peak_at_plot_top() {
    let plot = Rect::new(10.0, 20.0, 400.0, 200.0);
    let labels = (1..=4).map(|i| format!("Tydz. {}", i)).collect();
    let series = DualSeries::new(labels, ["Zasięg", "Kliknięcia"], &[1.0, 9.0, 3.0, 2.0], &[400.0, 100.0, 50.0, 10.0]);
    let dual = line::layout(&series, plot);
    for channel in &dual.channels {
        let top = channel.points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        assert!((top - plot.y).abs() < 1e-9);
    }
}

// ============================================================================
// PAYLOADS
// ============================================================================

#[test]
fn test_weekly_synthesis() {
    assert_eq!(synthesize(100000.0, &WEEKLY_REACH_WEIGHTS), vec![18000.0, 23000.0, 28000.0, 31000.0]);
    assert_eq!(synthesize(1000.0, &WEEKLY_CLICK_WEIGHTS), vec![160.0, 220.0, 290.0, 330.0]);
}

#[test]
fn test_malformed_numbers_are_zero() {
    assert_eq!(parse_number("abc"), 0.0);
    assert_eq!(parse_number("12 500"), 12500.0);
    assert_eq!(parse_number(""), 0.0);
}

// ============================================================================
// DOCUMENTS
// ============================================================================

#[test]
fn test_report_marks_estimated_weeks() {
    let doc = render(DocumentKind::Report, "classic", &report_payload());
    assert!(!doc.fallback);
    assert_eq!(doc.notes.len(), 2);
    assert_eq!(doc.period.as_deref(), Some("2024-05"));
    assert_eq!(doc.client, "Hotel Mewa");
    let page = texts(&doc.pages[0]);
    assert!(page.contains(&"Tydz. 1"));
    assert!(page.contains(&"66%"));
}

#[test]
fn test_literal_series_are_not_estimated() {
    let payload = report_payload()
        .with("weekly_reach_data", "10,20,30,40")
        .with("weekly_clicks_data", "1,2,3,4");
    let doc = render(DocumentKind::Report, "modern", &payload);
    assert!(doc.notes.is_empty());
}

#[test]
fn test_every_slot_resolves_to_visible_text() {
    for def in registry::TEMPLATES {
        let doc = render_template(def, &Payload::new());
        for page in &doc.pages {
            for text in page.texts() {
                assert!(!text.trim().is_empty(), "{} {} has blank text", def.kind, def.id);
            }
        }
    }
}

#[test]
fn test_variant_counts_and_sizes() {
    let count = |kind| registry::variants(kind).count();
    assert_eq!(count(DocumentKind::Report), 3);
    assert_eq!(count(DocumentKind::Contract), 3);
    assert_eq!(count(DocumentKind::Presentation), 3);
    assert_eq!(count(DocumentKind::Graphic), 14);
    for def in registry::variants(DocumentKind::Graphic) {
        assert_eq!(def.size, CanvasSize::SQUARE_POST);
    }
}

#[test]
fn test_presentation_has_six_slides() {
    for id in ["corporate", "bold", "minimal"] {
        let doc = render(DocumentKind::Presentation, id, &Payload::new());
        assert_eq!(doc.page_count(), 6, "{}", id);
        assert!(doc.pages.iter().all(|p| p.size == CanvasSize::SLIDE_16_9));
    }
}

#[test]
fn test_unknown_variant_renders_placeholder() {
    for kind in DocumentKind::ALL {
        let doc = render(kind, "does-not-exist", &Payload::new());
        assert!(doc.fallback);
        assert!(doc.pages[0].texts().any(|t| t == "Wybierz szablon"));
    }
}

#[test]
fn test_long_contract_flows_onto_more_pages() {
    let scope = "Prowadzenie kampanii reklamowych w mediach społecznościowych. ".repeat(200);
    let doc = render(DocumentKind::Contract, "standard", &Payload::new().with("scope", scope));
    assert!(doc.page_count() >= 2);
    for page in &doc.pages {
        for node in &page.nodes {
            if let Node::Text(t) = node {
                assert!(t.at.y + t.block_height() <= page.size.height as f64 + 1e-9);
            }
        }
    }
}

#[test]
fn test_images_are_referenced_not_fetched() {
    let payload = Payload::new().with("image_url", "https://cdn.example/photo.jpg");
    let doc = render(DocumentKind::Graphic, "photo", &payload);
    assert!(doc.image_sources().contains(&"https://cdn.example/photo.jpg"));
}
