//! Service contract layouts.
//!
//! Contracts are the only kind whose length depends on the payload: long
//! scope descriptions flow onto further A4 pages. Blocks that fit on a page
//! are kept together; longer ones continue on the next page line by line.

use serde::Serialize;

use super::Composition;
use super::slots::{PLACEHOLDER_IMAGE, ResolvedSlots, SlotDef, SlotKind};
use super::theme::{Theme, rule, text};
use crate::chart::format_number;
use crate::config::CanvasSize;
use crate::scene::{Color, Node, Rect, TextNode, VisualTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractVariant {
    Standard,
    Minimal,
    Elegant,
}

pub(super) const SLOTS: &[SlotDef] = &[
    SlotDef::new("contract_number", SlotKind::Text, "—"),
    SlotDef::new("contract_date", SlotKind::Text, "—"),
    SlotDef::new("city", SlotKind::Text, "Warszawa"),
    SlotDef::new("agency_name", SlotKind::Text, "Agencja"),
    SlotDef::new("agency_address", SlotKind::Text, "—"),
    SlotDef::new("client_name", SlotKind::Text, "Klient"),
    SlotDef::new("client_address", SlotKind::Text, "—"),
    SlotDef::new(
        "scope",
        SlotKind::Text,
        "Prowadzenie kampanii reklamowych w mediach społecznościowych, przygotowanie materiałów graficznych oraz comiesięczny raport wyników.",
    ),
    SlotDef::new("price", SlotKind::Number, "0"),
    SlotDef::new("payment_terms", SlotKind::Text, "14 dni"),
    SlotDef::new("duration", SlotKind::Text, "czas nieokreślony"),
    SlotDef::new("start_date", SlotKind::Text, "—"),
    SlotDef::new("notes", SlotKind::Text, "—"),
    SlotDef::new("agency_signatory", SlotKind::Text, "—"),
    SlotDef::new("client_signatory", SlotKind::Text, "—"),
    SlotDef::new("logo_url", SlotKind::Image, PLACEHOLDER_IMAGE),
];

const TITLE: &str = "UMOWA O ŚWIADCZENIE USŁUG MARKETINGOWYCH";

/// Numbered sections as `(heading, body)`.
fn sections(slots: &ResolvedSlots) -> Vec<(&'static str, String)> {
    let mut out = vec![
        (
            "Przedmiot umowy",
            format!(
                "Wykonawca zobowiązuje się do świadczenia na rzecz Zleceniodawcy następujących usług: {}",
                slots.text("scope")
            ),
        ),
        (
            "Wynagrodzenie",
            format!(
                "Za wykonanie usług Zleceniodawca zapłaci Wykonawcy wynagrodzenie w wysokości {} zł netto miesięcznie, płatne w terminie {} od dnia doręczenia faktury.",
                format_number(slots.number("price")),
                slots.text("payment_terms")
            ),
        ),
        (
            "Okres obowiązywania",
            format!(
                "Umowa zostaje zawarta na {}, począwszy od dnia {}. Każda ze stron może ją wypowiedzieć z zachowaniem jednomiesięcznego okresu wypowiedzenia.",
                slots.text("duration"),
                slots.text("start_date")
            ),
        ),
        (
            "Poufność",
            "Strony zobowiązują się do zachowania w tajemnicy wszelkich informacji uzyskanych w związku z wykonywaniem umowy, także po jej rozwiązaniu."
                .to_string(),
        ),
    ];
    let mut closing = "W sprawach nieuregulowanych niniejszą umową mają zastosowanie przepisy Kodeksu cywilnego. Umowę sporządzono w dwóch jednobrzmiących egzemplarzach, po jednym dla każdej ze stron.".to_string();
    if slots.is_supplied("notes") {
        closing.push_str("\n\nUstalenia dodatkowe: ");
        closing.push_str(slots.text("notes"));
    }
    out.push(("Postanowienia końcowe", closing));
    out
}

// ============================================================================
// FLOW
// ============================================================================

/// Page decoration drawn on every new page.
type Decorate = fn(&mut VisualTree, &Theme);

/// Top-to-bottom text flow across A4 pages.
struct Flow {
    size: CanvasSize,
    theme: Theme,
    decorate: Decorate,
    margin: f64,
    top: f64,
    bottom: f64,
    y: f64,
    pages: Vec<VisualTree>,
}

impl Flow {
    fn new(size: CanvasSize, theme: Theme, decorate: Decorate, margin: f64) -> Self {
        let mut flow = Self {
            size,
            theme,
            decorate,
            margin,
            top: margin + 16.0,
            bottom: size.height as f64 - margin - 32.0,
            y: margin + 16.0,
            pages: Vec::new(),
        };
        flow.new_page();
        flow
    }

    fn width(&self) -> f64 {
        self.size.width as f64 - 2.0 * self.margin
    }

    fn new_page(&mut self) {
        let mut page = self.theme.page(self.size);
        (self.decorate)(&mut page, &self.theme);
        self.pages.push(page);
        self.y = self.top;
    }

    fn current(&mut self) -> &mut VisualTree {
        if self.pages.is_empty() {
            self.new_page();
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Start a new page unless `height` still fits on this one.
    fn reserve(&mut self, height: f64) {
        if self.y + height > self.bottom && self.y > self.top {
            self.new_page();
        }
    }

    fn block(&mut self, node: TextNode, spacing: f64) {
        let lines = node.lines();
        let line_height = node.size;
        let height = lines.len() as f64 * line_height;
        if height <= self.bottom - self.top {
            self.reserve(height);
        }
        let mut rest: &[String] = &lines;
        loop {
            let room = ((self.bottom - self.y) / line_height).floor().max(0.0) as usize;
            if room == 0 && self.y > self.top {
                self.new_page();
                continue;
            }
            let take = room.max(1).min(rest.len());
            let mut chunk = node.clone();
            chunk.content = rest[..take].join("\n");
            chunk.at.y = self.y;
            self.current().push(chunk);
            self.y += take as f64 * line_height;
            rest = &rest[take..];
            if rest.is_empty() {
                break;
            }
            self.new_page();
        }
        self.y += spacing;
    }

    fn paragraph(&mut self, content: &str, size: f64, spacing: f64) {
        let theme = self.theme;
        let node = text(content, self.margin, 0.0, size, theme.ink).wrap(self.width());
        self.block(node, spacing);
    }

    fn push(&mut self, node: impl Into<Node>) {
        self.current().push(node);
    }

    fn skip(&mut self, height: f64) {
        self.y += height;
    }

    /// Page numbers, drawn once the page count is known.
    fn finish(mut self) -> Vec<VisualTree> {
        let total = self.pages.len();
        let x = self.size.width as f64 / 2.0;
        let y = self.size.height as f64 - self.margin;
        let color = self.theme.muted;
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.push(text(format!("Strona {} z {}", i + 1, total), x, y, 12.0, color).center());
        }
        self.pages
    }
}

fn signatures(flow: &mut Flow, slots: &ResolvedSlots, line_color: Color) {
    flow.reserve(110.0);
    flow.skip(50.0);
    let y = flow.y;
    let half = flow.width() / 2.0;
    let margin = flow.margin;
    let muted = flow.theme.muted;
    let ink = flow.theme.ink;
    for (i, (role, name)) in [
        ("Wykonawca", slots.text("agency_signatory")),
        ("Zleceniodawca", slots.text("client_signatory")),
    ]
    .into_iter()
    .enumerate()
    {
        let x = margin + i as f64 * half + 20.0;
        flow.push(rule(x, y, half - 40.0, line_color));
        flow.push(text(role, x + (half - 40.0) / 2.0, y + 8.0, 12.0, muted).center());
        flow.push(text(name, x + (half - 40.0) / 2.0, y + 26.0, 14.0, ink).center());
    }
    flow.skip(60.0);
}

fn parties_text(slots: &ResolvedSlots) -> [(String, String); 2] {
    [
        (
            format!("Wykonawca: {}", slots.text("agency_name")),
            slots.text("agency_address").to_string(),
        ),
        (
            format!("Zleceniodawca: {}", slots.text("client_name")),
            slots.text("client_address").to_string(),
        ),
    ]
}

pub(super) fn compose(variant: ContractVariant, slots: &ResolvedSlots, size: CanvasSize) -> Composition {
    let pages = match variant {
        ContractVariant::Standard => standard(slots, size),
        ContractVariant::Minimal => minimal(slots, size),
        ContractVariant::Elegant => elegant(slots, size),
    };
    Composition {
        pages,
        notes: Vec::new(),
    }
}

// ============================================================================
// VARIANTS
// ============================================================================

fn standard(slots: &ResolvedSlots, size: CanvasSize) -> Vec<VisualTree> {
    let theme = Theme::PAPER;
    let mut flow = Flow::new(size, theme, |_, _| {}, 56.0);
    let center = size.width as f64 / 2.0;

    flow.push(Node::image(Rect::new(flow.margin, flow.y, 56.0, 56.0), slots.text("logo_url")));
    flow.block(text(TITLE, center, 0.0, 20.0, theme.ink).bold().center(), 8.0);
    flow.block(
        text(format!("nr {}", slots.text("contract_number")), center, 0.0, 14.0, theme.muted).center(),
        4.0,
    );
    flow.block(
        text(
            format!("zawarta w dniu {} w miejscowości {}", slots.text("contract_date"), slots.text("city")),
            center,
            0.0,
            14.0,
            theme.muted,
        )
        .center(),
        28.0,
    );

    let half = (flow.width() - 16.0) / 2.0;
    let y = flow.y;
    for (i, (name, address)) in parties_text(slots).iter().enumerate() {
        let x = flow.margin + i as f64 * (half + 16.0);
        flow.push(Node::rounded_rect(Rect::new(x, y, half, 96.0), theme.surface, 8.0));
        flow.push(text(name.as_str(), x + 14.0, y + 14.0, 14.0, theme.ink).bold().wrap(half - 28.0));
        flow.push(text(address.as_str(), x + 14.0, y + 52.0, 12.0, theme.muted).wrap(half - 28.0));
    }
    flow.skip(96.0 + 28.0);

    for (i, (heading, body)) in sections(slots).iter().enumerate() {
        flow.reserve(16.0 + 10.0 + 14.0 * 2.0);
        flow.block(
            text(format!("§ {}. {}", i + 1, heading), center, 0.0, 16.0, theme.ink).bold().center(),
            10.0,
        );
        flow.paragraph(body, 14.0, 22.0);
    }
    signatures(&mut flow, slots, theme.ink);
    flow.finish()
}

fn minimal(slots: &ResolvedSlots, size: CanvasSize) -> Vec<VisualTree> {
    let theme = Theme::MONO;
    let mut flow = Flow::new(size, theme, |_, _| {}, 64.0);
    let width = flow.width();
    let margin = flow.margin;

    flow.block(text("Umowa", margin, 0.0, 32.0, theme.ink).bold(), 6.0);
    flow.block(
        text(
            format!("{} · {}, {}", slots.text("contract_number"), slots.text("city"), slots.text("contract_date")),
            margin,
            0.0,
            14.0,
            theme.muted,
        ),
        24.0,
    );
    for (name, address) in parties_text(slots) {
        flow.block(text(name, margin, 0.0, 14.0, theme.ink).bold(), 4.0);
        flow.block(text(address, margin, 0.0, 12.0, theme.muted).wrap(width), 14.0);
    }

    for (i, (heading, body)) in sections(slots).iter().enumerate() {
        flow.reserve(1.0 + 14.0 + 14.0 * 2.0 + 20.0);
        let y = flow.y;
        flow.push(rule(margin, y, width, theme.rule));
        flow.skip(14.0);
        flow.block(text(format!("{:02}  {}", i + 1, heading), margin, 0.0, 14.0, theme.muted), 8.0);
        flow.paragraph(body, 14.0, 20.0);
    }
    signatures(&mut flow, slots, theme.rule);
    flow.finish()
}

fn elegant_frame(page: &mut VisualTree, theme: &Theme) {
    let outer = page.bounds().inset(24.0);
    let inner = page.bounds().inset(32.0);
    for (rect, width) in [(outer, 2.0), (inner, 1.0)] {
        page.push(Node::fill_rect(Rect::new(rect.x, rect.y, rect.width, width), theme.accent));
        page.push(Node::fill_rect(Rect::new(rect.x, rect.bottom() - width, rect.width, width), theme.accent));
        page.push(Node::fill_rect(Rect::new(rect.x, rect.y, width, rect.height), theme.accent));
        page.push(Node::fill_rect(Rect::new(rect.right() - width, rect.y, width, rect.height), theme.accent));
    }
}

fn elegant(slots: &ResolvedSlots, size: CanvasSize) -> Vec<VisualTree> {
    let theme = Theme::IVORY;
    let mut flow = Flow::new(size, theme, elegant_frame, 72.0);
    let center = size.width as f64 / 2.0;

    let logo = Rect::new(center - 32.0, flow.y, 64.0, 64.0);
    flow.push(Node::image(logo, slots.text("logo_url")));
    flow.skip(80.0);
    flow.block(text(TITLE, center, 0.0, 18.0, theme.accent).bold().center().wrap(flow.width()), 10.0);
    let ornament_y = flow.y;
    flow.push(rule(center - 60.0, ornament_y, 120.0, theme.accent));
    flow.skip(16.0);
    flow.block(
        text(
            format!(
                "nr {} · {}, {}",
                slots.text("contract_number"),
                slots.text("city"),
                slots.text("contract_date")
            ),
            center,
            0.0,
            13.0,
            theme.muted,
        )
        .center(),
        26.0,
    );
    for (name, address) in parties_text(slots) {
        flow.block(text(name, center, 0.0, 14.0, theme.ink).bold().center(), 4.0);
        flow.block(text(address, center, 0.0, 12.0, theme.muted).center(), 16.0);
    }
    flow.skip(8.0);

    for (i, (heading, body)) in sections(slots).iter().enumerate() {
        flow.reserve(16.0 + 10.0 + 14.0 * 2.0);
        flow.block(
            text(format!("§ {} · {}", i + 1, heading), center, 0.0, 15.0, theme.accent).bold().center(),
            10.0,
        );
        flow.paragraph(body, 14.0, 22.0);
    }
    signatures(&mut flow, slots, theme.accent);
    flow.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::payload::Payload;
    use crate::document::slots::resolve;
    use pretty_assertions::assert_eq;

    const VARIANTS: [ContractVariant; 3] = [
        ContractVariant::Standard,
        ContractVariant::Minimal,
        ContractVariant::Elegant,
    ];

    #[test]
    fn test_short_contract_fits_one_page() {
        let slots = resolve(SLOTS, &Payload::new().with("price", "4500"));
        for variant in VARIANTS {
            let doc = compose(variant, &slots, CanvasSize::A4_PORTRAIT);
            assert_eq!(doc.pages.len(), 1, "{:?}", variant);
            let texts: Vec<&str> = doc.pages[0].texts().collect();
            assert!(texts.iter().any(|t| t.contains("4 500 zł netto")), "{:?}", variant);
            assert!(texts.contains(&"Strona 1 z 1"));
        }
    }

    #[test]
    fn test_long_scope_flows_onto_more_pages() {
        let scope = "Kompleksowa obsługa kanałów społecznościowych klienta. ".repeat(120);
        let slots = resolve(SLOTS, &Payload::new().with("scope", scope));
        for variant in VARIANTS {
            let doc = compose(variant, &slots, CanvasSize::A4_PORTRAIT);
            assert!(doc.pages.len() >= 2, "{:?}", variant);
            let last = doc.pages.len();
            assert!(doc.pages[last - 1].texts().any(|t| t == format!("Strona {} z {}", last, last)));
            assert!(doc.pages.iter().all(|p| p.size == CanvasSize::A4_PORTRAIT));
        }
    }

    #[test]
    fn test_text_stays_inside_page() {
        let scope = "Kompleksowa obsługa kanałów społecznościowych klienta. ".repeat(200);
        let slots = resolve(SLOTS, &Payload::new().with("scope", scope));
        for variant in VARIANTS {
            let doc = compose(variant, &slots, CanvasSize::A4_PORTRAIT);
            for page in &doc.pages {
                for node in &page.nodes {
                    if let Node::Text(t) = node {
                        assert!(t.at.y + t.block_height() <= 1123.0, "{:?} {:?}", variant, t.content);
                    }
                }
            }
        }
    }

    #[test]
    fn test_notes_only_when_supplied() {
        let plain = sections(&resolve(SLOTS, &Payload::new()));
        assert!(!plain[4].1.contains("Ustalenia dodatkowe"));
        let with_notes = sections(&resolve(SLOTS, &Payload::new().with("notes", "Rabat 5%")));
        assert!(with_notes[4].1.ends_with("Ustalenia dodatkowe: Rabat 5%"));
    }

    #[test]
    fn test_long_paragraph_is_split_by_lines() {
        let scope = "słowo ".repeat(3000);
        let slots = resolve(SLOTS, &Payload::new().with("scope", scope));
        let doc = compose(ContractVariant::Minimal, &slots, CanvasSize::A4_PORTRAIT);
        let words: usize = doc
            .pages
            .iter()
            .flat_map(|p| p.texts())
            .map(|t| t.matches("słowo").count())
            .sum();
        assert_eq!(words, 3000);
    }
}
