//! # Document Templates
//!
//! Turns a caller [`Payload`] into a [`RenderedDocument`]: one
//! [`VisualTree`] per page at the template's native pixel size.
//!
//! ```text
//! (kind, variant id) ──► registry::lookup ──► &TemplateDef ─┐
//!                         (unknown → placeholder, warn)     │
//! payload ──► slots::resolve(def.slots) ──► ResolvedSlots ──┤
//!                                                           ▼
//!                         match def.variant { Report(v) => report::compose(v, ..), ... }
//!                                                           │
//!                                                           ▼
//!                                                   RenderedDocument
//! ```
//!
//! ## Kinds
//!
//! | Kind | Variants | Native size |
//! |------|----------|-------------|
//! | report | classic, modern, slide | 794×1123 (slide: 1600×900) |
//! | contract | standard, minimal, elegant | 794×1123, flows onto more pages |
//! | presentation | corporate, bold, minimal | 1600×900, six slides |
//! | graphic | 14 styles | 1080×1080 |
//!
//! Rendering is pure: the same inputs always give the same trees. Images are
//! referenced by source only and fetched later by [`resolve::ImageResolver`].

pub mod payload;
pub mod registry;
pub mod resolve;
pub mod slots;

mod contract;
mod graphic;
mod placeholder;
mod presentation;
mod report;
mod theme;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use contract::ContractVariant;
pub use graphic::GraphicVariant;
pub use payload::Payload;
pub use presentation::PresentationVariant;
pub use registry::{TemplateDef, Variant};
pub use report::ReportVariant;

use crate::config::CanvasSize;
use crate::error::VizdocError;
use crate::scene::VisualTree;

/// The four document families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Report,
    Contract,
    Presentation,
    Graphic,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Report,
        DocumentKind::Contract,
        DocumentKind::Presentation,
        DocumentKind::Graphic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Report => "report",
            DocumentKind::Contract => "contract",
            DocumentKind::Presentation => "presentation",
            DocumentKind::Graphic => "graphic",
        }
    }

    /// Leading part of export file names.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Report => "raport",
            DocumentKind::Contract => "umowa",
            DocumentKind::Presentation => "prezentacja",
            DocumentKind::Graphic => "grafika",
        }
    }

    /// Slot carrying the document's date or billing period.
    fn period_slot(&self) -> &'static str {
        match self {
            DocumentKind::Report => "period",
            DocumentKind::Contract => "contract_date",
            DocumentKind::Presentation | DocumentKind::Graphic => "date",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = VizdocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                VizdocError::InvalidJob(format!(
                    "unknown document kind '{}' (expected report, contract, presentation or graphic)",
                    s
                ))
            })
    }
}

/// Pages and notes produced by one layout.
#[derive(Debug, Default)]
pub(crate) struct Composition {
    pub pages: Vec<VisualTree>,
    pub notes: Vec<String>,
}

impl Composition {
    pub fn single(page: VisualTree) -> Self {
        Self {
            pages: vec![page],
            notes: Vec::new(),
        }
    }
}

/// A fully rendered document, ready to mount and capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub kind: DocumentKind,
    pub template_id: &'static str,
    pub version: u32,
    pub size: CanvasSize,
    pub pages: Vec<VisualTree>,
    /// Things a reader should know about the data, e.g. estimated series.
    pub notes: Vec<String>,
    /// True when the requested variant was unknown and the placeholder was used.
    pub fallback: bool,
    /// Resolved client name, used for file names.
    pub client: String,
    /// Date or period text exactly as supplied; `None` when defaulted.
    pub period: Option<String>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&VisualTree> {
        self.pages.get(index)
    }

    /// Distinct image sources across all pages, in first-use order.
    pub fn image_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for page in &self.pages {
            for source in page.image_sources() {
                if !sources.contains(&source) {
                    sources.push(source);
                }
            }
        }
        sources
    }
}

/// Render `payload` through the template `(kind, variant_id)`.
///
/// Unknown variant ids render the kind's placeholder instead of failing.
pub fn render(kind: DocumentKind, variant_id: &str, payload: &Payload) -> RenderedDocument {
    render_template(registry::lookup(kind, variant_id), payload)
}

/// Render `payload` through a specific template definition.
pub fn render_template(def: &'static TemplateDef, payload: &Payload) -> RenderedDocument {
    let slots = slots::resolve(def.slots, payload);
    let composition = match def.variant {
        Variant::Report(v) => report::compose(v, &slots, def.size),
        Variant::Contract(v) => contract::compose(v, &slots, def.size),
        Variant::Presentation(v) => presentation::compose(v, &slots, def.size),
        Variant::Graphic(v) => graphic::compose(v, &slots, def.size),
        Variant::Placeholder(kind) => placeholder::compose(kind, def.size),
    };
    for note in &composition.notes {
        log::debug!("{} {}: {}", def.kind, def.id, note);
    }

    let period_key = def.kind.period_slot();
    RenderedDocument {
        kind: def.kind,
        template_id: def.id,
        version: def.version,
        size: def.size,
        pages: composition.pages,
        notes: composition.notes,
        fallback: matches!(def.variant, Variant::Placeholder(_)),
        client: slots.text("client_name").to_string(),
        period: slots
            .is_supplied(period_key)
            .then(|| slots.text(period_key).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Report".parse::<DocumentKind>().unwrap(), DocumentKind::Report);
        assert_eq!(" graphic ".parse::<DocumentKind>().unwrap(), DocumentKind::Graphic);
        assert!(matches!("memo".parse::<DocumentKind>(), Err(VizdocError::InvalidJob(_))));
    }

    #[test]
    fn test_render_is_deterministic() {
        let payload = Payload::new().with("client_name", "Acme").with("reach", 5000);
        for kind in DocumentKind::ALL {
            for def in registry::variants(kind) {
                let a = render_template(def, &payload);
                let b = render_template(def, &payload);
                assert_eq!(a, b, "{} {}", kind, def.id);
            }
        }
    }

    #[test]
    fn test_every_page_has_template_size() {
        for def in registry::TEMPLATES {
            let doc = render_template(def, &Payload::new());
            assert!(!doc.pages.is_empty(), "{} has no pages", def.id);
            for page in &doc.pages {
                assert_eq!(page.size, def.size, "{} {}", def.kind, def.id);
                assert!(!page.nodes.is_empty(), "{} {} renders an empty page", def.kind, def.id);
            }
        }
    }

    #[test]
    fn test_unknown_variant_falls_back() {
        let doc = render(DocumentKind::Contract, "baroque", &Payload::new());
        assert!(doc.fallback);
        assert_eq!(doc.page_count(), 1);
        assert!(doc.pages[0].texts().any(|t| t == "Wybierz szablon"));
    }

    #[test]
    fn test_period_only_when_supplied() {
        let doc = render(DocumentKind::Report, "classic", &Payload::new());
        assert_eq!(doc.period, None);
        let doc = render(DocumentKind::Report, "classic", &Payload::new().with("period", "2024-03"));
        assert_eq!(doc.period.as_deref(), Some("2024-03"));
    }
}
