//! Template lookup table.
//!
//! Every selectable `(kind, id)` pair is a row in [`TEMPLATES`]. Each kind
//! also has a placeholder row that [`lookup`] returns for ids it does not
//! know, so selection can never fail.

use serde::Serialize;

use super::contract::{self, ContractVariant};
use super::graphic::{self, GraphicVariant};
use super::presentation::{self, PresentationVariant};
use super::report::{self, ReportVariant};
use super::slots::SlotDef;
use super::DocumentKind;
use crate::config::CanvasSize;

/// A layout to dispatch to. Closed: adding a variant is a compile error
/// until it has a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "variant", rename_all = "lowercase")]
pub enum Variant {
    Report(ReportVariant),
    Contract(ContractVariant),
    Presentation(PresentationVariant),
    Graphic(GraphicVariant),
    Placeholder(DocumentKind),
}

/// One registered template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemplateDef {
    pub kind: DocumentKind,
    pub id: &'static str,
    pub version: u32,
    pub name: &'static str,
    pub size: CanvasSize,
    #[serde(skip)]
    pub slots: &'static [SlotDef],
    pub variant: Variant,
}

const fn report_def(id: &'static str, name: &'static str, size: CanvasSize, v: ReportVariant) -> TemplateDef {
    TemplateDef {
        kind: DocumentKind::Report,
        id,
        version: 1,
        name,
        size,
        slots: report::SLOTS,
        variant: Variant::Report(v),
    }
}

const fn contract_def(id: &'static str, name: &'static str, v: ContractVariant) -> TemplateDef {
    TemplateDef {
        kind: DocumentKind::Contract,
        id,
        version: 1,
        name,
        size: CanvasSize::A4_PORTRAIT,
        slots: contract::SLOTS,
        variant: Variant::Contract(v),
    }
}

const fn presentation_def(id: &'static str, name: &'static str, v: PresentationVariant) -> TemplateDef {
    TemplateDef {
        kind: DocumentKind::Presentation,
        id,
        version: 1,
        name,
        size: CanvasSize::SLIDE_16_9,
        slots: presentation::SLOTS,
        variant: Variant::Presentation(v),
    }
}

const fn graphic_def(id: &'static str, name: &'static str, v: GraphicVariant) -> TemplateDef {
    TemplateDef {
        kind: DocumentKind::Graphic,
        id,
        version: 1,
        name,
        size: CanvasSize::SQUARE_POST,
        slots: graphic::SLOTS,
        variant: Variant::Graphic(v),
    }
}

/// All selectable templates, grouped by kind.
pub static TEMPLATES: &[TemplateDef] = &[
    report_def("classic", "Klasyczny", CanvasSize::A4_PORTRAIT, ReportVariant::Classic),
    report_def("modern", "Nowoczesny", CanvasSize::A4_PORTRAIT, ReportVariant::Modern),
    report_def("slide", "Slajd", CanvasSize::SLIDE_16_9, ReportVariant::Slide),
    contract_def("standard", "Standardowa", ContractVariant::Standard),
    contract_def("minimal", "Minimalistyczna", ContractVariant::Minimal),
    contract_def("elegant", "Elegancka", ContractVariant::Elegant),
    presentation_def("corporate", "Korporacyjna", PresentationVariant::Corporate),
    presentation_def("bold", "Wyrazista", PresentationVariant::Bold),
    presentation_def("minimal", "Minimalistyczna", PresentationVariant::Minimal),
    graphic_def("gradient", "Gradient", GraphicVariant::Gradient),
    graphic_def("split", "Podział", GraphicVariant::Split),
    graphic_def("minimal", "Minimalistyczna", GraphicVariant::Minimal),
    graphic_def("bold", "Wyrazista", GraphicVariant::Bold),
    graphic_def("photo", "Zdjęcie", GraphicVariant::Photo),
    graphic_def("frame", "Ramka", GraphicVariant::Frame),
    graphic_def("diagonal", "Ukośna", GraphicVariant::Diagonal),
    graphic_def("circle", "Koło", GraphicVariant::Circle),
    graphic_def("stripes", "Paski", GraphicVariant::Stripes),
    graphic_def("quote", "Cytat", GraphicVariant::Quote),
    graphic_def("sale", "Promocja", GraphicVariant::Sale),
    graphic_def("event", "Wydarzenie", GraphicVariant::Event),
    graphic_def("announcement", "Ogłoszenie", GraphicVariant::Announcement),
    graphic_def("testimonial", "Opinia", GraphicVariant::Testimonial),
];

const fn fallback(kind: DocumentKind, size: CanvasSize, slots: &'static [SlotDef]) -> TemplateDef {
    TemplateDef {
        kind,
        id: "placeholder",
        version: 1,
        name: "Wybierz szablon",
        size,
        slots,
        variant: Variant::Placeholder(kind),
    }
}

static PLACEHOLDERS: [TemplateDef; 4] = [
    fallback(DocumentKind::Report, CanvasSize::A4_PORTRAIT, report::SLOTS),
    fallback(DocumentKind::Contract, CanvasSize::A4_PORTRAIT, contract::SLOTS),
    fallback(DocumentKind::Presentation, CanvasSize::SLIDE_16_9, presentation::SLOTS),
    fallback(DocumentKind::Graphic, CanvasSize::SQUARE_POST, graphic::SLOTS),
];

/// The neutral layout used when a variant id is unknown.
pub fn placeholder(kind: DocumentKind) -> &'static TemplateDef {
    match kind {
        DocumentKind::Report => &PLACEHOLDERS[0],
        DocumentKind::Contract => &PLACEHOLDERS[1],
        DocumentKind::Presentation => &PLACEHOLDERS[2],
        DocumentKind::Graphic => &PLACEHOLDERS[3],
    }
}

/// Registered templates of one kind.
pub fn variants(kind: DocumentKind) -> impl Iterator<Item = &'static TemplateDef> {
    TEMPLATES.iter().filter(move |def| def.kind == kind)
}

/// Find `(kind, id)`; case-insensitive, `_` and `-` ignored. Unknown ids get
/// the kind's placeholder and a warning.
pub fn lookup(kind: DocumentKind, id: &str) -> &'static TemplateDef {
    let wanted = normalize(id);
    match variants(kind).find(|def| normalize(def.id) == wanted) {
        Some(def) => def,
        None => {
            log::warn!("unknown {} template '{}', using placeholder", kind, id);
            placeholder(kind)
        }
    }
}

fn normalize(id: &str) -> String {
    id.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
