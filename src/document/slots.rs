//! Slot declarations and resolution.
//!
//! Every template declares its slots up front. Resolution is total: each slot
//! ends up with either the caller's non-blank value or its compiled-in
//! default, so layouts never see an empty field.

use std::collections::{BTreeMap, BTreeSet};

use super::payload::{Payload, parse_number, parse_series};
use crate::scene::Color;

/// What a slot holds. Drives how layouts read it, not how it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Text,
    Number,
    /// Aggregate total or comma-separated literal series.
    Series,
    /// URL or file path.
    Image,
    /// `#rrggbb`.
    Color,
}

/// One named slot of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDef {
    pub key: &'static str,
    pub kind: SlotKind,
    /// Never empty.
    pub default: &'static str,
}

impl SlotDef {
    pub const fn new(key: &'static str, kind: SlotKind, default: &'static str) -> Self {
        Self { key, kind, default }
    }
}

/// Shown for any text slot read that was never declared.
pub const MISSING_TEXT: &str = "—";

/// Neutral image used when the caller gives none.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/1080x1080/png";

/// `weekly_reach_data` → `weeklyReachData`.
fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Slot values after resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSlots {
    values: BTreeMap<&'static str, String>,
    supplied: BTreeSet<&'static str>,
}

impl ResolvedSlots {
    /// Resolved text; [`MISSING_TEXT`] for undeclared keys.
    pub fn text(&self, key: &str) -> &str {
        match self.values.get(key) {
            Some(v) => v.as_str(),
            None => {
                log::debug!("slot {:?} read but not declared", key);
                MISSING_TEXT
            }
        }
    }

    pub fn number(&self, key: &str) -> f64 {
        parse_number(self.text(key))
    }

    /// Literal series, only when the caller supplied one. Defaults never
    /// count as data.
    pub fn series(&self, key: &str) -> Option<Vec<f64>> {
        if !self.is_supplied(key) {
            return None;
        }
        parse_series(self.text(key))
    }

    pub fn color(&self, key: &str, fallback: Color) -> Color {
        Color::from_hex(self.text(key)).unwrap_or(fallback)
    }

    /// Items of a list slot, split on newlines or `;`.
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.text(key)
            .split(['\n', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether the caller gave a non-blank value for `key`.
    pub fn is_supplied(&self, key: &str) -> bool {
        self.supplied.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Resolve every slot of `defs` against `payload`.
///
/// Keys are looked up as declared (`snake_case`) and then in `camelCase`.
pub fn resolve(defs: &[SlotDef], payload: &Payload) -> ResolvedSlots {
    let mut resolved = ResolvedSlots::default();
    for def in defs {
        let given = payload
            .text(def.key)
            .or_else(|| payload.text(&camel_case(def.key)))
            .filter(|v| !v.trim().is_empty());
        let value = match given {
            Some(v) => {
                resolved.supplied.insert(def.key);
                v.trim().to_string()
            }
            None => def.default.to_string(),
        };
        resolved.values.insert(def.key, value);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DEFS: &[SlotDef] = &[
        SlotDef::new("client_name", SlotKind::Text, "Klient"),
        SlotDef::new("reach", SlotKind::Number, "0"),
        SlotDef::new("weekly_reach_data", SlotKind::Series, "auto"),
        SlotDef::new("logo_url", SlotKind::Image, PLACEHOLDER_IMAGE),
    ];

    #[test]
    fn test_blank_values_fall_back() {
        let payload = Payload::new().with("client_name", "   ").with("reach", "");
        let slots = resolve(DEFS, &payload);
        assert_eq!(slots.text("client_name"), "Klient");
        assert_eq!(slots.number("reach"), 0.0);
        assert_eq!(slots.text("logo_url"), PLACEHOLDER_IMAGE);
        assert!(!slots.is_supplied("client_name"));
    }

    #[test]
    fn test_every_declared_slot_resolves_non_empty() {
        let slots = resolve(DEFS, &Payload::new());
        for (key, value) in slots.iter() {
            assert!(!value.is_empty(), "{} resolved empty", key);
        }
        assert_eq!(slots.iter().count(), DEFS.len());
    }

    #[test]
    fn test_camel_case_keys_accepted() {
        assert_eq!(camel_case("weekly_reach_data"), "weeklyReachData");
        let payload = Payload::new().with("weeklyReachData", "1,2,3");
        let slots = resolve(DEFS, &payload);
        assert_eq!(slots.series("weekly_reach_data"), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_default_series_is_not_data() {
        let slots = resolve(DEFS, &Payload::new());
        assert_eq!(slots.series("weekly_reach_data"), None);
    }

    #[test]
    fn test_numeric_json_values() {
        let payload = Payload::new().with("reach", 100000);
        assert_eq!(resolve(DEFS, &payload).number("reach"), 100000.0);
    }

    #[test]
    fn test_undeclared_key_reads_placeholder() {
        let slots = resolve(DEFS, &Payload::new());
        assert_eq!(slots.text("nope"), MISSING_TEXT);
    }

    #[test]
    fn test_list_splits_items() {
        const LIST: &[SlotDef] = &[SlotDef::new("goals", SlotKind::Text, "a")];
        let slots = resolve(LIST, &Payload::new().with("goals", "one; two\nthree;;"));
        assert_eq!(slots.list("goals"), vec!["one", "two", "three"]);
    }
}
