//! Caller payloads and the lenient parsing applied to them.
//!
//! A payload is a flat JSON object (`key → string | number`). Values arrive
//! from hand-filled forms, so numbers may carry thousands separators
//! (`"12 500"`, `"12,500"`) or units (`"3.2%"`), and chart fields may be either
//! an aggregate total or a comma-separated literal series.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Weekly split of a monthly reach total, first week to last.
pub const WEEKLY_REACH_WEIGHTS: [f64; 4] = [0.18, 0.23, 0.28, 0.31];

/// Weekly split of a monthly clicks total, first week to last.
pub const WEEKLY_CLICK_WEIGHTS: [f64; 4] = [0.16, 0.22, 0.29, 0.33];

/// Field values handed over by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Value of `key` as text.
    ///
    /// Numbers and booleans are printed, arrays of scalars are joined with
    /// commas (so `[1, 2, 3]` reads like `"1,2,3"`), `null` and objects read as
    /// absent.
    pub fn text(&self, key: &str) -> Option<String> {
        scalar_text(self.0.get(key)?)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            Some(parts.join(","))
        }
        Value::Null | Value::Object(_) => None,
    }
}

// ============================================================================
// NUMBERS
// ============================================================================

/// Lenient number parse.
///
/// Whitespace (including no-break spaces) and `,` thousands separators are
/// dropped, then the longest leading numeric prefix is parsed. Anything
/// unparseable reads as 0.
///
/// ```
/// use vizdoc::document::payload::parse_number;
///
/// assert_eq!(parse_number("12 500"), 12500.0);
/// assert_eq!(parse_number("3.2%"), 3.2);
/// assert_eq!(parse_number("n/a"), 0.0);
/// ```
pub fn parse_number(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (i, c) in cleaned.char_indices() {
        match c {
            '-' | '+' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return 0.0;
    }
    cleaned[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Comma-separated literal series; `None` when absent or blank.
///
/// Each item goes through [`parse_number`], so a malformed item reads as 0
/// rather than dropping the whole series.
pub fn parse_series(text: &str) -> Option<Vec<f64>> {
    if text.trim().is_empty() {
        return None;
    }
    Some(text.split(',').map(parse_number).collect())
}

/// Spread `total` over buckets by `weights`, rounded to whole units.
///
/// This is a presentation heuristic for when only a monthly aggregate is
/// known; charts built from it must say so on the page.
pub fn synthesize(total: f64, weights: &[f64]) -> Vec<f64> {
    weights.iter().map(|w| (total * w).round()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_number_separators() {
        assert_eq!(parse_number("12,500"), 12500.0);
        assert_eq!(parse_number("1 234 567"), 1234567.0);
        assert_eq!(parse_number("1\u{a0}200"), 1200.0);
        assert_eq!(parse_number("  42 "), 42.0);
    }

    #[test]
    fn test_parse_number_prefix_and_garbage() {
        assert_eq!(parse_number("3.2%"), 3.2);
        assert_eq!(parse_number("150 zł"), 150.0);
        assert_eq!(parse_number("-7"), -7.0);
        assert_eq!(parse_number("1.2.3"), 1.2);
        assert_eq!(parse_number("5."), 5.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number("-"), 0.0);
        assert_eq!(parse_number("."), 0.0);
    }

    #[test]
    fn test_parse_series() {
        assert_eq!(parse_series("1200, 1500,x,900"), Some(vec![1200.0, 1500.0, 0.0, 900.0]));
        assert_eq!(parse_series("   "), None);
        assert_eq!(parse_series(""), None);
    }

    #[test]
    fn test_synthesize_weekly_reach() {
        assert_eq!(
            synthesize(100000.0, &WEEKLY_REACH_WEIGHTS),
            vec![18000.0, 23000.0, 28000.0, 31000.0]
        );
        assert_eq!(synthesize(0.0, &WEEKLY_CLICK_WEIGHTS), vec![0.0; 4]);
    }

    #[test]
    fn test_weights_sum_to_one() {
        for weights in [WEEKLY_REACH_WEIGHTS, WEEKLY_CLICK_WEIGHTS] {
            assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_payload_text_coerces_scalars() {
        let payload: Payload =
            serde_json::from_str(r#"{"reach": 100000, "name": "Acme", "series": [1, 2.5], "x": null}"#).unwrap();
        assert_eq!(payload.text("reach").as_deref(), Some("100000"));
        assert_eq!(payload.text("name").as_deref(), Some("Acme"));
        assert_eq!(payload.text("series").as_deref(), Some("1,2.5"));
        assert_eq!(payload.text("x"), None);
        assert_eq!(payload.text("missing"), None);
    }
}
