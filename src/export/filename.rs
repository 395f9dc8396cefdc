//! Deterministic export file names: `<prefix>-<client>-<yyyy-mm>.<ext>`.

use chrono::NaiveDate;

use crate::document::DocumentKind;

/// Used when the client name slugs to nothing.
const ANONYMOUS_CLIENT: &str = "klient";

/// `yyyy-mm` prefix of `period`, if it starts with a valid year and month.
pub fn year_month(period: &str) -> Option<&str> {
    let period = period.trim();
    let ym = period.get(..7)?;
    let bytes = ym.as_bytes();
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    if !(digits(0..4) && bytes[4] == b'-' && digits(5..7)) {
        return None;
    }
    let month: u32 = ym[5..7].parse().ok()?;
    // "2024-05-xx" is fine, "2024-055" is not
    let rest_ok = period.len() == 7 || !period.as_bytes()[7].is_ascii_digit();
    ((1..=12).contains(&month) && rest_ok).then_some(ym)
}

/// File name for an export of `kind` for `client`.
///
/// The month comes from `period` when it is a valid `yyyy-mm`, otherwise
/// from `date`.
pub fn export_file_name(kind: DocumentKind, client: &str, period: Option<&str>, date: NaiveDate, ext: &str) -> String {
    let client = match slug::slugify(client) {
        s if s.is_empty() => ANONYMOUS_CLIENT.to_string(),
        s => s,
    };
    let month = match period.and_then(year_month) {
        Some(ym) => ym.to_string(),
        None => date.format("%Y-%m").to_string(),
    };
    format!("{}-{}-{}.{}", kind.file_prefix(), client, month, ext.trim_start_matches('.'))
}
