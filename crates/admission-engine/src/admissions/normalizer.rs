//! Locale and phrase handling for free-text quotient fields.
//!
//! Nothing outside this module inspects raw threshold text: callers receive
//! either a concrete number or `None`.

/// Lowest grade average on the scale; doubles as the open-admission sentinel.
pub const SCALE_MIN: f64 = 2.0;
/// Highest grade average on the scale.
pub const SCALE_MAX: f64 = 12.7;

/// Phrases meaning every qualified applicant was admitted (matched case-insensitively).
const OPEN_ADMISSION_PHRASES: [&str; 4] = [
    "all admitted",
    "open seats",
    "alle optaget",
    "ledige pladser",
];

/// Parses a stored or typed quotient for display and classification.
///
/// Empty input yields `None`, an open-admission phrase yields [`SCALE_MIN`],
/// and a comma decimal separator is accepted.
pub fn parse_quotient(raw: Option<&str>) -> Option<f64> {
    let text = clean(raw)?;
    if is_open_admission(text) {
        return Some(SCALE_MIN);
    }
    parse_decimal(text)
}

/// Normalises a quotient for storage as a period-separated decimal string.
///
/// Unlike [`parse_quotient`], open-admission phrases are stored as `None`
/// rather than as the sentinel number.
pub fn normalize_quotient_for_storage(raw: Option<&str>) -> Option<String> {
    let text = clean(raw)?;
    if is_open_admission(text) {
        return None;
    }
    let canonical = text.replace(',', ".");
    parse_decimal(&canonical).map(|_| canonical)
}

pub(crate) fn strip_bom(value: &str) -> &str {
    value.strip_prefix('\u{feff}').unwrap_or(value)
}

fn clean(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn is_open_admission(text: &str) -> bool {
    let lowered = text.to_lowercase();
    OPEN_ADMISSION_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

fn parse_decimal(text: &str) -> Option<f64> {
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quotient_handles_locale_and_phrases() {
        assert_eq!(parse_quotient(Some("9,5")), Some(9.5));
        assert_eq!(parse_quotient(Some(" 10.2 ")), Some(10.2));
        assert_eq!(parse_quotient(Some("Alle optaget")), Some(SCALE_MIN));
        assert_eq!(parse_quotient(Some("LEDIGE PLADSER")), Some(SCALE_MIN));
        assert_eq!(parse_quotient(Some("All admitted")), Some(SCALE_MIN));
        assert_eq!(parse_quotient(Some("open seats left")), Some(SCALE_MIN));
        assert_eq!(parse_quotient(Some("   ")), None);
        assert_eq!(parse_quotient(None), None);
        assert_eq!(parse_quotient(Some("n/a")), None);
        assert_eq!(parse_quotient(Some("inf")), None);
    }

    #[test]
    fn storage_normalizer_keeps_open_admission_as_null() {
        assert_eq!(normalize_quotient_for_storage(Some("Alle optaget")), None);
        assert_eq!(normalize_quotient_for_storage(Some("open seats")), None);
        assert_eq!(
            normalize_quotient_for_storage(Some(" 9,5 ")),
            Some("9.5".to_string())
        );
        assert_eq!(normalize_quotient_for_storage(Some("12.7")), Some("12.7".to_string()));
        assert_eq!(normalize_quotient_for_storage(Some("abc")), None);
        assert_eq!(normalize_quotient_for_storage(Some("")), None);
        assert_eq!(normalize_quotient_for_storage(Some("NaN")), None);
    }

    #[test]
    fn normalizers_are_idempotent_on_canonical_strings() {
        for raw in ["9,5", "10.0", "2", "12,70", "7.3", "Alle optaget", "bogus", ""] {
            let once = normalize_quotient_for_storage(Some(raw));
            let twice = normalize_quotient_for_storage(once.as_deref());
            assert_eq!(once, twice, "storage normalizer drifted for {raw:?}");

            if let Some(canonical) = once.as_deref() {
                assert_eq!(parse_quotient(Some(canonical)), parse_quotient(Some(raw)));
            }
        }
    }

    #[test]
    fn strip_bom_only_removes_leading_marker() {
        assert_eq!(strip_bom("\u{feff}id"), "id");
        assert_eq!(strip_bom("id"), "id");
    }
}
