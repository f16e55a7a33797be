//! ZIP extraction and repair for messy address strings.
//!
//! RI/MA ZIPs start with a zero that data entry frequently drops, leaving a
//! 4-digit tail ("Jamestown RI 2835"). The heuristics here recover the
//! 5-digit ZIP while refusing to touch unit numbers and PO boxes.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Which heuristic produced the ZIP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZipSource {
    /// A 5-digit token (optionally ZIP+4) was already present.
    Zip5,
    /// Trailing 4-digit token, optionally before a country token.
    Zip4Trailing,
    /// 4-digit token following an RI/MA state token.
    Zip4AfterState,
    /// 4-digit token preceding an RI/MA state token.
    Zip4BeforeState,
}

/// Outcome of ZIP repair on one address string.
#[derive(Debug, Clone, PartialEq)]
pub struct ZipRepair {
    /// Input with the ZIP token normalized in place and punctuation cleaned.
    pub cleaned_address: String,
    pub zip5: Option<String>,
    pub zip_source: Option<ZipSource>,
}

impl ZipRepair {
    /// True when the ZIP came from padding a dropped leading zero.
    pub fn was_padded(&self) -> bool {
        matches!(
            self.zip_source,
            Some(ZipSource::Zip4Trailing)
                | Some(ZipSource::Zip4AfterState)
                | Some(ZipSource::Zip4BeforeState)
        )
    }
}

static ZIP5_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})(?:-\d{4})?\b").unwrap());

static ZIP4_TRAILING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{4})\b(?:\s*(?:USA|US|United\s+States(?:\s+of\s+America)?)\.?)?\s*$")
        .unwrap()
});

static STATE_THEN_ZIP4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:RI|MA|Rhode\s+Island|Massachusetts)\b\W*(\d{4})\b").unwrap()
});

static ZIP4_THEN_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{4})\b\W*\b(?:RI|MA|Rhode\s+Island|Massachusetts)\b").unwrap()
});

static UNIT_CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:apt|apartment|unit|ste|suite|#|fl|floor|bldg|building)\.?\s*$").unwrap()
});

static PO_BOX_CONTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:p\.?\s*o\.?\s*box|po\s*box)\s*$").unwrap());

static MULTI_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static SPACE_COMMA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+,").unwrap());
static COMMA_SPACING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());

/// Extract a ZIP from an address string, padding dropped leading zeros.
///
/// Heuristics, in order, first match wins:
/// 1. a 5-digit token (or ZIP+4) anywhere;
/// 2. a trailing 4-digit token (optionally before a country token) that is
///    not a unit number or PO box;
/// 3. an RI/MA state token followed by a 4-digit token, same guards;
/// 4. a 4-digit token followed by an RI/MA state token, same guards.
pub fn repair_zip(address: &str) -> ZipRepair {
    let s = address.trim();
    if s.is_empty() {
        return ZipRepair {
            cleaned_address: String::new(),
            zip5: None,
            zip_source: None,
        };
    }

    if let Some(caps) = ZIP5_RE.captures(s) {
        let zip5 = caps.get(1).unwrap().as_str().to_string();
        let whole = caps.get(0).unwrap();
        let cleaned = replace_span(s, whole.start(), whole.end(), &zip5);
        return ZipRepair {
            cleaned_address: cleaned,
            zip5: Some(zip5),
            zip_source: Some(ZipSource::Zip5),
        };
    }

    if let Some(caps) = ZIP4_TRAILING_RE.captures(s) {
        let digits = caps.get(1).unwrap();
        let before = s[..caps.get(0).unwrap().start()].trim_end();
        if !unit_or_po_box_context(before) {
            let zip5 = format!("0{}", digits.as_str());
            let whole = caps.get(0).unwrap();
            let cleaned = replace_span(s, whole.start(), whole.end(), &zip5);
            return ZipRepair {
                cleaned_address: cleaned,
                zip5: Some(zip5),
                zip_source: Some(ZipSource::Zip4Trailing),
            };
        }
    }

    if let Some(caps) = STATE_THEN_ZIP4_RE.captures(s) {
        let digits = caps.get(1).unwrap();
        let before = s[..digits.start()].trim_end();
        if !unit_or_po_box_context(before) {
            let zip5 = format!("0{}", digits.as_str());
            let cleaned = replace_span(s, digits.start(), digits.end(), &zip5);
            return ZipRepair {
                cleaned_address: cleaned,
                zip5: Some(zip5),
                zip_source: Some(ZipSource::Zip4AfterState),
            };
        }
    }

    if let Some(caps) = ZIP4_THEN_STATE_RE.captures(s) {
        let digits = caps.get(1).unwrap();
        let before = s[..digits.start()].trim_end();
        if !unit_or_po_box_context(before) {
            let zip5 = format!("0{}", digits.as_str());
            let cleaned = replace_span(s, digits.start(), digits.end(), &zip5);
            return ZipRepair {
                cleaned_address: cleaned,
                zip5: Some(zip5),
                zip_source: Some(ZipSource::Zip4BeforeState),
            };
        }
    }

    ZipRepair {
        cleaned_address: cleanup(s),
        zip5: None,
        zip_source: None,
    }
}

fn unit_or_po_box_context(text_before_number: &str) -> bool {
    UNIT_CONTEXT_RE.is_match(text_before_number) || PO_BOX_CONTEXT_RE.is_match(text_before_number)
}

fn replace_span(text: &str, start: usize, end: usize, replacement: &str) -> String {
    cleanup(&format!("{}{}{}", &text[..start], replacement, &text[end..]))
}

/// Collapse whitespace runs, normalize comma spacing, trim edge punctuation.
pub(crate) fn cleanup(text: &str) -> String {
    let collapsed = MULTI_SPACE_RE.replace_all(text.trim(), " ");
    let no_space_comma = SPACE_COMMA_RE.replace_all(&collapsed, ",");
    let spaced = COMMA_SPACING_RE.replace_all(&no_space_comma, ", ");
    spaced.trim_matches(&[' ', ',', ';'][..]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_digit_zip_is_extracted_anywhere() {
        let r = repair_zip("2 Old Walcott Ave Jamestown RI 02835");
        assert_eq!(r.zip5.as_deref(), Some("02835"));
        assert_eq!(r.zip_source, Some(ZipSource::Zip5));
        assert!(!r.was_padded());
    }

    #[test]
    fn zip_plus_four_collapses_to_five() {
        let r = repair_zip("1 Main St, Providence RI 02903-1234");
        assert_eq!(r.zip5.as_deref(), Some("02903"));
        assert!(r.cleaned_address.contains("02903"));
        assert!(!r.cleaned_address.contains("1234"));
    }

    #[test]
    fn five_digit_wins_over_trailing_four() {
        let r = repair_zip("55 Bay View Ave 02835, Jamestown 1234");
        assert_eq!(r.zip5.as_deref(), Some("02835"));
        assert_eq!(r.zip_source, Some(ZipSource::Zip5));
    }

    #[test]
    fn trailing_four_digit_pads_leading_zero() {
        let r = repair_zip("2 Old Walcott Ave, Jamestown RI 2835 USA");
        assert_eq!(r.zip5.as_deref(), Some("02835"));
        assert_eq!(r.zip_source, Some(ZipSource::Zip4Trailing));
        assert!(r.was_padded());
        assert_eq!(r.cleaned_address, "2 Old Walcott Ave, Jamestown RI 02835");
    }

    #[test]
    fn state_then_four_digits_pads() {
        let r = repair_zip("55 Bay View Ave, Rhode Island 2835, Jamestown");
        assert_eq!(r.zip5.as_deref(), Some("02835"));
        assert_eq!(r.zip_source, Some(ZipSource::Zip4AfterState));
    }

    #[test]
    fn four_digits_then_state_pads() {
        let r = repair_zip("100 Maple Ave, Barrington 2806 RI, attn front desk");
        assert_eq!(r.zip5.as_deref(), Some("02806"));
        assert_eq!(r.zip_source, Some(ZipSource::Zip4BeforeState));
    }

    #[test]
    fn po_box_and_unit_numbers_are_not_zips() {
        let r = repair_zip("PO Box 2835, Jamestown RI");
        assert_eq!(r.zip5, None);

        let r = repair_zip("123 Main St Apt 2835");
        assert_eq!(r.zip5, None);

        let r = repair_zip("123 Main St Suite 2835 RI");
        assert_eq!(r.zip5, None);
    }

    #[test]
    fn no_zip_still_cleans_punctuation() {
        let r = repair_zip("  12 Elm St ,  Providence  , ");
        assert_eq!(r.zip5, None);
        assert_eq!(r.cleaned_address, "12 Elm St, Providence");
    }
}
