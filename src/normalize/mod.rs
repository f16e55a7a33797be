//! String-level repair of raw address text.
//!
//! Runs before structured tagging: long-form state spellings become
//! two-letter codes, abbreviated directional town names are expanded, and a
//! missing or mangled ZIP is recovered where possible. Pure functions, no
//! side effects; an address with nothing to repair passes through with only
//! punctuation cleanup.

mod zip;

pub use zip::{repair_zip, ZipRepair, ZipSource};

/// Long-form and abbreviated state spellings the service area sees, mapped
/// to the two-letter code the tagger expects.
const STATE_SPELLINGS: &[(&str, &str)] = &[
    ("rhode island", "RI"),
    ("r.i.", "RI"),
    ("massachusetts", "MA"),
    ("mass.", "MA"),
    ("m.a.", "MA"),
];

/// Abbreviated compass-directional town names and their full forms.
const TOWN_DIRECTIONALS: &[(&str, &str)] = &[
    ("n scituate", "North Scituate"),
    ("n. scituate", "North Scituate"),
    ("n kingstown", "North Kingstown"),
    ("s kingstown", "South Kingstown"),
    ("s. kingstown", "South Kingstown"),
    ("n providence", "North Providence"),
    ("n. providence", "North Providence"),
    ("n attleboro", "North Attleboro"),
    ("n. attleboro", "North Attleboro"),
];

/// Outcome of normalization on one raw address.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub text: String,
    pub zip5: Option<String>,
    pub zip_source: Option<ZipSource>,
    pub fixed_state_spelling: bool,
    pub fixed_town_directional: bool,
    pub zip_padded: bool,
}

/// Repair a raw address string: state spellings, directional town names,
/// then ZIP extraction/repair. Never fails; absence of a ZIP is a valid
/// outcome.
pub fn normalize(raw: &str) -> Normalized {
    let (after_state, fixed_state_spelling) = replace_first(raw, STATE_SPELLINGS);
    let (after_town, fixed_town_directional) = replace_first(&after_state, TOWN_DIRECTIONALS);

    let repair = repair_zip(&after_town);
    Normalized {
        zip_padded: repair.was_padded(),
        text: repair.cleaned_address,
        zip5: repair.zip5,
        zip_source: repair.zip_source,
        fixed_state_spelling,
        fixed_town_directional,
    }
}

/// Replace the first case-insensitive occurrence of each table key,
/// preserving the rest of the string as typed.
fn replace_first(text: &str, table: &[(&str, &str)]) -> (String, bool) {
    let mut out = text.to_string();
    let mut replaced = false;
    for (needle, replacement) in table {
        if let Some(index) = out.to_ascii_lowercase().find(needle) {
            out = format!(
                "{}{}{}",
                &out[..index],
                replacement,
                &out[index + needle.len()..]
            );
            replaced = true;
        }
    }
    (out, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_spelling_becomes_two_letter_code() {
        let n = normalize("2 Old Walcott Ave, Jamestown Rhode Island 02835");
        assert!(n.text.contains("RI"));
        assert!(!n.text.to_lowercase().contains("rhode island"));
        assert!(n.fixed_state_spelling);
    }

    #[test]
    fn directional_town_is_expanded() {
        let n = normalize("10 Pleasant St, N Scituate RI 02857");
        assert!(n.text.contains("North Scituate"));
        assert!(n.fixed_town_directional);
    }

    #[test]
    fn trailing_four_digit_zip_is_padded() {
        let n = normalize("2 Old Walcott Ave, Jamestown RI 2835 USA");
        assert_eq!(n.zip5.as_deref(), Some("02835"));
        assert!(n.zip_padded);
        assert_eq!(n.text, "2 Old Walcott Ave, Jamestown RI 02835");
    }

    #[test]
    fn clean_address_passes_through() {
        let n = normalize("1 Elm St, Providence RI 02903");
        assert_eq!(n.text, "1 Elm St, Providence RI 02903");
        assert_eq!(n.zip5.as_deref(), Some("02903"));
        assert!(!n.fixed_state_spelling);
        assert!(!n.fixed_town_directional);
        assert!(!n.zip_padded);
    }
}
