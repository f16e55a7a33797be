//! US state abbreviation table and state-token normalization.

/// Two-letter abbreviation and full name for every US state plus DC and the
/// territories the search service can return.
pub const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
    ("PR", "Puerto Rico"),
    ("GU", "Guam"),
    ("VI", "U.S. Virgin Islands"),
    ("AS", "American Samoa"),
    ("MP", "Northern Mariana Islands"),
];

/// Full name for a two-letter abbreviation.
pub fn state_name(abbr: &str) -> Option<&'static str> {
    let upper = abbr.to_ascii_uppercase();
    US_STATES
        .iter()
        .find(|(a, _)| *a == upper)
        .map(|(_, name)| *name)
}

/// Casefold and keep only alphanumerics, collapsing separators to single
/// spaces. Comparison form for town and state tokens.
pub fn normalize_text(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Normalize a state token to its canonical two-letter abbreviation.
///
/// Accepts abbreviations ("ri"), full names ("Rhode Island"), and the ISO
/// "US-RI" forms the search service emits in ISO3166-2 keys. Unrecognized
/// input comes back folded so mismatches still diff cleanly in diagnostics.
pub fn normalize_state(value: &str) -> String {
    let raw = value.trim();
    if raw.is_empty() {
        return String::new();
    }

    let upper = raw.to_ascii_uppercase();
    if let Some(rest) = upper.strip_prefix("US-").or_else(|| upper.strip_prefix("US ")) {
        let candidate = rest.trim();
        if candidate.len() == 2 && state_name(candidate).is_some() {
            return candidate.to_string();
        }
    }

    let folded = normalize_text(raw);
    if folded.is_empty() {
        return String::new();
    }
    for (abbr, name) in US_STATES {
        if folded == abbr.to_lowercase() || folded == name.to_lowercase() {
            return (*abbr).to_string();
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviation_and_name_normalize_to_same_code() {
        assert_eq!(normalize_state("ri"), "RI");
        assert_eq!(normalize_state("Rhode Island"), "RI");
        assert_eq!(normalize_state("MASSACHUSETTS"), "MA");
    }

    #[test]
    fn iso_form_is_accepted() {
        assert_eq!(normalize_state("US-RI"), "RI");
        assert_eq!(normalize_state("us-ma"), "MA");
    }

    #[test]
    fn unknown_values_fold_but_do_not_map() {
        assert_eq!(normalize_state("Ontario"), "ontario");
        assert_eq!(normalize_state(""), "");
    }
}
