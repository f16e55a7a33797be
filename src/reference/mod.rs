//! Shared read-only reference data: US state names, ZIP-to-state mapping,
//! and the known-bad-address rewrite table.
//!
//! All of it is loaded once at startup and passed by reference into each
//! resolution; nothing here mutates after initialization.

mod rewrite;
mod states;
mod zip_state;

pub use rewrite::RewriteTable;
pub use states::{normalize_state, normalize_text, state_name, US_STATES};
pub use zip_state::state_for_zip;

/// Normalized lookup key for address-keyed tables: trimmed, casefolded,
/// whitespace collapsed, edge punctuation stripped.
pub fn normalize_key(value: &str) -> String {
    let folded = value.trim().to_lowercase();
    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_matches(&[' ', ','][..]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_collapses_whitespace_and_case() {
        assert_eq!(
            normalize_key("  2 Old  Walcott Ave,  Jamestown RI , "),
            "2 old walcott ave, jamestown ri"
        );
    }
}
