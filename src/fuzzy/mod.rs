//! Fuzzy road-name matching.
//!
//! Scores a tagged street name against the road names the reference store
//! knows for a postcode. Both sides get street-suffix expansion and two
//! canonical forms: tokenized (separators collapsed to spaces) and joined
//! (separators removed, so "Oaklawn" meets "Oak Lawn"). A pair scores the
//! best of token-set overlap, windowed partial overlap, and a discounted
//! whole-string character ratio, on a 0-100 scale.

use std::collections::BTreeSet;

use tracing::debug;

/// Street-suffix abbreviations expanded before scoring.
const ROAD_ABBREVIATIONS: &[(&str, &str)] = &[
    ("ave", "avenue"),
    ("av", "avenue"),
    ("blvd", "boulevard"),
    ("cir", "circle"),
    ("ct", "court"),
    ("ctr", "center"),
    ("cv", "cove"),
    ("dr", "drive"),
    ("expy", "expressway"),
    ("expwy", "expressway"),
    ("hwy", "highway"),
    ("ln", "lane"),
    ("pkwy", "parkway"),
    ("pl", "place"),
    ("rd", "road"),
    ("sq", "square"),
    ("st", "street"),
    ("ter", "terrace"),
    ("trl", "trail"),
    ("way", "way"),
];

/// The winning candidate and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadMatch {
    pub name: String,
    pub score: f64,
}

/// Expand well-known street-suffix abbreviations token by token.
pub fn expand_road_abbreviations(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|token| {
            let key = token.to_lowercase();
            ROAD_ABBREVIATIONS
                .iter()
                .find(|(abbr, _)| *abbr == key)
                .map(|(_, full)| (*full).to_string())
                .unwrap_or_else(|| token.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase, non-alphanumeric runs to single spaces.
fn canon_tokens(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase with separators removed entirely.
fn canon_joined(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Normalized character similarity on a 0-100 scale.
fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best similarity of the shorter string against every equal-length window
/// of the longer one.
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let window_len = shorter.chars().count();
    if window_len == 0 {
        return if longer.is_empty() { 100.0 } else { 0.0 };
    }
    let longer_chars: Vec<char> = longer.chars().collect();
    if longer_chars.len() == window_len {
        return ratio(shorter, longer);
    }

    let mut best = 0.0f64;
    for start in 0..=(longer_chars.len() - window_len) {
        let window: String = longer_chars[start..start + window_len].iter().collect();
        best = best.max(ratio(shorter, &window));
    }
    best
}

/// Token-set similarity: compare the shared-token core against each side's
/// full sorted token set.
fn token_set_ratio(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let core = set_a
        .intersection(&set_b)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let only_a = set_a
        .difference(&set_b)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let only_b = set_b
        .difference(&set_a)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let combined_a = [core.as_str(), only_a.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let combined_b = [core.as_str(), only_b.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    ratio(&core, &combined_a)
        .max(ratio(&core, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

/// Composite 0-100 score for one target/candidate pair.
pub fn smart_score(target: &str, candidate: &str) -> f64 {
    let t_tok = canon_tokens(target);
    let c_tok = canon_tokens(candidate);

    let s_token = token_set_ratio(&t_tok, &c_tok);
    let s_window = partial_ratio(&t_tok, &c_tok);
    let s_joined = 0.9 * ratio(&canon_joined(target), &canon_joined(candidate));

    s_token.max(s_window).max(s_joined)
}

/// Top-scoring candidate after abbreviation expansion, or `None` when no
/// candidate clears the threshold.
pub fn best_match(target: &str, candidates: &[String], threshold: f64) -> Option<RoadMatch> {
    if target.is_empty() || candidates.is_empty() {
        return None;
    }

    let target_expanded = expand_road_abbreviations(target);
    let mut best: Option<RoadMatch> = None;
    for name in candidates {
        let score = smart_score(&target_expanded, &expand_road_abbreviations(name));
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(RoadMatch {
                name: name.clone(),
                score,
            });
        }
    }

    let best = best?;
    debug!(target, best_name = %best.name, score = best.score, "fuzzy road match");
    if best.score < threshold {
        return None;
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviation_expansion_reaches_full_score() {
        let m = best_match("Main Street", &["Main St".to_string()], 80.0).unwrap();
        assert_eq!(m.name, "Main St");
        assert!(m.score >= 99.0);
    }

    #[test]
    fn unrelated_road_scores_below_threshold() {
        assert!(best_match("Main Street", &["Elm Avenue".to_string()], 80.0).is_none());
    }

    #[test]
    fn joined_form_bridges_spacing_differences() {
        let score = smart_score("Oaklawn Avenue", "Oak Lawn Avenue");
        assert!(score >= 85.0, "score was {score}");
    }

    #[test]
    fn token_order_does_not_matter() {
        let score = smart_score("Avenue Main", "Main Avenue");
        assert!(score >= 99.0, "score was {score}");
    }

    #[test]
    fn best_candidate_wins() {
        let candidates = vec![
            "Elm Avenue".to_string(),
            "Old Walcott Avenue".to_string(),
            "Walcott Street".to_string(),
        ];
        let m = best_match("Old Walcott Ave", &candidates, 80.0).unwrap();
        assert_eq!(m.name, "Old Walcott Avenue");
    }

    #[test]
    fn empty_inputs_yield_none() {
        assert!(best_match("", &["Main St".to_string()], 80.0).is_none());
        assert!(best_match("Main St", &[], 80.0).is_none());
    }
}
