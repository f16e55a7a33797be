//! Rule-based split of a normalized address string into components.
//!
//! Deterministic and conservative: when the street/city boundary cannot be
//! anchored by a comma, a street-type token, or a state token, the parse
//! fails with whatever partial tags were recovered so the caller can attempt
//! a repair and retry.

use std::sync::LazyLock;

use regex::Regex;

use crate::reference::state_name;

use super::{AddressTags, TagFailure};

static ZIP_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})(?:-\d{4})?\b").unwrap());

const STREET_TYPES: &[&str] = &[
    "st", "street", "ave", "av", "avenue", "blvd", "boulevard", "rd", "road", "dr", "drive",
    "ln", "lane", "ct", "court", "pl", "place", "sq", "square", "pkwy", "parkway", "cir",
    "circle", "ter", "terrace", "trl", "trail", "hwy", "highway", "way", "cv", "cove", "expy",
    "expwy", "expressway", "ctr", "center",
];

const DIRECTIONALS: &[&str] = &[
    "n", "s", "e", "w", "ne", "nw", "se", "sw", "north", "south", "east", "west",
];

const OCCUPANCY_MARKERS: &[&str] = &[
    "apt", "apartment", "unit", "ste", "suite", "#", "fl", "floor", "bldg", "building",
];

const COUNTRY_TOKENS: &[&str] = &["usa", "us", "united states", "united states of america"];

fn fold(token: &str) -> String {
    token.trim_matches(&['.', ','][..]).to_ascii_lowercase()
}

fn is_street_type(token: &str) -> bool {
    STREET_TYPES.contains(&fold(token).as_str())
}

fn is_directional(token: &str) -> bool {
    DIRECTIONALS.contains(&fold(token).as_str())
}

fn is_short_directional(token: &str) -> bool {
    let f = fold(token);
    f.len() <= 2 && DIRECTIONALS.contains(&f.as_str())
}

fn is_occupancy_marker(token: &str) -> bool {
    OCCUPANCY_MARKERS.contains(&fold(token).as_str()) || token.starts_with('#')
}

fn is_country(segment: &str) -> bool {
    COUNTRY_TOKENS.contains(&fold(segment).as_str())
}

/// Match a state token (abbreviation or full name) ending at `tokens[at]`.
/// Returns (start_index, canonical_abbreviation) on success; full names may
/// span two tokens ("Rhode Island").
fn state_ending_at(tokens: &[String], at: usize) -> Option<(usize, String)> {
    let single = fold(&tokens[at]);
    if single.len() == 2 {
        let upper = single.to_ascii_uppercase();
        if state_name(&upper).is_some() {
            return Some((at, upper));
        }
    }
    for span in [2usize, 1] {
        if at + 1 < span {
            continue;
        }
        let start = at + 1 - span;
        let phrase = tokens[start..=at]
            .iter()
            .map(|t| fold(t))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some((abbr, _)) = crate::reference::US_STATES
            .iter()
            .find(|(_, name)| name.to_ascii_lowercase() == phrase)
        {
            return Some((start, (*abbr).to_string()));
        }
    }
    None
}

/// Split a normalized address string into tagged components.
pub fn parse_components(text: &str) -> Result<AddressTags, TagFailure> {
    let mut tags = AddressTags::default();
    let mut working = text.trim().to_string();

    // ZIP: take the last 5-digit token; the ZIP sits at the tail of every
    // layout this parser accepts.
    let zip_token = ZIP_TOKEN_RE
        .find_iter(&working)
        .last()
        .map(|m| (m.range(), m.as_str()[..5].to_string()));
    if let Some((range, zip)) = zip_token {
        tags.zip_code = Some(zip);
        working.replace_range(range, "");
    }

    let mut segments: Vec<Vec<String>> = working
        .split(',')
        .map(|seg| seg.split_whitespace().map(str::to_string).collect())
        .filter(|seg: &Vec<String>| !seg.is_empty())
        .collect();

    // State: scan tokens from the end of the tail segments (never the street
    // segment) for an abbreviation or a full state name.
    'state_scan: for seg_idx in (0..segments.len()).rev() {
        if seg_idx == 0 && segments.len() > 1 {
            break;
        }
        let lo = if seg_idx == 0 { 1 } else { 0 };
        for tok_idx in (lo..segments[seg_idx].len()).rev() {
            let found = state_ending_at(&segments[seg_idx], tok_idx);
            if let Some((start, abbr)) = found {
                if start < lo {
                    continue;
                }
                tags.state_name = Some(abbr);
                segments[seg_idx].drain(start..=tok_idx);
                break 'state_scan;
            }
        }
    }
    segments.retain(|seg| !seg.is_empty());

    if segments.is_empty() {
        return Err(TagFailure::new(tags, "no_street_tokens"));
    }

    // Street segment: occupancy suffix, then address number, then the street
    // tokens themselves.
    let mut street_tokens = segments.remove(0);
    if let Some(marker_idx) = street_tokens.iter().position(|t| is_occupancy_marker(t)) {
        if marker_idx > 0 {
            let trailing: Vec<String> = street_tokens.drain(marker_idx..).collect();
            assign_occupancy(&mut tags, &trailing);
        }
    }
    if let Some(first) = street_tokens.first() {
        if first.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            tags.address_number = Some(street_tokens.remove(0));
        }
    }

    // Tail segments: occupancy, country, city.
    let mut city_parts: Vec<String> = Vec::new();
    for seg in segments {
        let joined = seg.join(" ");
        if is_country(&joined) {
            continue;
        }
        if is_occupancy_marker(&seg[0]) {
            assign_occupancy(&mut tags, &seg);
            continue;
        }
        city_parts.push(joined);
    }

    if city_parts.is_empty() {
        // Single-segment layout: find the street/city boundary inside the
        // street tokens.
        if let Some(type_idx) = street_tokens.iter().rposition(|t| is_street_type(t)) {
            let mut rest: Vec<String> = street_tokens.drain(type_idx + 1..).collect();
            if !rest.is_empty() && is_short_directional(&rest[0]) {
                // "Park Ave N Providence": the N belongs to the street.
                street_tokens.push(rest.remove(0));
            }
            if !rest.is_empty() {
                city_parts.push(rest.join(" "));
            }
        } else if tags.state_name.is_some() && street_tokens.len() >= 2 {
            let city = street_tokens.pop().unwrap();
            city_parts.push(city);
        } else if street_tokens.len() >= 2 {
            // No comma, no street type, no state token: the street/city
            // boundary is unknowable.
            return Err(TagFailure::new(tags, "street_city_boundary_ambiguous"));
        }
    }

    if street_tokens.is_empty() {
        return Err(TagFailure::new(tags, "no_street_tokens"));
    }

    // Internal street structure.
    if street_tokens.len() > 1 && is_directional(street_tokens.last().unwrap()) {
        tags.street_post_directional = street_tokens.pop();
    }
    if street_tokens.len() > 1 && is_street_type(street_tokens.last().unwrap()) {
        tags.street_post_type = street_tokens.pop();
    }
    if street_tokens.len() > 1 && is_directional(&street_tokens[0]) {
        tags.street_pre_directional = Some(street_tokens.remove(0));
    }
    tags.street_name = Some(street_tokens.join(" "));

    if !city_parts.is_empty() {
        tags.place_name = Some(city_parts.join(" "));
    }

    Ok(tags)
}

fn assign_occupancy(tags: &mut AddressTags, tokens: &[String]) {
    let (marker, identifier) = if tokens[0].starts_with('#') && tokens[0].len() > 1 {
        ("#".to_string(), tokens[0][1..].to_string())
    } else {
        (tokens[0].clone(), tokens[1..].join(" "))
    };
    if tags.occupancy_type.is_none() {
        tags.occupancy_type = Some(marker);
        tags.occupancy_identifier = Some(identifier);
    } else if tags.subaddress_type.is_none() {
        tags.subaddress_type = Some(marker);
        tags.subaddress_identifier = Some(identifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated_full_address() {
        let tags = parse_components("2 Old Walcott Ave, Jamestown RI 02835").unwrap();
        assert_eq!(tags.address_number.as_deref(), Some("2"));
        assert_eq!(tags.street_name.as_deref(), Some("Old Walcott"));
        assert_eq!(tags.street_post_type.as_deref(), Some("Ave"));
        assert_eq!(tags.place_name.as_deref(), Some("Jamestown"));
        assert_eq!(tags.state_name.as_deref(), Some("RI"));
        assert_eq!(tags.zip_code.as_deref(), Some("02835"));
    }

    #[test]
    fn single_segment_with_street_type_anchor() {
        let tags = parse_components("2 Old Walcott Ave Jamestown RI 02835").unwrap();
        assert_eq!(tags.street_name.as_deref(), Some("Old Walcott"));
        assert_eq!(tags.place_name.as_deref(), Some("Jamestown"));
        assert_eq!(tags.state_name.as_deref(), Some("RI"));
    }

    #[test]
    fn full_state_name_spans_two_tokens() {
        let tags = parse_components("1 Elm St, Providence, Rhode Island 02903").unwrap();
        assert_eq!(tags.state_name.as_deref(), Some("RI"));
        assert_eq!(tags.place_name.as_deref(), Some("Providence"));
    }

    #[test]
    fn occupancy_segment_is_split_off() {
        let tags = parse_components("12 Broad St, Apt 4B, Westerly RI 02891").unwrap();
        assert_eq!(tags.occupancy_type.as_deref(), Some("Apt"));
        assert_eq!(tags.occupancy_identifier.as_deref(), Some("4B"));
        assert_eq!(tags.place_name.as_deref(), Some("Westerly"));
    }

    #[test]
    fn multi_token_city_after_street_type() {
        let tags = parse_components("10 Main St North Kingstown RI 02852").unwrap();
        assert_eq!(tags.place_name.as_deref(), Some("North Kingstown"));
        assert_eq!(tags.street_name.as_deref(), Some("Main"));
    }

    #[test]
    fn short_post_directional_stays_with_street() {
        let tags = parse_components("100 Park Ave N Providence RI 02904").unwrap();
        assert_eq!(tags.street_post_directional.as_deref(), Some("N"));
        assert_eq!(tags.place_name.as_deref(), Some("Providence"));
    }

    #[test]
    fn pre_directional_is_detected() {
        let tags = parse_components("45 W Main St, Wickford RI 02852").unwrap();
        assert_eq!(tags.street_pre_directional.as_deref(), Some("W"));
        assert_eq!(tags.street_name.as_deref(), Some("Main"));
    }

    #[test]
    fn ambiguous_boundary_fails_with_partial_zip() {
        let err = parse_components("2 Old Walcott Jamestown 02835").unwrap_err();
        assert_eq!(err.reason, "street_city_boundary_ambiguous");
        assert_eq!(err.partial.zip_code.as_deref(), Some("02835"));
        assert!(err.partial.state_name.is_none());
    }

    #[test]
    fn country_token_is_dropped() {
        let tags = parse_components("2 Old Walcott Ave, Jamestown RI 02835, USA").unwrap();
        assert_eq!(tags.place_name.as_deref(), Some("Jamestown"));
    }
}
