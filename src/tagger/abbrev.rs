//! Expansion of abbreviated tag values ("St" -> "Street", "N" -> "North").
//!
//! Only type, directional, and occupancy components are touched; street and
//! place names stay as typed.

use super::AddressTags;

const EXPANSIONS: &[(&str, &str)] = &[
    ("st", "Street"),
    ("ave", "Avenue"),
    ("av", "Avenue"),
    ("blvd", "Boulevard"),
    ("rd", "Road"),
    ("ct", "Court"),
    ("ln", "Lane"),
    ("dr", "Drive"),
    ("pl", "Place"),
    ("sq", "Square"),
    ("pkwy", "Parkway"),
    ("cir", "Circle"),
    ("ter", "Terrace"),
    ("trl", "Trail"),
    ("hwy", "Highway"),
    ("n", "North"),
    ("s", "South"),
    ("e", "East"),
    ("w", "West"),
    ("apt", "Apartment"),
    ("ste", "Suite"),
];

fn expand_value(value: &str) -> Option<String> {
    let key = value.trim_end_matches('.').to_ascii_lowercase();
    EXPANSIONS
        .iter()
        .find(|(abbr, _)| *abbr == key)
        .map(|(_, full)| (*full).to_string())
}

fn expand_field(field: &mut Option<String>, count: &mut usize) {
    if let Some(value) = field {
        if let Some(expanded) = expand_value(value) {
            if *value != expanded {
                *field = Some(expanded);
                *count += 1;
            }
        }
    }
}

/// Expand abbreviated type/directional/occupancy values in place, returning
/// the number of values changed.
pub fn expand_tag_values(tags: &mut AddressTags) -> usize {
    let mut count = 0;
    expand_field(&mut tags.street_pre_directional, &mut count);
    expand_field(&mut tags.street_pre_type, &mut count);
    expand_field(&mut tags.street_post_type, &mut count);
    expand_field(&mut tags.street_post_directional, &mut count);
    expand_field(&mut tags.occupancy_type, &mut count);
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_type_and_directional() {
        let mut tags = AddressTags {
            street_post_type: Some("Ave".to_string()),
            street_pre_directional: Some("N".to_string()),
            occupancy_type: Some("apt.".to_string()),
            street_name: Some("St".to_string()),
            ..Default::default()
        };
        let count = expand_tag_values(&mut tags);
        assert_eq!(count, 3);
        assert_eq!(tags.street_post_type.as_deref(), Some("Avenue"));
        assert_eq!(tags.street_pre_directional.as_deref(), Some("North"));
        assert_eq!(tags.occupancy_type.as_deref(), Some("Apartment"));
        // street names are never expanded
        assert_eq!(tags.street_name.as_deref(), Some("St"));
    }

    #[test]
    fn already_expanded_values_do_not_count() {
        let mut tags = AddressTags {
            street_post_type: Some("Street".to_string()),
            ..Default::default()
        };
        assert_eq!(expand_tag_values(&mut tags), 0);
    }
}
