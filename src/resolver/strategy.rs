//! The fixed, ordered strategy list of the search cascade.

use crate::tagger::AddressTags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Search on (number, street, zip).
    NumberStreetZip,
    /// Search on (number, street, city, state).
    NumberStreetCityState,
    /// Fuzzy-match the street against the reference store's road names for
    /// the zip, then re-search with the matched road.
    FuzzyStreetInZip,
    /// Interpolate/snap along the matched road's address ranges.
    TigerExtrapolateSnap,
}

impl StrategyKind {
    /// Priority order; the cascade stops at the first acceptance.
    pub const CASCADE: [StrategyKind; 4] = [
        StrategyKind::NumberStreetZip,
        StrategyKind::NumberStreetCityState,
        StrategyKind::FuzzyStreetInZip,
        StrategyKind::TigerExtrapolateSnap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::NumberStreetZip => "number_street_zip",
            StrategyKind::NumberStreetCityState => "number_street_city_state",
            StrategyKind::FuzzyStreetInZip => "fuzzy_street_in_zip",
            StrategyKind::TigerExtrapolateSnap => "tiger_extrapolate_snap",
        }
    }

    /// Tags that must be present for the strategy to be attempted. The
    /// address number is optional everywhere; a search without it can still
    /// validate against zip/city/state.
    pub fn required_tags(self) -> &'static [&'static str] {
        match self {
            StrategyKind::NumberStreetZip => &["StreetName", "ZipCode"],
            StrategyKind::NumberStreetCityState => &["StreetName", "PlaceName", "StateName"],
            StrategyKind::FuzzyStreetInZip => &["StreetName", "ZipCode"],
            StrategyKind::TigerExtrapolateSnap => &["StreetName", "ZipCode", "AddressNumber"],
        }
    }

    /// Names of required tags missing from `tags`, in declaration order.
    pub fn missing_tags(self, tags: &AddressTags) -> Vec<&'static str> {
        self.required_tags()
            .iter()
            .copied()
            .filter(|name| {
                let value = match *name {
                    "StreetName" => tags.street_name.as_deref(),
                    "ZipCode" => tags.zip_code.as_deref(),
                    "PlaceName" => tags.place_name.as_deref(),
                    "StateName" => tags.state_name.as_deref(),
                    "AddressNumber" => tags.address_number.as_deref(),
                    _ => None,
                };
                value.map_or(true, |v| v.trim().is_empty())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_order_is_fixed() {
        let names: Vec<&str> = StrategyKind::CASCADE.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "number_street_zip",
                "number_street_city_state",
                "fuzzy_street_in_zip",
                "tiger_extrapolate_snap",
            ]
        );
    }

    #[test]
    fn missing_tags_are_reported_in_order() {
        let tags = AddressTags {
            street_name: Some("Walcott".to_string()),
            ..Default::default()
        };
        assert_eq!(
            StrategyKind::NumberStreetZip.missing_tags(&tags),
            vec!["ZipCode"]
        );
        assert_eq!(
            StrategyKind::NumberStreetCityState.missing_tags(&tags),
            vec!["PlaceName", "StateName"]
        );
    }

    #[test]
    fn complete_tags_have_no_missing() {
        let tags = AddressTags {
            address_number: Some("2".to_string()),
            street_name: Some("Walcott".to_string()),
            place_name: Some("Jamestown".to_string()),
            state_name: Some("RI".to_string()),
            zip_code: Some("02835".to_string()),
            ..Default::default()
        };
        for kind in StrategyKind::CASCADE {
            assert!(kind.missing_tags(&tags).is_empty());
        }
    }
}
