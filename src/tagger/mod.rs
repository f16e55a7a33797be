//! Structured tagging of normalized address text.
//!
//! The parse step returns `Result<AddressTags, TagFailure>` with the partial
//! tag set on the error path, so the one-shot state-insertion repair operates
//! on typed data instead of an exception side-channel. After a successful
//! parse the tags go through state injection, address-number cleanup,
//! abbreviation expansion, and (when both state and ZIP are missing) a single
//! exploratory reverse-state query against the search service.

mod abbrev;
mod parser;

pub use abbrev::expand_tag_values;
pub use parser::parse_components;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ResolveError;
use crate::nominatim::NominatimClient;
use crate::normalize::Normalized;
use crate::reference::{normalize_state, state_for_zip};

/// Tagged components of one address. `address_number`, once cleanup has run,
/// contains only digits; non-digit suffixes move to an occupancy or
/// subaddress identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressTags {
    pub address_number: Option<String>,
    pub street_pre_directional: Option<String>,
    pub street_pre_type: Option<String>,
    pub street_name: Option<String>,
    pub street_post_type: Option<String>,
    pub street_post_directional: Option<String>,
    pub occupancy_type: Option<String>,
    pub occupancy_identifier: Option<String>,
    pub subaddress_type: Option<String>,
    pub subaddress_identifier: Option<String>,
    pub place_name: Option<String>,
    pub state_name: Option<String>,
    pub zip_code: Option<String>,
}

impl AddressTags {
    /// Full street phrase: pre-directional, pre-type, name, post-type,
    /// post-directional, joined in order.
    pub fn street_value(&self) -> String {
        [
            self.street_pre_directional.as_deref(),
            self.street_pre_type.as_deref(),
            self.street_name.as_deref(),
            self.street_post_type.as_deref(),
            self.street_post_directional.as_deref(),
        ]
        .iter()
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Component-name keyed map for diagnostics.
    pub fn component_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let mut put = |name: &str, value: &Option<String>| {
            if let Some(v) = value {
                map.insert(name.to_string(), Value::String(v.clone()));
            }
        };
        put("AddressNumber", &self.address_number);
        put("StreetNamePreDirectional", &self.street_pre_directional);
        put("StreetNamePreType", &self.street_pre_type);
        put("StreetName", &self.street_name);
        put("StreetNamePostType", &self.street_post_type);
        put("StreetNamePostDirectional", &self.street_post_directional);
        put("OccupancyType", &self.occupancy_type);
        put("OccupancyIdentifier", &self.occupancy_identifier);
        put("SubaddressType", &self.subaddress_type);
        put("SubaddressIdentifier", &self.subaddress_identifier);
        put("PlaceName", &self.place_name);
        put("StateName", &self.state_name);
        put("ZipCode", &self.zip_code);
        map
    }
}

/// Parse failure carrying whatever partial tags were recovered.
#[derive(Debug, Clone)]
pub struct TagFailure {
    pub partial: AddressTags,
    pub reason: &'static str,
}

impl TagFailure {
    pub(crate) fn new(partial: AddressTags, reason: &'static str) -> Self {
        Self { partial, reason }
    }
}

/// Diagnostics accumulated while tagging one address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagReport {
    pub raw_address: String,
    pub fix_zip_repair: bool,
    pub fix_state_spelling: bool,
    pub fix_town_directional: bool,
    pub fix_state_inserted_before_parse: bool,
    pub fix_state_added_after_parse: bool,
    pub fix_address_number_non_numeric: bool,
    pub address_number_overflow: bool,
    pub fix_abbreviation_expansions: usize,
    pub reverse_state_searched: bool,
    pub reverse_state_adopted: bool,
    pub reverse_state_result_count: usize,
    pub reverse_state_unanimous: Option<bool>,
    pub address_tags: Map<String, Value>,
    pub address_tags_expanded: Map<String, Value>,
    pub missing_street_number: bool,
    pub missing_street_name: bool,
    pub missing_city: bool,
    pub missing_state: bool,
    pub missing_zip: bool,
}

/// Tag a normalized address, repairing and retrying once when the first
/// parse fails with a recoverable partial tag set.
pub async fn tag(
    normalized: &Normalized,
    client: &NominatimClient,
    report: &mut TagReport,
) -> Result<AddressTags, ResolveError> {
    report.fix_zip_repair = normalized.zip_padded;
    report.fix_state_spelling = normalized.fixed_state_spelling;
    report.fix_town_directional = normalized.fixed_town_directional;

    let mut tags = match parse_components(&normalized.text) {
        Ok(tags) => tags,
        Err(failure) => retry_with_inserted_state(&normalized.text, failure, report)?,
    };

    // ZIP present but no state: the zip prefix tells us the state without
    // another parse.
    if tags.zip_code.is_some() && tags.state_name.is_none() {
        if let Some(state) = tags.zip_code.as_deref().and_then(state_for_zip) {
            tags.state_name = Some(state.to_string());
            report.fix_state_added_after_parse = true;
        }
    }

    clean_address_number(&mut tags, report);
    report.address_tags = tags.component_map();

    report.fix_abbreviation_expansions = expand_tag_values(&mut tags);

    reverse_for_state(&mut tags, client, report).await;

    report.address_tags_expanded = tags.component_map();
    report.missing_street_number = tags.address_number.is_none();
    report.missing_street_name = tags.street_name.is_none();
    report.missing_city = tags.place_name.is_none();
    report.missing_state = tags.state_name.is_none();
    report.missing_zip = tags.zip_code.is_none();

    Ok(tags)
}

/// One-shot repair: when the failed parse recovered a ZIP but no state,
/// insert the state abbreviation in front of the zip digits and re-parse.
/// Any other shape of failure is permanent.
fn retry_with_inserted_state(
    text: &str,
    failure: TagFailure,
    report: &mut TagReport,
) -> Result<AddressTags, ResolveError> {
    let Some(zip) = failure.partial.zip_code.as_deref() else {
        return Err(ResolveError::TaggingFailure(format!(
            "{}:no_zip_tag",
            failure.reason
        )));
    };
    if failure.partial.state_name.is_some() {
        return Err(ResolveError::TaggingFailure(format!(
            "{}:state_already_present",
            failure.reason
        )));
    }
    let Some(state) = state_for_zip(zip) else {
        return Err(ResolveError::TaggingFailure(format!(
            "{}:no_state_for_zip:{}",
            failure.reason, zip
        )));
    };
    let Some(zip_at) = text.find(zip) else {
        return Err(ResolveError::TaggingFailure(format!(
            "{}:zip_not_in_text",
            failure.reason
        )));
    };

    let repaired = format!("{}{} {}", &text[..zip_at], state, &text[zip_at..]);
    debug!(state, repaired, "retrying parse with inserted state");
    report.fix_state_inserted_before_parse = true;

    parse_components(&repaired)
        .map_err(|second| ResolveError::TaggingFailure(format!("retry:{}", second.reason)))
}

/// Split non-digit characters out of the address number, moving them to the
/// first unoccupied occupancy/subaddress slot.
fn clean_address_number(tags: &mut AddressTags, report: &mut TagReport) {
    let Some(number) = tags.address_number.clone() else {
        return;
    };
    if number.chars().all(|c| c.is_ascii_digit()) {
        return;
    }

    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    let rest: String = number.chars().filter(|c| !c.is_ascii_digit()).collect();
    tags.address_number = Some(digits);
    report.fix_address_number_non_numeric = true;

    if tags.occupancy_type.is_none() {
        tags.occupancy_type = Some("Unit".to_string());
        tags.occupancy_identifier = Some(rest);
    } else if tags.subaddress_type.is_none() {
        tags.subaddress_type = Some("Unit".to_string());
        tags.subaddress_identifier = Some(rest);
    } else {
        report.address_number_overflow = true;
    }
}

/// Infer a missing state from the search service when nothing else names it:
/// one query on (number, street, city), adopted only if every returned
/// candidate agrees on the state.
async fn reverse_for_state(
    tags: &mut AddressTags,
    client: &NominatimClient,
    report: &mut TagReport,
) {
    if tags.state_name.is_some() || tags.zip_code.is_some() {
        return;
    }
    let number = tags.address_number.clone().unwrap_or_default();
    let street = tags.street_value();
    let city = tags.place_name.clone().unwrap_or_default();
    if number.is_empty() || street.is_empty() || city.is_empty() {
        return;
    }

    let query = format!("{}, {}, {}", number, street, city);
    report.reverse_state_searched = true;

    let candidates = match client.search(&query, true).await {
        Ok(candidates) => candidates,
        Err(err) => {
            debug!(%err, "reverse-state query failed");
            return;
        }
    };
    report.reverse_state_result_count = candidates.len();

    let states: Vec<String> = candidates
        .iter()
        .filter_map(|c| c.address.as_ref().and_then(|a| a.state.clone()))
        .filter(|s| !s.trim().is_empty())
        .collect();
    if states.is_empty() {
        report.reverse_state_unanimous = None;
        return;
    }

    let first_norm = normalize_state(&states[0]);
    let unanimous = states.iter().all(|s| normalize_state(s) == first_norm);
    report.reverse_state_unanimous = Some(unanimous);
    if unanimous {
        tags.state_name = Some(states[0].clone());
        report.reverse_state_adopted = true;
        debug!(state = %states[0], "reverse-state inference adopted");
    } else {
        debug!("reverse-state inference ambiguous");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_value_joins_in_order() {
        let tags = AddressTags {
            street_pre_directional: Some("North".to_string()),
            street_name: Some("Main".to_string()),
            street_post_type: Some("Street".to_string()),
            ..Default::default()
        };
        assert_eq!(tags.street_value(), "North Main Street");
    }

    #[test]
    fn number_suffix_moves_to_occupancy() {
        let mut tags = AddressTags {
            address_number: Some("123A".to_string()),
            ..Default::default()
        };
        let mut report = TagReport::default();
        clean_address_number(&mut tags, &mut report);
        assert_eq!(tags.address_number.as_deref(), Some("123"));
        assert_eq!(tags.occupancy_type.as_deref(), Some("Unit"));
        assert_eq!(tags.occupancy_identifier.as_deref(), Some("A"));
        assert!(report.fix_address_number_non_numeric);
    }

    #[test]
    fn number_suffix_falls_back_to_subaddress() {
        let mut tags = AddressTags {
            address_number: Some("9B".to_string()),
            occupancy_type: Some("Apartment".to_string()),
            occupancy_identifier: Some("2".to_string()),
            ..Default::default()
        };
        let mut report = TagReport::default();
        clean_address_number(&mut tags, &mut report);
        assert_eq!(tags.subaddress_type.as_deref(), Some("Unit"));
        assert_eq!(tags.subaddress_identifier.as_deref(), Some("B"));
    }

    #[test]
    fn both_slots_taken_flags_overflow() {
        let mut tags = AddressTags {
            address_number: Some("7C".to_string()),
            occupancy_type: Some("Apartment".to_string()),
            subaddress_type: Some("Unit".to_string()),
            ..Default::default()
        };
        let mut report = TagReport::default();
        clean_address_number(&mut tags, &mut report);
        assert_eq!(tags.address_number.as_deref(), Some("7"));
        assert!(report.address_number_overflow);
    }

    #[test]
    fn state_insertion_repairs_ambiguous_parse() {
        // No comma, no street type, no state: first parse fails, the zip
        // prefix supplies RI, and the retry anchors the city on it.
        let failure = parse_components("2 Old Walcott Jamestown 02835").unwrap_err();
        let mut report = TagReport::default();
        let tags =
            retry_with_inserted_state("2 Old Walcott Jamestown 02835", failure, &mut report)
                .unwrap();
        assert!(report.fix_state_inserted_before_parse);
        assert_eq!(tags.state_name.as_deref(), Some("RI"));
        assert_eq!(tags.place_name.as_deref(), Some("Jamestown"));
        assert_eq!(tags.street_name.as_deref(), Some("Old Walcott"));
        assert_eq!(tags.zip_code.as_deref(), Some("02835"));
    }

    #[tokio::test]
    async fn walcott_scenario_tags_completely() {
        let normalized =
            crate::normalize::normalize("2 Old Walcott Ave, Jamestown RI 2835 USA");
        assert_eq!(normalized.zip5.as_deref(), Some("02835"));

        let client =
            NominatimClient::new(&crate::config::SearchSettings::default()).unwrap();
        let mut report = TagReport::default();
        let tags = tag(&normalized, &client, &mut report).await.unwrap();

        assert_eq!(tags.address_number.as_deref(), Some("2"));
        assert!(tags.street_value().contains("Walcott"));
        assert_eq!(tags.place_name.as_deref(), Some("Jamestown"));
        assert_eq!(tags.state_name.as_deref(), Some("RI"));
        assert_eq!(tags.zip_code.as_deref(), Some("02835"));
        // zip and state are both present, so no exploratory query fires
        assert!(!report.reverse_state_searched);
        // the first cascade strategy is attemptable with these tags
        assert!(crate::resolver::StrategyKind::NumberStreetZip
            .missing_tags(&tags)
            .is_empty());
    }

    #[test]
    fn failure_without_zip_is_permanent() {
        let failure = TagFailure::new(AddressTags::default(), "no_street_tokens");
        let mut report = TagReport::default();
        let err = retry_with_inserted_state("whatever", failure, &mut report).unwrap_err();
        assert!(matches!(err, ResolveError::TaggingFailure(_)));
        assert!(!report.fix_state_inserted_before_parse);
    }
}
