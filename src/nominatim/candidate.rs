//! Search-service response rows.

use serde::{Deserialize, Serialize};

/// One candidate returned by `/search?format=json&addressdetails=1`.
///
/// Coordinates arrive as decimal strings and stay that way; the bounding box
/// is `[south_lat, north_lat, west_lon, east_lon]` as numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCandidate {
    #[serde(default)]
    pub place_id: Option<i64>,
    #[serde(default)]
    pub osm_type: Option<String>,
    #[serde(default)]
    pub osm_id: Option<i64>,
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub place_rank: Option<i64>,
    #[serde(default)]
    pub addresstype: Option<String>,
    #[serde(default)]
    pub importance: Option<f64>,
    #[serde(default)]
    pub boundingbox: Option<Vec<String>>,
    #[serde(default)]
    pub address: Option<CandidateAddress>,
}

/// Nested address breakdown of a candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateAddress {
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub state_code: Option<String>,
    #[serde(default, rename = "ISO3166-2-lvl4")]
    pub iso3166_2_lvl4: Option<String>,
    #[serde(default, rename = "ISO3166-2-lvl6")]
    pub iso3166_2_lvl6: Option<String>,
}

impl CandidateAddress {
    /// First populated city-level component: city, town, then village.
    pub fn city_level(&self) -> Option<&str> {
        [&self.city, &self.town, &self.village]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|v| !v.trim().is_empty())
    }

    /// Best available state value, falling back through the code and ISO
    /// keys the service populates inconsistently.
    pub fn state_value(&self) -> Option<&str> {
        [
            &self.state,
            &self.state_code,
            &self.iso3166_2_lvl4,
            &self.iso3166_2_lvl6,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_service_row() {
        let row = r#"{
            "place_id": 12345,
            "osm_type": "way",
            "osm_id": 98765,
            "lat": "41.4967",
            "lon": "-71.3678",
            "display_name": "2, Walcott Avenue, Jamestown, Newport County, Rhode Island, 02835, United States",
            "class": "place",
            "type": "house",
            "place_rank": 30,
            "importance": 0.0001,
            "boundingbox": ["41.4966", "41.4968", "-71.3679", "-71.3677"],
            "address": {
                "house_number": "2",
                "road": "Walcott Avenue",
                "town": "Jamestown",
                "state": "Rhode Island",
                "ISO3166-2-lvl4": "US-RI",
                "postcode": "02835"
            }
        }"#;
        let candidate: SearchCandidate = serde_json::from_str(row).unwrap();
        assert_eq!(candidate.kind.as_deref(), Some("house"));
        assert_eq!(candidate.place_rank, Some(30));
        let address = candidate.address.unwrap();
        assert_eq!(address.city_level(), Some("Jamestown"));
        assert_eq!(address.state_value(), Some("Rhode Island"));
    }

    #[test]
    fn city_level_prefers_city_over_village() {
        let address = CandidateAddress {
            city: Some("Providence".to_string()),
            village: Some("Elmhurst".to_string()),
            ..Default::default()
        };
        assert_eq!(address.city_level(), Some("Providence"));
    }
}
