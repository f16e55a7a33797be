//! Acceptance validation for search-service candidates.
//!
//! Every check runs regardless of earlier failures so the diagnostics map is
//! complete; a candidate is accepted iff no rejection code fired.

use std::fmt;
use std::sync::LazyLock;

use geo::{Distance, Haversine, Point};
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::nominatim::SearchCandidate;
use crate::reference::{normalize_state, normalize_text};

/// Thresholds for broadness checks.
#[derive(Debug, Clone, Copy)]
pub struct ValidationConfig {
    /// Accept a feature only if its max bbox edge is at or under this.
    pub max_linear_m: f64,
    /// Require at least this place rank (street-level and finer).
    pub min_place_rank: i64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_linear_m: 1609.34,
            min_place_rank: 26,
        }
    }
}

/// What the candidate is expected to agree with.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedLocation<'a> {
    pub zip: &'a str,
    pub city: &'a str,
    pub state: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectCode {
    BroadClassType,
    PlaceRankTooLow,
    MissingBbox,
    TooLongFeature,
    LocationMismatch,
}

impl RejectCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectCode::BroadClassType => "BROAD_CLASS_TYPE",
            RejectCode::PlaceRankTooLow => "PLACE_RANK_TOO_LOW",
            RejectCode::MissingBbox => "MISSING_BBOX",
            RejectCode::TooLongFeature => "TOO_LONG_FEATURE",
            RejectCode::LocationMismatch => "ZIP_OR_CITY_STATE_MISMATCH",
        }
    }
}

impl fmt::Display for RejectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one candidate. Immutable once produced.
#[derive(Debug, Clone)]
pub struct AcceptanceDecision {
    pub accepted: bool,
    pub reasons: Vec<RejectCode>,
    pub diagnostics: Map<String, Value>,
}

impl AcceptanceDecision {
    pub fn reason_string(&self) -> String {
        self.reasons
            .iter()
            .map(RejectCode::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Place types too broad to stand in for a street address.
const BROAD_PLACE_TYPES: &[&str] = &[
    "postcode",
    "city",
    "town",
    "village",
    "hamlet",
    "suburb",
    "neighbourhood",
];

static ZIP5_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})(?:-\d{4})?\b").unwrap());

fn normalize_zip5(value: &str) -> String {
    ZIP5_RE
        .captures(value.trim())
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

fn denylisted_class_type(candidate: &SearchCandidate) -> bool {
    match candidate.class.as_deref() {
        Some("boundary") => true,
        Some("place") => candidate
            .kind
            .as_deref()
            .is_some_and(|t| BROAD_PLACE_TYPES.contains(&t)),
        _ => false,
    }
}

/// Max geodesic edge of the candidate's bounding box: the NS edge along the
/// west side, and the EW edge at mid-latitude.
fn bbox_max_dim_m(bbox: Option<&Vec<String>>) -> Option<f64> {
    let bbox = bbox?;
    if bbox.len() != 4 {
        return None;
    }
    let s_lat: f64 = bbox[0].trim().parse().ok()?;
    let n_lat: f64 = bbox[1].trim().parse().ok()?;
    let w_lon: f64 = bbox[2].trim().parse().ok()?;
    let e_lon: f64 = bbox[3].trim().parse().ok()?;

    let mid_lat = (s_lat + n_lat) / 2.0;
    let ns = Haversine.distance(Point::new(w_lon, s_lat), Point::new(w_lon, n_lat));
    let ew = Haversine.distance(Point::new(w_lon, mid_lat), Point::new(e_lon, mid_lat));
    Some(ns.max(ew))
}

fn city_level_match(expected_city_norm: &str, value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let candidate_norm = normalize_text(value);
    if expected_city_norm.is_empty() || candidate_norm.is_empty() {
        return false;
    }
    candidate_norm == expected_city_norm
        || format!(" {} ", candidate_norm).contains(&format!(" {} ", expected_city_norm))
}

/// Validate one candidate against the expected zip/city/state.
pub fn check_candidate(
    candidate: &SearchCandidate,
    expected: &ExpectedLocation<'_>,
    cfg: &ValidationConfig,
) -> AcceptanceDecision {
    let mut reasons = Vec::new();
    let mut diag = Map::new();

    if denylisted_class_type(candidate) {
        reasons.push(RejectCode::BroadClassType);
    }
    diag.insert("class".to_string(), json!(candidate.class));
    diag.insert("type".to_string(), json!(candidate.kind));

    diag.insert("place_rank".to_string(), json!(candidate.place_rank));
    if let Some(rank) = candidate.place_rank {
        if rank < cfg.min_place_rank {
            reasons.push(RejectCode::PlaceRankTooLow);
        }
    }

    let bbox_dim = bbox_max_dim_m(candidate.boundingbox.as_ref());
    diag.insert("bbox_max_dim_m".to_string(), json!(bbox_dim));
    match bbox_dim {
        None => reasons.push(RejectCode::MissingBbox),
        Some(dim) if dim > cfg.max_linear_m => reasons.push(RejectCode::TooLongFeature),
        Some(_) => {}
    }

    let address = candidate.address.clone().unwrap_or_default();
    let expected_zip5 = normalize_zip5(expected.zip);
    let result_zip5 = normalize_zip5(address.postcode.as_deref().unwrap_or(""));
    let zip_match = !expected_zip5.is_empty() && expected_zip5 == result_zip5;

    let expected_city_norm = normalize_text(expected.city);
    let mut city_match_keys: Vec<&str> = Vec::new();
    for (key, value) in [
        ("city", address.city.as_deref()),
        ("town", address.town.as_deref()),
        ("village", address.village.as_deref()),
    ] {
        if city_level_match(&expected_city_norm, value) {
            city_match_keys.push(key);
        }
    }
    let city_match = !city_match_keys.is_empty();

    let expected_state_norm = normalize_state(expected.state);
    let result_state = address.state_value().unwrap_or("");
    let result_state_norm = normalize_state(result_state);
    let state_match = !expected_state_norm.is_empty()
        && !result_state_norm.is_empty()
        && expected_state_norm == result_state_norm;

    let location_match = zip_match || (city_match && state_match);
    if !location_match {
        reasons.push(RejectCode::LocationMismatch);
    }

    diag.insert("expected_zip5".to_string(), json!(expected_zip5));
    diag.insert("result_zip5".to_string(), json!(result_zip5));
    diag.insert("zip_match".to_string(), json!(zip_match));
    diag.insert("expected_city".to_string(), json!(expected.city));
    diag.insert(
        "expected_city_normalized".to_string(),
        json!(expected_city_norm),
    );
    diag.insert("city_match".to_string(), json!(city_match));
    diag.insert("city_match_keys".to_string(), json!(city_match_keys));
    diag.insert("expected_state".to_string(), json!(expected.state));
    diag.insert(
        "expected_state_normalized".to_string(),
        json!(expected_state_norm),
    );
    diag.insert("result_state".to_string(), json!(result_state));
    diag.insert(
        "result_state_normalized".to_string(),
        json!(result_state_norm),
    );
    diag.insert("state_match".to_string(), json!(state_match));
    diag.insert("location_match".to_string(), json!(location_match));
    diag.insert(
        "reasons".to_string(),
        json!(reasons.iter().map(RejectCode::as_str).collect::<Vec<_>>()),
    );

    AcceptanceDecision {
        accepted: reasons.is_empty(),
        reasons,
        diagnostics: diag,
    }
}
