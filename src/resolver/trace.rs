//! Structured per-strategy trace records.
//!
//! Every strategy attempt (and every skip) leaves one record, whether or
//! not it produced a result; downstream reporting reads these out of the
//! persisted cache columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One candidate as seen by validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub result_index: usize,
    pub display_name: String,
    pub class: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub place_rank: Option<i64>,
    pub accepted: bool,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Skipped,
    Returned,
    NoneFound,
    Error,
}

/// Trace of one strategy attempt or skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyTrace {
    pub strategy: String,
    pub attempted: bool,
    pub status: AttemptStatus,
    pub error: Option<String>,
    pub number_results: usize,
    /// "accepted" or "rejected" once candidates were validated.
    pub validation: Option<String>,
    pub validation_reason: Option<String>,
    pub elapsed_ms: u64,
    pub query: String,
    pub expected_zip: Option<String>,
    pub expected_city: Option<String>,
    pub accepted_index: Option<usize>,
    #[serde(default)]
    pub candidates: Vec<CandidateRecord>,
}

impl StrategyTrace {
    pub fn skipped(
        strategy: &str,
        reason: &str,
        expected_zip: &str,
        expected_city: &str,
    ) -> Self {
        Self {
            strategy: strategy.to_string(),
            attempted: false,
            status: AttemptStatus::Skipped,
            error: None,
            number_results: 0,
            validation: None,
            validation_reason: Some(reason.to_string()),
            elapsed_ms: 0,
            query: String::new(),
            expected_zip: none_if_empty(expected_zip),
            expected_city: none_if_empty(expected_city),
            accepted_index: None,
            candidates: Vec::new(),
        }
    }

    pub fn attempted(strategy: &str, query: &str, expected_zip: &str, expected_city: &str) -> Self {
        Self {
            strategy: strategy.to_string(),
            attempted: true,
            status: AttemptStatus::Error,
            error: None,
            number_results: 0,
            validation: None,
            validation_reason: None,
            elapsed_ms: 0,
            query: query.to_string(),
            expected_zip: none_if_empty(expected_zip),
            expected_city: none_if_empty(expected_city),
            accepted_index: None,
            candidates: Vec::new(),
        }
    }
}

fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Summary of the interpolation fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TigerSummary {
    pub attempted: bool,
    pub outcome: String,
    pub rows_returned: usize,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

impl Default for TigerSummary {
    fn default() -> Self {
        Self {
            attempted: false,
            outcome: "not_attempted".to_string(),
            rows_returned: 0,
            elapsed_ms: 0,
            error: None,
        }
    }
}

/// Diagnostics accumulated across one resolution's cascade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchReport {
    pub raw_address: String,
    pub bad_address_rewrite_used: bool,
    pub cache_used: bool,
    pub attempts: Vec<StrategyTrace>,
    pub method_accepted: Option<String>,
    pub fuzzy_attempted: bool,
    pub fuzzy_candidate_count: usize,
    pub fuzzy_top_score: Option<f64>,
    pub fuzzy_match_accepted: bool,
    pub tiger: TigerSummary,
    pub successful: bool,
    pub final_error: Option<String>,
    pub elapsed_ms: u64,
    pub results_returned_total: usize,
    pub results_returned_by_strategy: BTreeMap<String, usize>,
}
