//! Per-address failure taxonomy.
//!
//! None of these are fatal to a batch run: every address resolves
//! independently and an exhausted cascade is a normal outcome.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// Raw input was blank after trimming.
    #[error("Empty address")]
    EmptyAddress,

    /// Structured parse could not produce usable tags, even after the
    /// one-shot state-insertion repair.
    #[error("Tagging failed: {0}")]
    TaggingFailure(String),

    /// A strategy's required tag set is incomplete; the strategy is
    /// skipped rather than failed.
    #[error("missing_required_tags:{0}")]
    MissingRequiredTags(String),

    /// Search-service call timed out.
    #[error("Timeout")]
    NetworkTimeout,

    /// Search-service call failed for a non-timeout reason.
    #[error("Request error: {0}")]
    RequestError(String),

    /// Search service returned an empty candidate list.
    #[error("No results")]
    NoResultsReturned,

    /// Candidates were returned but none passed validation.
    #[error("No acceptable results; rejected_reasons={0}")]
    ResultRejected(String),

    #[error("db_unavailable")]
    DatabaseUnavailable,

    #[error("db_timeout")]
    DatabaseTimeout,

    #[error("db_error:{0}")]
    DatabaseError(String),

    /// No road name cleared the fuzzy threshold.
    #[error("No fuzzy match for road")]
    NoFuzzyMatch,

    /// No usable address-ranged segment for the target postcode/road.
    #[error("No usable address-range rows")]
    InterpolationImpossible,
}

impl ResolveError {
    /// Short machine-readable code used in trace records.
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::EmptyAddress => "empty_address",
            ResolveError::TaggingFailure(_) => "tagging_failure",
            ResolveError::MissingRequiredTags(_) => "missing_required_tags",
            ResolveError::NetworkTimeout => "timeout",
            ResolveError::RequestError(_) => "request_error",
            ResolveError::NoResultsReturned => "no_results",
            ResolveError::ResultRejected(_) => "result_rejected",
            ResolveError::DatabaseUnavailable => "db_unavailable",
            ResolveError::DatabaseTimeout => "db_timeout",
            ResolveError::DatabaseError(_) => "db_error",
            ResolveError::NoFuzzyMatch => "no_fuzzy_match",
            ResolveError::InterpolationImpossible => "interpolation_impossible",
        }
    }
}
