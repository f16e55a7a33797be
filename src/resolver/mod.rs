//! The resolution cascade.
//!
//! A fixed, ordered list of lookup strategies runs until one produces an
//! accepted coordinate: exact search on (number, street, zip), exact search
//! on (number, street, city, state), a fuzzy road-name re-search inside the
//! zip, and finally interpolation along the matched road's address ranges.
//! Strategies missing their required tags are skipped with the reason
//! recorded; a fully exhausted cascade is a normal outcome carrying the last
//! observed error, never a panic.

mod cache;
mod persist;
mod strategy;
mod trace;

pub use cache::ResolutionCache;
pub use persist::{load_cache_rows, save_cache_rows, CacheRow};
pub use strategy::StrategyKind;
pub use trace::{AttemptStatus, CandidateRecord, SearchReport, StrategyTrace, TigerSummary};

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ResolveError;
use crate::fuzzy::{best_match, RoadMatch};
use crate::nominatim::{NominatimClient, SearchCandidate};
use crate::normalize::normalize;
use crate::reference::{normalize_key, RewriteTable};
use crate::tagger::{tag, TagReport};
use crate::tiger::{locate, RoadStore, StoreError};
use crate::validate::{check_candidate, AcceptanceDecision, ExpectedLocation, ValidationConfig};

/// Terminal value for one raw address. Immutable once produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resolution {
    /// Input string after any bad-address rewrite.
    pub raw_address: String,
    /// The query the winning strategy sent, empty if nothing was attempted.
    pub query: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub display_name: String,
    pub method: String,
    pub error: Option<String>,
    pub result_metadata: Map<String, Value>,
    pub tag_report: TagReport,
    pub search_report: SearchReport,
}

impl Resolution {
    pub fn found(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// An accepted coordinate, before assembly into a `Resolution`.
struct ResolvedPoint {
    latitude: String,
    longitude: String,
    display_name: String,
    method: String,
    query: String,
    result_metadata: Map<String, Value>,
}

/// Address resolver: shared, read-mostly state plus the resolution cache.
/// One instance serves every worker.
pub struct Resolver {
    client: NominatimClient,
    store: RoadStore,
    rewrites: RewriteTable,
    cache: ResolutionCache,
    validation: ValidationConfig,
    fuzzy_threshold: f64,
}

impl Resolver {
    pub fn new(config: &Config) -> Result<Self> {
        let client = NominatimClient::new(&config.search)?;
        let store = if config.store.enabled {
            RoadStore::connect(&config.store)?
        } else {
            info!("Road reference store disabled; fuzzy/interpolation strategies unavailable");
            RoadStore::disabled()
        };
        let rewrites = match &config.resolver.bad_address_path {
            Some(path) => RewriteTable::load(path)?,
            None => RewriteTable::empty(),
        };

        Ok(Self {
            client,
            store,
            rewrites,
            cache: ResolutionCache::new(),
            validation: ValidationConfig {
                max_linear_m: config.resolver.max_bbox_linear_m,
                min_place_rank: config.resolver.min_place_rank,
            },
            fuzzy_threshold: config.resolver.fuzzy_threshold,
        })
    }

    pub fn client(&self) -> &NominatimClient {
        &self.client
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Seed the in-memory cache from a persisted CSV. Returns the number of
    /// entries loaded.
    pub fn load_persisted_cache<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let rows = load_cache_rows(path)?;
        let count = rows.len();
        for (key, row) in rows {
            self.cache.seed(key, row.into_resolution());
        }
        Ok(count)
    }

    /// Write every resolved entry back out. Returns the number of rows
    /// written.
    pub fn save_persisted_cache<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let mut rows: Vec<CacheRow> = self
            .cache
            .snapshot()
            .iter()
            .map(|resolution| CacheRow::from_resolution(resolution))
            .collect();
        rows.sort_by(|a, b| a.address_raw.cmp(&b.address_raw));
        save_cache_rows(path, &rows)?;
        Ok(rows.len())
    }

    /// Resolve one raw address, going through the shared cache. Equal keys
    /// resolve externally at most once per run.
    pub async fn resolve(&self, raw: &str) -> Arc<Resolution> {
        let trimmed = raw.trim();
        let working = self.rewrites.lookup(trimmed).unwrap_or(trimmed);
        let key = normalize_key(working);
        if key.is_empty() {
            return Arc::new(self.empty_resolution(trimmed));
        }
        self.cache
            .get_or_resolve(&key, || self.resolve_once(raw.to_string()))
            .await
    }

    fn empty_resolution(&self, raw: &str) -> Resolution {
        let err = ResolveError::EmptyAddress;
        let mut report = SearchReport {
            raw_address: raw.to_string(),
            final_error: Some(err.to_string()),
            ..Default::default()
        };
        report.method_accepted = None;
        Resolution {
            raw_address: raw.to_string(),
            error: Some(err.to_string()),
            search_report: report,
            ..Default::default()
        }
    }

    /// Run the full pipeline for one address, cache not consulted.
    async fn resolve_once(&self, raw: String) -> Resolution {
        let started = Instant::now();
        let trimmed = raw.trim().to_string();

        let mut tag_report = TagReport {
            raw_address: trimmed.clone(),
            ..Default::default()
        };
        let mut report = SearchReport {
            raw_address: trimmed.clone(),
            ..Default::default()
        };

        let mut working = trimmed.clone();
        if let Some(update) = self.rewrites.lookup(&trimmed) {
            info!(from = %trimmed, to = update, "bad-address rewrite applied");
            working = update.to_string();
            report.bad_address_rewrite_used = true;
            report.raw_address = working.clone();
            tag_report.raw_address = working.clone();
        }

        let normalized = normalize(&working);
        let tags = match tag(&normalized, &self.client, &mut tag_report).await {
            Ok(tags) => tags,
            Err(err) => {
                return self.finish(working, None, Some(err), tag_report, report, started);
            }
        };

        let number = tags.address_number.clone().unwrap_or_default();
        let street = tags.street_value();
        let expected_zip = tags.zip_code.clone().unwrap_or_default();
        let expected_city = tags.place_name.clone().unwrap_or_default();
        let expected_state = tags.state_name.clone().unwrap_or_default();
        let expected = ExpectedLocation {
            zip: &expected_zip,
            city: &expected_city,
            state: &expected_state,
        };

        let mut point: Option<ResolvedPoint> = None;
        let mut last_error: Option<ResolveError> = None;
        let mut fuzzy_road: Option<RoadMatch> = None;

        for kind in StrategyKind::CASCADE {
            if point.is_some() {
                break;
            }
            match kind {
                StrategyKind::NumberStreetZip | StrategyKind::NumberStreetCityState => {
                    let missing = kind.missing_tags(&tags);
                    if !missing.is_empty() {
                        let joined = missing.join(",");
                        report.attempts.push(StrategyTrace::skipped(
                            kind.name(),
                            &format!("missing_required_tags:{joined}"),
                            &expected_zip,
                            &expected_city,
                        ));
                        if last_error.is_none() {
                            last_error = Some(ResolveError::MissingRequiredTags(joined));
                        }
                        continue;
                    }
                    let query = match kind {
                        StrategyKind::NumberStreetZip => {
                            join_query(&[&number, &street, &expected_zip])
                        }
                        _ => join_query(&[&number, &street, &expected_city, &expected_state]),
                    };
                    let (trace, accepted, error) = self
                        .search_and_validate(kind.name(), &query, &expected, &mut report)
                        .await;
                    report.attempts.push(trace);
                    if accepted.is_some() {
                        point = accepted;
                    } else if error.is_some() {
                        last_error = error;
                    }
                }
                StrategyKind::FuzzyStreetInZip => {
                    let missing = kind.missing_tags(&tags);
                    if !missing.is_empty() {
                        let joined = missing.join(",");
                        report.attempts.push(StrategyTrace::skipped(
                            kind.name(),
                            &format!("missing_required_tags:{joined}"),
                            &expected_zip,
                            &expected_city,
                        ));
                        if last_error.is_none() {
                            last_error = Some(ResolveError::MissingRequiredTags(joined));
                        }
                        continue;
                    }

                    report.fuzzy_attempted = true;
                    let names = match self.store.road_names(&expected_zip).await {
                        Ok(names) => names,
                        Err(store_err) => {
                            let err = into_resolve_error(store_err);
                            report.attempts.push(StrategyTrace::skipped(
                                kind.name(),
                                &format!("postcode_lookup_error:{}", err.code()),
                                &expected_zip,
                                &expected_city,
                            ));
                            last_error = Some(err);
                            continue;
                        }
                    };
                    report.fuzzy_candidate_count = names.len();

                    let Some(road) = best_match(&street, &names, self.fuzzy_threshold) else {
                        report.attempts.push(StrategyTrace::skipped(
                            kind.name(),
                            "no_fuzzy_match",
                            &expected_zip,
                            &expected_city,
                        ));
                        if last_error.is_none() {
                            last_error = Some(ResolveError::NoFuzzyMatch);
                        }
                        continue;
                    };
                    report.fuzzy_top_score = Some(road.score);
                    report.fuzzy_match_accepted = true;
                    debug!(street = %street, matched = %road.name, score = road.score,
                        "re-querying with fuzzy-matched road");

                    let query = join_query(&[&number, &road.name, &expected_zip]);
                    let (trace, accepted, error) = self
                        .search_and_validate(kind.name(), &query, &expected, &mut report)
                        .await;
                    report.attempts.push(trace);
                    if accepted.is_some() {
                        point = accepted;
                    } else if error.is_some() {
                        last_error = error;
                    }
                    fuzzy_road = Some(road);
                }
                StrategyKind::TigerExtrapolateSnap => {
                    let Some(road) = fuzzy_road.clone() else {
                        report.attempts.push(StrategyTrace::skipped(
                            kind.name(),
                            "no_fuzzy_road_match",
                            &expected_zip,
                            &expected_city,
                        ));
                        continue;
                    };
                    let (trace, accepted, error) = self
                        .interpolate_on_ranges(&road, &number, &expected_zip, &mut report)
                        .await;
                    report.attempts.push(trace);
                    if accepted.is_some() {
                        point = accepted;
                    } else if error.is_some() {
                        last_error = error;
                    }
                }
            }
        }

        self.finish(working, point, last_error, tag_report, report, started)
    }

    /// Run one search-service query and validate candidates in order,
    /// accepting the first that passes.
    async fn search_and_validate(
        &self,
        strategy: &'static str,
        query: &str,
        expected: &ExpectedLocation<'_>,
        report: &mut SearchReport,
    ) -> (StrategyTrace, Option<ResolvedPoint>, Option<ResolveError>) {
        let started = Instant::now();
        let mut trace = StrategyTrace::attempted(strategy, query, expected.zip, expected.city);

        let candidates = match self.client.search(query, false).await {
            Ok(candidates) => candidates,
            Err(err) => {
                let err = match err {
                    crate::nominatim::SearchServiceError::Timeout => ResolveError::NetworkTimeout,
                    crate::nominatim::SearchServiceError::Request(m) => {
                        ResolveError::RequestError(m)
                    }
                };
                trace.status = AttemptStatus::Error;
                trace.error = Some(err.to_string());
                trace.elapsed_ms = started.elapsed().as_millis() as u64;
                return (trace, None, Some(err));
            }
        };

        report.results_returned_total += candidates.len();
        *report
            .results_returned_by_strategy
            .entry(strategy.to_string())
            .or_insert(0) += candidates.len();

        if candidates.is_empty() {
            let err = ResolveError::NoResultsReturned;
            trace.status = AttemptStatus::NoneFound;
            trace.error = Some(err.to_string());
            trace.elapsed_ms = started.elapsed().as_millis() as u64;
            return (trace, None, Some(err));
        }

        trace.status = AttemptStatus::Returned;
        trace.number_results = candidates.len();

        let mut rejected_reasons: Vec<String> = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            let decision = check_candidate(candidate, expected, &self.validation);
            trace.candidates.push(CandidateRecord {
                result_index: index,
                display_name: candidate.display_name.clone(),
                class: candidate.class.clone(),
                kind: candidate.kind.clone(),
                place_rank: candidate.place_rank,
                accepted: decision.accepted,
                rejection_reason: (!decision.accepted).then(|| decision.reason_string()),
            });

            if decision.accepted {
                debug!(strategy, display_name = %candidate.display_name, "candidate accepted");
                trace.validation = Some("accepted".to_string());
                trace.accepted_index = Some(index);
                trace.elapsed_ms = started.elapsed().as_millis() as u64;
                let point =
                    accepted_point(strategy, query, candidates.len(), index, candidate, &decision);
                return (trace, Some(point), None);
            }
            rejected_reasons.push(decision.reason_string());
        }

        let err = ResolveError::ResultRejected(rejected_reasons.join(" | "));
        trace.validation = Some("rejected".to_string());
        trace.validation_reason = Some(rejected_reasons.join(" | "));
        trace.error = Some(err.to_string());
        trace.elapsed_ms = started.elapsed().as_millis() as u64;
        (trace, None, Some(err))
    }

    /// Final fallback: interpolate/snap along the fuzzy-matched road's
    /// address ranges.
    async fn interpolate_on_ranges(
        &self,
        road: &RoadMatch,
        number: &str,
        zip: &str,
        report: &mut SearchReport,
    ) -> (StrategyTrace, Option<ResolvedPoint>, Option<ResolveError>) {
        let name = StrategyKind::TigerExtrapolateSnap.name();
        let started = Instant::now();
        let query = format!(
            "postcode={}; street_like={}; address_number={}",
            zip, road.name, number
        );
        let mut trace = StrategyTrace::attempted(name, &query, zip, "");
        report.tiger.attempted = true;
        report.tiger.outcome = "unsuccessful".to_string();

        macro_rules! bail {
            ($status:expr, $error_text:expr, $err:expr) => {{
                trace.status = $status;
                trace.error = Some($error_text.to_string());
                trace.elapsed_ms = started.elapsed().as_millis() as u64;
                report.tiger.error = Some($error_text.to_string());
                report.tiger.elapsed_ms = trace.elapsed_ms;
                return (trace, None, Some($err));
            }};
        }

        let Some(house_number) = parse_house_number(number) else {
            bail!(
                AttemptStatus::Skipped,
                "missing_required_inputs:address_number",
                ResolveError::MissingRequiredTags("AddressNumber".to_string())
            );
        };

        let segments = match self.store.segments(zip, &road.name).await {
            Ok(segments) => segments,
            Err(store_err) => {
                let err = into_resolve_error(store_err);
                let text = err.to_string();
                bail!(AttemptStatus::Error, text, err);
            }
        };

        trace.number_results = segments.len();
        report.tiger.rows_returned = segments.len();
        if segments.is_empty() {
            bail!(
                AttemptStatus::NoneFound,
                "no_address_range_rows",
                ResolveError::InterpolationImpossible
            );
        }

        trace.status = AttemptStatus::Returned;
        for (index, segment) in segments.iter().enumerate() {
            trace.candidates.push(CandidateRecord {
                result_index: index,
                display_name: segment.road_name.clone(),
                class: segment.road_class.clone(),
                kind: segment.road_type.clone(),
                place_rank: None,
                accepted: false,
                rejection_reason: Some("not_selected".to_string()),
            });
        }

        let Some(located) = locate(house_number, &segments) else {
            trace.validation = Some("rejected".to_string());
            trace.validation_reason = Some("no_usable_rows".to_string());
            bail!(
                AttemptStatus::Returned,
                ResolveError::InterpolationImpossible.to_string(),
                ResolveError::InterpolationImpossible
            );
        };

        let chosen = &segments[located.segment_index];
        trace.candidates[located.segment_index].accepted = true;
        trace.candidates[located.segment_index].rejection_reason = None;
        trace.validation = Some("accepted".to_string());
        trace.validation_reason = Some(located.mode.to_string());
        trace.accepted_index = Some(located.segment_index);
        trace.elapsed_ms = started.elapsed().as_millis() as u64;

        let latitude = format!("{:.7}", located.lat);
        let longitude = format!("{:.7}", located.lon);
        let display_name = format!(
            "{}, {}, {}, TIGER extrapolate/snap",
            house_number, chosen.road_name, zip
        );

        let mut meta = Map::new();
        meta.insert("strategy".to_string(), json!(name));
        meta.insert("search_query".to_string(), json!(query));
        meta.insert("number_results".to_string(), json!(segments.len()));
        meta.insert(
            "accepted_index".to_string(),
            json!(located.segment_index),
        );
        meta.insert("place_id".to_string(), json!(chosen.place_id));
        meta.insert("lat".to_string(), json!(latitude));
        meta.insert("lon".to_string(), json!(longitude));
        meta.insert("class".to_string(), json!(chosen.road_class));
        meta.insert("type".to_string(), json!(chosen.road_type));
        meta.insert("addresstype".to_string(), json!(name));
        meta.insert("display_name".to_string(), json!(display_name));
        meta.insert("addr_house_number".to_string(), json!(house_number));
        meta.insert("addr_road".to_string(), json!(chosen.road_name));
        meta.insert("addr_postcode".to_string(), json!(zip));
        meta.insert("mode".to_string(), json!(located.mode));
        meta.insert("selection".to_string(), json!(located.detail));

        report.tiger.outcome = located.mode.to_string();
        report.tiger.error = None;
        report.tiger.elapsed_ms = trace.elapsed_ms;
        info!(mode = %located.mode, lat = %latitude, lon = %longitude,
            "address-range interpolation succeeded");

        let point = ResolvedPoint {
            latitude,
            longitude,
            display_name,
            method: name.to_string(),
            query,
            result_metadata: meta,
        };
        (trace, Some(point), None)
    }

    fn finish(
        &self,
        working: String,
        point: Option<ResolvedPoint>,
        last_error: Option<ResolveError>,
        tag_report: TagReport,
        mut report: SearchReport,
        started: Instant,
    ) -> Resolution {
        report.successful = point.is_some();
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        match point {
            Some(point) => {
                report.method_accepted = Some(point.method.clone());
                report.final_error = None;
                Resolution {
                    raw_address: working,
                    query: point.query,
                    latitude: Some(point.latitude),
                    longitude: Some(point.longitude),
                    display_name: point.display_name,
                    method: point.method,
                    error: None,
                    result_metadata: point.result_metadata,
                    tag_report,
                    search_report: report,
                }
            }
            None => {
                let error = last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "No result".to_string());
                report.method_accepted = None;
                report.final_error = Some(error.clone());
                Resolution {
                    raw_address: working,
                    query: String::new(),
                    latitude: None,
                    longitude: None,
                    display_name: String::new(),
                    method: String::new(),
                    error: Some(error),
                    result_metadata: Map::new(),
                    tag_report,
                    search_report: report,
                }
            }
        }
    }
}

/// Join non-empty query parts with ", ".
fn join_query(parts: &[&str]) -> String {
    parts
        .iter()
        .copied()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// First run of digits in the tagged address number.
fn parse_house_number(value: &str) -> Option<i64> {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn into_resolve_error(err: StoreError) -> ResolveError {
    match err {
        StoreError::Unavailable => ResolveError::DatabaseUnavailable,
        StoreError::Timeout => ResolveError::DatabaseTimeout,
        StoreError::Query(message) => ResolveError::DatabaseError(message),
    }
}

/// Build the result metadata for an accepted search-service candidate.
fn accepted_point(
    strategy: &str,
    query: &str,
    number_results: usize,
    index: usize,
    candidate: &SearchCandidate,
    decision: &AcceptanceDecision,
) -> ResolvedPoint {
    let address = candidate.address.clone().unwrap_or_default();

    let mut meta = Map::new();
    meta.insert("strategy".to_string(), json!(strategy));
    meta.insert("search_query".to_string(), json!(query));
    meta.insert("number_results".to_string(), json!(number_results));
    meta.insert("accepted_index".to_string(), json!(index));
    meta.insert("osm_type".to_string(), json!(candidate.osm_type));
    meta.insert("osm_id".to_string(), json!(candidate.osm_id));
    meta.insert("place_id".to_string(), json!(candidate.place_id));
    meta.insert("lat".to_string(), json!(candidate.lat));
    meta.insert("lon".to_string(), json!(candidate.lon));
    meta.insert("place_rank".to_string(), json!(candidate.place_rank));
    meta.insert("class".to_string(), json!(candidate.class));
    meta.insert("type".to_string(), json!(candidate.kind));
    meta.insert("addresstype".to_string(), json!(candidate.addresstype));
    meta.insert("importance".to_string(), json!(candidate.importance));
    meta.insert("display_name".to_string(), json!(candidate.display_name));
    meta.insert(
        "addr_house_number".to_string(),
        json!(address.house_number),
    );
    meta.insert("addr_road".to_string(), json!(address.road));
    meta.insert("addr_postcode".to_string(), json!(address.postcode));
    meta.insert("addr_city".to_string(), json!(address.city_level()));
    meta.insert("addr_state".to_string(), json!(address.state_value()));
    meta.insert(
        "validation".to_string(),
        Value::Object(decision.diagnostics.clone()),
    );

    ResolvedPoint {
        latitude: candidate.lat.clone(),
        longitude: candidate.lon.clone(),
        display_name: candidate.display_name.clone(),
        method: strategy.to_string(),
        query: query.to_string(),
        result_metadata: meta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_address_resolves_to_error() {
        let resolver = Resolver::new(&Config::default()).unwrap();
        let resolution = resolver.resolve("   ").await;
        assert!(!resolution.found());
        assert_eq!(resolution.error.as_deref(), Some("Empty address"));
        assert_eq!(
            resolution.search_report.final_error.as_deref(),
            Some("Empty address")
        );
    }

    #[tokio::test]
    async fn cached_address_is_returned_byte_identical() {
        let resolver = Resolver::new(&Config::default()).unwrap();
        let cached = Resolution {
            raw_address: "2 Old Walcott Ave, Jamestown RI 02835".to_string(),
            latitude: Some("41.4967".to_string()),
            longitude: Some("-71.3678".to_string()),
            display_name: "2, Walcott Avenue, Jamestown".to_string(),
            method: "number_street_zip".to_string(),
            ..Default::default()
        };
        resolver.cache().seed(
            normalize_key("2 Old Walcott Ave, Jamestown RI 02835"),
            cached,
        );

        // same address modulo case and whitespace: both hit the seeded entry
        let first = resolver
            .resolve("2 Old Walcott Ave,  Jamestown RI 02835")
            .await;
        let second = resolver
            .resolve("2 OLD WALCOTT AVE, JAMESTOWN RI 02835")
            .await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.latitude.as_deref(), Some("41.4967"));
        assert_eq!(first.longitude.as_deref(), Some("-71.3678"));
        assert_eq!(first.method, "number_street_zip");
    }

    #[test]
    fn join_query_drops_empty_parts() {
        assert_eq!(
            join_query(&["2", "Old Walcott Avenue", "", "02835"]),
            "2, Old Walcott Avenue, 02835"
        );
        assert_eq!(join_query(&["", ""]), "");
    }

    #[test]
    fn house_number_parses_first_digit_run() {
        assert_eq!(parse_house_number("123"), Some(123));
        assert_eq!(parse_house_number("123-125"), Some(123));
        assert_eq!(parse_house_number("lot 44"), Some(44));
        assert_eq!(parse_house_number("none"), None);
        assert_eq!(parse_house_number(""), None);
    }

    #[test]
    fn store_errors_map_to_taxonomy() {
        assert_eq!(
            into_resolve_error(StoreError::Unavailable),
            ResolveError::DatabaseUnavailable
        );
        assert_eq!(
            into_resolve_error(StoreError::Timeout),
            ResolveError::DatabaseTimeout
        );
        assert!(matches!(
            into_resolve_error(StoreError::Query("boom".to_string())),
            ResolveError::DatabaseError(_)
        ));
    }
}
