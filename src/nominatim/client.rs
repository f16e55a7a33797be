//! HTTP client wrapper for the search service.

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::SearchSettings;

use super::SearchCandidate;

/// A failed search-service call. Timeouts are terminal for the strategy
/// that issued them, never retried.
#[derive(Debug, Clone, Error)]
pub enum SearchServiceError {
    #[error("Timeout")]
    Timeout,
    #[error("Request error: {0}")]
    Request(String),
}

impl From<reqwest::Error> for SearchServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchServiceError::Timeout
        } else {
            SearchServiceError::Request(err.to_string())
        }
    }
}

/// Search-service client with a fixed timeout and user agent.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: Client,
    base_url: Url,
    limit: usize,
    country_code: String,
}

impl NominatimClient {
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)?;
        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url,
            limit: settings.limit,
            country_code: settings.country_code.clone(),
        })
    }

    /// Run one free-text query and return the candidate list in service
    /// order. `restrict_country` adds the configured countrycodes filter
    /// (used by the exploratory reverse-state query).
    pub async fn search(
        &self,
        query: &str,
        restrict_country: bool,
    ) -> Result<Vec<SearchCandidate>, SearchServiceError> {
        let limit = self.limit.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("q", query),
            ("format", "json"),
            ("addressdetails", "1"),
            ("limit", &limit),
        ];
        if restrict_country {
            params.push(("countrycodes", &self.country_code));
        }

        let response = self
            .http
            .get(self.base_url.clone())
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        let candidates: Vec<SearchCandidate> = response.json().await?;
        debug!(query, count = candidates.len(), "search-service response");
        Ok(candidates)
    }

    /// Cheap reachability probe for health checks: a sibling `/status`
    /// endpoint when the base path is `/search`, the base URL otherwise.
    pub async fn reachable(&self) -> bool {
        let mut probe = self.base_url.clone();
        if probe.path().ends_with("/search") {
            let status_path = probe.path().replace("/search", "/status");
            probe.set_path(&status_path);
        }
        match self.http.get(probe).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
