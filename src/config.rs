//! Runtime configuration, loaded from a TOML file with env overrides for
//! the road-store credentials.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub search: SearchSettings,
    pub store: StoreSettings,
    pub resolver: ResolverSettings,
}

/// Search-service (Nominatim-compatible HTTP API) settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Candidate limit per query.
    pub limit: usize,
    pub country_code: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/search".to_string(),
            timeout_secs: 5,
            user_agent: "tamarack/0.1 (geocoder)".to_string(),
            limit: 10,
            country_code: "us".to_string(),
        }
    }
}

/// Road reference store (Postgres) settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreSettings {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub connect_timeout_secs: u64,
    pub statement_timeout_ms: u64,
    pub country_code: String,
    /// Proximity fallback radius around the postcode centroid.
    pub radius_m: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "localhost".to_string(),
            port: 5433,
            dbname: "nominatim".to_string(),
            user: "nominatim".to_string(),
            password: String::new(),
            connect_timeout_secs: 5,
            statement_timeout_ms: 8000,
            country_code: "us".to_string(),
            radius_m: 5000,
        }
    }
}

/// Cascade and validation settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ResolverSettings {
    /// Fuzzy road-match acceptance threshold, 0-100.
    pub fuzzy_threshold: f64,
    /// Reject candidates ranked broader than this.
    pub min_place_rank: i64,
    /// Reject candidates whose bounding box exceeds this edge length.
    pub max_bbox_linear_m: f64,
    pub workers: usize,
    pub cache_path: Option<String>,
    pub bad_address_path: Option<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 80.0,
            min_place_rank: 26,
            max_bbox_linear_m: 1609.34,
            workers: 8,
            cache_path: None,
            bad_address_path: None,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let mut config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus env overrides, for running without a config file.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NOM_DB_HOST") {
            self.store.host = host;
        }
        if let Ok(port) = std::env::var("NOM_DB_PORT") {
            if let Ok(port) = port.parse() {
                self.store.port = port;
            }
        }
        if let Ok(name) = std::env::var("NOM_DB_NAME") {
            self.store.dbname = name;
        }
        if let Ok(user) = std::env::var("NOM_DB_USER") {
            self.store.user = user;
        }
        if let Ok(pass) = std::env::var("NOM_DB_PASS") {
            self.store.password = pass;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let config = Config::default();
        assert_eq!(config.resolver.fuzzy_threshold, 80.0);
        assert_eq!(config.resolver.min_place_rank, 26);
        assert_eq!(config.resolver.max_bbox_linear_m, 1609.34);
        assert_eq!(config.store.radius_m, 5000);
        assert_eq!(config.search.limit, 10);
    }

    #[test]
    fn partial_toml_overlays_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [search]
            base_url = "http://geocode.internal:8080/search"

            [resolver]
            fuzzy_threshold = 85.0
            "#,
        )
        .unwrap();
        assert_eq!(parsed.search.base_url, "http://geocode.internal:8080/search");
        assert_eq!(parsed.search.timeout_secs, 5);
        assert_eq!(parsed.resolver.fuzzy_threshold, 85.0);
        assert_eq!(parsed.resolver.min_place_rank, 26);
    }
}
