//! Flat-file persistence for resolved addresses.
//!
//! One CSV row per normalized raw address; the four metadata columns hold
//! serialized diagnostics so a later run (or a human with a spreadsheet)
//! can reconstruct why an address landed where it did.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::reference::normalize_key;
use crate::resolver::{Resolution, SearchReport};
use crate::tagger::TagReport;

/// Persisted cache record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRow {
    pub address_raw: String,
    pub address_geocode: String,
    pub address_nominatim: String,
    pub latitude: String,
    pub longitude: String,
    pub method: String,
    pub error: String,
    pub result_metadata: String,
    pub tag_metadata: String,
    pub search_metadata: String,
    pub process_metadata: String,
}

fn to_json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

impl CacheRow {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        let tag_json = serde_json::to_value(&resolution.tag_report).unwrap_or(Value::Null);
        let search_json = serde_json::to_value(&resolution.search_report).unwrap_or(Value::Null);
        let mut process = Map::new();
        process.insert("tag_metadata".to_string(), tag_json.clone());
        process.insert("search_metadata".to_string(), search_json.clone());

        Self {
            address_raw: resolution.raw_address.clone(),
            address_geocode: if resolution.query.is_empty() {
                resolution.raw_address.clone()
            } else {
                resolution.query.clone()
            },
            address_nominatim: resolution.display_name.clone(),
            latitude: resolution.latitude.clone().unwrap_or_default(),
            longitude: resolution.longitude.clone().unwrap_or_default(),
            method: resolution.method.clone(),
            error: resolution.error.clone().unwrap_or_default(),
            result_metadata: to_json_string(&resolution.result_metadata),
            tag_metadata: to_json_string(&tag_json),
            search_metadata: to_json_string(&search_json),
            process_metadata: to_json_string(&Value::Object(process)),
        }
    }

    /// Rebuild a resolution from a persisted row. Metadata that fails to
    /// parse degrades to empty diagnostics rather than invalidating the
    /// cached coordinates.
    pub fn into_resolution(self) -> Resolution {
        let result_metadata: Map<String, Value> =
            serde_json::from_str(&self.result_metadata).unwrap_or_default();
        let tag_report: TagReport = serde_json::from_str(&self.tag_metadata).unwrap_or_default();
        let mut search_report: SearchReport =
            serde_json::from_str(&self.search_metadata).unwrap_or_default();
        search_report.cache_used = true;

        Resolution {
            raw_address: self.address_raw,
            query: self.address_geocode,
            latitude: (!self.latitude.is_empty()).then_some(self.latitude),
            longitude: (!self.longitude.is_empty()).then_some(self.longitude),
            display_name: self.address_nominatim,
            method: self.method,
            error: (!self.error.is_empty()).then_some(self.error),
            result_metadata,
            tag_report,
            search_report,
        }
    }
}

/// Load persisted rows keyed by normalized raw address. A missing file is
/// an empty cache, not an error.
pub fn load_cache_rows<P: AsRef<Path>>(path: P) -> Result<Vec<(String, CacheRow)>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open address cache: {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: CacheRow = match record {
            Ok(row) => row,
            Err(err) => {
                warn!(%err, "skipping unreadable cache row");
                continue;
            }
        };
        if row.address_raw.is_empty() {
            continue;
        }
        rows.push((normalize_key(&row.address_raw), row));
    }
    info!(count = rows.len(), path = %path.display(), "loaded address cache");
    Ok(rows)
}

/// Write the full cache back out, replacing the file.
pub fn save_cache_rows<P: AsRef<Path>>(path: P, rows: &[CacheRow]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache dir: {}", parent.display()))?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to write address cache: {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(count = rows.len(), path = %path.display(), "saved address cache");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_resolution() -> Resolution {
        Resolution {
            raw_address: "2 Old Walcott Ave, Jamestown RI 2835 USA".to_string(),
            query: "2, Old Walcott Avenue, 02835".to_string(),
            latitude: Some("41.4967".to_string()),
            longitude: Some("-71.3678".to_string()),
            display_name: "2, Walcott Avenue, Jamestown, RI".to_string(),
            method: "number_street_zip".to_string(),
            error: None,
            ..Default::default()
        }
    }

    #[test]
    fn row_round_trips_through_csv() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let resolution = sample_resolution();
        let row = CacheRow::from_resolution(&resolution);
        save_cache_rows(file.path(), &[row]).unwrap();

        let loaded = load_cache_rows(file.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        let (key, row) = &loaded[0];
        assert_eq!(key, "2 old walcott ave, jamestown ri 2835 usa");

        let restored = row.clone().into_resolution();
        assert_eq!(restored.latitude, resolution.latitude);
        assert_eq!(restored.longitude, resolution.longitude);
        assert_eq!(restored.display_name, resolution.display_name);
        assert_eq!(restored.method, resolution.method);
        assert!(restored.search_report.cache_used);
    }

    #[test]
    fn missing_file_is_empty() {
        assert!(load_cache_rows("/nonexistent/cache.csv").unwrap().is_empty());
    }

    #[test]
    fn unparsable_metadata_degrades_to_empty() {
        let mut row = CacheRow::from_resolution(&sample_resolution());
        row.result_metadata = "not json".to_string();
        row.tag_metadata = "{broken".to_string();
        let restored = row.into_resolution();
        assert!(restored.result_metadata.is_empty());
        assert_eq!(restored.latitude.as_deref(), Some("41.4967"));
    }
}
