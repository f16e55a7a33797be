//! Known-bad-address rewrite table.
//!
//! Some raw addresses are wrong in ways no heuristic can repair (wrong town,
//! renamed street, typo'd number). Operators maintain a CSV mapping the bad
//! raw string to a corrected one; the resolver substitutes it before any
//! parsing.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::normalize_key;

/// CSV columns: `address_raw`, `address_update`.
#[derive(Debug, Clone, Default)]
pub struct RewriteTable {
    entries: HashMap<String, String>,
}

impl RewriteTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Bad-address table not found: {}", path.display());
            return Ok(Self::default());
        }

        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open bad-address table: {}", path.display()))?;
        let headers = reader.headers()?.clone();
        let raw_idx = headers
            .iter()
            .position(|h| h == "address_raw")
            .context("Column 'address_raw' not found")?;
        let update_idx = headers
            .iter()
            .position(|h| h == "address_update")
            .context("Column 'address_update' not found")?;

        let mut entries = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let raw = record.get(raw_idx).unwrap_or("").trim();
            let update = record.get(update_idx).unwrap_or("").trim();
            if raw.is_empty() || update.is_empty() {
                continue;
            }
            entries.insert(normalize_key(raw), update.to_string());
        }

        info!("Loaded {} bad-address rewrites", entries.len());
        Ok(Self { entries })
    }

    /// Replacement string for a raw address, if one is on file.
    pub fn lookup(&self, raw_address: &str) -> Option<&str> {
        self.entries
            .get(&normalize_key(raw_address))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn lookup_is_key_normalized() {
        let mut table = RewriteTable::default();
        table.entries.insert(
            normalize_key("12 Fake Rd, Nowhere RI"),
            "12 Main Rd, Jamestown RI 02835".to_string(),
        );
        assert_eq!(
            table.lookup("  12 FAKE  rd,  Nowhere RI ,"),
            Some("12 Main Rd, Jamestown RI 02835")
        );
        assert_eq!(table.lookup("13 Fake Rd"), None);
    }

    #[test]
    fn loads_csv_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "address_raw,address_update").unwrap();
        writeln!(file, "1 Elm St Providnce RI,1 Elm St Providence RI 02903").unwrap();
        writeln!(file, ",ignored").unwrap();
        file.flush().unwrap();

        let table = RewriteTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup("1 elm st providnce ri"),
            Some("1 Elm St Providence RI 02903")
        );
    }

    #[test]
    fn missing_file_is_empty_table() {
        let table = RewriteTable::load("/nonexistent/rewrites.csv").unwrap();
        assert!(table.is_empty());
    }
}
