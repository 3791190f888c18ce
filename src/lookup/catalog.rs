//! Local JSON catalog of tribute records.
//!
//! The catalog file is a JSON array of product objects in the same shape
//! the tribute API returns, for example:
//!
//! ```json
//! [
//!   { "ean": "7891234567890", "produto": "Arroz 5kg", "icms": 18.5, "pis": 1.65 },
//!   { "codigo": "7890000000017", "ncm": "10063021", "cfop": "5102", "cst": "00" }
//! ]
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::TributeLookup;
use crate::record::TributeRecord;

/// In-memory table of records keyed by code.
#[derive(Debug, Clone, Default)]
pub struct CatalogLookup {
    records: HashMap<String, TributeRecord>,
}

impl CatalogLookup {
    /// Builds a catalog from records; later duplicates replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = TributeRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.code.clone(), record))
                .collect(),
        }
    }

    /// Loads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a JSON array, or
    /// an entry has no `code`/`codigo`/`ean` key.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let entries: Vec<serde_json::Value> = serde_json::from_str(&content)
            .with_context(|| format!("Catalog {} is not a JSON array", path.display()))?;

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let record = TributeRecord::from_json("", entry)
                .with_context(|| format!("Catalog entry {} is invalid", index))?;
            if record.code.is_empty() {
                anyhow::bail!("Catalog entry {} has no code", index);
            }
            records.push(record);
        }

        log::info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    /// Number of records in the catalog.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl TributeLookup for CatalogLookup {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn lookup(&self, code: &str) -> Result<Option<TributeRecord>> {
        Ok(self.records.get(code).cloned())
    }
}
