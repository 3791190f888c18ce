//! Scan and tribute record types.
//!
//! [`ScanEvent`] is what the capture layer produces once per completed
//! scan. [`TributeRecord`] is what a lookup collaborator returns for a
//! code. The dispatcher treats records as opaque payloads keyed by code;
//! only the presentation layer looks inside via [`RecordShape`].

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys that may carry the record's identifying code, in priority order.
const CODE_KEYS: &[&str] = &["code", "codigo", "ean"];

/// Percentage-style tax attributes.
const PERCENTAGE_KEYS: &[&str] = &["icms", "pis", "cofins", "ipi"];

/// Fiscal classification code attributes.
const FISCAL_CODE_KEYS: &[&str] = &["ncm", "cest", "cfop", "cst"];

/// A single completed barcode scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEvent {
    /// Trimmed, non-empty scanned code.
    pub code: String,
    /// When the scan was committed.
    pub scanned_at: DateTime<Utc>,
}

impl ScanEvent {
    /// Creates a scan event stamped with the current time.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            scanned_at: Utc::now(),
        }
    }
}

/// A tax attribute value as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric attribute (rates, totals).
    Number(f64),
    /// Textual attribute (names, classification codes).
    Text(String),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// The full set of tax attributes returned for a product code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TributeRecord {
    /// Identifying code of the product (usually the EAN).
    pub code: String,
    /// Remaining attributes, keyed by backend field name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl TributeRecord {
    /// Creates an empty record for `code`.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Builds a record from a backend JSON object.
    ///
    /// The code comes from the first of `code`, `codigo` or `ean` present in
    /// the object, falling back to `scanned_code`. Every other scalar entry
    /// becomes a field; nulls, arrays and nested objects are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not a JSON object.
    pub fn from_json(scanned_code: &str, value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => anyhow::bail!("Expected a JSON object for code {}, got {}", scanned_code, other),
        };

        let code = CODE_KEYS
            .iter()
            .find_map(|key| match map.get(*key) {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| scanned_code.to_string());

        let mut fields = BTreeMap::new();
        for (key, value) in map {
            if CODE_KEYS.contains(&key.as_str()) {
                continue;
            }
            let field = match value {
                Value::Number(n) => match n.as_f64() {
                    Some(f) => FieldValue::Number(f),
                    None => FieldValue::Text(n.to_string()),
                },
                Value::String(s) => FieldValue::Text(s),
                Value::Bool(b) => FieldValue::Text(b.to_string()),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    log::debug!("Dropping non-scalar field '{}' from record {}", key, code);
                    continue;
                }
            };
            fields.insert(key, field);
        }

        Ok(Self { code, fields })
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Classifies which backend schema this record follows.
    pub fn shape(&self) -> RecordShape {
        let has_any = |keys: &[&str]| keys.iter().any(|k| self.fields.contains_key(*k));
        if has_any(FISCAL_CODE_KEYS) {
            RecordShape::FiscalCodes
        } else if has_any(PERCENTAGE_KEYS) {
            RecordShape::Percentages
        } else {
            RecordShape::Opaque
        }
    }
}

/// Which backend schema a record follows.
///
/// Deployments return either a simple set of percentage rates or a detailed
/// set of fiscal classification codes. Only presentation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// ICMS/PIS/COFINS/IPI percentage rates.
    Percentages,
    /// NCM/CEST/CFOP/CST classification codes (possibly with rates).
    FiscalCodes,
    /// Neither schema recognized.
    Opaque,
}

impl RecordShape {
    /// Field names shown first for this shape, in display order.
    pub fn leading_fields(self) -> &'static [&'static str] {
        match self {
            Self::Percentages => &["produto", "icms", "pis", "cofins", "ipi", "total"],
            Self::FiscalCodes => &["descricao", "produto", "ncm", "cest", "cfop", "cst", "icms"],
            Self::Opaque => &[],
        }
    }

    /// Whether numeric values of `field` are percentages in this shape.
    pub fn is_percentage(self, field: &str) -> bool {
        match self {
            Self::Percentages => PERCENTAGE_KEYS.contains(&field) || field == "total",
            Self::FiscalCodes => PERCENTAGE_KEYS.contains(&field),
            Self::Opaque => false,
        }
    }
}
