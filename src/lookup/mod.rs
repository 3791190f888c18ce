//! Lookup collaborators: where tribute records come from.
//!
//! The dispatcher only needs one operation, "fetch tribute data by code",
//! expressed by the [`TributeLookup`] trait. Implementations:
//!
//! ```text
//! TributeLookup (trait)
//!     │
//!     ├── HttpLookup       GET {server}/produto/{code} against the tribute API
//!     ├── SimulatedLookup  randomized percentage records, no backend
//!     └── CatalogLookup    records loaded from a local JSON file
//! ```
//!
//! # Outcomes
//!
//! `Ok(Some(record))` is a hit, `Ok(None)` is "not found", and `Err(_)` is
//! a transport or availability failure. [`resolve`] collapses the last two
//! into `None` before anything reaches the state machine.

pub mod catalog;
pub mod http;
pub mod simulated;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::{Config, LookupSource};
use crate::record::TributeRecord;

pub use catalog::CatalogLookup;
pub use http::HttpLookup;
pub use simulated::SimulatedLookup;

/// Source of tribute records for scanned codes.
#[async_trait]
pub trait TributeLookup: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetches the record for `code`.
    ///
    /// Returns `Ok(None)` when the code is unknown.
    async fn lookup(&self, code: &str) -> Result<Option<TributeRecord>>;
}

/// Runs a lookup and normalizes every outcome to a record or `None`.
///
/// Failures are logged here and never propagate: the dispatcher treats a
/// failed lookup exactly like a miss.
pub async fn resolve(lookup: &dyn TributeLookup, code: &str) -> Option<TributeRecord> {
    match lookup.lookup(code).await {
        Ok(Some(record)) => {
            log::info!("[{}] Found record for {}", lookup.name(), code);
            Some(record)
        }
        Ok(None) => {
            log::info!("[{}] No record for {}", lookup.name(), code);
            None
        }
        Err(e) => {
            log::warn!("[{}] Lookup for {} failed: {:#}", lookup.name(), code, e);
            None
        }
    }
}

/// Builds the lookup collaborator selected by `config.source`.
pub fn from_config(config: &Config) -> Result<Arc<dyn TributeLookup>> {
    let lookup: Arc<dyn TributeLookup> = match config.source {
        LookupSource::Http => Arc::new(HttpLookup::new(
            config.server_url.clone(),
            config.lookup_path.clone(),
            config.request_timeout(),
        )?),
        LookupSource::Simulated => {
            Arc::new(SimulatedLookup::new().with_latency(config.simulated_latency()))
        }
        LookupSource::Catalog => {
            let path = config
                .catalog_path
                .as_deref()
                .context("source is 'catalog' but no catalog_path is configured")?;
            Arc::new(CatalogLookup::load(path)?)
        }
    };
    log::info!("Using '{}' lookup source", lookup.name());
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FailingLookup;

    #[async_trait]
    impl TributeLookup for FailingLookup {
        fn name(&self) -> &str {
            "failing"
        }

        async fn lookup(&self, _code: &str) -> Result<Option<TributeRecord>> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_resolve_collapses_failure_to_none() {
        assert!(resolve(&FailingLookup, "123").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_passes_hits_through() {
        let catalog = CatalogLookup::from_records([TributeRecord::new("123")]);
        let record = resolve(&catalog, "123").await.unwrap();
        assert_eq!(record.code, "123");
        assert!(resolve(&catalog, "999").await.is_none());
    }

    #[test]
    fn test_from_config_catalog_requires_path() {
        let config = Config {
            source: LookupSource::Catalog,
            ..Config::default()
        };
        assert!(from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_builds_each_source() {
        let http = from_config(&Config::default()).unwrap();
        assert_eq!(http.name(), "http");

        let simulated = from_config(&Config {
            source: LookupSource::Simulated,
            ..Config::default()
        })
        .unwrap();
        assert_eq!(simulated.name(), "simulated");
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config_applies_simulated_latency() {
        let simulated = from_config(&Config {
            source: LookupSource::Simulated,
            simulated_latency_ms: 250,
            ..Config::default()
        })
        .unwrap();
        let start = tokio::time::Instant::now();
        assert!(simulated.lookup("789").await.unwrap().is_some());
        assert!(start.elapsed() >= std::time::Duration::from_millis(250));
    }
}
