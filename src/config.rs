//! Configuration loading and persistence.
//!
//! Handles reading and writing the scanner configuration file. Values are
//! layered: built-in defaults, then `config.json` in the config directory,
//! then `TRIBUTOS_*` environment variables, then CLI flags (applied by
//! `main`).

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::constants;

/// Keys accepted by [`Config::get_key`] and [`Config::set_key`].
pub const CONFIG_KEYS: &[&str] = &[
    "server_url",
    "lookup_path",
    "request_timeout",
    "refocus_delay_ms",
    "source",
    "catalog_path",
    "simulated_latency_ms",
];

/// Where tribute records come from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LookupSource {
    /// The tribute API over HTTP.
    #[default]
    Http,
    /// Randomized records, no backend needed.
    Simulated,
    /// Records from a local JSON catalog file.
    Catalog,
}

/// Configuration for the tribute scanner.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the tribute API.
    pub server_url: String,
    /// Path template for product lookups; `{code}` is replaced by the
    /// scanned code.
    pub lookup_path: String,
    /// HTTP request timeout in seconds.
    pub request_timeout: u64,
    /// Delay in milliseconds before the capture input is refocused.
    pub refocus_delay_ms: u64,
    /// Lookup collaborator to use.
    pub source: LookupSource,
    /// JSON catalog used when `source` is `catalog`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// Artificial delay in milliseconds before each simulated answer.
    pub simulated_latency_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3001".to_string(),
            lookup_path: "/produto/{code}".to_string(),
            request_timeout: constants::HTTP_REQUEST_TIMEOUT.as_secs(),
            refocus_delay_ms: constants::REFOCUS_DELAY.as_millis() as u64,
            source: LookupSource::Http,
            catalog_path: None,
            simulated_latency_ms: 0,
        }
    }
}

impl Config {
    /// Returns the configuration directory path, creating it if necessary.
    ///
    /// Directory selection priority:
    /// 1. `TRIBUTOS_CONFIG_DIR` env var: explicit override
    /// 2. `TRIBUTOS_ENV=test`: `<temp dir>/tribute-scanner-test`
    /// 3. Default: platform config dir + `tribute-scanner`
    pub fn config_dir() -> Result<PathBuf> {
        let dir = if let Ok(dir) = std::env::var("TRIBUTOS_CONFIG_DIR") {
            PathBuf::from(dir)
        } else if crate::env::is_test_mode() {
            std::env::temp_dir().join("tribute-scanner-test")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("tribute-scanner")
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        Ok(dir)
    }

    /// Loads configuration from the config directory with environment
    /// variable overrides applied.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_dir()?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads `config.json` from `dir`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let config_path = dir.join("config.json");
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", config_path.display()))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `TRIBUTOS_*` overrides read through `var`.
    ///
    /// Unparseable numeric or enum values are logged and ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(server_url) = var("TRIBUTOS_SERVER_URL") {
            self.server_url = server_url;
        }

        if let Some(lookup_path) = var("TRIBUTOS_LOOKUP_PATH") {
            self.lookup_path = lookup_path;
        }

        if let Some(timeout) = var("TRIBUTOS_REQUEST_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.request_timeout = secs,
                Err(_) => log::warn!("Ignoring invalid TRIBUTOS_REQUEST_TIMEOUT={}", timeout),
            }
        }

        if let Some(delay) = var("TRIBUTOS_REFOCUS_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(ms) => self.refocus_delay_ms = ms,
                Err(_) => log::warn!("Ignoring invalid TRIBUTOS_REFOCUS_DELAY_MS={}", delay),
            }
        }

        if let Some(source) = var("TRIBUTOS_SOURCE") {
            match LookupSource::from_str(&source, true) {
                Ok(parsed) => self.source = parsed,
                Err(_) => log::warn!("Ignoring invalid TRIBUTOS_SOURCE={}", source),
            }
        }

        if let Some(catalog) = var("TRIBUTOS_CATALOG") {
            self.catalog_path = Some(PathBuf::from(catalog));
        }

        if let Some(latency) = var("TRIBUTOS_SIMULATED_LATENCY_MS") {
            match latency.parse::<u64>() {
                Ok(ms) => self.simulated_latency_ms = ms,
                Err(_) => log::warn!("Ignoring invalid TRIBUTOS_SIMULATED_LATENCY_MS={}", latency),
            }
        }
    }

    /// Persists the current configuration to the config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_dir()?)
    }

    /// Persists the current configuration as `config.json` under `dir`.
    pub fn save_to(&self, dir: &Path) -> Result<()> {
        let config_path = dir.join("config.json");
        fs::write(&config_path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(())
    }

    /// HTTP request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Capture refocus delay as a [`Duration`].
    pub fn refocus_delay(&self) -> Duration {
        Duration::from_millis(self.refocus_delay_ms)
    }

    /// Simulated lookup latency as a [`Duration`].
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// Returns the JSON value of a single config key.
    pub fn get_key(&self, key: &str) -> Result<serde_json::Value> {
        ensure_known_key(key)?;
        let value = serde_json::to_value(self)?;
        Ok(value.get(key).cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Sets a single config key from its textual form.
    ///
    /// The value is parsed as JSON first so numbers stay numbers; anything
    /// that is not valid JSON is taken as a plain string. `source` accepts
    /// its variants in any case, like `TRIBUTOS_SOURCE`.
    pub fn set_key(&mut self, key: &str, raw: &str) -> Result<()> {
        ensure_known_key(key)?;
        let parsed = if key == "source" {
            let source = LookupSource::from_str(raw.trim(), true)
                .map_err(|e| anyhow::anyhow!("Invalid value for '{}': {}", key, e))?;
            serde_json::to_value(source)?
        } else {
            serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
        };

        let mut object = serde_json::to_value(&*self)?;
        let map = object
            .as_object_mut()
            .context("Config did not serialize to an object")?;
        map.insert(key.to_string(), parsed);

        *self = serde_json::from_value(object)
            .with_context(|| format!("Invalid value for '{}': {}", key, raw))?;
        Ok(())
    }
}

fn ensure_known_key(key: &str) -> Result<()> {
    if CONFIG_KEYS.contains(&key) {
        Ok(())
    } else {
        anyhow::bail!(
            "Unknown config key '{}' (expected one of: {})",
            key,
            CONFIG_KEYS.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:3001");
        assert_eq!(config.lookup_path, "/produto/{code}");
        assert_eq!(config.request_timeout, 10);
        assert_eq!(config.refocus_delay(), Duration::from_millis(100));
        assert_eq!(config.source, LookupSource::Http);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.server_url = "http://tributos.local:8080".to_string();
        config.source = LookupSource::Simulated;
        config.save_to(dir.path()).unwrap();

        let loaded = Config::load_from(dir.path()).unwrap();
        assert_eq!(loaded.server_url, "http://tributos.local:8080");
        assert_eq!(loaded.source, LookupSource::Simulated);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), r#"{"source":"catalog"}"#).unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.source, LookupSource::Catalog);
        assert_eq!(config.lookup_path, "/produto/{code}");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "not json").unwrap();
        assert!(Config::load_from(dir.path()).is_err());
    }

    #[test]
    fn test_overrides_apply_and_ignore_garbage() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TRIBUTOS_SERVER_URL", "http://api:3001"),
            ("TRIBUTOS_REQUEST_TIMEOUT", "soon"),
            ("TRIBUTOS_REFOCUS_DELAY_MS", "250"),
            ("TRIBUTOS_SOURCE", "Simulated"),
            ("TRIBUTOS_CATALOG", "/srv/catalog.json"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.server_url, "http://api:3001");
        assert_eq!(config.request_timeout, 10);
        assert_eq!(config.refocus_delay_ms, 250);
        assert_eq!(config.source, LookupSource::Simulated);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/srv/catalog.json")));
    }

    #[test]
    fn test_set_key_parses_numbers_and_strings() {
        let mut config = Config::default();
        config.set_key("request_timeout", "3").unwrap();
        config.set_key("server_url", "http://10.0.0.5:3001").unwrap();
        config.set_key("catalog_path", "/tmp/catalog.json").unwrap();

        assert_eq!(config.request_timeout, 3);
        assert_eq!(config.server_url, "http://10.0.0.5:3001");
        assert_eq!(config.get_key("catalog_path").unwrap(), "/tmp/catalog.json");
    }

    #[test]
    fn test_set_key_source_ignores_case() {
        let mut config = Config::default();
        config.set_key("source", "Simulated").unwrap();
        assert_eq!(config.source, LookupSource::Simulated);
        config.set_key("source", "CATALOG").unwrap();
        assert_eq!(config.source, LookupSource::Catalog);
        assert_eq!(config.get_key("source").unwrap(), "catalog");
        assert!(config.set_key("source", "ftp").is_err());
        assert_eq!(config.source, LookupSource::Catalog);
    }

    #[test]
    fn test_simulated_latency_key_and_override() {
        let mut config = Config::default();
        assert_eq!(config.simulated_latency(), Duration::ZERO);
        config.set_key("simulated_latency_ms", "400").unwrap();
        assert_eq!(config.simulated_latency(), Duration::from_millis(400));

        config.apply_overrides(|key| (key == "TRIBUTOS_SIMULATED_LATENCY_MS").then(|| "750".to_string()));
        assert_eq!(config.simulated_latency_ms, 750);
        config.apply_overrides(|key| (key == "TRIBUTOS_SIMULATED_LATENCY_MS").then(|| "slow".to_string()));
        assert_eq!(config.simulated_latency_ms, 750);
    }

    #[test]
    fn test_set_key_rejects_unknown_and_invalid() {
        let mut config = Config::default();
        assert!(config.set_key("token", "x").is_err());
        assert!(config.set_key("request_timeout", "\"ten\"").is_err());
        assert_eq!(config, Config::default());
    }
}
