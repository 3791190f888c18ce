//! `config` subcommand.
//!
//! ```bash
//! tribute-scanner config                       # print the whole config
//! tribute-scanner config server_url            # print one key
//! tribute-scanner config server_url http://pdv:3001   # set and save one key
//! ```

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::config::Config;

/// Writes the whole config, or one key, as pretty JSON.
///
/// # Errors
///
/// Returns an error if `key` is not a config key or output fails.
pub fn show(out: &mut impl Write, config: &Config, key: Option<&str>) -> Result<()> {
    let value = match key {
        Some(key) => config.get_key(key)?,
        None => serde_json::to_value(config)?,
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    Ok(())
}

/// Sets one key and saves the config file under `dir`.
///
/// `config` should be the file's contents without environment overrides,
/// so overrides are not persisted.
///
/// # Errors
///
/// Returns an error if the key is unknown, the value does not fit the key,
/// or the file cannot be written.
pub fn set(config: &mut Config, dir: &Path, key: &str, value: &str) -> Result<()> {
    config.set_key(key, value)?;
    config.save_to(dir)?;
    log::info!("Set {} = {}", key, value);
    Ok(())
}
