//! `lookup` subcommand: resolve one code and print the record.
//!
//! Goes through the same collaborator and failure normalization as a scan,
//! so "not found" and "backend unreachable" both report a miss.

use std::io::Write;

use anyhow::Result;
use tokio::runtime::Handle;

use crate::config::Config;
use crate::lookup::{self, TributeLookup};

/// Looks up `code` with the configured source and prints the outcome.
///
/// Returns whether a record was found.
///
/// # Errors
///
/// Returns an error if the lookup source cannot be built (for example a
/// missing catalog file).
pub fn run(config: &Config, code: &str, runtime: &Handle) -> Result<bool> {
    let source = lookup::from_config(config)?;
    print_lookup(&mut std::io::stdout(), source.as_ref(), code, runtime)
}

/// Resolves `code` against `source` and writes the record as pretty JSON,
/// or a not-found message.
///
/// # Errors
///
/// Returns an error if `code` is blank or writing fails.
pub fn print_lookup(
    out: &mut impl Write,
    source: &dyn TributeLookup,
    code: &str,
    runtime: &Handle,
) -> Result<bool> {
    let code = code.trim();
    if code.is_empty() {
        anyhow::bail!("Code must not be empty");
    }

    match runtime.block_on(lookup::resolve(source, code)) {
        Some(record) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
            Ok(true)
        }
        None => {
            writeln!(out, "Produto não encontrado: {}", code)?;
            Ok(false)
        }
    }
}
