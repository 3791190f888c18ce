//! CLI subcommand implementations for tribute-scanner.
//!
//! Commands that do not involve the interactive TUI:
//!
//! - [`config`] - Print or change configuration values
//! - [`lookup`] - One-shot lookup of a single code
//!
//! # Usage
//!
//! ```ignore
//! use tribute_scanner::commands;
//!
//! commands::config::show(&mut std::io::stdout(), &config, None)?;
//! let found = commands::lookup::run(&config, "7891234567890", &handle)?;
//! ```

pub mod config;
pub mod lookup;

/// Crate version, shown by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
