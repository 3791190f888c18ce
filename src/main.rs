//! Tribute scanner CLI - barcode scan to tax attribute lookup.
//!
//! This is the main binary entry point. See the `tribute_scanner` library
//! for the core functionality.

use std::io::stdout;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mimalloc::MiMalloc;
use ratatui::{backend::CrosstermBackend, Terminal};
use tribute_scanner::{
    commands::{self, VERSION},
    env::Environment,
    headless::{self, HeadlessRunner},
    lookup,
    tui::{self, TerminalGuard, TuiRunner},
    App, Config, JsonLinesSink, LookupSource, SharedView,
};

/// Global allocator.
/// mimalloc provides better multi-threaded performance than the system allocator.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Global flag for signal-triggered shutdown (as Arc for signal-hook compatibility)
static SHUTDOWN_FLAG: std::sync::LazyLock<Arc<AtomicBool>> =
    std::sync::LazyLock::new(|| Arc::new(AtomicBool::new(false)));

fn register_signal_handlers() -> Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::flag;
    flag::register(SIGINT, Arc::clone(&SHUTDOWN_FLAG))?;
    flag::register(SIGTERM, Arc::clone(&SHUTDOWN_FLAG))?;
    flag::register(SIGHUP, Arc::clone(&SHUTDOWN_FLAG))?;
    Ok(())
}

/// Builds the runtime lookups are spawned on.
fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("tribute-lookup")
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Runs the scanner in headless mode (no TUI).
///
/// Codes are read from stdin, one per line; every session transition is
/// written to stdout as a JSON line. Useful for:
/// - Kiosks with the scanner attached to a serial console
/// - Piping codes from other tools
/// - Integration testing
fn run_headless(config: &Config) -> Result<()> {
    register_signal_handlers()?;

    let runtime = build_runtime()?;
    let source = lookup::from_config(config)?;
    log::info!(
        "Tribute scanner v{} started in headless mode (source: {})",
        VERSION,
        source.name()
    );

    let app = App::new(
        config,
        source,
        Box::new(JsonLinesSink::stdout()),
        runtime.handle().clone(),
    );
    let lines = headless::spawn_line_reader(std::io::BufReader::new(std::io::stdin()))?;
    let mut runner = HeadlessRunner::new(app, lines);
    runner.run(&SHUTDOWN_FLAG);

    runtime.shutdown_background();
    Ok(())
}

/// Runs the interactive scanner screen.
///
/// Everything that can fail is set up before the terminal enters raw mode
/// so errors stay readable.
fn run_tui(config: &Config) -> Result<()> {
    register_signal_handlers()?;

    let runtime = build_runtime()?;
    let source = lookup::from_config(config)?;
    let view = SharedView::new();
    let app = App::new(
        config,
        source,
        Box::new(view.clone()),
        runtime.handle().clone(),
    );

    let terminal_guard = TerminalGuard::enter()?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    log::info!("Tribute scanner v{} started", VERSION);

    let mut runner = TuiRunner::new(terminal, app, view, Arc::clone(&SHUTDOWN_FLAG));
    let result = runner.run();

    drop(terminal_guard);
    runtime.shutdown_background();
    result
}

/// Where TUI-mode logs go.
///
/// Uses `TRIBUTOS_LOG_FILE`, else `<config dir>/tribute-scanner.log`, else
/// `/tmp/tribute-scanner.log`.
fn log_file_path() -> PathBuf {
    if let Ok(path) = std::env::var("TRIBUTOS_LOG_FILE") {
        PathBuf::from(path)
    } else if let Ok(dir) = Config::config_dir() {
        dir.join("tribute-scanner.log")
    } else {
        PathBuf::from("/tmp/tribute-scanner.log")
    }
}

/// Sets up logging: to a file while the TUI owns the screen, to stderr
/// otherwise.
fn init_logging(to_file: bool) -> Result<()> {
    let env = Environment::current();
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(env.default_log_filter()));
    builder.format_timestamp_secs();

    if to_file {
        let log_path = log_file_path();
        let log_file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file at {}", log_path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(env_logger::Target::Stderr);
    }

    builder.try_init().context("Logger already initialized")?;
    log::debug!("Logging initialized ({} environment)", env);
    Ok(())
}

// CLI
#[derive(Parser, Debug)]
#[command(name = "tribute-scanner")]
#[command(version = VERSION)]
#[command(about = "Scan product barcodes and show their tax attributes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Lookup source selection shared by `start` and `lookup`.
#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Where records come from
    #[arg(long, value_enum)]
    source: Option<LookupSource>,
    /// JSON catalog file (implies --source catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Base URL of the tribute API
    #[arg(long)]
    server_url: Option<String>,
}

impl SourceArgs {
    /// Applies the flags on top of file and environment configuration.
    fn apply(self, config: &mut Config) {
        if let Some(catalog) = self.catalog {
            config.catalog_path = Some(catalog);
            config.source = LookupSource::Catalog;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(server_url) = self.server_url {
            config.server_url = server_url;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the scanner (interactive unless --headless)
    Start {
        /// Read codes from stdin and write JSON lines to stdout
        #[arg(long)]
        headless: bool,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Look up a single code and print the record
    Lookup {
        /// Product code (EAN)
        code: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the configuration, one key, or set a key
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, Commands::Start { headless: false, .. });
    init_logging(interactive)?;

    // Set up panic hook to log panics and ensure terminal cleanup
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        log::error!("PANIC: {:?}", panic_info);

        // Ensure terminal is cleaned up before printing panic
        if interactive {
            tui::guard::restore_terminal();
        }

        default_hook(panic_info);
    }));

    match cli.command {
        Commands::Start { headless, source } => {
            let mut config = Config::load()?;
            source.apply(&mut config);
            if headless {
                run_headless(&config)?;
            } else {
                run_tui(&config)?;
            }
        }
        Commands::Lookup { code, source } => {
            let mut config = Config::load()?;
            source.apply(&mut config);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            if !commands::lookup::run(&config, &code, runtime.handle())? {
                std::process::exit(1);
            }
        }
        Commands::Config { key, value } => match (key, value) {
            (key, None) => {
                let config = Config::load()?;
                commands::config::show(&mut stdout(), &config, key.as_deref())?;
            }
            (Some(key), Some(value)) => {
                let dir = Config::config_dir()?;
                let mut config = Config::load_from(&dir)?;
                commands::config::set(&mut config, &dir, &key, &value)?;
                println!("Set {} = {}", key, value);
            }
            (None, Some(_)) => anyhow::bail!("A value requires a key"),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_start_flags() {
        let cli = Cli::try_parse_from([
            "tribute-scanner",
            "start",
            "--headless",
            "--source",
            "simulated",
        ])
        .unwrap();
        match cli.command {
            Commands::Start { headless, source } => {
                assert!(headless);
                assert_eq!(source.source, Some(LookupSource::Simulated));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_catalog_flag_selects_catalog_source() {
        let args = SourceArgs {
            catalog: Some(PathBuf::from("/tmp/catalog.json")),
            ..SourceArgs::default()
        };
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.source, LookupSource::Catalog);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/catalog.json")));
    }

    #[test]
    fn test_explicit_source_wins_over_catalog_flag() {
        let args = SourceArgs {
            source: Some(LookupSource::Http),
            catalog: Some(PathBuf::from("c.json")),
            server_url: Some("http://pdv:3001".into()),
        };
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.source, LookupSource::Http);
        assert_eq!(config.server_url, "http://pdv:3001");
    }

    #[test]
    fn test_lookup_requires_code() {
        assert!(Cli::try_parse_from(["tribute-scanner", "lookup"]).is_err());
        let cli = Cli::try_parse_from(["tribute-scanner", "lookup", "789"]).unwrap();
        assert!(matches!(cli.command, Commands::Lookup { ref code, .. } if code == "789"));
    }

    #[test]
    fn test_config_positional_args() {
        let cli = Cli::try_parse_from(["tribute-scanner", "config", "server_url", "x"]).unwrap();
        match cli.command {
            Commands::Config { key, value } => {
                assert_eq!(key.as_deref(), Some("server_url"));
                assert_eq!(value.as_deref(), Some("x"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
