//! Langharvest: per-language source sample collector.
//!
//! Langharvest shallow-clones public repositories and copies files with the
//! right extensions into one directory per language, until each directory
//! holds a configured number of bytes.
//!
//! # Modules
//!
//! - [`config`]: Language table, quota, and output locations
//! - [`layout`]: Directory setup and on-disk size measurement
//! - [`fetch`]: Shallow cloning through `git`
//! - [`collect`]: Candidate file discovery in a clone
//! - [`copy`]: Budget-bounded copying with collision renaming
//! - [`harvest`]: Per-language orchestration and run summary
//! - [`error`]: Error types for langharvest operations

pub mod collect;
pub mod config;
pub mod copy;
pub mod error;
pub mod fetch;
pub mod harvest;
pub mod layout;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

pub use error::HarvestError;

use config::{HarvestConfig, DEFAULT_CLONE_TIMEOUT_SECS, DEFAULT_OUTPUT_DIR, DEFAULT_QUOTA_BYTES};
use fetch::GitFetcher;

/// The langharvest CLI application.
#[derive(Parser)]
#[command(name = "langharvest")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    settings: Settings,
}

/// Available subcommands. Without one, a harvest is run.
#[derive(Subcommand)]
enum Commands {
    /// Print the language table that would be used and exit.
    ListLanguages,
}

/// Settings shared by every command.
#[derive(clap::Args)]
struct Settings {
    /// Directory receiving one subdirectory per language.
    #[arg(long, env = "LANGHARVEST_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR, global = true)]
    output_dir: PathBuf,

    /// Target size of each language directory, in bytes.
    #[arg(long, env = "LANGHARVEST_QUOTA", default_value_t = DEFAULT_QUOTA_BYTES, global = true)]
    quota: u64,

    /// Give up on a single clone after this many seconds.
    #[arg(long, env = "LANGHARVEST_TIMEOUT_SECS", default_value_t = DEFAULT_CLONE_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,

    /// YAML language table to use instead of the built-in one.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only process these languages (repeatable).
    #[arg(long = "language", value_name = "NAME", global = true)]
    languages: Vec<String>,

    /// Format of the final summary.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text, global = true)]
    report: ReportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the langharvest CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), HarvestError> {
    let cli = Cli::parse();
    init_tracing();

    let config = build_config(&cli.settings)?;

    match cli.command {
        Some(Commands::ListLanguages) => {
            print_languages(&config);
            Ok(())
        }
        None => run_harvest(&config, cli.settings.report),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("langharvest=info"));
    // A second init (e.g. from an embedding program) is not an error for us.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_config(settings: &Settings) -> Result<HarvestConfig, HarvestError> {
    let mut config = HarvestConfig::new(&settings.output_dir)
        .with_quota(settings.quota)
        .with_clone_timeout(Duration::from_secs(settings.timeout_secs));

    if let Some(path) = &settings.config {
        config = config.with_languages(crate::config::load_language_table(path)?);
    }
    config.retain_languages(&settings.languages)?;
    config.validate()?;

    Ok(config)
}

/// Execute a harvest over every configured language.
fn run_harvest(config: &HarvestConfig, format: ReportFormat) -> Result<(), HarvestError> {
    // Nothing on disk is touched until git is known to be available.
    let git = fetch::find_git()?;
    let fetcher = GitFetcher::new(git, config.clone_timeout);

    tracing::info!(
        output = %config.output_root.display(),
        quota = config.quota_bytes,
        languages = config.languages.len(),
        "starting harvest"
    );

    let report = harvest::harvest_all(config, &fetcher)?;

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print!("{}", report),
    }

    Ok(())
}

fn print_languages(config: &HarvestConfig) {
    for lang in &config.languages {
        println!("{}: {}", lang.name, lang.extensions.join(" "));
        if lang.repositories.is_empty() {
            println!("  (no candidate repositories)");
        }
        for repo in &lang.repositories {
            println!("  {}", repo);
        }
    }
}
