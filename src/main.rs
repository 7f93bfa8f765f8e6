//! election-insights - descriptive analytics for election results
//!
//! A CLI tool that loads a constituency-level results table and writes
//! a Markdown or JSON report of seat counts, margins and party rankings.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments, unreadable or malformed input, or no numeric margins

mod analysis;
mod cli;
mod config;
mod dataset;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use dataset::Dataset;
use report::ReportSettings;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("election-insights v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_report(args) {
        error!("Report failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default configuration file.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the watch list, rankings and output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the results, build the report and write it out.
fn run_report(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let input = args
        .input
        .as_deref()
        .context("No input file given")?;

    // Step 1: Load the results table
    if !args.quiet {
        println!("📥 Loading results: {}", input.display());
    }
    let dataset = Dataset::load(input, !args.quiet)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    if dataset.is_empty() {
        warn!("{} contains no result rows", input.display());
    }
    info!("Loaded {} constituencies", dataset.len());

    // Step 2: Aggregate
    let settings = ReportSettings::from(&config.report);
    let report = report::build_report(&dataset, &settings)
        .with_context(|| format!("Failed to analyze {}", input.display()))?;

    // Step 3: Render and save
    let output_path = PathBuf::from(&config.general.output);
    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, config.report.include_glossary)
        }
    };

    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if !args.quiet {
        println!("\n📊 Results Summary:");
        println!("   Constituencies: {}", report.metadata.total_rows);
        if report.metadata.missing_margins > 0 {
            println!(
                "   Missing margins: {}",
                report.metadata.missing_margins
            );
        }
        if let Some((party, seats)) = report.seats_won.first() {
            println!("   Most seats: {} ({})", party, seats);
        }
        println!(
            "   Highest margin: {} ({}, {})",
            report.highest_margin.candidate,
            report.highest_margin.party,
            models::format_number(report.highest_margin.margin)
        );
        println!(
            "   Duration: {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        println!(
            "\n✅ Report saved to: {}",
            output_path.display()
        );
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
