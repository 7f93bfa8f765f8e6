//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// election-insights - descriptive analytics for constituency election results
///
/// Reads a table of constituency results (Constituency, Leading Candidate,
/// Leading Party, Trailing Party, Margin) and writes a report of seat counts,
/// margin highlights, candidate comparisons and party rankings.
///
/// Examples:
///   election-insights --input election_results_2024.csv
///   election-insights -i results.csv --format json -o report.json
///   election-insights -i results.csv --top 5 --watch "RAHUL GANDHI,AMIT SHAH"
///   election-insights --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Results table to analyze (.csv, or .json for an array of records)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "ELECTION_INSIGHTS_INPUT",
        required_unless_present = "init_config"
    )]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to election_report.md or the value in the config file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .election-insights.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of parties in each trailing-party ranking
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Number of buckets in the margin histogram
    #[arg(long, value_name = "COUNT")]
    pub bins: Option<usize>,

    /// Number of raw rows in the data preview
    #[arg(long, value_name = "ROWS")]
    pub preview_rows: Option<usize>,

    /// Leading candidates to compare (comma-separated, exact names)
    ///
    /// Example: --watch "RAHUL GANDHI,NARENDRA MODI"
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub watch: Option<Vec<String>>,

    /// Leave the glossary out of the Markdown report
    #[arg(long)]
    pub no_glossary: bool,

    /// Generate a default .election-insights.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        if self.bins == Some(0) {
            return Err("--bins must be at least 1".to_string());
        }

        if let Some(ref watch) = self.watch {
            if watch.iter().any(|name| name.trim().is_empty()) {
                return Err("--watch names must not be empty".to_string());
            }
        }

        // Validate the input file
        match self.input {
            Some(ref input) if !input.exists() => {
                Err(format!("Input file does not exist: {}", input.display()))
            }
            Some(ref input) if !input.is_file() => {
                Err(format!("Input path is not a file: {}", input.display()))
            }
            Some(_) => Ok(()),
            None => Err("An input file is required (--input)".to_string()),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
