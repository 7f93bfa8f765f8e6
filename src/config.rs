//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.election-insights.toml` files.

use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".election-insights.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Default report format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output() -> String {
    "election_report.md".to_string()
}

/// Report content settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows shown in the data preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Entries in the trailing-party rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Buckets in the margin histogram.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Leading candidates to compare, matched exactly.
    #[serde(default = "default_watch_list")]
    pub watch_list: Vec<String>,

    /// Include the glossary of election terms.
    #[serde(default = "default_true")]
    pub include_glossary: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
            top_n: default_top_n(),
            histogram_bins: default_histogram_bins(),
            watch_list: default_watch_list(),
            include_glossary: true,
        }
    }
}

fn default_preview_rows() -> usize {
    15
}

fn default_top_n() -> usize {
    10
}

fn default_histogram_bins() -> usize {
    20
}

fn default_watch_list() -> Vec<String> {
    vec!["RAHUL GANDHI", "NARENDRA MODI", "AMIT SHAH"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        if let Some(rows) = args.preview_rows {
            self.report.preview_rows = rows;
        }
        if let Some(top) = args.top {
            self.report.top_n = top;
        }
        if let Some(bins) = args.bins {
            self.report.histogram_bins = bins;
        }
        if let Some(ref watch) = args.watch {
            self.report.watch_list = watch.clone();
        }
        if args.no_glossary {
            self.report.include_glossary = false;
        }
    }

    /// Reject settings that would produce empty rankings or histograms.
    ///
    /// Run after [`Config::merge_with_args`] so file values get the same
    /// checks as command-line flags.
    pub fn validate(&self) -> Result<()> {
        if self.report.top_n == 0 {
            bail!("report.top_n must be at least 1");
        }
        if self.report.histogram_bins == 0 {
            bail!("report.histogram_bins must be at least 1");
        }
        if self.report.watch_list.iter().any(|name| name.trim().is_empty()) {
            bail!("report.watch_list names must not be empty");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "election_report.md");
        assert_eq!(config.general.format, OutputFormat::Markdown);
        assert_eq!(config.report.preview_rows, 15);
        assert_eq!(config.report.top_n, 10);
        assert_eq!(config.report.histogram_bins, 20);
        assert!(config.report.watch_list.contains(&"NARENDRA MODI".to_string()));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.json"
format = "json"

[report]
top_n = 5
watch_list = ["SHASHI THAROOR"]
include_glossary = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.json");
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.report.histogram_bins, 20);
        assert_eq!(config.report.watch_list, vec!["SHASHI THAROOR"]);
        assert!(!config.report.include_glossary);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = crate::cli::tests::make_args();
        args.output = Some(PathBuf::from("out.json"));
        args.format = Some(OutputFormat::Json);
        args.bins = Some(8);

        config.merge_with_args(&args);

        assert_eq!(config.general.output, "out.json");
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.report.histogram_bins, 8);
        // untouched values keep the file's settings
        assert_eq!(config.report.top_n, 10);
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[report]\npreview_rows = 3\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.report.preview_rows, 3);
        assert_eq!(config.general.output, "election_report.md");
    }

    #[test]
    fn test_validate_rejects_zero_counts() {
        let config: Config = toml::from_str("[report]\ntop_n = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("top_n"));

        let config: Config = toml::from_str("[report]\nhistogram_bins = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("histogram_bins"));

        let config: Config =
            toml::from_str("[report]\nwatch_list = [\"AMIT SHAH\", \" \"]\n").unwrap();
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_after_cli_override() {
        let mut config: Config = toml::from_str("[report]\ntop_n = 0\n").unwrap();
        let mut args = crate::cli::tests::make_args();
        args.top = Some(3);

        config.merge_with_args(&args);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("watch_list"));
    }
}
