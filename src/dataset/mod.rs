//! Loading the election results table.
//!
//! The loaders turn a CSV or JSON file into [`RawRecord`]s, check the
//! schema, and run the one-time margin coercion that produces the
//! immutable [`Dataset`] every query works on.

pub mod csv_source;
pub mod json_source;

use crate::analysis::numeric_coerce;
use crate::models::{RawRecord, ResultRecord, REQUIRED_COLUMNS};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Errors raised while loading the results table.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Input is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Record {row} is missing required field '{field}'")]
    MissingField { row: usize, field: String },
    #[error("Expected a JSON array of records")]
    NotAnArray,
    #[error("Record {row} is not a JSON object")]
    NotAnObject { row: usize },
}

pub type Result<T> = std::result::Result<T, DatasetError>;

/// The coerced record set, loaded once and never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    records: Vec<ResultRecord>,
}

impl Dataset {
    /// Build a dataset from rows already in memory.
    pub fn from_rows(source: impl Into<String>, rows: Vec<RawRecord>) -> Self {
        let records = numeric_coerce(rows);
        let dataset = Self {
            source: source.into(),
            records,
        };

        let missing = dataset.missing_margins();
        if missing > 0 {
            warn!(
                "{} of {} rows have a non-numeric margin and are excluded from margin statistics",
                missing,
                dataset.len()
            );
        }

        dataset
    }

    /// Load a results file, choosing the reader by extension.
    pub fn load(path: &Path, show_progress: bool) -> Result<Self> {
        info!("Loading results from: {}", path.display());

        let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let progress = show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} rows read")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        });

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let rows = if is_json {
            json_source::read_json(file, progress.as_ref())?
        } else {
            csv_source::read_csv(file, progress.as_ref())?
        };

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        debug!("Read {} rows", rows.len());

        Ok(Self::from_rows(path.display().to_string(), rows))
    }

    /// Where the records came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records whose margin could not be coerced.
    pub fn missing_margins(&self) -> usize {
        self.records.iter().filter(|r| r.margin.is_missing()).count()
    }

    pub fn numeric_margins(&self) -> usize {
        self.len() - self.missing_margins()
    }
}

/// Required columns absent from `present`, in schema order.
pub fn missing_columns<'a>(present: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let present: Vec<&str> = present.into_iter().collect();

    REQUIRED_COLUMNS
        .iter()
        .filter(|column| !present.contains(column))
        .map(|column| column.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(margin: &str) -> RawRecord {
        RawRecord {
            constituency: "Amethi".to_string(),
            leading_candidate: "KISHORI LAL".to_string(),
            leading_party: "Indian National Congress".to_string(),
            trailing_party: "Bharatiya Janata Party".to_string(),
            margin: margin.to_string(),
        }
    }

    #[test]
    fn test_missing_columns() {
        assert!(missing_columns(REQUIRED_COLUMNS).is_empty());
        assert_eq!(
            missing_columns(["Constituency", "Margin", "Extra"]),
            vec!["Leading Candidate", "Leading Party", "Trailing Party"]
        );
    }

    #[test]
    fn test_from_rows_counts_missing_margins() {
        let dataset = Dataset::from_rows("fixture", vec![row("167196"), row("N/A"), row("")]);

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.missing_margins(), 2);
        assert_eq!(dataset.numeric_margins(), 1);
        assert_eq!(dataset.source(), "fixture");
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            file,
            "Constituency,Const. No.,Leading Candidate,Leading Party,Trailing Candidate,Trailing Party,Margin,Status"
        )
        .unwrap();
        writeln!(
            file,
            "Amethi,37,KISHORI LAL,Indian National Congress,SMRITI IRANI,Bharatiya Janata Party,167196,Result Declared"
        )
        .unwrap();
        writeln!(
            file,
            "Surat,24,MUKESH DALAL,Bharatiya Janata Party,,Uncontested,-,Uncontested"
        )
        .unwrap();

        let dataset = Dataset::load(file.path(), false).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].leading_candidate, "KISHORI LAL");
        assert!(dataset.records()[1].margin.is_missing());
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Constituency": "Amethi", "Leading Candidate": "KISHORI LAL",
                "Leading Party": "INC", "Trailing Party": "BJP", "Margin": 167196}}]"#
        )
        .unwrap();

        let dataset = Dataset::load(file.path(), false).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].margin.value(), Some(167196.0));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Dataset::load(Path::new("does/not/exist.csv"), false).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
