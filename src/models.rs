//! Data models for the election report.
//!
//! This module contains the record schema loaded from the results table,
//! the typed field selectors used by the aggregator, and the derived
//! views and report structures handed to the renderers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A margin value after numeric coercion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Margin {
    /// A parsed, finite vote difference.
    Numeric(f64),
    /// The raw cell could not be read as a number. Serialized as `null`.
    Missing,
}

impl Margin {
    /// Coerce a raw cell into a margin.
    ///
    /// Surrounding whitespace is ignored. Empty cells, text and non-finite
    /// numbers (`nan`, `inf`) all become [`Margin::Missing`]; this never fails.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Margin::Numeric(value),
            _ => Margin::Missing,
        }
    }

    /// Returns the numeric value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Margin::Numeric(v) => Some(*v),
            Margin::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Margin::Missing)
    }
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Margin::Numeric(v) => write!(f, "{}", format_number(*v)),
            Margin::Missing => write!(f, "missing"),
        }
    }
}

/// Format a number without a trailing `.0` when it is whole.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// One row of the input table as supplied by the loader, before coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Constituency")]
    pub constituency: String,
    #[serde(rename = "Leading Candidate")]
    pub leading_candidate: String,
    #[serde(rename = "Leading Party")]
    pub leading_party: String,
    #[serde(rename = "Trailing Party")]
    pub trailing_party: String,
    #[serde(rename = "Margin")]
    pub margin: String,
}

impl From<&ResultRecord> for RawRecord {
    fn from(record: &ResultRecord) -> Self {
        Self {
            constituency: record.constituency.clone(),
            leading_candidate: record.leading_candidate.clone(),
            leading_party: record.leading_party.clone(),
            trailing_party: record.trailing_party.clone(),
            margin: record.raw_margin.clone(),
        }
    }
}

/// Constituency-level result, one per electoral district.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Name of the electoral district.
    pub constituency: String,
    /// Winning candidate.
    pub leading_candidate: String,
    /// Party of the winning candidate.
    pub leading_party: String,
    /// Party of the runner-up.
    pub trailing_party: String,
    /// Vote difference between winner and runner-up.
    pub margin: Margin,
    /// The margin cell exactly as it appeared in the input.
    pub raw_margin: String,
}

impl ResultRecord {
    /// Build a record from a raw row, coercing the margin.
    pub fn from_raw(raw: RawRecord) -> Self {
        Self {
            margin: Margin::coerce(&raw.margin),
            constituency: raw.constituency,
            leading_candidate: raw.leading_candidate,
            leading_party: raw.leading_party,
            trailing_party: raw.trailing_party,
            raw_margin: raw.margin,
        }
    }
}

/// Text columns of a [`ResultRecord`] usable as grouping or filter keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Constituency,
    LeadingCandidate,
    LeadingParty,
    TrailingParty,
}

impl TextField {
    /// Borrow this field's value from a record.
    pub fn get<'a>(&self, record: &'a ResultRecord) -> &'a str {
        match self {
            TextField::Constituency => &record.constituency,
            TextField::LeadingCandidate => &record.leading_candidate,
            TextField::LeadingParty => &record.leading_party,
            TextField::TrailingParty => &record.trailing_party,
        }
    }

    /// Column header in the input table.
    pub fn column_name(&self) -> &'static str {
        match self {
            TextField::Constituency => "Constituency",
            TextField::LeadingCandidate => "Leading Candidate",
            TextField::LeadingParty => "Leading Party",
            TextField::TrailingParty => "Trailing Party",
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Numeric columns of a [`ResultRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Margin,
}

impl NumericField {
    pub fn get(&self, record: &ResultRecord) -> Margin {
        match self {
            NumericField::Margin => record.margin,
        }
    }

    pub fn column_name(&self) -> &'static str {
        match self {
            NumericField::Margin => "Margin",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Every column the input table must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Constituency",
    "Leading Candidate",
    "Leading Party",
    "Trailing Party",
    "Margin",
];

/// An ordered key to value mapping produced by grouping operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedView<V> {
    entries: Vec<(String, V)>,
}

impl<V> RankedView<V> {
    pub fn new(entries: Vec<(String, V)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn entries(&self) -> &[(String, V)] {
        &self.entries
    }

    /// Look up the value for a key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<(&str, &V)> {
        self.entries.first().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V: Copy + std::iter::Sum<V>> RankedView<V> {
    /// Sum of all values in the view.
    pub fn total(&self) -> V {
        self.entries.iter().map(|(_, v)| *v).sum()
    }
}

/// One equal-width histogram bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub lower: f64,
    /// Upper edge; exclusive except for the last bin.
    pub upper: f64,
    pub count: usize,
}

/// A party's portion of a summed view, as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyShare {
    pub party: String,
    pub value: f64,
    pub percent: f64,
}

/// A single record highlighted by its margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginHighlight {
    pub candidate: String,
    pub party: String,
    pub constituency: String,
    pub margin: f64,
}

impl From<&ResultRecord> for MarginHighlight {
    fn from(record: &ResultRecord) -> Self {
        Self {
            candidate: record.leading_candidate.clone(),
            party: record.leading_party.clone(),
            constituency: record.constituency.clone(),
            margin: record.margin.value().unwrap_or(0.0),
        }
    }
}

/// A watched candidate's constituency results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub constituency: String,
    pub margin: Margin,
}

/// All results for one name on the watch list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateComparison {
    pub candidate: String,
    pub entries: Vec<CandidateEntry>,
}

impl CandidateComparison {
    /// Whether the candidate led in any constituency.
    pub fn is_matched(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// Metadata about the generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the input table.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of rows in the input.
    pub total_rows: usize,
    /// Rows whose margin parsed as a number.
    pub numeric_margins: usize,
    /// Rows whose margin could not be parsed.
    pub missing_margins: usize,
}

/// The complete analytics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionReport {
    pub metadata: ReportMetadata,
    /// Leading rows of the raw table.
    pub preview: Vec<RawRecord>,
    /// Constituencies won, per leading party.
    pub seats_won: RankedView<usize>,
    pub highest_margin: MarginHighlight,
    pub lowest_margin: MarginHighlight,
    /// Leading party with the largest summed margin.
    pub party_highest_votes: Option<String>,
    /// Leading party with the smallest summed margin.
    pub party_lowest_votes: Option<String>,
    pub candidates: Vec<CandidateComparison>,
    pub margin_histogram: Vec<HistogramBin>,
    /// Summed margin per leading party, with percentages.
    pub vote_distribution: Vec<PartyShare>,
    pub trailing_by_votes: RankedView<f64>,
    pub trailing_by_seats: RankedView<usize>,
}
