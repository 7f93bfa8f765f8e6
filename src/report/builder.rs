//! Assembling the report from a loaded dataset.

use crate::analysis::{
    arg_extremum, candidate_comparison, group_count, group_sum, histogram, lowest_entry, shares,
    top_n, AggregateError, Extremum,
};
use crate::dataset::Dataset;
use crate::models::{
    ElectionReport, MarginHighlight, NumericField, RawRecord, ReportMetadata, TextField,
};
use chrono::Utc;
use tracing::{debug, info};

/// Knobs controlling what goes into the report.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Raw rows shown in the data preview.
    pub preview_rows: usize,
    /// Entries in each top-N ranking.
    pub top_n: usize,
    /// Buckets in the margin histogram.
    pub histogram_bins: usize,
    /// Candidate names compared by exact match.
    pub watch_list: Vec<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self::from(&crate::config::ReportConfig::default())
    }
}

impl From<&crate::config::ReportConfig> for ReportSettings {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            preview_rows: config.preview_rows,
            top_n: config.top_n,
            histogram_bins: config.histogram_bins,
            watch_list: config.watch_list.clone(),
        }
    }
}

/// Compute every derived view and collect them into a report.
///
/// Fails only when no record carries a numeric margin, since the margin
/// highlights cannot be produced.
pub fn build_report(
    dataset: &Dataset,
    settings: &ReportSettings,
) -> Result<ElectionReport, AggregateError> {
    let records = dataset.records();
    info!("Aggregating {} records", records.len());

    let highest = arg_extremum(records, NumericField::Margin, Extremum::Max)?;
    let lowest = arg_extremum(records, NumericField::Margin, Extremum::Min)?;
    debug!(
        "Margin range: {} ({}) to {} ({})",
        highest.margin, highest.constituency, lowest.margin, lowest.constituency
    );

    // Summed margins stand in for vote totals; the input has no vote counts.
    let votes_by_party = group_sum(records, TextField::LeadingParty, NumericField::Margin);
    let party_highest_votes = votes_by_party.first().map(|(party, _)| party.to_string());
    let party_lowest_votes = lowest_entry(&votes_by_party).map(|(party, _)| party.to_string());

    let trailing_votes = group_sum(records, TextField::TrailingParty, NumericField::Margin);
    let trailing_seats = group_count(records, TextField::TrailingParty);

    let metadata = ReportMetadata {
        source: dataset.source().to_string(),
        generated_at: Utc::now(),
        total_rows: dataset.len(),
        numeric_margins: dataset.numeric_margins(),
        missing_margins: dataset.missing_margins(),
    };

    Ok(ElectionReport {
        metadata,
        preview: records
            .iter()
            .take(settings.preview_rows)
            .map(RawRecord::from)
            .collect(),
        seats_won: group_count(records, TextField::LeadingParty),
        highest_margin: MarginHighlight::from(highest),
        lowest_margin: MarginHighlight::from(lowest),
        party_highest_votes,
        party_lowest_votes,
        candidates: candidate_comparison(records, &settings.watch_list),
        margin_histogram: histogram(records, NumericField::Margin, settings.histogram_bins),
        vote_distribution: shares(&votes_by_party),
        trailing_by_votes: top_n(&trailing_votes, settings.top_n),
        trailing_by_seats: top_n(&trailing_seats, settings.top_n),
    })
}
