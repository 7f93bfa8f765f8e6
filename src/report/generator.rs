//! Markdown and JSON report generation.
//!
//! This module renders an [`ElectionReport`] as a Markdown document made
//! of summary captions and tables, or as pretty-printed JSON.

use crate::models::{
    format_number, CandidateComparison, ElectionReport, HistogramBin, MarginHighlight, PartyShare,
    RankedView, RawRecord, ReportMetadata,
};
use anyhow::Result;

/// Width of the longest histogram bar, in characters.
const HISTOGRAM_BAR_WIDTH: usize = 30;

/// Generate a complete Markdown report, with the glossary when asked for.
pub fn generate_markdown_report(report: &ElectionReport, include_glossary: bool) -> String {
    let mut output = String::new();

    output.push_str("# Election Results Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(include_glossary));

    if include_glossary {
        output.push_str(&generate_glossary_section());
    }

    output.push_str(&generate_preview_section(&report.preview));
    output.push_str(&generate_seats_section(&report.seats_won));
    output.push_str(&generate_margin_section(report));
    output.push_str(&generate_candidates_section(&report.candidates));
    output.push_str(&generate_histogram_section(&report.margin_histogram));
    output.push_str(&generate_distribution_section(&report.vote_distribution));
    output.push_str(&generate_trailing_section(
        &report.trailing_by_votes,
        &report.trailing_by_seats,
    ));

    output.push_str("---\n\n");
    output.push_str("*Report generated by election-insights*\n");

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &ElectionReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Escape a value for use inside a Markdown table cell.
fn cell(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.replace('|', "\\|")
    }
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Constituencies:** {}\n", metadata.total_rows));
    if metadata.missing_margins > 0 {
        section.push_str(&format!(
            "- **Missing Margins:** {} (excluded from margin statistics)\n",
            metadata.missing_margins
        ));
    }
    section.push('\n');

    section
}

fn generate_table_of_contents(include_glossary: bool) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    if include_glossary {
        toc.push_str("- [Glossary](#glossary)\n");
    }
    toc.push_str("- [Data Preview](#data-preview)\n");
    toc.push_str("- [Seats Won by Party](#seats-won-by-party)\n");
    toc.push_str("- [Margin of Victory](#margin-of-victory)\n");
    toc.push_str("- [Candidate Comparison](#candidate-comparison)\n");
    toc.push_str("- [Margin Distribution](#margin-distribution)\n");
    toc.push_str("- [Votes Distribution by Party](#votes-distribution-by-party)\n");
    toc.push_str("- [Trailing Parties](#trailing-parties)\n");
    toc.push('\n');

    toc
}

fn generate_glossary_section() -> String {
    let mut section = String::new();

    section.push_str("## Glossary\n\n");
    section.push_str(
        "- **Margin:** the difference in votes between the winning candidate and the runner-up.\n",
    );
    section.push_str(
        "- **Constituency:** a geographic area that elects one representative to the legislature.\n",
    );
    section.push_str("- **Leading Party:** the party of the winning candidate in a constituency.\n");
    section.push_str("- **Trailing Party:** the party of the runner-up in a constituency.\n\n");

    section
}

fn generate_preview_section(preview: &[RawRecord]) -> String {
    let mut section = String::new();

    section.push_str("## Data Preview\n\n");
    if preview.is_empty() {
        section.push_str("The input table has no rows.\n\n");
        return section;
    }

    section.push_str("| Constituency | Leading Candidate | Leading Party | Trailing Party | Margin |\n");
    section.push_str("|:---|:---|:---|:---|---:|\n");
    for row in preview {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            cell(&row.constituency),
            cell(&row.leading_candidate),
            cell(&row.leading_party),
            cell(&row.trailing_party),
            cell(&row.margin),
        ));
    }
    section.push('\n');

    section
}

fn generate_seats_section(seats: &RankedView<usize>) -> String {
    let mut section = String::new();

    section.push_str("## Seats Won by Party\n\n");
    if seats.is_empty() {
        section.push_str("No seats to report.\n\n");
        return section;
    }

    section.push_str("| Party | Seats Won |\n");
    section.push_str("|:---|---:|\n");
    for (party, count) in seats.iter() {
        section.push_str(&format!("| {} | {} |\n", cell(party), count));
    }
    section.push('\n');

    section
}

fn generate_margin_section(report: &ElectionReport) -> String {
    let mut section = String::new();

    section.push_str("## Margin of Victory\n\n");
    section.push_str(&format!(
        "Party with highest margin of victory: **{}** with a margin of **{}**\n\n",
        report.highest_margin.party,
        format_number(report.highest_margin.margin)
    ));
    section.push_str(&format!(
        "Party with lowest margin of victory: **{}** with a margin of **{}**\n\n",
        report.lowest_margin.party,
        format_number(report.lowest_margin.margin)
    ));

    if let Some(ref party) = report.party_highest_votes {
        section.push_str(&format!(
            "Leading party with the largest total margin: **{}**\n\n",
            party
        ));
    }
    if let Some(ref party) = report.party_lowest_votes {
        section.push_str(&format!(
            "Leading party with the smallest total margin: **{}**\n\n",
            party
        ));
    }

    section.push_str("| Entry | Candidate | Party | Constituency | Margin |\n");
    section.push_str("|:---|:---|:---|:---|---:|\n");
    section.push_str(&margin_row("Highest", &report.highest_margin));
    section.push_str(&margin_row("Lowest", &report.lowest_margin));
    section.push('\n');

    section
}

fn margin_row(label: &str, highlight: &MarginHighlight) -> String {
    format!(
        "| {} | {} | {} | {} | {} |\n",
        label,
        cell(&highlight.candidate),
        cell(&highlight.party),
        cell(&highlight.constituency),
        format_number(highlight.margin)
    )
}

fn generate_candidates_section(candidates: &[CandidateComparison]) -> String {
    let mut section = String::new();

    section.push_str("## Candidate Comparison\n\n");
    if candidates.is_empty() {
        section.push_str("No candidates are on the watch list.\n\n");
        return section;
    }

    section.push_str("| Candidate | Constituency | Margin |\n");
    section.push_str("|:---|:---|---:|\n");
    for candidate in candidates {
        if !candidate.is_matched() {
            section.push_str(&format!(
                "| {} | *no constituency found* | 0 |\n",
                cell(&candidate.candidate)
            ));
            continue;
        }
        for entry in &candidate.entries {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                cell(&candidate.candidate),
                cell(&entry.constituency),
                entry.margin
            ));
        }
    }
    section.push('\n');

    section
}

fn generate_histogram_section(bins: &[HistogramBin]) -> String {
    let mut section = String::new();

    section.push_str("## Margin Distribution\n\n");
    if bins.is_empty() {
        section.push_str("No numeric margins to plot.\n\n");
        return section;
    }

    let peak = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);

    section.push_str("| Margin Range | Constituencies | |\n");
    section.push_str("|:---|---:|:---|\n");
    for bin in bins {
        let bar = "█".repeat(bin.count * HISTOGRAM_BAR_WIDTH / peak);
        section.push_str(&format!(
            "| {} - {} | {} | {} |\n",
            format_number(bin.lower.round()),
            format_number(bin.upper.round()),
            bin.count,
            bar
        ));
    }
    section.push('\n');

    section
}

fn generate_distribution_section(distribution: &[PartyShare]) -> String {
    let mut section = String::new();

    section.push_str("## Votes Distribution by Party\n\n");
    section.push_str("*Totals are summed victory margins of each leading party.*\n\n");
    section.push_str("| Party | Total Margin | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for share in distribution {
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            cell(&share.party),
            format_number(share.value),
            share.percent
        ));
    }
    section.push('\n');

    section
}

fn generate_trailing_section(by_votes: &RankedView<f64>, by_seats: &RankedView<usize>) -> String {
    let mut section = String::new();

    section.push_str("## Trailing Parties\n\n");

    section.push_str(&format!("### Top {} Trailing Parties by Votes\n\n", by_votes.len()));
    section.push_str("| Party | Total Margin |\n");
    section.push_str("|:---|---:|\n");
    for (party, total) in by_votes.iter() {
        section.push_str(&format!("| {} | {} |\n", cell(party), format_number(*total)));
    }
    section.push('\n');

    section.push_str(&format!("### Top {} Trailing Parties by Seats\n\n", by_seats.len()));
    section.push_str("| Party | Seats |\n");
    section.push_str("|:---|---:|\n");
    for (party, seats) in by_seats.iter() {
        section.push_str(&format!("| {} | {} |\n", cell(party), seats));
    }
    section.push('\n');

    section
}
