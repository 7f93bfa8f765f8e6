//! Result aggregation and statistics.
//!
//! Every query here is a pure function over an immutable slice of
//! [`ResultRecord`]s. Missing margins are skipped by numeric operations;
//! only [`arg_extremum`] reports an error, when nothing numeric is left.

use crate::models::{
    CandidateComparison, CandidateEntry, HistogramBin, NumericField, PartyShare, RankedView,
    RawRecord, ResultRecord, TextField,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Errors surfaced by aggregation queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("cannot find the {mode} {field}: no record has a numeric {field}")]
    EmptyInput { field: NumericField, mode: Extremum },
}

/// Direction for [`arg_extremum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

impl fmt::Display for Extremum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extremum::Max => write!(f, "highest"),
            Extremum::Min => write!(f, "lowest"),
        }
    }
}

/// Coerce the margin of every raw row, keeping rows whose margin is unreadable.
pub fn numeric_coerce(rows: Vec<RawRecord>) -> Vec<ResultRecord> {
    rows.into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let record = ResultRecord::from_raw(raw);
            if record.margin.is_missing() {
                debug!(
                    "Row {}: margin {:?} for {} is not numeric, treating as missing",
                    index + 1,
                    record.raw_margin,
                    record.constituency
                );
            }
            record
        })
        .collect()
}

/// Sum `value` per distinct `group`, largest sum first.
///
/// Missing values contribute nothing, so a group whose values are all
/// missing is kept with a sum of zero. Equal sums keep the order in which
/// their groups first appear in `records`.
pub fn group_sum(
    records: &[ResultRecord],
    group: TextField,
    value: NumericField,
) -> RankedView<f64> {
    let mut sums: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let key = group.get(record);
        let slot = *index.entry(key).or_insert_with(|| {
            sums.push((key.to_string(), 0.0));
            sums.len() - 1
        });
        if let Some(v) = value.get(record).value() {
            sums[slot].1 += v;
        }
    }

    // sort_by is stable
    sums.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    RankedView::new(sums)
}

/// Count records per distinct `group`, most frequent first.
///
/// Counts include records with a missing margin. Equal counts keep
/// first-appearance order.
pub fn group_count(records: &[ResultRecord], group: TextField) -> RankedView<usize> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let key = group.get(record);
        let slot = *index.entry(key).or_insert_with(|| {
            counts.push((key.to_string(), 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
    }

    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    RankedView::new(counts)
}

/// Find the record with the highest or lowest value of `field`.
///
/// Ties resolve to the earliest record. Records with a missing value are
/// ignored; if none remain the query fails with [`AggregateError::EmptyInput`].
pub fn arg_extremum(
    records: &[ResultRecord],
    field: NumericField,
    mode: Extremum,
) -> Result<&ResultRecord, AggregateError> {
    let mut best: Option<(&ResultRecord, f64)> = None;

    for record in records {
        let Some(value) = field.get(record).value() else {
            continue;
        };
        let replace = match best {
            None => true,
            Some((_, current)) => match mode {
                Extremum::Max => value > current,
                Extremum::Min => value < current,
            },
        };
        if replace {
            best = Some((record, value));
        }
    }

    best.map(|(record, _)| record)
        .ok_or(AggregateError::EmptyInput { field, mode })
}

/// Records whose `field` equals `expected` exactly, in input order.
pub fn filter_by_field<'a>(
    records: &'a [ResultRecord],
    field: TextField,
    expected: &str,
) -> Vec<&'a ResultRecord> {
    records
        .iter()
        .filter(|record| field.get(record) == expected)
        .collect()
}

/// The first `n` entries of an ordered view (all of them if there are fewer).
pub fn top_n<V: Clone>(view: &RankedView<V>, n: usize) -> RankedView<V> {
    RankedView::new(view.entries().iter().take(n).cloned().collect())
}

/// Entry with the smallest value, earliest on ties.
pub fn lowest_entry(view: &RankedView<f64>) -> Option<(&str, f64)> {
    let mut lowest: Option<(&str, f64)> = None;
    for (key, value) in view.iter() {
        if lowest.map_or(true, |(_, current)| *value < current) {
            lowest = Some((key, *value));
        }
    }
    lowest
}

/// Non-missing values of `field`, in input order.
pub fn numeric_values(records: &[ResultRecord], field: NumericField) -> Vec<f64> {
    records
        .iter()
        .filter_map(|record| field.get(record).value())
        .collect()
}

/// Bucket the non-missing values of `field` into `bins` equal-width bins.
///
/// Bins span `[min, max]`; the last bin includes its upper edge. When every
/// value is equal the range becomes `[v - 0.5, v + 0.5]`.
pub fn histogram(
    records: &[ResultRecord],
    field: NumericField,
    bins: usize,
) -> Vec<HistogramBin> {
    let values = numeric_values(records, field);
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    // interpolate between the ends so extreme ranges keep finite edges
    let edge = |i: usize| {
        let t = i as f64 / bins as f64;
        lo * (1.0 - t) + hi * t
    };
    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: edge(i),
            upper: edge(i + 1),
            count: 0,
        })
        .collect();

    // halved to stay finite when `hi - lo` overflows
    let half_span = hi / 2.0 - lo / 2.0;
    for value in values {
        let fraction = (value / 2.0 - lo / 2.0) / half_span;
        let position = if fraction.is_finite() {
            (fraction * bins as f64).floor() as usize
        } else {
            0
        };
        result[position.min(bins - 1)].count += 1;
    }

    result
}

/// Each entry's percentage of the view total.
pub fn shares(view: &RankedView<f64>) -> Vec<PartyShare> {
    let total = view.total();

    view.iter()
        .map(|(party, value)| PartyShare {
            party: party.to_string(),
            value: *value,
            percent: if total == 0.0 { 0.0 } else { value / total * 100.0 },
        })
        .collect()
}

/// Look up every watched candidate by exact leading-candidate name.
pub fn candidate_comparison(
    records: &[ResultRecord],
    watch_list: &[String],
) -> Vec<CandidateComparison> {
    watch_list
        .iter()
        .map(|name| {
            let entries: Vec<CandidateEntry> =
                filter_by_field(records, TextField::LeadingCandidate, name)
                    .into_iter()
                    .map(|record| CandidateEntry {
                        constituency: record.constituency.clone(),
                        margin: record.margin,
                    })
                    .collect();

            if entries.is_empty() {
                debug!("Watched candidate {} leads in no constituency", name);
            }

            CandidateComparison {
                candidate: name.clone(),
                entries,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Margin;

    fn record(
        constituency: &str,
        candidate: &str,
        party: &str,
        trailing: &str,
        margin: &str,
    ) -> ResultRecord {
        ResultRecord::from_raw(RawRecord {
            constituency: constituency.to_string(),
            leading_candidate: candidate.to_string(),
            leading_party: party.to_string(),
            trailing_party: trailing.to_string(),
            margin: margin.to_string(),
        })
    }

    fn sample() -> Vec<ResultRecord> {
        vec![
            record("Varanasi", "NARENDRA MODI", "BJP", "INC", "152513"),
            record("Rae Bareli", "RAHUL GANDHI", "INC", "BJP", "390030"),
            record("Gandhinagar", "AMIT SHAH", "BJP", "INC", "744716"),
            record("Wayanad", "RAHUL GANDHI", "INC", "CPI", "364422"),
            record("Mumbai North West", "RAVINDRA WAIKAR", "SHS", "SHS(UBT)", "48"),
            record("Hamirpur", "ANURAG THAKUR", "BJP", "INC", "N/A"),
        ]
    }

    #[test]
    fn test_group_sum_example() {
        let records = vec![
            record("x", "c1", "A", "B", "100"),
            record("y", "c2", "B", "A", "50"),
            record("z", "c3", "A", "B", "30"),
        ];

        let view = group_sum(&records, TextField::LeadingParty, NumericField::Margin);

        assert_eq!(
            view.entries(),
            &[("A".to_string(), 130.0), ("B".to_string(), 50.0)]
        );
    }

    #[test]
    fn test_group_sum_sorted_descending() {
        let view = group_sum(&sample(), TextField::LeadingParty, NumericField::Margin);
        let values: Vec<f64> = view.iter().map(|(_, v)| *v).collect();

        assert!(values.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(view.get("BJP"), Some(&(152513.0 + 744716.0)));
    }

    #[test]
    fn test_group_sum_ties_keep_first_seen_order() {
        let records = vec![
            record("x", "c1", "Later", "A", "10"),
            record("y", "c2", "Earlier", "A", "20"),
            record("z", "c3", "Third", "A", "10"),
        ];

        let view = group_sum(&records, TextField::LeadingParty, NumericField::Margin);
        let keys: Vec<&str> = view.iter().map(|(k, _)| k).collect();

        assert_eq!(keys, vec!["Earlier", "Later", "Third"]);
    }

    #[test]
    fn test_group_sum_all_missing_is_zero() {
        let records = vec![
            record("x", "c1", "A", "B", "N/A"),
            record("y", "c2", "B", "A", "5"),
        ];

        let view = group_sum(&records, TextField::LeadingParty, NumericField::Margin);

        assert_eq!(view.get("A"), Some(&0.0));
        assert_eq!(view.first(), Some(("B", &5.0)));
    }

    #[test]
    fn test_missing_margin_counted_but_not_summed() {
        let records = vec![
            record("x", "c1", "A", "B", "N/A"),
            record("y", "c2", "A", "B", "7"),
        ];

        let sums = group_sum(&records, TextField::LeadingParty, NumericField::Margin);
        let counts = group_count(&records, TextField::LeadingParty);

        assert_eq!(sums.get("A"), Some(&7.0));
        assert_eq!(counts.get("A"), Some(&2));
    }

    #[test]
    fn test_group_count_totals_match_records() {
        let records = sample();

        let leading = group_count(&records, TextField::LeadingParty);
        let trailing = group_count(&records, TextField::TrailingParty);

        assert_eq!(leading.total(), records.len());
        assert_eq!(trailing.total(), records.len());
        assert_eq!(leading.first(), Some(("BJP", &3)));
    }

    #[test]
    fn test_arg_extremum_max_and_min() {
        let records = sample();

        let max = arg_extremum(&records, NumericField::Margin, Extremum::Max).unwrap();
        let min = arg_extremum(&records, NumericField::Margin, Extremum::Min).unwrap();

        assert_eq!(max.constituency, "Gandhinagar");
        assert_eq!(min.constituency, "Mumbai North West");

        let max_value = max.margin.value().unwrap();
        let min_value = min.margin.value().unwrap();
        for value in numeric_values(&records, NumericField::Margin) {
            assert!(max_value >= value);
            assert!(min_value <= value);
        }
    }

    #[test]
    fn test_arg_extremum_ties_return_first() {
        let records = vec![
            record("first", "c1", "A", "B", "90"),
            record("second", "c2", "B", "A", "90"),
            record("third", "c3", "A", "B", "1"),
            record("fourth", "c4", "A", "B", "1"),
        ];

        let max = arg_extremum(&records, NumericField::Margin, Extremum::Max).unwrap();
        let min = arg_extremum(&records, NumericField::Margin, Extremum::Min).unwrap();

        assert_eq!(max.constituency, "first");
        assert_eq!(min.constituency, "third");
    }

    #[test]
    fn test_arg_extremum_empty_input() {
        let err = arg_extremum(&[], NumericField::Margin, Extremum::Max).unwrap_err();
        assert_eq!(
            err,
            AggregateError::EmptyInput {
                field: NumericField::Margin,
                mode: Extremum::Max
            }
        );
    }

    #[test]
    fn test_arg_extremum_all_missing() {
        let records = vec![record("x", "c1", "A", "B", "")];
        assert!(arg_extremum(&records, NumericField::Margin, Extremum::Min).is_err());
    }

    #[test]
    fn test_filter_by_field() {
        let records = sample();

        let rahul = filter_by_field(&records, TextField::LeadingCandidate, "RAHUL GANDHI");
        let names: Vec<&str> = rahul.iter().map(|r| r.constituency.as_str()).collect();
        assert_eq!(names, vec!["Rae Bareli", "Wayanad"]);

        assert!(filter_by_field(&records, TextField::LeadingCandidate, "rahul gandhi").is_empty());
        assert!(filter_by_field(&records, TextField::Constituency, "Nowhere").is_empty());
    }

    #[test]
    fn test_top_n() {
        let view = group_count(&sample(), TextField::TrailingParty);

        let top = top_n(&view, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top.entries(), &view.entries()[..2]);

        let all = top_n(&view, 100);
        assert_eq!(all, view);

        assert!(top_n(&view, 0).is_empty());
    }

    #[test]
    fn test_lowest_entry() {
        let view = RankedView::new(vec![
            ("A".to_string(), 10.0),
            ("B".to_string(), 0.0),
            ("C".to_string(), 0.0),
        ]);
        assert_eq!(lowest_entry(&view), Some(("B", 0.0)));
        assert_eq!(lowest_entry(&RankedView::new(Vec::new())), None);
    }

    #[test]
    fn test_histogram_counts_every_numeric_value() {
        let records = sample();

        let bins = histogram(&records, NumericField::Margin, 4);

        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert_eq!(bins[0].lower, 48.0);
        assert_eq!(bins[3].upper, 744716.0);
        // the maximum falls in the closed last bin
        assert_eq!(bins[3].count, 1);
    }

    #[test]
    fn test_histogram_single_value_and_empty() {
        let records = vec![record("x", "c", "A", "B", "5"), record("y", "c", "A", "B", "5")];

        let bins = histogram(&records, NumericField::Margin, 2);
        assert_eq!(bins[0].lower, 4.5);
        assert_eq!(bins[1].upper, 5.5);
        assert_eq!(bins[1].count, 2);

        assert!(histogram(&[], NumericField::Margin, 20).is_empty());
        assert!(histogram(&records, NumericField::Margin, 0).is_empty());
    }

    #[test]
    fn test_histogram_extreme_range_keeps_finite_edges() {
        let records = vec![
            record("x", "c", "A", "B", "-1e308"),
            record("y", "c", "A", "B", "1e308"),
        ];

        let bins = histogram(&records, NumericField::Margin, 4);

        assert!(bins.iter().all(|b| b.lower.is_finite() && b.upper.is_finite()));
        assert_eq!(bins[0].lower, -1e308);
        assert_eq!(bins[3].upper, 1e308);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[3].count, 1);
    }

    #[test]
    fn test_shares() {
        let view = RankedView::new(vec![("A".to_string(), 75.0), ("B".to_string(), 25.0)]);

        let result = shares(&view);
        assert_eq!(result[0].percent, 75.0);
        assert_eq!(result[1].percent, 25.0);

        let zero = RankedView::new(vec![("A".to_string(), 0.0)]);
        assert_eq!(shares(&zero)[0].percent, 0.0);
    }

    #[test]
    fn test_candidate_comparison() {
        let watch = vec!["RAHUL GANDHI".to_string(), "NOBODY".to_string()];

        let comparison = candidate_comparison(&sample(), &watch);

        assert_eq!(comparison.len(), 2);
        assert_eq!(comparison[0].entries.len(), 2);
        assert_eq!(comparison[0].entries[0].margin, Margin::Numeric(390030.0));
        assert!(!comparison[1].is_matched());
    }

    #[test]
    fn test_numeric_coerce_retains_unparseable_rows() {
        let rows = vec![
            RawRecord {
                constituency: "x".to_string(),
                leading_candidate: "c".to_string(),
                leading_party: "A".to_string(),
                trailing_party: "B".to_string(),
                margin: "N/A".to_string(),
            },
            RawRecord {
                constituency: "y".to_string(),
                leading_candidate: "c".to_string(),
                leading_party: "A".to_string(),
                trailing_party: "B".to_string(),
                margin: "12".to_string(),
            },
        ];

        let records = numeric_coerce(rows);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].margin, Margin::Missing);
        assert_eq!(records[1].margin, Margin::Numeric(12.0));
    }
}
