//! CSV reader for the results table.

use super::{missing_columns, DatasetError, Result};
use crate::models::RawRecord;
use indicatif::ProgressBar;
use std::io::Read;

/// Read every row of a CSV table with a header line.
///
/// Header cells are trimmed before the schema check; columns beyond the
/// required five are ignored.
pub fn read_csv<R: Read>(reader: R, progress: Option<&ProgressBar>) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing = missing_columns(headers.iter());
    if !missing.is_empty() {
        return Err(DatasetError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawRecord>() {
        rows.push(result?);
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_rows() {
        let data = "\
Constituency,Leading Candidate,Leading Party,Trailing Party,Margin
Varanasi,NARENDRA MODI,Bharatiya Janata Party,Indian National Congress,152513
Hamirpur,ANURAG THAKUR,Bharatiya Janata Party,Indian National Congress,
";

        let rows = read_csv(data.as_bytes(), None).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].constituency, "Varanasi");
        assert_eq!(rows[0].margin, "152513");
        assert_eq!(rows[1].margin, "");
    }

    #[test]
    fn test_read_csv_trims_headers() {
        let data = " Constituency , Leading Candidate,Leading Party,Trailing Party,Margin \nA,B,C,D,1\n";

        let rows = read_csv(data.as_bytes(), None).unwrap();

        assert_eq!(rows[0].margin, "1");
    }

    #[test]
    fn test_read_csv_missing_columns() {
        let data = "Constituency,Leading Party,Margin\nA,C,1\n";

        let err = read_csv(data.as_bytes(), None).unwrap_err();

        match err {
            DatasetError::MissingColumns(columns) => {
                assert_eq!(columns, vec!["Leading Candidate", "Trailing Party"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_csv_column_names_are_case_sensitive() {
        let data = "constituency,Leading Candidate,Leading Party,Trailing Party,Margin\nA,B,C,D,1\n";

        assert!(matches!(
            read_csv(data.as_bytes(), None),
            Err(DatasetError::MissingColumns(_))
        ));
    }

    #[test]
    fn test_read_csv_ragged_row() {
        let data = "Constituency,Leading Candidate,Leading Party,Trailing Party,Margin\nA,B,C\n";

        assert!(matches!(
            read_csv(data.as_bytes(), None),
            Err(DatasetError::Csv(_))
        ));
    }
}
