use std::io::Read;

use crate::errors::{CollectionError, Result};
use crate::models::{fields, FieldValue, IssueRecord};

/// Parses a tracker CSV export. The header row names the fields; every value
/// goes through numeric coercion. Rows come back in file order.
///
/// The id column is the primary key, so a row without a valid integer id
/// fails the whole parse rather than being skipped.
pub fn parse_issue_csv<R: Read>(reader: R) -> Result<Vec<(i64, IssueRecord)>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers = csv.headers()?.clone();
    let id_column = headers
        .iter()
        .position(|name| name.trim() == fields::ID)
        .ok_or(CollectionError::MissingIdColumn)?;

    let mut rows = Vec::new();
    for (index, row) in csv.records().enumerate() {
        let row = row?;
        let raw_id = row.get(id_column).unwrap_or_default();
        let id = parse_issue_id(raw_id).ok_or_else(|| CollectionError::InvalidIssueId {
            row: index + 1,
            value: raw_id.to_string(),
        })?;

        let record: IssueRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(name, raw)| (name.trim(), FieldValue::coerce(raw)))
            .collect();
        rows.push((id, record));
    }
    Ok(rows)
}

fn parse_issue_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,title,creation,status,message_count\n";

    #[test]
    fn rows_are_coerced_field_by_field() {
        let data = format!(
            "{HEADER}1,Crash on start,2021-01-01.10:00:00,1,3\n2,\"Docs, typo\",2021-02-01.09:30:00,2,0\n"
        );
        let rows = parse_issue_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let (id, first) = &rows[0];
        assert_eq!(*id, 1);
        assert_eq!(first.get("id"), Some(&FieldValue::Number(1.0)));
        assert_eq!(first.get("title"), Some(&FieldValue::from("Crash on start")));
        assert_eq!(
            first.creation(),
            Some(&FieldValue::from("2021-01-01.10:00:00"))
        );
        assert_eq!(first.message_count(), Some(3.0));

        let (id, second) = &rows[1];
        assert_eq!(*id, 2);
        assert_eq!(second.get("title"), Some(&FieldValue::from("Docs, typo")));
        assert_eq!(second.message_count(), Some(0.0));
    }

    #[test]
    fn empty_values_stay_empty_text() {
        let data = format!("{HEADER}5,,,,\n");
        let rows = parse_issue_csv(data.as_bytes()).unwrap();
        let (_, record) = &rows[0];
        assert_eq!(record.status(), Some(&FieldValue::Text(String::new())));
        assert_eq!(record.message_count(), None);
    }

    #[test]
    fn non_integer_id_fails_loudly() {
        let data = format!("{HEADER}1,a,,1,1\nabc,b,,1,1\n");
        match parse_issue_csv(data.as_bytes()) {
            Err(CollectionError::InvalidIssueId { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("expected invalid id, got {other:?}"),
        }

        let data = format!("{HEADER},a,,1,1\n");
        assert!(matches!(
            parse_issue_csv(data.as_bytes()),
            Err(CollectionError::InvalidIssueId { row: 1, .. })
        ));
    }

    #[test]
    fn missing_id_column_is_an_error() {
        let data = "title,status\nfoo,1\n";
        assert!(matches!(
            parse_issue_csv(data.as_bytes()),
            Err(CollectionError::MissingIdColumn)
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let data = format!("{HEADER}1,a,,1\n");
        assert!(matches!(
            parse_issue_csv(data.as_bytes()),
            Err(CollectionError::Csv(_))
        ));
    }

    #[test]
    fn header_only_export_is_empty() {
        assert!(parse_issue_csv(HEADER.as_bytes()).unwrap().is_empty());
    }
}
