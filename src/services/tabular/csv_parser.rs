// Comma-delimited text with a header line. Quote characters are kept
// literally; there is no escaping or embedded-delimiter handling.

use csv::{ReaderBuilder, Trim};

use super::unique_headers;
use crate::error::AppError;
use crate::models::RawTable;

pub fn parse_csv(content: &str) -> Result<RawTable, AppError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .quoting(false)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
        .clone();

    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(AppError::ParseError("CSV input has no header row".to_string()));
    }

    let columns = unique_headers(headers.iter());

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
        })?;

        // whitespace-only line
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }

        rows.push(record.iter().map(str::to_string).collect());
    }

    tracing::debug!("Parsed CSV with {} columns and {} rows", columns.len(), rows.len());
    Ok(RawTable::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zips_rows_against_trimmed_header() {
        let table = parse_csv(" name , age \nAda, 36\nGrace ,85\n").unwrap();

        assert_eq!(table.columns(), ["name", "age"]);
        assert_eq!(table.row_count(), 2);
        let first = table.row(0).unwrap();
        assert_eq!(first.get("name"), Some("Ada"));
        assert_eq!(first.get("age"), Some("36"));
        assert_eq!(table.row(1).unwrap().get("name"), Some("Grace"));
    }

    #[test]
    fn every_row_carries_every_header_key() {
        let table = parse_csv("a,b,c\n1,2,3\n4\n5,6\n").unwrap();

        assert_eq!(table.row_count(), 3);
        for row in table.rows() {
            for column in ["a", "b", "c"] {
                assert!(row.get(column).is_some(), "missing {column}");
            }
        }
        assert_eq!(table.row(1).unwrap().get("c"), Some(""));
    }

    #[test]
    fn drops_blank_and_trailing_lines() {
        let table = parse_csv("a,b\r\n1,2\r\n\r\n   \r\n3,4\r\n\r\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(1).unwrap().get("a"), Some("3"));
    }

    #[test]
    fn keeps_rows_of_empty_cells() {
        let table = parse_csv("a,b\n,\n").unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.row(0).unwrap().get("a"), Some(""));
    }

    #[test]
    fn ignores_fields_past_the_header() {
        let table = parse_csv("a\n1,2,3\n").unwrap();
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.row(0).unwrap().iter().collect::<Vec<_>>(), vec![("a", "1")]);
    }

    #[test]
    fn treats_quotes_literally() {
        let table = parse_csv("city,note\n\"Paris, France\",ok\n").unwrap();
        let row = table.row(0).unwrap();
        assert_eq!(row.get("city"), Some("\"Paris"));
        assert_eq!(row.get("note"), Some("France\""));
    }

    #[test]
    fn header_only_input_has_no_rows() {
        let table = parse_csv("a,b\n").unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse_csv(""), Err(AppError::ParseError(_))));
        assert!(matches!(parse_csv("   \n"), Err(AppError::ParseError(_))));
    }
}
