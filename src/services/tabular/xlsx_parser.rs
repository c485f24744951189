use std::io::Cursor;

use bytes::Bytes;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use super::unique_headers;
use crate::error::AppError;
use crate::models::RawTable;

/// Reads the first worksheet of an `.xlsx` workbook, using its first
/// non-empty row as the header.
pub fn parse_xlsx(file_data: Bytes) -> Result<RawTable, AppError> {
    let cursor = Cursor::new(file_data);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor).map_err(|e| {
        tracing::error!("Failed to open Excel file: {}", e);
        AppError::ParseError(format!("Failed to open Excel file: {}", e))
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    tracing::debug!("Found {} sheets: {:?}", sheet_names.len(), sheet_names);

    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| AppError::ParseError("No sheets found in workbook".to_string()))?;
    let range = workbook.worksheet_range(sheet_name)?;

    let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
    table_from_cells(rows)
}

pub(crate) fn table_from_cells(rows: Vec<Vec<Data>>) -> Result<RawTable, AppError> {
    let mut rows = rows
        .into_iter()
        .filter(|row| !row.iter().all(|cell| matches!(cell, Data::Empty)));

    let header = rows
        .next()
        .ok_or_else(|| AppError::ParseError("Worksheet is empty".to_string()))?;
    let columns = unique_headers(header.iter().map(cell_text));

    let body = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(RawTable::new(columns, body))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_first_non_empty_row_as_header() {
        let table = table_from_cells(vec![
            vec![Data::Empty, Data::Empty],
            vec![Data::String("city ".into()), Data::String("pop".into())],
            vec![Data::String("Oslo".into()), Data::Float(709_000.0)],
            vec![Data::Empty, Data::Empty],
            vec![Data::String("Bergen".into()), Data::Int(291_000)],
        ])
        .unwrap();

        assert_eq!(table.columns(), ["city", "pop"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(0).unwrap().get("pop"), Some("709000"));
        assert_eq!(table.row(1).unwrap().get("city"), Some("Bergen"));
    }

    #[test]
    fn rejects_empty_worksheet() {
        assert!(matches!(table_from_cells(vec![]), Err(AppError::ParseError(_))));
    }

    #[test]
    fn rejects_bytes_that_are_not_a_workbook() {
        let err = parse_xlsx(Bytes::from_static(b"a,b\n1,2\n")).unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }
}
