//! Tabular file input: CSV and XLSX exports read into header-keyed rows.

use crate::error::AppError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

/// One data row keyed by trimmed header names.
pub type SheetRow = HashMap<String, String>;

/// Read all rows from a CSV or XLSX file. Dispatches on extension; anything
/// that is not a known workbook extension is treated as delimited text.
pub fn read_rows(path: &Path) -> Result<Vec<SheetRow>, AppError> {
    if !path.exists() {
        return Err(AppError::FileNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xltx" | "xltm" => read_xlsx(path),
        _ => read_csv(path),
    }
}

fn read_csv(path: &Path) -> Result<Vec<SheetRow>, AppError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = SheetRow::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = record.get(i).unwrap_or_default().to_string();
            row.insert(header.clone(), value);
        }
        rows.push(row);
    }
    Ok(rows)
}

fn read_xlsx(path: &Path) -> Result<Vec<SheetRow>, AppError> {
    use calamine::{open_workbook, Reader, Xlsx};

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();
    let first_sheet = sheet_names.first().ok_or(AppError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(first_sheet)?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for data_row in rows_iter {
        let mut row = SheetRow::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = data_row.get(i).map(|cell| cell.to_string()).unwrap_or_default();
            row.insert(header.clone(), value);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Trimmed cell value for a column, empty string when the column is absent.
pub fn cell<'a>(row: &'a SheetRow, column: &str) -> &'a str {
    row.get(column).map(|v| v.trim()).unwrap_or("")
}

/// Earliest `YYYY-MM-DD` date appearing in the given column across all rows.
/// Falls back to 1970-01-01 when no cell contains a recognizable date, so the
/// subsequent order fetch degrades to "all orders" rather than failing.
pub fn earliest_date(rows: &[SheetRow], column: &str) -> NaiveDate {
    rows.iter()
        .filter_map(|row| find_date(cell(row, column)))
        .min()
        .unwrap_or_default()
}

/// First `YYYY-MM-DD` substring of `text` that parses as a date. Export files
/// carry timestamps like `2024-03-01 14:22:05 +0300`, so we scan rather than
/// parse the whole cell.
fn find_date(text: &str) -> Option<NaiveDate> {
    let len = text.len();
    if len < 10 {
        return None;
    }
    for start in 0..=len - 10 {
        if let Some(window) = text.get(start..start + 10) {
            if let Ok(date) = NaiveDate::parse_from_str(window, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(pairs: &[(&str, &str)]) -> SheetRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn find_date_inside_timestamp() {
        assert_eq!(
            find_date("2024-03-01 14:22:05 +0300"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            find_date("created 2023-12-31"),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
        assert_eq!(find_date("no date here"), None);
        assert_eq!(find_date(""), None);
    }

    #[test]
    fn earliest_date_picks_minimum() {
        let rows = vec![
            row(&[("Created at", "2024-03-05 10:00:00")]),
            row(&[("Created at", "2024-02-28 09:00:00")]),
            row(&[("Created at", "garbage")]),
        ];
        assert_eq!(
            earliest_date(&rows, "Created at"),
            NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()
        );
    }

    #[test]
    fn earliest_date_falls_back_to_epoch() {
        let rows = vec![row(&[("Created at", "not a date")])];
        assert_eq!(
            earliest_date(&rows, "Created at"),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
        assert_eq!(
            earliest_date(&[], "Created at"),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
    }

    #[test]
    fn cell_trims_and_defaults() {
        let r = row(&[("Phone", "  555-0100  ")]);
        assert_eq!(cell(&r, "Phone"), "555-0100");
        assert_eq!(cell(&r, "Missing"), "");
    }

    #[test]
    fn read_rows_missing_file_is_fatal() {
        let err = read_rows(Path::new("/nonexistent/orders.csv")).unwrap_err();
        assert!(matches!(err, AppError::FileNotFound(_)));
    }

    #[test]
    fn read_rows_parses_csv_by_header() {
        let path = std::env::temp_dir().join("shipping_settlement_sheet_test.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Id,Shipping Name,Phone").unwrap();
        writeln!(file, "1001,Alice,555-0100").unwrap();
        writeln!(file, "1002,,555-0101").unwrap();
        drop(file);

        let rows = read_rows(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        assert_eq!(cell(&rows[0], "Id"), "1001");
        assert_eq!(cell(&rows[0], "Shipping Name"), "Alice");
        assert_eq!(cell(&rows[1], "Shipping Name"), "");
        assert_eq!(cell(&rows[1], "Phone"), "555-0101");
    }
}
