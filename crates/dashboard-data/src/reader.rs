//! Upload ingestion for the returns dashboard.
//!
//! Reads a single tabular file, either an Excel/ODS workbook or delimited
//! text, into an untyped [`RawTable`] for the normalizer. No schema checks
//! happen here; header validation and typing belong to the normalizer.

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use dashboard_core::error::{DashboardError, Result};
use tracing::debug;

// ── Raw table ─────────────────────────────────────────────────────────────────

/// One untyped cell as read from the upload.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// Missing or blank cell.
    Empty,
    /// Textual content (every delimited-text cell lands here).
    Text(String),
    /// Numeric workbook cell.
    Number(f64),
    /// Date-formatted workbook cell.
    Date(chrono::NaiveDateTime),
    /// Boolean workbook cell.
    Bool(bool),
}

/// Header row plus data rows, before any normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Header cells as text, in file order.
    pub headers: Vec<String>,
    /// Data rows below the header.
    pub rows: Vec<Vec<RawCell>>,
}

/// Extensions routed through the workbook reader; everything else is
/// treated as comma-delimited text.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Read an uploaded file, dispatching on its extension.
pub fn read_table(path: &Path) -> Result<RawTable> {
    if is_workbook_path(path) {
        read_workbook(path)
    } else {
        read_delimited_path(path)
    }
}

/// Read delimited text from any reader (the in-memory upload path).
///
/// The reader is `flexible`: rows shorter or longer than the header are
/// kept as-is, missing trailing cells read as [`RawCell::Empty`] downstream.
/// Records that cannot be decoded at all are skipped, not fatal.
pub fn read_delimited<R: Read>(input: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DashboardError::Delimited(e.to_string()))?
        .iter()
        .map(|header| header.to_string())
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unreadable delimited record: {}", e);
                skipped += 1;
                continue;
            }
        };
        rows.push(
            record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(cell.to_string())
                    }
                })
                .collect(),
        );
    }

    if skipped > 0 {
        debug!("{} delimited records skipped as unreadable", skipped);
    }

    Ok(RawTable { headers, rows })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_workbook_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_lowercase();
            WORKBOOK_EXTENSIONS.iter().any(|known| *known == lower)
        })
        .unwrap_or(false)
}

/// Read the first sheet of a workbook. Later sheets are ignored.
fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| DashboardError::Spreadsheet(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let Some(first_sheet) = sheet_names.first() else {
        return Err(DashboardError::Spreadsheet(format!(
            "{} contains no sheets",
            path.display()
        )));
    };

    let range = workbook
        .worksheet_range(first_sheet)
        .map_err(|e| DashboardError::Spreadsheet(e.to_string()))?;

    let mut row_iter = range.rows();
    let headers: Vec<String> = match row_iter.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => Vec::new(),
    };
    let rows: Vec<Vec<RawCell>> = row_iter
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    debug!(
        "Workbook {}: sheet \"{}\", {} data rows",
        path.display(),
        first_sheet,
        rows.len()
    );

    Ok(RawTable { headers, rows })
}

fn read_delimited_path(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|e| DashboardError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_delimited(file)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        // Error cells surface as their display text ("#DIV/0!" and friends)
        // and coerce downstream like any other unparseable text.
        Data::Error(e) => RawCell::Text(e.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => RawCell::Date(naive),
            None => RawCell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => RawCell::Text(s.clone()),
        Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    // ── Extension dispatch ────────────────────────────────────────────────────

    #[test]
    fn test_workbook_extension_detection() {
        assert!(is_workbook_path(Path::new("returns.xlsx")));
        assert!(is_workbook_path(Path::new("RETURNS.XLSX")));
        assert!(is_workbook_path(Path::new("data.ods")));
        assert!(!is_workbook_path(Path::new("returns.csv")));
        assert!(!is_workbook_path(Path::new("no_extension")));
    }

    #[test]
    fn test_read_table_missing_file_errors() {
        let err = read_table(Path::new("/tmp/does-not-exist-returns-test.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::FileRead { .. }));
    }

    // ── Delimited reading ─────────────────────────────────────────────────────

    #[test]
    fn test_read_delimited_from_path() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "returns.csv",
            "FILIAL,MOTIVO,VALOR\nSP,AVARIA,10.5\nRJ,VENCIDO,3\n",
        );

        let table = read_table(&path).unwrap();
        assert_eq!(table.headers, vec!["FILIAL", "MOTIVO", "VALOR"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], RawCell::Text("SP".to_string()));
        assert_eq!(table.rows[1][2], RawCell::Text("3".to_string()));
    }

    #[test]
    fn test_read_table_unknown_extension_treated_as_delimited() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "export.txt", "A,B\n1,2\n");

        let table = read_table(&path).unwrap();
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_read_delimited_in_memory() {
        let input = "A,B,C\nx,,z\n".as_bytes();
        let table = read_delimited(input).unwrap();
        assert_eq!(table.headers, vec!["A", "B", "C"]);
        assert_eq!(
            table.rows[0],
            vec![
                RawCell::Text("x".to_string()),
                RawCell::Empty,
                RawCell::Text("z".to_string()),
            ]
        );
    }

    #[test]
    fn test_read_delimited_short_rows_kept() {
        let input = "A,B,C\nonly-one\n1,2,3\n".as_bytes();
        let table = read_delimited(input).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].len(), 1);
        assert_eq!(table.rows[1].len(), 3);
    }

    #[test]
    fn test_read_delimited_invalid_utf8_record_skipped() {
        let mut bytes = b"A,B\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b",1\nx,y\n");

        let table = read_delimited(bytes.as_slice()).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], RawCell::Text("x".to_string()));
    }

    // ── Workbook cell conversion ──────────────────────────────────────────────

    #[test]
    fn test_convert_cell_scalars() {
        assert_eq!(convert_cell(&Data::Empty), RawCell::Empty);
        assert_eq!(
            convert_cell(&Data::String("AVARIA".to_string())),
            RawCell::Text("AVARIA".to_string())
        );
        assert_eq!(convert_cell(&Data::Float(10.5)), RawCell::Number(10.5));
        assert_eq!(convert_cell(&Data::Int(7)), RawCell::Number(7.0));
        assert_eq!(convert_cell(&Data::Bool(true)), RawCell::Bool(true));
    }

    #[test]
    fn test_convert_cell_error_becomes_text() {
        let converted = convert_cell(&Data::Error(calamine::CellErrorType::Div0));
        assert_eq!(converted, RawCell::Text("#DIV/0!".to_string()));
    }

    #[test]
    fn test_header_text_renders_non_strings() {
        assert_eq!(header_text(&Data::String("FILIAL".to_string())), "FILIAL");
        assert_eq!(header_text(&Data::Empty), "");
        assert_eq!(header_text(&Data::Float(3.0)), "3");
    }
}
