//! Column mapping and row coercion.
//!
//! Turns a [`RawTable`] into the typed, date-sorted [`Dataset`]. The only
//! fatal outcome is a missing required column. Row-level problems are
//! absorbed: an unparseable `VALOR` becomes zero, an unparseable `DATA`
//! drops the row, and the [`NormalizeReport`] carries the counts.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use dashboard_core::data_processors::{DateParser, ValueParser};
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{
    canonical_column, month_key, ColumnPresence, Dataset, ReturnRecord, BRANCH_COLUMN,
    CUSTOMER_COLUMN, DATE_COLUMN, DRIVER_COLUMN, REASON_COLUMN, ROUTE_COLUMN, SALESPERSON_COLUMN,
    VALUE_COLUMN,
};
use tracing::{debug, warn};

use crate::reader::{self, RawCell, RawTable};

// ── NormalizeReport ───────────────────────────────────────────────────────────

/// Row-level outcomes of one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Data rows present in the upload.
    pub rows_read: usize,
    /// Rows that made it into the dataset.
    pub rows_kept: usize,
    /// Rows dropped because their `DATA` cell did not parse.
    pub dates_dropped: usize,
    /// `VALOR` cells coerced to zero.
    pub values_coerced: usize,
}

// ── Column map ────────────────────────────────────────────────────────────────

/// Canonical column name to position in the header row. Duplicate headers
/// keep their first occurrence.
struct ColumnMap {
    indices: HashMap<String, usize>,
}

impl ColumnMap {
    fn build(headers: &[String]) -> Self {
        let mut indices = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            indices.entry(canonical_column(header)).or_insert(index);
        }
        Self { indices }
    }

    /// Index of a required column, or the fatal missing-column error.
    fn require(&self, name: &str) -> Result<usize> {
        self.indices
            .get(name)
            .copied()
            .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
    }

    fn optional(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Normalize an ingested table into a date-sorted [`Dataset`].
pub fn normalize(table: &RawTable) -> Result<(Dataset, NormalizeReport)> {
    let columns = ColumnMap::build(&table.headers);

    // Required columns are checked in canonical order, so the error names
    // the first one missing.
    let branch_idx = columns.require(BRANCH_COLUMN)?;
    let reason_idx = columns.require(REASON_COLUMN)?;
    let salesperson_idx = columns.require(SALESPERSON_COLUMN)?;
    let customer_idx = columns.require(CUSTOMER_COLUMN)?;
    let value_idx = columns.require(VALUE_COLUMN)?;
    let date_idx = columns.require(DATE_COLUMN)?;
    let driver_idx = columns.optional(DRIVER_COLUMN);
    let route_idx = columns.optional(ROUTE_COLUMN);

    let presence = ColumnPresence {
        driver: driver_idx.is_some(),
        route: route_idx.is_some(),
    };

    let mut report = NormalizeReport {
        rows_read: table.rows.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let Some(date) = cell_date(row, date_idx) else {
            report.dates_dropped += 1;
            continue;
        };
        let value = match cell_value(row, value_idx) {
            Some(value) => value,
            None => {
                report.values_coerced += 1;
                0.0
            }
        };

        records.push(ReturnRecord {
            branch: cell_string(row, branch_idx).trim().to_uppercase(),
            reason: cell_string(row, reason_idx).trim().to_string(),
            salesperson: cell_string(row, salesperson_idx).trim().to_string(),
            customer: cell_string(row, customer_idx).trim().to_string(),
            value,
            date,
            month_key: month_key(date),
            driver: driver_idx.and_then(|idx| cell_optional(row, idx)),
            route: route_idx.and_then(|idx| cell_optional(row, idx)),
        });
    }

    report.rows_kept = records.len();
    if records.is_empty() {
        warn!(
            "Normalization produced an empty dataset ({} rows read, {} dropped for bad dates)",
            report.rows_read, report.dates_dropped
        );
    } else {
        debug!(
            "Normalized {} of {} rows ({} dates dropped, {} values coerced)",
            report.rows_kept, report.rows_read, report.dates_dropped, report.values_coerced
        );
    }

    Ok((Dataset::new(records, presence), report))
}

/// Ingest and normalize a file in one step.
pub fn load_from_path(path: &Path) -> Result<(Dataset, NormalizeReport)> {
    let table = reader::read_table(path)?;
    normalize(&table)
}

// ── Cell access ───────────────────────────────────────────────────────────────

/// Cells past the end of a short row read as empty.
fn cell(row: &[RawCell], index: usize) -> &RawCell {
    row.get(index).unwrap_or(&RawCell::Empty)
}

fn cell_string(row: &[RawCell], index: usize) -> String {
    match cell(row, index) {
        RawCell::Empty => String::new(),
        RawCell::Text(s) => s.clone(),
        RawCell::Number(n) => render_number(*n),
        RawCell::Date(dt) => dt.date().to_string(),
        RawCell::Bool(b) => b.to_string(),
    }
}

/// Integral numbers render without a trailing ".0" so numeric branch codes
/// group together with their textual spelling.
fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn cell_value(row: &[RawCell], index: usize) -> Option<f64> {
    match cell(row, index) {
        RawCell::Number(n) if n.is_finite() => Some(*n),
        RawCell::Text(s) => ValueParser::parse(s),
        _ => None,
    }
}

/// Raw numeric cells are not interpreted as date serials; only real date
/// cells and parseable text survive.
fn cell_date(row: &[RawCell], index: usize) -> Option<NaiveDate> {
    match cell(row, index) {
        RawCell::Date(dt) => Some(dt.date()),
        RawCell::Text(s) => DateParser::parse(s),
        _ => None,
    }
}

fn cell_optional(row: &[RawCell], index: usize) -> Option<String> {
    let text = cell_string(row, index);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::models::REQUIRED_COLUMNS;
    use std::io::Write;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const HEADERS: &[&str] = &["FILIAL", "MOTIVO", "VENDEDOR", "CLIENTE", "VALOR", "DATA"];

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| {
                            if cell.is_empty() {
                                RawCell::Empty
                            } else {
                                RawCell::Text(cell.to_string())
                            }
                        })
                        .collect()
                })
                .collect(),
        }
    }

    // ── Schema validation ─────────────────────────────────────────────────────

    #[test]
    fn test_normalize_missing_each_required_column() {
        for missing in REQUIRED_COLUMNS {
            let headers: Vec<&str> = HEADERS
                .iter()
                .copied()
                .filter(|name| *name != missing)
                .collect();
            let err = normalize(&table(&headers, &[])).unwrap_err();
            match err {
                DashboardError::MissingColumn(name) => assert_eq!(name, missing),
                other => panic!("expected MissingColumn, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_normalize_headers_canonicalized() {
        let headers = [" filial ", "Motivo", "VENDEDOR", "cliente", "Valor", "data"];
        let rows: &[&[&str]] = &[&["SP", "AVARIA", "ANA", "LOJA A", "10", "2024-03-05"]];
        let (dataset, report) = normalize(&table(&headers, rows)).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(report.rows_kept, 1);
    }

    #[test]
    fn test_normalize_column_order_is_free() {
        let headers = ["DATA", "VALOR", "CLIENTE", "VENDEDOR", "MOTIVO", "FILIAL"];
        let rows: &[&[&str]] = &[&["2024-03-05", "12.5", "LOJA A", "ANA", "AVARIA", "SP"]];
        let (dataset, _) = normalize(&table(&headers, rows)).unwrap();
        let record = &dataset.records()[0];
        assert_eq!(record.branch, "SP");
        assert_eq!(record.reason, "AVARIA");
        assert!((record.value - 12.5).abs() < f64::EPSILON);
    }

    // ── Field coercion ────────────────────────────────────────────────────────

    #[test]
    fn test_normalize_branch_uppercased_and_trimmed() {
        let rows: &[&[&str]] = &[&["  sp  ", "AVARIA", "ANA", "LOJA A", "10", "2024-03-05"]];
        let (dataset, _) = normalize(&table(HEADERS, rows)).unwrap();
        assert_eq!(dataset.records()[0].branch, "SP");
    }

    #[test]
    fn test_normalize_text_fields_trimmed_case_preserved() {
        let rows: &[&[&str]] = &[&["SP", " Atraso ", " Ana Lima ", " Loja A ", "10", "2024-03-05"]];
        let (dataset, _) = normalize(&table(HEADERS, rows)).unwrap();
        let record = &dataset.records()[0];
        assert_eq!(record.reason, "Atraso");
        assert_eq!(record.salesperson, "Ana Lima");
        assert_eq!(record.customer, "Loja A");
    }

    #[test]
    fn test_normalize_bad_value_coerced_to_zero() {
        let rows: &[&[&str]] = &[
            &["SP", "AVARIA", "ANA", "LOJA A", "abc", "2024-03-05"],
            &["SP", "AVARIA", "ANA", "LOJA A", "", "2024-03-06"],
            &["SP", "AVARIA", "ANA", "LOJA A", "15.5", "2024-03-07"],
        ];
        let (dataset, report) = normalize(&table(HEADERS, rows)).unwrap();
        assert_eq!(report.values_coerced, 2);
        assert_eq!(report.rows_kept, 3);
        let values: Vec<f64> = dataset.records().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![0.0, 0.0, 15.5]);
    }

    #[test]
    fn test_normalize_bad_date_drops_row() {
        let rows: &[&[&str]] = &[
            &["SP", "AVARIA", "ANA", "LOJA A", "10", "not-a-date"],
            &["SP", "AVARIA", "ANA", "LOJA A", "20", ""],
            &["SP", "AVARIA", "ANA", "LOJA A", "30", "2024-03-05"],
        ];
        let (dataset, report) = normalize(&table(HEADERS, rows)).unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(report.dates_dropped, 2);
        assert_eq!(dataset.len(), 1);
        assert!((dataset.records()[0].value - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_derives_month_key() {
        let rows: &[&[&str]] = &[&["SP", "AVARIA", "ANA", "LOJA A", "10", "2024-03-05"]];
        let (dataset, _) = normalize(&table(HEADERS, rows)).unwrap();
        assert_eq!(dataset.records()[0].month_key, "3-2024");
    }

    #[test]
    fn test_normalize_sorts_by_date() {
        let rows: &[&[&str]] = &[
            &["SP", "AVARIA", "ANA", "LOJA A", "2", "2024-03-20"],
            &["SP", "AVARIA", "ANA", "LOJA A", "1", "2024-03-05"],
        ];
        let (dataset, _) = normalize(&table(HEADERS, rows)).unwrap();
        let values: Vec<f64> = dataset.records().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    // ── Optional columns ──────────────────────────────────────────────────────

    #[test]
    fn test_normalize_optional_columns_absent() {
        let rows: &[&[&str]] = &[&["SP", "AVARIA", "ANA", "LOJA A", "10", "2024-03-05"]];
        let (dataset, _) = normalize(&table(HEADERS, rows)).unwrap();
        let presence = dataset.columns();
        assert!(!presence.driver);
        assert!(!presence.route);
        assert!(dataset.records()[0].driver.is_none());
        assert!(dataset.records()[0].route.is_none());
    }

    #[test]
    fn test_normalize_optional_column_present() {
        let headers = [
            "FILIAL", "MOTIVO", "VENDEDOR", "CLIENTE", "VALOR", "DATA", "MOTORISTA",
        ];
        let rows: &[&[&str]] = &[
            &["SP", "AVARIA", "ANA", "LOJA A", "10", "2024-03-05", "JOAO"],
            &["SP", "AVARIA", "ANA", "LOJA A", "20", "2024-03-06", ""],
        ];
        let (dataset, _) = normalize(&table(&headers, rows)).unwrap();
        assert!(dataset.columns().driver);
        assert!(!dataset.columns().route);
        assert_eq!(dataset.records()[0].driver.as_deref(), Some("JOAO"));
        assert!(dataset.records()[1].driver.is_none());
    }

    // ── Workbook cell types ───────────────────────────────────────────────────

    #[test]
    fn test_normalize_workbook_cells() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let table = RawTable {
            headers: HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: vec![vec![
                RawCell::Number(12.0),
                RawCell::Text("AVARIA".to_string()),
                RawCell::Text("ANA".to_string()),
                RawCell::Text("LOJA A".to_string()),
                RawCell::Number(99.9),
                RawCell::Date(midnight),
            ]],
        };
        let (dataset, report) = normalize(&table).unwrap();
        let record = &dataset.records()[0];
        assert_eq!(record.branch, "12");
        assert!((record.value - 99.9).abs() < f64::EPSILON);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(report.values_coerced, 0);
    }

    #[test]
    fn test_normalize_numeric_date_cell_dropped() {
        let table = RawTable {
            headers: HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: vec![vec![
                RawCell::Text("SP".to_string()),
                RawCell::Text("AVARIA".to_string()),
                RawCell::Text("ANA".to_string()),
                RawCell::Text("LOJA A".to_string()),
                RawCell::Number(10.0),
                RawCell::Number(45_000.0),
            ]],
        };
        let (dataset, report) = normalize(&table).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(report.dates_dropped, 1);
    }

    #[test]
    fn test_normalize_short_row_missing_cells_read_as_empty() {
        let headers = ["DATA", "FILIAL", "MOTIVO", "VENDEDOR", "CLIENTE", "VALOR"];
        // Five cells; the VALOR position is missing entirely.
        let rows: &[&[&str]] = &[&["2024-03-05", "SP", "AVARIA", "ANA", "LOJA A"]];
        let (dataset, report) = normalize(&table(&headers, rows)).unwrap();
        assert_eq!(report.rows_kept, 1);
        assert_eq!(report.values_coerced, 1);
        assert_eq!(dataset.records()[0].value, 0.0);
    }

    #[test]
    fn test_normalize_all_rows_dropped_is_not_an_error() {
        let rows: &[&[&str]] = &[&["SP", "AVARIA", "ANA", "LOJA A", "10", "garbage"]];
        let (dataset, report) = normalize(&table(HEADERS, rows)).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(report.rows_read, 1);
        assert_eq!(report.rows_kept, 0);
    }

    // ── load_from_path ────────────────────────────────────────────────────────

    #[test]
    fn test_load_from_path_csv_end_to_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("returns.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "FILIAL,MOTIVO,VENDEDOR,CLIENTE,VALOR,DATA").unwrap();
        writeln!(file, "sp,AVARIA,ANA,LOJA A,10.5,2024-03-05").unwrap();
        writeln!(file, "RJ,VENCIDO,BIA,LOJA B,oops,2024-03-06").unwrap();
        writeln!(file, "MG,AVARIA,CAIO,LOJA C,7,bad-date").unwrap();

        let (dataset, report) = load_from_path(&path).unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_kept, 2);
        assert_eq!(report.dates_dropped, 1);
        assert_eq!(report.values_coerced, 1);
        assert_eq!(dataset.records()[0].branch, "SP");
        assert_eq!(dataset.branches(), vec!["SP", "RJ"]);
    }
}
