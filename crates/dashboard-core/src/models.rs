use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ── Column names ───────────────────────────────────────────────────────────

/// Branch column (`FILIAL`).
pub const BRANCH_COLUMN: &str = "FILIAL";
/// Return-reason column (`MOTIVO`).
pub const REASON_COLUMN: &str = "MOTIVO";
/// Salesperson column (`VENDEDOR`).
pub const SALESPERSON_COLUMN: &str = "VENDEDOR";
/// Customer column (`CLIENTE`).
pub const CUSTOMER_COLUMN: &str = "CLIENTE";
/// Monetary value column (`VALOR`).
pub const VALUE_COLUMN: &str = "VALOR";
/// Return-date column (`DATA`).
pub const DATE_COLUMN: &str = "DATA";
/// Optional driver column (`MOTORISTA`).
pub const DRIVER_COLUMN: &str = "MOTORISTA";
/// Optional route column (`ROTA`).
pub const ROUTE_COLUMN: &str = "ROTA";

/// Columns every upload must provide. An upload missing any of these is
/// rejected as a whole; the remaining two known columns are optional.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    BRANCH_COLUMN,
    REASON_COLUMN,
    SALESPERSON_COLUMN,
    CUSTOMER_COLUMN,
    VALUE_COLUMN,
    DATE_COLUMN,
];

/// Canonical form of a header cell: surrounding whitespace stripped,
/// uppercased.
///
/// # Examples
///
/// ```
/// use dashboard_core::models::canonical_column;
///
/// assert_eq!(canonical_column("  valor "), "VALOR");
/// assert_eq!(canonical_column("Motivo"), "MOTIVO");
/// ```
pub fn canonical_column(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Month-year grouping key for a date, e.g. March 2024 → `"3-2024"`.
///
/// The month is not zero padded. Keys therefore sort lexicographically as
/// text, not chronologically (`"10-2024"` before `"2-2024"`), which is why
/// month listings preserve dataset order instead of sorting keys.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use dashboard_core::models::month_key;
///
/// let march = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(month_key(march), "3-2024");
/// ```
pub fn month_key(date: NaiveDate) -> String {
    format!("{}-{}", date.month(), date.year())
}

// ── Records ────────────────────────────────────────────────────────────────

/// A single product-return event after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    /// Issuing branch, trimmed and uppercased.
    pub branch: String,
    /// Categorical cause of the return, trimmed.
    pub reason: String,
    /// Salesperson responsible for the original sale, trimmed.
    pub salesperson: String,
    /// Customer the goods came back from, trimmed.
    pub customer: String,
    /// Monetary value of the returned goods. Cells that do not parse as a
    /// number are coerced to zero during normalization.
    pub value: f64,
    /// Calendar date of the return. Rows whose date does not parse never
    /// reach a [`Dataset`].
    pub date: NaiveDate,
    /// Derived month bucket, `"{month}-{year}"` without zero padding.
    pub month_key: String,
    /// Delivery driver, when the upload carried the `MOTORISTA` column.
    #[serde(default)]
    pub driver: Option<String>,
    /// Delivery route, when the upload carried the `ROTA` column.
    #[serde(default)]
    pub route: Option<String>,
}

/// Which optional columns were present in the upload header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPresence {
    /// The upload had a `MOTORISTA` column.
    pub driver: bool,
    /// The upload had a `ROTA` column.
    pub route: bool,
}

// ── Dataset ────────────────────────────────────────────────────────────────

/// A normalized upload: records in ascending date order plus which optional
/// columns the file carried.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<ReturnRecord>,
    columns: ColumnPresence,
}

impl Dataset {
    /// Build a dataset from normalized records.
    ///
    /// Records are sorted ascending by date with a stable sort, so rows
    /// sharing a date keep their file order.
    pub fn new(mut records: Vec<ReturnRecord>, columns: ColumnPresence) -> Self {
        records.sort_by_key(|record| record.date);
        Self { records, columns }
    }

    /// Records in ascending date order.
    pub fn records(&self) -> &[ReturnRecord] {
        &self.records
    }

    /// Optional-column availability for this upload.
    pub fn columns(&self) -> ColumnPresence {
        self.columns
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct reasons in first-appearance order.
    pub fn reasons(&self) -> Vec<String> {
        unique_in_order(self.records.iter().map(|record| record.reason.as_str()))
    }

    /// Distinct branches in first-appearance order.
    pub fn branches(&self) -> Vec<String> {
        unique_in_order(self.records.iter().map(|record| record.branch.as_str()))
    }

    /// Distinct salespeople in first-appearance order.
    pub fn salespeople(&self) -> Vec<String> {
        unique_in_order(self.records.iter().map(|record| record.salesperson.as_str()))
    }

    /// Distinct month keys in first-appearance order over the date-sorted
    /// records. The keys are never re-sorted: they are not zero padded, so
    /// a textual sort would put `"10-2024"` ahead of `"2-2024"`.
    pub fn month_keys(&self) -> Vec<String> {
        unique_in_order(self.records.iter().map(|record| record.month_key.as_str()))
    }
}

/// First occurrence of each value, preserving encounter order.
fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for value in values {
        if seen.insert(value) {
            unique.push(value.to_string());
        }
    }
    unique
}
