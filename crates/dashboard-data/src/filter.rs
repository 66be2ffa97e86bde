//! Filter selection and application.
//!
//! A selection is a set of admitted values per categorical field plus a
//! month narrowing. Sets are explicit inclusion lists: an empty set admits
//! nothing, and "everything selected" is a real state built from the
//! observed dataset values, not a special case.

use std::collections::HashSet;

use dashboard_core::models::{Dataset, ReturnRecord};
use serde::{Deserialize, Serialize};

// ── MonthFilter ───────────────────────────────────────────────────────────────

/// Month narrowing: every month, or a single `"{month}-{year}"` bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthFilter {
    /// No month restriction.
    #[default]
    All,
    /// Only records in this month bucket.
    Month(String),
}

impl MonthFilter {
    /// Parse user input. `"all"` and `"todos"` (any casing) mean no
    /// restriction; anything else names a month bucket verbatim.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.eq_ignore_ascii_case("todos") {
            MonthFilter::All
        } else {
            MonthFilter::Month(trimmed.to_string())
        }
    }

    fn matches(&self, month_key: &str) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(month) => month == month_key,
        }
    }
}

// ── FilterSelection ───────────────────────────────────────────────────────────

/// The user's current filter state.
///
/// The default selection admits nothing; the dashboard's opening state
/// comes from [`FilterSelection::select_all`] instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Admitted return reasons.
    pub reasons: HashSet<String>,
    /// Admitted branches.
    pub branches: HashSet<String>,
    /// Admitted salespeople.
    pub salespeople: HashSet<String>,
    /// Month narrowing.
    pub month: MonthFilter,
}

impl FilterSelection {
    /// The opening state for a freshly loaded dataset: every observed
    /// value admitted, all months.
    pub fn select_all(dataset: &Dataset) -> Self {
        Self {
            reasons: dataset.reasons().into_iter().collect(),
            branches: dataset.branches().into_iter().collect(),
            salespeople: dataset.salespeople().into_iter().collect(),
            month: MonthFilter::All,
        }
    }

    /// A record passes only when every field is admitted.
    fn admits(&self, record: &ReturnRecord) -> bool {
        self.reasons.contains(&record.reason)
            && self.branches.contains(&record.branch)
            && self.salespeople.contains(&record.salesperson)
            && self.month.matches(&record.month_key)
    }
}

/// Apply a selection to the dataset, preserving record order.
///
/// An empty result is a legitimate outcome, not an error; the dashboard
/// reports it as its own state.
pub fn apply(dataset: &Dataset, selection: &FilterSelection) -> Vec<ReturnRecord> {
    dataset
        .records()
        .iter()
        .filter(|record| selection.admits(record))
        .cloned()
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
