//! Grouped aggregation over return records.
//!
//! Every operation takes a plain record slice (usually the filtered view)
//! and is deterministic: grouping accumulates through a `BTreeMap` so the
//! pre-sort order is key order, and the descending value sort is stable,
//! which pins tie order across runs.

use std::collections::BTreeMap;

use dashboard_core::formatting::{format_percentage, percentage, CurrencyFormatter};
use dashboard_core::models::ReturnRecord;
use serde::{Deserialize, Serialize};

/// Ranking tables show at most this many rows.
pub const DEFAULT_RANKING_LIMIT: usize = 10;

// ── GroupField ────────────────────────────────────────────────────────────────

/// Fields a ranking can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Branch,
    Reason,
    Salesperson,
    Customer,
    Driver,
    Route,
}

impl GroupField {
    /// Grouping key for one record. `None` (possible only for the optional
    /// fields) excludes the record from the grouping.
    fn key<'a>(&self, record: &'a ReturnRecord) -> Option<&'a str> {
        match self {
            GroupField::Branch => Some(&record.branch),
            GroupField::Reason => Some(&record.reason),
            GroupField::Salesperson => Some(&record.salesperson),
            GroupField::Customer => Some(&record.customer),
            GroupField::Driver => record.driver.as_deref(),
            GroupField::Route => record.route.as_deref(),
        }
    }
}

// ── Ranking rows ──────────────────────────────────────────────────────────────

/// One row of the share-of-total table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRow {
    /// Position in the table, starting at 1.
    pub rank: usize,
    /// Group label.
    pub label: String,
    /// Share of the grand total, in percent, unrounded.
    pub share: f64,
    /// Display form, e.g. `"60.0%"`.
    pub display: String,
}

/// One row of a currency ranking table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRow {
    /// Position in the table, starting at 1.
    pub rank: usize,
    /// Group label.
    pub label: String,
    /// Summed value for the group.
    pub total: f64,
    /// Currency display form, e.g. `"R$ 1.234,50"`.
    pub display: String,
}

// ── ReturnsAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that computes the dashboard aggregates.
pub struct ReturnsAggregator;

impl ReturnsAggregator {
    /// Sum of `value` across the records. The headline metric.
    pub fn total_value(records: &[ReturnRecord]) -> f64 {
        records.iter().map(|record| record.value).sum()
    }

    /// Branch to summed value, keys in sorted order.
    ///
    /// The dashboard feeds this the unfiltered dataset: the branch chart
    /// reflects the whole upload regardless of active filters.
    pub fn branch_totals(records: &[ReturnRecord]) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for record in records {
            *totals.entry(record.branch.clone()).or_insert(0.0) += record.value;
        }
        totals
    }

    /// Top `limit` groups with their share of the grand total.
    ///
    /// Shares are computed against the sum over every group, before
    /// truncation: the visible rows of a truncated table do not sum to
    /// 100 because the hidden tail holds the remainder. A zero grand
    /// total yields 0% on every row.
    pub fn percentage_ranking(
        records: &[ReturnRecord],
        field: GroupField,
        limit: usize,
    ) -> Vec<ShareRow> {
        let grouped = Self::grouped_sums(records, field);
        let grand_total: f64 = grouped.iter().map(|(_, sum)| sum).sum();
        grouped
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, (label, sum))| {
                let share = percentage(sum, grand_total);
                ShareRow {
                    rank: index + 1,
                    label,
                    share,
                    display: format_percentage(share),
                }
            })
            .collect()
    }

    /// Top `limit` groups with currency-formatted sums.
    ///
    /// Ordering is identical to [`ReturnsAggregator::percentage_ranking`]
    /// over the same records; both go through the same grouped sums.
    pub fn value_ranking(
        records: &[ReturnRecord],
        field: GroupField,
        limit: usize,
        formatter: &CurrencyFormatter,
    ) -> Vec<ValueRow> {
        Self::grouped_sums(records, field)
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, (label, sum))| ValueRow {
                rank: index + 1,
                label,
                total: sum,
                display: formatter.format_currency(sum),
            })
            .collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Group sums sorted by value descending. Ties keep key order: the
    /// `BTreeMap` accumulation yields groups in key order and the sort is
    /// stable.
    fn grouped_sums(records: &[ReturnRecord], field: GroupField) -> Vec<(String, f64)> {
        let mut sums: BTreeMap<String, f64> = BTreeMap::new();
        for record in records {
            if let Some(key) = field.key(record) {
                *sums.entry(key.to_string()).or_insert(0.0) += record.value;
            }
        }
        let mut grouped: Vec<(String, f64)> = sums.into_iter().collect();
        grouped.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        grouped
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
