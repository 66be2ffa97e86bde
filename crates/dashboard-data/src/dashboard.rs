//! Presenter-boundary payload assembly.
//!
//! Recomputes the full dashboard from the current dataset and filter
//! selection. The outcome is one of three states the presentation layer
//! switches on; recoverable situations are states here, never errors.

use std::collections::BTreeMap;

use dashboard_core::formatting::CurrencyFormatter;
use dashboard_core::models::Dataset;
use serde::{Deserialize, Serialize};

use crate::aggregator::{GroupField, ReturnsAggregator, ShareRow, ValueRow, DEFAULT_RANKING_LIMIT};
use crate::filter::{self, FilterSelection};

// ── DashboardData ─────────────────────────────────────────────────────────────

/// Everything the presentation layer needs to render one dashboard view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    /// Headline metric over the filtered view, currency-formatted.
    pub total_display: String,
    /// Headline metric as a number.
    pub total_value: f64,
    /// Reason share-of-total table over the filtered view.
    pub reason_shares: Vec<ShareRow>,
    /// Branch to summed value over the whole upload. The one aggregate
    /// computed from the unfiltered dataset: the branch chart always
    /// reflects the entire file, whatever the active filters.
    pub branch_totals: BTreeMap<String, f64>,
    /// Reason ranking by value over the filtered view.
    pub reason_ranking: Vec<ValueRow>,
    /// Salesperson ranking by value over the filtered view.
    pub salesperson_ranking: Vec<ValueRow>,
    /// Customer ranking by value over the filtered view.
    pub customer_ranking: Vec<ValueRow>,
    /// Driver ranking, present only when the upload had a `MOTORISTA`
    /// column. A present column with no usable values still yields a
    /// (possibly empty) table.
    pub driver_ranking: Option<Vec<ValueRow>>,
    /// Route ranking, present only when the upload had a `ROTA` column.
    pub route_ranking: Option<Vec<ValueRow>>,
}

// ── DashboardState ────────────────────────────────────────────────────────────

/// The three user-facing outcomes of a dashboard recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardState {
    /// No file has been loaded yet; prompt for an upload.
    AwaitingUpload,
    /// The active filters excluded every record; widening them is the fix,
    /// so no empty tables are rendered.
    NoMatchingRows,
    /// Aggregates ready to render.
    Ready(DashboardData),
}

/// Recompute the dashboard from the given state.
pub fn build(
    dataset: Option<&Dataset>,
    selection: &FilterSelection,
    formatter: &CurrencyFormatter,
) -> DashboardState {
    let Some(dataset) = dataset else {
        return DashboardState::AwaitingUpload;
    };

    let filtered = filter::apply(dataset, selection);
    if filtered.is_empty() {
        return DashboardState::NoMatchingRows;
    }

    let total = ReturnsAggregator::total_value(&filtered);
    let columns = dataset.columns();

    DashboardState::Ready(DashboardData {
        total_display: formatter.format_currency(total),
        total_value: total,
        reason_shares: ReturnsAggregator::percentage_ranking(
            &filtered,
            GroupField::Reason,
            DEFAULT_RANKING_LIMIT,
        ),
        branch_totals: ReturnsAggregator::branch_totals(dataset.records()),
        reason_ranking: ReturnsAggregator::value_ranking(
            &filtered,
            GroupField::Reason,
            DEFAULT_RANKING_LIMIT,
            formatter,
        ),
        salesperson_ranking: ReturnsAggregator::value_ranking(
            &filtered,
            GroupField::Salesperson,
            DEFAULT_RANKING_LIMIT,
            formatter,
        ),
        customer_ranking: ReturnsAggregator::value_ranking(
            &filtered,
            GroupField::Customer,
            DEFAULT_RANKING_LIMIT,
            formatter,
        ),
        driver_ranking: columns.driver.then(|| {
            ReturnsAggregator::value_ranking(
                &filtered,
                GroupField::Driver,
                DEFAULT_RANKING_LIMIT,
                formatter,
            )
        }),
        route_ranking: columns.route.then(|| {
            ReturnsAggregator::value_ranking(
                &filtered,
                GroupField::Route,
                DEFAULT_RANKING_LIMIT,
                formatter,
            )
        }),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
