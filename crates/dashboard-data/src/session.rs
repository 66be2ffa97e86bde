//! Per-upload session state.
//!
//! One session owns the current dataset, the active filter selection and
//! the currency formatter. Mutation happens only through the methods
//! here; the dashboard itself is recomputed from scratch on every call,
//! nothing is cached between reads.

use std::path::Path;

use dashboard_core::error::Result;
use dashboard_core::formatting::CurrencyFormatter;
use dashboard_core::models::Dataset;
use tracing::debug;

use crate::dashboard::{self, DashboardState};
use crate::filter::FilterSelection;
use crate::normalizer::{self, NormalizeReport};

// ── Session ───────────────────────────────────────────────────────────────────

/// State for one upload-and-explore interaction.
pub struct Session {
    /// Normalized dataset of the current upload, if any.
    dataset: Option<Dataset>,
    /// Active filter selection.
    selection: FilterSelection,
    /// Currency formatter shared by every monetary display in the session.
    formatter: CurrencyFormatter,
}

impl Session {
    /// An idle session with no upload yet.
    pub fn new(formatter: CurrencyFormatter) -> Self {
        Self {
            dataset: None,
            selection: FilterSelection::default(),
            formatter,
        }
    }

    /// Install a freshly normalized dataset. The selection resets to
    /// select-all, the state every new upload opens with.
    pub fn load_dataset(&mut self, dataset: Dataset) {
        self.selection = FilterSelection::select_all(&dataset);
        self.dataset = Some(dataset);
    }

    /// Ingest and normalize a file, then install the result.
    ///
    /// On error nothing changes: the previous dataset and selection stay
    /// in place.
    pub fn load_file(&mut self, path: &Path) -> Result<NormalizeReport> {
        let (dataset, report) = normalizer::load_from_path(path)?;
        debug!(
            "Session loaded {}: {} records kept",
            path.display(),
            dataset.len()
        );
        self.load_dataset(dataset);
        Ok(report)
    }

    /// Replace the filter selection wholesale. The presentation layer
    /// rebuilds the whole selection on every widget change.
    pub fn set_selection(&mut self, selection: FilterSelection) {
        self.selection = selection;
    }

    /// The current dataset, if an upload has been loaded.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// The active filter selection.
    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// The session's currency formatter.
    pub fn formatter(&self) -> &CurrencyFormatter {
        &self.formatter
    }

    /// Recompute the dashboard from the current dataset and selection.
    pub fn dashboard(&self) -> DashboardState {
        dashboard::build(self.dataset.as_ref(), &self.selection, &self.formatter)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
