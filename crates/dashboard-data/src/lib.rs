//! Data pipeline for the returns dashboard.
//!
//! Responsible for reading uploaded spreadsheets and delimited files,
//! normalizing rows into the typed dataset, applying the user's filter
//! selection, computing the grouped aggregates and assembling the payload
//! the presentation layer renders.

pub mod aggregator;
pub mod dashboard;
pub mod filter;
pub mod normalizer;
pub mod reader;
pub mod session;

pub use dashboard_core as core;
