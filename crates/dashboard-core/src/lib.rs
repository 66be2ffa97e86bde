//! Core domain layer for the returns dashboard.
//!
//! Holds the record and dataset models shared by every other crate, the
//! error taxonomy, cell-level parsers, currency and percentage formatting,
//! and the CLI settings surface.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
