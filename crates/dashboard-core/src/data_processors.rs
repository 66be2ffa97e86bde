use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

// ── DateParser ────────────────────────────────────────────────────────────────

/// Parses the `DATA` column from the variety of formats found in returns
/// exports.
pub struct DateParser;

impl DateParser {
    /// Attempt to parse a date cell.
    ///
    /// `None` means the cell is empty or unrecognisable; the caller drops
    /// the row and counts it, no per-row error is raised.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        // Try a series of common strftime-like patterns, ISO first, then
        // the day-first forms Brazilian exports use.
        const FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d",
            "%d/%m/%Y %H:%M:%S",
            "%d/%m/%Y",
        ];

        for fmt in FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Some(dt.date());
            }
            // date-only patterns use NaiveDate.
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return Some(date);
            }
        }

        debug!("DateParser: could not parse date string \"{}\"", trimmed);
        None
    }
}

// ── ValueParser ───────────────────────────────────────────────────────────────

/// Parses the `VALOR` column into a finite decimal.
pub struct ValueParser;

impl ValueParser {
    /// Attempt to parse a monetary cell.
    ///
    /// Accepts plain decimal notation with an optional sign or exponent
    /// (`"12.5"`, `"-3"`, `"1e3"`). Anything else, including comma-decimal
    /// text, yields `None`; the caller substitutes zero and counts the
    /// coercion.
    pub fn parse(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
