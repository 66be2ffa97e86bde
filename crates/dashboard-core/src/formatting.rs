//! Currency and percentage formatting for the dashboard.
//!
//! Monetary values are rendered through a CLDR locale when one can be
//! resolved, with a fixed Brazilian-style fallback (`1.234,50`) so the
//! output stays deterministic on hosts with no usable locale data.

use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use tracing::debug;

/// Locale tried first when the caller expresses no preference.
pub const DEFAULT_LOCALE_TAG: &str = "pt-BR";

/// Host locale tag, looked up once per process.
static SYSTEM_LOCALE_TAG: Lazy<Option<String>> = Lazy::new(sys_locale::get_locale);

// ── CurrencyFormatter ──────────────────────────────────────────────────────

/// Renders monetary amounts, locale-aware when possible.
///
/// Resolution order: the caller's preferred tag, then [`DEFAULT_LOCALE_TAG`],
/// then the host locale. When none resolves, amounts fall back to a fixed
/// period-thousands, comma-decimal rendering. Both paths round half-up to
/// cents from the same integer-cents split, so switching locales never
/// changes the rounded value.
#[derive(Debug, Clone, Copy)]
pub struct CurrencyFormatter {
    locale: Option<Locale>,
}

impl CurrencyFormatter {
    /// Build a formatter, resolving the preferred locale tag if given.
    pub fn new(preference: Option<&str>) -> Self {
        let locale = preference
            .and_then(resolve_locale)
            .or_else(|| resolve_locale(DEFAULT_LOCALE_TAG))
            .or_else(|| SYSTEM_LOCALE_TAG.as_deref().and_then(resolve_locale));
        if locale.is_none() {
            debug!("no usable locale; using fixed thousands-dot formatting");
        }
        Self { locale }
    }

    /// A formatter pinned to the fixed fallback rendering.
    pub fn fallback() -> Self {
        Self { locale: None }
    }

    /// Format an amount with two decimal places and thousands separators,
    /// without a currency symbol.
    ///
    /// # Examples
    ///
    /// ```
    /// use dashboard_core::formatting::CurrencyFormatter;
    ///
    /// let fmt = CurrencyFormatter::fallback();
    /// assert_eq!(fmt.format_amount(1234.5), "1.234,50");
    /// assert_eq!(fmt.format_amount(0.0), "0,00");
    /// assert_eq!(fmt.format_amount(-9876.5), "-9.876,50");
    /// ```
    pub fn format_amount(&self, value: f64) -> String {
        let (negative, units, cents) = split_cents(value);
        let rendered = match self.locale {
            Some(locale) => format!(
                "{}{}{:02}",
                units.to_formatted_string(&locale),
                locale.decimal(),
                cents
            ),
            None => format!("{},{:02}", group_thousands(&units.to_string(), '.'), cents),
        };
        if negative {
            format!("-{rendered}")
        } else {
            rendered
        }
    }

    /// Format an amount as Brazilian currency, `R$` prefixed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dashboard_core::formatting::CurrencyFormatter;
    ///
    /// let fmt = CurrencyFormatter::new(Some("pt-BR"));
    /// assert_eq!(fmt.format_currency(1234.5), "R$ 1.234,50");
    /// assert_eq!(fmt.format_currency(0.0), "R$ 0,00");
    /// ```
    pub fn format_currency(&self, value: f64) -> String {
        format!("R$ {}", self.format_amount(value))
    }
}

// ── Percentages ────────────────────────────────────────────────────────────

/// Calculate `(part / whole) * 100`, or `0.0` when `whole` is zero.
///
/// The raw ratio is returned unrounded; rounding happens once, at display
/// time, in [`format_percentage`].
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(10.0, 0.0), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    (part / whole) * 100.0
}

/// Render a percentage with one decimal place.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_percentage;
///
/// assert_eq!(format_percentage(60.0), "60.0%");
/// assert_eq!(format_percentage(33.333_333), "33.3%");
/// assert_eq!(format_percentage(0.0), "0.0%");
/// ```
pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Split an amount into sign, whole units and cents, rounding half-up to
/// cents. Adds a tiny epsilon (half ULP at cent precision) before rounding
/// to avoid IEEE 754 binary-representation issues at exact midpoints.
fn split_cents(value: f64) -> (bool, u64, u64) {
    let negative = value < 0.0;
    let abs_value = value.abs();
    let epsilon = f64::EPSILON * abs_value * 100.0;
    let total_cents = ((abs_value * 100.0) + epsilon).round() as u64;
    (negative, total_cents / 100, total_cents % 100)
}

/// Insert `separator` every three digits from the right of an integer string.
fn group_thousands(s: &str, separator: char) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(separator);
        }
        result.push(c);
    }
    result
}

/// Resolve a locale tag against the CLDR table, trying the full tag first
/// and the bare language as a second chance ("pt-BR" resolves via "pt").
fn resolve_locale(tag: &str) -> Option<Locale> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return None;
    }
    // POSIX-style tags ("pt_BR.UTF-8") carry separators and an encoding
    // suffix the CLDR table does not know about.
    let hyphenated = trimmed.replace('_', "-");
    let base = hyphenated.split('.').next()?;
    if let Ok(locale) = Locale::from_name(base) {
        return Some(locale);
    }
    let language = base.split('-').next()?;
    Locale::from_name(language).ok()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
