use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Aggregated analysis of product-return spreadsheets
#[derive(Parser, Debug, Clone)]
#[command(
    name = "returns-dashboard",
    about = "Aggregated analysis of product-return spreadsheets",
    version
)]
pub struct Settings {
    /// Returns file to analyze (.xlsx/.xlsm/.xls/.ods or delimited text)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Month to analyze, e.g. "3-2024" ("all" for every month)
    #[arg(long, default_value = "all")]
    pub month: String,

    /// Keep only these return reasons (repeatable; default: all observed)
    #[arg(long = "reason", value_name = "REASON")]
    pub reasons: Vec<String>,

    /// Keep only these branches (repeatable; default: all observed)
    #[arg(long = "branch", value_name = "BRANCH")]
    pub branches: Vec<String>,

    /// Keep only these salespeople (repeatable; default: all observed)
    #[arg(long = "salesperson", value_name = "NAME")]
    pub salespeople: Vec<String>,

    /// Locale for currency display, e.g. "pt-BR"
    #[arg(long)]
    pub locale: Option<String>,

    /// Emit the dashboard payload as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::resolve(Self::parse())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Self::parse_from(args))
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
