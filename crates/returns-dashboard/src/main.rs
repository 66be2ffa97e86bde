mod bootstrap;
mod render;

use anyhow::Result;
use dashboard_core::formatting::CurrencyFormatter;
use dashboard_core::settings::Settings;
use dashboard_data::dashboard::DashboardState;
use dashboard_data::filter::{FilterSelection, MonthFilter};
use dashboard_data::session::Session;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Returns Dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let formatter = CurrencyFormatter::new(settings.locale.as_deref());
    let mut session = Session::new(formatter);

    let Some(path) = settings.file.as_ref() else {
        println!("Por favor, selecione um arquivo Excel para continuar.");
        return Ok(());
    };

    let report = session.load_file(path)?;
    tracing::info!(
        "Loaded {}: kept {} of {} rows ({} without a usable date, {} values read as zero)",
        path.display(),
        report.rows_kept,
        report.rows_read,
        report.dates_dropped,
        report.values_coerced
    );

    // Session installed a select-all selection; the flags narrow it the way
    // the sidebar widgets would.
    let selection = narrow_selection(session.selection().clone(), &settings);
    session.set_selection(selection);

    let state = session.dashboard();

    if settings.json {
        render::print_json(&state)?;
        return Ok(());
    }

    match state {
        DashboardState::AwaitingUpload => {
            println!("Por favor, selecione um arquivo Excel para continuar.");
        }
        DashboardState::NoMatchingRows => {
            println!("Nenhum dado encontrado com os filtros selecionados.");
        }
        DashboardState::Ready(data) => {
            render::print_dashboard(&data, session.formatter());
        }
    }

    Ok(())
}

/// Narrow a select-all selection with whatever flags were given. A flag
/// left out keeps the select-all default for its dimension.
fn narrow_selection(mut selection: FilterSelection, settings: &Settings) -> FilterSelection {
    if !settings.reasons.is_empty() {
        selection.reasons = settings.reasons.iter().map(|r| r.trim().to_string()).collect();
    }
    if !settings.branches.is_empty() {
        // Branch values are stored uppercase, so match the canonical form.
        selection.branches = settings
            .branches
            .iter()
            .map(|b| b.trim().to_uppercase())
            .collect();
    }
    if !settings.salespeople.is_empty() {
        selection.salespeople = settings
            .salespeople
            .iter()
            .map(|s| s.trim().to_string())
            .collect();
    }
    selection.month = MonthFilter::parse(&settings.month);
    selection
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::{month_key, ColumnPresence, Dataset, ReturnRecord};

    fn record(reason: &str, branch: &str) -> ReturnRecord {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        ReturnRecord {
            branch: branch.to_string(),
            reason: reason.to_string(),
            salesperson: "ANA".to_string(),
            customer: "LOJA A".to_string(),
            value: 10.0,
            date,
            month_key: month_key(date),
            driver: None,
            route: None,
        }
    }

    fn select_all() -> FilterSelection {
        let dataset = Dataset::new(
            vec![record("AVARIA", "SP"), record("VENCIDO", "RJ")],
            ColumnPresence::default(),
        );
        FilterSelection::select_all(&dataset)
    }

    fn settings(args: &[&str]) -> Settings {
        let argv = std::iter::once("returns-dashboard").chain(args.iter().copied());
        Settings::load_from_args(argv)
    }

    // ── test_narrow_selection ─────────────────────────────────────────────────

    #[test]
    fn test_no_flags_keeps_select_all() {
        let selection = narrow_selection(select_all(), &settings(&[]));
        assert_eq!(selection.reasons.len(), 2);
        assert_eq!(selection.branches.len(), 2);
        assert_eq!(selection.month, MonthFilter::All);
    }

    #[test]
    fn test_reason_flag_replaces_dimension() {
        let selection = narrow_selection(select_all(), &settings(&["--reason", "AVARIA"]));
        assert_eq!(selection.reasons.len(), 1);
        assert!(selection.reasons.contains("AVARIA"));
        // Other dimensions keep their select-all defaults.
        assert_eq!(selection.branches.len(), 2);
    }

    #[test]
    fn test_branch_flag_is_canonicalised() {
        let selection = narrow_selection(select_all(), &settings(&["--branch", " sp "]));
        assert!(selection.branches.contains("SP"));
    }

    #[test]
    fn test_month_flag_parses() {
        let selection = narrow_selection(select_all(), &settings(&["--month", "3-2024"]));
        assert_eq!(selection.month, MonthFilter::Month("3-2024".to_string()));
    }
}
