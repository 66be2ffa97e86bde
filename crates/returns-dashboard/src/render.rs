//! Console rendering of the dashboard payload.
//!
//! Stands in for the chart layer: the same aggregates a page would plot
//! are printed as markdown tables, in the order the page lays them out.

use dashboard_core::formatting::CurrencyFormatter;
use dashboard_data::aggregator::{ShareRow, ValueRow};
use dashboard_data::dashboard::{DashboardData, DashboardState};
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

// ── Display rows ──────────────────────────────────────────────────────────────

/// One branch slice of the whole-upload chart.
#[derive(Tabled)]
struct BranchDisplayRow {
    #[tabled(rename = "FILIAL")]
    branch: String,
    #[tabled(rename = "VALOR")]
    total: String,
}

/// One reason share of the filtered total.
#[derive(Tabled)]
struct ShareDisplayRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "MOTIVO")]
    label: String,
    #[tabled(rename = "PERCENTUAL")]
    share: String,
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Print the full dashboard as console tables.
pub fn print_dashboard(data: &DashboardData, formatter: &CurrencyFormatter) {
    println!();
    println!("VALOR TOTAL: {}", data.total_display);

    section("ANÁLISE POR UNIDADE LOGÍSTICA (TOTAL)", &branch_table(data, formatter));
    section("PERCENTUAL POR OCORRÊNCIAS", &share_table(&data.reason_shares));

    section(
        "TOP 10 TIPOS DE OCORRÊNCIA",
        &ranking_table("MOTIVO", &data.reason_ranking),
    );
    section(
        "RANK 10 VENDEDORES",
        &ranking_table("VENDEDOR", &data.salesperson_ranking),
    );
    section(
        "RANK 10 CLIENTES",
        &ranking_table("CLIENTE", &data.customer_ranking),
    );
    if let Some(rows) = &data.driver_ranking {
        section("RANK 10 MOTORISTAS", &ranking_table("MOTORISTA", rows));
    }
    if let Some(rows) = &data.route_ranking {
        section("RANK 10 ROTAS", &ranking_table("ROTA", rows));
    }
}

/// Print the dashboard state as pretty JSON for machine consumers.
pub fn print_json(state: &DashboardState) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(state)?;
    println!("{text}");
    Ok(())
}

fn section(title: &str, table: &str) {
    println!();
    println!("{title}");
    println!("{table}");
}

fn branch_table(data: &DashboardData, formatter: &CurrencyFormatter) -> String {
    let rows: Vec<BranchDisplayRow> = data
        .branch_totals
        .iter()
        .map(|(branch, total)| BranchDisplayRow {
            branch: branch.clone(),
            total: formatter.format_currency(*total),
        })
        .collect();
    if rows.is_empty() {
        return "(sem registros)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

fn share_table(shares: &[ShareRow]) -> String {
    let rows: Vec<ShareDisplayRow> = shares
        .iter()
        .map(|row| ShareDisplayRow {
            rank: row.rank,
            label: row.label.clone(),
            share: row.display.clone(),
        })
        .collect();
    if rows.is_empty() {
        return "(sem registros)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

/// Ranking tables share a shape but name their grouping column, so the
/// header row is assembled by hand.
fn ranking_table(label_header: &str, rows: &[ValueRow]) -> String {
    if rows.is_empty() {
        return "(sem registros)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(["#", label_header, "VALOR"]);
    for row in rows {
        builder.push_record([
            row.rank.to_string(),
            row.label.clone(),
            row.display.clone(),
        ]);
    }
    builder.build().with(Style::markdown()).to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
