//! Dashboard: summary cards plus the task and budget charts.

use anyhow::Result;
use comfy_table::{Attribute, Cell, Color, Table};

use crate::query::{DataSource, Queries};
use crate::session::AppContext;

const BAR_WIDTH: i64 = 24;

pub fn run(ctx: &AppContext) -> Result<()> {
    ctx.require_session()?;
    let queries = Queries::new(&ctx.api);
    render(&queries);
    Ok(())
}

/// Render the whole page. A fetch failure never blocks it: the stats fall
/// back to sample figures and the page says so.
pub fn render(queries: &Queries) {
    let (stats, source) = queries.dashboard();

    println!("\n--- Dashboard ---");
    if source == DataSource::Placeholder {
        println!("⚠️ Could not reach the server. Showing sample figures.");
    }

    // 1. Summary cards
    let mut cards = Table::new();
    cards.set_header(vec![
        Cell::new("Projects"),
        Cell::new("Employees"),
        Cell::new("Architects"),
        Cell::new("Machines"),
        Cell::new("Total Expenses"),
    ]);
    cards.add_row(vec![
        Cell::new(stats.projects),
        Cell::new(stats.employees),
        Cell::new(stats.architects),
        Cell::new(stats.machines),
        Cell::new(format!("${:.2}", stats.total_expenses)).add_attribute(Attribute::Bold),
    ]);
    println!("{cards}");

    // 2. Tasks by status
    println!("\n--- Tasks by Status ---");
    let entries = [
        ("pending", stats.pending_tasks),
        ("in_progress", stats.in_progress_tasks),
        ("done", stats.done_tasks),
    ];
    let widest = entries.iter().map(|(_, count)| *count).max().unwrap_or(0);
    for (label, count) in entries {
        let bar = "█".repeat(bar_width(count, widest));
        println!("  {label:<12} {bar:<24} {count}");
    }

    // 3. Planned vs actual per project budget
    println!("\n--- Budgets (Planned vs Actual) ---");
    if stats.budgets.is_empty() {
        println!("(None found)");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Project"),
        Cell::new("Planned"),
        Cell::new("Actual"),
        Cell::new("Balance"),
    ]);
    for line in &stats.budgets {
        let balance = line.planned - line.actual;
        let balance_cell = if balance < 0.0 {
            Cell::new(format!("${:.2}", balance)).fg(Color::Rgb { r: 185, g: 28, b: 28 })
        } else {
            Cell::new(format!("${:.2}", balance)).fg(Color::Rgb { r: 4, g: 120, b: 87 })
        };
        table.add_row(vec![
            Cell::new(&line.project),
            Cell::new(format!("${:.2}", line.planned)),
            Cell::new(format!("${:.2}", line.actual)),
            balance_cell,
        ]);
    }
    println!("{table}");
}

/// Scale a count against the widest bar. Non-zero counts always show at
/// least one block; the math runs in i128 so huge counts cannot overflow.
pub fn bar_width(count: i64, widest: i64) -> usize {
    if widest <= 0 || count <= 0 {
        return 0;
    }
    let scaled = i128::from(count) * i128::from(BAR_WIDTH) / i128::from(widest);
    scaled.clamp(1, i128::from(BAR_WIDTH)) as usize
}
