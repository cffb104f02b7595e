//! Run summary table

use console::Style;

use crate::strategy::StageReport;

/// Print one line per stage with its counts
pub fn print_summary(name: &str, reports: &[StageReport]) {
    println!("{}", Style::new().bold().apply_to(format!("{name}:")));

    let width = reports
        .iter()
        .map(|r| r.kind.len() + r.name.len() + 2)
        .max()
        .unwrap_or(0);

    for report in reports {
        let label = format!("{}::{}", report.kind, report.name);
        println!(
            "  {:<width$}  {} {}  {} {}/{}",
            Style::new().cyan().apply_to(label),
            Style::new().dim().apply_to("processed"),
            report.processed,
            Style::new().dim().apply_to("active"),
            report.active,
            report.total,
        );
    }
}
