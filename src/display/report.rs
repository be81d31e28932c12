//! Payment report formatting for terminal output

use crate::models::Money;
use crate::services::report::PaymentReport;
use crate::services::run::RunReport;

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// Truncate a string to a maximum number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str, max: usize) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
        .min(max)
}

/// Format a payment report as a table
pub fn format_report_table(report: &PaymentReport, symbol: &str) -> String {
    if report.rows.is_empty() {
        return "No children found.".to_string();
    }

    let name_width = column_width(report.rows.iter().map(|r| r.name.as_str()), "Child", 28);
    let parent_width = column_width(
        report.rows.iter().map(|r| r.parent.as_deref().unwrap_or("-")),
        "Parent",
        24,
    );

    let mut output = String::new();
    output.push_str(&format!(
        "{:<6}  {:<name_width$}  {:<parent_width$}  {:<5}  {:>9}  {:>10}  {:>6}  {:>8}  {}\n",
        "ID", "Child", "Parent", "Class", "Fee", "Allocated", "Months", "Extras", "Status",
    ));
    let width = 6 + name_width + parent_width + 5 + 9 + 10 + 6 + 8 + 2 * 8 + 20;
    output.push_str(&separator(width));
    output.push('\n');

    for row in &report.rows {
        output.push_str(&format!(
            "{:<6}  {:<name_width$}  {:<parent_width$}  {:<5}  {:>9}  {:>10}  {:>6.2}  {:>8}  {}\n",
            truncate(row.child_id.as_str(), 6),
            truncate(&row.name, name_width),
            truncate(row.parent.as_deref().unwrap_or("-"), parent_width),
            row.class.as_str(),
            row.monthly_fee.format_with_symbol(symbol),
            row.allocated.format_with_symbol(symbol),
            row.months_paid,
            if row.extras.is_zero() {
                String::new()
            } else {
                row.extras.format_with_symbol(symbol)
            },
            row.status,
        ));
    }

    output.push_str(&separator(width));
    output.push('\n');

    let totals = &report.totals;
    output.push_str(&format!(
        "{} children: {} fully paid, {} underpaid, {} nothing paid, {} not registered\n",
        totals.children,
        totals.fully_paid,
        totals.underpaid,
        totals.nothing_paid,
        totals.not_registered,
    ));
    output.push_str(&format!(
        "Total allocated: {}\n",
        totals.allocated.format_with_symbol(symbol)
    ));
    if totals.new_payments != Money::zero() || report.run_id.is_some() {
        output.push_str(&format!(
            "New payments:    {}\n",
            totals.new_payments.format_with_symbol(symbol)
        ));
    }

    if !report.unmatched_payers.is_empty() {
        output.push_str("\nUnmatched payers:\n");
        for payer in &report.unmatched_payers {
            output.push_str(&format!("  - {}\n", payer));
        }
    }

    output
}

/// Format the header block of a run
pub fn format_run_summary(run: &RunReport, dry_run: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Run {} ({:?}{})\n",
        run.run_id,
        run.mode,
        if dry_run { ", dry run" } else { "" }
    ));
    output.push_str(&format!("  Window:           {}", run.window));
    if run.window_extended {
        output.push_str(" (extended)");
    }
    output.push('\n');
    output.push_str(&format!(
        "  Children:         {} processed, {} carried over\n",
        run.processed, run.carried
    ));
    if run.parents_inferred > 0 {
        output.push_str(&format!(
            "  Parents inferred: {}\n",
            run.parents_inferred
        ));
    }
    output.push_str(&format!(
        "  Statement:        {} records, {} applied, {} already applied, {} unmatched\n",
        run.payments.records,
        run.payments.applied,
        run.payments.duplicates,
        run.payments.unmatched.len()
    ));
    output.push_str(&format!("  Changed children: {}\n", run.changes.len()));

    output
}
