use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::attachments::{AttachmentIndex, AttachmentState};
use crate::error::Result;
use crate::fmt::{self, display_date, format_bytes, money};
use crate::loader::TableCache;
use crate::models::{DaySummary, ReportSummary, TransactionTable, AMOUNT_COLUMN};
use crate::report;

/// Load, aggregate, group and render the full text report. A load failure or
/// an empty table fails here, before anything is rendered; per-day
/// attachment problems only color their own section.
pub fn render(cache: &mut TableCache, attachments_dir: &Path) -> Result<String> {
    let table = cache.load()?;
    let summary = report::summarize(table)?;
    let days = report::group_by_day(table);
    let index = AttachmentIndex::build(attachments_dir)?;
    Ok(format_report(table, &summary, &days, &index))
}

pub fn format_report(
    table: &TransactionTable,
    summary: &ReportSummary,
    days: &[DaySummary],
    index: &AttachmentIndex,
) -> String {
    let mut out = String::from("Disputed Transactions Report\n");

    let mut cards = Table::new();
    cards.set_header(vec!["Metric", "Value"]);
    cards.add_row(vec![
        Cell::new("Total Disputed Amount"),
        Cell::new(money(summary.total_amount)),
    ]);
    cards.add_row(vec![
        Cell::new("Total Disputed Transactions"),
        Cell::new(summary.total_count),
    ]);
    cards.add_row(vec![Cell::new("Date Range"), Cell::new(summary.date_range())]);
    out.push_str(&format!("\nSummary\n{cards}"));

    for w in index.warnings() {
        out.push_str(&format!("\n{}", format!("Warning: {w}").yellow()));
    }

    let amount_idx = table
        .columns
        .iter()
        .position(|c| c.trim() == AMOUNT_COLUMN);

    for day in days {
        let title = format!(
            "{} \u{2014} {} | {} txns",
            display_date(day.date),
            money(day.total_amount),
            day.count
        );
        out.push_str(&format!("\n\n{}", title.bold()));

        let mut t = Table::new();
        t.set_header(table.columns.clone());
        for row in &day.rows {
            let cells: Vec<Cell> = row
                .cells
                .iter()
                .enumerate()
                .map(|(i, raw)| {
                    if Some(i) == amount_idx {
                        match row.amount {
                            Some(a) => Cell::new(fmt::amount(a)),
                            None => Cell::new(raw),
                        }
                    } else {
                        Cell::new(raw)
                    }
                })
                .collect();
            t.add_row(cells);
        }
        out.push_str(&format!("\n{t}"));

        match index.load(day.date) {
            AttachmentState::Loaded(att) => {
                out.push_str(&format!(
                    "\nAttachment: {} ({}, {}) \u{2014} save with `disputes attachments save {}`",
                    att.file_name,
                    att.content_type(),
                    format_bytes(att.bytes.len() as u64),
                    day.date.format("%Y-%m-%d"),
                ));
            }
            AttachmentState::ReadFailed { file_name, detail } => {
                out.push_str(&format!(
                    "\n{}",
                    format!("Error reading attachment {file_name}: {detail}").red()
                ));
            }
            AttachmentState::NotFound => {
                out.push_str(&format!("\n{}", "No PDF found for this date.".yellow()));
            }
        }
    }

    out
}
