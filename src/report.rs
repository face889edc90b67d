use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{DisputeError, Result};
use crate::models::{DaySummary, ReportSummary, TransactionRow, TransactionTable};

/// Sum the amounts that are present. A table without an amount column (or
/// with every cell blank) totals 0.0 rather than failing.
fn sum_amounts(rows: &[TransactionRow]) -> f64 {
    rows.iter().filter_map(|r| r.amount).sum()
}

/// Global aggregate: total amount, row count, covered date range.
/// Fails with `EmptyTable` on zero rows; the caller must guard this
/// before rendering anything.
pub fn summarize(table: &TransactionTable) -> Result<ReportSummary> {
    let dates: Vec<NaiveDate> = table.rows.iter().map(|r| r.date).collect();
    let (first_date, last_date) = match (dates.iter().min(), dates.iter().max()) {
        (Some(min), Some(max)) => (*min, *max),
        _ => return Err(DisputeError::EmptyTable),
    };

    Ok(ReportSummary {
        total_amount: sum_amounts(&table.rows),
        total_count: table.rows.len(),
        first_date,
        last_date,
    })
}

/// Partition the table by calendar date: one `DaySummary` per distinct date,
/// ascending, rows in source order within each day. Dates with no
/// transactions get no entry.
pub fn group_by_day(table: &TransactionTable) -> Vec<DaySummary> {
    let mut by_date: BTreeMap<NaiveDate, Vec<TransactionRow>> = BTreeMap::new();
    for row in &table.rows {
        by_date.entry(row.date).or_default().push(row.clone());
    }

    by_date
        .into_iter()
        .map(|(date, rows)| {
            let total_amount = sum_amounts(&rows);
            let count = rows.len();
            DaySummary {
                date,
                rows,
                total_amount,
                count,
            }
        })
        .collect()
}
