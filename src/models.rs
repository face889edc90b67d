use chrono::NaiveDate;

/// Header of the required calendar-date column.
pub const DATE_COLUMN: &str = "Date";

/// Header of the optional currency-amount column.
pub const AMOUNT_COLUMN: &str = "Amt";

/// One disputed transaction. `cells` holds every source column's display
/// value in header order (the date cell normalized to ISO), so columns the
/// report doesn't interpret still pass through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub date: NaiveDate,
    /// `None` when the amount cell is blank or unparseable; absent is not zero.
    pub amount: Option<f64>,
    pub cells: Vec<String>,
}

/// The loaded dataset: column headers plus rows in source order.
#[derive(Debug, Clone)]
pub struct TransactionTable {
    pub columns: Vec<String>,
    pub rows: Vec<TransactionRow>,
    pub has_amount_column: bool,
}

/// Global aggregate over the whole table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub total_amount: f64,
    pub total_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl ReportSummary {
    /// Display string for the covered period: "5 Mar 2024 → 6 Mar 2024".
    pub fn date_range(&self) -> String {
        format!(
            "{} \u{2192} {}",
            crate::fmt::display_date(self.first_date),
            crate::fmt::display_date(self.last_date)
        )
    }
}

/// All transactions sharing one calendar date, plus their totals.
/// Rebuilt per render; never persisted.
#[derive(Debug, Clone)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub rows: Vec<TransactionRow>,
    pub total_amount: f64,
    pub count: usize,
}
