use std::path::{Path, PathBuf};

use calamine::{Data, Reader};
use chrono::NaiveDate;

use crate::error::{DisputeError, Result};
use crate::models::{TransactionRow, TransactionTable, AMOUNT_COLUMN, DATE_COLUMN};

// ---------------------------------------------------------------------------
// Single-slot table cache
// ---------------------------------------------------------------------------

/// Parse-once cache for the source spreadsheet. Constructed per command and
/// passed to the stages that read the table; a repeated `load()` returns the
/// parsed table without touching the file again. There is no invalidation:
/// a changed file is not reloaded within a process.
pub struct TableCache {
    source: PathBuf,
    cached: Option<TransactionTable>,
}

impl TableCache {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            cached: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn load(&mut self) -> Result<&TransactionTable> {
        if self.cached.is_none() {
            let table = load_table(&self.source)?;
            log::debug!(
                "parsed {} rows from {}",
                table.rows.len(),
                self.source.display()
            );
            self.cached = Some(table);
        } else {
            log::debug!("table cache hit for {}", self.source.display());
        }
        Ok(self.cached.as_ref().unwrap())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Load the spreadsheet at `path`, dispatching on its extension. Every
/// failure mode (missing file, unreadable content, missing `Date` column,
/// a row whose date does not parse) comes back as `DisputeError::Load`;
/// the caller must halt rendering on it.
pub fn load_table(path: &Path) -> Result<TransactionTable> {
    let fail = |detail: String| DisputeError::Load {
        path: path.display().to_string(),
        detail,
    };

    if !path.exists() {
        return Err(fail("file not found".to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" => parse_workbook(path).map_err(fail),
        "csv" => parse_csv(path).map_err(fail),
        other => Err(fail(format!("unsupported source format: .{other}"))),
    }
}

type ParseResult<T> = std::result::Result<T, String>;

fn parse_workbook(path: &Path) -> ParseResult<TransactionTable> {
    let mut workbook =
        calamine::open_workbook_auto(path).map_err(|e| format!("failed to open workbook: {e}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no sheets".to_string())?
        .map_err(|e| format!("failed to read first sheet: {e}"))?;

    let mut sheet_rows = range.rows();
    let header = sheet_rows.next().ok_or_else(|| "sheet is empty".to_string())?;
    let columns: Vec<String> = header.iter().map(cell_display).collect();
    let (date_idx, amount_idx) = column_indexes(&columns)?;

    let mut rows = Vec::new();
    for (i, row) in sheet_rows.enumerate() {
        if row.iter().all(is_blank_cell) {
            continue;
        }
        let date = row
            .get(date_idx)
            .and_then(parse_date_cell)
            .ok_or_else(|| format!("row {}: unparseable date", i + 2))?;
        let amount = amount_idx.and_then(|idx| row.get(idx)).and_then(parse_amount_cell);

        let cells = (0..columns.len())
            .map(|c| {
                if c == date_idx {
                    date.format("%Y-%m-%d").to_string()
                } else {
                    row.get(c).map(cell_display).unwrap_or_default()
                }
            })
            .collect();
        rows.push(TransactionRow { date, amount, cells });
    }

    Ok(TransactionTable {
        columns,
        rows,
        has_amount_column: amount_idx.is_some(),
    })
}

fn parse_csv(path: &Path) -> ParseResult<TransactionTable> {
    let file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut columns: Vec<String> = Vec::new();
    let mut date_idx = 0usize;
    let mut amount_idx: Option<usize> = None;
    let mut found_header = false;
    let mut rows = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if !found_header {
            // Tolerate preamble lines before the header row.
            if record.iter().any(|f| f.trim() == DATE_COLUMN) {
                columns = record.iter().map(|f| f.trim().to_string()).collect();
                let (d, a) = column_indexes(&columns)?;
                date_idx = d;
                amount_idx = a;
                found_header = true;
            }
            continue;
        }
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let date = record
            .get(date_idx)
            .and_then(parse_date_str)
            .ok_or_else(|| format!("row {}: unparseable date", i + 1))?;
        let amount = amount_idx
            .and_then(|idx| record.get(idx))
            .and_then(|raw| parse_amount(raw));

        let cells = (0..columns.len())
            .map(|c| {
                if c == date_idx {
                    date.format("%Y-%m-%d").to_string()
                } else {
                    record.get(c).unwrap_or("").trim().to_string()
                }
            })
            .collect();
        rows.push(TransactionRow { date, amount, cells });
    }

    if !found_header {
        return Err(format!("missing {DATE_COLUMN} column"));
    }

    Ok(TransactionTable {
        columns,
        rows,
        has_amount_column: amount_idx.is_some(),
    })
}

fn column_indexes(columns: &[String]) -> ParseResult<(usize, Option<usize>)> {
    let date_idx = columns
        .iter()
        .position(|c| c.trim() == DATE_COLUMN)
        .ok_or_else(|| format!("missing {DATE_COLUMN} column"))?;
    let amount_idx = columns.iter().position(|c| c.trim() == AMOUNT_COLUMN);
    Ok((date_idx, amount_idx))
}

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

fn cell_display(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                format!("{f}")
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::Empty => String::new(),
        other => format!("{other}"),
    }
}

fn is_blank_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn parse_date_cell(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::String(s) => parse_date_str(s),
        Data::Float(f) => excel_serial_to_date(*f),
        Data::Int(i) => excel_serial_to_date(*i as f64),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        _ => None,
    }
}

pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

/// Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..300_000.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial as i64))
}

fn parse_amount_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_amount(s),
        _ => None,
    }
}

/// Tolerant currency parsing: strips `$`, thousands separators and quotes;
/// `(1,234.56)` is negative. A blank or unparseable cell is absent, not zero.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}
