use std::path::Path;

use chrono::NaiveDate;

use crate::error::{PennyError, Result};
use crate::models::ParsedRow;

// Fixed export layout of the supported statements. Only date, payee, and
// amount survive into the working table.
const STATEMENT_COLUMNS: &[&str] = &[
    "details",
    "date",
    "payee",
    "amount",
    "type",
    "balance",
    "check_num",
    "unused",
];
const IDX_DATE: usize = 1;
const IDX_PAYEE: usize = 2;
const IDX_AMOUNT: usize = 3;

// ---------------------------------------------------------------------------
// Field parsing helpers
// ---------------------------------------------------------------------------

/// Lenient amount parsing: commas, quotes, currency symbols, and
/// parenthesized negatives. `None` when nothing numeric remains.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}

/// Accepts the date shapes seen across statement exports. `None` stands in
/// for an unparseable date; ingestion drops such rows.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in ["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Statement readers
// ---------------------------------------------------------------------------

/// Parse one statement file. The first record is a header and is discarded;
/// a header too narrow to hold the required columns fails the whole batch.
/// Data rows missing a parseable date, a payee, or a parseable amount are
/// dropped.
pub fn read_statement(path: &Path) -> Result<Vec<ParsedRow>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut rows = Vec::new();
    let mut header_seen = false;

    for result in rdr.records() {
        let record = result?;
        if !header_seen {
            check_header_width(record.len())?;
            header_seen = true;
            continue;
        }
        if record.len() <= IDX_AMOUNT {
            continue;
        }
        let Some(date) = parse_date(&record[IDX_DATE]) else {
            continue;
        };
        let payee = record[IDX_PAYEE].trim().to_string();
        if payee.is_empty() {
            continue;
        }
        let Some(amount) = parse_amount(&record[IDX_AMOUNT]) else {
            continue;
        };
        rows.push(ParsedRow {
            date,
            payee,
            amount,
        });
    }

    if !header_seen {
        return Err(PennyError::MissingColumn(
            STATEMENT_COLUMNS[IDX_DATE].to_string(),
        ));
    }
    Ok(rows)
}

fn check_header_width(width: usize) -> Result<()> {
    for idx in [IDX_DATE, IDX_PAYEE, IDX_AMOUNT] {
        if width <= idx {
            return Err(PennyError::MissingColumn(STATEMENT_COLUMNS[idx].to_string()));
        }
    }
    Ok(())
}
