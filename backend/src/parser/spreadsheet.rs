//! Workbook reading via calamine.
//!
//! Only the first sheet is read. The first non-blank row names the
//! columns; every later non-blank row becomes a record.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde_json::{Map, Number, Value};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use super::{ParsedTable, RowRecord, TableFormat};
use crate::error::{ParseError, ParseResult};

/// Header name given to columns whose header cell is empty.
const EMPTY_HEADER: &str = "__EMPTY";

/// Largest integer an f64 holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Parse workbook bytes (xlsx, xlsm, xlsb, xls or ods).
pub fn parse_workbook(bytes: &[u8]) -> ParseResult<ParsedTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ParseError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ParseError::Spreadsheet("Workbook has no sheets".into()))?
        .map_err(|e| ParseError::Spreadsheet(e.to_string()))?;

    let (headers, records) = range_to_records(&range);

    Ok(ParsedTable {
        records,
        headers,
        format: TableFormat::Spreadsheet,
        delimiter: None,
        encoding: None,
    })
}

fn range_to_records(range: &Range<Data>) -> (Vec<String>, Vec<RowRecord>) {
    let mut rows = range.rows().filter(|row| !is_blank_row(row));

    let Some(header_row) = rows.next() else {
        return (Vec::new(), Vec::new());
    };
    let headers = header_names(header_row);

    let records = rows
        .map(|row| {
            let mut record = Map::new();
            for (header, cell) in headers.iter().zip(row) {
                if let Some(value) = cell_value(cell) {
                    record.insert(header.clone(), value);
                }
            }
            record
        })
        .collect();

    (headers, records)
}

fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|cell| cell_value(cell).is_none())
}

/// Name columns from the header row: empty cells become `__EMPTY`,
/// repeats get the first free `_1`, `_2`, ... suffix.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();

    row.iter()
        .map(|cell| {
            let base = match cell_value(cell) {
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => EMPTY_HEADER.to_string(),
            };

            let mut name = base.clone();
            while used.contains(&name) {
                let suffix = suffixes.entry(base.clone()).or_insert(0);
                *suffix += 1;
                name = format!("{}_{}", base, suffix);
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

/// JSON value for a cell, `None` when the cell is empty.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            Some(Value::String(s.clone()))
        }
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => Some(number_value(*f)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        // Excel serial date, as stored in the sheet.
        Data::DateTime(dt) => Some(number_value(dt.as_f64())),
        Data::Error(e) => Some(Value::String(e.to_string())),
    }
}

fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}
