//! Tabular file parser: spreadsheet workbooks first, CSV text as fallback.
//!
//! Converts uploaded file bytes into row records (JSON objects keyed by
//! the header row). No grouping logic here.
//!
//! ```text
//! bytes ──▶ calamine (xlsx/xls/xlsb/ods) ──ok──▶ ParsedTable
//!                 │ err
//!                 ▼
//!           BOM / UTF-8 decode ──▶ delimiter detection ──▶ csv ──▶ ParsedTable
//! ```

mod spreadsheet;

pub use spreadsheet::parse_workbook;

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

use crate::error::{ParseError, ParseResult};

/// One parsed data row: column header -> cell value.
pub type RowRecord = Map<String, Value>;

/// CSV parsing error with its line number
#[derive(Debug, Clone)]
pub struct CsvError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for CsvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for CsvError {}

impl CsvError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Which interpretation produced the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Spreadsheet,
    Csv,
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFormat::Spreadsheet => f.write_str("spreadsheet"),
            TableFormat::Csv => f.write_str("csv"),
        }
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParsedTable {
    /// Parsed rows, in file order
    pub records: Vec<RowRecord>,
    /// Column headers
    pub headers: Vec<String>,
    /// Interpretation that succeeded
    pub format: TableFormat,
    /// Delimiter used (CSV only)
    pub delimiter: Option<char>,
    /// Text encoding used (CSV only)
    pub encoding: Option<&'static str>,
}

/// Interpret file bytes as a workbook, falling back to CSV text.
///
/// Either every row is returned or the whole file is rejected with
/// [`ParseError::InvalidFileFormat`].
pub fn parse_table(bytes: &[u8]) -> ParseResult<ParsedTable> {
    let spreadsheet_err = match parse_workbook(bytes) {
        Ok(table) => return Ok(table),
        Err(e) => e,
    };
    tracing::debug!(error = %spreadsheet_err, "not a spreadsheet, trying CSV");

    parse_csv_bytes(bytes).map_err(|csv_err| {
        tracing::debug!(error = %csv_err, "not CSV either");
        ParseError::InvalidFileFormat {
            spreadsheet: Box::new(spreadsheet_err),
            csv: Box::new(csv_err),
        }
    })
}

/// Read a file from disk and parse it with [`parse_table`].
pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<ParsedTable> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_table(&bytes)
}

/// Parse CSV bytes with encoding and delimiter detection.
pub fn parse_csv_bytes(bytes: &[u8]) -> ParseResult<ParsedTable> {
    let (content, encoding) = decode_text(bytes)?;
    let delimiter = detect_delimiter(&content);
    let (headers, records) = parse_csv_text(&content, delimiter)?;

    Ok(ParsedTable {
        records,
        headers,
        format: TableFormat::Csv,
        delimiter: Some(delimiter),
        encoding: Some(encoding),
    })
}

/// Decode bytes to text.
///
/// A UTF-8 or UTF-16 byte order mark selects that encoding and is
/// stripped; otherwise the bytes must be UTF-8. Malformed sequences are an
/// error, never replaced.
pub fn decode_text(bytes: &[u8]) -> ParseResult<(String, &'static str)> {
    let (encoding, bom_len) =
        encoding_rs::Encoding::for_bom(bytes).unwrap_or((encoding_rs::UTF_8, 0));

    let text = encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .ok_or_else(|| ParseError::Decode(format!("content is not valid {}", encoding.name())))?;

    if text.contains('\0') {
        return Err(ParseError::Decode("content contains NUL bytes".into()));
    }

    Ok((text.into_owned(), encoding.name()))
}

/// Detect the delimiter from the header line.
///
/// Comma whenever the header contains one; otherwise the most frequent of
/// `;`, tab and `|`, falling back to comma.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");
    if first_line.contains(',') {
        return ',';
    }

    let mut best_sep = ',';
    let mut best_count = 0;

    for sep in [';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into row records with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use cardkit::csv_to_records;
///
/// let rows = csv_to_records("Name,Designation\nA,Eng", ',').unwrap();
///
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0]["Designation"], "Eng");
/// ```
pub fn csv_to_records(csv: &str, delimiter: char) -> ParseResult<Vec<RowRecord>> {
    parse_csv_text(csv, delimiter).map(|(_, records)| records)
}

/// Parse CSV text into headers and row records.
///
/// The first record is the header row. Empty lines are skipped; any other
/// record must have exactly as many fields as the header.
pub fn parse_csv_text(content: &str, delimiter: char) -> ParseResult<(Vec<String>, Vec<RowRecord>)> {
    if !delimiter.is_ascii() {
        return Err(CsvError::new(0, format!("Unsupported delimiter '{}'", delimiter)).into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut records = Vec::new();

    for result in reader.records() {
        let row = result.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line() as usize);
            CsvError::new(line, e.to_string())
        })?;
        let line = row.position().map_or(0, |p| p.line() as usize);

        if row.len() == 1 && row[0].is_empty() {
            continue;
        }

        let Some(columns) = headers.as_ref() else {
            headers = Some(row.iter().map(str::to_string).collect());
            continue;
        };

        if row.len() != columns.len() {
            return Err(CsvError::new(
                line,
                format!("Expected {} fields, found {}", columns.len(), row.len()),
            )
            .into());
        }

        let mut obj = Map::new();
        for (header, value) in columns.iter().zip(row.iter()) {
            obj.insert(header.clone(), Value::String(value.to_string()));
        }
        records.push(obj);
    }

    let headers = headers.ok_or_else(|| CsvError::new(1, "Empty CSV file"))?;

    Ok((headers, records))
}
