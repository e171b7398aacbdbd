//! Upload pipeline: request body in, grouped cards out.
//!
//! ```text
//! body ──▶ decode_body ──▶ extract_file ──▶ parse_table ──▶ group_by_designation
//!          (base64)        (multipart)      (xlsx / csv)    ("Designation")
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cardkit::ingest_upload;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let outcome = ingest_upload(Some("Name,Designation\nA,Eng"), false, Some("text/csv")).await?;
//!     println!("{} rows in {} groups", outcome.row_count, outcome.grouped.len());
//!     Ok(())
//! }
//! ```

use serde::Serialize;

use super::grouper::{group_by_designation, GroupedRecords};
use crate::api::logs::{log_info, log_info_indent, log_success};
use crate::error::IngestResult;
use crate::parser::{parse_table, ParsedTable, TableFormat};
use crate::payload::{decode_body, extract_file};

/// Result of one processed upload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    /// Rows grouped by designation
    pub grouped: GroupedRecords,

    /// Number of rows parsed from the file
    pub row_count: usize,

    /// Column headers of the file
    pub headers: Vec<String>,

    /// Interpretation that succeeded
    pub format: TableFormat,

    /// Uploaded file name (multipart uploads only)
    pub file_name: Option<String>,
}

/// Run the whole upload pipeline on a raw request body.
pub async fn ingest_upload(
    body: Option<&str>,
    is_base64_encoded: bool,
    content_type: Option<&str>,
) -> IngestResult<IngestOutcome> {
    let bytes = decode_body(body, is_base64_encoded)?;
    let file = extract_file(bytes, content_type).await?;

    log_info(format!(
        "Received {} ({} bytes)",
        file.file_name.as_deref().unwrap_or("raw body"),
        file.bytes.len()
    ));

    let table = parse_table(&file.bytes)?;
    log_info_indent(format!("Parsed as {}", describe(&table)), 1);

    Ok(group_table(table, file.file_name))
}

/// Group an already parsed table.
pub fn group_table(table: ParsedTable, file_name: Option<String>) -> IngestOutcome {
    let row_count = table.records.len();
    let grouped = group_by_designation(table.records);

    log_success(format!("{} rows in {} groups", row_count, grouped.len()));

    IngestOutcome {
        grouped,
        row_count,
        headers: table.headers,
        format: table.format,
        file_name,
    }
}

fn describe(table: &ParsedTable) -> String {
    match (table.format, table.delimiter, table.encoding) {
        (TableFormat::Csv, Some(delimiter), Some(encoding)) => format!(
            "CSV ({}, delimiter '{}', {} columns)",
            encoding,
            delimiter.escape_default(),
            table.headers.len()
        ),
        (format, _, _) => format!("{} ({} columns)", format, table.headers.len()),
    }
}
