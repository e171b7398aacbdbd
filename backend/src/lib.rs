//! # cardkit - invitation cards and bulk business card uploads
//!
//! One handler, two jobs: `GET` renders an event invitation card from the
//! query string, `POST` takes a CSV or Excel upload and returns its rows
//! grouped by `Designation`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Request body│────▶│  Payload    │────▶│   Parser    │────▶│   Grouper   │
//! │ (b64/multi) │     │ (multer)    │     │ (xlsx/csv)  │     │ (ordered)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cardkit::{handle, InvocationRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let request = InvocationRequest::new("POST")
//!         .with_header("Content-Type", "text/csv")
//!         .with_body("Name,Designation\nA,Eng", false);
//!     let response = handle(request).await;
//!     println!("{} {}", response.status_code, response.body);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Environment configuration
//! - [`payload`] - Request body and multipart decoding
//! - [`parser`] - Spreadsheet and CSV parsing
//! - [`transform`] - Grouping and the upload pipeline
//! - [`card`] - Invitation card rendering
//! - [`api`] - Handler, local server, Lambda runtime

// Core modules
pub mod config;
pub mod error;

// Upload path
pub mod parser;
pub mod payload;
pub mod transform;

// Card path
pub mod card;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, IngestError, ParseError, PayloadError, ServerError};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    csv_to_records, decode_text, detect_delimiter, parse_csv_bytes, parse_csv_text, parse_file,
    parse_table, parse_workbook, CsvError, ParsedTable, RowRecord, TableFormat,
};

// =============================================================================
// Re-exports - Payload
// =============================================================================

pub use payload::{decode_body, extract_file, FilePayload};

// =============================================================================
// Re-exports - Grouping and pipeline
// =============================================================================

pub use transform::{
    flatten, group_by_designation, group_by_field, group_table, ingest_upload, GroupedRecords,
    IngestOutcome, DESIGNATION_FIELD, FALLBACK_GROUP,
};

// =============================================================================
// Re-exports - Card and API
// =============================================================================

pub use api::types::{
    InvocationRequest, InvocationResponse, MessageResponse, UploadResponse,
};
pub use api::{handle, run_lambda, start_server};
pub use card::InvitationCard;
pub use config::AppConfig;
