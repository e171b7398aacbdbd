//! Error types for the cardkit handler.
//!
//! - [`PayloadError`] - Request body / multipart extraction errors
//! - [`ParseError`] - Spreadsheet and CSV interpretation errors
//! - [`IngestError`] - Top-level upload errors, mapped to HTTP statuses
//! - [`ConfigError`] - Environment configuration errors
//! - [`ServerError`] - Hosting surface errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::parser::CsvError;

// =============================================================================
// Payload Errors
// =============================================================================

/// Errors while pulling the uploaded file out of a request body.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Nothing usable in the body: empty, no file part, or unreadable multipart.
    #[error("No file uploaded.")]
    NoFileUploaded,

    /// Body flagged as base64 but not decodable.
    #[error("Invalid base64 request body: {0}")]
    InvalidBase64(String),
}

// =============================================================================
// Parse Errors
// =============================================================================

/// Errors while turning file bytes into row records.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Bytes are not a readable workbook.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Text is not well-formed CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Bytes are not valid text in the detected encoding.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Failed to read a file from disk.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Neither interpretation succeeded.
    #[error("Invalid file format. Upload a valid CSV or Excel file.")]
    InvalidFileFormat {
        spreadsheet: Box<ParseError>,
        csv: Box<ParseError>,
    },
}

// =============================================================================
// Ingest Errors (top-level)
// =============================================================================

/// Top-level upload errors.
///
/// This is the error type returned by [`crate::transform::pipeline::ingest_upload`].
/// The handler turns it into a response with [`IngestError::status_code`].
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl IngestError {
    /// HTTP status for this error: client errors for missing or unreadable
    /// files, 500 for the rest.
    pub fn status_code(&self) -> u16 {
        match self {
            IngestError::Payload(PayloadError::NoFileUploaded) => 400,
            IngestError::Parse(ParseError::InvalidFileFormat { .. }) => 400,
            _ => 500,
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}' ({message})")]
    InvalidValue {
        name: &'static str,
        value: String,
        message: String,
    },
}

// =============================================================================
// Server Errors
// =============================================================================

/// Hosting surface errors (local server, Lambda runtime, CLI invoke).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error("Lambda runtime error: {0}")]
    Lambda(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for payload extraction.
pub type PayloadResult<T> = Result<T, PayloadError>;

/// Result type for table parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for the upload pipeline.
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for hosting surfaces.
pub type ServerResult<T> = Result<T, ServerError>;
