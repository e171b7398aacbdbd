//! Wire types shared by every hosting surface.
//!
//! Requests and responses follow the API Gateway proxy shape
//! (`httpMethod`, `queryStringParameters`, `statusCode`, ...), so the same
//! handler runs under Lambda, the local server and `cardkit invoke`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

use crate::error::ServerResult;
use crate::transform::GroupedRecords;

/// Success message for processed uploads.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Successfully processed bulk business cards.";

/// Message for unsupported methods.
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";

/// CORS headers sent with every response.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// One incoming request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    #[serde(default)]
    pub http_method: String,

    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,

    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,

    /// Raw body, base64 when `is_base64_encoded` is set
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl InvocationRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            http_method: method.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>, is_base64_encoded: bool) -> Self {
        self.body = Some(body.into());
        self.is_base64_encoded = is_base64_encoded;
        self
    }

    /// Header value, header names compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query(&self) -> HashMap<String, String> {
        self.query_string_parameters.clone().unwrap_or_default()
    }

    /// Load a proxy event saved as JSON.
    pub fn from_event_file<P: AsRef<Path>>(path: P) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// One outgoing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: IndexMap<String, String>,
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl InvocationResponse {
    /// Response with CORS headers and the given content type.
    pub fn new(status_code: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        let mut headers = IndexMap::new();
        if let Some(ct) = content_type {
            headers.insert("Content-Type".to_string(), ct.to_string());
        }
        for (name, value) in CORS_HEADERS {
            headers.insert(name.to_string(), value.to_string());
        }

        Self {
            status_code,
            headers,
            body: body.into(),
            is_base64_encoded: false,
        }
    }

    pub fn html(status_code: u16, body: impl Into<String>) -> Self {
        Self::new(status_code, Some("text/html"), body)
    }

    pub fn json<T: Serialize>(status_code: u16, body: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(body)?;
        Ok(Self::new(status_code, Some("application/json"), body))
    }

    pub fn empty(status_code: u16) -> Self {
        Self::new(status_code, None, String::new())
    }

    /// 500 response carrying the underlying message.
    pub fn internal_error(details: &str) -> Self {
        let body = json!({ "error": "Internal Server Error", "details": details });
        Self::new(500, Some("application/json"), body.to_string())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Body of a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub grouped_cards: GroupedRecords,
}

impl UploadResponse {
    pub fn new(grouped_cards: GroupedRecords) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            grouped_cards,
        }
    }
}

/// Body carrying only a message (client errors, 405).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;
    use serde_json::Value;

    #[test]
    fn test_proxy_event_deserialization() {
        let event = json!({
            "httpMethod": "POST",
            "queryStringParameters": null,
            "headers": { "Content-Type": "text/csv" },
            "body": "TmFtZQpB",
            "isBase64Encoded": true,
            "requestContext": { "stage": "prod" }
        });

        let request: InvocationRequest = serde_json::from_value(event).unwrap();
        assert_eq!(request.http_method, "POST");
        assert!(request.query_string_parameters.is_none());
        assert_eq!(request.header("content-type"), Some("text/csv"));
        assert!(request.is_base64_encoded);
    }

    #[test]
    fn test_minimal_event() {
        let request: InvocationRequest = serde_json::from_value(json!({ "httpMethod": "GET" })).unwrap();
        assert!(request.body.is_none());
        assert!(!request.is_base64_encoded);
        assert!(request.query().is_empty());
    }

    #[test]
    fn test_event_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"httpMethod":"GET","queryStringParameters":{"title":"Launch"}}"#)
            .unwrap();

        let request = InvocationRequest::from_event_file(&path).unwrap();
        assert_eq!(request.http_method, "GET");
        assert_eq!(request.query()["title"], "Launch");
    }

    #[test]
    fn test_event_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");

        let err = InvocationRequest::from_event_file(&path).unwrap_err();
        assert!(matches!(err, ServerError::Io(_)));

        std::fs::write(&path, "{not json").unwrap();
        let err = InvocationRequest::from_event_file(&path).unwrap_err();
        assert!(matches!(err, ServerError::InvalidEvent(_)));
        assert!(err.to_string().starts_with("Invalid event:"));
    }

    #[test]
    fn test_response_serialization() {
        let response = InvocationResponse::json(400, &MessageResponse::new("No file uploaded.")).unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["statusCode"], 400);
        assert_eq!(value["headers"]["Content-Type"], "application/json");
        assert_eq!(value["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(value["isBase64Encoded"], false);

        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body, json!({ "message": "No file uploaded." }));
    }

    #[test]
    fn test_internal_error_body() {
        let response = InvocationResponse::internal_error("boom");
        let body: Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(response.status_code, 500);
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["details"], "boom");
    }
}
