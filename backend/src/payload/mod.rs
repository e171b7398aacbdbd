//! Pull the uploaded file out of a raw request body.
//!
//! Bodies arrive either as the file itself (`text/csv`,
//! `application/octet-stream`, ...) or as `multipart/form-data`, optionally
//! base64-encoded by the gateway. Multipart bodies are parsed on raw bytes,
//! so binary workbooks survive untouched.

use base64::Engine as _;
use bytes::Bytes;
use std::convert::Infallible;

use crate::error::{PayloadError, PayloadResult};

/// The uploaded file and what we know about it.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub bytes: Bytes,
    /// File name from the multipart part, if any
    pub file_name: Option<String>,
    /// Content type of the multipart part, or of the whole body
    pub content_type: Option<String>,
}

/// Decode the request body, honoring the gateway's base64 flag.
pub fn decode_body(body: Option<&str>, is_base64_encoded: bool) -> PayloadResult<Vec<u8>> {
    let body = body.unwrap_or_default();

    if !is_base64_encoded {
        return Ok(body.as_bytes().to_vec());
    }

    base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(body.trim().trim_end_matches('='))
        .map_err(|e| PayloadError::InvalidBase64(e.to_string()))
}

/// Whether a content type is `multipart/form-data`.
pub fn is_multipart(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
}

/// Extract the file from a decoded body.
///
/// Multipart bodies yield the first part carrying a `filename`; any other
/// content type yields the whole body. Empty results are
/// [`PayloadError::NoFileUploaded`].
pub async fn extract_file(body: Vec<u8>, content_type: Option<&str>) -> PayloadResult<FilePayload> {
    let payload = match content_type {
        Some(ct) if is_multipart(ct) => extract_multipart(body, ct).await?,
        _ => FilePayload {
            bytes: Bytes::from(body),
            file_name: None,
            content_type: content_type.map(str::to_string),
        },
    };

    if payload.bytes.is_empty() {
        return Err(PayloadError::NoFileUploaded);
    }

    Ok(payload)
}

async fn extract_multipart(body: Vec<u8>, content_type: &str) -> PayloadResult<FilePayload> {
    let boundary = multer::parse_boundary(content_type).map_err(|e| {
        tracing::warn!(error = %e, "multipart body without usable boundary");
        PayloadError::NoFileUploaded
    })?;

    let stream = futures::stream::once(async move { Ok::<_, Infallible>(Bytes::from(body)) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(PayloadError::NoFileUploaded),
            Err(e) => {
                tracing::warn!(error = %e, "malformed multipart body");
                return Err(PayloadError::NoFileUploaded);
            }
        };

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let part_type = field.content_type().map(|m| m.to_string());

        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, file = %file_name, "failed to read multipart file part");
            PayloadError::NoFileUploaded
        })?;

        return Ok(FilePayload {
            bytes,
            file_name: Some(file_name),
            content_type: part_type,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "----cardkit7MA4YWxkTrZu0gW";

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file_name {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, f
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn multipart_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    #[test]
    fn test_decode_plain_body() {
        let bytes = decode_body(Some("a,b\n1,2"), false).unwrap();
        assert_eq!(bytes, b"a,b\n1,2");
        assert!(decode_body(None, false).unwrap().is_empty());
    }

    #[test]
    fn test_decode_base64_body() {
        // "Name,Designation\nA,Eng"
        let encoded = "TmFtZSxEZXNpZ25hdGlvbgpBLEVuZw==";
        assert_eq!(decode_body(Some(encoded), true).unwrap(), b"Name,Designation\nA,Eng");

        let unpadded = encoded.trim_end_matches('=');
        assert_eq!(decode_body(Some(unpadded), true).unwrap(), b"Name,Designation\nA,Eng");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode_body(Some("not base64 at all!"), true).unwrap_err();
        assert!(matches!(err, PayloadError::InvalidBase64(_)));
    }

    #[test]
    fn test_is_multipart() {
        assert!(is_multipart("multipart/form-data; boundary=x"));
        assert!(is_multipart("Multipart/Form-Data; boundary=x"));
        assert!(!is_multipart("text/csv"));
    }

    #[tokio::test]
    async fn test_raw_body_is_the_file() {
        let payload = extract_file(b"a,b\n1,2".to_vec(), Some("text/csv")).await.unwrap();
        assert_eq!(&payload.bytes[..], b"a,b\n1,2");
        assert_eq!(payload.content_type.as_deref(), Some("text/csv"));
        assert!(payload.file_name.is_none());
    }

    #[tokio::test]
    async fn test_empty_body_is_no_file() {
        let err = extract_file(Vec::new(), Some("text/csv")).await.unwrap_err();
        assert!(matches!(err, PayloadError::NoFileUploaded));

        let err = extract_file(Vec::new(), None).await.unwrap_err();
        assert!(matches!(err, PayloadError::NoFileUploaded));
    }

    #[tokio::test]
    async fn test_multipart_picks_first_file_part() {
        let body = multipart_body(&[
            ("note", None, &b"hello"[..]),
            ("file", Some("cards.csv"), &b"Name,Designation\nA,Eng"[..]),
            ("other", Some("second.csv"), &b"x,y"[..]),
        ]);

        let payload = extract_file(body, Some(&multipart_type())).await.unwrap();
        assert_eq!(&payload.bytes[..], b"Name,Designation\nA,Eng");
        assert_eq!(payload.file_name.as_deref(), Some("cards.csv"));
        assert_eq!(payload.content_type.as_deref(), Some("application/octet-stream"));
    }

    #[tokio::test]
    async fn test_multipart_binary_content_untouched() {
        let binary: Vec<u8> = vec![0x50, 0x4B, 0x03, 0x04, 0x00, 0xFF, 0x0D, 0x0A, 0x0D, 0x0A, 0x80, 0x2D, 0x2D];
        let body = multipart_body(&[("file", Some("cards.xlsx"), &binary[..])]);

        let payload = extract_file(body, Some(&multipart_type())).await.unwrap();
        assert_eq!(&payload.bytes[..], &binary[..]);
    }

    #[tokio::test]
    async fn test_multipart_without_file_part() {
        let body = multipart_body(&[("note", None, &b"hello"[..])]);

        let err = extract_file(body, Some(&multipart_type())).await.unwrap_err();
        assert!(matches!(err, PayloadError::NoFileUploaded));
    }

    #[tokio::test]
    async fn test_multipart_empty_file_part() {
        let body = multipart_body(&[("file", Some("empty.csv"), &b""[..])]);

        let err = extract_file(body, Some(&multipart_type())).await.unwrap_err();
        assert!(matches!(err, PayloadError::NoFileUploaded));
    }

    #[tokio::test]
    async fn test_multipart_missing_boundary() {
        let err = extract_file(b"whatever".to_vec(), Some("multipart/form-data"))
            .await
            .unwrap_err();
        assert!(matches!(err, PayloadError::NoFileUploaded));
    }
}
