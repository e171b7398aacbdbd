//! Request dispatch.
//!
//! | Method  | Behavior                       | Statuses      |
//! |---------|--------------------------------|---------------|
//! | GET     | Invitation card (HTML)         | 200           |
//! | POST    | Upload, grouped cards (JSON)   | 200, 400, 500 |
//! | OPTIONS | CORS preflight                 | 200           |
//! | other   | `{"message": "Method Not Allowed"}` | 405      |
//!
//! [`handle`] never fails: every error, panics included, becomes a response.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

use super::logs::{log_error, log_warning};
use super::types::{
    InvocationRequest, InvocationResponse, MessageResponse, UploadResponse,
    METHOD_NOT_ALLOWED_MESSAGE,
};
use crate::card::InvitationCard;
use crate::transform::pipeline::ingest_upload;

/// Handle one request.
pub async fn handle(request: InvocationRequest) -> InvocationResponse {
    match AssertUnwindSafe(dispatch(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let details = panic_message(panic.as_ref());
            log_error(format!("Handler panicked: {}", details));
            InvocationResponse::internal_error(&details)
        }
    }
}

async fn dispatch(request: InvocationRequest) -> InvocationResponse {
    let method = request.http_method.to_ascii_uppercase();
    tracing::debug!(method = %method, "dispatching");

    match method.as_str() {
        "GET" => render_card(&request),
        "POST" => upload(&request).await,
        "OPTIONS" => InvocationResponse::empty(200),
        _ => json_or_internal(405, &MessageResponse::new(METHOD_NOT_ALLOWED_MESSAGE)),
    }
}

fn render_card(request: &InvocationRequest) -> InvocationResponse {
    match InvitationCard::from_query(&request.query()) {
        Ok(card) => InvocationResponse::html(200, card.render()),
        Err(e) => {
            log_error(format!("Invalid card parameters: {}", e));
            InvocationResponse::internal_error(&e.to_string())
        }
    }
}

async fn upload(request: &InvocationRequest) -> InvocationResponse {
    let content_type = request.header("content-type");

    match ingest_upload(request.body.as_deref(), request.is_base64_encoded, content_type).await {
        Ok(outcome) => json_or_internal(200, &UploadResponse::new(outcome.grouped)),
        Err(e) if e.is_client_error() => {
            log_warning(e.to_string());
            json_or_internal(e.status_code(), &MessageResponse::new(e.to_string()))
        }
        Err(e) => {
            log_error(format!("Error parsing upload: {}", e));
            InvocationResponse::internal_error(&e.to_string())
        }
    }
}

fn json_or_internal<T: serde::Serialize>(status: u16, body: &T) -> InvocationResponse {
    InvocationResponse::json(status, body).unwrap_or_else(|e| {
        log_error(format!("Failed to serialize response: {}", e));
        InvocationResponse::internal_error(&e.to_string())
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
