//! Local HTTP server hosting the handler.
//!
//! # API Endpoints
//!
//! | Method | Path          | Description                              |
//! |--------|---------------|------------------------------------------|
//! | GET    | `/health`     | Health check                             |
//! | GET    | `/api/logs`   | SSE stream for real-time logs            |
//! | any    | anything else | The handler (card, upload, preflight)    |

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::get,
    Router,
};
use base64::Engine as _;
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{collections::HashMap, convert::Infallible, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use super::handler::handle;
use super::logs::LOG_BROADCASTER;
use super::types::{InvocationRequest, InvocationResponse};
use crate::config::AppConfig;
use crate::error::ServerResult;

/// Start the HTTP server
pub async fn start_server(config: &AppConfig) -> ServerResult<()> {
    let app = router(config);
    let addr = config.socket_addr();

    tracing::info!("cardkit server running on http://{}", addr);
    tracing::info!("   GET  /          - Invitation card");
    tracing::info!("   POST /          - Upload CSV or Excel file");
    tracing::info!("   GET  /api/logs  - SSE log stream");
    tracing::info!("   GET  /health    - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router: tooling routes plus the handler as fallback.
pub fn router(config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let tooling = Router::new()
        .route("/health", get(health))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    Router::new()
        .merge(tooling)
        .fallback(invoke)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "cardkit",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "card": "GET /",
            "upload": "POST /",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Hand the HTTP request to the handler
async fn invoke(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> InvocationResponse {
    let request = to_invocation(method, query_params(&uri), &headers, body);
    let span = tracing::info_span!(
        "invocation",
        request_id = %Uuid::new_v4(),
        method = %request.http_method
    );

    handle(request).instrument(span).await
}

/// Query string as a map; an undecodable query counts as empty so the
/// handler still runs.
fn query_params(uri: &Uri) -> HashMap<String, String> {
    match Query::<HashMap<String, String>>::try_from_uri(uri) {
        Ok(Query(query)) => query,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed query string");
            HashMap::new()
        }
    }
}

/// Convert an HTTP request into the proxy shape.
///
/// Non-UTF-8 bodies are base64-encoded, as the gateway does for binary
/// media types.
fn to_invocation(
    method: Method,
    query: HashMap<String, String>,
    headers: &HeaderMap,
    body: Bytes,
) -> InvocationRequest {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();

    let (body, is_base64_encoded) = match String::from_utf8(body.to_vec()) {
        Ok(text) => (text, false),
        Err(e) => (
            base64::engine::general_purpose::STANDARD.encode(e.into_bytes()),
            true,
        ),
    };

    InvocationRequest {
        http_method: method.to_string(),
        query_string_parameters: (!query.is_empty()).then_some(query),
        headers: Some(headers),
        body: (!body.is_empty()).then_some(body),
        is_base64_encoded,
    }
}

impl IntoResponse for InvocationResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = if self.is_base64_encoded {
            match base64::engine::general_purpose::STANDARD.decode(&self.body) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "handler returned invalid base64 body");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
        } else {
            self.body.into_bytes()
        };

        let mut response = (status, body).into_response();
        response.headers_mut().remove(header::CONTENT_TYPE);

        for (name, value) in &self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!(header = %name, "dropping invalid response header"),
            }
        }

        response
    }
}
