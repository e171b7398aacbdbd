//! AWS Lambda entry point.
//!
//! The payload is an API Gateway proxy event and the result a proxy
//! response; base64 bodies and the raw content type reach the handler
//! unchanged.

use lambda_runtime::{service_fn, LambdaEvent};
use tracing::Instrument;

use super::handler::handle;
use super::types::{InvocationRequest, InvocationResponse};
use crate::error::{ServerError, ServerResult};

/// Run the Lambda runtime loop until the environment shuts it down.
pub async fn run_lambda() -> ServerResult<()> {
    lambda_runtime::run(service_fn(handle_event))
        .await
        .map_err(|e| ServerError::Lambda(e.to_string()))
}

async fn handle_event(
    event: LambdaEvent<InvocationRequest>,
) -> Result<InvocationResponse, lambda_runtime::Error> {
    let (request, context) = event.into_parts();
    let span = tracing::info_span!(
        "invocation",
        request_id = %context.request_id,
        method = %request.http_method
    );

    Ok(handle(request).instrument(span).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;
    use serde_json::json;

    #[tokio::test]
    async fn test_handle_event() {
        let request: InvocationRequest = serde_json::from_value(json!({
            "httpMethod": "POST",
            "headers": { "content-type": "text/csv" },
            "body": "Name,Designation\nA,Eng",
            "isBase64Encoded": false
        }))
        .unwrap();

        let response = handle_event(LambdaEvent::new(request, Context::default()))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("\"Eng\""));
    }
}
