use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::payload::RequestPayload;

/// Timeout for commands that configure custom headers.
pub const TIMEOUT_WITH_HEADERS: Duration = Duration::from_secs(120);
/// Timeout for everything else. The asymmetry is intentional and load-bearing
/// for slow authenticated endpoints.
pub const TIMEOUT_DEFAULT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FailureKind {
    #[error("Network error calling API")]
    Network,
    #[error("Invalid response from API")]
    InvalidResponse,
    #[error("Error processing API response")]
    Data,
}

/// Normalized outcome of one outbound call. Failures are data, not errors:
/// every kind is terminal for the current message, with no retry.
#[derive(Debug, PartialEq)]
pub enum ApiResult {
    Success {
        status: String,
        message: String,
        data: Vec<(String, String)>,
    },
    Failure {
        kind: FailureKind,
        detail: String,
    },
}

/// Performs the outbound HTTP call and normalizes the response.
pub struct ApiGateway {
    client: reqwest::Client,
}

impl Default for ApiGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiGateway {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn call(&self, request: &RequestPayload) -> ApiResult {
        let timeout = timeout_for(&request.headers);

        let mut builder = self
            .client
            .post(&request.url)
            .timeout(timeout)
            .json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        info!("Making API call to {} with args: {}", request.url, request.body);

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error calling API: {}", e);
                return ApiResult::Failure {
                    kind: FailureKind::Network,
                    detail: e.to_string(),
                };
            }
        };

        // The HTTP status is not inspected; an error page with a JSON body
        // still yields whatever status/message the body carries.
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Network error reading API response: {}", e);
                return ApiResult::Failure {
                    kind: FailureKind::Network,
                    detail: e.to_string(),
                };
            }
        };

        debug!("Raw API response: {}", body);
        parse_response(&body)
    }
}

/// Commands with custom headers get the long timeout, everything else the
/// short one.
fn timeout_for(headers: &std::collections::HashMap<String, String>) -> Duration {
    if headers.is_empty() {
        TIMEOUT_DEFAULT
    } else {
        TIMEOUT_WITH_HEADERS
    }
}

fn parse_response(body: &str) -> ApiResult {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            return ApiResult::Failure {
                kind: FailureKind::InvalidResponse,
                detail: e.to_string(),
            }
        }
    };

    let Some(object) = value.as_object() else {
        return ApiResult::Failure {
            kind: FailureKind::InvalidResponse,
            detail: "response is not a JSON object".to_string(),
        };
    };

    // Defaults apply only when the key is absent; a present non-string
    // value is rendered verbatim rather than masked by the default.
    let status = object
        .get("status")
        .map(render_value)
        .unwrap_or_else(|| "Error".to_string());
    let message = object
        .get("message")
        .map(render_value)
        .unwrap_or_else(|| "No message provided".to_string());

    let data = match object.get("data") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), render_value(v)))
            .collect(),
        Some(other) => {
            return ApiResult::Failure {
                kind: FailureKind::Data,
                detail: format!("`data` is not a mapping: {}", other),
            }
        }
    };

    ApiResult::Success {
        status,
        message,
        data,
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
