//! Stateless request builder and response parser for the sync endpoint.
//!
//! # Design
//! `SyncClient` holds only the endpoint and the token and carries no mutable
//! state between calls. `build_sync` produces an `HttpRequest` and
//! `parse_sync` consumes an `HttpResponse`; the caller executes the actual
//! round-trip in between.

use serde_json::Value;

use crate::config::ApiToken;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{RequestEnvelope, ResponseEnvelope};

#[derive(Debug, Clone)]
pub struct SyncClient {
    endpoint: String,
    token: ApiToken,
}

impl SyncClient {
    pub fn new(endpoint: &str, token: ApiToken) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_sync(&self, envelope: &RequestEnvelope) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(envelope).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            url: self.endpoint.clone(),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("authorization".to_string(), format!("Bearer {}", self.token.expose())),
            ],
            body,
        })
    }

    /// Decode the acknowledgment. The service answers with an object; a
    /// one-element array holding that object is accepted too.
    pub fn parse_sync(&self, response: HttpResponse) -> Result<ResponseEnvelope, ApiError> {
        check_status(&response)?;
        let value: Value =
            serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        let value = match value {
            Value::Object(_) => value,
            Value::Array(mut items) if items.len() == 1 => items.remove(0),
            other => {
                return Err(ApiError::DeserializationError(format!(
                    "expected a sync response object, got {}",
                    kind_of(&other)
                )))
            }
        };
        serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if matches!(response.status, 401 | 403) {
        return Err(ApiError::Unauthorized {
            status: response.status,
        });
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
