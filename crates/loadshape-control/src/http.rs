//! HTTP implementation of the configuration service contract
//!
//! Thin reqwest wrapper around the controller's four endpoints. Requests
//! carry a fixed 30-second timeout; anything slower surfaces as a
//! transport failure. Error bodies are expected to carry a `message`
//! field, falling back to the HTTP status text when they do not.

use crate::error::ServiceError;
use crate::service::{ConfigService, ConfigSnapshot};
use async_trait::async_trait;
use indexmap::IndexMap;
use loadshape_schema::{ConfigRecord, SchemaCatalog, ShapeDefinition};
use serde::Deserialize;
use std::time::Duration;

/// Upper bound on any single request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration service backed by the controller's HTTP API
#[derive(Debug, Clone)]
pub struct HttpConfigService {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ShapesResponse {
    #[serde(default)]
    shapes: IndexMap<String, ShapeDefinition>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpConfigService {
    /// Create a client against `base_url` (scheme + host + optional port)
    ///
    /// # Errors
    /// [`ServiceError::Payload`] if the underlying client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Payload(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, ServiceError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        check_status(response).await
    }
}

#[async_trait]
impl ConfigService for HttpConfigService {
    async fn fetch_shapes(&self) -> Result<SchemaCatalog, ServiceError> {
        let response = self.get("/api/shapes").await?;
        let body: ShapesResponse = response.json().await.map_err(transport_error)?;
        SchemaCatalog::from_wire(body.shapes).map_err(|e| ServiceError::Payload(e.to_string()))
    }

    async fn fetch_config(&self) -> Result<ConfigSnapshot, ServiceError> {
        let response = self.get("/api/config").await?;
        response.json().await.map_err(transport_error)
    }

    async fn put_config(&self, payload: &ConfigRecord) -> Result<(), ServiceError> {
        let url = self.url("/api/config");
        tracing::debug!(%url, entries = payload.len(), "PUT");
        let response = self
            .client
            .put(&url)
            .json(payload)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await.map(|_| ())
    }

    async fn restart(&self) -> Result<(), ServiceError> {
        let url = self.url("/api/restart");
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await.map(|_| ())
    }
}

fn transport_error(err: reqwest::Error) -> ServiceError {
    if err.is_builder() || err.is_decode() {
        ServiceError::Payload(err.to_string())
    } else {
        ServiceError::Transport(err.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    Err(ServiceError::Server {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

fn error_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        if let Some(message) = parsed.message {
            return message;
        }
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
