//! Remote API client for the Hermes service.
//!
//! A thin request/response wrapper: one authenticated `POST` per call,
//! JSON array in, [`RawRecord`]s out. No validation happens here; that is
//! the normalizer's job. There is no pagination cursor: each endpoint
//! returns its whole result set in one response.
//!
//! # Endpoints
//!
//! | Method | Path | Returns |
//! |--------|------|---------|
//! | `POST` | `<base>/get_threads` | array of thread objects |
//! | `POST` | `<base>/get_spaces` | array of space objects |
//!
//! Both take `{"datetime": "<RFC 3339 UTC>"}` as the body and an
//! `Authorization: Bearer <token>` header.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::credentials::Credential;
use crate::error::{ConnectorError, Result};
use crate::raw::RawRecord;

pub const THREADS_ENDPOINT: &str = "get_threads";
pub const SPACES_ENDPOINT: &str = "get_spaces";

/// Fetch operations the connector needs from the Hermes API.
///
/// [`HermesClient`] is the HTTP implementation; tests substitute in-memory
/// fakes.
#[async_trait]
pub trait HermesApi: Send + Sync {
    /// Fetch every message thread visible to the credential.
    async fn fetch_threads(&self) -> Result<Vec<RawRecord>>;

    /// Fetch every space visible to the credential.
    async fn fetch_spaces(&self) -> Result<Vec<RawRecord>>;
}

/// reqwest-backed [`HermesApi`].
#[derive(Debug, Clone)]
pub struct HermesClient {
    http: reqwest::Client,
    base_url: String,
    credential: Credential,
}

impl HermesClient {
    /// Create a client for `base_url` with a per-request `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        credential: Credential,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectorError::Client(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            credential,
        })
    }

    #[instrument(level = "debug", skip(self), fields(base_url = %self.base_url))]
    async fn post_records(&self, endpoint: &str) -> Result<Vec<RawRecord>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let body = serde_json::json!({ "datetime": Utc::now().to_rfc3339() });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.credential.token())
            .json(&body)
            .send()
            .await
            .map_err(|e| ConnectorError::fetch_failed(endpoint, None, e.to_string()))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            ConnectorError::fetch_failed(endpoint, Some(status.as_u16()), e.to_string())
        })?;

        if !status.is_success() {
            return Err(ConnectorError::fetch_failed(
                endpoint,
                Some(status.as_u16()),
                text,
            ));
        }

        let records = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => items.into_iter().map(RawRecord::new).collect::<Vec<_>>(),
            Ok(other) => {
                return Err(ConnectorError::fetch_failed(
                    endpoint,
                    Some(status.as_u16()),
                    format!("expected a JSON array, got {}", json_kind(&other)),
                ))
            }
            Err(e) => {
                return Err(ConnectorError::fetch_failed(
                    endpoint,
                    Some(status.as_u16()),
                    format!("invalid JSON: {}", e),
                ))
            }
        };

        debug!(endpoint = %endpoint, count = records.len(), "fetched hermes records");
        Ok(records)
    }
}

#[async_trait]
impl HermesApi for HermesClient {
    async fn fetch_threads(&self) -> Result<Vec<RawRecord>> {
        self.post_records(THREADS_ENDPOINT).await
    }

    async fn fetch_spaces(&self) -> Result<Vec<RawRecord>> {
        self.post_records(SPACES_ENDPOINT).await
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
