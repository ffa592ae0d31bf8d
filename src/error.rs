//! Error taxonomy for the Hermes connector.
//!
//! Every failure surfaces to the direct caller as a [`ConnectorError`].
//! The only error absorbed inside a batch stream is
//! [`ConnectorError::MalformedRecord`]: the offending record is logged and
//! skipped while the rest of the fetch continues.

/// Errors produced by the connector and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum ConnectorError {
    /// A fetch-type operation was invoked before credentials were loaded.
    #[error("{0} connector credentials not loaded")]
    MissingCredential(String),

    /// The credential map lacks the required token field.
    #[error("malformed credentials: {0}")]
    MalformedCredentials(String),

    /// Transport failure or non-success response from the Hermes API.
    ///
    /// `status` is `None` when the request never produced a response.
    #[error("fetch from {endpoint} failed{}: {body}", status_suffix(.status))]
    FetchFailed {
        endpoint: String,
        status: Option<u16>,
        body: String,
    },

    /// A raw record lacks a field required to address its document.
    #[error("malformed {kind} record: {reason}")]
    MalformedRecord { kind: &'static str, reason: String },

    /// A poll bound cannot be represented as a UTC instant.
    #[error("invalid poll window: {0}")]
    InvalidWindow(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ConnectorError {
    pub(crate) fn fetch_failed(
        endpoint: impl Into<String>,
        status: Option<u16>,
        body: impl AsRef<str>,
    ) -> Self {
        Self::FetchFailed {
            endpoint: endpoint.into(),
            status,
            body: body.as_ref().chars().take(500).collect(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_connector() {
        let err = ConnectorError::MissingCredential("Hermes".to_string());
        assert_eq!(err.to_string(), "Hermes connector credentials not loaded");
    }

    #[test]
    fn fetch_failed_includes_status_when_present() {
        let err = ConnectorError::fetch_failed("get_threads", Some(401), "unauthorized");
        assert_eq!(
            err.to_string(),
            "fetch from get_threads failed (HTTP 401): unauthorized"
        );

        let err = ConnectorError::fetch_failed("get_spaces", None, "connection refused");
        assert_eq!(
            err.to_string(),
            "fetch from get_spaces failed: connection refused"
        );
    }

    #[test]
    fn fetch_failed_truncates_body() {
        let long = "x".repeat(2000);
        match ConnectorError::fetch_failed("get_threads", Some(500), &long) {
            ConnectorError::FetchFailed { body, .. } => assert_eq!(body.len(), 500),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
