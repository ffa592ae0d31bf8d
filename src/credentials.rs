//! Hermes access credentials.
//!
//! Credentials arrive as a JSON-style map with a single required string
//! field, [`TOKEN_FIELD`]. The token is never persisted and never printed.

use serde_json::{Map, Value};
use std::fmt;

use crate::error::{ConnectorError, Result};

/// Name of the field holding the Hermes access token.
pub const TOKEN_FIELD: &str = "hermes_access_token";

/// Credential payload as supplied by the caller.
pub type CredentialMap = Map<String, Value>;

/// Opaque bearer token for the Hermes API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Extracts the access token from a credential map.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::MalformedCredentials`] when the field is
    /// absent, not a string, or blank.
    pub fn from_map(map: &CredentialMap) -> Result<Self> {
        match map.get(TOKEN_FIELD) {
            Some(Value::String(token)) if !token.trim().is_empty() => Ok(Self(token.clone())),
            Some(Value::String(_)) => Err(ConnectorError::MalformedCredentials(format!(
                "`{}` is empty",
                TOKEN_FIELD
            ))),
            Some(_) => Err(ConnectorError::MalformedCredentials(format!(
                "`{}` must be a string",
                TOKEN_FIELD
            ))),
            None => Err(ConnectorError::MalformedCredentials(format!(
                "missing `{}`",
                TOKEN_FIELD
            ))),
        }
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Builds a credential map from the environment variable `var`.
///
/// An unset variable yields an empty map, which [`Credential::from_map`]
/// then rejects as malformed.
pub fn credentials_from_env(var: &str) -> CredentialMap {
    let mut map = CredentialMap::new();
    if let Ok(token) = std::env::var(var) {
        map.insert(TOKEN_FIELD.to_string(), Value::String(token));
    }
    map
}
