//! Connector configuration and credential status.
//!
//! Backs `hermes-sync check`. No network call is made: the report covers
//! what can be known locally before a sync.

use serde::Serialize;

use crate::config::Config;
use crate::connector::HermesConnector;
use crate::credentials::credentials_from_env;

/// Configuration and credential status of the Hermes connector.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub name: String,
    /// Whether a usable access token was found.
    pub credentialed: bool,
    pub notes: Option<String>,
}

/// Returns the status of the configured connector.
pub fn get_sources(config: &Config) -> Vec<SourceStatus> {
    let hermes = &config.hermes;
    let mut connector = HermesConnector::new(hermes.clone());
    let status = match connector.load_credentials(&credentials_from_env(&hermes.token_env)) {
        Ok(()) => SourceStatus {
            name: "hermes".to_string(),
            credentialed: connector.is_credentialed(),
            notes: Some(format!(
                "base_url: {}, batch_size: {}",
                hermes.base_url, hermes.batch_size
            )),
        },
        Err(e) => SourceStatus {
            name: "hermes".to_string(),
            credentialed: false,
            notes: Some(format!("{} (set ${})", e, hermes.token_env)),
        },
    };
    vec![status]
}

/// Print the status table to stdout.
pub fn list_sources(config: &Config) {
    println!("{:<16} {:<14} NOTES", "CONNECTOR", "CREDENTIALED");
    for source in get_sources(config) {
        println!(
            "{:<16} {:<14} {}",
            source.name,
            source.credentialed,
            source.notes.unwrap_or_default()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HermesConfig;

    #[test]
    fn missing_token_is_reported() {
        let config = Config {
            hermes: HermesConfig {
                token_env: "HERMES_CONNECTOR_TEST_UNSET_TOKEN".to_string(),
                ..HermesConfig::default()
            },
            ..Config::default()
        };
        let sources = get_sources(&config);
        assert_eq!(sources.len(), 1);
        assert!(!sources[0].credentialed);
        assert!(sources[0]
            .notes
            .as_deref()
            .unwrap()
            .contains("HERMES_CONNECTOR_TEST_UNSET_TOKEN"));
    }

    #[test]
    fn present_token_is_reported() {
        let var = "HERMES_CONNECTOR_TEST_SOURCES_TOKEN";
        std::env::set_var(var, "tok");
        let config = Config {
            hermes: HermesConfig {
                token_env: var.to_string(),
                ..HermesConfig::default()
            },
            ..Config::default()
        };
        let sources = get_sources(&config);
        std::env::remove_var(var);
        assert!(sources[0].credentialed);
    }
}
