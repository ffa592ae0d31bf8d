//! TOML configuration for the Hermes connector and the `hermes-sync` CLI.
//!
//! # Example
//!
//! ```toml
//! [hermes]
//! base_url = "https://hermesapp.net/api/"
//! batch_size = 16
//! timeout_secs = 30
//! token_env = "HERMES_ACCESS_TOKEN"
//!
//! [state]
//! checkpoint_path = "./data/hermes.checkpoint.json"
//!
//! [output]
//! path = "./data/hermes.jsonl"
//! ```
//!
//! Every section is optional; missing values fall back to the defaults
//! shown above. `[output].path` has no default: batches go to stdout.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://hermesapp.net/api/";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub hermes: HermesConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HermesConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum documents per emitted batch. Config files must set a
    /// positive value; a struct built in code with `0` emits batches of one.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for HermesConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            token_env: default_token_env(),
        }
    }
}

impl HermesConfig {
    /// Batch size as a non-zero count; zero is clamped to one.
    pub fn max_batch_size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.batch_size).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_batch_size() -> usize {
    16
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_token_env() -> String {
    "HERMES_ACCESS_TOKEN".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            checkpoint_path: default_checkpoint_path(),
        }
    }
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("./data/hermes.checkpoint.json")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Defaults for every section, used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    let hermes = &config.hermes;

    if hermes.batch_size == 0 {
        anyhow::bail!("hermes.batch_size must be > 0");
    }

    if hermes.timeout_secs == 0 {
        anyhow::bail!("hermes.timeout_secs must be > 0");
    }

    if !(hermes.base_url.starts_with("http://") || hermes.base_url.starts_with("https://")) {
        anyhow::bail!(
            "hermes.base_url must start with http:// or https:// (got '{}')",
            hermes.base_url
        );
    }

    if hermes.token_env.trim().is_empty() {
        anyhow::bail!("hermes.token_env must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("hermes.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn empty_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&write_config(&tmp, "")).unwrap();
        assert_eq!(cfg.hermes.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.hermes.batch_size, 16);
        assert_eq!(cfg.hermes.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.hermes.token_env, "HERMES_ACCESS_TOKEN");
        assert!(cfg.output.path.is_none());
    }

    #[test]
    fn explicit_values_are_read() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&write_config(
            &tmp,
            r#"
[hermes]
base_url = "http://localhost:8080/api"
batch_size = 4
timeout_secs = 5
token_env = "MY_TOKEN"

[state]
checkpoint_path = "/tmp/cp.json"

[output]
path = "/tmp/out.jsonl"
"#,
        ))
        .unwrap();
        assert_eq!(cfg.hermes.max_batch_size().get(), 4);
        assert_eq!(cfg.hermes.token_env, "MY_TOKEN");
        assert_eq!(cfg.state.checkpoint_path, PathBuf::from("/tmp/cp.json"));
        assert_eq!(cfg.output.path, Some(PathBuf::from("/tmp/out.jsonl")));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(&write_config(&tmp, "[hermes]\nbatch_size = 0\n")).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn zero_batch_size_in_code_emits_single_documents() {
        let cfg = HermesConfig {
            batch_size: 0,
            ..HermesConfig::default()
        };
        assert_eq!(cfg.max_batch_size().get(), 1);
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let err =
            load_config(&write_config(&tmp, "[hermes]\nbase_url = \"ftp://x\"\n")).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn missing_file_falls_back_to_minimal() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.hermes.batch_size, 16);
        assert!(load_config(&tmp.path().join("absent.toml")).is_err());
    }
}
