//! Poll watermark persisted between `hermes-sync poll` runs.
//!
//! The connector itself is stateless between calls; the CLI plays the
//! consumer's role and remembers where the last successful poll ended so
//! the next window can start there.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stored watermark, in seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub last_poll_end: i64,
    pub updated_at: i64,
}

/// JSON file holding a single [`Checkpoint`].
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the stored checkpoint, or `None` if none was written yet.
    pub fn load(&self) -> Result<Option<Checkpoint>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read checkpoint: {}", self.path.display()))?;
        let checkpoint = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse checkpoint: {}", self.path.display()))?;
        Ok(Some(checkpoint))
    }

    /// Record `last_poll_end` as the new watermark.
    pub fn save(&self, last_poll_end: i64) -> Result<Checkpoint> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let checkpoint = Checkpoint {
            last_poll_end,
            updated_at: chrono::Utc::now().timestamp(),
        };
        let json = serde_json::to_string_pretty(&checkpoint)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write checkpoint: {}", self.path.display()))?;
        Ok(checkpoint)
    }
}
