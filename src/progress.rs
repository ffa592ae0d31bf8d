//! Sync progress reporting.
//!
//! Reports what `hermes-sync` is doing as batches arrive. Progress is
//! emitted on **stderr** so stdout remains parseable when batches are
//! written there.

use std::io::Write;

/// A single progress event for sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncProgressEvent {
    /// Stream opened; the first fetch happens on the first batch request.
    Started { connector: String, mode: String },
    /// A batch was emitted and written.
    Batch {
        connector: String,
        batches: u64,
        documents: u64,
    },
}

/// Reports sync progress. Implementations write to stderr (human or JSON).
pub trait SyncProgressReporter: Send + Sync {
    fn report(&self, event: SyncProgressEvent);
}

/// Human-friendly progress on stderr: "sync hermes  batch 3  (1,234 documents)".
pub struct StderrProgress;

impl SyncProgressReporter for StderrProgress {
    fn report(&self, event: SyncProgressEvent) {
        let line = match &event {
            SyncProgressEvent::Started { connector, mode } => {
                format!("sync {}  {}...\n", connector, mode)
            }
            SyncProgressEvent::Batch {
                connector,
                batches,
                documents,
            } => format!(
                "sync {}  batch {}  ({} documents)\n",
                connector,
                format_number(*batches),
                format_number(*documents)
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl SyncProgressReporter for JsonProgress {
    fn report(&self, event: SyncProgressEvent) {
        if let Ok(line) = serde_json::to_string(&event_json(&event)) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl SyncProgressReporter for NoProgress {
    fn report(&self, _event: SyncProgressEvent) {}
}

fn event_json(event: &SyncProgressEvent) -> serde_json::Value {
    match event {
        SyncProgressEvent::Started { connector, mode } => serde_json::json!({
            "event": "progress",
            "connector": connector,
            "phase": "started",
            "mode": mode
        }),
        SyncProgressEvent::Batch {
            connector,
            batches,
            documents,
        } => serde_json::json!({
            "event": "progress",
            "connector": connector,
            "phase": "batch",
            "batches": batches,
            "documents": documents
        }),
    }
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn SyncProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn batch_event_json_shape() {
        let json = event_json(&SyncProgressEvent::Batch {
            connector: "hermes".to_string(),
            batches: 2,
            documents: 17,
        });
        assert_eq!(json["phase"], "batch");
        assert_eq!(json["documents"], 17);
    }
}
