//! Sync orchestration for the `hermes-sync` CLI.
//!
//! Plays the consumer's role: builds the connector from configuration,
//! loads credentials from the environment, drains the batch stream into a
//! sink, and advances the poll checkpoint after a successful poll.

use anyhow::{Context, Result};
use chrono::Utc;
use futures::StreamExt;

use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::connector::HermesConnector;
use crate::credentials::credentials_from_env;
use crate::models::SecondsSinceUnixEpoch;
use crate::progress::{SyncProgressEvent, SyncProgressReporter};
use crate::sink::{open_sink, BatchSink, NullSink};
use crate::traits::{BatchStream, Loadable, Pollable, SourceConnector};

/// Which retrieval mode to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncMode {
    /// Full historical load.
    Load,
    /// Incremental poll. Missing bounds default to the stored checkpoint
    /// (or the epoch) and the current time.
    Poll {
        start: Option<SecondsSinceUnixEpoch>,
        end: Option<SecondsSinceUnixEpoch>,
    },
}

impl SyncMode {
    fn label(&self) -> &'static str {
        match self {
            SyncMode::Load => "load",
            SyncMode::Poll { .. } => "poll",
        }
    }
}

/// Totals reported after a sync.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSummary {
    pub batches: u64,
    pub documents: u64,
    /// New checkpoint, set only by a non-dry-run poll.
    pub checkpoint: Option<i64>,
}

/// Run a load or poll against the configured Hermes instance.
pub async fn run_sync(
    config: &Config,
    mode: SyncMode,
    dry_run: bool,
    progress: &dyn SyncProgressReporter,
) -> Result<SyncSummary> {
    let token_env = &config.hermes.token_env;
    let connector = HermesConnector::new(config.hermes.clone())
        .with_credentials(&credentials_from_env(token_env))
        .with_context(|| format!("Set ${} to a Hermes access token", token_env))?;

    let store = CheckpointStore::new(&config.state.checkpoint_path);

    let (stream, poll_end) = match mode {
        SyncMode::Load => (connector.load_from_state()?, None),
        SyncMode::Poll { start, end } => {
            let (start, end) = resolve_window(&store, start, end)?;
            tracing::info!(start, end, "polling hermes");
            (connector.poll_source(start, end)?, Some(end))
        }
    };

    progress.report(SyncProgressEvent::Started {
        connector: connector.name().to_lowercase(),
        mode: mode.label().to_string(),
    });

    let mut sink: Box<dyn BatchSink> = if dry_run {
        Box::new(NullSink)
    } else {
        // Polls append: the checkpoint advances past what they write.
        let append = matches!(mode, SyncMode::Poll { .. });
        open_sink(config.output.path.as_deref(), append)?
    };

    let mut summary = drain(&connector, stream, sink.as_mut(), progress).await?;

    if let (Some(end), false) = (poll_end, dry_run) {
        let checkpoint = store.save(end.floor() as i64)?;
        summary.checkpoint = Some(checkpoint.last_poll_end);
    }

    eprintln!("sync hermes ({}{})", mode.label(), if dry_run { ", dry-run" } else { "" });
    eprintln!("  batches: {}", summary.batches);
    eprintln!("  documents: {}", summary.documents);
    if let Some(cp) = summary.checkpoint {
        eprintln!("  checkpoint: {}", cp);
    }
    eprintln!("ok");

    Ok(summary)
}

/// Pull every batch from `stream` into `sink`, stopping at the first error.
pub async fn drain(
    connector: &dyn SourceConnector,
    mut stream: BatchStream,
    sink: &mut dyn BatchSink,
    progress: &dyn SyncProgressReporter,
) -> Result<SyncSummary> {
    let mut summary = SyncSummary::default();
    let label = connector.name().to_lowercase();

    while let Some(batch) = stream.next().await {
        let batch = batch?;
        sink.write_batch(&batch)?;
        summary.batches += 1;
        summary.documents += batch.len() as u64;
        progress.report(SyncProgressEvent::Batch {
            connector: label.clone(),
            batches: summary.batches,
            documents: summary.documents,
        });
    }

    Ok(summary)
}

/// Fill in missing poll bounds from the checkpoint and the clock.
pub fn resolve_window(
    store: &CheckpointStore,
    start: Option<SecondsSinceUnixEpoch>,
    end: Option<SecondsSinceUnixEpoch>,
) -> Result<(SecondsSinceUnixEpoch, SecondsSinceUnixEpoch)> {
    let start = match start {
        Some(s) => s,
        None => store
            .load()?
            .map(|cp| cp.last_poll_end as SecondsSinceUnixEpoch)
            .unwrap_or(0.0),
    };
    let end = end.unwrap_or_else(|| Utc::now().timestamp() as SecondsSinceUnixEpoch);
    if start > end {
        anyhow::bail!("poll start ({}) is after end ({})", start, end);
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use crate::models::{Batch, Document, DocumentSource, Section};
    use crate::progress::NoProgress;
    use crate::sink::JsonlSink;
    use futures::stream;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    struct Named;

    impl SourceConnector for Named {
        fn name(&self) -> &str {
            "Hermes"
        }

        fn source(&self) -> DocumentSource {
            DocumentSource::Hermes
        }
    }

    fn doc(id: &str) -> Document {
        Document {
            id: id.to_string(),
            sections: vec![Section {
                link: String::new(),
                text: String::new(),
            }],
            source: DocumentSource::Hermes,
            semantic_identifier: id.to_string(),
            updated_at: None,
            metadata: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn drain_writes_every_batch() {
        let batches: Vec<std::result::Result<Batch, ConnectorError>> =
            vec![Ok(vec![doc("a"), doc("b")]), Ok(vec![doc("c")])];
        let mut sink = JsonlSink::new(Vec::new());
        let summary = drain(
            &Named,
            Box::pin(stream::iter(batches)),
            &mut sink,
            &NoProgress,
        )
        .await
        .unwrap();
        assert_eq!(summary.batches, 2);
        assert_eq!(summary.documents, 3);
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap().lines().count(), 3);
    }

    #[tokio::test]
    async fn drain_stops_at_first_error() {
        let batches: Vec<std::result::Result<Batch, ConnectorError>> = vec![
            Ok(vec![doc("a")]),
            Err(ConnectorError::fetch_failed("get_spaces", Some(500), "boom")),
            Ok(vec![doc("never")]),
        ];
        let mut sink = JsonlSink::new(Vec::new());
        let err = drain(
            &Named,
            Box::pin(stream::iter(batches)),
            &mut sink,
            &NoProgress,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("get_spaces"));
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn window_defaults_to_checkpoint_then_epoch() {
        let tmp = TempDir::new().unwrap();
        let store = CheckpointStore::new(tmp.path().join("cp.json"));

        let (start, end) = resolve_window(&store, None, Some(100.0)).unwrap();
        assert_eq!((start, end), (0.0, 100.0));

        store.save(50).unwrap();
        let (start, _) = resolve_window(&store, None, Some(100.0)).unwrap();
        assert_eq!(start, 50.0);

        let (start, _) = resolve_window(&store, Some(10.0), Some(100.0)).unwrap();
        assert_eq!(start, 10.0);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = CheckpointStore::new(tmp.path().join("cp.json"));
        assert!(resolve_window(&store, Some(200.0), Some(100.0)).is_err());
    }
}
