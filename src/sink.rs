//! Batch output for `hermes-sync`.
//!
//! Writes each emitted batch as JSON Lines, one [`Document`] per line, to a
//! file or to stdout for piping into an indexer. Batches are written and
//! flushed as they arrive, so nothing accumulates here either.
//!
//! A full load replaces the file; polls append to it, since the checkpoint
//! moves past every document a poll has written.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::Document;

/// Destination for emitted batches.
pub trait BatchSink {
    fn write_batch(&mut self, batch: &[Document]) -> Result<()>;
}

/// JSON Lines writer over any [`Write`].
pub struct JsonlSink<W: Write> {
    out: W,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonlSink<BufWriter<File>> {
    /// Create (or truncate) `path`, creating parent directories as needed.
    pub fn create(path: &Path) -> Result<Self> {
        Self::open(path, false)
    }

    /// Open `path` for appending, creating it and its parents if missing.
    pub fn append(path: &Path) -> Result<Self> {
        Self::open(path, true)
    }

    fn open(path: &Path, append: bool) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .with_context(|| format!("Failed to open output file: {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> BatchSink for JsonlSink<W> {
    fn write_batch(&mut self, batch: &[Document]) -> Result<()> {
        for doc in batch {
            serde_json::to_writer(&mut self.out, doc)?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Discards batches; used by `--dry-run`.
pub struct NullSink;

impl BatchSink for NullSink {
    fn write_batch(&mut self, _batch: &[Document]) -> Result<()> {
        Ok(())
    }
}

/// Opens the configured sink: a file when `path` is set, otherwise stdout.
/// With `append`, an existing file keeps its earlier lines.
pub fn open_sink(path: Option<&Path>, append: bool) -> Result<Box<dyn BatchSink>> {
    match path {
        Some(path) if append => Ok(Box::new(JsonlSink::append(path)?)),
        Some(path) => Ok(Box::new(JsonlSink::create(path)?)),
        None => Ok(Box::new(JsonlSink::new(std::io::stdout()))),
    }
}
