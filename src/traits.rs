//! Capability traits for document connectors.
//!
//! A connector declares what it can do by implementing one or both of:
//!
//! - [`Loadable`]: a full historical load of everything the source holds.
//! - [`Pollable`]: an incremental load bounded by a `[start, end]` window.
//!
//! Both hand back a [`BatchStream`], a lazy sequence of bounded batches. The
//! consumer polls the stream, processes each batch, and drops it before the
//! next one is produced.
//!
//! ```text
//!  ┌───────────────┐  load_from_state()   ┌─────────────┐
//!  │   Connector   │─────────────────────▶│ BatchStream │──▶ consumer
//!  │ (Loadable,    │  poll_source(s, e)   │ Vec<Doc>... │
//!  │  Pollable)    │─────────────────────▶│             │
//!  └───────────────┘                      └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use futures::stream;
//! use hermes_connector::error::Result;
//! use hermes_connector::models::DocumentSource;
//! use hermes_connector::traits::{BatchStream, Loadable, SourceConnector};
//!
//! struct EmptyConnector;
//!
//! impl SourceConnector for EmptyConnector {
//!     fn name(&self) -> &str { "empty" }
//!     fn source(&self) -> DocumentSource { DocumentSource::Hermes }
//! }
//!
//! impl Loadable for EmptyConnector {
//!     fn load_from_state(&self) -> Result<BatchStream> {
//!         Ok(Box::pin(stream::empty()))
//!     }
//! }
//! ```

use futures::Stream;
use std::pin::Pin;

use crate::error::{ConnectorError, Result};
use crate::models::{Batch, DocumentSource, SecondsSinceUnixEpoch};

/// Lazy, non-restartable sequence of batches.
///
/// Re-invoking the producing operation starts a fresh sequence.
pub type BatchStream = Pin<Box<dyn Stream<Item = std::result::Result<Batch, ConnectorError>> + Send>>;

/// Identity shared by every connector capability.
pub trait SourceConnector: Send + Sync {
    /// Human-readable connector name used in errors and logs.
    fn name(&self) -> &str;

    /// Tag stamped on every document this connector produces.
    fn source(&self) -> DocumentSource;
}

/// Connectors able to perform a full historical load.
pub trait Loadable: SourceConnector {
    /// Start a full load of every record the source holds.
    ///
    /// Fails immediately, before any network call, when the connector is
    /// not ready (for example, credentials are missing).
    fn load_from_state(&self) -> Result<BatchStream>;
}

/// Connectors able to load records changed within a time window.
pub trait Pollable: SourceConnector {
    /// Start a load of records last updated within `[start, end]`.
    ///
    /// Bounds are seconds since the Unix epoch, interpreted as UTC.
    fn poll_source(
        &self,
        start: SecondsSinceUnixEpoch,
        end: SecondsSinceUnixEpoch,
    ) -> Result<BatchStream>;
}
