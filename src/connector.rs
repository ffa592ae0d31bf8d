//! Hermes connector: credential state and the two retrieval modes.
//!
//! ```text
//!  new() ──▶ Uncredentialed ── load_credentials() ──▶ Credentialed
//!                 │                                       │
//!   load/poll ──▶ MissingCredential          load/poll ──▶ BatchStream
//! ```
//!
//! Both retrieval modes run the same pipeline: fetch threads, filter by the
//! time window, normalize, emit batches; then the same for spaces. Thread
//! batches are fully flushed before the space fetch starts, so a batch
//! never mixes record kinds.
//!
//! # Malformed records
//!
//! A record without an `_id` cannot be addressed downstream. It is logged
//! at `warn` and skipped; the remaining records of the same fetch are still
//! emitted.

use async_stream::try_stream;
use futures::Stream;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::batch::emit;
use crate::client::{HermesApi, HermesClient};
use crate::config::HermesConfig;
use crate::credentials::{Credential, CredentialMap};
use crate::error::{ConnectorError, Result};
use crate::models::{Batch, Document, DocumentSource, SecondsSinceUnixEpoch};
use crate::normalize::RecordKind;
use crate::raw::RawRecord;
use crate::traits::{BatchStream, Loadable, Pollable, SourceConnector};
use crate::window::TimeWindow;

/// Name reported in [`ConnectorError::MissingCredential`].
pub const CONNECTOR_NAME: &str = "Hermes";

type ApiFactory =
    Box<dyn Fn(&HermesConfig, Credential) -> Result<Arc<dyn HermesApi>> + Send + Sync>;

enum CredentialState {
    Uncredentialed,
    Credentialed(Arc<dyn HermesApi>),
}

/// Connector for Hermes threads and spaces.
///
/// Implements both [`Loadable`] and [`Pollable`]. Starts without
/// credentials; every retrieval fails with
/// [`ConnectorError::MissingCredential`] until
/// [`load_credentials`](HermesConnector::load_credentials) succeeds.
pub struct HermesConnector {
    config: HermesConfig,
    factory: ApiFactory,
    state: CredentialState,
}

impl HermesConnector {
    /// Create an uncredentialed connector backed by [`HermesClient`].
    pub fn new(config: HermesConfig) -> Self {
        Self::with_api_factory(config, |config, credential| {
            let client = HermesClient::new(config.base_url.clone(), credential, config.timeout())?;
            Ok(Arc::new(client) as Arc<dyn HermesApi>)
        })
    }

    /// Create an uncredentialed connector whose API client is built by
    /// `factory` once credentials are loaded.
    pub fn with_api_factory<F>(config: HermesConfig, factory: F) -> Self
    where
        F: Fn(&HermesConfig, Credential) -> Result<Arc<dyn HermesApi>> + Send + Sync + 'static,
    {
        Self {
            config,
            factory: Box::new(factory),
            state: CredentialState::Uncredentialed,
        }
    }

    /// Extract the access token and move to the credentialed state.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::MalformedCredentials`] when the map lacks the
    /// token; the connector keeps its previous state in that case.
    pub fn load_credentials(&mut self, credentials: &CredentialMap) -> Result<()> {
        let credential = Credential::from_map(credentials)?;
        let api = (self.factory)(&self.config, credential)?;
        self.state = CredentialState::Credentialed(api);
        debug!(connector = CONNECTOR_NAME, "credentials loaded");
        Ok(())
    }

    /// Consuming form of [`load_credentials`](HermesConnector::load_credentials).
    pub fn with_credentials(mut self, credentials: &CredentialMap) -> Result<Self> {
        self.load_credentials(credentials)?;
        Ok(self)
    }

    pub fn is_credentialed(&self) -> bool {
        matches!(self.state, CredentialState::Credentialed(_))
    }

    fn api(&self) -> Result<Arc<dyn HermesApi>> {
        match &self.state {
            CredentialState::Credentialed(api) => Ok(Arc::clone(api)),
            CredentialState::Uncredentialed => Err(ConnectorError::MissingCredential(
                CONNECTOR_NAME.to_string(),
            )),
        }
    }

    fn stream(&self, window: TimeWindow) -> Result<BatchStream> {
        let api = self.api()?;
        Ok(Box::pin(batch_stream(
            api,
            self.config.base_url.clone(),
            self.config.max_batch_size(),
            window,
        )))
    }
}

impl SourceConnector for HermesConnector {
    fn name(&self) -> &str {
        CONNECTOR_NAME
    }

    fn source(&self) -> DocumentSource {
        DocumentSource::Hermes
    }
}

impl Loadable for HermesConnector {
    fn load_from_state(&self) -> Result<BatchStream> {
        self.stream(TimeWindow::open())
    }
}

impl Pollable for HermesConnector {
    fn poll_source(
        &self,
        start: SecondsSinceUnixEpoch,
        end: SecondsSinceUnixEpoch,
    ) -> Result<BatchStream> {
        // Credentials are checked before the window so an unauthenticated
        // caller always sees MissingCredential.
        self.api()?;
        let window = TimeWindow::from_epoch_seconds(start, end)?;
        self.stream(window)
    }
}

fn batch_stream(
    api: Arc<dyn HermesApi>,
    base_url: String,
    batch_size: NonZeroUsize,
    window: TimeWindow,
) -> impl Stream<Item = Result<Batch>> + Send + 'static {
    try_stream! {
        debug!(?window, batch_size = batch_size.get(), "starting hermes stream");

        let threads = api.fetch_threads().await?;
        let fetched_threads = threads.len();
        let mut thread_docs = 0usize;
        for batch in emit(admitted(threads, RecordKind::Thread, &window, &base_url), batch_size) {
            thread_docs += batch.len();
            yield batch;
        }

        let spaces = api.fetch_spaces().await?;
        let fetched_spaces = spaces.len();
        let mut space_docs = 0usize;
        for batch in emit(admitted(spaces, RecordKind::Space, &window, &base_url), batch_size) {
            space_docs += batch.len();
            yield batch;
        }

        info!(
            fetched_threads,
            thread_docs,
            fetched_spaces,
            space_docs,
            "hermes stream complete"
        );
    }
}

/// Filters `records` through `window` and normalizes the survivors lazily.
fn admitted<'a>(
    records: Vec<RawRecord>,
    kind: RecordKind,
    window: &'a TimeWindow,
    base_url: &'a str,
) -> impl Iterator<Item = Document> + Send + 'a {
    records
        .into_iter()
        .filter(move |raw| window.admits(raw.last_updated()))
        .filter_map(move |raw| match kind.normalize(&raw, base_url) {
            Ok(doc) => Some(doc),
            Err(err) => {
                warn!(kind = kind.as_str(), error = %err, "skipping hermes record");
                None
            }
        })
}
