//! Core data models produced by the connector.
//!
//! A [`Document`] is the canonical unit handed to the indexing consumer.
//! Documents travel in [`Batch`]es whose size is bounded by configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Fixed tag identifying which connector produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    Hermes,
}

impl DocumentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSource::Hermes => "hermes",
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One addressable, linkable text block within a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub link: String,
    pub text: String,
}

/// Normalized document emitted to the consumer.
///
/// `updated_at` is always UTC. It is `None` when the upstream record carried
/// no usable "last updated" value; such documents only appear in full loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub sections: Vec<Section>,
    pub source: DocumentSource,
    pub semantic_identifier: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub metadata: BTreeMap<String, Value>,
}

/// Ordered group of documents emitted together.
pub type Batch = Vec<Document>;

/// Poll bounds as handed over by schedulers: seconds since the Unix epoch.
pub type SecondsSinceUnixEpoch = f64;
