//! Normalization of raw Hermes records into [`Document`]s.
//!
//! Each raw thread or space becomes exactly one document with exactly one
//! section. Messages of a thread are folded into that section's text.
//!
//! Normalization is pure: the same raw record always yields the same
//! document, so downstream deduplication by `id` stays stable across runs.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{ConnectorError, Result};
use crate::models::{Document, DocumentSource, Section};
use crate::raw::{render_scalar, text_field, RawRecord, ID_FIELD};

/// The two record kinds served by the Hermes API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Thread,
    Space,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Thread => "thread",
            RecordKind::Space => "space",
        }
    }

    /// Path segment used to build a record's section link.
    fn link_segment(&self) -> &'static str {
        match self {
            RecordKind::Thread => "threads",
            RecordKind::Space => "spaces",
        }
    }

    pub fn normalize(&self, raw: &RawRecord, base_url: &str) -> Result<Document> {
        match self {
            RecordKind::Thread => normalize_thread(raw, base_url),
            RecordKind::Space => normalize_space(raw, base_url),
        }
    }
}

/// Builds the deterministic link for a record: `<base_url>/<kind>/<id>`.
pub fn record_link(base_url: &str, kind: RecordKind, id: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        kind.link_segment(),
        id
    )
}

/// Normalize a message thread.
///
/// # Errors
///
/// Returns [`ConnectorError::MalformedRecord`] when the thread has no `_id`.
pub fn normalize_thread(raw: &RawRecord, base_url: &str) -> Result<Document> {
    let id = require_id(raw, RecordKind::Thread)?;

    let blocks: Vec<String> = raw
        .array_field("messages")
        .iter()
        .map(render_message)
        .collect();
    let text = format!("Messages: {}", blocks.join("\n"));

    let mut metadata = BTreeMap::new();
    metadata.insert("enterprise_id".to_string(), raw.passthrough("enterprise_id"));
    metadata.insert("type".to_string(), Value::String("message".to_string()));

    Ok(Document {
        id: id.to_string(),
        sections: vec![Section {
            link: record_link(base_url, RecordKind::Thread, id),
            text,
        }],
        source: DocumentSource::Hermes,
        semantic_identifier: id.to_string(),
        updated_at: raw.last_updated(),
        metadata,
    })
}

/// Normalize a space (a container of threads and saved searches).
///
/// # Errors
///
/// Returns [`ConnectorError::MalformedRecord`] when the space has no `_id`.
pub fn normalize_space(raw: &RawRecord, base_url: &str) -> Result<Document> {
    let id = require_id(raw, RecordKind::Space)?;
    let updated_at = raw.last_updated();

    let threads = bullet_list("Thread", raw.array_field("threads"));
    let searches = bullet_list("Search Query", raw.array_field("searches"));

    let text = format!(
        "Space Name: {}\nCreated By: {}\nLast Updated: {}\nThreads:\n{}\nSearches:\n{}\n",
        raw.text_field("name"),
        raw.text_field("created_by"),
        updated_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        threads,
        searches,
    );

    let mut metadata = BTreeMap::new();
    metadata.insert("space_name".to_string(), raw.passthrough("name"));
    metadata.insert("created_by".to_string(), raw.passthrough("created_by"));
    metadata.insert("threads".to_string(), list_passthrough(raw, "threads"));
    metadata.insert("searches".to_string(), list_passthrough(raw, "searches"));
    metadata.insert("enterprise_id".to_string(), raw.passthrough("enterprise_id"));
    metadata.insert("type".to_string(), Value::String("space".to_string()));

    Ok(Document {
        id: id.to_string(),
        sections: vec![Section {
            link: record_link(base_url, RecordKind::Space, id),
            text,
        }],
        source: DocumentSource::Hermes,
        semantic_identifier: id.to_string(),
        updated_at,
        metadata,
    })
}

fn require_id(raw: &RawRecord, kind: RecordKind) -> Result<&str> {
    raw.id().ok_or_else(|| ConnectorError::MalformedRecord {
        kind: kind.as_str(),
        reason: format!("missing or empty `{}`", ID_FIELD),
    })
}

fn render_message(message: &Value) -> String {
    format!(
        "From: {}\nFilename: {}\nCode: {}\nMessage: {}",
        text_field(message, "sender_username"),
        text_field(message, "filename"),
        text_field(message, "snippet"),
        text_field(message, "message"),
    )
}

fn bullet_list(label: &str, items: &[Value]) -> String {
    items
        .iter()
        .map(|item| format!("- {}: {}", label, render_scalar(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

// Absent lists pass through as empty arrays, matching how they render.
fn list_passthrough(raw: &RawRecord, key: &str) -> Value {
    Value::Array(raw.array_field(key).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    const BASE: &str = "https://hermesapp.net/api/";

    #[test]
    fn thread_normalizes_with_single_section() {
        let raw = RawRecord::new(json!({
            "_id": "t1",
            "last_updated": "2024-01-01T00:00:00+00:00",
            "enterprise_id": "ent-9",
            "messages": [{
                "sender_username": "alice",
                "filename": "x.py",
                "snippet": "print(1)",
                "message": "hi"
            }]
        }));

        let doc = normalize_thread(&raw, BASE).unwrap();
        assert_eq!(doc.id, "t1");
        assert_eq!(doc.semantic_identifier, "t1");
        assert_eq!(doc.source, DocumentSource::Hermes);
        assert_eq!(
            doc.updated_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].link, "https://hermesapp.net/api/threads/t1");
        assert_eq!(
            doc.sections[0].text,
            "Messages: From: alice\nFilename: x.py\nCode: print(1)\nMessage: hi"
        );
        assert_eq!(doc.metadata["enterprise_id"], json!("ent-9"));
        assert_eq!(doc.metadata["type"], json!("message"));
    }

    #[test]
    fn thread_messages_join_with_newline() {
        let raw = RawRecord::new(json!({
            "_id": "t2",
            "messages": [
                {"sender_username": "a", "message": "one"},
                {"sender_username": "b", "message": "two"}
            ]
        }));
        let text = &normalize_thread(&raw, BASE).unwrap().sections[0].text;
        assert_eq!(
            text,
            "Messages: From: a\nFilename: \nCode: \nMessage: one\n\
             From: b\nFilename: \nCode: \nMessage: two"
        );
    }

    #[test]
    fn missing_message_fields_render_empty() {
        let raw = RawRecord::new(json!({
            "_id": "t3",
            "messages": [{"sender_username": null, "snippet": 42}]
        }));
        let doc = normalize_thread(&raw, BASE).unwrap();
        assert_eq!(
            doc.sections[0].text,
            "Messages: From: \nFilename: \nCode: 42\nMessage: "
        );
        assert_eq!(doc.updated_at, None);
        assert_eq!(doc.metadata["enterprise_id"], Value::Null);
    }

    #[test]
    fn thread_without_messages_still_normalizes() {
        let raw = RawRecord::new(json!({"_id": "t4", "messages": "oops"}));
        let doc = normalize_thread(&raw, BASE).unwrap();
        assert_eq!(doc.sections[0].text, "Messages: ");
    }

    #[test]
    fn missing_id_is_malformed() {
        for raw in [json!({}), json!({"_id": null}), json!({"_id": ""}), json!({"_id": 7})] {
            let err = normalize_thread(&RawRecord::new(raw.clone()), BASE).unwrap_err();
            assert!(
                matches!(err, ConnectorError::MalformedRecord { kind: "thread", .. }),
                "unexpected error for {}: {:?}",
                raw,
                err
            );
            let err = normalize_space(&RawRecord::new(raw), BASE).unwrap_err();
            assert!(matches!(
                err,
                ConnectorError::MalformedRecord { kind: "space", .. }
            ));
        }
    }

    #[test]
    fn space_renders_lists_and_metadata() {
        let raw = RawRecord::new(json!({
            "_id": "s1",
            "name": "Platform",
            "created_by": "bob",
            "last_updated": "2024-02-03 04:05:06+00:00",
            "threads": ["t1", "t2"],
            "searches": ["deploy"],
            "enterprise_id": "ent-1"
        }));

        let doc = normalize_space(&raw, BASE).unwrap();
        assert_eq!(doc.sections[0].link, "https://hermesapp.net/api/spaces/s1");
        assert_eq!(
            doc.sections[0].text,
            "Space Name: Platform\n\
             Created By: bob\n\
             Last Updated: 2024-02-03T04:05:06+00:00\n\
             Threads:\n- Thread: t1\n- Thread: t2\n\
             Searches:\n- Search Query: deploy\n"
        );
        assert_eq!(doc.metadata["space_name"], json!("Platform"));
        assert_eq!(doc.metadata["threads"], json!(["t1", "t2"]));
        assert_eq!(doc.metadata["searches"], json!(["deploy"]));
        assert_eq!(doc.metadata["type"], json!("space"));
    }

    #[test]
    fn space_with_empty_lists_keeps_headings() {
        let raw = RawRecord::new(json!({"_id": "s2", "name": "Empty"}));
        let doc = normalize_space(&raw, BASE).unwrap();
        assert_eq!(
            doc.sections[0].text,
            "Space Name: Empty\nCreated By: \nLast Updated: \nThreads:\n\nSearches:\n\n"
        );
        assert_eq!(doc.metadata["threads"], json!([]));
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = RawRecord::new(json!({
            "_id": "s3",
            "threads": [{"id": "t9"}],
            "searches": []
        }));
        assert_eq!(
            normalize_space(&raw, BASE).unwrap(),
            normalize_space(&raw, BASE).unwrap()
        );
        assert_eq!(
            normalize_thread(&raw, BASE).unwrap(),
            normalize_thread(&raw, BASE).unwrap()
        );
    }

    #[test]
    fn links_ignore_trailing_slash_on_base() {
        assert_eq!(
            record_link("http://localhost:9000", RecordKind::Thread, "x"),
            record_link("http://localhost:9000/", RecordKind::Thread, "x")
        );
    }
}
