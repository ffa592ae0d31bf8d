//! # Hermes Connector
//!
//! Ingestion connector for Hermes, a conversation and workspace service.
//!
//! The connector authenticates with a bearer token, fetches the complete
//! thread and space collections, filters them by last-updated time,
//! normalizes every record into a searchable [`Document`](models::Document),
//! and hands documents to the caller in bounded batches through an async
//! stream.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌───────────┐   ┌─────────┐
//! │ Hermes API   │──▶│  Window    │──▶│ Normalize │──▶│  Emit   │──▶ batches
//! │ threads then │   │  filter    │   │ thread /  │   │ ≤ N per │
//! │ spaces       │   │            │   │ space     │   │ batch   │
//! └──────────────┘   └────────────┘   └───────────┘   └─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export HERMES_ACCESS_TOKEN=...
//! hermes-sync check             # verify credentials and config
//! hermes-sync load              # full historical load to JSONL
//! hermes-sync poll              # incremental poll since last checkpoint
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Document, section, and batch types |
//! | [`error`] | Connector error kinds |
//! | [`credentials`] | Access token extraction |
//! | [`raw`] | Loosely-typed API records |
//! | [`client`] | Hermes HTTP client |
//! | [`window`] | Time-window admission |
//! | [`normalize`] | Record to document conversion |
//! | [`batch`] | Size-bounded batch emission |
//! | [`connector`] | The Hermes connector |
//! | [`traits`] | Loadable and pollable capabilities |
//! | [`checkpoint`] | Poll watermark persistence |
//! | [`sink`] | JSON Lines batch output |
//! | [`progress`] | Sync progress reporting |
//! | [`sources`] | Connector status |
//! | [`sync`] | Load and poll orchestration |

pub mod batch;
pub mod checkpoint;
pub mod client;
pub mod config;
pub mod connector;
pub mod credentials;
pub mod error;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod raw;
pub mod sink;
pub mod sources;
pub mod sync;
pub mod traits;
pub mod window;
