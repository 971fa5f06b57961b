//! # consul-utils Architecture
//!
//! consul-utils reads key-value snapshots out of Consul, runs them through a
//! filter and reports what passed. Four commands sit on top of that:
//! **dump**, **search**, **diff** (two roots, possibly on two instances) and
//! **copy** (filtered keys written back under another root).
//!
//! The library does not know it is driven from a terminal. The binary in
//! `main.rs` is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - clap parsing, settings resolution, logging setup         │
//! │  - The ONLY place that knows about stderr and exit codes    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Opens stores from settings, dispatches to commands       │
//! │  - Prunes, renders and writes reports                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Single and paired filter pipelines                       │
//! │  - dump / search / diff / copy on top of them               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - KvStore trait                                            │
//! │  - ConsulStore + disk cache (production), InMemoryStore     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pipelines
//!
//! A run fetches a snapshot, asks a filter about each record in fetch order
//! and partitions the records into `filtered` and `non_filtered`. The filter
//! may end the stream early with [`filter::Flow::Stop`] (search does once it
//! has its hits); the snapshot itself is always kept whole in `all`. Filters
//! may also carry side results (hit counts, copy manifests) which end up
//! under `flags`.
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code returns `Result<CmdResult>` and never prints.
//! User-facing notes travel as [`commands::CmdMessage`] values; diagnostics go
//! through `tracing` and the binary decides where they end up.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: most of the tests, against [`store::memory::InMemoryStore`].
//! 2. **API**: dispatch and report writing, also in memory.
//! 3. **CLI**: argument and configuration errors through the built binary
//!    (`tests/`), no Consul needed.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Pipelines and the four commands
//! - [`filter`]: Filter traits and the built-in filters
//! - [`report`]: Report bundle, renderers and sinks
//! - [`store`]: Storage abstraction, Consul client, disk cache
//! - [`model`]: Core data types (`Record`, `RecordPair`, `ReportItem`)
//! - [`config`]: Settings loaded from YAML and overridden by flags
//! - [`error`]: Error types
//! - `cli`: Argument parsing and message printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod report;
pub mod store;
