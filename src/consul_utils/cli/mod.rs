//! # CLI Layer
//!
//! One client of the consul-utils library. This is the only place that knows
//! about argument parsing, logging setup, stderr and exit codes.
//!
//! A run goes: parse flags, load settings (config file, then flags on top),
//! install the tracing subscriber, build the API, optionally clear the cache,
//! run the command, write the report, print the command's messages.
//!
//! The report goes to stdout (or `--output-file`); messages and logs go to
//! stderr so the report can be piped.
//!
//! ## Module Structure
//!
//! - `commands`: settings resolution and per-command handlers
//! - `print`: colored message output
//! - `setup`: argument parsing via clap

mod commands;
mod print;
pub mod setup;

pub use commands::run;
