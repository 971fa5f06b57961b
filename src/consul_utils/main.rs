//! # consul-utils binary
//!
//! Thin entry point: everything lives in `cli/`, this file only runs it and
//! turns an error into exit code 1. See the library docs for the layering.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
