//! # Command Layer
//!
//! Two pipelines do all the work:
//!
//! - [`single`]: fetch one snapshot, run a [`SingleFilter`](crate::filter::SingleFilter)
//!   over each record, partition, collect side results.
//! - [`paired`]: fetch two snapshots, align them by relative key, run a
//!   [`PairedFilter`](crate::filter::PairedFilter) over the keys both sides
//!   share.
//!
//! The user-facing commands ([`dump`], [`search`], [`diff`], [`copy`]) pick a
//! filter and a pipeline, and may post-process the bundle (copy writes the
//! filtered keys and attaches its manifest).
//!
//! Commands never print. They return a [`CmdResult`] holding the report and
//! any messages for the user; the CLI decides how to show them.

use crate::report::ReportBundle;

pub mod copy;
pub mod diff;
pub mod dump;
pub mod paired;
pub mod search;
pub mod single;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub report: ReportBundle,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_report(mut self, report: ReportBundle) -> Self {
        self.report = report;
        self
    }

    /// Nothing to do: the store returned no keys.
    pub fn empty_snapshot(root: &str) -> Self {
        let mut result = Self::default();
        result.add_message(CmdMessage::warning(format!(
            "No keys found under root '{root}'"
        )));
        result
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m.level, MessageLevel::Warning | MessageLevel::Error))
    }
}
