//! # Reports
//!
//! Every command run produces one [`ReportBundle`]:
//!
//! - `all`: the complete snapshot (or every aligned pair for paired commands)
//! - `filtered`: items the filter passed
//! - `non_filtered`: items the filter rejected
//! - `flags`: side results keyed by flag name (search hits, copy manifest)
//!
//! Before rendering the bundle is pruned to the sections the reporter settings
//! ask for ([`ReportBundle::prune`]), then handed to a [`render::Renderer`]
//! which turns it into lines for a [`sink::ReportSink`].

use crate::config::ReporterConfig;
use crate::model::{FlagPayload, ReportItem};
use serde::Serialize;
use std::collections::BTreeMap;

pub mod render;
pub mod sink;

pub const OUT_ALL_KEY: &str = "scan";
pub const OUT_FILTERED_KEY: &str = "filtered";
pub const OUT_NON_FILTERED_KEY: &str = "non_filtered";
pub const OUT_FLAG_KEY: &str = "flags";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportBundle {
    pub all: Vec<ReportItem>,
    pub filtered: Vec<ReportItem>,
    pub non_filtered: Vec<ReportItem>,
    pub flags: BTreeMap<String, FlagPayload>,
}

impl ReportBundle {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
            && self.filtered.is_empty()
            && self.non_filtered.is_empty()
            && self.flags.is_empty()
    }

    pub fn add_flag(&mut self, name: impl Into<String>, payload: FlagPayload) {
        self.flags.insert(name.into(), payload);
    }

    /// Keep only the sections `config` shows.
    pub fn prune(self, config: &ReporterConfig) -> PrunedReport {
        PrunedReport {
            scan: config.show_all_scan.then_some(self.all),
            filtered: config.show_filtered.then_some(self.filtered),
            non_filtered: config.show_non_filtered.then_some(self.non_filtered),
            flags: config.show_flags.then_some(self.flags),
        }
    }
}

/// A bundle reduced to its visible sections. Hidden sections are `None` and
/// left out of every output format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrunedReport {
    #[serde(rename = "scan", skip_serializing_if = "Option::is_none")]
    pub scan: Option<Vec<ReportItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered: Option<Vec<ReportItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_filtered: Option<Vec<ReportItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<BTreeMap<String, FlagPayload>>,
}
