//! # API Facade
//!
//! [`ConsulUtilsApi`] is the single entry point for every consul-utils
//! operation. It owns the resolved [`Settings`] and a [`StoreFactory`], opens
//! the stores an operation needs and dispatches to `commands/*.rs`.
//!
//! The facade does no filtering or pairing itself, and it never prints:
//! commands hand back a [`CmdResult`] and [`ConsulUtilsApi::report`] turns its
//! bundle into output according to the reporter settings.
//!
//! ## Generic Over StoreFactory
//!
//! - Production: `ConsulUtilsApi<ConsulStoreFactory>` (HTTP behind the disk cache)
//! - Testing: `ConsulUtilsApi<InMemoryStore>` (every store shares one map)

use crate::commands::paired::Side;
use crate::commands::{self, CmdMessage, CmdResult};
use crate::config::{Settings, SideOverrides};
use crate::error::Result;
use crate::report::render::Renderer;
use crate::report::sink::{write_lines, ReportSink};
use crate::store::{KvStore, StoreFactory};
use std::io::Write;

pub struct ConsulUtilsApi<F: StoreFactory> {
    factory: F,
    settings: Settings,
}

impl<F: StoreFactory> ConsulUtilsApi<F> {
    pub fn new(factory: F, settings: Settings) -> Self {
        Self { factory, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dump(&self, include_dirs: bool) -> Result<CmdResult> {
        let store = self.factory.open(&self.settings)?;
        commands::dump::run(&store, &self.settings.default_root, include_dirs)
    }

    pub fn search(&self) -> Result<CmdResult> {
        let store = self.factory.open(&self.settings)?;
        commands::search::run(&store, &self.settings.default_root, &self.settings.search)
    }

    /// Each side starts from the shared settings; its overrides win.
    pub fn diff(&self, left: &SideOverrides, right: &SideOverrides) -> Result<CmdResult> {
        let left_settings = self.settings.for_side(left);
        let right_settings = self.settings.for_side(right);
        let left_store = self.factory.open(&left_settings)?;
        let right_store = self.factory.open(&right_settings)?;
        commands::diff::run(
            Side::new(&left_store, &left_settings.default_root),
            Side::new(&right_store, &right_settings.default_root),
        )
    }

    /// Copy within the configured Consul instance, from the default root to
    /// `target_root`.
    pub fn copy(&self, target_root: &str, dry_run: bool) -> Result<CmdResult> {
        let source = self.factory.open(&self.settings)?;
        let mut target = self.factory.open(&self.settings)?;
        commands::copy::run(
            &source,
            &self.settings.default_root,
            &mut target,
            target_root,
            dry_run,
        )
    }

    /// Clear the cache of every listed side, or of the shared settings when
    /// `sides` is empty.
    pub fn clear_cache(&self, sides: &[SideOverrides]) -> Result<CmdResult> {
        let targets: Vec<Settings> = if sides.is_empty() {
            vec![self.settings.clone()]
        } else {
            sides.iter().map(|side| self.settings.for_side(side)).collect()
        };
        for settings in &targets {
            let mut store = self.factory.open(settings)?;
            store.clear_cache()?;
        }
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info("Cache cleared"));
        Ok(result)
    }

    /// Renderer named by `reporter.output_type`.
    pub fn renderer(&self) -> Result<Renderer> {
        self.settings.reporter.output_type.parse()
    }

    /// Render the visible sections of `result` to the configured sink.
    ///
    /// A result without a snapshot (nothing found under the root) has
    /// nothing to report: no output is written and no file is created.
    pub fn report(&self, result: &CmdResult) -> Result<()> {
        let renderer = self.renderer()?;
        if result.report.is_empty() {
            return Ok(());
        }
        let mut sink = ReportSink::open(&self.settings.reporter.output_file)?;
        self.write_report(renderer, result, &mut sink)
    }

    /// Like [`report`](Self::report), into any writer.
    pub fn report_to<W: Write>(&self, result: &CmdResult, out: &mut W) -> Result<()> {
        let renderer = self.renderer()?;
        self.write_report(renderer, result, out)
    }

    fn write_report<W: Write>(
        &self,
        renderer: Renderer,
        result: &CmdResult,
        out: &mut W,
    ) -> Result<()> {
        if result.report.is_empty() {
            return Ok(());
        }
        let pruned = result.report.clone().prune(&self.settings.reporter);
        let lines = renderer.render(&pruned)?;
        write_lines(out, &lines)
    }
}
