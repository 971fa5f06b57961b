use crate::commands::{single, CmdMessage, CmdResult};
use crate::error::Result;
use crate::filter::RecordFilter;
use crate::model::{CopyAction, FlagPayload, ReportItem};
use crate::store::KvStore;

pub const COPY_FLAG: &str = "copy";

/// Copy every non-directory key under `source_root` to `target_root`.
///
/// Target keys are `target_root` followed by the key relative to
/// `source_root`. Valueless keys are written as empty strings. The manifest
/// of copies is attached under [`COPY_FLAG`]; with `dry_run` nothing is
/// written but the manifest is still built.
pub fn run<S: KvStore, T: KvStore>(
    source: &S,
    source_root: &str,
    target: &mut T,
    target_root: &str,
    dry_run: bool,
) -> Result<CmdResult> {
    let mut result = single::run(source, source_root, &mut RecordFilter::SkipDirectory)?;
    if result.report.all.is_empty() {
        return Ok(result);
    }

    let mut manifest = Vec::with_capacity(result.report.filtered.len());
    for item in &result.report.filtered {
        let ReportItem::Single(record) = item else {
            continue;
        };
        let target_key = format!("{target_root}{}", record.relative_key(source_root));
        if !dry_run {
            target.write(&target_key, record.value.as_deref().unwrap_or(""))?;
            tracing::info!(source = %record.key, target = %target_key, "copied key");
        }
        manifest.push(CopyAction {
            source: record.key.clone(),
            target: target_key,
        });
    }

    let count = manifest.len();
    result
        .report
        .add_flag(COPY_FLAG, FlagPayload::Copied(manifest));
    if dry_run {
        result.add_message(CmdMessage::info(format!(
            "Dry run: {count} keys would be copied to '{target_root}'"
        )));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Copied {count} keys to '{target_root}'"
        )));
    }
    Ok(result)
}
