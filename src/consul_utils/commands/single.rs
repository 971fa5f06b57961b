use crate::commands::CmdResult;
use crate::error::Result;
use crate::filter::{Flow, SingleFilter};
use crate::model::ReportItem;
use crate::report::ReportBundle;
use crate::store::KvStore;

/// Fetch the snapshot under `root` and run `filter` over it in fetch order.
///
/// `all` always holds the whole snapshot. When the filter stops the stream,
/// the stopping record and everything after it stay out of both partitions.
pub fn run<S: KvStore, F: SingleFilter>(
    store: &S,
    root: &str,
    filter: &mut F,
) -> Result<CmdResult> {
    let records = match store.fetch(root)? {
        Some(records) if !records.is_empty() => records,
        _ => return Ok(CmdResult::empty_snapshot(root)),
    };

    let mut bundle = ReportBundle::default();
    for (index, record) in records.iter().enumerate() {
        let eval = filter.evaluate(record, index)?;
        if eval.flow == Flow::Stop {
            tracing::debug!(index, total = records.len(), "filter stopped the stream");
            break;
        }
        let item = ReportItem::from(record.clone());
        if eval.matched {
            bundle.filtered.push(item);
        } else {
            bundle.non_filtered.push(item);
        }
    }

    if let Some(payload) = filter.results() {
        bundle.add_flag(filter.flag(), payload);
    }
    bundle.all = records.into_iter().map(ReportItem::from).collect();

    Ok(CmdResult::default().with_report(bundle))
}
