use crate::commands::paired::{self, Side};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::filter::PairFilter;
use crate::model::ReportItem;
use crate::store::KvStore;

/// Compare two roots, possibly on two different Consul instances.
///
/// `filtered` holds keys whose values differ plus keys present on one side
/// only; `non_filtered` holds keys with identical values.
pub fn run<L: KvStore, R: KvStore>(left: Side<'_, L>, right: Side<'_, R>) -> Result<CmdResult> {
    let (left_root, right_root) = (left.root, right.root);
    let mut result = paired::run(left, right, &mut PairFilter::Diff)?;
    if result.report.all.is_empty() {
        return Ok(result);
    }

    let one_sided = result
        .report
        .filtered
        .iter()
        .filter(|item| matches!(item, ReportItem::Pair(pair) if pair.is_one_sided()))
        .count();
    let changed = result.report.filtered.len() - one_sided;
    let message = if result.report.filtered.is_empty() {
        format!("No differences between '{left_root}' and '{right_root}'")
    } else {
        format!(
            "{changed} changed, {one_sided} on one side only, {} identical",
            result.report.non_filtered.len()
        )
    };
    result.add_message(CmdMessage::info(message));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Record, RecordPair};
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn reports_changed_and_one_sided_keys() {
        let store = StoreFixture::new()
            .with_entries(&[
                ("prod/a", Some("1")),
                ("prod/b", Some("2")),
                ("prod/c", Some("3")),
                ("stage/b", Some("2")),
                ("stage/c", Some("4")),
                ("stage/d", Some("5")),
            ])
            .store;
        let result = run(Side::new(&store, "prod/"), Side::new(&store, "stage/")).unwrap();

        assert_eq!(
            result.report.filtered,
            vec![
                ReportItem::from(RecordPair::left_only(Record::new("prod/a", Some("1")))),
                RecordPair::both(
                    Record::new("prod/c", Some("3")),
                    Record::new("stage/c", Some("4"))
                )
                .into(),
                RecordPair::right_only(Record::new("stage/d", Some("5"))).into(),
            ]
        );
        assert_eq!(
            result.report.non_filtered,
            vec![ReportItem::from(RecordPair::both(
                Record::new("prod/b", Some("2")),
                Record::new("stage/b", Some("2"))
            ))]
        );
        assert_eq!(
            result.messages,
            vec![CmdMessage::info("1 changed, 2 on one side only, 1 identical")]
        );
    }

    #[test]
    fn absent_value_differs_from_empty_value() {
        let left = StoreFixture::new().with_entries(&[("k/x", None)]).store;
        let right = StoreFixture::new().with_entries(&[("k/x", Some(""))]).store;
        let result = run(Side::new(&left, "k/"), Side::new(&right, "k/")).unwrap();
        assert_eq!(result.report.filtered.len(), 1);
        assert!(result.report.non_filtered.is_empty());
    }

    #[test]
    fn identical_roots() {
        let left = StoreFixture::new().with_tree("cfg", 3).store;
        let right = StoreFixture::new().with_tree("cfg", 3).store;
        let result = run(Side::new(&left, "cfg/"), Side::new(&right, "cfg/")).unwrap();
        assert!(result.report.filtered.is_empty());
        assert_eq!(result.report.non_filtered.len(), 4);
        assert_eq!(
            result.messages,
            vec![CmdMessage::info("No differences between 'cfg/' and 'cfg/'")]
        );
    }

    #[test]
    fn nothing_on_either_side_warns() {
        let store = StoreFixture::new().store;
        let result = run(Side::new(&store, "a/"), Side::new(&store, "b/")).unwrap();
        assert!(result.has_warnings());
        assert_eq!(result.messages.len(), 1);
    }
}
