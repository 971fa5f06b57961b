use crate::commands::{single, CmdMessage, CmdResult};
use crate::error::Result;
use crate::filter::RecordFilter;
use crate::store::KvStore;

/// List every key under `root`. Directory markers are left out of
/// `filtered` unless `include_dirs` is set.
pub fn run<S: KvStore>(store: &S, root: &str, include_dirs: bool) -> Result<CmdResult> {
    let mut filter = if include_dirs {
        RecordFilter::PassAll
    } else {
        RecordFilter::SkipDirectory
    };
    let mut result = single::run(store, root, &mut filter)?;
    if !result.report.all.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Dumped {} of {} keys under '{root}'",
            result.report.filtered.len(),
            result.report.all.len()
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReportItem;
    use crate::store::memory::fixtures::StoreFixture;

    fn filtered_keys(result: &CmdResult) -> Vec<String> {
        result
            .report
            .filtered
            .iter()
            .filter_map(|item| match item {
                ReportItem::Single(r) => Some(r.key.clone()),
                ReportItem::Pair(_) => None,
            })
            .collect()
    }

    #[test]
    fn skips_directories_by_default() {
        let fixture = StoreFixture::new().with_tree("svc", 2);
        let result = run(&fixture.store, "svc/", false).unwrap();
        assert_eq!(filtered_keys(&result), ["svc/key0", "svc/key1"]);
        assert_eq!(result.report.non_filtered.len(), 1);
        assert_eq!(result.report.all.len(), 3);
        assert!(result.report.flags.is_empty());
    }

    #[test]
    fn include_dirs_passes_everything() {
        let fixture = StoreFixture::new().with_tree("svc", 2);
        let result = run(&fixture.store, "svc/", true).unwrap();
        assert_eq!(filtered_keys(&result), ["svc/", "svc/key0", "svc/key1"]);
        assert!(result.report.non_filtered.is_empty());
    }

    #[test]
    fn reports_summary_message() {
        let fixture = StoreFixture::new().with_tree("svc", 2);
        let result = run(&fixture.store, "svc/", false).unwrap();
        assert_eq!(
            result.messages,
            vec![CmdMessage::info("Dumped 2 of 3 keys under 'svc/'")]
        );
    }

    #[test]
    fn empty_root_warns() {
        let fixture = StoreFixture::new().with_tree("svc", 2);
        let result = run(&fixture.store, "other/", false).unwrap();
        assert!(result.report.is_empty());
        assert!(result.has_warnings());
    }
}
