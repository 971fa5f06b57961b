use crate::commands::{single, CmdMessage, CmdResult};
use crate::config::SearchConfig;
use crate::error::Result;
use crate::filter::{RecordFilter, SearchFilter};
use crate::store::KvStore;

/// Search keys or values under `root`. Stops once `config.limit` hits have
/// been collected.
///
/// A missing query or a zero limit is rejected before the store is touched.
pub fn run<S: KvStore>(store: &S, root: &str, config: &SearchConfig) -> Result<CmdResult> {
    let search = SearchFilter::new(config)?;
    let mut filter = RecordFilter::Search(search);
    let mut result = single::run(store, root, &mut filter)?;

    if let RecordFilter::Search(search) = &filter {
        if search.hits() >= config.limit {
            result.add_message(CmdMessage::info(format!(
                "Search reached the limit of {} hits",
                config.limit
            )));
        } else if search.hits() == 0 && !result.report.all.is_empty() {
            result.add_message(CmdMessage::info("No matches found"));
        }
    }
    Ok(result)
}
