use crate::commands::CmdResult;
use crate::error::Result;
use crate::filter::{Flow, PairedFilter};
use crate::model::{Record, RecordPair, ReportItem};
use crate::report::ReportBundle;
use crate::store::KvStore;
use std::collections::{HashMap, HashSet};

/// One side of a paired command: a store and the root to read under it.
pub struct Side<'a, S: KvStore> {
    pub store: &'a S,
    pub root: &'a str,
}

impl<'a, S: KvStore> Side<'a, S> {
    pub fn new(store: &'a S, root: &'a str) -> Self {
        Self { store, root }
    }
}

/// Fetch both sides (left first), align them by relative key and run
/// `filter` over the keys present on both.
///
/// Keys found on one side only always land in `filtered`; the filter never
/// sees them. `all` holds every aligned pair.
pub fn run<L: KvStore, R: KvStore, F: PairedFilter>(
    left: Side<'_, L>,
    right: Side<'_, R>,
    filter: &mut F,
) -> Result<CmdResult> {
    let left_records = left.store.fetch(left.root)?.unwrap_or_default();
    let right_records = right.store.fetch(right.root)?.unwrap_or_default();
    if left_records.is_empty() && right_records.is_empty() {
        return Ok(CmdResult::empty_snapshot(&format!(
            "{}' and '{}",
            left.root, right.root
        )));
    }

    let pairs = align(&left_records, left.root, &right_records, right.root);
    let mut bundle = ReportBundle::default();
    // position among the pairs the filter sees
    let mut index = 0;
    for pair in &pairs {
        if pair.is_one_sided() {
            bundle.filtered.push(pair.clone().into());
            continue;
        }
        let eval = filter.evaluate(pair, index)?;
        index += 1;
        if eval.flow == Flow::Stop {
            tracing::debug!(index, total = pairs.len(), "filter stopped the stream");
            break;
        }
        let item = ReportItem::from(pair.clone());
        if eval.matched {
            bundle.filtered.push(item);
        } else {
            bundle.non_filtered.push(item);
        }
    }

    if let Some(payload) = filter.results() {
        bundle.add_flag(filter.flag(), payload);
    }
    bundle.all = pairs.into_iter().map(ReportItem::from).collect();

    Ok(CmdResult::default().with_report(bundle))
}

/// Pair records whose relative keys match.
///
/// Order: left records in fetch order (paired or left-only), then right-only
/// records in fetch order. A relative key repeated within one side keeps its
/// first record.
pub fn align(
    left: &[Record],
    left_root: &str,
    right: &[Record],
    right_root: &str,
) -> Vec<RecordPair> {
    let mut right_index: HashMap<&str, usize> = HashMap::with_capacity(right.len());
    for (i, record) in right.iter().enumerate() {
        right_index.entry(record.relative_key(right_root)).or_insert(i);
    }

    let mut pairs = Vec::with_capacity(left.len().max(right.len()));
    let mut seen_left: HashSet<&str> = HashSet::with_capacity(left.len());
    let mut matched_right = vec![false; right.len()];
    for record in left {
        let relative = record.relative_key(left_root);
        if !seen_left.insert(relative) {
            continue;
        }
        match right_index.get(relative) {
            Some(&i) => {
                matched_right[i] = true;
                pairs.push(RecordPair::both(record.clone(), right[i].clone()));
            }
            None => pairs.push(RecordPair::left_only(record.clone())),
        }
    }

    for (i, record) in right.iter().enumerate() {
        let first_of_key = right_index.get(record.relative_key(right_root)) == Some(&i);
        if first_of_key && !matched_right[i] {
            pairs.push(RecordPair::right_only(record.clone()));
        }
    }
    pairs
}
