//! # Filters
//!
//! A filter is a stateful predicate evaluated once per record (single
//! filters) or once per aligned pair (paired filters), in stream order.
//!
//! Besides the verdict, every evaluation returns a [`Flow`]. A filter that has
//! done enough work (the search hit limit) answers [`Flow::Stop`] and the
//! pipeline ends iteration there, keeping what it gathered so far. Stopping is
//! ordinary data flow, never an error.
//!
//! At the end of a run the pipeline asks the filter for its side results,
//! reported under the filter's flag name.
//!
//! The built-in filters are closed enums ([`RecordFilter`], [`PairFilter`]);
//! the traits exist so pipelines can be driven by any predicate.

use crate::config::{SearchConfig, SearchField};
use crate::error::{ConsulUtilsError, Result};
use crate::model::{FlagPayload, Record, RecordPair};
use regex::Regex;

pub const DEFAULT_FLAG: &str = "default";
pub const SEARCH_FLAG: &str = "hits";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub matched: bool,
    pub flow: Flow,
}

impl Evaluation {
    pub fn matched(matched: bool) -> Self {
        Self {
            matched,
            flow: Flow::Continue,
        }
    }

    /// End the stream. The record that triggered the stop is not partitioned.
    pub fn stop() -> Self {
        Self {
            matched: false,
            flow: Flow::Stop,
        }
    }
}

/// Predicate over single records.
pub trait SingleFilter {
    fn flag(&self) -> &str {
        DEFAULT_FLAG
    }

    fn evaluate(&mut self, record: &Record, index: usize) -> Result<Evaluation>;

    fn results(&self) -> Option<FlagPayload> {
        None
    }
}

/// Predicate over aligned pairs. Either side may be absent.
pub trait PairedFilter {
    fn flag(&self) -> &str {
        DEFAULT_FLAG
    }

    fn evaluate(&mut self, pair: &RecordPair, index: usize) -> Result<Evaluation>;

    fn results(&self) -> Option<FlagPayload> {
        None
    }
}

#[derive(Debug)]
pub enum RecordFilter {
    /// Every record passes.
    PassAll,
    /// Directory keys (ending in `/`) are excluded.
    SkipDirectory,
    Search(SearchFilter),
}

impl SingleFilter for RecordFilter {
    fn flag(&self) -> &str {
        match self {
            RecordFilter::Search(search) => search.flag(),
            _ => DEFAULT_FLAG,
        }
    }

    fn evaluate(&mut self, record: &Record, index: usize) -> Result<Evaluation> {
        match self {
            RecordFilter::PassAll => Ok(Evaluation::matched(true)),
            RecordFilter::SkipDirectory => Ok(Evaluation::matched(!record.is_directory())),
            RecordFilter::Search(search) => search.evaluate(record, index),
        }
    }

    fn results(&self) -> Option<FlagPayload> {
        match self {
            RecordFilter::Search(search) => search.results(),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum PairFilter {
    /// Passes pairs whose values differ.
    Diff,
}

impl PairedFilter for PairFilter {
    fn evaluate(&mut self, pair: &RecordPair, _index: usize) -> Result<Evaluation> {
        match self {
            PairFilter::Diff => Ok(Evaluation::matched(pair.left_value() != pair.right_value())),
        }
    }
}

/// Literal or regex search over keys or values with a hit limit.
#[derive(Debug)]
pub struct SearchFilter {
    query: String,
    field: SearchField,
    regex: bool,
    limit: usize,
    compiled: Option<Regex>,
    hits: usize,
}

impl SearchFilter {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let query = config
            .query
            .as_deref()
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ConsulUtilsError::Config("No query specified".to_string()))?;
        if config.limit == 0 {
            return Err(ConsulUtilsError::Config(
                "Search limit must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            query: query.to_string(),
            field: config.fields,
            regex: config.regex,
            limit: config.limit,
            compiled: None,
            hits: 0,
        })
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    fn is_match(&mut self, haystack: &str) -> Result<bool> {
        if !self.regex {
            return Ok(haystack.contains(self.query.as_str()));
        }
        let pattern = match self.compiled.take() {
            Some(pattern) => pattern,
            None => Regex::new(&self.query)?,
        };
        let found = pattern.is_match(haystack);
        self.compiled = Some(pattern);
        Ok(found)
    }
}

impl SingleFilter for SearchFilter {
    fn flag(&self) -> &str {
        SEARCH_FLAG
    }

    fn evaluate(&mut self, record: &Record, index: usize) -> Result<Evaluation> {
        let haystack = match self.field {
            SearchField::Keys => record.key.as_str(),
            SearchField::Values => match record.value.as_deref() {
                Some(value) => value,
                None => return Ok(Evaluation::matched(false)),
            },
        };
        if !self.is_match(haystack)? {
            return Ok(Evaluation::matched(false));
        }
        if self.hits >= self.limit {
            tracing::debug!(index, limit = self.limit, "search hit limit reached");
            return Ok(Evaluation::stop());
        }
        self.hits += 1;
        Ok(Evaluation::matched(true))
    }

    fn results(&self) -> Option<FlagPayload> {
        (self.hits > 0).then_some(FlagPayload::Hits(self.hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(query: &str, field: SearchField, regex: bool, limit: usize) -> SearchFilter {
        SearchFilter::new(&SearchConfig {
            query: Some(query.to_string()),
            regex,
            fields: field,
            limit,
        })
        .unwrap()
    }

    fn check<F: SingleFilter>(filter: &mut F, cases: &[(&str, Option<&str>, bool)]) {
        for (index, (key, value, expected)) in cases.iter().enumerate() {
            let eval = filter.evaluate(&Record::new(*key, *value), index).unwrap();
            assert_eq!(eval.matched, *expected, "key {key}");
            assert_eq!(eval.flow, Flow::Continue);
        }
    }

    struct OddValues;

    impl SingleFilter for OddValues {
        fn evaluate(&mut self, record: &Record, _index: usize) -> Result<Evaluation> {
            let n: i64 = record.value_or_absent().parse().unwrap_or(0);
            Ok(Evaluation::matched(n % 2 == 1))
        }
    }

    #[test]
    fn custom_single_filter() {
        check(
            &mut OddValues,
            &[
                ("test1", Some("1"), true),
                ("test2", Some("2"), false),
                ("test3", Some("3"), true),
            ],
        );
        assert_eq!(OddValues.flag(), DEFAULT_FLAG);
        assert!(OddValues.results().is_none());
    }

    #[test]
    fn pass_all_passes_everything() {
        check(
            &mut RecordFilter::PassAll,
            &[("a/", None, true), ("a/b", Some("x"), true)],
        );
    }

    #[test]
    fn skip_directory_filter() {
        let mut filter = RecordFilter::SkipDirectory;
        let cases = [
            ("test1", Some("a"), true),
            ("test2/", Some("a"), false),
            ("test3/test", Some("a"), true),
            ("test4/test4/", Some("a"), false),
        ];
        check(&mut filter, &cases);
        // stateless: same answers on a second pass
        check(&mut filter, &cases);
    }

    #[test]
    fn search_literal_keys() {
        let mut filter = search("test", SearchField::Keys, false, 10);
        check(
            &mut filter,
            &[
                ("test/a", Some("a"), true),
                ("testa/b", Some("b"), true),
                ("teeest/c", Some("c"), false),
                ("ddd", Some("d"), false),
                ("eetestee", Some("e"), true),
            ],
        );
        assert_eq!(filter.results(), Some(FlagPayload::Hits(3)));
    }

    #[test]
    fn search_literal_values() {
        let mut filter = search("test", SearchField::Values, false, 10);
        check(
            &mut filter,
            &[
                ("test/a", Some("test"), true),
                ("testa/b", Some("btest"), true),
                ("teeest/c", Some("cccctestcc"), true),
                ("ddd", Some("ddd"), false),
                ("eetestee", Some("teeeest"), false),
                ("test/dir/", None, false),
            ],
        );
    }

    #[test]
    fn search_literal_is_case_sensitive() {
        let mut filter = search("Test", SearchField::Keys, false, 10);
        check(&mut filter, &[("test", None, false), ("aTest", None, true)]);
    }

    #[test]
    fn search_regex_keys() {
        let mut filter = search(r"^test\d+$", SearchField::Keys, true, 10);
        check(
            &mut filter,
            &[
                ("test1", Some("test"), true),
                ("test/b", Some("btest"), false),
                ("teeest/c", Some("cccctestcc"), false),
                ("dddtest1", Some("ddd"), false),
                ("test222ee", Some("teeeest"), false),
                ("test3333", Some("teeeest"), true),
                ("test44/f", Some("teeeest"), false),
            ],
        );
    }

    #[test]
    fn search_regex_is_unanchored_contains() {
        let mut filter = search(r"db\.\w+", SearchField::Values, true, 10);
        check(
            &mut filter,
            &[("a", Some("host=db.internal:5432"), true), ("b", Some("db"), false)],
        );
    }

    #[test]
    fn search_stops_after_limit() {
        let mut filter = search("k", SearchField::Keys, false, 2);
        assert!(filter.evaluate(&Record::new("k1", None), 0).unwrap().matched);
        assert!(!filter.evaluate(&Record::new("x", None), 1).unwrap().matched);
        assert!(filter.evaluate(&Record::new("k2", None), 2).unwrap().matched);
        let third = filter.evaluate(&Record::new("k3", None), 3).unwrap();
        assert_eq!(third.flow, Flow::Stop);
        assert!(!third.matched);
        assert_eq!(filter.results(), Some(FlagPayload::Hits(2)));
    }

    #[test]
    fn search_without_hits_has_no_results() {
        let mut filter = search("zzz", SearchField::Keys, false, 2);
        check(&mut filter, &[("a", None, false)]);
        assert!(filter.results().is_none());
    }

    #[test]
    fn search_requires_query() {
        let err = SearchFilter::new(&SearchConfig::default()).unwrap_err();
        assert!(matches!(err, ConsulUtilsError::Config(_)));

        let empty = SearchConfig {
            query: Some(String::new()),
            ..SearchConfig::default()
        };
        assert!(SearchFilter::new(&empty).is_err());
    }

    #[test]
    fn search_rejects_zero_limit() {
        let config = SearchConfig {
            query: Some("a".into()),
            limit: 0,
            ..SearchConfig::default()
        };
        assert!(matches!(
            SearchFilter::new(&config),
            Err(ConsulUtilsError::Config(_))
        ));
    }

    #[test]
    fn invalid_regex_fails_on_first_evaluation() {
        let mut filter = search("(unclosed", SearchField::Keys, true, 10);
        let err = filter.evaluate(&Record::new("a", None), 0).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn diff_filter() {
        let mut filter = PairFilter::Diff;
        let cases = [
            (Some("a"), Some("a"), false),
            (Some("bb"), Some("b"), true),
            (Some("c1"), Some("c2"), true),
            (Some("x"), None, true),
            (None, Some("x"), true),
            (None, None, false),
        ];
        for (index, (v1, v2, expected)) in cases.into_iter().enumerate() {
            let pair = RecordPair::both(Record::new("l/k", v1), Record::new("r/k", v2));
            assert_eq!(filter.evaluate(&pair, index).unwrap().matched, expected);
        }

        let one_sided = RecordPair::left_only(Record::new("l/k", Some("x")));
        assert!(filter.evaluate(&one_sided, 0).unwrap().matched);
    }
}
