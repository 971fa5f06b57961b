//! Core data types: [`Record`], [`RecordPair`] and [`ReportItem`].
//!
//! A `Record` is one key-value entry as Consul holds it. Keys ending in `/`
//! are directory markers and usually carry no value.
//!
//! A `RecordPair` is the same logical key seen from two roots. Pairs are
//! built by stripping each side's root and matching what is left (the
//! *relative key*). When a relative key only exists on one side the other
//! side is `None`, which serializes as `{"key": null, "value": null}` so JSON
//! consumers always see two objects.

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Marker that terminates directory keys.
pub const DIRECTORY_MARKER: char = '/';

/// Text shown in place of an absent key or value.
pub const ABSENT: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub value: Option<String>,
}

impl Record {
    pub fn new(key: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            key: key.into(),
            value: value.map(str::to_string),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.key.ends_with(DIRECTORY_MARKER)
    }

    /// Key with `root` removed. Keys outside `root` are returned whole.
    pub fn relative_key<'a>(&'a self, root: &str) -> &'a str {
        self.key.strip_prefix(root).unwrap_or(&self.key)
    }

    pub fn value_or_absent(&self) -> &str {
        self.value.as_deref().unwrap_or(ABSENT)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value_or_absent())
    }
}

/// Two records aligned by relative key. At least one side is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPair {
    pub left: Option<Record>,
    pub right: Option<Record>,
}

impl RecordPair {
    pub fn both(left: Record, right: Record) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    pub fn left_only(left: Record) -> Self {
        Self {
            left: Some(left),
            right: None,
        }
    }

    pub fn right_only(right: Record) -> Self {
        Self {
            left: None,
            right: Some(right),
        }
    }

    pub fn is_one_sided(&self) -> bool {
        self.left.is_none() || self.right.is_none()
    }

    pub fn left_key(&self) -> Option<&str> {
        self.left.as_ref().map(|r| r.key.as_str())
    }

    pub fn left_value(&self) -> Option<&str> {
        self.left.as_ref().and_then(|r| r.value.as_deref())
    }

    pub fn right_key(&self) -> Option<&str> {
        self.right.as_ref().map(|r| r.key.as_str())
    }

    pub fn right_value(&self) -> Option<&str> {
        self.right.as_ref().and_then(|r| r.value.as_deref())
    }
}

#[derive(Serialize)]
struct Slot<'a> {
    key: Option<&'a str>,
    value: Option<&'a str>,
}

impl<'a> Slot<'a> {
    fn of(record: Option<&'a Record>) -> Self {
        Self {
            key: record.map(|r| r.key.as_str()),
            value: record.and_then(|r| r.value.as_deref()),
        }
    }
}

impl Serialize for RecordPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&Slot::of(self.left.as_ref()))?;
        tuple.serialize_element(&Slot::of(self.right.as_ref()))?;
        tuple.end()
    }
}

/// One entry of a report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportItem {
    Single(Record),
    Pair(RecordPair),
}

impl From<Record> for ReportItem {
    fn from(record: Record) -> Self {
        ReportItem::Single(record)
    }
}

impl From<RecordPair> for ReportItem {
    fn from(pair: RecordPair) -> Self {
        ReportItem::Pair(pair)
    }
}

/// A write performed (or planned) by the copy command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyAction {
    pub source: String,
    pub target: String,
}

/// Side results a filter or command accumulates next to its per-record verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlagPayload {
    Hits(usize),
    Copied(Vec<CopyAction>),
}

impl fmt::Display for FlagPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagPayload::Hits(n) => write!(f, "{n}"),
            FlagPayload::Copied(actions) => {
                let joined: Vec<String> = actions
                    .iter()
                    .map(|a| format!("{} -> {}", a.source, a.target))
                    .collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}
