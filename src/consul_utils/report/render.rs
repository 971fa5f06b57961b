use super::PrunedReport;
use crate::error::{ConsulUtilsError, Result};
use crate::model::{FlagPayload, Record, RecordPair, ReportItem, ABSENT};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::str::FromStr;

const JSON_INDENT: &[u8] = b"    ";

/// Output format, picked from `reporter.output_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    Text,
    Csv,
    Json,
}

impl FromStr for Renderer {
    type Err = ConsulUtilsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Renderer::Text),
            "csv" => Ok(Renderer::Csv),
            "json" => Ok(Renderer::Json),
            other => Err(ConsulUtilsError::Config(format!("Invalid output type {other}"))),
        }
    }
}

impl Renderer {
    /// Render a pruned report into output lines. A line may span several
    /// terminal lines (section headers, text pairs, the JSON document).
    pub fn render(&self, report: &PrunedReport) -> Result<Vec<String>> {
        match self {
            Renderer::Text => Ok(render_sections(report, &TextFormat)),
            Renderer::Csv => Ok(render_sections(report, &CsvFormat)),
            Renderer::Json => Ok(vec![to_pretty_json(report)?]),
        }
    }
}

trait LineFormat {
    fn record(&self, record: &Record) -> String;
    fn pair(&self, pair: &RecordPair) -> String;
    fn flag(&self, name: &str, payload: &FlagPayload) -> String;

    fn item(&self, item: &ReportItem) -> String {
        match item {
            ReportItem::Single(record) => self.record(record),
            ReportItem::Pair(pair) => self.pair(pair),
        }
    }
}

/// Sections in display order: scan, non filtered, filtered, flags.
fn render_sections<F: LineFormat>(report: &PrunedReport, format: &F) -> Vec<String> {
    let mut lines = Vec::new();
    push_items(&mut lines, "Scan", report.scan.as_deref(), format);
    push_items(&mut lines, "Non Filtered", report.non_filtered.as_deref(), format);
    push_items(&mut lines, "Filtered", report.filtered.as_deref(), format);
    if let Some(flags) = &report.flags {
        push_flags(&mut lines, flags, format);
    }
    lines
}

fn push_items<F: LineFormat>(
    lines: &mut Vec<String>,
    title: &str,
    items: Option<&[ReportItem]>,
    format: &F,
) {
    if let Some(items) = items {
        lines.push(section_header(title));
        lines.extend(items.iter().map(|item| format.item(item)));
    }
}

fn push_flags<F: LineFormat>(
    lines: &mut Vec<String>,
    flags: &BTreeMap<String, FlagPayload>,
    format: &F,
) {
    lines.push(section_header("Flags"));
    lines.extend(flags.iter().map(|(name, payload)| format.flag(name, payload)));
}

fn section_header(title: &str) -> String {
    format!("\n{title}:")
}

struct TextFormat;

impl LineFormat for TextFormat {
    fn record(&self, record: &Record) -> String {
        record.to_string()
    }

    fn pair(&self, pair: &RecordPair) -> String {
        format!(
            "---> {}: {}\n<--- {}: {}",
            pair.left_key().unwrap_or(ABSENT),
            pair.left_value().unwrap_or(ABSENT),
            pair.right_key().unwrap_or(ABSENT),
            pair.right_value().unwrap_or(ABSENT),
        )
    }

    fn flag(&self, name: &str, payload: &FlagPayload) -> String {
        format!("{name}: {payload}")
    }
}

struct CsvFormat;

impl LineFormat for CsvFormat {
    fn record(&self, record: &Record) -> String {
        csv_row(&[Some(record.key.as_str()), record.value.as_deref()])
    }

    fn pair(&self, pair: &RecordPair) -> String {
        csv_row(&[
            pair.left_key(),
            pair.left_value(),
            pair.right_key(),
            pair.right_value(),
        ])
    }

    fn flag(&self, name: &str, payload: &FlagPayload) -> String {
        let payload = payload.to_string();
        csv_row(&[Some(name), Some(payload.as_str())])
    }
}

/// Absent fields are empty cells.
fn csv_row(fields: &[Option<&str>]) -> String {
    fields
        .iter()
        .map(|field| csv_field(field.unwrap_or("")))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(key: &str, value: Option<&str>) -> ReportItem {
        Record::new(key, value).into()
    }

    fn report() -> PrunedReport {
        let mut flags = BTreeMap::new();
        flags.insert("hits".to_string(), FlagPayload::Hits(2));
        PrunedReport {
            scan: None,
            filtered: Some(vec![single("app/a", Some("1")), single("app/b", None)]),
            non_filtered: Some(vec![single("app/", None)]),
            flags: Some(flags),
        }
    }

    #[test]
    fn parses_output_types() {
        assert_eq!("text".parse::<Renderer>().unwrap(), Renderer::Text);
        assert_eq!("csv".parse::<Renderer>().unwrap(), Renderer::Csv);
        assert_eq!("json".parse::<Renderer>().unwrap(), Renderer::Json);
        let err = "xml".parse::<Renderer>().unwrap_err();
        assert!(matches!(err, ConsulUtilsError::Config(_)));
    }

    #[test]
    fn text_sections_in_order() {
        let lines = Renderer::Text.render(&report()).unwrap();
        assert_eq!(
            lines,
            vec![
                "\nNon Filtered:",
                "app/: None",
                "\nFiltered:",
                "app/a: 1",
                "app/b: None",
                "\nFlags:",
                "hits: 2",
            ]
        );
    }

    #[test]
    fn text_pair_block() {
        let report = PrunedReport {
            filtered: Some(vec![
                RecordPair::both(Record::new("a/k", Some("1")), Record::new("b/k", Some("2")))
                    .into(),
                RecordPair::right_only(Record::new("b/only", Some("x"))).into(),
            ]),
            ..PrunedReport::default()
        };
        let lines = Renderer::Text.render(&report).unwrap();
        assert_eq!(lines[1], "---> a/k: 1\n<--- b/k: 2");
        assert_eq!(lines[2], "---> None: None\n<--- b/only: x");
    }

    #[test]
    fn csv_rows() {
        let mut report = report();
        report.filtered = Some(vec![
            single("app/a", Some("1")),
            single("app/q", Some("say \"hi\", ok")),
            RecordPair::left_only(Record::new("a/k", Some("v"))).into(),
        ]);
        let lines = Renderer::Csv.render(&report).unwrap();
        assert_eq!(lines[0], "\nNon Filtered:");
        assert_eq!(lines[1], "app/,");
        assert_eq!(lines[3], "app/a,1");
        assert_eq!(lines[4], "app/q,\"say \"\"hi\"\", ok\"");
        assert_eq!(lines[5], "a/k,v,,");
        assert_eq!(lines[7], "hits,2");
    }

    #[test]
    fn json_is_one_document() {
        let lines = Renderer::Json.render(&report()).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("{\n    \"filtered\""));
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["filtered"][1], serde_json::json!({"key": "app/b", "value": null}));
        assert_eq!(parsed["flags"]["hits"], 2);
        assert!(parsed.get("scan").is_none());
    }

    #[test]
    fn empty_report_renders_nothing() {
        assert!(Renderer::Text.render(&PrunedReport::default()).unwrap().is_empty());
        assert_eq!(Renderer::Json.render(&PrunedReport::default()).unwrap(), vec!["{}"]);
    }
}
