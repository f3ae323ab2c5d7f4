//! Output formatters for the diff report
//!
//! The pipeline yields records in production order; every formatter sorts
//! by path (case-sensitive byte order) first so output is deterministic.
//!
//! Formats:
//! - text: indented tree with aligned columns, grouped into sections
//! - table: tab-separated values with a header row
//! - json: pretty-printed array
//! - yaml: sequence of the same rows

mod json;
mod table;
mod text;
mod yaml;

pub use json::write_json;
pub use table::write_table;
pub use text::write_text_tree;
pub use yaml::write_yaml;

use crate::config::OutputFormat;
use crate::model::DiffRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io;

/// Render `records` plus optional identical records (text only) in the
/// requested format.
pub fn write_report(
    format: OutputFormat,
    records: &mut [DiffRecord],
    identical: &mut [DiffRecord],
    out: &mut dyn io::Write,
) -> io::Result<()> {
    sort_by_path(records);
    sort_by_path(identical);
    match format {
        OutputFormat::Text => write_text_tree(records, identical, out),
        OutputFormat::Table => write_table(records, out),
        OutputFormat::Json => write_json(records, out),
        OutputFormat::Yaml => write_yaml(records, out),
    }
}

/// Sort records by relative path, byte order.
pub fn sort_by_path(records: &mut [DiffRecord]) {
    records.sort_by(|a, b| a.rel.cmp(&b.rel));
}

/// One flattened row for the structured formats
#[derive(Debug, Serialize)]
pub(crate) struct OutputRow {
    pub path: String,
    pub left_size: u64,
    pub right_size: u64,
    pub left_mtime: String,
    pub right_mtime: String,
    pub reason: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub left_hash: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub right_hash: String,
}

impl OutputRow {
    pub(crate) fn from_record(record: &DiffRecord) -> Self {
        Self {
            path: record.rel.to_string(),
            left_size: record.left_size.unwrap_or(0),
            right_size: record.right_size.unwrap_or(0),
            left_mtime: record.left_mtime.map(format_mtime).unwrap_or_default(),
            right_mtime: record.right_mtime.map(format_mtime).unwrap_or_default(),
            reason: record.reason.clone(),
            left_hash: record.left_hash.clone().unwrap_or_default(),
            right_hash: record.right_hash.clone().unwrap_or_default(),
        }
    }
}

/// RFC3339 rendering of a truncated Unix timestamp.
pub(crate) fn format_mtime(secs: i64) -> String {
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::DiffRecord;
    use std::sync::Arc;

    pub fn record(rel: &str, reason: &str) -> DiffRecord {
        DiffRecord {
            rel: Arc::from(rel),
            reason: reason.to_string(),
            left_size: Some(1),
            right_size: Some(1),
            left_mtime: Some(1_700_000_000),
            right_mtime: Some(1_700_000_000),
            left_hash: None,
            right_hash: None,
            left_only: reason == "left only",
        }
    }
}
