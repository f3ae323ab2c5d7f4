//! Text tree formatter: sectioned, indented, column-aligned
//!
//! Records are grouped into `Different:`, `Same (identical):` (only when
//! identical records were collected), `Left only:`, and `Right only:`
//! sections. Within a section each directory prints once as an indented
//! `name/` header; files print as aligned columns.

use super::format_mtime;
use crate::model::DiffRecord;
use std::collections::HashSet;
use std::io;

pub fn write_text_tree(
    records: &[DiffRecord],
    identical: &[DiffRecord],
    out: &mut dyn io::Write,
) -> io::Result<()> {
    let (different, left_only, right_only) = split_sections(records);

    write_section(out, "Different:", &different)?;
    if !identical.is_empty() {
        let identical_refs: Vec<&DiffRecord> = identical.iter().collect();
        write_section(out, "Same (identical):", &identical_refs)?;
    }
    write_section(out, "Left only:", &left_only)?;
    write_section(out, "Right only:", &right_only)?;
    Ok(())
}

fn split_sections(
    records: &[DiffRecord],
) -> (Vec<&DiffRecord>, Vec<&DiffRecord>, Vec<&DiffRecord>) {
    let mut different = Vec::new();
    let mut left_only = Vec::new();
    let mut right_only = Vec::new();
    for record in records {
        if record.left_only {
            left_only.push(record);
        } else if record.reason == "right only" {
            right_only.push(record);
        } else {
            different.push(record);
        }
    }
    (different, left_only, right_only)
}

fn write_section(out: &mut dyn io::Write, header: &str, records: &[&DiffRecord]) -> io::Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{}", header)?;
    write_tree_body(out, records)?;
    Ok(())
}

struct Row {
    dir_lines: Vec<String>,
    name: String,
    size: String,
    mtime: String,
    reason: String,
}

/// Two passes: measure column widths, then print directory headers and
/// aligned file lines.
fn write_tree_body(out: &mut dyn io::Write, records: &[&DiffRecord]) -> io::Result<()> {
    let mut seen_dirs: HashSet<String> = HashSet::new();
    let mut rows = Vec::with_capacity(records.len());
    let mut max_name = 0;
    let mut max_size = 0;
    let mut max_mtime = 0;

    for record in records {
        let parts: Vec<&str> = record.rel.split('/').collect();
        let mut dir_lines = Vec::new();
        for depth in 1..parts.len() {
            let prefix = parts[..depth].join("/");
            if seen_dirs.insert(prefix) {
                dir_lines.push(format!("{}{}/", "  ".repeat(depth - 1), parts[depth - 1]));
            }
        }
        let name = format!(
            "{}{}",
            "  ".repeat(parts.len() - 1),
            parts[parts.len() - 1]
        );
        let size = format!("size={}", size_column(record));
        let mtime = format!("mtime={}", mtime_column(record));
        let mut reason = record.reason.clone();
        if let Some(left_hash) = &record.left_hash {
            reason.push_str("  hash=");
            reason.push_str(left_hash);
            if let Some(right_hash) = &record.right_hash {
                reason.push('/');
                reason.push_str(right_hash);
            }
        }

        max_name = max_name.max(name.len());
        max_size = max_size.max(size.len());
        max_mtime = max_mtime.max(mtime.len());
        rows.push(Row {
            dir_lines,
            name,
            size,
            mtime,
            reason,
        });
    }

    for row in rows {
        for line in &row.dir_lines {
            writeln!(out, "{}", line)?;
        }
        writeln!(
            out,
            "{:<name_w$}  {:<size_w$}  {:<mtime_w$}  {}",
            row.name,
            row.size,
            row.mtime,
            row.reason,
            name_w = max_name,
            size_w = max_size,
            mtime_w = max_mtime,
        )?;
    }
    Ok(())
}

fn size_column(record: &DiffRecord) -> String {
    match (record.left_size, record.right_size) {
        (Some(left), Some(right)) if left != right => format!("{}/{}", left, right),
        (Some(left), _) => left.to_string(),
        (None, Some(right)) => right.to_string(),
        (None, None) => String::new(),
    }
}

fn mtime_column(record: &DiffRecord) -> String {
    match (record.left_mtime, record.right_mtime) {
        (Some(left), Some(right)) if left != right => {
            format!("{}/{}", format_mtime(left), format_mtime(right))
        }
        (Some(left), _) => format_mtime(left),
        (None, Some(right)) => format_mtime(right),
        (None, None) => String::new(),
    }
}
