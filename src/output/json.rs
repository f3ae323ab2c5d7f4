//! JSON output: pretty-printed array of records

use super::OutputRow;
use crate::model::DiffRecord;
use std::io;

pub fn write_json(records: &[DiffRecord], out: &mut dyn io::Write) -> io::Result<()> {
    let rows: Vec<OutputRow> = records.iter().map(OutputRow::from_record).collect();
    serde_json::to_writer_pretty(&mut *out, &rows)?;
    writeln!(out)?;
    Ok(())
}
