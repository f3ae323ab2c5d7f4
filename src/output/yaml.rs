//! YAML output: sequence of records

use super::OutputRow;
use crate::model::DiffRecord;
use std::io;

pub fn write_yaml(records: &[DiffRecord], out: &mut dyn io::Write) -> io::Result<()> {
    let rows: Vec<OutputRow> = records.iter().map(OutputRow::from_record).collect();
    serde_yaml::to_writer(out, &rows).map_err(io::Error::other)
}
