//! Tab-separated output, one row per record

use super::OutputRow;
use crate::model::DiffRecord;
use std::io;

pub fn write_table(records: &[DiffRecord], out: &mut dyn io::Write) -> io::Result<()> {
    writeln!(
        out,
        "path\tleft_size\tright_size\tleft_mtime\tright_mtime\treason\tleft_hash\tright_hash"
    )?;
    for record in records {
        let row = OutputRow::from_record(record);
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.path,
            row.left_size,
            row.right_size,
            row.left_mtime,
            row.right_mtime,
            row.reason,
            row.left_hash,
            row.right_hash,
        )?;
    }
    Ok(())
}
