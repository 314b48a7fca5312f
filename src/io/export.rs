//! CSV export for report row tables.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::report::ReportRow;

/// Column header for exported report tables.
const HEADER: &str = "parameter,value";

/// Exports report rows to a CSV file at the given path.
///
/// Writes a header row followed by one data row per report row. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(rows: &[ReportRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(rows, buf)
}

/// Writes report rows as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(rows: &[ReportRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;
    for row in rows {
        wtr.write_record([row.parameter.as_str(), row.value.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
