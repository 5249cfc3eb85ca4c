//! CSV serialization of extracted tables.
//!
//! Fields are quoted only when they need it (embedded delimiter, quote or
//! newline); quotes are escaped by doubling and records end with a bare
//! `\n`. Ragged tables are right-padded with empty fields so every record
//! has the width of the widest row.

use std::io;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::core::{OcrResult, TableOcrError};
use crate::tabular::Table;

fn writer_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'));
    builder
}

/// Writes the table as CSV records into `writer`.
///
/// An empty table writes nothing, which is a valid (empty) CSV document.
pub fn write_table_csv<W: io::Write>(table: &Table, writer: W) -> OcrResult<()> {
    let mut csv_writer = writer_builder().from_writer(writer);
    let width = table.column_count();

    for row in &table.rows {
        let mut record: Vec<&str> = row.iter().map(|cell| cell.text.as_str()).collect();
        record.resize(width, "");
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the table as a CSV file at `path`, creating parent directories as
/// needed.
pub fn write_table_csv_path(table: &Table, path: &Path) -> OcrResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_table_csv(table, file)
}

/// Renders the table to a CSV string.
pub fn table_to_csv_string(table: &Table) -> OcrResult<String> {
    let mut buffer = Vec::new();
    write_table_csv(table, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|err| TableOcrError::invalid_input(format!("csv output was not utf-8: {err}")))
}
