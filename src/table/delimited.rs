//! Comma-separated values

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use super::{RowSource, Table, TableError, TableFormat, TableWriter, ensure_parent_dir};

/// Stream a CSV file with a header row
pub fn open(path: &Path) -> Result<RowSource, TableError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| TableError::read(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| TableError::read(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TableError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let owned_path = path.to_path_buf();
    let rows = reader.into_records().map(move |record| {
        record
            .map(|r| r.iter().map(str::to_string).collect())
            .map_err(|e| record_error(&owned_path, e))
    });

    Ok(RowSource::new(headers, Box::new(rows), None))
}

/// Bad bytes in one record only cost that record. Anything else ends the read.
fn record_error(path: &Path, e: csv::Error) -> TableError {
    match e.kind() {
        csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::UnequalLengths { .. } => {
            TableError::Record {
                message: e.to_string(),
            }
        }
        _ => TableError::read(path, e),
    }
}

/// Writes RFC 4180 CSV with a header row
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

impl TableWriter for CsvWriter {
    fn format(&self) -> TableFormat {
        TableFormat::Csv
    }

    fn write(&self, table: &Table, path: &Path) -> Result<(), TableError> {
        ensure_parent_dir(path)?;

        let mut writer = WriterBuilder::new()
            .from_path(path)
            .map_err(|e| TableError::write(path, e))?;

        writer
            .write_record(&table.columns)
            .map_err(|e| TableError::write(path, e))?;
        for row in &table.rows {
            writer
                .write_record(row)
                .map_err(|e| TableError::write(path, e))?;
        }
        writer.flush().map_err(|e| TableError::write(path, e))?;
        Ok(())
    }
}
