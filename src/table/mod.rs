//! Tabular input and output
//!
//! Provides a row-oriented reader over CSV and XLSX sources and writers for
//! both formats. XLSX is the primary output format; CSV is the fallback.

pub mod delimited;
pub mod xlsx;

use std::path::{Path, PathBuf};

pub use delimited::CsvWriter;
pub use self::xlsx::XlsxWriter;

/// Error while reading or writing a table
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("{path} has no header row")]
    MissingHeader { path: PathBuf },
    #[error("Row has {found} cells, expected {expected}")]
    RowWidth { expected: usize, found: usize },
    /// A single record could not be decoded; the rows after it are still readable
    #[error("Unreadable record: {message}")]
    Record { message: String },
}

impl TableError {
    pub(crate) fn read(path: &Path, message: impl ToString) -> Self {
        TableError::Read {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, message: impl ToString) -> Self {
        TableError::Write {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Xlsx,
    Csv,
}

impl TableFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "xlsx" | "xlsm" => Ok(TableFormat::Xlsx),
            "csv" | "txt" => Ok(TableFormat::Csv),
            "" => Err(TableError::UnsupportedFormat(format!(
                "{} has no extension",
                path.display()
            ))),
            other => Err(TableError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Xlsx => "xlsx",
            TableFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableFormat::Xlsx => write!(f, "XLSX"),
            TableFormat::Csv => write!(f, "CSV"),
        }
    }
}

/// In-memory table of string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Table with room for `rows` rows
    pub fn with_capacity(columns: Vec<String>, rows: usize) -> Self {
        Self {
            columns,
            rows: Vec::with_capacity(rows),
        }
    }

    /// Append a row. The row must have one cell per column.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cell at `row` in the named column
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }
}

/// Persists a table in one format
pub trait TableWriter {
    fn format(&self) -> TableFormat;

    fn write(&self, table: &Table, path: &Path) -> Result<(), TableError>;
}

/// Writer for `format`
pub fn writer_for(format: TableFormat) -> Box<dyn TableWriter> {
    match format {
        TableFormat::Xlsx => Box::new(XlsxWriter),
        TableFormat::Csv => Box::new(CsvWriter),
    }
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), TableError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| TableError::write(path, format!("Failed to create directory: {}", e)))?;
    }
    Ok(())
}

type RowIter = Box<dyn Iterator<Item = Result<Vec<String>, TableError>>>;

/// Header plus a lazily consumed sequence of data rows.
///
/// Rows are padded or truncated to the header width.
pub struct RowSource {
    headers: Vec<String>,
    rows: RowIter,
    len_hint: Option<usize>,
}

impl RowSource {
    pub(crate) fn new(headers: Vec<String>, rows: RowIter, len_hint: Option<usize>) -> Self {
        Self {
            headers,
            rows,
            len_hint,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Number of data rows, when the source knows it up front
    pub fn len_hint(&self) -> Option<usize> {
        self.len_hint
    }
}

impl Iterator for RowSource {
    type Item = Result<Vec<String>, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        let width = self.headers.len();
        self.rows.next().map(|row| {
            row.map(|mut cells| {
                cells.resize(width, String::new());
                cells
            })
        })
    }
}

impl std::fmt::Debug for RowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowSource")
            .field("headers", &self.headers)
            .field("len_hint", &self.len_hint)
            .finish_non_exhaustive()
    }
}

/// Open a tabular source.
///
/// CSV files are streamed. Anything else is read as an XLSX workbook, and if
/// that fails the file is retried as CSV before giving up.
pub fn open_source(path: &Path) -> Result<RowSource, TableError> {
    if !path.exists() {
        return Err(TableError::read(path, "file not found"));
    }

    if matches!(TableFormat::from_path(path), Ok(TableFormat::Csv)) {
        return delimited::open(path);
    }

    match xlsx::open(path) {
        Ok(source) => Ok(source),
        Err(xlsx_err) => {
            tracing::debug!("XLSX read failed ({}), retrying as CSV", xlsx_err);
            delimited::open(path).map_err(|csv_err| {
                TableError::read(
                    path,
                    format!("not readable as XLSX ({}) or CSV ({})", xlsx_err, csv_err),
                )
            })
        }
    }
}

/// Read a whole table into memory
pub fn read_table(path: &Path) -> Result<Table, TableError> {
    let source = open_source(path)?;
    let mut table = Table::with_capacity(source.headers().to_vec(), source.len_hint().unwrap_or(0));
    for row in source {
        table.push_row(row?)?;
    }
    Ok(table)
}
