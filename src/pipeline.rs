//! Batch pipeline
//!
//! Streams records from a tabular source one at a time, runs the row processor
//! on each, and accumulates the output table. Persisting tries the requested
//! format once and falls back to CSV at most once.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::config::DEFAULT_TEXT_COLUMN;
use crate::discovery::{
    Discovery, DiscoveryError, DiscoveryReport, MAX_LISTED_FAILURES, UsableConverter,
};
use crate::mode::{Mode, ModeController};
use crate::row::{self, InputRecord, OutputRecord, RecordId};
use crate::table::{
    self, CsvWriter, RowSource, Table, TableError, TableFormat, TableWriter, writer_for,
};

/// File name prefix for dataset runs
pub const DATASET_PREFIX: &str = "enriched_prompts";

/// File name prefix for single-prompt runs
pub const SINGLE_PREFIX: &str = "prompt_variations";

/// Timestamp embedded in default file names (UTC)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const PREVIEW_CHARS: usize = 50;

/// Fatal pipeline conditions
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("Column '{column}' not found. Available: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },
    #[error("Failed to read input: {0}")]
    Source(#[from] TableError),
    #[error("Failed to assemble output row: {0}")]
    Assembly(TableError),
    #[error("Failed to write output ({primary}); CSV fallback also failed ({fallback})")]
    Persist { primary: String, fallback: String },
}

/// Per-run controls
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Column holding the prompt text
    pub text_column: String,
    /// Process at most this many rows; `None` or `Some(0)` means all
    pub max_rows: Option<usize>,
    /// Explicit output path, overriding the timestamped default
    pub output: Option<PathBuf>,
    /// Directory for default-named output
    pub output_dir: PathBuf,
    pub verbose: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            text_column: DEFAULT_TEXT_COLUMN.to_string(),
            max_rows: None,
            output: None,
            output_dir: PathBuf::from("."),
            verbose: false,
        }
    }
}

impl BatchOptions {
    fn row_limit(&self) -> Option<usize> {
        self.max_rows.filter(|&n| n > 0)
    }

    /// Output path for a run, defaulting to `<prefix>_<timestamp>.xlsx`
    pub fn output_path(&self, prefix: &str, now: DateTime<Utc>) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => default_output_path(&self.output_dir, prefix, now),
        }
    }
}

/// `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.xlsx`
pub fn default_output_path(dir: &Path, prefix: &str, now: DateTime<Utc>) -> PathBuf {
    dir.join(format!(
        "{}_{}.{}",
        prefix,
        now.format(TIMESTAMP_FORMAT),
        TableFormat::Xlsx.extension()
    ))
}

/// Where the fallback CSV goes when writing `path` fails
pub fn fallback_path(path: &Path) -> PathBuf {
    let is_csv = matches!(TableFormat::from_path(path), Ok(TableFormat::Csv));
    if is_csv {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        path.with_file_name(format!("{}.fallback.csv", stem))
    } else {
        path.with_extension("csv")
    }
}

/// Where and how the output was actually written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOutcome {
    pub path: PathBuf,
    pub format: TableFormat,
    pub fell_back: bool,
    /// Why the primary write failed, when it did
    pub primary_error: Option<String>,
}

/// Write `table` with `primary`, falling back to `fallback` exactly once
pub fn persist(
    table: &Table,
    path: &Path,
    primary: &dyn TableWriter,
    fallback: &dyn TableWriter,
) -> Result<PersistOutcome, PipelineError> {
    match primary.write(table, path) {
        Ok(()) => Ok(PersistOutcome {
            path: path.to_path_buf(),
            format: primary.format(),
            fell_back: false,
            primary_error: None,
        }),
        Err(e) => write_fallback(table, path, e, fallback),
    }
}

/// Write `table` in the format implied by `path`, with CSV as the fallback
pub fn persist_to(table: &Table, path: &Path) -> Result<PersistOutcome, PipelineError> {
    match TableFormat::from_path(path) {
        Ok(format) => persist(table, path, writer_for(format).as_ref(), &CsvWriter),
        Err(e) => write_fallback(table, path, e, &CsvWriter),
    }
}

fn write_fallback(
    table: &Table,
    path: &Path,
    primary_error: TableError,
    fallback: &dyn TableWriter,
) -> Result<PersistOutcome, PipelineError> {
    let alternate = fallback_path(path);
    tracing::warn!(
        "Writing {} failed ({}), falling back to {}",
        path.display(),
        primary_error,
        alternate.display()
    );

    match fallback.write(table, &alternate) {
        Ok(()) => Ok(PersistOutcome {
            path: alternate,
            format: fallback.format(),
            fell_back: true,
            primary_error: Some(primary_error.to_string()),
        }),
        Err(e) => Err(PipelineError::Persist {
            primary: primary_error.to_string(),
            fallback: e.to_string(),
        }),
    }
}

/// Aggregate counts for the terminal summary
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub usable_converters: usize,
    pub unusable_converters: usize,
    /// Usable converter identifiers, in column order
    pub converters: Vec<String>,
    pub rows_processed: usize,
    /// Rows whose text was blank; their converter cells are empty
    pub rows_skipped: usize,
    /// Rows that could not be decoded; kept as placeholder rows of error cells
    pub rows_unreadable: usize,
    pub cell_errors: usize,
    /// `(identifier, reason)` for every converter dropped by discovery
    pub failures: Vec<(String, String)>,
    pub output: Option<PersistOutcome>,
    pub duration: Duration,
    /// Mode the converters ran under
    pub mode: Mode,
}

impl RunReport {
    /// Start a report from discovery results
    pub fn new(report: &DiscoveryReport, usable: &[UsableConverter], mode: Mode) -> Self {
        Self {
            mode,
            usable_converters: report.usable_count(),
            unusable_converters: report.unusable_count(),
            converters: usable.iter().map(|c| c.identifier.clone()).collect(),
            failures: report.failures(),
            ..Default::default()
        }
    }

    pub fn record_row(&mut self, output: &OutputRecord) {
        self.rows_processed += 1;
        if output.skipped {
            self.rows_skipped += 1;
        }
        if output.unreadable {
            self.rows_unreadable += 1;
        }
        self.cell_errors += output.error_count();
    }

    /// Format duration as human-readable string
    pub fn duration_string(&self) -> String {
        let secs = self.duration.as_secs();
        if secs < 60 {
            format!("{}.{:01}s", secs, self.duration.subsec_millis() / 100)
        } else {
            format!("{}m {}s", secs / 60, secs % 60)
        }
    }

    /// Lines of the end-of-run summary. Failure reasons are listed only when `verbose`.
    pub fn summary_lines(&self, verbose: bool) -> Vec<String> {
        let rule = "=".repeat(80);
        let mut lines = vec![
            rule.clone(),
            "CONVERTER SUMMARY".to_string(),
            rule,
            format!("✅ Usable converters: {}", self.usable_converters),
            format!("❌ Unusable converters: {}", self.unusable_converters),
            format!(
                "📝 Rows processed: {} ({} blank, {} unreadable)",
                self.rows_processed, self.rows_skipped, self.rows_unreadable
            ),
            format!("⚠️  Cell errors: {}", self.cell_errors),
            format!("⏱️  Duration: {}", self.duration_string()),
        ];

        if let Some(output) = &self.output {
            if output.fell_back {
                lines.push(format!(
                    "💾 Saved to {} ({} fallback: {})",
                    output.path.display(),
                    output.format,
                    output.primary_error.as_deref().unwrap_or("unknown error")
                ));
            } else {
                lines.push(format!("💾 Saved to {}", output.path.display()));
            }
        }

        if !self.converters.is_empty() {
            lines.push(String::new());
            lines.push("Usable converters:".to_string());
            let mut names = self.converters.clone();
            names.sort();
            lines.extend(names.into_iter().map(|name| format!("  • {}", name)));
        }

        if verbose && !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failure details:".to_string());
            for (name, reason) in self.failures.iter().take(MAX_LISTED_FAILURES) {
                lines.push(format!("  ❌ {}: {}", name, reason));
            }
            if self.failures.len() > MAX_LISTED_FAILURES {
                lines.push(format!(
                    "  ... and {} more",
                    self.failures.len() - MAX_LISTED_FAILURES
                ));
            }
        }

        lines
    }
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

/// Applies a frozen converter set to datasets or single prompts
#[derive(Debug, Clone)]
pub struct Pipeline {
    usable: Vec<UsableConverter>,
    report: DiscoveryReport,
    mode: Mode,
}

impl Pipeline {
    pub fn new(discovery: Discovery, mode: &ModeController) -> Self {
        Self {
            usable: discovery.usable,
            report: discovery.report,
            mode: mode.mode(),
        }
    }

    pub fn converters(&self) -> &[UsableConverter] {
        &self.usable
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn converter_columns(&self) -> Vec<String> {
        self.usable.iter().map(UsableConverter::column_name).collect()
    }

    /// Indices of the source columns carried into the output. Source columns
    /// named like a converter output are replaced by that converter's column.
    fn kept_source_columns(&self, source_columns: &[String]) -> Vec<usize> {
        let outputs = self.converter_columns();
        source_columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !outputs.contains(name))
            .map(|(i, _)| i)
            .collect()
    }

    /// Source columns followed by one `<identifier>_output` column per converter
    pub fn output_columns(&self, source_columns: &[String]) -> Vec<String> {
        self.kept_source_columns(source_columns)
            .into_iter()
            .map(|i| source_columns[i].clone())
            .chain(self.converter_columns())
            .collect()
    }

    /// Run every row of `source` through the converters.
    ///
    /// A row that cannot be decoded becomes a placeholder row of error cells;
    /// only a failure of the source itself ends the run.
    pub fn process_source(
        &self,
        source: RowSource,
        options: &BatchOptions,
    ) -> Result<(Table, RunReport), PipelineError> {
        let start = Instant::now();
        let text_index = source
            .column_index(&options.text_column)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: options.text_column.clone(),
                available: source.headers().to_vec(),
            })?;

        let kept = self.kept_source_columns(source.headers());
        if kept.len() < source.headers().len() {
            tracing::warn!(
                "Replacing {} existing output column(s) in the input",
                source.headers().len() - kept.len()
            );
        }

        let limit = options.row_limit();
        let expected = source
            .len_hint()
            .map(|n| limit.map_or(n, |max| n.min(max)));

        tracing::info!(
            "📝 Processing {} rows with {} converters",
            expected.map_or_else(|| "all".to_string(), |n| n.to_string()),
            self.usable.len()
        );

        let mut table = Table::with_capacity(
            self.output_columns(source.headers()),
            expected.unwrap_or(0),
        );
        let mut report = RunReport::new(&self.report, &self.usable, self.mode);

        for (index, row) in source.take(limit.unwrap_or(usize::MAX)).enumerate() {
            let id = RecordId::Row(index);
            let output = match row {
                Ok(fields) => {
                    let record = InputRecord {
                        id,
                        source_text: fields.get(text_index).cloned().unwrap_or_default(),
                        fields: kept
                            .iter()
                            .map(|&i| fields.get(i).cloned().unwrap_or_default())
                            .collect(),
                    };

                    tracing::info!(
                        "🔄 Processing row {}{}: {}",
                        index + 1,
                        expected.map(|n| format!("/{}", n)).unwrap_or_default(),
                        preview(&record.source_text)
                    );
                    row::apply(&record, &self.usable, self.mode)
                }
                Err(TableError::Record { message }) => {
                    tracing::warn!("  ⚠️  Unreadable {}: {}", id, message);
                    row::unreadable(id, kept.len(), &self.usable, &message)
                }
                Err(e) => return Err(e.into()),
            };

            report.record_row(&output);
            table
                .push_row(output.cells())
                .map_err(PipelineError::Assembly)?;
        }

        report.duration = start.elapsed();
        Ok((table, report))
    }

    /// Read `input` and process it without writing anything
    pub fn process_dataset(
        &self,
        input: &Path,
        options: &BatchOptions,
    ) -> Result<(Table, RunReport), PipelineError> {
        tracing::info!("📊 Processing file: {}", input.display());
        let source = table::open_source(input)?;
        self.process_source(source, options)
    }

    /// Process one ad-hoc prompt into a single-row table
    pub fn process_single(&self, text: &str, options: &BatchOptions) -> (Table, RunReport) {
        let start = Instant::now();
        tracing::info!("🎯 Processing prompt: {}", preview(text));

        let source_columns = std::slice::from_ref(&options.text_column);
        let mut record = InputRecord::ad_hoc(text);
        if self.kept_source_columns(source_columns).is_empty() {
            record.fields.clear();
        }
        let output = row::apply(&record, &self.usable, self.mode);

        let mut report = RunReport::new(&self.report, &self.usable, self.mode);
        report.record_row(&output);

        let columns = self.output_columns(source_columns);
        let table = Table {
            columns,
            rows: vec![output.cells()],
        };

        report.duration = start.elapsed();
        (table, report)
    }

    /// Process a dataset file and persist the enriched table
    pub fn run_dataset(
        &self,
        input: &Path,
        options: &BatchOptions,
    ) -> Result<(Table, RunReport), PipelineError> {
        let (table, mut report) = self.process_dataset(input, options)?;
        let path = options.output_path(DATASET_PREFIX, Utc::now());
        let outcome = persist_to(&table, &path)?;
        tracing::info!(
            "💾 Saved enriched data to {} ({} → {} columns)",
            outcome.path.display(),
            table.column_count() - self.usable.len(),
            table.column_count()
        );
        report.output = Some(outcome);
        Ok((table, report))
    }

    /// Process a single prompt and persist the one-row table
    pub fn run_single(
        &self,
        text: &str,
        options: &BatchOptions,
    ) -> Result<(Table, RunReport), PipelineError> {
        let (table, mut report) = self.process_single(text, options);
        let path = options.output_path(SINGLE_PREFIX, Utc::now());
        report.output = Some(persist_to(&table, &path)?);
        Ok((table, report))
    }
}
