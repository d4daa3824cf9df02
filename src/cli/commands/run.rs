//! Enrich command implementation

use std::path::PathBuf;

use crate::cli::commands::{configured_registry, load_config};
use crate::cli::error::CliError;
use crate::config::EnricherConfig;
use crate::discovery::discover;
use crate::mode::ModeController;
use crate::pipeline::{BatchOptions, Pipeline, RunReport};
use crate::registry::Registry;
use crate::row::ERROR_PREFIX;
use crate::table::Table;

const RESULT_WIDTH: usize = 60;

/// Arguments for an enrichment run
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Dataset to enrich (CSV or XLSX)
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Single prompt; takes precedence over `input`
    pub prompt: Option<String>,
    pub text_column: Option<String>,
    pub max_rows: Option<usize>,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

/// What a run operates on
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Dataset(PathBuf),
    Single(String),
}

impl RunArgs {
    fn target(&self) -> Result<Target, CliError> {
        match (&self.prompt, &self.input) {
            (Some(prompt), _) => Ok(Target::Single(prompt.clone())),
            (None, Some(input)) => {
                if !input.exists() {
                    return Err(CliError::FileNotFound(input.clone()));
                }
                Ok(Target::Dataset(input.clone()))
            }
            (None, None) => Err(CliError::InvalidArgument(
                "either an input file or --prompt is required".to_string(),
            )),
        }
    }

    fn batch_options(&self, config: &EnricherConfig) -> BatchOptions {
        BatchOptions {
            text_column: self
                .text_column
                .clone()
                .unwrap_or_else(|| config.batch.text_column.clone()),
            max_rows: self.max_rows,
            output: self.output.clone(),
            output_dir: config.batch.output_dir.clone(),
            verbose: self.verbose,
        }
    }
}

/// Handle the default command: discover converters, enrich, persist, summarise
pub fn handle_run(args: &RunArgs) -> Result<RunReport, CliError> {
    let config = load_config(args.config.as_deref())?;
    let registry = configured_registry(&config);
    let mode = ModeController::detect();
    run_with(args, &config, &registry, &mode)
}

/// Run against an explicit config, registry and mode
pub fn run_with(
    args: &RunArgs,
    config: &EnricherConfig,
    registry: &Registry,
    mode: &ModeController,
) -> Result<RunReport, CliError> {
    let target = args.target()?;
    let options = args.batch_options(config);

    tracing::info!("🔍 Discovering converters ({} known, {} mode)", registry.len(), mode.mode());
    let discovery = discover(registry, &config.discovery_config(args.verbose))?;
    let pipeline = Pipeline::new(discovery, mode);

    let report = match target {
        Target::Dataset(input) => {
            let (_, report) = pipeline.run_dataset(&input, &options)?;
            report
        }
        Target::Single(prompt) => {
            let (table, report) = pipeline.run_single(&prompt, &options)?;
            for line in result_lines(&table, &report) {
                println!("{}", line);
            }
            report
        }
    };

    for line in report.summary_lines(args.verbose) {
        println!("{}", line);
    }
    Ok(report)
}

/// Per-converter results of a single-prompt run
pub fn result_lines(table: &Table, report: &RunReport) -> Vec<String> {
    let rule = "=".repeat(80);
    let mut lines = vec![rule.clone(), "RESULTS SUMMARY".to_string(), rule];

    let Some(row) = table.rows.first() else {
        return lines;
    };
    let source_width = table.column_count() - report.converters.len();

    for (name, cell) in report.converters.iter().zip(row.iter().skip(source_width)) {
        let status = if cell.starts_with(ERROR_PREFIX) {
            "❌"
        } else {
            "✅"
        };
        lines.push(format!("{} {:<20} {}", status, name, truncate(cell)));
    }
    lines
}

fn truncate(text: &str) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= RESULT_WIDTH {
        return single_line;
    }
    let mut short: String = single_line.chars().take(RESULT_WIDTH).collect();
    short.push_str("...");
    short
}
