//! Run command tests

use std::path::PathBuf;

use prompt_enricher::cli::commands::run::{RunArgs, handle_run, run_with};
use prompt_enricher::cli::error::CliError;
use prompt_enricher::config::EnricherConfig;
use prompt_enricher::converter::builtin::{Base64Converter, CaesarConverter};
use prompt_enricher::table::read_table;
use prompt_enricher::{
    ConversionError, Converter, ConverterDescriptor, DiscoveryError, Mode, ModeController,
    PipelineError, Registry,
};
use tempfile::TempDir;

struct Blank;

impl Converter for Blank {
    fn transform(&self, _text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(String::new())
    }
}

fn blank() -> Result<Box<dyn Converter>, ConversionError> {
    Ok(Box::new(Blank))
}

fn base64() -> Result<Box<dyn Converter>, ConversionError> {
    Ok(Box::new(Base64Converter))
}

fn caesar() -> Result<Box<dyn Converter>, ConversionError> {
    Ok(Box::new(CaesarConverter::new(13)?))
}

fn registry(descriptors: &[ConverterDescriptor]) -> Registry {
    let mut registry = Registry::new();
    for descriptor in descriptors {
        registry.register(*descriptor).unwrap();
    }
    registry
}

fn batch_mode() -> ModeController {
    ModeController::fixed(Mode::NonInteractive)
}

#[test]
fn test_cli_run_dataset() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("prompts.csv");
    let output = dir.path().join("enriched.xlsx");
    std::fs::write(&input, "prompt\ntest\nhello\n").unwrap();

    let args = RunArgs {
        input: Some(input),
        output: Some(output.clone()),
        ..Default::default()
    };
    let report = run_with(
        &args,
        &EnricherConfig::default(),
        &registry(&[
            ConverterDescriptor::new("Base64", base64),
            ConverterDescriptor::new("Caesar", caesar),
        ]),
        &batch_mode(),
    )
    .unwrap();

    assert_eq!(report.rows_processed, 2);
    let table = read_table(&output).unwrap();
    assert_eq!(table.columns, vec!["prompt", "Base64_output", "Caesar_output"]);
    assert_eq!(table.cell(1, "Caesar_output"), Some("uryyb"));
}

#[test]
fn test_cli_run_uses_configured_column() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("prompts.csv");
    let output = dir.path().join("enriched.csv");
    std::fs::write(&input, "text\ntest\n").unwrap();

    let mut config = EnricherConfig::default();
    config.batch.text_column = "text".to_string();

    let args = RunArgs {
        input: Some(input),
        output: Some(output.clone()),
        ..Default::default()
    };
    run_with(
        &args,
        &config,
        &registry(&[ConverterDescriptor::new("Base64", base64)]),
        &batch_mode(),
    )
    .unwrap();

    let table = read_table(&output).unwrap();
    assert_eq!(table.cell(0, "Base64_output"), Some("dGVzdA=="));
}

#[test]
fn test_cli_no_usable_converters_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("prompts.csv");
    std::fs::write(&input, "prompt\ntest\n").unwrap();

    let mut config = EnricherConfig::default();
    config.batch.output_dir = dir.path().join("out");

    let args = RunArgs {
        input: Some(input),
        ..Default::default()
    };
    let result = run_with(
        &args,
        &config,
        &registry(&[ConverterDescriptor::new("Blank", blank)]),
        &batch_mode(),
    );

    assert!(matches!(
        result,
        Err(CliError::Discovery(DiscoveryError::NoUsableConverters { .. }))
    ));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_cli_missing_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("prompts.csv");
    let output = dir.path().join("out.csv");
    std::fs::write(&input, "question\nwhy\n").unwrap();

    let args = RunArgs {
        input: Some(input),
        output: Some(output.clone()),
        ..Default::default()
    };
    let result = run_with(
        &args,
        &EnricherConfig::default(),
        &registry(&[ConverterDescriptor::new("Base64", base64)]),
        &batch_mode(),
    );

    assert!(matches!(
        result,
        Err(CliError::Pipeline(PipelineError::MissingColumn { .. }))
    ));
    assert!(!output.exists());
}

#[test]
fn test_cli_missing_input_file() {
    let args = RunArgs {
        input: Some(PathBuf::from("/no/such/prompts.xlsx")),
        ..Default::default()
    };
    let result = run_with(
        &args,
        &EnricherConfig::default(),
        &registry(&[ConverterDescriptor::new("Base64", base64)]),
        &batch_mode(),
    );

    assert!(matches!(result, Err(CliError::FileNotFound(_))));
}

#[test]
fn test_cli_single_prompt_with_builtin_catalog() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("single.csv");

    let args = RunArgs {
        prompt: Some("hello".to_string()),
        output: Some(output.clone()),
        ..Default::default()
    };
    let report = run_with(
        &args,
        &EnricherConfig::default(),
        &Registry::builtin(),
        &batch_mode(),
    )
    .unwrap();

    assert_eq!(report.rows_processed, 1);
    assert!(report.unusable_converters >= 2);
    let table = read_table(&output).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.cell(0, "HumanInTheLoop_output"), Some("hello"));
    assert!(table.column_index("Tone_output").is_none());
}

#[test]
fn test_cli_dataset_run_never_asks_a_human() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("prompts.csv");
    let output = dir.path().join("enriched.csv");
    let config = dir.path().join("enricher.toml");
    std::fs::write(&input, "prompt\nhello\nworld\n").unwrap();
    std::fs::write(
        &config,
        "[discovery]\ndisabled = [\"Tense\", \"Tone\"]\n",
    )
    .unwrap();

    assert_eq!(ModeController::detect().mode(), Mode::NonInteractive);

    let args = RunArgs {
        input: Some(input),
        output: Some(output.clone()),
        config: Some(config),
        ..Default::default()
    };
    let report = handle_run(&args).unwrap();

    assert_eq!(report.mode, Mode::NonInteractive);
    assert_eq!(report.rows_processed, 2);
    let table = read_table(&output).unwrap();
    assert_eq!(table.cell(0, "HumanInTheLoop_output"), Some("hello"));
    assert_eq!(table.cell(1, "HumanInTheLoop_output"), Some("world"));
}
