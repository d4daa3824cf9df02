//! CLI binary entry point for prompt-enricher

#[cfg(feature = "cli")]
use anyhow::Context;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use prompt_enricher::cli::commands::list::handle_list;
#[cfg(feature = "cli")]
use prompt_enricher::cli::commands::run::{RunArgs, handle_run};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "prompt-enricher")]
#[command(about = "Apply every usable prompt converter to a dataset or a single prompt")]
#[command(version)]
struct Cli {
    /// Input dataset (.xlsx or .csv)
    #[arg(required_unless_present_any = ["prompt", "list"])]
    input: Option<PathBuf>,
    /// Output file (default: timestamped .xlsx in the configured output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Enrich a single prompt instead of a dataset
    #[arg(short, long)]
    prompt: Option<String>,
    /// Column holding the prompt text (default: "prompt")
    #[arg(short = 'c', long = "column")]
    column: Option<String>,
    /// Process at most this many rows (0 means all)
    #[arg(short, long)]
    max_rows: Option<usize>,
    /// Debug logging and failure details in the summary
    #[arg(short, long)]
    verbose: bool,
    /// Config file (default: ./.prompt-enricher.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Probe converters and print their status without processing anything
    #[arg(long)]
    list: bool,
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    let default = if verbose {
        "prompt_enricher=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.list {
        handle_list(cli.config.as_deref(), cli.verbose).context("converter listing failed")?;
        return Ok(());
    }

    let args = RunArgs {
        input: cli.input,
        output: cli.output,
        prompt: cli.prompt,
        text_column: cli.column,
        max_rows: cli.max_rows,
        verbose: cli.verbose,
        config: cli.config,
    };
    handle_run(&args).context("enrichment run failed")?;
    Ok(())
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
