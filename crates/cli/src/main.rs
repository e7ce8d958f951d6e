//! `docshift` command line.
//!
//! One-shot mode converts `INPUT` with `--kind` and exits non-zero on failure.
//! When either is missing and stdin is a terminal, the user is prompted and
//! can keep converting files until they decline.

mod interactive;

use anyhow::{bail, Context, Result};
use clap::Parser;
use docshift_core::{
    ConversionKind, ConversionRequest, ConversionResult, Dispatcher, DispatcherBuilder,
    DispatcherConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "docshift",
    version,
    about = "Convert between images, PDF, Word and Excel documents",
    after_help = "Kinds: image-to-pdf, pdf-to-images, pdf-to-excel, pdf-to-word, word-to-pdf, excel-to-pdf"
)]
struct Cli {
    /// File to convert. Prompted for when omitted in a terminal.
    input: Option<PathBuf>,

    /// Conversion to run, e.g. `pdf-to-word`. Prompted for when omitted in a terminal.
    #[arg(short, long)]
    kind: Option<ConversionKind>,

    /// Output file, or an existing directory to place the suggested filename in.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the soffice binary.
    #[arg(long)]
    soffice: Option<PathBuf>,

    /// Directory containing the pdfium shared library.
    #[arg(long)]
    pdfium_lib: Option<PathBuf>,

    /// Office-suite timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Rendering DPI for PDF to images (1-1200).
    #[arg(long)]
    dpi: Option<u32>,

    /// List conversions and whether they can run on this machine.
    #[arg(long)]
    list: bool,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let dispatcher = build_dispatcher(&cli)?;

    if cli.list {
        print_kinds(&dispatcher);
        return Ok(ExitCode::SUCCESS);
    }

    match (cli.input.clone(), cli.kind) {
        (Some(input), Some(kind)) => {
            match convert_file(&dispatcher, kind, &input, cli.output.as_deref()).await {
                Ok(_) => Ok(ExitCode::SUCCESS),
                Err(e) => {
                    report_failure(&e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        _ if io::stdin().is_terminal() => {
            interactive::session(&dispatcher, &cli).await?;
            Ok(ExitCode::SUCCESS)
        }
        _ => bail!("INPUT and --kind are required when not running in a terminal"),
    }
}

fn build_dispatcher(cli: &Cli) -> Result<Dispatcher> {
    let config = match &cli.config {
        Some(path) => DispatcherConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DispatcherConfig::default(),
    };

    let mut builder = DispatcherBuilder::new().config(config);
    if let Some(path) = &cli.soffice {
        builder = builder.soffice_path(path.clone());
    }
    if let Some(path) = &cli.pdfium_lib {
        builder = builder.pdfium_library_path(path.clone());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.conversion_timeout(Duration::from_secs(secs));
    }
    if let Some(dpi) = cli.dpi {
        builder = builder.dpi(dpi);
    }

    builder.build().context("failed to start the conversion dispatcher")
}

fn print_kinds(dispatcher: &Dispatcher) {
    for entry in dispatcher.availability() {
        match entry.reason {
            None => println!("  {:<14} {}", entry.kind.slug(), entry.kind.label()),
            Some(reason) => println!(
                "  {:<14} {} (unavailable: {})",
                entry.kind.slug(),
                entry.kind.label(),
                reason
            ),
        }
    }
}

/// Convert `input` and write the result; returns where it was saved.
async fn convert_file(
    dispatcher: &Dispatcher,
    kind: ConversionKind,
    input: &Path,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let request = ConversionRequest::from_path(kind, input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let result = convert_with_spinner(dispatcher, &request).await?;

    let destination = resolve_output(output, result.suggested_filename());
    save(&result, &destination)?;
    Ok(destination)
}

async fn convert_with_spinner(
    dispatcher: &Dispatcher,
    request: &ConversionRequest,
) -> Result<ConversionResult> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "{}: {}",
        request.kind().label(),
        request.input_name()
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = dispatcher.convert(request).await;
    spinner.finish_and_clear();
    Ok(result?)
}

/// Where to write a result: the given file, the suggested name inside the
/// given directory, or the suggested name in the working directory.
fn resolve_output(output: Option<&Path>, suggested: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(suggested),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(suggested),
    }
}

fn save(result: &ConversionResult, destination: &Path) -> Result<()> {
    std::fs::write(destination, result.output_bytes())
        .with_context(|| format!("failed to write {}", destination.display()))?;
    debug!("Wrote {:?}", destination);
    println!(
        "Saved {} ({}, {} bytes, {:.2?})",
        destination.display(),
        result.mime_type(),
        result.output_bytes().len(),
        result.duration()
    );
    Ok(())
}

fn report_failure(error: &anyhow::Error) {
    match error.downcast_ref::<docshift_core::ConversionError>() {
        Some(e) => eprintln!("Conversion failed [{}]: {}", e.kind(), e),
        None => eprintln!("Conversion failed: {:#}", error),
    }
}
