//! mapsheet CLI - extracts puzzle maps from workbooks and uploads them as JSON

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use mapsheet::{
    BatchProcessor, BatchReport, Extractor, ExtractorBuilder, FormulaMode, HttpUploader,
    MetadataMode, Uploader, ValidationMode, Vocabulary, WriterUploader,
};

#[derive(Parser)]
#[command(name = "mapsheet")]
#[command(
    author,
    version,
    about = "Extract puzzle maps from Excel workbooks and upload them as JSON"
)]
struct Cli {
    /// Directory containing .xlsx/.xlsm workbooks (not searched recursively)
    dir: PathBuf,

    /// Which document set to build and upload
    #[arg(short, long, value_enum, default_value_t = Mode::Chapter)]
    mode: Mode,

    /// Base URL of the document store
    #[arg(long, env = "MAPSHEET_BASE_URL", required_unless_present = "dry_run")]
    base_url: Option<String>,

    /// Accept any grid value, including empty cells and unknown tokens
    #[arg(long)]
    lenient: bool,

    /// JSON array of accepted base tokens (replaces the built-in placeholder vocabulary)
    #[arg(long, value_name = "FILE")]
    vocabulary: Option<PathBuf>,

    /// Map size to use when A1 is empty (otherwise the sheet fails)
    #[arg(long, value_name = "N")]
    size_default: Option<i64>,

    /// Emit "=<formula>" for formula cells without a cached value
    #[arg(long)]
    formula_text: bool,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Print the documents to stdout instead of uploading
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Size, rotation count, map, blocked cells and sequence (chapters/<name>.json)
    Chapter,
    /// Size and map only (answers/<name>.json)
    Answer,
}

impl From<Mode> for MetadataMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Chapter => MetadataMode::Chapter,
            Mode::Answer => MetadataMode::Answer,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(report) if report.has_failures() => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<BatchReport> {
    let extractor = build_extractor(cli)?;

    if cli.dry_run {
        let uploader = WriterUploader::new(io::stdout().lock());
        return process(&cli.dir, extractor, uploader);
    }

    let Some(base_url) = cli.base_url.as_deref() else {
        bail!("--base-url (or MAPSHEET_BASE_URL) is required unless --dry-run is given");
    };
    let uploader = HttpUploader::with_timeout(base_url, Duration::from_secs(cli.timeout_secs))
        .context("Failed to set up uploader")?;
    process(&cli.dir, extractor, uploader)
}

fn build_extractor(cli: &Cli) -> Result<Extractor> {
    let mut builder = ExtractorBuilder::new().with_metadata_mode(cli.mode.into());

    if cli.lenient {
        builder = builder.with_validation(ValidationMode::Lenient);
    }
    if cli.formula_text {
        builder = builder.with_formula_mode(FormulaMode::Formula);
    }
    if let Some(size) = cli.size_default {
        builder = builder.with_size_default(size);
    }
    if let Some(path) = &cli.vocabulary {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary file {}", path.display()))?;
        let vocabulary = Vocabulary::from_json_str(&json)
            .with_context(|| format!("Invalid vocabulary file {}", path.display()))?;
        builder = builder.with_vocabulary(vocabulary);
    }

    builder.build().context("Invalid extractor configuration")
}

fn process<U: Uploader>(dir: &Path, extractor: Extractor, uploader: U) -> Result<BatchReport> {
    let mut batch = BatchProcessor::new(extractor, uploader);
    batch
        .process_directory(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))
}
