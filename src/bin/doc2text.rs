//! CLI binary for edgequake-doc2text.
//!
//! `doc2text serve` runs the HTTP service; `doc2text extract` runs the same
//! pipeline once over a local file or URL and prints the text.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_doc2text::api::{self, ApiSizeLimits};
use edgequake_doc2text::{
    DocumentExtractor, ExtractionConfig, InputReference, OutputFormat, PageSeparator,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service
  doc2text serve --port 8000

  # Extract a local file to stdout
  doc2text extract report.pdf

  # Extract a remote document, JSON output with stats
  doc2text extract https://example.com/scan.png --json

  # Plain text instead of Markdown for office documents
  doc2text extract memo.docx --format plain -o memo.txt

SUPPORTED FORMATS:
  .pdf                    pdfium text layer
  .jpg .jpeg .png         tesseract OCR
  .docx .odt .rtf .epub   pandoc conversion
  .html .htm .md .rst
  .tex .org .ipynb .csv
  .tsv .pptx .xlsx

ENVIRONMENT VARIABLES:
  DOC2TEXT_SCRATCH_DIR          Writable directory for per-request temp files
  DOC2TEXT_DOWNLOAD_TIMEOUT     Remote fetch timeout in seconds (default 30)
  DOC2TEXT_EXTRACTION_TIMEOUT   Extraction timeout in seconds (default none)
  DOC2TEXT_OCR_LANGUAGE         Tesseract language(s), e.g. eng+deu
  DOC2TEXT_TESSERACT            tesseract executable
  DOC2TEXT_PANDOC               pandoc executable
  DOC2TEXT_DISABLE_CONVERSION   Disable the pandoc engine
  DOC2TEXT_MAX_UPLOAD_BYTES     Request body limit for `serve` (default 100 MiB)
  PDFIUM_LIB_PATH               libpdfium file or directory
"#;

#[derive(Parser, Debug)]
#[command(
    name = "doc2text",
    version,
    about = "Extract text from PDFs, images and office documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug logging.
    #[arg(short, long, global = true, env = "DOC2TEXT_VERBOSE")]
    verbose: bool,

    /// Errors only; no spinner or summary.
    #[arg(short, long, global = true, env = "DOC2TEXT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP extraction service.
    Serve {
        #[arg(long, env = "DOC2TEXT_HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, env = "DOC2TEXT_PORT", default_value_t = 8000)]
        port: u16,

        /// Maximum request body in bytes.
        #[arg(long, env = "DOC2TEXT_MAX_UPLOAD_BYTES", default_value_t = 100 * 1024 * 1024)]
        max_upload_bytes: usize,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Extract one document and print its text.
    Extract {
        /// Local file path or http(s) URL.
        input: String,

        /// Write the text to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full result (text, strategy, warnings, stats) as JSON.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args, Debug)]
struct EngineArgs {
    #[arg(long, env = "DOC2TEXT_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    #[arg(long, env = "DOC2TEXT_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    #[arg(long, env = "DOC2TEXT_EXTRACTION_TIMEOUT")]
    extraction_timeout: Option<u64>,

    #[arg(long, env = "DOC2TEXT_OCR_LANGUAGE", default_value = "eng")]
    ocr_language: String,

    #[arg(long, env = "DOC2TEXT_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    #[arg(long, env = "DOC2TEXT_PANDOC", default_value = "pandoc")]
    pandoc: PathBuf,

    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Reject office/markup formats instead of converting them.
    #[arg(long, env = "DOC2TEXT_DISABLE_CONVERSION")]
    no_conversion: bool,

    #[arg(long, value_enum, default_value = "markdown")]
    format: FormatArg,

    /// Between PDF pages: none, newline, formfeed, or any literal string.
    #[arg(long, env = "DOC2TEXT_PAGE_SEPARATOR", default_value = "none")]
    separator: String,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Markdown,
    Plain,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Plain => OutputFormat::PlainText,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner is the feedback for `extract`; keep library logs quiet
    // unless asked for.
    let is_extract = matches!(cli.command, Command::Extract { .. });
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || is_extract {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            host,
            port,
            max_upload_bytes,
            engine,
        } => {
            let config = build_config(&engine)?;
            api::serve_with_limits(&host, port, config, ApiSizeLimits::new(max_upload_bytes))
                .await
                .context("API server failed")?;
        }
        Command::Extract {
            input,
            output,
            json,
            engine,
        } => {
            let show_progress = !cli.quiet && !json;
            run_extract(&input, output.as_deref(), json, show_progress, &engine).await?;
        }
    }

    Ok(())
}

async fn run_extract(
    input: &str,
    output_path: Option<&Path>,
    json: bool,
    show_progress: bool,
    engine: &EngineArgs,
) -> Result<()> {
    let config = build_config(engine)?;
    let extractor = DocumentExtractor::new(config).context("Failed to initialise extractor")?;
    let reference = input_reference(input).await?;

    let spinner = show_progress.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Extracting");
        bar.set_message(input.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = extractor.extract(reference).await;
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let out = result.with_context(|| format!("Extraction failed for {input}"))?;

    if json {
        let rendered = serde_json::to_string_pretty(&out).context("Failed to serialise output")?;
        println!("{rendered}");
    } else if let Some(path) = output_path {
        tokio::fs::write(path, &out.text)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(out.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !out.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if show_progress {
        for warning in &out.warnings {
            eprintln!("  {} {}", yellow("⚠"), warning);
        }
        eprintln!(
            "{} {} via {}  {}",
            green("✔"),
            out.filename,
            out.strategy,
            dim(&format!(
                "{} chars, {}ms",
                out.stats.output_chars, out.stats.total_duration_ms
            )),
        );
    }
    Ok(())
}

/// URLs are fetched by the pipeline; anything else is read from disk.
async fn input_reference(input: &str) -> Result<InputReference> {
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(InputReference::url(input));
    }

    let path = Path::new(input);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string());
    Ok(InputReference::upload(filename, bytes))
}

fn build_config(engine: &EngineArgs) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .download_timeout_secs(engine.download_timeout)
        .ocr_language(engine.ocr_language.clone())
        .tesseract_path(engine.tesseract.clone())
        .pandoc_path(engine.pandoc.clone())
        .enable_conversion(!engine.no_conversion)
        .output_format(engine.format.clone().into())
        .page_separator(parse_separator(&engine.separator));

    if let Some(ref dir) = engine.scratch_dir {
        builder = builder.scratch_dir(dir.clone());
    }
    if let Some(secs) = engine.extraction_timeout {
        builder = builder.extraction_timeout_secs(secs);
    }
    if let Some(ref lib) = engine.pdfium_lib {
        builder = builder.pdfium_library_path(lib.clone());
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "none" | "" => PageSeparator::None,
        "newline" | "nl" => PageSeparator::Newline,
        "formfeed" | "ff" => PageSeparator::FormFeed,
        _ => PageSeparator::Custom(s.to_string()),
    }
}
