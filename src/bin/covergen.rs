//! CLI binary for covergen.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `CoverLetterConfig`, prints the letter and reports where it was saved.

use anyhow::{Context, Result};
use clap::Parser;
use covergen::{
    generate_letter, write_outputs, CoverLetterConfig, GenerationMode, DEFAULT_MODEL,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Inline job description, PDF into ./cover_letters/
  covergen -j "Software Engineer at Acme Corp, Austin"

  # Job description from a file, also keep a .txt next to the PDF
  covergen -j postings/acme.txt --text

  # Explicit output paths
  covergen -j postings/acme.txt --pdf-out out/acme.pdf --text-out out/acme.txt

  # Text only, schema-constrained generation
  covergen -j postings/acme.txt --skip-pdf --text --mode structured

MATERIALS (default directory: ./materials):
  summary.txt            Candidate summary used to ground the letter
  sample_letter.txt      Style reference
  prompt_template.txt    Optional prompt override; must contain {job_description},
                         {summary} and {sample_letter}

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (required for --mode structured)
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID (together with EDGEQUAKE_LLM_PROVIDER)
  OPENAI_BASE_URL         OpenAI-compatible base URL for --mode structured
  RUST_LOG                Override the log filter

  A .env file in the working directory is loaded before flags are parsed.
"#;

/// Generate a tailored cover letter PDF from a job description.
#[derive(Parser, Debug)]
#[command(
    name = "covergen",
    version,
    about = "Generate a tailored cover letter PDF from a job description",
    long_about = "Generate a tailored cover letter from a job description with a single LLM call. \
The letter is grounded in a candidate summary and a sample letter, printed to stdout and saved \
as a formatted PDF (and optionally plain text).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Job description text, or a path to a file containing it.
    #[arg(short, long, env = "COVERGEN_JOB_DESCRIPTION")]
    job_description: String,

    /// LLM model ID.
    #[arg(long, env = "COVERGEN_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider for unstructured mode. Auto-detected from API key env vars if not set."
    )]
    provider: Option<String>,

    /// Generation strategy.
    #[arg(long, env = "COVERGEN_MODE", value_enum, default_value = "unstructured")]
    mode: ModeArg,

    /// Directory holding summary.txt, sample_letter.txt and prompt_template.txt.
    #[arg(long, env = "COVERGEN_MATERIALS_DIR", default_value = "materials")]
    materials_dir: PathBuf,

    /// Candidate summary file (overrides the materials directory).
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Sample letter file (overrides the materials directory).
    #[arg(long)]
    sample_letter: Option<PathBuf>,

    /// Prompt template file.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Directory for outputs when no explicit path is given.
    #[arg(long, env = "COVERGEN_OUTPUT_DIR", default_value = "cover_letters")]
    output_dir: PathBuf,

    /// Write the PDF to this path.
    #[arg(long, conflicts_with = "skip_pdf")]
    pdf_out: Option<PathBuf>,

    /// Write the raw letter text to this path.
    #[arg(long)]
    text_out: Option<PathBuf>,

    /// Also write a .txt next to the PDF.
    #[arg(long)]
    text: bool,

    /// Do not write a PDF.
    #[arg(long)]
    skip_pdf: bool,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "COVERGEN_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "COVERGEN_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// LLM call timeout in seconds.
    #[arg(long, env = "COVERGEN_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Base URL of the OpenAI-compatible API (structured mode).
    #[arg(long, env = "OPENAI_BASE_URL")]
    api_base: Option<String>,

    /// Disable the spinner.
    #[arg(long, env = "COVERGEN_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "COVERGEN_VERBOSE")]
    verbose: bool,

    /// Only print the letter and warnings/errors.
    #[arg(short, long, env = "COVERGEN_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ModeArg {
    Unstructured,
    Structured,
}

impl From<ModeArg> for GenerationMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Unstructured => GenerationMode::Unstructured,
            ModeArg::Structured => GenerationMode::Structured,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO-level progress logs.
    let show_progress =
        !cli.quiet && !cli.verbose && !cli.no_progress && io::stderr().is_terminal();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    // ── Generate ─────────────────────────────────────────────────────────
    let spinner = show_progress.then(|| spinner(&cli.model));
    let start = Instant::now();
    let result = generate_letter(&cli.job_description, &config).await;
    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }
    let letter = match result {
        Ok(letter) => letter,
        Err(e) => {
            let kind = e.kind();
            if show_progress {
                eprintln!("{} generation failed", red("✘"));
            }
            return Err(e).context(format!("Cover letter generation failed ({kind} error)"));
        }
    };

    // The letter reaches stdout before any file is written.
    {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(letter.letter().as_bytes())
            .context("Failed to write to stdout")?;
        if !letter.letter().ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        handle.flush().ok();
    }

    // ── Write outputs ────────────────────────────────────────────────────
    let artifacts = write_outputs(&letter, &config).context("Failed to save cover letter")?;

    if !cli.quiet {
        eprintln!(
            "{} {}  {}  {}",
            green("✔"),
            bold(letter.filename()),
            dim(&format!("{} words", letter.word_count())),
            dim(&format!("{:.1}s", start.elapsed().as_secs_f64())),
        );
        if let Some(ref path) = artifacts.pdf_path {
            eprintln!(
                "   PDF   →  {}  {}",
                bold(&path.display().to_string()),
                dim(&format!("{} page(s)", artifacts.page_count)),
            );
        }
        if let Some(ref path) = artifacts.text_path {
            eprintln!("   Text  →  {}", bold(&path.display().to_string()));
        }
    }

    Ok(())
}

/// Spinner shown while the LLM call is in flight.
fn spinner(model: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Generating");
    bar.set_message(format!("waiting for {model}…"));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Map CLI args to `CoverLetterConfig`.
fn build_config(cli: &Cli) -> Result<CoverLetterConfig> {
    let mut builder = CoverLetterConfig::builder()
        .model(&cli.model)
        .mode(cli.mode.clone().into())
        .materials_dir(&cli.materials_dir)
        .output_dir(&cli.output_dir)
        .write_text(cli.text)
        .skip_pdf(cli.skip_pdf)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref name) = cli.provider {
        builder = builder.provider_name(name);
    }
    if let Some(ref url) = cli.api_base {
        builder = builder.api_base(url);
    }
    if let Some(ref path) = cli.summary {
        builder = builder.summary_path(path);
    }
    if let Some(ref path) = cli.sample_letter {
        builder = builder.sample_letter_path(path);
    }
    if let Some(ref path) = cli.template {
        builder = builder.template_path(path);
    }
    if let Some(ref path) = cli.pdf_out {
        builder = builder.pdf_path(path);
    }
    if let Some(ref path) = cli.text_out {
        builder = builder.text_path(path);
    }

    builder.build().context("Invalid configuration")
}
