//! # covergen
//!
//! Generate a tailored cover letter from a job description with a single LLM
//! call, then save it as a formatted PDF and, optionally, plain text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! job description (text or path)
//!  │
//!  ├─ 1. Input     resolve the description, load summary + sample letter
//!  ├─ 2. Prompt    interpolate both into the instruction template
//!  ├─ 3. LLM       one chat completion (plain JSON or schema-constrained)
//!  ├─ 4. Validate  strict (filename, letter) parsing and safety rules
//!  └─ 5. Output    paginated Times-Roman PDF + optional .txt
//! ```
//!
//! Every step is fatal on failure: there are no retries and no partial
//! outputs. Errors carry an [`ErrorKind`] (configuration, transport, format,
//! validation, output) so callers can report them uniformly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covergen::{generate_to_files, CoverLetterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = CoverLetterConfig::builder()
//!         .materials_dir("materials")
//!         .output_dir("cover_letters")
//!         .build()?;
//!     let (letter, artifacts) =
//!         generate_to_files("Software Engineer at Acme Corp, Austin", &config).await?;
//!     println!("{}", letter.letter());
//!     eprintln!("saved {:?}", artifacts.pdf_path);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `covergen` binary (clap + anyhow + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    CoverLetterConfig, CoverLetterConfigBuilder, GenerationMode, PageSetup, DEFAULT_MODEL,
};
pub use error::{CoverLetterError, ErrorKind};
pub use generate::{generate_letter, generate_sync, generate_to_files, write_outputs};
pub use output::{CoverLetter, OutputArtifacts};
