//! Error types for the covergen library.
//!
//! Every failure in the pipeline is fatal to the run, so a single enum,
//! [`CoverLetterError`], covers all of them. Variants are grouped by the
//! stage that raises them and [`CoverLetterError::kind`] reports that group
//! as an [`ErrorKind`]:
//!
//! * **Configuration**: missing or empty input files, malformed templates.
//! * **Transport**: the LLM call failed, was refused, or timed out.
//! * **Format**: the model answered, but not with the expected JSON shape.
//! * **Validation**: the JSON was well-formed but the filename or letter
//!   violates the safety rules downstream writers rely on.
//! * **Output**: the PDF or text file could not be produced.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the covergen library.
#[derive(Debug, Error)]
pub enum CoverLetterError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The job description resolved to nothing after trimming.
    #[error("Job description is empty.\nPass the text inline or a path to a non-empty file.")]
    EmptyJobDescription,

    /// A reference document (summary, sample letter, template) does not exist.
    #[error("{what} not found: '{path}'\nCheck --materials-dir or pass the file explicitly.")]
    MaterialNotFound { what: &'static str, path: PathBuf },

    /// A reference document exists but could not be read.
    #[error("Failed to read {what} '{path}': {source}")]
    MaterialUnreadable {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A reference document is empty after trimming.
    #[error("{what} '{path}' is empty")]
    MaterialEmpty { what: &'static str, path: PathBuf },

    /// The prompt template lacks one of the required placeholders.
    #[error("Prompt template is missing the {{{placeholder}}} placeholder")]
    TemplatePlaceholderMissing { placeholder: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Transport errors ──────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API call failed.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The LLM API rejected the credentials (401/403).
    #[error("Authentication error from provider '{provider}': {detail}")]
    AuthError { provider: String, detail: String },

    /// The LLM call did not complete within the configured timeout.
    #[error("LLM call timed out after {secs}s\nIncrease --api-timeout.")]
    ApiTimeout { secs: u64 },

    /// The model explicitly declined to produce the letter.
    #[error("Model refused to generate the letter: {reason}")]
    Refusal { reason: String },

    // ── Format errors ─────────────────────────────────────────────────────
    /// Model output was not valid JSON.
    #[error("LLM output was not valid JSON: {detail}")]
    InvalidJson { detail: String },

    /// Model output was JSON, but not an object.
    #[error("LLM output JSON must be an object")]
    NotAnObject,

    /// A required key is absent from the model output.
    #[error("LLM output missing '{field}'")]
    MissingField { field: &'static str },

    /// A required key holds something other than a string.
    #[error("LLM output field '{field}' must be a string")]
    FieldNotString { field: &'static str },

    /// The object had the right keys but an unexpected overall shape.
    #[error("LLM output has an unexpected shape: {detail}")]
    UnexpectedShape { detail: String },

    /// Structured mode returned neither a refusal nor any content.
    #[error("LLM response is missing the structured payload")]
    MissingStructuredPayload,

    // ── Validation errors ─────────────────────────────────────────────────
    #[error("LLM output missing filename")]
    EmptyFilename,

    #[error("LLM filename must not include path separators: '{filename}'")]
    FilenamePathSeparator { filename: String },

    #[error("LLM output filename is empty after cleanup")]
    FilenameEmptyAfterCleanup,

    #[error("LLM filename must use ASCII characters only: '{filename}'")]
    FilenameNotAscii { filename: String },

    #[error("LLM filename must use underscores instead of spaces: '{filename}'")]
    FilenameContainsSpace { filename: String },

    #[error("LLM filename must contain only letters, numbers, and underscores (found {ch:?} in '{filename}')")]
    FilenameInvalidChar { filename: String, ch: char },

    #[error("LLM output missing letter text")]
    EmptyLetter,

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// printpdf failed to assemble the document.
    #[error("Failed to render PDF: {0}")]
    PdfRenderFailed(String),
}

/// The pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Format,
    Validation,
    Output,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Transport => "transport",
            ErrorKind::Format => "format",
            ErrorKind::Validation => "validation",
            ErrorKind::Output => "output",
        };
        f.write_str(s)
    }
}

impl CoverLetterError {
    /// Classify this error by pipeline stage.
    pub fn kind(&self) -> ErrorKind {
        use CoverLetterError::*;
        match self {
            EmptyJobDescription
            | MaterialNotFound { .. }
            | MaterialUnreadable { .. }
            | MaterialEmpty { .. }
            | TemplatePlaceholderMissing { .. }
            | InvalidConfig(_) => ErrorKind::Configuration,

            ProviderNotConfigured { .. }
            | LlmApiError { .. }
            | AuthError { .. }
            | ApiTimeout { .. }
            | Refusal { .. } => ErrorKind::Transport,

            InvalidJson { .. }
            | NotAnObject
            | MissingField { .. }
            | FieldNotString { .. }
            | UnexpectedShape { .. }
            | MissingStructuredPayload => ErrorKind::Format,

            EmptyFilename
            | FilenamePathSeparator { .. }
            | FilenameEmptyAfterCleanup
            | FilenameNotAscii { .. }
            | FilenameContainsSpace { .. }
            | FilenameInvalidChar { .. }
            | EmptyLetter => ErrorKind::Validation,

            OutputWriteFailed { .. } | PdfRenderFailed(_) => ErrorKind::Output,
        }
    }
}
