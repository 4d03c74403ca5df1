//! Payload parsing and validation: model text → [`CoverLetter`].
//!
//! The model is an untrusted text generator, and both consumers of its
//! answer (the filesystem and the PDF writer) assume a safe, non-empty
//! identifier and a non-empty body. Parsing is therefore strict in two
//! stages:
//!
//! 1. **Shape**: strip an optional code fence, parse JSON, require an object
//!    with exactly the string fields `filename` and `letter`
//!    ([`parse_raw_response`]).
//! 2. **Content**: apply the filename and letter rules in a fixed order and
//!    fail on the first violation ([`validate`]).

use crate::error::CoverLetterError;
use crate::output::CoverLetter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

/// The two-field record the model is asked to return.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPayload {
    pub filename: String,
    pub letter: String,
}

/// Parse and validate a raw completion in one step.
pub fn parse_and_validate(raw: &str) -> Result<CoverLetter, CoverLetterError> {
    validate(parse_raw_response(raw)?)
}

// ── Shape ────────────────────────────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[^\n]*\n(.*?)(?:\n?```)?\s*$").unwrap());

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if any.
/// A reply cut off before its closing fence still loses the opening line.
pub fn unwrap_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    match RE_OUTER_FENCE.captures(trimmed) {
        Some(caps) => caps[1].trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Parse the model's reply into a [`RawPayload`].
///
/// Shape checks run before deserialisation so each failure maps to a
/// specific error instead of a generic serde message.
pub fn parse_raw_response(raw: &str) -> Result<RawPayload, CoverLetterError> {
    let cleaned = unwrap_code_fence(raw);

    let value: Value = serde_json::from_str(&cleaned).map_err(|e| {
        error!("Invalid JSON from LLM output: {}", e);
        CoverLetterError::InvalidJson {
            detail: e.to_string(),
        }
    })?;

    check_shape(value).inspect_err(|e| error!("Unexpected LLM output shape: {}", e))
}

fn check_shape(value: Value) -> Result<RawPayload, CoverLetterError> {
    let object = value.as_object().ok_or(CoverLetterError::NotAnObject)?;
    for field in ["filename", "letter"] {
        match object.get(field) {
            None => return Err(CoverLetterError::MissingField { field }),
            Some(Value::String(_)) => {}
            Some(_) => return Err(CoverLetterError::FieldNotString { field }),
        }
    }

    serde_json::from_value(value).map_err(|e| CoverLetterError::UnexpectedShape {
        detail: e.to_string(),
    })
}

// ── Content ──────────────────────────────────────────────────────────────────

/// Apply the filename and letter rules, in order, to a raw payload.
///
/// 1. filename non-empty (after trimming)
/// 2. no `/` or `\`
/// 3. strip trailing `.pdf`, then `.txt` (case-insensitive)
/// 4. non-empty after stripping
/// 5. ASCII only
/// 6. no spaces
/// 7. only ASCII letters, digits, underscore
/// 8. letter non-empty (after trimming)
pub fn validate(payload: RawPayload) -> Result<CoverLetter, CoverLetterError> {
    check_content(payload).inspect_err(|e| error!("LLM payload rejected: {}", e))
}

fn check_content(payload: RawPayload) -> Result<CoverLetter, CoverLetterError> {
    let filename = payload.filename.trim();

    if filename.is_empty() {
        return Err(CoverLetterError::EmptyFilename);
    }
    if filename.contains('/') || filename.contains('\\') {
        return Err(CoverLetterError::FilenamePathSeparator {
            filename: filename.to_string(),
        });
    }

    let filename = strip_suffix_ignore_case(filename, ".pdf");
    let filename = strip_suffix_ignore_case(filename, ".txt").trim();

    if filename.is_empty() {
        return Err(CoverLetterError::FilenameEmptyAfterCleanup);
    }
    if !filename.is_ascii() {
        return Err(CoverLetterError::FilenameNotAscii {
            filename: filename.to_string(),
        });
    }
    if filename.contains(' ') {
        return Err(CoverLetterError::FilenameContainsSpace {
            filename: filename.to_string(),
        });
    }
    if let Some(ch) = filename
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(CoverLetterError::FilenameInvalidChar {
            filename: filename.to_string(),
            ch,
        });
    }

    let letter = payload.letter.trim();
    if letter.is_empty() {
        return Err(CoverLetterError::EmptyLetter);
    }

    Ok(CoverLetter {
        filename: filename.to_string(),
        letter: letter.to_string(),
    })
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> &'a str {
    match s.len().checked_sub(suffix.len()) {
        Some(split) if s.get(split..).is_some_and(|tail| tail.eq_ignore_ascii_case(suffix)) => {
            &s[..split]
        }
        _ => s,
    }
}
