//! Prompt template for cover-letter generation.
//!
//! The instruction block lives here as a single constant so the rules the
//! model must follow (word band, filename format, JSON-only output) can be
//! inspected by tests without calling a model. Callers can swap the template
//! through [`crate::config::CoverLetterConfig::template_path`]; any template
//! must carry all three placeholders.

use crate::error::CoverLetterError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const JOB_DESCRIPTION_PLACEHOLDER: &str = "job_description";
pub const SUMMARY_PLACEHOLDER: &str = "summary";
pub const SAMPLE_LETTER_PLACEHOLDER: &str = "sample_letter";

/// Every placeholder a template must contain.
pub const REQUIRED_PLACEHOLDERS: [&str; 3] = [
    JOB_DESCRIPTION_PLACEHOLDER,
    SUMMARY_PLACEHOLDER,
    SAMPLE_LETTER_PLACEHOLDER,
];

/// Built-in template used when no template file is configured or present.
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"Write a professional cover letter.
Rules:
- Use ONLY facts from the summary or sample
- Use simple and easy to read language, avoiding complex vocabulary
- 120-180 words
- Match the tone and structure of the sample
- Do NOT invent metrics or offers
- Return a JSON object with keys "filename" and "letter"
- "filename" must be companyName_title using underscores instead of spaces (ASCII letters/numbers/underscore only, no extension)
- "letter" must be the final letter text only
- Encode line breaks in "letter" as \n so the JSON is valid
- Do not wrap the JSON in code fences
- Tailor the letter to the job description if provided; otherwise keep it general
- Use the company name and role title from the job description; do not leave placeholders

Job description (optional):
{job_description}

Candidate summary:
{summary}

Sample letter:
{sample_letter}"#;

static RE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(job_description|summary|sample_letter)\}").unwrap());

/// Check that `template` contains every required placeholder.
pub fn check_template(template: &str) -> Result<(), CoverLetterError> {
    for placeholder in REQUIRED_PLACEHOLDERS {
        if !template.contains(&format!("{{{placeholder}}}")) {
            return Err(CoverLetterError::TemplatePlaceholderMissing { placeholder });
        }
    }
    Ok(())
}

/// Interpolate the three inputs into `template`.
///
/// Substitution is a single regex pass, so a summary that happens to contain
/// the text `{sample_letter}` is inserted verbatim rather than expanded.
pub fn render_prompt(
    template: &str,
    job_description: &str,
    summary: &str,
    sample_letter: &str,
) -> Result<String, CoverLetterError> {
    check_template(template)?;
    let rendered = RE_PLACEHOLDER.replace_all(template, |caps: &Captures| match &caps[1] {
        JOB_DESCRIPTION_PLACEHOLDER => job_description.to_string(),
        SUMMARY_PLACEHOLDER => summary.to_string(),
        _ => sample_letter.to_string(),
    });
    Ok(rendered.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_has_all_placeholders() {
        assert!(check_template(DEFAULT_PROMPT_TEMPLATE).is_ok());
    }

    #[test]
    fn default_template_states_the_rules() {
        assert!(DEFAULT_PROMPT_TEMPLATE.contains("120-180 words"));
        assert!(DEFAULT_PROMPT_TEMPLATE.contains("Use ONLY facts"));
        assert!(DEFAULT_PROMPT_TEMPLATE.contains("Do NOT invent metrics"));
        assert!(DEFAULT_PROMPT_TEMPLATE.contains(r#"keys "filename" and "letter""#));
        assert!(DEFAULT_PROMPT_TEMPLATE.contains("underscores instead of spaces"));
        assert!(DEFAULT_PROMPT_TEMPLATE.contains("no extension"));
        assert!(DEFAULT_PROMPT_TEMPLATE.contains("otherwise keep it general"));
    }

    #[test]
    fn render_interpolates_verbatim() {
        let prompt = render_prompt(
            DEFAULT_PROMPT_TEMPLATE,
            "Software Engineer at Acme Corp, Austin",
            "Jane Doe, 5 years of Rust",
            "Dear Hiring Team,\n\nBest regards,\nJane",
        )
        .unwrap();
        assert!(prompt.contains("Job description (optional):\nSoftware Engineer at Acme Corp, Austin"));
        assert!(prompt.contains("Candidate summary:\nJane Doe, 5 years of Rust"));
        assert!(prompt.ends_with("Best regards,\nJane"));
        assert!(!prompt.contains("{summary}"));
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let prompt = render_prompt(
            "{job_description}|{summary}|{sample_letter}",
            "jd",
            "mentions {sample_letter} literally",
            "sample",
        )
        .unwrap();
        assert_eq!(prompt, "jd|mentions {sample_letter} literally|sample");
    }

    #[test]
    fn missing_placeholder_is_fatal() {
        let err = render_prompt("{job_description} {summary}", "a", "b", "c").unwrap_err();
        assert!(matches!(
            err,
            CoverLetterError::TemplatePlaceholderMissing {
                placeholder: "sample_letter"
            }
        ));
    }
}
