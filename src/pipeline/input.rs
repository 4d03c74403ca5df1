//! Input resolution: the job description and the reference materials.
//!
//! The job description is accepted either inline or as a path, and the two
//! are told apart by simply trying to read the value as a file. Anything that
//! cannot be read (missing, a directory, not UTF-8, a path too long for the
//! OS) is taken as literal text.
//!
//! Reference materials are the opposite: they come from fixed locations and
//! any problem with them aborts the run before the LLM is called.

use crate::config::CoverLetterConfig;
use crate::error::CoverLetterError;
use crate::prompts::{self, DEFAULT_PROMPT_TEMPLATE};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, error};

/// Resolve the user-supplied job description.
pub fn resolve_job_description(value: &str) -> Result<String, CoverLetterError> {
    let text = match std::fs::read_to_string(value) {
        Ok(content) => {
            debug!("Read job description from file: {}", value);
            content
        }
        Err(e) => {
            debug!("Treating job description as inline text ({})", e.kind());
            value.to_string()
        }
    };

    let text = text.trim();
    if text.is_empty() {
        error!("Job description is empty");
        return Err(CoverLetterError::EmptyJobDescription);
    }
    Ok(text.to_string())
}

/// Summary, sample letter and prompt template for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMaterials {
    pub summary: String,
    pub sample_letter: String,
    /// Template text; the built-in template unless one was found on disk.
    pub template: String,
}

impl ReferenceMaterials {
    /// Load all materials named by `config`.
    ///
    /// An explicit `template_path` must exist. Without one, the implicit
    /// `prompt_template.txt` in the materials directory is used when present.
    /// A loaded template is checked for its placeholders here, so a bad
    /// template fails alongside the other configuration errors.
    pub fn load(config: &CoverLetterConfig) -> Result<Self, CoverLetterError> {
        let summary = read_material("Candidate summary", &config.summary_file())?;
        let sample_letter = read_material("Sample letter", &config.sample_letter_file())?;

        let template = match config.template_path {
            Some(ref path) => read_material("Prompt template", path)?,
            None => {
                let implicit = config.implicit_template_file();
                if implicit.is_file() {
                    read_material("Prompt template", &implicit)?
                } else {
                    DEFAULT_PROMPT_TEMPLATE.to_string()
                }
            }
        };
        prompts::check_template(&template)
            .inspect_err(|e| error!("Rejected prompt template: {}", e))?;

        Ok(Self {
            summary,
            sample_letter,
            template,
        })
    }

    /// Build the prompt for `job_description` from these materials.
    pub fn build_prompt(&self, job_description: &str) -> Result<String, CoverLetterError> {
        prompts::render_prompt(
            &self.template,
            job_description,
            &self.summary,
            &self.sample_letter,
        )
    }
}

/// Read one reference document; missing, unreadable or blank is fatal.
fn read_material(what: &'static str, path: &Path) -> Result<String, CoverLetterError> {
    load_material(what, path).inspect_err(|e| error!("{}", e))
}

fn load_material(what: &'static str, path: &Path) -> Result<String, CoverLetterError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CoverLetterError::MaterialNotFound {
            what,
            path: path.to_path_buf(),
        },
        _ => CoverLetterError::MaterialUnreadable {
            what,
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let content = content.trim();
    if content.is_empty() {
        return Err(CoverLetterError::MaterialEmpty {
            what,
            path: path.to_path_buf(),
        });
    }
    debug!("Loaded {} from {} ({} bytes)", what, path.display(), content.len());
    Ok(content.to_string())
}
